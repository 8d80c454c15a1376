//! The rule matcher: compiles a policy document and finds the first match.
//!
//! Compilation filters out disabled rules, stamps every rule with its reason
//! (author-supplied or generated), and orders the list by priority descending.
//! The sort is stable, so rules sharing a priority keep their declaration
//! order, which is the documented tie-break.
//!
//! Matching assembles one flat JSON record from the request and walks the
//! compiled list until a rule's conditions are fully satisfied. Condition
//! mistakes never fail an evaluation; they degrade to "rule does not match"
//! inside the condition evaluator.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde_json::{json, Map, Value};
use tracing::debug;

use arbiter_contracts::{
    action::DecisionAction,
    policy::{PolicyInfo, RuleMatch},
    request::{Context, Evidence, Intent},
};
use arbiter_core::traits::RuleEngine;

use crate::conditions;
use crate::document::PolicyDocument;

struct CompiledRule {
    name: String,
    priority: i64,
    conditions: BTreeMap<String, BTreeMap<String, Value>>,
    action: DecisionAction,
    reason: String,
}

/// A [`RuleEngine`] compiled from one policy document.
pub struct PolicyEvaluator {
    info: PolicyInfo,
    rules: Vec<CompiledRule>,
}

impl PolicyEvaluator {
    /// Compile the document's enabled rules into evaluation order.
    pub fn new(document: &PolicyDocument) -> Self {
        let mut rules: Vec<CompiledRule> = document
            .rules
            .iter()
            .filter(|rule| rule.enabled)
            .map(|rule| CompiledRule {
                name: rule.name.clone(),
                priority: rule.priority,
                conditions: rule.conditions.clone(),
                action: rule.action,
                reason: rule
                    .reason
                    .clone()
                    .unwrap_or_else(|| format!("Matched rule: {}", rule.name)),
            })
            .collect();
        // Stable sort: equal priorities keep declaration order.
        rules.sort_by_key(|rule| Reverse(rule.priority));
        Self {
            info: document.info(),
            rules,
        }
    }

    /// Compiled rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name.as_str()).collect()
    }
}

impl RuleEngine for PolicyEvaluator {
    fn describe(&self) -> PolicyInfo {
        self.info.clone()
    }

    fn first_match(
        &self,
        intent: &Intent,
        context: &Context,
        evidence: &Evidence,
    ) -> Option<RuleMatch> {
        let record = evaluation_record(intent, context, evidence);
        for rule in &self.rules {
            if rule_satisfied(rule, &record) {
                debug!(rule = %rule.name, action = %rule.action, "policy rule matched");
                return Some(RuleMatch {
                    rule_name: rule.name.clone(),
                    action: rule.action,
                    reason: rule.reason.clone(),
                });
            }
        }
        None
    }
}

fn rule_satisfied(rule: &CompiledRule, record: &Value) -> bool {
    rule.conditions.iter().all(|(path, operators)| {
        operators
            .iter()
            .all(|(operator, operand)| conditions::evaluate(record, path, operator, operand))
    })
}

/// Assemble the record rule conditions resolve their paths against.
///
/// Context identity fields appear under `context.` as explicit nulls when
/// absent; context metadata is spread into the same map and wins on key
/// collision. Evidence sections keep their names, so authors write paths
/// like `evidence.rag.confidence`.
pub fn evaluation_record(intent: &Intent, context: &Context, evidence: &Evidence) -> Value {
    let mut ctx = Map::new();
    ctx.insert("user_id".to_string(), json!(context.user_id));
    ctx.insert("channel".to_string(), json!(context.channel));
    ctx.insert("session_id".to_string(), json!(context.session_id));
    for (key, value) in &context.metadata {
        ctx.insert(key.clone(), value.clone());
    }

    json!({
        "intent": {
            "name": intent.name,
            "confidence": intent.confidence,
            "parameters": intent.parameters,
        },
        "context": ctx,
        "evidence": {
            "facts": evidence.facts,
            "rag": evidence.rag,
            "topic": evidence.topic,
        },
    })
}

// ── Tests ────────────────────────────────────────────────────────────────────

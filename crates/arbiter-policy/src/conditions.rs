//! The condition evaluator: one field path, one operator, one operand.
//!
//! A condition reads a dot-separated path out of the evaluation record and
//! compares the resolved value against the rule author's operand. Resolution
//! distinguishes *missing* from an explicit null: a missing path satisfies
//! only `is_null`, while every other operator evaluates false on it.
//!
//! Nothing in this module ever fails. Malformed operands, unknown operators,
//! wrong-typed values, and uncompilable regexes all evaluate to false, so a
//! policy author's mistake degrades to "rule does not match" instead of
//! crashing an evaluation.

use regex::Regex;
use serde_json::Value;

/// Every operator a condition may use, in documentation order.
pub const SUPPORTED_OPERATORS: &[&str] = &[
    "equals",
    "not_equals",
    "in",
    "not_in",
    "contains",
    "not_contains",
    "starts_with",
    "ends_with",
    "gt",
    "gte",
    "lt",
    "lte",
    "between",
    "is_true",
    "is_false",
    "is_null",
    "is_not_null",
    "any_of",
    "all_of",
    "matches",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Equals,
    NotEquals,
    In,
    NotIn,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Gt,
    Gte,
    Lt,
    Lte,
    Between,
    IsTrue,
    IsFalse,
    IsNull,
    IsNotNull,
    AnyOf,
    AllOf,
    Matches,
}

impl Op {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "equals" => Self::Equals,
            "not_equals" => Self::NotEquals,
            "in" => Self::In,
            "not_in" => Self::NotIn,
            "contains" => Self::Contains,
            "not_contains" => Self::NotContains,
            "starts_with" => Self::StartsWith,
            "ends_with" => Self::EndsWith,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "between" => Self::Between,
            "is_true" => Self::IsTrue,
            "is_false" => Self::IsFalse,
            "is_null" => Self::IsNull,
            "is_not_null" => Self::IsNotNull,
            "any_of" => Self::AnyOf,
            "all_of" => Self::AllOf,
            "matches" => Self::Matches,
            _ => return None,
        })
    }
}

/// True when `name` is a recognized condition operator.
pub fn is_known_operator(name: &str) -> bool {
    Op::parse(name).is_some()
}

/// Walk a dot-separated path through nested maps. Returns `None` the moment
/// any segment is absent or the current value is not a map.
pub fn resolve<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Evaluate one `(field_path, operator, operand)` triple against the record.
pub fn evaluate(record: &Value, field_path: &str, operator: &str, operand: &Value) -> bool {
    let op = match Op::parse(operator) {
        Some(op) => op,
        // Unknown operator never matches.
        None => return false,
    };

    let value = match resolve(record, field_path) {
        Some(value) => value,
        // Missing is treated as null by the null checks and as
        // unsatisfiable by everything else.
        None => return matches!(op, Op::IsNull),
    };

    match op {
        Op::Equals => value_eq(value, operand),
        Op::NotEquals => !value_eq(value, operand),

        Op::In => operand
            .as_array()
            .map_or(false, |list| list.iter().any(|item| value_eq(value, item))),
        Op::NotIn => operand
            .as_array()
            .map_or(false, |list| !list.iter().any(|item| value_eq(value, item))),

        Op::Contains => both_strings(value, operand).map_or(false, |(v, o)| v.contains(o)),
        Op::NotContains => both_strings(value, operand).map_or(false, |(v, o)| !v.contains(o)),
        Op::StartsWith => both_strings(value, operand).map_or(false, |(v, o)| v.starts_with(o)),
        Op::EndsWith => both_strings(value, operand).map_or(false, |(v, o)| v.ends_with(o)),

        Op::Gt => numeric_pair(value, operand).map_or(false, |(v, o)| v > o),
        Op::Gte => numeric_pair(value, operand).map_or(false, |(v, o)| v >= o),
        Op::Lt => numeric_pair(value, operand).map_or(false, |(v, o)| v < o),
        Op::Lte => numeric_pair(value, operand).map_or(false, |(v, o)| v <= o),
        Op::Between => between(value, operand),

        // Exact boolean identity: truthy strings and numbers do not count.
        Op::IsTrue => value == &Value::Bool(true),
        Op::IsFalse => value == &Value::Bool(false),
        Op::IsNull => value.is_null(),
        Op::IsNotNull => !value.is_null(),

        Op::AnyOf => match (value.as_array(), operand.as_array()) {
            (Some(items), Some(allowed)) => items
                .iter()
                .any(|item| allowed.iter().any(|cand| value_eq(item, cand))),
            _ => false,
        },
        // Every element of the field value must appear in the operand list;
        // an empty field value is vacuously satisfied.
        Op::AllOf => match (value.as_array(), operand.as_array()) {
            (Some(items), Some(allowed)) => items
                .iter()
                .all(|item| allowed.iter().any(|cand| value_eq(item, cand))),
            _ => false,
        },

        Op::Matches => regex_search(value, operand),
    }
}

/// Shape-check a rule author's operand for a known operator, for load-time
/// validation. Returns a human-readable problem description, or `None` when
/// the shape is acceptable (or the operator is unknown — the caller reports
/// unknown operators separately).
pub fn operand_problem(operator: &str, operand: &Value) -> Option<String> {
    let op = Op::parse(operator)?;
    match op {
        Op::Gt | Op::Gte | Op::Lt | Op::Lte => {
            if operand.as_f64().is_none() {
                return Some(format!("operator '{operator}' requires a numeric operand"));
            }
        }
        Op::Between => {
            let well_formed = operand
                .as_array()
                .map_or(false, |b| b.len() == 2 && b.iter().all(|v| v.as_f64().is_some()));
            if !well_formed {
                return Some(
                    "operator 'between' requires a [low, high] pair of numbers".to_string(),
                );
            }
        }
        Op::In | Op::NotIn | Op::AnyOf | Op::AllOf => {
            if !operand.is_array() {
                return Some(format!("operator '{operator}' requires a list operand"));
            }
        }
        Op::IsTrue | Op::IsFalse | Op::IsNull | Op::IsNotNull => {
            if !operand.is_boolean() {
                return Some(format!(
                    "operator '{operator}' takes a boolean placeholder operand"
                ));
            }
        }
        Op::Contains | Op::NotContains | Op::StartsWith | Op::EndsWith => {
            if !operand.is_string() {
                return Some(format!("operator '{operator}' requires a string operand"));
            }
        }
        Op::Matches => match operand.as_str() {
            Some(pattern) => {
                if let Err(e) = Regex::new(pattern) {
                    return Some(format!("operator 'matches' pattern does not compile: {e}"));
                }
            }
            None => return Some("operator 'matches' requires a string pattern".to_string()),
        },
        Op::Equals | Op::NotEquals => {}
    }
    None
}

/// Equality that compares numbers by numeric value (so `3` equals `3.0`) and
/// everything else structurally. Strings never equal numbers.
fn value_eq(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn both_strings<'a>(value: &'a Value, operand: &'a Value) -> Option<(&'a str, &'a str)> {
    Some((value.as_str()?, operand.as_str()?))
}

fn numeric_pair(value: &Value, operand: &Value) -> Option<(f64, f64)> {
    Some((value.as_f64()?, operand.as_f64()?))
}

/// Closed interval: `low <= value <= high`. The operand must be a two-element
/// list of numbers.
fn between(value: &Value, operand: &Value) -> bool {
    let v = match value.as_f64() {
        Some(v) => v,
        None => return false,
    };
    let bounds = match operand.as_array() {
        Some(b) if b.len() == 2 => b,
        _ => return false,
    };
    match (bounds[0].as_f64(), bounds[1].as_f64()) {
        (Some(low), Some(high)) => low <= v && v <= high,
        _ => false,
    }
}

/// Regex search (not full match) against the stringified field value.
/// Numbers and booleans stringify; nulls, lists, and maps never match. A
/// pattern that does not compile evaluates false.
fn regex_search(value: &Value, operand: &Value) -> bool {
    let pattern = match operand.as_str() {
        Some(p) => p,
        None => return false,
    };
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return false,
    };
    match Regex::new(pattern) {
        Ok(re) => re.is_match(&text),
        Err(_) => false,
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

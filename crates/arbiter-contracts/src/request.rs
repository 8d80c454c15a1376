//! Request-side types: the intent, context, and evidence entering the gate.
//!
//! These types are built by the caller once per evaluation and never mutated
//! by the pipeline. Evidence is deliberately open-schema: gates and policy
//! rules read only the keys they recognize, and an absent key means
//! "unknown", never "false".

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A recognized user intent, as produced by the upstream recognition step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// Intent identifier (e.g. "order_status_query", "refund").
    pub name: String,
    /// Recognition confidence in [0, 1]. Validated at the service boundary,
    /// not here.
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// Slot values extracted alongside the intent. Safety scanning reads the
    /// string-valued entries; policy rules can match any of them.
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

fn default_confidence() -> f64 {
    1.0
}

impl Intent {
    /// Create an intent with full confidence and no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            confidence: 1.0,
            parameters: Map::new(),
        }
    }

    /// Set the recognition confidence.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Attach one parameter.
    pub fn with_parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }
}

/// Conversation-level metadata supplied per request.
///
/// All identity fields are optional; policy rules that reference an absent
/// field simply do not match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default)]
    pub user_id: Option<String>,
    /// Channel the request arrived on (e.g. "web_chat", "voice").
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    /// Open mapping for caller-specific keys (tier, locale, ...). Exposed to
    /// policy rules under the `context.` path prefix.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Evidence gathered before the gate runs: fact verifiability, retrieval
/// quality, and topic sensitivity signals.
///
/// Each section is an open mapping. The typed accessors below preserve the
/// missing-versus-false distinction: a missing key yields `None` from
/// [`Evidence::get`], and the `*_or` helpers fall back to an explicit default
/// rather than inventing a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Verifiability signals: `verifiable`, `verifiable_confidence`,
    /// `source`, `freshness`, `requires_realtime`.
    #[serde(default)]
    pub facts: Map<String, Value>,
    /// Retrieval signals: `confidence`, `has_conflicts`, `conflict_count`,
    /// `kb_age_days`, `coverage`, `tool_disagreement`.
    #[serde(default)]
    pub rag: Map<String, Value>,
    /// Sensitivity flags: `is_sensitive`, `has_financial_impact`,
    /// `requires_authority`, `is_irreversible`, `harm_risk`.
    #[serde(default)]
    pub topic: Map<String, Value>,
}

impl Evidence {
    /// Resolve a dot-separated path such as `"facts.verifiable"` or
    /// `"rag.scores.reranker"`. The first segment selects the section; the
    /// remaining segments walk nested maps. Returns `None` if any segment is
    /// absent.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let section = match segments.next()? {
            "facts" => &self.facts,
            "rag" => &self.rag,
            "topic" => &self.topic,
            _ => return None,
        };
        let mut current = section.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Boolean read with a default. Any value that is not exactly a JSON
    /// boolean (including a missing key) yields the default; truthy strings
    /// and numbers do not count.
    pub fn bool_or(&self, path: &str, default: bool) -> bool {
        match self.get(path) {
            Some(Value::Bool(b)) => *b,
            _ => default,
        }
    }

    /// Numeric read with a default. Integers and floats both coerce; any
    /// other value kind yields the default.
    pub fn f64_or(&self, path: &str, default: f64) -> f64 {
        self.get(path).and_then(Value::as_f64).unwrap_or(default)
    }

    /// String read with a default for missing or non-string values.
    pub fn str_or<'a>(&'a self, path: &str, default: &'a str) -> &'a str {
        self.get(path).and_then(Value::as_str).unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn evidence() -> Evidence {
        serde_json::from_value(json!({
            "facts": {
                "verifiable": true,
                "verifiable_confidence": 0.92,
                "source": "order_database",
                "scores": { "reranker": 0.88 }
            },
            "rag": { "confidence": 0.7, "conflict_count": 0 },
            "topic": { "is_sensitive": false }
        }))
        .unwrap()
    }

    #[test]
    fn get_resolves_nested_paths() {
        let ev = evidence();
        assert_eq!(ev.get("facts.verifiable"), Some(&json!(true)));
        assert_eq!(ev.get("facts.scores.reranker"), Some(&json!(0.88)));
        assert_eq!(ev.get("rag.confidence"), Some(&json!(0.7)));
    }

    #[test]
    fn get_returns_none_for_missing_segments() {
        let ev = evidence();
        assert_eq!(ev.get("facts.nonexistent"), None);
        assert_eq!(ev.get("facts.scores.missing"), None);
        assert_eq!(ev.get("unknown_section.key"), None);
        // A scalar cannot be descended into.
        assert_eq!(ev.get("facts.verifiable.deeper"), None);
    }

    #[test]
    fn bool_or_requires_exact_boolean() {
        let ev: Evidence = serde_json::from_value(json!({
            "facts": { "verifiable": "yes", "flag": false }
        }))
        .unwrap();
        // Non-boolean falls back to the default in both directions.
        assert!(ev.bool_or("facts.verifiable", true));
        assert!(!ev.bool_or("facts.verifiable", false));
        assert!(!ev.bool_or("facts.flag", true));
        assert!(ev.bool_or("facts.missing", true));
    }

    #[test]
    fn numeric_and_string_defaults_apply() {
        let ev = evidence();
        assert_eq!(ev.f64_or("rag.confidence", 1.0), 0.7);
        assert_eq!(ev.f64_or("rag.missing", 1.0), 1.0);
        assert_eq!(ev.f64_or("facts.source", 0.5), 0.5);
        assert_eq!(ev.str_or("facts.source", "unknown"), "order_database");
        assert_eq!(ev.str_or("facts.freshness", "unknown"), "unknown");
    }

    #[test]
    fn intent_builder_accumulates_parameters() {
        let intent = Intent::new("refund")
            .with_confidence(0.85)
            .with_parameter("order_id", json!("12345"))
            .with_parameter("user_input", json!("I want my money back"));
        assert_eq!(intent.name, "refund");
        assert_eq!(intent.confidence, 0.85);
        assert_eq!(intent.parameters.len(), 2);
    }

    #[test]
    fn request_types_deserialize_with_defaults() {
        let intent: Intent = serde_json::from_value(json!({ "name": "faq_hours" })).unwrap();
        assert_eq!(intent.confidence, 1.0);
        assert!(intent.parameters.is_empty());

        let context: Context = serde_json::from_value(json!({})).unwrap();
        assert_eq!(context.user_id, None);

        let evidence: Evidence = serde_json::from_value(json!({})).unwrap();
        assert!(evidence.facts.is_empty());
    }
}

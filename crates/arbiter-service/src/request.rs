//! The evaluation request as received from a transport.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use arbiter_contracts::{
    error::{ArbiterError, ArbiterResult},
    request::{Context, Evidence, Intent},
};

/// One governance evaluation request.
///
/// `policy_path` selects the policy document: absent means "gates only, no
/// policy rules"; a relative path resolves against the service's policy
/// directory; an absolute path is used as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceRequest {
    pub intent: Intent,
    #[serde(default)]
    pub context: Context,
    #[serde(default)]
    pub evidence: Evidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_path: Option<PathBuf>,
}

impl GovernanceRequest {
    /// A request with default (empty) context and evidence and no policy.
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            context: Context::default(),
            evidence: Evidence::default(),
            policy_path: None,
        }
    }

    /// Reject malformed input at the boundary. A rejected request is never
    /// turned into a decision.
    pub fn validate(&self) -> ArbiterResult<()> {
        if self.intent.name.trim().is_empty() {
            return Err(ArbiterError::InvalidInput {
                reason: "intent name must not be empty".to_string(),
            });
        }
        // NaN fails the range check too.
        if !(0.0..=1.0).contains(&self.intent.confidence) {
            return Err(ArbiterError::InvalidInput {
                reason: format!(
                    "intent confidence must be within [0, 1], got {}",
                    self.intent.confidence
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn minimal_request_deserializes_with_defaults() {
        let request: GovernanceRequest = serde_json::from_value(json!({
            "intent": { "name": "faq_hours" }
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        assert!(request.policy_path.is_none());
        assert!(request.context.user_id.is_none());
        assert!(request.evidence.facts.is_empty());
    }

    #[test]
    fn empty_intent_name_is_rejected() {
        let request = GovernanceRequest::new(Intent::new("  "));
        let err = request.validate().unwrap_err();
        assert!(matches!(err, ArbiterError::InvalidInput { .. }));
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        for bad in [-0.1, 1.5, f64::NAN] {
            let request = GovernanceRequest::new(Intent::new("refund").with_confidence(bad));
            assert!(
                request.validate().is_err(),
                "confidence {bad} should be rejected"
            );
        }
        let ok = GovernanceRequest::new(Intent::new("refund").with_confidence(1.0));
        assert!(ok.validate().is_ok());
    }
}

//! Local reply synthesis: classify, escalate, resolve.

use falcon_core::config::EmergencyConfig;
use falcon_core::types::ResponsePayload;
use tracing::debug;

use crate::classifier::IntentClassifier;
use crate::error::ChatError;
use crate::escalation::EscalationPolicy;
use crate::response::ResponseResolver;

/// The offline pipeline used whenever the remote backend cannot answer.
pub struct TriageEngine {
    classifier: IntentClassifier,
    policy: EscalationPolicy,
    resolver: ResponseResolver,
}

impl TriageEngine {
    pub fn new(emergency: &EmergencyConfig) -> Self {
        let emergency = emergency.sanitized();
        Self {
            classifier: IntentClassifier::new(),
            policy: EscalationPolicy::new(&emergency),
            resolver: ResponseResolver::new(&emergency),
        }
    }

    /// Build a structured reply for an utterance entirely locally.
    pub fn synthesize(&self, utterance: &str) -> Result<ResponsePayload, ChatError> {
        let category = self.classifier.classify(utterance);
        let escalation = self.policy.escalate(category);
        debug!(
            category = %category,
            severity = %escalation.severity,
            keywords = ?self.classifier.matched_keywords(utterance).len(),
            "Utterance classified"
        );
        self.resolver.resolve(category, &escalation, utterance)
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    pub fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    pub fn resolver(&self) -> &ResponseResolver {
        &self.resolver
    }
}

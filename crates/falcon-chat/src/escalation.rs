//! Severity escalation and mandatory quick-actions.

use falcon_core::config::EmergencyConfig;
use falcon_core::types::{Category, Severity};

/// Suggestion attached to every advisory reply.
pub const TALK_TO_DOCTOR: &str = "Talk to a doctor";

/// A quick-action a reply of a given severity must offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredAction {
    /// Direct-dial button for a phone number.
    Dial { number: String },
    /// Button that asks for the nearest hospital.
    FindHospital,
    /// Informational follow-up suggestion, not a button.
    Suggest(String),
}

impl RequiredAction {
    /// Dial and hospital actions become buttons; suggestions do not.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, RequiredAction::Suggest(_))
    }

    pub fn is_dial(&self) -> bool {
        matches!(self, RequiredAction::Dial { .. })
    }
}

/// Outcome of escalating a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escalation {
    pub severity: Severity,
    pub required_actions: Vec<RequiredAction>,
}

impl Escalation {
    pub fn has_dial_action(&self) -> bool {
        self.required_actions.iter().any(RequiredAction::is_dial)
    }

    /// Actions that must be rendered as buttons, in policy order.
    pub fn actionable(&self) -> impl Iterator<Item = &RequiredAction> {
        self.required_actions.iter().filter(|a| a.is_actionable())
    }

    /// Informational suggestions, in policy order.
    pub fn suggestions(&self) -> impl Iterator<Item = &str> {
        self.required_actions.iter().filter_map(|a| match a {
            RequiredAction::Suggest(text) => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Fixed category-to-severity mapping with configured dial numbers.
#[derive(Debug, Clone)]
pub struct EscalationPolicy {
    emergency: EmergencyConfig,
}

impl EscalationPolicy {
    /// Non-dialable numbers are replaced by the defaults so every dial
    /// action stays a `tel:` button.
    pub fn new(emergency: &EmergencyConfig) -> Self {
        Self {
            emergency: emergency.sanitized(),
        }
    }

    pub fn severity_for(&self, category: Category) -> Severity {
        match category {
            Category::Emergency => Severity::Critical,
            Category::Warning => Severity::Urgent,
            Category::Myth | Category::Symptom => Severity::Advisory,
            Category::Vaccination
            | Category::Hospital
            | Category::General
            | Category::Fallback
            | Category::Greeting => Severity::Info,
        }
    }

    /// Severity and required actions for a category.
    pub fn escalate(&self, category: Category) -> Escalation {
        let severity = self.severity_for(category);
        let required_actions = match severity {
            Severity::Critical => vec![
                self.dial_ambulance(),
                RequiredAction::Dial {
                    number: self.emergency.emergency_number.clone(),
                },
                RequiredAction::FindHospital,
            ],
            Severity::Urgent => vec![RequiredAction::FindHospital, self.dial_ambulance()],
            Severity::Advisory => vec![RequiredAction::Suggest(TALK_TO_DOCTOR.to_string())],
            Severity::Info => Vec::new(),
        };
        Escalation {
            severity,
            required_actions,
        }
    }

    fn dial_ambulance(&self) -> RequiredAction {
        RequiredAction::Dial {
            number: self.emergency.ambulance_number.clone(),
        }
    }
}

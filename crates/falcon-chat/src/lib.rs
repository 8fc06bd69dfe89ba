//! Conversational triage engine for FalconCare.
//!
//! Classifies bilingual health utterances against a priority-ordered keyword
//! catalog, escalates them to a severity with mandatory quick-actions,
//! resolves a structured reply, and orchestrates remote-or-fallback delivery
//! into an append-only transcript.

pub mod catalog;
pub mod classifier;
pub mod engine;
pub mod error;
pub mod escalation;
pub mod orchestrator;
pub mod remote;
pub mod response;
pub mod state;

pub use catalog::{CategoryRule, KeywordCatalog};
pub use classifier::IntentClassifier;
pub use engine::TriageEngine;
pub use error::ChatError;
pub use escalation::{Escalation, EscalationPolicy, RequiredAction};
pub use orchestrator::{ButtonOutcome, ChatOrchestrator, Dialer, LogDialer};
pub use remote::{Fragment, HttpBackend, OfflineBackend, RemoteBackend, RemoteRequest};
pub use response::ResponseResolver;
pub use state::ConversationState;

//! Error types for the triage engine.

use falcon_core::error::FalconError;
use falcon_core::types::Category;

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    InputRejected,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("conversation is closed")]
    Closed,
    #[error("remote backend unavailable: {0}")]
    RemoteUnavailable(String),
    #[error("remote backend returned a malformed reply: {0}")]
    RemoteMalformed(String),
    #[error("no response template for category '{0}'")]
    TemplateMissing(Category),
    #[error(transparent)]
    Core(#[from] FalconError),
}

impl ChatError {
    /// Whether this failure came from the remote backend and should trigger
    /// local synthesis rather than surface to the caller.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            ChatError::RemoteUnavailable(_) | ChatError::RemoteMalformed(_)
        )
    }
}

//! Observable conversation state.

use falcon_core::types::{Message, ResponsePayload};

/// Transcript plus the flags a front end renders from.
///
/// Owned by the orchestrator behind a `watch` channel. Mutations are only
/// possible inside the crate and every one of them is refused once the
/// conversation is closed.
#[derive(Debug, Clone)]
pub struct ConversationState {
    transcript: Vec<Message>,
    pending: bool,
    closed: bool,
    /// Accepted requests not yet fully delivered.
    outstanding: usize,
}

impl ConversationState {
    /// A fresh conversation holding only the greeting.
    pub fn seeded(greeting: ResponsePayload) -> Self {
        Self {
            transcript: vec![Message::bot(greeting)],
            pending: false,
            closed: false,
            outstanding: 0,
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// True while any accepted request is still being answered.
    pub fn pending(&self) -> bool {
        self.pending
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.transcript.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }

    /// Most recent bot message, whose buttons and suggestions are live.
    pub fn last_bot_message(&self) -> Option<&Message> {
        self.transcript.iter().rev().find(|m| m.is_bot())
    }

    /// Register a newly accepted request. Refused when closed.
    pub(crate) fn accept(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.outstanding += 1;
        self.pending = true;
        true
    }

    /// Append a message. Refused when closed.
    pub(crate) fn append(&mut self, message: Message) -> bool {
        if self.closed {
            return false;
        }
        self.transcript.push(message);
        true
    }

    /// Mark one accepted request as fully delivered.
    pub(crate) fn finish(&mut self) {
        self.outstanding = self.outstanding.saturating_sub(1);
        self.pending = self.outstanding > 0;
    }

    /// Close the conversation. Returns false if it was already closed.
    pub(crate) fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;
        self.pending = false;
        self.outstanding = 0;
        true
    }
}

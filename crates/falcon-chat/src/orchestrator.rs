//! Conversation orchestrator: accepts utterances, asks the remote backend,
//! falls back to local synthesis and delivers replies into the transcript.
//!
//! Each conversation owns one worker task that drains a FIFO queue, so only
//! one request is in flight at a time and transcripts never interleave.

use std::sync::Arc;
use std::time::Duration;

use falcon_core::config::FalconConfig;
use falcon_core::types::{Button, Message, QuickReply, ResponsePayload};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::TriageEngine;
use crate::error::ChatError;
use crate::remote::{Fragment, RemoteBackend, RemoteRequest};
use crate::state::ConversationState;

// =============================================================================
// Dialer
// =============================================================================

/// Places phone calls for `tel:` quick actions.
pub trait Dialer: Send + Sync {
    fn dial(&self, number: &str);
}

/// Dialer that only records the request in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDialer;

impl Dialer for LogDialer {
    fn dial(&self, number: &str) {
        info!(number, "Dial requested");
    }
}

/// What pressing a button did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonOutcome {
    /// The dialer was asked to call this number.
    Dialed(String),
    /// The payload was submitted as the next utterance.
    Submitted,
}

// =============================================================================
// ChatOrchestrator
// =============================================================================

/// Handle to one conversation.
///
/// Must be opened inside a tokio runtime. Dropping the handle closes the
/// conversation.
pub struct ChatOrchestrator {
    session_id: Uuid,
    state: Arc<watch::Sender<ConversationState>>,
    queue: mpsc::UnboundedSender<String>,
    worker: JoinHandle<()>,
    dialer: Arc<dyn Dialer>,
    max_message_length: usize,
}

impl ChatOrchestrator {
    /// Open a conversation seeded with the greeting and start its worker.
    pub fn open(config: &FalconConfig, remote: Arc<dyn RemoteBackend>) -> Self {
        let session_id = Uuid::new_v4();
        let engine = TriageEngine::new(&config.emergency);
        let (state, _) = watch::channel(ConversationState::seeded(engine.resolver().greeting()));
        let state = Arc::new(state);
        let (queue, rx) = mpsc::unbounded_channel();

        let worker = Worker {
            session_id: session_id.to_string(),
            state: Arc::clone(&state),
            engine,
            remote,
            remote_timeout: Duration::from_millis(config.remote.timeout_ms),
            fragment_delay: Duration::from_millis(config.delivery.fragment_delay_ms),
        };
        let worker = tokio::spawn(Arc::new(worker).run(rx));
        info!(session = %session_id, "Conversation opened");

        Self {
            session_id,
            state,
            queue,
            worker,
            dialer: Arc::new(LogDialer),
            max_message_length: config.chat.max_message_length,
        }
    }

    /// Replace the dialer used for `tel:` buttons.
    pub fn with_dialer(mut self, dialer: Arc<dyn Dialer>) -> Self {
        self.dialer = dialer;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Accept an utterance for processing.
    ///
    /// Blank input is rejected without touching the state. Otherwise the
    /// request is queued behind any in-flight one and `pending` becomes true
    /// before this returns.
    pub fn submit(&self, utterance: &str) -> Result<(), ChatError> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(ChatError::InputRejected);
        }
        if utterance.chars().count() > self.max_message_length {
            return Err(ChatError::MessageTooLong(self.max_message_length));
        }

        let mut accepted = false;
        self.state.send_if_modified(|s| {
            accepted = s.accept();
            accepted
        });
        if !accepted {
            return Err(ChatError::Closed);
        }

        if self.queue.send(utterance.to_string()).is_err() {
            warn!(session = %self.session_id, "Conversation worker is gone, closing");
            self.state.send_if_modified(|s| s.close());
            return Err(ChatError::Closed);
        }
        debug!(session = %self.session_id, chars = utterance.chars().count(), "Utterance accepted");
        Ok(())
    }

    /// Act on a quick-action button.
    ///
    /// `tel:` payloads go to the dialer and never touch the transcript; any
    /// other payload is submitted as the next utterance.
    pub fn press(&self, button: &Button) -> Result<ButtonOutcome, ChatError> {
        if self.is_closed() {
            return Err(ChatError::Closed);
        }
        match button.quick_reply() {
            QuickReply::Dial(number) => {
                self.dialer.dial(number);
                Ok(ButtonOutcome::Dialed(number.to_string()))
            }
            QuickReply::Utterance(text) => {
                self.submit(text)?;
                Ok(ButtonOutcome::Submitted)
            }
        }
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.state.subscribe()
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> ConversationState {
        self.state.borrow().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.borrow().is_closed()
    }

    /// Wait until no request is pending (or the conversation is closed) and
    /// return the state at that point.
    pub async fn wait_idle(&self) -> ConversationState {
        let mut rx = self.subscribe();
        let state = match rx.wait_for(|s| !s.pending() || s.is_closed()).await {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        };
        state
    }

    /// Cancel all in-flight work. Idempotent.
    ///
    /// No transcript change can happen after this returns.
    pub fn close(&self) {
        if self.state.send_if_modified(|s| s.close()) {
            info!(session = %self.session_id, "Conversation closed");
        }
        self.worker.abort();
    }
}

impl Drop for ChatOrchestrator {
    fn drop(&mut self) {
        self.close();
    }
}

// =============================================================================
// Worker
// =============================================================================

/// Aborts the request task when the worker stops waiting for it.
struct InFlight(JoinHandle<()>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.abort();
    }
}

struct Worker {
    session_id: String,
    state: Arc<watch::Sender<ConversationState>>,
    engine: TriageEngine,
    remote: Arc<dyn RemoteBackend>,
    remote_timeout: Duration,
    fragment_delay: Duration,
}

impl Worker {
    async fn run(self: Arc<Self>, mut queue: mpsc::UnboundedReceiver<String>) {
        let mut closed = self.state.subscribe();
        loop {
            let utterance = tokio::select! {
                biased;
                _ = closed.wait_for(|s| s.is_closed()) => break,
                next = queue.recv() => match next {
                    Some(utterance) => utterance,
                    None => break,
                },
            };

            // A panic in the request task surfaces here as a JoinError.
            let mut request = InFlight(tokio::spawn(Arc::clone(&self).process(utterance)));
            tokio::select! {
                biased;
                _ = closed.wait_for(|s| s.is_closed()) => break,
                joined = &mut request.0 => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            warn!(session = %self.session_id, "Request handling panicked, apologizing");
                            self.apologize();
                        }
                    }
                }
            }
        }
        debug!(session = %self.session_id, "Conversation worker stopped");
    }

    async fn process(self: Arc<Self>, utterance: String) {
        if !self.append(Message::user(&utterance), false) {
            return;
        }

        let request = RemoteRequest::new(self.session_id.clone(), &utterance);
        let outcome = match tokio::time::timeout(self.remote_timeout, self.remote.send(&request)).await
        {
            Ok(result) => result,
            Err(_) => Err(ChatError::RemoteUnavailable(format!(
                "no reply within {} ms",
                self.remote_timeout.as_millis()
            ))),
        };

        match outcome {
            Ok(fragments) if !fragments.is_empty() => self.deliver(fragments).await,
            Ok(_) => {
                warn!("Remote backend returned no fragments, answering locally");
                self.answer_locally(&utterance);
            }
            Err(e) => {
                warn!("Remote backend failed: {}. Answering locally", e);
                self.answer_locally(&utterance);
            }
        }
    }

    /// Append fragments in order, one delay apart. The last one completes the
    /// request.
    async fn deliver(&self, fragments: Vec<Fragment>) {
        let last = fragments.len().saturating_sub(1);
        for (i, fragment) in fragments.into_iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.fragment_delay).await;
            }
            let category = fragment
                .category
                .unwrap_or_else(|| self.engine.classifier().infer_category(&fragment.text));
            let payload = ResponsePayload::new(fragment.text, category)
                .with_buttons(fragment.buttons)
                .with_image(fragment.image);
            debug!(index = i, category = %category, "Delivering fragment");
            if !self.append(Message::bot(payload), i == last) {
                return;
            }
        }
    }

    fn answer_locally(&self, utterance: &str) {
        match self.engine.synthesize(utterance) {
            Ok(payload) => {
                self.append(Message::bot(payload), true);
            }
            Err(e) => {
                warn!("Local synthesis failed: {}", e);
                self.apologize();
            }
        }
    }

    /// Complete the current request with the static apology.
    fn apologize(&self) {
        self.append(Message::bot(self.engine.resolver().apology()), true);
    }

    /// Append under the state lock. When `completes` is set the request is
    /// finished in the same critical section, so observers never see the
    /// final reply while still pending.
    fn append(&self, message: Message, completes: bool) -> bool {
        let mut appended = false;
        self.state.send_if_modified(|s| {
            appended = s.append(message);
            if appended && completes {
                s.finish();
            }
            appended
        });
        appended
    }
}

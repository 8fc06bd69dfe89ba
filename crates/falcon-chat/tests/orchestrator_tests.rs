//! End-to-end conversation tests against scripted backends.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use falcon_chat::{
    ButtonOutcome, ChatError, ChatOrchestrator, ConversationState, Dialer, Fragment,
    RemoteBackend, RemoteRequest, TriageEngine,
};
use falcon_core::config::EmergencyConfig;
use falcon_core::types::{Category, Sender};
use falcon_core::FalconConfig;

const WAIT: Duration = Duration::from_secs(5);

type Reply = Box<dyn Fn(&RemoteRequest) -> Result<Vec<Fragment>, ChatError> + Send + Sync>;

struct TestBackend {
    delay: Duration,
    reply: Reply,
    requests: Mutex<Vec<RemoteRequest>>,
}

impl TestBackend {
    fn new(reply: Reply) -> Arc<Self> {
        Self::slow(Duration::ZERO, reply)
    }

    fn slow(delay: Duration, reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            delay,
            reply,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<RemoteRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteBackend for TestBackend {
    async fn send(&self, request: &RemoteRequest) -> Result<Vec<Fragment>, ChatError> {
        self.requests.lock().unwrap().push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.reply)(request)
    }
}

#[derive(Default)]
struct RecordingDialer(Mutex<Vec<String>>);

impl Dialer for RecordingDialer {
    fn dial(&self, number: &str) {
        self.0.lock().unwrap().push(number.to_string());
    }
}

fn config(fragment_delay_ms: u64, timeout_ms: u64) -> FalconConfig {
    let mut config = FalconConfig::default();
    config.delivery.fragment_delay_ms = fragment_delay_ms;
    config.remote.timeout_ms = timeout_ms;
    config
}

fn fragments(texts: &[&str]) -> Vec<Fragment> {
    texts.iter().map(|t| Fragment::text(*t)).collect()
}

async fn idle(chat: &ChatOrchestrator) -> ConversationState {
    tokio::time::timeout(WAIT, chat.wait_idle())
        .await
        .expect("conversation should go idle")
}

async fn wait_for_len(chat: &ChatOrchestrator, len: usize) {
    let mut rx = chat.subscribe();
    tokio::time::timeout(WAIT, rx.wait_for(|s| s.len() >= len))
        .await
        .expect("transcript should grow")
        .expect("state channel open");
}

fn texts(state: &ConversationState) -> Vec<String> {
    state
        .transcript()
        .iter()
        .map(|m| m.text().to_string())
        .collect()
}

// ---- remote delivery ----

#[tokio::test]
async fn test_remote_fragments_delivered_in_order() {
    let backend = TestBackend::new(Box::new(|_: &RemoteRequest| {
        let mut reply = fragments(&["🚨 first", "second", "third"]);
        reply[1].category = Some(Category::Vaccination);
        Ok(reply)
    }));
    let chat = ChatOrchestrator::open(&config(10, 2_000), backend.clone());

    chat.submit("help me").unwrap();
    let state = idle(&chat).await;

    assert_eq!(
        texts(&state)[1..],
        ["help me", "🚨 first", "second", "third"]
    );
    let categories: Vec<Option<Category>> =
        state.transcript().iter().map(|m| m.category()).collect();
    assert_eq!(
        categories,
        vec![
            Some(Category::Greeting),
            None,
            Some(Category::Emergency),
            Some(Category::Vaccination),
            Some(Category::General),
        ]
    );

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].session_id, chat.session_id().to_string());
    assert_eq!(requests[0].message, "help me");
}

#[tokio::test]
async fn test_fragments_are_staggered() {
    let backend = TestBackend::new(Box::new(|_: &RemoteRequest| Ok(fragments(&["a", "b", "c"]))));
    let chat = ChatOrchestrator::open(&config(60, 2_000), backend);

    let started = tokio::time::Instant::now();
    chat.submit("fever").unwrap();
    idle(&chat).await;
    assert!(started.elapsed() >= Duration::from_millis(120));
}

#[tokio::test]
async fn test_remote_buttons_and_image_are_kept() {
    let backend = TestBackend::new(Box::new(|_: &RemoteRequest| {
        let mut fragment = Fragment::text("🏥 Nearby");
        fragment.buttons = vec![falcon_core::types::Button::new("Map", "show map")];
        fragment.image = Some("https://example.org/map.png".to_string());
        Ok(vec![fragment])
    }));
    let chat = ChatOrchestrator::open(&config(10, 2_000), backend);
    chat.submit("hospital").unwrap();
    let state = idle(&chat).await;
    let reply = &state.transcript()[2];
    assert_eq!(reply.category(), Some(Category::Hospital));
    assert_eq!(reply.buttons()[0].payload, "show map");
    assert_eq!(reply.image(), Some("https://example.org/map.png"));
}

// ---- fallback ----

#[tokio::test]
async fn test_empty_remote_reply_falls_back_once() {
    let backend = TestBackend::new(Box::new(|_: &RemoteRequest| Ok(Vec::new())));
    let chat = ChatOrchestrator::open(&config(10, 2_000), backend);

    chat.submit("where can I get the vaccine").unwrap();
    let state = idle(&chat).await;

    assert_eq!(state.len(), 3);
    let reply = &state.transcript()[2];
    assert_eq!(reply.sender(), Sender::Bot);
    assert_eq!(reply.category(), Some(Category::Vaccination));
    assert!(reply.suggestions().contains(&"COVID vaccine".to_string()));
    assert!(reply.suggestions().contains(&"Find centers".to_string()));
}

#[tokio::test]
async fn test_failing_remote_falls_back() {
    let backend = TestBackend::new(Box::new(|_: &RemoteRequest| {
        Err(ChatError::RemoteMalformed("not an array".to_string()))
    }));
    let chat = ChatOrchestrator::open(&config(10, 2_000), backend);

    chat.submit("सीने में दर्द").unwrap();
    let state = idle(&chat).await;

    assert_eq!(state.len(), 3);
    let reply = &state.transcript()[2];
    assert_eq!(reply.category(), Some(Category::Emergency));
    assert_eq!(reply.buttons()[0].payload, "tel:108");
    assert!(!state.pending());
}

#[tokio::test]
async fn test_remote_timeout_falls_back() {
    let backend = TestBackend::slow(
        Duration::from_secs(2),
        Box::new(|_: &RemoteRequest| Ok(fragments(&["too late"]))),
    );
    let chat = ChatOrchestrator::open(&config(10, 50), backend);

    chat.submit("I have fever").unwrap();
    let state = idle(&chat).await;

    assert_eq!(state.len(), 3);
    assert_eq!(state.transcript()[2].category(), Some(Category::Symptom));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!texts(&chat.snapshot()).contains(&"too late".to_string()));
}

#[tokio::test]
async fn test_configured_numbers_reach_fallback_buttons() {
    let mut config = config(10, 2_000);
    config.emergency.ambulance_number = "102".to_string();
    let chat = ChatOrchestrator::open(&config, Arc::new(falcon_chat::OfflineBackend));
    chat.submit("heart attack").unwrap();
    let state = idle(&chat).await;
    assert_eq!(state.transcript()[2].buttons()[0].payload, "tel:102");
}

struct PanickingBackend;

#[async_trait]
impl RemoteBackend for PanickingBackend {
    async fn send(&self, _request: &RemoteRequest) -> Result<Vec<Fragment>, ChatError> {
        panic!("backend crashed");
    }
}

#[tokio::test]
async fn test_panicking_remote_apologizes_and_stays_open() {
    let chat = ChatOrchestrator::open(&config(10, 2_000), Arc::new(PanickingBackend));

    chat.submit("fever").unwrap();
    let state = idle(&chat).await;
    assert!(!state.pending());
    assert!(!state.is_closed());
    assert_eq!(state.len(), 3);
    assert_eq!(state.transcript()[1].text(), "fever");
    let reply = &state.transcript()[2];
    assert_eq!(reply.sender(), Sender::Bot);
    assert_eq!(reply.category(), Some(Category::Fallback));
    assert_eq!(reply.text(), apology_text());

    // The conversation keeps working after a crashed request.
    chat.submit("cough").unwrap();
    let state = idle(&chat).await;
    assert!(!state.pending());
    assert_eq!(texts(&state)[3], "cough");
    assert_eq!(state.transcript()[4].category(), Some(Category::Fallback));
    assert_eq!(state.len(), 5);
}

#[tokio::test]
async fn test_panic_after_healthy_reply_does_not_leak_pending() {
    let backend = TestBackend::new(Box::new(|req: &RemoteRequest| {
        if req.message == "crash" {
            panic!("backend crashed");
        }
        Ok(fragments(&["ok"]))
    }));
    let chat = ChatOrchestrator::open(&config(10, 2_000), backend);

    chat.submit("crash").unwrap();
    chat.submit("hello").unwrap();
    let state = idle(&chat).await;

    assert_eq!(
        texts(&state)[1..3],
        ["crash".to_string(), apology_text()]
    );
    assert_eq!(texts(&state)[3..], ["hello", "ok"]);
    assert!(!state.pending());
}

fn apology_text() -> String {
    TriageEngine::new(&EmergencyConfig::default())
        .resolver()
        .apology()
        .text
}

// ---- ordering and pending ----

#[tokio::test]
async fn test_sequential_submissions_never_interleave() {
    let backend = TestBackend::slow(
        Duration::from_millis(20),
        Box::new(|req: &RemoteRequest| {
            if req.message.contains("offline") {
                Err(ChatError::RemoteUnavailable("down".to_string()))
            } else {
                Ok(vec![
                    Fragment::text(format!("{} / 1", req.message)),
                    Fragment::text(format!("{} / 2", req.message)),
                ])
            }
        }),
    );
    let chat = ChatOrchestrator::open(&config(10, 2_000), backend.clone());

    chat.submit("one").unwrap();
    chat.submit("two offline").unwrap();
    chat.submit("three").unwrap();

    // Only the first request is in flight; the others wait their turn.
    let early = chat.snapshot();
    assert!(early.pending());
    assert!(!texts(&early).contains(&"two offline".to_string()));

    let state = idle(&chat).await;
    let all = texts(&state);
    assert_eq!(all[1..4], ["one", "one / 1", "one / 2"]);
    assert_eq!(all[4], "two offline");
    assert_eq!(state.transcript()[5].sender(), Sender::Bot);
    assert_eq!(all[6..], ["three", "three / 1", "three / 2"]);
    assert_eq!(state.len(), 9);

    let order: Vec<String> = backend.requests().into_iter().map(|r| r.message).collect();
    assert_eq!(order, vec!["one", "two offline", "three"]);
}

#[tokio::test]
async fn test_pending_true_until_last_append() {
    let backend = TestBackend::new(Box::new(|_: &RemoteRequest| Ok(fragments(&["a", "b", "c"]))));
    let chat = ChatOrchestrator::open(&config(15, 2_000), backend);

    let mut rx = chat.subscribe();
    let observer = tokio::spawn(async move {
        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update();
            seen.push((state.len(), state.pending()));
            if state.len() == 5 && !state.pending() {
                break;
            }
        }
        seen
    });

    chat.submit("fever").unwrap();
    let seen = tokio::time::timeout(WAIT, observer).await.unwrap().unwrap();

    assert_eq!(seen.last(), Some(&(5, false)));
    for (len, pending) in &seen[..seen.len() - 1] {
        assert!(*len < 5);
        assert!(*pending, "state with {} messages was not pending", len);
    }
}

#[tokio::test]
async fn test_pending_clears_after_failure() {
    let backend = TestBackend::new(Box::new(|_: &RemoteRequest| {
        Err(ChatError::RemoteUnavailable("refused".to_string()))
    }));
    let chat = ChatOrchestrator::open(&config(10, 2_000), backend);
    chat.submit("asdf").unwrap();
    let state = idle(&chat).await;
    assert!(!state.pending());
    assert_eq!(state.transcript()[2].category(), Some(Category::General));
}

#[tokio::test]
async fn test_blank_input_changes_nothing() {
    let chat = ChatOrchestrator::open(&config(10, 2_000), Arc::new(falcon_chat::OfflineBackend));
    let rx = chat.subscribe();
    assert!(matches!(chat.submit(""), Err(ChatError::InputRejected)));
    assert!(matches!(chat.submit("   "), Err(ChatError::InputRejected)));
    assert!(!rx.has_changed().unwrap());
    assert_eq!(chat.snapshot().len(), 1);
    assert!(!chat.snapshot().pending());
}

// ---- quick actions ----

#[tokio::test]
async fn test_emergency_button_dials_without_transcript_change() {
    let dialer = Arc::new(RecordingDialer::default());
    let chat = ChatOrchestrator::open(&config(10, 2_000), Arc::new(falcon_chat::OfflineBackend))
        .with_dialer(dialer.clone());

    chat.submit("I have chest pain").unwrap();
    let state = idle(&chat).await;
    let reply = state.last_bot_message().unwrap();
    assert_eq!(reply.category(), Some(Category::Emergency));

    let first = reply.buttons()[0].clone();
    assert_eq!(chat.press(&first).unwrap(), ButtonOutcome::Dialed("108".to_string()));
    assert_eq!(*dialer.0.lock().unwrap(), vec!["108".to_string()]);
    assert_eq!(chat.snapshot().len(), state.len());
}

#[tokio::test]
async fn test_menu_button_and_suggestion_resubmit() {
    let chat = ChatOrchestrator::open(&config(10, 2_000), Arc::new(falcon_chat::OfflineBackend));

    chat.submit("hello").unwrap();
    let state = idle(&chat).await;
    let menu = state.last_bot_message().unwrap().buttons().to_vec();
    let vaccination = menu.iter().find(|b| b.payload == "vaccination info").unwrap();
    assert_eq!(chat.press(vaccination).unwrap(), ButtonOutcome::Submitted);

    let state = idle(&chat).await;
    let reply = state.last_bot_message().unwrap();
    assert_eq!(reply.category(), Some(Category::Vaccination));

    let suggestion = reply.suggestions()[2].clone();
    assert_eq!(suggestion, "Find centers");
    chat.submit(&suggestion).unwrap();
    let state = idle(&chat).await;
    assert_eq!(state.transcript()[state.len() - 2].text(), "Find centers");
    assert_eq!(
        state.last_bot_message().unwrap().category(),
        Some(Category::Vaccination)
    );
}

// ---- cancellation ----

#[tokio::test]
async fn test_close_during_staggered_delivery() {
    let backend = TestBackend::new(Box::new(|_: &RemoteRequest| Ok(fragments(&["a", "b", "c"]))));
    let chat = ChatOrchestrator::open(&config(200, 2_000), backend);

    chat.submit("fever").unwrap();
    wait_for_len(&chat, 3).await;
    chat.close();
    let frozen = chat.snapshot();

    tokio::time::sleep(Duration::from_millis(600)).await;
    let state = chat.snapshot();
    assert!(state.is_closed());
    assert!(!state.pending());
    assert_eq!(state.len(), frozen.len());
    assert!(!texts(&state).contains(&"c".to_string()));
}

#[tokio::test]
async fn test_close_during_remote_call() {
    let backend = TestBackend::slow(
        Duration::from_millis(300),
        Box::new(|_: &RemoteRequest| Ok(fragments(&["late reply"]))),
    );
    let chat = ChatOrchestrator::open(&config(10, 2_000), backend);

    chat.submit("fever").unwrap();
    wait_for_len(&chat, 2).await;
    chat.close();

    tokio::time::sleep(Duration::from_millis(500)).await;
    let state = chat.snapshot();
    assert_eq!(state.len(), 2);
    assert!(!state.pending());
    assert!(matches!(chat.submit("again"), Err(ChatError::Closed)));
}

#[tokio::test]
async fn test_drop_cancels_in_flight_work() {
    let backend = TestBackend::slow(
        Duration::from_millis(200),
        Box::new(|_: &RemoteRequest| Ok(fragments(&["late reply"]))),
    );
    let chat = ChatOrchestrator::open(&config(10, 2_000), backend);
    let rx = chat.subscribe();

    chat.submit("fever").unwrap();
    drop(chat);

    tokio::time::sleep(Duration::from_millis(400)).await;
    let state = rx.borrow();
    assert!(state.is_closed());
    assert!(!state.pending());
    assert!(state.len() <= 2);
}

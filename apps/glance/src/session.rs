//! Session orchestration
//!
//! Turns triggers into full flows: capture a frame, dispatch it, present the
//! outcome. One flow at a time: a busy flag rejects triggers that arrive
//! while a request is in flight, so the rotation core never sees overlapping
//! calls from this process. Generation results are retained for the typing
//! engine; classification results are display-only.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use capability::{FrameSource, StatusSink};
use gemini_client::{RequestCategory, build_payload};
use gemini_pool::RotationClient;
use tracing::{debug, info, warn};

use crate::text;
use crate::typing::{ToggleOutcome, TypingEngine};

const STATUS_BRIEF: Duration = Duration::from_secs(2);
const STATUS_WORKING: Duration = Duration::from_secs(10);
const STATUS_RESULT: Duration = Duration::from_secs(5);
const STATUS_ERROR: Duration = Duration::from_secs(3);

/// A command from the trigger collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Capture and answer the on-screen question
    Classify,
    /// Capture and generate a code solution
    Generate,
    /// Start, pause, or resume typing the last solution
    ToggleType,
    /// Shut the process down
    Quit,
}

impl Trigger {
    /// Parse a trigger line. Unknown input is None.
    pub fn parse(line: &str) -> Option<Trigger> {
        match line.trim().to_ascii_lowercase().as_str() {
            "answer" | "a" => Some(Trigger::Classify),
            "code" | "c" => Some(Trigger::Generate),
            "type" | "t" => Some(Trigger::ToggleType),
            "quit" | "q" | "exit" => Some(Trigger::Quit),
            _ => None,
        }
    }
}

/// Clears the busy flag when a flow ends, on every exit path.
struct BusyGuard<'a>(&'a Mutex<Option<RequestCategory>>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.0.lock().expect("busy flag poisoned") = None;
    }
}

/// One user-facing session: capture, dispatch, present, type.
pub struct Session {
    client: Arc<RotationClient>,
    frames: Arc<dyn FrameSource>,
    status: Arc<dyn StatusSink>,
    typing: TypingEngine,
    busy: Mutex<Option<RequestCategory>>,
    last_solution: Mutex<Option<String>>,
}

impl Session {
    pub fn new(
        client: Arc<RotationClient>,
        frames: Arc<dyn FrameSource>,
        status: Arc<dyn StatusSink>,
        typing: TypingEngine,
    ) -> Self {
        Self {
            client,
            frames,
            status,
            typing,
            busy: Mutex::new(None),
            last_solution: Mutex::new(None),
        }
    }

    /// Run one trigger to completion.
    pub async fn handle(&self, trigger: Trigger) {
        match trigger {
            Trigger::Classify => self.run_request(RequestCategory::Classification).await,
            Trigger::Generate => self.run_request(RequestCategory::Generation).await,
            Trigger::ToggleType => self.toggle_typing(),
            Trigger::Quit => debug!("quit trigger reached session, ignoring"),
        }
    }

    async fn run_request(&self, category: RequestCategory) {
        let Some(_guard) = self.try_begin(category) else {
            return;
        };

        self.status.show("Capturing screen…", STATUS_BRIEF);
        let frame = match self.frames.grab().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "frame capture failed");
                self.status.show(&format!("Capture failed: {e}"), STATUS_ERROR);
                return;
            }
        };

        match category {
            RequestCategory::Classification => {
                self.status.show("Analyzing question…", STATUS_WORKING)
            }
            RequestCategory::Generation => {
                self.status.show("Generating solution…", STATUS_WORKING)
            }
        }

        let payload = build_payload(&frame, category);
        match self.client.dispatch(&payload, category).await {
            Ok(answer) => self.present(category, answer),
            Err(e) => {
                warn!(category = category.label(), error = %e, "dispatch failed");
                self.status.show(&e.to_string(), STATUS_ERROR);
            }
        }
    }

    fn present(&self, category: RequestCategory, answer: String) {
        match category {
            RequestCategory::Classification => {
                info!(chars = answer.len(), "answer ready");
                self.status.show(&answer, STATUS_RESULT);
            }
            RequestCategory::Generation => {
                let cleaned = text::strip_markdown_fences(&answer);
                if cleaned.is_empty() {
                    warn!("generation returned an empty solution");
                    self.status.show("Empty solution returned", STATUS_ERROR);
                    return;
                }
                info!(chars = cleaned.len(), "solution ready");
                *self.last_solution.lock().expect("solution lock poisoned") = Some(cleaned);
                self.status
                    .show("Solution ready, trigger typing to replay", STATUS_RESULT);
            }
        }
    }

    /// Claim the busy flag, or report which flow is already running.
    fn try_begin(&self, category: RequestCategory) -> Option<BusyGuard<'_>> {
        let mut busy = self.busy.lock().expect("busy flag poisoned");
        if let Some(running) = *busy {
            debug!(
                running = running.label(),
                requested = category.label(),
                "trigger dropped, flow in progress"
            );
            let message = match running {
                RequestCategory::Classification => "Analysis already in progress",
                RequestCategory::Generation => "Generation already in progress",
            };
            self.status.show(message, STATUS_BRIEF);
            return None;
        }
        *busy = Some(category);
        Some(BusyGuard(&self.busy))
    }

    fn toggle_typing(&self) {
        let solution = self
            .last_solution
            .lock()
            .expect("solution lock poisoned")
            .clone();
        let prepared = solution.map(|s| text::comment_prefix(&s));
        let message = match self.typing.toggle(prepared.as_deref()) {
            ToggleOutcome::NoSolution => "No solution yet, run generation first".to_string(),
            ToggleOutcome::Started { total } => {
                format!("Typing {total} keys, trigger again to pause")
            }
            ToggleOutcome::Paused { remaining } => format!("Paused, {remaining} keys left"),
            ToggleOutcome::Resumed { remaining } => format!("Resumed, {remaining} keys left"),
        };
        self.status.show(&message, STATUS_BRIEF);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capability::{CapabilityError, KeySink, KeyTap};
    use common::Secret;
    use gemini_client::{GenerateRequest, HttpReply, Transport, TransportFailure};
    use gemini_pool::{CategoryModels, KeyPool};
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Instant;

    struct StaticFrames(Vec<u8>);

    impl FrameSource for StaticFrames {
        fn id(&self) -> &str {
            "static"
        }

        fn grab(&self) -> Pin<Box<dyn Future<Output = capability::Result<Vec<u8>>> + Send + '_>> {
            let bytes = self.0.clone();
            Box::pin(async move { Ok(bytes) })
        }
    }

    struct NoFrames;

    impl FrameSource for NoFrames {
        fn id(&self) -> &str {
            "none"
        }

        fn grab(&self) -> Pin<Box<dyn Future<Output = capability::Result<Vec<u8>>> + Send + '_>> {
            Box::pin(async { Err(CapabilityError::NoFrame("nothing captured".into())) })
        }
    }

    struct RecordingStatus {
        messages: Mutex<Vec<String>>,
    }

    impl RecordingStatus {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                messages: Mutex::new(Vec::new()),
            })
        }

        fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }

        fn contains(&self, needle: &str) -> bool {
            self.messages().iter().any(|m| m.contains(needle))
        }
    }

    impl StatusSink for RecordingStatus {
        fn show(&self, message: &str, _duration: Duration) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    struct CollectingSink {
        taps: Mutex<Vec<KeyTap>>,
    }

    impl CollectingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                taps: Mutex::new(Vec::new()),
            })
        }

        fn typed(&self) -> String {
            self.taps
                .lock()
                .unwrap()
                .iter()
                .map(|t| match t {
                    KeyTap::Char(c) => *c,
                    KeyTap::Enter => '\n',
                })
                .collect()
        }
    }

    impl KeySink for CollectingSink {
        fn tap(&self, tap: KeyTap) -> capability::Result<()> {
            self.taps.lock().unwrap().push(tap);
            Ok(())
        }
    }

    /// Transport that always answers with one reply, after an optional delay.
    struct FixedTransport {
        status: u16,
        body: String,
        delay: Duration,
    }

    impl FixedTransport {
        fn success(text: &str) -> Arc<Self> {
            Arc::new(Self {
                status: 200,
                body: serde_json::json!({
                    "candidates": [{"content": {"parts": [{"text": text}]}}]
                })
                .to_string(),
                delay: Duration::ZERO,
            })
        }

        fn status(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                status,
                body: body.to_string(),
                delay: Duration::ZERO,
            })
        }
    }

    impl Transport for FixedTransport {
        fn execute<'a>(
            &'a self,
            _url: &'a str,
            _body: &'a GenerateRequest,
            _timeout: Duration,
        ) -> Pin<
            Box<dyn Future<Output = Result<HttpReply, TransportFailure>> + Send + 'a>,
        > {
            Box::pin(async move {
                if !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }
                Ok(HttpReply {
                    status: self.status,
                    body: self.body.clone(),
                })
            })
        }
    }

    fn client(transport: Arc<dyn Transport>) -> Arc<RotationClient> {
        let pool = KeyPool::new(vec![Secret::new("session-key-0001".to_string())]);
        pool.set_active(0);
        Arc::new(
            RotationClient::new(pool, transport, CategoryModels::default())
                .with_base_url("http://gemini.test"),
        )
    }

    fn session(
        transport: Arc<dyn Transport>,
        frames: Arc<dyn FrameSource>,
        status: Arc<RecordingStatus>,
        sink: Arc<dyn KeySink>,
    ) -> Session {
        let typing = TypingEngine::new(sink, status.clone(), Duration::from_millis(1));
        Session::new(client(transport), frames, status, typing)
    }

    #[test]
    fn trigger_parsing_accepts_aliases() {
        assert_eq!(Trigger::parse("answer"), Some(Trigger::Classify));
        assert_eq!(Trigger::parse("  A "), Some(Trigger::Classify));
        assert_eq!(Trigger::parse("code"), Some(Trigger::Generate));
        assert_eq!(Trigger::parse("type"), Some(Trigger::ToggleType));
        assert_eq!(Trigger::parse("quit"), Some(Trigger::Quit));
        assert_eq!(Trigger::parse("exit"), Some(Trigger::Quit));
        assert_eq!(Trigger::parse("dance"), None);
        assert_eq!(Trigger::parse(""), None);
    }

    #[tokio::test]
    async fn classification_flow_shows_the_answer() {
        let status = RecordingStatus::new();
        let session = session(
            FixedTransport::success("1A 2C"),
            Arc::new(StaticFrames(b"png".to_vec())),
            status.clone(),
            CollectingSink::new(),
        );

        session.handle(Trigger::Classify).await;

        let messages = status.messages();
        assert!(messages[0].contains("Capturing"));
        assert!(messages[1].contains("Analyzing"));
        assert_eq!(messages[2], "1A 2C");
    }

    #[tokio::test]
    async fn generation_flow_stores_cleaned_solution() {
        let status = RecordingStatus::new();
        let sink = CollectingSink::new();
        let session = session(
            FixedTransport::success("```python\nprint(1)\n```"),
            Arc::new(StaticFrames(b"png".to_vec())),
            status.clone(),
            sink.clone(),
        );

        session.handle(Trigger::Generate).await;
        assert!(status.contains("Solution ready"));

        // Typing replays the comment-prefixed solution
        session.handle(Trigger::ToggleType).await;
        let deadline = Instant::now() + Duration::from_secs(5);
        while sink.typed().len() < "# print(1)".len() {
            assert!(Instant::now() < deadline, "replay did not run");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(sink.typed(), "# print(1)");
    }

    #[tokio::test]
    async fn dispatch_error_surfaces_as_status_text() {
        let status = RecordingStatus::new();
        let session = session(
            FixedTransport::status(500, "boom"),
            Arc::new(StaticFrames(b"png".to_vec())),
            status.clone(),
            CollectingSink::new(),
        );

        session.handle(Trigger::Classify).await;
        assert!(status.contains("unexpected status 500"));
    }

    #[tokio::test]
    async fn capture_failure_surfaces_without_dispatch() {
        let status = RecordingStatus::new();
        let session = session(
            FixedTransport::success("never used"),
            Arc::new(NoFrames),
            status.clone(),
            CollectingSink::new(),
        );

        session.handle(Trigger::Classify).await;
        assert!(status.contains("Capture failed"));
        assert!(!status.contains("never used"));
    }

    #[tokio::test]
    async fn concurrent_trigger_is_dropped_with_a_notice() {
        let status = RecordingStatus::new();
        let slow = Arc::new(FixedTransport {
            status: 200,
            body: serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "late"}]}}]
            })
            .to_string(),
            delay: Duration::from_millis(150),
        });
        let session = Arc::new(session(
            slow,
            Arc::new(StaticFrames(b"png".to_vec())),
            status.clone(),
            CollectingSink::new(),
        ));

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.handle(Trigger::Classify).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        session.handle(Trigger::Generate).await;
        first.await.unwrap();

        assert!(status.contains("Analysis already in progress"));
        assert!(status.contains("late"));
    }

    #[tokio::test]
    async fn typing_without_solution_reports_nothing_to_type() {
        let status = RecordingStatus::new();
        let session = session(
            FixedTransport::success("unused"),
            Arc::new(StaticFrames(b"png".to_vec())),
            status.clone(),
            CollectingSink::new(),
        );

        session.handle(Trigger::ToggleType).await;
        assert!(status.contains("No solution yet"));
    }

    #[tokio::test]
    async fn empty_generation_result_is_not_stored() {
        let status = RecordingStatus::new();
        let session = session(
            FixedTransport::success("```\n```"),
            Arc::new(StaticFrames(b"png".to_vec())),
            status.clone(),
            CollectingSink::new(),
        );

        session.handle(Trigger::Generate).await;
        assert!(status.contains("Empty solution returned"));

        session.handle(Trigger::ToggleType).await;
        assert!(status.contains("No solution yet"));
    }
}

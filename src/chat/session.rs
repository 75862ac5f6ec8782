//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns one
//! conversation: its history, the completion backend, and the scheduler that
//! presents each reply.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::Error;
use crate::chat::config::ChatConfig;
use crate::client::{CompletionBackend, Gemini};
use crate::client_logger::ClientLogger;
use crate::history::History;
use crate::markdown::{contains_block_code, transform};
use crate::observability::{SESSION_CODE_BLOCKS, SESSION_FAILURES, SESSION_TURNS};
use crate::render::{
    Highlighter, MessageSlot, RenderMode, RenderOutcome, RenderScheduler, TranscriptView,
};
use crate::types::{Role, Turn};

/// How one submission ended.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The input was blank; nothing was sent.
    Empty,
    /// The model replied and the reply was rendered.
    Replied(RenderOutcome),
    /// The request failed; the error is shown in the reply slot.
    Failed(Error),
}

impl TurnOutcome {
    /// Returns the error of a failed turn.
    pub fn error(&self) -> Option<&Error> {
        match self {
            TurnOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    /// The model used for the session.
    pub model: String,
    /// The number of turns in the conversation.
    pub turn_count: usize,
    /// Turns sent by the user.
    pub user_turns: usize,
    /// Turns answered by the model.
    pub model_turns: usize,
    /// Requests sent to the backend.
    pub total_requests: u64,
    /// Requests that ended in an error.
    pub failed_requests: u64,
    /// Replies rendered all at once.
    pub instant_renders: u64,
    /// Replies typed out word by word.
    pub typed_renders: u64,
    /// Whether the typing animation is enabled.
    pub typing_enabled: bool,
    /// Time between revealed words.
    pub typing_interval: Duration,
}

/// A chat session that manages conversation state and backend interactions.
///
/// User turns are recorded before the request goes out and are kept even
/// when it fails.  Model turns are recorded as the rendered HTML.
pub struct ChatSession<B: CompletionBackend = Gemini> {
    backend: B,
    history: History,
    scheduler: RenderScheduler,
    config: ChatConfig,
    logger: Option<Arc<dyn ClientLogger>>,
    request_count: u64,
    failure_count: u64,
    instant_renders: u64,
    typed_renders: u64,
}

impl<B: CompletionBackend> ChatSession<B> {
    /// Creates a new chat session with the given backend and configuration.
    pub fn new(backend: B, config: ChatConfig) -> Self {
        let scheduler = RenderScheduler::new()
            .with_interval(config.typing_interval)
            .with_typing(config.typing_enabled);
        Self {
            backend,
            history: History::new(),
            scheduler,
            config,
            logger: None,
            request_count: 0,
            failure_count: 0,
            instant_renders: 0,
            typed_renders: 0,
        }
    }

    /// Logs every failed turn to `logger`.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Highlights block code after it is rendered.
    pub fn with_highlighter(mut self, highlighter: Box<dyn Highlighter>) -> Self {
        self.scheduler = self.scheduler.with_highlighter(highlighter);
        self
    }

    /// Sends a user message and renders the reply into `view`.
    ///
    /// This method:
    /// 1. Shows the message and adds it to history
    /// 2. Opens a loading slot for the reply
    /// 3. Sends the whole history to the backend
    /// 4. Renders the transformed reply into the slot
    /// 5. Adds the transformed reply to history
    ///
    /// Errors never escape: a failed request is shown in the slot and
    /// returned as [`TurnOutcome::Failed`].  Cancelling `cancel` aborts the
    /// request, or finishes an animation that is already running.
    pub async fn submit(
        &mut self,
        input: &str,
        view: &mut dyn TranscriptView,
        cancel: &CancellationToken,
    ) -> TurnOutcome {
        let input = input.trim();
        if input.is_empty() {
            return TurnOutcome::Empty;
        }

        view.append_user(input);
        view.scroll_to_bottom();
        self.history.append(Turn::user(input));

        let mut slot = view.open_reply(&self.config.loading_text);
        view.scroll_to_bottom();

        let snapshot = self.history.snapshot();
        self.request_count += 1;
        let reply = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::abort("request cancelled")),
            reply = self.backend.complete(&snapshot) => reply,
        };
        let raw = match reply {
            Ok(raw) => raw,
            Err(err) => return self.fail(err, slot.as_mut(), view),
        };

        let html = transform(&raw);
        if contains_block_code(&html) {
            SESSION_CODE_BLOCKS.click();
        }
        let outcome = self
            .scheduler
            .render(&html, slot.as_mut(), &mut *view, cancel)
            .await;
        self.history.append(Turn::model(html));
        SESSION_TURNS.click();
        match outcome.mode {
            RenderMode::Instant => self.instant_renders += 1,
            RenderMode::Typing => self.typed_renders += 1,
        }
        TurnOutcome::Replied(outcome)
    }

    fn fail(
        &mut self,
        err: Error,
        slot: &mut dyn MessageSlot,
        view: &mut dyn TranscriptView,
    ) -> TurnOutcome {
        SESSION_FAILURES.click();
        self.failure_count += 1;
        if let Some(logger) = &self.logger {
            logger.log_error(&err);
        }
        slot.show_error(&err.to_string());
        view.scroll_to_bottom();
        TurnOutcome::Failed(err)
    }

    /// The conversation so far.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// The backend requests are sent to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The configuration the session was created with, kept current by the setters.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Returns the number of turns in the conversation.
    pub fn turn_count(&self) -> usize {
        self.history.len()
    }

    /// Sets the model for later requests.
    pub fn set_model(&mut self, model: String) {
        self.config.model = model.clone();
        self.backend.set_model(model);
    }

    /// Returns the current model.
    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// Enables or disables the typing animation.
    pub fn set_typing(&mut self, enabled: bool) {
        self.config.typing_enabled = enabled;
        self.scheduler.set_typing(enabled);
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.model().to_string(),
            turn_count: self.history.len(),
            user_turns: self.history.count(Role::User),
            model_turns: self.history.count(Role::Model),
            total_requests: self.request_count,
            failed_requests: self.failure_count,
            instant_renders: self.instant_renders,
            typed_renders: self.typed_renders,
            typing_enabled: self.scheduler.typing_enabled(),
            typing_interval: self.scheduler.interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::error::Result;
    use crate::render::Viewport;

    struct ScriptedBackend {
        model: String,
        replies: Mutex<VecDeque<Result<String>>>,
        requests: Mutex<Vec<Vec<Turn>>>,
        delay: Option<Duration>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                model: "scripted".to_string(),
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait::async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, history: &[Turn]) -> Result<String> {
            self.requests.lock().unwrap().push(history.to_vec());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::api(500, "script exhausted")))
        }

        fn model(&self) -> &str {
            &self.model
        }

        fn set_model(&mut self, model: String) {
            self.model = model;
        }
    }

    #[derive(Debug, Default)]
    struct SlotState {
        html: String,
        loading: bool,
    }

    struct SharedSlot(Arc<Mutex<SlotState>>);

    impl MessageSlot for SharedSlot {
        fn set_html(&mut self, html: &str) {
            self.0.lock().unwrap().html = html.to_string();
        }

        fn append_html(&mut self, html: &str) {
            self.0.lock().unwrap().html.push_str(html);
        }

        fn finish_loading(&mut self) {
            self.0.lock().unwrap().loading = false;
        }
    }

    #[derive(Default)]
    struct RecordingView {
        users: Vec<String>,
        slots: Vec<Arc<Mutex<SlotState>>>,
        scrolls: usize,
    }

    impl RecordingView {
        fn reply(&self, index: usize) -> (String, bool) {
            let state = self.slots[index].lock().unwrap();
            (state.html.clone(), state.loading)
        }
    }

    impl Viewport for RecordingView {
        fn scroll_to_bottom(&mut self) {
            self.scrolls += 1;
        }
    }

    impl TranscriptView for RecordingView {
        fn append_user(&mut self, text: &str) {
            self.users.push(text.to_string());
        }

        fn open_reply(&mut self, loading_text: &str) -> Box<dyn MessageSlot> {
            let state = Arc::new(Mutex::new(SlotState {
                html: loading_text.to_string(),
                loading: true,
            }));
            self.slots.push(Arc::clone(&state));
            Box::new(SharedSlot(state))
        }
    }

    fn session(replies: Vec<Result<String>>) -> ChatSession<ScriptedBackend> {
        ChatSession::new(ScriptedBackend::new(replies), ChatConfig::new())
    }

    #[tokio::test(start_paused = true)]
    async fn turns_alternate_user_and_model() {
        let mut session = session(vec![
            Ok("Hi!".to_string()),
            Ok("Sure.".to_string()),
            Ok("Bye.".to_string()),
        ]);
        let mut view = RecordingView::default();
        let cancel = CancellationToken::new();

        for input in ["hello", "help me", "bye"] {
            let outcome = session.submit(input, &mut view, &cancel).await;
            assert!(matches!(outcome, TurnOutcome::Replied(_)));
        }

        let roles: Vec<Role> = session.history().iter().map(Turn::role).collect();
        assert_eq!(
            roles,
            vec![
                Role::User,
                Role::Model,
                Role::User,
                Role::Model,
                Role::User,
                Role::Model
            ]
        );
        assert_eq!(session.turn_count(), 6);
        assert_eq!(view.users, vec!["hello", "help me", "bye"]);
    }

    #[tokio::test(start_paused = true)]
    async fn every_request_carries_the_full_history() {
        let mut session = session(vec![Ok("**one**".to_string()), Ok("two".to_string())]);
        let mut view = RecordingView::default();
        let cancel = CancellationToken::new();

        session.submit("a", &mut view, &cancel).await;
        session.submit("b", &mut view, &cancel).await;

        let requests = session.backend().requests.lock().unwrap();
        assert_eq!(requests[0], vec![Turn::user("a")]);
        assert_eq!(
            requests[1],
            vec![
                Turn::user("a"),
                Turn::model("<strong>one</strong>"),
                Turn::user("b")
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn history_keeps_the_rendered_html() {
        let mut session = session(vec![Ok("**bold** <b>".to_string())]);
        let mut view = RecordingView::default();
        let outcome = session
            .submit("hi", &mut view, &CancellationToken::new())
            .await;

        let TurnOutcome::Replied(render) = outcome else {
            panic!("expected a reply");
        };
        assert_eq!(render.mode, RenderMode::Typing);
        assert_eq!(
            session.history().last().map(Turn::text),
            Some("<strong>bold</strong> &lt;b&gt;")
        );
        assert_eq!(
            view.reply(0),
            ("<strong>bold</strong> &lt;b&gt;".to_string(), false)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn code_replies_render_instantly() {
        let mut session = session(vec![Ok("```python\nprint(1)\n```".to_string())]);
        let mut view = RecordingView::default();
        let outcome = session
            .submit("code please", &mut view, &CancellationToken::new())
            .await;

        assert!(matches!(
            outcome,
            TurnOutcome::Replied(RenderOutcome {
                mode: RenderMode::Instant,
                ticks: 0,
                ..
            })
        ));
        assert_eq!(session.stats().instant_renders, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_resolves_the_loading_slot() {
        let mut session = session(vec![Err(Error::api(503, "overloaded <retry>"))]);
        let mut view = RecordingView::default();
        let outcome = session
            .submit("hello", &mut view, &CancellationToken::new())
            .await;

        let err = outcome.error().expect("turn should fail");
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(
            view.reply(0),
            (
                "API error (503): overloaded &lt;retry&gt;".to_string(),
                false
            )
        );
        assert_eq!(session.history().turns(), &[Turn::user("hello")]);
        let stats = session.stats();
        assert_eq!(stats.failed_requests, 1);
        assert_eq!(stats.total_requests, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_input_is_ignored() {
        let mut session = session(vec![]);
        let mut view = RecordingView::default();
        let outcome = session
            .submit("   \n", &mut view, &CancellationToken::new())
            .await;

        assert!(matches!(outcome, TurnOutcome::Empty));
        assert!(session.history().is_empty());
        assert!(view.slots.is_empty());
        assert_eq!(session.stats().total_requests, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_the_request_aborts_the_turn() {
        let backend =
            ScriptedBackend::new(vec![Ok("late".to_string())]).slow(Duration::from_secs(30));
        let mut session = ChatSession::new(backend, ChatConfig::new());
        let mut view = RecordingView::default();
        let cancel = CancellationToken::new();

        let submit = session.submit("hello", &mut view, &cancel);
        let interrupt = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        };
        let (outcome, ()) = tokio::join!(submit, interrupt);

        assert!(outcome.error().is_some_and(Error::is_abort));
        assert_eq!(session.history().len(), 1);
        assert!(!view.reply(0).1);
    }

    struct CollectingLogger(Mutex<Vec<String>>);

    impl ClientLogger for CollectingLogger {
        fn log_request(&self, _request: &crate::types::GenerateContentRequest) {}

        fn log_response(&self, _response: &crate::types::GenerateContentResponse) {}

        fn log_error(&self, error: &Error) {
            self.0.lock().unwrap().push(error.to_string());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failures_reach_the_logger() {
        let logger = Arc::new(CollectingLogger(Mutex::new(Vec::new())));
        let mut session = session(vec![Err(Error::malformed_response("no candidates"))])
            .with_logger(logger.clone());
        let mut view = RecordingView::default();
        session
            .submit("hello", &mut view, &CancellationToken::new())
            .await;

        assert_eq!(
            logger.0.lock().unwrap().as_slice(),
            ["Malformed response: no candidates"]
        );
    }

    #[test]
    fn setters_update_stats() {
        let mut session = session(vec![]);
        assert_eq!(session.model(), "scripted");
        session.set_model("gemini-2.5-pro".to_string());
        session.set_typing(false);

        let stats = session.stats();
        assert_eq!(stats.model, "gemini-2.5-pro");
        assert!(!stats.typing_enabled);
        assert_eq!(stats.typing_interval, Duration::from_millis(100));
        assert_eq!(session.config().model, "gemini-2.5-pro");
        assert!(!session.config().typing_enabled);
    }
}

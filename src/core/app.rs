//! Application value and reducer.
//!
//! All mutable state lives in [`App`]; the event loop feeds it
//! [`SessionEvent`]s one at a time through [`apply_event`], which returns the
//! commands (load, generate) the loop must execute by spawning executor tasks.
//! Executors never touch the `App` — they only send more events — so every
//! transition happens on the single owning task.

use tracing::debug;

use crate::api::ChatMessage;
use crate::core::config::Config;
use crate::core::constants::{
    GENERATION_FAILURE_MESSAGE, GREETING, LOAD_FAILURE_MESSAGE, STATUS_ERROR, STATUS_LOADING,
    STATUS_READY, STATUS_THINKING, SYSTEM_PROMPT,
};
use crate::core::message::Message;
use crate::core::runtime::{EngineHandle, SamplingParams};
use crate::core::session::{Session, SessionState};
use crate::ui::typewriter::Typewriter;
use crate::utils::logging::LoggingState;

/// Everything that can happen to the session, from the UI or from executors.
#[derive(Debug)]
pub enum SessionEvent {
    ConnectRequested,
    LoadProgress(f64),
    LoadCompleted(EngineHandle),
    LoadFailed(String),
    SubmitMessage(String),
    ReplyReceived(String),
    ReplyFailed(String),
}

/// Work the event loop must start in response to a transition.
#[derive(Debug)]
pub enum AppCommand {
    BeginLoad {
        model: String,
    },
    RequestReply {
        engine: EngineHandle,
        messages: Vec<ChatMessage>,
        params: SamplingParams,
    },
}

/// Discrete status-indicator state; the label carries the free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Loading,
    Ready,
    Error,
}

pub struct App {
    pub session: Session,
    pub config: Config,
    pub logging: LoggingState,
    messages: Vec<Message>,
    status_kind: StatusKind,
    status_label: String,
    progress: Option<f64>,
    playback: Option<(usize, Typewriter)>,
}

impl App {
    pub fn new(config: Config, logging: LoggingState) -> Self {
        Self {
            session: Session::new(),
            config,
            logging,
            messages: Vec::new(),
            status_kind: StatusKind::Loading,
            status_label: STATUS_LOADING.to_string(),
            progress: None,
            playback: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn status(&self) -> (StatusKind, &str) {
        (self.status_kind, &self.status_label)
    }

    pub fn progress(&self) -> Option<f64> {
        self.progress
    }

    pub fn input_enabled(&self) -> bool {
        self.session.can_send()
    }

    /// Reconnect affordance is shown exactly where connect is legal.
    pub fn can_reconnect(&self) -> bool {
        self.session.can_connect()
    }

    /// Content of the message at `index` as it should be displayed right now,
    /// accounting for typing-effect playback.
    pub fn visible_content(&self, index: usize) -> &str {
        let message = &self.messages[index];
        match &self.playback {
            Some((target, playback)) if *target == index => {
                playback.visible_prefix(&message.content)
            }
            _ => &message.content,
        }
    }

    pub fn playback_active(&self) -> bool {
        self.playback.is_some()
    }

    /// Advance playback by one reveal; drops it once the full reply is shown,
    /// so the final frame renders the original text directly.
    pub fn tick_playback(&mut self) {
        if let Some((_, playback)) = &mut self.playback {
            playback.tick();
            if playback.is_done() {
                self.playback = None;
            }
        }
    }

    fn set_status(&mut self, kind: StatusKind, label: &str) {
        self.status_kind = kind;
        self.status_label = label.to_string();
    }

    fn push_message(&mut self, message: Message) {
        if let Err(err) = self.logging.log_message(&message) {
            debug!(%err, "transcript logging failed");
        }
        self.messages.push(message);
    }

    /// The system-prompt-prefixed transcript sent with a generation request.
    fn wire_messages(&self) -> Vec<ChatMessage> {
        let mut wire = Vec::with_capacity(self.messages.len() + 1);
        wire.push(ChatMessage {
            role: "system".to_string(),
            content: SYSTEM_PROMPT.to_string(),
        });
        for message in &self.messages {
            wire.push(ChatMessage {
                role: message.role.as_str().to_string(),
                content: message.content.clone(),
            });
        }
        wire
    }

    fn sampling_params(&self) -> SamplingParams {
        SamplingParams {
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

/// Apply one event to the application value; returns the commands to execute.
pub fn apply_event(app: &mut App, event: SessionEvent) -> Vec<AppCommand> {
    match event {
        SessionEvent::ConnectRequested => {
            if !app.session.begin_connect() {
                return Vec::new();
            }
            app.progress = Some(0.0);
            app.set_status(StatusKind::Loading, STATUS_LOADING);
            vec![AppCommand::BeginLoad {
                model: app.config.model.clone(),
            }]
        }

        SessionEvent::LoadProgress(raw) => {
            if app.session.state() == SessionState::Connecting {
                // Out-of-range input is clamped, and the gauge never regresses.
                let clamped = raw.clamp(0.0, 1.0);
                let shown = app.progress.unwrap_or(0.0);
                app.progress = Some(shown.max(clamped));
            }
            Vec::new()
        }

        SessionEvent::LoadCompleted(engine) => {
            if !app.session.complete_load(engine) {
                return Vec::new();
            }
            app.progress = None;
            app.set_status(StatusKind::Ready, STATUS_READY);
            app.push_message(Message::assistant(GREETING));
            Vec::new()
        }

        SessionEvent::LoadFailed(reason) => {
            if !app.session.fail_load() {
                return Vec::new();
            }
            debug!(%reason, "model load failed");
            app.progress = None;
            app.set_status(StatusKind::Error, STATUS_ERROR);
            app.push_message(Message::assistant(LOAD_FAILURE_MESSAGE));
            Vec::new()
        }

        SessionEvent::SubmitMessage(text) => {
            let text = text.trim();
            if text.is_empty() || !app.session.begin_generate() {
                // Silent no-op: the input affordance is already disabled
                // outside Ready, and blank submissions are ignored.
                return Vec::new();
            }
            app.push_message(Message::user(text));
            app.set_status(StatusKind::Loading, STATUS_THINKING);
            let engine = app
                .session
                .engine()
                .expect("Ready implies a loaded engine")
                .clone();
            vec![AppCommand::RequestReply {
                engine,
                messages: app.wire_messages(),
                params: app.sampling_params(),
            }]
        }

        SessionEvent::ReplyReceived(reply) => {
            if !app.session.finish_generate() {
                return Vec::new();
            }
            app.push_message(Message::assistant(reply.clone()));
            app.playback = Some((app.messages.len() - 1, Typewriter::new(&reply)));
            app.set_status(StatusKind::Ready, STATUS_READY);
            Vec::new()
        }

        SessionEvent::ReplyFailed(reason) => {
            if !app.session.finish_generate() {
                return Vec::new();
            }
            debug!(%reason, "generation failed");
            app.push_message(Message::assistant(GENERATION_FAILURE_MESSAGE));
            app.set_status(StatusKind::Ready, STATUS_READY);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;

    fn test_app() -> App {
        App::new(Config::default(), LoggingState::new(None).unwrap())
    }

    fn engine() -> EngineHandle {
        EngineHandle {
            model: "test-model".into(),
        }
    }

    fn connect(app: &mut App) {
        let commands = apply_event(app, SessionEvent::ConnectRequested);
        assert!(matches!(commands.as_slice(), [AppCommand::BeginLoad { .. }]));
        let commands = apply_event(app, SessionEvent::LoadCompleted(engine()));
        assert!(commands.is_empty());
    }

    #[test]
    fn successful_connect_greets_once() {
        let mut app = test_app();
        connect(&mut app);

        assert_eq!(app.session.state(), SessionState::Ready);
        assert_eq!(app.messages().len(), 1);
        assert_eq!(app.messages()[0].content, GREETING);
        assert!(app.input_enabled());
    }

    #[test]
    fn sends_outside_ready_leave_the_transcript_unchanged() {
        let mut app = test_app();

        // Idle.
        assert!(apply_event(&mut app, SessionEvent::SubmitMessage("hi".into())).is_empty());
        assert!(app.messages().is_empty());

        // Connecting.
        apply_event(&mut app, SessionEvent::ConnectRequested);
        assert!(apply_event(&mut app, SessionEvent::SubmitMessage("hi".into())).is_empty());
        assert!(app.messages().is_empty());

        // Error.
        apply_event(&mut app, SessionEvent::LoadFailed("boom".into()));
        let before = app.messages().len();
        assert!(apply_event(&mut app, SessionEvent::SubmitMessage("hi".into())).is_empty());
        assert_eq!(app.messages().len(), before);
    }

    #[test]
    fn successful_send_grows_transcript_by_two() {
        let mut app = test_app();
        connect(&mut app);

        let commands = apply_event(&mut app, SessionEvent::SubmitMessage("hello".into()));
        assert!(matches!(
            commands.as_slice(),
            [AppCommand::RequestReply { .. }]
        ));
        assert_eq!(app.session.state(), SessionState::Generating);

        apply_event(&mut app, SessionEvent::ReplyReceived("bonjour !".into()));

        let messages = app.messages();
        assert_eq!(messages.len(), 3); // greeting, user, assistant
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "hello");
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[2].content, "bonjour !");
        assert_eq!(app.session.state(), SessionState::Ready);
    }

    #[test]
    fn failed_generation_returns_to_ready_with_inline_error() {
        let mut app = test_app();
        connect(&mut app);

        apply_event(&mut app, SessionEvent::SubmitMessage("hello".into()));
        apply_event(&mut app, SessionEvent::ReplyFailed("connection reset".into()));

        let messages = app.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].content, GENERATION_FAILURE_MESSAGE);
        assert_eq!(app.session.state(), SessionState::Ready);
        assert!(app.input_enabled());
    }

    #[test]
    fn concurrent_sends_are_rejected_not_buffered() {
        let mut app = test_app();
        connect(&mut app);

        apply_event(&mut app, SessionEvent::SubmitMessage("first".into()));
        let commands = apply_event(&mut app, SessionEvent::SubmitMessage("second".into()));
        assert!(commands.is_empty());
        // Only greeting + first user message.
        assert_eq!(app.messages().len(), 2);
    }

    #[test]
    fn blank_submissions_are_ignored() {
        let mut app = test_app();
        connect(&mut app);

        assert!(apply_event(&mut app, SessionEvent::SubmitMessage("   ".into())).is_empty());
        assert!(apply_event(&mut app, SessionEvent::SubmitMessage("\n\t".into())).is_empty());
        assert_eq!(app.messages().len(), 1);
        assert_eq!(app.session.state(), SessionState::Ready);
    }

    #[test]
    fn progress_is_clamped_and_never_regresses() {
        let mut app = test_app();
        apply_event(&mut app, SessionEvent::ConnectRequested);

        let inputs = [0.5, -3.0, 0.2, 1.7];
        let expected = [0.5, 0.5, 0.5, 1.0];
        for (raw, want) in inputs.into_iter().zip(expected) {
            apply_event(&mut app, SessionEvent::LoadProgress(raw));
            assert_eq!(app.progress(), Some(want));
        }
    }

    #[test]
    fn progress_outside_connecting_is_dropped() {
        let mut app = test_app();
        apply_event(&mut app, SessionEvent::LoadProgress(0.5));
        assert_eq!(app.progress(), None);
    }

    #[test]
    fn connect_is_ignored_once_ready() {
        let mut app = test_app();
        connect(&mut app);
        assert!(apply_event(&mut app, SessionEvent::ConnectRequested).is_empty());
        assert_eq!(app.session.state(), SessionState::Ready);
    }

    #[test]
    fn stale_load_completions_are_ignored() {
        let mut app = test_app();
        connect(&mut app);
        let before = app.messages().len();
        assert!(apply_event(&mut app, SessionEvent::LoadCompleted(engine())).is_empty());
        assert_eq!(app.messages().len(), before);
    }

    #[test]
    fn reconnect_after_load_failure() {
        let mut app = test_app();
        apply_event(&mut app, SessionEvent::ConnectRequested);
        apply_event(&mut app, SessionEvent::LoadFailed("no server".into()));

        assert_eq!(app.session.state(), SessionState::Error);
        assert_eq!(app.status().0, StatusKind::Error);
        assert_eq!(app.messages().len(), 1);
        assert_eq!(app.messages()[0].content, LOAD_FAILURE_MESSAGE);
        assert!(app.can_reconnect());

        connect(&mut app);
        assert_eq!(app.session.state(), SessionState::Ready);
    }

    #[test]
    fn wire_transcript_is_system_prefixed_and_complete() {
        let mut app = test_app();
        connect(&mut app);

        let commands = apply_event(&mut app, SessionEvent::SubmitMessage("hello".into()));
        let AppCommand::RequestReply { messages, .. } = &commands[0] else {
            panic!("expected a reply request");
        };

        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].content, GREETING);
        assert_eq!(messages.last().unwrap().role, "user");
        assert_eq!(messages.last().unwrap().content, "hello");

        // The system prompt never shows up in the visible transcript.
        assert!(app.messages().iter().all(|m| m.role != Role::System));
    }

    #[test]
    fn playback_reveals_then_releases_the_reply() {
        let mut app = test_app();
        connect(&mut app);
        apply_event(&mut app, SessionEvent::SubmitMessage("hello".into()));
        apply_event(&mut app, SessionEvent::ReplyReceived("abc".into()));

        assert!(app.playback_active());
        assert_eq!(app.visible_content(2), "");
        app.tick_playback();
        assert_eq!(app.visible_content(2), "a");
        app.tick_playback();
        app.tick_playback();
        assert!(!app.playback_active());
        assert_eq!(app.visible_content(2), "abc");
        // Transcript content was complete the whole time.
        assert_eq!(app.messages()[2].content, "abc");
    }

    #[test]
    fn sampling_params_follow_config() {
        let mut app = test_app();
        app.config.temperature = 0.3;
        app.config.max_tokens = 42;
        connect(&mut app);

        let commands = apply_event(&mut app, SessionEvent::SubmitMessage("hi".into()));
        let AppCommand::RequestReply { params, .. } = &commands[0] else {
            panic!("expected a reply request");
        };
        assert_eq!(params.temperature, 0.3);
        assert_eq!(params.max_tokens, 42);
    }
}

//! Session lifecycle state machine.
//!
//! One [`Session`] exists per application instance. Every transition is
//! funneled through the reducer in [`crate::core::app`], which runs on the
//! single event-loop task, so no two state changes ever race. The enum makes
//! the illegal combinations of the old boolean-flag approach (generating while
//! not initialized, and friends) unrepresentable.

use crate::core::runtime::EngineHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection attempted yet.
    Idle,
    /// Model load in flight.
    Connecting,
    /// Engine loaded, no exchange outstanding.
    Ready,
    /// Exactly one reply request in flight.
    Generating,
    /// Model load failed; reconnect is offered.
    Error,
}

#[derive(Debug)]
pub struct Session {
    state: SessionState,
    engine: Option<EngineHandle>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            engine: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn engine(&self) -> Option<&EngineHandle> {
        self.engine.as_ref()
    }

    /// Connect is only offered from Idle and Error.
    pub fn can_connect(&self) -> bool {
        matches!(self.state, SessionState::Idle | SessionState::Error)
    }

    /// Sends are accepted in Ready only; everywhere else the input affordance
    /// is disabled and submissions are silent no-ops.
    pub fn can_send(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Enter Connecting. Returns false (and changes nothing) outside
    /// Idle/Error.
    pub fn begin_connect(&mut self) -> bool {
        if !self.can_connect() {
            return false;
        }
        self.state = SessionState::Connecting;
        self.engine = None;
        true
    }

    /// Store the loaded engine and enter Ready. Ignored unless Connecting.
    pub fn complete_load(&mut self, engine: EngineHandle) -> bool {
        if self.state != SessionState::Connecting {
            return false;
        }
        self.engine = Some(engine);
        self.state = SessionState::Ready;
        true
    }

    /// Enter Error after a failed load. Ignored unless Connecting.
    pub fn fail_load(&mut self) -> bool {
        if self.state != SessionState::Connecting {
            return false;
        }
        self.engine = None;
        self.state = SessionState::Error;
        true
    }

    /// Enter Generating for one exchange. Ignored unless Ready.
    pub fn begin_generate(&mut self) -> bool {
        if !self.can_send() {
            return false;
        }
        self.state = SessionState::Generating;
        true
    }

    /// Return to Ready once the exchange settled, successfully or not.
    /// Generation failures do not poison the session.
    pub fn finish_generate(&mut self) -> bool {
        if self.state != SessionState::Generating {
            return false;
        }
        self.state = SessionState::Ready;
        true
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> EngineHandle {
        EngineHandle {
            model: "test-model".into(),
        }
    }

    #[test]
    fn connect_only_from_idle_or_error() {
        let mut session = Session::new();
        assert!(session.begin_connect());
        assert_eq!(session.state(), SessionState::Connecting);

        // Already connecting: refused.
        assert!(!session.begin_connect());

        assert!(session.complete_load(handle()));
        assert!(!session.begin_connect());

        assert!(session.begin_generate());
        assert!(!session.begin_connect());
    }

    #[test]
    fn reconnect_after_failed_load() {
        let mut session = Session::new();
        session.begin_connect();
        assert!(session.fail_load());
        assert_eq!(session.state(), SessionState::Error);
        assert!(session.engine().is_none());

        assert!(session.begin_connect());
        assert!(session.complete_load(handle()));
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.engine().is_some());
    }

    #[test]
    fn generating_gate_serializes_exchanges() {
        let mut session = Session::new();
        session.begin_connect();
        session.complete_load(handle());

        assert!(session.begin_generate());
        // A second exchange is refused while one is outstanding.
        assert!(!session.begin_generate());

        assert!(session.finish_generate());
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.begin_generate());
    }

    #[test]
    fn stale_completions_are_ignored() {
        let mut session = Session::new();
        assert!(!session.complete_load(handle()));
        assert!(!session.fail_load());
        assert!(!session.finish_generate());
        assert_eq!(session.state(), SessionState::Idle);
    }
}

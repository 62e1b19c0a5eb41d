//! Session state machine using rust-fsm.
//!
//! Tracks the in-memory lifecycle of a session. Stored tokens remain the
//! source of truth across restarts; the machine always starts `LoggedOut`.
//!
//! ```text
//!  LoggedOut ──Authenticate──► Authenticating ──AuthenticateSucceeded──► LoggedIn
//!      ▲                          │    ▲                                  │
//!      └───AuthenticateFailed─────┘    └──────────Authenticate────────────┘
//!
//!  any of the above ──LogoutRequested──► LoggingOut ──LogoutComplete──► LoggedOut
//! ```

use rust_fsm::*;
use serde::{Deserialize, Serialize};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_machine(LoggedOut)

    LoggedOut => {
        Authenticate => Authenticating,
        LogoutRequested => LoggingOut
    },
    Authenticating => {
        // A second caller may start authenticating while the first is in flight
        Authenticate => Authenticating,
        AuthenticateSucceeded => LoggedIn,
        AuthenticateFailed => LoggedOut,
        LogoutRequested => LoggingOut
    },
    LoggedIn => {
        Authenticate => Authenticating,
        LogoutRequested => LoggingOut
    },
    LoggingOut => {
        LogoutComplete => LoggedOut
    }
}

pub use session_machine::Input as SessionMachineInput;
pub use session_machine::State as SessionMachineState;
pub use session_machine::StateMachine as SessionMachine;

/// Session state for display and callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    LoggedOut,
    Authenticating,
    LoggedIn,
    LoggingOut,
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, SessionState::LoggedIn)
    }
}

impl From<&SessionMachineState> for SessionState {
    fn from(state: &SessionMachineState) -> Self {
        match state {
            SessionMachineState::LoggedOut => SessionState::LoggedOut,
            SessionMachineState::Authenticating => SessionState::Authenticating,
            SessionMachineState::LoggedIn => SessionState::LoggedIn,
            SessionMachineState::LoggingOut => SessionState::LoggingOut,
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SessionState::LoggedOut => "logged out",
            SessionState::Authenticating => "authenticating",
            SessionState::LoggedIn => "logged in",
            SessionState::LoggingOut => "logging out",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_logged_out() {
        let machine = SessionMachine::new();
        assert_eq!(*machine.state(), SessionMachineState::LoggedOut);
    }

    #[test]
    fn test_authenticate_success_flow() {
        let mut machine = SessionMachine::new();

        machine.consume(&SessionMachineInput::Authenticate).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::Authenticating);

        machine
            .consume(&SessionMachineInput::AuthenticateSucceeded)
            .unwrap();
        assert_eq!(*machine.state(), SessionMachineState::LoggedIn);
    }

    #[test]
    fn test_authenticate_failure_returns_to_logged_out() {
        let mut machine = SessionMachine::new();

        machine.consume(&SessionMachineInput::Authenticate).unwrap();
        machine
            .consume(&SessionMachineInput::AuthenticateFailed)
            .unwrap();
        assert_eq!(*machine.state(), SessionMachineState::LoggedOut);
    }

    #[test]
    fn test_reauthenticate_from_logged_in() {
        let mut machine = SessionMachine::new();
        machine.consume(&SessionMachineInput::Authenticate).unwrap();
        machine
            .consume(&SessionMachineInput::AuthenticateSucceeded)
            .unwrap();

        machine.consume(&SessionMachineInput::Authenticate).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::Authenticating);

        // Overlapping authenticate calls keep the machine in Authenticating
        machine.consume(&SessionMachineInput::Authenticate).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::Authenticating);
    }

    #[test]
    fn test_cannot_succeed_without_authenticating() {
        let mut machine = SessionMachine::new();
        assert!(machine
            .consume(&SessionMachineInput::AuthenticateSucceeded)
            .is_err());
        assert_eq!(*machine.state(), SessionMachineState::LoggedOut);
    }

    #[test]
    fn test_logout_flow() {
        let mut machine = SessionMachine::new();
        machine.consume(&SessionMachineInput::Authenticate).unwrap();
        machine
            .consume(&SessionMachineInput::AuthenticateSucceeded)
            .unwrap();

        machine.consume(&SessionMachineInput::LogoutRequested).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::LoggingOut);

        // No authentication while logging out
        assert!(machine.consume(&SessionMachineInput::Authenticate).is_err());

        machine.consume(&SessionMachineInput::LogoutComplete).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::LoggedOut);
    }

    #[test]
    fn test_logout_allowed_when_already_logged_out() {
        let mut machine = SessionMachine::new();
        machine.consume(&SessionMachineInput::LogoutRequested).unwrap();
        machine.consume(&SessionMachineInput::LogoutComplete).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::LoggedOut);
    }

    #[test]
    fn test_session_state_conversion() {
        assert_eq!(
            SessionState::from(&SessionMachineState::LoggedIn),
            SessionState::LoggedIn
        );
        assert!(SessionState::LoggedIn.is_logged_in());
        assert!(!SessionState::Authenticating.is_logged_in());
        assert_eq!(SessionState::LoggingOut.to_string(), "logging out");
    }
}

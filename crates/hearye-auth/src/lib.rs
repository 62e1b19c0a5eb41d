//! Session management for the Hear Ye client.
//!
//! This crate provides:
//! - Token storage split between fast and secure stores
//! - Session refresh and identity-provider token exchange
//! - Logout with identity token revocation
//! - Outstanding onboarding task derivation
//! - An explicit FSM tracking the in-memory session state
//! - Navigation and alert collaborator seams

mod collaborators;
mod error;
mod flows;
mod session;
mod session_fsm;
mod tasks;
mod tokens;

pub use collaborators::{Alerter, Modal, NavigationRoot, Navigator, NoopAlerter, NoopNavigator};
pub use error::{AuthError, AuthResult};
pub use session::{
    http_client_with_timeout, Authentication, SessionEndpoints, SessionManager,
    SessionStateCallback, UserProfile,
};
pub use session_fsm::session_machine;
pub use session_fsm::{SessionMachine, SessionMachineInput, SessionMachineState, SessionState};
pub use tasks::{derive_outstanding_tasks, OutstandingTask, OutstandingTasks};
pub use tokens::{TokenKind, TokenStore};

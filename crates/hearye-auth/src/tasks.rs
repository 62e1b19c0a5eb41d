//! Onboarding steps still owed by the user after authentication.

use crate::session::Authentication;
use serde::Serialize;

/// A step the user must complete before using the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutstandingTask {
    SelectDistrict,
}

impl OutstandingTask {
    /// Numeric code exchanged with the host UI.
    pub fn code(&self) -> u8 {
        match self {
            OutstandingTask::SelectDistrict => 1,
        }
    }
}

/// Either the session validity passed through unchanged, or the tasks
/// derived from a freshly fetched profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutstandingTasks {
    Session(bool),
    Tasks(Vec<OutstandingTask>),
}

impl OutstandingTasks {
    pub fn contains(&self, task: OutstandingTask) -> bool {
        match self {
            OutstandingTasks::Session(_) => false,
            OutstandingTasks::Tasks(tasks) => tasks.contains(&task),
        }
    }

    /// Task codes, or `None` when only session validity is known.
    pub fn codes(&self) -> Option<Vec<u8>> {
        match self {
            OutstandingTasks::Session(_) => None,
            OutstandingTasks::Tasks(tasks) => Some(tasks.iter().map(|t| t.code()).collect()),
        }
    }
}

/// Work out what the user still has to do.
///
/// A district of `0` is treated the same as no district.
pub fn derive_outstanding_tasks(authentication: &Authentication) -> OutstandingTasks {
    match authentication {
        Authentication::Failed => OutstandingTasks::Session(false),
        Authentication::SessionValid => OutstandingTasks::Session(true),
        Authentication::Established(profile) => {
            let mut tasks = Vec::new();
            if matches!(profile.district, None | Some(0)) {
                tasks.push(OutstandingTask::SelectDistrict);
            }
            OutstandingTasks::Tasks(tasks)
        }
    }
}

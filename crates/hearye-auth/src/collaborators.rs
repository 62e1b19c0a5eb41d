//! Seams to the host application's UI.
//!
//! The session layer decides *where* the user should be (login, dashboard,
//! district selection) and *what* they should be told; the host decides how
//! that is rendered.

use serde::Serialize;
use tracing::debug;

/// Top-level screen stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationRoot {
    Login,
    Dashboard,
}

/// Modals presented over the current root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Modal {
    SelectDistrict,
}

/// Screen navigation.
pub trait Navigator: Send + Sync {
    /// Replace the whole navigation stack.
    fn set_root(&self, root: NavigationRoot);

    fn show_modal(&self, modal: Modal);

    fn dismiss_modal(&self, modal: Modal);
}

/// User-facing alerts.
pub trait Alerter: Send + Sync {
    fn alert(&self, title: &str, message: &str);
}

/// Navigator for headless use. Logs and otherwise ignores requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn set_root(&self, root: NavigationRoot) {
        debug!(root = ?root, "Ignoring set_root");
    }

    fn show_modal(&self, modal: Modal) {
        debug!(modal = ?modal, "Ignoring show_modal");
    }

    fn dismiss_modal(&self, modal: Modal) {
        debug!(modal = ?modal, "Ignoring dismiss_modal");
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAlerter;

impl Alerter for NoopAlerter {
    fn alert(&self, title: &str, message: &str) {
        debug!(title = %title, message = %message, "Ignoring alert");
    }
}

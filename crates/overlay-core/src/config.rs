//! Coordinator configuration.

use crate::lifecycle::AppState;

/// What the coordinator records when the renderer fails to hide the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HideFailurePolicy {
    /// Keep the last known variant so the caller can retry the hide.
    #[default]
    RetainState,
    /// Treat the overlay as gone and clear the recorded state anyway.
    ForceHidden,
}

/// Overlay coordinator configuration.
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Re-render the recorded overlay when the app returns to the foreground.
    pub reassert_on_foreground: bool,
    /// Handling of hide failures.
    pub hide_failure: HideFailurePolicy,
    /// App state assumed before the first lifecycle signal arrives.
    pub initial_app_state: AppState,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            reassert_on_foreground: true,
            hide_failure: HideFailurePolicy::RetainState,
            initial_app_state: AppState::Active,
        }
    }
}

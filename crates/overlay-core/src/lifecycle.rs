//! App foreground/background tracking.

use std::{fmt, str::FromStr};

use tracing::debug;

use crate::error::SignalError;

/// App lifecycle state reported by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// App is in the foreground.
    Active,
    /// App is in the background.
    Background,
    /// App is transitioning or partially obscured.
    Inactive,
}

impl AppState {
    /// Platform name of the state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Background => "background",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppState {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "background" => Ok(Self::Background),
            "inactive" => Ok(Self::Inactive),
            other => Err(SignalError::UnknownAppState(other.to_string())),
        }
    }
}

/// Watches app state transitions and detects returns to the foreground.
#[derive(Debug, Clone)]
pub struct LifecycleObserver {
    last: AppState,
}

impl LifecycleObserver {
    /// Start from a known app state.
    pub fn new(initial: AppState) -> Self {
        Self { last: initial }
    }

    /// Last observed app state.
    pub fn last(&self) -> AppState {
        self.last
    }

    /// Record `next` and return `true` if the app just entered the foreground.
    pub fn observe(&mut self, next: AppState) -> bool {
        let previous = std::mem::replace(&mut self.last, next);
        debug!(%previous, %next, "app state changed");

        next == AppState::Active && previous != AppState::Active
    }
}

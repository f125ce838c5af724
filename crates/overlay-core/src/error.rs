//! Error types for the overlay core.

use thiserror::Error;

use crate::model::OverlayState;

/// Failure reported by the renderer collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A window is already on screen; it must be hidden first.
    #[error("an overlay is already visible")]
    AlreadyVisible,

    /// The OS refused to draw the overlay.
    #[error("overlay permission is not granted")]
    PermissionDenied,

    /// An update targeted a window that is not on screen.
    #[error("no overlay is visible")]
    NoOverlay,

    /// Any other platform failure.
    #[error("platform error: {0}")]
    Platform(String),
}

/// Errors surfaced by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    /// The renderer rejected a show, hide or update.
    #[error("renderer failed to {operation}: {source}")]
    Render {
        /// Renderer operation that failed.
        operation: &'static str,
        /// Underlying renderer error.
        #[source]
        source: RenderError,
    },

    /// Rendering failed while the overlay permission was not granted.
    #[error("overlay permission unavailable: {source}")]
    PermissionUnavailable {
        /// Underlying renderer error.
        #[source]
        source: RenderError,
    },

    /// The operation is not legal in the current state.
    #[error("cannot {operation} while {state:?}")]
    InvalidTransition {
        /// State the coordinator was in.
        state: OverlayState,
        /// Rejected operation.
        operation: &'static str,
    },
}

/// Errors on the inbound signal path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    /// Native event name not recognized.
    #[error("unknown overlay event: {0}")]
    UnknownEvent(String),

    /// App state string not recognized.
    #[error("unknown app state: {0}")]
    UnknownAppState(String),

    /// The runtime has shut down.
    #[error("signal channel closed")]
    ChannelClosed,
}

//! Renderer abstraction.
//!
//! The coordinator never draws anything itself. Production wires a platform
//! window layer behind this trait, tests use the simulated renderer from the
//! harness crate.

use async_trait::async_trait;

use crate::{
    error::RenderError,
    model::{OverlayUpdate, OverlayVariant},
};

/// Performs the actual show/hide/update of the overlay window.
///
/// Implementations only need to manage a single window. The coordinator
/// guarantees that calls never overlap and hides the window it recorded as
/// visible before issuing another `show`.
#[async_trait]
pub trait Renderer: Send + Sync + 'static {
    /// Create and display a window for `variant`.
    ///
    /// # Errors
    ///
    /// Returns an error if a window is already visible, the permission is
    /// missing, or the platform rejects the window.
    async fn show(&self, variant: &OverlayVariant) -> Result<(), RenderError>;

    /// Remove the visible window.
    ///
    /// Hiding when nothing is visible succeeds without effect.
    async fn hide(&self) -> Result<(), RenderError>;

    /// Update the visible window in place.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NoOverlay`] if nothing is visible.
    async fn update(&self, update: &OverlayUpdate) -> Result<(), RenderError>;
}

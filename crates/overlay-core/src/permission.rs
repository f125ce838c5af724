//! Overlay permission handshake.
//!
//! Drawing above other apps needs an OS permission that is granted through a
//! system settings screen. The grant happens out of process, so the gate never
//! waits for the user's decision: it asks and moves on. A renderer failure is
//! the only evidence that the permission is still missing.

use async_trait::async_trait;
use tracing::{debug, info};

/// Access to the OS overlay permission.
#[async_trait]
pub trait PermissionProvider: Send + Sync + 'static {
    /// Whether the overlay permission is currently granted. No side effects.
    async fn check_granted(&self) -> bool;

    /// Start the OS grant flow and return immediately.
    fn request_grant(&self);
}

/// Outcome of [`PermissionGate::ensure_granted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// Permission was already granted.
    Granted,
    /// Permission was missing; the grant flow was started.
    Requested,
}

/// Checks the overlay permission before a render attempt.
#[derive(Debug, Clone)]
pub struct PermissionGate<P> {
    provider: P,
}

impl<P: PermissionProvider> PermissionGate<P> {
    /// Wrap a permission provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Whether the permission is granted right now.
    pub async fn check_granted(&self) -> bool {
        self.provider.check_granted().await
    }

    /// Request the permission if it is missing, without waiting for the user.
    pub async fn ensure_granted(&self) -> PermissionStatus {
        if self.provider.check_granted().await {
            debug!("overlay permission granted");
            return PermissionStatus::Granted;
        }

        info!("overlay permission missing, requesting grant");
        self.provider.request_grant();
        PermissionStatus::Requested
    }
}

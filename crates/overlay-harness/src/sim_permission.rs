//! Simulated overlay permission.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use overlay_core::PermissionProvider;
use tracing::debug;

/// What the simulated user does when the grant flow is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrantBehavior {
    /// Leaves the settings screen without granting.
    #[default]
    Never,
    /// Grants right away.
    Immediate,
}

/// Permission provider backed by a shared flag.
///
/// Clones share state, so a test can keep one handle while the coordinator
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct SimPermission {
    granted: Arc<AtomicBool>,
    requests: Arc<AtomicUsize>,
    behavior: GrantBehavior,
}

impl SimPermission {
    /// Permission already granted.
    pub fn granted() -> Self {
        let permission = Self::default();
        permission.set_granted(true);
        permission
    }

    /// Permission missing; `behavior` decides what a grant request does.
    pub fn denied(behavior: GrantBehavior) -> Self {
        Self { behavior, ..Self::default() }
    }

    /// Grant or revoke the permission.
    pub fn set_granted(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }

    /// Whether the permission is currently granted.
    pub fn is_granted(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    /// Number of grant flows started.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionProvider for SimPermission {
    async fn check_granted(&self) -> bool {
        self.is_granted()
    }

    fn request_grant(&self) {
        let requests = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(requests, behavior = ?self.behavior, "grant flow opened");

        if self.behavior == GrantBehavior::Immediate {
            self.set_granted(true);
        }
    }
}

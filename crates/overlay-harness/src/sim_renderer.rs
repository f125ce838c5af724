//! Simulated overlay window.
//!
//! Behaves like the native window layer: one window at most, `show` refuses
//! while a window is up or the permission is missing, `hide` on nothing is a
//! no-op, and `update` needs a visible window. On top of that it records every
//! call, tracks how many calls overlap, and injects failures either on demand
//! ([`SimRenderer::fail_next`]) or at a seeded random rate.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use overlay_core::{OverlayUpdate, OverlayVariant, RenderError, Renderer};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::sim_permission::SimPermission;

/// Renderer operation, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererOp {
    /// `show`
    Show,
    /// `hide`
    Hide,
    /// `update`
    Update,
}

/// One call received by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererCall {
    /// `show(variant)`
    Show(OverlayVariant),
    /// `hide()`
    Hide,
    /// `update(update)`
    Update(OverlayUpdate),
}

impl RendererCall {
    /// Operation of this call.
    pub fn op(&self) -> RendererOp {
        match self {
            Self::Show(_) => RendererOp::Show,
            Self::Hide => RendererOp::Hide,
            Self::Update(_) => RendererOp::Update,
        }
    }
}

struct SimState {
    window: Option<OverlayVariant>,
    calls: Vec<RendererCall>,
    armed: HashMap<RendererOp, usize>,
    failure_rate: f64,
    rng: ChaCha8Rng,
}

impl SimState {
    fn take_fault(&mut self, op: RendererOp) -> bool {
        if let Some(armed) = self.armed.get_mut(&op).filter(|armed| **armed > 0) {
            *armed -= 1;
            return true;
        }
        self.failure_rate > 0.0 && self.rng.gen_bool(self.failure_rate)
    }
}

/// In-memory renderer for tests and the demo.
#[derive(Clone)]
pub struct SimRenderer {
    state: Arc<Mutex<SimState>>,
    permission: Option<SimPermission>,
    latency: Duration,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for SimRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SimRenderer {
    /// Renderer with no latency, no faults and no permission check.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                window: None,
                calls: Vec::new(),
                armed: HashMap::new(),
                failure_rate: 0.0,
                rng: ChaCha8Rng::seed_from_u64(0),
            })),
            permission: None,
            latency: Duration::ZERO,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Refuse `show` while `permission` is not granted.
    #[must_use]
    pub fn with_permission(mut self, permission: SimPermission) -> Self {
        self.permission = Some(permission);
        self
    }

    /// Delay every call by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fail each call with probability `rate`, using an RNG seeded with `seed`.
    #[must_use]
    pub fn with_failure_rate(self, rate: f64, seed: u64) -> Self {
        {
            let mut state = self.lock();
            state.failure_rate = rate.clamp(0.0, 1.0);
            state.rng = ChaCha8Rng::seed_from_u64(seed);
        }
        self
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fail the next call of `op`. Calls accumulate.
    pub fn fail_next(&self, op: RendererOp) {
        *self.lock().armed.entry(op).or_insert(0) += 1;
    }

    /// Window currently on screen.
    pub fn window(&self) -> Option<OverlayVariant> {
        self.lock().window.clone()
    }

    /// Remove the window without telling anyone, as the OS may do while the
    /// app is in the background.
    pub fn drop_window(&self) {
        self.lock().window = None;
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<RendererCall> {
        self.lock().calls.clone()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Highest number of calls that were in progress at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn perform<F>(&self, call: RendererCall, apply: F) -> Result<(), RenderError>
    where
        F: FnOnce(&mut Option<OverlayVariant>) -> Result<(), RenderError> + Send,
    {
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let permission_missing =
            self.permission.as_ref().is_some_and(|permission| !permission.is_granted());

        let result = {
            let mut state = self.lock();
            let op = call.op();
            state.calls.push(call);

            if state.take_fault(op) {
                Err(RenderError::Platform(format!("injected {op:?} failure")))
            } else if op == RendererOp::Show && permission_missing {
                Err(RenderError::PermissionDenied)
            } else {
                apply(&mut state.window)
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        debug!(?result, "simulated renderer call");
        result
    }
}

#[async_trait]
impl Renderer for SimRenderer {
    async fn show(&self, variant: &OverlayVariant) -> Result<(), RenderError> {
        self.perform(RendererCall::Show(variant.clone()), |window| {
            if window.is_some() {
                return Err(RenderError::AlreadyVisible);
            }
            *window = Some(variant.clone());
            Ok(())
        })
        .await
    }

    async fn hide(&self) -> Result<(), RenderError> {
        self.perform(RendererCall::Hide, |window| {
            *window = None;
            Ok(())
        })
        .await
    }

    async fn update(&self, update: &OverlayUpdate) -> Result<(), RenderError> {
        self.perform(RendererCall::Update(update.clone()), |window| {
            match (window.as_mut(), update) {
                (None, _) => return Err(RenderError::NoOverlay),
                (
                    Some(OverlayVariant::Bubble { badge_count }),
                    OverlayUpdate::Badge { badge_count: new },
                ) => *badge_count = *new,
                (Some(OverlayVariant::Card(trip)), OverlayUpdate::Card(fields)) => {
                    trip.apply(fields);
                },
                // Fields that do not belong to the visible view are ignored.
                (Some(_), _) => {},
            }
            Ok(())
        })
        .await
    }
}

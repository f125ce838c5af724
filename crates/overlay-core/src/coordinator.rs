//! Overlay lifecycle state machine.
//!
//! # State Machine
//!
//! ```text
//!                   show_bubble / ignored / declined
//!        ┌────────────────────────────────────────────────┐
//!        │                                                ▼
//!   ┌────────┐  show_trip_card  ┌─────────────┐  click  ┌───────────────┐
//!   │ Hidden │─────────────────>│ ShowingCard │<────────│ ShowingBubble │
//!   └────────┘                  └─────────────┘         └───────────────┘
//!        ▲                            │                          │
//!        └────────────────────────────┴──────────────────────────┘
//!                  hide_overlay / accepted / show failure
//! ```
//!
//! # Protocols
//!
//! Every show goes through the same sequence: hide whatever is recorded as
//! visible, make sure the permission was at least requested, show the new
//! variant, then commit. A failure anywhere rolls the state back to `Hidden`.
//!
//! Hiding clears the recorded variant and the cached bubble context only when
//! the renderer confirms. On failure the recorded state is kept (see
//! [`HideFailurePolicy`]), so it may disagree with what is actually on screen.
//!
//! # Serialization
//!
//! All state lives behind one `tokio::sync::Mutex` that is held for the whole
//! protocol, renderer awaits included. Only one protocol runs at a time and
//! waiting callers are served in FIFO order, so when requests race the one
//! issued last wins.

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    config::{HideFailurePolicy, OverlayConfig},
    error::{OverlayError, RenderError},
    model::{
        BubbleContext, CardUpdate, OverlaySnapshot, OverlayState, OverlayUpdate, OverlayVariant,
        TripDetails,
    },
    permission::{PermissionGate, PermissionProvider, PermissionStatus},
    renderer::Renderer,
};

/// State owned by the coordinator.
#[derive(Debug, Default)]
struct Session {
    current: Option<OverlayVariant>,
    bubble_context: Option<BubbleContext>,
}

impl Session {
    fn state(&self) -> OverlayState {
        OverlayState::of(self.current.as_ref())
    }

    fn clear(&mut self) {
        self.current = None;
        self.bubble_context = None;
    }
}

/// Owns the current overlay and drives the renderer through its lifecycle.
pub struct OverlayCoordinator<R, P> {
    renderer: R,
    permissions: PermissionGate<P>,
    hide_failure: HideFailurePolicy,
    session: Mutex<Session>,
}

impl<R: Renderer, P: PermissionProvider> OverlayCoordinator<R, P> {
    /// Create a coordinator in the `Hidden` state.
    pub fn new(renderer: R, permissions: P, config: &OverlayConfig) -> Self {
        Self {
            renderer,
            permissions: PermissionGate::new(permissions),
            hide_failure: config.hide_failure,
            session: Mutex::new(Session::default()),
        }
    }

    /// Renderer this coordinator drives.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Permission gate consulted before every show.
    pub fn permissions(&self) -> &PermissionGate<P> {
        &self.permissions
    }

    /// Current state. Waits for any in-flight protocol to finish.
    pub async fn state(&self) -> OverlayState {
        self.session.lock().await.state()
    }

    /// Copy of the recorded variant and bubble context.
    pub async fn snapshot(&self) -> OverlaySnapshot {
        let session = self.session.lock().await;
        OverlaySnapshot {
            current: session.current.clone(),
            bubble_context: session.bubble_context.clone(),
        }
    }

    /// Show the bubble and cache `trip` so the card can be opened from it.
    ///
    /// The cache is written before the renderer is called and survives a
    /// failed show.
    ///
    /// # Errors
    ///
    /// Returns the renderer failure; the state is then `Hidden`.
    pub async fn show_bubble(
        &self,
        badge_count: u32,
        trip: TripDetails,
    ) -> Result<(), OverlayError> {
        let mut session = self.session.lock().await;
        debug!(badge_count, "show bubble requested");

        session.bubble_context = Some(BubbleContext { trip, badge_count });
        self.show(&mut session, OverlayVariant::Bubble { badge_count }).await
    }

    /// Show the trip card. The cached bubble context is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the renderer failure; the state is then `Hidden`.
    pub async fn show_trip_card(&self, trip: TripDetails) -> Result<(), OverlayError> {
        let mut session = self.session.lock().await;
        debug!("show trip card requested");

        self.show(&mut session, OverlayVariant::Card(trip)).await
    }

    /// Hide the overlay and forget the cached bubble context.
    ///
    /// Does nothing while `Hidden`; the context is then left as it is.
    ///
    /// # Errors
    ///
    /// Returns the renderer failure. The recorded state is then handled
    /// according to the configured [`HideFailurePolicy`].
    pub async fn hide_overlay(&self) -> Result<(), OverlayError> {
        let mut session = self.session.lock().await;
        debug!("hide requested");

        self.hide(&mut session).await
    }

    /// Change the badge of the visible bubble in place.
    ///
    /// The new count is recorded even if the renderer rejects the update, so
    /// after a failure the recorded badge may be ahead of the screen. The
    /// cached bubble context keeps the count it was shown with.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` if no bubble is showing
    /// - `Render` if the renderer rejects the update
    pub async fn update_bubble(&self, badge_count: u32) -> Result<(), OverlayError> {
        let mut guard = self.session.lock().await;
        let session = &mut *guard;

        if !matches!(session.current, Some(OverlayVariant::Bubble { .. })) {
            let state = session.state();
            warn!(?state, badge_count, "cannot update bubble, it is not visible");
            return Err(OverlayError::InvalidTransition { state, operation: "update bubble" });
        }

        let result = self.renderer.update(&OverlayUpdate::Badge { badge_count }).await;

        if let Some(OverlayVariant::Bubble { badge_count: shown }) = &mut session.current {
            *shown = badge_count;
        }

        result.map_err(|source| {
            error!(error = %source, badge_count, "failed to update bubble");
            OverlayError::Render { operation: "update", source }
        })
    }

    /// Change fields of the visible card in place.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` if no card is showing
    /// - `Render` if the renderer rejects the update; the recorded trip is
    ///   left unchanged
    pub async fn update_card(&self, update: CardUpdate) -> Result<(), OverlayError> {
        let mut session = self.session.lock().await;

        if !matches!(session.current, Some(OverlayVariant::Card(_))) {
            let state = session.state();
            warn!(?state, "cannot update card, it is not visible");
            return Err(OverlayError::InvalidTransition { state, operation: "update card" });
        }

        if let Err(source) = self.renderer.update(&OverlayUpdate::Card(update.clone())).await {
            error!(error = %source, "failed to update card");
            return Err(OverlayError::Render { operation: "update", source });
        }

        if let Some(OverlayVariant::Card(trip)) = &mut session.current {
            trip.apply(&update);
        }
        Ok(())
    }

    /// The user tapped the bubble: open the card for the cached trip.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` if no bubble is showing or no trip is cached;
    ///   the renderer is not called
    /// - renderer failures from the show protocol
    pub async fn on_bubble_clicked(&self) -> Result<(), OverlayError> {
        let mut session = self.session.lock().await;

        let trip = match (&session.current, &session.bubble_context) {
            (Some(OverlayVariant::Bubble { .. }), Some(context)) => context.trip.clone(),
            _ => {
                let state = session.state();
                warn!(
                    ?state,
                    has_trip = session.bubble_context.is_some(),
                    "bubble clicked, but no trip data available"
                );
                return Err(OverlayError::InvalidTransition { state, operation: "open card" });
            },
        };

        info!("bubble clicked, opening trip card");
        self.show(&mut session, OverlayVariant::Card(trip)).await
    }

    /// The user accepted the trip: hide everything.
    ///
    /// # Errors
    ///
    /// Returns the renderer failure from the hide protocol.
    pub async fn on_trip_accepted(&self, final_fare: Option<f64>) -> Result<(), OverlayError> {
        let mut session = self.session.lock().await;
        info!(?final_fare, "trip accepted");

        self.hide(&mut session).await
    }

    /// The user ignored the trip: restore the bubble, or hide without one.
    ///
    /// # Errors
    ///
    /// Returns the renderer failure from the show or hide protocol.
    pub async fn on_trip_ignored(&self) -> Result<(), OverlayError> {
        info!("trip ignored");
        self.restore_bubble().await
    }

    /// The user declined the trip: restore the bubble, or hide without one.
    ///
    /// # Errors
    ///
    /// Returns the renderer failure from the show or hide protocol.
    pub async fn on_trip_declined(&self) -> Result<(), OverlayError> {
        info!("trip declined");
        self.restore_bubble().await
    }

    /// Re-render the recorded overlay after the app returns to the foreground.
    ///
    /// The OS may tear the window down while the app is in the background
    /// without telling anyone, so the recorded variant is shown again. Does
    /// nothing while `Hidden`.
    ///
    /// # Errors
    ///
    /// Returns the renderer failure; the state is then `Hidden`.
    pub async fn on_app_foreground(&self) -> Result<(), OverlayError> {
        let mut session = self.session.lock().await;

        let Some(variant) = session.current.clone() else {
            debug!("app in foreground, no overlay to re-show");
            return Ok(());
        };

        info!(state = ?variant.state(), "app in foreground, re-showing overlay");
        self.show(&mut session, variant).await
    }

    async fn restore_bubble(&self) -> Result<(), OverlayError> {
        let mut session = self.session.lock().await;

        match session.bubble_context.as_ref().map(|context| context.badge_count) {
            Some(badge_count) => {
                self.show(&mut session, OverlayVariant::Bubble { badge_count }).await
            },
            None => {
                debug!("no cached trip for bubble, hiding instead");
                self.hide(&mut session).await
            },
        }
    }

    async fn show(
        &self,
        session: &mut Session,
        variant: OverlayVariant,
    ) -> Result<(), OverlayError> {
        if session.current.is_some() {
            debug!(state = ?session.state(), "hiding current overlay before show");
            if let Err(source) = self.renderer.hide().await {
                error!(error = %source, "failed to hide overlay before show");
                session.current = None;
                return Err(OverlayError::Render { operation: "hide", source });
            }
        }

        let permission = self.permissions.ensure_granted().await;

        match self.renderer.show(&variant).await {
            Ok(()) => {
                info!(state = ?variant.state(), "overlay shown");
                session.current = Some(variant);
                Ok(())
            },
            Err(source) => {
                error!(error = %source, ?permission, "failed to show overlay");
                session.current = None;
                Err(show_error(permission, source))
            },
        }
    }

    async fn hide(&self, session: &mut Session) -> Result<(), OverlayError> {
        if session.current.is_none() {
            debug!("no overlay visible, nothing to hide");
            return Ok(());
        }

        match self.renderer.hide().await {
            Ok(()) => {
                session.clear();
                info!("overlay hidden and state cleared");
                Ok(())
            },
            Err(source) => {
                error!(error = %source, policy = ?self.hide_failure, "failed to hide overlay");
                if self.hide_failure == HideFailurePolicy::ForceHidden {
                    session.clear();
                }
                Err(OverlayError::Render { operation: "hide", source })
            },
        }
    }
}

fn show_error(permission: PermissionStatus, source: RenderError) -> OverlayError {
    if permission == PermissionStatus::Requested || source == RenderError::PermissionDenied {
        OverlayError::PermissionUnavailable { source }
    } else {
        OverlayError::Render { operation: "show", source }
    }
}

//! Consumer-facing entry point.
//!
//! [`OverlayService`] is built once by the composition root. It owns the
//! coordinator, the event router and a signal sender, and hands back the
//! [`OverlayRuntime`] that the caller must spawn.

use std::sync::Arc;

use tracing::info;

use crate::{
    config::OverlayConfig,
    coordinator::OverlayCoordinator,
    error::OverlayError,
    event::{OverlayEvent, OverlayEventKind},
    model::{CardUpdate, OverlaySnapshot, OverlayState, TripDetails},
    permission::PermissionProvider,
    renderer::Renderer,
    router::{EventRouter, Subscription},
    runtime::{OverlayRuntime, SignalSender},
};

/// Overlay API for the host application.
pub struct OverlayService<R, P> {
    coordinator: Arc<OverlayCoordinator<R, P>>,
    router: Arc<EventRouter>,
    signals: SignalSender,
}

impl<R: Renderer, P: PermissionProvider> OverlayService<R, P> {
    /// Wire the coordinator, router and runtime together.
    pub fn new(
        renderer: R,
        permissions: P,
        config: &OverlayConfig,
    ) -> (Self, OverlayRuntime<R, P>) {
        let coordinator = Arc::new(OverlayCoordinator::new(renderer, permissions, config));
        let router = Arc::new(EventRouter::new());
        let (runtime, signals) =
            OverlayRuntime::new(Arc::clone(&coordinator), Arc::clone(&router), config);

        info!(?config, "overlay service initialized");
        (Self { coordinator, router, signals }, runtime)
    }

    /// Underlying coordinator.
    pub fn coordinator(&self) -> &Arc<OverlayCoordinator<R, P>> {
        &self.coordinator
    }

    /// Sender for native events and app state transitions.
    pub fn signals(&self) -> SignalSender {
        self.signals.clone()
    }

    /// Current overlay state.
    pub async fn state(&self) -> OverlayState {
        self.coordinator.state().await
    }

    /// Copy of the recorded overlay and bubble context.
    pub async fn snapshot(&self) -> OverlaySnapshot {
        self.coordinator.snapshot().await
    }

    /// See [`OverlayCoordinator::show_bubble`].
    pub async fn show_bubble(
        &self,
        badge_count: u32,
        trip: TripDetails,
    ) -> Result<(), OverlayError> {
        self.coordinator.show_bubble(badge_count, trip).await
    }

    /// See [`OverlayCoordinator::show_trip_card`].
    pub async fn show_trip_card(&self, trip: TripDetails) -> Result<(), OverlayError> {
        self.coordinator.show_trip_card(trip).await
    }

    /// See [`OverlayCoordinator::hide_overlay`].
    pub async fn hide_overlay(&self) -> Result<(), OverlayError> {
        self.coordinator.hide_overlay().await
    }

    /// See [`OverlayCoordinator::update_bubble`].
    pub async fn update_bubble(&self, badge_count: u32) -> Result<(), OverlayError> {
        self.coordinator.update_bubble(badge_count).await
    }

    /// See [`OverlayCoordinator::update_card`].
    pub async fn update_card(&self, update: CardUpdate) -> Result<(), OverlayError> {
        self.coordinator.update_card(update).await
    }

    /// Observe native events of `kind`.
    pub fn subscribe<F>(&self, kind: OverlayEventKind, handler: F) -> Subscription
    where
        F: Fn(&OverlayEvent) + Send + Sync + 'static,
    {
        self.router.subscribe(kind, handler)
    }

    /// Stop observing with the handler behind `subscription`.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.router.unsubscribe(subscription)
    }

    /// Drop every observer of `kind`.
    pub fn remove_all_listeners(&self, kind: OverlayEventKind) -> usize {
        self.router.remove_all_listeners(kind)
    }

    /// Hide any overlay and release the service's signal sender.
    ///
    /// The runtime stops once every other [`SignalSender`] clone is dropped.
    ///
    /// # Errors
    ///
    /// Returns the renderer failure from the final hide.
    pub async fn shutdown(self) -> Result<(), OverlayError> {
        info!("overlay service shutting down");
        self.coordinator.hide_overlay().await
    }
}

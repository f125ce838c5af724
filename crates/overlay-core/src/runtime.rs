//! Signal loop connecting inbound events to the coordinator.
//!
//! Native events and app state transitions are queued on one channel and
//! handled one at a time. For each native event the runtime first notifies
//! external subscribers through the [`EventRouter`], then applies the
//! coordinator's own reaction:
//!
//! | signal | coordinator |
//! |---|---|
//! | `onBubbleClicked` | [`OverlayCoordinator::on_bubble_clicked`] |
//! | `onTripAccepted` | [`OverlayCoordinator::on_trip_accepted`] |
//! | `onTripIgnored` | [`OverlayCoordinator::on_trip_ignored`] |
//! | `onTripDeclined` | [`OverlayCoordinator::on_trip_declined`] |
//! | app becomes active | [`OverlayCoordinator::on_app_foreground`] |

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{
    config::OverlayConfig,
    coordinator::OverlayCoordinator,
    error::{OverlayError, SignalError},
    event::{OverlayEvent, Signal},
    lifecycle::{AppState, LifecycleObserver},
    permission::PermissionProvider,
    renderer::Renderer,
    router::EventRouter,
};

/// Sending half of the signal channel, handed to the native layer.
#[derive(Debug, Clone)]
pub struct SignalSender {
    sender: mpsc::UnboundedSender<Signal>,
}

impl SignalSender {
    /// Queue a signal.
    ///
    /// # Errors
    ///
    /// Returns `ChannelClosed` if the runtime is gone.
    pub fn send(&self, signal: Signal) -> Result<(), SignalError> {
        self.sender.send(signal).map_err(|_| SignalError::ChannelClosed)
    }

    /// Queue a native event.
    pub fn native(&self, event: OverlayEvent) -> Result<(), SignalError> {
        self.send(Signal::Native(event))
    }

    /// Queue a native event given by its bridge name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownEvent` for names the runtime does not handle.
    pub fn native_by_name(&self, name: &str, final_fare: Option<f64>) -> Result<(), SignalError> {
        self.native(OverlayEvent::from_native(name, final_fare)?)
    }

    /// Queue an app state transition.
    pub fn app_state(&self, state: AppState) -> Result<(), SignalError> {
        self.send(Signal::AppState(state))
    }
}

/// Processes inbound signals for one coordinator.
pub struct OverlayRuntime<R, P> {
    coordinator: Arc<OverlayCoordinator<R, P>>,
    router: Arc<EventRouter>,
    observer: LifecycleObserver,
    reassert_on_foreground: bool,
    signals: mpsc::UnboundedReceiver<Signal>,
}

impl<R: Renderer, P: PermissionProvider> OverlayRuntime<R, P> {
    /// Create a runtime and the sender that feeds it.
    pub fn new(
        coordinator: Arc<OverlayCoordinator<R, P>>,
        router: Arc<EventRouter>,
        config: &OverlayConfig,
    ) -> (Self, SignalSender) {
        let (sender, signals) = mpsc::unbounded_channel();
        let runtime = Self {
            coordinator,
            router,
            observer: LifecycleObserver::new(config.initial_app_state),
            reassert_on_foreground: config.reassert_on_foreground,
            signals,
        };
        (runtime, SignalSender { sender })
    }

    /// Last app state seen by the lifecycle observer.
    pub fn app_state(&self) -> AppState {
        self.observer.last()
    }

    /// Handle signals until every [`SignalSender`] is dropped.
    pub async fn run(mut self) {
        info!("overlay runtime started");
        while let Some(signal) = self.signals.recv().await {
            self.handle_logged(signal).await;
        }
        info!("signal channel closed, overlay runtime stopped");
    }

    /// Handle every signal already queued, without waiting for more.
    ///
    /// Returns the number of signals handled.
    pub async fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(signal) = self.signals.try_recv() {
            self.handle_logged(signal).await;
            handled += 1;
        }
        handled
    }

    /// Handle a single signal.
    ///
    /// # Errors
    ///
    /// Returns the coordinator's error for the signal.
    pub async fn handle(&mut self, signal: Signal) -> Result<(), OverlayError> {
        match signal {
            Signal::Native(event) => {
                let notified = self.router.emit(&event);
                debug!(event = %event.kind(), notified, "native event");
                self.dispatch(&event).await
            },
            Signal::AppState(state) => self.on_app_state(state).await,
        }
    }

    async fn handle_logged(&mut self, signal: Signal) {
        // The coordinator already logs at the appropriate level.
        if let Err(e) = self.handle(signal).await {
            debug!(error = %e, "signal not applied");
        }
    }

    async fn dispatch(&self, event: &OverlayEvent) -> Result<(), OverlayError> {
        match event {
            OverlayEvent::BubbleClicked => self.coordinator.on_bubble_clicked().await,
            OverlayEvent::TripAccepted { final_fare } => {
                self.coordinator.on_trip_accepted(*final_fare).await
            },
            OverlayEvent::TripIgnored => self.coordinator.on_trip_ignored().await,
            OverlayEvent::TripDeclined => self.coordinator.on_trip_declined().await,
        }
    }

    async fn on_app_state(&mut self, state: AppState) -> Result<(), OverlayError> {
        if !self.observer.observe(state) {
            return Ok(());
        }
        if !self.reassert_on_foreground {
            debug!("foreground re-show disabled");
            return Ok(());
        }
        self.coordinator.on_app_foreground().await
    }
}

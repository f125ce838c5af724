//! Executes demo commands against an overlay service.

use overlay_core::{
    CardUpdate, OverlayError, OverlayEvent, OverlayEventKind, OverlayService, PermissionProvider,
    Renderer, SignalError, SignalSender, Subscription, TripDetails,
};
use thiserror::Error;
use tracing::info;

use crate::commands::{Command, HELP};

/// Errors reported at the demo prompt.
#[derive(Debug, Error)]
pub enum DemoError {
    /// The coordinator rejected the request.
    #[error(transparent)]
    Overlay(#[from] OverlayError),

    /// The signal could not be queued.
    #[error(transparent)]
    Signal(#[from] SignalError),

    /// Command with missing or invalid arguments.
    #[error("/{command}: {error}")]
    InvalidCommand {
        /// Command name.
        command: String,
        /// What was wrong.
        error: String,
    },

    /// Input that is not a command.
    #[error("unknown command: {0} (try /help)")]
    UnknownCommand(String),

    /// Reading the prompt failed.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether the prompt should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command.
    Continue,
    /// Stop the demo.
    Quit,
}

/// Trip shown by `/bubble` and `/card`.
pub fn sample_trip() -> TripDetails {
    TripDetails {
        pickup_address: "Central Station, Gate 2".into(),
        dropoff_address: "123 Market Street, Downtown".into(),
        distance: "5.2 miles".into(),
        duration: "15 mins".into(),
        base_fare: "₹50".into(),
        customer_name: "Priya".into(),
        car_type: "Sedan".into(),
    }
}

/// Demo state: the service plus a sender standing in for the native layer.
pub struct DemoSession<R, P> {
    service: OverlayService<R, P>,
    signals: SignalSender,
}

impl<R: Renderer, P: PermissionProvider> DemoSession<R, P> {
    /// Wrap a service.
    pub fn new(service: OverlayService<R, P>) -> Self {
        let signals = service.signals();
        Self { service, signals }
    }

    /// Underlying service.
    pub fn service(&self) -> &OverlayService<R, P> {
        &self.service
    }

    /// Log every native event as it arrives.
    pub fn watch_events(&self) -> Vec<Subscription> {
        OverlayEventKind::ALL
            .into_iter()
            .map(|kind| {
                self.service.subscribe(kind, |event| match event {
                    OverlayEvent::TripAccepted { final_fare: Some(fare) } => {
                        info!("event: trip accepted, final fare {fare:.2}");
                    },
                    OverlayEvent::TripAccepted { final_fare: None } => {
                        info!("event: trip accepted, no final fare");
                    },
                    OverlayEvent::TripIgnored => info!("event: trip ignored"),
                    OverlayEvent::TripDeclined => info!("event: trip declined"),
                    OverlayEvent::BubbleClicked => info!("event: bubble clicked, showing card"),
                })
            })
            .collect()
    }

    /// Run one command.
    ///
    /// Native events and app state changes are only queued; the runtime
    /// applies them.
    pub async fn execute(&self, command: Command) -> Result<Flow, DemoError> {
        match command {
            Command::CheckPermission => {
                let granted = self.service.coordinator().permissions().check_granted().await;
                info!(granted, "overlay permission");
            },
            Command::RequestPermission => {
                self.service.coordinator().permissions().provider().request_grant();
                info!("permission grant flow opened");
            },
            Command::ShowBubble { badge_count } => {
                self.service.show_bubble(badge_count, sample_trip()).await?;
            },
            Command::ShowCard => self.service.show_trip_card(sample_trip()).await?,
            Command::Hide => self.service.hide_overlay().await?,
            Command::UpdateBadge { badge_count } => self.service.update_bubble(badge_count).await?,
            Command::UpdateFare { fare } => {
                let update = CardUpdate { base_fare: Some(fare), ..Default::default() };
                self.service.update_card(update).await?;
            },
            Command::Click => self.signals.native(OverlayEvent::BubbleClicked)?,
            Command::Accept { final_fare } => {
                self.signals.native(OverlayEvent::TripAccepted { final_fare })?;
            },
            Command::Ignore => self.signals.native(OverlayEvent::TripIgnored)?,
            Command::Decline => self.signals.native(OverlayEvent::TripDeclined)?,
            Command::AppState(state) => self.signals.app_state(state)?,
            Command::State => {
                let snapshot = self.service.snapshot().await;
                info!(
                    state = ?snapshot.state(),
                    current = ?snapshot.current,
                    bubble_context = ?snapshot.bubble_context,
                    "overlay state"
                );
            },
            Command::Help => {
                for line in HELP {
                    info!("{line}");
                }
            },
            Command::Quit => return Ok(Flow::Quit),
            Command::Empty => {},
            Command::Unknown { input } => return Err(DemoError::UnknownCommand(input)),
            Command::InvalidArgs { command, error } => {
                return Err(DemoError::InvalidCommand { command, error });
            },
        }
        Ok(Flow::Continue)
    }

    /// Hide the overlay and release the signal senders so the runtime stops.
    pub async fn shutdown(self) -> Result<(), DemoError> {
        drop(self.signals);
        self.service.shutdown().await?;
        Ok(())
    }
}

//! Reference model of the overlay coordinator.
//!
//! A plain synchronous rendition of the coordinator and the simulated window,
//! with no async, locking or logging. Property tests run the same operation
//! sequence against the model and the real coordinator and compare results.

use std::collections::HashMap;

use overlay_core::{
    AppState, BubbleContext, OverlaySnapshot, OverlayState, OverlayUpdate, OverlayVariant,
    TripDetails,
};

use crate::sim_renderer::RendererOp;

/// Operation applied to both the model and the real system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Consumer shows the bubble.
    ShowBubble {
        /// Badge count.
        badge_count: u8,
        /// Seed for the trip details.
        trip: u8,
    },
    /// Consumer shows the card.
    ShowCard {
        /// Seed for the trip details.
        trip: u8,
    },
    /// Consumer hides the overlay.
    Hide,
    /// Consumer updates the bubble badge.
    UpdateBadge {
        /// New badge count.
        badge_count: u8,
    },
    /// Native `onBubbleClicked`.
    BubbleClicked,
    /// Native `onTripAccepted`.
    TripAccepted,
    /// Native `onTripIgnored`.
    TripIgnored,
    /// Native `onTripDeclined`.
    TripDeclined,
    /// App moves to the background.
    AppBackground,
    /// App returns to the foreground.
    AppForeground,
    /// Arm a failure for the next renderer call of this kind.
    FailNext(RendererOp),
    /// The OS removes the window behind the coordinator's back.
    OsDropsWindow,
}

impl Operation {
    /// Whether this operation makes the screen diverge from the recorded state.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::FailNext(_) | Self::OsDropsWindow)
    }
}

/// Deterministic trip details for a seed.
pub fn trip_details(seed: u8) -> TripDetails {
    TripDetails {
        pickup_address: format!("{seed} Pickup Rd"),
        dropoff_address: format!("{seed} Dropoff Ave"),
        distance: format!("{}.{} km", seed / 10, seed % 10),
        duration: format!("{} min", u32::from(seed) + 1),
        base_fare: format!("{}.00", u32::from(seed) * 2),
        customer_name: format!("customer-{seed}"),
        car_type: if seed % 2 == 0 { "sedan".into() } else { "suv".into() },
    }
}

/// Outcome of a model operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelOutcome {
    /// Operation succeeded.
    Ok,
    /// The renderer failed.
    RenderFailed,
    /// Operation not legal in the current state.
    InvalidTransition,
}

impl ModelOutcome {
    /// Whether the operation succeeded.
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

/// Reference model of coordinator plus window.
#[derive(Debug, Clone)]
pub struct ModelOverlay {
    current: Option<OverlayVariant>,
    bubble_context: Option<BubbleContext>,
    window: Option<OverlayVariant>,
    armed: HashMap<RendererOp, usize>,
    app_state: AppState,
}

impl Default for ModelOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelOverlay {
    /// Hidden overlay, app in the foreground.
    pub fn new() -> Self {
        Self {
            current: None,
            bubble_context: None,
            window: None,
            armed: HashMap::new(),
            app_state: AppState::Active,
        }
    }

    /// Recorded coordinator state.
    pub fn snapshot(&self) -> OverlaySnapshot {
        OverlaySnapshot {
            current: self.current.clone(),
            bubble_context: self.bubble_context.clone(),
        }
    }

    /// Coordinator state.
    pub fn state(&self) -> OverlayState {
        OverlayState::of(self.current.as_ref())
    }

    /// What the window would show.
    pub fn window(&self) -> Option<&OverlayVariant> {
        self.window.as_ref()
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: &Operation) -> ModelOutcome {
        match op {
            Operation::ShowBubble { badge_count, trip } => {
                let badge_count = u32::from(*badge_count);
                self.bubble_context =
                    Some(BubbleContext { trip: trip_details(*trip), badge_count });
                self.show(OverlayVariant::Bubble { badge_count })
            },
            Operation::ShowCard { trip } => self.show(OverlayVariant::Card(trip_details(*trip))),
            Operation::Hide | Operation::TripAccepted => self.hide(),
            Operation::UpdateBadge { badge_count } => self.update_badge(u32::from(*badge_count)),
            Operation::BubbleClicked => match (&self.current, &self.bubble_context) {
                (Some(OverlayVariant::Bubble { .. }), Some(context)) => {
                    let trip = context.trip.clone();
                    self.show(OverlayVariant::Card(trip))
                },
                _ => ModelOutcome::InvalidTransition,
            },
            Operation::TripIgnored | Operation::TripDeclined => {
                match self.bubble_context.as_ref().map(|context| context.badge_count) {
                    Some(badge_count) => self.show(OverlayVariant::Bubble { badge_count }),
                    None => self.hide(),
                }
            },
            Operation::AppBackground => {
                self.app_state = AppState::Background;
                ModelOutcome::Ok
            },
            Operation::AppForeground => {
                let entered = self.app_state != AppState::Active;
                self.app_state = AppState::Active;
                match self.current.clone() {
                    Some(variant) if entered => self.show(variant),
                    _ => ModelOutcome::Ok,
                }
            },
            Operation::FailNext(op) => {
                *self.armed.entry(*op).or_insert(0) += 1;
                ModelOutcome::Ok
            },
            Operation::OsDropsWindow => {
                self.window = None;
                ModelOutcome::Ok
            },
        }
    }

    fn show(&mut self, variant: OverlayVariant) -> ModelOutcome {
        if self.current.is_some() && !self.window_hide() {
            self.current = None;
            return ModelOutcome::RenderFailed;
        }

        if self.window_show(&variant) {
            self.current = Some(variant);
            ModelOutcome::Ok
        } else {
            self.current = None;
            ModelOutcome::RenderFailed
        }
    }

    fn hide(&mut self) -> ModelOutcome {
        if self.current.is_none() {
            return ModelOutcome::Ok;
        }

        if self.window_hide() {
            self.current = None;
            self.bubble_context = None;
            ModelOutcome::Ok
        } else {
            ModelOutcome::RenderFailed
        }
    }

    fn update_badge(&mut self, badge_count: u32) -> ModelOutcome {
        if !matches!(self.current, Some(OverlayVariant::Bubble { .. })) {
            return ModelOutcome::InvalidTransition;
        }

        let rendered = self.window_update(&OverlayUpdate::Badge { badge_count });

        if let Some(OverlayVariant::Bubble { badge_count: shown }) = &mut self.current {
            *shown = badge_count;
        }

        if rendered { ModelOutcome::Ok } else { ModelOutcome::RenderFailed }
    }

    fn take_fault(&mut self, op: RendererOp) -> bool {
        match self.armed.get_mut(&op) {
            Some(armed) if *armed > 0 => {
                *armed -= 1;
                true
            },
            _ => false,
        }
    }

    fn window_show(&mut self, variant: &OverlayVariant) -> bool {
        if self.take_fault(RendererOp::Show) || self.window.is_some() {
            return false;
        }
        self.window = Some(variant.clone());
        true
    }

    fn window_hide(&mut self) -> bool {
        if self.take_fault(RendererOp::Hide) {
            return false;
        }
        self.window = None;
        true
    }

    fn window_update(&mut self, update: &OverlayUpdate) -> bool {
        if self.take_fault(RendererOp::Update) {
            return false;
        }
        match (self.window.as_mut(), update) {
            (None, _) => false,
            (
                Some(OverlayVariant::Bubble { badge_count }),
                OverlayUpdate::Badge { badge_count: new },
            ) => {
                *badge_count = *new;
                true
            },
            (Some(_), _) => true,
        }
    }
}

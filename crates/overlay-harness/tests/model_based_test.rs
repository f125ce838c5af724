//! Model-based property tests.
//!
//! Random operation sequences are applied to the reference model and to the
//! real service driven through its runtime. Outcomes, recorded state and the
//! simulated window must agree after every step.
//!
//! ```text
//! proptest generates: Vec<Operation>
//!                          │
//!           ┌──────────────┼──────────────┐
//!           ▼              ▼              ▼
//!      ModelOverlay    RealOverlay     Compare
//!      (reference)   (SimRenderer)    Results
//! ```

use overlay_core::{
    AppState, OverlayConfig, OverlayError, OverlayEvent, OverlayRuntime, OverlayService,
    OverlaySnapshot, OverlayVariant, Signal,
};
use overlay_harness::{
    ModelOutcome, ModelOverlay, Operation, RendererOp, SimPermission, SimRenderer, trip_details,
};
use proptest::prelude::*;
use tokio::runtime::{Builder, Runtime};

/// Real system wrapper that mirrors `ModelOverlay`'s interface.
struct RealOverlay {
    rt: Runtime,
    service: OverlayService<SimRenderer, SimPermission>,
    runtime: OverlayRuntime<SimRenderer, SimPermission>,
    renderer: SimRenderer,
}

impl RealOverlay {
    fn new() -> Self {
        let rt = Builder::new_current_thread().enable_time().build().unwrap();
        let renderer = SimRenderer::new();
        let config = OverlayConfig::default();
        let (service, runtime) =
            OverlayService::new(renderer.clone(), SimPermission::granted(), &config);

        Self { rt, service, runtime, renderer }
    }

    fn apply(&mut self, op: &Operation) -> ModelOutcome {
        let Self { rt, service, runtime, renderer } = self;

        let result = rt.block_on(async {
            match op {
                Operation::ShowBubble { badge_count, trip } => {
                    service.show_bubble(u32::from(*badge_count), trip_details(*trip)).await
                },
                Operation::ShowCard { trip } => service.show_trip_card(trip_details(*trip)).await,
                Operation::Hide => service.hide_overlay().await,
                Operation::UpdateBadge { badge_count } => {
                    service.update_bubble(u32::from(*badge_count)).await
                },
                Operation::BubbleClicked => {
                    runtime.handle(Signal::Native(OverlayEvent::BubbleClicked)).await
                },
                Operation::TripAccepted => {
                    let event = OverlayEvent::TripAccepted { final_fare: None };
                    runtime.handle(Signal::Native(event)).await
                },
                Operation::TripIgnored => {
                    runtime.handle(Signal::Native(OverlayEvent::TripIgnored)).await
                },
                Operation::TripDeclined => {
                    runtime.handle(Signal::Native(OverlayEvent::TripDeclined)).await
                },
                Operation::AppBackground => {
                    runtime.handle(Signal::AppState(AppState::Background)).await
                },
                Operation::AppForeground => {
                    runtime.handle(Signal::AppState(AppState::Active)).await
                },
                Operation::FailNext(op) => {
                    renderer.fail_next(*op);
                    Ok(())
                },
                Operation::OsDropsWindow => {
                    renderer.drop_window();
                    Ok(())
                },
            }
        });

        match result {
            Ok(()) => ModelOutcome::Ok,
            Err(OverlayError::InvalidTransition { .. }) => ModelOutcome::InvalidTransition,
            Err(OverlayError::Render { .. } | OverlayError::PermissionUnavailable { .. }) => {
                ModelOutcome::RenderFailed
            },
        }
    }

    fn snapshot(&self) -> OverlaySnapshot {
        self.rt.block_on(self.service.snapshot())
    }

    fn window(&self) -> Option<OverlayVariant> {
        self.renderer.window()
    }
}

fn renderer_op_strategy() -> impl Strategy<Value = RendererOp> {
    prop_oneof![Just(RendererOp::Show), Just(RendererOp::Hide), Just(RendererOp::Update)]
}

/// Operations a consumer, the user or the host app can cause. Small trip
/// seeds make repeated trips likely.
fn operation_strategy() -> impl Strategy<Value = Operation> {
    let trip = 0..4u8;
    let badge = 0..10u8;

    prop_oneof![
        4 => (badge.clone(), trip.clone()).prop_map(|(badge_count, trip)| {
            Operation::ShowBubble { badge_count, trip }
        }),
        3 => trip.prop_map(|trip| Operation::ShowCard { trip }),
        2 => Just(Operation::Hide),
        2 => badge.prop_map(|badge_count| Operation::UpdateBadge { badge_count }),
        3 => Just(Operation::BubbleClicked),
        1 => Just(Operation::TripAccepted),
        2 => Just(Operation::TripIgnored),
        2 => Just(Operation::TripDeclined),
        1 => Just(Operation::AppBackground),
        1 => Just(Operation::AppForeground),
    ]
}

/// Regular operations mixed with renderer faults and OS interference.
fn faulty_operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        10 => operation_strategy(),
        1 => renderer_op_strategy().prop_map(Operation::FailNext),
        1 => Just(Operation::OsDropsWindow),
    ]
}

proptest! {
    /// Outcomes and recorded state match the model, faults included.
    #[test]
    fn prop_model_matches_real(ops in prop::collection::vec(faulty_operation_strategy(), 0..60)) {
        let mut model = ModelOverlay::new();
        let mut real = RealOverlay::new();

        for (i, op) in ops.iter().enumerate() {
            let model_result = model.apply(op);
            let real_result = real.apply(op);

            prop_assert_eq!(
                model_result,
                real_result,
                "Divergence at operation {}: {:?}",
                i, op
            );
            prop_assert_eq!(model.snapshot(), real.snapshot(), "State diverged after {:?}", op);
            let window = real.window();
            prop_assert_eq!(model.window(), window.as_ref(), "Window diverged after {:?}", op);
        }
    }

    /// Without faults the window always shows exactly the recorded variant.
    #[test]
    fn prop_window_matches_state_without_faults(
        ops in prop::collection::vec(operation_strategy(), 0..60)
    ) {
        let mut real = RealOverlay::new();

        for op in &ops {
            let outcome = real.apply(op);
            prop_assert_ne!(outcome, ModelOutcome::RenderFailed, "{:?} failed", op);
            let snapshot = real.snapshot();
            prop_assert_eq!(real.window(), snapshot.current, "Window diverged after {:?}", op);
        }
    }

    /// Dismissing the card restores the badge the bubble was shown with,
    /// not a later in-place update.
    #[test]
    fn prop_dismiss_restores_badge_from_show(
        first in 0..10u8,
        second in 0..10u8,
        trip in 0..4u8,
        decline in any::<bool>(),
    ) {
        let mut real = RealOverlay::new();
        real.apply(&Operation::ShowBubble { badge_count: first, trip });
        real.apply(&Operation::UpdateBadge { badge_count: second });
        real.apply(&Operation::BubbleClicked);
        prop_assert_eq!(real.window(), Some(OverlayVariant::Card(trip_details(trip))));

        let dismiss = if decline { Operation::TripDeclined } else { Operation::TripIgnored };
        prop_assert!(real.apply(&dismiss).is_ok());

        prop_assert_eq!(
            real.window(),
            Some(OverlayVariant::Bubble { badge_count: u32::from(first) })
        );
    }
}

//! End-to-end overlay scenarios against the simulated renderer.

use overlay_core::{
    BubbleContext, OverlayConfig, OverlayCoordinator, OverlayError, OverlayState,
    OverlayVariant, RenderError,
};
use overlay_harness::{
    GrantBehavior, RendererCall, RendererOp, SimPermission, SimRenderer, trip_details,
};

fn coordinator() -> OverlayCoordinator<SimRenderer, SimPermission> {
    OverlayCoordinator::new(SimRenderer::new(), SimPermission::granted(), &OverlayConfig::default())
}

#[tokio::test]
async fn hide_then_show_starts_from_clean_state() {
    let c = coordinator();

    c.show_bubble(2, trip_details(1)).await.unwrap();
    c.hide_overlay().await.unwrap();
    c.show_trip_card(trip_details(2)).await.unwrap();

    let snapshot = c.snapshot().await;
    assert_eq!(snapshot.current, Some(OverlayVariant::Card(trip_details(2))));
    assert_eq!(snapshot.bubble_context, None);
    assert_eq!(
        c.renderer().calls(),
        vec![
            RendererCall::Show(OverlayVariant::Bubble { badge_count: 2 }),
            RendererCall::Hide,
            RendererCall::Show(OverlayVariant::Card(trip_details(2))),
        ]
    );
}

#[tokio::test]
async fn bubble_reshown_after_hide_uses_new_trip() {
    let c = coordinator();

    c.show_bubble(2, trip_details(1)).await.unwrap();
    c.hide_overlay().await.unwrap();
    assert_eq!(c.snapshot().await.bubble_context, None);
    c.show_bubble(5, trip_details(2)).await.unwrap();

    let snapshot = c.snapshot().await;
    assert_eq!(snapshot.current, Some(OverlayVariant::Bubble { badge_count: 5 }));
    assert_eq!(
        snapshot.bubble_context,
        Some(BubbleContext { trip: trip_details(2), badge_count: 5 })
    );
    assert_eq!(
        c.renderer().calls(),
        vec![
            RendererCall::Show(OverlayVariant::Bubble { badge_count: 2 }),
            RendererCall::Hide,
            RendererCall::Show(OverlayVariant::Bubble { badge_count: 5 }),
        ]
    );
}

#[tokio::test]
async fn bubble_click_opens_card_for_cached_trip() {
    let c = coordinator();
    c.show_bubble(3, trip_details(7)).await.unwrap();
    c.renderer().clear_calls();

    c.on_bubble_clicked().await.unwrap();

    assert_eq!(
        c.renderer().calls(),
        vec![RendererCall::Hide, RendererCall::Show(OverlayVariant::Card(trip_details(7)))]
    );
    assert_eq!(c.state().await, OverlayState::ShowingCard);
    assert_eq!(c.renderer().window(), Some(OverlayVariant::Card(trip_details(7))));
}

#[tokio::test]
async fn bubble_click_without_trip_does_nothing() {
    let c = coordinator();

    let result = c.on_bubble_clicked().await;

    assert_eq!(
        result,
        Err(OverlayError::InvalidTransition { state: OverlayState::Hidden, operation: "open card" })
    );
    assert!(c.renderer().calls().is_empty());
}

#[tokio::test]
async fn ignoring_card_without_bubble_hides_once() {
    let c = coordinator();
    c.show_trip_card(trip_details(4)).await.unwrap();
    c.renderer().clear_calls();

    c.on_trip_ignored().await.unwrap();

    assert_eq!(c.renderer().calls(), vec![RendererCall::Hide]);
    assert_eq!(c.state().await, OverlayState::Hidden);
    assert_eq!(c.renderer().window(), None);
}

#[tokio::test]
async fn declining_card_restores_cached_bubble() {
    let c = coordinator();
    c.show_bubble(2, trip_details(9)).await.unwrap();
    c.show_trip_card(trip_details(5)).await.unwrap();
    c.renderer().clear_calls();

    c.on_trip_declined().await.unwrap();

    assert_eq!(
        c.renderer().calls(),
        vec![RendererCall::Hide, RendererCall::Show(OverlayVariant::Bubble { badge_count: 2 })]
    );
    let snapshot = c.snapshot().await;
    assert_eq!(snapshot.current, Some(OverlayVariant::Bubble { badge_count: 2 }));
    assert_eq!(
        snapshot.bubble_context,
        Some(BubbleContext { trip: trip_details(9), badge_count: 2 })
    );
}

#[tokio::test]
async fn accepting_trip_clears_everything() {
    let c = coordinator();
    c.show_bubble(1, trip_details(3)).await.unwrap();
    c.on_bubble_clicked().await.unwrap();

    c.on_trip_accepted(Some(18.5)).await.unwrap();

    assert_eq!(c.snapshot().await.state(), OverlayState::Hidden);
    assert_eq!(c.snapshot().await.bubble_context, None);
    assert_eq!(c.renderer().window(), None);

    // The bubble session is over: declining now has nothing to restore.
    c.on_trip_declined().await.unwrap();
    assert_eq!(c.renderer().window(), None);
}

#[tokio::test]
async fn badge_update_after_click_is_rejected() {
    let c = coordinator();
    c.show_bubble(1, trip_details(3)).await.unwrap();
    c.on_bubble_clicked().await.unwrap();
    c.renderer().clear_calls();

    let result = c.update_bubble(6).await;

    assert!(matches!(result, Err(OverlayError::InvalidTransition { .. })));
    assert!(c.renderer().calls().is_empty());
}

#[tokio::test]
async fn badge_update_reaches_window() {
    let c = coordinator();
    c.show_bubble(1, trip_details(3)).await.unwrap();

    c.update_bubble(6).await.unwrap();

    assert_eq!(c.renderer().window(), Some(OverlayVariant::Bubble { badge_count: 6 }));
}

#[tokio::test]
async fn dismiss_restores_badge_from_show_not_update() {
    let c = coordinator();
    c.show_bubble(2, trip_details(3)).await.unwrap();
    c.update_bubble(5).await.unwrap();
    c.on_bubble_clicked().await.unwrap();

    c.on_trip_declined().await.unwrap();

    assert_eq!(c.renderer().window(), Some(OverlayVariant::Bubble { badge_count: 2 }));
    assert_eq!(c.snapshot().await.bubble_context.map(|ctx| ctx.badge_count), Some(2));
}

#[tokio::test]
async fn hide_while_hidden_keeps_context_for_ignore() {
    let c = coordinator();
    c.renderer().fail_next(RendererOp::Show);
    assert!(c.show_bubble(2, trip_details(9)).await.is_err());

    c.hide_overlay().await.unwrap();
    c.on_trip_ignored().await.unwrap();

    assert_eq!(c.renderer().window(), Some(OverlayVariant::Bubble { badge_count: 2 }));
    assert_eq!(c.state().await, OverlayState::ShowingBubble);
}

#[tokio::test]
async fn accept_while_hidden_keeps_context() {
    let c = coordinator();
    c.renderer().fail_next(RendererOp::Show);
    assert!(c.show_bubble(4, trip_details(6)).await.is_err());
    c.renderer().clear_calls();

    c.on_trip_accepted(Some(12.5)).await.unwrap();

    assert!(c.renderer().calls().is_empty());
    let snapshot = c.snapshot().await;
    assert_eq!(snapshot.state(), OverlayState::Hidden);
    assert_eq!(
        snapshot.bubble_context,
        Some(BubbleContext { trip: trip_details(6), badge_count: 4 })
    );
}

#[tokio::test]
async fn failed_show_leaves_state_hidden() {
    let c = coordinator();
    c.renderer().fail_next(RendererOp::Show);

    let result = c.show_trip_card(trip_details(1)).await;

    assert!(matches!(
        result,
        Err(OverlayError::Render { operation: "show", source: RenderError::Platform(_) })
    ));
    assert_eq!(c.state().await, OverlayState::Hidden);

    // Nothing left behind: the next show does not pre-hide.
    c.renderer().clear_calls();
    c.show_trip_card(trip_details(1)).await.unwrap();
    assert_eq!(
        c.renderer().calls(),
        vec![RendererCall::Show(OverlayVariant::Card(trip_details(1)))]
    );
}

#[tokio::test]
async fn failed_pre_hide_aborts_show() {
    let c = coordinator();
    c.show_bubble(1, trip_details(1)).await.unwrap();
    c.renderer().fail_next(RendererOp::Hide);

    let result = c.show_trip_card(trip_details(2)).await;

    assert!(matches!(result, Err(OverlayError::Render { operation: "hide", .. })));
    assert_eq!(c.state().await, OverlayState::Hidden);
    assert_eq!(c.renderer().calls().last(), Some(&RendererCall::Hide));
}

#[tokio::test]
async fn missing_permission_opens_grant_flow() {
    let permission = SimPermission::denied(GrantBehavior::Never);
    let renderer = SimRenderer::new().with_permission(permission.clone());
    let c = OverlayCoordinator::new(renderer, permission.clone(), &OverlayConfig::default());

    let result = c.show_bubble(1, trip_details(1)).await;

    assert_eq!(
        result,
        Err(OverlayError::PermissionUnavailable { source: RenderError::PermissionDenied })
    );
    assert_eq!(permission.requests(), 1);
    assert_eq!(c.state().await, OverlayState::Hidden);
}

#[tokio::test]
async fn immediate_grant_lets_show_succeed() {
    let permission = SimPermission::denied(GrantBehavior::Immediate);
    let renderer = SimRenderer::new().with_permission(permission.clone());
    let c = OverlayCoordinator::new(renderer, permission.clone(), &OverlayConfig::default());

    c.show_bubble(1, trip_details(1)).await.unwrap();

    assert_eq!(permission.requests(), 1);
    assert!(permission.is_granted());
    assert_eq!(c.state().await, OverlayState::ShowingBubble);
}

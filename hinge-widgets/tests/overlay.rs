//! Tests for overlay placement, fuzzy matching and the Popover widget.

use hinge::{DisclosurePolicy, InputEvent, Key, Rect};
use hinge_widgets::{
    EventContext, EventResult, FlipResolver, FuzzyMatcher, Placement, Popover, PositionResolver,
    WidgetEvent, WidgetEventKind, dispatch,
};
use tokio::sync::mpsc::UnboundedReceiver;

const SCREEN: Rect = Rect::new(0, 0, 80, 24);

fn drain(rx: &mut UnboundedReceiver<WidgetEvent>) -> Vec<WidgetEventKind> {
    let mut kinds = Vec::new();
    while let Ok(event) = rx.try_recv() {
        kinds.push(event.kind);
    }
    kinds
}

// ============================================================================
// FlipResolver
// ============================================================================

#[test]
fn test_below_when_it_fits() {
    let anchor = Rect::new(5, 5, 10, 1);
    let panel = FlipResolver.resolve(SCREEN, anchor, (12, 4), Placement::Below);
    assert_eq!(panel, Rect::new(5, 6, 12, 4));
}

#[test]
fn test_below_flips_above_near_bottom_edge() {
    let anchor = Rect::new(5, 22, 10, 1);
    let panel = FlipResolver.resolve(SCREEN, anchor, (12, 4), Placement::Below);
    assert_eq!(panel, Rect::new(5, 18, 12, 4));
}

#[test]
fn test_above_flips_below_near_top_edge() {
    let anchor = Rect::new(5, 1, 10, 1);
    let panel = FlipResolver.resolve(SCREEN, anchor, (12, 4), Placement::Above);
    assert_eq!(panel, Rect::new(5, 2, 12, 4));
}

#[test]
fn test_panel_is_clamped_horizontally() {
    let anchor = Rect::new(75, 5, 5, 1);
    let panel = FlipResolver.resolve(SCREEN, anchor, (12, 4), Placement::Below);
    assert_eq!(panel, Rect::new(68, 6, 12, 4));
}

#[test]
fn test_right_flips_to_left_side() {
    let anchor = Rect::new(70, 3, 10, 1);
    let panel = FlipResolver.resolve(SCREEN, anchor, (10, 3), Placement::Right);
    assert_eq!(panel, Rect::new(60, 3, 10, 3));
}

#[test]
fn test_at_point_stays_on_screen() {
    let panel = FlipResolver.resolve(
        SCREEN,
        Rect::new(78, 23, 0, 0),
        (6, 1),
        Placement::AtPoint { x: 78, y: 23 },
    );
    assert_eq!(panel, Rect::new(74, 23, 6, 1));
}

#[test]
fn test_oversized_panel_shrinks_to_screen() {
    let anchor = Rect::new(5, 5, 10, 1);
    let panel = FlipResolver.resolve(SCREEN, anchor, (100, 30), Placement::Below);
    assert_eq!(panel, SCREEN);
}

// ============================================================================
// FuzzyMatcher
// ============================================================================

#[test]
fn test_fuzzy_subsequence_ignores_case() {
    let matcher = FuzzyMatcher::new();
    assert!(matcher.score("gmy", "Germany").is_some());
    assert!(matcher.score("GER", "germany").is_some());
    assert_eq!(matcher.score("xyz", "Germany"), None);
}

#[test]
fn test_fuzzy_empty_query_matches_everything() {
    let matcher = FuzzyMatcher::default();
    assert_eq!(matcher.score("", "anything"), Some(0));
}

#[test]
fn test_fuzzy_rank_orders_by_score() {
    let matcher = FuzzyMatcher::new();
    let ranked = matcher.rank("an", ["Germany", "France", "Gambia"]);

    let mut indices: Vec<usize> = ranked.iter().map(|m| m.index).collect();
    indices.sort_unstable();
    assert_eq!(indices, [0, 1], "Gambia has no 'n'");
    assert!(ranked.windows(2).all(|pair| pair[0].score >= pair[1].score));
}

// ============================================================================
// Popover
// ============================================================================

fn anchored_popover() -> Popover {
    let popover = Popover::new(20, 5);
    popover.set_trigger_rect(Rect::new(0, 0, 10, 1));
    popover
}

#[test]
fn test_popover_trigger_and_outside_press() {
    let (cx, mut rx) = EventContext::channel();
    let popover = anchored_popover();

    dispatch(&popover, &InputEvent::click(1, 0), &cx);
    assert!(popover.is_open());
    assert_eq!(popover.place(SCREEN, &FlipResolver), Some(Rect::new(0, 1, 20, 5)));

    // Panel content belongs to the host
    let inside = dispatch(&popover, &InputEvent::click(5, 3), &cx);
    assert_eq!(inside, EventResult::Ignored);
    assert!(popover.is_open());

    let outside = dispatch(&popover, &InputEvent::click(50, 20), &cx);
    assert_eq!(outside, EventResult::Ignored);
    assert!(!popover.is_open());
    assert_eq!(
        drain(&mut rx),
        [WidgetEventKind::Open, WidgetEventKind::Close]
    );
}

#[test]
fn test_popover_keyboard() {
    let cx = EventContext::detached();
    let popover = anchored_popover();

    assert_eq!(
        dispatch(&popover, &InputEvent::key(Key::Escape), &cx),
        EventResult::Ignored
    );
    dispatch(&popover, &InputEvent::key(Key::Enter), &cx);
    assert!(popover.is_open());
    dispatch(&popover, &InputEvent::key(Key::Escape), &cx);
    assert!(!popover.is_open());
}

#[test]
fn test_popover_content_selection_follows_policy() {
    let popover = anchored_popover();
    popover.open();
    assert!(popover.content_selected());
    assert!(!popover.is_open());

    let sticky = anchored_popover().with_policy(DisclosurePolicy::checklist());
    sticky.open();
    assert!(!sticky.content_selected());
    assert!(sticky.is_open());
}

#[test]
fn test_popover_placement_and_default_open() {
    let popover = Popover::new(20, 5)
        .with_placement(Placement::Above)
        .default_open();
    popover.set_trigger_rect(Rect::new(0, 10, 10, 1));
    assert!(popover.is_open());
    assert_eq!(popover.place(SCREEN, &FlipResolver), Some(Rect::new(0, 5, 20, 5)));

    popover.set_size(4, 2);
    assert_eq!(popover.place(SCREEN, &FlipResolver), Some(Rect::new(0, 8, 4, 2)));
}

#[test]
fn test_closed_popover_has_no_panel() {
    let popover = anchored_popover();
    assert_eq!(popover.place(SCREEN, &FlipResolver), None);
    assert!(popover.toggle());
    assert!(popover.place(SCREEN, &FlipResolver).is_some());
}

//! Tests for the disclosure lifecycle, dismissal listeners and sub-menus.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use hinge::{
    Disclosure, DisclosurePolicy, DismissReason, InputEvent, InputSurface, Key, KeyPress,
    ListenerKind, Point, Rect,
};

fn menu(surface: &InputSurface) -> Disclosure {
    let menu = Disclosure::new(DisclosurePolicy::single_select()).with_surface(surface.clone());
    menu.set_trigger_rect(Rect::new(0, 0, 10, 1));
    menu.set_panel_rect(Rect::new(0, 1, 10, 5));
    menu
}

/// Parent menu with a sub-menu whose trigger is the parent's second row and
/// whose panel sits to the right.
fn menu_with_submenu(surface: &InputSurface) -> (Disclosure, Disclosure) {
    let parent = menu(surface);
    let child = Disclosure::child_of(&parent, DisclosurePolicy::single_select());
    child.set_trigger_rect(Rect::new(0, 2, 10, 1));
    child.set_panel_rect(Rect::new(10, 2, 10, 4));
    (parent, child)
}

// ============================================================================
// Open / close
// ============================================================================

#[test]
fn test_activate_opens_and_attaches_listeners() {
    hinge::logging::init_test_logger();
    let surface = InputSurface::new();
    let menu = menu(&surface);

    assert!(!menu.is_open());
    assert_eq!(surface.listener_count(), 0);

    assert!(menu.activate());
    assert!(menu.is_open());
    assert_eq!(surface.listener_count_of(ListenerKind::KeyDown), 1);
    assert_eq!(surface.listener_count_of(ListenerKind::PointerDown), 1);
    // Top-level disclosures do not track hover.
    assert_eq!(surface.listener_count_of(ListenerKind::PointerMove), 0);

    assert!(!menu.activate(), "second activate is a no-op");
    assert_eq!(surface.listener_count(), 2);
}

#[test]
fn test_dismiss_is_idempotent() {
    let surface = InputSurface::new();
    let menu = menu(&surface);
    menu.activate();

    assert!(menu.close());
    assert!(!menu.close());
    assert!(!menu.dismiss(DismissReason::CancelKey));
    assert_eq!(menu.last_dismiss_reason(), Some(DismissReason::Explicit));
    assert_eq!(surface.listener_count(), 0);
}

#[test]
fn test_toggle() {
    let surface = InputSurface::new();
    let menu = menu(&surface);
    assert!(menu.toggle());
    assert!(menu.is_open());
    assert!(menu.toggle());
    assert!(!menu.is_open());
    assert_eq!(menu.last_dismiss_reason(), Some(DismissReason::Explicit));
}

#[test]
fn test_open_change_callback_fires_per_transition() {
    let surface = InputSurface::new();
    let menu = menu(&surface);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    menu.on_open_change(move |open| sink.lock().unwrap().push(open));

    menu.activate();
    menu.activate();
    menu.close();
    menu.close();
    assert_eq!(*seen.lock().unwrap(), vec![true, false]);
}

#[test]
fn test_dismiss_callback_receives_reason() {
    let surface = InputSurface::new();
    let menu = menu(&surface);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    menu.on_dismiss(move |reason| sink.lock().unwrap().push(reason));

    menu.activate();
    surface.dispatch(&InputEvent::key(Key::Escape));
    menu.activate();
    menu.close();
    menu.close();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![DismissReason::CancelKey, DismissReason::Explicit]
    );
}

#[test]
fn test_no_listener_leak_over_many_cycles() {
    let surface = InputSurface::new();
    let menu = menu(&surface);

    for i in 0..100 {
        menu.activate();
        match i % 4 {
            0 => {
                menu.close();
            }
            1 => {
                surface.dispatch(&InputEvent::key(Key::Escape));
            }
            2 => {
                surface.dispatch(&InputEvent::click(50, 50));
            }
            _ => {
                menu.notify_selection();
            }
        }
        assert!(!menu.is_open(), "cycle {i} left the menu open");
        assert_eq!(surface.listener_count(), 0, "cycle {i} leaked listeners");
    }
}

#[test]
fn test_dropping_open_disclosure_detaches_listeners() {
    let surface = InputSurface::new();
    {
        let menu = menu(&surface);
        menu.activate();
        assert_eq!(surface.listener_count(), 2);
    }
    assert_eq!(surface.listener_count(), 0);
}

// ============================================================================
// Dismiss reasons
// ============================================================================

#[test]
fn test_cancel_key_through_surface() {
    let surface = InputSurface::new();
    let menu = menu(&surface);
    menu.activate();

    surface.dispatch(&InputEvent::key(Key::Char('x')));
    assert!(menu.is_open());

    surface.dispatch(&InputEvent::key(Key::Escape));
    assert!(!menu.is_open());
    assert_eq!(menu.last_dismiss_reason(), Some(DismissReason::CancelKey));
}

#[test]
fn test_outside_click_dismisses_but_inside_click_does_not() {
    let surface = InputSurface::new();
    let menu = menu(&surface);
    menu.activate();

    // Trigger and panel both count as inside.
    surface.dispatch(&InputEvent::click(3, 0));
    surface.dispatch(&InputEvent::click(3, 4));
    assert!(menu.is_open());

    surface.dispatch(&InputEvent::click(30, 4));
    assert!(!menu.is_open());
    assert_eq!(
        menu.last_dismiss_reason(),
        Some(DismissReason::OutsideInteraction)
    );
}

#[test]
fn test_outside_click_ignored_when_policy_disables_it() {
    let surface = InputSurface::new();
    let menu = Disclosure::new(DisclosurePolicy::single_select().with_dismiss_on_outside(false))
        .with_surface(surface.clone());
    menu.activate();
    assert_eq!(surface.listener_count_of(ListenerKind::PointerDown), 0);

    surface.dispatch(&InputEvent::click(99, 99));
    assert!(menu.is_open());
    assert!(!menu.handle_pointer_down(Point::new(99, 99)));
}

#[test]
fn test_selection_closes_single_select_but_not_checklist() {
    let single = Disclosure::new(DisclosurePolicy::single_select());
    single.activate();
    assert!(single.notify_selection());
    assert_eq!(single.last_dismiss_reason(), Some(DismissReason::Selection));

    let checklist = Disclosure::new(DisclosurePolicy::checklist());
    checklist.activate();
    assert!(!checklist.notify_selection());
    assert!(checklist.is_open());
}

#[test]
fn test_unavailable_surface_degrades_to_key_and_explicit_close() {
    let surface = InputSurface::unavailable();
    let menu = Disclosure::new(DisclosurePolicy::default()).with_surface(surface.clone());

    assert!(menu.activate());
    assert!(menu.is_open());
    assert_eq!(surface.listener_count(), 0);

    assert!(menu.handle_key(&KeyPress::plain(Key::Escape)));
    assert_eq!(menu.last_dismiss_reason(), Some(DismissReason::CancelKey));

    menu.activate();
    assert!(menu.close());
}

#[test]
fn test_dismiss_triggers_always_include_cancel_and_explicit() {
    for policy in [
        DisclosurePolicy::single_select(),
        DisclosurePolicy::checklist(),
        DisclosurePolicy::checklist().with_dismiss_on_outside(false),
    ] {
        let triggers = policy.dismiss_triggers();
        assert!(triggers.contains(&DismissReason::CancelKey));
        assert!(triggers.contains(&DismissReason::Explicit));
    }
}

// ============================================================================
// Nesting
// ============================================================================

#[test]
fn test_child_only_opens_inside_open_parent() {
    let surface = InputSurface::new();
    let (parent, child) = menu_with_submenu(&surface);

    assert!(!child.activate());
    parent.activate();
    assert!(child.activate());
    assert_eq!(child.depth(), 1);
    assert!(child.is_nested());
    assert_eq!(child.parent().map(|p| p.id()), Some(parent.id()));
}

#[test]
fn test_escape_closes_innermost_only() {
    let surface = InputSurface::new();
    let (parent, child) = menu_with_submenu(&surface);
    parent.activate();
    child.activate();

    surface.dispatch(&InputEvent::key(Key::Escape));
    assert!(!child.is_open());
    assert!(parent.is_open());

    surface.dispatch(&InputEvent::key(Key::Escape));
    assert!(!parent.is_open());
    assert_eq!(surface.listener_count(), 0);
}

#[test]
fn test_handle_key_on_root_closes_innermost() {
    let (parent, child) = menu_with_submenu(&InputSurface::unavailable());
    parent.activate();
    child.activate();

    assert!(parent.handle_key(&KeyPress::plain(Key::Escape)));
    assert!(parent.is_open());
    assert!(!child.is_open());
}

#[test]
fn test_click_in_child_panel_is_not_outside_for_parent() {
    let surface = InputSurface::new();
    let (parent, child) = menu_with_submenu(&surface);
    parent.activate();
    child.activate();

    surface.dispatch(&InputEvent::click(15, 3));
    assert!(parent.is_open());
    assert!(child.is_open());
}

#[test]
fn test_closing_parent_cascades() {
    let surface = InputSurface::new();
    let (parent, child) = menu_with_submenu(&surface);
    parent.activate();
    child.activate();

    surface.dispatch(&InputEvent::click(60, 20));
    assert!(!parent.is_open());
    assert!(!child.is_open());
    assert_eq!(
        child.last_dismiss_reason(),
        Some(DismissReason::OutsideInteraction)
    );
    assert_eq!(surface.listener_count(), 0);
}

#[test]
fn test_opening_child_closes_open_sibling() {
    let surface = InputSurface::new();
    let parent = menu(&surface);
    let first = Disclosure::child_of(&parent, DisclosurePolicy::single_select());
    let second = Disclosure::child_of(&parent, DisclosurePolicy::single_select());
    parent.activate();

    first.activate();
    second.activate();
    assert!(!first.is_open());
    assert!(second.is_open());
}

#[test]
fn test_selection_in_child_closes_ancestors_with_close_on_select() {
    let (parent, child) = menu_with_submenu(&InputSurface::new());
    parent.activate();
    child.activate();

    assert!(child.notify_selection());
    assert!(!child.is_open());
    assert!(!parent.is_open());
    assert_eq!(parent.last_dismiss_reason(), Some(DismissReason::Selection));
}

#[test]
fn test_selection_in_child_stops_at_checklist_parent() {
    let surface = InputSurface::new();
    let parent = Disclosure::new(DisclosurePolicy::checklist()).with_surface(surface);
    let child = Disclosure::child_of(&parent, DisclosurePolicy::single_select());
    parent.activate();
    child.activate();

    child.notify_selection();
    assert!(!child.is_open());
    assert!(parent.is_open());
}

// ============================================================================
// Hover grace interval
// ============================================================================

#[test]
fn test_pointer_leaving_schedules_close_after_grace() {
    let (parent, child) = menu_with_submenu(&InputSurface::unavailable());
    parent.activate();
    child.activate();
    let t0 = Instant::now();

    child.pointer_moved(Point::new(40, 10), t0);
    let deadline = child.pending_close().expect("close scheduled");
    assert_eq!(deadline, t0 + Duration::from_millis(200));
    assert_eq!(parent.next_deadline(), Some(deadline));

    assert!(!parent.poll(t0 + Duration::from_millis(199)));
    assert!(child.is_open());

    assert!(parent.poll(t0 + Duration::from_millis(200)));
    assert!(!child.is_open());
    assert!(parent.is_open());
    assert_eq!(child.last_dismiss_reason(), Some(DismissReason::HoverExit));
}

#[test]
fn test_pointer_return_cancels_pending_close() {
    let (parent, child) = menu_with_submenu(&InputSurface::unavailable());
    parent.activate();
    child.activate();
    let t0 = Instant::now();

    child.pointer_moved(Point::new(40, 10), t0);
    child.pointer_moved(Point::new(12, 3), t0 + Duration::from_millis(100));
    assert_eq!(child.pending_close(), None);

    assert!(!parent.poll(t0 + Duration::from_secs(5)));
    assert!(child.is_open());
}

#[test]
fn test_repeated_moves_outside_keep_first_deadline() {
    let (parent, child) = menu_with_submenu(&InputSurface::unavailable());
    parent.activate();
    child.activate();
    let t0 = Instant::now();

    child.pointer_moved(Point::new(40, 10), t0);
    child.pointer_moved(Point::new(41, 10), t0 + Duration::from_millis(150));
    assert_eq!(child.pending_close(), Some(t0 + Duration::from_millis(200)));
}

#[test]
fn test_hover_ignored_for_top_level() {
    let menu = menu(&InputSurface::unavailable());
    menu.activate();
    menu.pointer_moved(Point::new(90, 90), Instant::now());
    assert_eq!(menu.pending_close(), None);
}

#[test]
fn test_nested_open_attaches_pointer_move_listener() {
    let surface = InputSurface::new();
    let (parent, child) = menu_with_submenu(&surface);
    parent.activate();
    child.activate();
    assert_eq!(surface.listener_count_of(ListenerKind::PointerMove), 1);

    surface.dispatch(&InputEvent::hover(50, 50));
    assert!(child.pending_close().is_some());

    parent.close();
    assert_eq!(surface.listener_count(), 0);
    assert_eq!(child.pending_close(), None);
}

#[test]
fn test_listener_may_detach_itself_during_dispatch() {
    let surface = InputSurface::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let menu = menu(&surface);
    menu.activate();

    let counter = Arc::clone(&calls);
    let _guard = surface
        .attach(ListenerKind::KeyDown, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    // The menu closes (and detaches) during this dispatch.
    let invoked = surface.dispatch(&InputEvent::key(Key::Escape));
    assert_eq!(invoked, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(surface.listener_count(), 1);
}

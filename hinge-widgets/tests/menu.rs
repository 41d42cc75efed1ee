//! Tests for the Menu widget: sub-menus, hover grace and checklists.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use hinge::{DisclosurePolicy, InputEvent, Key, Rect, ValueStore};
use hinge_widgets::{
    EventContext, EventResult, FlipResolver, Menu, MenuItem, WidgetEvent, WidgetEventKind,
    dispatch,
};
use tokio::sync::mpsc::UnboundedReceiver;

const SCREEN: Rect = Rect::new(0, 0, 80, 24);

/// Root panel lands at (0, 1, 13, 3); "Open Recent" is row y = 2 and its
/// sub-menu panel opens to the right at (13, 2, 7, 2).
fn file_menu() -> Menu {
    let menu = Menu::new([
        MenuItem::action("open", "Open"),
        MenuItem::submenu(
            "recent",
            "Open Recent",
            [
                MenuItem::action("a.txt", "a.txt"),
                MenuItem::action("b.txt", "b.txt"),
            ],
        ),
        MenuItem::check("wrap", "Word Wrap"),
    ]);
    menu.set_trigger_rect(Rect::new(0, 0, 6, 1));
    menu
}

fn drain(rx: &mut UnboundedReceiver<WidgetEvent>) -> Vec<WidgetEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn press(menu: &Menu, key: Key, cx: &EventContext) -> EventResult {
    dispatch(menu, &InputEvent::key(key), cx)
}

fn hover(menu: &Menu, x: u16, y: u16, cx: &EventContext) -> EventResult {
    dispatch(menu, &InputEvent::PointerMove { x, y }, cx)
}

/// Let spawned timer tasks run after the paused clock moved.
async fn settle() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

// ============================================================================
// Keyboard
// ============================================================================

#[test]
fn test_action_closes_menu_and_reports_item() {
    hinge::logging::init_test_logger();
    let (cx, mut rx) = EventContext::channel();
    let activated = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&activated);
    let menu = file_menu().on_action(move |id| sink.lock().unwrap().push(id.to_string()));

    press(&menu, Key::Enter, &cx);
    assert!(menu.is_open());
    assert_eq!(menu.highlighted_id().as_deref(), Some("open"));
    press(&menu, Key::Enter, &cx);

    assert!(!menu.is_open());
    assert_eq!(*activated.lock().unwrap(), ["open"]);

    let events = drain(&mut rx);
    let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        [
            WidgetEventKind::Open,
            WidgetEventKind::Change,
            WidgetEventKind::Close
        ]
    );
    assert_eq!(events[1].message.as_deref(), Some("open"));
}

#[test]
fn test_right_opens_submenu_and_left_closes_it() {
    let cx = EventContext::detached();
    let menu = file_menu();
    let recent = menu.submenu("recent").unwrap();
    assert!(recent.is_nested());

    menu.open();
    press(&menu, Key::Down, &cx);
    press(&menu, Key::Right, &cx);
    assert!(recent.is_open());
    assert_eq!(recent.highlighted_id().as_deref(), Some("a.txt"));

    // Keys go to the innermost open menu
    press(&menu, Key::Down, &cx);
    assert_eq!(recent.highlighted_id().as_deref(), Some("b.txt"));
    assert_eq!(menu.highlighted_id().as_deref(), Some("recent"));

    press(&menu, Key::Left, &cx);
    assert!(!recent.is_open());
    assert!(menu.is_open());
}

#[test]
fn test_escape_closes_innermost_only() {
    let (cx, mut rx) = EventContext::channel();
    let menu = file_menu();
    let recent = menu.submenu("recent").unwrap();
    menu.open();
    press(&menu, Key::Down, &cx);
    press(&menu, Key::Enter, &cx);
    assert!(recent.is_open());
    drain(&mut rx);

    press(&menu, Key::Escape, &cx);
    assert!(!recent.is_open());
    assert!(menu.is_open());
    let closed: Vec<_> = drain(&mut rx).into_iter().map(|e| e.widget_id).collect();
    assert_eq!(closed, [recent.id_string()]);

    press(&menu, Key::Escape, &cx);
    assert!(!menu.is_open());
}

#[test]
fn test_submenu_action_closes_whole_chain() {
    let cx = EventContext::detached();
    let activated = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&activated);
    let menu = file_menu().on_action(move |id| sink.lock().unwrap().push(id.to_string()));
    let recent = menu.submenu("recent").unwrap();

    menu.open();
    press(&menu, Key::Down, &cx);
    press(&menu, Key::Right, &cx);
    press(&menu, Key::Down, &cx);
    press(&menu, Key::Enter, &cx);

    assert_eq!(*activated.lock().unwrap(), ["b.txt"]);
    assert!(!recent.is_open());
    assert!(!menu.is_open());
}

#[test]
fn test_opening_a_submenu_closes_its_sibling() {
    let cx = EventContext::detached();
    let menu = Menu::new([
        MenuItem::submenu("edit", "Edit", [MenuItem::action("cut", "Cut")]),
        MenuItem::submenu("view", "View", [MenuItem::action("zoom", "Zoom")]),
    ]);
    menu.set_trigger_rect(Rect::new(0, 0, 6, 1));
    let edit = menu.submenu("edit").unwrap();
    let view = menu.submenu("view").unwrap();

    menu.open();
    menu.place(SCREEN, &FlipResolver);
    hover(&menu, 1, 1, &cx);
    assert!(edit.is_open());

    hover(&menu, 1, 2, &cx);
    assert!(view.is_open());
    assert!(!edit.is_open());
}

#[test]
fn test_disabled_item_is_skipped() {
    let cx = EventContext::detached();
    let menu = Menu::new([
        MenuItem::action("cut", "Cut").disabled(),
        MenuItem::action("copy", "Copy"),
    ]);
    menu.open();
    assert_eq!(menu.highlighted_id().as_deref(), Some("copy"));
    press(&menu, Key::Up, &cx);
    assert_eq!(menu.highlighted_id().as_deref(), Some("copy"));
}

// ============================================================================
// Checklists
// ============================================================================

#[test]
fn test_checklist_stays_open_and_toggles() {
    let cx = EventContext::detached();
    let menu = Menu::new([
        MenuItem::check("bold", "Bold"),
        MenuItem::check("italic", "Italic"),
    ])
    .with_policy(DisclosurePolicy::checklist());

    menu.open();
    press(&menu, Key::Enter, &cx);
    press(&menu, Key::Down, &cx);
    press(&menu, Key::Enter, &cx);
    assert!(menu.is_open());
    assert_eq!(menu.checked(), ["bold", "italic"]);

    press(&menu, Key::Up, &cx);
    press(&menu, Key::Enter, &cx);
    assert_eq!(menu.checked(), ["italic"]);
    assert!(!menu.is_checked("bold"));
}

#[test]
fn test_controlled_checked_items() {
    let cx = EventContext::detached();
    let requested = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&requested);
    let store = ValueStore::controlled(vec!["wrap".to_string()], move |v: &Vec<String>| {
        sink.lock().unwrap().push(v.clone());
    });
    let menu = file_menu().with_checked(store);
    assert!(menu.is_checked("wrap"));

    menu.open();
    press(&menu, Key::End, &cx);
    press(&menu, Key::Enter, &cx);

    assert_eq!(*requested.lock().unwrap(), [Vec::<String>::new()]);
    assert!(menu.is_checked("wrap"), "host has not answered yet");
    menu.set_checked(Vec::new()).unwrap();
    assert!(menu.checked().is_empty());
}

// ============================================================================
// Pointer
// ============================================================================

#[test]
fn test_placement_chains_submenu_to_row() {
    let menu = file_menu();
    let recent = menu.submenu("recent").unwrap();
    menu.open();

    assert_eq!(menu.place(SCREEN, &FlipResolver), Some(Rect::new(0, 1, 13, 3)));
    assert_eq!(recent.disclosure().trigger_rect(), Some(Rect::new(0, 2, 13, 1)));

    recent.open();
    menu.place(SCREEN, &FlipResolver);
    assert_eq!(recent.disclosure().panel_rect(), Some(Rect::new(13, 2, 7, 2)));
}

#[test]
fn test_hover_opens_submenu_and_click_activates() {
    let cx = EventContext::detached();
    let activated = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&activated);
    let menu = file_menu().on_action(move |id| sink.lock().unwrap().push(id.to_string()));
    let recent = menu.submenu("recent").unwrap();

    dispatch(&menu, &InputEvent::click(1, 0), &cx);
    menu.place(SCREEN, &FlipResolver);
    hover(&menu, 2, 2, &cx);
    assert!(recent.is_open());
    menu.place(SCREEN, &FlipResolver);

    dispatch(&menu, &InputEvent::click(15, 3), &cx);
    assert_eq!(*activated.lock().unwrap(), ["b.txt"]);
    assert!(!menu.is_open());
}

#[test]
fn test_outside_click_dismisses_tree() {
    let cx = EventContext::detached();
    let menu = file_menu();
    let recent = menu.submenu("recent").unwrap();
    menu.open();
    menu.place(SCREEN, &FlipResolver);
    hover(&menu, 2, 2, &cx);
    menu.place(SCREEN, &FlipResolver);

    assert!(recent.is_open());

    let result = dispatch(&menu, &InputEvent::click(60, 20), &cx);
    assert_eq!(result, EventResult::Ignored);
    assert!(!menu.is_open());
    assert!(!recent.is_open());
}

#[test]
fn test_context_menu_opens_at_point() {
    let menu = Menu::new([MenuItem::action("copy", "Copy")]);
    assert!(menu.open_at(78, 23));
    // Clamped into the screen
    assert_eq!(menu.place(SCREEN, &FlipResolver), Some(Rect::new(74, 23, 6, 1)));
}

// ============================================================================
// Hover grace
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_submenu_closes_after_hover_grace() {
    let cx = EventContext::detached();
    let menu = file_menu();
    let recent = menu.submenu("recent").unwrap();
    menu.open();
    menu.place(SCREEN, &FlipResolver);
    hover(&menu, 2, 2, &cx);
    menu.place(SCREEN, &FlipResolver);
    hover(&menu, 14, 2, &cx);
    assert_eq!(recent.highlighted_id().as_deref(), Some("a.txt"));

    hover(&menu, 40, 10, &cx);
    assert!(menu.timer().is_armed());

    tokio::time::advance(Duration::from_millis(150)).await;
    settle().await;
    assert!(recent.is_open(), "still inside the grace interval");

    tokio::time::advance(Duration::from_millis(100)).await;
    settle().await;
    assert!(!recent.is_open());
    assert!(menu.is_open());
    assert!(!menu.timer().is_armed());
}

#[tokio::test(start_paused = true)]
async fn test_returning_within_grace_keeps_submenu() {
    let cx = EventContext::detached();
    let menu = file_menu();
    let recent = menu.submenu("recent").unwrap();
    menu.open();
    menu.place(SCREEN, &FlipResolver);
    hover(&menu, 2, 2, &cx);
    menu.place(SCREEN, &FlipResolver);

    hover(&menu, 40, 10, &cx);
    tokio::time::advance(Duration::from_millis(120)).await;
    settle().await;
    hover(&menu, 15, 3, &cx);
    assert!(!menu.timer().is_armed());

    tokio::time::advance(Duration::from_millis(500)).await;
    settle().await;
    assert!(recent.is_open());
}

#[tokio::test(start_paused = true)]
async fn test_custom_grace_interval() {
    let cx = EventContext::detached();
    let menu = file_menu()
        .with_policy(DisclosurePolicy::single_select().with_grace(Duration::from_millis(50)));
    let recent = menu.submenu("recent").unwrap();
    menu.open();
    menu.place(SCREEN, &FlipResolver);
    hover(&menu, 2, 2, &cx);
    menu.place(SCREEN, &FlipResolver);

    hover(&menu, 40, 10, &cx);
    tokio::time::advance(Duration::from_millis(60)).await;
    settle().await;
    assert!(!recent.is_open());
}

#[tokio::test(start_paused = true)]
async fn test_closing_root_cancels_timer() {
    let cx = EventContext::detached();
    let menu = file_menu();
    menu.open();
    menu.place(SCREEN, &FlipResolver);
    hover(&menu, 2, 2, &cx);
    menu.place(SCREEN, &FlipResolver);
    hover(&menu, 40, 10, &cx);
    assert!(menu.timer().is_armed());

    menu.close();
    assert!(!menu.timer().is_armed());
}

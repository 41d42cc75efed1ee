//! Tests for native event conversion, geometry and config deserialization.

use crossterm::event::{
    Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers,
    MouseButton as CrosstermButton, MouseEvent, MouseEventKind,
};
use hinge::editors::{DateBounds, HourCycle, SliderConfig, TagPolicy, TimeStepConfig};
use hinge::{DisclosurePolicy, InputEvent, Key, KeyPress, Modifiers, MouseButton, Point, Rect};

fn key_event(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> CrosstermEvent {
    CrosstermEvent::Key(KeyEvent {
        code,
        modifiers,
        kind,
        state: KeyEventState::NONE,
    })
}

fn mouse_event(kind: MouseEventKind, column: u16, row: u16) -> CrosstermEvent {
    CrosstermEvent::Mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

// ============================================================================
// Crossterm conversion
// ============================================================================

#[test]
fn test_key_press_converts() {
    let event = key_event(KeyCode::Esc, KeyModifiers::NONE, KeyEventKind::Press);
    assert_eq!(
        InputEvent::try_from(event),
        Ok(InputEvent::KeyDown(KeyPress::plain(Key::Escape)))
    );
}

#[test]
fn test_key_modifiers_convert() {
    let event = key_event(
        KeyCode::Char('k'),
        KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        KeyEventKind::Press,
    );
    let InputEvent::KeyDown(press) = InputEvent::try_from(event).unwrap() else {
        panic!("expected key down");
    };
    assert_eq!(press.key, Key::Char('k'));
    assert!(press.modifiers.ctrl && press.modifiers.shift && !press.modifiers.alt);
    assert!(press.is_chord());
}

#[test]
fn test_key_release_is_unsupported() {
    let event = key_event(KeyCode::Enter, KeyModifiers::NONE, KeyEventKind::Release);
    assert!(InputEvent::try_from(event).is_err());
}

#[test]
fn test_mouse_down_and_move_convert() {
    let down = mouse_event(MouseEventKind::Down(CrosstermButton::Right), 4, 7);
    assert_eq!(
        InputEvent::try_from(down),
        Ok(InputEvent::PointerDown {
            x: 4,
            y: 7,
            button: MouseButton::Right,
        })
    );

    let drag = mouse_event(MouseEventKind::Drag(CrosstermButton::Left), 1, 2);
    assert_eq!(InputEvent::try_from(drag), Ok(InputEvent::hover(1, 2)));

    let scroll = mouse_event(MouseEventKind::ScrollDown, 0, 0);
    let err = InputEvent::try_from(scroll).unwrap_err();
    assert!(err.to_string().contains("ScrollDown"));
}

#[test]
fn test_focus_events_are_unsupported() {
    assert!(InputEvent::try_from(CrosstermEvent::FocusGained).is_err());
}

#[test]
fn test_modifiers_helpers() {
    assert!(Modifiers::NONE.none());
    assert!(Modifiers::shift().shift);
    assert!(!KeyPress::new(Key::Up, Modifiers::shift()).is_chord());
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn test_rect_edges() {
    let rect = Rect::new(3, 4, 5, 6);
    assert_eq!(rect.right(), 8);
    assert_eq!(rect.bottom(), 10);
    assert!(rect.contains(Point::new(7, 9)));
    assert!(!rect.contains(Point::new(8, 9)));
    assert!(Rect::new(0, 0, 0, 3).is_empty());
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_disclosure_policy_fills_defaults() {
    let policy: DisclosurePolicy = serde_json::from_str(r#"{"grace_ms": 350}"#).unwrap();
    assert!(policy.close_on_select);
    assert!(policy.dismiss_on_outside);
    assert_eq!(policy.grace().as_millis(), 350);

    let checklist: DisclosurePolicy =
        serde_json::from_str(r#"{"close_on_select": false}"#).unwrap();
    assert_eq!(checklist, DisclosurePolicy::checklist());
}

#[test]
fn test_editor_configs_from_json() {
    let slider: SliderConfig = serde_json::from_str(r#"{"max": 10.0, "step": 0.5}"#).unwrap();
    assert_eq!(slider, SliderConfig::new(0.0, 10.0, 0.5));
    assert!(slider.validate().is_ok());

    let time: TimeStepConfig = serde_json::from_str(r#"{"hour_cycle": "h12"}"#).unwrap();
    assert_eq!(time.hour_cycle, HourCycle::H12);
    assert_eq!(time.minute_step, 1);

    let bounds: DateBounds = serde_json::from_str(r#"{"min": "2025-01-01"}"#).unwrap();
    assert!(bounds.min.is_some());
    assert!(bounds.max.is_none());

    let tags: TagPolicy = serde_json::from_str(r#"{"max_tags": 4}"#).unwrap();
    assert_eq!(tags.max_tags, Some(4));
    assert!(!tags.allow_duplicates);
}

#[test]
fn test_dismiss_reason_serializes_kebab_case() {
    let json = serde_json::to_string(&hinge::DismissReason::OutsideInteraction).unwrap();
    assert_eq!(json, r#""outside-interaction""#);
}

//! Tests for controlled/uncontrolled value reconciliation.

use std::sync::{Arc, Mutex};

use hinge::{Notifier, ValueMode, ValueProps, ValueStore, WidgetError};

fn recorder<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync + 'static)
{
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |value: &T| sink.lock().unwrap().push(value.clone()))
}

// ============================================================================
// Uncontrolled
// ============================================================================

#[test]
fn test_uncontrolled_change_is_visible_and_notified_once() {
    hinge::logging::init_test_logger();
    let (seen, notify) = recorder::<i32>();
    let mut store = ValueStore::uncontrolled(1).on_change(notify);

    store.request_change(5);
    assert_eq!(*store.current(), 5);
    assert_eq!(*seen.lock().unwrap(), vec![5]);
}

#[test]
fn test_uncontrolled_repeated_request_is_idempotent() {
    let (seen, notify) = recorder::<&'static str>();
    let mut store = ValueStore::uncontrolled("a").on_change(notify);

    store.request_change("b");
    store.request_change("b");
    assert_eq!(*store.current(), "b");
    // The notifier fires once per request; the value stays the same.
    assert_eq!(*seen.lock().unwrap(), vec!["b", "b"]);
}

#[test]
fn test_uncontrolled_without_notifier() {
    let mut store = ValueStore::uncontrolled(0u8);
    store.request_change(3);
    assert_eq!(*store.current(), 3);
    assert_eq!(store.mode(), ValueMode::Uncontrolled);
}

// ============================================================================
// Controlled
// ============================================================================

#[test]
fn test_controlled_value_takes_precedence() {
    let (seen, notify) = recorder::<i32>();
    let mut store = ValueStore::controlled(10, notify);

    store.request_change(20);
    assert_eq!(*store.current(), 10, "host has not re-supplied yet");
    assert_eq!(*store.internal(), 20);
    assert_eq!(*seen.lock().unwrap(), vec![20]);

    store.set_external(20).unwrap();
    assert_eq!(*store.current(), 20);
}

#[test]
fn test_controlled_host_can_refuse_change() {
    let (_, notify) = recorder::<i32>();
    let mut store = ValueStore::controlled(10, notify);
    store.request_change(99);
    store.set_external(10).unwrap();
    assert_eq!(*store.current(), 10);
}

#[test]
fn test_staged_change_fires_after_release() {
    let (seen, notify) = recorder::<i32>();
    let mut store = ValueStore::controlled(1, notify);
    let pending = store.stage_change(2).expect("controlled store notifies");
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(*pending.value(), 2);
    pending.fire();
    assert_eq!(*seen.lock().unwrap(), vec![2]);
}

// ============================================================================
// Read-only and misconfiguration
// ============================================================================

#[test]
fn test_value_without_notifier_is_read_only() {
    let props = ValueProps {
        value: Some(7),
        ..Default::default()
    };
    let mut store = ValueStore::from_props(props);
    assert_eq!(store.mode(), ValueMode::ReadOnly);

    store.request_change(8);
    assert_eq!(*store.current(), 7);
    assert!(store.stage_change(9).is_none());
}

#[test]
fn test_props_without_value_are_uncontrolled_from_default() {
    let (seen, notify) = recorder::<String>();
    let props = ValueProps {
        value: None,
        default_value: Some("start".to_string()),
        on_change: Some(Arc::new(notify) as Notifier<_>),
    };
    let mut store = ValueStore::from_props(props);
    assert_eq!(store.mode(), ValueMode::Uncontrolled);
    assert_eq!(store.current(), "start");

    store.request_change("next".to_string());
    assert_eq!(store.current(), "next");
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn test_props_with_value_and_notifier_are_controlled() {
    let (_, notify) = recorder::<i32>();
    let props = ValueProps {
        value: Some(3),
        default_value: Some(100),
        on_change: Some(Arc::new(notify) as Notifier<_>),
    };
    let store = ValueStore::from_props(props);
    assert!(store.is_controlled());
    assert_eq!(*store.current(), 3);
}

#[test]
fn test_mode_switch_after_construction_is_rejected() {
    let mut store = ValueStore::uncontrolled(1);
    let err = store.set_external(2).unwrap_err();
    assert!(matches!(err, WidgetError::ModeSwitch { .. }));
    assert_eq!(*store.current(), 1);
}

#[test]
fn test_set_default_keeps_notifier() {
    let (seen, notify) = recorder::<i32>();
    let mut store = ValueStore::uncontrolled(0).on_change(notify);
    store.set_default(7).unwrap();
    assert_eq!(*store.current(), 7);
    assert!(seen.lock().unwrap().is_empty());

    store.request_change(8);
    assert_eq!(*seen.lock().unwrap(), vec![8]);
}

#[test]
fn test_set_default_on_controlled_store_is_rejected() {
    let (_, notify) = recorder::<i32>();
    let mut store = ValueStore::controlled(3, notify);
    let err = store.set_default(9).unwrap_err();
    assert_eq!(
        err,
        WidgetError::ModeSwitch {
            widget: "i32".to_string(),
            from: "controlled",
            to: "uncontrolled",
        }
    );
    assert!(store.is_controlled());
    assert_eq!(*store.current(), 3);
}

#[test]
fn test_try_controlled_requires_notifier() {
    let err = ValueStore::try_controlled(1, None).unwrap_err();
    assert!(matches!(err, WidgetError::MissingChangeNotifier { .. }));
    assert!(err.to_string().contains("no change notifier"));
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "misconfigured widget")]
fn test_strict_props_panic_in_debug_builds() {
    let props = ValueProps {
        value: Some(1),
        ..Default::default()
    };
    let _ = ValueStore::from_props_strict(props);
}

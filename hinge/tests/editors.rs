//! Tests for the bounded editors: range slider, steppers, tags and colors.

use chrono::NaiveDate;
use hinge::editors::{
    ColorDraft, DateBounds, DateRejection, DateStep, DateStepper, HexColor, HourCycle, RangeEditor,
    RangeValue, Slider, SliderConfig, TagCollection, TagPolicy, TagRejection, Thumb,
    TimeField, TimeStepConfig, TimeStepper, TimeValue, TrackGeometry,
};
use hinge::{Key, KeyPress, Modifiers, Rect, WidgetError};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Slider config
// ============================================================================

#[test]
fn test_snap_rounds_to_step_from_min() {
    let config = SliderConfig::new(0.0, 100.0, 10.0);
    assert_eq!(config.snap(14.0), 10.0);
    assert_eq!(config.snap(15.0), 20.0);
    assert_eq!(config.snap(-30.0), 0.0);
    assert_eq!(config.snap(250.0), 100.0);

    let offset = SliderConfig::new(5.0, 50.0, 10.0);
    assert_eq!(offset.snap(12.0), 15.0);
    assert_eq!(offset.snap(49.0), 45.0);
    // Off-grid max is still reachable at the top of the track.
    assert_eq!(offset.snap(50.0), 50.0);
}

#[test]
fn test_invalid_slider_configs() {
    for config in [
        SliderConfig::new(10.0, 10.0, 1.0),
        SliderConfig::new(0.0, 10.0, 0.0),
        SliderConfig::new(0.0, f64::NAN, 1.0),
    ] {
        assert!(matches!(
            config.validate(),
            Err(WidgetError::InvalidConfig { config: "slider", .. })
        ));
    }
    assert!(SliderConfig::default().validate().is_ok());
}

#[test]
fn test_track_maps_pointer_to_value() {
    let config = SliderConfig::new(0.0, 100.0, 1.0);
    let track = TrackGeometry::from_rect(Rect::new(10, 0, 50, 1));
    assert_eq!(track.value_at(10.0, &config), 0.0);
    assert_eq!(track.value_at(35.0, &config), 50.0);
    assert_eq!(track.value_at(60.0, &config), 100.0);
    assert_eq!(track.value_at(500.0, &config), 100.0);
    assert_eq!(track.position_of(50.0, &config), 35.0);
}

#[test]
fn test_zero_length_track_reads_min() {
    let config = SliderConfig::default();
    let track = TrackGeometry::new(5.0, 0.0);
    assert_eq!(track.value_at(99.0, &config), 0.0);
}

// ============================================================================
// Range
// ============================================================================

#[test]
fn test_range_value_construction_sorts() {
    let value = RangeValue::new(80.0, 20.0);
    assert_eq!(value.as_array(), [20.0, 80.0]);
    assert_eq!(RangeValue::from([3.0, 1.0]).low(), 1.0);
}

#[test]
fn test_set_across_other_thumb_swaps() {
    let mut value = RangeValue::new(20.0, 80.0);
    let holder = value.set(Thumb::Low, 90.0);
    assert_eq!(holder, Thumb::High);
    assert_eq!(value.as_array(), [80.0, 90.0]);
}

#[test]
fn test_dragging_high_below_low_keeps_order() {
    // Step 10: raw 15 under the pointer snaps to 20, meeting the low thumb.
    let config = SliderConfig::new(0.0, 100.0, 10.0);
    let track = TrackGeometry::new(0.0, 100.0);
    let mut editor = RangeEditor::new(config, RangeValue::new(20.0, 80.0));

    let value = editor.drag(Thumb::High, 15.0, &track);
    assert_eq!(value.as_array(), [20.0, 20.0]);
    assert!(value.low() <= value.high());
}

#[test]
fn test_drag_follows_thumb_through_crossing() {
    let config = SliderConfig::new(0.0, 100.0, 1.0);
    let track = TrackGeometry::new(0.0, 100.0);
    let mut editor = RangeEditor::new(config, RangeValue::new(20.0, 80.0));

    editor.drag(Thumb::High, 10.0, &track);
    assert_eq!(editor.value().as_array(), [10.0, 20.0]);
    assert_eq!(editor.dragging(), Some(Thumb::Low));

    editor.drag_to(5.0, &track);
    assert_eq!(editor.value().as_array(), [5.0, 20.0]);

    editor.release();
    assert_eq!(editor.drag_to(50.0, &track), None);
}

#[test]
fn test_track_press_moves_nearest_thumb() {
    let config = SliderConfig::new(0.0, 100.0, 1.0);
    let track = TrackGeometry::new(0.0, 100.0);
    let mut editor = RangeEditor::new(config, RangeValue::new(20.0, 80.0));

    editor.press_track(30.0, &track);
    assert_eq!(editor.value().as_array(), [30.0, 80.0]);
    editor.press_track(70.0, &track);
    assert_eq!(editor.value().as_array(), [30.0, 70.0]);
}

#[test]
fn test_track_press_on_collapsed_range_picks_side() {
    let mut editor = RangeEditor::new(SliderConfig::default(), RangeValue::new(50.0, 50.0));
    let track = TrackGeometry::new(0.0, 100.0);
    editor.press_track(60.0, &track);
    assert_eq!(editor.value().as_array(), [50.0, 60.0]);
    editor.press_track(40.0, &track);
    assert_eq!(editor.value().as_array(), [40.0, 60.0]);
}

#[test]
fn test_keyboard_step_clamps_and_orders() {
    let config = SliderConfig::new(0.0, 100.0, 10.0);
    let mut editor = RangeEditor::new(config, RangeValue::new(90.0, 100.0));
    editor.step(Thumb::High, 3);
    assert_eq!(editor.value().high(), 100.0);
    editor.step(Thumb::Low, 2);
    assert_eq!(editor.value().as_array(), [100.0, 100.0]);
}

#[test]
fn test_single_slider() {
    let mut slider = Slider::new(SliderConfig::new(0.0, 1.0, 0.25), 0.3);
    assert_eq!(slider.value(), 0.25);
    assert_eq!(slider.step(1), 0.5);
    assert_eq!(slider.step(-10), 0.0);
    let track = TrackGeometry::new(0.0, 8.0);
    assert_eq!(slider.set_from_pointer(6.0, &track), 0.75);
}

// ============================================================================
// Time
// ============================================================================

#[test]
fn test_hour_wraps_without_carry() {
    let mut stepper = TimeStepper::new(TimeStepConfig::default(), TimeValue::new(23, 59).unwrap());
    let next = stepper.step(TimeField::Minute, true);
    assert_eq!((next.hour(), next.minute()), (23, 0));
    let next = stepper.step(TimeField::Hour, true);
    assert_eq!((next.hour(), next.minute()), (0, 0));
    let next = stepper.step(TimeField::Hour, false);
    assert_eq!(next.hour(), 23);
}

#[test]
fn test_minute_step() {
    let config = TimeStepConfig {
        minute_step: 15,
        ..Default::default()
    };
    let mut stepper = TimeStepper::new(config, TimeValue::new(8, 50).unwrap());
    assert_eq!(stepper.step(TimeField::Minute, true).minute(), 5);
    assert_eq!(stepper.step(TimeField::Minute, false).minute(), 50);
}

#[test]
fn test_twelve_hour_dial_keeps_meridiem() {
    let config = TimeStepConfig {
        hour_cycle: HourCycle::H12,
        ..Default::default()
    };
    let mut stepper = TimeStepper::new(config, TimeValue::new(11, 0).unwrap());
    let next = stepper.step(TimeField::Hour, true);
    assert_eq!(next.hour12(), 12);
    assert_eq!(next.display(HourCycle::H12), "12:00 AM");
    let next = stepper.step(TimeField::Hour, true);
    assert_eq!(next.display(HourCycle::H12), "01:00 AM");

    let next = stepper.step(TimeField::Meridiem, true);
    assert_eq!(next.hour(), 13);
    assert_eq!(next.display(HourCycle::H24), "13:00");
}

#[test]
fn test_time_keys_move_between_fields() {
    let config = TimeStepConfig {
        hour_cycle: HourCycle::H12,
        ..Default::default()
    };
    let mut stepper = TimeStepper::new(config, TimeValue::new(9, 30).unwrap());
    assert_eq!(stepper.handle_key(&KeyPress::plain(Key::Right)), None);
    assert_eq!(stepper.field(), TimeField::Minute);
    let next = stepper.handle_key(&KeyPress::plain(Key::Up)).unwrap();
    assert_eq!(next.minute(), 31);

    stepper.handle_key(&KeyPress::plain(Key::Right));
    assert_eq!(stepper.field(), TimeField::Meridiem);
    assert!(!stepper.next_field(true));
    let next = stepper.handle_key(&KeyPress::plain(Key::Char('p'))).unwrap();
    assert_eq!(next.hour(), 21);
    assert_eq!(stepper.handle_key(&KeyPress::plain(Key::Char('p'))), None);
}

#[test]
fn test_invalid_time_inputs() {
    assert_eq!(TimeValue::new(24, 0), None);
    assert_eq!(TimeValue::new(0, 60), None);
    let config = TimeStepConfig {
        minute_step: 0,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

// ============================================================================
// Date
// ============================================================================

#[test]
fn test_month_step_clamps_day() {
    assert_eq!(DateStep::Months(1).apply(date(2025, 1, 31)), Some(date(2025, 2, 28)));
    assert_eq!(DateStep::Months(1).apply(date(2024, 1, 31)), Some(date(2024, 2, 29)));
    assert_eq!(DateStep::Months(-1).apply(date(2025, 3, 31)), Some(date(2025, 2, 28)));
    assert_eq!(DateStep::Years(1).apply(date(2024, 2, 29)), Some(date(2025, 2, 28)));
}

#[test]
fn test_date_keys() {
    let shift = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };
    assert_eq!(
        DateStep::from_key(&KeyPress::plain(Key::Down)),
        Some(DateStep::Days(7))
    );
    assert_eq!(
        DateStep::from_key(&KeyPress::new(Key::PageUp, shift)),
        Some(DateStep::Years(-1))
    );
    assert_eq!(
        DateStep::from_key(&KeyPress::new(Key::Left, Modifiers::ctrl())),
        None
    );
}

#[test]
fn test_stepper_rejects_out_of_bounds_and_keeps_focus() {
    let bounds = DateBounds {
        min: Some(date(2025, 1, 1)),
        max: Some(date(2025, 1, 31)),
    };
    let mut stepper = DateStepper::new(bounds, date(2025, 1, 30));

    assert_eq!(stepper.step(DateStep::Days(1)), Ok(date(2025, 1, 31)));
    assert_eq!(
        stepper.step(DateStep::Days(1)),
        Err(DateRejection::AfterMax {
            date: date(2025, 2, 1),
            max: date(2025, 1, 31),
        })
    );
    assert_eq!(stepper.focused(), date(2025, 1, 31));

    assert!(matches!(
        stepper.focus(date(2024, 12, 31)),
        Err(DateRejection::BeforeMin { .. })
    ));
}

#[test]
fn test_inverted_bounds_are_misconfiguration() {
    let bounds = DateBounds {
        min: Some(date(2025, 2, 1)),
        max: Some(date(2025, 1, 1)),
    };
    assert!(bounds.validate().is_err());
    assert!(DateBounds::default().validate().is_ok());
}

// ============================================================================
// Tags
// ============================================================================

#[test]
fn test_tag_entry_flow() {
    let policy = TagPolicy::default().with_max(3).with_validator(|tag| {
        if tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            Ok(())
        } else {
            Err(format!("'{tag}' contains unsupported characters"))
        }
    });
    let mut tags = TagCollection::new(policy);

    assert_eq!(tags.insert("  rust  "), Ok("rust"));
    assert_eq!(tags.insert(""), Err(TagRejection::Blank));
    assert_eq!(tags.insert("rust"), Err(TagRejection::Duplicate("rust".into())));
    assert!(matches!(tags.insert("no spaces!"), Err(TagRejection::Invalid(_))));
    assert!(tags.insert("tui").is_ok());
    assert!(tags.insert("async").is_ok());
    assert_eq!(
        tags.insert("more"),
        Err(TagRejection::LimitReached { max: 3 })
    );
    assert_eq!(tags.tags(), ["rust", "tui", "async"]);

    assert_eq!(tags.pop(), Some("async".to_string()));
    assert_eq!(tags.remove(0), Some("rust".to_string()));
    assert_eq!(tags.remove(5), None);
    assert_eq!(tags.tags(), ["tui"]);
}

#[test]
fn test_duplicates_allowed_by_policy() {
    let mut tags = TagCollection::new(TagPolicy::default().allowing_duplicates());
    tags.insert("a").unwrap();
    tags.insert("a").unwrap();
    assert_eq!(tags.len(), 2);
}

#[test]
fn test_rejection_messages() {
    assert_eq!(TagRejection::Blank.to_string(), "tag is empty");
    assert_eq!(
        TagRejection::LimitReached { max: 2 }.to_string(),
        "at most 2 tags allowed"
    );
}

// ============================================================================
// Color
// ============================================================================

#[test]
fn test_color_draft_commits_only_complete_hex() {
    let mut draft = ColorDraft::new(HexColor::new(0, 0, 0));
    assert_eq!(draft.text(), "#000000");

    for partial in ["#", "#ff", "#ff00", "#ff000"] {
        assert_eq!(draft.set_text(partial), None);
        assert!(!draft.is_valid());
    }
    assert_eq!(draft.committed(), HexColor::new(0, 0, 0));

    let committed = draft.set_text("#FF0000");
    assert_eq!(committed, Some(HexColor::new(255, 0, 0)));
    assert_eq!(draft.set_text("#ff0000"), None, "same color is not re-committed");

    draft.set_text("#12");
    draft.revert();
    assert_eq!(draft.text(), "#ff0000");
}

#[test]
fn test_color_rejects_non_strict_forms() {
    assert!(HexColor::parse("#fff").is_err());
    assert!(HexColor::parse("ffffff").is_err());
    assert!(HexColor::parse("#ffffff00").is_err());
    assert!("#00Ff7a".parse::<HexColor>().is_ok());
}

//! Event handling for the Select widget.

use hinge::{KeyPress, ListAction, Point};

use crate::events::{EventContext, EventResult, WidgetEvent, WidgetEventKind, WidgetEvents};
use crate::widgets::panel_row;

use super::Select;

impl<K: Clone + PartialEq + Send + Sync + 'static> WidgetEvents for Select<K> {
    fn on_key(&self, key: &KeyPress, cx: &EventContext) -> EventResult {
        match ListAction::from_key(key, self.is_open()) {
            ListAction::Open => {
                if self.open() {
                    cx.push_event(WidgetEvent::new(WidgetEventKind::Open, self.id_string()));
                }
                EventResult::Consumed
            }
            ListAction::Move(direction) => {
                self.move_highlight(direction);
                EventResult::Consumed
            }
            ListAction::Select => {
                self.select_highlighted(cx);
                EventResult::Consumed
            }
            ListAction::Dismiss => {
                if self.disclosure().handle_key(key) {
                    cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
                }
                EventResult::Consumed
            }
            ListAction::None => EventResult::Ignored,
        }
    }

    fn on_pointer_down(&self, x: u16, y: u16, cx: &EventContext) -> EventResult {
        let point = Point::new(x, y);
        let disclosure = self.disclosure();

        // Click on trigger toggles the dropdown
        if disclosure.trigger_rect().is_some_and(|r| r.contains(point)) {
            if self.is_open() {
                if self.close() {
                    cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
                }
            } else if self.open() {
                cx.push_event(WidgetEvent::new(WidgetEventKind::Open, self.id_string()));
            }
            return EventResult::Consumed;
        }

        if !self.is_open() {
            return EventResult::Ignored;
        }

        if let Some(row) = panel_row(disclosure.panel_rect(), point) {
            if self.highlight_row(row) {
                self.select_highlighted(cx);
            }
            return EventResult::Consumed;
        }

        // Outside press: dismiss but let the press reach whatever is there
        if disclosure.handle_pointer_down(point) {
            cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
        }
        EventResult::Ignored
    }

    fn on_pointer_move(&self, x: u16, y: u16, _cx: &EventContext) -> EventResult {
        if !self.is_open() {
            return EventResult::Ignored;
        }
        match panel_row(self.disclosure().panel_rect(), Point::new(x, y)) {
            Some(row) => {
                self.highlight_row(row);
                EventResult::Consumed
            }
            None => EventResult::Ignored,
        }
    }

    fn on_blur(&self, cx: &EventContext) {
        // Close dropdown when focus leaves
        if self.close() {
            cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
        }
    }
}

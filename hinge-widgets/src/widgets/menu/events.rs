//! Event handling for the Menu widget.
//!
//! The root menu receives all events. Keys go to the innermost open
//! sub-menu; pointer events are offered to open sub-menus first.

use hinge::{Key, KeyPress, ListAction, Point};

use crate::events::{EventContext, EventResult, WidgetEvent, WidgetEventKind, WidgetEvents};

use super::Menu;

impl WidgetEvents for Menu {
    fn on_key(&self, key: &KeyPress, cx: &EventContext) -> EventResult {
        if let Some(child) = self.open_submenu() {
            return child.on_key(key, cx);
        }
        if key.is_chord() {
            return EventResult::Ignored;
        }

        if self.is_open() {
            match key.key {
                Key::Right => {
                    return if self.open_highlighted_submenu(cx) {
                        EventResult::Consumed
                    } else {
                        EventResult::Ignored
                    };
                }
                Key::Left if self.is_nested() => {
                    if self.close() {
                        cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
                    }
                    return EventResult::Consumed;
                }
                _ => {}
            }
        }

        match ListAction::from_key(key, self.is_open()) {
            ListAction::Open => {
                // Sub-menus open from their parent row, never on their own
                if !self.is_nested() && self.open() {
                    cx.push_event(WidgetEvent::new(WidgetEventKind::Open, self.id_string()));
                }
                EventResult::Consumed
            }
            ListAction::Move(direction) => {
                self.move_highlight(direction);
                EventResult::Consumed
            }
            ListAction::Select => {
                self.activate_highlighted(cx);
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

        if let Some(child) = self.open_submenu()
            && child
                .disclosure()
                .panel_rect()
                .is_some_and(|r| r.contains(point))
        {
            return child.on_pointer_down(x, y, cx);
        }

        if !self.is_nested()
            && self
                .disclosure()
                .trigger_rect()
                .is_some_and(|r| r.contains(point))
        {
            if self.is_open() {
                if self.close() {
                    cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
                }
            } else if self.open() {
                cx.push_event(WidgetEvent::new(WidgetEventKind::Open, self.id_string()));
            }
            return EventResult::Consumed;
        }

        if let Some(row) = self.row_at(point) {
            if self.highlight_row(row) {
                self.activate_highlighted(cx);
            }
            return EventResult::Consumed;
        }

        if !self.is_nested() && self.disclosure().handle_pointer_down(point) {
            self.timer().cancel();
            cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
        }
        EventResult::Ignored
    }

    fn on_pointer_move(&self, x: u16, y: u16, cx: &EventContext) -> EventResult {
        if !self.is_open() {
            return EventResult::Ignored;
        }
        let point = Point::new(x, y);
        let mut handled = false;

        if let Some(child) = self.open_submenu() {
            child.disclosure().pointer_moved(point, cx.now());
            handled |= child.on_pointer_move(x, y, cx).is_handled();
        }

        if let Some(row) = self.row_at(point) {
            self.hover_row(row, cx);
            handled = true;
        }

        if !self.is_nested() {
            self.arm_timer();
        }

        if handled {
            EventResult::Consumed
        } else {
            EventResult::Ignored
        }
    }

    fn on_blur(&self, cx: &EventContext) {
        if !self.is_nested() && self.close() {
            cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
        }
    }
}

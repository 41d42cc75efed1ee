//! TagInput widget - free-text entry that collects tags.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use hinge::editors::{TagCollection, TagPolicy, TagRejection};
use hinge::{Key, KeyPress, PendingChange, QueryText, TextEditResult, ValueStore, WidgetError};

use crate::events::{EventContext, EventResult, WidgetEvent, WidgetEventKind, WidgetEvents};
use crate::id::WidgetId;
use crate::validation::{ErrorSlot, Validatable};

struct TagInputInner {
    value: ValueStore<Vec<String>>,
    tags: TagCollection,
    entry: QueryText,
    placeholder: String,
}

impl TagInputInner {
    /// Apply a change to the collection and stage it for the store.
    fn stage(
        &mut self,
        edit: impl FnOnce(&mut TagCollection) -> Result<(), TagRejection>,
    ) -> Result<Option<PendingChange<Vec<String>>>, TagRejection> {
        // Start from the authoritative value; a controlled host may have
        // declined the previous change.
        let current = self.value.current().clone();
        self.tags.sync(&current);
        edit(&mut self.tags)?;
        Ok(self.value.stage_change(self.tags.tags().to_vec()))
    }
}

/// Type text and press Enter or `,` to add it as a tag.
///
/// Candidates are trimmed, then checked in order: blank, tag limit,
/// duplicate (exact match), custom validator. A rejected candidate stays in
/// the entry and its reason is shown as the widget's error. Backspace in an
/// empty entry removes the last tag.
pub struct TagInput {
    id: WidgetId,
    inner: Arc<RwLock<TagInputInner>>,
    dirty: Arc<AtomicBool>,
    errors: ErrorSlot,
}

impl TagInput {
    pub fn new(policy: TagPolicy) -> Self {
        Self::with_store(policy, ValueStore::uncontrolled(Vec::new()))
    }

    pub fn controlled(
        policy: TagPolicy,
        tags: Vec<String>,
        on_change: impl Fn(&Vec<String>) + Send + Sync + 'static,
    ) -> Self {
        Self::with_store(policy, ValueStore::controlled(tags, on_change))
    }

    pub fn with_store(policy: TagPolicy, value: ValueStore<Vec<String>>) -> Self {
        let dirty = Arc::new(AtomicBool::new(false));
        let tags = TagCollection::new(policy).with_tags(value.current().clone());
        Self {
            id: WidgetId::next("tag_input"),
            inner: Arc::new(RwLock::new(TagInputInner {
                value,
                tags,
                entry: QueryText::default(),
                placeholder: String::new(),
            })),
            errors: ErrorSlot::new(Arc::clone(&dirty)),
            dirty,
        }
    }

    pub fn with_placeholder(self, placeholder: impl Into<String>) -> Self {
        if let Ok(mut guard) = self.inner.write() {
            guard.placeholder = placeholder.into();
        }
        self
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn id_string(&self) -> String {
        self.id.to_string()
    }

    pub fn tags(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|guard| guard.value.current().clone())
            .unwrap_or_default()
    }

    pub fn set_tags(&self, tags: Vec<String>) -> Result<(), WidgetError> {
        let Ok(mut guard) = self.inner.write() else {
            return Ok(());
        };
        guard.value.set_external(tags.clone())?;
        guard.tags.sync(&tags);
        self.dirty.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Text typed but not yet committed.
    pub fn entry(&self) -> String {
        self.inner
            .read()
            .map(|guard| guard.entry.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn placeholder(&self) -> String {
        self.inner
            .read()
            .map(|guard| guard.placeholder.clone())
            .unwrap_or_default()
    }

    /// Commit the entry as a tag.
    pub fn commit_entry(&self, cx: &EventContext) -> Result<(), TagRejection> {
        let staged = {
            let Ok(mut guard) = self.inner.write() else {
                return Ok(());
            };
            let raw = guard.entry.as_str().to_string();
            let staged = guard.stage(|tags| tags.insert(&raw).map(|_| ()));
            if staged.is_ok() {
                guard.entry.clear();
            }
            staged
        };
        self.dirty.store(true, Ordering::SeqCst);

        match staged {
            Ok(pending) => {
                self.errors.clear();
                if let Some(pending) = pending {
                    pending.fire();
                }
                cx.push_event(WidgetEvent::new(WidgetEventKind::Change, self.id_string()));
                Ok(())
            }
            Err(rejection) => {
                log::debug!("TagInput {}: rejected ({rejection})", self.id);
                let message = rejection.to_string();
                self.errors.set(message.clone());
                cx.push_event(WidgetEvent::rejected(self.id_string(), message));
                Err(rejection)
            }
        }
    }

    /// Remove the tag at `index` (e.g. a click on its close button).
    pub fn remove_tag(&self, index: usize, cx: &EventContext) -> Option<String> {
        let mut removed = None;
        let pending = {
            let Ok(mut guard) = self.inner.write() else {
                return None;
            };
            guard
                .stage(|tags| {
                    removed = tags.remove(index);
                    Ok(())
                })
                .ok()
                .flatten()
        };
        let removed = removed?;
        self.dirty.store(true, Ordering::SeqCst);
        if let Some(pending) = pending {
            pending.fire();
        }
        cx.push_event(WidgetEvent::new(WidgetEventKind::Change, self.id_string()));
        Some(removed)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}

impl WidgetEvents for TagInput {
    fn on_key(&self, key: &KeyPress, cx: &EventContext) -> EventResult {
        if key.is_chord() {
            return EventResult::Ignored;
        }
        match key.key {
            Key::Enter | Key::Char(',') => {
                let _ = self.commit_entry(cx);
                return EventResult::Consumed;
            }
            Key::Backspace if self.entry().is_empty() => {
                let last = self.tags().len().checked_sub(1);
                return match last {
                    Some(index) => {
                        self.remove_tag(index, cx);
                        EventResult::Consumed
                    }
                    None => EventResult::Ignored,
                };
            }
            _ => {}
        }

        let result = {
            let Ok(mut guard) = self.inner.write() else {
                return EventResult::Ignored;
            };
            guard.entry.handle_key(key)
        };
        match result {
            TextEditResult::Changed => {
                self.errors.clear();
                self.dirty.store(true, Ordering::SeqCst);
                EventResult::Consumed
            }
            TextEditResult::Handled | TextEditResult::Submitted => EventResult::Consumed,
            TextEditResult::Ignored => EventResult::Ignored,
        }
    }

    fn on_blur(&self, _cx: &EventContext) {
        self.errors.clear();
    }
}

impl Clone for TagInput {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
            errors: self.errors.clone(),
        }
    }
}

impl std::fmt::Debug for TagInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagInput")
            .field("id", &self.id)
            .field("tags", &self.tags())
            .finish_non_exhaustive()
    }
}

impl Validatable for TagInput {
    type Value = Vec<String>;

    fn validation_value(&self) -> Self::Value {
        self.tags()
    }

    fn widget_id(&self) -> String {
        self.id_string()
    }

    fn error_slot(&self) -> &ErrorSlot {
        &self.errors
    }
}

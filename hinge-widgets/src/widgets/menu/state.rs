//! Menu widget state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use hinge::candidates::toggled;
use hinge::{
    Candidate, CandidateList, Direction, Disclosure, DisclosurePolicy, InputSurface, Point, Rect,
    ValueStore, WidgetError,
};

use crate::events::{EventContext, WidgetEvent, WidgetEventKind};
use crate::id::WidgetId;
use crate::overlay::{Placement, PositionResolver};
use crate::timer::GraceTimer;
use crate::validation::{ErrorSlot, Validatable};
use crate::widgets::{list_panel_size, panel_row, track_open_state};

use super::item::{MenuItem, MenuItemKind};

/// Called with the id of an activated action item.
pub type ActionCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// State shared by a root menu and all of its sub-menus.
struct MenuTree {
    timer: GraceTimer,
    checked: RwLock<ValueStore<Vec<String>>>,
    on_action: RwLock<Option<ActionCallback>>,
    /// One re-render flag for the whole tree
    dirty: Arc<AtomicBool>,
}

#[derive(Clone)]
pub(super) enum Row {
    Action,
    Check,
    Submenu(Menu),
}

struct MenuInner {
    list: CandidateList<String>,
    rows: Vec<Row>,
    placement: Placement,
}

/// A menu of action items, checklist items and nested sub-menus.
///
/// Sub-menus open to the right of their row, on hover or with Right/Enter,
/// and close with Left, Escape, or after the pointer has been away from both
/// the row and the sub-menu panel for the grace interval. Opening one
/// sub-menu closes its open siblings.
///
/// Activating an item closes the menu when the close-on-select policy is on
/// ([`DisclosurePolicy::single_select`], the default). Checklist menus use
/// [`DisclosurePolicy::checklist`] to stay open while items are toggled.
///
/// # Example
///
/// ```
/// use hinge_widgets::{Menu, MenuItem};
///
/// let menu = Menu::new([
///     MenuItem::action("open", "Open"),
///     MenuItem::submenu("recent", "Open Recent", [
///         MenuItem::action("a.txt", "a.txt"),
///         MenuItem::action("b.txt", "b.txt"),
///     ]),
///     MenuItem::check("wrap", "Word Wrap"),
/// ]);
///
/// assert_eq!(menu.labels(), ["Open", "Open Recent", "Word Wrap"]);
/// assert!(menu.submenu("recent").is_some());
/// ```
#[derive(Clone)]
pub struct Menu {
    id: WidgetId,
    inner: Arc<RwLock<MenuInner>>,
    tree: Arc<MenuTree>,
    disclosure: Disclosure,
    errors: ErrorSlot,
}

impl Menu {
    pub fn new(items: impl IntoIterator<Item = MenuItem>) -> Self {
        let dirty = Arc::new(AtomicBool::new(false));
        let tree = Arc::new(MenuTree {
            timer: GraceTimer::new(),
            checked: RwLock::new(ValueStore::uncontrolled(Vec::new())),
            on_action: RwLock::new(None),
            dirty,
        });
        let disclosure = Disclosure::new(DisclosurePolicy::single_select());
        Self::build(items, disclosure, tree, Placement::Below)
    }

    fn build(
        items: impl IntoIterator<Item = MenuItem>,
        disclosure: Disclosure,
        tree: Arc<MenuTree>,
        placement: Placement,
    ) -> Self {
        track_open_state(&disclosure, &tree.dirty);

        let mut candidates = Vec::new();
        let mut rows = Vec::new();
        for item in items {
            let mut candidate = Candidate::new(item.id, item.label);
            if item.disabled {
                candidate = candidate.disabled();
            }
            candidates.push(candidate);
            rows.push(match item.kind {
                MenuItemKind::Action => Row::Action,
                MenuItemKind::Check => Row::Check,
                MenuItemKind::Submenu(children) => {
                    let child = Disclosure::child_of(&disclosure, disclosure.policy());
                    Row::Submenu(Menu::build(
                        children,
                        child,
                        Arc::clone(&tree),
                        Placement::Right,
                    ))
                }
            });
        }

        Self {
            id: WidgetId::next("menu"),
            inner: Arc::new(RwLock::new(MenuInner {
                list: CandidateList::new(candidates),
                rows,
                placement,
            })),
            errors: ErrorSlot::new(Arc::clone(&tree.dirty)),
            tree,
            disclosure,
        }
    }

    /// Apply `policy` to this menu and every sub-menu.
    pub fn with_policy(self, policy: DisclosurePolicy) -> Self {
        self.for_each_menu(&|menu| menu.disclosure.set_policy(policy));
        self
    }

    /// Bind the input surface for this menu and every sub-menu.
    pub fn with_surface(self, surface: InputSurface) -> Self {
        self.for_each_menu(&|menu| menu.disclosure.bind_surface(surface.clone()));
        self
    }

    pub fn with_placement(self, placement: Placement) -> Self {
        if let Ok(mut guard) = self.inner.write() {
            guard.placement = placement;
        }
        self
    }

    /// Run `callback` with the item id whenever an action item is activated.
    pub fn on_action(self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        if let Ok(mut guard) = self.tree.on_action.write() {
            *guard = Some(Arc::new(callback));
        }
        self
    }

    /// Use `store` for the checked item ids of the whole tree.
    pub fn with_checked(self, store: ValueStore<Vec<String>>) -> Self {
        if let Ok(mut guard) = self.tree.checked.write() {
            *guard = store;
        }
        self
    }

    fn for_each_menu(&self, f: &dyn Fn(&Menu)) {
        f(self);
        for child in self.submenus() {
            child.for_each_menu(f);
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn id_string(&self) -> String {
        self.id.to_string()
    }

    pub fn disclosure(&self) -> &Disclosure {
        &self.disclosure
    }

    /// The hover-grace timer shared by the tree.
    pub fn timer(&self) -> &GraceTimer {
        &self.tree.timer
    }

    pub fn is_open(&self) -> bool {
        self.disclosure.is_open()
    }

    pub fn is_nested(&self) -> bool {
        self.disclosure.is_nested()
    }

    // -------------------------------------------------------------------------
    // Items
    // -------------------------------------------------------------------------

    pub fn labels(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|guard| guard.list.items().iter().map(|c| c.label.clone()).collect())
            .unwrap_or_default()
    }

    pub fn highlighted_id(&self) -> Option<String> {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.list.highlighted().map(|c| c.id.clone()))
    }

    /// The direct sub-menu behind item `id`.
    pub fn submenu(&self, id: &str) -> Option<Menu> {
        let guard = self.inner.read().ok()?;
        let index = guard.list.position_of(&id.to_string())?;
        match guard.rows.get(index)? {
            Row::Submenu(menu) => Some(menu.clone()),
            _ => None,
        }
    }

    pub fn submenus(&self) -> Vec<Menu> {
        self.inner
            .read()
            .map(|guard| {
                guard
                    .rows
                    .iter()
                    .filter_map(|row| match row {
                        Row::Submenu(menu) => Some(menu.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The open direct sub-menu, if any. At most one is open at a time.
    pub fn open_submenu(&self) -> Option<Menu> {
        self.submenus().into_iter().find(Menu::is_open)
    }

    // -------------------------------------------------------------------------
    // Checked items
    // -------------------------------------------------------------------------

    /// Ids of the checked items across the tree.
    pub fn checked(&self) -> Vec<String> {
        self.tree
            .checked
            .read()
            .map(|store| store.current().clone())
            .unwrap_or_default()
    }

    pub fn is_checked(&self, id: &str) -> bool {
        self.checked().iter().any(|c| c == id)
    }

    /// Host re-supplies the checked ids of a controlled menu.
    pub fn set_checked(&self, ids: Vec<String>) -> Result<(), WidgetError> {
        let Ok(mut store) = self.tree.checked.write() else {
            return Ok(());
        };
        store.set_external(ids)?;
        self.tree.dirty.store(true, Ordering::SeqCst);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Open/close state
    // -------------------------------------------------------------------------

    /// Open with the first enabled item highlighted. A sub-menu only opens
    /// while its parent is open.
    pub fn open(&self) -> bool {
        if !self.disclosure.activate() {
            return false;
        }
        if let Ok(mut guard) = self.inner.write() {
            guard.list.move_highlight(Direction::First);
        }
        true
    }

    /// Open as a context menu at `(x, y)`.
    pub fn open_at(&self, x: u16, y: u16) -> bool {
        if let Ok(mut guard) = self.inner.write() {
            guard.placement = Placement::AtPoint { x, y };
        }
        self.open()
    }

    /// Close this menu and its open sub-menus.
    pub fn close(&self) -> bool {
        let closed = self.disclosure.close();
        if closed && !self.is_nested() {
            self.tree.timer.cancel();
        }
        closed
    }

    // -------------------------------------------------------------------------
    // Internal methods (called by event handlers)
    // -------------------------------------------------------------------------

    pub(super) fn move_highlight(&self, direction: Direction) {
        if let Ok(mut guard) = self.inner.write()
            && guard.list.move_highlight(direction)
        {
            self.tree.dirty.store(true, Ordering::SeqCst);
        }
    }

    /// Highlight the item on panel `row`. Returns whether it is now
    /// highlighted.
    pub(super) fn highlight_row(&self, row: usize) -> bool {
        let Ok(mut guard) = self.inner.write() else {
            return false;
        };
        let Some(index) = guard.list.visible_to_index(row) else {
            return false;
        };
        if guard.list.highlight_index(index) {
            self.tree.dirty.store(true, Ordering::SeqCst);
        }
        guard.list.highlighted_index() == Some(index)
    }

    /// Panel row under `point`.
    pub(super) fn row_at(&self, point: Point) -> Option<usize> {
        if !self.is_open() {
            return None;
        }
        panel_row(self.disclosure.panel_rect(), point)
    }

    pub(super) fn highlighted_row(&self) -> Option<(String, Row)> {
        let guard = self.inner.read().ok()?;
        let index = guard.list.highlighted_index()?;
        let id = guard.list.items().get(index)?.id.clone();
        let row = guard.rows.get(index)?.clone();
        Some((id, row))
    }

    /// Open the sub-menu behind the highlighted row, if it is one.
    pub(super) fn open_highlighted_submenu(&self, cx: &EventContext) -> bool {
        match self.highlighted_row() {
            Some((_, Row::Submenu(child))) => {
                if child.open() {
                    cx.push_event(WidgetEvent::new(WidgetEventKind::Open, child.id_string()));
                }
                true
            }
            _ => false,
        }
    }

    /// Activate the highlighted item.
    pub(super) fn activate_highlighted(&self, cx: &EventContext) -> bool {
        let Some((id, row)) = self.highlighted_row() else {
            return false;
        };

        match row {
            Row::Submenu(_) => self.open_highlighted_submenu(cx),
            Row::Action => {
                let callback = self
                    .tree
                    .on_action
                    .read()
                    .ok()
                    .and_then(|guard| guard.clone());
                let closed = self.disclosure.notify_selection();
                log::debug!("Menu {}: action '{id}'", self.id);
                if let Some(callback) = callback {
                    callback(&id);
                }
                self.push_change(&id, closed, cx);
                true
            }
            Row::Check => {
                let pending = {
                    let Ok(mut store) = self.tree.checked.write() else {
                        return false;
                    };
                    let next = toggled(store.current(), &id);
                    store.stage_change(next)
                };
                self.tree.dirty.store(true, Ordering::SeqCst);
                self.errors.clear();
                let closed = self.disclosure.notify_selection();
                if let Some(pending) = pending {
                    pending.fire();
                }
                self.push_change(&id, closed, cx);
                true
            }
        }
    }

    fn push_change(&self, item: &str, closed: bool, cx: &EventContext) {
        cx.push_event(WidgetEvent::new(WidgetEventKind::Change, self.id_string()).with_message(item));
        if closed {
            cx.push_event(WidgetEvent::new(WidgetEventKind::Close, self.id_string()));
        }
    }

    /// Highlight a hovered row and open it when it is a sub-menu.
    pub(super) fn hover_row(&self, row: usize, cx: &EventContext) {
        if self.highlight_row(row) {
            self.open_highlighted_submenu(cx);
        }
    }

    /// Arm the grace timer for the earliest hover deadline in the tree.
    pub(super) fn arm_timer(&self) {
        let mut root = self.disclosure.clone();
        while let Some(parent) = root.parent() {
            root = parent;
        }
        self.tree.timer.arm(&root);
    }

    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------

    /// Record where the host drew the trigger (top-level menus only; the
    /// rows of a parent are the triggers of its sub-menus).
    pub fn set_trigger_rect(&self, rect: Rect) {
        self.disclosure.set_trigger_rect(rect);
    }

    /// Place this menu's panel and those of its open sub-menus. Sub-menu
    /// trigger rects are set to their rows.
    pub fn place(&self, screen: Rect, resolver: &dyn PositionResolver) -> Option<Rect> {
        if !self.is_open() {
            return None;
        }
        let anchor = self.disclosure.trigger_rect().unwrap_or_default();
        let (size, placement, children) = {
            let guard = self.inner.read().ok()?;
            let size = list_panel_size(guard.list.items().iter().map(|c| c.label.as_str()));
            let children: Vec<(usize, Menu)> = guard
                .rows
                .iter()
                .enumerate()
                .filter_map(|(i, row)| match row {
                    Row::Submenu(menu) => Some((i, menu.clone())),
                    _ => None,
                })
                .collect();
            (size, guard.placement, children)
        };

        let panel = resolver.resolve(screen, anchor, size, placement);
        self.disclosure.set_panel_rect(panel);

        for (index, child) in children {
            let offset = u16::try_from(index).unwrap_or(u16::MAX);
            child.set_trigger_rect(Rect::new(
                panel.x,
                panel.y.saturating_add(offset),
                panel.width,
                1,
            ));
            child.place(screen, resolver);
        }
        Some(panel)
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    pub fn is_dirty(&self) -> bool {
        self.tree.dirty.load(Ordering::SeqCst)
    }

    pub fn clear_dirty(&self) {
        self.tree.dirty.store(false, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for Menu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Menu")
            .field("id", &self.id)
            .field("disclosure", &self.disclosure)
            .finish_non_exhaustive()
    }
}

impl Validatable for Menu {
    type Value = Vec<String>;

    fn validation_value(&self) -> Self::Value {
        self.checked()
    }

    fn widget_id(&self) -> String {
        self.id_string()
    }

    fn error_slot(&self) -> &ErrorSlot {
        &self.errors
    }
}

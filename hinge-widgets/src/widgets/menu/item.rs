//! Menu item definitions.

/// What activating a menu item does.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuItemKind {
    /// Runs the menu's action callback with the item id.
    Action,
    /// Toggles the item id in the menu's checked set.
    Check,
    /// Opens a nested menu to the side.
    Submenu(Vec<MenuItem>),
}

/// A single row of a menu.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub id: String,
    pub label: String,
    pub disabled: bool,
    pub kind: MenuItemKind,
}

impl MenuItem {
    pub fn action(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_kind(id, label, MenuItemKind::Action)
    }

    pub fn check(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_kind(id, label, MenuItemKind::Check)
    }

    pub fn submenu(
        id: impl Into<String>,
        label: impl Into<String>,
        items: impl IntoIterator<Item = MenuItem>,
    ) -> Self {
        Self::with_kind(id, label, MenuItemKind::Submenu(items.into_iter().collect()))
    }

    fn with_kind(id: impl Into<String>, label: impl Into<String>, kind: MenuItemKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            disabled: false,
            kind,
        }
    }

    /// Disabled items are skipped by navigation and cannot be activated.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn is_submenu(&self) -> bool {
        matches!(self.kind, MenuItemKind::Submenu(_))
    }
}

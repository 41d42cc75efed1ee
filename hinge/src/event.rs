//! Input events delivered by the ambient input surface.
//!
//! The engines only care about three kinds of input: key presses, pointer
//! presses and pointer movement. Hosts translate their native events into
//! [`InputEvent`]; a conversion from crossterm events is provided.

use thiserror::Error;

/// Simplified key representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    F(u8),
}

impl Key {
    /// Whether this is the cancellation key that dismisses any open overlay.
    pub const fn is_cancel(&self) -> bool {
        matches!(self, Key::Escape)
    }
}

/// Key modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Default::default()
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Default::default()
        }
    }

    pub fn none(&self) -> bool {
        !self.shift && !self.ctrl && !self.alt
    }
}

/// A key together with the modifiers held while it was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// A key press without modifiers.
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// Ctrl and alt chords are reserved for host keybinds.
    pub fn is_chord(&self) -> bool {
        self.modifiers.ctrl || self.modifiers.alt
    }
}

impl From<Key> for KeyPress {
    fn from(key: Key) -> Self {
        Self::plain(key)
    }
}

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// An event from the ambient input surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(KeyPress),
    PointerDown { x: u16, y: u16, button: MouseButton },
    PointerMove { x: u16, y: u16 },
}

impl InputEvent {
    pub fn key(key: Key) -> Self {
        Self::KeyDown(KeyPress::plain(key))
    }

    pub fn click(x: u16, y: u16) -> Self {
        Self::PointerDown {
            x,
            y,
            button: MouseButton::Left,
        }
    }

    pub fn hover(x: u16, y: u16) -> Self {
        Self::PointerMove { x, y }
    }
}

/// A native event that has no [`InputEvent`] counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported input event: {0}")]
pub struct UnsupportedEvent(pub String);

// Conversion from crossterm types
impl TryFrom<crossterm::event::KeyCode> for Key {
    type Error = UnsupportedEvent;

    fn try_from(code: crossterm::event::KeyCode) -> Result<Self, Self::Error> {
        use crossterm::event::KeyCode;
        Ok(match code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => Key::BackTab,
            KeyCode::Esc => Key::Escape,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::Insert => Key::Insert,
            KeyCode::F(n) => Key::F(n),
            other => return Err(UnsupportedEvent(format!("{other:?}"))),
        })
    }
}

impl From<crossterm::event::KeyModifiers> for Modifiers {
    fn from(mods: crossterm::event::KeyModifiers) -> Self {
        use crossterm::event::KeyModifiers;
        Self {
            shift: mods.contains(KeyModifiers::SHIFT),
            ctrl: mods.contains(KeyModifiers::CONTROL),
            alt: mods.contains(KeyModifiers::ALT),
        }
    }
}

impl From<crossterm::event::MouseButton> for MouseButton {
    fn from(button: crossterm::event::MouseButton) -> Self {
        match button {
            crossterm::event::MouseButton::Left => MouseButton::Left,
            crossterm::event::MouseButton::Right => MouseButton::Right,
            crossterm::event::MouseButton::Middle => MouseButton::Middle,
        }
    }
}

impl TryFrom<crossterm::event::Event> for InputEvent {
    type Error = UnsupportedEvent;

    fn try_from(event: crossterm::event::Event) -> Result<Self, Self::Error> {
        use crossterm::event::{Event as CrosstermEvent, KeyEventKind, MouseEventKind};

        match event {
            CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => {
                let code = Key::try_from(key.code)?;
                Ok(InputEvent::KeyDown(KeyPress::new(code, key.modifiers.into())))
            }
            CrosstermEvent::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(button) => Ok(InputEvent::PointerDown {
                    x: mouse.column,
                    y: mouse.row,
                    button: button.into(),
                }),
                MouseEventKind::Moved | MouseEventKind::Drag(_) => Ok(InputEvent::PointerMove {
                    x: mouse.column,
                    y: mouse.row,
                }),
                other => Err(UnsupportedEvent(format!("{other:?}"))),
            },
            other => Err(UnsupportedEvent(format!("{other:?}"))),
        }
    }
}

//! Single-line query text editing for search-filtered widgets.

use unicode_width::UnicodeWidthStr;

use crate::event::{Key, KeyPress};

/// Result of handling a text editing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEditResult {
    /// Text was modified.
    Changed,
    /// Enter was pressed.
    Submitted,
    /// Key was handled but text didn't change (e.g., cursor movement).
    Handled,
    /// Key was not handled, should be passed through.
    Ignored,
}

/// Text plus a cursor measured in characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryText {
    text: String,
    cursor: usize,
}

impl QueryText {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Terminal column of the cursor, counting wide glyphs as two cells.
    pub fn cursor_column(&self) -> usize {
        let end = char_to_byte_index(&self.text, self.cursor);
        self.text[..end].width()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the text and put the cursor at the end.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Handle a key press for text editing.
    pub fn handle_key(&mut self, key: &KeyPress) -> TextEditResult {
        let modifiers = key.modifiers;
        match key.key {
            Key::Char(c) if modifiers.none() || (modifiers.shift && !modifiers.ctrl) => {
                self.insert_char(c);
                TextEditResult::Changed
            }
            Key::Backspace if modifiers.none() => {
                if self.delete_back() {
                    TextEditResult::Changed
                } else {
                    TextEditResult::Ignored
                }
            }
            Key::Delete if modifiers.none() => {
                if self.delete_forward() {
                    TextEditResult::Changed
                } else {
                    TextEditResult::Handled
                }
            }
            Key::Left if !modifiers.ctrl => {
                self.cursor = self.cursor.saturating_sub(1);
                TextEditResult::Handled
            }
            Key::Right if !modifiers.ctrl => {
                self.cursor = (self.cursor + 1).min(self.char_count());
                TextEditResult::Handled
            }
            Key::Home if !modifiers.ctrl => {
                self.cursor = 0;
                TextEditResult::Handled
            }
            Key::End if !modifiers.ctrl => {
                self.cursor = self.char_count();
                TextEditResult::Handled
            }
            Key::Enter => TextEditResult::Submitted,
            _ => TextEditResult::Ignored,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor. Returns true if text changed.
    pub fn delete_back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let start = char_to_byte_index(&self.text, self.cursor - 1);
        self.text.remove(start);
        self.cursor -= 1;
        true
    }

    /// Delete the character at the cursor. Returns true if text changed.
    pub fn delete_forward(&mut self) -> bool {
        if self.cursor >= self.char_count() {
            return false;
        }
        let start = char_to_byte_index(&self.text, self.cursor);
        self.text.remove(start);
        true
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Convert character index to byte index in a string.
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_multibyte_text_by_character() {
        let mut q = QueryText::new("añb");
        assert_eq!(q.cursor(), 3);
        q.handle_key(&KeyPress::plain(Key::Left));
        assert!(q.delete_back());
        assert_eq!(q.as_str(), "ab");
        q.insert_char('ü');
        assert_eq!(q.as_str(), "aüb");
        assert_eq!(q.cursor(), 2);
    }

    #[test]
    fn cursor_column_counts_cells() {
        let mut q = QueryText::new("東京x");
        assert_eq!(q.cursor(), 3);
        assert_eq!(q.cursor_column(), 5);
        q.handle_key(&KeyPress::plain(Key::Left));
        assert_eq!(q.cursor_column(), 4);
        q.handle_key(&KeyPress::plain(Key::Home));
        assert_eq!(q.cursor_column(), 0);
    }

    #[test]
    fn backspace_on_empty_is_ignored() {
        let mut q = QueryText::default();
        assert_eq!(
            q.handle_key(&KeyPress::plain(Key::Backspace)),
            TextEditResult::Ignored
        );
    }
}

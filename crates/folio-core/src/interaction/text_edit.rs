//! Inline text editing of text blocks.
//!
//! The editor keeps its own buffer; the document only changes when the
//! edit is committed. Escape, blur and Ctrl/Cmd+Enter all commit. There is
//! no cancel.

use crate::block::{Block, BlockContent, BlockId};
use crate::document::PageId;

/// Key events for text editing.
#[derive(Debug, Clone, PartialEq)]
pub enum TextKey {
    Character(String),
    Backspace,
    Delete,
    Enter,
    Left,
    Right,
    Home,
    End,
    Escape,
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl TextModifiers {
    /// Get the action modifier (Ctrl on Windows/Linux, Cmd on macOS).
    pub fn action_mod(&self) -> bool {
        if cfg!(target_os = "macos") { self.meta } else { self.ctrl }
    }
}

/// Result of handling a key while editing.
#[derive(Debug, Clone, PartialEq)]
pub enum TextEditResult {
    /// Key consumed; the buffer may have changed.
    Handled,
    /// The user finished editing; commit the buffer.
    ExitEdit,
    /// Not an editing key.
    NotHandled,
}

/// Whether a click of `click_count` on `block` starts inline editing:
/// a double-click on any text block, or a single click on an empty one.
/// Text-kind blocks holding structured content are never edited inline.
pub fn starts_edit(block: &Block, click_count: u32) -> bool {
    if !block.block_type.is_text() {
        return false;
    }
    let Some(text) = block.content.as_text() else {
        return false;
    };
    click_count >= 2 || (click_count == 1 && text.is_empty())
}

/// Local edit buffer for one block.
#[derive(Debug, Clone)]
pub struct TextEditSession {
    pub page_id: PageId,
    pub block_id: BlockId,
    buffer: String,
    /// Byte offset of the caret, always on a char boundary.
    cursor: usize,
}

impl TextEditSession {
    /// Start editing `block`. Returns `None` for blocks without text content.
    pub fn begin(page_id: PageId, block: &Block) -> Option<Self> {
        if !block.block_type.is_text() {
            return None;
        }
        let buffer = block.content.as_text()?.to_string();
        let cursor = buffer.len();
        Some(Self { page_id, block_id: block.id.clone(), buffer, cursor })
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn handle_key(&mut self, key: TextKey, modifiers: TextModifiers) -> TextEditResult {
        match key {
            TextKey::Escape => TextEditResult::ExitEdit,
            TextKey::Enter if modifiers.action_mod() => TextEditResult::ExitEdit,
            TextKey::Enter => {
                self.insert("\n");
                TextEditResult::Handled
            }
            TextKey::Character(s) => {
                if modifiers.action_mod() {
                    return TextEditResult::NotHandled;
                }
                self.insert(&s);
                TextEditResult::Handled
            }
            TextKey::Backspace => {
                if let Some(prev) = self.prev_boundary() {
                    self.buffer.replace_range(prev..self.cursor, "");
                    self.cursor = prev;
                }
                TextEditResult::Handled
            }
            TextKey::Delete => {
                if let Some(next) = self.next_boundary() {
                    self.buffer.replace_range(self.cursor..next, "");
                }
                TextEditResult::Handled
            }
            TextKey::Left => {
                if let Some(prev) = self.prev_boundary() {
                    self.cursor = prev;
                }
                TextEditResult::Handled
            }
            TextKey::Right => {
                if let Some(next) = self.next_boundary() {
                    self.cursor = next;
                }
                TextEditResult::Handled
            }
            TextKey::Home => {
                self.cursor = self.buffer[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
                TextEditResult::Handled
            }
            TextKey::End => {
                self.cursor = self.buffer[self.cursor..]
                    .find('\n')
                    .map_or(self.buffer.len(), |i| self.cursor + i);
                TextEditResult::Handled
            }
        }
    }

    fn insert(&mut self, s: &str) {
        self.buffer.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.buffer[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.buffer[self.cursor..].chars().next().map(|c| self.cursor + c.len_utf8())
    }

    /// Content to write back into the block.
    pub fn into_content(self) -> BlockContent {
        BlockContent::Text(self.buffer)
    }
}

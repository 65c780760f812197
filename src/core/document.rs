//! Editable markdown buffers

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

use super::link::byte_offset;
use crate::plugin::api::{Cursor, EditSurface};

/// A markdown document loaded for editing, with cursor and selection
#[derive(Debug, Clone)]
pub struct TextBuffer {
    /// File path, if backed by a file
    pub path: Option<PathBuf>,
    /// Document content
    content: String,
    /// Whether the buffer has unsaved changes
    pub modified: bool,
    /// Last modification time
    pub last_modified: Option<SystemTime>,
    cursor: Cursor,
    /// Selection anchor; the selection runs between anchor and cursor
    anchor: Option<Cursor>,
}

impl TextBuffer {
    /// Create a buffer not backed by a file
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            path: None,
            content: content.into(),
            modified: false,
            last_modified: None,
            cursor: Cursor::default(),
            anchor: None,
        }
    }

    /// Open a buffer from a file
    pub fn open(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let last_modified = fs::metadata(path).ok().and_then(|m| m.modified().ok());

        Ok(Self {
            path: Some(path.to_path_buf()),
            last_modified,
            ..Self::new(content)
        })
    }

    /// Save the buffer to its file and clear the modified flag
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Buffer has no file path"))?;
        fs::write(path, &self.content)
            .with_context(|| format!("Failed to save file: {}", path.display()))?;
        tracing::info!("Saved document: {}", path.display());

        self.modified = false;
        self.last_modified = Some(SystemTime::now());
        Ok(())
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Select text between two positions
    pub fn select(&mut self, from: Cursor, to: Cursor) {
        self.anchor = Some(from);
        self.cursor = to;
    }

    /// Byte range of line `n` without its newline
    fn line_range(&self, n: usize) -> Option<Range<usize>> {
        let mut start = 0;
        for (idx, line) in self.content.split('\n').enumerate() {
            if idx == n {
                return Some(start..start + line.len());
            }
            start += line.len() + 1;
        }
        None
    }

    /// Byte offset of a cursor, clamped to the document
    fn offset_of(&self, cursor: Cursor) -> usize {
        match self.line_range(cursor.line) {
            Some(range) => range.start + byte_offset(&self.content[range], cursor.ch),
            None => self.content.len(),
        }
    }

    /// Cursor for a byte offset
    fn cursor_at(&self, offset: usize) -> Cursor {
        let before = &self.content[..offset];
        let line = before.matches('\n').count();
        let line_start = before.rfind('\n').map(|idx| idx + 1).unwrap_or(0);
        Cursor::new(line, before[line_start..].chars().count())
    }

    fn selection_range(&self) -> Range<usize> {
        let head = self.offset_of(self.cursor);
        let anchor = self.anchor.map(|a| self.offset_of(a)).unwrap_or(head);
        head.min(anchor)..head.max(anchor)
    }

    fn set_content(&mut self, content: String) {
        if self.content != content {
            self.content = content;
            self.modified = true;
        }
    }
}

impl EditSurface for TextBuffer {
    fn selection(&self) -> String {
        self.content[self.selection_range()].to_string()
    }

    fn replace_selection(&mut self, text: &str) {
        let range = self.selection_range();
        let mut content = self.content.clone();
        content.replace_range(range.clone(), text);
        self.set_content(content);
        self.anchor = None;
        self.cursor = self.cursor_at(range.start + text.len());
    }

    fn line(&self, n: usize) -> String {
        self.line_range(n)
            .map(|range| self.content[range].to_string())
            .unwrap_or_default()
    }

    fn set_line(&mut self, n: usize, text: &str) {
        if let Some(range) = self.line_range(n) {
            let mut content = self.content.clone();
            content.replace_range(range, text);
            self.set_content(content);
        }
    }

    fn cursor(&self) -> Cursor {
        self.cursor
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.anchor = None;
        self.cursor = cursor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_selection_moves_cursor() {
        let mut buffer = TextBuffer::new("# Plan\nReach Milestone 1 soon\n");
        buffer.select(Cursor::new(1, 6), Cursor::new(1, 17));
        assert_eq!(buffer.selection(), "Milestone 1");

        buffer.replace_selection("[[Milestone 1]]");
        assert_eq!(buffer.content(), "# Plan\nReach [[Milestone 1]] soon\n");
        assert_eq!(buffer.cursor(), Cursor::new(1, 21));
        assert!(buffer.modified);
        assert_eq!(buffer.selection(), "");
    }

    #[test]
    fn test_backwards_selection_across_lines() {
        let mut buffer = TextBuffer::new("ab\ncd");
        buffer.select(Cursor::new(1, 1), Cursor::new(0, 1));
        assert_eq!(buffer.selection(), "b\nc");
    }

    #[test]
    fn test_line_access_with_multibyte_text() {
        let mut buffer = TextBuffer::new("first\nçà [[x]]\n");
        assert_eq!(buffer.line(1), "çà [[x]]");
        assert_eq!(buffer.line(2), "");
        assert_eq!(buffer.line(9), "");

        buffer.set_line(1, "çà x");
        assert_eq!(buffer.content(), "first\nçà x\n");
        buffer.set_line(9, "ignored");
        assert_eq!(buffer.content(), "first\nçà x\n");
    }

    #[test]
    fn test_open_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Note.md");
        std::fs::write(&path, "hello").unwrap();

        let mut buffer = TextBuffer::open(&path).unwrap();
        buffer.set_line(0, "bye");
        buffer.save().unwrap();
        assert!(!buffer.modified);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "bye");
    }
}

//! Host collaborator definitions
//!
//! The lifecycle manager never talks to an editor or a file system directly;
//! a host provides these traits.

use anyhow::Result;
use async_trait::async_trait;

use crate::core::config::OpenWindowMode;
use crate::core::entry::{DocumentRef, Entry, FolderRef};

/// Backing store holding documents and folders
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Whether anything exists at `path`
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Fresh lookup of the entry at `path`
    async fn entry(&self, path: &str) -> Result<Option<Entry>>;

    /// Create a document; parent folders must already exist
    async fn create(&self, path: &str, content: &str) -> Result<DocumentRef>;

    /// Create a folder and any missing ancestors
    async fn create_folder(&self, path: &str) -> Result<FolderRef>;

    /// Move an entry to the trash. `permanent` erases instead.
    async fn move_to_trash(&self, path: &str, permanent: bool) -> Result<()>;
}

/// Host link resolution rules
pub trait LinkResolver: Send + Sync {
    /// Resolve a link as written in `relative_to` to an existing document
    fn resolve_link(&self, raw: &str, relative_to: &str) -> Option<DocumentRef>;
}

/// Cursor position: zero-based line and character column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub line: usize,
    pub ch: usize,
}

impl Cursor {
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

/// The text surface of the active editor
pub trait EditSurface: Send {
    fn selection(&self) -> String;

    fn replace_selection(&mut self, text: &str);

    /// Content of line `n`, empty when out of range
    fn line(&self, n: usize) -> String;

    fn set_line(&mut self, n: usize, text: &str);

    fn cursor(&self) -> Cursor;

    fn set_cursor(&mut self, cursor: Cursor);
}

/// Where an opened note is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Current,
    NewTab,
    Split,
}

impl From<OpenWindowMode> for Placement {
    fn from(mode: OpenWindowMode) -> Self {
        match mode {
            OpenWindowMode::Current => Placement::Current,
            OpenWindowMode::NewTab => Placement::NewTab,
            OpenWindowMode::Split => Placement::Split,
        }
    }
}

/// Navigation and user feedback provided by the host workspace
#[async_trait]
pub trait Workspace: Send + Sync {
    /// Open a document
    async fn open(&self, document: &DocumentRef, placement: Placement) -> Result<()>;

    /// Show a short message to the user
    fn notify(&self, message: &str);

    /// Ask the host to refresh its layout (drops stale history entries)
    fn refresh_layout(&self) {}
}

//! Command-line host: wires a directory vault and file buffers to the manager

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use pagelink::core::document::TextBuffer;
use pagelink::core::file_system::FsVault;
use pagelink::plugin::api::{Cursor, EditSurface, Placement, VaultStore, Workspace};
use pagelink::{CreatedNote, DocumentRef, Entry, LinkNoteError, NoteLifecycleManager, SettingsStore};

/// Workspace backed by the desktop: notices go to stdout, notes open in the
/// system's default application.
pub struct DesktopWorkspace {
    vault: Arc<FsVault>,
}

#[async_trait]
impl Workspace for DesktopWorkspace {
    async fn open(&self, document: &DocumentRef, placement: Placement) -> Result<()> {
        // The system opener has no notion of tabs or splits
        tracing::debug!("Opening {} ({:?})", document, placement);
        open::that(self.vault.absolute(document.path()))?;
        Ok(())
    }

    fn notify(&self, message: &str) {
        println!("{}", message);
    }

    fn refresh_layout(&self) {
        tracing::debug!("Layout refresh requested");
    }
}

/// Main application state
pub struct PagelinkApp {
    vault: Arc<FsVault>,
    settings: SettingsStore,
    manager: NoteLifecycleManager,
}

impl PagelinkApp {
    pub fn new(vault_root: PathBuf, settings: SettingsStore) -> Self {
        let vault = Arc::new(FsVault::new(vault_root));
        let workspace = Arc::new(DesktopWorkspace {
            vault: vault.clone(),
        });
        let manager = NoteLifecycleManager::for_vault(vault.clone(), workspace);
        Self {
            vault,
            settings,
            manager,
        }
    }

    /// Resolve the note being edited and load it into a buffer
    async fn open_note(&self, note: &str) -> Result<(DocumentRef, TextBuffer)> {
        let current = match self.vault.entry(note).await? {
            Some(Entry::Document(doc)) => doc,
            _ => return Err(LinkNoteError::NoCurrentDocument.into()),
        };
        let buffer = TextBuffer::open(&self.vault.absolute(current.path()))?;
        Ok((current, buffer))
    }

    /// Turn the text between two columns of `line` into a new note
    pub async fn create(&self, note: &str, line: usize, from: usize, to: usize) -> Result<CreatedNote> {
        let (current, mut buffer) = self.open_note(note).await?;
        buffer.select(Cursor::new(line, from), Cursor::new(line, to));
        let selection = buffer.selection();

        let created = self
            .manager
            .create_note_from_selection(self.settings.settings(), &selection, &current, &mut buffer)
            .await?;
        buffer.save().context("Failed to save the edited note")?;

        tracing::info!("Linked {} from {}", created.document, current);
        Ok(created)
    }

    /// Delete the note linked at `line`:`ch` and unlink it
    pub async fn delete(&self, note: &str, line: usize, ch: usize) -> Result<DocumentRef> {
        let (current, mut buffer) = self.open_note(note).await?;
        buffer.set_cursor(Cursor::new(line, ch));

        let span = self
            .manager
            .find_link_under_cursor(&buffer, &current)
            .ok_or(LinkNoteError::UnresolvableLink)?;
        let housekeeping = self
            .manager
            .delete_linked_note(self.settings.settings(), &span.target, &mut buffer, span.start, span.end)
            .await?;
        buffer.save().context("Failed to save the edited note")?;

        // The process exits right after, so wait for pruning here
        housekeeping.settled().await;
        Ok(span.target)
    }
}

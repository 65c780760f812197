//! Note lifecycle: turning a selection into a linked note, and undoing it

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::api::{Cursor, EditSurface, LinkResolver, Placement, VaultStore, Workspace};
use super::pruner::FolderPruner;
use crate::core::config::Settings;
use crate::core::entry::{join_path, DocumentRef, Entry, DOCUMENT_EXTENSION};
use crate::core::error::{LinkNoteError, Result};
use crate::core::link::{byte_offset, find_link_at, format_link, parse_link, LinkSpan};
use crate::core::path_policy::{resolve_destination_folder, sanitize_file_name};

/// Outcome of the create flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedNote {
    pub document: DocumentRef,
    /// Markup that replaced the selection
    pub link: String,
    /// False when an existing note was reused
    pub created: bool,
}

/// Best-effort follow-up tasks scheduled by the delete flow.
///
/// Dropping it detaches the tasks; `settled` waits for them.
#[derive(Debug, Default)]
pub struct Housekeeping {
    tasks: Vec<JoinHandle<()>>,
}

impl Housekeeping {
    /// Wait for every scheduled task to finish
    pub async fn settled(self) {
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!("Housekeeping task failed: {}", e);
            }
        }
    }
}

/// Creates and deletes linked notes on behalf of a host
pub struct NoteLifecycleManager {
    store: Arc<dyn VaultStore>,
    resolver: Arc<dyn LinkResolver>,
    workspace: Arc<dyn Workspace>,
    /// Wait before delayed follow-ups after a deletion
    settle_delay: Duration,
    /// Wait before each folder emptiness check
    prune_delay: Duration,
    /// Serializes flows so overlapping gestures cannot interleave store mutations
    flow_lock: Mutex<()>,
}

impl NoteLifecycleManager {
    pub fn new(
        store: Arc<dyn VaultStore>,
        resolver: Arc<dyn LinkResolver>,
        workspace: Arc<dyn Workspace>,
    ) -> Self {
        Self {
            store,
            resolver,
            workspace,
            settle_delay: Duration::from_millis(100),
            prune_delay: Duration::from_millis(50),
            flow_lock: Mutex::new(()),
        }
    }

    /// Manager over a vault that is both store and resolver
    pub fn for_vault<V>(vault: Arc<V>, workspace: Arc<dyn Workspace>) -> Self
    where
        V: VaultStore + LinkResolver + 'static,
    {
        Self::new(vault.clone(), vault, workspace)
    }

    /// Override the delays used for follow-up tasks
    pub fn with_delays(mut self, settle_delay: Duration, prune_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self.prune_delay = prune_delay;
        self
    }

    /// Report failures the user should see, then pass the result through
    fn surface<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.is_user_visible() {
                tracing::error!("{}", e);
                self.workspace.notify(&e.to_string());
            }
        }
        result
    }

    /// Link under the editor cursor that points at an existing note
    pub fn find_link_under_cursor(
        &self,
        surface: &dyn EditSurface,
        current: &DocumentRef,
    ) -> Option<LinkSpan> {
        let cursor = surface.cursor();
        let line = surface.line(cursor.line);
        find_link_at(&line, cursor.ch, current, self.resolver.as_ref())
    }

    /// Create (or reuse) a note named after the selection and replace the
    /// selection with a link to it.
    pub async fn create_note_from_selection(
        &self,
        settings: &Settings,
        selection: &str,
        current: &DocumentRef,
        surface: &mut dyn EditSurface,
    ) -> Result<CreatedNote> {
        let title = selection.trim();
        if title.is_empty() {
            return Err(LinkNoteError::InvalidSelection);
        }

        let _flow = self.flow_lock.lock().await;
        let (document, created) = self.surface(self.ensure_note(settings, title, current).await)?;

        let link = format_link(&document, current, settings);
        surface.replace_selection(&link);
        tracing::debug!("Inserted link {} in {}", link, current);

        if settings.jump_to_new_page {
            let placement = Placement::from(settings.open_window_mode);
            if let Err(e) = self.workspace.open(&document, placement).await {
                tracing::warn!("Failed to open {}: {}", document, e);
            }
        }

        Ok(CreatedNote {
            document,
            link,
            created,
        })
    }

    async fn ensure_note(
        &self,
        settings: &Settings,
        title: &str,
        current: &DocumentRef,
    ) -> Result<(DocumentRef, bool)> {
        let folder = resolve_destination_folder(self.store.as_ref(), current, settings).await?;
        let file_name = format!("{}.{}", sanitize_file_name(title), DOCUMENT_EXTENSION);
        let path = join_path(folder.path(), &file_name);

        match self
            .store
            .entry(&path)
            .await
            .map_err(|e| LinkNoteError::file_creation(&path, e))?
        {
            Some(Entry::Document(existing)) => {
                tracing::debug!("Reusing existing note: {}", existing);
                Ok((existing, false))
            }
            Some(Entry::Folder(_)) => Err(LinkNoteError::file_creation(
                &path,
                "a folder with that name already exists",
            )),
            None => {
                let content = if settings.show_title_line {
                    format!("# {}\n\n", title)
                } else {
                    String::new()
                };
                let document = self
                    .store
                    .create(&path, &content)
                    .await
                    .map_err(|e| LinkNoteError::file_creation(&path, e))?;
                tracing::info!("Created note: {}", document);
                Ok((document, true))
            }
        }
    }

    /// Trash the linked note, then edit the link at `[span_start, span_end)`
    /// on the cursor line. A failed deletion leaves the text untouched.
    pub async fn delete_linked_note(
        &self,
        settings: &Settings,
        target: &DocumentRef,
        surface: &mut dyn EditSurface,
        span_start: usize,
        span_end: usize,
    ) -> Result<Housekeeping> {
        let _flow = self.flow_lock.lock().await;
        self.surface(self.trash_note(target).await)?;
        self.workspace.notify(&format!("Deleted {}", target.base_name()));

        // Re-read the line right before editing it
        let line_no = surface.cursor().line;
        let line = surface.line(line_no);
        let start = byte_offset(&line, span_start);
        let end = byte_offset(&line, span_end).max(start);
        let markup = &line[start..end];

        let (replacement, cursor_ch) = if settings.delete_link_text {
            (String::new(), span_start)
        } else {
            let display = parse_link(markup)
                .map(|link| link.display_text)
                .unwrap_or_else(|| target.base_name());
            let ch = span_start + display.chars().count();
            (display, ch)
        };

        let edited = format!("{}{}{}", &line[..start], replacement, &line[end..]);
        surface.set_line(line_no, &edited);
        surface.set_cursor(Cursor::new(line_no, cursor_ch));

        Ok(self.schedule_housekeeping(settings, target))
    }

    async fn trash_note(&self, target: &DocumentRef) -> Result<()> {
        let path = target.path();
        match self.store.entry(path).await {
            Ok(Some(Entry::Document(_))) => {}
            Ok(_) => return Err(LinkNoteError::file_deletion(path, "note no longer exists")),
            Err(e) => return Err(LinkNoteError::file_deletion(path, e)),
        }

        self.store
            .move_to_trash(path, false)
            .await
            .map_err(|e| LinkNoteError::file_deletion(path, e))?;
        tracing::info!("Moved note to trash: {}", path);
        Ok(())
    }

    fn schedule_housekeeping(&self, settings: &Settings, target: &DocumentRef) -> Housekeeping {
        let mut housekeeping = Housekeeping::default();
        let delay = self.settle_delay;

        let workspace = self.workspace.clone();
        housekeeping.tasks.push(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            workspace.refresh_layout();
        }));

        if settings.delete_empty_folder {
            let pruner = FolderPruner::new(self.store.clone(), self.workspace.clone())
                .with_settle_delay(self.prune_delay);
            let folder = target.parent_path();
            housekeeping.tasks.push(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                pruner.prune_if_empty(&folder).await;
            }));
        }

        housekeeping
    }
}

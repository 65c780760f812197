//! Removal of folders left empty after a note is deleted

use std::sync::Arc;
use std::time::Duration;

use crate::core::entry::Entry;
use crate::plugin::api::{VaultStore, Workspace};

/// Walks upward from a folder, trashing each one that is empty or holds
/// only system artifacts. Stops at the first non-empty folder or the root.
pub struct FolderPruner {
    store: Arc<dyn VaultStore>,
    workspace: Arc<dyn Workspace>,
    /// Pause before each check so the store can settle
    settle_delay: Duration,
}

impl FolderPruner {
    pub fn new(store: Arc<dyn VaultStore>, workspace: Arc<dyn Workspace>) -> Self {
        Self {
            store,
            workspace,
            settle_delay: Duration::from_millis(50),
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Prune `folder_path` and its ancestors. Never fails: a folder that is
    /// already gone or cannot be trashed ends the walk.
    ///
    /// Returns the folders that were trashed, innermost first.
    pub async fn prune_if_empty(&self, folder_path: &str) -> Vec<String> {
        let mut pruned = Vec::new();
        let mut next = Some(folder_path.to_string());

        while let Some(path) = next.take() {
            if !self.settle_delay.is_zero() {
                tokio::time::sleep(self.settle_delay).await;
            }

            let folder = match self.store.entry(&path).await {
                Ok(Some(Entry::Folder(folder))) => folder,
                Ok(_) => {
                    tracing::debug!("Folder {} no longer exists, nothing to prune", path);
                    break;
                }
                Err(e) => {
                    tracing::warn!("Failed to look up folder {}: {}", path, e);
                    break;
                }
            };

            if folder.is_root() || !folder.is_effectively_empty() {
                break;
            }

            if let Err(e) = self.store.move_to_trash(folder.path(), false).await {
                tracing::warn!("Failed to remove empty folder {}: {}", folder.path(), e);
                break;
            }

            tracing::info!("Removed empty folder: {}", folder.path());
            self.workspace.notify(&format!("Deleted empty folder {}", folder.name()));
            pruned.push(folder.path().to_string());
            next = folder.parent_path();
        }

        pruned
    }
}

//! In-memory vault, used by tests and embedders without a file system

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use super::entry::{file_name, normalize_path, parent_path, ChildEntry, DocumentRef, Entry, EntryKind, FolderRef};
use super::resolve::resolve_linkpath;
use crate::plugin::api::{LinkResolver, VaultStore};

#[derive(Debug, Default)]
struct VaultState {
    /// Document path -> content
    documents: BTreeMap<String, String>,
    /// Folder paths, excluding the root
    folders: BTreeSet<String>,
    /// Trashed paths in trash order
    trash: Vec<String>,
    /// Paths whose mutations fail
    failing: HashSet<String>,
}

impl VaultState {
    fn children(&self, folder: &str) -> Vec<ChildEntry> {
        let folders = self
            .folders
            .iter()
            .filter(|path| parent_path(path) == folder)
            .map(|path| ChildEntry::new(file_name(path), EntryKind::Folder));
        let documents = self
            .documents
            .keys()
            .filter(|path| parent_path(path) == folder)
            .map(|path| ChildEntry::new(file_name(path), EntryKind::Document));
        folders.chain(documents).collect()
    }

    fn entry(&self, path: &str) -> Option<Entry> {
        if self.documents.contains_key(path) {
            Some(Entry::Document(DocumentRef::new(path)))
        } else if path.is_empty() || self.folders.contains(path) {
            Some(Entry::Folder(FolderRef::new(path, self.children(path))))
        } else {
            None
        }
    }

    fn add_folder_chain(&mut self, path: &str) {
        let mut current = normalize_path(path);
        while !current.is_empty() {
            let parent = parent_path(&current);
            self.folders.insert(current);
            current = parent;
        }
    }

    fn check(&self, path: &str) -> Result<()> {
        if self.failing.contains(path) {
            anyhow::bail!("permission denied");
        }
        Ok(())
    }
}

/// Vault held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryVault {
    state: Mutex<VaultState>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VaultState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a document (and its folders) directly
    pub fn insert_document(&self, path: &str, content: &str) {
        let path = normalize_path(path);
        let mut state = self.lock();
        state.add_folder_chain(&parent_path(&path));
        state.documents.insert(path, content.to_string());
    }

    /// Add a folder (and its ancestors) directly
    pub fn insert_folder(&self, path: &str) {
        self.lock().add_folder_chain(path);
    }

    /// Make every mutation of `path` fail
    pub fn fail_on(&self, path: &str) {
        self.lock().failing.insert(normalize_path(path));
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.lock().documents.get(&normalize_path(path)).cloned()
    }

    pub fn is_folder(&self, path: &str) -> bool {
        self.lock().folders.contains(&normalize_path(path))
    }

    pub fn document_count(&self) -> usize {
        self.lock().documents.len()
    }

    /// Paths moved to the trash, oldest first
    pub fn trashed(&self) -> Vec<String> {
        self.lock().trash.clone()
    }
}

#[async_trait]
impl VaultStore for MemoryVault {
    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.lock().entry(&normalize_path(path)).is_some())
    }

    async fn entry(&self, path: &str) -> Result<Option<Entry>> {
        Ok(self.lock().entry(&normalize_path(path)))
    }

    async fn create(&self, path: &str, content: &str) -> Result<DocumentRef> {
        let path = normalize_path(path);
        let mut state = self.lock();
        state.check(&path)?;
        if state.entry(&path).is_some() {
            anyhow::bail!("{} already exists", path);
        }
        let parent = parent_path(&path);
        if !parent.is_empty() && !state.folders.contains(&parent) {
            anyhow::bail!("folder {} does not exist", parent);
        }
        state.documents.insert(path.clone(), content.to_string());
        Ok(DocumentRef::new(path))
    }

    async fn create_folder(&self, path: &str) -> Result<FolderRef> {
        let path = normalize_path(path);
        let mut state = self.lock();
        state.check(&path)?;
        if state.documents.contains_key(&path) {
            anyhow::bail!("{} is a note", path);
        }
        state.add_folder_chain(&path);
        Ok(FolderRef::new(&path, state.children(&path)))
    }

    async fn move_to_trash(&self, path: &str, permanent: bool) -> Result<()> {
        let path = normalize_path(path);
        if path.is_empty() {
            anyhow::bail!("cannot trash the vault root");
        }
        let mut state = self.lock();
        state.check(&path)?;

        let nested = format!("{}/", path);
        let removed_doc = state.documents.remove(&path).is_some();
        let removed_folder = state.folders.remove(&path);
        if !removed_doc && !removed_folder {
            anyhow::bail!("{} does not exist", path);
        }
        if removed_folder {
            state.documents.retain(|doc, _| !doc.starts_with(&nested));
            state.folders.retain(|folder| !folder.starts_with(&nested));
        }
        if !permanent {
            state.trash.push(path);
        }
        Ok(())
    }
}

impl LinkResolver for MemoryVault {
    fn resolve_link(&self, raw: &str, relative_to: &str) -> Option<DocumentRef> {
        let state = self.lock();
        resolve_linkpath(raw, relative_to, state.documents.keys().map(String::as_str)).map(DocumentRef::new)
    }
}

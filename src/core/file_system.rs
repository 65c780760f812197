//! Directory-backed vault

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use async_trait::async_trait;
use walkdir::WalkDir;

use super::entry::{escapes_root, normalize_path, ChildEntry, DocumentRef, Entry, EntryKind, FolderRef};
use super::resolve::resolve_linkpath;
use crate::plugin::api::{LinkResolver, VaultStore};

/// Folder inside the vault that receives trashed entries
pub const TRASH_DIR: &str = ".trash";

/// A vault rooted at a directory on disk
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a vault path
    pub fn absolute(&self, path: &str) -> PathBuf {
        let path = normalize_path(path);
        if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }

    /// Vault path of an absolute path inside the vault
    pub fn vault_path(&self, absolute: &Path) -> Option<String> {
        let relative = absolute.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        Some(parts.join("/"))
    }

    /// All documents, skipping hidden files and folders (including the trash).
    ///
    /// Walks the directory synchronously; embedders resolving links on a busy
    /// runtime should call this through `spawn_blocking`.
    pub fn document_paths(&self) -> Vec<String> {
        WalkDir::new(&self.root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| self.vault_path(e.path()))
            .collect()
    }

    async fn children(&self, dir: &Path) -> Result<Vec<ChildEntry>> {
        let mut children = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let kind = if entry.file_type().await?.is_dir() {
                EntryKind::Folder
            } else {
                EntryKind::Document
            };
            children.push(ChildEntry::new(entry.file_name().to_string_lossy(), kind));
        }
        children.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(children)
    }

    /// Unused destination inside the trash folder for `name`
    async fn trash_destination(&self, name: &str) -> Result<PathBuf> {
        let trash = self.root.join(TRASH_DIR);
        tokio::fs::create_dir_all(&trash).await?;

        let candidate = trash.join(name);
        if !tokio::fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let mut n = 1u32;
        loop {
            let candidate = trash.join(format!("{} {} {}", stamp, n, name));
            if !tokio::fs::try_exists(&candidate).await? {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    /// Absolute path for a mutation; paths climbing out of the vault are rejected
    fn checked(&self, path: &str) -> Result<PathBuf> {
        if escapes_root(path) {
            anyhow::bail!("Path leaves the vault: {}", path);
        }
        Ok(self.absolute(path))
    }
}

#[async_trait]
impl VaultStore for FsVault {
    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.absolute(path)).await?)
    }

    async fn entry(&self, path: &str) -> Result<Option<Entry>> {
        let path = normalize_path(path);
        if escapes_root(&path) {
            return Ok(None);
        }
        let absolute = self.absolute(&path);
        let metadata = match tokio::fs::metadata(&absolute).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if metadata.is_dir() {
            let children = self.children(&absolute).await?;
            Ok(Some(Entry::Folder(FolderRef::new(path, children))))
        } else {
            Ok(Some(Entry::Document(DocumentRef::new(path))))
        }
    }

    async fn create(&self, path: &str, content: &str) -> Result<DocumentRef> {
        let absolute = self.checked(path)?;
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&absolute)
            .await
            .with_context(|| format!("Failed to create file: {}", absolute.display()))?;
        tokio::io::AsyncWriteExt::write_all(&mut file, content.as_bytes()).await?;

        tracing::debug!("Created file: {}", absolute.display());
        Ok(DocumentRef::new(path))
    }

    async fn create_folder(&self, path: &str) -> Result<FolderRef> {
        let absolute = self.checked(path)?;
        tokio::fs::create_dir_all(&absolute)
            .await
            .with_context(|| format!("Failed to create directory: {}", absolute.display()))?;
        let children = self.children(&absolute).await?;
        Ok(FolderRef::new(path, children))
    }

    async fn move_to_trash(&self, path: &str, permanent: bool) -> Result<()> {
        let path = normalize_path(path);
        if path.is_empty() {
            anyhow::bail!("Refusing to delete the vault root");
        }
        let absolute = self.checked(&path)?;
        let metadata = tokio::fs::metadata(&absolute)
            .await
            .with_context(|| format!("Not found: {}", absolute.display()))?;

        if permanent {
            if metadata.is_dir() {
                tokio::fs::remove_dir_all(&absolute).await?;
            } else {
                tokio::fs::remove_file(&absolute).await?;
            }
        } else {
            let name = absolute
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let destination = self.trash_destination(&name).await?;
            tokio::fs::rename(&absolute, &destination)
                .await
                .with_context(|| format!("Failed to move {} to trash", absolute.display()))?;
        }

        tracing::debug!("Removed {} (permanent: {})", absolute.display(), permanent);
        Ok(())
    }
}

/// Resolution rescans the vault on every call (blocking I/O)
impl LinkResolver for FsVault {
    fn resolve_link(&self, raw: &str, relative_to: &str) -> Option<DocumentRef> {
        let documents = self.document_paths();
        resolve_linkpath(raw, relative_to, documents.iter().map(String::as_str)).map(DocumentRef::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> (tempfile::TempDir, FsVault) {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVault::new(dir.path());
        (dir, vault)
    }

    #[tokio::test]
    async fn test_create_folder_and_file() {
        let (_dir, vault) = vault();
        let folder = vault.create_folder("Projects/Plan").await.unwrap();
        assert_eq!(folder.path(), "Projects/Plan");
        assert!(folder.children.is_empty());

        let doc = vault.create("Projects/Plan/Milestone 1.md", "# Milestone 1\n\n").await.unwrap();
        assert_eq!(doc.base_name(), "Milestone 1");
        assert!(vault.create("Projects/Plan/Milestone 1.md", "").await.is_err());

        let content = std::fs::read_to_string(vault.absolute("Projects/Plan/Milestone 1.md")).unwrap();
        assert_eq!(content, "# Milestone 1\n\n");

        match vault.entry("Projects").await.unwrap() {
            Some(Entry::Folder(folder)) => {
                assert_eq!(folder.children, vec![ChildEntry::new("Plan", EntryKind::Folder)]);
            }
            other => panic!("expected folder, got {:?}", other),
        }
        assert!(vault.entry("Nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_trash_moves_into_hidden_folder() {
        let (_dir, vault) = vault();
        vault.create_folder("A").await.unwrap();
        vault.create("A/Note.md", "x").await.unwrap();
        vault.create("Note.md", "y").await.unwrap();

        vault.move_to_trash("A/Note.md", false).await.unwrap();
        vault.move_to_trash("Note.md", false).await.unwrap();
        assert!(!vault.exists("A/Note.md").await.unwrap());
        assert!(vault.root().join(TRASH_DIR).join("Note.md").exists());

        let trashed = std::fs::read_dir(vault.root().join(TRASH_DIR)).unwrap().count();
        assert_eq!(trashed, 2);

        vault.move_to_trash("A", true).await.unwrap();
        assert!(!vault.exists("A").await.unwrap());
        assert!(vault.move_to_trash("", false).await.is_err());
    }

    #[tokio::test]
    async fn test_same_named_notes_all_survive_in_trash() {
        let (_dir, vault) = vault();
        for folder in ["A", "B", "C", "D"] {
            vault.create_folder(folder).await.unwrap();
            vault.create(&format!("{}/Note.md", folder), folder).await.unwrap();
        }
        for folder in ["A", "B", "C", "D"] {
            vault.move_to_trash(&format!("{}/Note.md", folder), false).await.unwrap();
        }

        let mut contents: Vec<String> = std::fs::read_dir(vault.root().join(TRASH_DIR))
            .unwrap()
            .map(|e| std::fs::read_to_string(e.unwrap().path()).unwrap())
            .collect();
        contents.sort();
        assert_eq!(contents, vec!["A", "B", "C", "D"]);
    }

    #[tokio::test]
    async fn test_mutations_cannot_leave_the_vault() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVault::new(dir.path().join("vault"));
        std::fs::create_dir_all(vault.root()).unwrap();
        std::fs::write(dir.path().join("secret.md"), "keep").unwrap();

        assert!(vault.create_folder("../outside").await.is_err());
        assert!(vault.create("../escaped.md", "").await.is_err());
        assert!(vault.move_to_trash("../secret.md", false).await.is_err());
        assert!(!dir.path().join("outside").exists());
        assert!(!dir.path().join("escaped.md").exists());
        assert!(dir.path().join("secret.md").exists());
    }

    #[tokio::test]
    async fn test_resolution_ignores_trash() {
        let (_dir, vault) = vault();
        vault.create_folder("Notes").await.unwrap();
        vault.create("Notes/Idea.md", "").await.unwrap();
        vault.create("Old.md", "").await.unwrap();
        vault.move_to_trash("Old.md", false).await.unwrap();

        assert_eq!(vault.resolve_link("Idea", "Index.md").unwrap().path(), "Notes/Idea.md");
        assert!(vault.resolve_link("Old", "Index.md").is_none());
    }
}

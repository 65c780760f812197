//! Destination folder selection for new notes

use super::config::{SaveLocation, Settings};
use super::entry::{escapes_root, join_path, normalize_path, DocumentRef, Entry, FolderRef};
use super::error::{LinkNoteError, Result};
use crate::plugin::api::VaultStore;

/// Characters that cannot appear in a note file name
const RESERVED_CHARS: &[char] = &['\\', '/', ':', '#', '*', '?', '"', '<', '>', '|'];

/// Replace characters reserved in paths and links with `_`
pub fn sanitize_file_name(text: &str) -> String {
    text.chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Folder path new notes go to, before touching the store
pub fn destination_path(current: &DocumentRef, settings: &Settings) -> String {
    match settings.save_location {
        SaveLocation::CurrentFolder => current.parent_path(),
        SaveLocation::SubFolder => join_path(&current.parent_path(), &current.base_name()),
        SaveLocation::Custom => normalize_path(&settings.custom_save_path),
    }
}

/// Resolve the destination folder, creating it when absent
pub async fn resolve_destination_folder(
    store: &dyn VaultStore,
    current: &DocumentRef,
    settings: &Settings,
) -> Result<FolderRef> {
    let path = destination_path(current, settings);
    if escapes_root(&path) {
        return Err(LinkNoteError::folder_creation(&path, "path leaves the vault"));
    }

    match store.entry(&path).await.map_err(|e| LinkNoteError::folder_creation(&path, e))? {
        Some(Entry::Folder(folder)) => Ok(folder),
        Some(Entry::Document(_)) => Err(LinkNoteError::folder_creation(
            &path,
            "a note with that name already exists",
        )),
        None => {
            let folder = store
                .create_folder(&path)
                .await
                .map_err(|e| LinkNoteError::folder_creation(&path, e))?;
            tracing::info!("Created folder: {}", folder.path());
            Ok(folder)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::file_system::FsVault;
    use crate::core::memory_vault::MemoryVault;

    fn settings(save_location: SaveLocation, custom: &str) -> Settings {
        Settings {
            save_location,
            custom_save_path: custom.to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name(r#"a\b/c:d#e*f?g"h<i>j|k"#), "a_b_c_d_e_f_g_h_i_j_k");
        assert_eq!(sanitize_file_name("Milestone 1"), "Milestone 1");
    }

    #[test]
    fn test_destination_paths() {
        let current = DocumentRef::new("Projects/Plan.md");
        assert_eq!(destination_path(&current, &settings(SaveLocation::CurrentFolder, "")), "Projects");
        assert_eq!(destination_path(&current, &settings(SaveLocation::SubFolder, "")), "Projects/Plan");
        assert_eq!(destination_path(&current, &settings(SaveLocation::Custom, "/Inbox/")), "Inbox");
        assert_eq!(destination_path(&current, &settings(SaveLocation::Custom, "")), "");
        assert_eq!(
            destination_path(&DocumentRef::new("Top.md"), &settings(SaveLocation::SubFolder, "")),
            "Top"
        );
    }

    #[tokio::test]
    async fn test_subfolder_is_created_once() {
        let vault = MemoryVault::new();
        vault.insert_document("Projects/Plan.md", "");
        let current = DocumentRef::new("Projects/Plan.md");
        let settings = settings(SaveLocation::SubFolder, "");

        let folder = resolve_destination_folder(&vault, &current, &settings).await.unwrap();
        assert_eq!(folder.path(), "Projects/Plan");
        assert!(vault.is_folder("Projects/Plan"));

        let again = resolve_destination_folder(&vault, &current, &settings).await.unwrap();
        assert_eq!(again.path(), "Projects/Plan");
    }

    #[tokio::test]
    async fn test_empty_custom_path_is_root() {
        let vault = MemoryVault::new();
        let current = DocumentRef::new("Projects/Plan.md");
        let folder = resolve_destination_folder(&vault, &current, &settings(SaveLocation::Custom, ""))
            .await
            .unwrap();
        assert!(folder.is_root());
    }

    #[tokio::test]
    async fn test_folder_creation_failure_propagates() {
        let vault = MemoryVault::new();
        vault.fail_on("Locked");
        let current = DocumentRef::new("Plan.md");
        let err = resolve_destination_folder(&vault, &current, &settings(SaveLocation::Custom, "Locked"))
            .await
            .unwrap_err();
        assert!(matches!(err, LinkNoteError::FolderCreationFailed { .. }));
    }

    #[tokio::test]
    async fn test_custom_path_outside_vault_is_rejected() {
        let vault = MemoryVault::new();
        let current = DocumentRef::new("Plan.md");
        for custom in ["../outside", "Inbox/../../outside"] {
            let err = resolve_destination_folder(&vault, &current, &settings(SaveLocation::Custom, custom))
                .await
                .unwrap_err();
            assert!(matches!(err, LinkNoteError::FolderCreationFailed { .. }));
        }
        assert!(!vault.is_folder("outside"));
        assert!(!vault.is_folder(".."));
    }

    #[tokio::test]
    async fn test_custom_path_outside_directory_vault_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVault::new(dir.path().join("vault"));
        std::fs::create_dir_all(vault.root()).unwrap();
        let current = DocumentRef::new("Plan.md");

        let err = resolve_destination_folder(&vault, &current, &settings(SaveLocation::Custom, "../outside"))
            .await
            .unwrap_err();
        assert!(matches!(err, LinkNoteError::FolderCreationFailed { .. }));
        assert!(!dir.path().join("outside").exists());
    }
}

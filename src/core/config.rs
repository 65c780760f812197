//! Settings for note creation and deletion
//!
//! Persisted as JSON with camelCase keys. Loading merges whatever is stored
//! over the defaults, so keys missing from the file keep their default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Where a navigated-to note opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OpenWindowMode {
    #[default]
    Current,
    NewTab,
    Split,
}

/// Where new notes are saved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SaveLocation {
    /// Next to the current note
    CurrentFolder,
    /// In a folder named after the current note
    #[default]
    SubFolder,
    /// In `customSavePath`
    Custom,
}

/// Link markup flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkType {
    Wiki,
    #[default]
    Markdown,
}

/// Path component written into links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkDisplayMode {
    #[default]
    Short,
    Relative,
    Absolute,
}

/// Plugin settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Open the new note after creating it
    pub jump_to_new_page: bool,
    pub open_window_mode: OpenWindowMode,
    pub save_location: SaveLocation,
    pub link_type: LinkType,
    pub link_display_mode: LinkDisplayMode,
    /// Remove the whole link when deleting its note (otherwise keep the display text)
    pub delete_link_text: bool,
    /// Prune folders left empty after deleting a note
    pub delete_empty_folder: bool,
    /// Start new notes with a `# <selection>` heading
    pub show_title_line: bool,
    /// Folder used when `save_location` is `custom`; empty means the vault root
    pub custom_save_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            jump_to_new_page: true,
            open_window_mode: OpenWindowMode::Current,
            save_location: SaveLocation::SubFolder,
            link_type: LinkType::Markdown,
            link_display_mode: LinkDisplayMode::Short,
            delete_link_text: true,
            delete_empty_folder: true,
            show_title_line: true,
            custom_save_path: String::new(),
        }
    }
}

impl Settings {
    /// Parse persisted JSON, filling absent keys with defaults
    pub fn from_json(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings = serde_json::from_str(content).context("Invalid settings file")?;
        Ok(settings)
    }
}

/// Owns the settings value and its persisted location
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Default settings file path
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "robsidian", "Pagelink")
            .map(|dirs| dirs.config_dir().join("data.json"))
    }

    /// Load from the default location
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Self::load(path)
    }

    /// Load settings from disk; a missing file yields the defaults
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings: {}", path.display()))?;
            Settings::from_json(&content)?
        } else {
            Settings::default()
        };

        tracing::debug!("Loaded settings from: {}", path.display());
        Ok(Self { path, settings })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot passed into each operation
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Apply a change and persist it
    pub fn update(&mut self, apply: impl FnOnce(&mut Settings)) -> Result<()> {
        apply(&mut self.settings);
        self.save()
    }

    /// Set one option by its persisted key, e.g. `("linkType", "wiki")`.
    /// Values are parsed as JSON first, then taken as a plain string.
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<()> {
        let mut object = serde_json::to_value(&self.settings)?;
        if object.get(key).is_none() {
            anyhow::bail!("Unknown setting: {}", key);
        }

        let as_string = serde_json::Value::String(value.to_string());
        let candidates = match serde_json::from_str::<serde_json::Value>(value) {
            Ok(parsed) if parsed != as_string => vec![parsed, as_string],
            _ => vec![as_string],
        };

        for candidate in candidates {
            object[key] = candidate;
            if let Ok(updated) = serde_json::from_value::<Settings>(object.clone()) {
                return self.update(|settings| *settings = updated);
            }
        }

        anyhow::bail!("Invalid value for {}: {}", key, value)
    }

    /// Write settings to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.settings)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to save settings: {}", self.path.display()))?;

        tracing::info!("Saved settings to: {}", self.path.display());
        Ok(())
    }
}

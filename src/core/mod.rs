//! Core logic: data model, configuration, link markup and reference vaults

pub mod config;
pub mod document;
pub mod entry;
pub mod error;
pub mod file_system;
pub mod link;
pub mod memory_vault;
pub mod path_policy;
pub mod resolve;

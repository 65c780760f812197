//! Pagelink - turn a text selection into a linked note, and undo it again
//!
//! `core` holds the pure decision logic (destination folders, link markup,
//! link lookup) plus reference vault and buffer implementations. `plugin`
//! holds the lifecycle manager and the traits a host editor implements.

pub mod core;
pub mod plugin;

pub use crate::core::config::{Settings, SettingsStore};
pub use crate::core::entry::{DocumentRef, Entry, FolderRef};
pub use crate::core::error::LinkNoteError;
pub use crate::core::link::LinkSpan;
pub use crate::plugin::manager::{CreatedNote, Housekeeping, NoteLifecycleManager};

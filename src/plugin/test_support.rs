//! Recording host doubles for tests

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use super::api::{Placement, Workspace};
use crate::core::entry::DocumentRef;

/// Workspace that records every request
#[derive(Debug, Default)]
pub struct RecordingWorkspace {
    notices: Mutex<Vec<String>>,
    opened: Mutex<Vec<(DocumentRef, Placement)>>,
    refreshes: Mutex<usize>,
}

impl RecordingWorkspace {
    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }

    pub fn opened(&self) -> Vec<(DocumentRef, Placement)> {
        self.opened.lock().unwrap().clone()
    }

    pub fn layout_refreshes(&self) -> usize {
        *self.refreshes.lock().unwrap()
    }
}

#[async_trait]
impl Workspace for RecordingWorkspace {
    async fn open(&self, document: &DocumentRef, placement: Placement) -> Result<()> {
        self.opened.lock().unwrap().push((document.clone(), placement));
        Ok(())
    }

    fn notify(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }

    fn refresh_layout(&self) {
        *self.refreshes.lock().unwrap() += 1;
    }
}

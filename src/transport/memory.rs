//! In-memory sink for tests

use std::sync::{Mutex, MutexGuard, PoisonError};

use cpq_tree::Document;

use super::{Submission, Transport, TransportError};

/// Records every submission and answers with a fixed status
#[derive(Debug)]
pub struct MemoryTransport {
    status: u16,
    submissions: Mutex<Vec<(Document, Option<String>)>>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::with_status(201)
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Documents submitted so far, with their path ids
    pub fn submissions(&self) -> Vec<(Document, Option<String>)> {
        self.recorded().clone()
    }

    // Recovers from poisoning so earlier submissions stay visible.
    fn recorded(&self) -> MutexGuard<'_, Vec<(Document, Option<String>)>> {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MemoryTransport {
    fn submit(&self, document: &Document, path_id: Option<&str>) -> Result<Submission, TransportError> {
        self.recorded()
            .push((document.clone(), path_id.map(str::to_string)));
        Ok(Submission {
            status: self.status,
            body: serde_json::to_string(document)?,
        })
    }
}

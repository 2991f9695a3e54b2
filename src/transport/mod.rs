//! Document sinks
//!
//! The transport contract: accept a document plus an optional path id (an
//! update of an existing package) and answer with a status code and a body.
//! Shipped sinks are local:
//! - DirectoryTransport: writes the document as JSON into a directory
//! - MemoryTransport: records submissions in memory for tests

mod directory;
mod memory;

pub use directory::DirectoryTransport;
pub use memory::MemoryTransport;

use cpq_tree::Document;

/// Response of a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub status: u16,
    pub body: String,
}

impl Submission {
    /// 200 and 201 count as accepted
    pub fn is_success(&self) -> bool {
        matches!(self.status, 200 | 201)
    }
}

/// A destination for finished documents
pub trait Transport: Send + Sync {
    /// Submit `document`; `path_id` names an existing package to update.
    fn submit(&self, document: &Document, path_id: Option<&str>) -> Result<Submission, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid path id '{0}'")]
    InvalidPathId(String),
}

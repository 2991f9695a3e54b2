//! CPQ migration package builder
//!
//! Reads configuration or item sheets, builds the nested document a CPQ
//! catalog API accepts (see the `cpq-tree` crate for the tree rules), and
//! hands it to a transport.

pub mod config;
pub mod pipeline;
pub mod source;
pub mod transport;

pub use config::{EffectiveSettings, Mode, Settings};
pub use cpq_tree::{BuildError, Document};
pub use pipeline::{build_from_path, document_digest, submit, BuildOutput, BuildReport, PipelineError};
pub use transport::{DirectoryTransport, MemoryTransport, Submission, Transport};

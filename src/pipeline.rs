//! Pipeline orchestration
//!
//! Reads rows from an input file, builds the document for the configured
//! mode, and optionally hands it to a transport. Every build produces a
//! report carrying a canonical digest of the document, so two builds of the
//! same input can be compared without diffing JSON.

use std::path::Path;

use chrono::{DateTime, Utc};
use cpq_tree::{build_configuration_at, build_items, BuildError, BuildOptions, Document};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, Mode, Settings};
use crate::source::{load_configuration_rows, load_item_rows, SourceError};
use crate::transport::{Submission, Transport, TransportError};

/// Name used when neither settings, sheet nor file name provide one
pub const FALLBACK_PACKAGE_NAME: &str = "Migration Package";

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("input error: {0}")]
    Source(#[from] SourceError),

    #[error("build error: {0}")]
    Build(#[from] BuildError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("digest error: {0}")]
    Digest(String),

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Machine-readable code, delegating to the underlying error where it has one
    pub fn as_code(&self) -> &'static str {
        match self {
            PipelineError::Config(_) => "CONFIG",
            PipelineError::Source(e) => e.as_code(),
            PipelineError::Build(e) => e.as_code(),
            PipelineError::Transport(_) => "TRANSPORT",
            PipelineError::Digest(_) => "DIGEST",
            PipelineError::Io(_) => "IO",
            PipelineError::Json(_) => "JSON",
        }
    }
}

/// Summary of one build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub mode: Mode,
    pub package_name: String,
    /// Rows read from the input
    pub rows: usize,
    /// Top-level entries in `contents.items`
    pub items: usize,
    /// SHA-256 of the JCS-canonical document
    pub digest: String,
    pub generated_at: DateTime<Utc>,
}

/// A built document and its report
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub document: Document,
    pub report: BuildReport,
}

/// SHA-256 hex digest of the RFC 8785 canonical form of `document`
pub fn document_digest(document: &Document) -> Result<String, PipelineError> {
    let jcs_bytes = serde_json_canonicalizer::to_vec(document)
        .map_err(|e| PipelineError::Digest(e.to_string()))?;
    Ok(hex::encode(Sha256::digest(&jcs_bytes)))
}

fn resolve_package_name(settings: &Settings, from_sheet: Option<String>, input: &Path) -> String {
    settings
        .package_name
        .clone()
        .or(from_sheet)
        .or_else(|| {
            input
                .file_stem()
                .and_then(|s| s.to_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| FALLBACK_PACKAGE_NAME.to_string())
}

/// Read `input` and build its document according to `settings`.
pub fn build_from_path(input: &Path, settings: &Settings) -> Result<BuildOutput, PipelineError> {
    info!(input = %input.display(), mode = settings.mode.as_str(), "building document");

    let (document, rows) = match settings.mode {
        Mode::Configuration => {
            let sheet = load_configuration_rows(input)?;
            let name = resolve_package_name(settings, sheet.package_name.clone(), input);
            let options = BuildOptions {
                min_depth: settings.min_path_depth,
                max_depth: settings.max_path_depth,
                ..Default::default()
            };
            let document = build_configuration_at(&name, sheet.numbered(), &options)?;
            (document, sheet.rows.len())
        }
        Mode::Items => {
            let sheet = load_item_rows(input)?;
            let name = resolve_package_name(settings, sheet.package_name.clone(), input);
            (build_items(&name, &sheet.rows)?, sheet.rows.len())
        }
    };

    let report = BuildReport {
        mode: settings.mode,
        package_name: document.name.clone(),
        rows,
        items: document.contents.items.len(),
        digest: document_digest(&document)?,
        generated_at: Utc::now(),
    };
    info!(rows = report.rows, items = report.items, digest = %report.digest, "document built");

    Ok(BuildOutput { document, report })
}

/// Hand a built document to `transport`.
pub fn submit(
    output: &BuildOutput,
    transport: &dyn Transport,
    path_id: Option<&str>,
) -> Result<Submission, PipelineError> {
    let submission = transport.submit(&output.document, path_id)?;
    if submission.is_success() {
        info!(status = submission.status, "migration package created");
    } else {
        tracing::warn!(status = submission.status, "migration package creation failed");
    }
    Ok(submission)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EffectiveSettings;
    use std::path::PathBuf;

    fn settings() -> Settings {
        EffectiveSettings::build(None, None).unwrap().settings
    }

    #[test]
    fn test_package_name_precedence() {
        let input = PathBuf::from("/data/q3_laptops.csv");
        let mut s = settings();
        assert_eq!(resolve_package_name(&s, None, &input), "q3_laptops");
        assert_eq!(
            resolve_package_name(&s, Some("FromSheet".to_string()), &input),
            "FromSheet"
        );
        s.package_name = Some("FromSettings".to_string());
        assert_eq!(
            resolve_package_name(&s, Some("FromSheet".to_string()), &input),
            "FromSettings"
        );
    }

    #[test]
    fn test_digest_is_stable_and_content_sensitive() {
        let a = Document::new("a", vec![]);
        let b = Document::new("b", vec![]);
        assert_eq!(document_digest(&a).unwrap(), document_digest(&a).unwrap());
        assert_ne!(document_digest(&a).unwrap(), document_digest(&b).unwrap());
        assert_eq!(document_digest(&a).unwrap().len(), 64);
    }

    #[test]
    fn test_error_codes_delegate() {
        let err = PipelineError::from(BuildError::EmptyPath { row: 3 });
        assert_eq!(err.as_code(), "EMPTY_PATH");
        let err = PipelineError::from(SourceError::MissingColumn("itemName".to_string()));
        assert_eq!(err.as_code(), "MISSING_COLUMN");
    }
}

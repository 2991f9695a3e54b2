//! Directory sink
//!
//! Writes `<name>.json` (or `<path_id>.json` for updates) into a directory.
//! Creating a file answers 201, replacing an existing one answers 200.

use std::fs;
use std::path::{Path, PathBuf};

use cpq_tree::Document;
use tracing::info;

use super::{Submission, Transport, TransportError};

#[derive(Debug, Clone)]
pub struct DirectoryTransport {
    root: PathBuf,
    pretty: bool,
}

impl DirectoryTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pretty: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_stem(document: &Document, path_id: Option<&str>) -> Result<String, TransportError> {
        let stem = match path_id {
            Some(id) => {
                if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
                    return Err(TransportError::InvalidPathId(id.to_string()));
                }
                id.to_string()
            }
            None => document
                .name
                .chars()
                .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
                .collect(),
        };
        if stem.is_empty() {
            return Ok("package".to_string());
        }
        Ok(stem)
    }
}

impl Transport for DirectoryTransport {
    fn submit(&self, document: &Document, path_id: Option<&str>) -> Result<Submission, TransportError> {
        fs::create_dir_all(&self.root)?;
        let path = self
            .root
            .join(format!("{}.json", Self::file_stem(document, path_id)?));
        let existed = path.exists();

        let json = document.to_json(self.pretty)?;
        fs::write(&path, &json)?;
        info!(path = %path.display(), bytes = json.len(), "document written");

        let status = if existed { 200 } else { 201 };
        let body = serde_json::json!({
            "name": document.name,
            "path": path.display().to_string(),
        })
        .to_string();
        Ok(Submission { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn document(name: &str) -> Document {
        Document::new(name, vec![])
    }

    #[test]
    fn test_create_then_update() {
        let dir = TempDir::new().unwrap();
        let transport = DirectoryTransport::new(dir.path());

        let created = transport.submit(&document("Q3 Package"), None).unwrap();
        assert_eq!(created.status, 201);
        assert!(dir.path().join("Q3_Package.json").exists());

        let updated = transport
            .submit(&document("Q3 Package"), Some("Q3_Package"))
            .unwrap();
        assert_eq!(updated.status, 200);
        assert!(updated.body.contains("Q3_Package.json"));
    }

    #[test]
    fn test_written_document_reads_back() {
        let dir = TempDir::new().unwrap();
        let transport = DirectoryTransport::new(dir.path()).with_pretty(false);
        transport.submit(&document("pkg"), None).unwrap();

        let text = fs::read_to_string(dir.path().join("pkg.json")).unwrap();
        let back: Document = serde_json::from_str(&text).unwrap();
        assert_eq!(back, document("pkg"));
    }

    #[test]
    fn test_path_id_cannot_escape_root() {
        let dir = TempDir::new().unwrap();
        let transport = DirectoryTransport::new(dir.path());
        let err = transport.submit(&document("pkg"), Some("../x")).unwrap_err();
        assert!(matches!(err, TransportError::InvalidPathId(_)));
    }
}

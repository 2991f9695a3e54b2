//! Build error types.

/// Errors raised while turning rows into a document.
///
/// Every variant carries enough context (row number, path or item name) to
/// diagnose the input without re-running the build.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("Row {row}: path is empty")]
    EmptyPath { row: usize },

    #[error("Row {row}: path '{path}' has an empty segment at position {position}")]
    EmptySegment {
        row: usize,
        path: String,
        position: usize,
    },

    #[error("Row {row}: path '{path}' has {depth} segment(s); at least {min_depth} required")]
    PathTooShallow {
        row: usize,
        path: String,
        depth: usize,
        min_depth: usize,
    },

    #[error("Row {row}: path has {depth} segments; at most {max_depth} allowed")]
    PathTooDeep {
        row: usize,
        path: String,
        depth: usize,
        max_depth: usize,
    },

    #[error("Row {row}: path '{path}' has no terminal type")]
    MissingTerminalType { row: usize, path: String },

    #[error("No resource type could be assigned to: {}", paths.join(", "))]
    UnresolvedResourceType { paths: Vec<String> },

    #[error("Unknown item '{item_name}'; expected one of: {expected}")]
    UnknownItemCategory { item_name: String, expected: String },
}

impl BuildError {
    /// Stable machine-readable code for this error.
    pub fn as_code(&self) -> &'static str {
        match self {
            BuildError::EmptyPath { .. } => "EMPTY_PATH",
            BuildError::EmptySegment { .. } => "EMPTY_SEGMENT",
            BuildError::PathTooShallow { .. } => "PATH_TOO_SHALLOW",
            BuildError::PathTooDeep { .. } => "PATH_TOO_DEEP",
            BuildError::MissingTerminalType { .. } => "MISSING_TERMINAL_TYPE",
            BuildError::UnresolvedResourceType { .. } => "UNRESOLVED_RESOURCE_TYPE",
            BuildError::UnknownItemCategory { .. } => "UNKNOWN_ITEM_CATEGORY",
        }
    }
}

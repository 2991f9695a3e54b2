//! Resource-type hierarchy used to infer intermediate node types.

/// Default levels, shallowest first.
pub const DEFAULT_LEVELS: &[&str] = &["product_family", "product_line", "model"];

/// Ordered resource-type labels, shallowest first.
///
/// A terminal typed with level `i` implies that the ancestor `a` steps above
/// it has level `max(0, i - a)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHierarchy {
    levels: Vec<String>,
}

impl Default for TypeHierarchy {
    fn default() -> Self {
        Self::new(DEFAULT_LEVELS.iter().copied())
    }
}

impl TypeHierarchy {
    pub fn new<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            levels: levels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// Position of `resource_type` in the hierarchy, if it is one of the levels.
    pub fn index_of(&self, resource_type: &str) -> Option<usize> {
        self.levels.iter().position(|l| l == resource_type)
    }

    /// Type implied for the ancestor `distance` steps above a terminal of
    /// type `terminal_type`. `None` when the terminal type is not a level.
    pub fn ancestor_type(&self, terminal_type: &str, distance: usize) -> Option<&str> {
        let index = self.index_of(terminal_type)?;
        self.levels
            .get(index.saturating_sub(distance))
            .map(String::as_str)
    }
}

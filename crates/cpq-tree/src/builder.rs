//! Configuration tree construction.
//!
//! Rows are inserted one at a time into an arena of segments. Each segment
//! keeps its children in discovery order plus a lookup map, so re-encountered
//! segments merge into the existing entry. Resource types are settled during
//! insertion (explicit terminal types first, then inference up the ancestor
//! chain) and the finished arena renders into document nodes.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::document::{Child, Leaf, Node};
use crate::error::BuildError;
use crate::hierarchy::TypeHierarchy;
use crate::path::{display_name, parse_path, SEPARATOR};
use crate::row::ConfigurationRow;

/// Default upper bound on path segments.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options controlling a single build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Labels used to infer intermediate resource types.
    pub hierarchy: TypeHierarchy,

    /// Minimum number of segments a path must have (default: 1).
    pub min_depth: usize,

    /// Maximum number of segments a path may have (default: 64). Rendering
    /// recurses once per level, so this also bounds stack use.
    pub max_depth: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            hierarchy: TypeHierarchy::default(),
            min_depth: 1,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SegmentId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
enum ResourceType {
    /// Some row's path terminated at this segment.
    Explicit(String),
    /// Derived from a descendant's terminal type.
    Inferred(String),
}

impl ResourceType {
    fn as_str(&self) -> &str {
        match self {
            ResourceType::Explicit(t) | ResourceType::Inferred(t) => t,
        }
    }
}

#[derive(Debug)]
struct Segment {
    variable_name: String,
    granular: bool,
    resource_type: Option<ResourceType>,
    children: Vec<SegmentId>,
    child_index: HashMap<String, SegmentId>,
    leaves: Vec<Leaf>,
    leaf_keys: HashSet<(String, String)>,
}

impl Segment {
    fn new(variable_name: &str, granular: bool) -> Self {
        Self {
            variable_name: variable_name.to_string(),
            granular,
            resource_type: None,
            children: Vec::new(),
            child_index: HashMap::new(),
            leaves: Vec::new(),
            leaf_keys: HashSet::new(),
        }
    }

    /// Attach `leaf` unless its `(variableName, resourceType)` is already present.
    fn push_leaf(&mut self, leaf: Leaf) -> bool {
        let key = (leaf.variable_name.clone(), leaf.resource_type.clone());
        if !self.leaf_keys.insert(key) {
            return false;
        }
        self.leaves.push(leaf);
        true
    }
}

/// Accumulates configuration rows into a tree.
///
/// A builder is scoped to one build: insert every row, then call
/// [`TreeBuilder::finish`] to obtain the top-level document nodes.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    options: BuildOptions,
    segments: Vec<Segment>,
    roots: Vec<SegmentId>,
    root_index: HashMap<String, SegmentId>,
    rows_seen: usize,
}

impl TreeBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Number of rows offered to [`TreeBuilder::insert`], including rejected ones.
    pub fn rows_seen(&self) -> usize {
        self.rows_seen
    }

    /// Insert one row, numbered by its position among inserted rows.
    ///
    /// The row is validated before the tree is touched, so a rejected row
    /// leaves the builder unchanged.
    pub fn insert(&mut self, row: &ConfigurationRow) -> Result<(), BuildError> {
        self.insert_at(self.rows_seen + 1, row)
    }

    /// Insert one row, reporting errors against `row_number` (e.g. the
    /// source record number when the reader skipped blank lines).
    pub fn insert_at(&mut self, row_number: usize, row: &ConfigurationRow) -> Result<(), BuildError> {
        self.rows_seen += 1;

        let parsed = parse_path(
            row_number,
            &row.path,
            self.options.min_depth,
            self.options.max_depth,
        )?;
        let terminal_type = row.terminal_type.trim();
        if terminal_type.is_empty() {
            return Err(BuildError::MissingTerminalType {
                row: row_number,
                path: row.path.trim().to_string(),
            });
        }

        let mut chain = Vec::with_capacity(parsed.depth());
        let mut parent = None;
        for segment in parsed.segments() {
            let id = self.get_or_create(parent, segment, row.granular);
            chain.push(id);
            parent = Some(id);
        }

        let Some((&terminal_id, ancestors)) = chain.split_last() else {
            return Err(BuildError::EmptyPath { row: row_number });
        };

        let settled = self.assign_explicit(terminal_id, terminal_type, row_number);
        self.attach_leaf(terminal_id, row);
        self.infer_ancestors(ancestors, &settled, row_number);
        Ok(())
    }

    /// Insert every row in order, stopping at the first rejected row.
    pub fn extend<'a, I>(&mut self, rows: I) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = &'a ConfigurationRow>,
    {
        for row in rows {
            self.insert(row)?;
        }
        Ok(())
    }

    /// Resource type currently settled for the dotted `path`, if any.
    pub fn resource_type(&self, path: &str) -> Option<&str> {
        let id = self.lookup(path)?;
        self.segments[id.0].resource_type.as_ref().map(ResourceType::as_str)
    }

    /// Number of distinct leaves attached at the dotted `path`.
    pub fn leaf_count(&self, path: &str) -> Option<usize> {
        self.lookup(path).map(|id| self.segments[id.0].leaves.len())
    }

    /// Validate the tree and render the top-level nodes.
    ///
    /// Every top-level node with children gets the "All Product Family"
    /// wrapper as its only child. Fails if any segment never received a
    /// resource type.
    pub fn finish(self) -> Result<Vec<Node>, BuildError> {
        let mut unresolved = Vec::new();
        let mut path = String::new();
        for &root in &self.roots {
            self.collect_unresolved(root, &mut path, &mut unresolved);
        }
        if !unresolved.is_empty() {
            return Err(BuildError::UnresolvedResourceType { paths: unresolved });
        }

        let nodes = self
            .roots
            .iter()
            .map(|&root| {
                let mut node = self.render(root);
                if !node.children.is_empty() {
                    let children = std::mem::take(&mut node.children);
                    node.children = vec![Child::Node(Node::wrapper(children))];
                }
                node
            })
            .collect();
        Ok(nodes)
    }

    fn get_or_create(&mut self, parent: Option<SegmentId>, segment: &str, granular: bool) -> SegmentId {
        let existing = match parent {
            Some(p) => self.segments[p.0].child_index.get(segment),
            None => self.root_index.get(segment),
        };
        if let Some(&id) = existing {
            let kept = self.segments[id.0].granular;
            if kept != granular {
                debug!(segment, kept, "granular flag differs from first row; keeping first");
            }
            return id;
        }

        let id = SegmentId(self.segments.len());
        self.segments.push(Segment::new(segment, granular));
        match parent {
            Some(p) => {
                let scope = &mut self.segments[p.0];
                scope.children.push(id);
                scope.child_index.insert(segment.to_string(), id);
            }
            None => {
                self.roots.push(id);
                self.root_index.insert(segment.to_string(), id);
            }
        }
        id
    }

    /// Record `terminal_type` on the terminal segment and return the type the
    /// segment ends up with.
    fn assign_explicit(&mut self, id: SegmentId, terminal_type: &str, row: usize) -> String {
        let segment = &mut self.segments[id.0];
        if let Some(ResourceType::Explicit(existing)) = &segment.resource_type {
            if existing != terminal_type {
                warn!(
                    row,
                    segment = %segment.variable_name,
                    kept = %existing,
                    ignored = terminal_type,
                    "conflicting terminal types; keeping first"
                );
            }
            return existing.clone();
        }
        segment.resource_type = Some(ResourceType::Explicit(terminal_type.to_string()));
        terminal_type.to_string()
    }

    fn attach_leaf(&mut self, id: SegmentId, row: &ConfigurationRow) {
        let name = if row.child_name.is_empty() {
            row.child_variable_name.clone()
        } else {
            row.child_name.clone()
        };
        let leaf = Leaf {
            name,
            variable_name: row.child_variable_name.clone(),
            resource_type: row.child_resource_type.clone(),
        };
        let segment = &mut self.segments[id.0];
        if !segment.push_leaf(leaf) {
            debug!(
                segment = %segment.variable_name,
                child = %row.child_variable_name,
                "duplicate leaf dropped"
            );
        }
    }

    /// Walk from the terminal's parent toward the root, filling in any
    /// segment that has no resource type yet.
    fn infer_ancestors(&mut self, ancestors: &[SegmentId], terminal_type: &str, row: usize) {
        if self.options.hierarchy.index_of(terminal_type).is_none() {
            if !ancestors.is_empty() {
                debug!(row, terminal_type, "terminal type not in hierarchy; skipping inference");
            }
            return;
        }

        for (step, &id) in ancestors.iter().rev().enumerate() {
            let Some(inferred) = self.options.hierarchy.ancestor_type(terminal_type, step + 1) else {
                break;
            };
            let segment = &mut self.segments[id.0];
            if segment.resource_type.is_none() {
                segment.resource_type = Some(ResourceType::Inferred(inferred.to_string()));
            }
        }
    }

    fn lookup(&self, path: &str) -> Option<SegmentId> {
        let mut segments = path.split(SEPARATOR);
        let mut id = *self.root_index.get(segments.next()?)?;
        for segment in segments {
            id = *self.segments[id.0].child_index.get(segment)?;
        }
        Some(id)
    }

    /// Pre-order walk sharing one path buffer; each level appends its
    /// segment and truncates on the way back.
    fn collect_unresolved(&self, id: SegmentId, path: &mut String, out: &mut Vec<String>) {
        let segment = &self.segments[id.0];
        let mark = path.len();
        if !path.is_empty() {
            path.push(SEPARATOR);
        }
        path.push_str(&segment.variable_name);
        if segment.resource_type.is_none() {
            out.push(path.clone());
        }
        for &child in &segment.children {
            self.collect_unresolved(child, path, out);
        }
        path.truncate(mark);
    }

    fn render(&self, id: SegmentId) -> Node {
        let segment = &self.segments[id.0];
        let children = segment
            .children
            .iter()
            .map(|&child| Child::Node(self.render(child)))
            .chain(segment.leaves.iter().cloned().map(Child::Leaf))
            .collect();

        Node {
            name: display_name(&segment.variable_name),
            variable_name: segment.variable_name.clone(),
            resource_type: segment
                .resource_type
                .as_ref()
                .map(ResourceType::as_str)
                .unwrap_or_default()
                .to_string(),
            granular: segment.granular,
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(path: &str, terminal: &str, child: &str, child_type: &str) -> ConfigurationRow {
        ConfigurationRow::new(path, terminal, child, child_type)
    }

    #[test]
    fn test_segments_merge_per_scope() {
        let mut builder = TreeBuilder::default();
        builder.insert(&row("a.b.c", "model", "x", "attr")).unwrap();
        builder.insert(&row("a.b.d", "model", "y", "attr")).unwrap();
        builder.insert(&row("a.e", "product_line", "z", "attr")).unwrap();

        let nodes = builder.finish().unwrap();
        assert_eq!(nodes.len(), 1);
        let wrapper = nodes[0].child("All Product Family").unwrap();
        let names: Vec<&str> = wrapper.child_nodes().map(|n| n.variable_name.as_str()).collect();
        assert_eq!(names, vec!["b", "e"]);
        let b = wrapper.child("b").unwrap();
        assert_eq!(b.child_nodes().count(), 2);
    }

    #[test]
    fn test_same_segment_under_different_parents_is_distinct() {
        let mut builder = TreeBuilder::default();
        builder.insert(&row("a.shared", "product_line", "x", "attr")).unwrap();
        builder.insert(&row("b.shared", "product_line", "y", "attr")).unwrap();
        assert_eq!(builder.leaf_count("a.shared"), Some(1));
        assert_eq!(builder.leaf_count("b.shared"), Some(1));
    }

    #[test]
    fn test_explicit_type_beats_earlier_inference() {
        let mut builder = TreeBuilder::default();
        builder.insert(&row("a.b.c", "model", "x", "attr")).unwrap();
        assert_eq!(builder.resource_type("a.b"), Some("product_line"));

        builder.insert(&row("a.b", "custom_line", "y", "attr")).unwrap();
        assert_eq!(builder.resource_type("a.b"), Some("custom_line"));
    }

    #[test]
    fn test_inference_never_overwrites() {
        let mut builder = TreeBuilder::default();
        builder.insert(&row("a.b", "product_line", "x", "attr")).unwrap();
        assert_eq!(builder.resource_type("a"), Some("product_family"));

        // a.b.c.d with model: a would be clamped product_family anyway, but
        // b already holds an explicit type and must keep it.
        builder.insert(&row("a.b.c.d", "model", "y", "attr")).unwrap();
        assert_eq!(builder.resource_type("a.b"), Some("product_line"));
        assert_eq!(builder.resource_type("a.b.c"), Some("product_line"));
    }

    #[test]
    fn test_first_explicit_type_wins() {
        let mut builder = TreeBuilder::default();
        builder.insert(&row("a.b", "product_line", "x", "attr")).unwrap();
        builder.insert(&row("a.b", "model", "y", "attr")).unwrap();
        assert_eq!(builder.resource_type("a.b"), Some("product_line"));
    }

    #[test]
    fn test_first_granular_flag_wins() {
        let mut builder = TreeBuilder::default();
        builder
            .insert(&row("a.b", "product_line", "x", "attr").with_granular(false))
            .unwrap();
        builder.insert(&row("a.c", "product_line", "y", "attr")).unwrap();

        let nodes = builder.finish().unwrap();
        assert!(!nodes[0].granular);
        let wrapper = nodes[0].child("All Product Family").unwrap();
        assert!(!wrapper.child("b").unwrap().granular);
        assert!(wrapper.child("c").unwrap().granular);
    }

    #[test]
    fn test_duplicate_leaf_dropped() {
        let mut builder = TreeBuilder::default();
        builder.insert(&row("a.b", "product_line", "x", "t")).unwrap();
        builder.insert(&row("a.b", "product_line", "x", "t")).unwrap();
        builder.insert(&row("a.b", "product_line", "x", "T")).unwrap();
        assert_eq!(builder.leaf_count("a.b"), Some(2));
    }

    #[test]
    fn test_leaf_name_falls_back_to_variable_name() {
        let mut builder = TreeBuilder::default();
        builder
            .insert(&row("fam", "product_family", "price_t", "attr").with_child_name(""))
            .unwrap();
        builder
            .insert(&row("fam", "product_family", "color_t", "attr").with_child_name("Color"))
            .unwrap();

        let nodes = builder.finish().unwrap();
        let wrapper = nodes[0].child("All Product Family").unwrap();
        let names: Vec<&str> = wrapper.leaves().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["price_t", "Color"]);
    }

    #[test]
    fn test_rejected_row_leaves_builder_untouched() {
        let mut builder = TreeBuilder::default();
        let err = builder.insert(&row("a..b", "model", "x", "t")).unwrap_err();
        assert_eq!(err.as_code(), "EMPTY_SEGMENT");
        assert!(builder.resource_type("a").is_none());
        assert_eq!(builder.rows_seen(), 1);
        assert!(builder.finish().unwrap().is_empty());
    }

    #[test]
    fn test_missing_terminal_type_rejected() {
        let mut builder = TreeBuilder::default();
        let err = builder.insert(&row("a.b", "  ", "x", "t")).unwrap_err();
        assert_eq!(
            err,
            BuildError::MissingTerminalType {
                row: 1,
                path: "a.b".to_string()
            }
        );
    }

    #[test]
    fn test_min_depth_enforced() {
        let mut builder = TreeBuilder::new(BuildOptions {
            min_depth: 2,
            ..Default::default()
        });
        builder.insert(&row("a.b", "product_line", "x", "t")).unwrap();
        let err = builder.insert(&row("a", "product_family", "y", "t")).unwrap_err();
        assert!(matches!(err, BuildError::PathTooShallow { row: 2, .. }));
    }

    #[test]
    fn test_max_depth_enforced() {
        let mut builder = TreeBuilder::new(BuildOptions {
            max_depth: 3,
            ..Default::default()
        });
        builder.insert(&row("a.b.c", "model", "x", "t")).unwrap();
        let err = builder.insert(&row("a.b.c.d", "model", "y", "t")).unwrap_err();
        assert!(matches!(
            err,
            BuildError::PathTooDeep {
                row: 2,
                depth: 4,
                max_depth: 3,
                ..
            }
        ));
        assert_eq!(builder.leaf_count("a.b.c"), Some(1));
    }

    #[test]
    fn test_very_deep_path_rejected_before_insertion() {
        let deep = vec!["s"; 20_000].join(".");
        let mut builder = TreeBuilder::default();
        let err = builder.insert(&row(&deep, "model", "x", "t")).unwrap_err();
        assert_eq!(err.as_code(), "PATH_TOO_DEEP");
        assert!(builder.finish().unwrap().is_empty());
    }

    #[test]
    fn test_insert_at_reports_given_row_number() {
        let mut builder = TreeBuilder::default();
        builder.insert_at(1, &row("a.b", "product_line", "x", "t")).unwrap();
        let err = builder.insert_at(4, &row("", "model", "y", "t")).unwrap_err();
        assert_eq!(err, BuildError::EmptyPath { row: 4 });
        assert_eq!(builder.rows_seen(), 2);
    }

    #[test]
    fn test_unresolved_paths_reported_in_tree_order() {
        let mut builder = TreeBuilder::default();
        builder.insert(&row("a.b.c", "transaction", "x", "t")).unwrap();
        let err = builder.finish().unwrap_err();
        assert_eq!(
            err,
            BuildError::UnresolvedResourceType {
                paths: vec!["a".to_string(), "a.b".to_string()]
            }
        );
    }

    #[test]
    fn test_custom_hierarchy() {
        let mut builder = TreeBuilder::new(BuildOptions {
            hierarchy: TypeHierarchy::new(["region", "site", "rack", "host"]),
            ..Default::default()
        });
        builder.insert(&row("eu.fra.r1.h7", "host", "x", "t")).unwrap();
        assert_eq!(builder.resource_type("eu"), Some("region"));
        assert_eq!(builder.resource_type("eu.fra"), Some("site"));
        assert_eq!(builder.resource_type("eu.fra.r1"), Some("rack"));
    }
}

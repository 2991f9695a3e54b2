//! Migration package tree builder.
//!
//! Turns flat configuration rows (a dotted path plus a terminal child item)
//! into the nested document a CPQ catalog API accepts, inferring the resource
//! types of intermediate path segments along the way. A second, flat mode
//! groups item rows (Commerce, Util Library, ...) into the same document
//! shape.

mod builder;
mod document;
mod error;
mod hierarchy;
mod items;
mod path;
mod row;

pub use builder::{BuildOptions, TreeBuilder, DEFAULT_MAX_DEPTH};
pub use document::{
    Child, Contents, Document, Item, Leaf, Node, WRAPPER_NAME, WRAPPER_RESOURCE_TYPE,
};
pub use error::BuildError;
pub use hierarchy::{TypeHierarchy, DEFAULT_LEVELS};
pub use items::{
    assemble_items, CatalogItem, CommerceChild, CommerceNode, ItemCategory, TransactionNode,
};
pub use path::{display_name, parse_path, ParsedPath};
pub use row::{ConfigurationRow, ItemRow, TransactionKey};

/// Build a configuration document named `name` from `rows`.
pub fn build_configuration(
    name: &str,
    rows: &[ConfigurationRow],
    options: &BuildOptions,
) -> Result<Document, BuildError> {
    build_configuration_at(name, rows.iter().enumerate().map(|(i, r)| (i + 1, r)), options)
}

/// Like [`build_configuration`], but each row carries the number errors
/// should report (its record number in the source sheet).
pub fn build_configuration_at<'a, I>(
    name: &str,
    rows: I,
    options: &BuildOptions,
) -> Result<Document, BuildError>
where
    I: IntoIterator<Item = (usize, &'a ConfigurationRow)>,
{
    let mut builder = TreeBuilder::new(options.clone());
    for (row_number, row) in rows {
        builder.insert_at(row_number, row)?;
    }
    let nodes = builder.finish()?;
    Ok(Document::new(name, nodes.into_iter().map(Item::Node).collect()))
}

/// Build an item document named `name` from flat item rows.
pub fn build_items(name: &str, rows: &[ItemRow]) -> Result<Document, BuildError> {
    let items = assemble_items(rows)?;
    Ok(Document::new(
        name,
        items.into_iter().map(Item::Catalog).collect(),
    ))
}

//! Flat item assembly.
//!
//! Item rows carry no path. They are grouped by item name into one catalog
//! item each, holding a single commerce container with the rows' children.
//! Granular Commerce items further group children by transaction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::Leaf;
use crate::error::BuildError;
use crate::row::{ItemRow, TransactionKey};

/// Recognized item categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemCategory {
    Commerce,
    UtilLibrary,
    DocumentDesigner,
    EmailDesigner,
    DataTable,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 5] = [
        ItemCategory::Commerce,
        ItemCategory::UtilLibrary,
        ItemCategory::DocumentDesigner,
        ItemCategory::EmailDesigner,
        ItemCategory::DataTable,
    ];

    /// Item name as it appears in the sheet.
    pub fn item_name(&self) -> &'static str {
        match self {
            ItemCategory::Commerce => "Commerce",
            ItemCategory::UtilLibrary => "Util Library",
            ItemCategory::DocumentDesigner => "Document Designer",
            ItemCategory::EmailDesigner => "Email Designer",
            ItemCategory::DataTable => "Data Table",
        }
    }

    /// Category label sent to the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Commerce => "COMMERCE",
            ItemCategory::UtilLibrary => "UTIL_LIBRARY",
            ItemCategory::DocumentDesigner => "DOCUMENT_DESIGNER",
            ItemCategory::EmailDesigner => "EMAIL_DESIGNER",
            ItemCategory::DataTable => "DATA_TABLE",
        }
    }

    /// Look up the category for an item name (exact match).
    pub fn from_item_name(item_name: &str) -> Result<Self, BuildError> {
        Self::ALL
            .into_iter()
            .find(|c| c.item_name() == item_name)
            .ok_or_else(|| BuildError::UnknownItemCategory {
                item_name: item_name.to_string(),
                expected: Self::ALL
                    .iter()
                    .map(|c| c.item_name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

impl std::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A flat catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub name: String,
    pub category: ItemCategory,
    pub children: Vec<CommerceNode>,
}

/// Container under a catalog item, described by the item's first row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommerceNode {
    pub name: String,
    pub variable_name: String,
    pub resource_type: String,
    /// Present (and true) only for granular Commerce items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granular: Option<bool>,
    pub children: Vec<CommerceChild>,
}

/// A child of a commerce container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommerceChild {
    Transaction(TransactionNode),
    Leaf(Leaf),
}

/// Children of granular Commerce rows sharing one transaction triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionNode {
    pub name: String,
    pub variable_name: String,
    pub resource_type: String,
    pub children: Vec<Leaf>,
}

fn leaf_of(row: &ItemRow) -> Leaf {
    Leaf {
        name: row.child_name.clone(),
        variable_name: row.child_variable_name.clone(),
        resource_type: row.child_resource_type.clone(),
    }
}

/// Group item rows into catalog items.
///
/// Item order follows the first occurrence of each item name. Every item name
/// is validated before anything is assembled, so an unknown item fails the
/// whole call.
pub fn assemble_items(rows: &[ItemRow]) -> Result<Vec<CatalogItem>, BuildError> {
    let mut order: Vec<(&str, ItemCategory)> = Vec::new();
    let mut groups: HashMap<&str, Vec<&ItemRow>> = HashMap::new();
    for row in rows {
        let name = row.item_name.as_str();
        if !groups.contains_key(name) {
            order.push((name, ItemCategory::from_item_name(name)?));
        }
        groups.entry(name).or_default().push(row);
    }

    let items = order
        .into_iter()
        .filter_map(|(name, category)| {
            let rows = groups.remove(name)?;
            Some(CatalogItem {
                name: name.to_string(),
                category,
                children: vec![assemble_commerce(category, &rows)?],
            })
        })
        .collect();
    Ok(items)
}

fn assemble_commerce(category: ItemCategory, rows: &[&ItemRow]) -> Option<CommerceNode> {
    let first = rows.first()?;
    let grouped = category == ItemCategory::Commerce && rows.iter().any(|r| r.granular);

    let children = if grouped {
        group_by_transaction(rows)
    } else {
        rows.iter().map(|r| CommerceChild::Leaf(leaf_of(r))).collect()
    };

    Some(CommerceNode {
        name: first.commerce_name.clone(),
        variable_name: first.commerce_variable_name.clone(),
        resource_type: first.resource_type.clone(),
        granular: grouped.then_some(true),
        children,
    })
}

/// Direct children first (rows without a full transaction triple), then one
/// transaction node per distinct triple in first-seen order.
fn group_by_transaction(rows: &[&ItemRow]) -> Vec<CommerceChild> {
    let mut direct = Vec::new();
    let mut transactions: Vec<TransactionNode> = Vec::new();
    let mut index: HashMap<TransactionKey, usize> = HashMap::new();

    for row in rows {
        let Some(key) = row.transaction() else {
            debug!(child = %row.child_variable_name, "no transaction triple; attaching directly");
            direct.push(CommerceChild::Leaf(leaf_of(row)));
            continue;
        };
        let slot = *index.entry(key).or_insert_with_key(|key| {
            transactions.push(TransactionNode {
                name: key.name.clone(),
                variable_name: key.variable_name.clone(),
                resource_type: key.resource_type.clone(),
                children: Vec::new(),
            });
            transactions.len() - 1
        });
        transactions[slot].children.push(leaf_of(row));
    }

    direct
        .into_iter()
        .chain(transactions.into_iter().map(CommerceChild::Transaction))
        .collect()
}

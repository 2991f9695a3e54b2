//! Input row types.
//!
//! Field names serialize under the spreadsheet column headers so JSON row
//! files and CSV sheets share one vocabulary.

use serde::{Deserialize, Serialize};

fn default_granular() -> bool {
    true
}

/// One row of a configuration sheet: a dotted path plus the leaf attached to
/// the path's last segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationRow {
    /// Dot-delimited path, e.g. `family.line.model`.
    #[serde(rename = "commerceVariableName")]
    pub path: String,

    /// Resource type asserted for the path's last segment.
    #[serde(rename = "transactionVariableName")]
    pub terminal_type: String,

    #[serde(rename = "childName", default)]
    pub child_name: String,

    #[serde(rename = "childVariableName")]
    pub child_variable_name: String,

    #[serde(rename = "childResourceType")]
    pub child_resource_type: String,

    #[serde(default = "default_granular")]
    pub granular: bool,
}

impl ConfigurationRow {
    /// Convenience constructor with `granular = true` and the child name
    /// equal to its variable name.
    pub fn new(
        path: impl Into<String>,
        terminal_type: impl Into<String>,
        child_variable_name: impl Into<String>,
        child_resource_type: impl Into<String>,
    ) -> Self {
        let child_variable_name = child_variable_name.into();
        Self {
            path: path.into(),
            terminal_type: terminal_type.into(),
            child_name: child_variable_name.clone(),
            child_variable_name,
            child_resource_type: child_resource_type.into(),
            granular: true,
        }
    }

    /// Set the granular flag.
    pub fn with_granular(mut self, granular: bool) -> Self {
        self.granular = granular;
        self
    }

    /// Set a display name for the child distinct from its variable name.
    pub fn with_child_name(mut self, name: impl Into<String>) -> Self {
        self.child_name = name.into();
        self
    }
}

/// One row of a flat item sheet (Commerce, Util Library, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRow {
    pub item_name: String,

    pub commerce_name: String,

    pub commerce_variable_name: String,

    pub resource_type: String,

    #[serde(default = "default_granular")]
    pub granular: bool,

    #[serde(default)]
    pub transaction_name: String,

    #[serde(default)]
    pub transaction_variable_name: String,

    #[serde(default)]
    pub transaction_resource_type: String,

    #[serde(default)]
    pub child_name: String,

    pub child_variable_name: String,

    pub child_resource_type: String,
}

/// The `(name, variableName, resourceType)` triple grouping granular
/// Commerce rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionKey {
    pub name: String,
    pub variable_name: String,
    pub resource_type: String,
}

impl ItemRow {
    /// The row's transaction triple, if all three parts are present.
    pub fn transaction(&self) -> Option<TransactionKey> {
        if self.transaction_name.is_empty()
            || self.transaction_variable_name.is_empty()
            || self.transaction_resource_type.is_empty()
        {
            return None;
        }
        Some(TransactionKey {
            name: self.transaction_name.clone(),
            variable_name: self.transaction_variable_name.clone(),
            resource_type: self.transaction_resource_type.clone(),
        })
    }
}

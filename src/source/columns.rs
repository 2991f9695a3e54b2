//! Column sets and header lookup

use std::collections::HashMap;

use csv::StringRecord;

use super::SourceError;

pub const PACKAGE_NAME: &str = "PackageName";
pub const GRANULAR: &str = "granular";

/// Required and optional columns of one sheet layout
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

pub const CONFIGURATION_COLUMNS: ColumnSpec = ColumnSpec {
    required: &[
        "commerceVariableName",
        "transactionVariableName",
        "childVariableName",
        "childResourceType",
    ],
    optional: &["childName", GRANULAR, PACKAGE_NAME],
};

// itemCategory is accepted but unused: the category follows from itemName.
pub const ITEM_COLUMNS: ColumnSpec = ColumnSpec {
    required: &[
        "itemName",
        "commerceName",
        "commerceVariableName",
        "resourceType",
        "childName",
        "childVariableName",
        "childResourceType",
    ],
    optional: &[
        PACKAGE_NAME,
        "itemCategory",
        GRANULAR,
        "transactionName",
        "transactionVariableName",
        "transactionResourceType",
    ],
};

/// Header positions of a validated sheet
#[derive(Debug)]
pub(crate) struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    /// Index `headers`, failing on the first required column that is absent.
    pub fn from_headers(headers: &StringRecord, layout: &ColumnSpec) -> Result<Self, SourceError> {
        let mut index = HashMap::new();
        for (position, header) in headers.iter().enumerate() {
            index.entry(header.trim().to_string()).or_insert(position);
        }
        if let Some(missing) = layout.required.iter().find(|c| !index.contains_key(**c)) {
            return Err(SourceError::MissingColumn(missing.to_string()));
        }
        Ok(Self { index })
    }

    /// Trimmed cell value, or "" when the column or cell is absent.
    pub fn get<'r>(&self, record: &'r StringRecord, column: &str) -> &'r str {
        self.index
            .get(column)
            .and_then(|&i| record.get(i))
            .map(str::trim)
            .unwrap_or_default()
    }

    pub fn granular(&self, record: &StringRecord, row: usize) -> Result<bool, SourceError> {
        let value = self.get(record, GRANULAR);
        parse_granular(value).ok_or_else(|| SourceError::InvalidGranular {
            row,
            value: value.to_string(),
        })
    }
}

/// Parse a granular cell. Empty means true.
pub fn parse_granular(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.is_empty() {
        return Some(true);
    }
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

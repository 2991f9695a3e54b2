//! CSV sheet readers

use std::io::Read;

use cpq_tree::{ConfigurationRow, ItemRow};
use csv::StringRecord;
use tracing::debug;

use super::columns::{Columns, ColumnSpec, CONFIGURATION_COLUMNS, ITEM_COLUMNS, PACKAGE_NAME};
use super::{Sheet, SourceError};

/// Read every record, mapping each through `parse` with its 1-based row number.
fn read_sheet<R, T, F>(reader: R, layout: &ColumnSpec, mut parse: F) -> Result<Sheet<T>, SourceError>
where
    R: Read,
    F: FnMut(&Columns, &StringRecord, usize) -> Result<T, SourceError>,
{
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let columns = Columns::from_headers(&headers, layout)?;

    let mut rows = Vec::new();
    let mut row_numbers = Vec::new();
    let mut package_name = None;
    for (idx, result) in csv_reader.records().enumerate() {
        let record = result?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            debug!(row = idx + 1, "skipping blank row");
            continue;
        }
        if package_name.is_none() {
            let name = columns.get(&record, PACKAGE_NAME);
            if !name.is_empty() {
                package_name = Some(name.to_string());
            }
        }
        rows.push(parse(&columns, &record, idx + 1)?);
        row_numbers.push(idx + 1);
    }

    debug!(rows = rows.len(), "sheet read");
    Ok(Sheet {
        rows,
        row_numbers,
        package_name,
    })
}

/// Read configuration rows from CSV.
pub fn read_configuration_csv<R: Read>(reader: R) -> Result<Sheet<ConfigurationRow>, SourceError> {
    read_sheet(reader, &CONFIGURATION_COLUMNS, |columns, record, row| {
        Ok(ConfigurationRow {
            path: columns.get(record, "commerceVariableName").to_string(),
            terminal_type: columns.get(record, "transactionVariableName").to_string(),
            child_name: columns.get(record, "childName").to_string(),
            child_variable_name: columns.get(record, "childVariableName").to_string(),
            child_resource_type: columns.get(record, "childResourceType").to_string(),
            granular: columns.granular(record, row)?,
        })
    })
}

/// Read item rows from CSV.
pub fn read_item_csv<R: Read>(reader: R) -> Result<Sheet<ItemRow>, SourceError> {
    read_sheet(reader, &ITEM_COLUMNS, |columns, record, row| {
        Ok(ItemRow {
            item_name: columns.get(record, "itemName").to_string(),
            commerce_name: columns.get(record, "commerceName").to_string(),
            commerce_variable_name: columns.get(record, "commerceVariableName").to_string(),
            resource_type: columns.get(record, "resourceType").to_string(),
            granular: columns.granular(record, row)?,
            transaction_name: columns.get(record, "transactionName").to_string(),
            transaction_variable_name: columns.get(record, "transactionVariableName").to_string(),
            transaction_resource_type: columns.get(record, "transactionResourceType").to_string(),
            child_name: columns.get(record, "childName").to_string(),
            child_variable_name: columns.get(record, "childVariableName").to_string(),
            child_resource_type: columns.get(record, "childResourceType").to_string(),
        })
    })
}

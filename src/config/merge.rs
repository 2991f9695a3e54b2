//! Settings merge logic
//!
//! - Tables: merged key by key, recursively
//! - Arrays: replaced by the overlay
//! - Scalars: replaced by the overlay

use toml::{Table, Value};

/// Merge `overlay` into `base` in place.
pub fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, incoming) in overlay {
        match incoming {
            Value::Table(nested) => match base.get_mut(&key) {
                Some(Value::Table(existing)) => merge_tables(existing, nested),
                _ => {
                    base.insert(key, Value::Table(nested));
                }
            },
            other => {
                base.insert(key, other);
            }
        }
    }
}

/// Merge layers in order; the last layer has the highest precedence.
pub fn merge_layers(layers: impl IntoIterator<Item = Table>) -> Table {
    layers.into_iter().fold(Table::new(), |mut acc, layer| {
        merge_tables(&mut acc, layer);
        acc
    })
}

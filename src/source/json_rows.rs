//! JSON row files
//!
//! Either a bare array of row objects or
//! `{"packageName": "...", "rows": [...]}`.

use std::io::Read;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{Sheet, SourceError};

#[derive(Deserialize)]
#[serde(untagged)]
enum RowFile<T> {
    Bare(Vec<T>),
    Named {
        #[serde(rename = "packageName")]
        package_name: Option<String>,
        rows: Vec<T>,
    },
}

pub(super) fn read_rows<R, T>(reader: R) -> Result<Sheet<T>, SourceError>
where
    R: Read,
    T: DeserializeOwned,
{
    let file: RowFile<T> = serde_json::from_reader(reader)?;
    let (rows, package_name) = match file {
        RowFile::Bare(rows) => (rows, None),
        RowFile::Named { package_name, rows } => {
            (rows, package_name.filter(|n| !n.trim().is_empty()))
        }
    };
    Ok(Sheet {
        row_numbers: (1..=rows.len()).collect(),
        rows,
        package_name,
    })
}

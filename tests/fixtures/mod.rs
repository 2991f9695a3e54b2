//! Shared helpers for integration tests
//!
//! Fixture sheets live next to this module:
//! - laptops.csv: configuration rows with duplicates and mixed granular flags
//! - unresolved.csv: a path whose terminal type is outside the hierarchy
//! - commerce_items.csv / unknown_item.csv: flat item rows
//! - rows.json: configuration rows in the JSON row-file form

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use cpq_package::{EffectiveSettings, Mode, Settings};

/// Path to a fixture file by name
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Built-in settings with the given mode
pub fn settings(mode: Mode) -> Settings {
    let mut settings = EffectiveSettings::build(None, None)
        .expect("built-in settings are valid")
        .settings;
    settings.mode = mode;
    settings
}

//! Built-in defaults (layer 1)

use toml::{Table, Value};

/// Values used when neither the settings file nor the CLI says otherwise
#[derive(Debug, Clone)]
pub struct BuiltinDefaults {
    /// Row layout (default: "configuration")
    pub mode: String,

    /// Minimum path depth for configuration rows (default: 1)
    pub min_path_depth: i64,

    /// Maximum path depth for configuration rows (default: 64)
    pub max_path_depth: i64,

    /// Pretty-print emitted JSON (default: true)
    pub pretty: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            mode: "configuration".to_string(),
            min_path_depth: 1,
            max_path_depth: 64,
            pretty: true,
        }
    }
}

impl BuiltinDefaults {
    /// Render as a TOML table for merging
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.insert("mode".to_string(), Value::String(self.mode.clone()));
        table.insert("min_path_depth".to_string(), Value::Integer(self.min_path_depth));
        table.insert("max_path_depth".to_string(), Value::Integer(self.max_path_depth));
        table.insert("pretty".to_string(), Value::Boolean(self.pretty));
        table
    }
}

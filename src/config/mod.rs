//! Layered settings
//!
//! Settings are merged from three layers, later layers winning:
//! 1. Built-in defaults
//! 2. Settings file (`cpq-package.toml` or `--config`)
//! 3. CLI flags

mod defaults;
mod merge;
mod settings;

pub use defaults::BuiltinDefaults;
pub use merge::{merge_layers, merge_tables};
pub use settings::{
    ConfigError, ConfigOrigin, ConfigSource, EffectiveSettings, Mode, Settings, DEFAULT_FILE_NAME,
    MAX_PATH_DEPTH_LIMIT,
};

//! Workspace configuration: `.translations.json` settings and the source tree
//! they describe.

/// Config file loader
mod loader;
/// Configuration manager
mod manager;
/// Configuration types and settings
mod types;

pub use manager::ConfigManager;
pub use types::{
    ConfigError,
    LoadingConfig,
    SourceConfig,
    TranslationSettings,
    ValidationError,
};

/// Configuration file name looked up in the workspace root.
pub const CONFIG_FILE_NAME: &str = ".translations.json";

/// TOML configuration with hot reloading.
pub mod toml_config;

pub use toml_config::{ConfigError, ConfigManager, MultiscoutConfig};

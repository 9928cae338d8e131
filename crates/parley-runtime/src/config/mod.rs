//! Configuration module for the Parley runtime.
//!
//! Settings are layered with figment from defaults, TOML/YAML files and
//! `PARLEY_*` environment variables, then validated before use.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    DiscordConfig, GatewayConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, ServerConfig,
};
pub use validation::validate_config;

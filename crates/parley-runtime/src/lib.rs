//! Parley Runtime - the outer surface of the Parley interaction gateway.
//!
//! This crate provides:
//! - The HTTP webhook boundary (`GatewayServer`), gated by signature
//!   verification
//! - The platform REST client (`DiscordClient`) for publishing commands and
//!   editing deferred responses
//! - Layered configuration (`ConfigLoader`)
//! - Logging configuration (`LoggingBuilder`)
//!
//! ```ignore
//! use parley_runtime::{GatewayServer, config::load_config, logging};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     logging::init_from_config(&config.logging);
//!
//!     let router = build_router()?;
//!     GatewayServer::from_config(router, &config)?.serve().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod server;

// Re-exports
pub use client::{CommandPublisher, DiscordClient, publish_commands};
pub use config::{ConfigError, ConfigLoader, ConfigResult, GatewayConfig, Profile};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use server::GatewayServer;

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}

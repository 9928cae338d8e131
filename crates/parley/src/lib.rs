//! # Parley
//!
//! A signature-verified interaction webhook gateway for chat platform bots.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────┐     ┌───────────────────────────────┐
//! │ HTTP request │────▶│ Verifier │────▶│ InteractionRouter             │
//! │   (runtime)  │     │  (core)  │     │ ├── CommandRegistry           │
//! └──────────────┘     └──────────┘     │ │   ├── global table + help   │
//!                                       │ │   └── per-guild overrides   │
//!                                       │ ├── component table           │
//!                                       │ ├── autocomplete table        │
//!                                       │ └── modal submit table        │
//!                                       └───────────────────────────────┘
//! ```
//!
//! - **Core**: interaction and response models, command descriptors, Ed25519
//!   verification
//! - **Framework**: dispatch tables, the command registry and the router
//! - **Runtime**: the HTTP server, the platform client, configuration and
//!   logging
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use parley::prelude::*;
//! use std::sync::Arc;
//!
//! async fn ping(_ctx: Arc<()>, _cmd: CommandInteraction) -> InteractionResponse {
//!     InteractionResponse::message("Pong!")
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     init_from_config(&config.logging);
//!
//!     let router = InteractionRouter::builder(())
//!         .command(CommandDescriptor::new("ping", "Replies with pong."), ping)?
//!         .build();
//!
//!     GatewayServer::from_config(router, &config)?.serve().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log lines

pub use parley_core as core;
pub use parley_framework as framework;
pub use parley_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use parley::prelude::*;
/// ```
pub mod prelude {
    // Runtime - serving and platform calls
    pub use parley_runtime::config::{GatewayConfig, load_config, load_config_from_file};
    pub use parley_runtime::logging::init_from_config;
    pub use parley_runtime::{DiscordClient, GatewayServer, RuntimeError};

    // Router - assembling handlers
    pub use parley_framework::{
        CommandScope, InteractionRouter, Outcome, Routed, TaskSpawner,
    };

    // Interaction and response models
    pub use parley_core::{
        CommandDescriptor, CommandInteraction, ComponentInteraction, Interaction,
        InteractionResponse, ModalSubmitInteraction, OptionDescriptor, OptionType,
    };

    // Verification
    pub use parley_core::{Verifier, verify};
}

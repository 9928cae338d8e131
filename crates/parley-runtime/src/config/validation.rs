//! Configuration validation utilities.

use std::net::SocketAddr;

use parley_core::Verifier;

use super::error::{ConfigError, ConfigResult};
use super::schema::{DiscordConfig, GatewayConfig, LogOutput, LoggingConfig, ServerConfig};

/// Validates the entire configuration.
///
/// Credentials may be left empty here; the server and the REST client
/// require the ones they use when they are constructed.
pub fn validate_config(config: &GatewayConfig) -> ConfigResult<()> {
    validate_server_config(&config.server)?;
    validate_discord_config(&config.discord)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_server_config(server: &ServerConfig) -> ConfigResult<()> {
    server
        .bind
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidBind {
            addr: server.bind.clone(),
            reason: e.to_string(),
        })?;

    if !server.path.starts_with('/') {
        return Err(ConfigError::validation("server.path must start with '/'"));
    }

    Ok(())
}

fn validate_discord_config(discord: &DiscordConfig) -> ConfigResult<()> {
    if !discord.public_key.is_empty() {
        Verifier::from_hex(&discord.public_key)
            .map_err(|e| ConfigError::validation(format!("discord.public_key: {e}")))?;
    }

    if !discord.api_base.starts_with("http://") && !discord.api_base.starts_with("https://") {
        return Err(ConfigError::validation(
            "discord.api_base must start with http:// or https://",
        ));
    }

    if discord.timeout_secs == 0 {
        return Err(ConfigError::validation(
            "discord.timeout_secs must be greater than 0",
        ));
    }

    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }
    Ok(())
}

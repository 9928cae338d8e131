//! Platform REST client.
//!
//! Covers the two outbound calls a webhook application needs: bulk
//! overwriting its command descriptors, globally and per guild, and editing
//! the original response of a deferred interaction.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::{Client, ClientBuilder, Response};
use tracing::{debug, info};

use parley_core::{CommandDescriptor, ResponseData};
use parley_framework::InteractionRouter;

use crate::config::DiscordConfig;
use crate::error::{RuntimeError, RuntimeResult};

/// Publishes command descriptors to the platform.
#[async_trait]
pub trait CommandPublisher: Send + Sync {
    /// Replaces the application's global commands.
    async fn publish_global(&self, commands: &[CommandDescriptor]) -> RuntimeResult<()>;

    /// Replaces the application's commands in one guild.
    async fn publish_guild(&self, guild_id: &str, commands: &[CommandDescriptor])
    -> RuntimeResult<()>;
}

/// Publishes the router's global list and every guild list.
///
/// Returns the number of guilds published to.
pub async fn publish_commands<P, C>(publisher: &P, router: &InteractionRouter<C>) -> RuntimeResult<usize>
where
    P: CommandPublisher + ?Sized,
    C: Send + Sync + 'static,
{
    let global = router.list_global();
    let guilds = router.list_all_guilds();

    publisher.publish_global(&global).await?;
    try_join_all(
        guilds
            .iter()
            .map(|(guild_id, commands)| publisher.publish_guild(guild_id, commands)),
    )
    .await?;

    info!(
        global = global.len(),
        guilds = guilds.len(),
        "Published application commands"
    );
    Ok(guilds.len())
}

/// REST client bound to one application.
#[derive(Debug, Clone)]
pub struct DiscordClient {
    http: Client,
    api_base: Arc<str>,
    application_id: Arc<str>,
    bot_token: Option<Arc<str>>,
}

impl DiscordClient {
    /// Creates a client from the `discord` configuration section.
    pub fn from_config(config: &DiscordConfig) -> RuntimeResult<Self> {
        if config.application_id.is_empty() {
            return Err(RuntimeError::MissingCredential("discord.application_id"));
        }

        let http = ClientBuilder::new().timeout(config.timeout()).build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').into(),
            application_id: config.application_id.as_str().into(),
            bot_token: config.bot_token.as_deref().map(Into::into),
        })
    }

    /// Returns the application id.
    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    /// Publishes everything the router knows about.
    pub async fn publish_all<C: Send + Sync + 'static>(
        &self,
        router: &InteractionRouter<C>,
    ) -> RuntimeResult<usize> {
        publish_commands(self, router).await
    }

    /// Replaces the content of a deferred interaction's original response.
    pub async fn edit_original(&self, interaction_token: &str, content: &str) -> RuntimeResult<()> {
        let message = ResponseData {
            content: Some(content.to_string()),
            ..Default::default()
        };
        self.edit_original_message(interaction_token, &message).await
    }

    /// Replaces the original response with `message`, components included.
    pub async fn edit_original_message(
        &self,
        interaction_token: &str,
        message: &ResponseData,
    ) -> RuntimeResult<()> {
        let url = format!(
            "{}/webhooks/{}/{}/messages/@original",
            self.api_base, self.application_id, interaction_token
        );
        let mut request = self.http.patch(&url).json(message);
        if let Some(token) = &self.bot_token {
            request = request.header("Authorization", format!("Bot {token}"));
        }

        check(request.send().await?).await?;
        debug!("Edited original interaction response");
        Ok(())
    }

    async fn put_commands(&self, url: String, commands: &[CommandDescriptor]) -> RuntimeResult<()> {
        let token = self
            .bot_token
            .as_ref()
            .ok_or(RuntimeError::MissingCredential("discord.bot_token"))?;

        let response = self
            .http
            .put(&url)
            .header("Authorization", format!("Bot {token}"))
            .json(commands)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl CommandPublisher for DiscordClient {
    async fn publish_global(&self, commands: &[CommandDescriptor]) -> RuntimeResult<()> {
        let url = format!("{}/applications/{}/commands", self.api_base, self.application_id);
        self.put_commands(url, commands).await?;
        debug!(count = commands.len(), "Published global commands");
        Ok(())
    }

    async fn publish_guild(
        &self,
        guild_id: &str,
        commands: &[CommandDescriptor],
    ) -> RuntimeResult<()> {
        let url = format!(
            "{}/applications/{}/guilds/{}/commands",
            self.api_base, self.application_id, guild_id
        );
        self.put_commands(url, commands).await?;
        debug!(guild_id = %guild_id, count = commands.len(), "Published guild commands");
        Ok(())
    }
}

async fn check(response: Response) -> RuntimeResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RuntimeError::Api {
        status: status.as_u16(),
        body,
    })
}

//! Greeter Example
//!
//! A small interaction bot served through the Parley gateway.
//!
//! # Commands
//!
//! - `/hello [user] [style]`: greets the caller or the given user; `style`
//!   offers autocomplete suggestions
//! - `/think`: acknowledges immediately, then edits the reply a few seconds
//!   later from a background task
//! - `/counter`: posts a button whose custom id carries the click count
//!   (`counter_<n>`)
//! - `/help`: built in, lists every command visible where it is invoked
//!
//! # Usage
//!
//! ```bash
//! # publish descriptors, `think` scoped to one guild
//! cargo run --package greeter -- register --guild 615745951184715806
//!
//! # serve interactions
//! cargo run --package greeter -- serve --config parley.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use parley::core::{AutocompleteChoice, ResponseData};
use parley::prelude::*;
use parley::runtime::config::{ConfigLoader, validate_config};
use serde_json::{Value, json};
use tracing::{error, info};

const THINK_DELAY: Duration = Duration::from_secs(5);
const GREETING_STYLES: [(&str, &str); 4] = [
    ("wave", "👋"),
    ("salute", "🫡"),
    ("cheer", "🎉"),
    ("bow", "🙇"),
];

#[derive(Parser)]
#[command(name = "greeter", about = "A greeting bot for the Parley gateway")]
struct Cli {
    /// Configuration file; the default search paths are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Guild receiving `think` instead of the global list. Repeatable.
    #[arg(long = "guild", global = true)]
    guilds: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the interaction endpoint.
    Serve,
    /// Publish command descriptors to the platform.
    Register,
}

/// State shared by every handler.
struct AppContext {
    app_name: String,
    tasks: TaskSpawner,
    client: DiscordClient,
}

// ============================================================================
// Handlers
// ============================================================================

async fn hello(ctx: Arc<AppContext>, cmd: CommandInteraction) -> InteractionResponse {
    let target = cmd
        .data
        .option("user")
        .and_then(|o| o.as_str())
        .or_else(|| cmd.meta.invoker().map(|u| u.id.as_str()));

    let greeting = match target {
        Some(id) => format!("Hello from {}, <@{id}>!", ctx.app_name),
        None => format!("Hello from {}!", ctx.app_name),
    };

    let emoji = cmd
        .data
        .option("style")
        .and_then(|o| o.as_str())
        .and_then(|style| GREETING_STYLES.iter().find(|(name, _)| *name == style))
        .map(|(_, emoji)| *emoji);

    match emoji {
        Some(emoji) => InteractionResponse::message(format!("{emoji} {greeting}")),
        None => InteractionResponse::message(greeting),
    }
}

async fn hello_styles(_ctx: Arc<AppContext>, cmd: CommandInteraction) -> InteractionResponse {
    let typed = cmd
        .data
        .focused_option()
        .and_then(|o| o.as_str())
        .unwrap_or_default()
        .to_lowercase();

    let choices = GREETING_STYLES
        .iter()
        .filter(|(name, _)| name.starts_with(&typed))
        .map(|(name, emoji)| AutocompleteChoice::new(format!("{emoji} {name}"), *name))
        .collect();
    InteractionResponse::autocomplete(choices)
}

async fn think(ctx: Arc<AppContext>, cmd: CommandInteraction) -> InteractionResponse {
    let client = ctx.client.clone();
    let token = cmd.meta.token;

    ctx.tasks.spawn("think", async move {
        tokio::time::sleep(THINK_DELAY).await;
        client.edit_original(&token, "The answer is 42").await
    });

    InteractionResponse::deferred(true)
}

fn counter_message(count: u64) -> ResponseData {
    ResponseData {
        content: Some(format!("Clicked {count} times")),
        components: vec![counter_row(count)],
        ..Default::default()
    }
}

fn counter_row(count: u64) -> Value {
    json!({
        "type": 1,
        "components": [{
            "type": 2,
            "style": 1,
            "label": "Click",
            "custom_id": format!("counter_{count}"),
        }],
    })
}

async fn start_counter(_ctx: Arc<AppContext>, _cmd: CommandInteraction) -> InteractionResponse {
    let mut response = InteractionResponse::message("Clicked 0 times");
    if let Some(data) = response.data.as_mut() {
        data.components.push(counter_row(0));
    }
    response
}

async fn counter(ctx: Arc<AppContext>, click: Routed<ComponentInteraction>) {
    let count = click.remainder.parse::<u64>().unwrap_or(0) + 1;
    let client = ctx.client.clone();
    let token = click.interaction.meta.token;

    ctx.tasks.spawn("counter", async move {
        client
            .edit_original_message(&token, &counter_message(count))
            .await
    });
}

// ============================================================================
// Wiring
// ============================================================================

fn build_router(ctx: AppContext, guilds: &[String]) -> Result<InteractionRouter<AppContext>> {
    let hello_desc = CommandDescriptor::new("hello", "Say hello.")
        .option(OptionDescriptor::new("user", OptionType::User, "Who to greet."))
        .option(
            OptionDescriptor::new("style", OptionType::String, "How to greet.").autocomplete(true),
        );
    let think_desc = CommandDescriptor::new("think", "Think for a while, then answer.");
    let counter_desc = CommandDescriptor::new("counter", "Post a button that counts clicks.");

    let builder = InteractionRouter::builder(ctx)
        .command(hello_desc, hello)?
        .autocomplete("hello", hello_styles)?
        .command(counter_desc, start_counter)?
        .component("counter", counter)?;

    let builder = if guilds.is_empty() {
        builder.command(think_desc, think)?
    } else {
        builder.guild_command(think_desc, guilds.iter().cloned(), think)?
    };

    Ok(builder.build())
}

fn load(path: Option<&PathBuf>) -> Result<GatewayConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = path {
        loader = loader.file(path);
    }
    let config = loader.load()?;
    validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load(cli.config.as_ref())?;
    init_from_config(&config.logging);

    let tasks = TaskSpawner::new();
    let client = DiscordClient::from_config(&config.discord)?;
    let ctx = AppContext {
        app_name: "greeter".to_string(),
        tasks: tasks.clone(),
        client: client.clone(),
    };
    let router = build_router(ctx, &cli.guilds)?;

    match cli.command {
        Command::Serve => {
            GatewayServer::from_config(router, &config)?
                .tasks(tasks)
                .serve()
                .await?;
        }
        Command::Register => match client.publish_all(&router).await {
            Ok(guilds) => info!(guilds, "Registered all commands"),
            Err(e) => {
                error!(error = %e, "Failed to register commands");
                return Err(e.into());
            }
        },
    }

    Ok(())
}

//! Application command registry with guild-scoped overrides.
//!
//! The registry composes one global [`DispatchTable`] with one table per
//! guild. Resolution consults the invoking guild's table first and falls back
//! to the global table:
//!
//! ```text
//! resolve("ping", Some("G"))
//!   ├── guilds["G"].lookup("ping")  ── hit ──▶ guild handler
//!   └── miss ──▶ global.lookup("ping") ── hit ──▶ global handler
//!                                      └── miss ─▶ None
//! ```
//!
//! Descriptors are recorded in registration order in a [`CommandCatalog`],
//! which backs both the bulk-registration listings and the synthesized
//! `help` command. The global scope is pre-seeded with the help descriptor.
//!
//! A global registration is checked against the guild tables that exist at
//! that moment. A guild table created later is not checked against earlier
//! global keys, which is how guild overrides of global commands are made.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use parley_core::{
    CommandDescriptor, CommandInteraction, HELP_COMMAND, InteractionResponse, RegistrationError,
    RegistrationResult,
};

use crate::handler::{CommandHandler, Handler};
use crate::help::format_command_set;
use crate::table::{Dispatch, DispatchTable};

/// Where a command is registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CommandScope {
    /// The global table, visible in every guild and in direct messages.
    #[default]
    Global,
    /// The tables of the listed guilds only.
    Guilds(Vec<String>),
}

impl CommandScope {
    /// Builds a guild scope from any list of ids.
    pub fn guilds<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Guilds(ids.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// CommandCatalog
// =============================================================================

/// Ordered command descriptors per scope.
#[derive(Debug, Clone, Default)]
pub struct CommandCatalog {
    global: Vec<CommandDescriptor>,
    guilds: BTreeMap<String, Vec<CommandDescriptor>>,
}

impl CommandCatalog {
    /// Global descriptors in registration order.
    pub fn global(&self) -> &[CommandDescriptor] {
        &self.global
    }

    /// A guild's descriptors in registration order; empty if unknown.
    pub fn guild(&self, guild_id: &str) -> &[CommandDescriptor] {
        self.guilds.get(guild_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All guild descriptor lists keyed by guild id.
    pub fn guilds(&self) -> &BTreeMap<String, Vec<CommandDescriptor>> {
        &self.guilds
    }

    /// Renders the help text: global commands, then the guild's own.
    pub fn render_help(&self, guild_id: Option<&str>) -> String {
        let guild = guild_id.map(|g| self.guild(g)).unwrap_or(&[]);
        format_command_set(self.global.iter().chain(guild))
    }
}

// =============================================================================
// CommandRegistry
// =============================================================================

/// Registry of application command handlers.
pub struct CommandRegistry<C> {
    global: DispatchTable<C, CommandInteraction, InteractionResponse>,
    guilds: HashMap<String, DispatchTable<C, CommandInteraction, InteractionResponse>>,
    help: CommandHandler<C>,
    catalog: Arc<RwLock<CommandCatalog>>,
}

impl<C: Send + Sync + 'static> CommandRegistry<C> {
    /// Creates a registry holding only the synthesized help command.
    pub fn new() -> Self {
        let catalog = Arc::new(RwLock::new(CommandCatalog {
            global: vec![CommandDescriptor::help()],
            guilds: BTreeMap::new(),
        }));

        let help_catalog = Arc::clone(&catalog);
        let help: CommandHandler<C> =
            Arc::new(move |_ctx: Arc<C>, interaction: CommandInteraction| {
                let content = help_catalog.read().render_help(interaction.guild_id());
                async move { InteractionResponse::ephemeral(content) }
            });

        Self {
            global: DispatchTable::new("global command"),
            guilds: HashMap::new(),
            help,
            catalog,
        }
    }

    /// Registers a command in the given scope.
    ///
    /// The descriptor's `name` is the routing key. Fails with
    /// [`RegistrationError::ReservedKey`] for `help`,
    /// [`RegistrationError::EmptyKey`] for an empty name,
    /// [`RegistrationError::NoGuilds`] for an empty guild list and
    /// [`RegistrationError::DuplicateKey`] on any collision; nothing is
    /// registered when an error is returned.
    pub fn register<H>(
        &mut self,
        handler: H,
        descriptor: CommandDescriptor,
        scope: CommandScope,
    ) -> RegistrationResult<()>
    where
        H: Handler<C, CommandInteraction, InteractionResponse>,
    {
        let handler: CommandHandler<C> = Arc::new(handler);
        match scope {
            CommandScope::Global => self.register_global(handler, descriptor),
            CommandScope::Guilds(guilds) => self.register_in_guilds(handler, descriptor, &guilds),
        }
    }

    fn register_global(
        &mut self,
        handler: CommandHandler<C>,
        descriptor: CommandDescriptor,
    ) -> RegistrationResult<()> {
        let key = validate_key(&descriptor.name)?;

        if self.global.contains(key) {
            return Err(RegistrationError::duplicate_global(key));
        }
        if let Some((guild_id, _)) = self.guilds.iter().find(|(_, t)| t.contains(key)) {
            return Err(RegistrationError::duplicate_in_guild(key, guild_id));
        }

        self.global.register_boxed(key, handler)?;
        debug!(command = %key, "Registered global command");
        self.catalog.write().global.push(descriptor);
        Ok(())
    }

    fn register_in_guilds(
        &mut self,
        handler: CommandHandler<C>,
        descriptor: CommandDescriptor,
        guilds: &[String],
    ) -> RegistrationResult<()> {
        let key = validate_key(&descriptor.name)?;
        if guilds.is_empty() {
            return Err(RegistrationError::NoGuilds {
                key: key.to_string(),
            });
        }

        let mut seen = HashSet::new();
        for guild_id in guilds {
            let taken = self.guilds.get(guild_id).is_some_and(|t| t.contains(key));
            if taken || !seen.insert(guild_id.as_str()) {
                return Err(RegistrationError::duplicate_in_guild(key, guild_id));
            }
        }

        let mut catalog = self.catalog.write();
        for guild_id in guilds {
            self.guilds
                .entry(guild_id.clone())
                .or_insert_with(|| DispatchTable::new(format!("guild {guild_id} command")))
                .register_boxed(key, Arc::clone(&handler))?;
            catalog
                .guilds
                .entry(guild_id.clone())
                .or_default()
                .push(descriptor.clone());
            debug!(command = %key, guild_id = %guild_id, "Registered guild command");
        }
        Ok(())
    }

    /// Resolves the handler for `key`, preferring the guild's own table.
    ///
    /// `help` never lives in a table; it is reserved in every scope.
    pub fn resolve(&self, key: &str, guild_id: Option<&str>) -> Option<&CommandHandler<C>> {
        if key == HELP_COMMAND {
            return Some(&self.help);
        }
        guild_id
            .and_then(|g| self.guilds.get(g))
            .and_then(|table| table.lookup(key))
            .or_else(|| self.global.lookup(key))
    }

    /// Resolves and invokes the handler for a command interaction.
    pub async fn dispatch(
        &self,
        ctx: Arc<C>,
        interaction: CommandInteraction,
    ) -> Dispatch<InteractionResponse> {
        match self.resolve(interaction.name(), interaction.guild_id()) {
            Some(handler) => Dispatch::Found(handler.call(ctx, interaction).await),
            None => Dispatch::NotFound,
        }
    }

    /// Global descriptors in registration order, help first.
    pub fn list_global(&self) -> Vec<CommandDescriptor> {
        self.catalog.read().global().to_vec()
    }

    /// A guild's descriptors in registration order; empty if the guild is
    /// unknown.
    pub fn list_for_guild(&self, guild_id: &str) -> Vec<CommandDescriptor> {
        self.catalog.read().guild(guild_id).to_vec()
    }

    /// Every guild's descriptors, keyed by guild id.
    pub fn list_all_guilds(&self) -> BTreeMap<String, Vec<CommandDescriptor>> {
        self.catalog.read().guilds().clone()
    }

    /// Renders the help text shown in `guild_id`.
    pub fn render_help(&self, guild_id: Option<&str>) -> String {
        self.catalog.read().render_help(guild_id)
    }

    /// Returns the ids of guilds that have their own commands.
    pub fn guild_ids(&self) -> impl Iterator<Item = &str> {
        self.guilds.keys().map(String::as_str)
    }
}

impl<C: Send + Sync + 'static> Default for CommandRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for CommandRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("global", &self.global)
            .field("guilds", &self.guilds.len())
            .finish()
    }
}

fn validate_key(key: &str) -> RegistrationResult<&str> {
    if key.is_empty() {
        return Err(RegistrationError::EmptyKey);
    }
    if key == HELP_COMMAND {
        return Err(RegistrationError::ReservedKey {
            key: key.to_string(),
        });
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{InteractionMeta, ResponseType};
    use serde_json::json;

    struct Ctx;

    fn command(name: &str, guild_id: Option<&str>) -> CommandInteraction {
        serde_json::from_value(json!({
            "type": 2,
            "guild_id": guild_id,
            "data": { "name": name }
        }))
        .unwrap()
    }

    fn replying(text: &'static str) -> impl Handler<Ctx, CommandInteraction, InteractionResponse> {
        move |_ctx: Arc<Ctx>, _cmd: CommandInteraction| async move {
            InteractionResponse::message(text)
        }
    }

    async fn reply_of(registry: &CommandRegistry<Ctx>, name: &str, guild: Option<&str>) -> Option<String> {
        registry
            .dispatch(Arc::new(Ctx), command(name, guild))
            .await
            .into_option()
            .and_then(|r| r.content().map(str::to_string))
    }

    #[test]
    fn test_duplicate_global_fails() {
        let mut registry = CommandRegistry::<Ctx>::new();
        registry
            .register(replying("a"), CommandDescriptor::new("ping-cmd", "a"), CommandScope::Global)
            .unwrap();
        let err = registry
            .register(replying("b"), CommandDescriptor::new("ping-cmd", "b"), CommandScope::Global)
            .unwrap_err();
        assert_eq!(err, RegistrationError::duplicate_global("ping-cmd"));
        assert_eq!(registry.list_global().len(), 2);
    }

    #[test]
    fn test_duplicate_in_same_guild_fails() {
        let mut registry = CommandRegistry::<Ctx>::new();
        let scope = CommandScope::guilds(["G"]);
        registry
            .register(replying("a"), CommandDescriptor::new("x", "a"), scope.clone())
            .unwrap();
        let err = registry
            .register(replying("b"), CommandDescriptor::new("x", "b"), scope)
            .unwrap_err();
        assert_eq!(err, RegistrationError::duplicate_in_guild("x", "G"));
        assert_eq!(registry.list_for_guild("G").len(), 1);
    }

    #[test]
    fn test_guild_registration_is_all_or_nothing() {
        let mut registry = CommandRegistry::<Ctx>::new();
        registry
            .register(replying("a"), CommandDescriptor::new("x", "a"), CommandScope::guilds(["B"]))
            .unwrap();
        let err = registry
            .register(
                replying("b"),
                CommandDescriptor::new("x", "b"),
                CommandScope::guilds(["A", "B"]),
            )
            .unwrap_err();
        assert_eq!(err, RegistrationError::duplicate_in_guild("x", "B"));
        assert!(registry.list_for_guild("A").is_empty());
        assert!(registry.resolve("x", Some("A")).is_none());

        let repeated = registry.register(
            replying("c"),
            CommandDescriptor::new("y", "c"),
            CommandScope::guilds(["C", "C"]),
        );
        assert_eq!(repeated, Err(RegistrationError::duplicate_in_guild("y", "C")));
    }

    #[test]
    fn test_help_key_is_reserved() {
        let mut registry = CommandRegistry::<Ctx>::new();
        for scope in [CommandScope::Global, CommandScope::guilds(["G"])] {
            let err = registry
                .register(replying("x"), CommandDescriptor::new(HELP_COMMAND, "mine"), scope)
                .unwrap_err();
            assert_eq!(
                err,
                RegistrationError::ReservedKey {
                    key: HELP_COMMAND.to_string()
                }
            );
        }
        let empty = registry.register(replying("x"), CommandDescriptor::new("", ""), CommandScope::Global);
        assert_eq!(empty, Err(RegistrationError::EmptyKey));
    }

    #[test]
    fn test_empty_guild_list_is_rejected() {
        let mut registry = CommandRegistry::<Ctx>::new();
        let err = registry
            .register(replying("a"), CommandDescriptor::new("lost", "a"), CommandScope::Guilds(vec![]))
            .unwrap_err();
        assert_eq!(err, RegistrationError::NoGuilds { key: "lost".to_string() });
        assert!(registry.list_all_guilds().is_empty());
        assert_eq!(registry.list_global().len(), 1);
        assert!(registry.resolve("lost", None).is_none());
    }

    #[test]
    fn test_help_resolves_in_every_scope() {
        let mut registry = CommandRegistry::<Ctx>::new();
        registry
            .register(replying("g"), CommandDescriptor::new("g", "g"), CommandScope::guilds(["G"]))
            .unwrap();
        assert!(registry.resolve(HELP_COMMAND, None).is_some());
        assert!(registry.resolve(HELP_COMMAND, Some("G")).is_some());
        assert!(registry.resolve(HELP_COMMAND, Some("unknown")).is_some());
    }

    #[test]
    fn test_global_checked_against_known_guilds_only() {
        let mut registry = CommandRegistry::<Ctx>::new();

        // guild first, then global: collides
        registry
            .register(replying("g"), CommandDescriptor::new("x", "g"), CommandScope::guilds(["G"]))
            .unwrap();
        let err = registry
            .register(replying("x"), CommandDescriptor::new("x", "x"), CommandScope::Global)
            .unwrap_err();
        assert_eq!(err, RegistrationError::duplicate_in_guild("x", "G"));

        // global first, then a new guild: allowed as an override
        registry
            .register(replying("y"), CommandDescriptor::new("y", "y"), CommandScope::Global)
            .unwrap();
        registry
            .register(replying("gy"), CommandDescriptor::new("y", "gy"), CommandScope::guilds(["H"]))
            .unwrap();
    }

    #[tokio::test]
    async fn test_resolve_prefers_guild_override() {
        let mut registry = CommandRegistry::<Ctx>::new();
        registry
            .register(replying("global"), CommandDescriptor::new("ping-cmd", "p"), CommandScope::Global)
            .unwrap();
        registry
            .register(
                replying("guild"),
                CommandDescriptor::new("ping-cmd", "p"),
                CommandScope::guilds(["G"]),
            )
            .unwrap();

        assert_eq!(reply_of(&registry, "ping-cmd", None).await.as_deref(), Some("global"));
        assert_eq!(reply_of(&registry, "ping-cmd", Some("G")).await.as_deref(), Some("guild"));
        assert_eq!(reply_of(&registry, "ping-cmd", Some("G2")).await.as_deref(), Some("global"));
    }

    #[tokio::test]
    async fn test_guild_only_command_invisible_elsewhere() {
        let mut registry = CommandRegistry::<Ctx>::new();
        registry
            .register(replying("only"), CommandDescriptor::new("only", "o"), CommandScope::guilds(["G"]))
            .unwrap();

        assert!(registry.resolve("only", Some("G")).is_some());
        assert!(registry.resolve("only", Some("G2")).is_none());
        assert!(registry.resolve("only", None).is_none());
        assert_eq!(
            registry.dispatch(Arc::new(Ctx), command("only", Some("G2"))).await,
            Dispatch::NotFound
        );
    }

    #[test]
    fn test_listings() {
        let mut registry = CommandRegistry::<Ctx>::new();
        registry
            .register(replying("a"), CommandDescriptor::new("a", "A"), CommandScope::Global)
            .unwrap();
        registry
            .register(replying("b"), CommandDescriptor::new("b", "B"), CommandScope::guilds(["G", "H"]))
            .unwrap();
        registry
            .register(replying("c"), CommandDescriptor::new("c", "C"), CommandScope::guilds(["G"]))
            .unwrap();

        let global: Vec<_> = registry.list_global().into_iter().map(|d| d.name).collect();
        assert_eq!(global, ["help", "a"]);

        let g: Vec<_> = registry.list_for_guild("G").into_iter().map(|d| d.name).collect();
        assert_eq!(g, ["b", "c"]);
        assert!(registry.list_for_guild("unknown").is_empty());

        let all = registry.list_all_guilds();
        assert_eq!(all.keys().map(String::as_str).collect::<Vec<_>>(), ["G", "H"]);
        assert_eq!(all["H"].len(), 1);

        let mut ids: Vec<_> = registry.guild_ids().collect();
        ids.sort_unstable();
        assert_eq!(ids, ["G", "H"]);
    }

    #[tokio::test]
    async fn test_help_lists_global_then_guild() {
        let mut registry = CommandRegistry::<Ctx>::new();
        registry
            .register(replying("a"), CommandDescriptor::new("zeta", "Z"), CommandScope::Global)
            .unwrap();
        registry
            .register(replying("b"), CommandDescriptor::new("alpha", "A"), CommandScope::Global)
            .unwrap();
        registry
            .register(replying("c"), CommandDescriptor::new("local", "L"), CommandScope::guilds(["G"]))
            .unwrap();

        let resp = registry
            .dispatch(Arc::new(Ctx), command(HELP_COMMAND, Some("G")))
            .await
            .into_option()
            .unwrap();
        assert_eq!(resp.kind, ResponseType::ChannelMessageWithSource);
        assert!(resp.is_ephemeral());

        let expected = "**Available commands**\n\
                        `/help` - Show all supported bot commands.\n\
                        `/zeta` - Z\n\
                        `/alpha` - A\n\
                        `/local` - L";
        assert_eq!(resp.content(), Some(expected));
        assert_eq!(resp.content().unwrap().matches("/help").count(), 1);

        let elsewhere = registry.render_help(Some("other"));
        assert!(!elsewhere.contains("/local"));
        assert_eq!(registry.render_help(None), elsewhere);
    }

    #[test]
    fn test_help_uses_guild_object_fallback() {
        let mut registry = CommandRegistry::<Ctx>::new();
        registry
            .register(replying("c"), CommandDescriptor::new("local", "L"), CommandScope::guilds(["G"]))
            .unwrap();

        let interaction = CommandInteraction {
            meta: InteractionMeta {
                guild: Some(parley_core::PartialGuild {
                    id: "G".into(),
                    locale: None,
                }),
                ..Default::default()
            },
            data: command(HELP_COMMAND, None).data,
        };
        let resp = tokio_test::block_on(registry.dispatch(Arc::new(Ctx), interaction));
        let content = resp.into_option().and_then(|r| r.content().map(str::to_string));
        assert!(content.unwrap().contains("/local"));
    }
}

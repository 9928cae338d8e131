//! Interaction routing.
//!
//! Routers are assembled with an [`InteractionRouterBuilder`] during startup
//! and frozen by [`InteractionRouterBuilder::build`]. The frozen
//! [`InteractionRouter`] has no registration methods, so every table is
//! read-only while requests are served.
//!
//! ```rust,ignore
//! let router = InteractionRouter::builder(AppContext::new())
//!     .command(CommandDescriptor::new("hello", "Say hello."), hello)?
//!     .guild_command(CommandDescriptor::new("think", "Think hard."), ["615745951184715806"], think)?
//!     .component("counter", counter)?
//!     .autocomplete("hello", hello_autocomplete)?
//!     .build();
//!
//! let outcome = router.handle(interaction).await;
//! ```
//!
//! | Interaction       | Routing key               | Table              |
//! |-------------------|---------------------------|--------------------|
//! | ping              | none                      | none, always pong  |
//! | application command | command name            | [`CommandRegistry`] |
//! | message component | custom id prefix          | components         |
//! | autocomplete      | command name              | autocomplete       |
//! | modal submit      | custom id prefix          | modal submits      |

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use parley_core::{
    CommandDescriptor, CommandInteraction, ComponentInteraction, Interaction, InteractionResponse,
    InteractionType, ModalSubmitInteraction, RegistrationResult,
};

use crate::handler::Handler;
use crate::registry::{CommandRegistry, CommandScope};
use crate::split::{IdSplitter, Routed, SeparatorSplitter};
use crate::table::{Dispatch, DispatchTable};

/// Content of the reply sent for interactions no handler accepts.
pub const UNSUPPORTED_MESSAGE: &str = "This interaction is not supported.";

/// Result of routing one interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A handler produced a response to send back verbatim.
    Respond(InteractionResponse),
    /// A component or modal handler ran; it replies out of band.
    Acknowledged {
        /// Whether the interaction has a message that can be updated.
        ///
        /// Modals opened by a command have none; they are acknowledged with
        /// an ephemeral deferred reply that the handler edits later.
        update_message: bool,
    },
    /// No handler is registered for the interaction.
    Unhandled {
        /// Kind of the interaction.
        kind: InteractionType,
        /// The routing key that missed.
        key: String,
    },
}

impl Outcome {
    /// Returns the response, if a handler produced one.
    pub fn response(&self) -> Option<&InteractionResponse> {
        match self {
            Self::Respond(r) => Some(r),
            _ => None,
        }
    }

    /// Returns `true` if no handler matched.
    pub fn is_unhandled(&self) -> bool {
        matches!(self, Self::Unhandled { .. })
    }

    /// Converts the outcome into the payload returned to the platform.
    ///
    /// Out-of-band handlers are acknowledged with a deferred update, or a
    /// deferred ephemeral reply when there is no message to update.
    /// Unhandled interactions get an ephemeral notice.
    pub fn into_response(self) -> InteractionResponse {
        match self {
            Self::Respond(r) => r,
            Self::Acknowledged {
                update_message: true,
            } => InteractionResponse::deferred_update(),
            Self::Acknowledged {
                update_message: false,
            } => InteractionResponse::deferred(true),
            Self::Unhandled { .. } => InteractionResponse::ephemeral(UNSUPPORTED_MESSAGE),
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Collects handlers for an [`InteractionRouter`].
///
/// Every registration method consumes the builder and returns it again, or
/// the [`RegistrationError`](parley_core::RegistrationError) that aborts
/// startup.
pub struct InteractionRouterBuilder<C> {
    ctx: Arc<C>,
    commands: CommandRegistry<C>,
    components: DispatchTable<C, Routed<ComponentInteraction>, ()>,
    autocomplete: DispatchTable<C, CommandInteraction, InteractionResponse>,
    modal_submits: DispatchTable<C, Routed<ModalSubmitInteraction>, ()>,
    splitter: Arc<dyn IdSplitter>,
}

impl<C: Send + Sync + 'static> InteractionRouterBuilder<C> {
    /// Creates a builder around the shared context.
    pub fn new(ctx: C) -> Self {
        Self::with_context(Arc::new(ctx))
    }

    /// Creates a builder around an already shared context.
    pub fn with_context(ctx: Arc<C>) -> Self {
        Self {
            ctx,
            commands: CommandRegistry::new(),
            components: DispatchTable::new("component"),
            autocomplete: DispatchTable::new("autocomplete"),
            modal_submits: DispatchTable::new("modal submit"),
            splitter: Arc::new(SeparatorSplitter::default()),
        }
    }

    /// Registers a global application command.
    pub fn command<H>(mut self, descriptor: CommandDescriptor, handler: H) -> RegistrationResult<Self>
    where
        H: Handler<C, CommandInteraction, InteractionResponse>,
    {
        self.commands.register(handler, descriptor, CommandScope::Global)?;
        Ok(self)
    }

    /// Registers an application command in the listed guilds only.
    pub fn guild_command<H, I, S>(
        mut self,
        descriptor: CommandDescriptor,
        guilds: I,
        handler: H,
    ) -> RegistrationResult<Self>
    where
        H: Handler<C, CommandInteraction, InteractionResponse>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands
            .register(handler, descriptor, CommandScope::guilds(guilds))?;
        Ok(self)
    }

    /// Registers a message component handler under a custom id prefix.
    pub fn component<H>(mut self, key: impl Into<String>, handler: H) -> RegistrationResult<Self>
    where
        H: Handler<C, Routed<ComponentInteraction>, ()>,
    {
        self.components.register(key, handler)?;
        Ok(self)
    }

    /// Registers an autocomplete handler for a command name.
    pub fn autocomplete<H>(mut self, command: impl Into<String>, handler: H) -> RegistrationResult<Self>
    where
        H: Handler<C, CommandInteraction, InteractionResponse>,
    {
        self.autocomplete.register(command, handler)?;
        Ok(self)
    }

    /// Registers a modal submission handler under a custom id prefix.
    pub fn modal_submit<H>(mut self, key: impl Into<String>, handler: H) -> RegistrationResult<Self>
    where
        H: Handler<C, Routed<ModalSubmitInteraction>, ()>,
    {
        self.modal_submits.register(key, handler)?;
        Ok(self)
    }

    /// Replaces the custom id splitting rule.
    pub fn splitter(mut self, splitter: impl IdSplitter) -> Self {
        self.splitter = Arc::new(splitter);
        self
    }

    /// Freezes the registered handlers into a router.
    pub fn build(self) -> InteractionRouter<C> {
        debug!(
            commands = self.commands.list_global().len(),
            guilds = self.commands.guild_ids().count(),
            components = self.components.len(),
            autocomplete = self.autocomplete.len(),
            modal_submits = self.modal_submits.len(),
            "Interaction router built"
        );
        InteractionRouter {
            ctx: self.ctx,
            commands: self.commands,
            components: self.components,
            autocomplete: self.autocomplete,
            modal_submits: self.modal_submits,
            splitter: self.splitter,
        }
    }
}

// =============================================================================
// Router
// =============================================================================

/// Routes interactions to their handlers.
pub struct InteractionRouter<C> {
    ctx: Arc<C>,
    commands: CommandRegistry<C>,
    components: DispatchTable<C, Routed<ComponentInteraction>, ()>,
    autocomplete: DispatchTable<C, CommandInteraction, InteractionResponse>,
    modal_submits: DispatchTable<C, Routed<ModalSubmitInteraction>, ()>,
    splitter: Arc<dyn IdSplitter>,
}

impl<C: Send + Sync + 'static> InteractionRouter<C> {
    /// Starts a builder around the shared context.
    pub fn builder(ctx: C) -> InteractionRouterBuilder<C> {
        InteractionRouterBuilder::new(ctx)
    }

    /// Returns the shared context.
    pub fn context(&self) -> &Arc<C> {
        &self.ctx
    }

    /// Returns the command registry.
    pub fn commands(&self) -> &CommandRegistry<C> {
        &self.commands
    }

    /// Routes a single interaction to its handler and awaits it.
    pub async fn handle(&self, interaction: Interaction) -> Outcome {
        let kind = interaction.kind();
        trace!(kind = %kind, id = %interaction.meta().id, "Routing interaction");

        let (key, dispatch) = match interaction {
            Interaction::Ping(_) => return Outcome::Respond(InteractionResponse::pong()),
            Interaction::ApplicationCommand(cmd) => {
                let key = cmd.name().to_string();
                let dispatch = self.commands.dispatch(self.ctx(), cmd).await;
                (key, dispatch.map(Outcome::Respond))
            }
            Interaction::Autocomplete(cmd) => {
                let key = cmd.name().to_string();
                let dispatch = self.autocomplete.invoke(&key, self.ctx(), cmd).await;
                (key, dispatch.map(Outcome::Respond))
            }
            Interaction::MessageComponent(component) => {
                let id = component.custom_id().to_string();
                let routed = Routed::new(self.splitter.as_ref(), &id, component);
                let key = routed.key.clone();
                let dispatch = self.components.invoke(&key, self.ctx(), routed).await;
                let ack = Outcome::Acknowledged {
                    update_message: true,
                };
                (key, dispatch.map(|()| ack))
            }
            Interaction::ModalSubmit(modal) => {
                let update_message = modal.from_component();
                let id = modal.custom_id().to_string();
                let routed = Routed::new(self.splitter.as_ref(), &id, modal);
                let key = routed.key.clone();
                let dispatch = self.modal_submits.invoke(&key, self.ctx(), routed).await;
                (key, dispatch.map(|()| Outcome::Acknowledged { update_message }))
            }
        };

        match dispatch {
            Dispatch::Found(outcome) => {
                debug!(kind = %kind, key = %key, "Interaction handled");
                outcome
            }
            Dispatch::NotFound => {
                warn!(kind = %kind, key = %key, "No handler for interaction");
                Outcome::Unhandled { kind, key }
            }
        }
    }

    /// Global command descriptors in registration order.
    pub fn list_global(&self) -> Vec<CommandDescriptor> {
        self.commands.list_global()
    }

    /// A guild's command descriptors; empty if the guild is unknown.
    pub fn list_for_guild(&self, guild_id: &str) -> Vec<CommandDescriptor> {
        self.commands.list_for_guild(guild_id)
    }

    /// Every guild's command descriptors keyed by guild id.
    pub fn list_all_guilds(&self) -> BTreeMap<String, Vec<CommandDescriptor>> {
        self.commands.list_all_guilds()
    }

    fn ctx(&self) -> Arc<C> {
        Arc::clone(&self.ctx)
    }
}

impl<C> std::fmt::Debug for InteractionRouter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionRouter")
            .field("commands", &self.commands)
            .field("components", &self.components)
            .field("autocomplete", &self.autocomplete)
            .field("modal_submits", &self.modal_submits)
            .finish_non_exhaustive()
    }
}

//! # Parley Framework
//!
//! The dispatch engine of the Parley interaction gateway.
//!
//! This layer provides:
//! - Handler trait accepting plain async functions and closures
//! - String-keyed dispatch tables with a distinguishable miss outcome
//! - The command registry with per-guild overrides and a built-in `help`
//! - The interaction router, assembled by a builder and frozen before serving
//! - Tracked background tasks for deferred responses
//!
//! Nothing here touches the network; the runtime layer owns the HTTP
//! boundary and the platform client.

pub mod handler;
pub mod help;
pub mod registry;
pub mod router;
pub mod split;
pub mod table;
pub mod task;

pub use handler::{
    AutocompleteHandler, BoxFuture, BoxedHandler, CommandHandler, ComponentHandler, Handler,
    ModalSubmitHandler, into_handler,
};
pub use help::{HELP_HEADING, format_command_set, format_usage};
pub use registry::{CommandCatalog, CommandRegistry, CommandScope};
pub use router::{InteractionRouter, InteractionRouterBuilder, Outcome, UNSUPPORTED_MESSAGE};
pub use split::{DEFAULT_SEPARATOR, IdSplitter, Routed, SeparatorSplitter};
pub use table::{Dispatch, DispatchTable};
pub use task::{BackgroundTask, TaskSpawner};

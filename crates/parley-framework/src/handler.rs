//! Handler system for the Parley framework.
//!
//! A handler is an async function taking the shared application context and
//! an interaction payload, producing the table's output type:
//!
//! ```rust,ignore
//! async fn hello(ctx: Arc<AppContext>, cmd: CommandInteraction) -> InteractionResponse {
//!     InteractionResponse::message(format!("Hello from {}!", ctx.app_name))
//! }
//!
//! async fn counter(ctx: Arc<AppContext>, click: Routed<ComponentInteraction>) {
//!     // acts out of band
//! }
//! ```
//!
//! Any `Fn(Arc<C>, In) -> impl Future<Output = Out>` that is `Send + Sync`
//! implements [`Handler`] through a blanket implementation, so plain async
//! functions and closures can be registered directly. Tables store handlers
//! type-erased as [`BoxedHandler`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::FutureExt;

use parley_core::{
    CommandInteraction, ComponentInteraction, InteractionResponse, ModalSubmitInteraction,
};

use crate::split::Routed;

/// A type alias for a boxed, pinned future that is `Send`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// ============================================================================
// Handler Trait
// ============================================================================

/// The core trait for interaction handlers.
///
/// `C` is the shared context, `In` the payload handed to the handler and
/// `Out` what the handler produces for the router.
pub trait Handler<C, In, Out>: Send + Sync + 'static {
    /// Invokes the handler.
    fn call(&self, ctx: Arc<C>, input: In) -> BoxFuture<'static, Out>;
}

impl<C, In, Out, F, Fut> Handler<C, In, Out> for F
where
    F: Fn(Arc<C>, In) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Out> + Send + 'static,
{
    fn call(&self, ctx: Arc<C>, input: In) -> BoxFuture<'static, Out> {
        (self)(ctx, input).boxed()
    }
}

/// A type-erased handler that can be stored in a table.
pub type BoxedHandler<C, In, Out> = Arc<dyn Handler<C, In, Out>>;

/// Boxes a handler for storage.
pub fn into_handler<C, In, Out, H>(handler: H) -> BoxedHandler<C, In, Out>
where
    H: Handler<C, In, Out>,
{
    Arc::new(handler)
}

// ============================================================================
// Handler kinds
// ============================================================================

/// Handler for application commands.
pub type CommandHandler<C> = BoxedHandler<C, CommandInteraction, InteractionResponse>;

/// Handler for message component interactions; acts out of band.
pub type ComponentHandler<C> = BoxedHandler<C, Routed<ComponentInteraction>, ()>;

/// Handler for autocomplete queries.
pub type AutocompleteHandler<C> = BoxedHandler<C, CommandInteraction, InteractionResponse>;

/// Handler for modal submissions; acts out of band.
pub type ModalSubmitHandler<C> = BoxedHandler<C, Routed<ModalSubmitInteraction>, ()>;

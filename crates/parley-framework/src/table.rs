//! String-keyed dispatch tables.
//!
//! A [`DispatchTable`] maps a routing key to exactly one handler. Keys are
//! case-sensitive and compared by exact equality. Tables are populated during
//! the registration phase and only read afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use parley_core::{RegistrationError, RegistrationResult};

use crate::handler::{BoxedHandler, Handler};

/// Outcome of a table invocation.
///
/// `NotFound` is a normal result, not an error: the caller decides whether a
/// miss is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch<T> {
    /// A handler was found and produced this value.
    Found(T),
    /// No handler is registered for the key.
    NotFound,
}

impl<T> Dispatch<T> {
    /// Returns `true` if a handler ran.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Converts into an `Option`, discarding the distinction's name.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(v) => Some(v),
            Self::NotFound => None,
        }
    }

    /// Maps the found value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Dispatch<U> {
        match self {
            Self::Found(v) => Dispatch::Found(f(v)),
            Self::NotFound => Dispatch::NotFound,
        }
    }
}

/// A registry mapping routing keys to handlers.
pub struct DispatchTable<C, In, Out> {
    /// Label used in error messages and logs.
    name: String,
    handlers: HashMap<String, BoxedHandler<C, In, Out>>,
}

impl<C, In, Out> DispatchTable<C, In, Out> {
    /// Creates an empty table labelled `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: HashMap::new(),
        }
    }

    /// Returns the table label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers `handler` under `key`.
    ///
    /// Fails with [`RegistrationError::DuplicateKey`] if `key` already has a
    /// handler and with [`RegistrationError::EmptyKey`] if `key` is empty.
    pub fn register<H>(&mut self, key: impl Into<String>, handler: H) -> RegistrationResult<()>
    where
        H: Handler<C, In, Out>,
    {
        self.register_boxed(key, Arc::new(handler))
    }

    /// Registers an already boxed handler.
    pub fn register_boxed(
        &mut self,
        key: impl Into<String>,
        handler: BoxedHandler<C, In, Out>,
    ) -> RegistrationResult<()> {
        let key = key.into();
        if key.is_empty() {
            return Err(RegistrationError::EmptyKey);
        }
        if self.handlers.contains_key(&key) {
            return Err(RegistrationError::duplicate_in(key, &self.name));
        }

        debug!(table = %self.name, key = %key, "Registered handler");
        self.handlers.insert(key, handler);
        Ok(())
    }

    /// Looks up the handler for `key`.
    pub fn lookup(&self, key: &str) -> Option<&BoxedHandler<C, In, Out>> {
        self.handlers.get(key)
    }

    /// Returns `true` if `key` has a handler.
    pub fn contains(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    /// Returns the number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Iterates over the registered keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Invokes the handler for `key`.
    ///
    /// Nothing is invoked on a miss.
    pub async fn invoke(&self, key: &str, ctx: Arc<C>, input: In) -> Dispatch<Out>
    where
        C: 'static,
        In: 'static,
        Out: 'static,
    {
        match self.lookup(key) {
            Some(handler) => Dispatch::Found(handler.call(ctx, input).await),
            None => Dispatch::NotFound,
        }
    }
}

impl<C, In, Out> fmt::Debug for DispatchTable<C, In, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("DispatchTable")
            .field("name", &self.name)
            .field("keys", &keys)
            .finish()
    }
}

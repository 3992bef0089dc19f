//! Name-keyed registry of component handlers.
//!
//! One handler per named backend component (e.g. one pub/sub component
//! instance). Entries are added during startup and read on every inbound
//! callback.
//!
//! Implementation details:
//! - Backed by a sharded `DashMap`; no global lock.
//! - Registration is a single insert-if-absent through the entry API, so two
//!   racing registrations for the same name cannot both succeed.
//! - The key is always the handler's own component name, so whatever a
//!   handler advertises under its name is routed back to it.
//! - An entry is never replaced; there is no removal.
//! - `list_all` returns an owned snapshot. Later registrations do not show up
//!   in it.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::RegistryError;

/// A handler bound to one named backend component.
pub trait ComponentHandler {
    /// Name of the component this handler serves.
    fn component_name(&self) -> &str;
}

/// Concurrent table of `component name -> handler`.
///
/// `H` is usually a capability trait object such as
/// `dyn crate::pubsub::PubSubHandler`.
pub struct HandlerRegistry<H: ?Sized> {
    entries: DashMap<String, Arc<H>>,
}

impl<H: ?Sized + ComponentHandler> HandlerRegistry<H> {
    /// Registers `handler` under `name`.
    ///
    /// # Errors
    /// - [`RegistryError::InvalidArgument`] if `name` is empty or blank
    /// - [`RegistryError::NameMismatch`] if `name` is not the handler's
    ///   component name
    /// - [`RegistryError::Duplicate`] if `name` is already registered; the
    ///   existing handler stays in place
    pub fn register(&self, name: impl Into<String>, handler: Arc<H>) -> Result<(), RegistryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::InvalidArgument(
                "component name must not be empty",
            ));
        }
        if handler.component_name() != name {
            return Err(RegistryError::NameMismatch {
                name,
                component: handler.component_name().to_owned(),
            });
        }

        match self.entries.entry(name) {
            Entry::Occupied(existing) => Err(RegistryError::Duplicate {
                name: existing.key().clone(),
            }),
            Entry::Vacant(slot) => {
                tracing::info!(component = %slot.key(), "component handler registered");
                slot.insert(handler);
                Ok(())
            }
        }
    }

    /// Registers `handler` under its own component name.
    ///
    /// # Errors
    /// Same as [`register`](Self::register).
    pub fn register_handler(&self, handler: Arc<H>) -> Result<(), RegistryError> {
        let name = handler.component_name().to_owned();
        self.register(name, handler)
    }
}

impl<H: ?Sized> HandlerRegistry<H> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Returns the handler registered under `name`.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] if nothing is registered under `name`.
    pub fn lookup(&self, name: &str) -> Result<Arc<H>, RegistryError> {
        self.entries
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_owned(),
            })
    }

    /// Point-in-time copy of every registration, sorted by name.
    #[must_use]
    pub fn list_all(&self) -> Vec<(String, Arc<H>)> {
        let mut all: Vec<(String, Arc<H>)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<H: ?Sized> Default for HandlerRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ?Sized> fmt::Debug for HandlerRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.list_all().into_iter().map(|(name, _)| name).collect();
        f.debug_struct("HandlerRegistry")
            .field("components", &names)
            .finish()
    }
}

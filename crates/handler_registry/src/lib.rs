//! # Handler Registry
//!
//! Bookkeeping for in-process event dispatch: which listeners are registered
//! against which event types, at which priority, and which handler lists
//! apply to a given event type once inheritance is taken into account.
//!
//! ## Core Concepts
//!
//! - **Event types** form a single-rooted hierarchy described by an
//!   [`EventTypeIntrospector`] supplied by the host.
//! - **Handler lists** ([`HandlerList`]) hold the [`Registration`]s made
//!   against one event type, bucketed by [`Priority`].
//! - **The event registry** ([`EventRegistry`]) lazily resolves each event
//!   type to the chain of handler lists that apply to it and supports
//!   sweeping registrations out of every list at once.
//!
//! Actually delivering events is left to the caller: walk
//! [`Priority::ALL`] in order and, for each priority, the resolved chain.
//!
//! ## Quick Start
//!
//! ```rust
//! use handler_registry::*;
//! use std::sync::Arc;
//!
//! let types: TypeTable = [
//!     EventTypeDescriptor::new("Event").abstract_type(),
//!     EventTypeDescriptor::new("PlayerEvent").extends("Event").abstract_type(),
//!     EventTypeDescriptor::new("PlayerJoinEvent").extends("PlayerEvent"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let registry = EventRegistry::new(types);
//! let plugin = PluginId::new();
//! let listener = ListenerId::new();
//!
//! let registration = Arc::new(Registration::new(listener, plugin, Priority::Normal));
//! registry.register("PlayerJoinEvent", registration)?;
//!
//! for priority in Priority::ALL {
//!     for reg in registry.listeners_for("PlayerJoinEvent", priority)? {
//!         // deliver to reg.listener()
//!         let _ = reg;
//!     }
//! }
//!
//! // Plugin disabled: drop everything it registered
//! registry.unregister_all_of(plugin);
//! # Ok::<(), RegistryError>(())
//! ```

pub mod error;
pub mod handler_list;
pub mod hierarchy;
pub mod priority;
pub mod protection;
pub mod registration;
pub mod resolver;
pub mod stats;

#[cfg(test)]
mod tests;

pub use error::{RegistryError, Result};
pub use handler_list::{HandlerList, UnregisterTarget};
pub use hierarchy::{
    parse_doc_tags, EventTypeDescriptor, EventTypeIntrospector, TypeTable, ALLOW_HANDLE_TAG,
};
pub use priority::{Priority, UnknownPriority};
pub use protection::{ProtectedZone, SpawnProtectionZone, SpawnWorld, Vec2, Vec3, SPAWN_PROTECT_BYPASS};
pub use registration::{ListenerId, PluginId, Registration, RegistrationId, RegistrationState};
pub use resolver::EventRegistry;
pub use stats::RegistryStats;

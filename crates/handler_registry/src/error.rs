//! Error types for handler registration and event type resolution

use crate::priority::Priority;
use crate::registration::RegistrationId;

/// Errors raised by the handler registry.
///
/// Removal of something that is not registered is never an error; every
/// variant here indicates caller misuse or a malformed event hierarchy.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The event type could not be described by the introspector
    #[error("Cannot introspect event type: {0}")]
    Introspection(String),

    /// The identical registration is already stored in a handler list
    #[error("Registration {id} is already registered to priority {priority} of event {event}")]
    DuplicateRegistration {
        event: String,
        priority: Priority,
        id: RegistrationId,
    },

    /// The registration was unregistered before and cannot be reused
    #[error("Registration {id} has been unregistered and cannot be registered again")]
    RegistrationRetired { id: RegistrationId },

    /// The event type is abstract and does not allow direct handlers
    #[error("Event type {0} is abstract and cannot have handlers registered directly")]
    NotHandleable(String),

    /// The parent chain of an event type loops back onto itself
    #[error("Event type hierarchy is cyclic at: {0}")]
    CyclicHierarchy(String),
}

/// Result type used throughout the registry
pub type Result<T> = std::result::Result<T, RegistryError>;

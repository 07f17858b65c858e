//! # Listener Registrations
//!
//! A [`Registration`] ties one listener to the plugin that owns it and to a
//! priority. Registrations have their own identity: two registrations with
//! the same listener, plugin and priority are still distinct entries.
//!
//! Plugins and listeners are referenced by opaque handles only. The registry
//! compares them for bulk removal and never owns the objects they stand for.

use crate::priority::Priority;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use uuid::Uuid;

macro_rules! identity_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random handle using UUID v4.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

identity_handle!(
    /// Identity of the plugin owning a registration.
    PluginId
);

identity_handle!(
    /// Identity of the listener object a registration delivers to.
    ListenerId
);

static NEXT_REGISTRATION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Registration`], assigned at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegistrationId(pub u64);

impl RegistrationId {
    fn next() -> Self {
        Self(NEXT_REGISTRATION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a registration. `Unregistered` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RegistrationState {
    /// Constructed but not yet stored in any handler list
    Pending = 0,
    Registered = 1,
    Unregistered = 2,
}

impl RegistrationState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => RegistrationState::Pending,
            1 => RegistrationState::Registered,
            _ => RegistrationState::Unregistered,
        }
    }
}

/// One subscription: a listener, its owning plugin and a priority level.
#[derive(Debug)]
pub struct Registration {
    id: RegistrationId,
    listener: ListenerId,
    plugin: PluginId,
    priority_level: i32,
    ignore_cancelled: bool,
    state: AtomicU8,
}

impl Registration {
    /// Creates a registration at a known priority.
    pub fn new(listener: ListenerId, plugin: PluginId, priority: Priority) -> Self {
        Self::with_level(listener, plugin, priority.level())
    }

    /// Creates a registration from a raw priority level.
    ///
    /// Levels that do not map to a [`Priority`] are accepted here and
    /// silently skipped when the registration is registered.
    pub fn with_level(listener: ListenerId, plugin: PluginId, priority_level: i32) -> Self {
        Self {
            id: RegistrationId::next(),
            listener,
            plugin,
            priority_level,
            ignore_cancelled: false,
            state: AtomicU8::new(RegistrationState::Pending as u8),
        }
    }

    /// Marks whether the listener wants to skip cancelled events.
    pub fn ignoring_cancelled(mut self, ignore_cancelled: bool) -> Self {
        self.ignore_cancelled = ignore_cancelled;
        self
    }

    #[inline]
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    #[inline]
    pub fn listener(&self) -> ListenerId {
        self.listener
    }

    #[inline]
    pub fn plugin(&self) -> PluginId {
        self.plugin
    }

    /// The raw priority level this registration was created with.
    #[inline]
    pub fn priority_level(&self) -> i32 {
        self.priority_level
    }

    /// The priority, or `None` if the level is out of range.
    #[inline]
    pub fn priority(&self) -> Option<Priority> {
        Priority::from_level(self.priority_level)
    }

    #[inline]
    pub fn ignore_cancelled(&self) -> bool {
        self.ignore_cancelled
    }

    pub fn state(&self) -> RegistrationState {
        RegistrationState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_registered(&self) -> bool {
        self.state() == RegistrationState::Registered
    }

    /// Pending -> Registered. Returns the state found on failure.
    pub(crate) fn mark_registered(&self) -> Result<(), RegistrationState> {
        self.state
            .compare_exchange(
                RegistrationState::Pending as u8,
                RegistrationState::Registered as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(RegistrationState::from_u8)
    }

    pub(crate) fn mark_unregistered(&self) {
        self.state
            .store(RegistrationState::Unregistered as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_ids_are_unique() {
        let listener = ListenerId::new();
        let plugin = PluginId::new();
        let a = Registration::new(listener, plugin, Priority::Normal);
        let b = Registration::new(listener, plugin, Priority::Normal);

        assert_ne!(a.id(), b.id());
        assert_eq!(a.listener(), b.listener());
        assert_eq!(a.plugin(), b.plugin());
    }

    #[test]
    fn test_out_of_range_level_has_no_priority() {
        let reg = Registration::with_level(ListenerId::new(), PluginId::new(), 17);
        assert_eq!(reg.priority_level(), 17);
        assert_eq!(reg.priority(), None);
    }

    #[test]
    fn test_state_transitions_are_one_way() {
        let reg = Registration::new(ListenerId::new(), PluginId::new(), Priority::High)
            .ignoring_cancelled(true);
        assert!(reg.ignore_cancelled());
        assert_eq!(reg.state(), RegistrationState::Pending);

        assert!(reg.mark_registered().is_ok());
        assert_eq!(reg.mark_registered(), Err(RegistrationState::Registered));

        reg.mark_unregistered();
        assert_eq!(reg.state(), RegistrationState::Unregistered);
        assert_eq!(reg.mark_registered(), Err(RegistrationState::Unregistered));
    }

    #[test]
    fn test_handles_parse_from_display() {
        let plugin = PluginId::new();
        let parsed: PluginId = plugin.to_string().parse().unwrap();
        assert_eq!(parsed, plugin);
        assert!("not-a-uuid".parse::<ListenerId>().is_err());
    }
}

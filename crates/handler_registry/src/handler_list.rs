//! # Handler Lists
//!
//! A [`HandlerList`] stores the registrations made directly against one
//! event type. It holds one bucket per [`Priority`]; every bucket exists for
//! the whole lifetime of the list, empty or not. Within a bucket,
//! registrations keep their insertion order, which is the tie-break used
//! during delivery.
//!
//! Each list guards its buckets with its own lock, so a global sweep over
//! every list never observes a half-mutated bucket.

use crate::error::{RegistryError, Result};
use crate::priority::Priority;
use crate::registration::{ListenerId, PluginId, Registration, RegistrationId, RegistrationState};
use compact_str::CompactString;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, trace};

type Bucket = IndexMap<RegistrationId, Arc<Registration>>;

/// What to remove from a handler list.
#[derive(Debug, Clone, Copy)]
pub enum UnregisterTarget<'a> {
    /// One specific registration
    Registration(&'a Registration),
    /// Every registration owned by the plugin
    Plugin(PluginId),
    /// Every registration delivering to the listener
    Listener(ListenerId),
}

impl<'a> From<&'a Registration> for UnregisterTarget<'a> {
    fn from(registration: &'a Registration) -> Self {
        UnregisterTarget::Registration(registration)
    }
}

impl<'a> From<&'a Arc<Registration>> for UnregisterTarget<'a> {
    fn from(registration: &'a Arc<Registration>) -> Self {
        UnregisterTarget::Registration(registration.as_ref())
    }
}

impl From<PluginId> for UnregisterTarget<'_> {
    fn from(plugin: PluginId) -> Self {
        UnregisterTarget::Plugin(plugin)
    }
}

impl From<ListenerId> for UnregisterTarget<'_> {
    fn from(listener: ListenerId) -> Self {
        UnregisterTarget::Listener(listener)
    }
}

/// Registrations for a single event type, bucketed by priority.
pub struct HandlerList {
    event: CompactString,
    slots: RwLock<[Bucket; Priority::COUNT]>,
}

impl std::fmt::Debug for HandlerList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerList")
            .field("event", &self.event)
            .field("registrations", &self.len())
            .finish()
    }
}

impl HandlerList {
    pub(crate) fn new(event: impl Into<CompactString>) -> Self {
        Self {
            event: event.into(),
            slots: RwLock::new(Default::default()),
        }
    }

    /// Name of the event type this list belongs to.
    #[inline]
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Adds a registration to the bucket of its priority.
    ///
    /// Registrations whose level is not a known [`Priority`] are ignored.
    /// A registration may live in one handler list only and cannot come
    /// back once it has been unregistered.
    pub fn register(&self, registration: Arc<Registration>) -> Result<()> {
        let Some(priority) = registration.priority() else {
            trace!(
                "Ignoring registration {} with unknown priority level {} for {}",
                registration.id(),
                registration.priority_level(),
                self.event
            );
            return Ok(());
        };

        let mut slots = self.slots.write();
        let bucket = &mut slots[priority.index()];
        if bucket.contains_key(&registration.id()) {
            return Err(self.duplicate(&registration, priority));
        }

        match registration.mark_registered() {
            Ok(()) => {}
            Err(RegistrationState::Unregistered) => {
                return Err(RegistryError::RegistrationRetired {
                    id: registration.id(),
                })
            }
            Err(_) => return Err(self.duplicate(&registration, priority)),
        }

        debug!(
            "📝 Registered {} for {} at {}",
            registration.id(),
            self.event,
            priority
        );
        bucket.insert(registration.id(), registration);
        Ok(())
    }

    /// Registers each item in order. Items before a failing one stay registered.
    pub fn register_all<I>(&self, registrations: I) -> Result<()>
    where
        I: IntoIterator<Item = Arc<Registration>>,
    {
        for registration in registrations {
            self.register(registration)?;
        }
        Ok(())
    }

    /// Removes the matching registrations and returns how many were removed.
    ///
    /// Removing something that is not present is a no-op.
    pub fn unregister<'a>(&self, target: impl Into<UnregisterTarget<'a>>) -> usize {
        let mut slots = self.slots.write();
        let removed = match target.into() {
            UnregisterTarget::Registration(registration) => {
                let Some(priority) = registration.priority() else {
                    return 0;
                };
                match slots[priority.index()].shift_remove(&registration.id()) {
                    Some(removed) => {
                        removed.mark_unregistered();
                        1
                    }
                    None => 0,
                }
            }
            UnregisterTarget::Plugin(plugin) => {
                Self::retain_each(&mut slots, |r| r.plugin() != plugin)
            }
            UnregisterTarget::Listener(listener) => {
                Self::retain_each(&mut slots, |r| r.listener() != listener)
            }
        };

        if removed > 0 {
            debug!("🗑️ Removed {} registrations from {}", removed, self.event);
        }
        removed
    }

    /// Empties every bucket.
    pub fn clear(&self) -> usize {
        let mut slots = self.slots.write();
        let mut removed = 0;
        for bucket in slots.iter_mut() {
            removed += bucket.len();
            for (_, registration) in bucket.drain(..) {
                registration.mark_unregistered();
            }
        }
        removed
    }

    /// Snapshot of the registrations at `priority`, in insertion order.
    pub fn listeners_at(&self, priority: Priority) -> Vec<Arc<Registration>> {
        self.slots.read()[priority.index()]
            .values()
            .cloned()
            .collect()
    }

    /// Whether the given registration is stored in this list.
    pub fn contains(&self, registration: &Registration) -> bool {
        registration
            .priority()
            .is_some_and(|p| self.slots.read()[p.index()].contains_key(&registration.id()))
    }

    /// Total number of registrations across all priorities.
    pub fn len(&self) -> usize {
        self.slots.read().iter().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().iter().all(IndexMap::is_empty)
    }

    fn retain_each(
        slots: &mut [Bucket; Priority::COUNT],
        keep: impl Fn(&Registration) -> bool,
    ) -> usize {
        let mut removed = 0;
        for bucket in slots.iter_mut() {
            bucket.retain(|_, registration| {
                if keep(registration.as_ref()) {
                    true
                } else {
                    registration.mark_unregistered();
                    removed += 1;
                    false
                }
            });
        }
        removed
    }

    fn duplicate(&self, registration: &Registration, priority: Priority) -> RegistryError {
        RegistryError::DuplicateRegistration {
            event: self.event.to_string(),
            priority,
            id: registration.id(),
        }
    }
}

//! # Event Registry
//!
//! [`EventRegistry`] is the dispatch context: it owns every handler list
//! and the memo table that maps an event type to the chain of handler lists
//! that apply to it.
//!
//! ## Resolution
//!
//! The first time an event type is asked for, its parent is resolved first
//! (memoized the same way), then the type gets a handler list of its own
//! unless it is abstract without an `@allowHandle` override. The type's
//! chain is its own list followed by the parent's chain. Abstract types
//! never appear in a chain, so descendants skip straight to the nearest
//! ancestor that can hold handlers.
//!
//! Chains are snapshots. Once stored they never change, and handler lists
//! are never dropped from the registry.
//!
//! ## Concurrency
//!
//! The memo table is held under one lock for the whole of a resolution, so
//! two threads resolving the same new type cannot both construct a list for
//! it. Handler lists carry their own locks; global sweeps take a snapshot of
//! the list collection and lock each list in turn.

use crate::error::{RegistryError, Result};
use crate::handler_list::{HandlerList, UnregisterTarget};
use crate::hierarchy::EventTypeIntrospector;
use crate::priority::Priority;
use crate::registration::Registration;
use crate::stats::RegistryStats;
use compact_str::CompactString;
use parking_lot::{Mutex, RwLock};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

type Chain = SmallVec<[Arc<HandlerList>; 4]>;

/// Memoized resolution of one event type.
#[derive(Clone)]
struct ResolverEntry {
    /// The type's own list, `None` when the type cannot hold handlers
    own: Option<Arc<HandlerList>>,
    /// Own list (if any) followed by the nearest handle-able ancestor's chain
    chain: Chain,
}

/// Process-lifetime registry of handler lists for an event type hierarchy.
pub struct EventRegistry<I: EventTypeIntrospector> {
    introspector: I,
    class_map: Mutex<HashMap<CompactString, ResolverEntry>>,
    all_lists: RwLock<Vec<Arc<HandlerList>>>,
}

impl<I: EventTypeIntrospector> std::fmt::Debug for EventRegistry<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("resolved_types", &self.class_map.lock().len())
            .field("handler_lists", &self.all_lists.read().len())
            .finish()
    }
}

impl<I: EventTypeIntrospector> EventRegistry<I> {
    /// Creates an empty registry backed by `introspector`.
    pub fn new(introspector: I) -> Self {
        Self {
            introspector,
            class_map: Mutex::new(HashMap::new()),
            all_lists: RwLock::new(Vec::new()),
        }
    }

    pub fn introspector(&self) -> &I {
        &self.introspector
    }

    /// Returns the handler list for listeners that handle `event` directly.
    ///
    /// `Ok(None)` means the type is abstract and holds no handlers itself.
    /// Resolving also memoizes the chains of all of the type's ancestors.
    pub fn resolve(&self, event: &str) -> Result<Option<Arc<HandlerList>>> {
        self.entry(event).map(|entry| entry.own)
    }

    /// Returns every handler list that applies to `event`, the type's own
    /// list first, then its ancestors' nearest first.
    pub fn resolve_chain(&self, event: &str) -> Result<Vec<Arc<HandlerList>>> {
        self.entry(event).map(|entry| entry.chain.into_vec())
    }

    /// Chain for `event` if it was already resolved, empty otherwise.
    pub fn cached_chain(&self, event: &str) -> Vec<Arc<HandlerList>> {
        self.class_map
            .lock()
            .get(event)
            .map(|entry| entry.chain.to_vec())
            .unwrap_or_default()
    }

    pub fn is_resolved(&self, event: &str) -> bool {
        self.class_map.lock().contains_key(event)
    }

    /// Registers `registration` against the handler list of `event`.
    ///
    /// Fails with [`RegistryError::NotHandleable`] for abstract types
    /// without an `@allowHandle` override.
    pub fn register(&self, event: &str, registration: Arc<Registration>) -> Result<()> {
        match self.resolve(event)? {
            Some(list) => list.register(registration),
            None => Err(RegistryError::NotHandleable(event.to_string())),
        }
    }

    /// Registrations at `priority` across the resolved chain of `event`,
    /// the type's own registrations first.
    pub fn listeners_for(&self, event: &str, priority: Priority) -> Result<Vec<Arc<Registration>>> {
        Ok(self
            .entry(event)?
            .chain
            .iter()
            .flat_map(|list| list.listeners_at(priority))
            .collect())
    }

    /// Every handler list constructed so far.
    pub fn handler_lists(&self) -> Vec<Arc<HandlerList>> {
        self.all_lists.read().clone()
    }

    /// Empties every handler list ever constructed.
    pub fn unregister_all(&self) -> usize {
        let removed: usize = self.handler_lists().iter().map(|list| list.clear()).sum();
        info!("🧹 Cleared {} registrations from all handler lists", removed);
        removed
    }

    /// Removes the matching registrations from every handler list.
    pub fn unregister_all_of<'a>(&self, target: impl Into<UnregisterTarget<'a>>) -> usize {
        let target = target.into();
        let removed: usize = self
            .handler_lists()
            .iter()
            .map(|list| list.unregister(target))
            .sum();
        if removed > 0 {
            info!("🧹 Removed {} registrations matching {:?}", removed, target);
        }
        removed
    }

    pub fn stats(&self) -> RegistryStats {
        let resolved_types = self.class_map.lock().len();
        let lists = self.handler_lists();
        RegistryStats {
            handler_lists: lists.len(),
            resolved_types,
            registrations: lists.iter().map(|list| list.len()).sum(),
        }
    }

    fn entry(&self, event: &str) -> Result<ResolverEntry> {
        let mut class_map = self.class_map.lock();
        let mut visiting = Vec::new();
        self.resolve_locked(&mut class_map, event, &mut visiting)
    }

    fn resolve_locked(
        &self,
        class_map: &mut HashMap<CompactString, ResolverEntry>,
        event: &str,
        visiting: &mut Vec<CompactString>,
    ) -> Result<ResolverEntry> {
        if let Some(entry) = class_map.get(event) {
            return Ok(entry.clone());
        }
        if visiting.iter().any(|name| name.as_str() == event) {
            return Err(RegistryError::CyclicHierarchy(event.to_string()));
        }

        let descriptor = self.introspector.describe(event)?;

        visiting.push(CompactString::new(event));
        let parent_chain = match descriptor.parent.as_deref() {
            Some(parent) => self.resolve_locked(class_map, parent, visiting).map(|e| e.chain),
            None => Ok(Chain::new()),
        };
        visiting.pop();
        let parent_chain = parent_chain?;

        let own = descriptor.allows_handle().then(|| {
            let list = Arc::new(HandlerList::new(event));
            self.all_lists.write().push(list.clone());
            debug!("📋 Created handler list for {}", event);
            list
        });

        let mut chain = Chain::with_capacity(parent_chain.len() + 1);
        chain.extend(own.iter().cloned());
        chain.extend(parent_chain);

        let entry = ResolverEntry { own, chain };
        class_map.insert(CompactString::new(event), entry.clone());
        Ok(entry)
    }
}

//! # Event Type Hierarchy
//!
//! The registry never inspects event types itself. It asks an
//! [`EventTypeIntrospector`] for a description of each type: whether it is
//! abstract, its documentation tags and its parent. [`TypeTable`] is the
//! in-memory provider most hosts use; anything else that can answer those
//! questions can stand in for it.

use crate::error::{RegistryError, Result};
use compact_str::CompactString;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Doc tag that lets an abstract event type own a handler list.
pub const ALLOW_HANDLE_TAG: &str = "allowHandle";

/// Everything the resolver needs to know about one event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypeDescriptor {
    pub name: CompactString,
    /// `None` for the root of the hierarchy
    #[serde(default)]
    pub parent: Option<CompactString>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Raw documentation comment, parsed for `@tag` lines
    #[serde(default)]
    pub doc: Option<String>,
}

impl EventTypeDescriptor {
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            is_abstract: false,
            doc: None,
        }
    }

    pub fn extends(mut self, parent: impl Into<CompactString>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn tags(&self) -> HashMap<String, String> {
        self.doc.as_deref().map(parse_doc_tags).unwrap_or_default()
    }

    /// Whether listeners may register against this type directly.
    ///
    /// Concrete types always may. Abstract types only when they carry an
    /// `@allowHandle` tag whose value is anything but `false`.
    pub fn allows_handle(&self) -> bool {
        if !self.is_abstract {
            return true;
        }
        self.tags()
            .get(ALLOW_HANDLE_TAG)
            .is_some_and(|value| value != "false")
    }
}

/// Parses `@tag value` lines out of a documentation comment.
///
/// Lines may be prefixed by whitespace and a `*`. A tag without a value
/// maps to an empty string. Later occurrences of a tag win.
pub fn parse_doc_tags(doc: &str) -> HashMap<String, String> {
    let mut tags = HashMap::new();
    for line in doc.lines() {
        let line = line.trim_start();
        let line = line.strip_prefix('*').unwrap_or(line).trim_start();
        let Some(rest) = line.strip_prefix('@') else {
            continue;
        };

        let name_len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        if name_len == 0 {
            continue;
        }
        let (name, value) = rest.split_at(name_len);
        if !value.is_empty() && !value.starts_with([' ', '\t']) {
            continue;
        }
        tags.insert(name.to_string(), value.trim().to_string());
    }
    tags
}

/// Source of event type descriptions for the resolver.
pub trait EventTypeIntrospector: Send + Sync {
    /// Describes `name`, failing with [`RegistryError::Introspection`] for
    /// types it does not know.
    fn describe(&self, name: &str) -> Result<EventTypeDescriptor>;
}

impl<T: EventTypeIntrospector + ?Sized> EventTypeIntrospector for &T {
    fn describe(&self, name: &str) -> Result<EventTypeDescriptor> {
        (**self).describe(name)
    }
}

impl<T: EventTypeIntrospector + ?Sized> EventTypeIntrospector for Arc<T> {
    fn describe(&self, name: &str) -> Result<EventTypeDescriptor> {
        (**self).describe(name)
    }
}

/// In-memory table of event type descriptions keyed by name.
#[derive(Debug, Default, Clone)]
pub struct TypeTable {
    types: DashMap<CompactString, EventTypeDescriptor>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a type description.
    pub fn insert(&self, descriptor: EventTypeDescriptor) -> Option<EventTypeDescriptor> {
        self.types.insert(descriptor.name.clone(), descriptor)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Names of every known type, sorted.
    pub fn names(&self) -> Vec<CompactString> {
        let mut names: Vec<_> = self.types.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl EventTypeIntrospector for TypeTable {
    fn describe(&self, name: &str) -> Result<EventTypeDescriptor> {
        self.types
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RegistryError::Introspection(name.to_string()))
    }
}

impl FromIterator<EventTypeDescriptor> for TypeTable {
    fn from_iter<I: IntoIterator<Item = EventTypeDescriptor>>(iter: I) -> Self {
        let mut table = TypeTable::new();
        table.extend(iter);
        table
    }
}

impl Extend<EventTypeDescriptor> for TypeTable {
    fn extend<I: IntoIterator<Item = EventTypeDescriptor>>(&mut self, iter: I) {
        for descriptor in iter {
            self.insert(descriptor);
        }
    }
}

impl<'de> Deserialize<'de> for TypeTable {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Vec::<EventTypeDescriptor>::deserialize(deserializer).map(TypeTable::from_iter)
    }
}

//! Tests for resolution and registration across the whole registry

use crate::*;
use std::sync::Arc;

fn hierarchy() -> TypeTable {
    [
        EventTypeDescriptor::new("Root"),
        EventTypeDescriptor::new("Mid").extends("Root").abstract_type(),
        EventTypeDescriptor::new("Leaf").extends("Mid"),
        EventTypeDescriptor::new("Handled")
            .extends("Root")
            .abstract_type()
            .with_doc("/**\n * @allowHandle\n */"),
        EventTypeDescriptor::new("HandledLeaf").extends("Handled"),
    ]
    .into_iter()
    .collect()
}

fn registration(plugin: PluginId, listener: ListenerId, priority: Priority) -> Arc<Registration> {
    Arc::new(Registration::new(listener, plugin, priority))
}

fn events(chain: &[Arc<HandlerList>]) -> Vec<&str> {
    chain.iter().map(|list| list.event()).collect()
}

#[test_log::test]
fn test_resolving_twice_returns_same_list() {
    let registry = EventRegistry::new(hierarchy());
    let first = registry.resolve("Leaf").unwrap().unwrap();
    let second = registry.resolve("Leaf").unwrap().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.handler_lists().len(), 2);
}

#[test_log::test]
fn test_abstract_type_is_skipped_in_chain() {
    let registry = EventRegistry::new(hierarchy());

    let leaf_chain = registry.resolve_chain("Leaf").unwrap();
    assert_eq!(events(&leaf_chain), vec!["Leaf", "Root"]);

    assert!(registry.resolve("Mid").unwrap().is_none());
    let mid_chain = registry.resolve_chain("Mid").unwrap();
    assert_eq!(events(&mid_chain), vec!["Root"]);
    assert!(Arc::ptr_eq(&mid_chain[0], &leaf_chain[1]));
}

#[test]
fn test_allow_handle_override_gets_own_list() {
    let registry = EventRegistry::new(hierarchy());
    let chain = registry.resolve_chain("HandledLeaf").unwrap();
    assert_eq!(events(&chain), vec!["HandledLeaf", "Handled", "Root"]);
}

#[test]
fn test_cached_chain_is_a_snapshot() {
    let registry = EventRegistry::new(hierarchy());
    let before = registry.resolve_chain("Root").unwrap();

    registry.resolve_chain("Leaf").unwrap();
    registry.resolve_chain("HandledLeaf").unwrap();

    let after = registry.cached_chain("Root");
    assert_eq!(after.len(), 1);
    assert!(Arc::ptr_eq(&before[0], &after[0]));
    assert!(registry.cached_chain("Unresolved").is_empty());
}

#[test_log::test]
fn test_registered_listener_only_in_its_priority() {
    let registry = EventRegistry::new(hierarchy());
    let list = registry.resolve("Root").unwrap().unwrap();
    let reg = registration(PluginId::new(), ListenerId::new(), Priority::Normal);
    list.register(reg.clone()).unwrap();

    let normal = list.listeners_at(Priority::Normal);
    assert_eq!(normal.len(), 1);
    assert_eq!(normal[0].id(), reg.id());
    for priority in Priority::ALL {
        if priority != Priority::Normal {
            assert!(list.listeners_at(priority).is_empty());
        }
    }
}

#[test]
fn test_duplicate_leaves_single_copy() {
    let registry = EventRegistry::new(hierarchy());
    let reg = registration(PluginId::new(), ListenerId::new(), Priority::High);
    registry.register("Leaf", reg.clone()).unwrap();

    assert!(matches!(
        registry.register("Leaf", reg.clone()),
        Err(RegistryError::DuplicateRegistration { .. })
    ));
    assert_eq!(registry.listeners_for("Leaf", Priority::High).unwrap().len(), 1);
}

#[test_log::test]
fn test_unregister_plugin_across_lists_and_priorities() {
    let registry = EventRegistry::new(hierarchy());
    let plugin_a = PluginId::new();
    let plugin_b = PluginId::new();

    let mut owned_by_a = Vec::new();
    let mut owned_by_b = Vec::new();
    for (i, event) in ["Root", "Leaf", "HandledLeaf", "Handled"].iter().enumerate() {
        for priority in Priority::ALL {
            let a = registration(plugin_a, ListenerId::new(), priority);
            let b = registration(plugin_b, ListenerId::new(), priority);
            // interleave insertion order between plugins
            if i % 2 == 0 {
                registry.register(event, a.clone()).unwrap();
                registry.register(event, b.clone()).unwrap();
            } else {
                registry.register(event, b.clone()).unwrap();
                registry.register(event, a.clone()).unwrap();
            }
            owned_by_a.push(a);
            owned_by_b.push(b);
        }
    }

    assert_eq!(registry.unregister_all_of(plugin_a), owned_by_a.len());
    assert!(owned_by_a.iter().all(|r| !r.is_registered()));
    assert!(owned_by_b.iter().all(|r| r.is_registered()));
    for list in registry.handler_lists() {
        for priority in Priority::ALL {
            assert!(list
                .listeners_at(priority)
                .iter()
                .all(|r| r.plugin() == plugin_b));
        }
    }
}

#[test]
fn test_unregister_listener_across_lists() {
    let registry = EventRegistry::new(hierarchy());
    let plugin = PluginId::new();
    let listener = ListenerId::new();
    let other = registration(plugin, ListenerId::new(), Priority::Low);

    registry.register("Root", registration(plugin, listener, Priority::Low)).unwrap();
    registry.register("Leaf", registration(plugin, listener, Priority::Monitor)).unwrap();
    registry.register("Leaf", other.clone()).unwrap();

    assert_eq!(registry.unregister_all_of(listener), 2);
    assert_eq!(registry.stats().registrations, 1);
    assert!(other.is_registered());
}

#[test_log::test]
fn test_unregister_all_empties_every_list() {
    let registry = EventRegistry::new(hierarchy());
    let plugin = PluginId::new();
    for event in ["Root", "Leaf", "HandledLeaf"] {
        registry
            .register(event, registration(plugin, ListenerId::new(), Priority::Highest))
            .unwrap();
    }
    // resolved lists that nobody holds on to are still swept
    registry.resolve("Handled").unwrap();

    assert_eq!(registry.unregister_all(), 3);
    for list in registry.handler_lists() {
        for priority in Priority::ALL {
            assert!(list.listeners_at(priority).is_empty());
        }
    }
    assert_eq!(registry.stats().handler_lists, 4);
}

#[test]
fn test_unregister_is_idempotent_for_every_target() {
    let registry = EventRegistry::new(hierarchy());
    let plugin = PluginId::new();
    let listener = ListenerId::new();
    let reg = registration(plugin, listener, Priority::Normal);
    registry.register("Root", reg.clone()).unwrap();

    assert_eq!(registry.unregister_all_of(&reg), 1);
    assert_eq!(registry.unregister_all_of(&reg), 0);
    assert_eq!(registry.unregister_all_of(plugin), 0);
    assert_eq!(registry.unregister_all_of(plugin), 0);
    assert_eq!(registry.unregister_all_of(listener), 0);
    assert_eq!(registry.unregister_all_of(listener), 0);
    assert_eq!(registry.unregister_all(), 0);
}

#[test]
fn test_inherited_visibility_is_one_way() {
    let types: TypeTable = [
        EventTypeDescriptor::new("A"),
        EventTypeDescriptor::new("B").extends("A"),
    ]
    .into_iter()
    .collect();
    let registry = EventRegistry::new(types);
    let plugin = PluginId::new();

    let x = registration(plugin, ListenerId::new(), Priority::Normal);
    registry.register("A", x.clone()).unwrap();
    let b_only = registration(plugin, ListenerId::new(), Priority::Normal);
    registry.register("B", b_only.clone()).unwrap();

    let seen_by_b: Vec<_> = registry
        .resolve_chain("B")
        .unwrap()
        .iter()
        .flat_map(|list| list.listeners_at(Priority::Normal))
        .map(|r| r.id())
        .collect();
    assert_eq!(seen_by_b, vec![b_only.id(), x.id()]);

    let seen_by_a: Vec<_> = registry
        .listeners_for("A", Priority::Normal)
        .unwrap()
        .iter()
        .map(|r| r.id())
        .collect();
    assert_eq!(seen_by_a, vec![x.id()]);
}

#[test]
fn test_concurrent_first_resolution_builds_one_list() {
    let registry = Arc::new(EventRegistry::new(hierarchy()));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            std::thread::spawn(move || registry.resolve("Leaf").unwrap().unwrap())
        })
        .collect();
    let lists: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(lists.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(registry.handler_lists().len(), 2);
}

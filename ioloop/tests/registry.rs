mod common;

use common::{MockConn, entries, log};
use ioloop::{Descriptors, Registry};

#[test]
fn test_insert_prepends() {
    let log = log();
    let mut registry = Registry::new();

    let a = registry.insert(MockConn::new("a", &log));
    let b = registry.insert(MockConn::new("b", &log));
    let c = registry.insert(MockConn::new("c", &log));

    assert_eq!(registry.len(), 3);
    assert_eq!(registry.ids().collect::<Vec<_>>(), vec![c, b, a]);
}

#[test]
fn test_remove_by_identity() {
    let log = log();
    let mut registry = Registry::new();

    let a = registry.insert(MockConn::new("a", &log));
    let b = registry.insert(MockConn::new("b", &log));

    let removed = registry.remove(a).expect("a should be registered");
    drop(removed);

    assert!(!registry.contains(a));
    assert!(registry.contains(b));
    assert_eq!(registry.ids().collect::<Vec<_>>(), vec![b]);
    assert_eq!(entries(&log), vec!["a:drop"]);

    assert!(registry.remove(a).is_none());
}

#[test]
fn test_removed_identity_is_never_resurrected() {
    let log = log();
    let mut registry = Registry::new();

    let old = registry.insert(MockConn::new("old", &log));
    registry.remove(old);

    // Reuses the vacated slot.
    let new = registry.insert(MockConn::new("new", &log));

    assert_ne!(old, new);
    assert!(!registry.contains(old));
    assert!(registry.get(old).is_none());
    assert!(registry.get(new).is_some());
}

#[test]
fn test_empty_registry() {
    let registry = Registry::default();

    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
    assert_eq!(registry.ids().count(), 0);
}

#[test]
fn test_disable_fd_affects_every_holder() {
    let log = log();
    let mut registry = Registry::new();

    let a = registry.insert(MockConn::new("a", &log).fds(200, 200));
    let b = registry.insert(MockConn::new("b", &log).fds(201, 200));
    let c = registry.insert(MockConn::new("c", &log).fds(202, 203));

    assert_eq!(registry.disable_fd(200), 2);

    let descriptors = |id| registry.get(id).map(|c| *c.descriptors());
    assert_eq!(descriptors(a), Some(Descriptors::disabled()));
    assert_eq!(descriptors(b), Some(Descriptors::new(201, -1)));
    assert_eq!(descriptors(c), Some(Descriptors::new(202, 203)));
}

#[test]
fn test_get_mut_allows_disabling_descriptors() {
    let log = log();
    let mut registry = Registry::new();

    let a = registry.insert(MockConn::new("a", &log).fds(210, 211));
    registry
        .get_mut(a)
        .expect("a should be registered")
        .descriptors_mut()
        .disable_write();

    assert_eq!(
        registry.get(a).map(|c| *c.descriptors()),
        Some(Descriptors::new(210, -1))
    );
}

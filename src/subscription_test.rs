use super::*;

#[test]
fn new_set_is_empty() {
    let kinds = SyncKinds::new();
    assert!(kinds.is_empty());
    assert!(!kinds.contains(EventKind::Change));
}

#[test]
fn add_is_idempotent_and_codes_are_sorted() {
    let mut kinds = SyncKinds::new();
    kinds.add(&[EventKind::KeyUp, EventKind::Change]);
    kinds.add(&[EventKind::Change, EventKind::Click]);
    assert_eq!(kinds.codes(), vec![0, 9, 11]);
}

#[test]
fn remove_drops_membership() {
    let mut kinds: SyncKinds = [EventKind::Change, EventKind::KeyUp].into_iter().collect();
    kinds.remove(&[EventKind::KeyUp]);
    assert!(kinds.contains(EventKind::Change));
    assert!(!kinds.contains(EventKind::KeyUp));
}

#[test]
fn subscribed_policy_requires_membership() {
    let kinds: SyncKinds = [EventKind::Change].into_iter().collect();
    assert!(SyncPolicy::Subscribed.admits(&kinds, EventKind::Change));
    assert!(!SyncPolicy::Subscribed.admits(&kinds, EventKind::KeyUp));
}

#[test]
fn always_policy_admits_everything() {
    let kinds = SyncKinds::new();
    for kind in EventKind::ALL {
        assert!(SyncPolicy::Always.admits(&kinds, kind));
    }
}

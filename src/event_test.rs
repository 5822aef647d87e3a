use super::*;

#[test]
fn codes_follow_declaration_order() {
    for (i, kind) in EventKind::ALL.iter().enumerate() {
        assert_eq!(usize::from(kind.code()), i, "code mismatch for {kind}");
        assert_eq!(EventKind::from_code(kind.code()), Some(*kind));
    }
}

#[test]
fn change_is_code_eleven() {
    assert_eq!(EventKind::Change.code(), 11);
    assert_eq!(EventKind::KeyUp.code(), 9);
    assert_eq!(EventKind::Blur.code(), 10);
}

#[test]
fn unknown_code_is_rejected() {
    assert_eq!(EventKind::from_code(13), None);
    assert_eq!(EventKind::try_from(200), Err(UnknownEventKind(200)));
}

#[test]
fn serializes_as_wire_code() {
    let json = serde_json::to_string(&EventKind::KeyUp).unwrap();
    assert_eq!(json, "9");
    let kind: EventKind = serde_json::from_str("11").unwrap();
    assert_eq!(kind, EventKind::Change);
    assert!(serde_json::from_str::<EventKind>("42").is_err());
}

#[test]
fn display_uses_dom_name() {
    assert_eq!(EventKind::DblClick.to_string(), "dblclick");
    assert_eq!(EventKind::Change.to_string(), "change");
}

use serde_json::json;
use wiki_domain::{NewAttachment, NewPage, NewPermission, NewSpace, NewUser, PageStatus, PermissionOp, SubjectKind};

#[test]
fn test_new_user_roundtrip_and_defaults() {
    // `active` defaults to true when absent from the payload
    let u: NewUser = serde_json::from_value(json!({
        "username": "ana",
        "email": "ana@wiki.local"
    })).unwrap();
    assert!(u.active);
    assert!(u.display_name.is_none());
    assert!(u.validate().is_ok());
}

#[test]
fn test_new_user_rejects_bad_email() {
    let u: NewUser = serde_json::from_value(json!({
        "username": "ana",
        "email": "sin-arroba"
    })).unwrap();
    assert!(u.validate().is_err());
}

#[test]
fn test_space_key_normalization() {
    let s: NewSpace = serde_json::from_value(json!({
        "key": "docs_2",
        "name": "Documentación"
    })).unwrap();
    assert!(s.validate().is_ok());
    assert_eq!(s.normalized_key(), "DOCS_2");
}

#[test]
fn test_page_status_defaults_to_draft() {
    let p: NewPage = serde_json::from_value(json!({
        "space_id": "1",
        "title": "Bienvenida"
    })).unwrap();
    assert_eq!(p.status, PageStatus::Draft);
    assert!(p.validate().is_ok());
}

#[test]
fn test_page_status_transitions_are_monotonic() {
    // draft -> published -> archived; nunca hacia atrás
    assert!(PageStatus::Draft.can_transition(PageStatus::Published));
    assert!(PageStatus::Draft.can_transition(PageStatus::Archived));
    assert!(!PageStatus::Published.can_transition(PageStatus::Draft));
    assert!(!PageStatus::Archived.can_transition(PageStatus::Published));
}

#[test]
fn test_attachment_digest_matches_known_vector() {
    let a: NewAttachment = serde_json::from_value(json!({
        "page_id": "1",
        "filename": "hello.txt",
        "content": "abc"
    })).unwrap();
    assert!(a.validate().is_ok());
    // sha256("abc")
    assert_eq!(a.content_sha256(),
               "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    assert_eq!(a.media_type, "application/octet-stream");
}

#[test]
fn test_permission_deserializes_lowercase_tags() {
    let p: NewPermission = serde_json::from_value(json!({
        "subject_kind": "user",
        "subject_id": "3",
        "target_entity_type": "page",
        "target_entity_id": "9",
        "operation": "admin"
    })).unwrap();
    assert_eq!(p.subject_kind, SubjectKind::User);
    assert_eq!(p.operation, PermissionOp::Admin);
    assert!(p.validate().is_ok());
}

use cachet_types::{Method, PendingRequest, Record, Request};
use pretty_assertions::assert_eq;

// ── Method ───────────────────────────────────────────────────────

#[test]
fn method_tags() {
    assert_eq!(u8::from(Method::Get), 1);
    assert_eq!(u8::from(Method::Put), 2);
    assert_eq!(u8::from(Method::Delete), 3);
}

#[test]
fn method_rejects_unknown_tag() {
    assert!(Method::try_from(0).is_err());
    assert!(Method::try_from(4).is_err());
}

#[test]
fn method_is_mutation() {
    assert!(!Method::Get.is_mutation());
    assert!(Method::Put.is_mutation());
    assert!(Method::Delete.is_mutation());
}

#[test]
fn method_display() {
    assert_eq!(Method::Delete.to_string(), "DELETE");
}

// ── Request builders ─────────────────────────────────────────────

#[test]
fn put_request_carries_value() {
    let req = Request::put("notes", "a", "hello");
    assert_eq!(req.method, Method::Put);
    assert_eq!(req.object.value(), Some("hello"));
    assert!(req.fallback.is_none());
    assert!(!req.force);
}

#[test]
fn builder_sets_fallback_token_force() {
    let req = Request::delete("notes", "a")
        .with_fallback(Record::new("notes", "a", "old"))
        .with_token(Some("tok".into()))
        .with_force(true);
    assert_eq!(req.fallback.unwrap().value(), Some("old"));
    assert_eq!(req.access_token.as_deref(), Some("tok"));
    assert!(req.force);
}

// ── Durable form ─────────────────────────────────────────────────

#[test]
fn pending_request_wire_shape() {
    let req = Request::put("notes", "a", "v2")
        .with_fallback(Record::new("notes", "a", "v1"))
        .with_token(Some("tok".into()));
    let json = serde_json::to_value(PendingRequest::from(req)).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "method": 2,
            "force": false,
            "object": {"collection": "notes", "key": "a", "value": "v2"},
            "fallback": {"collection": "notes", "key": "a", "value": "v1"},
            "accessToken": "tok"
        })
    );
}

#[test]
fn pending_request_reads_null_fallback_and_token() {
    let json = r#"{"method":1,"force":true,"object":{"collection":"c","key":"k","value":null},"fallback":null,"accessToken":null}"#;
    let pending: PendingRequest = serde_json::from_str(json).unwrap();
    assert_eq!(pending.method, Method::Get);
    assert!(pending.force);
    assert!(pending.fallback.is_none());
    assert!(pending.access_token.is_none());
}

#[test]
fn pending_request_rejects_bad_method() {
    let json = r#"{"method":9,"object":{"collection":"c","key":"k"}}"#;
    assert!(serde_json::from_str::<PendingRequest>(json).is_err());
}

#[test]
fn request_survives_durable_form() {
    let req = Request::delete("c", "k")
        .with_fallback(Record::empty("c", "k"))
        .with_force(true);
    let back: Request = PendingRequest::from(req.clone()).into();
    assert_eq!(back, req);
}

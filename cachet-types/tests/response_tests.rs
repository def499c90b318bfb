use cachet_types::{Record, Response, StoreError};

fn record() -> Record {
    Record::new("notes", "a", "v")
}

#[test]
fn success_predicates() {
    let resp = Response::success(record());
    assert!(resp.is_success());
    assert!(!resp.is_failure());
    assert!(!resp.is_pending());
    assert_eq!(resp.key(), "a");
    assert_eq!(resp.value(), Some("v"));
}

#[test]
fn failure_classification() {
    let cases = [
        (StoreError::NotModified, "not_modified"),
        (StoreError::NotFound, "not_found"),
        (StoreError::PreconditionFailed, "precondition"),
        (StoreError::Unauthorized, "unauthorized"),
    ];
    for (err, name) in cases {
        let resp = Response::failure(record(), err);
        assert!(resp.is_failure(), "{name}");
        assert_eq!(resp.is_not_modified(), name == "not_modified");
        assert_eq!(resp.is_not_found(), name == "not_found");
        assert_eq!(resp.has_precondition_failed(), name == "precondition");
        assert_eq!(resp.is_unauthorized(), name == "unauthorized");
    }
}

#[test]
fn generic_http_404_counts_as_not_found() {
    let resp = Response::failure(
        record(),
        StoreError::Http {
            status: 404,
            reason: "Not Found".into(),
        },
    );
    assert!(resp.is_not_found());
}

#[test]
fn storage_error_has_no_http_classification() {
    let resp = Response::failure(record(), StoreError::Storage("disk full".into()));
    assert!(resp.is_failure());
    assert!(!resp.is_not_found());
    assert!(!resp.is_not_modified());
}

#[test]
fn pending_only_applies_to_success() {
    assert!(Response::success(record()).into_pending().is_pending());
    assert!(!Response::failure(record(), StoreError::NotFound)
        .into_pending()
        .is_pending());
}

#[test]
fn record_helpers() {
    let r = Record::new("c", "k", "v");
    assert_eq!(r.to_string(), "c/k");
    assert!(r.same_identity(&Record::empty("c", "k")));
    assert!(!r.same_identity(&Record::empty("c", "other")));
    assert_eq!(r.with_value(None).value(), None);
}

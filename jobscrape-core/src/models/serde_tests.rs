//! Serde tests for core types.
//!
//! These check the JSON shapes other crates rely on: lowercase site and
//! label names, and records that tolerate missing optional fields.

use serde_json::json;

use crate::{ClassificationLabel, JobRecord, SiteKind};

// ============================================================================
// SiteKind Serde Tests
// ============================================================================

#[test]
fn test_site_kind_serializes_as_cli_name() {
    for kind in SiteKind::all() {
        let json = serde_json::to_string(kind).unwrap();
        assert_eq!(json, format!("\"{}\"", kind.cli_name()));
    }
}

#[test]
fn test_site_kind_from_str() {
    assert_eq!("agrilabour".parse::<SiteKind>().unwrap(), SiteKind::Agrilabour);
    assert_eq!(
        " WorkforceAustralia ".parse::<SiteKind>().unwrap(),
        SiteKind::WorkforceAustralia
    );
    assert!("seek".parse::<SiteKind>().is_err());
}

#[test]
fn test_site_kind_invalid_deserialize() {
    let result: Result<SiteKind, _> = serde_json::from_str(r#""indeed""#);
    assert!(result.is_err());
}

// ============================================================================
// JobRecord Serde Tests
// ============================================================================

#[test]
fn test_job_record_minimal_json() {
    let value = json!({
        "site": "costagroup",
        "url": "https://example.com/job/1",
        "discovered_at": "2026-03-01T08:00:00Z"
    });

    let job: JobRecord = serde_json::from_value(value).unwrap();
    assert_eq!(job.site, SiteKind::Costagroup);
    assert!(job.title.is_none());
    assert_eq!(job.label, ClassificationLabel::Unset);
    assert!(job.extras.is_empty());
}

#[test]
fn test_label_serializes_lowercase() {
    let json = serde_json::to_string(&ClassificationLabel::Maybe).unwrap();
    assert_eq!(json, r#""maybe""#);
}

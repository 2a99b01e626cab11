//! Integration tests for the script runner across backend pairs.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use dualparse::config::{BackendKind, HarnessSettings};
use dualparse::error::HarnessError;
use dualparse::script::{RunReport, Script, StepStatus, run};
use dualparse_core::MatchPolicy;
use std::path::PathBuf;

const CONF: &str = "/etc/apache2/apache2.conf";

fn settings(primary: BackendKind, secondary: BackendKind) -> HarnessSettings {
    HarnessSettings {
        primary,
        secondary,
        match_policy: MatchPolicy::Permissive,
        filepath: Some(PathBuf::from(CONF)),
    }
}

fn run_json(json: &str, primary: BackendKind, secondary: BackendKind) -> RunReport {
    let script = Script::from_json(json).unwrap();
    run(&script, &settings(primary, secondary)).unwrap()
}

const VHOST_SCRIPT: &str = r#"{
  "description": "add two virtual hosts, edit one, delete the other",
  "steps": [
    { "op": "add_block", "name": "VirtualHost", "parameters": ["*:80"], "bind": "http" },
    { "op": "add_block", "name": "VirtualHost", "parameters": ["*:443"], "position": 0, "bind": "https" },
    { "op": "add_directive", "parent": "https", "name": "ServerName", "parameters": ["a.example"], "bind": "name" },
    { "op": "add_comment", "parent": "https", "comment": "managed by dualparse", "position": 0 },
    { "op": "set_parameters", "target": "name", "parameters": ["b.example"] },
    { "op": "find_blocks", "name": "virtualhost", "expect": 2, "bind": "hosts" },
    { "op": "find_directives", "name": "ServerName", "expect": 1 },
    { "op": "find_comments", "comment": "dualparse", "expect": 1 },
    { "op": "unsaved_files", "expect": 1 },
    { "op": "delete", "target": "http" },
    { "op": "find_blocks", "name": "VirtualHost", "expect": 1 },
    { "op": "save", "message": "vhosts" },
    { "op": "unsaved_files", "expect": 0 }
  ]
}"#;

// =============================================================================
// PASSING RUNS
// =============================================================================

#[test]
fn test_vhost_script_passes_for_real_backends() {
    for (primary, secondary) in [
        (BackendKind::Arena, BackendKind::Keyed),
        (BackendKind::Keyed, BackendKind::Arena),
        (BackendKind::Arena, BackendKind::Arena),
    ] {
        let report = run_json(VHOST_SCRIPT, primary, secondary);
        assert!(report.passed, "{primary}/{secondary}:\n{report}");
        assert_eq!(report.steps.len(), 13);
        assert_eq!(report.steps[5].count, Some(2));
    }
}

#[test]
fn test_vhost_script_passes_with_pass_backend() {
    let report = run_json(VHOST_SCRIPT, BackendKind::Pass, BackendKind::Keyed);
    assert!(report.passed, "{report}");
    assert!(report.failure().is_none());
}

#[test]
fn test_report_serializes_statuses() {
    let report = run_json(VHOST_SCRIPT, BackendKind::Arena, BackendKind::Keyed);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["primary"], "arena");
    assert_eq!(json["secondary"], "keyed");
    assert_eq!(json["match_policy"], "permissive");
    assert_eq!(json["steps"][0]["status"], "ok");
    assert_eq!(json["passed"], true);
}

// =============================================================================
// STOPPED RUNS
// =============================================================================

#[test]
fn test_unexpected_count_stops_run() {
    let json = r#"{ "steps": [
        { "op": "add_directive", "name": "Listen", "parameters": ["80"] },
        { "op": "find_directives", "name": "Listen", "expect": 2 },
        { "op": "save", "message": "never reached" }
    ] }"#;
    let report = run_json(json, BackendKind::Arena, BackendKind::Keyed);

    assert!(!report.passed);
    assert_eq!(report.steps.len(), 2);
    let failure = report.failure().unwrap();
    assert_eq!(failure.status, StepStatus::Unexpected);
    assert_eq!(failure.count, Some(1));
}

#[test]
fn test_backend_failure_is_reported() {
    let json = r#"{ "steps": [
        { "op": "add_comment", "comment": "late", "position": 3 }
    ] }"#;
    let report = run_json(json, BackendKind::Keyed, BackendKind::Arena);

    let failure = report.failure().unwrap();
    assert_eq!(failure.status, StepStatus::BackendFailed);
    assert!(failure.detail.as_deref().unwrap().starts_with("primary"));
}

#[test]
fn test_exclusive_policy_pairs_one_to_one() {
    let json = r#"{ "steps": [
        { "op": "add_directive", "name": "Listen", "parameters": ["80"] },
        { "op": "add_directive", "name": "Listen", "parameters": ["80"] },
        { "op": "find_directives", "name": "Listen", "expect": 2 }
    ] }"#;
    let script = Script::from_json(json).unwrap();
    let mut settings = settings(BackendKind::Arena, BackendKind::Keyed);
    settings.match_policy = MatchPolicy::Exclusive;

    assert!(run(&script, &settings).unwrap().passed);
}

// =============================================================================
// SCRIPT ERRORS
// =============================================================================

#[test]
fn test_unknown_binding_is_an_error() {
    let script = Script::from_json(r#"{ "steps": [ { "op": "delete", "target": "ghost" } ] }"#)
        .unwrap();

    match run(&script, &settings(BackendKind::Arena, BackendKind::Keyed)) {
        Err(HarnessError::UnknownBinding { index, name }) => {
            assert_eq!(index, 0);
            assert_eq!(name, "ghost");
        }
        other => panic!("expected unknown binding, got {other:?}"),
    }
}

#[test]
fn test_comment_is_not_a_parent() {
    let json = r#"{ "steps": [
        { "op": "add_comment", "comment": "note", "bind": "note" },
        { "op": "add_directive", "parent": "note", "name": "Listen" }
    ] }"#;
    let script = Script::from_json(json).unwrap();

    let result = run(&script, &settings(BackendKind::Arena, BackendKind::Keyed));
    assert!(matches!(
        result,
        Err(HarnessError::BindingKind { index: 1, expected: "block", .. })
    ));
}

#[test]
fn test_root_cannot_be_rebound() {
    let json = r#"{ "steps": [
        { "op": "add_block", "name": "VirtualHost", "bind": "root" },
        { "op": "add_directive", "name": "Listen", "parameters": ["80"] },
        { "op": "find_directives", "name": "Listen", "expect": 1 }
    ] }"#;
    let script = Script::from_json(json).unwrap();

    match run(&script, &settings(BackendKind::Arena, BackendKind::Keyed)) {
        Err(HarnessError::InvalidBinding { index, name, .. }) => {
            assert_eq!(index, 0);
            assert_eq!(name, "root");
        }
        other => panic!("expected invalid binding, got {other:?}"),
    }
}

#[test]
fn test_search_result_names_are_reserved() {
    let json = r#"{ "steps": [
        { "op": "add_directive", "name": "Listen", "parameters": ["80"] },
        { "op": "find_directives", "name": "Listen", "bind": "ports" },
        { "op": "add_directive", "name": "Listen", "parameters": ["443"], "bind": "ports.0" }
    ] }"#;
    let script = Script::from_json(json).unwrap();

    let result = run(&script, &settings(BackendKind::Keyed, BackendKind::Arena));
    assert!(matches!(
        result,
        Err(HarnessError::InvalidBinding { index: 2, ref name, .. }) if name == "ports.0"
    ));
}

#[test]
fn test_block_cannot_delete_itself() {
    let script = Script::from_json(
        r#"{ "steps": [ { "op": "delete", "parent": "root", "target": "root" } ] }"#,
    )
    .unwrap();

    match run(&script, &settings(BackendKind::Arena, BackendKind::Keyed)) {
        Err(HarnessError::InvalidBinding { index, name, reason }) => {
            assert_eq!(index, 0);
            assert_eq!(name, "root");
            assert!(reason.contains("itself"));
        }
        other => panic!("expected invalid binding, got {other:?}"),
    }
}

#[test]
fn test_script_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("steps.json");
    std::fs::write(&path, VHOST_SCRIPT).unwrap();

    let script = Script::load(&path).unwrap();
    assert_eq!(script.steps.len(), 13);
    assert!(script.description.is_some());

    let missing = Script::load(&dir.path().join("missing.json"));
    assert!(matches!(missing, Err(HarnessError::Io { .. })));
}

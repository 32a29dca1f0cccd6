//! Integration tests for the process-backed semantic enhancer.
//!
//! Each test writes a small shell script into a temp directory and runs it
//! through `/bin/sh`, so the enhancer protocol is exercised end to end:
//! staging, argv, stdout JSON, exit status, and timeout.

#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use lkml::dsl::{self, Document, ParseOptions};
use lkml::enhancer::{parse_and_enhance, EnhanceError, ProcessEnhancer, SemanticEnhancer};
use tempfile::TempDir;

const VIEW: &str = r#"view: orders {
  dimension: id {
    type: number
  }
  measure: count {
    type: count
  }
}
"#;

fn document() -> Document {
    Document::new("file:///project/views/orders.view.lkml", VIEW)
}

fn script(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("enhance.sh");
    std::fs::write(&path, body).unwrap();
    path
}

fn sh(script: &Path) -> ProcessEnhancer {
    ProcessEnhancer::new("/bin/sh")
        .with_args(vec![script.to_string_lossy().into_owned()])
        .with_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn test_successful_enhancement_merges() {
    let dir = tempfile::tempdir().unwrap();
    let script = script(
        &dir,
        r#"cat <<'JSON'
{"views": {"orders": {
  "label": "Orders",
  "dimensions": {"id": {"type": "string", "sql": "${TABLE}.id"}},
  "measures": {"count": {"drill_fields": ["id"]}},
  "dimension_groups": {"created": {"type": "time"}}
}}}
JSON
"#,
    );

    let result = parse_and_enhance(&document(), &ParseOptions::default(), &sh(&script)).await;
    let orders = result.view("orders").unwrap();

    assert_eq!(orders.properties["label"].value, "Orders");
    assert_eq!(orders.properties["label"].location, orders.location);
    assert_eq!(orders.fields["id"].properties["type"].value, "number");
    assert_eq!(orders.fields["id"].properties["sql"].value, "${TABLE}.id");
    assert!(!orders.fields["count"].properties.contains_key("drill_fields"));
}

#[tokio::test]
async fn test_document_is_staged_under_its_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let record = dir.path().join("argv.txt");
    let script = script(
        &dir,
        &format!(
            "printf '%s' \"$1\" > '{}'\ncat \"$1\" > /dev/null || exit 7\necho '{{}}'\n",
            record.display()
        ),
    );

    let project = sh(&script).enhance(&document()).await.unwrap();
    assert!(project.is_empty());

    let staged = PathBuf::from(std::fs::read_to_string(&record).unwrap());
    assert_eq!(
        staged.file_name().and_then(|name| name.to_str()),
        Some("orders.view.lkml")
    );
    // The staging directory is gone once the enhancer returns.
    assert!(!staged.exists());
    assert!(!staged.parent().unwrap().exists());
}

#[tokio::test]
async fn test_non_zero_exit_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let script = script(&dir, "echo 'grammar error' >&2\nexit 2\n");

    let err = sh(&script).enhance(&document()).await.unwrap_err();
    match err {
        EnhanceError::Exited { stderr, .. } => assert_eq!(stderr, "grammar error"),
        other => panic!("expected exit error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_json_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let script = script(&dir, "echo 'not json'\n");

    let err = sh(&script).enhance(&document()).await.unwrap_err();
    assert!(matches!(err, EnhanceError::DeserializeFailed(_)));
}

#[tokio::test]
async fn test_timeout_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let script = script(&dir, "sleep 5\necho '{}'\n");
    let enhancer = sh(&script).with_timeout(Duration::from_millis(200));

    let err = enhancer.enhance(&document()).await.unwrap_err();
    assert!(matches!(err, EnhanceError::Timeout(_)));
    assert!(err.is_retriable());
}

#[tokio::test]
async fn test_failures_fall_back_to_structural_result() {
    let dir = tempfile::tempdir().unwrap();
    let structural = dsl::parse(&document());

    for body in ["exit 1\n", "echo '{'\n", "sleep 5\n"] {
        let script = script(&dir, body);
        let enhancer = sh(&script).with_timeout(Duration::from_millis(200));
        let result = parse_and_enhance(&document(), &ParseOptions::default(), &enhancer).await;
        assert_eq!(result, structural, "script {:?}", body);
    }

    let missing = ProcessEnhancer::new(dir.path().join("no-such-enhancer"));
    let result = parse_and_enhance(&document(), &ParseOptions::default(), &missing).await;
    assert_eq!(result, structural);
}

//! Storage Integration Tests
//!
//! Config files feeding the engine, and snapshots exported from a live session.

use std::fs;
use std::sync::Arc;

use screen_insight::storage::{write_snapshot, ExportFormat};
use screen_insight::{ConfigService, SessionRecord, SessionSnapshot};

use super::support::{engine_with, ScriptedBackend};

#[test]
fn test_config_round_trip_keeps_custom_templates() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "analysis": {"confidence_threshold": 0.6, "history_capacity": 10},
            "templates": [
                {"category": "coding", "intent": "review", "text": "Review: {{current_text}}"}
            ]
        }"#,
    )
    .unwrap();

    let service = ConfigService::load(&path).unwrap();
    service.save().unwrap();

    let config = ConfigService::load(&path).unwrap().into_config();
    assert_eq!(config.analysis.confidence_threshold, 0.6);
    assert_eq!(config.analysis.history_capacity, 10);
    assert_eq!(config.templates.len(), 1);
    assert_eq!(config.templates[0].text, "Review: {{current_text}}");
}

#[tokio::test]
async fn test_export_live_session_as_json_and_jsonl() {
    let backend = Arc::new(ScriptedBackend::replying("Looks fine."));
    let temp = tempfile::tempdir().unwrap();
    let config_path = temp.path().join("config.json");
    fs::write(&config_path, r#"{"analysis": {"history_capacity": 2}}"#).unwrap();
    let config = ConfigService::load(&config_path).unwrap().into_config();
    let engine = engine_with(backend, config, 1);

    for text in ["git status", "sudo apt update", "email inbox"] {
        engine.analyze(text, None).await.unwrap();
    }
    let snapshot = engine.export_snapshot();

    let json_path = temp.path().join("exports").join("session.json");
    assert_eq!(write_snapshot(&json_path, &snapshot, ExportFormat::Json).unwrap(), 2);
    let parsed: SessionSnapshot =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(parsed, snapshot);
    assert_eq!(parsed.total_appended, 3);
    assert_eq!(parsed.capacity, 2);

    let jsonl_path = temp.path().join("session.jsonl");
    write_snapshot(&jsonl_path, &snapshot, ExportFormat::Jsonl).unwrap();
    let records: Vec<SessionRecord> = fs::read_to_string(&jsonl_path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let seqs: Vec<u64> = records.iter().map(|r| r.sequence_number).collect();
    assert_eq!(seqs, vec![2, 3]);
    assert_eq!(records[1].result.input_text, "email inbox");
}

//! File loading through the public API

use std::io::Write;

use crunchtime_core::Status;
use crunchtime_ingest::{load_file, IngestWarning};
use pretty_assertions::assert_eq;

fn temp_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::with_suffix(suffix).unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[test]
fn loads_json_file() {
    let file = temp_file(
        ".json",
        r#"{
            "goals": [{"id": "g", "name": "Grow"}],
            "projects": [{"id": "p", "name": "Launch", "goal": "g", "deadline": "2024-01-31", "deadlineType": "hard"}],
            "milestones": [{"id": "m", "name": "Beta", "project": "p"}],
            "tasks": [
                {"id": "t1", "name": "Build", "milestone": "m", "duration": 6},
                {"id": "t2", "name": "Ship", "milestone": "m", "duration": 3, "dependencies": ["t1"]}
            ]
        }"#,
    );

    let ingested = load_file(file.path()).unwrap();
    let ws = &ingested.workspace;

    assert!(ingested.warnings.is_empty());
    assert_eq!(ws.goals().len(), 1);
    assert_eq!(ws.goal_of_task(ws.task("t2").unwrap()).unwrap().name, "Grow");
    let ids: Vec<String> = ws.schedulable_tasks().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["t1", "t2"]);
}

#[test]
fn loads_toml_file_with_repairs() {
    let file = temp_file(
        ".toml",
        r#"
[[projects]]
id = "p"
viability = 11

[[milestones]]
id = "m"
project = "p"

[[tasks]]
id = "t"
milestone = "m"
status = "paused"
dependencies = ["t", "missing"]
"#,
    );

    let ingested = load_file(file.path()).unwrap();
    let ws = &ingested.workspace;

    assert_eq!(ws.project("p").unwrap().viability.value(), 3);
    assert_eq!(ws.task("t").unwrap().status, Status::Backlog);
    assert!(ws.task("t").unwrap().dependency_ids.is_empty());
    assert_eq!(ingested.warnings.len(), 4);
    assert!(ingested
        .warnings
        .iter()
        .any(|w| matches!(w, IngestWarning::SelfDependency { id, .. } if id == "t")));
}

#[test]
fn unknown_extension_is_read_as_json() {
    let file = temp_file(".data", r#"{"tasks": [{"id": "loose"}]}"#);
    let ingested = load_file(file.path()).unwrap();
    assert_eq!(ingested.workspace.tasks().len(), 1);
    assert!(ingested.workspace.schedulable_tasks().is_empty());
}

//! Task files
//!
//! A task file lists the desired state of any number of objects:
//!
//! ```toml
//! [[task]]
//! resource = "dns_view"
//! fields = { name = "internal", comment = "lab" }
//!
//! [[task]]
//! resource = "infra_join_token"
//! state = "revoked"
//! fields = { name = "edge-01" }
//! ```
//!
//! JSON files use the same shape: `{"task": [{...}, ...]}`.

use declarative::{DesiredState, LifecycleState, Object, ReconcileRequest, ResourceDescriptor};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Problems with a task file
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unsupported task file extension for {0} (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("task {index}: unknown resource type `{resource}`")]
    UnknownResource { index: usize, resource: String },

    #[error("task {index}: {source}")]
    Invalid {
        index: usize,
        source: declarative::Error,
    },
}

/// One entry of a task file
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TaskSpec {
    /// Catalog resource type
    pub resource: String,
    /// Optional label; defaults to the resource type and index
    #[serde(default)]
    pub name: Option<String>,
    /// Lifecycle word; defaults to `present`
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub next_available_id: Option<String>,
    /// Desired field values
    #[serde(default)]
    pub fields: Object,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TaskFile {
    #[serde(default)]
    task: Vec<TaskSpec>,
}

/// A validated task ready to run
#[derive(Debug, Clone)]
pub struct Task {
    pub label: String,
    pub descriptor: ResourceDescriptor,
    pub request: ReconcileRequest,
}

/// Parse task entries from file contents; the format follows the extension
pub fn parse(path: &Path, content: &str) -> Result<Vec<TaskSpec>, TaskError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let file: TaskFile = match extension.as_deref() {
        Some("toml") => toml::from_str(content).map_err(|source| TaskError::Toml {
            path: path.to_path_buf(),
            source,
        })?,
        Some("json") => serde_json::from_str(content).map_err(|source| TaskError::Json {
            path: path.to_path_buf(),
            source,
        })?,
        _ => return Err(TaskError::UnsupportedFormat(path.to_path_buf())),
    };
    Ok(file.task)
}

/// Read and parse a task file
pub fn load(path: &Path) -> Result<Vec<TaskSpec>, TaskError> {
    let content = fs::read_to_string(path).map_err(|source| TaskError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(path, &content)
}

/// Resolve entries against the catalog
///
/// Task indices in errors are 1-based.
pub fn build(
    specs: Vec<TaskSpec>,
    dry_run: bool,
    page_limit: Option<usize>,
) -> Result<Vec<Task>, TaskError> {
    specs
        .into_iter()
        .enumerate()
        .map(|(i, spec)| build_one(i + 1, spec, dry_run, page_limit))
        .collect()
}

fn build_one(
    index: usize,
    spec: TaskSpec,
    dry_run: bool,
    page_limit: Option<usize>,
) -> Result<Task, TaskError> {
    let Some(found) = ddi::catalog::lookup(&spec.resource) else {
        return Err(TaskError::UnknownResource {
            index,
            resource: spec.resource,
        });
    };
    let descriptor = match page_limit {
        Some(limit) => found.with_page_limit(limit),
        None => *found,
    };

    let state = match spec.state.as_deref() {
        Some(word) => LifecycleState::parse(word, &descriptor)
            .map_err(|source| TaskError::Invalid { index, source })?,
        None => LifecycleState::Present,
    };

    let mut request = ReconcileRequest::new(DesiredState::from_object(spec.fields))
        .with_state(state)
        .dry_run(dry_run);
    if let Some(id) = spec.id {
        request = request.with_id(id);
    }
    if let Some(parent) = spec.next_available_id {
        request = request.with_next_available(parent);
    }

    let label = spec
        .name
        .unwrap_or_else(|| format!("{}#{index}", descriptor.resource_type));
    Ok(Task {
        label,
        descriptor,
        request,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::Field;
    use serde_json::json;
    use tempfile::TempDir;

    const TOML_TASKS: &str = r#"
[[task]]
resource = "dns_view"
fields = { name = "internal", comment = "lab" }

[[task]]
name = "edge token"
resource = "infra_join_token"
state = "revoked"
fields = { name = "edge-01" }

[[task]]
resource = "ipam_address_block"
next_available_id = "ipam/address_block/parent"

[task.fields]
space = "ipam/ip_space/1"
cidr = 24
"#;

    #[test]
    fn test_parse_toml() {
        let specs = parse(Path::new("tasks.toml"), TOML_TASKS).unwrap();
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0].resource, "dns_view");
        assert_eq!(specs[0].fields["name"], json!("internal"));
        assert_eq!(specs[1].state.as_deref(), Some("revoked"));
        assert_eq!(specs[2].fields["cidr"], json!(24));
    }

    #[test]
    fn test_parse_json_with_null() {
        let content = r#"{"task": [{"resource": "dns_view", "fields": {"name": "v", "comment": null}}]}"#;
        let specs = parse(Path::new("tasks.JSON"), content).unwrap();
        let tasks = build(specs, false, None).unwrap();
        let desired = tasks[0].request.desired();
        assert_eq!(desired.get("comment"), &Field::Null);
        assert_eq!(desired.get("other"), &Field::Unset);
    }

    #[test]
    fn test_parse_unsupported_extension() {
        let result = parse(Path::new("tasks.yaml"), "");
        assert!(matches!(result, Err(TaskError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_parse_unknown_key() {
        let result = parse(Path::new("t.toml"), "[[task]]\nresource = \"dns_view\"\nstat = \"absent\"\n");
        assert!(matches!(result, Err(TaskError::Toml { .. })));
    }

    #[test]
    fn test_build_states_and_labels() {
        let specs = parse(Path::new("tasks.toml"), TOML_TASKS).unwrap();
        let tasks = build(specs, true, Some(250)).unwrap();

        assert_eq!(tasks[0].label, "dns_view#1");
        assert_eq!(tasks[0].request.state(), LifecycleState::Present);
        assert!(tasks[0].request.is_dry_run());
        assert_eq!(tasks[0].descriptor.page_limit, 250);

        assert_eq!(tasks[1].label, "edge token");
        assert_eq!(tasks[1].request.state(), LifecycleState::Absent);

        assert_eq!(
            tasks[2].request.next_available_id(),
            Some("ipam/address_block/parent")
        );
    }

    #[test]
    fn test_build_unknown_resource() {
        let specs = parse(Path::new("t.toml"), "[[task]]\nresource = \"dns_record\"\n").unwrap();
        let err = build(specs, false, None).unwrap_err();
        assert!(matches!(err, TaskError::UnknownResource { index: 1, .. }));
        assert!(err.to_string().contains("dns_record"));
    }

    #[test]
    fn test_build_bad_state_word() {
        // "absent" is not the join token's vocabulary
        let specs = parse(
            Path::new("t.toml"),
            "[[task]]\nresource = \"infra_join_token\"\nstate = \"absent\"\n",
        )
        .unwrap();
        let err = build(specs, false, None).unwrap_err();
        assert!(matches!(err, TaskError::Invalid { index: 1, .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.toml");
        fs::write(&path, TOML_TASKS).unwrap();
        assert_eq!(load(&path).unwrap().len(), 3);

        let missing = temp.path().join("missing.toml");
        assert!(matches!(load(&missing), Err(TaskError::Read { .. })));
    }
}

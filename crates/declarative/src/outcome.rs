//! Outcome records returned to callers

use crate::error::Result;
use crate::types::Object;
use serde::Serialize;
use serde_json::Value;

/// Before/after pair of one reconciliation
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Diff {
    pub before: Object,
    pub after: Object,
}

/// Result of one reconciliation
///
/// `object` is the current, created or updated representation; it is empty
/// after a delete and in dry-run mode.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Outcome {
    pub changed: bool,
    pub id: Option<String>,
    pub object: Object,
    pub diff: Diff,
    pub msg: String,
}

impl Outcome {
    /// Assemble an outcome; the identifier is taken from `after`, then `before`
    pub fn assemble(
        changed: bool,
        id_field: &str,
        before: Object,
        after: Object,
        msg: impl Into<String>,
    ) -> Self {
        let id = identifier(&after, id_field).or_else(|| identifier(&before, id_field));
        Self {
            changed,
            id,
            object: after.clone(),
            diff: Diff { before, after },
            msg: msg.into(),
        }
    }

    /// Outcome of an evaluation without mutating calls
    pub fn dry_run(changed: bool, id_field: &str, before: Object, msg: impl Into<String>) -> Self {
        Self::assemble(changed, id_field, before, Object::new(), msg)
    }
}

/// Result of an info query
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct InfoOutcome {
    pub id: Option<String>,
    pub objects: Vec<Object>,
}

/// Read an identifier field as a string
pub(crate) fn identifier(object: &Object, id_field: &str) -> Option<String> {
    match object.get(id_field)? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Summary of batch execution results
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecuteSummary {
    pub changed: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl ExecuteSummary {
    /// Summarize a set of results
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a Result<Outcome>>) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.add_result(result);
        }
        summary
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: &Result<Outcome>) {
        match result {
            Ok(outcome) if outcome.changed => self.changed += 1,
            Ok(_) => self.unchanged += 1,
            Err(_) => self.failed += 1,
        }
    }

    /// Total number of results
    pub fn total(&self) -> usize {
        self.changed + self.unchanged + self.failed
    }

    /// Check if nothing failed
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

//! Client and progress provider traits
//!
//! These traits allow the declarative crate to be used without
//! depending on a specific transport or UI.

use crate::error::{ClientError, Result};
use crate::outcome::Outcome;
use crate::types::Object;

/// One page request against a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery<'a> {
    /// Attribute filter expression
    pub filter: Option<&'a str>,
    /// Tag filter expression
    pub tag_filter: Option<&'a str>,
    /// Index of the first item
    pub offset: usize,
    /// Maximum items in the page
    pub limit: usize,
    /// Projection; empty returns every field
    pub fields: &'a [String],
}

impl<'a> ListQuery<'a> {
    /// First page of an unfiltered listing
    pub fn new(limit: usize) -> Self {
        Self {
            filter: None,
            tag_filter: None,
            offset: 0,
            limit,
            fields: &[],
        }
    }

    /// Set the attribute filter
    #[must_use]
    pub fn filter(mut self, filter: Option<&'a str>) -> Self {
        self.filter = filter;
        self
    }

    /// Set the tag filter
    #[must_use]
    pub fn tag_filter(mut self, tag_filter: Option<&'a str>) -> Self {
        self.tag_filter = tag_filter;
        self
    }

    /// Set the projection
    #[must_use]
    pub fn fields(mut self, fields: &'a [String]) -> Self {
        self.fields = fields;
        self
    }
}

/// Access to one resource collection of a remote store
///
/// Implement this trait to plug a transport into the engine. The engine
/// only reads through the handle; it never caches responses.
pub trait ResourceClient: Send + Sync {
    /// Read one object; fails with [`ClientError::NotFound`] when absent
    fn read(&self, id: &str) -> std::result::Result<Object, ClientError>;

    /// Read one page; a page shorter than the limit is the last
    fn list(&self, query: &ListQuery<'_>) -> std::result::Result<Vec<Object>, ClientError>;

    /// Create an object and return its stored representation
    fn create(&self, payload: &Object) -> std::result::Result<Object, ClientError>;

    /// Update an object and return its stored representation
    fn update(&self, id: &str, payload: &Object) -> std::result::Result<Object, ClientError>;

    /// Delete an object
    fn delete(&self, id: &str) -> std::result::Result<(), ClientError>;
}

/// Progress callback for batch execution
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback: Send {
    /// Called once before the first job
    fn on_batch_start(&mut self, count: usize);

    /// Called when a job starts (sequential execution only)
    fn on_job_start(&mut self, label: &str);

    /// Called when a job completes
    fn on_job_complete(&mut self, label: &str, result: &Result<Outcome>);

    /// Called once after the last job
    fn on_batch_complete(&mut self);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&mut self, _count: usize) {}
    fn on_job_start(&mut self, _label: &str) {}
    fn on_job_complete(&mut self, _label: &str, _result: &Result<Outcome>) {}
    fn on_batch_complete(&mut self) {}
}

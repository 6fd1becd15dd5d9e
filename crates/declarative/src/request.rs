//! Caller-supplied inputs for one invocation.
//!
//! Requests are built once and then only read by the pipeline.

use crate::error::{Error, Result};
use crate::filter::FilterSpec;
use crate::resource::Resource;
use crate::types::DesiredState;

/// Target lifecycle state of a reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// The object should exist with the desired fields
    #[default]
    Present,
    /// The object should not exist
    Absent,
}

impl LifecycleState {
    /// Parse a state word against the resource's vocabulary.
    ///
    /// Accepts `present` and the resource's absent word.
    pub fn parse(word: &str, resource: &dyn Resource) -> Result<Self> {
        if word == "present" {
            Ok(Self::Present)
        } else if word == resource.absent_state() {
            Ok(Self::Absent)
        } else {
            Err(Error::InvalidInput(format!(
                "state for {} must be `present` or `{}`, got `{}`",
                resource.kind(),
                resource.absent_state(),
                word
            )))
        }
    }

    /// Check if this is the present state
    pub fn is_present(self) -> bool {
        matches!(self, Self::Present)
    }
}

/// Input of one reconciliation
#[derive(Debug, Clone, Default)]
pub struct ReconcileRequest {
    id: Option<String>,
    state: LifecycleState,
    desired: DesiredState,
    dry_run: bool,
    next_available_id: Option<String>,
}

impl ReconcileRequest {
    /// Create a request for the present state
    pub fn new(desired: DesiredState) -> Self {
        Self {
            desired,
            ..Self::default()
        }
    }

    /// Select the object by identifier; an empty id selects nothing
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into()).filter(|id: &String| !id.is_empty());
        self
    }

    /// Set the target lifecycle state
    #[must_use]
    pub fn with_state(mut self, state: LifecycleState) -> Self {
        self.state = state;
        self
    }

    /// Evaluate without mutating calls
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Allocate the address from the next free range below this parent
    #[must_use]
    pub fn with_next_available(mut self, parent_id: impl Into<String>) -> Self {
        self.next_available_id = Some(parent_id.into()).filter(|id: &String| !id.is_empty());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn desired(&self) -> &DesiredState {
        &self.desired
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn next_available_id(&self) -> Option<&str> {
        self.next_available_id.as_deref()
    }
}

/// Input of one info (listing) query
#[derive(Debug, Clone, Default)]
pub struct InfoRequest {
    id: Option<String>,
    filter: FilterSpec,
    tag_filter: FilterSpec,
    fields: Vec<String>,
}

impl InfoRequest {
    /// Create a query.
    ///
    /// An id cannot be combined with attribute or tag filters.
    pub fn new(id: Option<String>, filter: FilterSpec, tag_filter: FilterSpec) -> Result<Self> {
        let id = id.filter(|id| !id.is_empty());
        if id.is_some() && !(filter.is_none() && tag_filter.is_none()) {
            return Err(Error::Selector(
                "an id cannot be combined with filters".to_string(),
            ));
        }
        Ok(Self {
            id,
            filter,
            tag_filter,
            fields: Vec::new(),
        })
    }

    /// Query a single object by identifier
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Restrict returned fields
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn tag_filter(&self) -> &FilterSpec {
        &self.tag_filter
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceDescriptor;
    use crate::types::Object;

    const TOKEN: ResourceDescriptor =
        ResourceDescriptor::new("infra_join_token", "JoinToken", "/api/infra/v1", "jointoken")
            .with_natural_key(&["name"])
            .with_retirement("revoked", ("status", "REVOKED"));

    #[test]
    fn test_parse_state_vocabulary() {
        assert_eq!(
            LifecycleState::parse("present", &TOKEN).unwrap(),
            LifecycleState::Present
        );
        assert_eq!(
            LifecycleState::parse("revoked", &TOKEN).unwrap(),
            LifecycleState::Absent
        );
        assert!(matches!(
            LifecycleState::parse("absent", &TOKEN),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_request_builder() {
        let request = ReconcileRequest::new(DesiredState::new().with("name", "t1"))
            .with_id("infra/jointoken/1")
            .with_state(LifecycleState::Absent)
            .dry_run(true);
        assert_eq!(request.id(), Some("infra/jointoken/1"));
        assert_eq!(request.state(), LifecycleState::Absent);
        assert!(request.is_dry_run());
        assert_eq!(request.next_available_id(), None);
    }

    #[test]
    fn test_empty_id_selects_nothing() {
        let request = ReconcileRequest::new(DesiredState::new()).with_id("");
        assert_eq!(request.id(), None);
    }

    #[test]
    fn test_info_id_with_filter_rejected() {
        let mut fields = Object::new();
        fields.insert("name".to_string(), "a".into());
        let result = InfoRequest::new(
            Some("dns/view/1".to_string()),
            FilterSpec::Fields(fields),
            FilterSpec::None,
        );
        assert!(matches!(result, Err(Error::Selector(_))));
    }

    #[test]
    fn test_info_id_with_tag_filter_rejected() {
        let result = InfoRequest::new(
            Some("dns/view/1".to_string()),
            FilterSpec::None,
            FilterSpec::Raw("env=='prod'".to_string()),
        );
        assert!(matches!(result, Err(Error::Selector(_))));
    }

    #[test]
    fn test_info_fields() {
        let request = InfoRequest::by_id("dns/view/1").with_fields(vec!["name".to_string()]);
        assert_eq!(request.fields(), ["name".to_string()]);
        assert!(request.filter().is_none());
    }
}

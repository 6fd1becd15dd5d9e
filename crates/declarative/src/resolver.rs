//! Identity resolution: find at most one existing object.

use crate::context::{ListQuery, ResourceClient};
use crate::error::{ClientError, Error, Result};
use crate::filter::{build, natural_key_fields};
use crate::outcome::InfoOutcome;
use crate::pagination::PageWalker;
use crate::request::{InfoRequest, LifecycleState, ReconcileRequest};
use crate::resource::Resource;
use crate::types::{DesiredState, Object};

/// Finds existing objects of one resource type
pub struct Resolver<'a, C: ResourceClient + ?Sized> {
    client: &'a C,
    resource: &'a dyn Resource,
}

impl<'a, C: ResourceClient + ?Sized> Resolver<'a, C> {
    pub fn new(client: &'a C, resource: &'a dyn Resource) -> Self {
        Self { client, resource }
    }

    /// Find the object a reconciliation targets.
    ///
    /// By id when the request has one, otherwise by natural key taken from
    /// `desired` (the request's desired state after normalisation).
    pub fn find(&self, request: &ReconcileRequest, desired: &DesiredState) -> Result<Option<Object>> {
        match request.id() {
            Some(id) => self.by_id(id, request.state()),
            None => {
                if self.allocates(request, desired) {
                    log::debug!(
                        "{}: address allocated from {}, skipping lookup",
                        self.resource.kind(),
                        request.next_available_id().unwrap_or_default()
                    );
                    return Ok(None);
                }
                self.by_natural_key(desired)
            }
        }
    }

    /// Read by identifier.
    ///
    /// Not found means "no object" only when the object should be absent.
    pub fn by_id(&self, id: &str, state: LifecycleState) -> Result<Option<Object>> {
        log::debug!("{}: reading {}", self.resource.kind(), id);
        match self.client.read(id) {
            Ok(object) => Ok(Some(object)),
            Err(ClientError::NotFound { .. }) if state == LifecycleState::Absent => Ok(None),
            Err(e) => Err(Error::client(self.resource.kind(), e)),
        }
    }

    /// Look up by natural key with a single bounded list call.
    pub fn by_natural_key(&self, desired: &DesiredState) -> Result<Option<Object>> {
        let kind = self.resource.kind();
        let filter = build(&natural_key_fields(self.resource, desired)?)?;
        let limit = self.resource.page_limit();
        if limit == 0 {
            return Err(Error::InvalidInput(format!(
                "page limit for {kind} must be positive"
            )));
        }

        log::debug!("{kind}: looking up {filter}");
        let query = ListQuery::new(limit).filter(Some(&filter));
        let mut matches = self
            .client
            .list(&query)
            .map_err(|e| Error::client(kind, e))?;

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            count => {
                log::warn!("{kind}: {count} objects match {filter}");
                Err(Error::AmbiguousMatch {
                    kind: kind.to_string(),
                    filter,
                    count,
                })
            }
        }
    }

    /// Run an info query: one object by id, or every object matching the filters.
    ///
    /// An unknown id yields an empty listing.
    pub fn search(&self, request: &InfoRequest) -> Result<InfoOutcome> {
        let kind = self.resource.kind();
        let objects = match request.id() {
            Some(id) => match self.client.read(id) {
                Ok(object) => vec![object],
                Err(ClientError::NotFound { .. }) => Vec::new(),
                Err(e) => return Err(Error::client(kind, e)),
            },
            None => {
                let filter = request.filter().render()?;
                let tag_filter = request.tag_filter().render()?;
                PageWalker::new(self.client, kind, self.resource.page_limit())?.collect(
                    filter.as_deref(),
                    tag_filter.as_deref(),
                    request.fields(),
                )?
            }
        };

        log::debug!("{kind}: info returned {} object(s)", objects.len());
        Ok(InfoOutcome {
            id: request.id().map(str::to_string),
            objects,
        })
    }

    fn allocates(&self, request: &ReconcileRequest, desired: &DesiredState) -> bool {
        self.resource.next_available_suffix().is_some()
            && request.next_available_id().is_some()
            && !desired.get("address").is_set()
    }
}

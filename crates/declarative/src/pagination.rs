//! Pagination walker: drives bounded list calls into a complete result set.

use crate::context::{ListQuery, ResourceClient};
use crate::error::{Error, Result};
use crate::types::Object;

/// Walks every page of a listing.
///
/// Starts at offset 0 and advances by the limit until a page comes back
/// shorter than the limit. Total-count fields are never consulted.
pub struct PageWalker<'a, C: ResourceClient + ?Sized> {
    client: &'a C,
    kind: &'a str,
    limit: usize,
}

impl<'a, C: ResourceClient + ?Sized> PageWalker<'a, C> {
    /// Create a walker; a zero limit is rejected
    pub fn new(client: &'a C, kind: &'a str, limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(Error::InvalidInput(format!(
                "page limit for {kind} must be positive"
            )));
        }
        Ok(Self {
            client,
            kind,
            limit,
        })
    }

    /// Collect every matching item.
    ///
    /// Any failure aborts the walk; items gathered so far are dropped.
    pub fn collect(
        &self,
        filter: Option<&str>,
        tag_filter: Option<&str>,
        fields: &[String],
    ) -> Result<Vec<Object>> {
        let mut items = Vec::new();
        let mut query = ListQuery::new(self.limit)
            .filter(filter)
            .tag_filter(tag_filter)
            .fields(fields);

        loop {
            let page = self
                .client
                .list(&query)
                .map_err(|e| Error::client(self.kind, e))?;
            let count = page.len();
            log::debug!(
                "{}: page at offset {} returned {} item(s)",
                self.kind,
                query.offset,
                count
            );
            items.extend(page);

            if count < self.limit {
                break;
            }
            query.offset += self.limit;
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::memory::{Call, MemoryClient};
    use serde_json::json;

    fn client_with(count: usize) -> MemoryClient {
        MemoryClient::new("ipam/address").with_records((0..count).map(|n| {
            json!({"id": format!("ipam/address/{n}"), "address": format!("10.0.{}.{}", n / 256, n % 256)})
                .as_object()
                .cloned()
                .unwrap()
        }))
    }

    #[test]
    fn test_stops_on_short_page() {
        let client = client_with(2037);
        let walker = PageWalker::new(&client, "Address", 1000).unwrap();
        let items = walker.collect(None, None, &[]).unwrap();

        assert_eq!(items.len(), 2037);
        let offsets: Vec<_> = client
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::List { offset, .. } => Some(offset),
                _ => None,
            })
            .collect();
        assert_eq!(offsets, vec![0, 1000, 2000]);
    }

    #[test]
    fn test_exact_multiple_needs_empty_page() {
        let client = client_with(20);
        let walker = PageWalker::new(&client, "Address", 10).unwrap();
        assert_eq!(walker.collect(None, None, &[]).unwrap().len(), 20);
        assert_eq!(client.list_count(), 3);
    }

    #[test]
    fn test_empty_listing_one_call() {
        let client = client_with(0);
        let walker = PageWalker::new(&client, "Address", 1000).unwrap();
        assert!(walker.collect(None, None, &[]).unwrap().is_empty());
        assert_eq!(client.list_count(), 1);
    }

    #[test]
    fn test_forwards_filters() {
        let client = client_with(3);
        let walker = PageWalker::new(&client, "Address", 1000).unwrap();
        let items = walker
            .collect(Some("address=='10.0.0.1'"), Some("env=='prod'"), &[])
            .unwrap();
        assert!(items.is_empty());
        assert_eq!(
            client.calls()[0],
            Call::List {
                filter: Some("address=='10.0.0.1'".to_string()),
                tag_filter: Some("env=='prod'".to_string()),
                offset: 0,
                limit: 1000,
            }
        );
    }

    #[test]
    fn test_zero_limit_rejected() {
        let client = client_with(0);
        assert!(matches!(
            PageWalker::new(&client, "Address", 0),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_error_discards_partial_results() {
        let client = client_with(25);
        let walker = PageWalker::new(&client, "Address", 10).unwrap();
        client.fail_on_call(2, ApiError::new(500, "Internal Server Error", "boom"));

        let result = walker.collect(None, None, &[]);
        assert!(matches!(result, Err(Error::RemoteApi(ref api)) if api.body == "boom"));
        assert_eq!(client.list_count(), 2);
    }
}

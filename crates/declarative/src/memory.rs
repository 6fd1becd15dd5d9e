//! In-memory client for testing without network access.
//!
//! Records are held in memory and every call is logged, so tests can assert
//! exactly which calls a reconciliation issued.
//!
//! ```
//! use declarative::{MemoryClient, ReconcileRequest, Reconciler, DesiredState, ResourceDescriptor};
//!
//! const VIEW: ResourceDescriptor =
//!     ResourceDescriptor::new("dns_view", "View", "/api/ddi/v1", "dns/view").with_natural_key(&["name"]);
//!
//! let client = MemoryClient::new("dns/view");
//! let request = ReconcileRequest::new(DesiredState::new().with("name", "internal"));
//! let outcome = Reconciler::new(&client, &VIEW).run(&request).unwrap();
//!
//! assert!(outcome.changed);
//! assert_eq!(outcome.id.as_deref(), Some("dns/view/1"));
//! assert_eq!(client.records().len(), 1);
//! ```

use crate::context::{ListQuery, ResourceClient};
use crate::error::{ApiError, ClientError};
use crate::types::Object;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A call received by a [`MemoryClient`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Read(String),
    List {
        filter: Option<String>,
        tag_filter: Option<String>,
        offset: usize,
        limit: usize,
    },
    Create(Object),
    Update(String, Object),
    Delete(String),
}

impl Call {
    /// Check if this call mutates the store
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Create(_) | Self::Update(..) | Self::Delete(_))
    }
}

#[derive(Debug, Default)]
struct Store {
    records: Vec<Object>,
    calls: Vec<Call>,
    next_id: usize,
    failure: Option<(usize, ApiError)>,
}

/// Client over an in-memory record set.
#[derive(Debug, Default)]
pub struct MemoryClient {
    collection: String,
    store: Mutex<Store>,
}

impl MemoryClient {
    /// Create an empty store; created objects get ids `<collection>/<n>`
    #[must_use]
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            store: Mutex::default(),
        }
    }

    /// Seed the store with records
    #[must_use]
    pub fn with_records(self, records: impl IntoIterator<Item = Object>) -> Self {
        for record in records {
            self.insert(record);
        }
        self
    }

    /// Add a record without logging a call
    pub fn insert(&self, record: Object) {
        self.lock().records.push(record);
    }

    /// Snapshot of the stored records
    pub fn records(&self) -> Vec<Object> {
        self.lock().records.clone()
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Number of create, update and delete calls received
    pub fn mutation_count(&self) -> usize {
        self.lock().calls.iter().filter(|call| call.is_mutation()).count()
    }

    /// Number of list calls received
    pub fn list_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| matches!(call, Call::List { .. }))
            .count()
    }

    /// Make the next call fail with this error
    pub fn fail_next(&self, error: ApiError) {
        self.fail_on_call(1, error);
    }

    /// Make the `n`th call from now fail with this error (1 is the next call)
    pub fn fail_on_call(&self, n: usize, error: ApiError) {
        self.lock().failure = Some((n, error));
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Log the call and consume a primed failure
    fn begin(&self, call: Call) -> Result<MutexGuard<'_, Store>, ClientError> {
        let mut store = self.lock();
        store.calls.push(call);
        match store.failure.take() {
            Some((0 | 1, error)) => Err(ClientError::Api(error)),
            Some((remaining, error)) => {
                store.failure = Some((remaining - 1, error));
                Ok(store)
            }
            None => Ok(store),
        }
    }
}

fn record_id(record: &Object) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

fn not_found(id: &str) -> ClientError {
    ClientError::NotFound { id: id.to_string() }
}

/// Parse `k==v and k=='v'` into pairs; anything else is `None`
fn parse_conjunction(expression: &str) -> Option<Vec<(&str, &str)>> {
    expression
        .split(" and ")
        .map(|predicate| {
            let (name, value) = predicate.split_once("==")?;
            let value = value.trim();
            let value = value
                .strip_prefix('\'')
                .and_then(|inner| inner.strip_suffix('\''))
                .unwrap_or(value);
            Some((name.trim(), value))
        })
        .collect()
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Unparsable expressions match everything
fn satisfies(fields: Option<&Object>, expression: Option<&str>) -> bool {
    let Some(predicates) = expression.and_then(parse_conjunction) else {
        return true;
    };
    predicates.iter().all(|(name, expected)| {
        fields
            .and_then(|fields| fields.get(*name))
            .and_then(text)
            .is_some_and(|actual| actual == *expected)
    })
}

impl ResourceClient for MemoryClient {
    fn read(&self, id: &str) -> Result<Object, ClientError> {
        let store = self.begin(Call::Read(id.to_string()))?;
        store
            .records
            .iter()
            .find(|record| record_id(record) == Some(id))
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    fn list(&self, query: &ListQuery<'_>) -> Result<Vec<Object>, ClientError> {
        let store = self.begin(Call::List {
            filter: query.filter.map(str::to_string),
            tag_filter: query.tag_filter.map(str::to_string),
            offset: query.offset,
            limit: query.limit,
        })?;
        Ok(store
            .records
            .iter()
            .filter(|record| satisfies(Some(*record), query.filter))
            .filter(|record| {
                satisfies(
                    record.get("tags").and_then(Value::as_object),
                    query.tag_filter,
                )
            })
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    fn create(&self, payload: &Object) -> Result<Object, ClientError> {
        let mut store = self.begin(Call::Create(payload.clone()))?;
        store.next_id += 1;
        let mut record = payload.clone();
        let id = format!("{}/{}", self.collection, store.next_id);
        record.entry("id").or_insert(Value::String(id));
        store.records.push(record.clone());
        Ok(record)
    }

    fn update(&self, id: &str, payload: &Object) -> Result<Object, ClientError> {
        let mut store = self.begin(Call::Update(id.to_string(), payload.clone()))?;
        let record = store
            .records
            .iter_mut()
            .find(|record| record_id(record) == Some(id))
            .ok_or_else(|| not_found(id))?;
        for (name, value) in payload {
            record.insert(name.clone(), value.clone());
        }
        Ok(record.clone())
    }

    fn delete(&self, id: &str) -> Result<(), ClientError> {
        let mut store = self.begin(Call::Delete(id.to_string()))?;
        let index = store
            .records
            .iter()
            .position(|record| record_id(record) == Some(id))
            .ok_or_else(|| not_found(id))?;
        store.records.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Object {
        value.as_object().cloned().unwrap()
    }

    fn seeded() -> MemoryClient {
        MemoryClient::new("dns/view").with_records([
            object(json!({"id": "dns/view/a", "name": "internal", "tags": {"env": "prod"}})),
            object(json!({"id": "dns/view/b", "name": "external", "tags": {"env": "dev"}})),
        ])
    }

    #[test]
    fn test_parse_conjunction() {
        assert_eq!(
            parse_conjunction("name=='foo' and cidr==24"),
            Some(vec![("name", "foo"), ("cidr", "24")])
        );
        assert_eq!(parse_conjunction("name~'foo'"), None);
    }

    #[test]
    fn test_list_filters_attributes_and_tags() {
        let client = seeded();
        let query = ListQuery::new(10).filter(Some("name=='internal'"));
        assert_eq!(client.list(&query).unwrap().len(), 1);

        let query = ListQuery::new(10).tag_filter(Some("env=='dev'"));
        let page = client.list(&query).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(record_id(&page[0]), Some("dns/view/b"));
    }

    #[test]
    fn test_list_unparsable_matches_all() {
        let client = seeded();
        let query = ListQuery::new(10).filter(Some("name~'int'"));
        assert_eq!(client.list(&query).unwrap().len(), 2);
    }

    #[test]
    fn test_create_assigns_id_and_update_merges() {
        let client = MemoryClient::new("dns/view");
        let created = client.create(&object(json!({"name": "v"}))).unwrap();
        assert_eq!(created["id"], json!("dns/view/1"));

        let updated = client
            .update("dns/view/1", &object(json!({"comment": "c"})))
            .unwrap();
        assert_eq!(updated, object(json!({"name": "v", "id": "dns/view/1", "comment": "c"})));
        assert_eq!(client.mutation_count(), 2);
    }

    #[test]
    fn test_read_and_delete_missing() {
        let client = seeded();
        assert!(matches!(
            client.read("dns/view/z"),
            Err(ClientError::NotFound { .. })
        ));
        assert!(matches!(
            client.delete("dns/view/z"),
            Err(ClientError::NotFound { .. })
        ));
        client.delete("dns/view/a").unwrap();
        assert_eq!(client.records().len(), 1);
    }

    #[test]
    fn test_fail_next_once() {
        let client = seeded();
        client.fail_next(ApiError::new(503, "Service Unavailable", "busy"));
        assert!(matches!(
            client.read("dns/view/a"),
            Err(ClientError::Api(ApiError { status: Some(503), .. }))
        ));
        assert!(client.read("dns/view/a").is_ok());
        assert_eq!(client.calls().len(), 2);
    }
}

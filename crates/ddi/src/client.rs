//! Blocking HTTP client for the DDI REST API.
//!
//! [`HttpClient`] holds the agent and credentials; [`ResourceEndpoint`] binds
//! it to one resource type and implements the engine's
//! [`ResourceClient`](declarative::ResourceClient) trait.
//!
//! ```no_run
//! use ddi::{ClientConfig, HttpClient, catalog};
//! use declarative::{ReconcileRequest, Reconciler, DesiredState};
//!
//! let client = HttpClient::new(ClientConfig::new("https://csp.infoblox.com", "secret"))?;
//! let view = catalog::lookup("dns_view").expect("known resource type");
//! let endpoint = client.resource(view);
//!
//! let request = ReconcileRequest::new(DesiredState::new().with("name", "internal"));
//! let outcome = Reconciler::new(&endpoint, view).run(&request)?;
//! println!("{}", outcome.msg);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::{Error, Result};
use declarative::{ApiError, ClientError, ListQuery, Object, ResourceClient, ResourceDescriptor};
use serde::Deserialize;
use std::time::Duration;
use ureq::Body;
use ureq::http::Response;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for [`HttpClient`].
#[derive(Clone)]
pub struct ClientConfig {
    /// Service base URL, e.g. `https://csp.infoblox.com`.
    pub base_url: String,
    /// API key sent as `Authorization: Token <key>`.
    pub api_key: String,
    /// Overall timeout for each request.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl ClientConfig {
    /// Create settings with the default timeout.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("ddi/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the `User-Agent` header value.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

// The API key must never reach logs
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Blocking client for the DDI REST API.
pub struct HttpClient {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// Base URL without trailing slash.
    base_url: String,
    authorization: String,
    user_agent: String,
}

impl HttpClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingCredentials` for an empty API key and
    /// `Error::InvalidUrl` for a base URL that is not http(s).
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::MissingCredentials);
        }
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(Error::InvalidUrl(config.base_url));
        }

        let agent_config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout))
            .build();

        log::debug!("DDI client for {base_url} (timeout {:?})", config.timeout);
        Ok(Self {
            agent: ureq::Agent::new_with_config(agent_config),
            base_url,
            authorization: format!("Token {}", config.api_key),
            user_agent: config.user_agent,
        })
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Bind the client to one resource type.
    #[must_use]
    pub fn resource<'a>(&'a self, descriptor: &'a ResourceDescriptor) -> ResourceEndpoint<'a> {
        ResourceEndpoint {
            client: self,
            descriptor,
        }
    }

    pub(crate) fn url(&self, prefix: &str, path: &str) -> String {
        format!("{}{}/{}", self.base_url, prefix, path.trim_start_matches('/'))
    }

    fn authorize<B>(&self, request: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        request
            .header("Authorization", &self.authorization)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json")
    }

    pub(crate) fn get(&self, url: &str, params: &[(&str, String)]) -> Result<String> {
        log::trace!("GET {url} {params:?}");
        let mut request = self.agent.get(url);
        for (name, value) in params {
            request = request.query(*name, value);
        }
        finish(self.authorize(request).call())
    }

    fn post(&self, url: &str, payload: &Object) -> Result<String> {
        log::trace!("POST {url}");
        finish(self.authorize(self.agent.post(url)).send_json(payload))
    }

    fn patch(&self, url: &str, payload: &Object) -> Result<String> {
        log::trace!("PATCH {url}");
        finish(self.authorize(self.agent.patch(url)).send_json(payload))
    }

    fn delete(&self, url: &str) -> Result<String> {
        log::trace!("DELETE {url}");
        finish(self.authorize(self.agent.delete(url)).call())
    }
}

/// Read the body; non-success statuses become `Error::Http` carrying it verbatim.
fn finish(response: std::result::Result<Response<Body>, ureq::Error>) -> Result<String> {
    let mut response = response?;
    let status = response.status();
    let body = response.body_mut().read_to_string()?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(Error::Http(ApiError::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown"),
            body,
        )))
    }
}

#[derive(Debug, Deserialize)]
struct ListEnvelope<T> {
    results: Option<Vec<T>>,
}

#[derive(Debug, Deserialize)]
struct ItemEnvelope {
    #[serde(default)]
    result: Option<Object>,
}

/// Decode `{"results": [...]}`; a missing or null list is empty.
pub(crate) fn decode_results<T: serde::de::DeserializeOwned>(body: &str) -> Result<Vec<T>> {
    let envelope: ListEnvelope<T> = serde_json::from_str(body)?;
    Ok(envelope.results.unwrap_or_default())
}

/// Decode `{"result": {...}}`.
pub(crate) fn decode_result(body: &str) -> Result<Object> {
    let envelope: ItemEnvelope = serde_json::from_str(body)?;
    envelope
        .result
        .ok_or_else(|| Error::InvalidResponse("response has no `result` object".to_string()))
}

/// Query parameters of a list call.
fn list_params(query: &ListQuery<'_>, inherit: bool) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("_offset", query.offset.to_string()),
        ("_limit", query.limit.to_string()),
    ];
    if let Some(filter) = query.filter {
        params.push(("_filter", filter.to_string()));
    }
    if let Some(tag_filter) = query.tag_filter {
        params.push(("_tfilter", tag_filter.to_string()));
    }
    if !query.fields.is_empty() {
        params.push(("_fields", query.fields.join(",")));
    }
    if inherit {
        params.push(("_inherit", "full".to_string()));
    }
    params
}

/// One resource collection of the DDI API.
pub struct ResourceEndpoint<'a> {
    client: &'a HttpClient,
    descriptor: &'a ResourceDescriptor,
}

impl ResourceEndpoint<'_> {
    /// URL of the collection.
    #[must_use]
    pub fn collection_url(&self) -> String {
        self.client
            .url(self.descriptor.api_prefix, self.descriptor.collection)
    }

    /// URL of one object.
    ///
    /// Identifiers usually carry the collection path (`dns/view/<uuid>`,
    /// `infra/jointoken/<uuid>`); only the part after it is appended. Bare
    /// identifiers are appended as they are.
    #[must_use]
    pub fn item_url(&self, id: &str) -> String {
        let id = id.trim_start_matches('/');
        let collection = self.descriptor.collection;
        let marker = format!("{collection}/");
        let local = id
            .strip_prefix(marker.as_str())
            .or_else(|| id.split_once(&format!("/{marker}")).map(|(_, rest)| rest))
            .unwrap_or(id);
        self.client
            .url(self.descriptor.api_prefix, &format!("{collection}/{local}"))
    }

    fn read_params(&self) -> Vec<(&'static str, String)> {
        if self.descriptor.inherit {
            vec![("_inherit", "full".to_string())]
        } else {
            Vec::new()
        }
    }
}

impl ResourceClient for ResourceEndpoint<'_> {
    fn read(&self, id: &str) -> std::result::Result<Object, ClientError> {
        match self.client.get(&self.item_url(id), &self.read_params()) {
            Ok(body) => Ok(decode_result(&body)?),
            Err(Error::Http(api)) if api.status == Some(404) => {
                Err(ClientError::NotFound { id: id.to_string() })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self, query: &ListQuery<'_>) -> std::result::Result<Vec<Object>, ClientError> {
        let params = list_params(query, self.descriptor.inherit);
        let body = self.client.get(&self.collection_url(), &params)?;
        Ok(decode_results(&body)?)
    }

    fn create(&self, payload: &Object) -> std::result::Result<Object, ClientError> {
        let body = self.client.post(&self.collection_url(), payload)?;
        Ok(decode_result(&body)?)
    }

    fn update(&self, id: &str, payload: &Object) -> std::result::Result<Object, ClientError> {
        let body = self.client.patch(&self.item_url(id), payload)?;
        Ok(decode_result(&body)?)
    }

    fn delete(&self, id: &str) -> std::result::Result<(), ClientError> {
        self.client.delete(&self.item_url(id))?;
        Ok(())
    }
}

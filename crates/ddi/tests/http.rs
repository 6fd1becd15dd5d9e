//! Request and status mapping against a local HTTP server.

use ddi::{ClientConfig, HttpClient, catalog};
use declarative::{
    ApiError, ClientError, DesiredState, LifecycleState, ListQuery, ReconcileRequest, Reconciler,
    ResourceClient,
};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

fn client(server: &ServerGuard) -> HttpClient {
    HttpClient::new(ClientConfig::new(server.url(), "secret")).unwrap()
}

#[test]
fn test_read_404_is_not_found() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/ddi/v1/dns/view/missing")
        .match_query(Matcher::UrlEncoded("_inherit".into(), "full".into()))
        .match_header("authorization", "Token secret")
        .with_status(404)
        .with_body(r#"{"error": [{"message": "not found"}]}"#)
        .create();

    let client = client(&server);
    let views = client.resource(&catalog::DNS_VIEW);
    let err = views.read("dns/view/missing").unwrap_err();

    assert_eq!(
        err,
        ClientError::NotFound {
            id: "dns/view/missing".to_string()
        }
    );
    mock.assert();
}

#[test]
fn test_read_decodes_result() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/ddi/v1/dns/view/abc")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"result": {"id": "dns/view/abc", "name": "internal"}}"#)
        .create();

    let client = client(&server);
    let object = client
        .resource(&catalog::DNS_VIEW)
        .read("dns/view/abc")
        .unwrap();

    assert_eq!(object["name"], json!("internal"));
    mock.assert();
}

#[test]
fn test_error_body_kept_verbatim() {
    let body = r#"{"error": [{"message": "name is required"}]}"#;
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/api/ddi/v1/dns/view")
        .with_status(400)
        .with_body(body)
        .create();

    let client = client(&server);
    let payload = json!({"comment": "no name"}).as_object().cloned().unwrap();
    let err = client
        .resource(&catalog::DNS_VIEW)
        .create(&payload)
        .unwrap_err();

    assert_eq!(
        err,
        ClientError::Api(ApiError::new(400, "Bad Request", body))
    );
    mock.assert();
}

#[test]
fn test_list_sends_query_parameters() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/ddi/v1/dns/view")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("_offset".into(), "0".into()),
            Matcher::UrlEncoded("_limit".into(), "2".into()),
            Matcher::UrlEncoded("_filter".into(), "name=='internal'".into()),
            Matcher::UrlEncoded("_tfilter".into(), "env=='prod'".into()),
            Matcher::UrlEncoded("_inherit".into(), "full".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"results": [{"id": "dns/view/1", "name": "internal"}]}"#)
        .create();

    let client = client(&server);
    let query = ListQuery::new(2)
        .filter(Some("name=='internal'"))
        .tag_filter(Some("env=='prod'"));
    let page = client.resource(&catalog::DNS_VIEW).list(&query).unwrap();

    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["id"], json!("dns/view/1"));
    mock.assert();
}

#[test]
fn test_absent_by_unknown_id_is_noop() {
    let mut server = Server::new();
    let read = server
        .mock("GET", "/api/ddi/v1/dns/view/gone")
        .match_query(Matcher::Any)
        .with_status(404)
        .create();
    let delete = server
        .mock("DELETE", Matcher::Any)
        .expect(0)
        .create();

    let client = client(&server);
    let endpoint = client.resource(&catalog::DNS_VIEW);
    let request = ReconcileRequest::new(DesiredState::new())
        .with_id("dns/view/gone")
        .with_state(LifecycleState::Absent);
    let outcome = Reconciler::new(&endpoint, &catalog::DNS_VIEW)
        .run(&request)
        .unwrap();

    assert!(!outcome.changed);
    read.assert();
    delete.assert();
}

//! Client stub tests against a mocked service.
//!
//! These tests use wiremock to check how the stub encodes requests and how
//! it turns service failures back into typed errors.

use abook_core::{AddressBook, Error, PageRequest, Query, ServiceUrl, SourceId, ViewHandle};
use abook_rpc::{RpcAddressBook, RpcClient};
use futures_util::StreamExt;
use abook_rpc::endpoints::PEER_HEADER;
use serde_json::json;
use wiremock::matchers::{body_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_url(server: &MockServer) -> ServiceUrl {
    ServiceUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap()
}

async fn mount_ready(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/rpc/com.canonical.pim.AddressBook.isReady"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": true })))
        .mount(server)
        .await;
}

async fn connected(server: &MockServer) -> RpcAddressBook {
    mount_ready(server).await;
    RpcAddressBook::connect(mock_url(server)).await.unwrap()
}

#[tokio::test]
async fn test_connect_probes_service() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rpc/com.canonical.pim.AddressBook.isReady"))
        .and(header_exists(PEER_HEADER))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": false })))
        .expect(1)
        .mount(&server)
        .await;

    let book = RpcAddressBook::connect(mock_url(&server)).await.unwrap();
    assert!(!book.peer().is_empty());
}

#[tokio::test]
async fn test_connect_to_closed_port_is_connection_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let url = ServiceUrl::new(format!("http://127.0.0.1:{}", port)).unwrap();
    let err = RpcAddressBook::connect(url).await.unwrap_err();
    assert!(matches!(err, Error::Connection(_)), "unexpected {err:?}");
}

#[tokio::test]
async fn test_subscribe_to_closed_port_yields_connection_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let url = ServiceUrl::new(format!("http://127.0.0.1:{}", port)).unwrap();
    let book = RpcAddressBook::from_client(RpcClient::new(url, "peer-1").unwrap());
    let mut events = book.subscribe().unwrap();

    let first = events.next().await.expect("stream ended without an error");
    assert!(matches!(first, Err(Error::Connection(_))));
}

#[tokio::test]
async fn test_create_contact_sends_source() {
    let server = MockServer::start().await;
    let book = connected(&server).await;

    Mock::given(method("POST"))
        .and(path("/rpc/com.canonical.pim.AddressBook.createContact"))
        .and(body_json(json!({
            "vcard": "BEGIN:VCARD\nFN:X\nEND:VCARD",
            "sourceId": "S1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "abc123" })))
        .mount(&server)
        .await;

    let id = book
        .create_contact(
            "BEGIN:VCARD\nFN:X\nEND:VCARD",
            Some(&SourceId::new("S1").unwrap()),
        )
        .await
        .unwrap();
    assert_eq!(id.as_str(), "abc123");
}

#[tokio::test]
async fn test_not_found_maps_to_typed_error() {
    let server = MockServer::start().await;
    let book = connected(&server).await;

    Mock::given(method("POST"))
        .and(path("/rpc/com.canonical.pim.AddressBook.createContact"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "NotFoundError",
            "message": "source 'nope'"
        })))
        .mount(&server)
        .await;

    let err = book
        .create_contact("BEGIN:VCARD\nEND:VCARD", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(err.to_string(), "not found: source 'nope'");
}

#[tokio::test]
async fn test_closed_view_maps_to_invalid_state() {
    let server = MockServer::start().await;
    let book = connected(&server).await;

    Mock::given(method("POST"))
        .and(path("/rpc/com.canonical.pim.AddressBookView.contactsDetails"))
        .and(body_json(json!({
            "view": 7,
            "fields": [],
            "startIndex": 0,
            "pageSize": -1
        })))
        .respond_with(ResponseTemplate::new(410).set_body_json(json!({
            "error": "InvalidStateError",
            "message": "view view/7 is closed"
        })))
        .mount(&server)
        .await;

    let err = book
        .contacts_details(ViewHandle::new(7), &[], PageRequest::all())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn test_unexpected_failure_is_protocol_error() {
    let server = MockServer::start().await;
    let book = connected(&server).await;

    Mock::given(method("POST"))
        .and(path("/rpc/com.canonical.pim.AddressBook.query"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = book.query(&Query::all()).await.unwrap_err();
    match err {
        Error::Protocol(p) => assert_eq!(p.status, 503),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_success_body_is_protocol_error() {
    let server = MockServer::start().await;
    let book = connected(&server).await;

    Mock::given(method("POST"))
        .and(path("/rpc/com.canonical.pim.AddressBook.sortFields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "nope": 1 })))
        .mount(&server)
        .await;

    let err = book.sort_fields().await.unwrap_err();
    assert!(matches!(err, Error::Protocol(_)));
}

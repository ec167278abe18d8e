//! HTTP transport exposing any [`AddressBook`] over the RPC protocol.
//!
//! ## Routes
//!
//! - `POST /rpc/:method` - invoke a method. Body = JSON request, the
//!   `x-abook-peer` header names the calling peer.
//! - `GET /rpc/com.canonical.pim.AddressBook.subscribe` - websocket stream
//!   of change events, one JSON text frame per event.
//! - `GET /health` - `{ "ok": true, "ready": bool }`.

use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::StreamExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::{debug, info, instrument, warn};

use abook_core::error::{Error, NotFoundError, ProtocolError, ValidationError};
use abook_core::{
    AddressBook, ContactId, EventStream, PageRequest, Query, Result, SourceId, ViewHandle,
};

use crate::endpoints::*;

/// Build an axum `Router` serving `book`.
pub fn router<A>(book: Arc<A>) -> Router
where
    A: AddressBook + 'static,
    A::Events: 'static,
{
    Router::new()
        .route("/health", get(health_handler::<A>))
        .route(&format!("/rpc/{}", SUBSCRIBE), get(subscribe_handler::<A>))
        .route("/rpc/:method", post(call_handler::<A>))
        .with_state(book)
}

/// Serve `book` on an already bound listener until `shutdown` resolves.
pub async fn serve<A, F>(book: Arc<A>, listener: TcpListener, shutdown: F) -> std::io::Result<()>
where
    A: AddressBook + 'static,
    A::Events: 'static,
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Address book service listening");
    }
    axum::serve(listener, router(book))
        .with_graceful_shutdown(shutdown)
        .await
}

/// `GET /health`
async fn health_handler<A: AddressBook + 'static>(State(book): State<Arc<A>>) -> Response {
    match book.is_ready().await {
        Ok(ready) => Json(json!({ "ok": true, "ready": ready })).into_response(),
        Err(e) => error_response(e),
    }
}

/// `POST /rpc/:method`
async fn call_handler<A: AddressBook + 'static>(
    State(book): State<Arc<A>>,
    Path(method): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let peer = peer_from_headers(&headers);
    match dispatch(book.as_ref(), &method, peer.as_deref(), &body).await {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => {
            debug!(method, error = %e, "Call failed");
            error_response(e)
        }
    }
}

/// `GET /rpc/com.canonical.pim.AddressBook.subscribe`
async fn subscribe_handler<A>(State(book): State<Arc<A>>, ws: WebSocketUpgrade) -> Response
where
    A: AddressBook + 'static,
    A::Events: 'static,
{
    // Subscribe before upgrading so nothing emitted after the handshake is lost.
    match book.subscribe() {
        Ok(events) => ws.on_upgrade(move |socket| forward_events(socket, events)),
        Err(e) => error_response(e),
    }
}

#[instrument(skip(book, body))]
async fn dispatch<A: AddressBook>(
    book: &A,
    method: &str,
    peer: Option<&str>,
    body: &[u8],
) -> Result<Value> {
    match method {
        QUERY => {
            let mut query: Query = parse(body)?;
            query.owner = peer.map(str::to_string);
            reply(QueryResponse {
                view: book.query(&query).await?,
            })
        }
        CONTACTS_DETAILS => {
            let request: ContactsDetailsRequest = parse(body)?;
            check_owner(book, request.view, peer).await?;
            let page = PageRequest::from_wire(request.start_index, request.page_size);
            reply(ContactsDetailsResponse {
                contacts: book
                    .contacts_details(request.view, &request.fields, page)
                    .await?,
            })
        }
        VIEW_COUNT => {
            let request: ViewRequest = parse(body)?;
            check_owner(book, request.view, peer).await?;
            reply(CountResponse {
                count: book.view_count(request.view).await?,
            })
        }
        VIEW_CLOSE => {
            let request: ViewRequest = parse(body)?;
            check_owner(book, request.view, peer).await?;
            book.close_view(request.view).await?;
            reply(Empty {})
        }
        CREATE_CONTACT => {
            let request: CreateContactRequest = parse(body)?;
            let source = SourceId::parse_optional(&request.source_id)?;
            reply(CreateContactResponse {
                id: book.create_contact(&request.vcard, source.as_ref()).await?,
            })
        }
        UPDATE_CONTACTS => {
            let request: UpdateContactsRequest = parse(body)?;
            reply(CountResponse {
                count: book.update_contacts(&request.vcards).await?,
            })
        }
        REMOVE_CONTACTS => {
            let request: RemoveContactsRequest = parse(body)?;
            let ids = valid_ids(&request.ids);
            reply(CountResponse {
                count: book.remove_contacts(&ids).await?,
            })
        }
        AVAILABLE_SOURCES => reply(SourcesResponse {
            sources: book.available_sources().await?,
        }),
        CREATE_SOURCE => reply(FlagBody {
            value: book.create_source(parse(body)?).await?,
        }),
        REMOVE_SOURCE => {
            let request: RemoveSourceRequest = parse(body)?;
            reply(FlagBody {
                value: book.remove_source(&request.id).await?,
            })
        }
        RESET => reply(FlagBody {
            value: book.reset().await?,
        }),
        IS_READY => reply(FlagBody {
            value: book.is_ready().await?,
        }),
        SET_READY => {
            let request: FlagBody = parse(body)?;
            book.set_ready(request.value).await?;
            reply(Empty {})
        }
        SAFE_MODE => reply(FlagBody {
            value: book.safe_mode().await?,
        }),
        SET_SAFE_MODE => {
            let request: FlagBody = parse(body)?;
            book.set_safe_mode(request.value).await?;
            reply(Empty {})
        }
        SORT_FIELDS => reply(SortFieldsResponse {
            fields: book.sort_fields().await?,
        }),
        DISCONNECT => {
            let peer = peer.ok_or_else(|| ValidationError::Other {
                message: format!("disconnect requires the {} header", PEER_HEADER),
            })?;
            let count = book.release_views(peer).await?;
            info!(peer, released = count, "Peer disconnected");
            reply(CountResponse { count })
        }
        other => Err(ProtocolError::new(
            StatusCode::NOT_FOUND.as_u16(),
            Some("MethodNotFound".to_string()),
            Some(format!("unknown method '{}'", other)),
        )
        .into()),
    }
}

/// Views opened by a peer are visible to that peer only.
async fn check_owner<A: AddressBook>(
    book: &A,
    view: ViewHandle,
    peer: Option<&str>,
) -> Result<()> {
    match book.view_owner(view).await? {
        Some(owner) if peer != Some(owner.as_str()) => {
            debug!(%view, ?peer, "Rejected access to another peer's view");
            Err(NotFoundError::View {
                handle: view.to_string(),
            }
            .into())
        }
        _ => Ok(()),
    }
}

/// Ids that fail validation cannot match a contact and are dropped.
fn valid_ids(raw: &[String]) -> Vec<ContactId> {
    raw.iter()
        .filter_map(|id| match ContactId::new(id.as_str()) {
            Ok(id) => Some(id),
            Err(e) => {
                debug!(error = %e, "Skipping invalid contact id");
                None
            }
        })
        .collect()
}

async fn forward_events<S: EventStream + 'static>(mut socket: WebSocket, events: S) {
    info!("Event subscriber connected");
    let mut events = Box::pin(events);

    loop {
        tokio::select! {
            event = events.next() => match event {
                Some(Ok(event)) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(error = %e, "Failed to encode event");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Event source failed");
                    break;
                }
                None => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    info!("Event subscriber disconnected");
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| {
        ValidationError::Other {
            message: format!("invalid request body: {}", e),
        }
        .into()
    })
}

fn reply<T: Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| {
        ProtocolError::new(
            StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            None,
            Some(e.to_string()),
        )
        .into()
    })
}

fn peer_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(PEER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Duplicate(_) => StatusCode::CONFLICT,
        Error::InvalidState(_) => StatusCode::GONE,
        Error::Connection(_) => StatusCode::BAD_GATEWAY,
        Error::Protocol(p) => {
            StatusCode::from_u16(p.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn error_response(error: Error) -> Response {
    let status = status_for(&error);
    let body = ErrorResponse {
        error: Some(error.code().to_string()),
        message: Some(error.detail()),
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use abook_core::error::{InvalidStateError, NotFoundError};

    #[test]
    fn error_kinds_map_to_statuses() {
        let closed: Error = InvalidStateError::ViewClosed {
            handle: "view/1".to_string(),
        }
        .into();
        assert_eq!(status_for(&closed), StatusCode::GONE);

        let missing: Error = NotFoundError::PrimarySource.into();
        assert_eq!(status_for(&missing), StatusCode::NOT_FOUND);
    }

    #[test]
    fn empty_body_parses_as_empty_object() {
        let _: Empty = parse(b"").unwrap();
        let request: FlagBody = parse(br#"{"value": true}"#).unwrap();
        assert!(request.value);
        assert!(parse::<FlagBody>(b"{").is_err());
    }

    #[test]
    fn invalid_ids_are_dropped_from_batches() {
        let raw: Vec<String> = ["c1", "", " ", "c2"].map(String::from).to_vec();
        let ids = valid_ids(&raw);
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].as_str(), "c1");
        assert_eq!(ids[1].as_str(), "c2");
    }

    #[test]
    fn blank_peer_header_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(PEER_HEADER, " ".parse().unwrap());
        assert_eq!(peer_from_headers(&headers), None);
        headers.insert(PEER_HEADER, "peer-7".parse().unwrap());
        assert_eq!(peer_from_headers(&headers).as_deref(), Some("peer-7"));
    }
}

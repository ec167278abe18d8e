//! Event stream for the RPC-backed address book.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::{SinkExt, Stream, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, trace, warn};

use abook_core::error::{ConnectionError, Error, ProtocolError};
use abook_core::{DirectoryEvent, Result, ServiceUrl};

use crate::endpoints::SUBSCRIBE;

/// Change notifications received over a websocket.
pub struct RpcEvents {
    inner: Pin<Box<dyn Stream<Item = Result<DirectoryEvent>> + Send>>,
}

impl RpcEvents {
    pub(crate) fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<DirectoryEvent>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// Connect to the service's event endpoint.
    ///
    /// Returns once the subscription is established; events emitted after
    /// that point are delivered.
    pub async fn connect(url: &ServiceUrl) -> Result<Self> {
        let ws_url = url.ws_url(SUBSCRIBE);
        info!(url = %ws_url, "Subscribing to events");

        let (ws_stream, _) = connect_async(ws_url.as_str()).await.map_err(|e| {
            Error::Connection(ConnectionError::Connect {
                message: e.to_string(),
            })
        })?;

        debug!("WebSocket connected, listening for events");

        let stream = async_stream::stream! {
            let (mut write, mut read) = ws_stream.split();

            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        yield parse_event(text.as_str());
                    }
                    Ok(Message::Ping(data)) => {
                        trace!("Received ping");
                        if let Err(e) = write.send(Message::Pong(data)).await {
                            warn!(error = %e, "Failed to send pong");
                        }
                    }
                    Ok(Message::Close(frame)) => {
                        info!(?frame, "Event stream closed by server");
                        break;
                    }
                    Ok(Message::Binary(data)) => {
                        trace!(len = data.len(), "Ignoring binary message");
                    }
                    Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {}
                    Err(e) => {
                        error!(error = %e, "WebSocket error");
                        yield Err(Error::Connection(ConnectionError::Closed {
                            message: e.to_string(),
                        }));
                        break;
                    }
                }
            }
        };

        Ok(Self::new(stream))
    }
}

impl Stream for RpcEvents {
    type Item = Result<DirectoryEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

fn parse_event(text: &str) -> Result<DirectoryEvent> {
    serde_json::from_str(text).map_err(|e| {
        ProtocolError::new(101, None, Some(format!("invalid event frame: {}", e))).into()
    })
}

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace};

use super::constants::CONNECTION_TIMEOUT;
use super::payloads::Envelope;
use crate::domain::errors::{GatewayError, GatewayResult};
use crate::domain::ports::{Frame, Transport, TransportConnector, TransportEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, WsMessage>;
type WsReader = SplitStream<WsStream>;

const ABNORMAL_CLOSURE: u16 = 1006;

/// Opens WebSocket transports with `tokio-tungstenite`.
pub struct WebSocketConnector {
    connect_timeout: Duration,
}

impl WebSocketConnector {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            connect_timeout: CONNECTION_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for WebSocketConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransportConnector for WebSocketConnector {
    async fn connect(&self, url: &str) -> GatewayResult<Box<dyn Transport>> {
        let (ws_stream, _) = timeout(self.connect_timeout, connect_async(url))
            .await
            .map_err(|_| GatewayError::timeout("connection"))?
            .map_err(|e| GatewayError::connection_failed(e.to_string()))?;

        debug!(url = url, "WebSocket connected");
        Ok(Box::new(WebSocketTransport::new(ws_stream)))
    }
}

pub struct WebSocketTransport {
    writer: WsWriter,
    reader: WsReader,
    errored: bool,
}

impl WebSocketTransport {
    #[must_use]
    pub fn new(stream: WsStream) -> Self {
        let (writer, reader) = stream.split();
        Self {
            writer,
            reader,
            errored: false,
        }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&mut self, text: String) -> GatewayResult<()> {
        self.writer
            .send(WsMessage::Text(text.into()))
            .await
            .map_err(|e| GatewayError::websocket(e.to_string()))
    }

    async fn next_event(&mut self) -> Option<TransportEvent> {
        loop {
            match self.reader.next().await {
                Some(Ok(WsMessage::Text(text))) => {
                    return Some(TransportEvent::Message(Frame::Text(
                        text.as_str().to_owned(),
                    )));
                }
                Some(Ok(WsMessage::Binary(data))) => {
                    return Some(TransportEvent::Message(Frame::Binary(data)));
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    let (code, reason) = frame.map_or_else(
                        || (1000, "Normal closure".to_string()),
                        |f| (f.code.into(), f.reason.to_string()),
                    );
                    return Some(TransportEvent::Closed { code, reason });
                }
                // tungstenite queues the pong reply itself.
                Some(Ok(WsMessage::Ping(_))) => trace!("Ping received"),
                Some(Ok(WsMessage::Pong(_) | WsMessage::Frame(_))) => {}
                Some(Err(e)) => {
                    if self.errored {
                        return Some(TransportEvent::Closed {
                            code: ABNORMAL_CLOSURE,
                            reason: e.to_string(),
                        });
                    }
                    self.errored = true;
                    return Some(TransportEvent::Error(GatewayError::websocket(e.to_string())));
                }
                None => return None,
            }
        }
    }

    async fn close(&mut self) -> GatewayResult<()> {
        self.writer
            .close()
            .await
            .map_err(|e| GatewayError::websocket(e.to_string()))?;
        debug!("WebSocket connection closed");
        Ok(())
    }
}

/// Command for the task owning a transport.
#[derive(Debug)]
pub enum Outbound {
    Envelope(Envelope),
    Close,
}

/// Cloneable handle to the outbound queue of one connection.
///
/// The open flag is the transport's own view of its liveness: it is raised
/// when the transport opens and lowered when it closes.
#[derive(Debug, Clone)]
pub struct OutboundSender {
    tx: mpsc::UnboundedSender<Outbound>,
    open: Arc<AtomicBool>,
}

impl OutboundSender {
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                open: Arc::new(AtomicBool::new(false)),
            },
            rx,
        )
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst) && !self.tx.is_closed()
    }

    pub fn mark_open(&self) {
        self.open.store(true, Ordering::SeqCst);
    }

    pub fn mark_closed(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    /// Queues an envelope. Returns `false` if the transport is not open.
    pub fn send(&self, envelope: Envelope) -> bool {
        if !self.is_open() {
            return false;
        }
        self.tx.send(Outbound::Envelope(envelope)).is_ok()
    }

    /// Asks the owning task to close the transport.
    pub fn close(&self) {
        self.mark_closed();
        let _ = self.tx.send(Outbound::Close);
    }
}

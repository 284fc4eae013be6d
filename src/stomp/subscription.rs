use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::chat::{parse_stream_event, ChatEvent};
use crate::config::ClientConfig;
use crate::errors::AppError;
use crate::models::ChatMessageDraft;
use crate::normalize::{adapt_out_chat_message, parse_lenient};
use crate::stomp::StompFrame;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const EVENT_BUFFER: usize = 64;
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// A live subscription to one chat room's topic.
///
/// Pushed frames are classified into [`ChatEvent`]s by a background reader
/// task; outgoing frames go through a writer task. Both tasks are aborted
/// when the subscription is dropped.
pub struct ChatSubscription {
    room_id: i64,
    send_destination: String,
    events: mpsc::Receiver<ChatEvent>,
    outgoing: mpsc::UnboundedSender<Message>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl ChatSubscription {
    /// Opens the socket, completes the STOMP handshake and subscribes to the
    /// room topic. Fails if the broker does not answer CONNECTED within the
    /// configured timeout.
    pub async fn connect(config: &ClientConfig, room_id: i64) -> Result<Self, AppError> {
        let url = &config.chat_ws_url;
        info!(%url, room_id, "Connecting chat socket");

        let (socket, response) = connect_async(url.as_str()).await?;
        debug!(status = %response.status(), "Chat socket upgraded");
        let (mut sink, mut stream) = socket.split();

        sink.send(Message::Text(StompFrame::connect(&ws_host(url)).encode()))
            .await?;
        let connected = tokio::time::timeout(config.http_timeout, await_connected(&mut stream))
            .await
            .map_err(|_| AppError::SubscriptionClosed { stage: "handshake timeout" })??;
        debug!(version = ?connected.get_header("version"), "STOMP session established");

        let topic = config.topic_for(room_id);
        let subscription_id = format!("sub-{room_id}");
        sink.send(Message::Text(StompFrame::subscribe(&subscription_id, &topic).encode()))
            .await?;
        info!(%topic, "Subscribed to chat room");

        let (event_tx, events) = mpsc::channel(EVENT_BUFFER);
        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_loop(sink, outgoing_rx));
        let reader = tokio::spawn(read_loop(stream, event_tx, outgoing.clone()));

        Ok(Self {
            room_id,
            send_destination: config.send_destination_for(room_id),
            events,
            outgoing,
            reader,
            writer,
        })
    }

    pub fn room_id(&self) -> i64 {
        self.room_id
    }

    /// Next classified event, or `None` once the socket is gone.
    pub async fn next_event(&mut self) -> Option<ChatEvent> {
        self.events.recv().await
    }

    /// Publishes a chat line to the room.
    pub fn send(&self, draft: &ChatMessageDraft) -> Result<(), AppError> {
        let body = adapt_out_chat_message(draft).into_value().to_string();
        let frame = StompFrame::send(&self.send_destination, body);
        self.outgoing
            .send(Message::Text(frame.encode()))
            .map_err(|_| AppError::SubscriptionClosed { stage: "send" })
    }

    /// Sends DISCONNECT and closes the socket, waiting briefly for the writer
    /// to flush.
    pub async fn close(mut self) {
        let _ = self
            .outgoing
            .send(Message::Text(StompFrame::disconnect().encode()));
        let _ = self.outgoing.send(Message::Close(None));
        if tokio::time::timeout(CLOSE_GRACE, &mut self.writer).await.is_err() {
            warn!(room_id = self.room_id, "Chat socket did not close in time");
        }
    }
}

impl Drop for ChatSubscription {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

async fn await_connected(stream: &mut SplitStream<WsStream>) -> Result<StompFrame, AppError> {
    while let Some(msg) = stream.next().await {
        let text = match msg? {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        match StompFrame::decode(&text)? {
            Some(frame) if frame.command == "CONNECTED" => return Ok(frame),
            Some(frame) if frame.command == "ERROR" => return Err(broker_error(&frame)),
            _ => continue,
        }
    }
    Err(AppError::SubscriptionClosed { stage: "handshake" })
}

async fn write_loop(mut sink: SplitSink<WsStream, Message>, mut rx: mpsc::UnboundedReceiver<Message>) {
    while let Some(msg) = rx.recv().await {
        let closing = matches!(msg, Message::Close(_));
        if let Err(e) = sink.send(msg).await {
            warn!("Chat socket send failed: {e}");
            break;
        }
        if closing {
            break;
        }
    }
}

async fn read_loop(
    mut stream: SplitStream<WsStream>,
    events: mpsc::Sender<ChatEvent>,
    outgoing: mpsc::UnboundedSender<Message>,
) {
    while let Some(msg) = stream.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
            Ok(Message::Ping(data)) => {
                let _ = outgoing.send(Message::Pong(data));
                continue;
            }
            Ok(Message::Close(frame)) => {
                info!(?frame, "Chat socket closed by server");
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                warn!("Chat socket receive error: {e}");
                break;
            }
        };

        let frame = match StompFrame::decode(&text) {
            Ok(Some(frame)) => frame,
            Ok(None) => continue,
            Err(e) => {
                warn!("Skipping undecodable frame: {e}");
                continue;
            }
        };

        match frame.command.as_str() {
            "MESSAGE" => {
                let body = parse_lenient(&frame.body);
                if body.is_null() {
                    debug!("Skipping MESSAGE with non-JSON body");
                    continue;
                }
                let Some(event) = parse_stream_event(&body) else {
                    continue;
                };
                if events.send(event).await.is_err() {
                    debug!("Event receiver dropped, stopping reader");
                    break;
                }
            }
            "ERROR" => {
                warn!("{}", broker_error(&frame));
                break;
            }
            other => debug!(command = other, "Ignoring STOMP frame"),
        }
    }
}

fn broker_error(frame: &StompFrame) -> AppError {
    let message = frame
        .get_header("message")
        .map(str::to_string)
        .unwrap_or_else(|| frame.body.clone());
    AppError::StompError { message }
}

/// Host part of a URL, used for the CONNECT `host` header.
pub fn ws_host(url: &str) -> String {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    if let Some(bracketed) = host.strip_prefix('[') {
        return bracketed.split(']').next().unwrap_or(bracketed).to_string();
    }
    host.split(':').next().unwrap_or(host).to_string()
}

//! Per-connection plumbing: frame decoding, the reader and writer tasks, and
//! the blocking [`Conversation`] handed to the authentication engine.
//!
//! Only the writer task touches the outgoing half of the socket. The reader
//! forwards decoded replies into a single-slot queue that the conversation
//! drains, one reply per prompt.

use crate::error::{BridgeError, BridgeResult};
use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use nonstick_core::{ClientMessage, Conversation, ConversationError, ServerMessage, Style};
use std::fmt::Display;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Decode one inbound frame.
///
/// Returns `Ok(None)` for control frames that carry no reply.
pub fn decode_frame(frame: Message, max_frame_bytes: usize) -> BridgeResult<Option<ClientMessage>> {
    let text = match &frame {
        Message::Text(text) => text.as_str(),
        Message::Binary(data) => std::str::from_utf8(data).map_err(|_| BridgeError::NonUtf8Frame)?,
        Message::Ping(_) | Message::Pong(_) => return Ok(None),
        Message::Close(_) => return Err(BridgeError::ConnectionClosed),
    };

    if text.len() > max_frame_bytes {
        return Err(BridgeError::FrameTooLarge {
            size: text.len(),
            limit: max_frame_bytes,
        });
    }
    Ok(Some(serde_json::from_str(text)?))
}

pub fn encode_frame(message: &ServerMessage) -> BridgeResult<Message> {
    Ok(Message::Text(serde_json::to_string(message)?.into()))
}

/// Drain `outbound` onto the socket, closing it when the channel ends or the
/// session is cancelled.
pub(crate) async fn write_frames<W>(
    mut sink: W,
    mut outbound: mpsc::UnboundedReceiver<ServerMessage>,
    cancel: CancellationToken,
) -> BridgeResult<()>
where
    W: Sink<Message> + Unpin,
    W::Error: Display,
{
    let result = loop {
        let message = tokio::select! {
            biased;
            message = outbound.recv() => message,
            _ = cancel.cancelled() => None,
        };
        let Some(message) = message else {
            break Ok(());
        };

        debug!("Sending {} frame", message.kind);
        let frame = encode_frame(&message)?;
        if let Err(e) = sink.send(frame).await {
            break Err(BridgeError::Transport(e.to_string()));
        }
    };

    if let Err(e) = sink.close().await {
        debug!("Closing socket failed: {}", e);
    }
    result
}

/// Decode client frames into `inbound` until the connection ends, a frame is
/// rejected, or the session is cancelled.
pub(crate) async fn read_frames<R, E>(
    mut stream: R,
    inbound: mpsc::Sender<ClientMessage>,
    cancel: CancellationToken,
    max_frame_bytes: usize,
) -> BridgeResult<()>
where
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            frame = stream.next() => frame,
        };

        let message = match frame {
            None => return Err(BridgeError::ConnectionClosed),
            Some(Err(e)) => return Err(BridgeError::Transport(e.to_string())),
            Some(Ok(frame)) => match decode_frame(frame, max_frame_bytes)? {
                Some(message) => message,
                None => continue,
            },
        };

        // A read may complete after teardown started; drop it instead of queueing.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            sent = inbound.send(message) => {
                if sent.is_err() {
                    return Ok(());
                }
            }
        }
    }
}

/// The engine's view of a connected client.
///
/// Runs on a blocking thread; waits for replies by blocking on the runtime.
pub struct SocketConversation {
    outbound: mpsc::UnboundedSender<ServerMessage>,
    inbound: mpsc::Receiver<ClientMessage>,
    cancel: CancellationToken,
    reply_timeout: Option<Duration>,
    runtime: Handle,
}

impl SocketConversation {
    pub fn new(
        outbound: mpsc::UnboundedSender<ServerMessage>,
        inbound: mpsc::Receiver<ClientMessage>,
        cancel: CancellationToken,
        reply_timeout: Option<Duration>,
        runtime: Handle,
    ) -> Self {
        Self {
            outbound,
            inbound,
            cancel,
            reply_timeout,
            runtime,
        }
    }

    async fn next_reply(&mut self) -> BridgeResult<ClientMessage> {
        let Self {
            inbound,
            cancel,
            reply_timeout,
            ..
        } = self;

        let wait = async {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(BridgeError::ConnectionClosed),
                reply = inbound.recv() => reply.ok_or(BridgeError::ConnectionClosed),
            }
        };

        match reply_timeout {
            Some(limit) => tokio::time::timeout(*limit, wait)
                .await
                .map_err(|_| BridgeError::ReplyTimeout)?,
            None => wait.await,
        }
    }
}

impl Conversation for SocketConversation {
    fn respond(&mut self, style: Style, message: &str) -> Result<Option<String>, ConversationError> {
        if self.cancel.is_cancelled() {
            return Err(ConversationError::Closed);
        }

        debug!("Engine {:?}: {}", style, message);
        self.outbound
            .send(ServerMessage::new(style.message_type(), message))
            .map_err(|_| ConversationError::Closed)?;

        if !style.expects_reply() {
            return Ok(None);
        }

        let runtime = self.runtime.clone();
        match runtime.block_on(self.next_reply()) {
            Ok(reply) => Ok(Some(reply.input)),
            Err(e) => {
                warn!("No reply to prompt: {}", e);
                Err(e.into())
            }
        }
    }
}

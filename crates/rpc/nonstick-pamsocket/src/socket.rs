//! Session entry point: wires one connection to the login flow and the
//! authentication engine.

use crate::config::BridgeConfig;
use crate::session::{SocketConversation, read_frames, write_frames};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::{Sink, Stream, StreamExt};
use nonstick_core::{
    AccountDirectory, AuthEngine, ClientMessage, EngineError, FlowRequest, LoginFlow,
    ServerMessage,
};
use std::fmt::Display;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, debug, error, info, info_span, warn};
use uuid::Uuid;

/// Shown when credentials are rejected.
pub const AUTHENTICATION_FAILED: &str = "Authentication failed.";
/// Shown for failures whose details must stay on the server.
pub const INTERNAL_ERROR: &str = "Internal error";

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The authorization server already knew the user; no credentials were asked for.
    Recognized,
    /// Credentials were accepted for `subject`.
    Authenticated { subject: String },
    PreLoginFailed,
    EngineUnavailable,
    Rejected,
    IdentityLookupFailed,
    CallbackFailed,
}

/// Bridges browser WebSocket connections to the authentication engine.
#[derive(Clone)]
pub struct PamSocket {
    engine: Arc<dyn AuthEngine>,
    flow: Arc<dyn LoginFlow>,
    accounts: Arc<dyn AccountDirectory>,
    config: BridgeConfig,
}

impl PamSocket {
    pub fn new(
        engine: Arc<dyn AuthEngine>,
        flow: Arc<dyn LoginFlow>,
        accounts: Arc<dyn AccountDirectory>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            engine,
            flow,
            accounts,
            config,
        }
    }

    /// Complete the WebSocket upgrade and run a session on the new connection.
    pub fn upgrade(self, upgrade: WebSocketUpgrade, request: FlowRequest) -> Response {
        upgrade
            .max_message_size(self.config.max_frame_bytes)
            .on_failed_upgrade(|e| warn!("WebSocket upgrade failed: {}", e))
            .on_upgrade(move |socket| async move {
                self.serve(socket, request).await;
            })
    }

    pub async fn serve(&self, socket: WebSocket, request: FlowRequest) -> SessionOutcome {
        let (sink, stream) = socket.split();
        self.run(sink, stream, request).await
    }

    /// Run one session over an already split connection.
    ///
    /// The connection is closed before this returns, whatever the outcome.
    pub async fn run<W, R, E>(&self, sink: W, stream: R, request: FlowRequest) -> SessionOutcome
    where
        W: Sink<Message> + Unpin + Send + 'static,
        W::Error: Display,
        R: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
        E: Display + Send + 'static,
    {
        let span = info_span!("pam_session", id = %Uuid::new_v4());
        async move {
            info!("Session started");
            let outcome = self.drive(sink, stream, request).await;
            info!("Session finished: {:?}", outcome);
            outcome
        }
        .instrument(span)
        .await
    }

    async fn drive<W, R, E>(&self, sink: W, stream: R, request: FlowRequest) -> SessionOutcome
    where
        W: Sink<Message> + Unpin + Send + 'static,
        W::Error: Display,
        R: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
        E: Display + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let _cancel_on_drop = cancel.clone().drop_guard();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::channel(1);

        let writer = tokio::spawn(
            write_frames(sink, outbound_rx, cancel.clone()).instrument(Span::current()),
        );
        let reader = ReaderTask::spawn(stream, inbound_tx, cancel.clone(), self.config.max_frame_bytes);

        let outcome = self
            .converse(&request, outbound_tx, inbound_rx, cancel.clone())
            .await;

        // Every sender is gone now, so the writer flushes what is queued and
        // closes the socket.
        match writer.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("Writer stopped: {}", e),
            Err(e) => error!("Writer task failed: {}", e),
        }
        cancel.cancel();
        drop(reader);
        outcome
    }

    async fn converse(
        &self,
        request: &FlowRequest,
        outbound: mpsc::UnboundedSender<ServerMessage>,
        inbound: mpsc::Receiver<ClientMessage>,
        cancel: CancellationToken,
    ) -> SessionOutcome {
        let send = |message: ServerMessage| {
            if outbound.send(message).is_err() {
                debug!("Connection already closed, dropping final frame");
            }
        };

        match self.flow.pre_login(request).await {
            Err(e) => {
                warn!("Pre-login check failed: {}", e);
                send(ServerMessage::error(e.to_string()));
                return SessionOutcome::PreLoginFailed;
            }
            Ok(Some(redirect)) => {
                info!("Login already known to the authorization server");
                send(ServerMessage::redirect(redirect));
                return SessionOutcome::Recognized;
            }
            Ok(None) => {}
        }

        let conversation = SocketConversation::new(
            outbound.clone(),
            inbound,
            cancel,
            self.config.reply_timeout(),
            Handle::current(),
        );
        let engine = self.engine.clone();
        let span = Span::current();
        let result = tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            engine.authenticate(Box::new(conversation))
        })
        .await;

        let login = match result {
            Ok(Ok(login)) => login,
            Ok(Err(EngineError::Start(e))) => {
                error!("Authentication engine failed to start: {}", e);
                return SessionOutcome::EngineUnavailable;
            }
            Ok(Err(EngineError::Authentication(e))) => {
                info!("Authentication rejected: {}", e);
                send(ServerMessage::error(AUTHENTICATION_FAILED));
                return SessionOutcome::Rejected;
            }
            Ok(Err(e @ EngineError::Item(_))) => {
                error!("{}", e);
                send(ServerMessage::error(INTERNAL_ERROR));
                return SessionOutcome::IdentityLookupFailed;
            }
            Err(e) => {
                error!("Authentication engine task failed: {}", e);
                send(ServerMessage::error(INTERNAL_ERROR));
                return SessionOutcome::EngineUnavailable;
            }
        };

        let subject = match self.accounts.by_login(&login) {
            Ok(account) => account.subject(),
            Err(e) => {
                error!("Account lookup for '{}' failed: {}", login, e);
                send(ServerMessage::error(INTERNAL_ERROR));
                return SessionOutcome::IdentityLookupFailed;
            }
        };
        info!("Authenticated '{}' as subject {}", login, subject);

        match self.flow.authenticated(request, &subject).await {
            Ok(redirect) => {
                send(ServerMessage::redirect(redirect));
                SessionOutcome::Authenticated { subject }
            }
            Err(e) => {
                warn!("Completing login failed: {}", e);
                send(ServerMessage::error(e.to_string()));
                SessionOutcome::CallbackFailed
            }
        }
    }
}

/// Reader task that is aborted when dropped.
///
/// Cancellation only stops the reader between frames; aborting also drops
/// the socket's read half while a read is pending.
struct ReaderTask(JoinHandle<()>);

impl ReaderTask {
    fn spawn<R, E>(
        stream: R,
        inbound: mpsc::Sender<ClientMessage>,
        cancel: CancellationToken,
        max_frame_bytes: usize,
    ) -> Self
    where
        R: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
        E: Display + Send + 'static,
    {
        let task = async move {
            match read_frames(stream, inbound, cancel.clone(), max_frame_bytes).await {
                Ok(()) => debug!("Reader stopped"),
                Err(e) if e.is_protocol_violation() => {
                    warn!("Closing connection: {}", e);
                    cancel.cancel();
                }
                Err(e) => {
                    debug!("Client went away: {}", e);
                    cancel.cancel();
                }
            }
        };
        Self(tokio::spawn(task.instrument(Span::current())))
    }
}

impl Drop for ReaderTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

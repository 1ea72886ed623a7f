use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use log::*;
use relay::lifecycle::ConnectionContext;
use relay::message::ChatEvent;
use relay::transport::OutboundSender;
use relay::Manager;
use service::config::Config;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{interval, timeout};

/// How often a connection is pinged and how long it has to answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Heartbeat {
    pub(crate) ping_interval: Duration,
    pub(crate) pong_timeout: Duration,
}

impl Heartbeat {
    pub(crate) fn from_config(config: &Config) -> Self {
        Self {
            ping_interval: Duration::from_secs(config.ws_ping_interval_secs),
            pong_timeout: Duration::from_secs(config.ws_pong_timeout_secs),
        }
    }
}

/// Drive one admitted WebSocket connection until it closes.
///
/// A writer task forwards the connection's outbound queue to the socket and a
/// heartbeat task pings the client through that same queue. This task reads
/// inbound frames and hands them to the relay. The connection is released as
/// soon as any of the three stops: the peer closed or errored, the writer could
/// not write, or a ping went unanswered.
pub(crate) async fn run_connection(
    socket: WebSocket,
    manager: Arc<Manager>,
    context: ConnectionContext,
    ping_tx: OutboundSender,
    rx: UnboundedReceiver<Message>,
    heartbeat: Heartbeat,
) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let (pong_tx, pong_rx) = mpsc::unbounded_channel::<()>();

    let mut writer_handle = tokio::spawn(writer_task(ws_sender, rx));
    let mut heartbeat_handle = tokio::spawn(heartbeat_task(ping_tx, pong_rx, heartbeat));

    info!(
        "WebSocket connection {} opened for user {}",
        context.connection_id(),
        context.user_id()
    );

    loop {
        tokio::select! {
            frame = ws_receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<ChatEvent>(&text) {
                    Ok(event) => {
                        manager.dispatch(&context, &event);
                    }
                    Err(e) => {
                        warn!(
                            "Ignoring malformed frame on connection {}: {e}",
                            context.connection_id()
                        );
                    }
                },
                Some(Ok(Message::Pong(_))) => {
                    let _ = pong_tx.send(());
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(
                        "Connection {} sent close frame {:?}",
                        context.connection_id(),
                        frame
                    );
                    break;
                }
                // Pings are answered by axum; binary frames are not part of the protocol
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(
                        "WebSocket receive error on connection {}: {e}",
                        context.connection_id()
                    );
                    break;
                }
                None => break,
            },
            _ = &mut heartbeat_handle => {
                warn!(
                    "Connection {} stopped answering pings",
                    context.connection_id()
                );
                break;
            }
            _ = &mut writer_handle => {
                warn!(
                    "Connection {} can no longer be written to",
                    context.connection_id()
                );
                break;
            }
        }
    }

    manager.disconnect(&context);
    writer_handle.abort();
    heartbeat_handle.abort();

    info!(
        "WebSocket connection {} closed for user {}",
        context.connection_id(),
        context.user_id()
    );
}

async fn writer_task(
    mut ws_sender: SplitSink<WebSocket, Message>,
    mut rx: UnboundedReceiver<Message>,
) {
    while let Some(message) = rx.recv().await {
        if ws_sender.send(message).await.is_err() {
            break;
        }
    }
}

/// Ping every `ping_interval` and return once a pong does not arrive within `pong_timeout`.
async fn heartbeat_task(
    ping_tx: UnboundedSender<Message>,
    mut pong_rx: UnboundedReceiver<()>,
    heartbeat: Heartbeat,
) {
    let mut ping_timer = interval(heartbeat.ping_interval);
    // The first tick completes immediately
    ping_timer.tick().await;

    loop {
        ping_timer.tick().await;

        // Only a pong to this ping counts
        while pong_rx.try_recv().is_ok() {}

        if ping_tx.send(Message::Ping(b"relay".to_vec())).is_err() {
            return;
        }

        match timeout(heartbeat.pong_timeout, pong_rx.recv()).await {
            Ok(Some(())) => {}
            _ => return,
        }
    }
}

//! Per-connection handler: decode actions, dispatch, deliver events.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! Two flows share the socket:
//!
//! 1. request/reply — decode a [`ClientAction`], dispatch it, send the
//!    reply envelope back to this connection only;
//! 2. broadcast — events the room actors address to this player arrive
//!    on an unbounded channel and a writer task pumps them out.

use std::sync::Arc;

use parlor_protocol::{ClientAction, Codec, Envelope, ServerEvent};
use parlor_store::Store;
use parlor_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::{GameController, ParlorError};

/// Drop guard that runs the disconnect flow when the handler exits.
///
/// `Drop` is synchronous, so the async cleanup is spawned as a
/// fire-and-forget task. This fires on clean close, on error, and on
/// panic alike.
struct DisconnectGuard<S: Store> {
    connection: ConnectionId,
    controller: Arc<GameController<S>>,
}

impl<S: Store> Drop for DisconnectGuard<S> {
    fn drop(&mut self) {
        let connection = self.connection;
        let controller = Arc::clone(&self.controller);
        tokio::spawn(async move {
            controller.disconnect(connection).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S, C>(
    conn: WebSocketConnection,
    controller: Arc<GameController<S>>,
    codec: C,
) -> Result<(), ParlorError>
where
    S: Store,
    C: Codec + Clone,
{
    let connection = conn.id();
    tracing::debug!(%connection, "handling new connection");
    let conn = Arc::new(conn);

    let _guard = DisconnectGuard {
        connection,
        controller: Arc::clone(&controller),
    };

    // Outbound pump: events addressed to this player become envelopes.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerEvent>();
    let writer_conn = Arc::clone(&conn);
    let writer_codec = codec.clone();
    let writer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match writer_codec.encode(&Envelope::ok(event)) {
                Ok(text) => {
                    if writer_conn.send(&text).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(%connection, error = %e, "failed to encode event");
                }
            }
        }
    });

    // Inbound loop: one action per frame, one reply per action.
    loop {
        let text = match conn.recv().await {
            Ok(Some(text)) => text,
            Ok(None) => {
                tracing::debug!(%connection, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%connection, error = %e, "recv error");
                break;
            }
        };

        let reply = match codec.decode::<ClientAction>(&text) {
            Ok(action) => {
                controller
                    .dispatch(connection, action, event_tx.clone())
                    .await
            }
            // Malformed input fails closed: an error envelope to the
            // sender, nothing dispatched, nothing broadcast.
            Err(e) => ParlorError::from(e).to_envelope(),
        };

        let encoded = codec.encode(&reply)?;
        if conn.send(&encoded).await.is_err() {
            break;
        }
    }

    writer.abort();
    // _guard drops here → disconnect flow fires.
    Ok(())
}

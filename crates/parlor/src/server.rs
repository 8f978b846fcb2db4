//! `ParlorServer` builder and accept loop.

use std::sync::Arc;

use parlor_protocol::{Codec, JsonCodec};
use parlor_room::RoomConfig;
use parlor_session::BinderConfig;
use parlor_store::Store;
use parlor_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{GameController, ParlorError};

/// Builder for configuring and starting a Parlor server.
///
/// # Example
///
/// ```rust,no_run
/// use parlor::ParlorServerBuilder;
/// use parlor_store::MemoryStore;
///
/// # async fn run() -> Result<(), parlor::ParlorError> {
/// let server = ParlorServerBuilder::new()
///     .bind("0.0.0.0:3080")
///     .build(MemoryStore::new())
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ParlorServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    binder_config: BinderConfig,
}

impl ParlorServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3080".to_string(),
            room_config: RoomConfig::default(),
            binder_config: BinderConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the room configuration (reserved cards, store timeout).
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Sets the session binder configuration.
    pub fn binder_config(mut self, config: BinderConfig) -> Self {
        self.binder_config = config;
        self
    }

    /// Builds the server over the given store.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport` as defaults.
    pub async fn build<S: Store>(
        self,
        store: S,
    ) -> Result<ParlorServer<S, JsonCodec>, ParlorError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let controller = Arc::new(GameController::new(
            Arc::new(store),
            self.room_config,
            self.binder_config,
        ));
        Ok(ParlorServer {
            transport,
            controller,
            codec: JsonCodec,
        })
    }
}

impl Default for ParlorServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Parlor game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ParlorServer<S, C> {
    transport: WebSocketTransport,
    controller: Arc<GameController<S>>,
    codec: C,
}

impl<S, C> ParlorServer<S, C>
where
    S: Store,
    C: Codec + Clone,
{
    /// Creates a new builder.
    pub fn builder() -> ParlorServerBuilder {
        ParlorServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop: one handler task per connection, until the
    /// process is terminated.
    pub async fn run(mut self) -> Result<(), ParlorError> {
        tracing::info!("Parlor server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let controller = Arc::clone(&self.controller);
                    let codec = self.codec.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, controller, codec).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

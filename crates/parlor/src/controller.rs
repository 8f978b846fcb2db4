//! The game controller: one inbound action, end to end.
//!
//! Every action follows the same shape: sanitize the inputs, authorize
//! the credentials against the roster, route to the target room's actor,
//! and turn the outcome into a reply envelope. Broadcasts happen inside
//! the room actor, so a failed action can never half-announce itself.

use std::sync::Arc;
use std::time::Duration;

use parlor_protocol::{
    ClientAction, Envelope, PlayerKey, RoomCode, Secret, ServerEvent, sanitize,
};
use parlor_room::{EventSender, RoomConfig, RoomError, RoomHandle, RoomRegistry};
use parlor_session::{BinderConfig, IdentityVerifier, SessionBinder, generate_secret};
use parlor_store::{PlayerRow, Store};
use parlor_transport::ConnectionId;
use tokio::sync::Mutex;

use crate::ParlorError;

/// How a handled action answers its requester.
enum Reply {
    /// A full event in the direct reply (create/join/rejoin/leave).
    Event(ServerEvent),
    /// A bare ack; the payload went out as a room-wide broadcast the
    /// requester also receives.
    Ack,
    /// The benign-race outcome: overtaken, silently dropped.
    Dropped,
}

/// Orchestrates rooms, sessions, and persistence for inbound actions.
///
/// Shared across connection handler tasks behind an `Arc`; the binder
/// and registry get interior mutability via async mutexes, locked only
/// long enough to look up or update, never across a room transition.
pub struct GameController<S> {
    store: Arc<S>,
    verifier: IdentityVerifier,
    binder: Mutex<SessionBinder>,
    registry: Mutex<RoomRegistry<S>>,
    store_timeout: Duration,
}

impl<S: Store> GameController<S> {
    /// Creates a controller over the given store.
    pub fn new(store: Arc<S>, room_config: RoomConfig, binder_config: BinderConfig) -> Self {
        Self {
            verifier: IdentityVerifier::new(),
            binder: Mutex::new(SessionBinder::new(binder_config)),
            registry: Mutex::new(RoomRegistry::new(
                Arc::clone(&store),
                room_config.clone(),
            )),
            store_timeout: room_config.store_timeout,
            store,
        }
    }

    /// Handles one action and produces the reply envelope for the
    /// requester. Errors go only to the requester, never to the room.
    pub async fn dispatch(
        &self,
        connection: ConnectionId,
        action: ClientAction,
        sender: EventSender,
    ) -> Envelope {
        match self.handle(connection, action, sender).await {
            Ok(Reply::Event(event)) => Envelope::ok(event),
            Ok(Reply::Ack) => Envelope::ack(),
            Ok(Reply::Dropped) => Envelope::dropped(),
            Err(e) => {
                tracing::debug!(%connection, error = %e, "action rejected");
                e.to_envelope()
            }
        }
    }

    async fn handle(
        &self,
        connection: ConnectionId,
        action: ClientAction,
        sender: EventSender,
    ) -> Result<Reply, ParlorError> {
        match action {
            ClientAction::CreateGame { player_name } => {
                self.create_game(connection, &player_name, sender).await
            }
            ClientAction::JoinGame {
                player_name,
                room_code,
                player_key,
                player_secret,
            } => {
                self.join_game(
                    connection,
                    &player_name,
                    &room_code,
                    player_key,
                    player_secret.as_deref(),
                    sender,
                )
                .await
            }
            ClientAction::RejoinGame {
                player_key,
                player_secret,
            } => {
                self.rejoin_game(connection, player_key, &player_secret, sender)
                    .await
            }
            ClientAction::LeaveGame {
                player_key,
                player_secret,
            } => self.leave_game(player_key, &player_secret).await,
            ClientAction::StartGame {
                room_code,
                player_key,
                player_secret,
            } => {
                self.start_game(&room_code, player_key, &player_secret)
                    .await
            }
            ClientAction::SendGuess {
                player_key,
                player_secret,
                room_code,
                answer_index,
            } => {
                self.send_guess(player_key, &player_secret, room_code.as_deref(), answer_index)
                    .await
            }
            ClientAction::RevealAnswer {
                player_key,
                player_secret,
                room_code,
            } => {
                self.reveal_answer(&room_code, player_key, &player_secret)
                    .await
            }
            ClientAction::ProgressQuestions {
                player_key,
                player_secret,
                room_code,
            } => {
                self.progress_questions(&room_code, player_key, &player_secret)
                    .await
            }
        }
    }

    // -- Roster actions ---------------------------------------------------

    async fn create_game(
        &self,
        connection: ConnectionId,
        raw_name: &str,
        sender: EventSender,
    ) -> Result<Reply, ParlorError> {
        let name = sanitize::player_name(raw_name)?;
        let secret = generate_secret();

        let (code, handle) = {
            let mut registry = self.registry.lock().await;
            registry.create().await?
        };

        let outcome = handle.join(name, secret.clone(), sender).await?;
        self.binder
            .lock()
            .await
            .bind(connection, outcome.key, secret.clone())?;

        tracing::info!(room = %code, player = %outcome.key, "game created");
        Ok(Reply::Event(ServerEvent::GameCreated {
            player_key: outcome.key,
            player_secret: secret,
            room: outcome.room,
            roster: outcome.roster,
        }))
    }

    async fn join_game(
        &self,
        connection: ConnectionId,
        raw_name: &str,
        raw_code: &str,
        key: Option<PlayerKey>,
        raw_secret: Option<&str>,
        sender: EventSender,
    ) -> Result<Reply, ParlorError> {
        // A credential pair on a join request means "I was here before":
        // a valid pair is piped to the rejoin path, an invalid one is
        // rejected before any mutation.
        if let (Some(key), Some(raw_secret)) = (key, raw_secret) {
            let secret = sanitize::secret(raw_secret)?;
            let row = self.verify(key, &secret, None).await?;
            return self.rebind(connection, row, secret, sender).await;
        }

        let name = sanitize::player_name(raw_name)?;
        let code = sanitize::room_code(raw_code)?;
        let handle = self.find_room(&code).await?;

        let secret = generate_secret();
        let outcome = handle.join(name, secret.clone(), sender).await?;
        self.binder
            .lock()
            .await
            .bind(connection, outcome.key, secret.clone())?;

        tracing::info!(room = %code, player = %outcome.key, "player joined game");
        Ok(Reply::Event(ServerEvent::GameJoined {
            player_key: outcome.key,
            player_secret: secret,
            room: outcome.room,
            roster: outcome.roster,
        }))
    }

    async fn rejoin_game(
        &self,
        connection: ConnectionId,
        key: PlayerKey,
        raw_secret: &str,
        sender: EventSender,
    ) -> Result<Reply, ParlorError> {
        let secret = sanitize::secret(raw_secret)?;
        // The room code is resolved from the credentials alone; a
        // reconnecting client may not remember where it was.
        let row = self.verify(key, &secret, None).await?;
        self.rebind(connection, row, secret, sender).await
    }

    /// Shared tail of the two rejoin entrances: reactivate the player in
    /// their room and bind this connection to the identity.
    async fn rebind(
        &self,
        connection: ConnectionId,
        row: PlayerRow,
        secret: Secret,
        sender: EventSender,
    ) -> Result<Reply, ParlorError> {
        let handle = self.find_room(&row.room).await?;
        let outcome = handle.rejoin(row.key, sender).await?;
        self.binder.lock().await.bind(connection, row.key, secret)?;

        tracing::info!(room = %row.room, player = %row.key, "player rejoined game");
        Ok(Reply::Event(ServerEvent::GameRejoined {
            player_key: outcome.key,
            room: outcome.room,
            roster: outcome.roster,
        }))
    }

    async fn leave_game(&self, key: PlayerKey, raw_secret: &str) -> Result<Reply, ParlorError> {
        let secret = sanitize::secret(raw_secret)?;
        let row = self.verify(key, &secret, None).await?;

        let handle = self.find_room(&row.room).await?;
        let roster = handle.leave(key).await?;
        self.binder.lock().await.unbind_player(key);

        tracing::info!(room = %row.room, player = %key, "player left game");
        Ok(Reply::Event(ServerEvent::GameLeft {
            player_key: key,
            roster,
        }))
    }

    /// Transport-derived disconnect: no payload, no reply. Marks the
    /// bound player inactive; a connection with no binding is a no-op.
    pub async fn disconnect(&self, connection: ConnectionId) {
        let Some(binding) = self.binder.lock().await.unbind(connection) else {
            return;
        };

        let row = match self.verify(binding.key, &binding.secret, None).await {
            Ok(row) => row,
            // The identity is already gone (explicit leave won the race).
            Err(e) => {
                tracing::debug!(player = %binding.key, error = %e, "no identity at disconnect");
                return;
            }
        };

        match self.find_room(&row.room).await {
            Ok(handle) => {
                if let Err(e) = handle.disconnect(binding.key).await {
                    tracing::warn!(room = %row.room, player = %binding.key, error = %e, "disconnect not delivered");
                }
            }
            Err(e) => {
                tracing::debug!(room = %row.room, error = %e, "room gone at disconnect");
            }
        }
    }

    // -- Round actions ----------------------------------------------------

    async fn start_game(
        &self,
        raw_code: &str,
        key: PlayerKey,
        raw_secret: &str,
    ) -> Result<Reply, ParlorError> {
        let secret = sanitize::secret(raw_secret)?;
        let code = sanitize::room_code(raw_code)?;
        self.verify(key, &secret, Some(&code)).await?;

        let handle = self.find_room(&code).await?;
        match handle.start().await? {
            Some(_) => Ok(Reply::Ack),
            None => Ok(Reply::Dropped),
        }
    }

    async fn send_guess(
        &self,
        key: PlayerKey,
        raw_secret: &str,
        raw_code: Option<&str>,
        answer: Option<u32>,
    ) -> Result<Reply, ParlorError> {
        let secret = sanitize::secret(raw_secret)?;
        let code = raw_code.map(sanitize::room_code).transpose()?;
        let row = self.verify(key, &secret, code.as_ref()).await?;

        // With no code supplied, the player's row names the room.
        let code = code.unwrap_or(row.room);
        let handle = self.find_room(&code).await?;
        match handle.guess(key, answer).await? {
            Some(_) => Ok(Reply::Ack),
            None => Ok(Reply::Dropped),
        }
    }

    async fn reveal_answer(
        &self,
        raw_code: &str,
        key: PlayerKey,
        raw_secret: &str,
    ) -> Result<Reply, ParlorError> {
        let secret = sanitize::secret(raw_secret)?;
        let code = sanitize::room_code(raw_code)?;
        self.verify(key, &secret, Some(&code)).await?;

        let handle = self.find_room(&code).await?;
        match handle.reveal().await? {
            Some(_) => Ok(Reply::Ack),
            None => Ok(Reply::Dropped),
        }
    }

    async fn progress_questions(
        &self,
        raw_code: &str,
        key: PlayerKey,
        raw_secret: &str,
    ) -> Result<Reply, ParlorError> {
        let secret = sanitize::secret(raw_secret)?;
        let code = sanitize::room_code(raw_code)?;
        self.verify(key, &secret, Some(&code)).await?;

        let handle = self.find_room(&code).await?;
        match handle.advance().await? {
            Some(_) => Ok(Reply::Ack),
            None => Ok(Reply::Dropped),
        }
    }

    // -- Shared plumbing --------------------------------------------------

    /// Authorizes a credential pair, bounded by the store timeout.
    async fn verify(
        &self,
        key: PlayerKey,
        secret: &Secret,
        room: Option<&RoomCode>,
    ) -> Result<PlayerRow, ParlorError> {
        match tokio::time::timeout(
            self.store_timeout,
            self.verifier.verify(&*self.store, key, secret, room),
        )
        .await
        {
            Ok(result) => result.map_err(Into::into),
            Err(_) => {
                Err(RoomError::DataUnavailable("store call timed out".into()).into())
            }
        }
    }

    async fn find_room(&self, code: &RoomCode) -> Result<RoomHandle, ParlorError> {
        let mut registry = self.registry.lock().await;
        Ok(registry.find(code).await?)
    }
}

//! Room actor: an isolated Tokio task that owns one room's transitions.
//!
//! All mutating traffic for a room code flows through this actor's
//! channel, which makes transitions totally ordered without a
//! client-visible lock: at most one start/guess/reveal/advance is in
//! flight per room, a guess can never interleave with a reveal, and the
//! duplicate-start race is decided here, where the requests are already
//! serialized. Rooms never block each other.
//!
//! The actor also owns the room's outbound fan-out: a sender per bound
//! player, fed according to each event's [`Recipient`].

use std::collections::HashMap;
use std::sync::Arc;

use parlor_protocol::{PlayerKey, Recipient, RoomCode, RoomSnapshot, RosterEntry, Secret, ServerEvent};
use parlor_store::{NewPlayer, Store};
use tokio::sync::{mpsc, oneshot};

use crate::round::{RoundEngine, bounded};
use crate::{RoomConfig, RoomError, turns};

/// Channel sender for delivering outbound events to one player.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Reply to a successful join or rejoin.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub key: PlayerKey,
    pub room: RoomSnapshot,
    pub roster: Vec<RosterEntry>,
}

/// Reply to a successful round transition.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub room: RoomSnapshot,
    pub roster: Vec<RosterEntry>,
}

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    /// Create a player row and bind an outbound sender.
    Join {
        name: String,
        secret: Secret,
        sender: EventSender,
        reply: oneshot::Sender<Result<JoinOutcome, RoomError>>,
    },

    /// Reactivate an existing player and bind a fresh outbound sender.
    Rejoin {
        key: PlayerKey,
        sender: EventSender,
        reply: oneshot::Sender<Result<JoinOutcome, RoomError>>,
    },

    /// Permanently delete a player row.
    Leave {
        key: PlayerKey,
        reply: oneshot::Sender<Result<Vec<RosterEntry>, RoomError>>,
    },

    /// Mark a player inactive after their connection dropped.
    /// Fire-and-forget: the connection that would read a reply is gone.
    Disconnect { key: PlayerKey },

    /// Start the first round (benign no-op if already started).
    Start {
        reply: oneshot::Sender<Result<Option<RoundOutcome>, RoomError>>,
    },

    /// Record or retract a guess.
    Guess {
        key: PlayerKey,
        answer: Option<u32>,
        reply: oneshot::Sender<Result<Option<Vec<RosterEntry>>, RoomError>>,
    },

    /// Reveal and score the current round.
    Reveal {
        reply: oneshot::Sender<Result<Option<RoundOutcome>, RoomError>>,
    },

    /// Rotate the actor and deal the next round.
    Advance {
        reply: oneshot::Sender<Result<Option<RoundOutcome>, RoomError>>,
    },
}

/// Handle to a running room actor. Cheap to clone.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's code.
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<T, RoomError>>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?
    }

    /// Adds a new player to the room.
    pub async fn join(
        &self,
        name: String,
        secret: Secret,
        sender: EventSender,
    ) -> Result<JoinOutcome, RoomError> {
        self.request(|reply| RoomCommand::Join {
            name,
            secret,
            sender,
            reply,
        })
        .await
    }

    /// Reactivates an existing player on a fresh connection.
    pub async fn rejoin(
        &self,
        key: PlayerKey,
        sender: EventSender,
    ) -> Result<JoinOutcome, RoomError> {
        self.request(|reply| RoomCommand::Rejoin { key, sender, reply })
            .await
    }

    /// Permanently removes a player.
    pub async fn leave(&self, key: PlayerKey) -> Result<Vec<RosterEntry>, RoomError> {
        self.request(|reply| RoomCommand::Leave { key, reply }).await
    }

    /// Marks a player inactive (fire-and-forget).
    pub async fn disconnect(&self, key: PlayerKey) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Disconnect { key })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Starts the first round. `Ok(None)` means the start was overtaken
    /// and silently dropped.
    pub async fn start(&self) -> Result<Option<RoundOutcome>, RoomError> {
        self.request(|reply| RoomCommand::Start { reply }).await
    }

    /// Records or retracts the player's guess. `Ok(None)` means the
    /// guess landed outside an acting round and was dropped.
    pub async fn guess(
        &self,
        key: PlayerKey,
        answer: Option<u32>,
    ) -> Result<Option<Vec<RosterEntry>>, RoomError> {
        self.request(|reply| RoomCommand::Guess { key, answer, reply })
            .await
    }

    /// Reveals and scores the round. `Ok(None)` on the duplicate race.
    pub async fn reveal(&self) -> Result<Option<RoundOutcome>, RoomError> {
        self.request(|reply| RoomCommand::Reveal { reply }).await
    }

    /// Advances to the next round. `Ok(None)` if the room is still in
    /// the lobby.
    pub async fn advance(&self) -> Result<Option<RoundOutcome>, RoomError> {
        self.request(|reply| RoomCommand::Advance { reply }).await
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor<S> {
    code: RoomCode,
    store: Arc<S>,
    engine: RoundEngine<S>,
    /// Per-player outbound channels, bound on join/rejoin.
    senders: HashMap<PlayerKey, EventSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl<S: Store> RoomActor<S> {
    /// Runs the actor loop until every handle is dropped.
    async fn run(mut self) {
        tracing::info!(room = %self.code, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    name,
                    secret,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(name, secret, sender).await;
                    let _ = reply.send(result);
                }
                RoomCommand::Rejoin { key, sender, reply } => {
                    let result = self.handle_rejoin(key, sender).await;
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { key, reply } => {
                    let result = self.handle_leave(key).await;
                    let _ = reply.send(result);
                }
                RoomCommand::Disconnect { key } => {
                    if let Err(e) = self.handle_disconnect(key).await {
                        tracing::warn!(room = %self.code, player = %key, error = %e, "disconnect handling failed");
                    }
                }
                RoomCommand::Start { reply } => {
                    let result = self.handle_start().await;
                    let _ = reply.send(result);
                }
                RoomCommand::Guess { key, answer, reply } => {
                    let result = self.handle_guess(key, answer).await;
                    let _ = reply.send(result);
                }
                RoomCommand::Reveal { reply } => {
                    let result = self.handle_reveal().await;
                    let _ = reply.send(result);
                }
                RoomCommand::Advance { reply } => {
                    let result = self.handle_advance().await;
                    let _ = reply.send(result);
                }
            }
        }

        tracing::info!(room = %self.code, "room actor stopped");
    }

    async fn handle_join(
        &mut self,
        name: String,
        secret: Secret,
        sender: EventSender,
    ) -> Result<JoinOutcome, RoomError> {
        let timeout = self.engine.config().store_timeout;
        let mut room = self.engine.load_room(&self.code).await?;
        let players = self.engine.load_players(&self.code).await?;

        let turn_index = match turns::placement(room.current_turn, &players) {
            turns::Placement::Append { turn_index } => turn_index,
            turns::Placement::Splice {
                turn_index,
                next_pointer,
            } => {
                // Make room at the pointer: everyone at or past it moves
                // up one, and the pointer follows its player.
                for mut player in players {
                    if player.turn_index >= room.current_turn {
                        player.turn_index += 1;
                        bounded(timeout, self.store.update_player(&player)).await?;
                    }
                }
                room.current_turn = next_pointer;
                room.touch();
                bounded(timeout, self.store.update_room(&room)).await?;
                turn_index
            }
        };

        let row = bounded(
            timeout,
            self.store.insert_player(NewPlayer {
                room: self.code.clone(),
                name,
                secret,
                turn_index,
            }),
        )
        .await?;

        self.senders.insert(row.key, sender);

        let roster = self.engine.roster(&self.code).await?;
        let snapshot = self.engine.snapshot(&room).await?;
        tracing::info!(room = %self.code, player = %row.key, turn_index, "player joined");

        self.broadcast(
            Recipient::AllExcept(row.key),
            &ServerEvent::PlayerJoined {
                player_key: row.key,
                room: snapshot.clone(),
                roster: roster.clone(),
            },
        );

        Ok(JoinOutcome {
            key: row.key,
            room: snapshot,
            roster,
        })
    }

    async fn handle_rejoin(
        &mut self,
        key: PlayerKey,
        sender: EventSender,
    ) -> Result<JoinOutcome, RoomError> {
        let timeout = self.engine.config().store_timeout;
        let mut player = bounded(timeout, self.store.player(key))
            .await?
            .ok_or(RoomError::PlayerGone(key))?;

        player.active = true;
        bounded(timeout, self.store.update_player(&player)).await?;
        self.senders.insert(key, sender);

        let room = self.engine.load_room(&self.code).await?;
        let roster = self.engine.roster(&self.code).await?;
        let snapshot = self.engine.snapshot(&room).await?;
        tracing::info!(room = %self.code, player = %key, "player rejoined");

        self.broadcast(
            Recipient::AllExcept(key),
            &ServerEvent::PlayerJoined {
                player_key: key,
                room: snapshot.clone(),
                roster: roster.clone(),
            },
        );

        Ok(JoinOutcome {
            key,
            room: snapshot,
            roster,
        })
    }

    async fn handle_leave(&mut self, key: PlayerKey) -> Result<Vec<RosterEntry>, RoomError> {
        let timeout = self.engine.config().store_timeout;
        bounded(timeout, self.store.delete_player(key)).await?;
        self.senders.remove(&key);

        let roster = self.engine.roster(&self.code).await?;
        tracing::info!(room = %self.code, player = %key, "player left");

        self.broadcast(
            Recipient::AllExcept(key),
            &ServerEvent::PlayerLeft {
                player_key: key,
                roster: roster.clone(),
            },
        );

        Ok(roster)
    }

    async fn handle_disconnect(&mut self, key: PlayerKey) -> Result<(), RoomError> {
        let timeout = self.engine.config().store_timeout;
        self.senders.remove(&key);

        // The row survives; only the active flag drops. A disconnecting
        // actor does not auto-advance the round.
        let Some(mut player) = bounded(timeout, self.store.player(key)).await? else {
            return Ok(());
        };
        player.active = false;
        bounded(timeout, self.store.update_player(&player)).await?;

        let roster = self.engine.roster(&self.code).await?;
        tracing::info!(room = %self.code, player = %key, "player disconnected");

        self.broadcast(
            Recipient::AllExcept(key),
            &ServerEvent::PlayerDisconnected {
                player_key: key,
                roster,
            },
        );
        Ok(())
    }

    async fn handle_start(&mut self) -> Result<Option<RoundOutcome>, RoomError> {
        let Some(room) = self.engine.start(&self.code).await? else {
            return Ok(None);
        };
        let outcome = self.outcome(&room).await?;
        self.broadcast(
            Recipient::All,
            &ServerEvent::GameStarted {
                room: outcome.room.clone(),
                roster: outcome.roster.clone(),
            },
        );
        Ok(Some(outcome))
    }

    async fn handle_guess(
        &mut self,
        key: PlayerKey,
        answer: Option<u32>,
    ) -> Result<Option<Vec<RosterEntry>>, RoomError> {
        if self.engine.guess(&self.code, key, answer).await?.is_none() {
            return Ok(None);
        }
        let roster = self.engine.roster(&self.code).await?;
        self.broadcast(
            Recipient::All,
            &ServerEvent::GuessMade {
                roster: roster.clone(),
            },
        );
        Ok(Some(roster))
    }

    async fn handle_reveal(&mut self) -> Result<Option<RoundOutcome>, RoomError> {
        let Some(room) = self.engine.reveal(&self.code).await? else {
            return Ok(None);
        };
        let outcome = self.outcome(&room).await?;
        self.broadcast(
            Recipient::All,
            &ServerEvent::AnswerRevealed {
                room: outcome.room.clone(),
                roster: outcome.roster.clone(),
            },
        );
        Ok(Some(outcome))
    }

    async fn handle_advance(&mut self) -> Result<Option<RoundOutcome>, RoomError> {
        let Some(room) = self.engine.advance(&self.code).await? else {
            return Ok(None);
        };
        let outcome = self.outcome(&room).await?;
        self.broadcast(
            Recipient::All,
            &ServerEvent::QuestionsProgressed {
                room: outcome.room.clone(),
                roster: outcome.roster.clone(),
            },
        );
        Ok(Some(outcome))
    }

    async fn outcome(&self, room: &parlor_store::RoomRow) -> Result<RoundOutcome, RoomError> {
        Ok(RoundOutcome {
            room: self.engine.snapshot(room).await?,
            roster: self.engine.roster(&self.code).await?,
        })
    }

    /// Fans an event out to the addressed players. Senders whose
    /// receiver is gone are dropped silently; the disconnect path will
    /// catch up with them.
    fn broadcast(&self, recipient: Recipient, event: &ServerEvent) {
        match recipient {
            Recipient::All => {
                for sender in self.senders.values() {
                    let _ = sender.send(event.clone());
                }
            }
            Recipient::Player(key) => {
                if let Some(sender) = self.senders.get(&key) {
                    let _ = sender.send(event.clone());
                }
            }
            Recipient::AllExcept(excluded) => {
                for (key, sender) in &self.senders {
                    if *key != excluded {
                        let _ = sender.send(event.clone());
                    }
                }
            }
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
pub(crate) fn spawn_room<S: Store>(
    code: RoomCode,
    store: Arc<S>,
    config: RoomConfig,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.channel_size);

    let actor = RoomActor {
        code: code.clone(),
        store: Arc::clone(&store),
        engine: RoundEngine::new(store, config),
        senders: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}

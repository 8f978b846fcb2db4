//! Round transitions: start, guess, reveal, advance.
//!
//! The engine performs the persistence work of each transition and hands
//! finished row state back to the actor, which owns ordering and
//! broadcasting. Transitions that lose a benign race (a duplicate start,
//! a guess that arrived after the reveal) return `Ok(None)`: not an
//! error, nothing persisted, nothing to broadcast.
//!
//! Every store call is bounded by the configured timeout. A failure or
//! timeout aborts the transition with `DataUnavailable` before anything
//! is broadcast.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parlor_protocol::{
    CardId, CardView, PlayerKey, QuestionView, RoomCode, RoomSnapshot, RosterEntry,
    RoundPhase,
};
use parlor_store::{RoomRow, Store, StoreError};
use rand::Rng;

use crate::{RoomConfig, RoomError, turns};

/// Bounds a store call by `timeout`, mapping both store failure and
/// elapse onto `DataUnavailable`.
pub(crate) async fn bounded<T>(
    timeout: Duration,
    fut: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, RoomError> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(RoomError::DataUnavailable("store call timed out".into())),
    }
}

/// Drives round state for one room.
pub(crate) struct RoundEngine<S> {
    store: Arc<S>,
    config: RoomConfig,
}

impl<S: Store> RoundEngine<S> {
    pub(crate) fn new(store: Arc<S>, config: RoomConfig) -> Self {
        Self { store, config }
    }

    pub(crate) fn config(&self) -> &RoomConfig {
        &self.config
    }

    async fn io<T>(
        &self,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, RoomError> {
        bounded(self.config.store_timeout, fut).await
    }

    /// Reads the room row, failing with `NotFound` if it is gone.
    pub(crate) async fn load_room(&self, code: &RoomCode) -> Result<RoomRow, RoomError> {
        self.io(self.store.room(code))
            .await?
            .ok_or_else(|| RoomError::NotFound(code.clone()))
    }

    pub(crate) async fn load_players(
        &self,
        code: &RoomCode,
    ) -> Result<Vec<parlor_store::PlayerRow>, RoomError> {
        self.io(self.store.room_players(code)).await
    }

    /// The public roster: every player in the room, secrets stripped.
    pub(crate) async fn roster(&self, code: &RoomCode) -> Result<Vec<RosterEntry>, RoomError> {
        let players = self.load_players(code).await?;
        Ok(players
            .into_iter()
            .map(|p| RosterEntry {
                key: p.key,
                name: p.name,
                turn_index: p.turn_index,
                choice: p.choice,
                score: p.score,
                active: p.active,
            })
            .collect())
    }

    /// Assembles the full snapshot, loading the active card and its
    /// questions when a round is live.
    pub(crate) async fn snapshot(&self, room: &RoomRow) -> Result<RoomSnapshot, RoomError> {
        let card = match room.card {
            Some(id) => {
                let card = self.io(self.store.card(id)).await?.ok_or_else(|| {
                    RoomError::DataUnavailable(format!("{id} missing from content set"))
                })?;
                let questions = self.io(self.store.questions(id)).await?;
                Some(CardView {
                    id,
                    prompt: card.prompt,
                    questions: questions
                        .into_iter()
                        .map(|q| QuestionView {
                            index: q.index,
                            text: q.text,
                        })
                        .collect(),
                })
            }
            None => None,
        };

        Ok(RoomSnapshot {
            code: room.code.clone(),
            phase: room.phase(),
            current_turn: room.current_turn,
            answer_index: room.answer_index,
            card,
        })
    }

    /// Draws a random eligible card: not reserved, not `exclude`.
    async fn draw_card(&self, exclude: Option<CardId>) -> Result<CardId, RoomError> {
        let eligible: Vec<CardId> = self
            .io(self.store.card_ids())
            .await?
            .into_iter()
            .filter(|id| !self.config.reserved_cards.contains(id) && Some(*id) != exclude)
            .collect();

        if eligible.is_empty() {
            return Err(RoomError::DeckExhausted);
        }
        let mut rng = rand::rng();
        Ok(eligible[rng.random_range(0..eligible.len())])
    }

    /// Picks the designated answer: a uniform 1-based question index.
    async fn pick_answer(&self, card: CardId) -> Result<u32, RoomError> {
        let count = self.io(self.store.questions(card)).await?.len();
        if count == 0 {
            return Err(RoomError::EmptyCard(card));
        }
        let mut rng = rand::rng();
        Ok(rng.random_range(1..=count as u32))
    }

    /// Starts the first round. Valid only from the lobby; a start that
    /// arrives after the room has left the lobby is the benign
    /// duplicate-tap race and is dropped.
    pub(crate) async fn start(&self, code: &RoomCode) -> Result<Option<RoomRow>, RoomError> {
        let mut room = self.load_room(code).await?;
        if room.phase() != RoundPhase::Lobby {
            tracing::debug!(room = %code, "start after leaving lobby, dropped");
            return Ok(None);
        }

        let players = self.load_players(code).await?;
        let actor = turns::first_actor(&players)
            .ok_or_else(|| RoomError::NoActivePlayers(code.clone()))?;

        let card = self.draw_card(None).await?;
        let answer = self.pick_answer(card).await?;

        room.current_turn = actor;
        room.card = Some(card);
        room.answer_index = Some(answer);
        room.revealed = false;
        room.touch();
        self.io(self.store.update_room(&room)).await?;

        tracing::info!(room = %code, %card, actor, "round started");
        Ok(Some(room))
    }

    /// Records or retracts the caller's guess. Only while the round is
    /// acting and unrevealed; a guess that raced past a reveal or advance
    /// is superseded and dropped.
    pub(crate) async fn guess(
        &self,
        code: &RoomCode,
        key: PlayerKey,
        answer: Option<u32>,
    ) -> Result<Option<()>, RoomError> {
        let room = self.load_room(code).await?;
        if room.phase() != RoundPhase::Acting {
            tracing::debug!(room = %code, player = %key, "guess outside acting phase, dropped");
            return Ok(None);
        }

        let mut player = self
            .io(self.store.player(key))
            .await?
            .ok_or(RoomError::PlayerGone(key))?;
        player.choice = answer;
        self.io(self.store.update_player(&player)).await?;

        tracing::debug!(room = %code, player = %key, ?answer, "guess recorded");
        Ok(Some(()))
    }

    /// Reveals the answer and scores the round: the actor gains one point
    /// per correct active non-actor, and each of those players gains one.
    /// A reveal that arrives after the round is already revealed is the
    /// same benign race as a duplicate start.
    pub(crate) async fn reveal(&self, code: &RoomCode) -> Result<Option<RoomRow>, RoomError> {
        let mut room = self.load_room(code).await?;
        if room.phase() != RoundPhase::Acting {
            tracing::debug!(room = %code, "reveal outside acting phase, dropped");
            return Ok(None);
        }

        room.revealed = true;
        room.touch();
        self.io(self.store.update_room(&room)).await?;

        let players = self.load_players(code).await?;
        // The actor's own recorded choice is never read here; it is
        // ignored, not forbidden.
        let correct = players
            .iter()
            .filter(|p| {
                p.active && p.turn_index != room.current_turn && p.choice == room.answer_index
            })
            .count() as u32;

        for mut player in players {
            if player.turn_index == room.current_turn {
                player.score += correct;
                self.io(self.store.update_player(&player)).await?;
            } else if player.active && player.choice == room.answer_index {
                player.score += 1;
                self.io(self.store.update_player(&player)).await?;
            }
        }

        tracing::info!(room = %code, correct, "answer revealed");
        Ok(Some(room))
    }

    /// Rotates the actor and deals the next round: a fresh card (never
    /// the one just played), a fresh answer, every active player's choice
    /// cleared. Reachable whether or not the current round was revealed.
    pub(crate) async fn advance(&self, code: &RoomCode) -> Result<Option<RoomRow>, RoomError> {
        let mut room = self.load_room(code).await?;
        if room.phase() == RoundPhase::Lobby {
            tracing::debug!(room = %code, "advance in lobby, dropped");
            return Ok(None);
        }

        let players = self.load_players(code).await?;
        let next = turns::next_actor(room.current_turn, &players)
            .ok_or_else(|| RoomError::NoActivePlayers(code.clone()))?;

        let card = self.draw_card(room.card).await?;
        let answer = self.pick_answer(card).await?;

        for mut player in players {
            if player.active && player.choice.is_some() {
                player.choice = None;
                self.io(self.store.update_player(&player)).await?;
            }
        }

        room.current_turn = next;
        room.card = Some(card);
        room.answer_index = Some(answer);
        room.revealed = false;
        room.touch();
        self.io(self.store.update_room(&room)).await?;

        tracing::info!(room = %code, %card, actor = next, "round advanced");
        Ok(Some(room))
    }
}

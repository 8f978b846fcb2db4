//! End-to-end tests: a real server, real WebSocket clients, full game
//! flows from createGame through progressQuestions.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parlor::{ParlorServerBuilder, deck::demo_deck};
use parlor_store::MemoryStore;
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port with the demo deck and returns the
/// address.
async fn start_server() -> String {
    let (cards, questions) = demo_deck();
    let server = ParlorServerBuilder::new()
        .bind("127.0.0.1:0")
        .build(MemoryStore::with_deck(cards, questions))
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("send should succeed");
}

/// Receives the next frame as JSON, failing the test after two seconds.
async fn recv(ws: &mut ClientWs) -> Value {
    let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("timed out waiting for a frame")
        .expect("stream ended")
        .expect("websocket error");
    serde_json::from_str(msg.to_text().expect("text frame")).expect("json frame")
}

/// Skips frames until one satisfies the predicate. Replies and
/// broadcasts share the socket without a guaranteed order, so tests
/// select the frame they care about instead of assuming position.
async fn recv_until(ws: &mut ClientWs, pred: impl Fn(&Value) -> bool) -> Value {
    for _ in 0..20 {
        let frame = recv(ws).await;
        if pred(&frame) {
            return frame;
        }
    }
    panic!("no matching frame within 20 frames");
}

async fn recv_event(ws: &mut ClientWs, event: &str) -> Value {
    recv_until(ws, |v| v["type"] == event).await
}

/// The bare `{success: true}` ack for broadcast-backed actions.
async fn recv_ack(ws: &mut ClientWs) -> Value {
    recv_until(ws, |v| v["success"] == true && v.get("type").is_none()).await
}

/// Creates a game and returns (socket, playerKey, playerSecret, roomCode).
async fn create_game(addr: &str, name: &str) -> (ClientWs, Value, String, String) {
    let mut ws = connect(addr).await;
    send(&mut ws, json!({"type": "createGame", "playerName": name})).await;
    let created = recv_event(&mut ws, "gameCreated").await;
    assert_eq!(created["success"], true);
    let key = created["playerKey"].clone();
    let secret = created["playerSecret"].as_str().unwrap().to_string();
    let code = created["room"]["code"].as_str().unwrap().to_string();
    (ws, key, secret, code)
}

/// Joins an existing game and returns (socket, playerKey, playerSecret).
async fn join_game(addr: &str, name: &str, code: &str) -> (ClientWs, Value, String) {
    let mut ws = connect(addr).await;
    send(
        &mut ws,
        json!({"type": "joinGame", "playerName": name, "roomCode": code}),
    )
    .await;
    let joined = recv_event(&mut ws, "gameJoined").await;
    assert_eq!(joined["success"], true);
    let key = joined["playerKey"].clone();
    let secret = joined["playerSecret"].as_str().unwrap().to_string();
    (ws, key, secret)
}

fn roster_entry<'a>(frame: &'a Value, key: &Value) -> &'a Value {
    frame["roster"]
        .as_array()
        .expect("roster array")
        .iter()
        .find(|p| &p["key"] == key)
        .expect("player in roster")
}

// =========================================================================
// Create / join
// =========================================================================

#[tokio::test]
async fn test_create_game_returns_credentials_and_room() {
    let addr = start_server().await;
    let (_ws, key, secret, code) = create_game(&addr, "Ada").await;

    assert!(key.is_u64());
    assert!(!secret.is_empty());
    assert_eq!(code.len(), 5);
    assert!(code.bytes().all(|b| b.is_ascii_uppercase()));
}

#[tokio::test]
async fn test_create_game_sanitizes_player_name() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    send(
        &mut ws,
        json!({"type": "createGame", "playerName": "Ada<script>alert(1)</script>"}),
    )
    .await;
    let created = recv_event(&mut ws, "gameCreated").await;

    let name = created["roster"][0]["name"].as_str().unwrap();
    assert_eq!(name, "Adascriptale", "stripped and capped at 12 chars");
}

#[tokio::test]
async fn test_join_game_notifies_existing_players() {
    let addr = start_server().await;
    let (mut ws_a, _, _, code) = create_game(&addr, "Ada").await;
    let (_ws_b, key_b, _) = join_game(&addr, "Bo", &code).await;

    let notice = recv_event(&mut ws_a, "playerJoined").await;
    assert_eq!(notice["playerKey"], key_b);
    assert_eq!(notice["roster"].as_array().unwrap().len(), 2);
    // Broadcasts never leak credentials.
    assert!(notice.get("playerSecret").is_none());
}

#[tokio::test]
async fn test_join_unknown_room_is_not_found() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;
    send(
        &mut ws,
        json!({"type": "joinGame", "playerName": "Bo", "roomCode": "ZZZZZ"}),
    )
    .await;

    let reply = recv(&mut ws).await;
    assert_eq!(reply["success"], false);
    let error = reply["error"].as_str().unwrap();
    assert!(error.starts_with("NotFound"), "got {error}");
}

#[tokio::test]
async fn test_join_with_valid_credentials_takes_rejoin_path() {
    let addr = start_server().await;
    let (_ws_a, key, secret, code) = create_game(&addr, "Ada").await;

    // Same player "joins" again from a fresh connection, presenting the
    // credential pair: no new player row, a gameRejoined reply instead.
    let mut ws2 = connect(&addr).await;
    send(
        &mut ws2,
        json!({
            "type": "joinGame",
            "playerName": "Ada",
            "roomCode": code,
            "playerKey": key,
            "playerSecret": secret,
        }),
    )
    .await;

    let rejoined = recv_event(&mut ws2, "gameRejoined").await;
    assert_eq!(rejoined["playerKey"], key);
    assert_eq!(rejoined["roster"].as_array().unwrap().len(), 1);
}

// =========================================================================
// Full round flow
// =========================================================================

#[tokio::test]
async fn test_full_round_start_guess_reveal_advance() {
    let addr = start_server().await;
    let (mut ws_a, key_a, secret_a, code) = create_game(&addr, "Ada").await;
    let (mut ws_b, key_b, secret_b) = join_game(&addr, "Bo", &code).await;

    // --- start ---
    send(
        &mut ws_a,
        json!({"type": "startGame", "roomCode": code, "playerKey": key_a, "playerSecret": secret_a}),
    )
    .await;
    recv_ack(&mut ws_a).await;

    let started = recv_event(&mut ws_b, "gameStarted").await;
    assert_eq!(started["room"]["phase"], "acting");
    assert_eq!(started["room"]["currentTurn"], 1);
    let answer = started["room"]["answerIndex"].as_u64().unwrap();
    let questions = started["room"]["card"]["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 4);

    // --- guess (B picks the designated answer) ---
    send(
        &mut ws_b,
        json!({"type": "sendGuess", "playerKey": key_b, "playerSecret": secret_b, "roomCode": code, "answerIndex": answer}),
    )
    .await;
    let guessed = recv_event(&mut ws_b, "guessMade").await;
    assert_eq!(roster_entry(&guessed, &key_b)["choice"], answer);

    // --- reveal: actor gains one per correct guesser, B gains one ---
    send(
        &mut ws_a,
        json!({"type": "revealAnswer", "roomCode": code, "playerKey": key_a, "playerSecret": secret_a}),
    )
    .await;
    let revealed = recv_event(&mut ws_b, "answerRevealed").await;
    assert_eq!(revealed["room"]["phase"], "revealed");
    assert_eq!(roster_entry(&revealed, &key_a)["score"], 1);
    assert_eq!(roster_entry(&revealed, &key_b)["score"], 1);

    // --- advance: pointer rotates, fresh card, choices cleared ---
    let old_card = started["room"]["card"]["id"].clone();
    send(
        &mut ws_a,
        json!({"type": "progressQuestions", "roomCode": code, "playerKey": key_a, "playerSecret": secret_a}),
    )
    .await;
    let advanced = recv_event(&mut ws_b, "questionsProgressed").await;
    assert_eq!(advanced["room"]["currentTurn"], 2);
    assert_eq!(advanced["room"]["phase"], "acting");
    assert_ne!(advanced["room"]["card"]["id"], old_card);
    assert!(roster_entry(&advanced, &key_b)["choice"].is_null());
}

#[tokio::test]
async fn test_duplicate_start_is_silently_dropped() {
    let addr = start_server().await;
    let (mut ws_a, key_a, secret_a, code) = create_game(&addr, "Ada").await;
    let (mut ws_b, key_b, secret_b) = join_game(&addr, "Bo", &code).await;

    send(
        &mut ws_a,
        json!({"type": "startGame", "roomCode": code, "playerKey": key_a, "playerSecret": secret_a}),
    )
    .await;
    recv_ack(&mut ws_a).await;

    // B's tap arrives after the room left the lobby: success false, no
    // error, and no second gameStarted broadcast for A.
    send(
        &mut ws_b,
        json!({"type": "startGame", "roomCode": code, "playerKey": key_b, "playerSecret": secret_b}),
    )
    .await;
    let reply = recv_until(&mut ws_b, |v| v["success"] == false).await;
    assert!(reply.get("error").is_none(), "benign race carries no error");

    let frame = recv_event(&mut ws_a, "gameStarted").await;
    assert!(frame["success"] == true);
    // Anything further on A's socket would be a duplicate broadcast.
    let extra = tokio::time::timeout(Duration::from_millis(100), ws_a.next()).await;
    assert!(extra.is_err(), "dropped start must not broadcast");
}

#[tokio::test]
async fn test_guess_retraction_clears_choice() {
    let addr = start_server().await;
    let (mut ws_a, key_a, secret_a, code) = create_game(&addr, "Ada").await;
    let (mut ws_b, key_b, secret_b) = join_game(&addr, "Bo", &code).await;

    send(
        &mut ws_a,
        json!({"type": "startGame", "roomCode": code, "playerKey": key_a, "playerSecret": secret_a}),
    )
    .await;
    recv_ack(&mut ws_a).await;

    send(
        &mut ws_b,
        json!({"type": "sendGuess", "playerKey": key_b, "playerSecret": secret_b, "answerIndex": 2}),
    )
    .await;
    let first = recv_event(&mut ws_b, "guessMade").await;
    assert_eq!(roster_entry(&first, &key_b)["choice"], 2);

    send(
        &mut ws_b,
        json!({"type": "sendGuess", "playerKey": key_b, "playerSecret": secret_b, "answerIndex": null}),
    )
    .await;
    let second = recv_event(&mut ws_b, "guessMade").await;
    assert!(roster_entry(&second, &key_b)["choice"].is_null());
}

// =========================================================================
// Identity
// =========================================================================

#[tokio::test]
async fn test_rejoin_resolves_room_from_credentials() {
    let addr = start_server().await;
    let (ws_a, key, secret, code) = create_game(&addr, "Ada").await;

    // Connection dies; the player row survives.
    drop(ws_a);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut ws2 = connect(&addr).await;
    send(
        &mut ws2,
        json!({"type": "rejoinGame", "playerKey": key, "playerSecret": secret}),
    )
    .await;
    let rejoined = recv_event(&mut ws2, "gameRejoined").await;
    assert_eq!(rejoined["room"]["code"].as_str().unwrap(), code);
    assert_eq!(roster_entry(&rejoined, &key)["active"], true);
}

#[tokio::test]
async fn test_leave_then_rejoin_is_not_found() {
    let addr = start_server().await;
    let (mut ws_a, key, secret, _code) = create_game(&addr, "Ada").await;

    send(
        &mut ws_a,
        json!({"type": "leaveGame", "playerKey": key, "playerSecret": secret}),
    )
    .await;
    let left = recv_event(&mut ws_a, "gameLeft").await;
    assert_eq!(left["success"], true);

    send(
        &mut ws_a,
        json!({"type": "rejoinGame", "playerKey": key, "playerSecret": secret}),
    )
    .await;
    let reply = recv_until(&mut ws_a, |v| v["success"] == false).await;
    let error = reply["error"].as_str().unwrap();
    assert!(error.starts_with("NotFound"), "got {error}");
}

#[tokio::test]
async fn test_wrong_secret_is_unauthorized() {
    let addr = start_server().await;
    let (mut ws_a, key, _secret, code) = create_game(&addr, "Ada").await;

    send(
        &mut ws_a,
        json!({"type": "startGame", "roomCode": code, "playerKey": key, "playerSecret": "deadbeefdeadbeef"}),
    )
    .await;
    let reply = recv_until(&mut ws_a, |v| v["success"] == false).await;
    let error = reply["error"].as_str().unwrap();
    assert!(error.starts_with("Unauthorized"), "got {error}");
}

#[tokio::test]
async fn test_disconnect_broadcasts_to_remaining_players() {
    let addr = start_server().await;
    let (mut ws_a, _, _, code) = create_game(&addr, "Ada").await;
    let (ws_b, key_b, _) = join_game(&addr, "Bo", &code).await;
    recv_event(&mut ws_a, "playerJoined").await;

    drop(ws_b);

    let notice = recv_event(&mut ws_a, "playerDisconnected").await;
    assert_eq!(notice["playerKey"], key_b);
    assert_eq!(roster_entry(&notice, &key_b)["active"], false);
}

// =========================================================================
// Input handling
// =========================================================================

#[tokio::test]
async fn test_malformed_frame_fails_closed() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Text("not json at all".into())).await.unwrap();
    let reply = recv(&mut ws).await;
    assert_eq!(reply["success"], false);
    assert!(
        reply["error"].as_str().unwrap().starts_with("ValidationError"),
        "got {}",
        reply["error"]
    );

    // The connection stays usable after a bad frame.
    send(&mut ws, json!({"type": "createGame", "playerName": "Ada"})).await;
    let created = recv_event(&mut ws, "gameCreated").await;
    assert_eq!(created["success"], true);
}

#[tokio::test]
async fn test_missing_required_field_fails_closed() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(&mut ws, json!({"type": "startGame", "roomCode": "ABCDE"})).await;
    let reply = recv(&mut ws).await;
    assert_eq!(reply["success"], false);
    assert!(reply["error"].as_str().unwrap().starts_with("ValidationError"));
}

#[tokio::test]
async fn test_unrecognized_fields_are_ignored() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(
        &mut ws,
        json!({"type": "createGame", "playerName": "Ada", "admin": true, "score": 500}),
    )
    .await;
    let created = recv_event(&mut ws, "gameCreated").await;
    assert_eq!(created["success"], true);
    assert_eq!(created["roster"][0]["score"], 0);
}

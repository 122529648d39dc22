//! Integration tests for the Ghost server: real sockets, full protocol.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use ghost::prelude::*;
use ghost::ServerConfig;
use ghost_transport::{FrameReader, DEFAULT_MAX_FRAME_LEN};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

// =========================================================================
// Helpers
// =========================================================================

const WORDS: &[&str] = &["CAT", "CATALOG", "DOG", "GHOST"];

/// Starts a server on a random port with two rooms ("Salon" seats 3,
/// "Duel" seats 2) and returns its address and admin handle.
async fn start_server() -> (String, AdminHandle) {
    start_with(ServerConfig::default()).await
}

async fn start_with(mut config: ServerConfig) -> (String, AdminHandle) {
    config.bind_addr = "127.0.0.1:0".into();
    config.rooms = vec![RoomConfig::new("Salon", 3), RoomConfig::new("Duel", 2)];

    let server = GhostServer::builder()
        .config(config)
        .dictionary(Dictionary::new(WORDS.iter().copied()))
        .build()
        .await
        .expect("server should build");

    let addr = server.local_addr().expect("should have local addr").to_string();
    let admin = server.admin();
    tokio::spawn(async move {
        let _ = server.run().await;
    });

    (addr, admin)
}

async fn connect(addr: &str) -> GhostClient {
    GhostClient::connect(addr).await.expect("should connect")
}

async fn logged_in(addr: &str, pseudo: &str) -> GhostClient {
    let mut client = connect(addr).await;
    assert_eq!(client.login(pseudo).await.unwrap(), LoginStatus::Accepted);
    client
}

/// Receives the next message, failing the test after two seconds.
async fn recv(client: &mut GhostClient) -> ServerMessage {
    tokio::time::timeout(Duration::from_secs(2), client.recv())
        .await
        .expect("timed out waiting for server")
        .expect("recv failed")
        .expect("server closed the connection")
}

async fn recv_data(client: &mut GhostClient) -> DataMessage {
    match recv(client).await {
        ServerMessage::Data(body) => DataMessage::from_bytes(&body).unwrap(),
        other => panic!("expected DATA, got {other:?}"),
    }
}

async fn recv_error(client: &mut GhostClient) -> ErrorCode {
    match recv(client).await {
        ServerMessage::Error { code, .. } => code,
        other => panic!("expected ERROR, got {other:?}"),
    }
}

/// Asserts nothing arrives for a short while.
async fn expect_silence(client: &mut GhostClient) {
    if let Ok(msg) = tokio::time::timeout(Duration::from_millis(150), client.recv()).await {
        panic!("expected silence, got {msg:?}");
    }
}

/// Asserts the server closes the connection.
async fn expect_closed(client: &mut GhostClient) {
    let result = tokio::time::timeout(Duration::from_secs(2), client.recv())
        .await
        .expect("server should close the connection");
    assert!(
        !matches!(result, Ok(Some(_))),
        "expected close, got {result:?}"
    );
}

/// Joins a room and returns the roster, consuming the GAME_STATE that
/// follows it.
async fn join(client: &mut GhostClient, room: u32) -> Vec<String> {
    client
        .send(&ClientMessage::Join { room_id: RoomId(room) })
        .await
        .unwrap();
    let players = match recv(client).await {
        ServerMessage::RoomPlayers(players) => players,
        other => panic!("expected RESP_ROOM, got {other:?}"),
    };
    assert!(matches!(recv_data(client).await, DataMessage::GameState { .. }));
    players
}

async fn play(client: &mut GhostClient, letter: &str) {
    client
        .send_data(&DataMessage::PlayLetter {
            letter: letter.into(),
        })
        .await
        .unwrap();
}

/// Polls the admin snapshot until `pred` holds.
async fn wait_for_sessions(admin: &AdminHandle, pred: impl Fn(&[SessionSnapshot]) -> bool) {
    for _ in 0..100 {
        if pred(&admin.sessions().await) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("session registry never reached the expected state");
}

// =========================================================================
// Login
// =========================================================================

#[tokio::test]
async fn test_login_duplicate_pseudo_refused() {
    let (addr, _admin) = start_server().await;
    let _ann = logged_in(&addr, "ann").await;

    let mut imposter = connect(&addr).await;
    assert_eq!(imposter.login("ann").await.unwrap(), LoginStatus::Refused);

    // Still a guest, so it can pick another name.
    assert_eq!(imposter.login("bob").await.unwrap(), LoginStatus::Accepted);
}

#[tokio::test]
async fn test_login_pseudo_free_after_disconnect() {
    let (addr, admin) = start_server().await;
    let ann = logged_in(&addr, "ann").await;

    ann.close().await.unwrap();
    wait_for_sessions(&admin, |s| s.iter().all(|s| s.pseudo.is_none())).await;

    let _again = logged_in(&addr, "ann").await;
}

#[tokio::test]
async fn test_login_invalid_pseudos_refused() {
    let (addr, _admin) = start_server().await;
    let mut client = connect(&addr).await;

    assert_eq!(client.login("").await.unwrap(), LoginStatus::Refused);
    assert_eq!(client.login(&"x".repeat(21)).await.unwrap(), LoginStatus::Refused);
    assert_eq!(client.login("ann").await.unwrap(), LoginStatus::Accepted);
    // One pseudo per session.
    assert_eq!(client.login("bob").await.unwrap(), LoginStatus::Refused);
}

#[tokio::test]
async fn test_requests_require_login() {
    let (addr, _admin) = start_server().await;
    let mut guest = connect(&addr).await;

    guest.send(&ClientMessage::ListRooms).await.unwrap();
    assert_eq!(recv_error(&mut guest).await, ErrorCode::NotLoggedIn);

    guest
        .send(&ClientMessage::Join { room_id: RoomId(1) })
        .await
        .unwrap();
    assert_eq!(recv_error(&mut guest).await, ErrorCode::NotLoggedIn);
}

// =========================================================================
// Rooms
// =========================================================================

#[tokio::test]
async fn test_list_rooms() {
    let (addr, _admin) = start_server().await;
    let mut ann = logged_in(&addr, "ann").await;
    join(&mut ann, 2).await;

    ann.send(&ClientMessage::ListRooms).await.unwrap();

    match recv(&mut ann).await {
        ServerMessage::RoomList(rooms) => {
            assert_eq!(rooms.len(), 2);
            assert_eq!(rooms[0].id, RoomId(1));
            assert_eq!(rooms[0].name, "Salon");
            assert_eq!(rooms[0].players, 0);
            assert_eq!(rooms[0].max_players, 3);
            assert_eq!(rooms[1].players, 1);
        }
        other => panic!("expected ROOM_LIST, got {other:?}"),
    }
}

#[tokio::test]
async fn test_join_notifies_existing_members() {
    let (addr, admin) = start_server().await;
    let mut ann = logged_in(&addr, "ann").await;
    let mut bob = logged_in(&addr, "bob").await;

    assert_eq!(join(&mut ann, 1).await, ["ann"]);
    assert_eq!(join(&mut bob, 1).await, ["ann", "bob"]);

    assert_eq!(
        recv(&mut ann).await,
        ServerMessage::Notify {
            kind: NotifyKind::Join,
            pseudo: "bob".into()
        }
    );

    let sessions = admin.sessions().await;
    let bob_session = sessions
        .iter()
        .find(|s| s.pseudo.as_deref() == Some("bob"))
        .unwrap();
    assert_eq!(bob_session.current_room, Some(RoomId(1)));
}

#[tokio::test]
async fn test_join_full_room_refused_with_empty_roster() {
    let (addr, _admin) = start_server().await;
    let mut ann = logged_in(&addr, "ann").await;
    let mut bob = logged_in(&addr, "bob").await;
    let mut cid = logged_in(&addr, "cid").await;
    join(&mut ann, 2).await;
    join(&mut bob, 2).await;

    cid.send(&ClientMessage::Join { room_id: RoomId(2) })
        .await
        .unwrap();

    assert_eq!(recv(&mut cid).await, ServerMessage::RoomPlayers(Vec::new()));
}

#[tokio::test]
async fn test_join_errors() {
    let (addr, _admin) = start_server().await;
    let mut ann = logged_in(&addr, "ann").await;

    ann.send(&ClientMessage::Join { room_id: RoomId(99) })
        .await
        .unwrap();
    assert_eq!(recv_error(&mut ann).await, ErrorCode::RoomNotFound);

    join(&mut ann, 1).await;
    ann.send(&ClientMessage::Join { room_id: RoomId(2) })
        .await
        .unwrap();
    assert_eq!(recv_error(&mut ann).await, ErrorCode::AlreadyInRoom);
}

#[tokio::test]
async fn test_leave_notifies_remaining_members() {
    let (addr, admin) = start_server().await;
    let mut ann = logged_in(&addr, "ann").await;
    let mut bob = logged_in(&addr, "bob").await;
    join(&mut ann, 1).await;
    join(&mut bob, 1).await;
    recv(&mut ann).await; // NOTIFY bob joined

    ann.send(&ClientMessage::Leave).await.unwrap();

    assert_eq!(
        recv(&mut bob).await,
        ServerMessage::Notify {
            kind: NotifyKind::Leave,
            pseudo: "ann".into()
        }
    );
    match recv_data(&mut bob).await {
        DataMessage::GameState { active_player, .. } => {
            assert_eq!(active_player.as_deref(), Some("bob"));
        }
        other => panic!("expected GAME_STATE, got {other:?}"),
    }
    wait_for_sessions(&admin, |s| {
        s.iter()
            .any(|s| s.pseudo.as_deref() == Some("ann") && s.current_room.is_none())
    })
    .await;

    // Leaving again is a no-op.
    ann.send(&ClientMessage::Leave).await.unwrap();
    expect_silence(&mut ann).await;
}

#[tokio::test]
async fn test_disconnect_leaves_room() {
    let (addr, _admin) = start_server().await;
    let mut ann = logged_in(&addr, "ann").await;
    let mut bob = logged_in(&addr, "bob").await;
    join(&mut ann, 1).await;
    join(&mut bob, 1).await;
    recv(&mut ann).await; // NOTIFY bob joined

    bob.close().await.unwrap();

    assert_eq!(
        recv(&mut ann).await,
        ServerMessage::Notify {
            kind: NotifyKind::Leave,
            pseudo: "bob".into()
        }
    );
}

// =========================================================================
// Game
// =========================================================================

#[tokio::test]
async fn test_play_letters_to_a_lost_round() {
    let (addr, _admin) = start_server().await;
    let mut ann = logged_in(&addr, "ann").await;
    let mut bob = logged_in(&addr, "bob").await;
    join(&mut ann, 1).await;
    join(&mut bob, 1).await;
    recv(&mut ann).await; // NOTIFY bob joined

    play(&mut ann, "c").await;
    for client in [&mut ann, &mut bob] {
        match recv_data(client).await {
            DataMessage::GameState { frag, active_player, .. } => {
                assert_eq!(frag, "C");
                assert_eq!(active_player.as_deref(), Some("bob"));
            }
            other => panic!("expected GAME_STATE, got {other:?}"),
        }
    }

    // No word starts with "CZ".
    play(&mut bob, "z").await;
    for client in [&mut ann, &mut bob] {
        match recv_data(client).await {
            DataMessage::GameState { frag, active_player, scores, event } => {
                assert_eq!(frag, "");
                assert_eq!(active_player.as_deref(), Some("ann"));
                assert_eq!(scores["bob"], "G");
                assert_eq!(scores["ann"], "");
                assert!(event.contains("CZ"), "{event}");
            }
            other => panic!("expected GAME_STATE, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_play_out_of_turn_is_an_error() {
    let (addr, _admin) = start_server().await;
    let mut ann = logged_in(&addr, "ann").await;
    let mut bob = logged_in(&addr, "bob").await;
    join(&mut ann, 1).await;
    join(&mut bob, 1).await;
    recv(&mut ann).await; // NOTIFY bob joined

    play(&mut bob, "c").await;

    assert_eq!(recv_error(&mut bob).await, ErrorCode::NotYourTurn);
    expect_silence(&mut ann).await;
}

#[tokio::test]
async fn test_play_rejects_bad_letters_and_bad_data() {
    let (addr, _admin) = start_server().await;
    let mut ann = logged_in(&addr, "ann").await;

    // Not in a room yet.
    play(&mut ann, "c").await;
    assert_eq!(recv_error(&mut ann).await, ErrorCode::NotInRoom);

    join(&mut ann, 1).await;
    play(&mut ann, "ca").await;
    assert_eq!(recv_error(&mut ann).await, ErrorCode::InvalidData);
    play(&mut ann, "7").await;
    assert_eq!(recv_error(&mut ann).await, ErrorCode::InvalidData);

    ann.send(&ClientMessage::Data(b"{not json".to_vec()))
        .await
        .unwrap();
    assert_eq!(recv_error(&mut ann).await, ErrorCode::InvalidData);

    // Server-only message types are refused too.
    ann.send_data(&DataMessage::Broadcast {
        message: "spoof".into(),
    })
    .await
    .unwrap();
    assert_eq!(recv_error(&mut ann).await, ErrorCode::InvalidData);
}

#[tokio::test]
async fn test_chat_echoes_with_real_sender() {
    let (addr, _admin) = start_server().await;
    let mut ann = logged_in(&addr, "ann").await;
    let mut bob = logged_in(&addr, "bob").await;
    join(&mut ann, 1).await;
    join(&mut bob, 1).await;
    recv(&mut ann).await; // NOTIFY bob joined

    bob.send_data(&DataMessage::Chat {
        sender: "ann".into(),
        message: "bonjour".into(),
    })
    .await
    .unwrap();

    let expected = DataMessage::Chat {
        sender: "bob".into(),
        message: "bonjour".into(),
    };
    assert_eq!(recv_data(&mut ann).await, expected);
    assert_eq!(recv_data(&mut bob).await, expected);
}

// =========================================================================
// Rendezvous
// =========================================================================

#[tokio::test]
async fn test_rendezvous_end_to_end() {
    let (addr, _admin) = start_server().await;
    let mut ann = logged_in(&addr, "ann").await;
    let mut bob = logged_in(&addr, "bob").await;

    ann.send(&ClientMessage::P2pInit {
        target: "bob".into(),
    })
    .await
    .unwrap();
    assert_eq!(
        recv(&mut bob).await,
        ServerMessage::P2pStart {
            requester: "ann".into()
        }
    );

    let listener = PeerListener::bind(IpAddr::V4(Ipv4Addr::LOCALHOST))
        .await
        .unwrap();
    let port = u32::from(listener.port());
    bob.send(&ClientMessage::P2pReady {
        requester: "ann".into(),
        port,
    })
    .await
    .unwrap();

    let (ip, relayed_port) = match recv(&mut ann).await {
        ServerMessage::P2pConnect { ip, port } => (ip, port),
        other => panic!("expected RESP_P2P_CONNECT, got {other:?}"),
    };
    assert_eq!(ip, "127.0.0.1");
    assert_eq!(relayed_port, port);

    let mut outbound = dial_peer(&ip, relayed_port).await.unwrap();
    let (mut inbound, _) = listener.accept().await.unwrap().expect("peer should connect");

    outbound.write_all(b"boo").await.unwrap();
    let mut buf = [0u8; 3];
    inbound.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"boo");

    // The record was consumed.
    bob.send(&ClientMessage::P2pReady {
        requester: "ann".into(),
        port,
    })
    .await
    .unwrap();
    assert_eq!(recv_error(&mut bob).await, ErrorCode::NoPendingRequest);
}

#[tokio::test]
async fn test_rendezvous_unknown_target() {
    let (addr, _admin) = start_server().await;
    let mut ann = logged_in(&addr, "ann").await;
    let mut bob = logged_in(&addr, "bob").await;

    ann.send(&ClientMessage::P2pInit {
        target: "zed".into(),
    })
    .await
    .unwrap();
    assert_eq!(recv_error(&mut ann).await, ErrorCode::PeerNotFound);

    ann.send(&ClientMessage::P2pInit {
        target: "ann".into(),
    })
    .await
    .unwrap();
    assert_eq!(recv_error(&mut ann).await, ErrorCode::PeerNotFound);

    expect_silence(&mut bob).await;
}

#[tokio::test]
async fn test_rendezvous_ready_validation() {
    let (addr, _admin) = start_server().await;
    let mut ann = logged_in(&addr, "ann").await;
    let mut bob = logged_in(&addr, "bob").await;

    bob.send(&ClientMessage::P2pReady {
        requester: "ann".into(),
        port: 4000,
    })
    .await
    .unwrap();
    assert_eq!(recv_error(&mut bob).await, ErrorCode::NoPendingRequest);

    ann.send(&ClientMessage::P2pInit {
        target: "bob".into(),
    })
    .await
    .unwrap();
    recv(&mut bob).await; // START

    bob.send(&ClientMessage::P2pReady {
        requester: "ann".into(),
        port: 70_000,
    })
    .await
    .unwrap();
    assert_eq!(recv_error(&mut bob).await, ErrorCode::InvalidData);
    expect_silence(&mut ann).await;
}

#[tokio::test]
async fn test_rendezvous_target_disconnects() {
    let (addr, _admin) = start_server().await;
    let mut ann = logged_in(&addr, "ann").await;
    let mut bob = logged_in(&addr, "bob").await;

    ann.send(&ClientMessage::P2pInit {
        target: "bob".into(),
    })
    .await
    .unwrap();
    recv(&mut bob).await; // START
    bob.close().await.unwrap();

    assert_eq!(recv_error(&mut ann).await, ErrorCode::PeerUnavailable);
}

#[tokio::test]
async fn test_rendezvous_expires() {
    let config = ServerConfig {
        rendezvous_ttl: Duration::from_millis(50),
        ..ServerConfig::default()
    };
    let (addr, _admin) = start_with(config).await;
    let mut ann = logged_in(&addr, "ann").await;
    let mut bob = logged_in(&addr, "bob").await;

    ann.send(&ClientMessage::P2pInit {
        target: "bob".into(),
    })
    .await
    .unwrap();
    recv(&mut bob).await; // START
    tokio::time::sleep(Duration::from_millis(100)).await;

    bob.send(&ClientMessage::P2pReady {
        requester: "ann".into(),
        port: 4000,
    })
    .await
    .unwrap();
    assert_eq!(recv_error(&mut bob).await, ErrorCode::NoPendingRequest);
}

// =========================================================================
// Connection lifecycle
// =========================================================================

#[tokio::test]
async fn test_framing_error_closes_without_reply() {
    let (addr, admin) = start_server().await;
    let mut ann = logged_in(&addr, "ann").await;

    // Length 1, opcode 0x42: not a known opcode.
    ann.send_raw(&[0, 0, 0, 1, 0x42]).await.unwrap();

    expect_closed(&mut ann).await;
    wait_for_sessions(&admin, |s| s.is_empty()).await;
}

#[tokio::test]
async fn test_truncated_payload_closes() {
    let (addr, _admin) = start_server().await;
    let mut ann = logged_in(&addr, "ann").await;

    // REQ_JOIN needs four bytes of room id; send two.
    ann.send_raw(&[0, 0, 0, 3, 0x03, 0, 1]).await.unwrap();

    expect_closed(&mut ann).await;
}

#[tokio::test]
async fn test_server_opcode_from_client_is_bad_request() {
    let (addr, _admin) = start_server().await;
    let mut ann = logged_in(&addr, "ann").await;

    // PING travels server → client only.
    ann.send_raw(&[0, 0, 0, 1, 0xFD]).await.unwrap();

    assert_eq!(recv_error(&mut ann).await, ErrorCode::BadRequest);
}

#[tokio::test]
async fn test_replies_flushed_after_half_close() {
    let (addr, _admin) = start_server().await;
    let stream = tokio::net::TcpStream::connect(&addr).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();

    let mut bytes = ClientMessage::Login {
        pseudo: "ann".into(),
    }
    .encode()
    .unwrap();
    bytes.extend(ClientMessage::ListRooms.encode().unwrap());
    write_half.write_all(&bytes).await.unwrap();
    write_half.shutdown().await.unwrap();

    let mut reader = FrameReader::new(read_half, DEFAULT_MAX_FRAME_LEN);
    let mut replies = Vec::new();
    while let Some(frame) = tokio::time::timeout(Duration::from_secs(2), reader.read_frame())
        .await
        .expect("server should answer, then close")
        .unwrap()
    {
        match ServerMessage::decode(&frame).unwrap() {
            ServerMessage::Ping => {}
            msg => replies.push(msg),
        }
    }

    assert_eq!(replies.len(), 2, "{replies:?}");
    assert_eq!(replies[0], ServerMessage::LoginResult(LoginStatus::Accepted));
    assert!(matches!(replies[1], ServerMessage::RoomList(_)));
}

#[tokio::test]
async fn test_idle_connection_dropped() {
    let config = ServerConfig {
        idle_timeout: Duration::from_millis(100),
        ..ServerConfig::default()
    };
    let (addr, admin) = start_with(config).await;
    let mut quiet = connect(&addr).await;

    expect_closed(&mut quiet).await;
    wait_for_sessions(&admin, |s| s.is_empty()).await;
}

#[tokio::test]
async fn test_ping_answered_keeps_connection_alive() {
    let config = ServerConfig {
        ping_interval: Duration::from_millis(30),
        idle_timeout: Duration::from_millis(200),
        ..ServerConfig::default()
    };
    let (addr, admin) = start_with(config).await;
    let mut ann = logged_in(&addr, "ann").await;

    // recv() answers every PING with PONG; nothing else should arrive.
    let outcome = tokio::time::timeout(Duration::from_millis(500), ann.recv()).await;
    assert!(outcome.is_err(), "connection should stay open, got {outcome:?}");
    assert_eq!(admin.sessions().await.len(), 1);
}

// =========================================================================
// Admin
// =========================================================================

#[tokio::test]
async fn test_admin_broadcast_reaches_everyone() {
    let (addr, admin) = start_server().await;
    let mut guest = connect(&addr).await;
    let mut ann = logged_in(&addr, "ann").await;
    join(&mut ann, 1).await;
    wait_for_sessions(&admin, |s| s.len() == 2).await;

    let delivered = admin.broadcast("maintenance").await.unwrap();

    assert_eq!(delivered, 2);
    let expected = DataMessage::Broadcast {
        message: "maintenance".into(),
    };
    assert_eq!(recv_data(&mut guest).await, expected);
    assert_eq!(recv_data(&mut ann).await, expected);
}

#[tokio::test]
async fn test_admin_kick_disconnects_and_cleans_up() {
    let (addr, admin) = start_server().await;
    let mut ann = logged_in(&addr, "ann").await;
    let mut bob = logged_in(&addr, "bob").await;
    join(&mut ann, 1).await;
    join(&mut bob, 1).await;
    recv(&mut ann).await; // NOTIFY bob joined

    let bob_id = admin
        .sessions()
        .await
        .into_iter()
        .find(|s| s.pseudo.as_deref() == Some("bob"))
        .unwrap()
        .conn_id;

    assert!(admin.kick(bob_id).await);
    assert!(!admin.kick(bob_id).await);

    expect_closed(&mut bob).await;
    assert_eq!(
        recv(&mut ann).await,
        ServerMessage::Notify {
            kind: NotifyKind::Leave,
            pseudo: "bob".into()
        }
    );
    let _bob_again = logged_in(&addr, "bob").await;
}

#[tokio::test]
async fn test_admin_create_room_is_joinable() {
    let (addr, admin) = start_server().await;
    let id = admin.create_room(RoomConfig::new("Annexe", 5)).await.unwrap();
    assert_eq!(id, RoomId(3));

    let mut ann = logged_in(&addr, "ann").await;
    assert_eq!(join(&mut ann, 3).await, ["ann"]);

    let rooms = admin.rooms().await;
    assert_eq!(rooms.len(), 3);
    assert_eq!(rooms[2].name, "Annexe");
    assert_eq!(rooms[2].player_count, 1);

    let snapshot = admin.room(id).await.unwrap();
    assert_eq!(snapshot.players, ["ann"]);
    assert_eq!(snapshot.active_player.as_deref(), Some("ann"));
}

#[tokio::test]
async fn test_builder_rejects_bad_room() {
    let result = GhostServer::builder()
        .bind("127.0.0.1:0")
        .room(RoomConfig::new("", 4))
        .build()
        .await;
    assert!(matches!(result, Err(GhostError::Room(_))));
}

#[tokio::test]
async fn test_admin_create_room_rejects_unlistable_name() {
    let (addr, admin) = start_server().await;

    let result = admin.create_room(RoomConfig::new("x".repeat(300), 4)).await;
    assert!(matches!(result, Err(GhostError::Room(_))), "{result:?}");
    assert!(admin.create_room(RoomConfig::new("Vide", 0)).await.is_err());

    // Listing still works for everyone.
    let mut ann = logged_in(&addr, "ann").await;
    ann.send(&ClientMessage::ListRooms).await.unwrap();
    match recv(&mut ann).await {
        ServerMessage::RoomList(rooms) => assert_eq!(rooms.len(), 2),
        other => panic!("expected ROOM_LIST, got {other:?}"),
    }
}

//! Per-connection handler: read loop, opcode dispatch, writer task.
//!
//! Each accepted connection gets its own Tokio task running this handler,
//! plus two helpers:
//!
//! - a **reader** task that turns the socket into a channel of frames,
//!   so the main loop can `select!` on it without losing half-read frames;
//! - a **writer** task that drains the session's outbox onto the socket,
//!   so nobody else ever blocks on this client's writes.
//!
//! The main loop ends on EOF, an I/O or framing error, the idle timeout,
//! or when something closes the outbox (slow consumer, admin kick). Every
//! exit path runs the same idempotent disconnect.

use std::sync::Arc;
use std::time::Duration;

use ghost_protocol::{
    ClientMessage, DataMessage, ErrorCode, Frame, LoginStatus, RoomId, ServerMessage,
    MAX_LISTED_ROOMS,
};
use ghost_game::GameError;
use ghost_room::RoomError;
use ghost_session::Outbox;
use ghost_transport::{ConnectionId, FrameReader, FrameWriter, TcpConnection, TransportError};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::server::ServerState;
use crate::GhostError;

/// Inbound frames buffered between the reader task and the main loop.
const INBOUND_BUFFER: usize = 16;

/// Drop guard that disconnects the session if the handler task dies
/// without reaching its normal cleanup (panic, or the task being
/// aborted).
///
/// Since `Drop` is synchronous, we spawn a fire-and-forget task for the
/// async locks.
struct ConnectionGuard {
    conn_id: ConnectionId,
    state: Arc<ServerState>,
    armed: bool,
}

impl ConnectionGuard {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.disconnect(conn_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: TcpConnection,
    state: Arc<ServerState>,
) -> Result<(), GhostError> {
    let conn_id = conn.id();
    let addr = conn.peer_addr();
    tracing::info!(%conn_id, %addr, "connection accepted");

    let (reader, writer) = conn.into_split(state.config.max_frame_len);
    let (outbox, outbound) = state.sessions.lock().await.register(conn_id, addr);
    let mut guard = ConnectionGuard {
        conn_id,
        state: Arc::clone(&state),
        armed: true,
    };

    let writer_task = tokio::spawn(write_loop(
        writer,
        outbound,
        outbox.clone(),
        state.config.write_timeout,
    ));
    let (frame_tx, mut frames) = mpsc::channel(INBOUND_BUFFER);
    let reader_task = tokio::spawn(read_loop(reader, frame_tx));

    let idle_timeout = state.config.idle_timeout;
    let ping_interval = state.config.ping_interval;
    let mut ping = tokio::time::interval_at(Instant::now() + ping_interval, ping_interval);
    let idle = tokio::time::sleep(idle_timeout);
    tokio::pin!(idle);

    let result = loop {
        tokio::select! {
            inbound = frames.recv() => match inbound {
                Some(Ok(frame)) => {
                    idle.as_mut().reset(Instant::now() + idle_timeout);
                    state.sessions.lock().await.touch(conn_id);
                    if let Err(e) = handle_frame(&state, conn_id, &outbox, &frame).await {
                        tracing::warn!(%conn_id, error = %e, "malformed frame, closing");
                        break Err(e);
                    }
                }
                Some(Err(e)) => {
                    if e.is_framing() {
                        tracing::warn!(%conn_id, error = %e, "framing error, closing");
                    } else {
                        tracing::debug!(%conn_id, error = %e, "read failed");
                    }
                    break Err(e.into());
                }
                None => {
                    tracing::info!(%conn_id, "connection closed by peer");
                    break Ok(());
                }
            },
            _ = ping.tick() => {
                if outbox.send(ServerMessage::Ping).is_err() {
                    break Ok(());
                }
            }
            () = &mut idle => {
                tracing::info!(%conn_id, "idle timeout");
                break Ok(());
            }
            () = outbox.closed() => {
                tracing::debug!(%conn_id, "outbox closed");
                break Ok(());
            }
        }
    };

    reader_task.abort();
    state.disconnect(conn_id).await;
    guard.disarm();
    // The outbox is closed now; the writer flushes nothing more and shuts
    // the socket down.
    let _ = writer_task.await;

    result
}

/// Forwards whole frames from the socket into `frames` until EOF or an
/// error, which is forwarded too.
async fn read_loop<R: AsyncRead + Unpin>(
    mut reader: FrameReader<R>,
    frames: mpsc::Sender<Result<Frame, TransportError>>,
) {
    loop {
        match reader.read_frame().await {
            Ok(Some(frame)) => {
                if frames.send(Ok(frame)).await.is_err() {
                    return;
                }
            }
            Ok(None) => return,
            Err(e) => {
                let _ = frames.send(Err(e)).await;
                return;
            }
        }
    }
}

/// Drains the outbound queue onto the socket.
///
/// A write that takes longer than `write_timeout` marks the client as
/// unable to keep up and closes the outbox, which ends the connection.
async fn write_loop<W: AsyncWrite + Unpin>(
    mut writer: FrameWriter<W>,
    mut outbound: mpsc::Receiver<ServerMessage>,
    outbox: Outbox,
    write_timeout: Duration,
) {
    let conn_id = outbox.conn_id();
    loop {
        // Queued replies go out before a close is honored.
        let msg = tokio::select! {
            biased;
            msg = outbound.recv() => match msg {
                Some(msg) => msg,
                None => break,
            },
            () = outbox.closed() => break,
        };

        let bytes = match msg.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "dropping unencodable message");
                continue;
            }
        };

        match tokio::time::timeout(write_timeout, writer.write_bytes(&bytes)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "write failed");
                break;
            }
            Err(_) => {
                tracing::warn!(%conn_id, "write timed out, dropping slow client");
                break;
            }
        }
    }

    outbox.close();
    let _ = writer.shutdown().await;
}

/// Decodes one frame and dispatches it.
///
/// Only a framing error comes back as `Err`: the stream can't be trusted
/// after one, so the caller closes the connection without replying.
/// Everything else is answered on the outbox and the connection stays up.
async fn handle_frame(
    state: &ServerState,
    conn_id: ConnectionId,
    outbox: &Outbox,
    frame: &Frame,
) -> Result<(), GhostError> {
    let msg = match ClientMessage::decode(frame) {
        Ok(msg) => msg,
        Err(e) if e.is_fatal() => return Err(e.into()),
        Err(e) => {
            tracing::warn!(%conn_id, error = %e, "protocol violation");
            reply_error(outbox, ErrorCode::BadRequest, e.to_string());
            return Ok(());
        }
    };
    tracing::debug!(%conn_id, opcode = %msg.opcode(), "dispatching");

    let pseudo = match &msg {
        ClientMessage::Login { pseudo } => {
            handle_login(state, conn_id, outbox, pseudo).await;
            return Ok(());
        }
        ClientMessage::Pong => return Ok(()),
        _ => match state.sessions.lock().await.pseudo_of(conn_id) {
            Some(pseudo) => pseudo.to_string(),
            None => {
                reply_error(outbox, ErrorCode::NotLoggedIn, "log in first");
                return Ok(());
            }
        },
    };

    match msg {
        // Handled above.
        ClientMessage::Login { .. } | ClientMessage::Pong => {}
        ClientMessage::ListRooms => handle_list_rooms(state, outbox).await,
        ClientMessage::Join { room_id } => {
            handle_join(state, conn_id, outbox, &pseudo, room_id).await
        }
        ClientMessage::Leave => handle_leave(state, conn_id, &pseudo).await,
        ClientMessage::Data(body) => handle_data(state, outbox, &pseudo, &body).await,
        ClientMessage::P2pInit { target } => {
            handle_p2p_init(state, outbox, &pseudo, &target).await
        }
        ClientMessage::P2pReady { requester, port } => {
            handle_p2p_ready(state, conn_id, outbox, &pseudo, &requester, port).await
        }
    }
    Ok(())
}

async fn handle_login(state: &ServerState, conn_id: ConnectionId, outbox: &Outbox, pseudo: &str) {
    let status = match state.sessions.lock().await.login(conn_id, pseudo) {
        Ok(()) => LoginStatus::Accepted,
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "login refused");
            LoginStatus::Refused
        }
    };
    let _ = outbox.send(ServerMessage::LoginResult(status));
}

async fn handle_list_rooms(state: &ServerState, outbox: &Outbox) {
    let handles = state.rooms.lock().await.room_handles();

    // Query the actors without holding the registry lock.
    let mut rooms = Vec::with_capacity(handles.len().min(MAX_LISTED_ROOMS));
    for handle in handles.iter().take(MAX_LISTED_ROOMS) {
        if let Ok(info) = handle.info().await {
            rooms.push(info.summary());
        }
    }
    let _ = outbox.send(ServerMessage::RoomList(rooms));
}

async fn handle_join(
    state: &ServerState,
    conn_id: ConnectionId,
    outbox: &Outbox,
    pseudo: &str,
    room_id: RoomId,
) {
    // The room actor queues RESP_ROOM itself on success.
    let result = state
        .rooms
        .lock()
        .await
        .join_room(pseudo, room_id, outbox.clone())
        .await;

    match result {
        Ok(_) => {
            let still_here = state.sessions.lock().await.set_room(conn_id, Some(room_id));
            if !still_here {
                // Kicked while joining; don't leave a ghost seat behind.
                let _ = state.rooms.lock().await.leave_room(pseudo).await;
            }
        }
        Err(RoomError::RoomFull(_)) => {
            let _ = outbox.send(ServerMessage::RoomPlayers(Vec::new()));
        }
        Err(e) => reply_room_error(outbox, e),
    }
}

async fn handle_leave(state: &ServerState, conn_id: ConnectionId, pseudo: &str) {
    let result = state.rooms.lock().await.leave_room(pseudo).await;
    match result {
        Ok(Some(_)) => {
            state.sessions.lock().await.set_room(conn_id, None);
        }
        Ok(None) => {}
        Err(e) => tracing::debug!(%conn_id, %pseudo, error = %e, "leave failed"),
    }
}

async fn handle_data(state: &ServerState, outbox: &Outbox, pseudo: &str, body: &[u8]) {
    let data = match DataMessage::from_bytes(body) {
        Ok(data) if data.is_client_message() => data,
        Ok(_) => {
            reply_error(outbox, ErrorCode::InvalidData, "clients may only send PLAY_LETTER or CHAT");
            return;
        }
        Err(e) => {
            reply_error(outbox, ErrorCode::InvalidData, e.to_string());
            return;
        }
    };

    let handle = match state.rooms.lock().await.room_of(pseudo) {
        Ok(handle) => handle,
        Err(e) => return reply_room_error(outbox, e),
    };

    let result = match data {
        DataMessage::PlayLetter { letter } => {
            let mut chars = letter.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => handle.play_letter(pseudo, c).await.map(|_| ()),
                _ => Err(RoomError::Game(GameError::InvalidLetter(letter))),
            }
        }
        // The sender field is whatever the client claimed; the room uses
        // the session's pseudo instead.
        DataMessage::Chat { message, .. } => handle.chat(pseudo, &message).await,
        DataMessage::GameState { .. } | DataMessage::Broadcast { .. } => Ok(()),
    };

    if let Err(e) = result {
        reply_room_error(outbox, e);
    }
}

async fn handle_p2p_init(state: &ServerState, outbox: &Outbox, pseudo: &str, target: &str) {
    if target == pseudo {
        reply_error(outbox, ErrorCode::PeerNotFound, "cannot rendezvous with yourself");
        return;
    }

    let target_outbox = state
        .sessions
        .lock()
        .await
        .find_by_pseudo(target)
        .map(|s| s.outbox.clone());
    let Some(target_outbox) = target_outbox else {
        reply_error(outbox, ErrorCode::PeerNotFound, format!("{target} is not connected"));
        return;
    };

    let refreshed = state.rendezvous.lock().await.request(pseudo, target);
    let start = ServerMessage::P2pStart {
        requester: pseudo.to_string(),
    };
    if target_outbox.send(start).is_err() {
        state.rendezvous.lock().await.cancel(pseudo, target);
        reply_error(outbox, ErrorCode::PeerUnavailable, format!("{target} is unavailable"));
        return;
    }
    tracing::info!(requester = %pseudo, %target, refreshed, "rendezvous requested");
}

async fn handle_p2p_ready(
    state: &ServerState,
    conn_id: ConnectionId,
    outbox: &Outbox,
    pseudo: &str,
    requester: &str,
    port: u32,
) {
    if port == 0 || port > u32::from(u16::MAX) {
        reply_error(outbox, ErrorCode::InvalidData, format!("invalid port {port}"));
        return;
    }

    if let Err(e) = state.rendezvous.lock().await.ready(requester, pseudo) {
        reply_error(outbox, ErrorCode::NoPendingRequest, e.to_string());
        return;
    }

    let (target_ip, requester_outbox) = {
        let sessions = state.sessions.lock().await;
        (
            sessions.get(conn_id).map(|s| s.addr.ip()),
            sessions.find_by_pseudo(requester).map(|s| s.outbox.clone()),
        )
    };
    let (Some(ip), Some(requester_outbox)) = (target_ip, requester_outbox) else {
        reply_error(outbox, ErrorCode::PeerUnavailable, format!("{requester} is unavailable"));
        return;
    };

    let connect = ServerMessage::P2pConnect {
        ip: ip.to_string(),
        port,
    };
    if requester_outbox.send(connect).is_err() {
        reply_error(outbox, ErrorCode::PeerUnavailable, format!("{requester} is unavailable"));
        return;
    }
    tracing::info!(%requester, target = %pseudo, %ip, port, "rendezvous relayed");
}

fn reply_room_error(outbox: &Outbox, err: RoomError) {
    let code = match &err {
        RoomError::NotFound(_) => ErrorCode::RoomNotFound,
        RoomError::AlreadyInRoom(..) => ErrorCode::AlreadyInRoom,
        RoomError::NotInRoom(_) => ErrorCode::NotInRoom,
        RoomError::Game(GameError::NotYourTurn { .. }) => ErrorCode::NotYourTurn,
        RoomError::Game(GameError::InvalidLetter(_)) => ErrorCode::InvalidData,
        RoomError::Game(GameError::UnknownPlayer(_)) => ErrorCode::NotInRoom,
        RoomError::RoomFull(_) | RoomError::Unavailable(_) | RoomError::InvalidConfig(_) => {
            ErrorCode::BadRequest
        }
    };
    reply_error(outbox, code, err.to_string());
}

fn reply_error(outbox: &Outbox, code: ErrorCode, message: impl Into<String>) {
    let _ = outbox.send(ServerMessage::error(code, message));
}

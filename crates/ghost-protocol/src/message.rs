//! Typed messages, one enum per direction.
//!
//! Each variant maps to exactly one [`OpCode`]. Decoding is a closed
//! `match` on the opcode, so adding an opcode without handling it is a
//! compile error rather than a silently ignored frame.

use crate::payload::{PayloadReader, PayloadWriter};
use crate::{
    DataMessage, ErrorCode, Frame, LoginStatus, NotifyKind, OpCode,
    ProtocolError, RoomId, RoomSummary, MAX_LISTED_ROOMS,
};

// ---------------------------------------------------------------------------
// ClientMessage
// ---------------------------------------------------------------------------

/// Messages a client sends to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// `REQ_LOGIN`: claim a pseudo.
    Login { pseudo: String },
    /// `REQ_LIST_ROOMS`.
    ListRooms,
    /// `REQ_JOIN`.
    Join { room_id: RoomId },
    /// `REQ_LEAVE`.
    Leave,
    /// `DATA`: a JSON [`DataMessage`] body, kept opaque here.
    Data(Vec<u8>),
    /// `PONG`: heartbeat answer.
    Pong,
    /// `REQ_P2P_INIT`: ask the server to reach `target`.
    P2pInit { target: String },
    /// `RESP_P2P_READY`: accept `requester`'s request, listening on `port`.
    P2pReady { requester: String, port: u32 },
}

impl ClientMessage {
    /// Wraps an application message in a `DATA` frame.
    #[cfg(feature = "json")]
    pub fn data(msg: &DataMessage) -> Result<Self, ProtocolError> {
        Ok(Self::Data(msg.to_bytes()?))
    }

    /// The opcode this message travels under.
    pub fn opcode(&self) -> OpCode {
        match self {
            Self::Login { .. } => OpCode::ReqLogin,
            Self::ListRooms => OpCode::ReqListRooms,
            Self::Join { .. } => OpCode::ReqJoin,
            Self::Leave => OpCode::ReqLeave,
            Self::Data(_) => OpCode::Data,
            Self::Pong => OpCode::Pong,
            Self::P2pInit { .. } => OpCode::ReqP2pInit,
            Self::P2pReady { .. } => OpCode::RespP2pReady,
        }
    }

    /// Encodes the payload (no length prefix, no opcode).
    pub fn encode_payload(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut w = PayloadWriter::new();
        match self {
            Self::Login { pseudo } => {
                w.put_rest_str(pseudo);
            }
            Self::ListRooms | Self::Leave | Self::Pong => {}
            Self::Join { room_id } => {
                w.put_u32(room_id.0);
            }
            Self::Data(body) => {
                w.put_rest_bytes(body);
            }
            Self::P2pInit { target } => {
                w.put_rest_str(target);
            }
            Self::P2pReady { requester, port } => {
                w.put_short_str(requester)?.put_u32(*port);
            }
        }
        Ok(w.finish())
    }

    /// Encodes the complete frame, length prefix included.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(self.to_frame()?.to_bytes())
    }

    /// Builds the frame for this message.
    pub fn to_frame(&self) -> Result<Frame, ProtocolError> {
        Ok(Frame::new(self.opcode() as u8, self.encode_payload()?))
    }

    /// Decodes a frame received by the server.
    ///
    /// # Errors
    /// - [`ProtocolError::Framing`]: unknown opcode or malformed payload.
    /// - [`ProtocolError::UnexpectedOpcode`]: a server-to-client opcode.
    pub fn decode(frame: &Frame) -> Result<Self, ProtocolError> {
        let op = OpCode::try_from(frame.opcode)?;
        let mut r = PayloadReader::new(&frame.payload);
        let msg = match op {
            OpCode::ReqLogin => Self::Login {
                pseudo: r.read_rest_str("pseudo")?,
            },
            OpCode::ReqListRooms => Self::ListRooms,
            OpCode::ReqJoin => Self::Join {
                room_id: RoomId(r.read_u32("room id")?),
            },
            OpCode::ReqLeave => Self::Leave,
            OpCode::Data => Self::Data(r.read_rest_bytes().to_vec()),
            OpCode::Pong => Self::Pong,
            OpCode::ReqP2pInit => Self::P2pInit {
                target: r.read_rest_str("target pseudo")?,
            },
            OpCode::RespP2pReady => Self::P2pReady {
                requester: r.read_short_str("requester pseudo")?,
                port: r.read_u32("listen port")?,
            },
            OpCode::RespLogin
            | OpCode::RespRoom
            | OpCode::RoomList
            | OpCode::Notify
            | OpCode::Ping
            | OpCode::ReqP2pStart
            | OpCode::RespP2pConnect
            | OpCode::Error => {
                return Err(ProtocolError::UnexpectedOpcode(op));
            }
        };
        r.finish()?;
        Ok(msg)
    }
}

// ---------------------------------------------------------------------------
// ServerMessage
// ---------------------------------------------------------------------------

/// Messages the server sends to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// `RESP_LOGIN`.
    LoginResult(LoginStatus),
    /// `ROOM_LIST`. At most [`MAX_LISTED_ROOMS`] entries are encoded.
    RoomList(Vec<RoomSummary>),
    /// `RESP_ROOM`: the full roster after a join. Empty means refused.
    RoomPlayers(Vec<String>),
    /// `NOTIFY`: someone joined or left the room.
    Notify { kind: NotifyKind, pseudo: String },
    /// `DATA`: a JSON [`DataMessage`] body.
    Data(Vec<u8>),
    /// `PING`.
    Ping,
    /// `REQ_P2P_START`: `requester` wants a direct link with you.
    P2pStart { requester: String },
    /// `RESP_P2P_CONNECT`: dial `ip:port`.
    P2pConnect { ip: String, port: u32 },
    /// `ERROR`.
    Error { code: ErrorCode, message: String },
}

impl ServerMessage {
    /// Wraps an application message in a `DATA` frame.
    #[cfg(feature = "json")]
    pub fn data(msg: &DataMessage) -> Result<Self, ProtocolError> {
        Ok(Self::Data(msg.to_bytes()?))
    }

    /// Shorthand for an `ERROR` message.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }

    /// The opcode this message travels under.
    pub fn opcode(&self) -> OpCode {
        match self {
            Self::LoginResult(_) => OpCode::RespLogin,
            Self::RoomList(_) => OpCode::RoomList,
            Self::RoomPlayers(_) => OpCode::RespRoom,
            Self::Notify { .. } => OpCode::Notify,
            Self::Data(_) => OpCode::Data,
            Self::Ping => OpCode::Ping,
            Self::P2pStart { .. } => OpCode::ReqP2pStart,
            Self::P2pConnect { .. } => OpCode::RespP2pConnect,
            Self::Error { .. } => OpCode::Error,
        }
    }

    /// Encodes the payload (no length prefix, no opcode).
    pub fn encode_payload(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut w = PayloadWriter::new();
        match self {
            Self::LoginResult(status) => {
                w.put_u8(*status as u8);
            }
            Self::RoomList(rooms) => {
                let listed = &rooms[..rooms.len().min(MAX_LISTED_ROOMS)];
                w.put_u8(listed.len() as u8);
                for room in listed {
                    w.put_u32(room.id.0);
                    w.put_short_str(&room.name)?;
                    w.put_u8(room.players).put_u8(room.max_players);
                }
            }
            Self::RoomPlayers(players) => {
                let count = u8::try_from(players.len())
                    .map_err(|_| ProtocolError::FieldTooLong(players.len()))?;
                w.put_u8(count);
                for pseudo in players {
                    w.put_short_str(pseudo)?;
                }
            }
            Self::Notify { kind, pseudo } => {
                w.put_u8(*kind as u8).put_short_str(pseudo)?;
            }
            Self::Data(body) => {
                w.put_rest_bytes(body);
            }
            Self::Ping => {}
            Self::P2pStart { requester } => {
                w.put_rest_str(requester);
            }
            Self::P2pConnect { ip, port } => {
                w.put_short_str(ip)?.put_u32(*port);
            }
            Self::Error { code, message } => {
                w.put_u8(*code as u8).put_rest_str(message);
            }
        }
        Ok(w.finish())
    }

    /// Encodes the complete frame, length prefix included.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(self.to_frame()?.to_bytes())
    }

    /// Builds the frame for this message.
    pub fn to_frame(&self) -> Result<Frame, ProtocolError> {
        Ok(Frame::new(self.opcode() as u8, self.encode_payload()?))
    }

    /// Decodes a frame received by a client.
    ///
    /// # Errors
    /// - [`ProtocolError::Framing`]: unknown opcode or malformed payload.
    /// - [`ProtocolError::UnexpectedOpcode`]: a client-to-server opcode.
    pub fn decode(frame: &Frame) -> Result<Self, ProtocolError> {
        let op = OpCode::try_from(frame.opcode)?;
        let mut r = PayloadReader::new(&frame.payload);
        let msg = match op {
            OpCode::RespLogin => {
                Self::LoginResult(LoginStatus::try_from(r.read_u8("status")?)?)
            }
            OpCode::RoomList => {
                let count = r.read_u8("room count")?;
                let mut rooms = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    rooms.push(RoomSummary {
                        id: RoomId(r.read_u32("room id")?),
                        name: r.read_short_str("room name")?,
                        players: r.read_u8("room players")?,
                        max_players: r.read_u8("room max players")?,
                    });
                }
                Self::RoomList(rooms)
            }
            OpCode::RespRoom => {
                let count = r.read_u8("player count")?;
                let mut players = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    players.push(r.read_short_str("player pseudo")?);
                }
                Self::RoomPlayers(players)
            }
            OpCode::Notify => Self::Notify {
                kind: NotifyKind::try_from(r.read_u8("notify kind")?)?,
                pseudo: r.read_short_str("notify pseudo")?,
            },
            OpCode::Data => Self::Data(r.read_rest_bytes().to_vec()),
            OpCode::Ping => Self::Ping,
            OpCode::ReqP2pStart => Self::P2pStart {
                requester: r.read_rest_str("requester pseudo")?,
            },
            OpCode::RespP2pConnect => Self::P2pConnect {
                ip: r.read_short_str("peer ip")?,
                port: r.read_u32("peer port")?,
            },
            OpCode::Error => Self::Error {
                code: ErrorCode::try_from(r.read_u8("error code")?)?,
                message: r.read_rest_str("error message")?,
            },
            OpCode::ReqLogin
            | OpCode::ReqListRooms
            | OpCode::ReqJoin
            | OpCode::ReqLeave
            | OpCode::Pong
            | OpCode::ReqP2pInit
            | OpCode::RespP2pReady => {
                return Err(ProtocolError::UnexpectedOpcode(op));
            }
        };
        r.finish()?;
        Ok(msg)
    }
}

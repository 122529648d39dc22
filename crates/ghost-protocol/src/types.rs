//! Core protocol types: opcodes, status codes and identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ProtocolError;

/// ROOM_LIST carries its count in a single byte.
pub const MAX_LISTED_ROOMS: usize = u8::MAX as usize;

// ---------------------------------------------------------------------------
// OpCode
// ---------------------------------------------------------------------------

/// Every opcode the protocol knows about.
///
/// `#[repr(u8)]` pins each variant to its wire byte, so `op as u8` is the
/// encoding and [`TryFrom<u8>`] is the (checked) decoding. Any byte not
/// listed here is a framing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// C→S: pseudo (rest of payload).
    ReqLogin = 0x01,
    /// S→C: status u8.
    RespLogin = 0x02,
    /// C→S: room id u32.
    ReqJoin = 0x03,
    /// S→C: player count u8, then short-string pseudos.
    RespRoom = 0x04,
    /// S→C: room count u8, then room summaries.
    RoomList = 0x05,
    /// C→S: empty.
    ReqLeave = 0x06,
    /// S→C: kind u8, short-string pseudo.
    Notify = 0x07,
    /// C↔S: opaque JSON application message.
    Data = 0x08,
    /// C→S: empty.
    ReqListRooms = 0x09,
    /// C→S: target pseudo (rest of payload).
    ReqP2pInit = 0x10,
    /// S→C: requester pseudo (rest of payload).
    ReqP2pStart = 0x11,
    /// C→S: short-string requester pseudo, listen port u32.
    RespP2pReady = 0x12,
    /// S→C: short-string ip, port u32.
    RespP2pConnect = 0x13,
    /// S→C: empty.
    Ping = 0xFD,
    /// C→S: empty.
    Pong = 0xFE,
    /// S→C: code u8, message (rest of payload).
    Error = 0xFF,
}

impl TryFrom<u8> for OpCode {
    type Error = ProtocolError;

    fn try_from(byte: u8) -> Result<Self, ProtocolError> {
        let op = match byte {
            0x01 => Self::ReqLogin,
            0x02 => Self::RespLogin,
            0x03 => Self::ReqJoin,
            0x04 => Self::RespRoom,
            0x05 => Self::RoomList,
            0x06 => Self::ReqLeave,
            0x07 => Self::Notify,
            0x08 => Self::Data,
            0x09 => Self::ReqListRooms,
            0x10 => Self::ReqP2pInit,
            0x11 => Self::ReqP2pStart,
            0x12 => Self::RespP2pReady,
            0x13 => Self::RespP2pConnect,
            0xFD => Self::Ping,
            0xFE => Self::Pong,
            0xFF => Self::Error,
            other => {
                return Err(ProtocolError::framing(format!(
                    "unknown opcode 0x{other:02X}"
                )));
            }
        };
        Ok(op)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReqLogin => "REQ_LOGIN",
            Self::RespLogin => "RESP_LOGIN",
            Self::ReqJoin => "REQ_JOIN",
            Self::RespRoom => "RESP_ROOM",
            Self::RoomList => "ROOM_LIST",
            Self::ReqLeave => "REQ_LEAVE",
            Self::Notify => "NOTIFY",
            Self::Data => "DATA",
            Self::ReqListRooms => "REQ_LIST_ROOMS",
            Self::ReqP2pInit => "REQ_P2P_INIT",
            Self::ReqP2pStart => "REQ_P2P_START",
            Self::RespP2pReady => "RESP_P2P_READY",
            Self::RespP2pConnect => "RESP_P2P_CONNECT",
            Self::Ping => "PING",
            Self::Pong => "PONG",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Status codes
// ---------------------------------------------------------------------------

/// Result of a login request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoginStatus {
    Accepted = 0,
    Refused = 1,
}

impl TryFrom<u8> for LoginStatus {
    type Error = ProtocolError;

    fn try_from(byte: u8) -> Result<Self, ProtocolError> {
        match byte {
            0 => Ok(Self::Accepted),
            1 => Ok(Self::Refused),
            other => Err(ProtocolError::framing(format!(
                "unknown login status {other}"
            ))),
        }
    }
}

/// What happened to a room member, carried by `NOTIFY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NotifyKind {
    Join = 0,
    Leave = 1,
}

impl TryFrom<u8> for NotifyKind {
    type Error = ProtocolError;

    fn try_from(byte: u8) -> Result<Self, ProtocolError> {
        match byte {
            0 => Ok(Self::Join),
            1 => Ok(Self::Leave),
            other => Err(ProtocolError::framing(format!(
                "unknown notify kind {other}"
            ))),
        }
    }
}

/// Codes carried by `ERROR` frames.
///
/// These report protocol violations: the request was well-framed but
/// made no sense in the current state. The connection stays open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    /// Opcode not accepted from a client, or a server-only DATA type.
    BadRequest = 1,
    /// The request needs a logged-in session.
    NotLoggedIn = 2,
    RoomNotFound = 3,
    AlreadyInRoom = 4,
    NotInRoom = 5,
    NotYourTurn = 6,
    /// A DATA body or field value was rejected.
    InvalidData = 7,
    /// Rendezvous target is unknown, offline, or the requester itself.
    PeerNotFound = 8,
    /// READY arrived with no matching (unexpired) request.
    NoPendingRequest = 9,
    /// The rendezvous target disconnected before answering.
    PeerUnavailable = 10,
}

impl TryFrom<u8> for ErrorCode {
    type Error = ProtocolError;

    fn try_from(byte: u8) -> Result<Self, ProtocolError> {
        let code = match byte {
            1 => Self::BadRequest,
            2 => Self::NotLoggedIn,
            3 => Self::RoomNotFound,
            4 => Self::AlreadyInRoom,
            5 => Self::NotInRoom,
            6 => Self::NotYourTurn,
            7 => Self::InvalidData,
            8 => Self::PeerNotFound,
            9 => Self::NoPendingRequest,
            10 => Self::PeerUnavailable,
            other => {
                return Err(ProtocolError::framing(format!(
                    "unknown error code {other}"
                )));
            }
        };
        Ok(code)
    }
}

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a room.
///
/// Newtype over the wire's `u32` so a room id can't be confused with a
/// port or a count.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub u32);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

/// A summary of a room returned in room listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    /// Players currently seated.
    pub players: u8,
    pub max_players: u8,
}

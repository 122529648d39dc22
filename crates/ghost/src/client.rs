//! A minimal protocol client.
//!
//! Enough to drive a server from tests and small tools: connect, send
//! typed requests, read typed replies. Heartbeats are answered
//! automatically and never surface to the caller.

use ghost_protocol::{ClientMessage, DataMessage, Frame, LoginStatus, ServerMessage};
use ghost_transport::{FrameReader, FrameWriter, DEFAULT_MAX_FRAME_LEN};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::GhostError;

/// One client connection to a Ghost server.
pub struct GhostClient {
    reader: FrameReader<OwnedReadHalf>,
    writer: FrameWriter<OwnedWriteHalf>,
    local_addr: std::net::SocketAddr,
}

impl GhostClient {
    pub async fn connect(addr: &str) -> Result<Self, GhostError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let local_addr = stream.local_addr()?;
        let (rd, wr) = stream.into_split();
        Ok(Self {
            reader: FrameReader::new(rd, DEFAULT_MAX_FRAME_LEN),
            writer: FrameWriter::new(wr),
            local_addr,
        })
    }

    /// This end's socket address.
    pub fn local_addr(&self) -> std::net::SocketAddr {
        self.local_addr
    }

    pub async fn send(&mut self, msg: &ClientMessage) -> Result<(), GhostError> {
        self.writer.write_frame(&msg.to_frame()?).await?;
        Ok(())
    }

    /// Sends an application message in a `DATA` frame.
    pub async fn send_data(&mut self, msg: &DataMessage) -> Result<(), GhostError> {
        self.send(&ClientMessage::data(msg)?).await
    }

    /// Writes raw bytes, bypassing the codec.
    pub async fn send_raw(&mut self, bytes: &[u8]) -> Result<(), GhostError> {
        self.writer.write_bytes(bytes).await?;
        Ok(())
    }

    /// Reads the next server message, answering any PING on the way.
    ///
    /// Returns `Ok(None)` once the server closes the connection.
    pub async fn recv(&mut self) -> Result<Option<ServerMessage>, GhostError> {
        loop {
            let Some(frame) = self.reader.read_frame().await? else {
                return Ok(None);
            };
            match ServerMessage::decode(&frame)? {
                ServerMessage::Ping => self.send(&ClientMessage::Pong).await?,
                msg => return Ok(Some(msg)),
            }
        }
    }

    /// Reads the next raw frame, without decoding or answering PINGs.
    pub async fn recv_frame(&mut self) -> Result<Option<Frame>, GhostError> {
        Ok(self.reader.read_frame().await?)
    }

    /// Logs in and waits for the answer.
    pub async fn login(&mut self, pseudo: &str) -> Result<LoginStatus, GhostError> {
        self.send(&ClientMessage::Login {
            pseudo: pseudo.to_string(),
        })
        .await?;
        match self.recv().await? {
            Some(ServerMessage::LoginResult(status)) => Ok(status),
            Some(other) => Err(ghost_protocol::ProtocolError::UnexpectedOpcode(other.opcode()).into()),
            None => Err(ghost_transport::TransportError::ConnectionClosed("during login".into()).into()),
        }
    }

    /// Closes the write half, telling the server we're done.
    pub async fn close(mut self) -> Result<(), GhostError> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

//! Reading and writing whole frames over an async byte stream.

use ghost_protocol::{decode_header, Frame, ProtocolError, HEADER_LEN};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::TransportError;

/// Largest body length accepted by default (64 KiB).
pub const DEFAULT_MAX_FRAME_LEN: usize = 64 * 1024;

/// Pulls length-prefixed frames off a byte stream.
///
/// A frame is never handed out until all of its body bytes have arrived.
pub struct FrameReader<R> {
    inner: R,
    max_frame_len: usize,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    /// Wraps a stream. Bodies longer than `max_frame_len` are rejected
    /// before any allocation.
    pub fn new(inner: R, max_frame_len: usize) -> Self {
        Self {
            inner,
            max_frame_len,
        }
    }

    /// Reads the next frame.
    ///
    /// Returns `Ok(None)` when the peer closes the stream cleanly on a
    /// frame boundary.
    ///
    /// # Errors
    /// - [`TransportError::Framing`]: zero/oversized length or empty body.
    /// - [`TransportError::ConnectionClosed`]: EOF in the middle of a frame.
    /// - [`TransportError::ReceiveFailed`]: any other I/O failure.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>, TransportError> {
        let mut header = [0u8; HEADER_LEN];

        // A clean close can only happen before the first header byte.
        let n = self
            .inner
            .read(&mut header[..1])
            .await
            .map_err(TransportError::ReceiveFailed)?;
        if n == 0 {
            return Ok(None);
        }
        self.read_exact(&mut header[1..], "header").await?;

        let len = decode_header(&header)? as usize;
        if len > self.max_frame_len {
            return Err(ProtocolError::Framing(format!(
                "frame of {len} bytes exceeds limit of {}",
                self.max_frame_len
            ))
            .into());
        }

        let mut body = vec![0u8; len];
        self.read_exact(&mut body, "body").await?;
        Ok(Some(Frame::from_body(&body)?))
    }

    async fn read_exact(
        &mut self,
        buf: &mut [u8],
        part: &str,
    ) -> Result<(), TransportError> {
        match self.inner.read_exact(buf).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Err(TransportError::ConnectionClosed(format!(
                    "stream ended inside frame {part}"
                )))
            }
            Err(e) => Err(TransportError::ReceiveFailed(e)),
        }
    }
}

/// Writes frames to a byte stream.
pub struct FrameWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    /// Wraps a stream.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Writes one frame and flushes it.
    pub async fn write_frame(&mut self, frame: &Frame) -> Result<(), TransportError> {
        self.write_bytes(&frame.to_bytes()).await
    }

    /// Writes bytes that are already framed and flushes them.
    pub async fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.inner
            .write_all(bytes)
            .await
            .map_err(TransportError::SendFailed)?;
        self.inner.flush().await.map_err(TransportError::SendFailed)
    }

    /// Shuts down the write side, signalling EOF to the peer.
    pub async fn shutdown(&mut self) -> Result<(), TransportError> {
        self.inner
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghost_protocol::encode_frame;

    #[tokio::test]
    async fn test_read_frame_waits_for_full_body() {
        let (client, server) = tokio::io::duplex(64);
        let mut reader = FrameReader::new(server, DEFAULT_MAX_FRAME_LEN);
        let mut writer = FrameWriter::new(client);

        let bytes = encode_frame(0x01, b"alice");
        let (head, tail) = bytes.split_at(6);
        writer.write_bytes(head).await.unwrap();

        let read = tokio::spawn(async move { reader.read_frame().await });
        tokio::task::yield_now().await;
        writer.write_bytes(tail).await.unwrap();

        let frame = read.await.unwrap().unwrap().unwrap();
        assert_eq!(frame, Frame::new(0x01, b"alice".to_vec()));
    }

    #[tokio::test]
    async fn test_read_frame_clean_eof_returns_none() {
        let (client, server) = tokio::io::duplex(64);
        drop(client);
        let mut reader = FrameReader::new(server, DEFAULT_MAX_FRAME_LEN);
        assert!(reader.read_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_frame_eof_mid_header_is_closed_error() {
        let (client, server) = tokio::io::duplex(64);
        let mut writer = FrameWriter::new(client);
        writer.write_bytes(&[0, 0]).await.unwrap();
        drop(writer);
        let mut reader = FrameReader::new(server, DEFAULT_MAX_FRAME_LEN);
        assert!(matches!(
            reader.read_frame().await,
            Err(TransportError::ConnectionClosed(_))
        ));
    }

    #[tokio::test]
    async fn test_read_frame_zero_length_is_framing_error() {
        let (client, server) = tokio::io::duplex(64);
        let mut writer = FrameWriter::new(client);
        writer.write_bytes(&[0, 0, 0, 0]).await.unwrap();
        let mut reader = FrameReader::new(server, DEFAULT_MAX_FRAME_LEN);
        assert!(reader.read_frame().await.unwrap_err().is_framing());
    }

    #[tokio::test]
    async fn test_read_frame_oversized_is_framing_error() {
        let (client, server) = tokio::io::duplex(64);
        let mut writer = FrameWriter::new(client);
        writer.write_bytes(&1000u32.to_be_bytes()).await.unwrap();
        let mut reader = FrameReader::new(server, 16);
        assert!(reader.read_frame().await.unwrap_err().is_framing());
    }

    #[tokio::test]
    async fn test_read_frames_back_to_back() {
        let (client, server) = tokio::io::duplex(256);
        let mut writer = FrameWriter::new(client);
        writer.write_frame(&Frame::new(0x09, vec![])).await.unwrap();
        writer.write_frame(&Frame::new(0x03, vec![0, 0, 0, 2])).await.unwrap();

        let mut reader = FrameReader::new(server, DEFAULT_MAX_FRAME_LEN);
        assert_eq!(reader.read_frame().await.unwrap().unwrap().opcode, 0x09);
        let second = reader.read_frame().await.unwrap().unwrap();
        assert_eq!(second.payload, vec![0, 0, 0, 2]);
    }
}

//! Cursor helpers for building and parsing opcode payloads.
//!
//! Field conventions shared by every message:
//! - integers are big-endian,
//! - strings are UTF-8 with a single-byte length prefix (0–255),
//! - the *last* string of a message may instead run to the end of the
//!   payload ("rest" strings), with no prefix.

use crate::ProtocolError;

/// Appends fields to a payload buffer.
#[derive(Debug, Default)]
pub struct PayloadWriter {
    buf: Vec<u8>,
}

impl PayloadWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one byte.
    pub fn put_u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    /// Writes a big-endian `u32`.
    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Writes a string prefixed with its byte length as a `u8`.
    ///
    /// # Errors
    /// Returns [`ProtocolError::FieldTooLong`] if the UTF-8 encoding is
    /// longer than 255 bytes.
    pub fn put_short_str(
        &mut self,
        value: &str,
    ) -> Result<&mut Self, ProtocolError> {
        let len = u8::try_from(value.len())
            .map_err(|_| ProtocolError::FieldTooLong(value.len()))?;
        self.buf.push(len);
        self.buf.extend_from_slice(value.as_bytes());
        Ok(self)
    }

    /// Writes a string with no prefix. Must be the last field.
    pub fn put_rest_str(&mut self, value: &str) -> &mut Self {
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    /// Writes raw bytes with no prefix. Must be the last field.
    pub fn put_rest_bytes(&mut self, value: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(value);
        self
    }

    /// Returns the finished payload.
    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

/// Reads fields out of a payload, checking every declared length
/// against the bytes that remain.
#[derive(Debug)]
pub struct PayloadReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> PayloadReader<'a> {
    /// Starts reading at the beginning of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize, field: &str) -> Result<&'a [u8], ProtocolError> {
        if n > self.remaining() {
            return Err(ProtocolError::framing(format!(
                "truncated {field}: need {n} bytes, {} left",
                self.remaining()
            )));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Reads one byte.
    pub fn read_u8(&mut self, field: &str) -> Result<u8, ProtocolError> {
        Ok(self.take(1, field)?[0])
    }

    /// Reads a big-endian `u32`.
    pub fn read_u32(&mut self, field: &str) -> Result<u32, ProtocolError> {
        let bytes = self.take(4, field)?;
        let mut arr = [0u8; 4];
        arr.copy_from_slice(bytes);
        Ok(u32::from_be_bytes(arr))
    }

    /// Reads a `u8`-length-prefixed UTF-8 string.
    pub fn read_short_str(
        &mut self,
        field: &str,
    ) -> Result<String, ProtocolError> {
        let len = self.read_u8(field)? as usize;
        let bytes = self.take(len, field)?;
        utf8(bytes, field)
    }

    /// Reads every remaining byte as a UTF-8 string.
    pub fn read_rest_str(
        &mut self,
        field: &str,
    ) -> Result<String, ProtocolError> {
        let bytes = self.read_rest_bytes();
        utf8(bytes, field)
    }

    /// Reads every remaining byte.
    pub fn read_rest_bytes(&mut self) -> &'a [u8] {
        let rest = &self.buf[self.pos..];
        self.pos = self.buf.len();
        rest
    }

    /// Asserts the payload has been consumed exactly.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Framing`] if bytes are left over.
    pub fn finish(self) -> Result<(), ProtocolError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(ProtocolError::framing(format!(
                "{n} trailing bytes after payload"
            ))),
        }
    }
}

fn utf8(bytes: &[u8], field: &str) -> Result<String, ProtocolError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| {
        ProtocolError::framing(format!("{field} is not valid UTF-8"))
    })
}

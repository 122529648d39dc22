use ghost_protocol::ProtocolError;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer closed the stream in the middle of a frame.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding, accepting or dialing failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The byte stream is not valid framing.
    #[error(transparent)]
    Framing(#[from] ProtocolError),

    /// An address received over the wire can't be dialed.
    #[error("invalid peer address: {0}")]
    InvalidAddress(String),
}

impl TransportError {
    /// Returns `true` when the stream can't be trusted anymore because
    /// framing was lost (as opposed to a plain I/O failure).
    pub fn is_framing(&self) -> bool {
        matches!(self, Self::Framing(_))
    }
}

//! The effect sum type every algorithm yields instead of performing I/O
//! itself. A driver performs the requested effect and resumes the
//! algorithm with the result.

/// What the driver must do before calling `resume` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    /// The algorithm has finished (possibly with an error already recorded).
    None,
    /// Read more bytes into the connection's read buffer.
    Read,
    /// Write pending bytes from the connection's write buffer.
    Write,
    /// Perform a TLS handshake on the current transport.
    SslHandshake,
    /// Perform a TLS shutdown (close_notify) on the current transport.
    SslShutdown,
    /// Open the transport connection.
    Connect,
    /// Close the transport connection.
    Close,
}

impl NextAction {
    pub fn is_terminal(self) -> bool {
        matches!(self, NextAction::None)
    }
}

//! Error and diagnostics types surfaced by the core.
//!
//! Every algorithm returns `Result<T, Error>`; `Error` never carries I/O
//! retry state, only enough information for a caller to decide what to do
//! next (see `SPEC_FULL.md` for why this mirrors `sqlx_core::error::Error`
//! but is a `thiserror` enum instead of a hand-rolled one).

use crate::diagnostics::Diagnostics;
use crate::state::DbFlavor;
use std::fmt;

/// A specialised `Result` for this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every way an operation in this core can fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("incomplete message: need more bytes than the buffer currently holds")]
    IncompleteMessage,

    #[error("extra bytes left over after decoding a message")]
    ExtraBytes,

    #[error("protocol value error: {0}")]
    ProtocolValueError(String),

    #[error("sequence number mismatch: expected {expected}, got {actual}")]
    SequenceNumberMismatch { expected: u8, actual: u8 },

    #[error("server unsupported: {0}")]
    ServerUnsupported(String),

    #[error("max buffer size ({max}) exceeded: needed {needed}")]
    MaxBufferSizeExceeded { max: usize, needed: usize },

    #[error("connection is not connected")]
    NotConnected,

    #[error("connection is not engaged in a multi-function operation")]
    NotEngagedInMultiFunction,

    #[error("connection is already engaged in a multi-function operation")]
    EngagedInMultiFunction,

    #[error("unknown authentication plugin: {0}")]
    UnknownAuthPlugin(String),

    #[error("authentication plugin requires a secure channel")]
    AuthPluginRequiresSsl,

    #[error("server doesn't support SSL but ssl_mode = require")]
    ServerDoesntSupportSsl,

    #[error("unexpected packet type during handshake: {0}")]
    BadHandshakePacketType(String),

    #[error("wrong number of parameters: statement expects {expected}, got {actual}")]
    WrongNumParams { expected: usize, actual: usize },

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("unknown character set id {0}")]
    UnknownCharacterSet(u16),

    #[error("static row parsing error: {0}")]
    StaticRowParsingError(String),

    #[error("metadata check failed: {0}")]
    MetadataCheckFailed(String),

    #[error("number of resultsets mismatch")]
    NumResultsetsMismatch,

    #[error("format argument not found: {0}")]
    FormatArgNotFound(String),

    /// An error reported by the server in an ERR packet.
    #[error("server error {code}: {message}")]
    Server {
        code: ServerErrorCode,
        message: String,
        diagnostics: Diagnostics,
    },

    /// Passed through unchanged from the transport collaborator.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    pub fn protocol_value(args: fmt::Arguments<'_>) -> Self {
        Error::ProtocolValueError(args.to_string())
    }

    pub fn server_unsupported(args: fmt::Arguments<'_>) -> Self {
        Error::ServerUnsupported(args.to_string())
    }

    /// The `Diagnostics` object attached to this error, synthesised for
    /// client errors that carry no server-supplied text.
    pub fn diagnostics(&self) -> Diagnostics {
        match self {
            Error::Server { diagnostics, .. } => diagnostics.clone(),
            other => Diagnostics::client(other.to_string()),
        }
    }
}

/// Used by the `protocol_value_err!`/`server_unsupported_err!` macros for a
/// lazily evaluated conversion, mirroring `sqlx_core::error::ProtocolError`.
macro_rules! protocol_value_err {
    ($($args:tt)*) => {
        $crate::error::Error::protocol_value(format_args!($($args)*))
    };
}

macro_rules! server_unsupported_err {
    ($($args:tt)*) => {
        $crate::error::Error::server_unsupported(format_args!($($args)*))
    };
}

/// Server error codes, split by flavor the way the wire's ERR packet
/// numbering is (the numeric code means different things to MySQL and
/// MariaDB servers past the shared common range).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerErrorCode {
    Common(u16),
    MySql(u16),
    MariaDb(u16),
}

impl ServerErrorCode {
    pub fn from_wire(code: u16, flavor: DbFlavor) -> Self {
        // The common error range is shared verbatim between both servers;
        // above it, the numbering diverges per-flavor.
        const COMMON_MAX: u16 = 1999;
        if code <= COMMON_MAX {
            ServerErrorCode::Common(code)
        } else {
            match flavor {
                DbFlavor::MySql => ServerErrorCode::MySql(code),
                DbFlavor::MariaDb => ServerErrorCode::MariaDb(code),
            }
        }
    }
}

impl fmt::Display for ServerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerErrorCode::Common(c) => write!(f, "{c}"),
            ServerErrorCode::MySql(c) => write!(f, "{c} (mysql)"),
            ServerErrorCode::MariaDb(c) => write!(f, "{c} (mariadb)"),
        }
    }
}

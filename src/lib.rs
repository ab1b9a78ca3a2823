#![forbid(unsafe_code)]

//! A sans-I/O core for the MySQL/MariaDB wire protocol.
//!
//! Every state machine in this crate communicates with the outside world
//! exclusively through [`NextAction`]: an algorithm never reads or writes a
//! socket, opens a TLS session, or sleeps. A driver owns the transport,
//! performs whatever [`NextAction`] asks for, and resumes the algorithm
//! with the result. This keeps the protocol logic testable without a
//! server and usable from any I/O model the embedding application already
//! runs.
//!
//! - [`framing`] assembles raw bytes into logical messages (and back).
//! - [`protocol`] decodes/encodes the typed messages those bytes carry.
//! - [`auth`] computes the auth-plugin challenge responses the handshake
//!   needs.
//! - [`state`] holds the mutable state an algorithm reads and updates:
//!   buffers, sequence numbers, connection status.
//! - [`algorithm`] is one resumable state machine per operation: handshake,
//!   execute, prepare, ping, and so on.
//! - [`pool`] is a sans-I/O connection-pool node state machine, layered on
//!   top of a driver that embeds this crate's connections.

#[macro_use]
pub mod error;

pub mod diagnostics;

pub mod io;

pub mod framing;

pub mod protocol;

pub mod auth;

pub mod state;

mod next_action;

pub mod processor;

pub mod config;

pub mod algorithm;

pub mod pool;

pub use algorithm::{
    CloseAlgorithm, CloseStatementAlgorithm, ExecuteAlgorithm, HandshakeAlgorithm, HandshakeParams, HeadOutcome,
    PingAlgorithm, PipelineStage, PipelineStageResult, PreparedStatement, PrepareStatementAlgorithm, QuitAlgorithm,
    ReadResultsetHeadAlgorithm, ReadSomeRowsAlgorithm, ResetConnectionAlgorithm, RowsReadOutcome, RunPipelineAlgorithm,
    SetCharacterSetAlgorithm, StartExecutionAlgorithm,
};
pub use config::{Config, SslMode};
#[doc(inline)]
pub use error::{Error, Result};
pub use next_action::NextAction;
pub use processor::{EagerProcessor, ExecutionProcessor, MetaMode, ResultSet, StreamingProcessor};
pub use state::{Charset, ConnectionState, ConnectionStatus, DbFlavor, ExecutionPhase, ExecutionState, OkSummary, RowEncoding};

//! Connection and execution state shared across algorithms.

mod charset;
mod connection;
mod execution;

pub use charset::{Charset, DEFAULT_COLLATION_ID};
pub use connection::{ConnectionState, ConnectionStatus, DbFlavor};
pub use execution::{ExecutionPhase, ExecutionState, OkSummary, RowEncoding};

//! Connection-wide state: status, negotiated capabilities, buffers, and the
//! per-command sequence-number counter.

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::framing::{ReadBuffer, WriteBuffer};
use crate::protocol::Capabilities;
use crate::state::charset::Charset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbFlavor {
    MySql,
    MariaDb,
}

impl DbFlavor {
    pub fn from_server_version(server_version: &str) -> Self {
        if server_version.contains("MariaDB") {
            DbFlavor::MariaDb
        } else {
            DbFlavor::MySql
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    NotConnected,
    ConnectInProgress,
    SleepConnectFailedInProgress,
    ResetInProgress,
    PingInProgress,
    Ready,
    EngagedInMultiFunction,
    Terminated,
}

impl ConnectionStatus {
    pub fn permits_new_operation(self) -> bool {
        matches!(self, ConnectionStatus::Ready)
    }
}

/// Everything a connection needs to drive the wire protocol, independent of
/// any transport: buffers, negotiated parameters, and lifecycle status.
#[derive(Debug)]
pub struct ConnectionState {
    pub status: ConnectionStatus,
    pub capabilities: Capabilities,
    pub db_flavor: DbFlavor,
    pub tls_supported: bool,
    pub tls_active: bool,
    pub backslash_escapes: bool,
    pub current_charset: Option<Charset>,
    pub connection_id: u32,
    pub read_buffer: ReadBuffer,
    pub write_buffer: WriteBuffer,
    pub sequence_number: u8,
    pub diagnostics: Diagnostics,
}

impl ConnectionState {
    pub fn new(initial_buffer_size: usize, max_buffer_size: usize) -> Self {
        ConnectionState {
            status: ConnectionStatus::NotConnected,
            capabilities: Capabilities::empty(),
            db_flavor: DbFlavor::MySql,
            tls_supported: false,
            tls_active: false,
            backslash_escapes: true,
            current_charset: None,
            connection_id: 0,
            read_buffer: ReadBuffer::new(initial_buffer_size, max_buffer_size),
            write_buffer: WriteBuffer::new(),
            sequence_number: 0,
            diagnostics: Diagnostics::none(),
        }
    }

    /// Resets the per-command sequence-number counter; every top-level
    /// command does this before writing its request.
    pub fn reset_sequence_number(&mut self) {
        self.sequence_number = 0;
    }

    pub fn require_ready(&self) -> Result<()> {
        match self.status {
            ConnectionStatus::Ready => Ok(()),
            ConnectionStatus::EngagedInMultiFunction => Err(Error::EngagedInMultiFunction),
            ConnectionStatus::NotConnected | ConnectionStatus::Terminated => Err(Error::NotConnected),
            _ => Err(Error::NotConnected),
        }
    }

    pub fn require_engaged_in_multi_function(&self) -> Result<()> {
        match self.status {
            ConnectionStatus::EngagedInMultiFunction => Ok(()),
            _ => Err(Error::NotEngagedInMultiFunction),
        }
    }

    pub fn apply_ok_status(&mut self, status_flags: crate::protocol::Status) {
        self.backslash_escapes =
            !status_flags.contains(crate::protocol::Status::SERVER_STATUS_NO_BACKSLASH_ESCAPES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_flavor_detects_mariadb_substring() {
        assert_eq!(
            DbFlavor::from_server_version("5.5.5-10.4.7-MariaDB-1:10.4.7+maria~bionic"),
            DbFlavor::MariaDb
        );
        assert_eq!(DbFlavor::from_server_version("8.0.18"), DbFlavor::MySql);
    }

    #[test]
    fn only_ready_permits_new_operations() {
        let mut c = ConnectionState::new(1024, 1024 * 1024);
        assert!(c.require_ready().is_err());
        c.status = ConnectionStatus::Ready;
        assert!(c.require_ready().is_ok());
        c.status = ConnectionStatus::EngagedInMultiFunction;
        assert!(matches!(c.require_ready(), Err(Error::EngagedInMultiFunction)));
    }
}

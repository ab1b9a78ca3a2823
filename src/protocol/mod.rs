//! Typed protocol messages: server hello, login request, OK/ERR/EOF,
//! column definitions, text/binary rows, and the command packets.

mod auth_switch;
mod capabilities;
mod column;
mod column_def;
mod com_ping;
mod com_query;
mod com_quit;
mod com_reset_connection;
mod com_stmt_close;
mod com_stmt_execute;
mod com_stmt_prepare;
mod err;
mod handshake;
mod handshake_response;
mod ok;
mod opcode;
mod row;
mod status;

pub use auth_switch::{caching_sha2, AuthSwitchRequest, MoreData};
pub use capabilities::Capabilities;
pub use column::{FieldFlags, FieldType};
pub use column_def::ColumnDefinition;
pub use com_stmt_execute::{CursorType, ParamValue};
pub use com_stmt_prepare::StmtPrepareOk;
pub use err::ErrPacket;
pub use handshake::Handshake;
pub use handshake_response::{HandshakeResponse, SslRequest};
pub use ok::OkPacket;
pub use opcode::Command;
pub use row::{Row, RowValue};
pub use status::Status;

pub mod encode {
    pub use super::com_ping::encode as ping;
    pub use super::com_query::encode as query;
    pub use super::com_quit::encode as quit;
    pub use super::com_reset_connection::encode as reset_connection;
    pub use super::com_stmt_close::encode as stmt_close;
    pub use super::com_stmt_execute::encode as stmt_execute;
    pub use super::com_stmt_prepare::encode as stmt_prepare;
}

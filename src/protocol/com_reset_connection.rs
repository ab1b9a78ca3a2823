//! `COM_RESET_CONNECTION`: resets session state but keeps the connection.

use crate::protocol::opcode::Command;

pub fn encode() -> Vec<u8> {
    vec![Command::ResetConnection.opcode()]
}

//! `COM_QUIT`: tells the server the client is disconnecting. No response.

use crate::protocol::opcode::Command;

pub fn encode() -> Vec<u8> {
    vec![Command::Quit.opcode()]
}

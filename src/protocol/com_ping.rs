//! `COM_PING`: liveness check; server always replies OK.

use crate::protocol::opcode::Command;

pub fn encode() -> Vec<u8> {
    vec![Command::Ping.opcode()]
}

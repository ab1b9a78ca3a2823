//! `COM_QUERY`: a plain text SQL statement.

use crate::io::Serializer;
use crate::protocol::opcode::Command;

pub fn encode(sql: &str) -> Vec<u8> {
    let mut s = Serializer::with_capacity(sql.len() + 1);
    s.u8(Command::Query.opcode());
    s.str(sql);
    s.finish()
}

//! `COM_STMT_CLOSE`: deallocates a prepared statement. No response.

use crate::io::Serializer;
use crate::protocol::opcode::Command;

pub fn encode(statement_id: u32) -> Vec<u8> {
    let mut s = Serializer::with_capacity(5);
    s.u8(Command::StmtClose.opcode());
    s.u32(statement_id);
    s.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_stmt_close() {
        assert_eq!(encode(7), vec![0x19, 7, 0, 0, 0]);
    }
}

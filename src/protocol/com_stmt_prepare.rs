//! `COM_STMT_PREPARE` request and its response header.

use crate::error::Result;
use crate::io::{Deserializer, Serializer};
use crate::protocol::opcode::Command;

pub fn encode(sql: &str) -> Vec<u8> {
    let mut s = Serializer::with_capacity(sql.len() + 1);
    s.u8(Command::StmtPrepare.opcode());
    s.str(sql);
    s.finish()
}

#[derive(Debug, Clone, Copy)]
pub struct StmtPrepareOk {
    pub statement_id: u32,
    pub num_columns: u16,
    pub num_params: u16,
    pub warning_count: u16,
}

impl StmtPrepareOk {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut d = Deserializer::new(buf);
        let _status = d.u8()?;
        let statement_id = d.u32()?;
        let num_columns = d.u16()?;
        let num_params = d.u16()?;
        let _reserved = d.u8()?;
        let warning_count = if d.is_empty() { 0 } else { d.u16()? };
        Ok(StmtPrepareOk {
            statement_id,
            num_columns,
            num_params,
            warning_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_stmt_prepare() {
        assert_eq!(encode("SELECT ?"), b"\x16SELECT ?");
    }

    #[test]
    fn decodes_prepare_ok_header() {
        let mut s = Serializer::new();
        s.u8(0);
        s.u32(7);
        s.u16(1);
        s.u16(2);
        s.u8(0);
        s.u16(0);
        let bytes = s.finish();
        let ok = StmtPrepareOk::decode(&bytes).unwrap();
        assert_eq!(ok.statement_id, 7);
        assert_eq!(ok.num_columns, 1);
        assert_eq!(ok.num_params, 2);
    }
}

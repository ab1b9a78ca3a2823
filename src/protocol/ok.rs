//! The OK packet: `0x00` (or `0xFE` under `CLIENT_DEPRECATE_EOF`) header.

use crate::io::Deserializer;
use crate::error::Result;
use crate::protocol::status::Status;

#[derive(Debug, Clone)]
pub struct OkPacket {
    pub affected_rows: u64,
    pub last_insert_id: u64,
    pub status: Status,
    pub warnings: u16,
    pub info: String,
}

impl OkPacket {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut d = Deserializer::new(buf);
        let header = d.u8()?;
        if header != 0x00 && header != 0xFE {
            return Err(protocol_value_err!(
                "expected OK header 0x00 or 0xFE, got 0x{header:02x}"
            ));
        }

        let affected_rows = d.int_lenenc()?.unwrap_or(0);
        let last_insert_id = d.int_lenenc()?.unwrap_or(0);
        let status = Status::from_bits_truncate(d.u16()?);
        let warnings = d.u16()?;
        let info = d.str_eof()?.to_owned();
        d.check_extra_bytes()?;

        Ok(OkPacket {
            affected_rows,
            last_insert_id,
            status,
            warnings,
            info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK_HANDSHAKE: &[u8] = b"\x00\x00\x00\x02\x00\x00\x00";

    #[test]
    fn decodes_ok_handshake() {
        let p = OkPacket::decode(OK_HANDSHAKE).unwrap();
        assert_eq!(p.affected_rows, 0);
        assert_eq!(p.last_insert_id, 0);
        assert_eq!(p.warnings, 0);
        assert!(p.status.contains(Status::SERVER_STATUS_AUTOCOMMIT));
        assert!(p.info.is_empty());
    }

    #[test]
    fn scenario_1_trivial_query_ok() {
        let bytes = hex::decode("00000002000000").unwrap();
        let p = OkPacket::decode(&bytes).unwrap();
        assert_eq!(p.affected_rows, 0);
        assert_eq!(p.last_insert_id, 0);
        assert_eq!(p.status.bits(), 2);
        assert_eq!(p.warnings, 0);
    }
}

//! The ERR packet: `0xFF` header, numeric code, optional SQL-state marker.

use crate::io::Deserializer;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct ErrPacket {
    pub error_code: u16,
    pub sql_state: Option<String>,
    pub error_message: String,
}

impl ErrPacket {
    /// `has_sql_state` is false only for an ERR received before
    /// `CLIENT_PROTOCOL_41` negotiation completes; this core always
    /// negotiates 4.1, so every ERR past the handshake's first packet
    /// carries one.
    pub fn decode(buf: &[u8], has_sql_state: bool) -> Result<Self> {
        let mut d = Deserializer::new(buf);
        let header = d.u8()?;
        if header != 0xFF {
            return Err(protocol_value_err!("expected ERR header 0xFF, got 0x{header:02x}"));
        }

        let error_code = d.u16()?;

        let sql_state = if has_sql_state {
            let _marker = d.str_fixed(1)?;
            Some(d.str_fixed(5)?.to_owned())
        } else {
            None
        };

        let error_message = d.str_eof()?.to_owned();
        d.check_extra_bytes()?;

        Ok(ErrPacket {
            error_code,
            sql_state,
            error_message,
        })
    }
}

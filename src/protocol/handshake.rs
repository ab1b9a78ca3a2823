//! Server hello (`Handshake`, protocol version 10).

use crate::error::Result;
use crate::io::Deserializer;
use crate::protocol::capabilities::Capabilities;
use crate::protocol::status::Status;

#[derive(Debug, Clone)]
pub struct Handshake {
    pub protocol_version: u8,
    pub server_version: String,
    pub connection_id: u32,
    pub capabilities: Capabilities,
    pub character_set: u8,
    pub status: Status,
    pub auth_plugin_data: Vec<u8>,
    pub auth_plugin_name: Option<String>,
}

impl Handshake {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut d = Deserializer::new(buf);

        let protocol_version = d.u8()?;
        if protocol_version != 10 {
            return Err(server_unsupported_err!(
                "unsupported handshake protocol version {protocol_version}, only 10 is supported"
            ));
        }

        let server_version = d.str_null()?.to_owned();
        let connection_id = d.u32()?;

        let mut auth_plugin_data = d.bytes(8)?.to_vec();
        let _filler = d.u8()?;

        let caps_lower = d.u16()?;
        let mut capabilities = Capabilities::from_bits_truncate(caps_lower as u32);

        let character_set = d.u8()?;
        let status = Status::from_bits_truncate(d.u16()?);

        let caps_upper = d.u16()?;
        capabilities |= Capabilities::from_bits_truncate((caps_upper as u32) << 16);

        let auth_plugin_data_len = if capabilities.contains(Capabilities::PLUGIN_AUTH) {
            d.u8()?
        } else {
            let _ = d.u8()?;
            0
        };

        let _reserved = d.bytes(10)?;

        let auth_plugin_name = if capabilities.contains(Capabilities::PLUGIN_AUTH) {
            // This field's length includes its own trailing NUL; that byte
            // is part of the field, not the start of the plugin name.
            let part2_len = (auth_plugin_data_len as usize).saturating_sub(8).max(13);
            let part2 = d.bytes(part2_len)?;
            auth_plugin_data.extend_from_slice(&part2[..part2_len - 1]);
            Some(d.str_null()?.to_owned())
        } else {
            None
        };

        Ok(Handshake {
            protocol_version,
            server_version,
            connection_id,
            capabilities,
            character_set,
            status,
            auth_plugin_data,
            auth_plugin_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HANDSHAKE_MARIA_DB_10_4_7: &[u8] = b"\n5.5.5-10.4.7-MariaDB-1:10.4.7+maria~bionic\x00\x0b\x00\x00\x00t6L\\j\"dS\x00\xfe\xf7\x08\x02\x00\xff\x81\x15\x00\x00\x00\x00\x00\x00\x07\x00\x00\x00U14Oph9\"<H5n\x00mysql_native_password\x00";
    const HANDSHAKE_MYSQL_8_0_18: &[u8] = b"\n8.0.18\x00\x19\x00\x00\x00\x114aB0c\x06g\x00\xff\xff\xff\x02\x00\xff\xc7\x15\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00tL\x03s\x0f[4\rl4. \x00caching_sha2_password\x00";

    #[test]
    fn reads_handshake_mariadb_10_4_7() {
        let h = Handshake::decode(HANDSHAKE_MARIA_DB_10_4_7).unwrap();
        assert_eq!(h.protocol_version, 10);
        assert_eq!(&h.server_version, "5.5.5-10.4.7-MariaDB-1:10.4.7+maria~bionic");
        assert_eq!(h.auth_plugin_name.as_deref(), Some("mysql_native_password"));
        assert_eq!(h.auth_plugin_data.len(), 20);
    }

    #[test]
    fn reads_handshake_mysql_8_0_18() {
        let h = Handshake::decode(HANDSHAKE_MYSQL_8_0_18).unwrap();
        assert_eq!(h.protocol_version, 10);
        assert_eq!(&h.server_version, "8.0.18");
        assert_eq!(h.auth_plugin_name.as_deref(), Some("caching_sha2_password"));
        assert_eq!(h.auth_plugin_data.len(), 20);
        assert!(h.status.contains(Status::SERVER_STATUS_AUTOCOMMIT));
    }

    #[test]
    fn rejects_protocol_version_9() {
        let mut bytes = vec![9u8];
        bytes.extend_from_slice(b"5.0\x00\x01\x00\x00\x00");
        assert!(Handshake::decode(&bytes).is_err());
    }
}

//! The client's login request (`HandshakeResponse41`).

use crate::io::Serializer;
use crate::protocol::capabilities::Capabilities;

#[derive(Debug, Clone)]
pub struct HandshakeResponse<'a> {
    pub capabilities: Capabilities,
    pub max_packet_size: u32,
    pub collation_id: u8,
    pub username: &'a str,
    pub auth_response: &'a [u8],
    pub database: Option<&'a str>,
    pub auth_plugin_name: &'a str,
}

impl<'a> HandshakeResponse<'a> {
    pub fn encode(&self) -> Vec<u8> {
        let mut s = Serializer::new();
        s.u32(self.capabilities.bits());
        s.u32(self.max_packet_size);
        s.u8(self.collation_id);
        s.zeros(23);
        s.str_null(self.username);
        s.bytes_lenenc(self.auth_response);
        if let Some(db) = self.database {
            s.str_null(db);
        }
        s.str_null(self.auth_plugin_name);
        s.finish()
    }
}

/// The minimal prefix of a `HandshakeResponse41` sent alone to request a TLS
/// upgrade before the rest of the login request follows over the encrypted
/// channel.
#[derive(Debug, Clone)]
pub struct SslRequest {
    pub capabilities: Capabilities,
    pub max_packet_size: u32,
    pub collation_id: u8,
}

impl SslRequest {
    pub fn encode(&self) -> Vec<u8> {
        let mut s = Serializer::new();
        s.u32(self.capabilities.bits());
        s.u32(self.max_packet_size);
        s.u8(self.collation_id);
        s.zeros(23);
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_login_request_with_database() {
        let r = HandshakeResponse {
            capabilities: Capabilities::PROTOCOL_41,
            max_packet_size: 0xFF_FF_FF,
            collation_id: 33,
            username: "root",
            auth_response: b"\x01\x02",
            database: Some("test"),
            auth_plugin_name: "mysql_native_password",
        };
        let bytes = r.encode();
        assert!(bytes.windows(4).any(|w| w == b"root"));
        assert!(bytes.windows(4).any(|w| w == b"test"));
        assert!(bytes
            .windows("mysql_native_password".len())
            .any(|w| w == b"mysql_native_password"));
    }
}

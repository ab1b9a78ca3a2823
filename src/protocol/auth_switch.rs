//! `auth_switch` and `more_data` packets exchanged during authentication.

use crate::error::Result;
use crate::io::Deserializer;

/// Header byte 0xFE in a handshake-phase response: the server asks the
/// client to switch to a different auth plugin and challenge.
#[derive(Debug, Clone)]
pub struct AuthSwitchRequest {
    pub plugin_name: String,
    pub plugin_data: Vec<u8>,
}

impl AuthSwitchRequest {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut d = Deserializer::new(buf);
        let header = d.u8()?;
        debug_assert_eq!(header, 0xFE);
        let plugin_name = d.str_null()?.to_owned();
        let plugin_data = d.bytes_eof()?.to_vec();
        Ok(AuthSwitchRequest {
            plugin_name,
            plugin_data,
        })
    }
}

/// Header byte 0x01: `caching_sha2_password`'s continuation data, or a
/// request for the server's RSA public key.
#[derive(Debug, Clone)]
pub struct MoreData {
    pub data: Vec<u8>,
}

impl MoreData {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut d = Deserializer::new(buf);
        let header = d.u8()?;
        debug_assert_eq!(header, 0x01);
        let data = d.bytes_eof()?.to_vec();
        Ok(MoreData { data })
    }
}

/// `caching_sha2_password` continuation status byte values.
pub mod caching_sha2 {
    pub const FAST_AUTH_SUCCESS: u8 = 0x03;
    pub const PERFORM_FULL_AUTH: u8 = 0x04;
    pub const REQUEST_PUBLIC_KEY: u8 = 0x02;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_auth_switch_request() {
        let mut s = crate::io::Serializer::new();
        s.u8(0xFE);
        s.str_null("caching_sha2_password");
        s.bytes(b"0123456789012345678901");
        let bytes = s.finish();
        let req = AuthSwitchRequest::decode(&bytes).unwrap();
        assert_eq!(req.plugin_name, "caching_sha2_password");
        assert_eq!(req.plugin_data.len(), 22);
    }

    #[test]
    fn decodes_more_data_perform_full_auth() {
        let bytes = [0x01, caching_sha2::PERFORM_FULL_AUTH];
        let md = MoreData::decode(&bytes).unwrap();
        assert_eq!(md.data, vec![caching_sha2::PERFORM_FULL_AUTH]);
    }
}

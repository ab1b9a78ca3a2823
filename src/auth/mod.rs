//! Authentication plugins: each computes a challenge-response from a
//! password, a server-supplied challenge, and whether the channel is secure.

mod caching_sha2_password;
mod mysql_native_password;

use crate::error::{Error, Result};

pub use caching_sha2_password::{full_auth_plaintext, full_auth_rsa_oaep};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPlugin {
    MySqlNativePassword,
    CachingSha2Password,
}

impl AuthPlugin {
    pub fn by_name(name: &str) -> Result<Self> {
        match name {
            "mysql_native_password" => Ok(AuthPlugin::MySqlNativePassword),
            "caching_sha2_password" => Ok(AuthPlugin::CachingSha2Password),
            other => Err(Error::UnknownAuthPlugin(other.to_owned())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AuthPlugin::MySqlNativePassword => "mysql_native_password",
            AuthPlugin::CachingSha2Password => "caching_sha2_password",
        }
    }

    /// The fast-track response computed over the handshake's 20-byte
    /// challenge. This is all `mysql_native_password` ever does; it is
    /// `caching_sha2_password`'s first attempt before a cache miss forces
    /// perform-full-auth.
    pub fn fast_track_response(self, password: &[u8], challenge: &[u8]) -> Result<Vec<u8>> {
        match self {
            AuthPlugin::MySqlNativePassword => mysql_native_password::scramble(password, challenge),
            AuthPlugin::CachingSha2Password => {
                caching_sha2_password::scramble_fast_track(password, challenge)
            }
        }
    }

    /// Whether this plugin defines a `more_data` continuation at all; a
    /// `more_data` packet for a plugin where this is false is a protocol
    /// violation.
    pub fn has_continuation(self) -> bool {
        matches!(self, AuthPlugin::CachingSha2Password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_plugin_name_is_rejected() {
        assert!(matches!(
            AuthPlugin::by_name("sha256_password"),
            Err(Error::UnknownAuthPlugin(_))
        ));
    }

    #[test]
    fn mysql_native_password_has_no_continuation() {
        assert!(!AuthPlugin::MySqlNativePassword.has_continuation());
        assert!(AuthPlugin::CachingSha2Password.has_continuation());
    }
}

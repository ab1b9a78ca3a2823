//! Client/server capability flags negotiated during the handshake.
//!
//! Bit positions from `original_source/include/messages.hpp`.

bitflags::bitflags! {
    pub struct Capabilities: u32 {
        const LONG_PASSWORD = 1;
        const FOUND_ROWS = 2;
        const LONG_FLAG = 4;
        const CONNECT_WITH_DB = 8;
        const NO_SCHEMA = 16;
        const COMPRESS = 32;
        const ODBC = 64;
        const LOCAL_FILES = 128;
        const IGNORE_SPACE = 256;
        const PROTOCOL_41 = 512;
        const INTERACTIVE = 1024;
        const SSL = 2048;
        const IGNORE_SIGPIPE = 4096;
        const TRANSACTIONS = 8192;
        const RESERVED = 16384;
        const SECURE_CONNECTION = 32768;
        const MULTI_STATEMENTS = 1 << 16;
        const MULTI_RESULTS = 1 << 17;
        const PS_MULTI_RESULTS = 1 << 18;
        const PLUGIN_AUTH = 1 << 19;
        const CONNECT_ATTRS = 1 << 20;
        const PLUGIN_AUTH_LENENC_CLIENT_DATA = 1 << 21;
        const CAN_HANDLE_EXPIRED_PASSWORDS = 1 << 22;
        const SESSION_TRACK = 1 << 23;
        const DEPRECATE_EOF = 1 << 24;
        const OPTIONAL_RESULTSET_METADATA = 1 << 25;
        const SSL_VERIFY_SERVER_CERT = 1 << 30;
        const REMEMBER_OPTIONS = 1 << 31;
    }
}

impl Capabilities {
    /// Required of the server regardless of what the caller asked for; the
    /// handshake algorithm fails if any of these is missing.
    pub const MANDATORY: Capabilities = Capabilities::from_bits_truncate(
        Capabilities::PROTOCOL_41.bits()
            | Capabilities::PLUGIN_AUTH.bits()
            | Capabilities::PLUGIN_AUTH_LENENC_CLIENT_DATA.bits()
            | Capabilities::DEPRECATE_EOF.bits()
            | Capabilities::SECURE_CONNECTION.bits(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mandatory_set_matches_spec() {
        assert!(Capabilities::MANDATORY.contains(Capabilities::PROTOCOL_41));
        assert!(Capabilities::MANDATORY.contains(Capabilities::PLUGIN_AUTH));
        assert!(Capabilities::MANDATORY.contains(Capabilities::PLUGIN_AUTH_LENENC_CLIENT_DATA));
        assert!(Capabilities::MANDATORY.contains(Capabilities::DEPRECATE_EOF));
        assert!(Capabilities::MANDATORY.contains(Capabilities::SECURE_CONNECTION));
        assert!(!Capabilities::MANDATORY.contains(Capabilities::SSL));
    }
}

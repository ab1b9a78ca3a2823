//! The handshake algorithm: server hello, optional TLS upgrade, login
//! request, and whatever authentication round-trips the negotiated plugin
//! requires.

use crate::algorithm::{
    classify_response, err_packet_to_error, finish_read, queue_continuation, PendingRead, Response,
};
use crate::auth::{self, AuthPlugin};
use crate::config::SslMode;
use crate::error::{Error, Result};
use crate::next_action::NextAction;
use crate::protocol::{AuthSwitchRequest, Capabilities, Handshake, HandshakeResponse, MoreData, SslRequest};
use crate::state::{ConnectionState, ConnectionStatus, DbFlavor};

/// What the caller wants to authenticate as and how.
#[derive(Debug, Clone)]
pub struct HandshakeParams {
    pub username: String,
    pub password: Vec<u8>,
    pub database: Option<String>,
    pub collation_id: u8,
    pub max_packet_size: u32,
    pub ssl_mode: SslMode,
    pub multi_statements: bool,
}

enum Step {
    AwaitHello(PendingRead),
    SendSslRequest {
        requested: Capabilities,
        queued: bool,
    },
    SendLoginRequest {
        requested: Capabilities,
        queued: bool,
    },
    AwaitLoginResponse {
        pending: PendingRead,
        plugin: AuthPlugin,
    },
    SendFullAuthPlaintext {
        queued: bool,
    },
    SendPublicKeyRequest {
        queued: bool,
    },
    AwaitPublicKey {
        pending: PendingRead,
    },
    SendRsaEncryptedPassword {
        challenge: Vec<u8>,
        queued: bool,
    },
    AwaitFinalResponse {
        pending: PendingRead,
    },
    Done,
}

/// Drives one connection through `Handshake` -> (TLS upgrade) ->
/// `HandshakeResponse41` -> auth-plugin negotiation -> `Ok`.
pub struct HandshakeAlgorithm {
    params: HandshakeParams,
    step: Step,
    challenge: Vec<u8>,
    auth_plugin_name: Option<String>,
    public_key_pem: Option<String>,
    auth_switch_done: bool,
}

impl HandshakeAlgorithm {
    pub fn new(params: HandshakeParams) -> Self {
        HandshakeAlgorithm {
            params,
            step: Step::AwaitHello(PendingRead::new(0, 0)),
            challenge: Vec::new(),
            auth_plugin_name: None,
            public_key_pem: None,
            auth_switch_done: false,
        }
    }

    fn requested_capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::MANDATORY;
        if self.params.database.is_some() {
            caps |= Capabilities::CONNECT_WITH_DB;
        }
        if self.params.multi_statements {
            caps |= Capabilities::MULTI_STATEMENTS | Capabilities::MULTI_RESULTS | Capabilities::PS_MULTI_RESULTS;
        }
        caps
    }

    fn send_login_request(&mut self, conn: &mut ConnectionState, requested: Capabilities, auth_response: &[u8], plugin_name: &str) {
        let response = HandshakeResponse {
            capabilities: requested,
            max_packet_size: self.params.max_packet_size,
            collation_id: self.params.collation_id,
            username: &self.params.username,
            auth_response,
            database: self.params.database.as_deref(),
            auth_plugin_name: plugin_name,
        };
        queue_continuation(conn, &response.encode());
    }

    pub fn resume(&mut self, conn: &mut ConnectionState, last_error: Option<Error>) -> Result<NextAction> {
        if let Some(err) = last_error {
            conn.status = ConnectionStatus::NotConnected;
            return Err(err);
        }

        loop {
            let step = std::mem::replace(&mut self.step, Step::Done);
            match step {
                Step::AwaitHello(mut pending) => match pending.poll(conn)? {
                    None => {
                        self.step = Step::AwaitHello(pending);
                        return Ok(NextAction::Read);
                    }
                    Some((bytes, cursor)) => {
                        let hello = Handshake::decode(&bytes)?;
                        finish_read(conn, &pending, cursor);

                        if !hello.capabilities.contains(Capabilities::MANDATORY) {
                            return Err(server_unsupported_err!(
                                "server does not support the mandatory capability set"
                            ));
                        }

                        conn.connection_id = hello.connection_id;
                        conn.db_flavor = DbFlavor::from_server_version(&hello.server_version);
                        conn.tls_supported = hello.capabilities.contains(Capabilities::SSL);

                        if self.params.ssl_mode == SslMode::Require && !conn.tls_supported {
                            return Err(Error::ServerDoesntSupportSsl);
                        }

                        self.challenge = hello.auth_plugin_data;
                        self.auth_plugin_name = hello.auth_plugin_name;
                        let want_ssl = self.params.ssl_mode != SslMode::Disable && conn.tls_supported;
                        let mut requested = self.requested_capabilities();
                        self.step = if want_ssl {
                            requested |= Capabilities::SSL;
                            Step::SendSslRequest { requested, queued: false }
                        } else {
                            Step::SendLoginRequest { requested, queued: false }
                        };
                    }
                },
                Step::SendSslRequest { requested, mut queued } => {
                    if !queued {
                        let req = SslRequest {
                            capabilities: requested,
                            max_packet_size: self.params.max_packet_size,
                            collation_id: self.params.collation_id,
                        };
                        queue_continuation(conn, &req.encode());
                        queued = true;
                    }
                    if let Some(action) = crate::algorithm::drive_write(conn) {
                        self.step = Step::SendSslRequest { requested, queued };
                        return Ok(action);
                    }
                    conn.tls_active = true;
                    self.step = Step::SendLoginRequest { requested, queued: false };
                    return Ok(NextAction::SslHandshake);
                }
                Step::SendLoginRequest { requested, mut queued } => {
                    if !queued {
                        let plugin_name = self
                            .auth_plugin_name
                            .clone()
                            .unwrap_or_else(|| "mysql_native_password".to_owned());
                        let plugin = AuthPlugin::by_name(&plugin_name)?;
                        let response = plugin.fast_track_response(&self.params.password, self.auth_challenge())?;
                        self.send_login_request(conn, requested, &response, &plugin_name);
                        queued = true;
                    }
                    if let Some(action) = crate::algorithm::drive_write(conn) {
                        self.step = Step::SendLoginRequest { requested, queued };
                        return Ok(action);
                    }
                    let plugin_name = self
                        .auth_plugin_name
                        .clone()
                        .unwrap_or_else(|| "mysql_native_password".to_owned());
                    let plugin = AuthPlugin::by_name(&plugin_name)?;
                    self.step = Step::AwaitLoginResponse {
                        pending: PendingRead::new(0, conn.sequence_number),
                        plugin,
                    };
                }
                Step::AwaitLoginResponse { mut pending, plugin } => match pending.poll(conn)? {
                    None => {
                        self.step = Step::AwaitLoginResponse { pending, plugin };
                        return Ok(NextAction::Read);
                    }
                    Some((bytes, cursor)) => {
                        finish_read(conn, &pending, cursor);
                        self.step = self.handle_login_response(conn, &bytes, plugin)?;
                    }
                },
                Step::SendFullAuthPlaintext { mut queued } => {
                    if !queued {
                        let payload = auth::full_auth_plaintext(&self.params.password);
                        queue_continuation(conn, &payload);
                        queued = true;
                    }
                    if let Some(action) = crate::algorithm::drive_write(conn) {
                        self.step = Step::SendFullAuthPlaintext { queued };
                        return Ok(action);
                    }
                    self.step = Step::AwaitFinalResponse {
                        pending: PendingRead::new(0, conn.sequence_number),
                    };
                }
                Step::SendPublicKeyRequest { mut queued } => {
                    if !queued {
                        queue_continuation(conn, &[crate::protocol::caching_sha2::REQUEST_PUBLIC_KEY]);
                        queued = true;
                    }
                    if let Some(action) = crate::algorithm::drive_write(conn) {
                        self.step = Step::SendPublicKeyRequest { queued };
                        return Ok(action);
                    }
                    self.step = Step::AwaitPublicKey {
                        pending: PendingRead::new(0, conn.sequence_number),
                    };
                }
                Step::AwaitPublicKey { mut pending } => match pending.poll(conn)? {
                    None => {
                        self.step = Step::AwaitPublicKey { pending };
                        return Ok(NextAction::Read);
                    }
                    Some((bytes, cursor)) => {
                        finish_read(conn, &pending, cursor);
                        let more = MoreData::decode(&bytes)?;
                        let pem = String::from_utf8(more.data)
                            .map_err(|e| Error::ProtocolValueError(e.to_string()))?;
                        self.public_key_pem = Some(pem);
                        self.step = Step::SendRsaEncryptedPassword {
                            challenge: self.challenge.clone(),
                            queued: false,
                        };
                    }
                },
                Step::SendRsaEncryptedPassword { challenge, mut queued } => {
                    if !queued {
                        let pem = self
                            .public_key_pem
                            .as_deref()
                            .expect("public key requested before being sent");
                        let encrypted = auth::full_auth_rsa_oaep(&self.params.password, &challenge, pem)?;
                        queue_continuation(conn, &encrypted);
                        queued = true;
                    }
                    if let Some(action) = crate::algorithm::drive_write(conn) {
                        self.step = Step::SendRsaEncryptedPassword { challenge, queued };
                        return Ok(action);
                    }
                    self.step = Step::AwaitFinalResponse {
                        pending: PendingRead::new(0, conn.sequence_number),
                    };
                }
                Step::AwaitFinalResponse { mut pending } => match pending.poll(conn)? {
                    None => {
                        self.step = Step::AwaitFinalResponse { pending };
                        return Ok(NextAction::Read);
                    }
                    Some((bytes, cursor)) => {
                        finish_read(conn, &pending, cursor);
                        match classify_response(&bytes)? {
                            Response::Ok(ok) => {
                                conn.apply_ok_status(ok.status);
                                conn.status = ConnectionStatus::Ready;
                                self.step = Step::Done;
                                return Ok(NextAction::None);
                            }
                            Response::Err(err) => {
                                return Err(err_packet_to_error(err, conn.db_flavor));
                            }
                            Response::Other(bytes) => {
                                return Err(Error::BadHandshakePacketType(format!(
                                    "unexpected byte 0x{:02x} while awaiting final auth response",
                                    bytes[0]
                                )));
                            }
                        }
                    }
                },
                Step::Done => {
                    self.step = Step::Done;
                    return Ok(NextAction::None);
                }
            }
        }
    }

    fn auth_challenge(&self) -> &[u8] {
        &self.challenge[..self.challenge.len().min(20)]
    }

    fn handle_login_response(&mut self, conn: &mut ConnectionState, bytes: &[u8], plugin: AuthPlugin) -> Result<Step> {
        if bytes.first() == Some(&0xFE) && bytes.len() > 1 {
            if self.auth_switch_done {
                return Err(Error::BadHandshakePacketType(
                    "received a second auth_switch_request in one handshake".to_owned(),
                ));
            }
            self.auth_switch_done = true;
            let switch = AuthSwitchRequest::decode(bytes)?;
            let new_plugin = AuthPlugin::by_name(&switch.plugin_name)?;
            self.challenge = switch.plugin_data;
            let response = new_plugin.fast_track_response(&self.params.password, self.auth_challenge())?;
            queue_continuation(conn, &response);
            return Ok(Step::AwaitLoginResponse {
                pending: PendingRead::new(0, conn.sequence_number),
                plugin: new_plugin,
            });
        }

        match classify_response(bytes)? {
            Response::Ok(ok) => {
                conn.apply_ok_status(ok.status);
                conn.status = ConnectionStatus::Ready;
                Ok(Step::Done)
            }
            Response::Err(err) => Err(err_packet_to_error(err, conn.db_flavor)),
            Response::Other(bytes) if bytes.first() == Some(&0x01) => {
                if !plugin.has_continuation() {
                    return Err(Error::BadHandshakePacketType(
                        "received more_data for a plugin with no continuation".to_owned(),
                    ));
                }
                let more = MoreData::decode(&bytes)?;
                match more.data.first() {
                    Some(&crate::protocol::caching_sha2::FAST_AUTH_SUCCESS) => Ok(Step::AwaitFinalResponse {
                        pending: PendingRead::new(0, conn.sequence_number),
                    }),
                    Some(&crate::protocol::caching_sha2::PERFORM_FULL_AUTH) => {
                        if conn.tls_active {
                            Ok(Step::SendFullAuthPlaintext { queued: false })
                        } else {
                            Ok(Step::SendPublicKeyRequest { queued: false })
                        }
                    }
                    other => Err(Error::BadHandshakePacketType(format!(
                        "unexpected caching_sha2_password continuation byte {other:?}"
                    ))),
                }
            }
            Response::Other(bytes) => Err(Error::BadHandshakePacketType(format!(
                "unexpected byte 0x{:02x} during login",
                bytes[0]
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::test_support::{drain_write, feed, framed, ok_payload};
    use crate::io::Serializer;
    use crate::state::ConnectionState;

    fn params(ssl_mode: SslMode) -> HandshakeParams {
        HandshakeParams {
            username: "root".to_owned(),
            password: b"secret".to_vec(),
            database: None,
            collation_id: 45,
            max_packet_size: 1 << 24,
            ssl_mode,
            multi_statements: false,
        }
    }

    fn hello_payload(capabilities: Capabilities, plugin_name: &str, challenge: &[u8; 20]) -> Vec<u8> {
        let mut s = Serializer::new();
        s.u8(10);
        s.str_null("8.0.0-test");
        s.u32(42);
        s.bytes(&challenge[..8]);
        s.u8(0);
        s.u16((capabilities.bits() & 0xFFFF) as u16);
        s.u8(45);
        s.u16(0x0002);
        s.u16(((capabilities.bits() >> 16) & 0xFFFF) as u16);
        s.u8(21);
        s.zeros(10);
        s.bytes(&challenge[8..]);
        s.u8(0);
        s.str_null(plugin_name);
        s.finish()
    }

    fn run_to_ready(conn: &mut ConnectionState, alg: &mut HandshakeAlgorithm, mut responses: Vec<Vec<u8>>) {
        responses.reverse();
        loop {
            match alg.resume(conn, None).unwrap() {
                NextAction::Write => drain_write(conn),
                NextAction::SslHandshake => {}
                NextAction::Read => {
                    let payload = responses.pop().expect("no more fixture messages");
                    feed(conn, &framed(&payload, conn.sequence_number));
                }
                NextAction::None => break,
                other => panic!("unexpected action {other:?}"),
            }
        }
    }

    #[test]
    fn mysql_native_password_fast_track() {
        let mut conn = ConnectionState::new(4096, 1024 * 1024);
        let mut alg = HandshakeAlgorithm::new(params(SslMode::Disable));

        let hello = hello_payload(Capabilities::MANDATORY, "mysql_native_password", &[7u8; 20]);
        run_to_ready(&mut conn, &mut alg, vec![hello, ok_payload(2)]);

        assert_eq!(conn.status, ConnectionStatus::Ready);
        assert_eq!(conn.connection_id, 42);
    }

    #[test]
    fn caching_sha2_password_fast_auth_success() {
        let mut conn = ConnectionState::new(4096, 1024 * 1024);
        let mut alg = HandshakeAlgorithm::new(params(SslMode::Disable));

        let hello = hello_payload(Capabilities::MANDATORY, "caching_sha2_password", &[9u8; 20]);
        let fast_auth_success = vec![0x01, crate::protocol::caching_sha2::FAST_AUTH_SUCCESS];
        run_to_ready(&mut conn, &mut alg, vec![hello, fast_auth_success, ok_payload(2)]);

        assert_eq!(conn.status, ConnectionStatus::Ready);
    }

    #[test]
    fn auth_switch_request_reauthenticates_with_new_plugin() {
        let mut conn = ConnectionState::new(4096, 1024 * 1024);
        let mut alg = HandshakeAlgorithm::new(params(SslMode::Disable));

        let hello = hello_payload(Capabilities::MANDATORY, "mysql_native_password", &[1u8; 20]);

        let mut s = Serializer::new();
        s.u8(0xFE);
        s.str_null("caching_sha2_password");
        s.bytes(&[2u8; 20]);
        let switch = s.finish();

        let fast_auth_success = vec![0x01, crate::protocol::caching_sha2::FAST_AUTH_SUCCESS];
        run_to_ready(&mut conn, &mut alg, vec![hello, switch, fast_auth_success, ok_payload(2)]);

        assert_eq!(conn.status, ConnectionStatus::Ready);
    }

    #[test]
    fn a_second_auth_switch_request_is_rejected() {
        let mut conn = ConnectionState::new(4096, 1024 * 1024);
        let mut alg = HandshakeAlgorithm::new(params(SslMode::Disable));

        let hello = hello_payload(Capabilities::MANDATORY, "mysql_native_password", &[1u8; 20]);

        let mut first = Serializer::new();
        first.u8(0xFE);
        first.str_null("caching_sha2_password");
        first.bytes(&[2u8; 20]);
        let first_switch = first.finish();

        let mut second = Serializer::new();
        second.u8(0xFE);
        second.str_null("mysql_native_password");
        second.bytes(&[3u8; 20]);
        let second_switch = second.finish();

        let mut responses = vec![hello, first_switch, second_switch];
        responses.reverse();

        let err = loop {
            match alg.resume(&mut conn, None) {
                Ok(NextAction::Write) => drain_write(&mut conn),
                Ok(NextAction::Read) => {
                    let payload = responses.pop().expect("no more fixture messages");
                    let seqnum = conn.sequence_number;
                    feed(&mut conn, &framed(&payload, seqnum));
                }
                Ok(other) => panic!("unexpected action {other:?}"),
                Err(err) => break err,
            }
        };

        assert!(matches!(err, Error::BadHandshakePacketType(_)));
    }

    #[test]
    fn caching_sha2_full_auth_over_tls_sends_plaintext_password() {
        let mut conn = ConnectionState::new(4096, 1024 * 1024);
        let mut alg = HandshakeAlgorithm::new(params(SslMode::Require));

        let hello = hello_payload(
            Capabilities::MANDATORY | Capabilities::SSL,
            "caching_sha2_password",
            &[3u8; 20],
        );
        let perform_full_auth = vec![0x01, crate::protocol::caching_sha2::PERFORM_FULL_AUTH];
        run_to_ready(&mut conn, &mut alg, vec![hello, perform_full_auth, ok_payload(2)]);

        assert!(conn.tls_active);
        assert_eq!(conn.status, ConnectionStatus::Ready);
    }
}

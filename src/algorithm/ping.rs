//! `ping`: `COM_PING`, a liveness round-trip that always replies OK.

use crate::algorithm::{classify_response, err_packet_to_error, ok_summary, Response, SimpleCommand, SimpleCommandProgress};
use crate::error::{Error, Result};
use crate::next_action::NextAction;
use crate::state::{ConnectionState, ConnectionStatus, OkSummary};

pub struct PingAlgorithm {
    inner: SimpleCommand,
    result: Option<OkSummary>,
}

impl PingAlgorithm {
    pub fn new(conn: &mut ConnectionState) -> Result<Self> {
        conn.require_ready()?;
        conn.status = ConnectionStatus::PingInProgress;
        let inner = SimpleCommand::start(conn, &crate::protocol::encode::ping());
        Ok(PingAlgorithm { inner, result: None })
    }

    pub fn into_result(self) -> OkSummary {
        self.result.expect("resume() reached None before an OK packet arrived")
    }

    pub fn resume(&mut self, conn: &mut ConnectionState, last_error: Option<Error>) -> Result<NextAction> {
        if let Some(err) = last_error {
            conn.status = ConnectionStatus::NotConnected;
            return Err(err);
        }
        match self.inner.resume(conn)? {
            SimpleCommandProgress::Action(action) => Ok(action),
            SimpleCommandProgress::Response(bytes) => match classify_response(&bytes)? {
                Response::Ok(ok) => {
                    conn.apply_ok_status(ok.status);
                    conn.status = ConnectionStatus::Ready;
                    self.result = Some(ok_summary(&ok));
                    Ok(NextAction::None)
                }
                Response::Err(err) => {
                    conn.status = ConnectionStatus::Ready;
                    Err(err_packet_to_error(err, conn.db_flavor))
                }
                Response::Other(bytes) => Err(Error::ProtocolValueError(format!(
                    "unexpected byte 0x{:02x} in response to COM_PING",
                    bytes[0]
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::test_support::{drain_write, feed, framed, ok_payload, ready_conn};
    use crate::next_action::NextAction;

    #[test]
    fn ping_round_trip_returns_to_ready() {
        let mut conn = ready_conn();
        let mut alg = PingAlgorithm::new(&mut conn).unwrap();
        assert_eq!(conn.status, ConnectionStatus::PingInProgress);

        loop {
            match alg.resume(&mut conn, None).unwrap() {
                NextAction::Write => drain_write(&mut conn),
                NextAction::Read => feed(&mut conn, &framed(&ok_payload(2), 1)),
                NextAction::None => break,
                other => panic!("unexpected action {other:?}"),
            }
        }

        assert_eq!(conn.status, ConnectionStatus::Ready);
        assert_eq!(alg.into_result().status_flags, 2);
    }
}

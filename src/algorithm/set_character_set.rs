//! `set_character_set`: issues `SET NAMES <charset>` and records the
//! accepted charset on success.

use crate::algorithm::{classify_response, err_packet_to_error, ok_summary, Response, SimpleCommand, SimpleCommandProgress};
use crate::error::{Error, Result};
use crate::next_action::NextAction;
use crate::state::{Charset, ConnectionState, ConnectionStatus, OkSummary};

pub struct SetCharacterSetAlgorithm {
    inner: SimpleCommand,
    charset_name: String,
    result: Option<OkSummary>,
}

impl SetCharacterSetAlgorithm {
    pub fn new(conn: &mut ConnectionState, charset_name: &str) -> Result<Self> {
        conn.require_ready()?;
        conn.status = ConnectionStatus::EngagedInMultiFunction;
        let sql = format!("SET NAMES '{}'", charset_name.replace('\'', "''"));
        let inner = SimpleCommand::start(conn, &crate::protocol::encode::query(&sql));
        Ok(SetCharacterSetAlgorithm {
            inner,
            charset_name: charset_name.to_owned(),
            result: None,
        })
    }

    pub fn into_result(self) -> OkSummary {
        self.result.expect("resume() reached None before an OK packet arrived")
    }

    pub fn resume(&mut self, conn: &mut ConnectionState, last_error: Option<Error>) -> Result<NextAction> {
        if let Some(err) = last_error {
            conn.status = ConnectionStatus::Ready;
            return Err(err);
        }
        match self.inner.resume(conn)? {
            SimpleCommandProgress::Action(action) => Ok(action),
            SimpleCommandProgress::Response(bytes) => match classify_response(&bytes)? {
                Response::Ok(ok) => {
                    conn.apply_ok_status(ok.status);
                    conn.current_charset = Some(Charset::new(0, self.charset_name.clone()));
                    conn.status = ConnectionStatus::Ready;
                    self.result = Some(ok_summary(&ok));
                    Ok(NextAction::None)
                }
                Response::Err(err) => {
                    conn.status = ConnectionStatus::Ready;
                    Err(err_packet_to_error(err, conn.db_flavor))
                }
                Response::Other(bytes) => Err(Error::ProtocolValueError(format!(
                    "unexpected byte 0x{:02x} in response to SET NAMES",
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
    fn records_charset_on_success() {
        let mut conn = ready_conn();
        let mut alg = SetCharacterSetAlgorithm::new(&mut conn, "utf8mb4").unwrap();

        loop {
            match alg.resume(&mut conn, None).unwrap() {
                NextAction::Write => drain_write(&mut conn),
                NextAction::Read => feed(&mut conn, &framed(&ok_payload(2), 1)),
                NextAction::None => break,
                other => panic!("unexpected action {other:?}"),
            }
        }

        assert_eq!(conn.status, ConnectionStatus::Ready);
        assert_eq!(conn.current_charset.as_ref().unwrap().name, "utf8mb4");
    }
}

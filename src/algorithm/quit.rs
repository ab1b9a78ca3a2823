//! `quit`: `COM_QUIT`, tells the server the client is disconnecting. No
//! response is expected; once the bytes are flushed the transport should be
//! closed.

use crate::algorithm::begin_command;
use crate::error::{Error, Result};
use crate::next_action::NextAction;
use crate::state::{ConnectionState, ConnectionStatus};

pub struct QuitAlgorithm {
    done: bool,
}

impl QuitAlgorithm {
    pub fn new(conn: &mut ConnectionState) -> Result<Self> {
        conn.require_ready()?;
        begin_command(conn, &crate::protocol::encode::quit());
        Ok(QuitAlgorithm { done: false })
    }

    pub fn resume(&mut self, conn: &mut ConnectionState, last_error: Option<Error>) -> Result<NextAction> {
        if let Some(err) = last_error {
            conn.status = ConnectionStatus::Terminated;
            return Err(err);
        }
        if self.done {
            return Ok(NextAction::None);
        }
        if let Some(action) = crate::algorithm::drive_write(conn) {
            return Ok(action);
        }
        self.done = true;
        conn.status = ConnectionStatus::Terminated;
        Ok(NextAction::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::test_support::{drain_write, ready_conn};

    #[test]
    fn quit_never_waits_for_a_response() {
        let mut conn = ready_conn();
        let mut alg = QuitAlgorithm::new(&mut conn).unwrap();
        match alg.resume(&mut conn, None).unwrap() {
            NextAction::Write => drain_write(&mut conn),
            other => panic!("unexpected action {other:?}"),
        }
        assert_eq!(alg.resume(&mut conn, None).unwrap(), NextAction::None);
        assert_eq!(conn.status, ConnectionStatus::Terminated);
    }
}

//! `close_statement`: `COM_STMT_CLOSE`. The server never replies.

use crate::algorithm::begin_command;
use crate::error::Result;
use crate::next_action::NextAction;
use crate::state::ConnectionState;

pub struct CloseStatementAlgorithm {
    done: bool,
}

impl CloseStatementAlgorithm {
    pub fn new(conn: &mut ConnectionState, statement_id: u32) -> Result<Self> {
        conn.require_ready()?;
        begin_command(conn, &crate::protocol::encode::stmt_close(statement_id));
        Ok(CloseStatementAlgorithm { done: false })
    }

    pub fn resume(&mut self, conn: &mut ConnectionState, last_error: Option<crate::error::Error>) -> Result<NextAction> {
        if let Some(err) = last_error {
            return Err(err);
        }
        if self.done {
            return Ok(NextAction::None);
        }
        if let Some(action) = crate::algorithm::drive_write(conn) {
            return Ok(action);
        }
        self.done = true;
        Ok(NextAction::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::test_support::{drain_write, ready_conn};

    #[test]
    fn close_statement_never_waits_for_a_response() {
        let mut conn = ready_conn();
        let mut alg = CloseStatementAlgorithm::new(&mut conn, 7).unwrap();
        match alg.resume(&mut conn, None).unwrap() {
            NextAction::Write => drain_write(&mut conn),
            other => panic!("unexpected action {other:?}"),
        }
        assert_eq!(alg.resume(&mut conn, None).unwrap(), NextAction::None);
    }
}

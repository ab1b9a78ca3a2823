//! `prepare_statement`: `COM_STMT_PREPARE` plus its param/result column
//! definitions.

use crate::algorithm::{begin_command, err_packet_to_error, finish_read, PendingRead};
use crate::error::{Error, Result};
use crate::next_action::NextAction;
use crate::protocol::{ColumnDefinition, StmtPrepareOk};
use crate::state::{ConnectionState, ConnectionStatus};

/// A successfully prepared statement: its id plus the parameter and result
/// column definitions the server described.
#[derive(Debug, Clone)]
pub struct PreparedStatement {
    pub statement_id: u32,
    pub params: Vec<ColumnDefinition>,
    pub columns: Vec<ColumnDefinition>,
}

enum Step {
    Write,
    AwaitHead(PendingRead),
    AwaitParam { pending: PendingRead, remaining: u16 },
    AwaitColumn { pending: PendingRead, remaining: u16 },
    Done,
}

pub struct PrepareStatementAlgorithm {
    step: Step,
    head: Option<StmtPrepareOk>,
    params: Vec<ColumnDefinition>,
    columns: Vec<ColumnDefinition>,
}

impl PrepareStatementAlgorithm {
    pub fn new(conn: &mut ConnectionState, sql: &str) -> Result<Self> {
        conn.require_ready()?;
        begin_command(conn, &crate::protocol::encode::stmt_prepare(sql));
        conn.status = ConnectionStatus::EngagedInMultiFunction;
        Ok(PrepareStatementAlgorithm {
            step: Step::Write,
            head: None,
            params: Vec::new(),
            columns: Vec::new(),
        })
    }

    pub fn into_statement(self) -> PreparedStatement {
        let head = self.head.expect("resume() reached None before a head packet arrived");
        PreparedStatement {
            statement_id: head.statement_id,
            params: self.params,
            columns: self.columns,
        }
    }

    pub fn resume(&mut self, conn: &mut ConnectionState, last_error: Option<Error>) -> Result<NextAction> {
        if let Some(err) = last_error {
            conn.status = ConnectionStatus::Ready;
            return Err(err);
        }

        loop {
            let step = std::mem::replace(&mut self.step, Step::Done);
            match step {
                Step::Write => {
                    if let Some(action) = crate::algorithm::drive_write(conn) {
                        self.step = Step::Write;
                        return Ok(action);
                    }
                    self.step = Step::AwaitHead(PendingRead::new(0, conn.sequence_number));
                }
                Step::AwaitHead(mut pending) => match pending.poll(conn)? {
                    None => {
                        self.step = Step::AwaitHead(pending);
                        return Ok(NextAction::Read);
                    }
                    Some((bytes, cursor)) => {
                        finish_read(conn, &pending, cursor);
                        // The STMT_PREPARE_OK header also starts with 0x00, so it
                        // can't be routed through `classify_response` like a plain
                        // command response without being mistaken for a generic OK
                        // packet; only an ERR byte means anything else here.
                        if bytes.first() == Some(&0xFF) {
                            let err = crate::protocol::ErrPacket::decode(&bytes, true)?;
                            conn.status = ConnectionStatus::Ready;
                            return Err(err_packet_to_error(err, conn.db_flavor));
                        }
                        let ok = StmtPrepareOk::decode(&bytes)?;
                        self.head = Some(ok);
                        self.step = if ok.num_params > 0 {
                            Step::AwaitParam {
                                pending: PendingRead::new(0, conn.sequence_number),
                                remaining: ok.num_params,
                            }
                        } else if ok.num_columns > 0 {
                            Step::AwaitColumn {
                                pending: PendingRead::new(0, conn.sequence_number),
                                remaining: ok.num_columns,
                            }
                        } else {
                            conn.status = ConnectionStatus::Ready;
                            Step::Done
                        };
                        if matches!(self.step, Step::Done) {
                            return Ok(NextAction::None);
                        }
                    }
                },
                Step::AwaitParam { mut pending, remaining } => match pending.poll(conn)? {
                    None => {
                        self.step = Step::AwaitParam { pending, remaining };
                        return Ok(NextAction::Read);
                    }
                    Some((bytes, cursor)) => {
                        finish_read(conn, &pending, cursor);
                        self.params.push(ColumnDefinition::decode(&bytes)?);
                        let head = self.head.as_ref().expect("head packet already decoded");
                        self.step = if remaining > 1 {
                            Step::AwaitParam {
                                pending: PendingRead::new(0, conn.sequence_number),
                                remaining: remaining - 1,
                            }
                        } else if head.num_columns > 0 {
                            Step::AwaitColumn {
                                pending: PendingRead::new(0, conn.sequence_number),
                                remaining: head.num_columns,
                            }
                        } else {
                            conn.status = ConnectionStatus::Ready;
                            Step::Done
                        };
                        if matches!(self.step, Step::Done) {
                            return Ok(NextAction::None);
                        }
                    }
                },
                Step::AwaitColumn { mut pending, remaining } => match pending.poll(conn)? {
                    None => {
                        self.step = Step::AwaitColumn { pending, remaining };
                        return Ok(NextAction::Read);
                    }
                    Some((bytes, cursor)) => {
                        finish_read(conn, &pending, cursor);
                        self.columns.push(ColumnDefinition::decode(&bytes)?);
                        if remaining > 1 {
                            self.step = Step::AwaitColumn {
                                pending: PendingRead::new(0, conn.sequence_number),
                                remaining: remaining - 1,
                            };
                        } else {
                            conn.status = ConnectionStatus::Ready;
                            self.step = Step::Done;
                            return Ok(NextAction::None);
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::test_support::{drain_write, feed, framed, ready_conn};
    use crate::io::Serializer;
    use crate::protocol::FieldType;

    fn column_def_payload(name: &str, ty: FieldType) -> Vec<u8> {
        let mut s = Serializer::new();
        s.str_lenenc("def");
        s.str_lenenc("");
        s.str_lenenc("");
        s.str_lenenc("");
        s.str_lenenc(name);
        s.str_lenenc("");
        s.int_lenenc(0x0c);
        s.u16(63);
        s.u32(1);
        s.u8(ty.0);
        s.u16(0);
        s.u8(0);
        s.bytes(&[0, 0]);
        s.finish()
    }

    fn stmt_prepare_ok_payload(statement_id: u32, num_columns: u16, num_params: u16) -> Vec<u8> {
        let mut s = Serializer::new();
        s.u8(0x00);
        s.u32(statement_id);
        s.u16(num_columns);
        s.u16(num_params);
        s.u8(0x00);
        s.u16(0);
        s.finish()
    }

    #[test]
    fn prepare_with_one_param_and_one_column() {
        let mut conn = ready_conn();
        let mut alg = PrepareStatementAlgorithm::new(&mut conn, "SELECT * FROM t WHERE id = ?").unwrap();
        assert_eq!(conn.status, ConnectionStatus::EngagedInMultiFunction);

        let mut seqnum = 1u8;
        let mut to_send: Vec<Vec<u8>> = vec![
            stmt_prepare_ok_payload(7, 1, 1),
            column_def_payload("id", FieldType::LONG),
            column_def_payload("id", FieldType::LONG),
        ];
        to_send.reverse();

        loop {
            match alg.resume(&mut conn, None).unwrap() {
                NextAction::Write => drain_write(&mut conn),
                NextAction::Read => {
                    let payload = to_send.pop().expect("no more fixture messages");
                    feed(&mut conn, &framed(&payload, seqnum));
                    seqnum = seqnum.wrapping_add(1);
                }
                NextAction::None => break,
                other => panic!("unexpected action {other:?}"),
            }
        }

        assert_eq!(conn.status, ConnectionStatus::Ready);
        let stmt = alg.into_statement();
        assert_eq!(stmt.statement_id, 7);
        assert_eq!(stmt.params.len(), 1);
        assert_eq!(stmt.columns.len(), 1);
        assert_eq!(stmt.columns[0].name, "id");
    }

    #[test]
    fn prepare_with_no_params_or_columns() {
        let mut conn = ready_conn();
        let mut alg = PrepareStatementAlgorithm::new(&mut conn, "DO 1").unwrap();

        loop {
            match alg.resume(&mut conn, None).unwrap() {
                NextAction::Write => drain_write(&mut conn),
                NextAction::Read => feed(&mut conn, &framed(&stmt_prepare_ok_payload(3, 0, 0), 1)),
                NextAction::None => break,
                other => panic!("unexpected action {other:?}"),
            }
        }

        assert_eq!(conn.status, ConnectionStatus::Ready);
        let stmt = alg.into_statement();
        assert_eq!(stmt.statement_id, 3);
        assert!(stmt.params.is_empty());
        assert!(stmt.columns.is_empty());
    }
}

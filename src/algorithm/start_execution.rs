//! `start_execution` / `read_some_rows`: the streaming multi-function
//! triad. Unlike [`crate::algorithm::ExecuteAlgorithm`], which buffers every
//! row itself, this lets the caller pull rows in caller-sized batches,
//! keeping the connection in [`ConnectionStatus::EngagedInMultiFunction`]
//! across many separate top-level calls until the last resultset's rows are
//! drained.

use crate::algorithm::{
    begin_command, classify_response, classify_row_response, drive_write, err_packet_to_error, finish_read, ok_summary,
    PendingRead, Response,
};
use crate::error::{Error, Result};
use crate::io::Deserializer;
use crate::next_action::NextAction;
use crate::processor::{ExecutionProcessor, StreamingProcessor};
use crate::protocol::{ColumnDefinition, FieldType, Row};
use crate::state::{ConnectionState, ConnectionStatus, OkSummary, RowEncoding};

/// What reading a resultset's head (and, if present, its column metadata)
/// turned up.
pub enum HeadOutcome {
    /// The command carried no resultset; `ok` is its final status.
    Done(OkSummary),
    /// A resultset follows; its rows are read in batches via
    /// [`ReadSomeRowsAlgorithm`].
    Resultset {
        metadata: Vec<ColumnDefinition>,
        column_types: Vec<FieldType>,
    },
}

enum HeadStep {
    AwaitHead(PendingRead),
    AwaitMeta {
        pending: PendingRead,
        remaining: usize,
        metadata: Vec<ColumnDefinition>,
        column_types: Vec<FieldType>,
    },
    Done,
}

/// Reads one resultset's head and column metadata, without issuing a new
/// command — used both right after [`StartExecutionAlgorithm`]'s write and
/// again whenever a prior resultset's rows ended with
/// `SERVER_MORE_RESULTS_EXISTS` set.
pub struct ReadResultsetHeadAlgorithm {
    step: HeadStep,
    outcome: Option<HeadOutcome>,
}

impl ReadResultsetHeadAlgorithm {
    pub fn new(conn: &ConnectionState) -> Self {
        ReadResultsetHeadAlgorithm {
            step: HeadStep::AwaitHead(PendingRead::new(0, conn.sequence_number)),
            outcome: None,
        }
    }

    pub fn into_outcome(self) -> HeadOutcome {
        self.outcome.expect("resume() reached None before an outcome was recorded")
    }

    pub fn resume(&mut self, conn: &mut ConnectionState, last_error: Option<Error>) -> Result<NextAction> {
        if let Some(err) = last_error {
            conn.status = ConnectionStatus::Ready;
            return Err(err);
        }

        loop {
            let step = std::mem::replace(&mut self.step, HeadStep::Done);
            match step {
                HeadStep::AwaitHead(mut pending) => match pending.poll(conn)? {
                    None => {
                        self.step = HeadStep::AwaitHead(pending);
                        return Ok(NextAction::Read);
                    }
                    Some((bytes, cursor)) => {
                        finish_read(conn, &pending, cursor);
                        match classify_response(&bytes)? {
                            Response::Ok(ok) => {
                                if !crate::state::ExecutionState::more_results_exist(ok.status) {
                                    conn.apply_ok_status(ok.status);
                                    conn.status = ConnectionStatus::Ready;
                                }
                                self.outcome = Some(HeadOutcome::Done(ok_summary(&ok)));
                                return Ok(NextAction::None);
                            }
                            Response::Err(err) => {
                                conn.status = ConnectionStatus::Ready;
                                return Err(err_packet_to_error(err, conn.db_flavor));
                            }
                            Response::Other(bytes) => {
                                let mut d = Deserializer::new(&bytes);
                                let num_columns = d
                                    .int_lenenc()?
                                    .ok_or_else(|| Error::ProtocolValueError("missing column count".to_owned()))?
                                    as usize;
                                if num_columns == 0 {
                                    return Err(Error::ProtocolValueError(
                                        "resultset head reported zero columns".to_owned(),
                                    ));
                                }
                                self.step = HeadStep::AwaitMeta {
                                    pending: PendingRead::new(0, conn.sequence_number),
                                    remaining: num_columns,
                                    metadata: Vec::with_capacity(num_columns),
                                    column_types: Vec::with_capacity(num_columns),
                                };
                            }
                        }
                    }
                },
                HeadStep::AwaitMeta { mut pending, remaining, mut metadata, mut column_types } => {
                    match pending.poll(conn)? {
                        None => {
                            self.step = HeadStep::AwaitMeta { pending, remaining, metadata, column_types };
                            return Ok(NextAction::Read);
                        }
                        Some((bytes, cursor)) => {
                            finish_read(conn, &pending, cursor);
                            let def = ColumnDefinition::decode(&bytes)?;
                            column_types.push(def.r#type);
                            metadata.push(def);
                            if remaining == 1 {
                                self.outcome = Some(HeadOutcome::Resultset { metadata, column_types });
                                return Ok(NextAction::None);
                            }
                            self.step = HeadStep::AwaitMeta {
                                pending: PendingRead::new(0, conn.sequence_number),
                                remaining: remaining - 1,
                                metadata,
                                column_types,
                            };
                        }
                    }
                }
                HeadStep::Done => {
                    self.step = HeadStep::Done;
                    return Ok(NextAction::None);
                }
            }
        }
    }
}

enum StartStep {
    Write,
    Head(ReadResultsetHeadAlgorithm),
    Done,
}

/// Issues a command and reads only as far as its first resultset's head and
/// column metadata (or its final OK, if it carries no resultset); row
/// reading is left to [`ReadSomeRowsAlgorithm`].
pub struct StartExecutionAlgorithm {
    step: StartStep,
    outcome: Option<HeadOutcome>,
}

impl StartExecutionAlgorithm {
    pub fn new(conn: &mut ConnectionState, payload: &[u8]) -> Result<Self> {
        conn.require_ready()?;
        begin_command(conn, payload);
        conn.status = ConnectionStatus::EngagedInMultiFunction;
        Ok(StartExecutionAlgorithm { step: StartStep::Write, outcome: None })
    }

    pub fn into_outcome(self) -> HeadOutcome {
        self.outcome.expect("resume() reached None before an outcome was recorded")
    }

    pub fn resume(&mut self, conn: &mut ConnectionState, last_error: Option<Error>) -> Result<NextAction> {
        loop {
            let step = std::mem::replace(&mut self.step, StartStep::Done);
            match step {
                StartStep::Write => {
                    if let Some(err) = last_error {
                        conn.status = ConnectionStatus::Ready;
                        return Err(err);
                    }
                    if let Some(action) = drive_write(conn) {
                        self.step = StartStep::Write;
                        return Ok(action);
                    }
                    self.step = StartStep::Head(ReadResultsetHeadAlgorithm::new(conn));
                }
                StartStep::Head(mut inner) => {
                    let action = inner.resume(conn, last_error)?;
                    if action.is_terminal() {
                        self.outcome = Some(inner.into_outcome());
                        return Ok(NextAction::None);
                    }
                    self.step = StartStep::Head(inner);
                    return Ok(action);
                }
                StartStep::Done => {
                    self.step = StartStep::Done;
                    return Ok(NextAction::None);
                }
            }
        }
    }
}

/// What a batch of row reading turned up.
pub enum RowsReadOutcome {
    /// `max_rows` rows landed in the caller's buffer; more rows of this
    /// resultset remain unread.
    BatchFull,
    /// This resultset's rows are exhausted. If `more_resultsets` is set, the
    /// caller should drive a fresh [`ReadResultsetHeadAlgorithm`] next;
    /// otherwise the command is finished and the connection is `Ready`.
    ResultsetComplete { ok: OkSummary, more_resultsets: bool },
}

enum RowsStep {
    AwaitRow(PendingRead),
    Done,
}

/// Reads up to `max_rows` rows of an already-headed resultset into a
/// caller-supplied buffer, stopping early at a row-sequence boundary.
pub struct ReadSomeRowsAlgorithm<'a> {
    encoding: RowEncoding,
    column_types: Vec<FieldType>,
    max_rows: usize,
    rows_read: usize,
    processor: StreamingProcessor<'a>,
    step: RowsStep,
    outcome: Option<RowsReadOutcome>,
}

impl<'a> ReadSomeRowsAlgorithm<'a> {
    pub fn new(
        conn: &ConnectionState,
        column_types: Vec<FieldType>,
        encoding: RowEncoding,
        max_rows: usize,
        out: &'a mut Vec<Row>,
    ) -> Self {
        let mut processor = StreamingProcessor::new(out);
        processor
            .on_row_batch_start()
            .expect("StreamingProcessor::on_row_batch_start is infallible");
        ReadSomeRowsAlgorithm {
            encoding,
            column_types,
            max_rows,
            rows_read: 0,
            processor,
            step: RowsStep::AwaitRow(PendingRead::new(0, conn.sequence_number)),
            outcome: None,
        }
    }

    pub fn into_outcome(self) -> RowsReadOutcome {
        self.outcome.expect("resume() reached None before an outcome was recorded")
    }

    pub fn resume(&mut self, conn: &mut ConnectionState, last_error: Option<Error>) -> Result<NextAction> {
        if let Some(err) = last_error {
            conn.status = ConnectionStatus::Ready;
            return Err(err);
        }

        loop {
            if self.rows_read >= self.max_rows {
                self.outcome = Some(RowsReadOutcome::BatchFull);
                return Ok(NextAction::None);
            }

            let step = std::mem::replace(&mut self.step, RowsStep::Done);
            match step {
                RowsStep::AwaitRow(mut pending) => match pending.poll(conn)? {
                    None => {
                        self.step = RowsStep::AwaitRow(pending);
                        return Ok(NextAction::Read);
                    }
                    Some((bytes, cursor)) => {
                        finish_read(conn, &pending, cursor);
                        match classify_row_response(&bytes)? {
                            Response::Ok(ok) => {
                                self.processor.on_row_batch_finish()?;
                                let more = crate::state::ExecutionState::more_results_exist(ok.status);
                                self.processor.on_row_ok_packet(ok_summary(&ok))?;
                                if !more {
                                    conn.apply_ok_status(ok.status);
                                    conn.status = ConnectionStatus::Ready;
                                }
                                self.outcome = Some(RowsReadOutcome::ResultsetComplete {
                                    ok: ok_summary(&ok),
                                    more_resultsets: more,
                                });
                                return Ok(NextAction::None);
                            }
                            Response::Err(err) => {
                                conn.status = ConnectionStatus::Ready;
                                return Err(err_packet_to_error(err, conn.db_flavor));
                            }
                            Response::Other(bytes) => {
                                let row = match self.encoding {
                                    RowEncoding::Text => Row::decode_text(&bytes, self.column_types.len())?,
                                    RowEncoding::Binary => Row::decode_binary(&bytes, &self.column_types)?,
                                };
                                self.processor.on_row(row)?;
                                self.rows_read += 1;
                                self.step = RowsStep::AwaitRow(PendingRead::new(0, conn.sequence_number));
                            }
                        }
                    }
                },
                RowsStep::Done => {
                    self.step = RowsStep::Done;
                    return Ok(NextAction::None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::test_support::{drain_write, eof_ok_payload, feed, framed, ok_payload, ready_conn};
    use crate::io::Serializer;

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

    fn num_columns_payload(n: u64) -> Vec<u8> {
        let mut s = Serializer::new();
        s.int_lenenc(n);
        s.finish()
    }

    #[test]
    fn start_execution_with_no_resultset() {
        let mut conn = ready_conn();
        let mut alg = StartExecutionAlgorithm::new(&mut conn, &crate::protocol::encode::query("DO 1")).unwrap();

        let mut seqnum = 1u8;
        loop {
            match alg.resume(&mut conn, None).unwrap() {
                NextAction::Write => drain_write(&mut conn),
                NextAction::Read => {
                    feed(&mut conn, &framed(&ok_payload(2), seqnum));
                    seqnum = seqnum.wrapping_add(1);
                }
                NextAction::None => break,
                other => panic!("unexpected action {other:?}"),
            }
        }

        assert_eq!(conn.status, ConnectionStatus::Ready);
        match alg.into_outcome() {
            HeadOutcome::Done(ok) => assert_eq!(ok.status_flags, 2),
            HeadOutcome::Resultset { .. } => panic!("expected Done"),
        }
    }

    #[test]
    fn start_execution_then_batched_rows_then_batch_full_and_complete() {
        let mut conn = ready_conn();
        let mut alg =
            StartExecutionAlgorithm::new(&mut conn, &crate::protocol::encode::query("SELECT id FROM t")).unwrap();
        assert_eq!(conn.status, ConnectionStatus::EngagedInMultiFunction);

        let mut seqnum = 1u8;
        let mut to_send: Vec<Vec<u8>> = vec![num_columns_payload(1), column_def_payload("id", FieldType::LONG)];
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

        let (metadata, column_types) = match alg.into_outcome() {
            HeadOutcome::Resultset { metadata, column_types } => (metadata, column_types),
            HeadOutcome::Done(_) => panic!("expected Resultset"),
        };
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata[0].name, "id");

        // First batch: max_rows = 1, two rows available -> BatchFull after one row.
        let mut rows = Vec::new();
        let mut reader = ReadSomeRowsAlgorithm::new(&conn, column_types.clone(), RowEncoding::Text, 1, &mut rows);
        feed(&mut conn, &framed(&[0x01, b'1'], seqnum));
        seqnum = seqnum.wrapping_add(1);
        assert_eq!(reader.resume(&mut conn, None).unwrap(), NextAction::None);
        assert!(matches!(reader.into_outcome(), RowsReadOutcome::BatchFull));
        assert_eq!(rows.len(), 1);
        assert_eq!(conn.status, ConnectionStatus::EngagedInMultiFunction);

        // Second batch: one more row, then the terminating OK.
        let mut rows2 = Vec::new();
        let mut reader2 = ReadSomeRowsAlgorithm::new(&conn, column_types, RowEncoding::Text, 10, &mut rows2);
        let mut to_send2: Vec<Vec<u8>> = vec![vec![0x01, b'2'], eof_ok_payload(2)];
        to_send2.reverse();
        loop {
            match reader2.resume(&mut conn, None).unwrap() {
                NextAction::Read => {
                    let payload = to_send2.pop().expect("no more fixture messages");
                    feed(&mut conn, &framed(&payload, seqnum));
                    seqnum = seqnum.wrapping_add(1);
                }
                NextAction::None => break,
                other => panic!("unexpected action {other:?}"),
            }
        }
        let outcome2 = reader2.into_outcome();
        assert_eq!(rows2.len(), 1);
        match outcome2 {
            RowsReadOutcome::ResultsetComplete { ok, more_resultsets } => {
                assert_eq!(ok.status_flags, 2);
                assert!(!more_resultsets);
            }
            RowsReadOutcome::BatchFull => panic!("expected ResultsetComplete"),
        }
        assert_eq!(conn.status, ConnectionStatus::Ready);
    }

    #[test]
    fn multi_resultset_rows_loop_back_into_a_fresh_head() {
        let mut conn = ready_conn();
        let mut alg =
            StartExecutionAlgorithm::new(&mut conn, &crate::protocol::encode::query("CALL multi()")).unwrap();

        let mut seqnum = 1u8;
        let mut to_send: Vec<Vec<u8>> = vec![num_columns_payload(1), column_def_payload("x", FieldType::LONG)];
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
        let column_types = match alg.into_outcome() {
            HeadOutcome::Resultset { column_types, .. } => column_types,
            HeadOutcome::Done(_) => panic!("expected Resultset"),
        };

        // First resultset's single row, then an OK with SERVER_MORE_RESULTS_EXISTS (0x0008) set.
        let mut rows = Vec::new();
        let mut reader = ReadSomeRowsAlgorithm::new(&conn, column_types, RowEncoding::Text, 10, &mut rows);
        let mut to_send2: Vec<Vec<u8>> = vec![vec![0x01, b'1'], eof_ok_payload(0x0008)];
        to_send2.reverse();
        loop {
            match reader.resume(&mut conn, None).unwrap() {
                NextAction::Read => {
                    let payload = to_send2.pop().expect("no more fixture messages");
                    feed(&mut conn, &framed(&payload, seqnum));
                    seqnum = seqnum.wrapping_add(1);
                }
                NextAction::None => break,
                other => panic!("unexpected action {other:?}"),
            }
        }
        match reader.into_outcome() {
            RowsReadOutcome::ResultsetComplete { more_resultsets, .. } => assert!(more_resultsets),
            RowsReadOutcome::BatchFull => panic!("expected ResultsetComplete"),
        }
        assert_eq!(conn.status, ConnectionStatus::EngagedInMultiFunction);

        // Second resultset carries no rows, only its final OK.
        let mut head2 = ReadResultsetHeadAlgorithm::new(&conn);
        loop {
            match head2.resume(&mut conn, None).unwrap() {
                NextAction::Read => {
                    feed(&mut conn, &framed(&ok_payload(2), seqnum));
                    seqnum = seqnum.wrapping_add(1);
                }
                NextAction::None => break,
                other => panic!("unexpected action {other:?}"),
            }
        }
        match head2.into_outcome() {
            HeadOutcome::Done(ok) => assert_eq!(ok.status_flags, 2),
            HeadOutcome::Resultset { .. } => panic!("expected Done"),
        }
        assert_eq!(conn.status, ConnectionStatus::Ready);
    }
}

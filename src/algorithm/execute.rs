//! `execute`: runs one text or prepared-statement command and eagerly
//! buffers every resultset it yields.

use crate::algorithm::{
    begin_command, classify_response, classify_row_response, err_packet_to_error, finish_read, ok_summary, PendingRead,
    Response,
};
use crate::error::{Error, Result};
use crate::io::Deserializer;
use crate::next_action::NextAction;
use crate::processor::{EagerProcessor, ExecutionProcessor, MetaMode};
use crate::protocol::{ColumnDefinition, Row};
use crate::state::{ConnectionState, ConnectionStatus, RowEncoding};

enum Step {
    Write,
    AwaitHead(PendingRead),
    AwaitMeta { pending: PendingRead, remaining: usize },
    AwaitRow(PendingRead),
    Done,
}

/// One request, possibly binary-encoded (prepared statement) or text
/// (`COM_QUERY`); drives every resultset the server sends in reply,
/// following `SERVER_MORE_RESULTS_EXISTS` until it's unset.
pub struct ExecuteAlgorithm {
    encoding: RowEncoding,
    meta_mode: MetaMode,
    column_types: Vec<crate::protocol::FieldType>,
    step: Step,
    processor: EagerProcessor,
}

impl ExecuteAlgorithm {
    pub fn new(conn: &mut ConnectionState, payload: &[u8], encoding: RowEncoding, meta_mode: MetaMode) -> Result<Self> {
        conn.require_ready()?;
        begin_command(conn, payload);
        conn.status = ConnectionStatus::EngagedInMultiFunction;
        let mut processor = EagerProcessor::new();
        processor.reset(encoding, meta_mode);
        Ok(ExecuteAlgorithm {
            encoding,
            meta_mode,
            column_types: Vec::new(),
            step: Step::Write,
            processor,
        })
    }

    /// Takes ownership of the buffered resultsets once the algorithm has
    /// reached `NextAction::None`.
    pub fn into_results(self) -> Vec<crate::processor::ResultSet> {
        self.processor.results
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
                        match classify_response(&bytes)? {
                            Response::Ok(ok) => {
                                let more = crate::state::ExecutionState::more_results_exist(ok.status);
                                self.processor.on_head_ok_packet(ok_summary(&ok))?;
                                if more {
                                    self.processor.reset(self.encoding, self.meta_mode);
                                    self.step = Step::AwaitHead(PendingRead::new(0, conn.sequence_number));
                                } else {
                                    conn.apply_ok_status(ok.status);
                                    conn.status = ConnectionStatus::Ready;
                                    self.step = Step::Done;
                                    return Ok(NextAction::None);
                                }
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
                                self.processor.on_num_meta(num_columns)?;
                                self.column_types.clear();
                                if num_columns == 0 {
                                    self.step = Step::AwaitRow(PendingRead::new(0, conn.sequence_number));
                                } else {
                                    self.step = Step::AwaitMeta {
                                        pending: PendingRead::new(0, conn.sequence_number),
                                        remaining: num_columns,
                                    };
                                }
                            }
                        }
                    }
                },
                Step::AwaitMeta { mut pending, remaining } => match pending.poll(conn)? {
                    None => {
                        self.step = Step::AwaitMeta { pending, remaining };
                        return Ok(NextAction::Read);
                    }
                    Some((bytes, cursor)) => {
                        finish_read(conn, &pending, cursor);
                        let def = ColumnDefinition::decode(&bytes)?;
                        self.column_types.push(def.r#type);
                        let is_last = remaining == 1;
                        self.processor.on_meta(def, is_last)?;
                        if is_last {
                            self.processor.on_row_batch_start()?;
                            self.step = Step::AwaitRow(PendingRead::new(0, conn.sequence_number));
                        } else {
                            self.step = Step::AwaitMeta {
                                pending: PendingRead::new(0, conn.sequence_number),
                                remaining: remaining - 1,
                            };
                        }
                    }
                },
                Step::AwaitRow(mut pending) => match pending.poll(conn)? {
                    None => {
                        self.step = Step::AwaitRow(pending);
                        return Ok(NextAction::Read);
                    }
                    Some((bytes, cursor)) => {
                        finish_read(conn, &pending, cursor);
                        match classify_row_response(&bytes)? {
                            Response::Ok(ok) => {
                                self.processor.on_row_batch_finish()?;
                                let more = crate::state::ExecutionState::more_results_exist(ok.status);
                                self.processor.on_row_ok_packet(ok_summary(&ok))?;
                                if more {
                                    self.processor.reset(self.encoding, self.meta_mode);
                                    self.step = Step::AwaitHead(PendingRead::new(0, conn.sequence_number));
                                } else {
                                    conn.apply_ok_status(ok.status);
                                    conn.status = ConnectionStatus::Ready;
                                    self.step = Step::Done;
                                    return Ok(NextAction::None);
                                }
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
                                self.step = Step::AwaitRow(PendingRead::new(0, conn.sequence_number));
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
}

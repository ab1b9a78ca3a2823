//! `run_pipeline`: writes several independent OK/ERR-only commands back to
//! back before reading any of their responses, then reads the responses in
//! the order the commands were sent. Scoped to commands whose response is a
//! single OK or ERR packet (ping, `SET`-style statements, reset-connection,
//! statement-close) — a command that can return a resultset isn't a fit for
//! this shape, since a later stage's request bytes would need to be written
//! before an earlier stage's resultset is known to be finished.

use crate::algorithm::{begin_command, classify_response, drive_write, err_packet_to_error, finish_read, ok_summary, PendingRead, Response};
use crate::error::{Error, Result};
use crate::next_action::NextAction;
use crate::state::{ConnectionState, ConnectionStatus, OkSummary};

/// One command's encoded request, queued as part of a pipeline.
pub struct PipelineStage {
    payload: Vec<u8>,
}

impl PipelineStage {
    pub fn new(payload: Vec<u8>) -> Self {
        PipelineStage { payload }
    }
}

/// A stage's outcome. A server-reported error doesn't abort the pipeline —
/// every stage's bytes are already on the wire by the time the first
/// response is read — so it's carried per-stage rather than failing the
/// whole `resume`.
pub enum PipelineStageResult {
    Ok(OkSummary),
    Err(Error),
}

enum Step {
    Write,
    Read { index: usize, pending: PendingRead },
    Done,
}

pub struct RunPipelineAlgorithm {
    stage_count: usize,
    step: Step,
    results: Vec<PipelineStageResult>,
}

impl RunPipelineAlgorithm {
    pub fn new(conn: &mut ConnectionState, stages: Vec<PipelineStage>) -> Result<Self> {
        conn.require_ready()?;
        if stages.is_empty() {
            return Err(Error::ProtocolValueError("pipeline must contain at least one stage".to_owned()));
        }
        conn.status = ConnectionStatus::EngagedInMultiFunction;
        let stage_count = stages.len();
        for stage in &stages {
            begin_command(conn, &stage.payload);
        }
        Ok(RunPipelineAlgorithm {
            stage_count,
            step: Step::Write,
            results: Vec::with_capacity(stage_count),
        })
    }

    pub fn into_results(self) -> Vec<PipelineStageResult> {
        self.results
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
                    if let Some(action) = drive_write(conn) {
                        self.step = Step::Write;
                        return Ok(action);
                    }
                    self.step = Step::Read { index: 0, pending: PendingRead::new(0, 0) };
                }
                Step::Read { index, mut pending } => match pending.poll(conn)? {
                    None => {
                        self.step = Step::Read { index, pending };
                        return Ok(NextAction::Read);
                    }
                    Some((bytes, cursor)) => {
                        finish_read(conn, &pending, cursor);
                        match classify_response(&bytes)? {
                            Response::Ok(ok) => {
                                conn.apply_ok_status(ok.status);
                                self.results.push(PipelineStageResult::Ok(ok_summary(&ok)));
                            }
                            Response::Err(err) => {
                                self.results.push(PipelineStageResult::Err(err_packet_to_error(err, conn.db_flavor)));
                            }
                            Response::Other(bytes) => {
                                conn.status = ConnectionStatus::Ready;
                                return Err(Error::ProtocolValueError(format!(
                                    "unexpected byte 0x{:02x} in pipelined OK/ERR-only response",
                                    bytes[0]
                                )));
                            }
                        }
                        let next_index = index + 1;
                        if next_index == self.stage_count {
                            conn.status = ConnectionStatus::Ready;
                            self.step = Step::Done;
                            return Ok(NextAction::None);
                        }
                        self.step = Step::Read { index: next_index, pending: PendingRead::new(0, 0) };
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
    use crate::algorithm::test_support::{drain_write, err_payload, feed, framed, ok_payload, ready_conn};

    #[test]
    fn a_stage_level_error_does_not_abort_later_stages() {
        let mut conn = ready_conn();
        let stages = vec![
            PipelineStage::new(crate::protocol::encode::query("SET a = 1")),
            PipelineStage::new(crate::protocol::encode::query("SET b = 1")),
            PipelineStage::new(crate::protocol::encode::query("SET c = 1")),
        ];
        let mut alg = RunPipelineAlgorithm::new(&mut conn, stages).unwrap();
        assert_eq!(conn.status, ConnectionStatus::EngagedInMultiFunction);

        let mut to_send: Vec<Vec<u8>> = vec![
            ok_payload(2),
            err_payload(1146, "nope"),
            ok_payload(2),
        ];
        to_send.reverse();

        loop {
            match alg.resume(&mut conn, None).unwrap() {
                NextAction::Write => drain_write(&mut conn),
                NextAction::Read => {
                    let payload = to_send.pop().expect("no more fixture messages");
                    feed(&mut conn, &framed(&payload, 0));
                }
                NextAction::None => break,
                other => panic!("unexpected action {other:?}"),
            }
        }

        assert_eq!(conn.status, ConnectionStatus::Ready);
        let results = alg.into_results();
        assert_eq!(results.len(), 3);
        assert!(matches!(results[0], PipelineStageResult::Ok(_)));
        assert!(matches!(results[1], PipelineStageResult::Err(_)));
        assert!(matches!(results[2], PipelineStageResult::Ok(_)));
    }
}

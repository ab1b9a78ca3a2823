//! One resumable algorithm per public operation. Every algorithm is a state
//! machine whose `resume` is driven purely by [`crate::NextAction`] effect
//! return values; none of them touch a socket directly.

mod close;
mod close_statement;
mod execute;
mod handshake;
mod ping;
mod prepare_statement;
mod quit;
mod reset_connection;
mod run_pipeline;
mod set_character_set;
mod start_execution;

pub use close::CloseAlgorithm;
pub use close_statement::CloseStatementAlgorithm;
pub use execute::ExecuteAlgorithm;
pub use handshake::{HandshakeAlgorithm, HandshakeParams};
pub use ping::PingAlgorithm;
pub use prepare_statement::{PreparedStatement, PrepareStatementAlgorithm};
pub use quit::QuitAlgorithm;
pub use reset_connection::ResetConnectionAlgorithm;
pub use run_pipeline::{PipelineStage, PipelineStageResult, RunPipelineAlgorithm};
pub use set_character_set::SetCharacterSetAlgorithm;
pub use start_execution::{HeadOutcome, ReadResultsetHeadAlgorithm, ReadSomeRowsAlgorithm, RowsReadOutcome, StartExecutionAlgorithm};

use crate::error::{Error, Result, ServerErrorCode};
use crate::framing::MessageReader;
use crate::next_action::NextAction;
use crate::protocol::{ErrPacket, OkPacket};
use crate::state::{ConnectionState, DbFlavor, OkSummary};

/// One decoded command response, before the caller knows whether it's an OK,
/// an ERR, or the start of a resultset.
pub(crate) enum Response {
    Ok(OkPacket),
    Err(ErrPacket),
    /// The raw bytes of a message that isn't OK/ERR (a column count, a
    /// handshake packet, ...); the caller dispatches further.
    Other(Vec<u8>),
}

/// Whether `header` (the first byte of a just-assembled message) should be
/// treated as an OK packet in **head** position — a command's first
/// response, before any column count has been read. `0xFE` only counts when
/// the body is short enough to not be a length-encoded-integer column count
/// instead — `CLIENT_DEPRECATE_EOF` is mandatory in this core, so the EOF
/// packet shape never appears; only a short OK-as-EOF encoding does.
fn looks_like_ok(header: u8, len: usize) -> bool {
    header == 0x00 || (header == 0xFE && len < 9)
}

/// Classifies a head-position response: the first packet after a command is
/// written, before metadata or rows are known to be coming.
pub(crate) fn classify_response(msg: &[u8]) -> Result<Response> {
    if msg.is_empty() {
        return Err(Error::IncompleteMessage);
    }
    match msg[0] {
        h if looks_like_ok(h, msg.len()) => Ok(Response::Ok(OkPacket::decode(msg)?)),
        0xFF => Ok(Response::Err(ErrPacket::decode(msg, true)?)),
        _ => Ok(Response::Other(msg.to_vec())),
    }
}

/// Classifies a **row-loop** response: a packet read while a resultset's
/// rows are being consumed. Unlike the head position, `0x00` is not an OK
/// marker here — a binary row's packet header is `0x00` (see
/// `Row::decode_binary`), and a text row whose first column is an empty
/// string lenenc-encodes to the same leading byte. The only terminator is
/// the short `0xFE`-led OK-as-EOF encoding, same as the teacher's
/// `packet[0] == 0xfe && packet.len() < 9` check.
pub(crate) fn classify_row_response(msg: &[u8]) -> Result<Response> {
    if msg.is_empty() {
        return Err(Error::IncompleteMessage);
    }
    match msg[0] {
        0xFE if msg.len() < 9 => Ok(Response::Ok(OkPacket::decode(msg)?)),
        0xFF => Ok(Response::Err(ErrPacket::decode(msg, true)?)),
        _ => Ok(Response::Other(msg.to_vec())),
    }
}

/// Turns a decoded ERR packet into the public `Error::Server` variant,
/// categorising the numeric code by `db_flavor`.
pub(crate) fn err_packet_to_error(err: ErrPacket, db_flavor: DbFlavor) -> Error {
    Error::Server {
        code: ServerErrorCode::from_wire(err.error_code, db_flavor),
        message: err.error_message.clone(),
        diagnostics: crate::diagnostics::Diagnostics::server(err.error_message),
    }
}

pub(crate) fn ok_summary(ok: &OkPacket) -> OkSummary {
    OkSummary {
        affected_rows: ok.affected_rows,
        last_insert_id: ok.last_insert_id,
        status_flags: ok.status.bits(),
        warnings: ok.warnings,
        info: ok.info.clone(),
    }
}

/// Queues `payload` as a brand new top-level command: resets the
/// sequence-number counter to 0 first, per every command algorithm's
/// precondition.
pub(crate) fn begin_command(conn: &mut ConnectionState, payload: &[u8]) {
    conn.reset_sequence_number();
    conn.sequence_number = conn.write_buffer.queue_message(payload, conn.sequence_number);
}

/// Queues `payload` as a continuation of the in-flight exchange (used by the
/// handshake's SSL-request / login-request / auth-continuation packets,
/// which share one running sequence-number counter).
pub(crate) fn queue_continuation(conn: &mut ConnectionState, payload: &[u8]) {
    conn.sequence_number = conn.write_buffer.queue_message(payload, conn.sequence_number);
}

/// Drives the connection's write buffer to empty, yielding `Write` while
/// there is anything left to send.
pub(crate) fn drive_write(conn: &ConnectionState) -> Option<NextAction> {
    if conn.write_buffer.is_empty() {
        None
    } else {
        Some(NextAction::Write)
    }
}

/// A single in-flight message read, parked across `resume` calls until a
/// full logical message has been assembled.
pub(crate) struct PendingRead {
    reader: MessageReader,
}

impl PendingRead {
    pub(crate) fn new(offset: usize, expected_seqnum: u8) -> Self {
        PendingRead {
            reader: MessageReader::new(offset, expected_seqnum),
        }
    }

    /// Returns `Ok(Some((bytes, cursor)))` once a full message is
    /// assembled, `Ok(None)` when the driver must `Read` more first.
    pub(crate) fn poll(&mut self, conn: &mut ConnectionState) -> Result<Option<(Vec<u8>, usize)>> {
        use crate::framing::ReadProgress;
        match self.reader.poll(&mut conn.read_buffer)? {
            ReadProgress::Message { offset, len } => {
                let bytes = conn.read_buffer.message(offset, len).to_vec();
                Ok(Some((bytes, self.reader.cursor())))
            }
            ReadProgress::NeedMoreData { .. } => Ok(None),
        }
    }

    /// The sequence number the *next* message reader should expect, once
    /// this one has fully landed.
    pub(crate) fn next_expected_seqnum(&self) -> u8 {
        self.reader.expected_seqnum()
    }
}

/// After consuming a message at `cursor`, drop its bytes from the read
/// buffer and hand back the sequence number the next read/write should use.
pub(crate) fn finish_read(conn: &mut ConnectionState, pending: &PendingRead, cursor: usize) {
    let next_seqnum = pending.next_expected_seqnum();
    conn.read_buffer.compact(cursor);
    conn.sequence_number = next_seqnum;
}

/// What a [`SimpleCommand`] reports back to its caller on each `resume`.
pub(crate) enum SimpleCommandProgress {
    Action(NextAction),
    Response(Vec<u8>),
}

enum SimpleCommandStep {
    Write,
    Read(PendingRead),
    Done,
}

/// Shared driver for the "write one request, read one OK/ERR response"
/// shape used by ping, reset-connection, and SET-statement style commands.
pub(crate) struct SimpleCommand {
    step: SimpleCommandStep,
}

impl SimpleCommand {
    pub(crate) fn start(conn: &mut ConnectionState, payload: &[u8]) -> Self {
        begin_command(conn, payload);
        SimpleCommand {
            step: SimpleCommandStep::Write,
        }
    }

    pub(crate) fn resume(&mut self, conn: &mut ConnectionState) -> Result<SimpleCommandProgress> {
        loop {
            match &mut self.step {
                SimpleCommandStep::Write => {
                    if let Some(action) = drive_write(conn) {
                        return Ok(SimpleCommandProgress::Action(action));
                    }
                    self.step = SimpleCommandStep::Read(PendingRead::new(0, conn.sequence_number));
                }
                SimpleCommandStep::Read(pending) => match pending.poll(conn)? {
                    None => return Ok(SimpleCommandProgress::Action(NextAction::Read)),
                    Some((bytes, cursor)) => {
                        finish_read(conn, pending, cursor);
                        self.step = SimpleCommandStep::Done;
                        return Ok(SimpleCommandProgress::Response(bytes));
                    }
                },
                SimpleCommandStep::Done => return Ok(SimpleCommandProgress::Action(NextAction::None)),
            }
        }
    }
}

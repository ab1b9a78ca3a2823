//! `close`: graceful connection teardown — `COM_QUIT`, an optional TLS
//! shutdown, then closing the transport.

use crate::algorithm::QuitAlgorithm;
use crate::error::{Error, Result};
use crate::next_action::NextAction;
use crate::state::{ConnectionState, ConnectionStatus};

enum Step {
    Quit(QuitAlgorithm),
    SslShutdown,
    CloseTransport,
    Done,
}

pub struct CloseAlgorithm {
    step: Step,
}

impl CloseAlgorithm {
    pub fn new(conn: &mut ConnectionState) -> Result<Self> {
        let quit = QuitAlgorithm::new(conn)?;
        Ok(CloseAlgorithm { step: Step::Quit(quit) })
    }

    pub fn resume(&mut self, conn: &mut ConnectionState, last_error: Option<Error>) -> Result<NextAction> {
        let mut last_error = last_error;
        loop {
            let step = std::mem::replace(&mut self.step, Step::Done);
            match step {
                Step::Quit(mut quit) => {
                    let action = quit.resume(conn, last_error.take())?;
                    if action.is_terminal() {
                        self.step = if conn.tls_active {
                            Step::SslShutdown
                        } else {
                            Step::CloseTransport
                        };
                    } else {
                        self.step = Step::Quit(quit);
                        return Ok(action);
                    }
                }
                Step::SslShutdown => {
                    self.step = Step::CloseTransport;
                    return Ok(NextAction::SslShutdown);
                }
                Step::CloseTransport => {
                    conn.status = ConnectionStatus::Terminated;
                    self.step = Step::Done;
                    return Ok(NextAction::Close);
                }
                Step::Done => {
                    self.step = Step::Done;
                    return Ok(NextAction::None);
                }
            }
        }
    }
}

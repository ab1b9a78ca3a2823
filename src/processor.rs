//! Execution processor: the capability set the execute/read-rows algorithms
//! feed rows, metadata, and OK packets into. One implementation buffers
//! everything (eager); another parks rows into caller-supplied storage
//! (streaming).

use crate::error::Result;
use crate::protocol::{ColumnDefinition, Row};
use crate::state::{OkSummary, RowEncoding};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetaMode {
    Minimal,
    #[default]
    Full,
}

/// Hooks an execution algorithm drives as it parses one resultset.
pub trait ExecutionProcessor {
    fn reset(&mut self, encoding: RowEncoding, meta_mode: MetaMode);
    fn on_head_ok_packet(&mut self, ok: OkSummary) -> Result<()>;
    fn on_num_meta(&mut self, n: usize) -> Result<()>;
    fn on_meta(&mut self, meta: ColumnDefinition, is_last: bool) -> Result<()>;
    fn on_row_batch_start(&mut self) -> Result<()>;
    fn on_row(&mut self, row: Row) -> Result<()>;
    fn on_row_ok_packet(&mut self, ok: OkSummary) -> Result<()>;
    fn on_row_batch_finish(&mut self) -> Result<()>;
}

/// One resultset's worth of results, as the eager processor buffers them.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub metadata: Vec<ColumnDefinition>,
    pub rows: Vec<Row>,
    pub ok: Option<OkSummary>,
}

/// Buffers every resultset a command yields; used by `execute`.
#[derive(Debug, Default)]
pub struct EagerProcessor {
    pub results: Vec<ResultSet>,
    meta_mode: MetaMode,
}

impl EagerProcessor {
    pub fn new() -> Self {
        EagerProcessor {
            results: Vec::new(),
            meta_mode: MetaMode::Full,
        }
    }

    fn current(&mut self) -> &mut ResultSet {
        self.results.last_mut().expect("reset() called before any hook")
    }
}

impl ExecutionProcessor for EagerProcessor {
    fn reset(&mut self, _encoding: RowEncoding, meta_mode: MetaMode) {
        self.meta_mode = meta_mode;
        self.results.push(ResultSet::default());
    }

    fn on_head_ok_packet(&mut self, ok: OkSummary) -> Result<()> {
        self.current().ok = Some(ok);
        Ok(())
    }

    fn on_num_meta(&mut self, n: usize) -> Result<()> {
        self.current().metadata.reserve(n);
        Ok(())
    }

    fn on_meta(&mut self, meta: ColumnDefinition, _is_last: bool) -> Result<()> {
        let meta = if self.meta_mode == MetaMode::Minimal {
            ColumnDefinition {
                catalog: String::new(),
                schema: String::new(),
                table: String::new(),
                org_table: String::new(),
                org_name: String::new(),
                ..meta
            }
        } else {
            meta
        };
        self.current().metadata.push(meta);
        Ok(())
    }

    fn on_row_batch_start(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_row(&mut self, row: Row) -> Result<()> {
        self.current().rows.push(row);
        Ok(())
    }

    fn on_row_ok_packet(&mut self, ok: OkSummary) -> Result<()> {
        self.current().ok = Some(ok);
        Ok(())
    }

    fn on_row_batch_finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Streams rows into a caller-supplied slab rather than an internal
/// `Vec`; used by the `start_execution`/`read_some_rows` multi-function
/// triad, where the caller controls batch sizing and storage lifetime.
pub struct StreamingProcessor<'a> {
    pub metadata: Vec<ColumnDefinition>,
    pub last_ok: Option<OkSummary>,
    out: &'a mut Vec<Row>,
    meta_mode: MetaMode,
}

impl<'a> StreamingProcessor<'a> {
    pub fn new(out: &'a mut Vec<Row>) -> Self {
        StreamingProcessor {
            metadata: Vec::new(),
            last_ok: None,
            out,
            meta_mode: MetaMode::Full,
        }
    }
}

impl<'a> ExecutionProcessor for StreamingProcessor<'a> {
    fn reset(&mut self, _encoding: RowEncoding, meta_mode: MetaMode) {
        self.meta_mode = meta_mode;
        self.metadata.clear();
        self.last_ok = None;
    }

    fn on_head_ok_packet(&mut self, ok: OkSummary) -> Result<()> {
        self.last_ok = Some(ok);
        Ok(())
    }

    fn on_num_meta(&mut self, n: usize) -> Result<()> {
        self.metadata.reserve(n);
        Ok(())
    }

    fn on_meta(&mut self, meta: ColumnDefinition, _is_last: bool) -> Result<()> {
        let _ = self.meta_mode;
        self.metadata.push(meta);
        Ok(())
    }

    fn on_row_batch_start(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_row(&mut self, row: Row) -> Result<()> {
        self.out.push(row);
        Ok(())
    }

    fn on_row_ok_packet(&mut self, ok: OkSummary) -> Result<()> {
        self.last_ok = Some(ok);
        Ok(())
    }

    fn on_row_batch_finish(&mut self) -> Result<()> {
        Ok(())
    }
}

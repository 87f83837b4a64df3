//! Line-oriented view for pipes and dumb terminals
//!
//! Every refresh rebuilds the whole table from the log, newest row first.

use std::io::{self, Write};

use crate::state::TesterState;

/// Writes the log as text to `W`.
pub struct PlainView<W: Write> {
    out: W,
}

impl<W: Write> PlainView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Reprint header and every row.
    pub fn refresh(&mut self, state: &TesterState, fault: Option<&str>) -> io::Result<()> {
        writeln!(self.out, "Command:  Mode:{}", state.mode)?;
        if let Some(fault) = fault {
            writeln!(self.out, "⚠ Control error: {fault}")?;
        }
        writeln!(self.out, "{:>4} | {:<8} | {:<22} | message", "#", "Event", "Source")?;
        for row in state.log.rows() {
            writeln!(
                self.out,
                "{:>4} | {:<8} | {:<22} | {}",
                row.index, row.event_name, row.source, row.message
            )?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

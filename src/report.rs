//! Action log written to stdout, separate from diagnostics and tracing
//! output on stderr.

use crate::{config::OutputFormat, models::action::ActionRecord};
use std::io::{self, Write};
use tracing::warn;

pub struct ActionLog<W> {
    out: W,
    format: OutputFormat,
}

impl ActionLog<io::Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl<W: Write> ActionLog<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    /// Free-form notice; only emitted in text mode so JSON output stays parseable.
    pub fn notice(&mut self, message: &str) {
        if self.format == OutputFormat::Text {
            if let Err(err) = writeln!(self.out, "{}", message) {
                warn!("failed to write action log: {}", err);
            }
        }
    }

    /// Write one record. Output failures are logged, never fatal: the
    /// change has already been made remotely.
    pub fn record(&mut self, action: &ActionRecord) {
        if let Err(err) = self.write_record(action) {
            warn!(key = %action.key, "failed to write action log: {}", err);
        }
    }

    fn write_record(&mut self, action: &ActionRecord) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{}", action)?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, action)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

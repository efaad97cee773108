use crate::compare::{Comparison, Verdict};
use crate::errors::TracecheckError;
use crate::runtime::Terminal;

/// Human-readable, per-trace result lines. Every trace reports
/// independently; no aggregate exit code is derived from verdicts.
pub struct ReportEmitter<'a> {
    terminal: &'a dyn Terminal,
}

impl<'a> ReportEmitter<'a> {
    pub fn new(terminal: &'a dyn Terminal) -> Self {
        Self { terminal }
    }

    pub fn emit(&self, trace_name: &str, comparison: &Comparison) -> Result<(), TracecheckError> {
        if let Some(note) = &comparison.length_note {
            self.terminal.write_line(&format!(
                "outputs differ in length for {trace_name}: candidate={} reference={}",
                note.candidate, note.reference
            ))?;
        }
        match &comparison.verdict {
            Verdict::Pass => self.terminal.write_line(&format!("{trace_name} pass")),
            Verdict::Fail {
                position,
                candidate,
                reference,
            } => {
                self.terminal
                    .write_line(&format!("different result at {trace_name}({position})"))?;
                self.terminal
                    .write_line(&format!("+ candidate: {candidate}"))?;
                let reference = reference.as_deref().unwrap_or("<missing>");
                self.terminal
                    .write_line(&format!("+ reference: {reference}"))
            }
        }
    }

    /// A session that could not be captured fails that trace's evaluation
    /// only; the run continues with the next trace.
    pub fn emit_fault(
        &self,
        trace_name: &str,
        error: &TracecheckError,
    ) -> Result<(), TracecheckError> {
        self.terminal
            .write_line(&format!("error running {trace_name}: {error}"))
    }
}

//! Report accumulator.
//!
//! All user-facing lint text goes through a [`Report`]. Generic lint
//! output is buffered and flushed once; rule findings are written as soon
//! as they are emitted.

use std::io::{self, Write};

use crate::analyzer::extlint::types::{Finding, Severity};

pub struct Report<W: Write> {
    out: W,
    buffer: String,
    findings: Vec<Finding>,
}

impl<W: Write> Report<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            buffer: String::new(),
            findings: Vec::new(),
        }
    }

    /// Write a phase banner, e.g. `#### lint by helm ####`.
    pub fn banner(&mut self, title: &str) -> io::Result<()> {
        write!(
            self.out,
            "\n#################### {} ####################\n",
            title
        )
    }

    /// Write the header that precedes a rule.
    pub fn section(&mut self, subject: &str) -> io::Result<()> {
        write!(self.out, "\nInfo: lint {}\n", subject)
    }

    /// Write a finding immediately and record it.
    pub fn emit(&mut self, finding: Finding) -> io::Result<()> {
        writeln!(self.out, "{}", finding)?;
        self.findings.push(finding);
        Ok(())
    }

    pub fn buffer_line(&mut self, line: impl AsRef<str>) {
        self.buffer.push_str(line.as_ref());
        self.buffer.push('\n');
    }

    pub fn flush_buffer(&mut self) -> io::Result<()> {
        let buffered = std::mem::take(&mut self.buffer);
        self.out.write_all(buffered.as_bytes())?;
        self.out.flush()
    }

    /// Write the final summary line.
    pub fn summary(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)?;
        self.out.flush()
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

//! Sample sinks
//!
//! A sweep hands each formatted `(x, result)` pair to a [`SampleSink`].
//! Records are one line each: `<x><separator><result>\n`, no header.

use std::io::Write;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::{CalcError, Result};

/// Destination for formatted sweep samples
pub trait SampleSink {
    /// Write one record
    fn write_sample(&mut self, x: &str, result: &str) -> Result<()>;

    /// Flush buffered records
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Delimited text sink on top of any writer
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    /// `separator` must be a single ASCII character
    pub fn new(inner: W, separator: char) -> Result<Self> {
        let delimiter = ascii_byte(separator)?;
        let writer = WriterBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(inner);
        Ok(Self { writer })
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| CalcError::output(format!("Failed to flush records: {}", e.error())))
    }
}

impl<W: Write> SampleSink for CsvSink<W> {
    fn write_sample(&mut self, x: &str, result: &str) -> Result<()> {
        self.writer.write_record([x, result])?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// In-memory sink, one joined line per sample
#[derive(Debug, Clone)]
pub struct MemorySink {
    separator: char,
    lines: Vec<String>,
}

impl MemorySink {
    pub fn new(separator: char) -> Self {
        Self {
            separator,
            lines: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl SampleSink for MemorySink {
    fn write_sample(&mut self, x: &str, result: &str) -> Result<()> {
        self.lines
            .push(format!("{}{}{}", x, self.separator, result));
        Ok(())
    }
}

pub(crate) fn ascii_byte(separator: char) -> Result<u8> {
    u8::try_from(separator)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| {
            CalcError::invalid_argument(format!(
                "separator must be a single ASCII character, got {:?}",
                separator
            ))
        })
}

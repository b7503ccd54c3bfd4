//! File-level summary of a SEG-Y file

use crate::error::Result;
use crate::types::{ByteOrder, DataFormatCode};
use crate::utils::{format_bytes, record_length_ms};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a reader learned about a file when opening it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub file_size: u64,
    pub byte_order: ByteOrder,
    /// Raw data format code from the reel header
    pub format_code: u16,
    pub revision: u16,
    pub fixed_length: bool,
    /// Sample interval in microseconds
    pub sample_interval_us: u16,
    pub samples_per_trace: u16,
    /// `None` when the file's trace lengths vary
    pub trace_count: Option<u64>,
    /// Recording delay of the first trace in milliseconds
    pub first_trace_delay_ms: Option<i16>,
    /// Non-blank card images of the text header
    pub text_header: Vec<String>,
}

impl FileSummary {
    pub fn data_format(&self) -> Option<DataFormatCode> {
        DataFormatCode::from_code(self.format_code)
    }

    pub fn record_length_ms(&self) -> f64 {
        record_length_ms(self.samples_per_trace as usize, self.sample_interval_us)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for FileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = match self.data_format() {
            Some(format) => format.to_string(),
            None => format!("unknown ({})", self.format_code),
        };
        let traces = self
            .trace_count
            .map_or_else(|| "variable".to_string(), |n| n.to_string());
        writeln!(
            f,
            "SEG-Y rev {:#06x}, {}, {}",
            self.revision,
            self.byte_order,
            format_bytes(self.file_size)
        )?;
        writeln!(f, "format:   {}", format)?;
        writeln!(
            f,
            "traces:   {} x {} samples @ {} us ({:.1} ms)",
            traces,
            self.samples_per_trace,
            self.sample_interval_us,
            self.record_length_ms()
        )?;
        if let Some(delay) = self.first_trace_delay_ms {
            writeln!(f, "delay:    {} ms", delay)?;
        }
        for line in &self.text_header {
            writeln!(f, "  {}", line)?;
        }
        Ok(())
    }
}

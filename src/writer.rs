//! Sequential writing of SEG-Y files

use crate::error::{Result, SegyError};
use crate::io;
use crate::layout::{bytes_per_sample, TEXT_HEADER_LEN};
use crate::reader::DEFAULT_PARALLEL_THRESHOLD;
use crate::reel::ReelHeader;
use crate::text::Codepage;
use crate::trace_header::{Trace, TraceHeader};
use crate::types::ByteOrder;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    /// Traces with at least this many samples are encoded in parallel
    pub parallel_threshold: usize,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl WriterOptions {
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Which section the writer expects next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    TextHeader,
    ReelHeader,
    Traces,
}

/// Writer producing a SEG-Y stream section by section.
///
/// Sections must arrive in file order: text header, reel header, then
/// traces. Every trace is checked against the reel header before any of its
/// bytes are written.
pub struct SegyWriter<W: Write> {
    inner: W,
    options: WriterOptions,
    byte_order: ByteOrder,
    stage: Stage,
    reel_header: Option<ReelHeader>,
    traces_written: u64,
}

impl SegyWriter<BufWriter<File>> {
    /// Create (or truncate) a file
    pub fn create(path: impl AsRef<Path>, byte_order: ByteOrder) -> Result<Self> {
        Self::create_with_options(path, byte_order, WriterOptions::default())
    }

    pub fn create_with_options(
        path: impl AsRef<Path>,
        byte_order: ByteOrder,
        options: WriterOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        debug!("Creating {} SEG-Y file {}", byte_order, path.display());
        Ok(Self::new(BufWriter::new(File::create(path)?), byte_order, options))
    }
}

impl<W: Write> SegyWriter<W> {
    pub fn new(inner: W, byte_order: ByteOrder, options: WriterOptions) -> Self {
        Self {
            inner,
            options,
            byte_order,
            stage: Stage::TextHeader,
            reel_header: None,
            traces_written: 0,
        }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn traces_written(&self) -> u64 {
        self.traces_written
    }

    fn expect_stage(&self, stage: Stage) -> Result<()> {
        if self.stage != stage {
            return Err(SegyError::WriteOrder(format!(
                "cannot write {:?} while expecting {:?}",
                stage, self.stage
            )));
        }
        Ok(())
    }

    /// Write the text header, padded or truncated to 3200 characters
    pub fn write_text_header<C: Codepage + ?Sized>(
        &mut self,
        text: &str,
        codepage: &C,
    ) -> Result<()> {
        self.expect_stage(Stage::TextHeader)?;
        io::write_text_header(&mut self.inner, text, codepage)?;
        self.stage = Stage::ReelHeader;
        Ok(())
    }

    /// Write an already encoded 3200-byte text header verbatim
    pub fn write_text_header_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.expect_stage(Stage::TextHeader)?;
        if bytes.len() != TEXT_HEADER_LEN {
            return Err(SegyError::OutOfBounds {
                offset: 0,
                len: TEXT_HEADER_LEN,
                available: bytes.len(),
            });
        }
        self.inner.write_all(bytes)?;
        self.stage = Stage::ReelHeader;
        Ok(())
    }

    pub fn write_reel_header(&mut self, header: &ReelHeader) -> Result<()> {
        self.expect_stage(Stage::ReelHeader)?;
        if header.data_format().is_none() {
            return Err(SegyError::UnsupportedFormat(header.data_format_code));
        }
        io::write_reel_header(&mut self.inner, header, self.byte_order)?;
        self.reel_header = Some(header.clone());
        self.stage = Stage::Traces;
        Ok(())
    }

    /// Sample count `header` must carry, checked against the reel header
    fn expected_samples(&self, header: &TraceHeader) -> Result<(usize, u16)> {
        self.expect_stage(Stage::Traces)?;
        let reel = self
            .reel_header
            .as_ref()
            .ok_or_else(|| SegyError::WriteOrder("reel header missing".to_string()))?;
        let per_reel = reel.samples_per_trace as usize;
        let own = header.samples_this_trace as usize;

        let expected = if reel.is_fixed_length() {
            if own != 0 && own != per_reel {
                return Err(SegyError::SampleCountMismatch {
                    expected: per_reel,
                    actual: own,
                });
            }
            per_reel
        } else if own != 0 {
            own
        } else {
            per_reel
        };
        Ok((expected, reel.data_format_code))
    }

    /// Write one trace header and its samples
    pub fn write_trace(&mut self, header: &TraceHeader, samples: &[f32]) -> Result<()> {
        let (expected, code) = self.expected_samples(header)?;
        if samples.len() != expected {
            return Err(SegyError::SampleCountMismatch {
                expected,
                actual: samples.len(),
            });
        }
        let parallel = samples.len() >= self.options.parallel_threshold;
        io::write_trace_header(&mut self.inner, header, self.byte_order)?;
        io::write_trace_data(&mut self.inner, samples, self.byte_order, code, parallel)?;
        self.traces_written += 1;
        Ok(())
    }

    /// Write a trace whose samples are already encoded in the file's format
    pub fn write_trace_bytes(&mut self, header: &TraceHeader, raw: &[u8]) -> Result<()> {
        let (expected, code) = self.expected_samples(header)?;
        let width = bytes_per_sample(code);
        if raw.len() != expected * width {
            return Err(SegyError::SampleCountMismatch {
                expected,
                actual: raw.len() / width,
            });
        }
        io::write_trace_header(&mut self.inner, header, self.byte_order)?;
        self.inner.write_all(raw)?;
        self.traces_written += 1;
        Ok(())
    }

    pub fn write(&mut self, trace: &Trace) -> Result<()> {
        self.write_trace(&trace.header, &trace.samples)
    }

    /// Flush and hand back the underlying stream
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        debug!("Finished SEG-Y output with {} traces", self.traces_written);
        Ok(self.inner)
    }
}

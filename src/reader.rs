//! Random-access and sequential reading of SEG-Y files

use crate::error::{Result, SegyError};
use crate::io;
use crate::layout::{TraceLayout, DATA_OFFSET, TEXT_HEADER_LEN, TRACE_HEADER_LEN};
use crate::metadata::FileSummary;
use crate::reel::ReelHeader;
use crate::sample::decode_trace;
use crate::text::{card_lines, decode_text_header, Codepage};
use crate::trace_header::{Trace, TraceHeader};
use crate::types::{ByteOrder, DataFormatCode};
use crate::utils::format_bytes;
use bytes::Bytes;
use log::{debug, warn};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Traces with at least this many samples are decoded in parallel
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

/// Reader configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Force a byte order instead of inferring it from the format code
    pub byte_order: Option<ByteOrder>,
    pub parallel_threshold: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            byte_order: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl ReaderOptions {
    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = Some(order);
        self
    }

    /// Set the sample count from which traces decode in parallel
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Reader over a SEG-Y stream
pub struct SegyReader<R> {
    inner: R,
    options: ReaderOptions,
    byte_order: ByteOrder,
    file_size: u64,
    text_header: Bytes,
    reel_header: ReelHeader,
    /// `None` when traces are not all one stride long
    layout: Option<TraceLayout>,
}

impl SegyReader<BufReader<File>> {
    /// Open a file with default options
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, ReaderOptions::default())
    }

    pub fn open_with_options(path: impl AsRef<Path>, options: ReaderOptions) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening SEG-Y file {}", path.display());
        Self::new(BufReader::new(File::open(path)?), options)
    }
}

impl<R: Read + Seek> SegyReader<R> {
    /// Read the file headers and work out the trace layout
    pub fn new(mut inner: R, options: ReaderOptions) -> Result<Self> {
        let byte_order = match options.byte_order {
            Some(order) => order,
            None => io::detect_byte_order_from(&mut inner)?,
        };
        let file_size = inner.seek(SeekFrom::End(0))?;
        if file_size < DATA_OFFSET {
            return Err(SegyError::FileTooShort { size: file_size });
        }

        inner.seek(SeekFrom::Start(0))?;
        let text_header = io::read_raw(&mut inner, TEXT_HEADER_LEN)?;
        let reel_header = io::read_reel_header(&mut inner, byte_order)?;

        if reel_header.data_format().is_none() {
            warn!(
                "Unsupported data format code {}, samples will decode as zero",
                reel_header.data_format_code
            );
        }

        let layout = match TraceLayout::new(&reel_header, byte_order, file_size) {
            Ok(layout) => Some(layout),
            Err(err) if !reel_header.is_fixed_length() => {
                debug!("Variable-length traces, random access disabled: {}", err);
                None
            }
            Err(err) => return Err(err),
        };

        if let Some(layout) = &layout {
            debug!("{} ({})", layout.summary(), format_bytes(file_size));
        }

        Ok(Self {
            inner,
            options,
            byte_order,
            file_size,
            text_header,
            reel_header,
            layout,
        })
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn reel_header(&self) -> &ReelHeader {
        &self.reel_header
    }

    /// Sample format the reader decodes with, if known
    pub fn data_format(&self) -> Option<DataFormatCode> {
        self.reel_header.data_format()
    }

    /// Raw text header bytes
    pub fn text_header_bytes(&self) -> &Bytes {
        &self.text_header
    }

    /// Text header translated through `codepage`
    pub fn text_header<C: Codepage + ?Sized>(&self, codepage: &C) -> Result<String> {
        decode_text_header(&self.text_header, codepage)
    }

    /// Fixed-stride layout, if the file has one
    pub fn layout(&self) -> Result<&TraceLayout> {
        self.layout.as_ref().ok_or_else(|| {
            SegyError::Configuration(
                "file has variable-length traces; use traces() for sequential access".to_string(),
            )
        })
    }

    pub fn trace_count(&self) -> Result<u64> {
        Ok(self.layout()?.trace_count)
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    fn is_parallel(&self, samples: usize) -> bool {
        samples >= self.options.parallel_threshold
    }

    fn seek_trace(&mut self, index: u64) -> Result<()> {
        let offset = self.layout()?.trace_offset(index)?;
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    pub fn read_trace_header(&mut self, index: u64) -> Result<TraceHeader> {
        self.seek_trace(index)?;
        io::read_trace_header(&mut self.inner, self.byte_order)
    }

    /// Undecoded sample bytes of one trace
    pub fn read_trace_bytes(&mut self, index: u64) -> Result<Bytes> {
        self.seek_trace(index)?;
        self.inner.seek(SeekFrom::Current(TRACE_HEADER_LEN as i64))?;
        let len = self.layout()?.data_len();
        io::read_raw(&mut self.inner, len)
    }

    /// Undecoded bytes of `count` consecutive samples starting at `start`
    pub fn read_sample_window(&mut self, index: u64, start: usize, count: usize) -> Result<Bytes> {
        let layout = *self.layout()?;
        let end = start.checked_add(count);
        if end.map_or(true, |end| end > layout.samples_per_trace) {
            return Err(SegyError::OutOfBounds {
                offset: start,
                len: count,
                available: layout.samples_per_trace,
            });
        }
        if count == 0 {
            return Ok(Bytes::new());
        }
        let offset = layout.sample_offset(index, start)?;
        self.inner.seek(SeekFrom::Start(offset))?;
        io::read_raw(&mut self.inner, count * layout.bytes_per_sample())
    }

    /// Decoded samples of one trace
    pub fn read_trace_data(&mut self, index: u64) -> Result<Vec<f32>> {
        let raw = self.read_trace_bytes(index)?;
        let samples = self.reel_header.samples_per_trace as usize;
        let parallel = self.is_parallel(samples);
        decode_trace(&raw, samples, self.byte_order, self.reel_header.data_format_code, parallel)
    }

    pub fn read_trace(&mut self, index: u64) -> Result<Trace> {
        let header = self.read_trace_header(index)?;
        let samples = self.read_trace_data(index)?;
        Ok(Trace::new(header, samples))
    }

    /// Every trace header, decoded in parallel after a sequential read
    pub fn read_trace_headers(&mut self) -> Result<Vec<TraceHeader>> {
        let count = self.trace_count()?;
        self.read_trace_headers_limit(count)
    }

    /// The first `limit` trace headers (fewer if the file is shorter)
    pub fn read_trace_headers_limit(&mut self, limit: u64) -> Result<Vec<TraceHeader>> {
        let layout = *self.layout()?;
        let count = limit.min(layout.trace_count);
        let mut blocks = Vec::with_capacity(count as usize);
        for index in 0..count {
            self.inner.seek(SeekFrom::Start(layout.trace_offset(index)?))?;
            let mut block = [0u8; TRACE_HEADER_LEN];
            self.inner.read_exact(&mut block)?;
            blocks.push(block);
        }
        let order = self.byte_order;
        blocks
            .par_iter()
            .map(|block| TraceHeader::decode(block, order))
            .collect()
    }

    /// Whole file as a `(samples, traces)` array
    pub fn read_section(&mut self) -> Result<Array2<f32>> {
        let layout = *self.layout()?;
        let shape = (layout.samples_per_trace, layout.trace_count as usize);
        let mut section = Array2::<f32>::zeros(shape);
        for index in 0..layout.trace_count {
            let data = self.read_trace_data(index)?;
            section
                .column_mut(index as usize)
                .assign(&Array1::from(data));
        }
        Ok(section)
    }

    /// Sequential traversal from the first trace.
    ///
    /// When the fixed-length flag is 0, each trace's own sample count (if
    /// nonzero) decides how far to advance.
    pub fn traces(&mut self) -> TraceIter<'_, R> {
        TraceIter {
            offset: DATA_OFFSET,
            reader: self,
            done: false,
        }
    }

    /// Collect what was learned about the file
    pub fn summary(&mut self) -> Result<FileSummary> {
        let trace_count = self.layout.map(|l| l.trace_count);
        let first_trace_delay_ms = match trace_count {
            Some(0) => None,
            Some(_) => Some(self.read_trace_header(0)?.delay_recording_time),
            None => match self.traces().next() {
                Some(trace) => Some(trace?.header.delay_recording_time),
                None => None,
            },
        };
        let text = self.text_header(&crate::text::Ascii)?;
        Ok(FileSummary {
            file_size: self.file_size,
            byte_order: self.byte_order,
            format_code: self.reel_header.data_format_code,
            revision: self.reel_header.revision_number,
            fixed_length: self.reel_header.is_fixed_length(),
            sample_interval_us: self.reel_header.sample_interval,
            samples_per_trace: self.reel_header.samples_per_trace,
            trace_count,
            first_trace_delay_ms,
            text_header: card_lines(&text)
                .into_iter()
                .filter(|line| !line.is_empty())
                .collect(),
        })
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Iterator returned by [`SegyReader::traces`]
pub struct TraceIter<'a, R> {
    reader: &'a mut SegyReader<R>,
    offset: u64,
    done: bool,
}

impl<R: Read + Seek> TraceIter<'_, R> {
    fn read_next(&mut self) -> Result<Trace> {
        let reader = &mut *self.reader;
        reader.inner.seek(SeekFrom::Start(self.offset))?;
        let header = io::read_trace_header(&mut reader.inner, reader.byte_order)?;

        let samples = if !reader.reel_header.is_fixed_length() && header.samples_this_trace != 0 {
            header.samples_this_trace as usize
        } else {
            reader.reel_header.samples_per_trace as usize
        };
        let code = reader.reel_header.data_format_code;
        let parallel = reader.is_parallel(samples);
        let data =
            io::read_trace_data(&mut reader.inner, samples, reader.byte_order, code, parallel)?;

        self.offset += (TRACE_HEADER_LEN + samples * crate::layout::bytes_per_sample(code)) as u64;
        Ok(Trace::new(header, data))
    }
}

impl<R: Read + Seek> Iterator for TraceIter<'_, R> {
    type Item = Result<Trace>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.reader.file_size {
            return None;
        }
        let item = self.read_next();
        if item.is_err() {
            self.done = true;
        }
        Some(item)
    }
}

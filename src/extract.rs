//! Windowed and resampled trace extraction.
//!
//! Copies a selection of traces from one file to another, keeping only the
//! samples between two times and optionally decimating them. Sample bytes are
//! copied without decoding, so the output keeps the source byte order and
//! format code.

use crate::error::{Result, SegyError};
use crate::reader::SegyReader;
use crate::utils::ms_to_us;
use crate::writer::{SegyWriter, WriterOptions};
use bytes::Bytes;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::ops::RangeInclusive;
use std::path::Path;

/// What to extract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// 0-based trace indices, in output order
    pub traces: Vec<u64>,
    /// Time of the first output sample, a whole millisecond on every
    /// selected trace's sample grid
    pub min_time_ms: f64,
    /// Latest time an output sample may have
    pub max_time_ms: f64,
    /// Output sample interval; a whole multiple of the source interval
    pub step_time_ms: f64,
}

impl ExtractOptions {
    pub fn new(min_time_ms: f64, max_time_ms: f64, step_time_ms: f64) -> Self {
        Self {
            traces: Vec::new(),
            min_time_ms,
            max_time_ms,
            step_time_ms,
        }
    }

    pub fn with_traces(mut self, traces: impl IntoIterator<Item = u64>) -> Self {
        self.traces = traces.into_iter().collect();
        self
    }

    /// Select a contiguous, inclusive range of trace indices
    pub fn with_trace_range(self, range: RangeInclusive<u64>) -> Self {
        self.with_traces(range)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Window bounds and step in whole microseconds
    fn window_us(&self) -> Result<(i64, i64, i64)> {
        let (min, max, step) = (
            ms_to_us(self.min_time_ms),
            ms_to_us(self.max_time_ms),
            ms_to_us(self.step_time_ms),
        );
        if step <= 0 {
            return Err(SegyError::InvalidWindow(format!(
                "step must be positive, got {} ms",
                self.step_time_ms
            )));
        }
        if min > max {
            return Err(SegyError::InvalidWindow(format!(
                "min time {} ms is after max time {} ms",
                self.min_time_ms, self.max_time_ms
            )));
        }
        Ok((min, max, step))
    }
}

/// Geometry of an extracted file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractSummary {
    pub traces_written: u64,
    pub samples_per_trace: u16,
    pub sample_interval_us: u16,
    /// Recording delay written to every output trace header
    pub delay_ms: i16,
}

/// Copy the selected window of `reader`'s traces to `output`
pub fn extract<R, W>(
    reader: &mut SegyReader<R>,
    output: &mut W,
    options: &ExtractOptions,
) -> Result<ExtractSummary>
where
    R: Read + Seek,
    W: Write,
{
    let (min_us, max_us, step_us) = options.window_us()?;
    let layout = *reader.layout()?;
    let mut reel = reader.reel_header().clone();

    let src_us = reel.sample_interval as i64;
    if src_us == 0 {
        return Err(SegyError::InvalidWindow("source sample interval is zero".to_string()));
    }
    if step_us % src_us != 0 {
        return Err(SegyError::InvalidWindow(format!(
            "step {} us is not a multiple of the source interval {} us",
            step_us, src_us
        )));
    }
    let ratio = (step_us / src_us) as usize;

    let out_samples = u16::try_from((max_us - min_us) / step_us + 1)
        .map_err(|_| SegyError::InvalidWindow("window holds too many samples".to_string()))?;
    let out_interval = u16::try_from(step_us)
        .map_err(|_| SegyError::InvalidWindow(format!("step {} us does not fit", step_us)))?;
    // trace headers store the delay in whole milliseconds
    if min_us % 1000 != 0 {
        return Err(SegyError::InvalidWindow(format!(
            "min time {} ms is not a whole millisecond",
            options.min_time_ms
        )));
    }
    let delay_ms = i16::try_from(min_us / 1000).map_err(|_| {
        SegyError::InvalidWindow(format!("min time {} ms does not fit", options.min_time_ms))
    })?;

    reel.sample_interval = out_interval;
    reel.samples_per_trace = out_samples;

    debug!(
        "Extracting {} traces: {}..={} us every {} us ({} samples, decimation {})",
        options.traces.len(),
        min_us,
        max_us,
        step_us,
        out_samples,
        ratio
    );

    let mut writer = SegyWriter::new(&mut *output, reader.byte_order(), WriterOptions::default());
    writer.write_text_header_bytes(reader.text_header_bytes())?;
    writer.write_reel_header(&reel)?;

    let width = layout.bytes_per_sample();
    for &index in &options.traces {
        let mut header = reader.read_trace_header(index)?;
        let delay_us = header.delay_recording_time as i64 * 1000;
        let offset_us = min_us - delay_us;
        if offset_us.rem_euclid(src_us) != 0 {
            return Err(SegyError::InvalidWindow(format!(
                "trace {}: min time {} us falls between samples ({} us delay, {} us interval)",
                index, min_us, delay_us, src_us
            )));
        }
        let start = offset_us / src_us;
        let end = start + (out_samples as i64 - 1) * ratio as i64;
        if start < 0 || end >= layout.samples_per_trace as i64 {
            return Err(SegyError::InvalidWindow(format!(
                "trace {} holds samples 0..{}, window needs {}..={}",
                index, layout.samples_per_trace, start, end
            )));
        }
        let (start, end) = (start as usize, end as usize);

        let raw = reader.read_sample_window(index, start, end - start + 1)?;
        let data = if ratio == 1 {
            raw
        } else {
            Bytes::from(
                raw.chunks_exact(width)
                    .step_by(ratio)
                    .flatten()
                    .copied()
                    .collect::<Vec<u8>>(),
            )
        };

        let produced = data.len() / width;
        if produced != out_samples as usize {
            return Err(SegyError::SampleCountMismatch {
                expected: out_samples as usize,
                actual: produced,
            });
        }

        header.delay_recording_time = delay_ms;
        header.sample_interval = out_interval;
        header.samples_this_trace = out_samples;
        writer.write_trace_bytes(&header, &data)?;
        trace!("trace {}: samples {}..={} -> {} bytes", index, start, end, data.len());
    }

    let traces_written = writer.traces_written();
    writer.finish()?;
    Ok(ExtractSummary {
        traces_written,
        samples_per_trace: out_samples,
        sample_interval_us: out_interval,
        delay_ms,
    })
}

/// File-to-file extraction
pub fn extract_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<ExtractSummary> {
    let mut reader = SegyReader::open(input)?;
    let mut out = BufWriter::new(File::create(output.as_ref())?);
    let summary = extract(&mut reader, &mut out, options)?;
    out.flush()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ReaderOptions;
    use crate::reel::ReelHeader;
    use crate::text::Ascii;
    use crate::trace_header::TraceHeader;
    use crate::types::{ByteOrder, DataFormatCode};
    use std::io::Cursor;

    /// 10 traces x 100 samples at 1 ms; sample `s` of trace `t` is `t * 1000 + s`
    fn source(format: DataFormatCode, delays: &[i16]) -> SegyReader<Cursor<Vec<u8>>> {
        let mut w = SegyWriter::new(Vec::new(), ByteOrder::BigEndian, WriterOptions::default());
        w.write_text_header("C 1 EXTRACT SOURCE", &Ascii).unwrap();
        w.write_reel_header(&ReelHeader::new(1000, 100, format)).unwrap();
        for t in 0..10u32 {
            let mut header = TraceHeader::new(t + 1, 1000, 100);
            header.delay_recording_time = delays.get(t as usize).copied().unwrap_or(0);
            let data: Vec<f32> = (0..100).map(|s| (t * 1000 + s) as f32).collect();
            w.write_trace(&header, &data).unwrap();
        }
        let bytes = w.finish().unwrap();
        SegyReader::new(Cursor::new(bytes), ReaderOptions::default()).unwrap()
    }

    /// One trace whose sample `s` holds `s`
    fn single_trace(interval_us: u16, samples: u16) -> SegyReader<Cursor<Vec<u8>>> {
        let mut w = SegyWriter::new(Vec::new(), ByteOrder::BigEndian, WriterOptions::default());
        w.write_text_header("", &Ascii).unwrap();
        let reel = ReelHeader::new(interval_us, samples, DataFormatCode::IeeeFloat);
        w.write_reel_header(&reel).unwrap();
        let data: Vec<f32> = (0..samples).map(|s| s as f32).collect();
        w.write_trace(&TraceHeader::new(1, interval_us, samples), &data).unwrap();
        let bytes = w.finish().unwrap();
        SegyReader::new(Cursor::new(bytes), ReaderOptions::default()).unwrap()
    }

    fn run(
        reader: &mut SegyReader<Cursor<Vec<u8>>>,
        options: &ExtractOptions,
    ) -> Result<(ExtractSummary, SegyReader<Cursor<Vec<u8>>>)> {
        let mut out = Vec::new();
        let summary = extract(reader, &mut out, options)?;
        let extracted = SegyReader::new(Cursor::new(out), ReaderOptions::default())?;
        Ok((summary, extracted))
    }

    #[test]
    fn test_window_same_interval() {
        let mut reader = source(DataFormatCode::IbmFloat, &[]);
        let options = ExtractOptions::new(10.0, 20.0, 1.0).with_trace_range(2..=5);
        let (summary, mut out) = run(&mut reader, &options).unwrap();

        assert_eq!(summary.traces_written, 4);
        assert_eq!(summary.samples_per_trace, 11);
        assert_eq!(out.trace_count().unwrap(), 4);
        assert_eq!(out.reel_header().samples_per_trace, 11);
        assert_eq!(out.reel_header().sample_interval, 1000);
        assert_eq!(out.text_header_bytes(), reader.text_header_bytes());

        for i in 0..4u64 {
            let trace = out.read_trace(i).unwrap();
            assert_eq!(trace.header.delay_recording_time, 10);
            assert_eq!(trace.header.sample_interval, 1000);
            assert_eq!(trace.header.samples_this_trace, 11);
            let t = (i + 2) as f32;
            let expected: Vec<f32> = (10..=20).map(|s| t * 1000.0 + s as f32).collect();
            assert_eq!(trace.samples, expected);
        }
    }

    #[test]
    fn test_decimation() {
        let mut reader = source(DataFormatCode::Int16, &[]);
        let options = ExtractOptions::new(0.0, 10.0, 2.0).with_traces([7, 1]);
        let (summary, mut out) = run(&mut reader, &options).unwrap();
        assert_eq!(summary.samples_per_trace, 6);
        assert_eq!(summary.sample_interval_us, 2000);
        assert_eq!(
            out.read_trace_data(0).unwrap(),
            vec![7000.0, 7002.0, 7004.0, 7006.0, 7008.0, 7010.0]
        );
        assert_eq!(
            out.read_trace_data(1).unwrap(),
            vec![1000.0, 1002.0, 1004.0, 1006.0, 1008.0, 1010.0]
        );
    }

    #[test]
    fn test_per_trace_delay() {
        let mut reader = source(DataFormatCode::IeeeFloat, &[0, 5]);
        let options = ExtractOptions::new(10.0, 12.0, 1.0).with_traces([0, 1]);
        let (_, mut out) = run(&mut reader, &options).unwrap();
        assert_eq!(out.read_trace_data(0).unwrap(), vec![10.0, 11.0, 12.0]);
        assert_eq!(out.read_trace_data(1).unwrap(), vec![1005.0, 1006.0, 1007.0]);
    }

    #[test]
    fn test_invalid_windows() {
        let mut reader = source(DataFormatCode::IbmFloat, &[]);
        let cases = [
            ExtractOptions::new(10.0, 20.0, 1.5),
            ExtractOptions::new(10.0, 20.0, 0.0),
            ExtractOptions::new(20.0, 10.0, 1.0),
            ExtractOptions::new(90.0, 120.0, 1.0),
        ];
        for options in cases {
            let options = options.with_traces([0]);
            assert!(
                matches!(run(&mut reader, &options), Err(SegyError::InvalidWindow(_))),
                "{:?}",
                options
            );
        }

        let options = ExtractOptions::new(0.0, 1.0, 1.0).with_traces([10]);
        assert!(matches!(
            run(&mut reader, &options),
            Err(SegyError::TraceIndexOutOfRange { index: 10, count: 10 })
        ));
    }

    #[test]
    fn test_min_time_between_samples() {
        let mut reader = source(DataFormatCode::IeeeFloat, &[]);
        for (min, max) in [(10.5, 20.5), (10.5, 20.0)] {
            let options = ExtractOptions::new(min, max, 1.0).with_traces([0]);
            assert!(
                matches!(run(&mut reader, &options), Err(SegyError::InvalidWindow(_))),
                "{}..={}",
                min,
                max
            );
        }

        // on a 0.5 ms grid but not expressible as a whole-millisecond delay
        let mut half_ms = single_trace(500, 40);
        let options = ExtractOptions::new(10.5, 15.0, 0.5).with_traces([0]);
        assert!(matches!(
            run(&mut half_ms, &options),
            Err(SegyError::InvalidWindow(_))
        ));

        // whole milliseconds that fall between 2 ms samples
        let mut two_ms = single_trace(2000, 40);
        let options = ExtractOptions::new(11.0, 21.0, 2.0).with_traces([0]);
        assert!(matches!(
            run(&mut two_ms, &options),
            Err(SegyError::InvalidWindow(_))
        ));
        let options = ExtractOptions::new(12.0, 21.0, 2.0).with_traces([0]);
        let (summary, mut out) = run(&mut two_ms, &options).unwrap();
        assert_eq!(summary.samples_per_trace, 5);
        assert_eq!(out.read_trace_data(0).unwrap(), vec![6.0, 7.0, 8.0, 9.0, 10.0]);
    }

    #[test]
    fn test_max_time_between_samples() {
        let mut reader = source(DataFormatCode::IeeeFloat, &[]);
        let options = ExtractOptions::new(10.0, 20.5, 1.0).with_traces([3]);
        let (summary, mut out) = run(&mut reader, &options).unwrap();
        assert_eq!(summary.samples_per_trace, 11);
        let trace = out.read_trace(0).unwrap();
        assert_eq!(trace.header.delay_recording_time, 10);
        assert_eq!(trace.sample_time_ms(0), 10.0);
        let expected: Vec<f32> = (10..=20).map(|s| 3000.0 + s as f32).collect();
        assert_eq!(trace.samples, expected);
    }

    #[test]
    fn test_delay_before_window_start() {
        let mut reader = source(DataFormatCode::IbmFloat, &[50]);
        let options = ExtractOptions::new(10.0, 20.0, 1.0).with_traces([0]);
        assert!(matches!(run(&mut reader, &options), Err(SegyError::InvalidWindow(_))));
    }

    #[test]
    fn test_options_json() {
        let options = ExtractOptions::new(10.0, 20.0, 1.0).with_trace_range(2..=5);
        let json = options.to_json().unwrap();
        assert_eq!(ExtractOptions::from_json(&json).unwrap(), options);
        let parsed = ExtractOptions::from_json(
            r#"{"traces":[1,3],"min_time_ms":0,"max_time_ms":4,"step_time_ms":2}"#,
        )
        .unwrap();
        assert_eq!(parsed.traces, vec![1, 3]);
        assert!(ExtractOptions::from_json(r#"{"traces":[]}"#).is_err());
    }
}

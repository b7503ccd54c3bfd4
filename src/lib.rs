//! segyio - SEG-Y reading and writing
//!
//! A pure Rust codec for the SEG-Y seismic trace container: a 3200-byte text
//! header, a 400-byte binary reel header and a run of traces, each a 240-byte
//! trace header followed by samples.
//!
//! # Features
//!
//! - Byte order inferred from the stored data format code
//! - IBM hexadecimal float, IEEE float and 8/16/32-bit integer samples
//! - Declarative field tables for the reel and trace headers, with named access
//! - Random access by trace index, batch header reads and whole-section reads
//! - Windowed, decimated extraction of traces into a new file
//! - Parallel sample decoding for long traces
//!
//! # Example
//!
//! ```rust,no_run
//! use segyio::{ExtractOptions, SegyReader};
//!
//! # fn example() -> segyio::Result<()> {
//! let mut reader = SegyReader::open("line.sgy")?;
//! println!("{}", reader.summary()?);
//!
//! let trace = reader.read_trace(0)?;
//! println!("{} samples, inline {}", trace.samples.len(), trace.header.inline);
//!
//! let options = ExtractOptions::new(1000.0, 2000.0, 4.0).with_trace_range(0..=99);
//! segyio::extract_file("line.sgy", "window.sgy", &options)?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod extract;
pub mod field;
pub mod ibm;
pub mod io;
pub mod layout;
pub mod metadata;
pub mod primitive;
pub mod reader;
pub mod reel;
pub mod sample;
pub mod select;
pub mod swap;
pub mod text;
pub mod trace_header;
pub mod types;
pub mod utils;
pub mod writer;

// Re-exports
pub use error::{Result, SegyError};
pub use extract::{extract, extract_file, ExtractOptions, ExtractSummary};
pub use field::{FieldKind, FieldSpec, Reserved};
pub use io::detect_byte_order;
pub use layout::{bytes_per_sample, TraceLayout};
pub use metadata::FileSummary;
pub use reader::{ReaderOptions, SegyReader};
pub use reel::{ReelHeader, REEL_HEADER_FIELDS};
pub use text::{Ascii, Codepage, FnCodepage};
pub use trace_header::{Trace, TraceHeader, TRACE_HEADER_FIELDS};
pub use types::{ByteOrder, DataFormatCode};
pub use writer::{SegyWriter, WriterOptions};

/// Version of the segyio implementation
pub const SEGYIO_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!SEGYIO_VERSION.is_empty());
    }
}

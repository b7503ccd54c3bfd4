//! The 400-byte binary reel header

use crate::error::Result;
use crate::field::{decode_fields, encode_fields, field_table, find_field, FieldSpec, Reserved};
use crate::layout::REEL_HEADER_LEN;
use crate::primitive::{read_array, write_bytes};
use crate::types::{ByteOrder, DataFormatCode};
use serde::{Deserialize, Serialize};

const UNASSIGNED1_OFFSET: usize = 60;
const UNASSIGNED2_OFFSET: usize = 306;

/// File-wide acquisition and format parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelHeader {
    pub job_id: i32,
    pub line_number: i32,
    pub reel_number: i32,
    pub traces_per_record: u16,
    pub aux_traces_per_record: u16,
    /// Sample interval in microseconds
    pub sample_interval: u16,
    pub orig_sample_interval: u16,
    pub samples_per_trace: u16,
    pub orig_samples_per_trace: u16,
    /// Raw [`DataFormatCode`]
    pub data_format_code: u16,
    pub cmp_fold: u16,
    pub trace_sort_code: u16,
    pub vertical_sum_code: u16,
    pub sweep_start_freq: u16,
    pub sweep_end_freq: u16,
    pub sweep_length: u16,
    pub sweep_type_code: u16,
    pub sweep_trace_number: u16,
    pub sweep_taper_start: u16,
    pub sweep_taper_end: u16,
    pub taper_type: u16,
    pub correlated_traces: u16,
    pub binary_gain_recovered: u16,
    pub amplitude_recovery: u16,
    /// 1 = meters, 2 = feet
    pub measurement_system: u16,
    pub impulse_polarity: u16,
    pub vibratory_polarity: u16,
    pub unassigned1: Reserved<240>,
    pub revision_number: u16,
    /// 1 when every trace has `samples_per_trace` samples
    pub fixed_length_trace_flag: u16,
    pub extended_text_headers: u16,
    pub unassigned2: Reserved<94>,
}

field_table! {
    /// Byte layout of [`ReelHeader`], relative to the start of the block
    REEL_HEADER_FIELDS: ReelHeader {
        job_id @ 0: I32,
        line_number @ 4: I32,
        reel_number @ 8: I32,
        traces_per_record @ 12: U16,
        aux_traces_per_record @ 14: U16,
        sample_interval @ 16: U16,
        orig_sample_interval @ 18: U16,
        samples_per_trace @ 20: U16,
        orig_samples_per_trace @ 22: U16,
        data_format_code @ 24: U16,
        cmp_fold @ 26: U16,
        trace_sort_code @ 28: U16,
        vertical_sum_code @ 30: U16,
        sweep_start_freq @ 32: U16,
        sweep_end_freq @ 34: U16,
        sweep_length @ 36: U16,
        sweep_type_code @ 38: U16,
        sweep_trace_number @ 40: U16,
        sweep_taper_start @ 42: U16,
        sweep_taper_end @ 44: U16,
        taper_type @ 46: U16,
        correlated_traces @ 48: U16,
        binary_gain_recovered @ 50: U16,
        amplitude_recovery @ 52: U16,
        measurement_system @ 54: U16,
        impulse_polarity @ 56: U16,
        vibratory_polarity @ 58: U16,
        revision_number @ 300: U16,
        fixed_length_trace_flag @ 302: U16,
        extended_text_headers @ 304: U16,
    }
}

impl Default for ReelHeader {
    fn default() -> Self {
        Self {
            job_id: 1,
            line_number: 1,
            reel_number: 1,
            traces_per_record: 1,
            aux_traces_per_record: 0,
            sample_interval: 1000,
            orig_sample_interval: 0,
            samples_per_trace: 0,
            orig_samples_per_trace: 0,
            data_format_code: DataFormatCode::IbmFloat.code(),
            cmp_fold: 0,
            trace_sort_code: 0,
            vertical_sum_code: 0,
            sweep_start_freq: 0,
            sweep_end_freq: 0,
            sweep_length: 0,
            sweep_type_code: 0,
            sweep_trace_number: 0,
            sweep_taper_start: 0,
            sweep_taper_end: 0,
            taper_type: 0,
            correlated_traces: 0,
            binary_gain_recovered: 0,
            amplitude_recovery: 0,
            measurement_system: 1,
            impulse_polarity: 0,
            vibratory_polarity: 0,
            unassigned1: Reserved::default(),
            revision_number: 0,
            fixed_length_trace_flag: 1,
            extended_text_headers: 0,
            unassigned2: Reserved::default(),
        }
    }
}

impl ReelHeader {
    /// Header for a fixed-length file with the given geometry
    pub fn new(sample_interval: u16, samples_per_trace: u16, format: DataFormatCode) -> Self {
        Self {
            sample_interval,
            samples_per_trace,
            data_format_code: format.code(),
            ..Default::default()
        }
    }

    /// Decode from a buffer holding at least 400 bytes
    pub fn decode(buf: &[u8], order: ByteOrder) -> Result<Self> {
        let mut header = Self::default();
        decode_fields(REEL_HEADER_FIELDS, buf, order, &mut header)?;
        header.unassigned1 = Reserved(read_array(buf, UNASSIGNED1_OFFSET)?.0);
        header.unassigned2 = Reserved(read_array(buf, UNASSIGNED2_OFFSET)?.0);
        Ok(header)
    }

    /// Encode into a fresh 400-byte block
    pub fn encode(&self, order: ByteOrder) -> Result<[u8; REEL_HEADER_LEN]> {
        let mut buf = [0u8; REEL_HEADER_LEN];
        self.encode_into(&mut buf, order)?;
        Ok(buf)
    }

    /// Encode into the first 400 bytes of `buf`
    pub fn encode_into(&self, buf: &mut [u8], order: ByteOrder) -> Result<()> {
        encode_fields(REEL_HEADER_FIELDS, self, order, buf)?;
        write_bytes(buf, UNASSIGNED1_OFFSET, self.unassigned1.as_bytes())?;
        write_bytes(buf, UNASSIGNED2_OFFSET, self.unassigned2.as_bytes())?;
        Ok(())
    }

    /// The sample format, if the stored code is one this crate understands
    pub fn data_format(&self) -> Option<DataFormatCode> {
        DataFormatCode::from_code(self.data_format_code)
    }

    pub fn is_fixed_length(&self) -> bool {
        self.fixed_length_trace_flag != 0
    }

    /// Value of a named field
    pub fn field(&self, name: &str) -> Result<i64> {
        Ok((find_field(REEL_HEADER_FIELDS, name)?.get)(self))
    }

    /// Overwrite a named field; the value wraps to the field's width
    pub fn set_field(&mut self, name: &str, value: i64) -> Result<()> {
        (find_field(REEL_HEADER_FIELDS, name)?.set)(self, value);
        Ok(())
    }

    /// Field table for this header
    pub fn fields() -> &'static [FieldSpec<ReelHeader>] {
        REEL_HEADER_FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SegyError;
    use crate::field::assert_tiles;

    fn populated() -> ReelHeader {
        let mut header = ReelHeader::new(2000, 1501, DataFormatCode::IeeeFloat);
        header.job_id = -7;
        header.line_number = 123_456;
        header.reel_number = i32::MAX;
        header.cmp_fold = 48;
        header.trace_sort_code = 4;
        header.sweep_end_freq = u16::MAX;
        header.vibratory_polarity = 3;
        header.revision_number = 0x0100;
        header.extended_text_headers = 2;
        for (i, b) in header.unassigned1.0.iter_mut().enumerate() {
            *b = i as u8;
        }
        header.unassigned2.0[0] = 0xAA;
        header.unassigned2.0[93] = 0x55;
        header
    }

    #[test]
    fn test_layout_covers_block() {
        assert_tiles(
            REEL_HEADER_FIELDS,
            &[(UNASSIGNED1_OFFSET, 240), (UNASSIGNED2_OFFSET, 94)],
            REEL_HEADER_LEN,
        );
    }

    #[test]
    fn test_round_trip_both_orders() {
        let header = populated();
        for order in [ByteOrder::BigEndian, ByteOrder::LittleEndian] {
            let bytes = header.encode(order).unwrap();
            assert_eq!(ReelHeader::decode(&bytes, order).unwrap(), header);
        }
    }

    #[test]
    fn test_well_known_offsets() {
        let bytes = populated().encode(ByteOrder::BigEndian).unwrap();
        assert_eq!(&bytes[16..18], &2000u16.to_be_bytes());
        assert_eq!(&bytes[20..22], &1501u16.to_be_bytes());
        assert_eq!(&bytes[24..26], &[0, 5]);
        assert_eq!(bytes[60], 0);
        assert_eq!(bytes[61], 1);
        assert_eq!(bytes[306], 0xAA);
        assert_eq!(bytes[399], 0x55);

        let little = populated().encode(ByteOrder::LittleEndian).unwrap();
        assert_eq!(&little[24..26], &[5, 0]);
    }

    #[test]
    fn test_defaults() {
        let header = ReelHeader::default();
        assert_eq!(header.sample_interval, 1000);
        assert_eq!(header.data_format(), Some(DataFormatCode::IbmFloat));
        assert!(header.is_fixed_length());
        assert!(header.unassigned1.is_zeroed());
    }

    #[test]
    fn test_named_fields() {
        let mut header = ReelHeader::default();
        header.set_field("samples_per_trace", 250).unwrap();
        assert_eq!(header.samples_per_trace, 250);
        assert_eq!(header.field("SAMPLE_INTERVAL").unwrap(), 1000);
        assert!(matches!(
            header.field("unassigned1"),
            Err(SegyError::UnknownField(_))
        ));
        let spec = ReelHeader::fields()
            .iter()
            .find(|f| f.name == "data_format_code")
            .unwrap();
        assert_eq!(spec.byte_range(), (25, 26));
    }

    #[test]
    fn test_short_buffer() {
        assert!(ReelHeader::decode(&[0u8; 399], ByteOrder::BigEndian).is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let header = populated();
        let json = serde_json::to_string(&header).unwrap();
        let back: ReelHeader = serde_json::from_str(&json).unwrap();
        assert_eq!(back, header);
    }
}

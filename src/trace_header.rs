//! The 240-byte trace header

use crate::error::{Result, SegyError};
use crate::field::{decode_fields, encode_fields, field_table, find_field, FieldSpec, Reserved};
use crate::layout::TRACE_HEADER_LEN;
use crate::primitive::{read_array, write_bytes};
use crate::types::ByteOrder;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

const SPARE_OFFSET: usize = 232;

/// Per-trace geometry, timing and scaling
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceHeader {
    /// Trace sequence number within the line
    pub trace_sequence_line: u32,
    /// Trace sequence number within the file
    pub trace_sequence_file: u32,
    /// Original field record number
    pub field_record: u32,
    pub trace_in_field_record: u32,
    pub energy_source_point: u32,
    /// Ensemble (CDP/CMP) number
    pub cdp: u32,
    pub trace_in_cdp: u32,
    /// 1 = seismic data, 2 = dead, 3 = dummy
    pub trace_id_code: u16,
    pub vertical_sum_count: u16,
    pub horizontal_stack_count: u16,
    pub data_use: u16,
    /// Distance from source to receiver group
    pub source_receiver_offset: i32,
    pub receiver_elevation: i32,
    pub source_elevation: i32,
    pub source_depth: i32,
    pub receiver_datum_elevation: i32,
    pub source_datum_elevation: i32,
    pub source_water_depth: i32,
    pub receiver_water_depth: i32,
    /// Scalar for elevations and depths; negative divides
    pub elevation_scalar: i16,
    /// Scalar for coordinates; negative divides
    pub coordinate_scalar: i16,
    pub source_x: i32,
    pub source_y: i32,
    pub receiver_x: i32,
    pub receiver_y: i32,
    /// 1 = length, 2 = arc seconds
    pub coordinate_units: u16,
    pub weathering_velocity: i16,
    pub subweathering_velocity: i16,
    pub source_uphole_time: i16,
    pub receiver_uphole_time: i16,
    pub source_static: i16,
    pub receiver_static: i16,
    pub total_static: i16,
    pub lag_time_a: i16,
    pub lag_time_b: i16,
    /// Delay between time break and first sample, in ms
    pub delay_recording_time: i16,
    pub mute_start: i16,
    pub mute_end: i16,
    /// Number of samples in this trace
    pub samples_this_trace: u16,
    /// Sample interval in microseconds
    pub sample_interval: u16,
    pub gain_type: u16,
    pub gain_constant: i16,
    pub initial_gain: i16,
    pub correlated: u16,
    pub sweep_start_freq: i16,
    pub sweep_end_freq: i16,
    pub sweep_length: i16,
    pub sweep_type: u16,
    pub sweep_taper_start: i16,
    pub sweep_taper_end: i16,
    pub taper_type: i16,
    pub alias_filter_freq: i16,
    pub alias_filter_slope: i16,
    pub notch_filter_freq: i16,
    pub notch_filter_slope: i16,
    pub low_cut_freq: i16,
    pub high_cut_freq: i16,
    pub low_cut_slope: i16,
    pub high_cut_slope: i16,
    pub year: u16,
    /// Day of year (1-366)
    pub day_of_year: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    /// 1 = local, 2 = GMT, 3 = other
    pub time_basis_code: u16,
    pub trace_weighting_factor: i16,
    pub geophone_roll_position: i16,
    pub geophone_first_trace: i16,
    pub geophone_last_trace: i16,
    pub gap_size: i16,
    pub over_travel: u16,
    /// Ensemble X coordinate
    pub cdp_x: i32,
    /// Ensemble Y coordinate
    pub cdp_y: i32,
    /// 3-D inline number
    pub inline: i32,
    /// 3-D crossline number
    pub crossline: i32,
    pub shotpoint: i32,
    pub shotpoint_scalar: i16,
    pub trace_value_unit: i16,
    pub transduction_constant_mantissa: i32,
    pub transduction_constant_exponent: i16,
    pub transduction_unit: i16,
    pub device_trace_id: i16,
    pub time_scalar: i16,
    pub source_type: i16,
    pub source_energy_direction_a: i16,
    pub source_energy_direction_b: i32,
    pub source_measurement_mantissa: i32,
    pub source_measurement_exponent: i16,
    pub source_measurement_unit: i16,
    pub spare: Reserved<8>,
}

field_table! {
    /// Byte layout of [`TraceHeader`], relative to the start of the block
    TRACE_HEADER_FIELDS: TraceHeader {
        trace_sequence_line @ 0: U32,
        trace_sequence_file @ 4: U32,
        field_record @ 8: U32,
        trace_in_field_record @ 12: U32,
        energy_source_point @ 16: U32,
        cdp @ 20: U32,
        trace_in_cdp @ 24: U32,
        trace_id_code @ 28: U16,
        vertical_sum_count @ 30: U16,
        horizontal_stack_count @ 32: U16,
        data_use @ 34: U16,
        source_receiver_offset @ 36: I32,
        receiver_elevation @ 40: I32,
        source_elevation @ 44: I32,
        source_depth @ 48: I32,
        receiver_datum_elevation @ 52: I32,
        source_datum_elevation @ 56: I32,
        source_water_depth @ 60: I32,
        receiver_water_depth @ 64: I32,
        elevation_scalar @ 68: I16,
        coordinate_scalar @ 70: I16,
        source_x @ 72: I32,
        source_y @ 76: I32,
        receiver_x @ 80: I32,
        receiver_y @ 84: I32,
        coordinate_units @ 88: U16,
        weathering_velocity @ 90: I16,
        subweathering_velocity @ 92: I16,
        source_uphole_time @ 94: I16,
        receiver_uphole_time @ 96: I16,
        source_static @ 98: I16,
        receiver_static @ 100: I16,
        total_static @ 102: I16,
        lag_time_a @ 104: I16,
        lag_time_b @ 106: I16,
        delay_recording_time @ 108: I16,
        mute_start @ 110: I16,
        mute_end @ 112: I16,
        samples_this_trace @ 114: U16,
        sample_interval @ 116: U16,
        gain_type @ 118: U16,
        gain_constant @ 120: I16,
        initial_gain @ 122: I16,
        correlated @ 124: U16,
        sweep_start_freq @ 126: I16,
        sweep_end_freq @ 128: I16,
        sweep_length @ 130: I16,
        sweep_type @ 132: U16,
        sweep_taper_start @ 134: I16,
        sweep_taper_end @ 136: I16,
        taper_type @ 138: I16,
        alias_filter_freq @ 140: I16,
        alias_filter_slope @ 142: I16,
        notch_filter_freq @ 144: I16,
        notch_filter_slope @ 146: I16,
        low_cut_freq @ 148: I16,
        high_cut_freq @ 150: I16,
        low_cut_slope @ 152: I16,
        high_cut_slope @ 154: I16,
        year @ 156: U16,
        day_of_year @ 158: U16,
        hour @ 160: U16,
        minute @ 162: U16,
        second @ 164: U16,
        time_basis_code @ 166: U16,
        trace_weighting_factor @ 168: I16,
        geophone_roll_position @ 170: I16,
        geophone_first_trace @ 172: I16,
        geophone_last_trace @ 174: I16,
        gap_size @ 176: I16,
        over_travel @ 178: U16,
        cdp_x @ 180: I32,
        cdp_y @ 184: I32,
        inline @ 188: I32,
        crossline @ 192: I32,
        shotpoint @ 196: I32,
        shotpoint_scalar @ 200: I16,
        trace_value_unit @ 202: I16,
        transduction_constant_mantissa @ 204: I32,
        transduction_constant_exponent @ 208: I16,
        transduction_unit @ 210: I16,
        device_trace_id @ 212: I16,
        time_scalar @ 214: I16,
        source_type @ 216: I16,
        source_energy_direction_a @ 218: I16,
        source_energy_direction_b @ 220: I32,
        source_measurement_mantissa @ 224: I32,
        source_measurement_exponent @ 228: I16,
        source_measurement_unit @ 230: I16,
    }
}

/// Apply a SEG-Y scalar: positive multiplies, negative divides, zero is identity
pub fn apply_scalar(value: i32, scalar: i16) -> f64 {
    match scalar {
        0 => value as f64,
        s if s > 0 => value as f64 * s as f64,
        s => value as f64 / -(s as f64),
    }
}

impl TraceHeader {
    /// Header for trace `trace_number` of a freshly written file
    pub fn new(trace_number: u32, sample_interval: u16, samples: u16) -> Self {
        Self {
            trace_sequence_line: trace_number,
            trace_sequence_file: trace_number,
            field_record: 1,
            trace_in_field_record: trace_number,
            cdp: trace_number,
            trace_in_cdp: trace_number,
            trace_id_code: 1,
            vertical_sum_count: 1,
            horizontal_stack_count: 1,
            data_use: 1,
            samples_this_trace: samples,
            sample_interval,
            gain_type: 1,
            ..Default::default()
        }
    }

    /// Decode from a buffer holding at least 240 bytes
    pub fn decode(buf: &[u8], order: ByteOrder) -> Result<Self> {
        if buf.len() < TRACE_HEADER_LEN {
            return Err(SegyError::OutOfBounds {
                offset: 0,
                len: TRACE_HEADER_LEN,
                available: buf.len(),
            });
        }
        let mut header = Self::default();
        decode_fields(TRACE_HEADER_FIELDS, buf, order, &mut header)?;
        header.spare = Reserved(read_array(buf, SPARE_OFFSET)?.0);
        Ok(header)
    }

    /// Encode into a fresh 240-byte block
    pub fn encode(&self, order: ByteOrder) -> Result<[u8; TRACE_HEADER_LEN]> {
        let mut buf = [0u8; TRACE_HEADER_LEN];
        self.encode_into(&mut buf, order)?;
        Ok(buf)
    }

    /// Encode into the first 240 bytes of `buf`
    pub fn encode_into(&self, buf: &mut [u8], order: ByteOrder) -> Result<()> {
        encode_fields(TRACE_HEADER_FIELDS, self, order, buf)?;
        write_bytes(buf, SPARE_OFFSET, self.spare.as_bytes())?;
        Ok(())
    }

    /// Value of a named field
    pub fn field(&self, name: &str) -> Result<i64> {
        Ok((find_field(TRACE_HEADER_FIELDS, name)?.get)(self))
    }

    /// Overwrite a named field; the value wraps to the field's width
    pub fn set_field(&mut self, name: &str, value: i64) -> Result<()> {
        (find_field(TRACE_HEADER_FIELDS, name)?.set)(self, value);
        Ok(())
    }

    pub fn fields() -> &'static [FieldSpec<TraceHeader>] {
        TRACE_HEADER_FIELDS
    }

    /// Ensemble coordinates with `coordinate_scalar` applied
    pub fn cdp_position(&self) -> (f64, f64) {
        (
            apply_scalar(self.cdp_x, self.coordinate_scalar),
            apply_scalar(self.cdp_y, self.coordinate_scalar),
        )
    }

    /// Source coordinates with `coordinate_scalar` applied
    pub fn source_position(&self) -> (f64, f64) {
        (
            apply_scalar(self.source_x, self.coordinate_scalar),
            apply_scalar(self.source_y, self.coordinate_scalar),
        )
    }

    /// Recording time, when the date/time fields hold a valid moment
    pub fn recording_time(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_yo_opt(self.year as i32, self.day_of_year as u32)?.and_hms_opt(
            self.hour as u32,
            self.minute as u32,
            self.second as u32,
        )
    }

    /// Store `time` in the year/day/hour/minute/second fields (whole seconds)
    pub fn set_recording_time(&mut self, time: NaiveDateTime) {
        self.year = time.year().clamp(0, u16::MAX as i32) as u16;
        self.day_of_year = time.ordinal() as u16;
        self.hour = time.hour() as u16;
        self.minute = time.minute() as u16;
        self.second = time.second() as u16;
    }
}

/// A trace header together with its decoded samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub header: TraceHeader,
    pub samples: Vec<f32>,
}

impl Trace {
    pub fn new(header: TraceHeader, samples: Vec<f32>) -> Self {
        Self { header, samples }
    }

    /// Time of sample `index` in milliseconds, counted from the recording delay
    pub fn sample_time_ms(&self, index: usize) -> f64 {
        self.header.delay_recording_time as f64
            + index as f64 * self.header.sample_interval as f64 / 1000.0
    }
}

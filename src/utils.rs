//! Utility functions

/// Format byte size in human-readable form
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Milliseconds to whole microseconds, rounded to nearest
pub fn ms_to_us(ms: f64) -> i64 {
    (ms * 1000.0).round() as i64
}

/// Length of a trace in milliseconds, first sample to last
pub fn record_length_ms(samples: usize, sample_interval_us: u16) -> f64 {
    samples.saturating_sub(1) as f64 * sample_interval_us as f64 / 1000.0
}

//! Queries over a batch of trace headers by field name

use crate::error::Result;
use crate::field::find_field;
use crate::trace_header::{TraceHeader, TRACE_HEADER_FIELDS};
use rayon::prelude::*;
use std::collections::HashSet;

/// Indices of the headers whose `field` equals `value`
pub fn trace_indices_where(headers: &[TraceHeader], field: &str, value: i64) -> Result<Vec<usize>> {
    let get = find_field(TRACE_HEADER_FIELDS, field)?.get;
    Ok(headers
        .par_iter()
        .enumerate()
        .filter(|(_, header)| get(header) == value)
        .map(|(index, _)| index)
        .collect())
}

/// Values of `field` across `headers`, in header order.
///
/// With `distinct`, repeated values are dropped and first occurrences kept.
pub fn field_values(headers: &[TraceHeader], field: &str, distinct: bool) -> Result<Vec<i64>> {
    let get = find_field(TRACE_HEADER_FIELDS, field)?.get;
    let values = headers.iter().map(get);
    if !distinct {
        return Ok(values.collect());
    }
    let mut seen = HashSet::new();
    Ok(values.filter(|value| seen.insert(*value)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SegyError;

    fn headers() -> Vec<TraceHeader> {
        (0..6u32)
            .map(|i| {
                let mut header = TraceHeader::new(i + 1, 1000, 10);
                header.inline = 200 - (i / 2) as i32;
                header.crossline = (i % 2) as i32;
                header
            })
            .collect()
    }

    #[test]
    fn test_indices_where() {
        let headers = headers();
        assert_eq!(trace_indices_where(&headers, "inline", 199).unwrap(), vec![2, 3]);
        assert_eq!(trace_indices_where(&headers, "crossline", 1).unwrap(), vec![1, 3, 5]);
        assert!(trace_indices_where(&headers, "inline", 5).unwrap().is_empty());
        assert!(matches!(
            trace_indices_where(&headers, "bogus", 0),
            Err(SegyError::UnknownField(_))
        ));
    }

    #[test]
    fn test_field_values() {
        let headers = headers();
        assert_eq!(
            field_values(&headers, "inline", false).unwrap(),
            vec![200, 200, 199, 199, 198, 198]
        );
        assert_eq!(field_values(&headers, "inline", true).unwrap(), vec![200, 199, 198]);
        assert_eq!(field_values(&headers, "crossline", true).unwrap(), vec![0, 1]);
        assert!(field_values(&[], "cdp", true).unwrap().is_empty());
    }
}

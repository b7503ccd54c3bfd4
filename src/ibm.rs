//! IBM System/360 hexadecimal floating point conversion.
//!
//! An IBM single is `s eeeeeee ffffffff ffffffff ffffffff`: a sign bit, a
//! base-16 exponent in excess-64 and a 24-bit fraction with the radix point
//! in front of it. The bytes are always most significant first, whatever the
//! byte order of the surrounding file.
//!
//! Converting IEEE to IBM realigns the mantissa to a hex-digit boundary by
//! shifting right, so up to three low mantissa bits are dropped. Values that
//! started life as IBM floats survive IBM -> IEEE -> IBM bit for bit; the
//! reverse trip is lossy by construction of the target format.

/// Magnitudes at or below this decode to exactly zero
pub const IBM_ZERO_THRESHOLD: f32 = 5.877472e-39;

const TWO_POW_24: f64 = 16_777_216.0;
const TWO_POW_56: f64 = 72_057_594_037_927_936.0;

/// Largest IBM single magnitude (`0x7FFFFFFF`) without the sign bit
const IBM_MAX_MAGNITUDE: [u8; 4] = [0x7F, 0xFF, 0xFF, 0xFF];

#[inline]
fn split(bytes: [u8; 4]) -> (f64, i32, u32) {
    let sign = if bytes[0] & 0x80 != 0 { -1.0 } else { 1.0 };
    let exponent = (bytes[0] & 0x7F) as i32 - 64;
    let fraction = u32::from_be_bytes([0, bytes[1], bytes[2], bytes[3]]);
    (sign, exponent, fraction)
}

/// Decode a 4-byte IBM float to IEEE single precision.
///
/// Results with magnitude at or below [`IBM_ZERO_THRESHOLD`] are clamped to zero.
#[inline]
pub fn ibm_to_f32(bytes: [u8; 4]) -> f32 {
    let (sign, exponent, fraction) = split(bytes);
    let mantissa = fraction as f64 / TWO_POW_24;
    let value = (sign * 16f64.powi(exponent) * mantissa) as f32;
    if value.abs() <= IBM_ZERO_THRESHOLD {
        0.0
    } else {
        value
    }
}

/// Decode a 4-byte IBM float to IEEE double precision, without clamping
pub fn ibm_to_f64(bytes: [u8; 4]) -> f64 {
    let (sign, exponent, fraction) = split(bytes);
    sign * 16f64.powi(exponent) * (fraction as f64 / TWO_POW_24)
}

/// Decode an 8-byte IBM double (56-bit fraction) to IEEE double precision
pub fn ibm64_to_f64(bytes: [u8; 8]) -> f64 {
    let sign = if bytes[0] & 0x80 != 0 { -1.0 } else { 1.0 };
    let exponent = (bytes[0] & 0x7F) as i32 - 64;
    let fraction = u64::from_be_bytes([
        0, bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ]);
    sign * 16f64.powi(exponent) * (fraction as f64 / TWO_POW_56)
}

/// Pack sign, unbiased binary exponent (`value = 0.1fff... * 2^exp`) and a
/// 24-bit mantissa with its leading bit set into IBM bytes
#[inline]
fn pack(sign: u8, binary_exp: i32, mantissa: u32) -> [u8; 4] {
    let remainder = binary_exp & 0x03;
    let mut hex_exp = binary_exp >> 2;
    let mut fraction = mantissa;
    if remainder != 0 {
        hex_exp += 1;
        fraction >>= 4 - remainder;
    }
    let biased = (hex_exp + 64) as u8;
    [
        (sign << 7) | (biased & 0x7F),
        (fraction >> 16) as u8,
        (fraction >> 8) as u8,
        fraction as u8,
    ]
}

/// Encode an IEEE single as a 4-byte IBM float.
///
/// Zero encodes as all-zero bytes and IEEE subnormals are normalised first.
/// Infinities and NaN saturate to the largest IBM magnitude carrying the
/// input's sign.
pub fn f32_to_ibm(value: f32) -> [u8; 4] {
    let bits = value.to_bits();
    let sign = (bits >> 31) as u8;
    let exponent = ((bits >> 23) & 0xFF) as i32;
    let fraction = bits & 0x007F_FFFF;

    match exponent {
        0 if fraction == 0 => [0; 4],
        0 => {
            let mut mantissa = fraction;
            let mut binary_exp = -125;
            while mantissa & 0x0080_0000 == 0 {
                mantissa <<= 1;
                binary_exp -= 1;
            }
            pack(sign, binary_exp, mantissa)
        }
        0xFF => {
            let mut out = IBM_MAX_MAGNITUDE;
            out[0] |= sign << 7;
            out
        }
        _ => pack(sign, exponent - 127 + 1, fraction | 0x0080_0000),
    }
}

/// Encode an IEEE double as a 4-byte IBM float, keeping the top 24 mantissa bits.
///
/// Doubles outside the IBM single range saturate; tiny doubles encode as zero.
pub fn f64_to_ibm(value: f64) -> [u8; 4] {
    let bits = value.to_bits();
    let sign = (bits >> 63) as u8;
    let exponent = ((bits >> 52) & 0x7FF) as i32;
    let fraction = bits & 0x000F_FFFF_FFFF_FFFF;

    if exponent == 0 {
        return [0; 4];
    }
    let binary_exp = exponent - 1023 + 1;
    // IBM single covers 16^-64 .. 16^63
    if exponent == 0x7FF || binary_exp > 252 {
        let mut out = IBM_MAX_MAGNITUDE;
        out[0] |= sign << 7;
        return out;
    }
    if binary_exp < -256 {
        return [0; 4];
    }
    let mantissa = ((fraction >> 29) as u32) | 0x0080_0000;
    pack(sign, binary_exp, mantissa)
}

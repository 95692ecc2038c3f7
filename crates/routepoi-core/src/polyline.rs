//! Encoded polyline codec (Google "encoded polyline algorithm format").
//!
//! Coordinates are `(lat, lng)` pairs. Encoding is lossy: values are scaled by
//! `10^precision` and rounded, so a round trip reproduces the input to within
//! `10^-precision` per axis.

use crate::error::{PoiError, Result};
use crate::models::LatLng;

/// Precision used by the route store and by Google Places.
pub const DEFAULT_PRECISION: u32 = 5;

const CHUNK_BITS: u32 = 5;
const CHUNK_MASK: i64 = 0x1f;
const CONTINUATION: i64 = 0x20;
const ASCII_OFFSET: i64 = 63;

/// Encode a coordinate list at precision 1e5.
///
/// Non-finite coordinates encode as zero deltas and out-of-range deltas wrap at
/// 32 bits; use [`try_encode`] to reject both.
pub fn encode(coords: &[LatLng]) -> String {
    encode_with_precision(coords, DEFAULT_PRECISION)
}

/// Encode a coordinate list, rejecting values that cannot round-trip: NaN,
/// infinities and anything outside latitude/longitude range.
pub fn try_encode(coords: &[LatLng]) -> Result<String> {
    for (index, coord) in coords.iter().enumerate() {
        if !coord.is_finite() {
            return Err(PoiError::invalid(format!(
                "coordinate {} is not finite",
                index
            )));
        }
        if !(-90.0..=90.0).contains(&coord.lat) || !(-180.0..=180.0).contains(&coord.lng) {
            return Err(PoiError::invalid(format!(
                "coordinate {} ({}, {}) is out of range",
                index, coord.lat, coord.lng
            )));
        }
    }
    Ok(encode(coords))
}

pub fn encode_with_precision(coords: &[LatLng], precision: u32) -> String {
    let factor = 10f64.powi(precision as i32);
    let mut out = String::with_capacity(coords.len() * 8);
    let mut prev_lat = 0i64;
    let mut prev_lng = 0i64;

    for coord in coords {
        let lat = scale(coord.lat, factor);
        let lng = scale(coord.lng, factor);
        encode_value(lat - prev_lat, &mut out);
        encode_value(lng - prev_lng, &mut out);
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

/// Decode a precision 1e5 polyline.
pub fn decode(encoded: &str) -> Result<Vec<LatLng>> {
    decode_with_precision(encoded, DEFAULT_PRECISION)
}

pub fn decode_with_precision(encoded: &str, precision: u32) -> Result<Vec<LatLng>> {
    let factor = 10f64.powi(precision as i32);
    let bytes = encoded.as_bytes();
    let mut coords = Vec::with_capacity(bytes.len() / 4);
    let mut index = 0usize;
    let mut lat = 0i64;
    let mut lng = 0i64;

    while index < bytes.len() {
        lat += decode_value(bytes, &mut index)?;
        if index >= bytes.len() {
            return Err(PoiError::invalid(
                "polyline ends after a latitude without a longitude",
            ));
        }
        lng += decode_value(bytes, &mut index)?;
        coords.push(LatLng::new(lat as f64 / factor, lng as f64 / factor));
    }

    Ok(coords)
}

fn scale(value: f64, factor: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    (value * factor).round() as i64
}

fn encode_value(delta: i64, out: &mut String) {
    // Zig-zag on 32-bit semantics keeps output identical to the reference encoder.
    let signed = delta as i32;
    let mut value = (((signed << 1) ^ (signed >> 31)) as u32) as i64;

    while value >= CONTINUATION {
        let chunk = (CONTINUATION | (value & CHUNK_MASK)) + ASCII_OFFSET;
        out.push(chunk as u8 as char);
        value >>= CHUNK_BITS;
    }
    out.push((value + ASCII_OFFSET) as u8 as char);
}

fn decode_value(bytes: &[u8], index: &mut usize) -> Result<i64> {
    let mut result = 0i64;
    let mut shift = 0u32;

    loop {
        let Some(&byte) = bytes.get(*index) else {
            return Err(PoiError::invalid("polyline ends in the middle of a value"));
        };
        if !(63..=126).contains(&byte) {
            return Err(PoiError::invalid(format!(
                "invalid polyline character {:?} at offset {}",
                byte as char, *index
            )));
        }
        if shift > 30 {
            return Err(PoiError::invalid("polyline value overflows 32 bits"));
        }
        *index += 1;

        let chunk = byte as i64 - ASCII_OFFSET;
        result |= (chunk & CHUNK_MASK) << shift;
        shift += CHUNK_BITS;

        if chunk < CONTINUATION {
            break;
        }
    }

    let value = result as u32;
    let decoded = if value & 1 == 1 {
        !(value >> 1) as i32
    } else {
        (value >> 1) as i32
    };
    Ok(decoded as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_points() -> Vec<LatLng> {
        vec![
            LatLng::new(38.5, -120.2),
            LatLng::new(40.7, -120.95),
            LatLng::new(43.252, -126.453),
        ]
    }

    #[test]
    fn test_encode_reference_vector() {
        assert_eq!(encode(&reference_points()), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
    }

    #[test]
    fn test_decode_reference_vector() {
        let decoded = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        assert_eq!(decoded.len(), 3);
        for (a, b) in decoded.iter().zip(reference_points()) {
            assert!((a.lat - b.lat).abs() < 1e-5);
            assert!((a.lng - b.lng).abs() < 1e-5);
        }
    }

    #[test]
    fn test_empty_round_trip() {
        assert_eq!(encode(&[]), "");
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn test_single_point_round_trip() {
        let point = [LatLng::new(-33.868_82, 151.209_29)];
        let decoded = decode(&encode(&point)).unwrap();
        assert_eq!(decoded.len(), 1);
        assert!((decoded[0].lat - point[0].lat).abs() < 1e-5);
        assert!((decoded[0].lng - point[0].lng).abs() < 1e-5);
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        let coords: Vec<LatLng> = (0..250)
            .map(|i| {
                let t = i as f64;
                LatLng::new(47.0 + (t * 0.0137).sin() * 0.5, 8.0 + t * 0.000_731)
            })
            .collect();
        let decoded = decode(&encode(&coords)).unwrap();
        assert_eq!(decoded.len(), coords.len());
        for (a, b) in decoded.iter().zip(&coords) {
            assert!((a.lat - b.lat).abs() <= 1e-5);
            assert!((a.lng - b.lng).abs() <= 1e-5);
        }
    }

    #[test]
    fn test_extreme_coordinates_round_trip() {
        let coords = [
            LatLng::new(90.0, 180.0),
            LatLng::new(-90.0, -180.0),
            LatLng::new(0.0, 0.0),
        ];
        let decoded = decode(&encode(&coords)).unwrap();
        for (a, b) in decoded.iter().zip(&coords) {
            assert!((a.lat - b.lat).abs() <= 1e-5);
            assert!((a.lng - b.lng).abs() <= 1e-5);
        }
    }

    #[test]
    fn test_decode_rejects_truncated_input() {
        // Drop the final character of a valid polyline.
        let encoded = encode(&reference_points());
        let truncated = &encoded[..encoded.len() - 1];
        assert!(matches!(
            decode(truncated),
            Err(PoiError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_characters() {
        assert!(decode("_p~iF ~ps|U").is_err());
    }

    #[test]
    fn test_try_encode_rejects_nan() {
        let coords = [LatLng::new(f64::NAN, 1.0)];
        assert!(try_encode(&coords).is_err());
    }

    #[test]
    fn test_try_encode_rejects_out_of_range() {
        assert!(try_encode(&[LatLng::new(30_000.0, 0.0)]).is_err());
        assert!(try_encode(&[LatLng::new(10.0, 180.5)]).is_err());

        let corners = [LatLng::new(90.0, 180.0), LatLng::new(-90.0, -180.0)];
        let decoded = decode(&try_encode(&corners).unwrap()).unwrap();
        assert!((decoded[1].lng - -180.0).abs() <= 1e-5);
    }

    #[test]
    fn test_precision_six_round_trip() {
        let coords = [LatLng::new(52.520_008, 13.404_954)];
        let decoded = decode_with_precision(&encode_with_precision(&coords, 6), 6).unwrap();
        assert!((decoded[0].lat - coords[0].lat).abs() <= 1e-6);
        assert!((decoded[0].lng - coords[0].lng).abs() <= 1e-6);
    }
}

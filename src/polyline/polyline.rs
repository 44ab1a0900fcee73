//! Encoded polyline format used by web mapping services.
//!
//! Each coordinate is scaled by 1e5, rounded half away from zero, zig-zag
//! mapped to an unsigned value and written as 5-bit groups, least
//! significant first. Every group except the last carries the `0x20`
//! continuation bit, and each byte is offset by 63 into printable ASCII.
//! Points are stored as deltas from the previous point, starting at (0, 0).

use serde::Serialize;

use crate::sphere::nvector::Location;

const SCALE: f64 = 1e5;
const CHUNK_MASK: u64 = 0x1f;
const CONTINUATION: u64 = 0x20;
const ASCII_OFFSET: u64 = 63;

fn push_varint(mut value: u64, out: &mut String) {
    loop {
        let mut chunk = value & CHUNK_MASK;
        value >>= 5;
        if value > 0 {
            chunk |= CONTINUATION;
        }
        out.push(char::from((chunk + ASCII_OFFSET) as u8));
        if value == 0 {
            break;
        }
    }
}

fn push_signed(value: f64, out: &mut String) {
    let scaled = (value * SCALE).round() as i64;
    let zigzag = if scaled < 0 {
        !(scaled << 1)
    } else {
        scaled << 1
    };
    push_varint(zigzag as u64, out);
}

/// Encodes one signed coordinate (or coordinate delta) in degrees.
pub fn encode_signed(value: f64) -> String {
    let mut out = String::new();
    push_signed(value, &mut out);
    out
}

pub fn encode_unsigned(value: u32) -> String {
    let mut out = String::new();
    push_varint(u64::from(value), &mut out);
    out
}

/// Sequence of (latitude, longitude) points in degrees.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Polyline {
    points: Vec<(f64, f64)>,
    /// Append a final delta back to the first point.
    pub close_path: bool,
}

impl Polyline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn closed() -> Self {
        Polyline {
            points: Vec::new(),
            close_path: true,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn push_lat_lon(&mut self, lat: f64, lon: f64) {
        self.points.push((lat, lon));
    }

    pub fn push_location(&mut self, location: &Location) {
        let (lat, lon) = location.to_lat_lon_degrees();
        self.push_lat_lon(lat, lon);
    }

    pub fn encode(&self) -> String {
        let mut out = String::new();
        let (mut prev_lat, mut prev_lon) = (0.0, 0.0);
        for &(lat, lon) in &self.points {
            push_signed(lat - prev_lat, &mut out);
            push_signed(lon - prev_lon, &mut out);
            prev_lat = lat;
            prev_lon = lon;
        }
        if self.close_path {
            if let Some(&(lat, lon)) = self.points.first() {
                push_signed(lat - prev_lat, &mut out);
                push_signed(lon - prev_lon, &mut out);
            }
        }
        out
    }
}

impl FromIterator<Location> for Polyline {
    fn from_iter<I: IntoIterator<Item = Location>>(iter: I) -> Self {
        let mut line = Polyline::new();
        for location in iter {
            line.push_location(&location);
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_reference_values() {
        let cases = [
            (-179.9832104, "`~oia@"),
            (38.5, "_p~iF"),
            (-120.2, "~ps|U"),
            (2.2, "_ulL"),
            (-0.75, "nnqC"),
            (2.552, "_mqN"),
            (-5.503, "vxq`@"),
            (0.0, "?"),
        ];
        for (value, expected) in cases {
            assert_eq!(encode_signed(value), expected, "encoding {value}");
        }
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(encode_signed(0.000005), encode_signed(0.00001));
        assert_eq!(encode_signed(-0.000005), encode_signed(-0.00001));
        assert_eq!(encode_signed(0.0000049), "?");
    }

    #[test]
    fn unsigned_reference_value() {
        assert_eq!(encode_unsigned(174), "mD");
        assert_eq!(encode_unsigned(0), "?");
    }

    #[test]
    fn three_point_line() {
        let mut line = Polyline::new();
        line.push_lat_lon(38.5, -120.2);
        line.push_lat_lon(40.7, -120.95);
        line.push_lat_lon(43.252, -126.453);
        assert_eq!(line.encode(), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");

        line.close_path = true;
        let closed = line.encode();
        assert!(closed.starts_with("_p~iF~ps|U_ulLnnqC_mqNvxq`@"));
        assert_ne!(closed, "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
    }

    #[test]
    fn closing_an_empty_line_is_empty() {
        assert_eq!(Polyline::closed().encode(), "");
    }

    #[test]
    fn collects_from_locations() {
        let line: Polyline = [
            Location::from_lat_lon_degrees(38.5, -120.2),
            Location::from_lat_lon_degrees(40.7, -120.95),
        ]
        .into_iter()
        .collect();
        assert_eq!(line.len(), 2);
        assert!(line.encode().starts_with("_p~iF~ps|U"));
    }
}

//! Great-circle distance and encoded polyline decoding.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Query-string form used by directions APIs.
    pub fn to_query(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }
}

/// Straight-line distance between two points using the haversine formula.
pub fn haversine_km(a: LatLon, b: LatLon) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Decode one zig-zag varint from an encoded polyline.
fn decode_value(bytes: &mut impl Iterator<Item = (usize, u8)>) -> Result<Option<i64>> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let Some((pos, byte)) = bytes.next() else {
            if shift == 0 {
                return Ok(None);
            }
            return Err(Error::InvalidInput("truncated polyline".to_string()));
        };

        if !(63..=126).contains(&byte) {
            return Err(Error::InvalidInput(format!(
                "invalid polyline character at {}",
                pos
            )));
        }
        if shift > 60 {
            return Err(Error::InvalidInput("polyline value overflow".to_string()));
        }

        let chunk = (byte - 63) as i64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < 0x20 {
            break;
        }
    }

    let delta = if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    };
    Ok(Some(delta))
}

/// Decode an encoded polyline (precision 1e5) into coordinates.
pub fn decode_polyline(encoded: &str) -> Result<Vec<LatLon>> {
    let mut bytes = encoded.bytes().enumerate();
    let mut points = Vec::new();
    let (mut lat, mut lon) = (0i64, 0i64);

    while let Some(d_lat) = decode_value(&mut bytes)? {
        let d_lon = decode_value(&mut bytes)?
            .ok_or_else(|| Error::InvalidInput("polyline ends after latitude".to_string()))?;

        lat += d_lat;
        lon += d_lon;
        points.push(LatLon::new(lat as f64 / 1e5, lon as f64 / 1e5));
    }

    Ok(points)
}

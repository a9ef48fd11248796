//! Geographic positions and the input forms the wider system produces.
//!
//! Position data reaches this tooling in three shapes, depending on which
//! upstream component wrote it:
//!
//! 1. a structured object: `{"lat": 45.43, "lng": 12.33}`
//! 2. a JSON-encoded string of the same object
//! 3. a bare comma-separated string: `"45.43,12.33"`
//!
//! [`Position::from_value`] accepts all three and produces the same
//! [`Position`], so distance computations downstream agree regardless of
//! the source.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters, for haversine distances.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in decimal degrees (positive north).
    pub lat: f64,
    /// Longitude in decimal degrees (positive east).
    pub lng: f64,
}

/// Errors raised when parsing a position from external data.
#[derive(Debug, thiserror::Error)]
pub enum PositionError {
    /// The value was a string but neither valid JSON nor `"lat,lng"`.
    #[error("unparseable position string: {0:?}")]
    UnparseableString(String),

    /// The value was JSON but not an object with numeric `lat` and `lng`.
    #[error("position object missing numeric lat/lng: {0}")]
    MissingCoordinates(String),

    /// The value was neither a string nor an object.
    #[error("unsupported position shape: {0}")]
    UnsupportedShape(String),
}

impl Position {
    /// Construct a position from explicit coordinates.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Parse a position from any of the accepted JSON shapes.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError`] if the value matches none of the three
    /// accepted forms.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, PositionError> {
        match value {
            serde_json::Value::Object(_) => Self::from_object(value),
            serde_json::Value::String(s) => Self::from_position_str(s),
            other => Err(PositionError::UnsupportedShape(other.to_string())),
        }
    }

    /// Parse a position from a string: either a JSON-encoded object or a
    /// bare `"lat,lng"` pair.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError::UnparseableString`] if neither form matches.
    pub fn from_position_str(s: &str) -> Result<Self, PositionError> {
        let trimmed = s.trim();
        if trimmed.starts_with('{') {
            let value: serde_json::Value = serde_json::from_str(trimmed)
                .map_err(|_| PositionError::UnparseableString(s.to_owned()))?;
            return Self::from_object(&value);
        }
        let mut parts = trimmed.splitn(2, ',');
        let lat = parts
            .next()
            .and_then(|p| p.trim().parse::<f64>().ok())
            .ok_or_else(|| PositionError::UnparseableString(s.to_owned()))?;
        let lng = parts
            .next()
            .and_then(|p| p.trim().parse::<f64>().ok())
            .ok_or_else(|| PositionError::UnparseableString(s.to_owned()))?;
        Ok(Self { lat, lng })
    }

    /// Great-circle distance to another position, in meters (haversine).
    pub fn distance_m(&self, other: &Self) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    fn from_object(value: &serde_json::Value) -> Result<Self, PositionError> {
        let lat = value.get("lat").and_then(serde_json::Value::as_f64);
        let lng = value.get("lng").and_then(serde_json::Value::as_f64);
        match (lat, lng) {
            (Some(lat), Some(lng)) => Ok(Self { lat, lng }),
            _ => Err(PositionError::MissingCoordinates(value.to_string())),
        }
    }
}

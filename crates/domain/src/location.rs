//! Geographic location used for daylight calculations.

use serde::{Deserialize, Serialize};

/// A point on Earth in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Degrees north of the equator (negative for south).
    pub latitude: f64,
    /// Degrees east of Greenwich (negative for west).
    pub longitude: f64,
}

impl Location {
    /// Tampere, Finland.
    pub const TAMPERE: Self = Self {
        latitude: 61.4978,
        longitude: 23.7610,
    };

    /// Whether both coordinates are within their valid ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::TAMPERE
    }
}

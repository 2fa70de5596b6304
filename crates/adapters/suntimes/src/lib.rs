//! # homehub-adapter-suntimes
//!
//! [`DaylightOracle`] answering "is it between the golden hours?".
//!
//! The sun's elevation is computed with the NOAA solar position equations
//! (accurate to a fraction of a degree, which is plenty for switching
//! lights). Between the golden hours means the sun stands higher than
//! [`GOLDEN_HOUR_ELEVATION`] above the horizon.
//!
//! ## Dependency rule
//!
//! Depends on `homehub-app` (port traits) and `homehub-domain` only.

use chrono::Timelike;

use homehub_app::ports::DaylightOracle;
use homehub_domain::location::Location;
use homehub_domain::time::Timestamp;

/// Elevation in degrees below which the light is golden (or gone).
pub const GOLDEN_HOUR_ELEVATION: f64 = 6.0;

const JULIAN_DAY_AT_UNIX_EPOCH: f64 = 2_440_587.5;
const JULIAN_DAY_AT_J2000: f64 = 2_451_545.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Daylight oracle with a configurable elevation threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoldenHour {
    pub min_elevation_degrees: f64,
}

impl Default for GoldenHour {
    fn default() -> Self {
        Self {
            min_elevation_degrees: GOLDEN_HOUR_ELEVATION,
        }
    }
}

impl DaylightOracle for GoldenHour {
    fn has_daylight(&self, at: Timestamp, location: &Location) -> bool {
        solar_elevation(at, location) > self.min_elevation_degrees
    }
}

/// Geometric elevation of the sun's center, in degrees, without
/// atmospheric refraction.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn solar_elevation(at: Timestamp, location: &Location) -> f64 {
    let julian_day = at.timestamp() as f64 / SECONDS_PER_DAY + JULIAN_DAY_AT_UNIX_EPOCH;
    let t = (julian_day - JULIAN_DAY_AT_J2000) / 36_525.0;

    let mean_longitude = (280.466_46 + t * (36_000.769_83 + t * 0.000_303_2)).rem_euclid(360.0);
    let mean_anomaly = 357.529_11 + t * (35_999.050_29 - 0.000_153_7 * t);
    let eccentricity = 0.016_708_634 - t * (0.000_042_037 + 0.000_000_126_7 * t);

    let m = mean_anomaly.to_radians();
    let center = m.sin() * (1.914_602 - t * (0.004_817 + 0.000_014 * t))
        + (2.0 * m).sin() * (0.019_993 - 0.000_101 * t)
        + (3.0 * m).sin() * 0.000_289;
    let omega = (125.04 - 1_934.136 * t).to_radians();
    let apparent_longitude = (mean_longitude + center - 0.005_69 - 0.004_78 * omega.sin()).to_radians();

    let mean_obliquity =
        23.0 + (26.0 + (21.448 - t * (46.815 + t * (0.000_59 - t * 0.001_813))) / 60.0) / 60.0;
    let obliquity = (mean_obliquity + 0.002_56 * omega.cos()).to_radians();
    let declination = (obliquity.sin() * apparent_longitude.sin()).asin();

    let l0 = mean_longitude.to_radians();
    let y = (obliquity / 2.0).tan().powi(2);
    let equation_of_time_minutes = 4.0
        * (y * (2.0 * l0).sin() - 2.0 * eccentricity * m.sin()
            + 4.0 * eccentricity * y * m.sin() * (2.0 * l0).cos()
            - 0.5 * y * y * (4.0 * l0).sin()
            - 1.25 * eccentricity * eccentricity * (2.0 * m).sin())
        .to_degrees();

    let minutes_since_midnight = f64::from(at.num_seconds_from_midnight()) / 60.0;
    let true_solar_minutes =
        (minutes_since_midnight + equation_of_time_minutes + 4.0 * location.longitude)
            .rem_euclid(1_440.0);
    let hour_angle = (true_solar_minutes / 4.0 - 180.0).to_radians();

    let latitude = location.latitude.to_radians();
    let cos_zenith = latitude.sin() * declination.sin()
        + latitude.cos() * declination.cos() * hour_angle.cos();
    90.0 - cos_zenith.clamp(-1.0, 1.0).acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Timestamp {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn should_have_daylight_on_midsummer_noon_in_tampere() {
        let oracle = GoldenHour::default();
        assert!(oracle.has_daylight(at(2024, 6, 21, 10, 0), &Location::TAMPERE));
    }

    #[test]
    fn should_be_dark_on_midwinter_midnight_in_tampere() {
        let oracle = GoldenHour::default();
        assert!(!oracle.has_daylight(at(2024, 12, 21, 0, 0), &Location::TAMPERE));
    }

    #[test]
    fn should_stay_golden_all_day_on_winter_solstice_in_tampere() {
        // the sun peaks around five degrees at solar noon
        let noon = solar_elevation(at(2024, 12, 21, 10, 25), &Location::TAMPERE);
        assert!(noon > 3.0 && noon < GOLDEN_HOUR_ELEVATION, "elevation {noon}");
        assert!(!GoldenHour::default().has_daylight(at(2024, 12, 21, 10, 25), &Location::TAMPERE));
    }

    #[test]
    fn should_put_sun_near_zenith_at_equinox_noon_on_equator() {
        let equator = Location {
            latitude: 0.0,
            longitude: 0.0,
        };
        let elevation = solar_elevation(at(2024, 3, 20, 12, 7), &equator);
        assert!(elevation > 85.0, "elevation {elevation}");
    }

    #[test]
    fn should_honour_custom_threshold() {
        let oracle = GoldenHour {
            min_elevation_degrees: -90.0,
        };
        assert!(oracle.has_daylight(at(2024, 12, 21, 0, 0), &Location::TAMPERE));
    }
}

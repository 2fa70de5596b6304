//! Daylight port: the environmental collaborator.

use homehub_domain::location::Location;
use homehub_domain::time::Timestamp;

/// Tells whether there is natural light outside at a given time and place.
pub trait DaylightOracle {
    fn has_daylight(&self, at: Timestamp, location: &Location) -> bool;
}

impl<F> DaylightOracle for F
where
    F: Fn(Timestamp, &Location) -> bool,
{
    fn has_daylight(&self, at: Timestamp, location: &Location) -> bool {
        self(at, location)
    }
}

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// The four published award cabin classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CabinClass {
    Y,
    W,
    J,
    F,
}

impl CabinClass {
    pub const ALL: [CabinClass; 4] = [CabinClass::Y, CabinClass::W, CabinClass::J, CabinClass::F];

    pub fn letter(&self) -> char {
        match self {
            CabinClass::Y => 'Y',
            CabinClass::W => 'W',
            CabinClass::J => 'J',
            CabinClass::F => 'F',
        }
    }
}

/// Published award seat counts per cabin class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatCounts {
    #[serde(default)]
    pub y: u32,
    #[serde(default)]
    pub w: u32,
    #[serde(default)]
    pub j: u32,
    #[serde(default)]
    pub f: u32,
}

impl SeatCounts {
    pub fn get(&self, class: CabinClass) -> u32 {
        match class {
            CabinClass::Y => self.y,
            CabinClass::W => self.w,
            CabinClass::J => self.j,
            CabinClass::F => self.f,
        }
    }
}

/// One operated flight leg within a priced itinerary. Constructed once from
/// the upstream itinerary-search response, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSegment {
    /// e.g. "AA100"; airline code is the first two characters.
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    /// Naive local time; see `parse_naive_flight_time` for the convention.
    pub departs_at: NaiveDateTime,
    pub arrives_at: NaiveDateTime,
    pub total_duration_minutes: u32,
    pub seat_counts: SeatCounts,
    pub aircraft_type_label: String,
}

impl FlightSegment {
    pub fn airline_code(&self) -> &str {
        self.flight_number.get(..2).unwrap_or(&self.flight_number)
    }

    pub fn departure_date(&self) -> NaiveDate {
        self.departs_at.date()
    }
}

/// Parses an upstream flight timestamp as naive local time.
///
/// The backend emits timestamps with a trailing "Z" that does not reflect a
/// real UTC offset; it is stripped before parsing and no timezone arithmetic
/// is ever performed on the result.
pub fn parse_naive_flight_time(raw: &str) -> CoreResult<NaiveDateTime> {
    let trimmed = raw.trim().trim_end_matches('Z');
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|_| CoreError::FlightTimeError(raw.to_string()))
}

pub mod airline;
pub mod directory;
pub mod reliability;
pub mod segment;

pub use airline::{AirlineCatalog, AirlineRecord, AllianceKey};
pub use directory::{AirportDirectory, StaticDirectory};
pub use reliability::{ReliabilityRule, ReliabilityTable};
pub use segment::{parse_naive_flight_time, CabinClass, FlightSegment, SeatCounts};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Unparseable flight time: {0}")]
    FlightTimeError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

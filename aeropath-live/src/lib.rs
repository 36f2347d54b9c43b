pub mod cache;
pub mod client;
pub mod verify;
pub mod wire;

pub use cache::{CacheKey, Clock, LiveSearchCache, SystemClock, DEFAULT_TTL_MINUTES};
pub use client::{HttpLiveSearchClient, LiveSearchClient, LiveSearchError};
pub use verify::{
    DisplayEntry, SpanOutcome, VerificationCard, VerificationOutcome, VerificationState,
    Verifier, VerifyError, DEFAULT_LOOKUP_TIMEOUT,
};
pub use wire::{ItineraryOption, LiveSearchRequest, LiveSearchResponse, PriceBundle, WireSegment};

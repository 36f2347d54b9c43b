use serde::{Deserialize, Serialize};

// Wire schema of the live-search backend. Field names must survive any
// refactor byte-for-byte; the backend is otherwise opaque.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveSearchRequest {
    pub from: String,
    pub to: String,
    /// YYYY-MM-DD.
    pub depart: String,
    #[serde(rename = "ADT")]
    pub adt: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LiveSearchResponse {
    pub options: Vec<ItineraryOption>,
}

impl LiveSearchResponse {
    /// The option (if any) whose flight numbers cover every required one.
    /// Used to accept merged multi-group lookups.
    pub fn option_covering<'a, I>(&self, required_flight_numbers: I) -> Option<&ItineraryOption>
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        self.options.iter().find(|option| {
            required_flight_numbers
                .clone()
                .into_iter()
                .all(|required| option.segments.iter().any(|s| s.flightnumber == required))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItineraryOption {
    #[serde(default)]
    pub segments: Vec<WireSegment>,
    #[serde(default)]
    pub prices: Vec<PriceBundle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireSegment {
    pub flightnumber: String,
    pub from: String,
    pub to: String,
    pub depart: String,
    pub arrive: String,
    #[serde(default)]
    pub distance: Option<f64>,
    /// Optional per-class override table; shape is backend-defined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBundle {
    pub class: String,
    pub points: i64,
    #[serde(rename = "fareTax")]
    pub fare_tax: f64,
}

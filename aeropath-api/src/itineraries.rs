use std::collections::HashMap;

use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aeropath_core::{parse_naive_flight_time, FlightSegment, SeatCounts};
use aeropath_live::{VerificationCard, VerificationOutcome};
use aeropath_rules::{group_segments, options_for, Classification, GroupBookingOptions};

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SegmentInput {
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    /// Naive local timestamps; a trailing "Z" is tolerated and stripped.
    pub departs_at: String,
    pub arrives_at: String,
    #[serde(default)]
    pub total_duration_minutes: u32,
    #[serde(default)]
    pub seat_counts: SeatCounts,
    #[serde(default)]
    pub aircraft_type_label: String,
}

impl SegmentInput {
    fn into_segment(self) -> Result<FlightSegment, AppError> {
        let departs_at = parse_naive_flight_time(&self.departs_at)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        let arrives_at = parse_naive_flight_time(&self.arrives_at)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        Ok(FlightSegment {
            flight_number: self.flight_number,
            origin: self.origin,
            destination: self.destination,
            departs_at,
            arrives_at,
            total_duration_minutes: self.total_duration_minutes,
            seat_counts: self.seat_counts,
            aircraft_type_label: self.aircraft_type_label,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct GroupItineraryRequest {
    pub segments: Vec<SegmentInput>,
}

#[derive(Debug, Serialize)]
pub struct RouteView {
    pub from: String,
    pub to: String,
    /// City names when the directory resolves them, raw IATA codes
    /// otherwise.
    pub from_city: String,
    pub to_city: String,
}

#[derive(Debug, Serialize)]
pub struct GroupView {
    pub start: usize,
    pub end: usize,
    pub classification: Classification,
    pub route: RouteView,
    pub options: GroupBookingOptions,
}

#[derive(Debug, Serialize)]
pub struct GroupItineraryResponse {
    pub groups: Vec<GroupView>,
    /// Inline marker for the UI; a failed city lookup is never fatal.
    pub city_lookup_failed: bool,
}

#[derive(Debug, Deserialize)]
pub struct VerifyItineraryRequest {
    pub card_id: Option<Uuid>,
    pub reference_date: NaiveDate,
    pub segments: Vec<SegmentInput>,
    /// Group index -> selected loyalty program.
    pub selections: HashMap<usize, String>,
    #[serde(default = "default_seat_count")]
    pub seat_count: u32,
}

fn default_seat_count() -> u32 {
    1
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/itineraries/group
/// Partition an itinerary and compute booking options per group.
pub async fn group_itinerary(
    State(state): State<AppState>,
    Json(req): Json<GroupItineraryRequest>,
) -> Result<Json<GroupItineraryResponse>, AppError> {
    let segments = parse_segments(req.segments)?;
    let groups = group_segments(&segments, &state.reliability, &state.catalog);

    let mut codes: Vec<String> = Vec::new();
    for group in &groups {
        let (from, to) = group.route(&segments);
        for code in [from, to] {
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
    }
    let (cities, city_lookup_failed) = match state.directory.city_names(&codes).await {
        Ok(cities) => (cities, false),
        Err(err) => {
            tracing::warn!(error = %err, "city lookup failed, showing raw IATA codes");
            (HashMap::new(), true)
        }
    };

    let views = groups
        .iter()
        .map(|group| {
            let (from, to) = group.route(&segments);
            let options =
                options_for(group, &segments, &state.catalog, &state.supported_programs);
            GroupView {
                start: group.start,
                end: group.end,
                classification: group.classification.clone(),
                route: RouteView {
                    from_city: cities.get(&from).cloned().unwrap_or_else(|| from.clone()),
                    to_city: cities.get(&to).cloned().unwrap_or_else(|| to.clone()),
                    from,
                    to,
                },
                options,
            }
        })
        .collect();

    Ok(Json(GroupItineraryResponse {
        groups: views,
        city_lookup_failed,
    }))
}

/// POST /v1/itineraries/verify
/// Run live-availability verification for the selected groups.
pub async fn verify_itinerary(
    State(state): State<AppState>,
    Json(req): Json<VerifyItineraryRequest>,
) -> Result<Json<VerificationOutcome>, AppError> {
    let segments = parse_segments(req.segments)?;
    let groups = group_segments(&segments, &state.reliability, &state.catalog);

    let card = VerificationCard {
        id: req.card_id.unwrap_or_else(Uuid::new_v4),
        reference_date: req.reference_date,
        segments,
    };
    let outcome = state
        .verifier
        .verify(&card, &groups, &req.selections, req.seat_count)
        .await
        .map_err(|e| AppError::ValidationError(e.to_string()))?;
    Ok(Json(outcome))
}

fn parse_segments(inputs: Vec<SegmentInput>) -> Result<Vec<FlightSegment>, AppError> {
    if inputs.is_empty() {
        return Err(AppError::ValidationError("itinerary has no segments".to_string()));
    }
    inputs.into_iter().map(SegmentInput::into_segment).collect()
}

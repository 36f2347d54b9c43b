use axum::{extract::State, Json};

use aeropath_core::AirlineRecord;

use crate::error::AppError;
use crate::state::AppState;

/// GET /v1/airlines
/// Full airline catalog rows, sorted by code.
pub async fn list_airlines(
    State(state): State<AppState>,
) -> Result<Json<Vec<AirlineRecord>>, AppError> {
    let mut rows: Vec<AirlineRecord> = state.catalog.records().cloned().collect();
    rows.sort_by(|a, b| a.code.cmp(&b.code));
    Ok(Json(rows))
}

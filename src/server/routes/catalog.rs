use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::booking::payload::{feature_catalogue, feature_groups, owner_payload};
use crate::server::error::ApiError;
use crate::server::routes::fetch_json;
use crate::server::server::AppState;

pub async fn list_owners(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    fetch_json(&state, "owners", &["owners"], |response| {
        format!("Error fetching owners: {}", response.reason())
    })
    .await
}

pub async fn create_owner(
    State(state): State<AppState>,
    form: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    state.booking.endpoint()?;
    let Json(form) = form?;

    let owner = owner_payload(&form);
    debug!("transformed owner data: {}", owner);

    let response = state
        .booking
        .send("owners", Method::POST, &["owners"], Some(&owner))
        .await?;
    if !response.is_success() {
        let message = format!("Error creating owner: {}", response.reason());
        return Err(ApiError::upstream(&response, message));
    }
    Ok(Json(response.json()?))
}

pub async fn list_countries(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    fetch_json(&state, "countries", &["countries"], |response| {
        format!("Error fetching countries: {}", response.reason())
    })
    .await
}

/// Feature catalogue, always shaped as `{ results, total }`.
pub async fn list_features(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let Json(data) = fetch_json(&state, "features", &["features"], |response| {
        format!("Error fetching features: {}", response.reason())
    })
    .await?;

    let catalogue = feature_catalogue(data).ok_or_else(|| {
        error!("features response is neither an object nor an array");
        ApiError::InvalidResponse {
            error: "Invalid API response format".to_owned(),
            details: None,
        }
    })?;

    let groups = feature_groups(&catalogue);
    info!(
        "fetched {} features in {} groups",
        catalogue["results"].as_array().map_or(0, Vec::len),
        groups.len()
    );
    debug!("feature groups: {}", groups.join(", "));

    Ok(Json(catalogue))
}

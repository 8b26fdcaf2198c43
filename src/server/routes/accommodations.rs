use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::booking::payload::{
    accommodation_features_payload, accommodation_id, accommodation_payload,
    missing_accommodation_fields, rooms_payload,
};
use crate::helpers::time::today_utc;
use crate::server::error::ApiError;
use crate::server::routes::{fetch_json, saved};
use crate::server::server::AppState;

#[derive(Debug, Deserialize)]
pub struct AccommodationQuery {
    pub id: Option<String>,
}

pub async fn get_accommodations(
    State(state): State<AppState>,
    Query(query): Query<AccommodationQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = query.id.filter(|id| !id.is_empty());
    let segments: Vec<&str> = match id.as_deref() {
        Some(id) => vec!["accommodations", id],
        None => vec!["accommodations"],
    };

    fetch_json(&state, "accommodations", &segments, |response| {
        format!("Error fetching accommodations: {}", response.reason())
    })
    .await
}

/// Creates an accommodation, or updates it when the body carries an `id`.
pub async fn save_accommodation(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    state.booking.endpoint()?;
    let Json(data) = body?;

    let missing = missing_accommodation_fields(&data);
    if !missing.is_empty() {
        return Err(ApiError::MissingFields(missing));
    }

    let id = accommodation_id(&data);
    let (method, segments) = match id.as_deref() {
        Some(id) => (Method::PUT, vec!["accommodations", id]),
        None => (Method::POST, vec!["accommodations"]),
    };
    let (doing, done) = verbs(&method);

    let payload = accommodation_payload(data, today_utc());
    debug!("sending accommodation: {}", payload);

    let response = state
        .booking
        .send("accommodations", method, &segments, Some(&payload))
        .await?;
    if !response.is_success() {
        return Err(ApiError::upstream(&response, format!("Error {doing} accommodation")));
    }

    Ok(saved(format!("Accommodation {done} successfully"), response.json()?))
}

pub async fn list_rooms(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    fetch_json(&state, "rooms", &["accommodations", id.as_str(), "rooms"], |_| {
        format!("Error fetching rooms for accommodation {id}")
    })
    .await
}

pub async fn create_rooms(
    State(state): State<AppState>,
    Path(id): Path<String>,
    rooms: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    send_rooms(&state, Method::POST, &id, rooms).await
}

pub async fn update_rooms(
    State(state): State<AppState>,
    Path(id): Path<String>,
    rooms: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    send_rooms(&state, Method::PUT, &id, rooms).await
}

async fn send_rooms(
    state: &AppState,
    method: Method,
    id: &str,
    rooms: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    state.booking.endpoint()?;
    let Json(rooms) = rooms?;

    let (doing, done) = verbs(&method);
    let payload = rooms_payload(rooms, id);

    let response = state
        .booking
        .send("rooms", method, &["accommodations", id, "rooms"], Some(&payload))
        .await?;
    if !response.is_success() {
        return Err(ApiError::upstream(&response, format!("Error {doing} rooms for accommodation {id}")));
    }

    Ok(saved(format!("Rooms {done} successfully"), response.json()?))
}

fn verbs(method: &Method) -> (&'static str, &'static str) {
    if *method == Method::PUT {
        ("updating", "updated")
    } else {
        ("creating", "created")
    }
}

pub async fn list_accommodation_features(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    fetch_json(&state, "accommodation_features", &["accommodations", id.as_str(), "features"], |_| {
        format!("Error fetching features for accommodation {id}")
    })
    .await
}

/// Sets feature quantities. The booking API may answer with an empty or
/// non-JSON body on success; the sent payload is echoed back in that case.
pub async fn update_accommodation_features(
    State(state): State<AppState>,
    Path(id): Path<String>,
    features: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    state.booking.endpoint()?;
    let Json(features) = features?;

    let payload = accommodation_features_payload(features, &id);
    debug!("processed feature data: {}", payload);

    let response = state
        .booking
        .send(
            "accommodation_features",
            Method::PUT,
            &["accommodations", id.as_str(), "features"],
            Some(&payload),
        )
        .await?;

    if response.body.trim().is_empty() {
        if response.is_success() {
            return Ok(saved("Features updated successfully (no content returned)", payload));
        }
        return Err(ApiError::Upstream {
            status: response.status,
            error: format!("Error updating features: {}", response.status),
            message: "Empty response from external API".to_owned(),
            details: Value::Null,
        });
    }

    let data = match serde_json::from_str::<Value>(&response.body) {
        Ok(data) => data,
        Err(e) if response.is_success() => {
            warn!("features update answered with non-JSON body: {}", e);
            let mut body = saved("Features updated successfully (non-JSON response)", payload);
            body.0["rawResponse"] = Value::String(response.body);
            return Ok(body);
        }
        Err(_) => {
            return Err(ApiError::InvalidResponse {
                error: "Error updating features: Invalid JSON response".to_owned(),
                details: Some(response.body),
            });
        }
    };

    if !response.is_success() {
        let message = format!("Error updating features for accommodation {id}");
        return Err(ApiError::upstream_with_details(&response, message, data));
    }

    Ok(saved("Features updated successfully", data))
}

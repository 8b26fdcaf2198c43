use axum::Json;
use reqwest::Method;
use serde_json::{json, Value};

use crate::booking::client::BookingResponse;
use crate::server::error::ApiError;
use crate::server::server::AppState;

pub mod accommodations;
pub mod catalog;
pub mod health;
pub mod token;

/// GET a booking resource and pass its JSON through unchanged.
async fn fetch_json(
    state: &AppState,
    route: &str,
    segments: &[&str],
    error: impl FnOnce(&BookingResponse) -> String,
) -> Result<Json<Value>, ApiError> {
    let response = state.booking.send(route, Method::GET, segments, None).await?;
    if !response.is_success() {
        let message = error(&response);
        return Err(ApiError::upstream(&response, message));
    }
    Ok(Json(response.json()?))
}

/// `{ success, message, data }` envelope used by write routes
fn saved(message: impl Into<String>, data: Value) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": message.into(),
        "data": data,
    }))
}

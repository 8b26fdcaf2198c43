use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::provider::TokenProvider;
use crate::server::error::ApiError;
use crate::server::server::AppState;

/// Hands the current bearer token to the form.
pub async fn get_token(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let token = state
        .booking
        .tokens()
        .get_token()
        .await
        .map_err(ApiError::from_token_refresh)?;
    Ok(Json(json!({ "accessToken": token })))
}

//! API handlers.

use axum::body::Bytes;
use axum::extract::FromRequest;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub mod accounts;
pub mod ads;
pub mod health;
pub mod quests;
pub mod streaks;

/// JSON body extractor that reports rejections in the API error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Parse a JSON body that may be omitted entirely.
fn optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

//! Request extractors

use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde_json::Value;

use crate::item::{FromPayload, ValidationErrors};

use super::errors::ApiError;

/// A JSON body decoded and validated as `T`.
///
/// Malformed JSON, a non-object body and field failures all reject with
/// 422 before the handler runs.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: FromPayload,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ValidationErrors::single("body", rejection.body_text()))?;

        let body = match body {
            Value::Object(map) => map,
            other => {
                return Err(ValidationErrors::single(
                    "body",
                    format!("expected a JSON object, got {}", json_kind(&other)),
                )
                .into())
            }
        };

        Ok(Self(T::from_payload(body)?))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

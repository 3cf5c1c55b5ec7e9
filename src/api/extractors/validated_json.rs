//! Validated JSON extractor - Combines deserialization with validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::{AppError, FieldError};

/// Validated JSON extractor that automatically validates requests.
///
/// Validation failures are reported per field so clients can re-render
/// forms with the offending inputs highlighted.
///
/// # Example
///
/// ```rust,ignore
/// use serde::Deserialize;
/// use validator::Validate;
/// use course_registry::api::extractors::ValidatedJson;
///
/// #[derive(Deserialize, Validate)]
/// struct LoginRequest {
///     #[validate(length(min = 3))]
///     identifier: String,
///     password: String,
/// }
///
/// async fn login(ValidatedJson(payload): ValidatedJson<LoginRequest>) {
///     // payload is already validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::validation(collect_field_errors(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// Flatten validator's error map into field-scoped errors
fn collect_field_errors(errors: &validator::ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                FieldError::new(field.to_string(), message)
            })
        })
        .collect()
}

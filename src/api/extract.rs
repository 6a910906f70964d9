use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};

use super::ApiError;
use crate::models::{Email, MissingEmail};

#[derive(Debug, Deserialize)]
struct EmailQuery {
    email: Option<String>,
}

/// The `?email=` owner filter every listing endpoint requires. Missing or
/// blank values are rejected before any storage access.
#[derive(Debug, Clone)]
pub struct OwnerEmail(pub Email);

#[async_trait]
impl<S> FromRequestParts<S> for OwnerEmail
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<EmailQuery>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

        let email = match query.email.as_deref() {
            Some(raw) => Email::parse(raw)?,
            None => return Err(MissingEmail.into()),
        };
        Ok(Self(email))
    }
}

/// `Json` whose rejections surface as 400 validation errors.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

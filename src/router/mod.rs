//! HTTP routes.
pub mod login;
pub mod register;

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ServerError;

/// JSON body deserialized then checked with [`Validate`].
pub struct Valid<T>(pub T);

impl<T, S> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Valid(value))
    }
}

/// Build a state around any repository.
#[cfg(test)]
pub fn state(users: std::sync::Arc<dyn crate::user::UserRepository>) -> crate::AppState {
    crate::AppState {
        users,
        metrics: None,
    }
}

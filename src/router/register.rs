use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::router::Valid;
use crate::user::NewUser;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(required, length(min = 1, message = "Name is required."))]
    name: Option<String>,
    #[validate(required, length(min = 1, message = "Email is required."))]
    email: Option<String>,
    #[validate(required, length(min = 1, message = "Password is required."))]
    password: Option<String>,
}

impl Body {
    fn into_user(self) -> NewUser {
        NewUser {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
        }
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    pub user_id: i32,
}

/// Handler to register a user.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<Json<Response>> {
    let user = body.into_user();

    if state.users.email_exists(&user.email).await? {
        return Err(ServerError::EmailTaken);
    }

    let Some(user_id) = state.users.insert(&user).await? else {
        // Someone registered the same email since the check above.
        return Err(ServerError::EmailTaken);
    };

    tracing::info!(user_id, "user registered");

    Ok(Json(Response {
        success: true,
        user_id,
    }))
}

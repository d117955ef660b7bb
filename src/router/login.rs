use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::{BareError, ServerError};
use crate::router::Valid;
use crate::user::User;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(required, length(min = 1))]
    email: Option<String>,
    #[validate(required, length(min = 1))]
    password: Option<String>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    pub user: User,
}

/// Handler to check credentials.
pub async fn handler(
    State(state): State<AppState>,
    body: Result<Valid<Body>, ServerError>,
) -> Result<Json<Response>, BareError> {
    let body = match body {
        Ok(Valid(body)) => body,
        Err(err) if err.is_transport() => return Err(err.bare()),
        Err(_) => return Err(ServerError::MissingCredentials.bare()),
    };
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(ServerError::MissingCredentials.bare());
    };

    let user = state
        .users
        .find_by_credentials(&email, &password)
        .await
        .map_err(ServerError::bare)?;

    match user {
        Some(user) => Ok(Json(Response {
            success: true,
            user,
        })),
        None => {
            tracing::debug!("login refused, invalid credentials");
            Err(ServerError::InvalidCredentials.bare())
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    use super::*;
    use crate::user::{
        MemoryUserRepository, NewUser, UnavailableUserRepository, UserRepository,
    };
    use crate::*;

    async fn login(app: Router, body: Value) -> (StatusCode, Value) {
        let response =
            make_request(app, Method::POST, "/login", body.to_string()).await;
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn with_ana() -> Arc<MemoryUserRepository> {
        let repo = Arc::new(MemoryUserRepository::new());
        repo.insert(&NewUser {
            name: "Ana".into(),
            email: "ana@x.com".into(),
            password: "p1".into(),
        })
        .await
        .unwrap();
        repo
    }

    #[tokio::test]
    async fn test_login_handler() {
        let app = app(router::state(with_ana().await));

        let (status, body) =
            login(app, json!({ "email": "ana@x.com", "password": "p1" })).await;
        assert_eq!(status, StatusCode::OK);

        let body: Response = serde_json::from_value(body).unwrap();
        assert_eq!(
            body,
            Response {
                success: true,
                user: User {
                    id: 1,
                    name: "Ana".into(),
                    email: "ana@x.com".into(),
                    password: "p1".into(),
                },
            }
        );
    }

    #[tokio::test]
    async fn test_login_is_repeatable() {
        let repo = with_ana().await;
        let app = app(router::state(repo.clone()));
        let body = json!({ "email": "ana@x.com", "password": "p1" });

        let (_, first) = login(app.clone(), body.clone()).await;
        for _ in 0..3 {
            let (status, again) = login(app.clone(), body.clone()).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(again, first);
        }
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_login_with_invalid_credentials() {
        let app = app(router::state(with_ana().await));

        for body in [
            json!({ "email": "ana@x.com", "password": "wrong" }),
            json!({ "email": "bob@x.com", "password": "p1" }),
        ] {
            let (status, body) = login(app.clone(), body).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body, json!({ "message": "Invalid credentials." }));
        }
    }

    #[tokio::test]
    async fn test_login_with_missing_fields() {
        let app = app(router::state(Arc::new(UnavailableUserRepository)));

        // No database access happens, or these would be 500.
        for body in [
            json!({ "email": "ana@x.com" }),
            json!({ "password": "p1" }),
            json!({ "email": "", "password": "p1" }),
            json!("ana@x.com"),
        ] {
            let (status, body) = login(app.clone(), body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(
                body,
                json!({ "message": "Email and password are required." })
            );
        }
    }

    #[tokio::test]
    async fn test_login_with_database_down() {
        let app = app(router::state(Arc::new(UnavailableUserRepository)));

        let (status, body) =
            login(app, json!({ "email": "ana@x.com", "password": "p1" })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "Internal server error." }));
    }

    #[tokio::test]
    async fn test_login_with_oversized_body() {
        let app = app(router::state(Arc::new(UnavailableUserRepository)));

        let (status, body) = login(
            app,
            json!({ "email": "ana@x.com", "password": "p".repeat(3 * 1024 * 1024) }),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body, json!({ "message": "Payload too large." }));
    }
}

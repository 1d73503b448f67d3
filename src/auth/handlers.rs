use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MessageResponse, PublicUser, SignupRequest},
        password::{hash_password_blocking, verify_password_blocking},
        repo::CreateUserError,
    },
    error::ApiError,
    extract::ApiJson,
    state::AppState,
};

const USER_EXISTS: &str = "User already exists";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let payload = payload.validate()?;

    let existing = state
        .users
        .find_by_email(&payload.email)
        .await
        .map_err(|e| ApiError::internal("Error creating user", e))?;
    if existing.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict(USER_EXISTS.into()));
    }

    let hash = hash_password_blocking(payload.password)
        .await
        .map_err(|e| ApiError::internal("Error creating user", e))?;

    let user = match state.users.create(&payload.name, &payload.email, &hash).await {
        Ok(u) => u,
        Err(CreateUserError::EmailTaken) => {
            warn!(email = %payload.email, "email registered concurrently");
            return Err(ApiError::Conflict(USER_EXISTS.into()));
        }
        Err(CreateUserError::Other(e)) => {
            return Err(ApiError::internal("Error creating user", e));
        }
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created successfully")),
    ))
}

/// Unknown email (404) and wrong password (400) are reported differently, which
/// tells a caller whether an account exists for an email. Kept on purpose so
/// existing clients see the same statuses and messages.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let payload = payload.validate()?;

    let user = state
        .users
        .find_by_email(&payload.email)
        .await
        .map_err(|e| ApiError::internal("Error signing in", e))?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::NotFound("User not found".into())
        })?;

    let ok = verify_password_blocking(payload.password, user.password_hash.clone())
        .await
        .map_err(|e| ApiError::internal("Error signing in", e))?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials("Invalid password".into()));
    }

    let token = state
        .jwt
        .sign(user.id)
        .map_err(|e| ApiError::internal("Error signing in", e))?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: PublicUser {
            name: user.name,
            email: user.email,
        },
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::{
        state::AppState,
        test_support::{login_token, send, signup_user},
    };

    #[tokio::test]
    async fn signup_creates_exactly_one_user_without_plaintext() {
        let (state, users, _) = AppState::fake_with_stores();

        let (status, body) = send(
            &state,
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({ "name": "Ann", "email": "ann@example.com", "password": "hunter22" })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({ "message": "User created successfully" }));
        assert!(!body.to_string().contains("hunter22"));

        assert_eq!(users.count(), 1);
        let stored = &users.all()[0];
        assert_eq!(stored.name, "Ann");
        assert_ne!(stored.password_hash, "hunter22");
        assert!(!stored.password_hash.contains("hunter22"));
    }

    #[tokio::test]
    async fn duplicate_signup_is_rejected_and_count_stays_one() {
        let (state, users, _) = AppState::fake_with_stores();
        signup_user(&state, "Ann", "ann@example.com", "pw-one").await;

        let (status, body) = send(
            &state,
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({ "name": "Imposter", "email": "ann@example.com", "password": "pw-two" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "User already exists");
        assert_eq!(users.count(), 1);
        assert_eq!(users.all()[0].name, "Ann");
    }

    #[tokio::test]
    async fn signup_with_missing_fields_is_bad_request() {
        let state = AppState::fake();
        let (status, body) = send(
            &state,
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({ "email": "ann@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn malformed_json_gets_message_body() {
        let state = AppState::fake();
        let (status, body) = send(
            &state,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!("not an object")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn login_returns_token_for_stored_user() {
        let (state, users, _) = AppState::fake_with_stores();
        signup_user(&state, "Ann", "ann@example.com", "s3cret-pw").await;

        let (status, body) = send(
            &state,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ann@example.com", "password": "s3cret-pw" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"], json!({ "name": "Ann", "email": "ann@example.com" }));
        assert!(body.get("password_hash").is_none());

        let token = body["token"].as_str().expect("token");
        let claims = state.jwt.verify(token).expect("token verifies");
        assert_eq!(claims.user_id, users.all()[0].id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_fail_differently() {
        let state = AppState::fake();
        signup_user(&state, "Ann", "ann@example.com", "right-pw").await;

        let (wrong_pw, body) = send(
            &state,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ann@example.com", "password": "wrong-pw" })),
        )
        .await;
        assert_eq!(wrong_pw, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid password");

        let (unknown, body) = send(
            &state,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "right-pw" })),
        )
        .await;
        assert_eq!(unknown, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");
    }

    #[tokio::test]
    async fn login_helper_roundtrip() {
        let state = AppState::fake();
        signup_user(&state, "Bob", "bob@example.com", "pw-bob").await;
        let token = login_token(&state, "bob@example.com", "pw-bob").await;
        assert!(state.jwt.verify(&token).is_ok());
    }
}

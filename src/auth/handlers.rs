use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, SignupRequest, TokenResponse},
        jwt::JwtKeys,
        password,
        repo::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    // Fast-path duplicate check; the UNIQUE constraint in `User::create`
    // catches the race this check can lose.
    if User::find_by_email(&state.db, &payload.email)
        .await?
        .is_some()
    {
        warn!(email = %payload.email, "signup with already registered email");
        return Err(ApiError::DuplicateEmail);
    }

    let hash = password::hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.email, &hash).await?;

    let token = JwtKeys::from_ref(&state).sign(&user)?;
    info!(user_id = user.id, email = %user.email, "user signed up");
    Ok(Json(TokenResponse::new(token)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    // Unknown email and wrong password take the same exit so the response
    // cannot be used to probe which addresses are registered.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(user) => user,
        None => {
            warn!(email = %payload.email, "login with unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !password::verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = user.id, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = JwtKeys::from_ref(&state).sign(&user)?;
    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(TokenResponse::new(token)))
}

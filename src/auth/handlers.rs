use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};

use crate::{
    app::json_body,
    auth::{
        dto::{
            AuthResponse, JwtKeys, LoginRequest, MeResponse, RefreshRequest, RegisterRequest,
            TokenKind,
        },
        jwt::{AuthUser, TokenError},
        password::{credentials_match, hash_new_password, PasswordError},
        services::{new_user_from, validate_registration},
    },
    dates,
    eligibility::Eligibility,
    state::AppState,
    store::StoreError,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

fn signing_failed(e: TokenError) -> (StatusCode, String) {
    error!(error = %e, "jwt sign failed");
    e.into()
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), (StatusCode, String)> {
    let mut payload = json_body(payload)?;
    let blood_group = validate_registration(&mut payload, dates::today_utc()).map_err(|msg| {
        warn!(reason = %msg, "invalid registration");
        (StatusCode::BAD_REQUEST, msg)
    })?;

    // Cheap pre-check so duplicates skip the argon2 round; the store
    // enforces uniqueness again on insert.
    if state.store.get_user_by_username(&payload.username).is_some() {
        warn!(username = %payload.username, "username already taken");
        return Err(StoreError::UsernameTaken(payload.username).into());
    }
    if state.store.get_user_by_email(&payload.email).is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(StoreError::EmailTaken(payload.email).into());
    }

    let hash = hash_new_password(&payload.password).map_err(|e| {
        match e {
            PasswordError::TooShort => warn!(username = %payload.username, "password too short"),
            PasswordError::Hash(_) => error!(error = %e, "hash_new_password failed"),
        }
        <(StatusCode, String)>::from(e)
    })?;

    let user = state
        .store
        .create_user(new_user_from(payload, blood_group, hash))
        .map_err(|e| {
            warn!(error = %e, "create user rejected");
            <(StatusCode, String)>::from(e)
        })?;

    let tokens = JwtKeys::from_ref(&state)
        .issue_pair(user.id)
        .map_err(signing_failed)?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            tokens,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let payload = json_body(payload)?;
    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Username and password are required".into(),
        ));
    }

    let Some(user) = state.store.get_user_by_username(username) else {
        warn!(%username, "login unknown username");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    };

    if !credentials_match(&user, &payload.password) {
        warn!(%username, user_id = user.id, "login invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    }

    let tokens = JwtKeys::from_ref(&state)
        .issue_pair(user.id)
        .map_err(signing_failed)?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(AuthResponse {
        tokens,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let payload = json_body(payload)?;
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .decode_as(&payload.refresh_token, TokenKind::Refresh)
        .map_err(|e| {
            warn!(error = %e, "refresh rejected");
            <(StatusCode, String)>::from(e)
        })?;

    let user = state
        .store
        .get_user(claims.sub)
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    let tokens = keys.issue_pair(user.id).map_err(signing_failed)?;
    Ok(Json(AuthResponse {
        tokens,
        user: user.into(),
    }))
}

/// Tokens are not tracked server-side, so logging out only tells the client
/// to drop its pair.
#[instrument]
pub async fn logout() -> Json<Value> {
    info!("logout acknowledged");
    Json(json!({ "message": "Successfully logged out" }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MeResponse>, (StatusCode, String)> {
    let user = state.store.get_user(user_id).ok_or_else(|| {
        warn!(user_id, "user not found");
        (StatusCode::NOT_FOUND, "User not found".to_string())
    })?;

    let eligibility = Eligibility::evaluate(user.last_donation, dates::today_utc());
    Ok(Json(MeResponse {
        profile: user.into(),
        eligibility,
    }))
}

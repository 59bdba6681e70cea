use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::CreateDonationRequest;
use crate::{
    app::json_body,
    auth::jwt::AuthUser,
    dates,
    eligibility::Eligibility,
    state::AppState,
    store::Donation,
};

pub fn donation_routes() -> Router<AppState> {
    Router::new()
        .route("/donations", get(list_donations).post(create_donation))
        .route("/donations/eligibility", get(get_eligibility))
}

#[instrument(skip(state))]
pub async fn list_donations(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Json<Vec<Donation>> {
    Json(state.store.get_donations_by_user_id(user_id))
}

/// Records a donation for the caller and advances their last donation date.
#[instrument(skip(state, payload))]
pub async fn create_donation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateDonationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Donation>), (StatusCode, String)> {
    let new = json_body(payload)?.into_new_donation(user_id).map_err(|msg| {
        warn!(user_id, reason = %msg, "invalid donation");
        (StatusCode::BAD_REQUEST, msg)
    })?;

    let (donation, owner) = state
        .store
        .record_donation(new, dates::today_utc())
        .map_err(|e| {
            warn!(user_id, error = %e, "donation rejected");
            <(StatusCode, String)>::from(e)
        })?;

    info!(
        user_id,
        donation_id = donation.id,
        last_donation = ?owner.last_donation,
        "donation recorded"
    );
    Ok((StatusCode::CREATED, Json(donation)))
}

#[instrument(skip(state))]
pub async fn get_eligibility(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Eligibility>, (StatusCode, String)> {
    let user = state
        .store
        .get_user(user_id)
        .ok_or((StatusCode::NOT_FOUND, "User not found".to_string()))?;
    Ok(Json(Eligibility::evaluate(user.last_donation, dates::today_utc())))
}

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::{debug, instrument};

use super::dto::{profiles, DonorProfile, DonorQuery, LatestQuery};
use crate::{state::AppState, store::resolve_limit};

pub fn donor_routes() -> Router<AppState> {
    Router::new()
        .route("/donors", get(list_donors))
        .route("/donors/latest", get(latest_donors))
}

#[instrument(skip(state))]
pub async fn list_donors(
    State(state): State<AppState>,
    Query(q): Query<DonorQuery>,
) -> Json<Vec<DonorProfile>> {
    let donors = state.store.all_donors_filtered(&q.into());
    debug!(count = donors.len(), "donor directory listed");
    Json(profiles(donors))
}

#[instrument(skip(state))]
pub async fn latest_donors(
    State(state): State<AppState>,
    Query(q): Query<LatestQuery>,
) -> Json<Vec<DonorProfile>> {
    let limit = resolve_limit(q.limit.as_deref());
    Json(profiles(state.store.latest_donors(limit)))
}

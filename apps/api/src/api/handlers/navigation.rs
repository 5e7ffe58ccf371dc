use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::state::AppState;
use crate::domain::navigation::{nav_items, NavItem};

#[derive(Debug, Serialize)]
pub struct NavResponse {
    pub items: Vec<NavItem>,
}

/// Site navigation entries, filtered by the configured feature flags
///
/// GET /api/nav
pub async fn get_nav(State(state): State<AppState>) -> Json<NavResponse> {
    Json(NavResponse {
        items: nav_items(state.config.nav),
    })
}

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{art, health, navigation, teams, tournaments};
use crate::api::state::AppState;

/// Builds the application router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/api/nav", get(navigation::get_nav))
        // Team routes
        .route("/api/teams", get(teams::list_teams).post(teams::create_team))
        .route(
            "/api/teams/:custom_url",
            get(teams::get_team)
                .patch(teams::update_team)
                .delete(teams::delete_team),
        )
        .route("/api/teams/:custom_url/main", post(teams::make_main_team))
        .route(
            "/api/teams/:custom_url/images/:image_type",
            delete(teams::remove_team_image),
        )
        .route(
            "/api/teams/:custom_url/invite-code",
            post(teams::reset_invite_code),
        )
        .route("/api/teams/:custom_url/join", post(teams::join_team))
        .route("/api/teams/:custom_url/leave", post(teams::leave_team))
        .route("/api/users/:id/teams", get(teams::get_user_teams))
        // Art routes
        .route("/api/art", post(art::create_art))
        .route("/api/art/:id", put(art::edit_art))
        // Tournament routes
        .route(
            "/api/tournaments/:id/quick-action",
            get(tournaments::get_quick_action),
        )
        .route("/api/tournaments/:id/actions", post(tournaments::post_action))
        .route(
            "/api/tournaments/:id/brackets/:idx",
            get(tournaments::get_bracket),
        )
        .route("/api/tournaments/:id/streams", get(tournaments::get_streams))
        .route(
            "/api/tournaments/:id/matches/:match_id/streams",
            get(tournaments::get_match_streams),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Shared state
        .with_state(state)
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::middleware::{JwtAuth, MaybeAuth};
use crate::api::state::AppState;
use crate::domain::tournament::streams::{streaming_participants, streams_of_match};
use crate::domain::tournament::urls::tournament_streams_page;
use crate::domain::tournament::{
    MatchView, MatchViewOptions, QuickAction, TournamentAction, TournamentContext,
    TournamentStream,
};

#[derive(Debug, Default, Deserialize)]
pub struct BracketQuery {
    #[serde(default)]
    pub preview: bool,
    #[serde(default)]
    pub simulation: bool,
}

#[derive(Debug, Serialize)]
pub struct BracketResponse {
    pub bracket_idx: usize,
    pub name: String,
    pub matches: Vec<MatchView>,
}

#[derive(Debug, Serialize)]
pub struct StreamsResponse {
    pub streams: Vec<TournamentStream>,
}

#[derive(Debug, Serialize)]
pub struct MatchStreamsResponse {
    pub streams: Vec<TournamentStream>,
    pub streams_page: String,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub action: &'static str,
    pub team_id: i64,
}

async fn load_context(state: &AppState, tournament_id: i64) -> Result<TournamentContext, ApiError> {
    state
        .tournaments
        .find_context(tournament_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Tournament not found: {}", tournament_id)))
}

/// Quick action of the viewer's team, `null` for visitors and non-participants
///
/// GET /api/tournaments/:id/quick-action
pub async fn get_quick_action(
    State(state): State<AppState>,
    MaybeAuth(viewer): MaybeAuth,
    Path(tournament_id): Path<i64>,
) -> Result<Json<Option<QuickAction>>, ApiError> {
    let ctx = load_context(&state, tournament_id).await?;
    let Some(user_id) = viewer else {
        return Ok(Json(None));
    };

    let now = Utc::now();
    let action = ctx
        .team_member_of_progress_status(user_id, now)
        .and_then(|status| QuickAction::resolve(&ctx, &status, user_id, now));

    Ok(Json(action))
}

/// Check-in actions posted from the tournament pages
///
/// POST /api/tournaments/:id/actions
pub async fn post_action(
    State(state): State<AppState>,
    JwtAuth(user_id): JwtAuth,
    Path(tournament_id): Path<i64>,
    Json(action): Json<TournamentAction>,
) -> Result<(StatusCode, Json<ActionResponse>), ApiError> {
    let ctx = load_context(&state, tournament_id).await?;
    let now = Utc::now();

    let team_id = match action {
        TournamentAction::CheckIn { .. } => {
            let team = ctx.validate_check_in(user_id)?;
            state.tournaments.check_in(team.id, now).await?;
            team.id
        }
        TournamentAction::BracketCheckIn { bracket_idx } => {
            let team = ctx.validate_bracket_check_in(user_id, bracket_idx, now)?;
            state
                .tournaments
                .bracket_check_in(tournament_id, bracket_idx, team.id, now)
                .await?;
            team.id
        }
    };

    tracing::info!(
        tournament_id,
        user_id,
        team_id,
        action = action.discriminator(),
        "Tournament action handled"
    );

    Ok((
        StatusCode::OK,
        Json(ActionResponse {
            action: action.discriminator(),
            team_id,
        }),
    ))
}

/// All match views of one bracket in round order
///
/// GET /api/tournaments/:id/brackets/:idx
pub async fn get_bracket(
    State(state): State<AppState>,
    MaybeAuth(viewer): MaybeAuth,
    Path((tournament_id, bracket_idx)): Path<(i64, usize)>,
    Query(query): Query<BracketQuery>,
) -> Result<Json<BracketResponse>, ApiError> {
    let ctx = load_context(&state, tournament_id).await?;
    let bracket = ctx
        .bracket(bracket_idx)
        .ok_or_else(|| ApiError::not_found(format!("Bracket not found: {}", bracket_idx)))?;

    let streams = state.tournaments.streams(tournament_id).await?;
    let streaming = streaming_participants(&streams);
    let opts = MatchViewOptions {
        is_preview: query.preview,
        show_simulation: query.simulation,
    };

    let mut matches: Vec<_> = ctx.matches_of_bracket(bracket_idx).collect();
    matches.sort_by_key(|m| (m.round_number, m.number));

    let views = matches
        .into_iter()
        .map(|m| MatchView::build(&ctx, m, opts, viewer, &streaming))
        .collect();

    Ok(Json(BracketResponse {
        bracket_idx,
        name: bracket.name.clone(),
        matches: views,
    }))
}

/// Streams of a tournament, most watched first
///
/// GET /api/tournaments/:id/streams
pub async fn get_streams(
    State(state): State<AppState>,
    Path(tournament_id): Path<i64>,
) -> Result<Json<StreamsResponse>, ApiError> {
    let streams = state.tournaments.streams(tournament_id).await?;

    Ok(Json(StreamsResponse { streams }))
}

/// Streams showing one match
///
/// GET /api/tournaments/:id/matches/:match_id/streams
pub async fn get_match_streams(
    State(state): State<AppState>,
    Path((tournament_id, match_id)): Path<(i64, i64)>,
) -> Result<Json<MatchStreamsResponse>, ApiError> {
    let ctx = load_context(&state, tournament_id).await?;
    let m = ctx
        .match_by_id(match_id)
        .ok_or_else(|| ApiError::not_found(format!("Match not found: {}", match_id)))?;

    let streams = state.tournaments.streams(tournament_id).await?;
    let streams = streams_of_match(&ctx, m, &streams)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(MatchStreamsResponse {
        streams,
        streams_page: tournament_streams_page(tournament_id),
    }))
}

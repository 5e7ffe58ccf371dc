use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::middleware::{JwtAuth, MaybeAuth};
use crate::api::state::AppState;
use crate::domain::repositories::{CreateTeam, MemberLeaving, NewTeamMember, UpdateTeam};
use crate::domain::team::{
    max_teams_allowed, CustomUrl, MemberOfTeam, TeamDetails, TeamImageType, TeamListing, TeamName,
    TeamRow, UserTeam,
};

/// Request body for creating a team
#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
}

/// Response from team creation
#[derive(Debug, Serialize)]
pub struct CreateTeamResponse {
    pub id: i64,
    pub custom_url: String,
}

/// Request body for editing a team's profile
#[derive(Debug, Deserialize)]
pub struct UpdateTeamRequest {
    pub name: String,
    pub bio: Option<String>,
    pub bsky: Option<String>,
    pub css: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JoinTeamRequest {
    pub invite_code: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaveTeamRequest {
    pub new_owner_user_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TeamListResponse {
    pub teams: Vec<TeamListing>,
}

#[derive(Debug, Serialize)]
pub struct UserTeamsResponse {
    pub teams: Vec<UserTeam>,
    pub member_of: Vec<MemberOfTeam>,
}

/// Loads a team, including its invite code so callers can decide who sees it
async fn load_team(state: &AppState, custom_url: &str) -> Result<TeamDetails, ApiError> {
    state
        .teams
        .find_by_custom_url(custom_url, true)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Team not found: {}", custom_url)))
}

async fn load_managed_team(
    state: &AppState,
    custom_url: &str,
    user_id: i64,
) -> Result<TeamDetails, ApiError> {
    let team = load_team(state, custom_url).await?;
    if !team.can_manage(user_id) {
        return Err(ApiError::forbidden("Only the owner or a manager can do this"));
    }

    Ok(team)
}

fn parse_name(name: &str) -> Result<(TeamName, CustomUrl), ApiError> {
    let name = TeamName::new(name).map_err(ApiError::bad_request)?;
    let custom_url = CustomUrl::from_name(name.as_str()).map_err(ApiError::bad_request)?;

    Ok((name, custom_url))
}

/// List all undisbanded teams
///
/// GET /api/teams
pub async fn list_teams(
    State(state): State<AppState>,
) -> Result<Json<TeamListResponse>, ApiError> {
    let teams = state.teams.find_all_undisbanded().await?;

    Ok(Json(TeamListResponse { teams }))
}

/// Create a new team owned by the caller
///
/// POST /api/teams
pub async fn create_team(
    State(state): State<AppState>,
    JwtAuth(user_id): JwtAuth,
    Json(req): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<CreateTeamResponse>), ApiError> {
    let (name, custom_url) = parse_name(&req.name)?;

    if state
        .teams
        .find_by_custom_url(custom_url.as_str(), false)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict(format!(
            "Team URL already taken: {}",
            custom_url
        )));
    }

    let current_teams = state.teams.teams_by_member_user_id(user_id).await?;
    let patron_tier = state.teams.patron_tier_of(user_id).await?;
    if current_teams.len() >= max_teams_allowed(patron_tier) {
        return Err(ApiError::bad_request("Trying to exceed allowed team count"));
    }

    let id = state
        .teams
        .create(CreateTeam {
            name: name.into_inner(),
            custom_url: custom_url.as_str().to_string(),
            owner_user_id: user_id,
            is_main_team: current_teams.is_empty(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTeamResponse {
            id,
            custom_url: custom_url.as_str().to_string(),
        }),
    ))
}

/// Team page; the invite code is only shown to the owner and managers
///
/// GET /api/teams/:custom_url
pub async fn get_team(
    State(state): State<AppState>,
    MaybeAuth(viewer): MaybeAuth,
    Path(custom_url): Path<String>,
) -> Result<Json<TeamDetails>, ApiError> {
    let mut team = load_team(&state, &custom_url).await?;

    if !viewer.is_some_and(|user_id| team.can_manage(user_id)) {
        team.invite_code = None;
    }

    Ok(Json(team))
}

/// Edit the team's profile
///
/// PATCH /api/teams/:custom_url
pub async fn update_team(
    State(state): State<AppState>,
    JwtAuth(user_id): JwtAuth,
    Path(custom_url): Path<String>,
    Json(req): Json<UpdateTeamRequest>,
) -> Result<Json<TeamRow>, ApiError> {
    let team = load_managed_team(&state, &custom_url, user_id).await?;
    let (name, new_custom_url) = parse_name(&req.name)?;

    if new_custom_url.as_str() != team.custom_url {
        if let Some(existing) = state
            .teams
            .find_by_custom_url(new_custom_url.as_str(), false)
            .await?
        {
            if existing.id != team.id {
                return Err(ApiError::conflict(format!(
                    "Team URL already taken: {}",
                    new_custom_url
                )));
            }
        }
    }

    let updated = state
        .teams
        .update(UpdateTeam {
            id: team.id,
            name: name.into_inner(),
            custom_url: new_custom_url.as_str().to_string(),
            bio: req.bio,
            bsky: req.bsky,
            css: req.css,
        })
        .await?;

    Ok(Json(updated))
}

/// Disband a team
///
/// DELETE /api/teams/:custom_url
pub async fn delete_team(
    State(state): State<AppState>,
    JwtAuth(user_id): JwtAuth,
    Path(custom_url): Path<String>,
) -> Result<StatusCode, ApiError> {
    let team = load_team(&state, &custom_url).await?;
    if !team.is_owner(user_id) {
        return Err(ApiError::forbidden("Only the owner can delete the team"));
    }

    state.teams.delete(team.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Make the team the caller's main team
///
/// POST /api/teams/:custom_url/main
pub async fn make_main_team(
    State(state): State<AppState>,
    JwtAuth(user_id): JwtAuth,
    Path(custom_url): Path<String>,
) -> Result<StatusCode, ApiError> {
    let team = load_team(&state, &custom_url).await?;
    state.teams.switch_main_team(user_id, team.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove the avatar or banner of a team
///
/// DELETE /api/teams/:custom_url/images/:image_type
pub async fn remove_team_image(
    State(state): State<AppState>,
    JwtAuth(user_id): JwtAuth,
    Path((custom_url, image_type)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let image_type: TeamImageType = image_type.parse().map_err(ApiError::bad_request)?;
    let team = load_managed_team(&state, &custom_url, user_id).await?;

    state.teams.remove_team_image(team.id, image_type).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Invalidate the current invite link
///
/// POST /api/teams/:custom_url/invite-code
pub async fn reset_invite_code(
    State(state): State<AppState>,
    JwtAuth(user_id): JwtAuth,
    Path(custom_url): Path<String>,
) -> Result<StatusCode, ApiError> {
    let team = load_managed_team(&state, &custom_url, user_id).await?;
    state.teams.reset_invite_code(team.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Join a team with its invite code
///
/// POST /api/teams/:custom_url/join
pub async fn join_team(
    State(state): State<AppState>,
    JwtAuth(user_id): JwtAuth,
    Path(custom_url): Path<String>,
    Json(req): Json<JoinTeamRequest>,
) -> Result<StatusCode, ApiError> {
    let team = load_team(&state, &custom_url).await?;

    if team.invite_code.as_deref() != Some(req.invite_code.as_str()) {
        return Err(ApiError::bad_request("Invalid invite code"));
    }
    if team.member(user_id).is_some() {
        return Err(ApiError::conflict("Already a member of this team"));
    }

    let patron_tier = state.teams.patron_tier_of(user_id).await?;
    state
        .teams
        .add_new_team_member(NewTeamMember {
            user_id,
            team_id: team.id,
            max_teams_allowed: max_teams_allowed(patron_tier),
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Leave a team; an owner names who takes over
///
/// POST /api/teams/:custom_url/leave
pub async fn leave_team(
    State(state): State<AppState>,
    JwtAuth(user_id): JwtAuth,
    Path(custom_url): Path<String>,
    body: Option<Json<LeaveTeamRequest>>,
) -> Result<StatusCode, ApiError> {
    let team = load_team(&state, &custom_url).await?;
    let Json(req) = body.unwrap_or_default();

    state
        .teams
        .handle_member_leaving(MemberLeaving {
            user_id,
            team_id: team.id,
            new_owner_user_id: req.new_owner_user_id,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Teams of a user, as shown on their profile
///
/// GET /api/users/:id/teams
pub async fn get_user_teams(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserTeamsResponse>, ApiError> {
    let teams = state.teams.teams_by_member_user_id(user_id).await?;
    let member_of = state.teams.find_all_member_of_by_user_id(user_id).await?;

    Ok(Json(UserTeamsResponse { teams, member_of }))
}

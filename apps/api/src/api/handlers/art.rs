use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::middleware::JwtAuth;
use crate::api::state::AppState;
use crate::domain::art::{ArtEdit, NewArt, TagToAdd};
use crate::infrastructure::database::timestamp_now;

/// Request body for submitting art
#[derive(Debug, Deserialize)]
pub struct NewArtRequest {
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub linked_users: Vec<i64>,
    #[serde(default)]
    pub tags: Vec<TagToAdd>,
}

/// Request body for editing art
#[derive(Debug, Deserialize)]
pub struct EditArtRequest {
    pub description: Option<String>,
    #[serde(default)]
    pub is_showcase: bool,
    #[serde(default)]
    pub linked_users: Vec<i64>,
    #[serde(default)]
    pub tags: Vec<TagToAdd>,
}

#[derive(Debug, Serialize)]
pub struct ArtResponse {
    pub id: i64,
}

/// Submit a new art piece
///
/// Images of patrons skip the validation queue.
///
/// POST /api/art
pub async fn create_art(
    State(state): State<AppState>,
    JwtAuth(user_id): JwtAuth,
    Json(req): Json<NewArtRequest>,
) -> Result<(StatusCode, Json<ArtResponse>), ApiError> {
    let patron_tier = state.teams.patron_tier_of(user_id).await?;

    let id = state
        .art
        .add_new_art(NewArt {
            author_id: user_id,
            description: req.description,
            url: req.url,
            validated_at: patron_tier.map(|_| timestamp_now()),
            linked_users: req.linked_users,
            tags: req.tags,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ArtResponse { id })))
}

/// Edit an art piece of the caller
///
/// PUT /api/art/:id
pub async fn edit_art(
    State(state): State<AppState>,
    JwtAuth(user_id): JwtAuth,
    Path(art_id): Path<i64>,
    Json(req): Json<EditArtRequest>,
) -> Result<Json<ArtResponse>, ApiError> {
    let art = state
        .art
        .find_by_id(art_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Art not found: {}", art_id)))?;

    if art.author_id != user_id {
        return Err(ApiError::forbidden("Only the author can edit this art"));
    }

    let id = state
        .art
        .edit_art(ArtEdit {
            art_id,
            author_id: user_id,
            description: req.description,
            is_showcase: req.is_showcase,
            linked_users: req.linked_users,
            tags: req.tags,
        })
        .await?;

    Ok(Json(ArtResponse { id }))
}

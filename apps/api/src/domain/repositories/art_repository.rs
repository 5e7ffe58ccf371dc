use async_trait::async_trait;

use super::errors::RepositoryResult;
use crate::domain::art::{Art, ArtEdit, NewArt};

/// Repository trait for art submissions
#[async_trait]
pub trait ArtRepository: Send + Sync {
    /// Stores the image, the art row, linked users and tags.
    /// A user's first art piece becomes their showcase.
    async fn add_new_art(&self, args: NewArt) -> RepositoryResult<i64>;

    /// Updates an art piece, replacing its linked users and tags
    async fn edit_art(&self, args: ArtEdit) -> RepositoryResult<i64>;

    async fn find_by_id(&self, art_id: i64) -> RepositoryResult<Option<Art>>;
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::errors::RepositoryResult;
use crate::domain::tournament::{TournamentContext, TournamentStream};

/// Repository trait for tournament state written by the bracket engine
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    async fn find_context(&self, tournament_id: i64) -> RepositoryResult<Option<TournamentContext>>;

    async fn streams(&self, tournament_id: i64) -> RepositoryResult<Vec<TournamentStream>>;

    /// Records a tournament-level check-in
    async fn check_in(&self, team_id: i64, at: DateTime<Utc>) -> RepositoryResult<()>;

    /// Records a check-in to one bracket
    async fn bracket_check_in(
        &self,
        tournament_id: i64,
        bracket_idx: usize,
        team_id: i64,
        at: DateTime<Utc>,
    ) -> RepositoryResult<()>;
}

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::domain::repositories::{ArtRepository, TeamRepository, TournamentRepository};
use crate::infrastructure::repositories::{
    SqliteArtRepository, SqliteTeamRepository, SqliteTournamentRepository,
};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub teams: Arc<dyn TeamRepository>,
    pub art: Arc<dyn ArtRepository>,
    pub tournaments: Arc<dyn TournamentRepository>,
}

impl AppState {
    /// Wires the SQLite repositories onto one pool
    pub fn new(pool: SqlitePool, config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            teams: Arc::new(SqliteTeamRepository::new(pool.clone())),
            art: Arc::new(SqliteArtRepository::new(pool.clone())),
            tournaments: Arc::new(SqliteTournamentRepository::new(pool)),
        }
    }
}

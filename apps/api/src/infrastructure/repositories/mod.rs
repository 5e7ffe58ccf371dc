// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod sqlite_art_repository;
pub mod sqlite_team_repository;
pub mod sqlite_tournament_repository;

pub use sqlite_art_repository::SqliteArtRepository;
pub use sqlite_team_repository::SqliteTeamRepository;
pub use sqlite_tournament_repository::SqliteTournamentRepository;

// Repository contracts implemented by the infrastructure layer

pub mod art_repository;
pub mod errors;
pub mod team_repository;
pub mod tournament_repository;

pub use art_repository::ArtRepository;
pub use errors::{RepositoryError, RepositoryResult};
pub use team_repository::{
    CreateTeam, MemberLeaving, NewTeamMember, TeamRepository, UpdateTeam,
};
pub use tournament_repository::TournamentRepository;

use async_trait::async_trait;

use super::errors::RepositoryResult;
use crate::domain::team::{
    MemberOfTeam, TeamDetails, TeamImageType, TeamListing, TeamRow, UserTeam,
};

/// Input for [`TeamRepository::create`]
#[derive(Debug, Clone)]
pub struct CreateTeam {
    pub name: String,
    pub custom_url: String,
    pub owner_user_id: i64,
    pub is_main_team: bool,
}

/// Input for [`TeamRepository::update`]
#[derive(Debug, Clone)]
pub struct UpdateTeam {
    pub id: i64,
    pub name: String,
    pub custom_url: String,
    pub bio: Option<String>,
    pub bsky: Option<String>,
    pub css: Option<String>,
}

/// Input for [`TeamRepository::add_new_team_member`]
#[derive(Debug, Clone, Copy)]
pub struct NewTeamMember {
    pub user_id: i64,
    pub team_id: i64,
    pub max_teams_allowed: usize,
}

/// Input for [`TeamRepository::handle_member_leaving`]
#[derive(Debug, Clone, Copy)]
pub struct MemberLeaving {
    pub user_id: i64,
    pub team_id: i64,
    pub new_owner_user_id: Option<i64>,
}

/// Repository trait for teams and their memberships
///
/// Reads only see teams that are not disbanded and memberships that are
/// current. Multi-statement writes are atomic.
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// All undisbanded teams with their members
    async fn find_all_undisbanded(&self) -> RepositoryResult<Vec<TeamListing>>;

    /// Teams the user is currently a member of
    async fn find_all_member_of_by_user_id(&self, user_id: i64)
        -> RepositoryResult<Vec<MemberOfTeam>>;

    /// Team page data; the lookup is case-insensitive
    async fn find_by_custom_url(
        &self,
        custom_url: &str,
        include_invite_code: bool,
    ) -> RepositoryResult<Option<TeamDetails>>;

    /// Teams of the user together with the user's membership flags
    async fn teams_by_member_user_id(&self, user_id: i64) -> RepositoryResult<Vec<UserTeam>>;

    /// Creates a team and the owner's membership, returning the team id
    async fn create(&self, args: CreateTeam) -> RepositoryResult<i64>;

    async fn update(&self, args: UpdateTeam) -> RepositoryResult<TeamRow>;

    /// Makes `team_id` the user's only main team
    async fn switch_main_team(&self, user_id: i64, team_id: i64) -> RepositoryResult<()>;

    /// Disbands the team, moving members' main team status elsewhere
    async fn delete(&self, team_id: i64) -> RepositoryResult<()>;

    async fn remove_team_image(
        &self,
        team_id: i64,
        image_type: TeamImageType,
    ) -> RepositoryResult<()>;

    async fn reset_invite_code(&self, team_id: i64) -> RepositoryResult<()>;

    async fn add_new_team_member(&self, args: NewTeamMember) -> RepositoryResult<()>;

    async fn handle_member_leaving(&self, args: MemberLeaving) -> RepositoryResult<()>;

    /// Patron tier of a user, used for the team count limit
    async fn patron_tier_of(&self, user_id: i64) -> RepositoryResult<Option<i64>>;
}

use serde::Serialize;
use sqlx::FromRow;

use super::value_objects::MemberRole;

/// Maximum number of teams a regular user can be a member of
pub const MAX_TEAM_COUNT_NON_PATRON: usize = 2;
/// Maximum number of teams a supporting patron can be a member of
pub const MAX_TEAM_COUNT_PATRON: usize = 5;
/// Lowest patron tier unlocking the larger team limit
const PATRON_TIER_FOR_EXTRA_TEAMS: i64 = 2;

/// Returns how many teams a user with the given patron tier may join
///
/// # Example
/// ```
/// use turfhub_api::domain::team::max_teams_allowed;
///
/// assert_eq!(max_teams_allowed(None), 2);
/// assert_eq!(max_teams_allowed(Some(2)), 5);
/// ```
pub fn max_teams_allowed(patron_tier: Option<i64>) -> usize {
    match patron_tier {
        Some(tier) if tier >= PATRON_TIER_FOR_EXTRA_TEAMS => MAX_TEAM_COUNT_PATRON,
        _ => MAX_TEAM_COUNT_NON_PATRON,
    }
}

/// A team row as stored in `AllTeam`
#[derive(Debug, Clone, Serialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct TeamRow {
    pub id: i64,
    pub name: String,
    pub custom_url: String,
    #[serde(skip_serializing)]
    pub invite_code: String,
    pub bio: Option<String>,
    pub bsky: Option<String>,
    pub css: Option<String>,
    pub avatar_img_id: Option<i64>,
    pub banner_img_id: Option<i64>,
    pub created_at: i64,
    pub deleted_at: Option<i64>,
}

/// Member entry of the public team listing
#[derive(Debug, Clone, Serialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct TeamListingMember {
    pub id: i64,
    pub username: String,
    pub plus_tier: Option<i64>,
}

/// Entry of the public list of all undisbanded teams
#[derive(Debug, Clone, Serialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct TeamListing {
    #[serde(skip_serializing)]
    pub id: i64,
    pub custom_url: String,
    pub name: String,
    pub avatar_src: Option<String>,
    #[sqlx(skip)]
    pub members: Vec<TeamListingMember>,
}

/// A team some user is currently a member of
#[derive(Debug, Clone, Serialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct MemberOfTeam {
    pub id: i64,
    pub custom_url: String,
    pub name: String,
    pub logo_url: Option<String>,
}

/// Weapon shown on a member's profile card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct UserWeapon {
    pub weapon_spl_id: i64,
    pub is_favorite: bool,
}

/// Member entry of a team's page
#[derive(Debug, Clone, Serialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct TeamDetailsMember {
    pub id: i64,
    pub username: String,
    pub discord_avatar: Option<String>,
    pub custom_url: Option<String>,
    pub role: Option<MemberRole>,
    pub is_owner: bool,
    pub is_manager: bool,
    pub is_main_team: bool,
    pub country: Option<String>,
    pub patron_tier: Option<i64>,
    #[sqlx(skip)]
    pub weapons: Vec<UserWeapon>,
}

/// Everything shown on a team's page
#[derive(Debug, Clone, Serialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct TeamDetails {
    pub id: i64,
    pub name: String,
    pub bsky: Option<String>,
    pub bio: Option<String>,
    pub custom_url: String,
    pub css: Option<String>,
    pub avatar_src: Option<String>,
    pub banner_src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_code: Option<String>,
    #[sqlx(skip)]
    pub members: Vec<TeamDetailsMember>,
}

impl TeamDetails {
    /// Returns the current member with the given user id
    pub fn member(&self, user_id: i64) -> Option<&TeamDetailsMember> {
        self.members.iter().find(|m| m.id == user_id)
    }

    /// Whether the user owns the team
    pub fn is_owner(&self, user_id: i64) -> bool {
        self.member(user_id).is_some_and(|m| m.is_owner)
    }

    /// Whether the user can edit the team (owner or manager)
    pub fn can_manage(&self, user_id: i64) -> bool {
        self.member(user_id)
            .is_some_and(|m| m.is_owner || m.is_manager)
    }
}

/// Member entry of [`UserTeam`]
#[derive(Debug, Clone, Serialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct UserTeamMember {
    #[serde(skip_serializing)]
    pub team_id: i64,
    pub id: i64,
    pub username: String,
    pub discord_avatar: Option<String>,
    pub custom_url: Option<String>,
    pub role: Option<MemberRole>,
}

/// A team of a user together with that user's membership flags
#[derive(Debug, Clone, Serialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct UserTeam {
    pub id: i64,
    pub name: String,
    pub is_owner: bool,
    pub is_main_team: bool,
    #[sqlx(skip)]
    pub members: Vec<UserTeamMember>,
}

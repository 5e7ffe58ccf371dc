// Team domain module
// Contains team read models, membership rules, and value objects

#![allow(clippy::module_inception)]

pub mod team;
pub mod value_objects;

// Re-export main types for convenience
pub use team::{
    max_teams_allowed, MemberOfTeam, TeamDetails, TeamDetailsMember, TeamListing,
    TeamListingMember, TeamRow, UserTeam, UserTeamMember, UserWeapon,
};
pub use value_objects::{CustomUrl, InviteCode, MemberRole, TeamImageType, TeamName};

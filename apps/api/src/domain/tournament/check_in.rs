use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::context::{TournamentContext, TournamentTeam};

pub const CHECK_IN_ACTION: &str = "CHECK_IN";
pub const BRACKET_CHECK_IN_ACTION: &str = "BRACKET_CHECK_IN";

/// Form action posted from the tournament pages, discriminated by `_action`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "_action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentAction {
    CheckIn {
        #[serde(rename = "bracketIdx", default)]
        bracket_idx: Option<usize>,
    },
    BracketCheckIn {
        #[serde(rename = "bracketIdx")]
        bracket_idx: usize,
    },
}

impl TournamentAction {
    pub fn discriminator(&self) -> &'static str {
        match self {
            TournamentAction::CheckIn { .. } => CHECK_IN_ACTION,
            TournamentAction::BracketCheckIn { .. } => BRACKET_CHECK_IN_ACTION,
        }
    }
}

/// Reasons a check-in is refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckInError {
    #[error("You are not a member of any team in this tournament")]
    NotInTeam,

    #[error("Registration is not finished (full roster and map pool required)")]
    RegistrationIncomplete,

    #[error("Team is already checked in")]
    AlreadyCheckedIn,

    #[error("Bracket not found: {0}")]
    UnknownBracket(usize),

    #[error("Check-in for this bracket is not open")]
    BracketCheckInClosed,
}

impl TournamentContext {
    /// Validates a tournament-level check-in by the user's team
    ///
    /// # Returns
    /// * `Ok(&TournamentTeam)` - The team to check in
    pub fn validate_check_in(&self, user_id: i64) -> Result<&TournamentTeam, CheckInError> {
        let team = self
            .team_member_of_by_user(user_id)
            .ok_or(CheckInError::NotInTeam)?;

        if team.is_checked_in() {
            return Err(CheckInError::AlreadyCheckedIn);
        }
        if !self.team_can_check_in(team) {
            return Err(CheckInError::RegistrationIncomplete);
        }

        Ok(team)
    }

    /// Validates a bracket check-in by the user's team
    pub fn validate_bracket_check_in(
        &self,
        user_id: i64,
        bracket_idx: usize,
        now: DateTime<Utc>,
    ) -> Result<&TournamentTeam, CheckInError> {
        let team = self
            .team_member_of_by_user(user_id)
            .ok_or(CheckInError::NotInTeam)?;
        let bracket = self
            .bracket(bracket_idx)
            .ok_or(CheckInError::UnknownBracket(bracket_idx))?;

        if bracket.is_checked_in(team.id) {
            return Err(CheckInError::AlreadyCheckedIn);
        }
        if !bracket.can_check_in(team, now) {
            return Err(CheckInError::BracketCheckInClosed);
        }

        Ok(team)
    }
}

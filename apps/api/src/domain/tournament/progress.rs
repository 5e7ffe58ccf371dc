use chrono::{DateTime, Utc};
use serde::Serialize;

use super::context::{TournamentContext, TournamentMatch, TournamentTeam};

/// Where a user's team currently stands in a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStatus {
    /// The team has a match to play right now
    Match { match_id: i64, opponent_team_id: i64 },
    /// The team must check in, to the tournament (`bracket_idx: None`) or to a bracket
    #[serde(rename = "CHECKIN")]
    CheckIn {
        bracket_idx: Option<usize>,
        can_check_in: bool,
    },
    WaitingForMatch,
    WaitingForCast,
    WaitingForRound,
    WaitingForBracket,
    ThanksForPlaying,
}

impl TournamentContext {
    /// Resolves the progress status of the team the user plays for
    ///
    /// Returns `None` when the user is not registered, or when the team
    /// never checked in and the tournament already started.
    pub fn team_member_of_progress_status(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Option<ProgressStatus> {
        let team = self.team_member_of_by_user(user_id)?;
        let playable: Vec<&TournamentMatch> = self
            .matches
            .iter()
            .filter(|m| !m.is_bye() && !m.is_over() && m.involves(team.id))
            .collect();

        if let Some(status) = self.active_match_status(team, &playable) {
            return Some(status);
        }

        if !team.is_checked_in() {
            if self.has_started() {
                return None;
            }
            return Some(ProgressStatus::CheckIn {
                bracket_idx: None,
                can_check_in: self.team_can_check_in(team),
            });
        }

        if let Some(bracket) = self.brackets.iter().find(|b| {
            b.requires_check_in
                && b.is_eligible(team.id)
                && !b.is_checked_in(team.id)
                && !self.bracket_has_started(b.idx)
        }) {
            return Some(ProgressStatus::CheckIn {
                bracket_idx: Some(bracket.idx),
                can_check_in: bracket.can_check_in(team, now),
            });
        }

        if !playable.is_empty() {
            return Some(ProgressStatus::WaitingForMatch);
        }

        let awaiting_bracket = !self.has_started()
            || self.brackets.iter().any(|b| {
                !self.bracket_has_started(b.idx)
                    && b.is_eligible(team.id)
                    && (!b.requires_check_in || b.is_checked_in(team.id))
            });
        if awaiting_bracket {
            return Some(ProgressStatus::WaitingForBracket);
        }

        let latest_bracket = self
            .matches
            .iter()
            .filter(|m| m.involves(team.id))
            .map(|m| m.bracket_idx)
            .max();

        match latest_bracket {
            Some(idx)
                if self
                    .matches_of_bracket(idx)
                    .any(|m| !m.is_bye() && !m.is_over()) =>
            {
                Some(ProgressStatus::WaitingForRound)
            }
            _ => Some(ProgressStatus::ThanksForPlaying),
        }
    }

    fn active_match_status(
        &self,
        team: &TournamentTeam,
        playable: &[&TournamentMatch],
    ) -> Option<ProgressStatus> {
        let m = playable.iter().find(|m| m.participant_ids().is_some())?;
        let opponent_team_id = m.opposing_slot(team.id)?.id?;

        if self.is_locked_for_cast(m.id) {
            return Some(ProgressStatus::WaitingForCast);
        }

        Some(ProgressStatus::Match {
            match_id: m.id,
            opponent_team_id,
        })
    }
}

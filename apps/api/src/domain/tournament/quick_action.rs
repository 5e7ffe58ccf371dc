use chrono::{DateTime, Utc};
use serde::Serialize;

use super::check_in::{BRACKET_CHECK_IN_ACTION, CHECK_IN_ACTION};
use super::context::{MapPickingStyle, TournamentContext};
use super::progress::ProgressStatus;
use super::urls::{tournament_match_page, tournament_register_page};

const BLOCKED_FULL_ROSTER_AND_MAP_POOL: &str =
    "Can't check-in, registration needs to be finished by the captain (full roster & map pool picked)";
const BLOCKED_FULL_ROSTER: &str =
    "Can't check-in, registration needs to be finished by the captain (full roster)";

/// State of a bracket's check-in window as seen by a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CheckInWindow {
    /// Team can check in now by posting `action`
    Open { action: &'static str },
    /// Window has not opened yet
    Upcoming {
        opens_at: DateTime<Utc>,
        starts_at: DateTime<Utc>,
    },
    /// Bracket already started
    Over,
    /// Bracket has no start time so nothing is shown
    Hidden,
}

/// The quick action shown to a team member on the tournament page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuickAction {
    Match {
        opponent: String,
        match_url: String,
    },
    TournamentCheckIn {
        form_action: String,
        action: &'static str,
        bracket_idx: Option<usize>,
        can_check_in: bool,
        blocked_reason: Option<&'static str>,
    },
    BracketCheckIn {
        bracket_idx: usize,
        bracket_name: String,
        window: CheckInWindow,
    },
    WaitingForMatch,
    WaitingForCast,
    WaitingForRound,
    WaitingForBracket {
        checked_in: bool,
    },
    ThanksForPlaying,
}

impl QuickAction {
    /// Builds the quick action of `user_id` for the given status
    ///
    /// Returns `None` when the status references data missing from the
    /// context; that case is logged as a warning.
    pub fn resolve(
        ctx: &TournamentContext,
        status: &ProgressStatus,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        match status {
            ProgressStatus::Match {
                match_id,
                opponent_team_id,
            } => {
                let Some(opponent) = ctx.team_by_id(*opponent_team_id) else {
                    tracing::warn!(
                        tournament_id = ctx.id,
                        match_id,
                        opponent_team_id,
                        "Unexpected status: opponent team not found"
                    );
                    return None;
                };

                Some(QuickAction::Match {
                    opponent: opponent.name.clone(),
                    match_url: tournament_match_page(ctx.id, *match_id),
                })
            }
            ProgressStatus::CheckIn {
                bracket_idx,
                can_check_in,
            } => {
                let Some(bracket) = bracket_idx.and_then(|idx| ctx.bracket(idx)) else {
                    return Some(Self::tournament_check_in(ctx, *bracket_idx, *can_check_in));
                };

                let can_check_in = ctx
                    .team_member_of_by_user(user_id)
                    .is_some_and(|team| bracket.can_check_in(team, now));

                let window = match bracket.start_time {
                    _ if can_check_in => CheckInWindow::Open {
                        action: BRACKET_CHECK_IN_ACTION,
                    },
                    Some(start) if start > now => CheckInWindow::Upcoming {
                        opens_at: start - super::context::Bracket::check_in_lead_time(),
                        starts_at: start,
                    },
                    Some(start) if start < now => CheckInWindow::Over,
                    _ => CheckInWindow::Hidden,
                };

                Some(QuickAction::BracketCheckIn {
                    bracket_idx: bracket.idx,
                    bracket_name: bracket.name.clone(),
                    window,
                })
            }
            ProgressStatus::WaitingForMatch => Some(QuickAction::WaitingForMatch),
            ProgressStatus::WaitingForCast => Some(QuickAction::WaitingForCast),
            ProgressStatus::WaitingForRound => Some(QuickAction::WaitingForRound),
            ProgressStatus::WaitingForBracket => Some(QuickAction::WaitingForBracket {
                checked_in: true,
            }),
            ProgressStatus::ThanksForPlaying => Some(QuickAction::ThanksForPlaying),
        }
    }

    fn tournament_check_in(
        ctx: &TournamentContext,
        bracket_idx: Option<usize>,
        can_check_in: bool,
    ) -> Self {
        let blocked_reason = match (can_check_in, ctx.map_picking_style) {
            (true, _) => None,
            (false, MapPickingStyle::To) => Some(BLOCKED_FULL_ROSTER),
            (false, _) => Some(BLOCKED_FULL_ROSTER_AND_MAP_POOL),
        };

        QuickAction::TournamentCheckIn {
            form_action: tournament_register_page(ctx.id),
            action: CHECK_IN_ACTION,
            bracket_idx,
            can_check_in,
            blocked_reason,
        }
    }
}

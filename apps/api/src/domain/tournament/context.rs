use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How maps are chosen for a tournament's matches
///
/// With `To` the organizer picks the maps, so teams never submit a map pool
/// during registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MapPickingStyle {
    AutoAll,
    AutoSz,
    AutoTc,
    AutoRm,
    AutoCb,
    To,
}

impl std::str::FromStr for MapPickingStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AUTO_ALL" => Ok(MapPickingStyle::AutoAll),
            "AUTO_SZ" => Ok(MapPickingStyle::AutoSz),
            "AUTO_TC" => Ok(MapPickingStyle::AutoTc),
            "AUTO_RM" => Ok(MapPickingStyle::AutoRm),
            "AUTO_CB" => Ok(MapPickingStyle::AutoCb),
            "TO" => Ok(MapPickingStyle::To),
            other => Err(format!("Unknown map picking style: {}", other)),
        }
    }
}

/// Result recorded for one side of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchResult {
    Win,
    Loss,
    Draw,
}

impl std::str::FromStr for MatchResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(MatchResult::Win),
            "loss" => Ok(MatchResult::Loss),
            "draw" => Ok(MatchResult::Draw),
            other => Err(format!("Unknown match result: {}", other)),
        }
    }
}

/// Section of a bracket a match belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BracketType {
    Winners,
    Losers,
    Grands,
    Groups,
}

impl std::str::FromStr for BracketType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "winners" => Ok(BracketType::Winners),
            "losers" => Ok(BracketType::Losers),
            "grands" => Ok(BracketType::Grands),
            "groups" => Ok(BracketType::Groups),
            other => Err(format!("Unknown bracket type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    One,
    Two,
}

/// One slot of a match; `id` is `None` while the team is still undecided
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Opponent {
    pub id: Option<i64>,
    pub score: Option<i32>,
    pub result: Option<MatchResult>,
}

/// A match as laid out by the bracket engine
///
/// A slot of `None` is a bye.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentMatch {
    pub id: i64,
    pub bracket_idx: usize,
    pub round_number: i32,
    pub number: i32,
    pub group_name: Option<String>,
    pub bracket_type: Option<BracketType>,
    pub opponent1: Option<Opponent>,
    pub opponent2: Option<Opponent>,
    pub simulated_opponent1_id: Option<i64>,
    pub simulated_opponent2_id: Option<i64>,
}

impl TournamentMatch {
    pub fn opponent(&self, side: Side) -> Option<&Opponent> {
        match side {
            Side::One => self.opponent1.as_ref(),
            Side::Two => self.opponent2.as_ref(),
        }
    }

    pub fn simulated_opponent_id(&self, side: Side) -> Option<i64> {
        match side {
            Side::One => self.simulated_opponent1_id,
            Side::Two => self.simulated_opponent2_id,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.opponent1.is_none() || self.opponent2.is_none()
    }

    /// A match is over once either side has won
    pub fn is_over(&self) -> bool {
        [&self.opponent1, &self.opponent2]
            .into_iter()
            .flatten()
            .any(|o| o.result == Some(MatchResult::Win))
    }

    /// Ids of both teams, only when both are decided
    pub fn participant_ids(&self) -> Option<(i64, i64)> {
        let one = self.opponent1.as_ref()?.id?;
        let two = self.opponent2.as_ref()?.id?;
        Some((one, two))
    }

    pub fn involves(&self, team_id: i64) -> bool {
        [&self.opponent1, &self.opponent2]
            .into_iter()
            .flatten()
            .any(|o| o.id == Some(team_id))
    }

    /// The slot facing `team_id`, if the team plays in this match
    pub fn opposing_slot(&self, team_id: i64) -> Option<&Opponent> {
        if self.opponent1.as_ref().and_then(|o| o.id) == Some(team_id) {
            return self.opponent2.as_ref();
        }
        if self.opponent2.as_ref().and_then(|o| o.id) == Some(team_id) {
            return self.opponent1.as_ref();
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TournamentTeamMember {
    pub user_id: i64,
    pub username: String,
}

/// A registered team of a tournament
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentTeam {
    pub id: i64,
    pub name: String,
    pub seed: Option<i32>,
    pub avatar_url: Option<String>,
    pub members: Vec<TournamentTeamMember>,
    pub has_map_pool: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl TournamentTeam {
    pub fn has_member(&self, user_id: i64) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }

    pub fn is_checked_in(&self) -> bool {
        self.checked_in_at.is_some()
    }
}

/// A team's standing in a bracket that can require check-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketTeam {
    pub team_id: i64,
    pub checked_in_at: Option<DateTime<Utc>>,
}

/// One bracket (stage) of a tournament
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bracket {
    pub idx: usize,
    pub name: String,
    pub start_time: Option<DateTime<Utc>>,
    pub requires_check_in: bool,
    /// Teams eligible to play in this bracket
    pub teams: Vec<BracketTeam>,
}

impl Bracket {
    /// Check-in opens this long before the bracket starts
    pub fn check_in_lead_time() -> Duration {
        Duration::hours(1)
    }

    pub fn check_in_opens_at(&self) -> Option<DateTime<Utc>> {
        self.start_time.map(|start| start - Self::check_in_lead_time())
    }

    pub fn is_eligible(&self, team_id: i64) -> bool {
        self.teams.iter().any(|t| t.team_id == team_id)
    }

    pub fn is_checked_in(&self, team_id: i64) -> bool {
        self.teams
            .iter()
            .any(|t| t.team_id == team_id && t.checked_in_at.is_some())
    }

    /// Whether the team may check in to this bracket right now
    ///
    /// # Business Rules
    /// - Bracket requires check-in
    /// - Team is eligible and has not checked in yet
    /// - Team checked in to the tournament itself
    /// - `now` is within the hour before the start time
    pub fn can_check_in(&self, team: &TournamentTeam, now: DateTime<Utc>) -> bool {
        let (Some(opens_at), Some(start)) = (self.check_in_opens_at(), self.start_time) else {
            return false;
        };

        self.requires_check_in
            && team.is_checked_in()
            && self.is_eligible(team.id)
            && !self.is_checked_in(team.id)
            && opens_at <= now
            && now < start
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastedMatch {
    pub match_id: i64,
    pub twitch_account: String,
}

/// Matches being cast now, and matches held back until a caster is free
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastedMatchesInfo {
    #[serde(default)]
    pub casted_matches: Vec<CastedMatch>,
    #[serde(default)]
    pub locked_matches: Vec<i64>,
}

/// Everything about a tournament needed to render brackets and statuses
#[derive(Debug, Clone)]
pub struct TournamentContext {
    pub id: i64,
    pub name: String,
    pub map_picking_style: MapPickingStyle,
    pub min_members_per_team: usize,
    pub teams: Vec<TournamentTeam>,
    pub brackets: Vec<Bracket>,
    pub matches: Vec<TournamentMatch>,
    pub casted_matches_info: CastedMatchesInfo,
}

impl TournamentContext {
    pub fn team_by_id(&self, team_id: i64) -> Option<&TournamentTeam> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    /// The team the user is registered with in this tournament
    pub fn team_member_of_by_user(&self, user_id: i64) -> Option<&TournamentTeam> {
        self.teams.iter().find(|t| t.has_member(user_id))
    }

    pub fn team_logo_src<'a>(&self, team: &'a TournamentTeam) -> Option<&'a str> {
        team.avatar_url.as_deref()
    }

    pub fn bracket(&self, idx: usize) -> Option<&Bracket> {
        self.brackets.iter().find(|b| b.idx == idx)
    }

    pub fn match_by_id(&self, match_id: i64) -> Option<&TournamentMatch> {
        self.matches.iter().find(|m| m.id == match_id)
    }

    pub fn matches_of_bracket(&self, idx: usize) -> impl Iterator<Item = &TournamentMatch> {
        self.matches.iter().filter(move |m| m.bracket_idx == idx)
    }

    /// A bracket has started once the engine has laid out its matches
    pub fn bracket_has_started(&self, idx: usize) -> bool {
        self.matches_of_bracket(idx).next().is_some()
    }

    pub fn has_started(&self) -> bool {
        self.bracket_has_started(0)
    }

    /// Whether the team finished registration and may check in
    pub fn team_can_check_in(&self, team: &TournamentTeam) -> bool {
        let full_roster = team.members.len() >= self.min_members_per_team;
        let map_pool_ready = self.map_picking_style == MapPickingStyle::To || team.has_map_pool;

        full_roster && map_pool_ready
    }

    pub fn is_locked_for_cast(&self, match_id: i64) -> bool {
        self.casted_matches_info.locked_matches.contains(&match_id)
    }

    pub fn is_casted(&self, match_id: i64) -> bool {
        self.casted_matches_info
            .casted_matches
            .iter()
            .any(|cm| cm.match_id == match_id)
    }

    pub fn casting_account(&self, match_id: i64) -> Option<&str> {
        self.casted_matches_info
            .casted_matches
            .iter()
            .find(|cm| cm.match_id == match_id)
            .map(|cm| cm.twitch_account.as_str())
    }

    /// User ids of every member of both teams of a match
    pub fn match_participant_user_ids(&self, m: &TournamentMatch) -> Vec<i64> {
        let Some((one, two)) = m.participant_ids() else {
            return Vec::new();
        };

        [one, two]
            .into_iter()
            .filter_map(|team_id| self.team_by_id(team_id))
            .flat_map(|team| team.members.iter().map(|member| member.user_id))
            .collect()
    }
}

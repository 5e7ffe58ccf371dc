use serde::Serialize;

use super::context::{BracketType, Side, TournamentContext, TournamentMatch, TournamentTeam};
use super::urls::tournament_match_page;

const CAST_MESSAGE: &str = "Match is scheduled to be casted";
const UNKNOWN_TEAM_NAME: &str = "???";

/// Rendering switches for a bracket
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchViewOptions {
    /// Preview brackets show no scores and do not link to match pages
    pub is_preview: bool,
    /// Fill undecided slots with the engine's predicted opponents
    pub show_simulation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeaderBadge {
    Cast { message: &'static str },
    Live,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchHeader {
    pub label: String,
    pub badge: Option<HeaderBadge>,
}

/// How much room the team name gets next to the seed and the logo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameWidth {
    Normal,
    Narrow,
    Narrowest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRowView {
    pub participant_id: Option<i64>,
    pub seed: Option<i32>,
    pub wide_seed: bool,
    pub logo_src: Option<String>,
    pub name: String,
    pub invisible: bool,
    pub simulated: bool,
    pub own_team: bool,
    pub is_loser: bool,
    pub score: Option<i32>,
    pub title: Option<String>,
    pub name_width: NameWidth,
}

/// One match box of a rendered bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchView {
    pub match_id: i64,
    pub is_bye: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<MatchHeader>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<MatchRowView>,
}

impl MatchView {
    /// Builds the view of one match
    ///
    /// # Arguments
    /// * `viewer_user_id` - Logged in user, used to highlight their own team
    /// * `streaming_participants` - User ids currently streaming
    pub fn build(
        ctx: &TournamentContext,
        m: &TournamentMatch,
        opts: MatchViewOptions,
        viewer_user_id: Option<i64>,
        streaming_participants: &[i64],
    ) -> Self {
        if m.is_bye() {
            return Self {
                match_id: m.id,
                is_bye: true,
                header: None,
                link: None,
                rows: Vec::new(),
            };
        }

        let own_team_id = viewer_user_id
            .and_then(|user_id| ctx.team_member_of_by_user(user_id))
            .map(|team| team.id);

        Self {
            match_id: m.id,
            is_bye: false,
            header: Some(header(ctx, m, streaming_participants)),
            link: (!opts.is_preview).then(|| tournament_match_page(ctx.id, m.id)),
            rows: [Side::One, Side::Two]
                .into_iter()
                .map(|side| row(ctx, m, side, opts, own_team_id))
                .collect(),
        }
    }
}

fn label_prefix(m: &TournamentMatch) -> String {
    match m.bracket_type {
        Some(BracketType::Winners) => "WB ".to_string(),
        Some(BracketType::Losers) => "LB ".to_string(),
        Some(BracketType::Grands) => "GF ".to_string(),
        Some(BracketType::Groups) => m.group_name.clone().unwrap_or_default(),
        None => String::new(),
    }
}

fn has_streams(ctx: &TournamentContext, m: &TournamentMatch, streaming: &[i64]) -> bool {
    if m.is_over() || m.participant_ids().is_none() {
        return false;
    }
    if ctx.is_casted(m.id) {
        return true;
    }

    ctx.match_participant_user_ids(m)
        .iter()
        .any(|user_id| streaming.contains(user_id))
}

fn header(ctx: &TournamentContext, m: &TournamentMatch, streaming: &[i64]) -> MatchHeader {
    let to_be_casted = !m.is_over() && ctx.is_locked_for_cast(m.id);

    let badge = if to_be_casted {
        Some(HeaderBadge::Cast {
            message: CAST_MESSAGE,
        })
    } else if has_streams(ctx, m, streaming) {
        Some(HeaderBadge::Live)
    } else {
        None
    };

    MatchHeader {
        label: format!("{}{}.{}", label_prefix(m), m.round_number, m.number),
        badge,
    }
}

fn resolve_team<'a>(
    ctx: &'a TournamentContext,
    m: &TournamentMatch,
    side: Side,
    show_simulation: bool,
) -> (Option<&'a TournamentTeam>, bool) {
    if let Some(id) = m.opponent(side).and_then(|o| o.id) {
        return (ctx.team_by_id(id), false);
    }

    let simulated_id = show_simulation
        .then(|| m.simulated_opponent_id(side))
        .flatten();

    (simulated_id.and_then(|id| ctx.team_by_id(id)), true)
}

fn row(
    ctx: &TournamentContext,
    m: &TournamentMatch,
    side: Side,
    opts: MatchViewOptions,
    own_team_id: Option<i64>,
) -> MatchRowView {
    let opponent = m.opponent(side);
    let (team, simulated) = resolve_team(ctx, m, side, opts.show_simulation);

    let score = match (m.participant_ids(), opts.is_preview) {
        (Some(_), false) => Some(opponent.and_then(|o| o.score).unwrap_or(0)),
        _ => None,
    };

    let logo_src = team
        .filter(|_| !simulated)
        .and_then(|team| ctx.team_logo_src(team))
        .map(str::to_string);
    let seed = team.and_then(|t| t.seed);
    let wide_seed = seed.is_some_and(|s| s > 99);

    // either but not both
    let name_width = match (logo_src.is_some(), wide_seed) {
        (true, true) => NameWidth::Narrowest,
        (true, false) | (false, true) => NameWidth::Narrow,
        (false, false) => NameWidth::Normal,
    };

    MatchRowView {
        participant_id: team.map(|t| t.id),
        seed,
        wide_seed,
        logo_src,
        name: team
            .map(|t| t.name.clone())
            .unwrap_or_else(|| UNKNOWN_TEAM_NAME.to_string()),
        invisible: team.is_none(),
        simulated,
        own_team: !simulated && team.is_some_and(|t| Some(t.id) == own_team_id),
        is_loser: opponent.and_then(|o| o.result) == Some(super::context::MatchResult::Loss),
        score,
        title: team.map(|t| {
            t.members
                .iter()
                .map(|member| member.username.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        }),
        name_width,
    }
}

// Tournament domain module
// Reads the state produced by the bracket engine and turns it into
// check-in rules, progress statuses and view models

pub mod check_in;
pub mod context;
pub mod match_view;
pub mod progress;
pub mod quick_action;
pub mod streams;
pub mod urls;

pub use check_in::{CheckInError, TournamentAction};
pub use context::{
    Bracket, BracketTeam, BracketType, CastedMatch, CastedMatchesInfo, MapPickingStyle,
    MatchResult, Opponent, Side, TournamentContext, TournamentMatch, TournamentTeam,
    TournamentTeamMember,
};
pub use match_view::{MatchView, MatchViewOptions};
pub use progress::ProgressStatus;
pub use quick_action::{CheckInWindow, QuickAction};
pub use streams::TournamentStream;

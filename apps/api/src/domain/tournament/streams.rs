use serde::Serialize;
use sqlx::FromRow;

use super::context::{TournamentContext, TournamentMatch};

/// A live stream tied to a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct TournamentStream {
    pub twitch_user_name: String,
    pub user_id: Option<i64>,
    pub viewer_count: i64,
    pub thumbnail_url: String,
}

/// User ids currently streaming the tournament
pub fn streaming_participants(streams: &[TournamentStream]) -> Vec<i64> {
    streams.iter().filter_map(|s| s.user_id).collect()
}

/// Streams showing the given match
///
/// Keeps streams of any participant plus the stream of the casting
/// account. Empty when either team of the match is still undecided.
pub fn streams_of_match<'a>(
    ctx: &TournamentContext,
    m: &TournamentMatch,
    streams: &'a [TournamentStream],
) -> Vec<&'a TournamentStream> {
    if m.participant_ids().is_none() {
        return Vec::new();
    }

    let casting_account = ctx.casting_account(m.id);
    let participants = ctx.match_participant_user_ids(m);

    streams
        .iter()
        .filter(|stream| {
            stream.user_id.is_some_and(|id| participants.contains(&id))
                || Some(stream.twitch_user_name.as_str()) == casting_account
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::context::fixtures::*;
    use super::super::context::CastedMatch;
    use super::*;

    fn stream(name: &str, user_id: Option<i64>) -> TournamentStream {
        TournamentStream {
            twitch_user_name: name.to_string(),
            user_id,
            viewer_count: 10,
            thumbnail_url: String::new(),
        }
    }

    #[test]
    fn keeps_participant_and_caster_streams() {
        let mut ctx = context(vec![team(1, &[10, 11]), team(2, &[20])]);
        ctx.casted_matches_info.casted_matches.push(CastedMatch {
            match_id: 5,
            twitch_account: "caster".to_string(),
        });
        let m = match_between(5, 0, slot(Some(1)), slot(Some(2)));
        let streams = vec![
            stream("player11", Some(11)),
            stream("caster", None),
            stream("bystander", Some(99)),
            stream("player20", Some(20)),
        ];

        let names: Vec<_> = streams_of_match(&ctx, &m, &streams)
            .into_iter()
            .map(|s| s.twitch_user_name.as_str())
            .collect();

        assert_eq!(names, vec!["player11", "caster", "player20"]);
    }

    #[test]
    fn undecided_match_has_no_streams() {
        let ctx = context(vec![team(1, &[10])]);
        let m = match_between(5, 0, slot(Some(1)), slot(None));
        let streams = vec![stream("player10", Some(10))];

        assert!(streams_of_match(&ctx, &m, &streams).is_empty());
    }

    #[test]
    fn streaming_participants_skip_anonymous_streams() {
        let streams = vec![stream("a", Some(1)), stream("b", None)];

        assert_eq!(streaming_participants(&streams), vec![1]);
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::domain::repositories::{RepositoryError, RepositoryResult, TournamentRepository};
use crate::domain::tournament::{
    Bracket, BracketTeam, CastedMatchesInfo, Opponent, TournamentContext, TournamentMatch,
    TournamentStream, TournamentTeam, TournamentTeamMember,
};
use crate::infrastructure::database::from_timestamp;

/// SQLite implementation of TournamentRepository
pub struct SqliteTournamentRepository {
    pool: SqlitePool,
}

impl SqliteTournamentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
#[sqlx(rename_all = "camelCase")]
struct TournamentRow {
    id: i64,
    name: String,
    map_picking_style: String,
    min_members_per_team: i64,
    casted_matches_info: Option<String>,
}

#[derive(FromRow)]
#[sqlx(rename_all = "camelCase")]
struct TeamRow {
    id: i64,
    name: String,
    seed: Option<i32>,
    avatar_url: Option<String>,
    has_map_pool: bool,
    checked_in_at: Option<i64>,
}

#[derive(FromRow)]
#[sqlx(rename_all = "camelCase")]
struct MemberRow {
    tournament_team_id: i64,
    user_id: i64,
    username: String,
}

#[derive(FromRow)]
#[sqlx(rename_all = "camelCase")]
struct BracketRow {
    idx: i64,
    name: String,
    start_time: Option<i64>,
    requires_check_in: bool,
}

#[derive(FromRow)]
#[sqlx(rename_all = "camelCase")]
struct BracketTeamRow {
    bracket_idx: i64,
    tournament_team_id: i64,
    checked_in_at: Option<i64>,
}

#[derive(FromRow)]
#[sqlx(rename_all = "camelCase")]
struct MatchRow {
    id: i64,
    bracket_idx: i64,
    round_number: i32,
    number: i32,
    group_name: Option<String>,
    bracket_type: Option<String>,
    opponent1_bye: bool,
    opponent1_id: Option<i64>,
    opponent1_score: Option<i32>,
    opponent1_result: Option<String>,
    opponent2_bye: bool,
    opponent2_id: Option<i64>,
    opponent2_score: Option<i32>,
    opponent2_result: Option<String>,
    simulated_opponent1_id: Option<i64>,
    simulated_opponent2_id: Option<i64>,
}

fn parse_column<T>(value: &str) -> RepositoryResult<T>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse().map_err(RepositoryError::Invariant)
}

fn bracket_idx(raw: i64) -> RepositoryResult<usize> {
    usize::try_from(raw)
        .map_err(|_| RepositoryError::invariant(format!("Invalid bracket index: {}", raw)))
}

fn opponent(
    bye: bool,
    id: Option<i64>,
    score: Option<i32>,
    result: Option<String>,
) -> RepositoryResult<Option<Opponent>> {
    if bye {
        return Ok(None);
    }

    Ok(Some(Opponent {
        id,
        score,
        result: result.as_deref().map(parse_column).transpose()?,
    }))
}

impl MatchRow {
    fn into_domain(self) -> RepositoryResult<TournamentMatch> {
        Ok(TournamentMatch {
            id: self.id,
            bracket_idx: bracket_idx(self.bracket_idx)?,
            round_number: self.round_number,
            number: self.number,
            group_name: self.group_name,
            bracket_type: self.bracket_type.as_deref().map(parse_column).transpose()?,
            opponent1: opponent(
                self.opponent1_bye,
                self.opponent1_id,
                self.opponent1_score,
                self.opponent1_result,
            )?,
            opponent2: opponent(
                self.opponent2_bye,
                self.opponent2_id,
                self.opponent2_score,
                self.opponent2_result,
            )?,
            simulated_opponent1_id: self.simulated_opponent1_id,
            simulated_opponent2_id: self.simulated_opponent2_id,
        })
    }
}

fn casted_matches_info(tournament_id: i64, raw: Option<&str>) -> CastedMatchesInfo {
    let Some(raw) = raw else {
        return CastedMatchesInfo::default();
    };

    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(tournament_id, error = %e, "Unreadable casted matches info");
        CastedMatchesInfo::default()
    })
}

#[async_trait]
impl TournamentRepository for SqliteTournamentRepository {
    #[tracing::instrument(skip(self))]
    async fn find_context(&self, tournament_id: i64) -> RepositoryResult<Option<TournamentContext>> {
        let Some(tournament) = sqlx::query_as::<_, TournamentRow>(
            r#"
            SELECT "id", "name", "mapPickingStyle", "minMembersPerTeam", "castedMatchesInfo"
            FROM "Tournament"
            WHERE "id" = ?
            "#,
        )
        .bind(tournament_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let team_rows = sqlx::query_as::<_, TeamRow>(
            r#"
            SELECT "id", "name", "seed", "avatarUrl", "hasMapPool", "checkedInAt"
            FROM "TournamentTeam"
            WHERE "tournamentId" = ?
            ORDER BY "seed" IS NULL, "seed", "id"
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;

        let member_rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT
                "TournamentTeamMember"."tournamentTeamId",
                "TournamentTeamMember"."userId",
                "User"."username"
            FROM "TournamentTeamMember"
            INNER JOIN "TournamentTeam"
                ON "TournamentTeam"."id" = "TournamentTeamMember"."tournamentTeamId"
            INNER JOIN "User" ON "User"."id" = "TournamentTeamMember"."userId"
            WHERE "TournamentTeam"."tournamentId" = ?
            ORDER BY "User"."id"
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;

        let bracket_rows = sqlx::query_as::<_, BracketRow>(
            r#"
            SELECT "idx", "name", "startTime", "requiresCheckIn"
            FROM "TournamentBracket"
            WHERE "tournamentId" = ?
            ORDER BY "idx"
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;

        let bracket_team_rows = sqlx::query_as::<_, BracketTeamRow>(
            r#"
            SELECT "bracketIdx", "tournamentTeamId", "checkedInAt"
            FROM "TournamentBracketTeam"
            WHERE "tournamentId" = ?
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;

        let match_rows = sqlx::query_as::<_, MatchRow>(
            r#"
            SELECT
                "id", "bracketIdx", "roundNumber", "number", "groupName", "bracketType",
                "opponent1Bye", "opponent1Id", "opponent1Score", "opponent1Result",
                "opponent2Bye", "opponent2Id", "opponent2Score", "opponent2Result",
                "simulatedOpponent1Id", "simulatedOpponent2Id"
            FROM "TournamentMatch"
            WHERE "tournamentId" = ?
            ORDER BY "bracketIdx", "roundNumber", "number"
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;

        let mut members_by_team: HashMap<i64, Vec<TournamentTeamMember>> = HashMap::new();
        for row in member_rows {
            members_by_team
                .entry(row.tournament_team_id)
                .or_default()
                .push(TournamentTeamMember {
                    user_id: row.user_id,
                    username: row.username,
                });
        }

        let teams = team_rows
            .into_iter()
            .map(|row| TournamentTeam {
                id: row.id,
                name: row.name,
                seed: row.seed,
                avatar_url: row.avatar_url,
                members: members_by_team.remove(&row.id).unwrap_or_default(),
                has_map_pool: row.has_map_pool,
                checked_in_at: row.checked_in_at.and_then(from_timestamp),
            })
            .collect();

        let mut teams_by_bracket: HashMap<i64, Vec<BracketTeam>> = HashMap::new();
        for row in bracket_team_rows {
            teams_by_bracket
                .entry(row.bracket_idx)
                .or_default()
                .push(BracketTeam {
                    team_id: row.tournament_team_id,
                    checked_in_at: row.checked_in_at.and_then(from_timestamp),
                });
        }

        let brackets = bracket_rows
            .into_iter()
            .map(|row| {
                Ok(Bracket {
                    idx: bracket_idx(row.idx)?,
                    name: row.name,
                    start_time: row.start_time.and_then(from_timestamp),
                    requires_check_in: row.requires_check_in,
                    teams: teams_by_bracket.remove(&row.idx).unwrap_or_default(),
                })
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        let matches = match_rows
            .into_iter()
            .map(MatchRow::into_domain)
            .collect::<RepositoryResult<Vec<_>>>()?;

        let min_members_per_team = usize::try_from(tournament.min_members_per_team).unwrap_or(0);

        Ok(Some(TournamentContext {
            id: tournament.id,
            name: tournament.name,
            map_picking_style: parse_column(&tournament.map_picking_style)?,
            min_members_per_team,
            teams,
            brackets,
            matches,
            casted_matches_info: casted_matches_info(
                tournament.id,
                tournament.casted_matches_info.as_deref(),
            ),
        }))
    }

    #[tracing::instrument(skip(self))]
    async fn streams(&self, tournament_id: i64) -> RepositoryResult<Vec<TournamentStream>> {
        let streams = sqlx::query_as::<_, TournamentStream>(
            r#"
            SELECT "twitchUserName", "userId", "viewerCount", "thumbnailUrl"
            FROM "TournamentStream"
            WHERE "tournamentId" = ?
            ORDER BY "viewerCount" DESC, "twitchUserName"
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(streams)
    }

    #[tracing::instrument(skip(self))]
    async fn check_in(&self, team_id: i64, at: DateTime<Utc>) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE "TournamentTeam"
            SET "checkedInAt" = ?
            WHERE "id" = ? AND "checkedInAt" IS NULL
            "#,
        )
        .bind(at.timestamp())
        .bind(team_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(
                "Team is already checked in".to_string(),
            ));
        }

        tracing::info!(team_id, "Team checked in");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn bracket_check_in(
        &self,
        tournament_id: i64,
        bracket_idx: usize,
        team_id: i64,
        at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE "TournamentBracketTeam"
            SET "checkedInAt" = ?
            WHERE "tournamentId" = ?
              AND "bracketIdx" = ?
              AND "tournamentTeamId" = ?
              AND "checkedInAt" IS NULL
            "#,
        )
        .bind(at.timestamp())
        .bind(tournament_id)
        .bind(bracket_idx as i64)
        .bind(team_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(
                "Team is already checked in to this bracket".to_string(),
            ));
        }

        tracing::info!(team_id, bracket_idx, "Team checked in to bracket");
        Ok(())
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use crate::domain::repositories::{
    CreateTeam, MemberLeaving, NewTeamMember, RepositoryError, RepositoryResult, TeamRepository,
    UpdateTeam,
};
use crate::domain::team::{
    InviteCode, MemberOfTeam, TeamDetails, TeamDetailsMember, TeamImageType, TeamListing,
    TeamListingMember, TeamRow, UserTeam, UserTeamMember, UserWeapon,
};
use crate::infrastructure::database::timestamp_now;

const NOT_A_MEMBER: &str = "User is not a member of this team";

/// Rewords the unique-index violation on `customUrl`
fn url_taken(err: sqlx::Error, custom_url: &str) -> RepositoryError {
    match RepositoryError::from(err) {
        RepositoryError::Conflict(_) => {
            RepositoryError::Conflict(format!("Team URL already taken: {}", custom_url))
        }
        other => other,
    }
}

/// SQLite implementation of TeamRepository
///
/// Writes go to `AllTeam` / `AllTeamMember`; reads go through the
/// `Team`, `TeamMember` and `TeamMemberWithSecondary` views which hide
/// disbanded teams and memberships that were left.
pub struct SqliteTeamRepository {
    pool: SqlitePool,
}

impl SqliteTeamRepository {
    /// Creates a new SqliteTeamRepository
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for SQLite
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
#[sqlx(rename_all = "camelCase")]
struct ListingMemberRow {
    team_id: i64,
    #[sqlx(flatten)]
    member: TeamListingMember,
}

#[derive(FromRow)]
#[sqlx(rename_all = "camelCase")]
struct WeaponRow {
    user_id: i64,
    #[sqlx(flatten)]
    weapon: UserWeapon,
}

/// Current teams of a user, usable inside a transaction
async fn teams_by_member_user_id(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> RepositoryResult<Vec<UserTeam>> {
    let mut teams = sqlx::query_as::<_, UserTeam>(
        r#"
        SELECT
            "TeamMemberWithSecondary"."teamId" AS "id",
            "Team"."name",
            "TeamMemberWithSecondary"."isOwner",
            "TeamMemberWithSecondary"."isMainTeam"
        FROM "TeamMemberWithSecondary"
        INNER JOIN "Team" ON "Team"."id" = "TeamMemberWithSecondary"."teamId"
        WHERE "TeamMemberWithSecondary"."userId" = ?
        ORDER BY "TeamMemberWithSecondary"."createdAt", "TeamMemberWithSecondary"."teamId"
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    let members = sqlx::query_as::<_, UserTeamMember>(
        r#"
        SELECT
            "m2"."teamId",
            "User"."id",
            "User"."username",
            "User"."discordAvatar",
            "User"."customUrl",
            "m2"."role"
        FROM "TeamMemberWithSecondary" AS "m2"
        INNER JOIN "User" ON "User"."id" = "m2"."userId"
        WHERE "m2"."teamId" IN (
            SELECT "teamId" FROM "TeamMemberWithSecondary" WHERE "userId" = ?
        )
        ORDER BY "m2"."createdAt", "User"."id"
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_team: HashMap<i64, Vec<UserTeamMember>> = HashMap::new();
    for member in members {
        by_team.entry(member.team_id).or_default().push(member);
    }
    for team in &mut teams {
        team.members = by_team.remove(&team.id).unwrap_or_default();
    }

    Ok(teams)
}

async fn set_main_team(
    conn: &mut SqliteConnection,
    user_id: i64,
    team_id: i64,
) -> RepositoryResult<()> {
    sqlx::query(
        r#"UPDATE "AllTeamMember" SET "isMainTeam" = 1 WHERE "userId" = ? AND "teamId" = ?"#,
    )
    .bind(user_id)
    .bind(team_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[async_trait]
impl TeamRepository for SqliteTeamRepository {
    #[tracing::instrument(skip(self))]
    async fn find_all_undisbanded(&self) -> RepositoryResult<Vec<TeamListing>> {
        let mut teams = sqlx::query_as::<_, TeamListing>(
            r#"
            SELECT
                "Team"."id",
                "Team"."customUrl",
                "Team"."name",
                "UserSubmittedImage"."url" AS "avatarSrc"
            FROM "Team"
            LEFT JOIN "UserSubmittedImage" ON "UserSubmittedImage"."id" = "Team"."avatarImgId"
            ORDER BY "Team"."id"
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let members = sqlx::query_as::<_, ListingMemberRow>(
            r#"
            SELECT
                "TeamMemberWithSecondary"."teamId",
                "User"."id",
                "User"."username",
                "PlusTier"."tier" AS "plusTier"
            FROM "TeamMemberWithSecondary"
            INNER JOIN "User" ON "User"."id" = "TeamMemberWithSecondary"."userId"
            LEFT JOIN "PlusTier" ON "PlusTier"."userId" = "User"."id"
            ORDER BY "TeamMemberWithSecondary"."createdAt", "User"."id"
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_team: HashMap<i64, Vec<TeamListingMember>> = HashMap::new();
        for row in members {
            by_team.entry(row.team_id).or_default().push(row.member);
        }
        for team in &mut teams {
            team.members = by_team.remove(&team.id).unwrap_or_default();
        }

        Ok(teams)
    }

    #[tracing::instrument(skip(self))]
    async fn find_all_member_of_by_user_id(
        &self,
        user_id: i64,
    ) -> RepositoryResult<Vec<MemberOfTeam>> {
        let teams = sqlx::query_as::<_, MemberOfTeam>(
            r#"
            SELECT
                "Team"."id",
                "Team"."customUrl",
                "Team"."name",
                "UserSubmittedImage"."url" AS "logoUrl"
            FROM "TeamMemberWithSecondary"
            INNER JOIN "Team" ON "Team"."id" = "TeamMemberWithSecondary"."teamId"
            LEFT JOIN "UserSubmittedImage" ON "UserSubmittedImage"."id" = "Team"."avatarImgId"
            WHERE "TeamMemberWithSecondary"."userId" = ?
            ORDER BY "TeamMemberWithSecondary"."createdAt", "Team"."id"
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(teams)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_custom_url(
        &self,
        custom_url: &str,
        include_invite_code: bool,
    ) -> RepositoryResult<Option<TeamDetails>> {
        let team = sqlx::query_as::<_, TeamDetails>(
            r#"
            SELECT
                "Team"."id",
                "Team"."name",
                "Team"."bsky",
                "Team"."bio",
                "Team"."customUrl",
                "Team"."css",
                "AvatarImage"."url" AS "avatarSrc",
                "BannerImage"."url" AS "bannerSrc",
                "Team"."inviteCode"
            FROM "Team"
            LEFT JOIN "UserSubmittedImage" AS "AvatarImage"
                ON "AvatarImage"."id" = "Team"."avatarImgId"
            LEFT JOIN "UserSubmittedImage" AS "BannerImage"
                ON "BannerImage"."id" = "Team"."bannerImgId"
            WHERE "Team"."customUrl" = ?
            "#,
        )
        .bind(custom_url.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut team) = team else {
            return Ok(None);
        };

        if !include_invite_code {
            team.invite_code = None;
        }

        let mut members = sqlx::query_as::<_, TeamDetailsMember>(
            r#"
            SELECT
                "User"."id",
                "User"."username",
                "User"."discordAvatar",
                "User"."customUrl",
                "TeamMemberWithSecondary"."role",
                "TeamMemberWithSecondary"."isOwner",
                "TeamMemberWithSecondary"."isManager",
                "TeamMemberWithSecondary"."isMainTeam",
                "User"."country",
                "User"."patronTier"
            FROM "TeamMemberWithSecondary"
            INNER JOIN "User" ON "User"."id" = "TeamMemberWithSecondary"."userId"
            WHERE "TeamMemberWithSecondary"."teamId" = ?
            ORDER BY "TeamMemberWithSecondary"."createdAt", "User"."id"
            "#,
        )
        .bind(team.id)
        .fetch_all(&self.pool)
        .await?;

        let weapons = sqlx::query_as::<_, WeaponRow>(
            r#"
            SELECT "UserWeapon"."userId", "UserWeapon"."weaponSplId", "UserWeapon"."isFavorite"
            FROM "UserWeapon"
            WHERE "UserWeapon"."userId" IN (
                SELECT "userId" FROM "TeamMemberWithSecondary" WHERE "teamId" = ?
            )
            ORDER BY "UserWeapon"."order"
            "#,
        )
        .bind(team.id)
        .fetch_all(&self.pool)
        .await?;

        let mut by_user: HashMap<i64, Vec<UserWeapon>> = HashMap::new();
        for row in weapons {
            by_user.entry(row.user_id).or_default().push(row.weapon);
        }
        for member in &mut members {
            member.weapons = by_user.remove(&member.id).unwrap_or_default();
        }
        team.members = members;

        Ok(Some(team))
    }

    #[tracing::instrument(skip(self))]
    async fn teams_by_member_user_id(&self, user_id: i64) -> RepositoryResult<Vec<UserTeam>> {
        let mut conn = self.pool.acquire().await?;
        teams_by_member_user_id(&mut conn, user_id).await
    }

    #[tracing::instrument(skip(self))]
    async fn create(&self, args: CreateTeam) -> RepositoryResult<i64> {
        let mut tx = self.pool.begin().await?;

        let team_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO "AllTeam" ("name", "customUrl", "inviteCode")
            VALUES (?, ?, ?)
            RETURNING "id"
            "#,
        )
        .bind(&args.name)
        .bind(&args.custom_url)
        .bind(InviteCode::generate().as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| url_taken(err, &args.custom_url))?;

        sqlx::query(
            r#"
            INSERT INTO "AllTeamMember" ("userId", "teamId", "isOwner", "isMainTeam")
            VALUES (?, ?, 1, ?)
            "#,
        )
        .bind(args.owner_user_id)
        .bind(team_id)
        .bind(args.is_main_team)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(team_id, custom_url = %args.custom_url, "Team created");
        Ok(team_id)
    }

    #[tracing::instrument(skip(self))]
    async fn update(&self, args: UpdateTeam) -> RepositoryResult<TeamRow> {
        let row = sqlx::query_as::<_, TeamRow>(
            r#"
            UPDATE "AllTeam"
            SET "name" = ?, "customUrl" = ?, "bio" = ?, "bsky" = ?, "css" = ?
            WHERE "id" = ?
            RETURNING *
            "#,
        )
        .bind(&args.name)
        .bind(&args.custom_url)
        .bind(&args.bio)
        .bind(&args.bsky)
        .bind(&args.css)
        .bind(args.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| url_taken(err, &args.custom_url))?;

        row.ok_or_else(|| RepositoryError::not_found(format!("Team {}", args.id)))
    }

    #[tracing::instrument(skip(self))]
    async fn switch_main_team(&self, user_id: i64, team_id: i64) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        let current_teams = teams_by_member_user_id(&mut tx, user_id).await?;
        if !current_teams.iter().any(|team| team.id == team_id) {
            return Err(RepositoryError::invariant(NOT_A_MEMBER));
        }

        sqlx::query(r#"UPDATE "AllTeamMember" SET "isMainTeam" = 0 WHERE "userId" = ?"#)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        set_main_team(&mut tx, user_id, team_id).await?;

        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, team_id: i64) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar(r#"SELECT "id" FROM "Team" WHERE "id" = ?"#)
            .bind(team_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(RepositoryError::not_found(format!("Team {}", team_id)));
        }

        let members: Vec<i64> =
            sqlx::query_scalar(r#"SELECT "userId" FROM "TeamMember" WHERE "teamId" = ?"#)
                .bind(team_id)
                .fetch_all(&mut *tx)
                .await?;

        // switch main team to another if they have at least one secondary team
        for user_id in members {
            let current_teams = teams_by_member_user_id(&mut tx, user_id).await?;
            let Some(team_to_switch_to) = current_teams.iter().find(|team| team.id != team_id)
            else {
                continue;
            };

            set_main_team(&mut tx, user_id, team_to_switch_to.id).await?;
        }

        sqlx::query(r#"UPDATE "AllTeamMember" SET "isMainTeam" = 0 WHERE "teamId" = ?"#)
            .bind(team_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(r#"DELETE FROM "LFGPost" WHERE "teamId" = ?"#)
            .bind(team_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(r#"UPDATE "AllTeam" SET "deletedAt" = ? WHERE "id" = ?"#)
            .bind(timestamp_now())
            .bind(team_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(team_id, "Team disbanded");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn remove_team_image(
        &self,
        team_id: i64,
        image_type: TeamImageType,
    ) -> RepositoryResult<()> {
        let column = image_type.column();
        let mut tx = self.pool.begin().await?;

        let image_id: Option<Option<i64>> = sqlx::query_scalar(&format!(
            r#"SELECT "{}" FROM "Team" WHERE "id" = ?"#,
            column
        ))
        .bind(team_id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(image_id) = image_id.flatten() {
            sqlx::query(r#"DELETE FROM "UnvalidatedUserSubmittedImage" WHERE "id" = ?"#)
                .bind(image_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(&format!(
            r#"UPDATE "AllTeam" SET "{}" = NULL WHERE "id" = ?"#,
            column
        ))
        .bind(team_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn reset_invite_code(&self, team_id: i64) -> RepositoryResult<()> {
        let result = sqlx::query(r#"UPDATE "AllTeam" SET "inviteCode" = ? WHERE "id" = ?"#)
            .bind(InviteCode::generate().as_str())
            .bind(team_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(format!("Team {}", team_id)));
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn add_new_team_member(&self, args: NewTeamMember) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        let team_count = teams_by_member_user_id(&mut tx, args.user_id).await?.len();
        if team_count >= args.max_teams_allowed {
            return Err(RepositoryError::invariant(
                "Trying to exceed allowed team count",
            ));
        }

        let is_main_team = team_count == 0;

        sqlx::query(
            r#"
            INSERT INTO "AllTeamMember" ("userId", "teamId", "isMainTeam")
            VALUES (?, ?, ?)
            ON CONFLICT ("teamId", "userId") DO UPDATE SET
                "leftAt" = NULL,
                "isMainTeam" = excluded."isMainTeam"
            "#,
        )
        .bind(args.user_id)
        .bind(args.team_id)
        .bind(is_main_team)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn handle_member_leaving(&self, args: MemberLeaving) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        let current_teams = teams_by_member_user_id(&mut tx, args.user_id).await?;
        let team_to_leave = current_teams
            .iter()
            .find(|team| team.id == args.team_id)
            .ok_or_else(|| RepositoryError::invariant(NOT_A_MEMBER))?;

        if team_to_leave.is_owner && args.new_owner_user_id.is_none() {
            return Err(RepositoryError::invariant(
                "New owner id must be provided when old is leaving",
            ));
        }

        if let Some(new_owner) = args.new_owner_user_id {
            let new_owner_is_member = team_to_leave
                .members
                .iter()
                .any(|member| member.id == new_owner && member.id != args.user_id);
            if !new_owner_is_member {
                return Err(RepositoryError::invariant(
                    "New owner must be a member of this team",
                ));
            }
        }

        let new_main_team = current_teams.iter().find(|team| team.id != args.team_id);
        if let (true, Some(new_main_team)) = (team_to_leave.is_main_team, new_main_team) {
            set_main_team(&mut tx, args.user_id, new_main_team.id).await?;
        }

        sqlx::query(
            r#"
            UPDATE "AllTeamMember"
            SET "leftAt" = ?, "isMainTeam" = 0, "isOwner" = 0, "isManager" = 0
            WHERE "userId" = ? AND "teamId" = ?
            "#,
        )
        .bind(timestamp_now())
        .bind(args.user_id)
        .bind(args.team_id)
        .execute(&mut *tx)
        .await?;

        if let Some(new_owner) = args.new_owner_user_id {
            sqlx::query(
                r#"
                UPDATE "AllTeamMember"
                SET "isOwner" = 1, "isManager" = 0
                WHERE "userId" = ? AND "teamId" = ?
                "#,
            )
            .bind(new_owner)
            .bind(args.team_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn patron_tier_of(&self, user_id: i64) -> RepositoryResult<Option<i64>> {
        let tier: Option<Option<i64>> =
            sqlx::query_scalar(r#"SELECT "patronTier" FROM "User" WHERE "id" = ?"#)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(tier.flatten())
    }
}

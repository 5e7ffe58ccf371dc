use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};

use crate::domain::art::art::ResolvedTag;
use crate::domain::art::{Art, ArtEdit, NewArt, TagToAdd};
use crate::domain::repositories::{ArtRepository, RepositoryError, RepositoryResult};

/// SQLite implementation of ArtRepository
pub struct SqliteArtRepository {
    pool: SqlitePool,
}

impl SqliteArtRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn link_users(
    conn: &mut SqliteConnection,
    art_id: i64,
    user_ids: &[i64],
) -> RepositoryResult<()> {
    let mut seen = HashSet::new();
    for user_id in user_ids.iter().filter(|id| seen.insert(**id)) {
        sqlx::query(r#"INSERT INTO "ArtUserMetadata" ("artId", "userId") VALUES (?, ?)"#)
            .bind(art_id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Attaches tags to the art, creating tags that only have a name
async fn tag_art(
    conn: &mut SqliteConnection,
    art_id: i64,
    author_id: i64,
    tags: &[TagToAdd],
) -> RepositoryResult<()> {
    let mut attached = HashSet::new();
    for tag in tags {
        let tag_id = match tag.resolve().map_err(RepositoryError::Invariant)? {
            ResolvedTag::Existing(id) => id,
            ResolvedTag::Create(name) => {
                sqlx::query_scalar(
                    r#"INSERT INTO "ArtTag" ("name", "authorId") VALUES (?, ?) RETURNING "id""#,
                )
                .bind(name)
                .bind(author_id)
                .fetch_one(&mut *conn)
                .await?
            }
        };
        if !attached.insert(tag_id) {
            continue;
        }

        sqlx::query(r#"INSERT INTO "TaggedArt" ("artId", "tagId") VALUES (?, ?)"#)
            .bind(art_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

#[async_trait]
impl ArtRepository for SqliteArtRepository {
    #[tracing::instrument(skip(self), fields(author_id = args.author_id))]
    async fn add_new_art(&self, args: NewArt) -> RepositoryResult<i64> {
        let mut tx = self.pool.begin().await?;

        let img_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO "UnvalidatedUserSubmittedImage" ("submitterUserId", "url", "validatedAt")
            VALUES (?, ?, ?)
            RETURNING "id"
            "#,
        )
        .bind(args.author_id)
        .bind(&args.url)
        .bind(args.validated_at)
        .fetch_one(&mut *tx)
        .await?;

        let art = sqlx::query_as::<_, Art>(
            r#"
            INSERT INTO "Art" ("authorId", "description", "imgId", "isShowcase")
            VALUES (
                ?1,
                ?2,
                ?3,
                -- ensures first art is always showcase
                NOT EXISTS (SELECT 1 FROM "Art" WHERE "authorId" = ?1)
            )
            RETURNING *
            "#,
        )
        .bind(args.author_id)
        .bind(&args.description)
        .bind(img_id)
        .fetch_one(&mut *tx)
        .await?;

        link_users(&mut tx, art.id, &args.linked_users).await?;
        tag_art(&mut tx, art.id, args.author_id, &args.tags).await?;

        tx.commit().await?;

        tracing::info!(art_id = art.id, is_showcase = art.is_showcase, "Art added");
        Ok(art.id)
    }

    #[tracing::instrument(skip(self), fields(art_id = args.art_id))]
    async fn edit_art(&self, args: ArtEdit) -> RepositoryResult<i64> {
        let mut tx = self.pool.begin().await?;

        if args.is_showcase {
            sqlx::query(r#"UPDATE "Art" SET "isShowcase" = 0 WHERE "authorId" = ?"#)
                .bind(args.author_id)
                .execute(&mut *tx)
                .await?;
        }

        let art_id: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE "Art"
            SET "description" = ?, "isShowcase" = ?
            WHERE "id" = ?
            RETURNING "id"
            "#,
        )
        .bind(&args.description)
        .bind(args.is_showcase)
        .bind(args.art_id)
        .fetch_optional(&mut *tx)
        .await?;

        let art_id = art_id.ok_or_else(|| RepositoryError::not_found(format!("Art {}", args.art_id)))?;

        sqlx::query(r#"DELETE FROM "ArtUserMetadata" WHERE "artId" = ?"#)
            .bind(art_id)
            .execute(&mut *tx)
            .await?;
        link_users(&mut tx, art_id, &args.linked_users).await?;

        sqlx::query(r#"DELETE FROM "TaggedArt" WHERE "artId" = ?"#)
            .bind(art_id)
            .execute(&mut *tx)
            .await?;
        tag_art(&mut tx, art_id, args.author_id, &args.tags).await?;

        tx.commit().await?;
        Ok(art_id)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, art_id: i64) -> RepositoryResult<Option<Art>> {
        let art = sqlx::query_as::<_, Art>(r#"SELECT * FROM "Art" WHERE "id" = ?"#)
            .bind(art_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(art)
    }
}

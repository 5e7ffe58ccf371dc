//! Integration tests for the SQLite repositories
//!
//! Every test runs against its own migrated in-memory database.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use turfhub_api::domain::art::{ArtEdit, NewArt, TagToAdd};
use turfhub_api::domain::repositories::{
    ArtRepository, CreateTeam, MemberLeaving, NewTeamMember, RepositoryError, TeamRepository,
    TournamentRepository, UpdateTeam,
};
use turfhub_api::domain::team::{MemberRole, TeamImageType};
use turfhub_api::domain::tournament::{MapPickingStyle, MatchResult};
use turfhub_api::infrastructure::database::in_memory_pool;
use turfhub_api::infrastructure::repositories::{
    SqliteArtRepository, SqliteTeamRepository, SqliteTournamentRepository,
};

async fn setup_test_db() -> SqlitePool {
    in_memory_pool().await.expect("Failed to open test database")
}

async fn create_test_user(pool: &SqlitePool, username: &str, patron_tier: Option<i64>) -> i64 {
    sqlx::query_scalar(
        r#"INSERT INTO "User" ("username", "patronTier") VALUES (?, ?) RETURNING "id""#,
    )
    .bind(username)
    .bind(patron_tier)
    .fetch_one(pool)
    .await
    .expect("Failed to create test user")
}

async fn create_test_team(
    repo: &SqliteTeamRepository,
    owner_user_id: i64,
    name: &str,
    is_main_team: bool,
) -> i64 {
    repo.create(CreateTeam {
        name: name.to_string(),
        custom_url: name.to_lowercase().replace(' ', "-"),
        owner_user_id,
        is_main_team,
    })
    .await
    .expect("Failed to create team")
}

async fn main_team_ids(repo: &SqliteTeamRepository, user_id: i64) -> Vec<i64> {
    repo.teams_by_member_user_id(user_id)
        .await
        .expect("Failed to load teams")
        .into_iter()
        .filter(|team| team.is_main_team)
        .map(|team| team.id)
        .collect()
}

fn assert_invariant(err: RepositoryError, expected: &str) {
    match err {
        RepositoryError::Invariant(message) => assert_eq!(message, expected),
        other => panic!("Expected invariant error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_create_team_makes_owner_membership() {
    let pool = setup_test_db().await;
    let repo = SqliteTeamRepository::new(pool.clone());
    let owner = create_test_user(&pool, "owner", None).await;

    let team_id = create_test_team(&repo, owner, "Ink Storm", true).await;

    let details = repo
        .find_by_custom_url("INK-STORM", false)
        .await
        .expect("Failed to find team")
        .expect("Team should exist");

    assert_eq!(details.id, team_id);
    assert_eq!(details.name, "Ink Storm");
    assert!(details.invite_code.is_none());
    assert_eq!(details.members.len(), 1);
    assert!(details.members[0].is_owner);
    assert!(details.members[0].is_main_team);

    let with_code = repo
        .find_by_custom_url("ink-storm", true)
        .await
        .expect("Failed to find team")
        .expect("Team should exist");
    assert_eq!(with_code.invite_code.map(|c| c.len()), Some(10));
}

#[tokio::test]
async fn test_update_team_returns_row() {
    let pool = setup_test_db().await;
    let repo = SqliteTeamRepository::new(pool.clone());
    let owner = create_test_user(&pool, "owner", None).await;
    let team_id = create_test_team(&repo, owner, "Ink Storm", true).await;

    let row = repo
        .update(UpdateTeam {
            id: team_id,
            name: "Ink Tempest".to_string(),
            custom_url: "ink-tempest".to_string(),
            bio: Some("We paint".to_string()),
            bsky: None,
            css: None,
        })
        .await
        .expect("Failed to update team");

    assert_eq!(row.name, "Ink Tempest");
    assert_eq!(row.custom_url, "ink-tempest");
    assert_eq!(row.bio.as_deref(), Some("We paint"));

    let missing = repo
        .update(UpdateTeam {
            id: 999,
            name: "Nope".to_string(),
            custom_url: "nope".to_string(),
            bio: None,
            bsky: None,
            css: None,
        })
        .await;
    assert!(matches!(missing, Err(RepositoryError::NotFound(_))));
}

#[tokio::test]
async fn test_switch_main_team() {
    let pool = setup_test_db().await;
    let repo = SqliteTeamRepository::new(pool.clone());
    let user = create_test_user(&pool, "player", Some(2)).await;
    let other = create_test_user(&pool, "other", None).await;

    let first = create_test_team(&repo, user, "First", true).await;
    let second = create_test_team(&repo, user, "Second", false).await;
    let foreign = create_test_team(&repo, other, "Foreign", true).await;

    repo.switch_main_team(user, second)
        .await
        .expect("Failed to switch main team");
    assert_eq!(main_team_ids(&repo, user).await, vec![second]);

    let err = repo
        .switch_main_team(user, foreign)
        .await
        .expect_err("Switching to a foreign team should fail");
    assert_invariant(err, "User is not a member of this team");

    // failed switch leaves the previous state intact
    assert_eq!(main_team_ids(&repo, user).await, vec![second]);
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_delete_team_moves_main_team() {
    let pool = setup_test_db().await;
    let repo = SqliteTeamRepository::new(pool.clone());
    let user = create_test_user(&pool, "player", None).await;

    let first = create_test_team(&repo, user, "First", true).await;
    let second = create_test_team(&repo, user, "Second", false).await;

    sqlx::query(r#"INSERT INTO "LFGPost" ("authorId", "teamId", "text") VALUES (?, ?, ?)"#)
        .bind(user)
        .bind(first)
        .bind("Looking for players")
        .execute(&pool)
        .await
        .expect("Failed to insert LFG post");

    repo.delete(first).await.expect("Failed to delete team");

    assert_eq!(main_team_ids(&repo, user).await, vec![second]);

    let listing = repo.find_all_undisbanded().await.expect("Failed to list");
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].custom_url, "second");

    let posts: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "LFGPost""#)
        .fetch_one(&pool)
        .await
        .expect("Failed to count posts");
    assert_eq!(posts, 0);

    let deleted_at: Option<i64> =
        sqlx::query_scalar(r#"SELECT "deletedAt" FROM "AllTeam" WHERE "id" = ?"#)
            .bind(first)
            .fetch_one(&pool)
            .await
            .expect("Failed to read team");
    assert!(deleted_at.is_some());

    assert!(matches!(
        repo.delete(first).await,
        Err(RepositoryError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_add_new_team_member_respects_limit() {
    let pool = setup_test_db().await;
    let repo = SqliteTeamRepository::new(pool.clone());
    let owner = create_test_user(&pool, "owner", None).await;
    let joiner = create_test_user(&pool, "joiner", None).await;

    let first = create_test_team(&repo, owner, "First", true).await;
    let second = create_test_team(&repo, owner, "Second", false).await;
    let third_owner = create_test_user(&pool, "third", None).await;
    let third = create_test_team(&repo, third_owner, "Third", true).await;

    repo.add_new_team_member(NewTeamMember {
        user_id: joiner,
        team_id: first,
        max_teams_allowed: 2,
    })
    .await
    .expect("Failed to join first team");
    repo.add_new_team_member(NewTeamMember {
        user_id: joiner,
        team_id: second,
        max_teams_allowed: 2,
    })
    .await
    .expect("Failed to join second team");

    // only the first team joined becomes main
    assert_eq!(main_team_ids(&repo, joiner).await, vec![first]);

    let err = repo
        .add_new_team_member(NewTeamMember {
            user_id: joiner,
            team_id: third,
            max_teams_allowed: 2,
        })
        .await
        .expect_err("Third team should exceed the limit");
    assert_invariant(err, "Trying to exceed allowed team count");
}

#[tokio::test]
async fn test_member_leaving_and_rejoining() {
    let pool = setup_test_db().await;
    let repo = SqliteTeamRepository::new(pool.clone());
    let owner = create_test_user(&pool, "owner", None).await;
    let member = create_test_user(&pool, "member", None).await;
    let team_id = create_test_team(&repo, owner, "Ink Storm", true).await;

    repo.add_new_team_member(NewTeamMember {
        user_id: member,
        team_id,
        max_teams_allowed: 2,
    })
    .await
    .expect("Failed to join");

    let err = repo
        .handle_member_leaving(MemberLeaving {
            user_id: owner,
            team_id,
            new_owner_user_id: None,
        })
        .await
        .expect_err("Owner must name a successor");
    assert_invariant(err, "New owner id must be provided when old is leaving");

    repo.handle_member_leaving(MemberLeaving {
        user_id: owner,
        team_id,
        new_owner_user_id: Some(member),
    })
    .await
    .expect("Failed to leave");

    let details = repo
        .find_by_custom_url("ink-storm", false)
        .await
        .expect("Failed to find team")
        .expect("Team should exist");
    assert_eq!(details.members.len(), 1);
    assert!(details.is_owner(member));
    assert!(repo
        .teams_by_member_user_id(owner)
        .await
        .expect("Failed to load teams")
        .is_empty());

    let err = repo
        .handle_member_leaving(MemberLeaving {
            user_id: owner,
            team_id,
            new_owner_user_id: None,
        })
        .await
        .expect_err("Former member cannot leave again");
    assert_invariant(err, "User is not a member of this team");

    repo.add_new_team_member(NewTeamMember {
        user_id: owner,
        team_id,
        max_teams_allowed: 2,
    })
    .await
    .expect("Failed to rejoin");

    assert_eq!(main_team_ids(&repo, owner).await, vec![team_id]);
    let details = repo
        .find_by_custom_url("ink-storm", false)
        .await
        .expect("Failed to find team")
        .expect("Team should exist");
    assert_eq!(details.members.len(), 2);
    assert!(!details.is_owner(owner));
}

#[tokio::test]
async fn test_custom_url_is_unique_among_live_teams() {
    let pool = setup_test_db().await;
    let repo = SqliteTeamRepository::new(pool.clone());
    let owner = create_test_user(&pool, "owner", None).await;
    let other = create_test_user(&pool, "other", None).await;

    let first = create_test_team(&repo, owner, "Dup", true).await;
    let err = repo
        .create(CreateTeam {
            name: "Dup".to_string(),
            custom_url: "dup".to_string(),
            owner_user_id: other,
            is_main_team: true,
        })
        .await
        .expect_err("Second team with the same URL should fail");
    assert!(matches!(err, RepositoryError::Conflict(_)));

    let rows: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "Team" WHERE "customUrl" = 'dup'"#)
        .fetch_one(&pool)
        .await
        .expect("Failed to count teams");
    assert_eq!(rows, 1);
    assert!(repo
        .teams_by_member_user_id(other)
        .await
        .expect("Failed to load teams")
        .is_empty());

    let second = create_test_team(&repo, other, "Other", true).await;
    let err = repo
        .update(UpdateTeam {
            id: second,
            name: "Dup".to_string(),
            custom_url: "dup".to_string(),
            bio: None,
            bsky: None,
            css: None,
        })
        .await
        .expect_err("Rename onto a taken URL should fail");
    match err {
        RepositoryError::Conflict(message) => assert_eq!(message, "Team URL already taken: dup"),
        err => panic!("Expected conflict, got {:?}", err),
    }

    // a disbanded team frees its URL
    repo.delete(first).await.expect("Failed to delete team");
    create_test_team(&repo, other, "Dup", false).await;
}

#[tokio::test]
async fn test_leaving_main_team_moves_main_status() {
    let pool = setup_test_db().await;
    let repo = SqliteTeamRepository::new(pool.clone());
    let leaver = create_test_user(&pool, "leaver", None).await;
    let successor = create_test_user(&pool, "successor", None).await;
    let other_owner = create_test_user(&pool, "other-owner", None).await;

    let main_team = create_test_team(&repo, leaver, "Main Squad", true).await;
    let side_team = create_test_team(&repo, other_owner, "Side Squad", true).await;
    for (user_id, team_id) in [(successor, main_team), (leaver, side_team)] {
        repo.add_new_team_member(NewTeamMember {
            user_id,
            team_id,
            max_teams_allowed: 2,
        })
        .await
        .expect("Failed to join");
    }
    assert_eq!(main_team_ids(&repo, leaver).await, vec![main_team]);

    repo.handle_member_leaving(MemberLeaving {
        user_id: leaver,
        team_id: main_team,
        new_owner_user_id: Some(successor),
    })
    .await
    .expect("Failed to leave");

    assert_eq!(main_team_ids(&repo, leaver).await, vec![side_team]);
}

#[tokio::test]
async fn test_new_owner_must_be_a_member() {
    let pool = setup_test_db().await;
    let repo = SqliteTeamRepository::new(pool.clone());
    let owner = create_test_user(&pool, "owner", None).await;
    let outsider = create_test_user(&pool, "outsider", None).await;
    let team_id = create_test_team(&repo, owner, "Ink Storm", true).await;

    let err = repo
        .handle_member_leaving(MemberLeaving {
            user_id: owner,
            team_id,
            new_owner_user_id: Some(outsider),
        })
        .await
        .expect_err("Outsider cannot take over");
    assert_invariant(err, "New owner must be a member of this team");

    let details = repo
        .find_by_custom_url("ink-storm", false)
        .await
        .expect("Failed to find team")
        .expect("Team should exist");
    assert!(details.is_owner(owner));
    assert!(details.member(outsider).is_none());
}

#[tokio::test]
async fn test_member_role_is_read_back() {
    let pool = setup_test_db().await;
    let repo = SqliteTeamRepository::new(pool.clone());
    let owner = create_test_user(&pool, "owner", None).await;
    let team_id = create_test_team(&repo, owner, "Ink Storm", true).await;

    sqlx::query(r#"UPDATE "AllTeamMember" SET "role" = 'Frontline' WHERE "teamId" = ?"#)
        .bind(team_id)
        .execute(&pool)
        .await
        .expect("Failed to set role");

    let details = repo
        .find_by_custom_url("ink-storm", false)
        .await
        .expect("Failed to find team")
        .expect("Team should exist");
    assert_eq!(details.members[0].role, MemberRole::new("Frontline"));

    let teams = repo
        .teams_by_member_user_id(owner)
        .await
        .expect("Failed to load teams");
    assert_eq!(teams[0].members[0].role, MemberRole::new("Frontline"));
}

#[tokio::test]
async fn test_remove_team_image() {
    let pool = setup_test_db().await;
    let repo = SqliteTeamRepository::new(pool.clone());
    let owner = create_test_user(&pool, "owner", None).await;
    let team_id = create_test_team(&repo, owner, "Ink Storm", true).await;

    let img_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO "UnvalidatedUserSubmittedImage" ("submitterUserId", "url", "validatedAt")
        VALUES (?, 'avatar.png', 1)
        RETURNING "id"
        "#,
    )
    .bind(owner)
    .fetch_one(&pool)
    .await
    .expect("Failed to insert image");
    sqlx::query(r#"UPDATE "AllTeam" SET "avatarImgId" = ? WHERE "id" = ?"#)
        .bind(img_id)
        .bind(team_id)
        .execute(&pool)
        .await
        .expect("Failed to set avatar");

    let listing = repo.find_all_undisbanded().await.expect("Failed to list");
    assert_eq!(listing[0].avatar_src.as_deref(), Some("avatar.png"));

    repo.remove_team_image(team_id, TeamImageType::Avatar)
        .await
        .expect("Failed to remove image");

    let images: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "UnvalidatedUserSubmittedImage""#)
        .fetch_one(&pool)
        .await
        .expect("Failed to count images");
    assert_eq!(images, 0);

    let listing = repo.find_all_undisbanded().await.expect("Failed to list");
    assert!(listing[0].avatar_src.is_none());
}

async fn invite_code(repo: &SqliteTeamRepository) -> Option<String> {
    repo.find_by_custom_url("ink-storm", true)
        .await
        .expect("Failed to find team")
        .and_then(|team| team.invite_code)
}

#[tokio::test]
async fn test_reset_invite_code() {
    let pool = setup_test_db().await;
    let repo = SqliteTeamRepository::new(pool.clone());
    let owner = create_test_user(&pool, "owner", None).await;
    let team_id = create_test_team(&repo, owner, "Ink Storm", true).await;

    let before = invite_code(&repo).await;
    repo.reset_invite_code(team_id)
        .await
        .expect("Failed to reset code");
    let after = invite_code(&repo).await;

    assert!(before.is_some());
    assert_ne!(before, after);
}

#[tokio::test]
async fn test_first_art_is_showcase() {
    let pool = setup_test_db().await;
    let repo = SqliteArtRepository::new(pool.clone());
    let artist = create_test_user(&pool, "artist", None).await;
    let friend = create_test_user(&pool, "friend", None).await;

    let new_art = |url: &str| NewArt {
        author_id: artist,
        description: None,
        url: url.to_string(),
        validated_at: Some(Utc::now().timestamp()),
        linked_users: vec![friend],
        tags: vec![TagToAdd {
            id: None,
            name: Some(format!("tag-{}", url)),
        }],
    };

    let first = repo.add_new_art(new_art("a.png")).await.expect("Failed to add art");
    let second = repo.add_new_art(new_art("b.png")).await.expect("Failed to add art");

    let first = repo.find_by_id(first).await.expect("Query failed").expect("exists");
    let second = repo.find_by_id(second).await.expect("Query failed").expect("exists");
    assert!(first.is_showcase);
    assert!(!second.is_showcase);

    let links: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "ArtUserMetadata""#)
        .fetch_one(&pool)
        .await
        .expect("Failed to count links");
    assert_eq!(links, 2);
}

#[tokio::test]
async fn test_edit_art_moves_showcase_and_replaces_tags() {
    let pool = setup_test_db().await;
    let repo = SqliteArtRepository::new(pool.clone());
    let artist = create_test_user(&pool, "artist", None).await;

    let art = |url: &str| NewArt {
        author_id: artist,
        description: None,
        url: url.to_string(),
        validated_at: None,
        linked_users: vec![],
        tags: vec![TagToAdd {
            id: None,
            name: Some("old".to_string()),
        }],
    };
    let first = repo.add_new_art(art("a.png")).await.expect("Failed to add art");
    let second = repo
        .add_new_art(NewArt {
            tags: vec![],
            ..art("b.png")
        })
        .await
        .expect("Failed to add art");

    let old_tag: i64 = sqlx::query_scalar(r#"SELECT "id" FROM "ArtTag" WHERE "name" = 'old'"#)
        .fetch_one(&pool)
        .await
        .expect("Tag should exist");

    repo.edit_art(ArtEdit {
        art_id: second,
        author_id: artist,
        description: Some("Better".to_string()),
        is_showcase: true,
        linked_users: vec![],
        tags: vec![
            TagToAdd {
                id: Some(old_tag),
                name: None,
            },
            TagToAdd {
                id: None,
                name: Some("new".to_string()),
            },
        ],
    })
    .await
    .expect("Failed to edit art");

    let first = repo.find_by_id(first).await.expect("Query failed").expect("exists");
    let second = repo.find_by_id(second).await.expect("Query failed").expect("exists");
    assert!(!first.is_showcase);
    assert!(second.is_showcase);
    assert_eq!(second.description.as_deref(), Some("Better"));

    let tags: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT "ArtTag"."name" FROM "TaggedArt"
        INNER JOIN "ArtTag" ON "ArtTag"."id" = "TaggedArt"."tagId"
        WHERE "TaggedArt"."artId" = ?
        ORDER BY "ArtTag"."name"
        "#,
    )
    .bind(second.id)
    .fetch_all(&pool)
    .await
    .expect("Failed to load tags");
    assert_eq!(tags, vec!["new".to_string(), "old".to_string()]);
}

#[tokio::test]
async fn test_tag_without_name_aborts_submission() {
    let pool = setup_test_db().await;
    let repo = SqliteArtRepository::new(pool.clone());
    let artist = create_test_user(&pool, "artist", None).await;

    let err = repo
        .add_new_art(NewArt {
            author_id: artist,
            description: None,
            url: "a.png".to_string(),
            validated_at: None,
            linked_users: vec![],
            tags: vec![TagToAdd::default()],
        })
        .await
        .expect_err("Tag without name should fail");
    assert_invariant(err, "tag name must be provided if no id");

    let arts: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "Art""#)
        .fetch_one(&pool)
        .await
        .expect("Failed to count art");
    let images: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "UnvalidatedUserSubmittedImage""#)
        .fetch_one(&pool)
        .await
        .expect("Failed to count images");
    assert_eq!((arts, images), (0, 0));
}

#[tokio::test]
async fn test_repeated_links_and_tags_are_attached_once() {
    let pool = setup_test_db().await;
    let repo = SqliteArtRepository::new(pool.clone());
    let artist = create_test_user(&pool, "artist", None).await;
    let friend = create_test_user(&pool, "friend", None).await;

    let art_id = repo
        .add_new_art(NewArt {
            author_id: artist,
            description: None,
            url: "a.png".to_string(),
            validated_at: None,
            linked_users: vec![friend, friend],
            tags: vec![TagToAdd {
                id: None,
                name: Some("splat".to_string()),
            }],
        })
        .await
        .expect("Failed to add art");
    let tag_id: i64 = sqlx::query_scalar(r#"SELECT "id" FROM "ArtTag" WHERE "name" = 'splat'"#)
        .fetch_one(&pool)
        .await
        .expect("Tag should exist");

    repo.edit_art(ArtEdit {
        art_id,
        author_id: artist,
        description: None,
        is_showcase: true,
        linked_users: vec![friend, friend],
        tags: vec![
            TagToAdd {
                id: Some(tag_id),
                name: None,
            },
            TagToAdd {
                id: Some(tag_id),
                name: None,
            },
        ],
    })
    .await
    .expect("Failed to edit art");

    let links: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "ArtUserMetadata""#)
        .fetch_one(&pool)
        .await
        .expect("Failed to count links");
    let tags: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "TaggedArt""#)
        .fetch_one(&pool)
        .await
        .expect("Failed to count tags");
    assert_eq!((links, tags), (1, 1));
}

#[tokio::test]
async fn test_unknown_references_abort_submission() {
    let pool = setup_test_db().await;
    let repo = SqliteArtRepository::new(pool.clone());
    let artist = create_test_user(&pool, "artist", None).await;

    let submission = |linked_users: Vec<i64>, tags: Vec<TagToAdd>| NewArt {
        author_id: artist,
        description: None,
        url: "a.png".to_string(),
        validated_at: None,
        linked_users,
        tags,
    };

    let unknown_user = repo
        .add_new_art(submission(vec![9999], vec![]))
        .await
        .expect_err("Unknown linked user should fail");
    let unknown_tag = repo
        .add_new_art(submission(
            vec![],
            vec![TagToAdd {
                id: Some(777),
                name: None,
            }],
        ))
        .await
        .expect_err("Unknown tag should fail");

    assert!(matches!(unknown_user, RepositoryError::Invariant(_)));
    assert!(matches!(unknown_tag, RepositoryError::Invariant(_)));

    let arts: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "Art""#)
        .fetch_one(&pool)
        .await
        .expect("Failed to count art");
    assert_eq!(arts, 0);
}

/// Tournament with two teams of one member each, bracket 0 starting in 30 minutes
async fn seed_tournament(pool: &SqlitePool) -> (i64, i64, i64) {
    let captain = create_test_user(pool, "captain", None).await;
    let rival = create_test_user(pool, "rival", None).await;

    let tournament_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO "Tournament" ("name", "mapPickingStyle", "minMembersPerTeam", "castedMatchesInfo")
        VALUES ('Weekly', 'TO', 1, '{"castedMatches":[{"matchId":1,"twitchAccount":"caster"}],"lockedMatches":[]}')
        RETURNING "id"
        "#,
    )
    .fetch_one(pool)
    .await
    .expect("Failed to create tournament");

    let mut team_ids = Vec::new();
    for (name, user_id) in [("Alpha", captain), ("Beta", rival)] {
        let team_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO "TournamentTeam" ("tournamentId", "name", "seed")
            VALUES (?, ?, ?)
            RETURNING "id"
            "#,
        )
        .bind(tournament_id)
        .bind(name)
        .bind(team_ids.len() as i64 + 1)
        .fetch_one(pool)
        .await
        .expect("Failed to create tournament team");
        sqlx::query(
            r#"INSERT INTO "TournamentTeamMember" ("tournamentTeamId", "userId") VALUES (?, ?)"#,
        )
        .bind(team_id)
        .bind(user_id)
        .execute(pool)
        .await
        .expect("Failed to add member");
        team_ids.push(team_id);
    }

    sqlx::query(
        r#"
        INSERT INTO "TournamentBracket" ("tournamentId", "idx", "name", "startTime", "requiresCheckIn")
        VALUES (?, 0, 'Main', ?, 1)
        "#,
    )
    .bind(tournament_id)
    .bind((Utc::now() + Duration::minutes(30)).timestamp())
    .execute(pool)
    .await
    .expect("Failed to create bracket");

    sqlx::query(
        r#"
        INSERT INTO "TournamentBracketTeam" ("tournamentId", "bracketIdx", "tournamentTeamId")
        VALUES (?, 0, ?)
        "#,
    )
    .bind(tournament_id)
    .bind(team_ids[0])
    .execute(pool)
    .await
    .expect("Failed to add bracket team");

    (tournament_id, team_ids[0], team_ids[1])
}

#[tokio::test]
async fn test_find_context_loads_engine_state() {
    let pool = setup_test_db().await;
    let repo = SqliteTournamentRepository::new(pool.clone());
    let (tournament_id, alpha, beta) = seed_tournament(&pool).await;

    sqlx::query(
        r#"
        INSERT INTO "TournamentMatch" (
            "tournamentId", "bracketIdx", "roundNumber", "number", "bracketType",
            "opponent1Id", "opponent1Score", "opponent1Result",
            "opponent2Id", "opponent2Score", "opponent2Result"
        )
        VALUES (?, 0, 1, 1, 'winners', ?, 2, 'win', ?, 0, 'loss')
        "#,
    )
    .bind(tournament_id)
    .bind(alpha)
    .bind(beta)
    .execute(&pool)
    .await
    .expect("Failed to insert match");
    sqlx::query(
        r#"
        INSERT INTO "TournamentMatch" ("tournamentId", "bracketIdx", "roundNumber", "number", "opponent2Bye")
        VALUES (?, 0, 1, 2, 1)
        "#,
    )
    .bind(tournament_id)
    .execute(&pool)
    .await
    .expect("Failed to insert bye");

    let ctx = repo
        .find_context(tournament_id)
        .await
        .expect("Failed to load context")
        .expect("Tournament should exist");

    assert_eq!(ctx.name, "Weekly");
    assert_eq!(ctx.map_picking_style, MapPickingStyle::To);
    assert_eq!(ctx.teams.len(), 2);
    assert_eq!(ctx.teams[0].members[0].username, "captain");
    assert_eq!(ctx.brackets.len(), 1);
    assert!(ctx.brackets[0].is_eligible(alpha));
    assert!(!ctx.brackets[0].is_eligible(beta));
    assert_eq!(ctx.casting_account(1), Some("caster"));

    let finished = &ctx.matches[0];
    assert!(finished.is_over());
    assert_eq!(
        finished.opponent1.as_ref().and_then(|o| o.result),
        Some(MatchResult::Win)
    );
    assert!(ctx.matches[1].is_bye());

    assert!(repo
        .find_context(tournament_id + 1)
        .await
        .expect("Query failed")
        .is_none());
}

#[tokio::test]
async fn test_check_in_is_recorded_once() {
    let pool = setup_test_db().await;
    let repo = SqliteTournamentRepository::new(pool.clone());
    let (tournament_id, alpha, _) = seed_tournament(&pool).await;
    let now = Utc::now();

    repo.check_in(alpha, now).await.expect("Failed to check in");
    assert!(matches!(
        repo.check_in(alpha, now).await,
        Err(RepositoryError::Conflict(_))
    ));

    repo.bracket_check_in(tournament_id, 0, alpha, now)
        .await
        .expect("Failed to check in to bracket");
    assert!(matches!(
        repo.bracket_check_in(tournament_id, 0, alpha, now).await,
        Err(RepositoryError::Conflict(_))
    ));

    let ctx = repo
        .find_context(tournament_id)
        .await
        .expect("Failed to load context")
        .expect("Tournament should exist");
    assert!(ctx.teams[0].is_checked_in());
    assert!(ctx.brackets[0].is_checked_in(alpha));
}

#[tokio::test]
async fn test_streams_ordered_by_viewers() {
    let pool = setup_test_db().await;
    let repo = SqliteTournamentRepository::new(pool.clone());
    let (tournament_id, _, _) = seed_tournament(&pool).await;

    for (name, viewers) in [("small", 3), ("big", 120), ("medium", 40)] {
        sqlx::query(
            r#"
            INSERT INTO "TournamentStream" ("tournamentId", "twitchUserName", "viewerCount")
            VALUES (?, ?, ?)
            "#,
        )
        .bind(tournament_id)
        .bind(name)
        .bind(viewers)
        .execute(&pool)
        .await
        .expect("Failed to insert stream");
    }

    let names: Vec<String> = repo
        .streams(tournament_id)
        .await
        .expect("Failed to load streams")
        .into_iter()
        .map(|s| s.twitch_user_name)
        .collect();

    assert_eq!(names, vec!["big", "medium", "small"]);
}

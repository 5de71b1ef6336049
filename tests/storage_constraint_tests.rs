/// Tests for the storage-level invariants backing the share subsystem
///
/// These drive SQLite directly: the unique indexes are the final authority
/// for the races the request handlers cannot close (duplicate slugs,
/// concurrent single-active-share creates, mirrored friendship rows).

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

async fn setup() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::query(
        r#"
        CREATE TABLE friendship (
            id TEXT PRIMARY KEY,
            requester_id TEXT NOT NULL,
            addressee_id TEXT NOT NULL,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CHECK (requester_id <> addressee_id)
        )
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX friendship_pair_idx
        ON friendship (min(requester_id, addressee_id), max(requester_id, addressee_id))
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        r#"
        CREATE TABLE share_link (
            id TEXT PRIMARY KEY,
            pinory_id TEXT NOT NULL,
            share_slug TEXT NOT NULL UNIQUE,
            visibility TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT,
            revoked_at TEXT,
            view_count INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX share_link_active_idx
        ON share_link (pinory_id, created_by) WHERE is_active = 1
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    pool
}

async fn insert_share(
    pool: &SqlitePool,
    id: &str,
    pinory_id: &str,
    slug: &str,
    is_active: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO share_link
            (id, pinory_id, share_slug, visibility, is_active, created_by, created_at)
        VALUES (?, ?, ?, 'friends', ?, 'alice', '2026-01-01T00:00:00Z')
        "#,
    )
    .bind(id)
    .bind(pinory_id)
    .bind(slug)
    .bind(is_active)
    .execute(pool)
    .await
    .map(|_| ())
}

#[tokio::test]
async fn test_duplicate_slug_rejected() {
    let pool = setup().await;

    insert_share(&pool, "s1", "p1", "aaaabbbbcccc", 1).await.unwrap();
    let duplicate = insert_share(&pool, "s2", "p2", "aaaabbbbcccc", 1).await;
    assert!(duplicate.is_err());
}

#[tokio::test]
async fn test_second_active_share_for_same_pinory_rejected() {
    let pool = setup().await;

    insert_share(&pool, "s1", "p1", "aaaabbbbcccc", 1).await.unwrap();
    // The losing side of the concurrent-create race lands here
    let duplicate = insert_share(&pool, "s2", "p1", "ddddeeeeffff", 1).await;
    assert!(duplicate.is_err());
}

#[tokio::test]
async fn test_inactive_rows_do_not_block_new_active_share() {
    let pool = setup().await;

    insert_share(&pool, "s1", "p1", "aaaabbbbcccc", 0).await.unwrap();
    insert_share(&pool, "s2", "p1", "ddddeeeeffff", 1).await.unwrap();

    // Revoking the active one makes room again
    sqlx::query("UPDATE share_link SET is_active = 0 WHERE id = 's2'")
        .execute(&pool)
        .await
        .unwrap();
    insert_share(&pool, "s3", "p1", "gggghhhhiiii", 1).await.unwrap();
}

#[tokio::test]
async fn test_hard_delete_frees_slug() {
    let pool = setup().await;

    insert_share(&pool, "s1", "p1", "aaaabbbbcccc", 1).await.unwrap();
    sqlx::query("DELETE FROM share_link WHERE id = 's1'")
        .execute(&pool)
        .await
        .unwrap();

    insert_share(&pool, "s2", "p2", "aaaabbbbcccc", 1).await.unwrap();
}

#[tokio::test]
async fn test_self_friendship_rejected_by_check() {
    let pool = setup().await;

    let result = sqlx::query(
        "INSERT INTO friendship (id, requester_id, addressee_id, status, created_at, updated_at)
         VALUES ('f1', 'alice', 'alice', 'pending', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_friendship_pair_unique_in_both_directions() {
    let pool = setup().await;

    sqlx::query(
        "INSERT INTO friendship (id, requester_id, addressee_id, status, created_at, updated_at)
         VALUES ('f1', 'alice', 'bob', 'pending', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let mirrored = sqlx::query(
        "INSERT INTO friendship (id, requester_id, addressee_id, status, created_at, updated_at)
         VALUES ('f2', 'bob', 'alice', 'accepted', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await;
    assert!(mirrored.is_err());

    // A different pair is fine
    sqlx::query(
        "INSERT INTO friendship (id, requester_id, addressee_id, status, created_at, updated_at)
         VALUES ('f3', 'bob', 'carol', 'pending', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn test_view_count_increment_is_atomic_and_monotonic() {
    let pool = setup().await;

    insert_share(&pool, "s1", "p1", "aaaabbbbcccc", 1).await.unwrap();

    for _ in 0..5 {
        sqlx::query("UPDATE share_link SET view_count = view_count + 1 WHERE id = 's1'")
            .execute(&pool)
            .await
            .unwrap();
    }

    let count: i64 = sqlx::query_scalar("SELECT view_count FROM share_link WHERE id = 's1'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 5);
}

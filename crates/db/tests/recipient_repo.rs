//! Database tests for the recipient directory.
//!
//! These need a PostgreSQL instance reachable through `DATABASE_URL` and are
//! ignored by default. Run with `cargo test -p depot-db -- --ignored`.

use depot_core::roles::Role;
use depot_db::repositories::{RecipientRepo, TransferEventRepo};
use sqlx::PgPool;

async fn insert_recipient(
    pool: &PgPool,
    id: &str,
    role: &str,
    is_active: bool,
    tokens: serde_json::Value,
) {
    sqlx::query(
        "INSERT INTO recipients (id, role, is_active, push_tokens) VALUES ($1, $2, $3, $4)",
    )
    .bind(id)
    .bind(role)
    .bind(is_active)
    .bind(tokens)
    .execute(pool)
    .await
    .unwrap_or_else(|e| panic!("insert {id} failed: {e}"));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn lists_only_active_recipients_in_requested_roles(pool: PgPool) {
    insert_recipient(&pool, "u1", "loader", true, serde_json::json!({"tok-a": {}})).await;
    insert_recipient(&pool, "u2", "loader", false, serde_json::json!({"tok-b": {}})).await;
    insert_recipient(&pool, "u3", "admin", true, serde_json::json!({"tok-c": {}})).await;
    insert_recipient(&pool, "u4", "storekeeper", true, serde_json::json!({})).await;

    let loaders = RecipientRepo::list_active_by_roles(&pool, &[Role::Loader])
        .await
        .unwrap();
    assert_eq!(loaders.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), ["u1"]);
    assert_eq!(loaders[0].tokens().collect::<Vec<_>>(), ["tok-a"]);
    assert_eq!(loaders[0].role().unwrap(), Role::Loader);

    let staff = RecipientRepo::list_active_by_roles(&pool, &Role::ALL)
        .await
        .unwrap();
    assert_eq!(
        staff.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
        ["u1", "u3", "u4"]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn remove_push_tokens_deletes_only_named_keys(pool: PgPool) {
    insert_recipient(
        &pool,
        "u1",
        "loader",
        true,
        serde_json::json!({"tok-a": {"platform": "android"}, "tok-b": {}, "tok-c": {}}),
    )
    .await;

    let found = RecipientRepo::remove_push_tokens(&pool, "u1", &["tok-b".to_string()])
        .await
        .unwrap();
    assert!(found);

    let recipient = RecipientRepo::find_by_id(&pool, "u1").await.unwrap().unwrap();
    assert_eq!(recipient.tokens().collect::<Vec<_>>(), ["tok-a", "tok-c"]);
    assert_eq!(recipient.push_tokens.0["tok-a"]["platform"], "android");
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn remove_push_tokens_is_idempotent(pool: PgPool) {
    insert_recipient(&pool, "u1", "loader", true, serde_json::json!({"tok-a": {}})).await;
    let dead = vec!["tok-a".to_string()];

    assert!(RecipientRepo::remove_push_tokens(&pool, "u1", &dead).await.unwrap());
    assert!(RecipientRepo::remove_push_tokens(&pool, "u1", &dead).await.unwrap());

    let recipient = RecipientRepo::find_by_id(&pool, "u1").await.unwrap().unwrap();
    assert_eq!(recipient.tokens().count(), 0);

    // Unknown recipient: nothing to update, not an error.
    assert!(!RecipientRepo::remove_push_tokens(&pool, "ghost", &dead).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn transfer_event_round_trips(pool: PgPool) {
    let payload = serde_json::json!({"type": "transfer_created", "transferId": "T1"});
    let id = TransferEventRepo::insert(&pool, "T1", &payload).await.unwrap();

    let row = TransferEventRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(row.transfer_id, "T1");
    assert_eq!(row.payload, payload);
    assert!(TransferEventRepo::find_by_id(&pool, id + 1).await.unwrap().is_none());
}

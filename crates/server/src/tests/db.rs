use once_cell::sync::Lazy;
use tokio::sync::Mutex;

use crate::database::connection::{DbConfig, DbConnection};
use crate::models::resource::CreateResourceRequest;
use crate::models::vote::VoteDirection;

/// Some tests can't run in parallel, prevent them from breaking each other's state
static SERIAL_LOCK: Lazy<Mutex<()>> = Lazy::new(Mutex::default);

async fn init_and_get_db() -> DbConnection {
    let _ = tracing_subscriber::fmt::try_init();

    let config = DbConfig::development("catalog_db", "catalog_guest", "catalogpass");
    let db = DbConnection::connect(&config).await.unwrap();
    db.drop_schema().await.unwrap();
    db.init_schema().await.unwrap();
    db
}

fn submission(
    title: &str,
    description: &str,
    cat_tags: &[&str],
    content_type: &[&str],
) -> CreateResourceRequest {
    CreateResourceRequest {
        title: title.to_string(),
        author: "A".to_string(),
        url: "http://x".to_string(),
        description: description.to_string(),
        recommender: "R".to_string(),
        is_faculty: true,
        was_used: false,
        mark_stage: "reviewed".to_string(),
        cat_tags: Some(cat_tags.iter().map(|t| t.to_string()).collect()),
        content_type: Some(content_type.iter().map(|t| t.to_string()).collect()),
    }
}

#[tokio::test]
async fn create_then_list_joined_rows() {
    let _lock = SERIAL_LOCK.lock().await;
    let db = init_and_get_db().await;

    let response = db
        .create_resource(&submission(
            "Intro to X",
            "d",
            &["beginner", "video"],
            &["video"],
        ))
        .await
        .unwrap();
    assert_eq!(response.0.len(), 1);
    let id = response.0[0].id;
    assert_eq!(response.1, vec!["video"]);
    assert_eq!(response.2, vec!["beginner", "video"]);
    assert_eq!(response.3.len(), 1);
    assert_eq!(response.3[0].recommender, "R");
    assert!(response.3[0].is_faculty);
    assert_eq!(response.3[0].mark_stage, "reviewed");
    assert!(!response.3[0].was_used);

    // one row per (content_type x cat_tag) combination
    let rows = db.list_resources().await.unwrap();
    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row.id, id);
        assert_eq!(row.title, "Intro to X");
        assert_eq!(row.author, "A");
        assert_eq!(row.url, "http://x");
        assert_eq!(row.description, "d");
        assert_eq!(row.content_type.as_deref(), Some("video"));
        assert_eq!(row.recommender.as_deref(), Some("R"));
        assert_eq!(row.vote, None);
    }
    let mut tags: Vec<_> = rows.iter().map(|r| r.cat_tags.clone().unwrap()).collect();
    tags.sort();
    assert_eq!(tags, vec!["beginner", "video"]);
}

#[tokio::test]
async fn create_without_tags_or_types() {
    let _lock = SERIAL_LOCK.lock().await;
    let db = init_and_get_db().await;

    let mut request = submission("Bare", "no extras here", &[], &[]);
    request.cat_tags = None;
    request.content_type = None;
    let response = db.create_resource(&request).await.unwrap();
    assert_eq!(response.0.len(), 1);
    assert!(response.1.is_empty());
    assert!(response.2.is_empty());
    assert_eq!(response.3[0].id, response.0[0].id);

    let rows = db.list_resources().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].cat_tags, None);
    assert_eq!(rows[0].content_type, None);
    assert_eq!(rows[0].recommender.as_deref(), Some("R"));
}

#[tokio::test]
async fn vote_upsert_counts() {
    let _lock = SERIAL_LOCK.lock().await;
    let db = init_and_get_db().await;

    let first = db
        .create_resource(&submission("First", "one", &[], &[]))
        .await
        .unwrap()
        .0[0]
        .id;
    let second = db
        .create_resource(&submission("Second", "two", &[], &[]))
        .await
        .unwrap()
        .0[0]
        .id;

    // no prior row: first upvote inserts at 1, second increments
    let row = db.apply_vote(first, VoteDirection::Up).await.unwrap();
    assert_eq!((row.id, row.vote), (first, 1));
    let row = db.apply_vote(first, VoteDirection::Up).await.unwrap();
    assert_eq!((row.id, row.vote), (first, 2));
    let row = db.apply_vote(first, VoteDirection::Down).await.unwrap();
    assert_eq!((row.id, row.vote), (first, 1));

    // downvote with no prior row starts at -1
    let row = db.apply_vote(second, VoteDirection::Down).await.unwrap();
    assert_eq!((row.id, row.vote), (second, -1));

    // listing orders by vote-row id descending
    let rows = db.list_resources().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, second);
    assert_eq!(rows[0].vote, Some(-1));
    assert_eq!(rows[1].id, first);
    assert_eq!(rows[1].vote, Some(1));
}

#[tokio::test]
async fn create_failure_rolls_back_whole_submission() {
    let _lock = SERIAL_LOCK.lock().await;
    let db = init_and_get_db().await;

    // make the recommendation insert fail mid-transaction
    sqlx::query("DROP TABLE recommendations;")
        .execute(db.pool())
        .await
        .unwrap();

    db.create_resource(&submission(
        "Doomed",
        "never lands",
        &["beginner"],
        &["video"],
    ))
    .await
    .unwrap_err();

    // nothing from the earlier inserts survives the rollback
    let resources: i64 = sqlx::query_scalar("SELECT count(*) FROM resources;")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(resources, 0);
    let tags: i64 = sqlx::query_scalar("SELECT count(*) FROM resource_tags;")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(tags, 0);
    let types: i64 = sqlx::query_scalar("SELECT count(*) FROM resource_type;")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(types, 0);
}

#[tokio::test]
async fn vote_on_unknown_resource_fails() {
    let _lock = SERIAL_LOCK.lock().await;
    let db = init_and_get_db().await;

    db.apply_vote(12345, VoteDirection::Up).await.unwrap_err();
}

#[tokio::test]
async fn search_matches_single_resource() {
    let _lock = SERIAL_LOCK.lock().await;
    let db = init_and_get_db().await;

    let wanted = db
        .create_resource(&submission(
            "Intro to X",
            "a gentle quasar walkthrough",
            &["beginner", "video"],
            &["video"],
        ))
        .await
        .unwrap()
        .0[0]
        .id;
    db.create_resource(&submission("Other", "unrelated notes", &["advanced"], &[]))
        .await
        .unwrap();

    // term only present in one description, one row per tag of that resource
    let rows = db.search_resources("quasar").await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.id == wanted));

    // case-insensitive
    let rows = db.search_resources("QUASAR").await.unwrap();
    assert_eq!(rows.len(), 2);

    // title substring, as in the submission flow
    let rows = db.search_resources("Intro").await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.id == wanted));

    // empty term matches every joined row
    let all = db.list_resources().await.unwrap();
    let rows = db.search_resources("").await.unwrap();
    assert_eq!(rows.len(), all.len());
}

#[tokio::test]
async fn tag_search_filters_on_tags_only() {
    let _lock = SERIAL_LOCK.lock().await;
    let db = init_and_get_db().await;

    let tagged = db
        .create_resource(&submission(
            "Tagged",
            "beginner mentioned in description",
            &["video"],
            &[],
        ))
        .await
        .unwrap()
        .0[0]
        .id;
    db.create_resource(&submission("Beginner guide", "text", &["beginner"], &[]))
        .await
        .unwrap();

    // only tag matches count, not title or description
    let rows = db.search_tags("video").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, tagged);

    let rows = db.search_tags("nonexistent").await.unwrap();
    assert!(rows.is_empty());
}

//! Database tests

use super::*;
use chrono::{Duration, Utc};
use tempfile::TempDir;

/// Helper to create a test database
async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::connect(&db_path).await.unwrap();
    (db, temp_dir)
}

fn test_profile(username: &str, is_public: bool) -> Profile {
    Profile {
        id: EntityId::new().0,
        full_name: Some(format!("{} Fullname", username)),
        username: username.to_string(),
        image: None,
        is_public,
    }
}

fn native_post(minutes_ago: i64) -> NativePost {
    NativePost {
        id: EntityId::new().0,
        published_at: Utc::now() - Duration::minutes(minutes_ago),
        description: Some("a native post".to_string()),
        html: Some("<p>a native post</p>".to_string()),
    }
}

fn portfolio_post(portfolio_id: &str, minutes_ago: i64) -> PortfolioPost {
    PortfolioPost {
        id: EntityId::new().0,
        portfolio_id: portfolio_id.to_string(),
        published_at: Utc::now() - Duration::minutes(minutes_ago),
        title: Some("a portfolio piece".to_string()),
        description: None,
        thumbnail_url: Some("https://cdn.example.com/thumb.webp".to_string()),
        url: Some("https://portfolio.example.com/item".to_string()),
    }
}

#[tokio::test]
async fn test_database_connection() {
    let (_db, _temp_dir) = create_test_db().await;
    // Connection successful if we get here without panicking
}

#[tokio::test]
async fn test_profile_upsert_and_get() {
    let (db, _temp_dir) = create_test_db().await;

    let mut profile = test_profile("testuser", true);
    db.upsert_profile(&profile).await.unwrap();

    let retrieved = db.get_profile(&profile.id).await.unwrap().unwrap();
    assert_eq!(retrieved.username, "testuser");
    assert!(retrieved.is_public);

    // Upsert updates in place
    profile.is_public = false;
    db.upsert_profile(&profile).await.unwrap();

    let retrieved = db.get_profile(&profile.id).await.unwrap().unwrap();
    assert!(!retrieved.is_public);
}

#[tokio::test]
async fn test_native_post_resolves_owning_profile() {
    let (db, _temp_dir) = create_test_db().await;

    let profile = test_profile("author", true);
    db.upsert_profile(&profile).await.unwrap();

    let post = native_post(5);
    db.insert_native_post(&post, std::slice::from_ref(&profile.id))
        .await
        .unwrap();

    let rows = db.find_native_posts(30, 0).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].post.id, post.id);

    let resolved = rows[0].profile.as_ref().unwrap();
    assert_eq!(resolved.id, profile.id);
    assert_eq!(resolved.username, "author");
}

#[tokio::test]
async fn test_native_post_without_association_has_no_profile() {
    let (db, _temp_dir) = create_test_db().await;

    let post = native_post(5);
    db.insert_native_post(&post, &[]).await.unwrap();

    let rows = db.find_native_posts(30, 0).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].profile.is_none());
}

#[tokio::test]
async fn test_native_post_with_multiple_associations_yields_one_row() {
    let (db, _temp_dir) = create_test_db().await;

    let first = test_profile("first", true);
    let second = test_profile("second", true);
    db.upsert_profile(&first).await.unwrap();
    db.upsert_profile(&second).await.unwrap();

    let post = native_post(5);
    db.insert_native_post(&post, &[first.id.clone(), second.id.clone()])
        .await
        .unwrap();

    let rows = db.find_native_posts(30, 0).await.unwrap();
    assert_eq!(rows.len(), 1);

    let resolved = rows[0].profile.as_ref().unwrap();
    assert!(resolved.id == first.id || resolved.id == second.id);
}

#[tokio::test]
async fn test_portfolio_post_resolves_profile_through_portfolio() {
    let (db, _temp_dir) = create_test_db().await;

    let profile = test_profile("artist", true);
    db.upsert_profile(&profile).await.unwrap();

    let portfolio = Portfolio {
        id: EntityId::new().0,
        profile_id: profile.id.clone(),
    };
    db.insert_portfolio(&portfolio).await.unwrap();

    let post = portfolio_post(&portfolio.id, 10);
    db.insert_portfolio_post(&post).await.unwrap();

    let rows = db.find_portfolio_posts(30, 0).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].post.id, post.id);
    assert_eq!(
        rows[0].post.thumbnail_url.as_deref(),
        Some("https://cdn.example.com/thumb.webp")
    );

    let resolved = rows[0].profile.as_ref().unwrap();
    assert_eq!(resolved.id, profile.id);
}

#[tokio::test]
async fn test_find_native_posts_orders_and_paginates() {
    let (db, _temp_dir) = create_test_db().await;

    let profile = test_profile("author", true);
    db.upsert_profile(&profile).await.unwrap();

    // Oldest inserted first so insertion order differs from read order
    let mut ids_newest_first = Vec::new();
    for minutes_ago in [50, 40, 30, 20, 10] {
        let post = native_post(minutes_ago);
        db.insert_native_post(&post, std::slice::from_ref(&profile.id))
            .await
            .unwrap();
        ids_newest_first.insert(0, post.id);
    }

    let rows = db.find_native_posts(3, 0).await.unwrap();
    let page_ids: Vec<_> = rows.iter().map(|r| r.post.id.clone()).collect();
    assert_eq!(page_ids, ids_newest_first[0..3]);

    let rows = db.find_native_posts(3, 3).await.unwrap();
    let page_ids: Vec<_> = rows.iter().map(|r| r.post.id.clone()).collect();
    assert_eq!(page_ids, ids_newest_first[3..5]);
}

#[tokio::test]
async fn test_find_portfolio_posts_orders_and_paginates() {
    let (db, _temp_dir) = create_test_db().await;

    let profile = test_profile("artist", true);
    db.upsert_profile(&profile).await.unwrap();

    let portfolio = Portfolio {
        id: EntityId::new().0,
        profile_id: profile.id.clone(),
    };
    db.insert_portfolio(&portfolio).await.unwrap();

    let mut ids_newest_first = Vec::new();
    for minutes_ago in [45, 35, 25, 15] {
        let post = portfolio_post(&portfolio.id, minutes_ago);
        db.insert_portfolio_post(&post).await.unwrap();
        ids_newest_first.insert(0, post.id);
    }

    let rows = db.find_portfolio_posts(2, 1).await.unwrap();
    let page_ids: Vec<_> = rows.iter().map(|r| r.post.id.clone()).collect();
    assert_eq!(page_ids, ids_newest_first[1..3]);
}

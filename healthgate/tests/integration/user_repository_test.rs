//! ユーザーリポジトリの統合テスト（公開APIのみ使用）

use crate::support::memory_pool;
use chrono::{Duration, Utc};
use healthgate::db::traits::UserRepository;
use healthgate::db::users;
use healthgate_common::error::GateError;
use healthgate_common::types::{
    NewUser, PaginationParams, SortDirection, SortField, UserPatch, MAX_PAGE_SIZE,
};
use std::collections::HashSet;
use std::sync::Arc;

#[tokio::test]
async fn test_created_user_is_found_by_id_and_email() {
    let repo: Arc<dyn UserRepository> = Arc::new(memory_pool().await);

    let created = repo
        .create(NewUser::new("Ada Lovelace", "ada@example.com"))
        .await
        .unwrap();

    assert_eq!(repo.find_by_id(created.id).await.unwrap(), Some(created.clone()));
    assert_eq!(
        repo.find_by_email("ada@example.com").await.unwrap(),
        Some(created)
    );
}

#[tokio::test]
async fn test_deleted_user_cannot_be_updated_or_deleted() {
    let repo: Arc<dyn UserRepository> = Arc::new(memory_pool().await);
    let created = repo
        .create(NewUser::new("Ada", "ada@example.com"))
        .await
        .unwrap();

    repo.delete(created.id).await.unwrap();

    assert!(repo.find_by_id(created.id).await.unwrap().is_none());
    assert!(matches!(
        repo.update(created.id, UserPatch::default().full_name("Ghost"))
            .await,
        Err(GateError::NotFound(_))
    ));
    assert!(matches!(
        repo.delete(created.id).await,
        Err(GateError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_update_preserves_created_at_and_advances_updated_at() {
    let pool = memory_pool().await;
    let created = users::create_at(
        &pool,
        NewUser::new("Ada", "ada@example.com"),
        Utc::now() - Duration::minutes(10),
    )
    .await
    .unwrap();

    let updated = users::update(&pool, created.id, UserPatch::default().email("ada@king.example"))
        .await
        .unwrap();

    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= updated.created_at);
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.full_name, "Ada");
}

#[tokio::test]
async fn test_pagination_partitions_the_collection() {
    let pool = memory_pool().await;
    let base = Utc::now() - Duration::hours(2);
    // 同じ作成日時を持つユーザーを混ぜ、idによる順序固定を確認する
    for i in 0..23 {
        users::create_at(
            &pool,
            NewUser::new(format!("User {i}"), format!("user{i}@example.com")),
            base + Duration::seconds((i / 3) as i64),
        )
        .await
        .unwrap();
    }

    let mut seen = HashSet::new();
    let mut skip = 0;
    loop {
        let page = users::find_all(
            &pool,
            &PaginationParams::new(skip, 7).order(SortField::CreatedAt, SortDirection::Desc),
        )
        .await
        .unwrap();
        assert_eq!(page.total, 23);
        assert!(page.data.len() <= 7);
        if page.data.is_empty() {
            break;
        }
        for user in page.data {
            assert!(seen.insert(user.id), "user {} returned twice", user.id);
        }
        skip += 7;
    }

    assert_eq!(seen.len(), 23);
}

#[tokio::test]
async fn test_take_is_clamped_and_echoed() {
    let pool = memory_pool().await;
    for i in 0..3 {
        users::create(&pool, NewUser::new(format!("U{i}"), format!("u{i}@example.com")))
            .await
            .unwrap();
    }

    let page = users::find_all(&pool, &PaginationParams::new(0, 10_000))
        .await
        .unwrap();
    assert_eq!(page.take, MAX_PAGE_SIZE);
    assert_eq!(page.data.len(), 3);

    let page = users::find_all(&pool, &PaginationParams::new(0, 0))
        .await
        .unwrap();
    assert_eq!(page.take, 1);
    assert_eq!(page.data.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_on_file_store_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("users.db").display());
    let pool = healthgate::db::initialize_database(&url, 8).await.unwrap();
    let repo: Arc<dyn UserRepository> = Arc::new(pool.clone());

    let created = repo
        .create(NewUser::new("Ada", "ada@example.com"))
        .await
        .unwrap();

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move {
                repo.update(
                    created.id,
                    UserPatch::default().full_name(format!("Name {}", i)),
                )
                .await
            })
        })
        .collect();

    let mut written = Vec::new();
    for handle in handles {
        written.push(handle.await.unwrap().unwrap());
    }

    let stored = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert!(written.contains(&stored));
    assert_eq!(stored.created_at, created.created_at);
    assert_eq!(repo.count().await.unwrap(), 1);

    pool.close().await;
}

#[tokio::test]
async fn test_failed_update_leaves_store_unchanged() {
    let repo: Arc<dyn UserRepository> = Arc::new(memory_pool().await);
    let ada = repo
        .create(NewUser::new("Ada", "ada@example.com"))
        .await
        .unwrap();
    let grace = repo
        .create(NewUser::new("Grace", "grace@example.com"))
        .await
        .unwrap();
    let before = repo.find_all(&PaginationParams::default()).await.unwrap();

    let missing = repo
        .update(uuid::Uuid::new_v4(), UserPatch::default().email("ada@example.com"))
        .await;
    assert!(matches!(missing, Err(GateError::NotFound(_))));

    let conflict = repo
        .update(grace.id, UserPatch::default().email(" ada@example.com "))
        .await;
    assert!(matches!(conflict, Err(GateError::ConstraintViolation(_))));

    let after = repo.find_all(&PaginationParams::default()).await.unwrap();
    assert_eq!(after.total, 2);
    assert_eq!(after.data, before.data);
    assert_eq!(repo.find_by_id(ada.id).await.unwrap(), Some(ada));
}

//! PostgreSQL repository tests. Run with `--features pg-tests` and a
//! `DATABASE_URL` pointing at a server where test databases may be created.
#![cfg(feature = "pg-tests")]

use chrono::{Duration, Utc};
use postboard::AppError;
use postboard::domain::entities::{NewComment, NewGroup, NewPost, NewUser, PostPatch, User};
use postboard::domain::repositories::{
    CommentRepository, FeedFilter, FollowRepository, GroupRepository, PostRepository,
    SessionRepository, UserRepository,
};
use postboard::infrastructure::persistence::{
    PgCommentRepository, PgFollowRepository, PgGroupRepository, PgPostRepository,
    PgSessionRepository, PgUserRepository,
};
use sqlx::PgPool;
use std::sync::Arc;

async fn create_user(pool: &Arc<PgPool>, username: &str) -> User {
    PgUserRepository::new(pool.clone())
        .create(NewUser {
            username: username.to_string(),
            password_hash: "salt$hash".to_string(),
        })
        .await
        .unwrap()
}

#[sqlx::test]
async fn test_duplicate_username_is_conflict(pool: PgPool) {
    let pool = Arc::new(pool);
    create_user(&pool, "leo").await;

    let err = PgUserRepository::new(pool.clone())
        .create(NewUser {
            username: "leo".to_string(),
            password_hash: "x$y".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict { .. }));
}

#[sqlx::test]
async fn test_find_credentials(pool: PgPool) {
    let pool = Arc::new(pool);
    create_user(&pool, "leo").await;
    let repo = PgUserRepository::new(pool);

    let (user, hash) = repo.find_credentials("leo").await.unwrap().unwrap();
    assert_eq!(user.username, "leo");
    assert_eq!(hash, "salt$hash");
    assert!(repo.find_credentials("nobody").await.unwrap().is_none());
}

#[sqlx::test]
async fn test_feed_filters_and_order(pool: PgPool) {
    let pool = Arc::new(pool);
    let leo = create_user(&pool, "leo").await;
    let ann = create_user(&pool, "ann").await;
    let cats = PgGroupRepository::new(pool.clone())
        .create(NewGroup {
            title: "Cats".to_string(),
            slug: "cats".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();

    let posts = PgPostRepository::new(pool.clone());
    let mut leo_ids = Vec::new();
    for i in 0..12 {
        let post = posts
            .create(NewPost {
                text: format!("leo {}", i),
                author_id: leo.id,
                group_id: Some(cats.id),
                image: None,
            })
            .await
            .unwrap();
        leo_ids.push(post.id);
    }
    let ann_post = posts
        .create(NewPost {
            text: "ann".to_string(),
            author_id: ann.id,
            group_id: None,
            image: None,
        })
        .await
        .unwrap();

    assert_eq!(posts.count(FeedFilter::all()).await.unwrap(), 13);
    assert_eq!(
        posts
            .count(FeedFilter::all().with_group(cats.id))
            .await
            .unwrap(),
        12
    );

    let first = posts.list(FeedFilter::all(), 0, 10).await.unwrap();
    assert_eq!(first.len(), 10);
    assert_eq!(first[0].id, ann_post.id);

    let second = posts.list(FeedFilter::all(), 10, 10).await.unwrap();
    assert_eq!(second.len(), 3);
    assert_eq!(second[2].id, leo_ids[0]);

    let followed = posts
        .list(FeedFilter::all().with_authors(vec![ann.id]), 0, 10)
        .await
        .unwrap();
    assert_eq!(followed.len(), 1);

    let nobody = posts
        .count(FeedFilter::all().with_authors(Vec::new()))
        .await
        .unwrap();
    assert_eq!(nobody, 0);

    let (window, total) = posts
        .list_page(FeedFilter::all().with_group(cats.id), 10, 10)
        .await
        .unwrap();
    assert_eq!(total, 12);
    assert_eq!(window.len(), 2);

    let (beyond, total) = posts.list_page(FeedFilter::all(), 20, 10).await.unwrap();
    assert!(beyond.is_empty());
    assert_eq!(total, 13);

    let grouped = posts.find_by_id(leo_ids[0]).await.unwrap().unwrap();
    assert_eq!(grouped.group.unwrap().slug, "cats");
}

#[sqlx::test]
async fn test_update_keeps_image_unless_replaced(pool: PgPool) {
    let pool = Arc::new(pool);
    let leo = create_user(&pool, "leo").await;
    let posts = PgPostRepository::new(pool.clone());

    let post = posts
        .create(NewPost {
            text: "original".to_string(),
            author_id: leo.id,
            group_id: None,
            image: Some("posts/a.gif".to_string()),
        })
        .await
        .unwrap();

    let updated = posts
        .update(
            post.id,
            PostPatch {
                text: "edited".to_string(),
                group_id: None,
                image: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.text, "edited");
    assert_eq!(updated.image.as_deref(), Some("posts/a.gif"));
    assert_eq!(updated.created_at, post.created_at);
}

#[sqlx::test]
async fn test_delete_post_removes_comments(pool: PgPool) {
    let pool = Arc::new(pool);
    let leo = create_user(&pool, "leo").await;
    let posts = PgPostRepository::new(pool.clone());
    let comments = PgCommentRepository::new(pool.clone());

    let post = posts
        .create(NewPost {
            text: "post".to_string(),
            author_id: leo.id,
            group_id: None,
            image: None,
        })
        .await
        .unwrap();
    let comment = comments
        .create(NewComment {
            post_id: post.id,
            author_id: leo.id,
            text: "first".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(comment.author_username, "leo");

    assert!(posts.delete(post.id).await.unwrap());
    assert!(!posts.delete(post.id).await.unwrap());
    assert!(comments.list_for_post(post.id).await.unwrap().is_empty());
}

#[sqlx::test]
async fn test_follow_constraints(pool: PgPool) {
    let pool = Arc::new(pool);
    let ann = create_user(&pool, "ann").await;
    let leo = create_user(&pool, "leo").await;
    let follows = PgFollowRepository::new(pool.clone());

    follows.create(ann.id, leo.id).await.unwrap();
    let duplicate = follows.create(ann.id, leo.id).await.unwrap_err();
    assert!(matches!(duplicate, AppError::Conflict { .. }));

    let own = follows.create(leo.id, leo.id).await.unwrap_err();
    assert!(matches!(own, AppError::Validation { .. }));

    assert!(follows.exists(ann.id, leo.id).await.unwrap());
    assert_eq!(follows.count_followers(leo.id).await.unwrap(), 1);
    assert_eq!(follows.followed_authors(ann.id).await.unwrap()[0].id, leo.id);

    assert!(follows.delete(ann.id, leo.id).await.unwrap());
    assert!(!follows.delete(ann.id, leo.id).await.unwrap());
    assert_eq!(follows.count().await.unwrap(), 0);
}

#[sqlx::test]
async fn test_sessions_expire(pool: PgPool) {
    let pool = Arc::new(pool);
    let leo = create_user(&pool, "leo").await;
    let sessions = PgSessionRepository::new(pool.clone());

    sessions
        .create("live", leo.id, Utc::now() + Duration::hours(1))
        .await
        .unwrap();
    sessions
        .create("stale", leo.id, Utc::now() - Duration::hours(1))
        .await
        .unwrap();

    assert_eq!(sessions.find_user("live").await.unwrap().unwrap().id, leo.id);
    assert!(sessions.find_user("stale").await.unwrap().is_none());

    sessions.delete("live").await.unwrap();
    assert!(sessions.find_user("live").await.unwrap().is_none());
}

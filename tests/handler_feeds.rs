mod common;

use axum::http::StatusCode;
use common::{has_post, post_cards, spawn_app};
use postboard::domain::repositories::PostRepository;

#[tokio::test]
async fn test_index_splits_thirteen_posts_ten_and_three() {
    let app = spawn_app();
    let leo = app.create_user("leo").await;
    let posts = app.create_posts(&leo, None, 13).await;

    let first = app.server.get("/").await;
    first.assert_status_ok();
    let body = first.text();
    assert_eq!(post_cards(&body), 10);
    // Newest first: the last inserted post opens page one.
    assert!(has_post(&body, posts[12].id));
    assert!(!has_post(&body, posts[2].id));

    let second = app.server.get("/?page=2").await;
    second.assert_status_ok();
    let body = second.text();
    assert_eq!(post_cards(&body), 3);
    assert!(has_post(&body, posts[0].id));
}

#[tokio::test]
async fn test_out_of_range_page_is_empty_not_an_error() {
    let app = spawn_app();
    let leo = app.create_user("leo").await;
    app.create_posts(&leo, None, 13).await;

    let response = app.server.get("/?page=99").await;
    response.assert_status_ok();
    assert_eq!(post_cards(&response.text()), 0);

    let body = app.server.get("/?page=abc").await.text();
    assert_eq!(post_cards(&body), 10);
}

#[tokio::test]
async fn test_group_feed_pagination_and_exclusion() {
    let app = spawn_app();
    let leo = app.create_user("leo").await;
    let cats = app.create_group("Cats", "cats").await;
    let dogs = app.create_group("Dogs", "dogs").await;
    app.create_posts(&leo, Some(cats.id), 13).await;
    let dog_posts = app.create_posts(&leo, Some(dogs.id), 1).await;

    let page_one = app.server.get("/group/cats").await;
    page_one.assert_status_ok();
    let body = page_one.text();
    assert_eq!(post_cards(&body), 10);
    assert!(!has_post(&body, dog_posts[0].id));
    assert!(body.contains("Cats"));

    let page_two = app.server.get("/group/cats?page=2").await.text();
    assert_eq!(post_cards(&page_two), 3);
    assert!(!has_post(&page_two, dog_posts[0].id));

    let dogs_page = app.server.get("/group/dogs").await.text();
    assert_eq!(post_cards(&dogs_page), 1);
    assert!(has_post(&dogs_page, dog_posts[0].id));
}

#[tokio::test]
async fn test_profile_feed_pagination_and_count() {
    let app = spawn_app();
    let leo = app.create_user("leo").await;
    let ann = app.create_user("ann").await;
    app.create_posts(&leo, None, 13).await;
    let ann_posts = app.create_posts(&ann, None, 2).await;

    let response = app.server.get("/profile/leo").await;
    response.assert_status_ok();
    let body = response.text();
    assert_eq!(post_cards(&body), 10);
    assert!(body.contains("<span class=\"post-count\">13</span>"));
    assert!(!has_post(&body, ann_posts[0].id));

    let page_two = app.server.get("/profile/leo?page=2").await.text();
    assert_eq!(post_cards(&page_two), 3);
}

#[tokio::test]
async fn test_post_detail_shows_post_and_author_count() {
    let app = spawn_app();
    let leo = app.create_user("leo").await;
    let posts = app.create_posts(&leo, None, 3).await;

    let response = app.server.get(&format!("/posts/{}", posts[1].id)).await;
    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains(&posts[1].text));
    assert!(body.contains("<span class=\"author-post-count\">3</span>"));
    // Anonymous viewers get neither the edit link nor the comment form.
    assert!(!body.contains("class=\"edit-link\""));
    assert!(!body.contains("name=\"text\""));
}

#[tokio::test]
async fn test_unknown_resources_render_404_page() {
    let app = spawn_app();

    for path in [
        "/group/missing",
        "/profile/nobody",
        "/posts/999",
        "/posts/not-a-number",
        "/no/such/page",
    ] {
        let response = app.server.get(path).await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert!(
            response.text().contains("Page not found"),
            "expected the 404 template for {}",
            path
        );
    }
}

#[tokio::test]
async fn test_index_is_served_from_cache_until_cleared() {
    let app = spawn_app();
    let leo = app.create_user("leo").await;
    let posts = app.create_posts(&leo, None, 2).await;

    let before = app.server.get("/").await.text();
    assert!(has_post(&before, posts[1].id));

    let deleted = PostRepository::delete(app.store.as_ref(), posts[1].id)
        .await
        .unwrap();
    assert!(deleted);

    let cached = app.server.get("/").await.text();
    assert_eq!(cached, before);

    app.state.page_cache.invalidate_all().await.unwrap();

    let fresh = app.server.get("/").await.text();
    assert_ne!(fresh, before);
    assert!(!has_post(&fresh, posts[1].id));
    assert!(has_post(&fresh, posts[0].id));
}

#[tokio::test]
async fn test_index_cache_keys_include_query() {
    let app = spawn_app();
    let leo = app.create_user("leo").await;
    app.create_posts(&leo, None, 13).await;

    let first = app.server.get("/").await.text();
    let second = app.server.get("/?page=2").await.text();

    assert_eq!(post_cards(&first), 10);
    assert_eq!(post_cards(&second), 3);
}

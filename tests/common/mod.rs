#![allow(dead_code)]

use axum::http::HeaderValue;
use axum_test::TestServer;
use chrono::{Duration, TimeZone, Utc};
use postboard::domain::entities::{Group, NewPost, Post, User};
use postboard::infrastructure::cache::MemoryCache;
use postboard::infrastructure::media::MemoryMediaStore;
use postboard::infrastructure::persistence::{MemoryStore, Repositories};
use postboard::routes::build_router;
use postboard::state::{AppSettings, AppState};
use std::sync::Arc;

pub const PASSWORD: &str = "test-password-1";

/// 1x1 transparent GIF.
pub const SMALL_GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\x00\x00\x00\xff\xff\xff!\xf9\x04\x01\x00\x00\x00\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02D\x01\x00;";

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

pub fn test_settings() -> AppSettings {
    AppSettings {
        session_secret: "test-signing-secret".to_string(),
        session_ttl_hours: 1,
        cache_ttl_seconds: 20,
        cookie_secure: false,
    }
}

/// App over the in-process store, a memory page cache and in-memory media.
pub fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        Repositories::in_memory(store.clone()),
        Arc::new(MemoryCache::new(20)),
        Arc::new(MemoryMediaStore::new()),
        test_settings(),
    );

    let server = TestServer::new(build_router(state.clone(), false)).unwrap();

    TestApp {
        server,
        state,
        store,
    }
}

impl TestApp {
    pub async fn create_user(&self, username: &str) -> User {
        self.state
            .auth_service
            .sign_up(username, PASSWORD)
            .await
            .unwrap()
    }

    /// Opens a session and returns the matching `Cookie` header value.
    pub async fn login(&self, username: &str) -> HeaderValue {
        let (_, token) = self
            .state
            .auth_service
            .login(username, PASSWORD)
            .await
            .unwrap();
        HeaderValue::from_str(&format!("session_id={}", token)).unwrap()
    }

    pub async fn create_group(&self, title: &str, slug: &str) -> Group {
        self.state
            .group_service
            .create_group(title, slug, "")
            .await
            .unwrap()
    }

    /// Inserts `count` posts one minute apart, oldest first.
    pub async fn create_posts(&self, author: &User, group_id: Option<i64>, count: usize) -> Vec<Post> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let mut posts = Vec::with_capacity(count);

        for i in 0..count {
            let post = self
                .store
                .insert_post_at(
                    NewPost {
                        text: format!("Post number {} by {}", i, author.username),
                        author_id: author.id,
                        group_id,
                        image: None,
                    },
                    base + Duration::minutes(i as i64),
                )
                .await
                .unwrap();
            posts.push(post);
        }

        posts
    }
}

/// Number of post cards in a rendered page.
pub fn post_cards(body: &str) -> usize {
    body.matches("class=\"post-card\"").count()
}

pub fn has_post(body: &str, post_id: i64) -> bool {
    body.contains(&format!("data-post-id=\"{}\"", post_id))
}

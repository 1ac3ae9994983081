//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{
    AuthService, CommentService, FollowService, GroupService, ListingService, PageCacheService,
    PostService,
};
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::media::MediaStore;
use crate::infrastructure::persistence::Repositories;

/// Settings the services and cookie handling need at runtime.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub cache_ttl_seconds: u64,
    pub cookie_secure: bool,
}

/// Services shared by all requests. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub listing_service: Arc<ListingService>,
    pub follow_service: Arc<FollowService>,
    pub post_service: Arc<PostService>,
    pub comment_service: Arc<CommentService>,
    pub auth_service: Arc<AuthService>,
    pub group_service: Arc<GroupService>,
    pub page_cache: Arc<PageCacheService>,
    pub media: Arc<dyn MediaStore>,
    pub settings: Arc<AppSettings>,
}

impl AppState {
    /// Wires every service onto one set of repositories.
    pub fn new(
        repos: Repositories,
        cache: Arc<dyn CacheService>,
        media: Arc<dyn MediaStore>,
        settings: AppSettings,
    ) -> Self {
        let listing_service = ListingService::new(
            repos.posts.clone(),
            repos.groups.clone(),
            repos.users.clone(),
            repos.follows.clone(),
            repos.comments.clone(),
        );
        let follow_service = FollowService::new(repos.users.clone(), repos.follows.clone());
        let post_service =
            PostService::new(repos.posts.clone(), repos.groups.clone(), media.clone());
        let comment_service = CommentService::new(repos.comments.clone(), repos.posts.clone());
        let auth_service = AuthService::new(
            repos.users.clone(),
            repos.sessions.clone(),
            settings.session_secret.clone(),
            settings.session_ttl_hours,
        );
        let group_service = GroupService::new(repos.groups.clone());
        let page_cache = PageCacheService::new(cache, settings.cache_ttl_seconds);

        Self {
            listing_service: Arc::new(listing_service),
            follow_service: Arc::new(follow_service),
            post_service: Arc::new(post_service),
            comment_service: Arc::new(comment_service),
            auth_service: Arc::new(auth_service),
            group_service: Arc::new(group_service),
            page_cache: Arc::new(page_cache),
            media,
            settings: Arc::new(settings),
        }
    }
}

//! Business logic services for the application layer.

pub mod auth_service;
pub mod comment_service;
pub mod follow_service;
pub mod group_service;
pub mod listing_service;
pub mod page_cache_service;
pub mod post_service;

pub use auth_service::AuthService;
pub use comment_service::CommentService;
pub use follow_service::FollowService;
pub use group_service::GroupService;
pub use listing_service::{AuthorFeed, GroupFeed, ListingService, PostDetail};
pub use page_cache_service::PageCacheService;
pub use post_service::{PostInput, PostService};

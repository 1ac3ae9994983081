//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::ListingService`] - Global, group, author and follow feeds
//! - [`services::FollowService`] - Follow graph
//! - [`services::PageCacheService`] - Rendered feed page cache
//! - [`services::PostService`] - Post creation and author edits
//! - [`services::CommentService`] - Comments on posts
//! - [`services::AuthService`] - Accounts and login sessions
//! - [`services::GroupService`] - Group management

pub mod pagination;
pub mod services;

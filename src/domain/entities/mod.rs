//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures. Records that are written separately
//! from how they are read come in pairs:
//! - `NewUser`, `NewGroup`, `NewPost`, `NewComment` - For creating records
//! - `PostPatch` - For author edits
//!
//! Listing reads return [`Post`] already joined with the author's username and
//! a [`GroupRef`], so feeds render without follow-up queries.

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
pub mod user;

pub use comment::{Comment, NewComment};
pub use follow::Follow;
pub use group::{Group, GroupRef, NewGroup};
pub use post::{NewPost, Post, PostPatch};
pub use user::{NewUser, User};

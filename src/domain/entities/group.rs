//! Group entity: a named category posts can belong to.

use std::fmt;

/// A post category addressed by its slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl Group {
    /// Creates a new Group instance.
    pub fn new(id: i64, title: String, slug: String, description: String) -> Self {
        Self {
            id,
            title,
            slug,
            description,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Input data for creating a group.
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// The slice of a group that travels with a post in listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRef {
    pub id: i64,
    pub slug: String,
    pub title: String,
}

impl From<&Group> for GroupRef {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            slug: group.slug.clone(),
            title: group.title.clone(),
        }
    }
}

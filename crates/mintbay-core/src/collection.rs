use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A named grouping of NFTs owned by its creator.
#[derive(Debug, Clone)]
pub struct Collection {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub banner_url: Option<String>,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Number of NFTs currently attached; populated by read queries.
    pub nft_count: i64,
}

#[derive(Debug, Clone)]
pub struct NewCollection {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub banner_url: Option<String>,
    pub creator_id: Uuid,
}

/// Partial update; `None` fields are left unchanged. The slug is fixed at
/// creation so external links stay stable.
#[derive(Debug, Clone, Default)]
pub struct CollectionUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub banner_url: Option<String>,
}

impl CollectionUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.banner_url.is_none()
    }
}

/// Derive a URL-safe slug from a collection name.
///
/// Lowercases, maps runs of non-alphanumerics to single hyphens, and trims
/// hyphens at both ends. `"Bored Apes #1"` → `"bored-apes-1"`.
pub fn slug_from_name(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

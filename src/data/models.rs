//! Data models
//!
//! Rust structs representing database entities and join results.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Create from existing string
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Profile
// =============================================================================

/// A user profile owning posts of either kind
///
/// `is_public` is a precomputed flag read as-is; it gates whether any
/// of the profile's content may appear in merged feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub full_name: Option<String>,
    pub username: String,
    /// Avatar image URL
    pub image: Option<String>,
    pub is_public: bool,
}

// =============================================================================
// Native Post
// =============================================================================

/// Content authored directly in the primary content system
///
/// Linked to its owning profile through the `post_profiles`
/// association table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NativePost {
    pub id: String,
    pub published_at: DateTime<Utc>,
    pub description: Option<String>,
    /// Rendered HTML body
    pub html: Option<String>,
}

/// Native post with its owning profile resolved
///
/// `profile` is `None` when the post has no association row,
/// or the associated profile no longer exists.
#[derive(Debug, Clone)]
pub struct NativePostWithProfile {
    pub post: NativePost,
    pub profile: Option<Profile>,
}

// =============================================================================
// Portfolio
// =============================================================================

/// External portfolio source linked to a profile
///
/// Imported posts hang off a portfolio, which belongs to
/// exactly one profile.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Portfolio {
    pub id: String,
    pub profile_id: String,
}

/// Content imported from an external portfolio source
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PortfolioPost {
    pub id: String,
    pub portfolio_id: String,
    pub published_at: DateTime<Utc>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    /// Link back to the original item
    pub url: Option<String>,
}

/// Portfolio post with its owning profile resolved through the portfolio
#[derive(Debug, Clone)]
pub struct PortfolioPostWithProfile {
    pub post: PortfolioPost,
    pub profile: Option<Profile>,
}

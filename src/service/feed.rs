//! Feed merge service
//!
//! Merges the native and portfolio post feeds into a single page
//! ordered by publish date, dropping content from non-public profiles.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::data::{Database, NativePostWithProfile, PortfolioPostWithProfile, Profile};
use crate::error::AppError;
use crate::metrics::{
    FEED_MERGE_DURATION_SECONDS, FEED_POSTS_RETURNED_TOTAL, FEED_REQUESTS_TOTAL,
    ORPHANED_POSTS_TOTAL,
};

/// Default page size shared by both source queries and the final truncation
pub const DEFAULT_FETCH_LIMIT: usize = 30;

/// Per-source pagination cursor
///
/// Each offset counts how many items of that source prior pages have
/// already consumed. Missing, null, or non-numeric fields deserialize
/// to 0 rather than failing the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageParam {
    #[serde(deserialize_with = "lenient_offset")]
    pub native: u64,
    #[serde(deserialize_with = "lenient_offset")]
    pub portfolio: u64,
}

/// Deserialize an offset, treating anything non-numeric as 0
///
/// Accepts integers and numeric strings; negative numbers, fractions,
/// nulls, and other junk all normalize to 0.
fn lenient_offset<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;

    Ok(match value {
        serde_json::Value::Number(n) => n.as_u64().unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// Source table a merged post came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Native,
    Portfolio,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Portfolio => "portfolio",
        }
    }
}

/// A single entry in the merged feed
///
/// Tagged union over both source tables; fields that do not apply to
/// the source type are `None`. Built per request, never persisted.
/// Serializes to camelCase JSON with RFC 3339 dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversalPost {
    pub id: String,
    pub published_at: DateTime<Utc>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub thumbnail_url: Option<String>,
    pub html: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub profile: Profile,
}

/// Feed merge service
pub struct FeedService {
    db: Arc<Database>,
    fetch_limit: usize,
}

impl FeedService {
    /// Create new feed service
    ///
    /// `fetch_limit` is the page size for both source queries and the
    /// merged result (see [`DEFAULT_FETCH_LIMIT`]).
    pub fn new(db: Arc<Database>, fetch_limit: usize) -> Self {
        Self { db, fetch_limit }
    }

    /// Get one merged feed page
    ///
    /// Fetches up to `fetch_limit` posts from each source at its own
    /// offset (both reads issued concurrently), drops posts whose
    /// profile is missing or not public, and returns the newest
    /// `fetch_limit` of the remainder sorted by `published_at`
    /// descending. Ties on `published_at` keep no contractual order.
    ///
    /// # Pagination
    /// The two offsets advance at different rates depending on how many
    /// posts of each type survived filtering and the final truncation.
    /// The caller tracks per-source consumption from prior pages and
    /// resubmits both offsets; no next-page cursor is computed here.
    ///
    /// # Errors
    /// A failure from either source fetch fails the whole call. No
    /// retries, no partial results.
    pub async fn get_posts(&self, page: PageParam) -> Result<Vec<UniversalPost>, AppError> {
        FEED_REQUESTS_TOTAL.inc();
        let timer = FEED_MERGE_DURATION_SECONDS.start_timer();

        let limit = self.fetch_limit as u32;
        let (native, portfolio) = tokio::try_join!(
            self.db.find_native_posts(limit, page.native),
            self.db.find_portfolio_posts(limit, page.portfolio),
        )?;

        let mut posts: Vec<UniversalPost> = Vec::with_capacity(native.len() + portfolio.len());
        posts.extend(native.into_iter().filter_map(project_native));
        posts.extend(portfolio.into_iter().filter_map(project_portfolio));

        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        posts.truncate(self.fetch_limit);

        for post in &posts {
            FEED_POSTS_RETURNED_TOTAL
                .with_label_values(&[post.post_type.as_str()])
                .inc();
        }
        timer.observe_duration();

        Ok(posts)
    }
}

/// Project a native post into the merged shape
///
/// Returns `None` for orphaned posts (no profile association) and
/// posts owned by non-public profiles. Orphans are logged and counted,
/// never escalated.
fn project_native(row: NativePostWithProfile) -> Option<UniversalPost> {
    let Some(profile) = row.profile else {
        tracing::warn!(
            post_id = %row.post.id,
            source = "native",
            "post has no resolved profile association; dropping from feed"
        );
        ORPHANED_POSTS_TOTAL.with_label_values(&["native"]).inc();
        return None;
    };

    if !profile.is_public {
        return None;
    }

    Some(UniversalPost {
        id: row.post.id,
        published_at: row.post.published_at,
        description: row.post.description,
        post_type: PostType::Native,
        thumbnail_url: None,
        html: row.post.html,
        url: None,
        title: None,
        profile,
    })
}

/// Project a portfolio post into the merged shape
///
/// Same orphan and visibility policy as [`project_native`].
fn project_portfolio(row: PortfolioPostWithProfile) -> Option<UniversalPost> {
    let Some(profile) = row.profile else {
        tracing::warn!(
            post_id = %row.post.id,
            source = "portfolio",
            "post has no resolved profile association; dropping from feed"
        );
        ORPHANED_POSTS_TOTAL.with_label_values(&["portfolio"]).inc();
        return None;
    };

    if !profile.is_public {
        return None;
    }

    Some(UniversalPost {
        id: row.post.id,
        published_at: row.post.published_at,
        description: row.post.description,
        post_type: PostType::Portfolio,
        thumbnail_url: row.post.thumbnail_url,
        html: None,
        url: row.post.url,
        title: row.post.title,
        profile,
    })
}

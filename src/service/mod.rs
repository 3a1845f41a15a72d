//! Service layer
//!
//! Contains business logic separated from storage access.

mod feed;

pub use feed::{DEFAULT_FETCH_LIMIT, FeedService, PageParam, PostType, UniversalPost};

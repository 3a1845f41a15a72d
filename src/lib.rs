//! Unifeed - merged content feed for profile pages
//!
//! Merges two paginated content feeds (native posts and portfolio
//! posts) owned by user profiles into a single date-ordered page,
//! filtering out content from non-public profiles. Backs the
//! infinite-scroll feed view.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              Service Layer                   │
//! │  - Feed merge, filter, sort, truncate       │
//! └─────────────────────────────────────────────┘
//!                      │
//! ┌─────────────────────────────────────────────┐
//! │               Data Layer                     │
//! │  - SQLite (sqlx), eager profile joins       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `service`: Feed merge logic
//! - `data`: Database and entity models
//! - `config`: Configuration management
//! - `metrics`: Prometheus instruments
//! - `error`: Error types

pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod service;

pub use error::AppError;
pub use service::{FeedService, PageParam, PostType, UniversalPost};

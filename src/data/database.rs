//! SQLite database operations
//!
//! All database access goes through this module.
//! Reads resolve the owning profile eagerly so callers never
//! issue follow-up queries per post.

use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite, SqlitePool};
use std::path::Path;

use super::models::*;
use crate::error::AppError;

/// Database connection pool wrapper
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect to the SQLite database at `path`, creating it if needed
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        let connection_string = format!("sqlite://{}?mode=rwc", path.display());

        let pool = SqlitePool::connect(&connection_string).await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
            tracing::error!("Migration failed: {}", e);
            AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
        })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    /// Close the connection pool
    ///
    /// Subsequent queries fail with a pool-closed error.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // =========================================================================
    // Profile operations
    // =========================================================================

    /// Insert or update a profile
    pub async fn upsert_profile(&self, profile: &Profile) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO profiles (id, full_name, username, image, is_public)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                full_name = excluded.full_name,
                username = excluded.username,
                image = excluded.image,
                is_public = excluded.is_public",
        )
        .bind(&profile.id)
        .bind(&profile.full_name)
        .bind(&profile.username)
        .bind(&profile.image)
        .bind(profile.is_public)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get a profile by ID
    pub async fn get_profile(&self, id: &str) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    // =========================================================================
    // Native post operations
    // =========================================================================

    /// Insert a native post and its profile associations
    pub async fn insert_native_post(
        &self,
        post: &NativePost,
        profile_ids: &[String],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO native_posts (id, published_at, description, html)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&post.id)
        .bind(post.published_at)
        .bind(&post.description)
        .bind(&post.html)
        .execute(&mut *tx)
        .await?;

        for profile_id in profile_ids {
            sqlx::query("INSERT INTO post_profiles (post_id, profile_id) VALUES (?, ?)")
                .bind(&post.id)
                .bind(profile_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Fetch one page of native posts, newest first
    ///
    /// Each post carries its owning profile resolved through the
    /// `post_profiles` association table. Posts with no association
    /// come back with `profile = None`; the caller decides how to
    /// handle the anomaly.
    ///
    /// A post with multiple association rows resolves to one
    /// arbitrary owning profile.
    pub async fn find_native_posts(
        &self,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<NativePostWithProfile>, AppError> {
        let rows = sqlx::query(
            "SELECT np.id, np.published_at, np.description, np.html,
                    pr.id AS profile_id, pr.full_name, pr.username, pr.image, pr.is_public
             FROM native_posts np
             LEFT JOIN post_profiles pp ON pp.post_id = np.id
             LEFT JOIN profiles pr ON pr.id = pp.profile_id
             GROUP BY np.id
             ORDER BY np.published_at DESC
             LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let profile = profile_from_joined_row(&row)?;
                Ok(NativePostWithProfile {
                    post: NativePost {
                        id: row.try_get("id")?,
                        published_at: row.try_get("published_at")?,
                        description: row.try_get("description")?,
                        html: row.try_get("html")?,
                    },
                    profile,
                })
            })
            .collect()
    }

    // =========================================================================
    // Portfolio operations
    // =========================================================================

    /// Insert a portfolio
    pub async fn insert_portfolio(&self, portfolio: &Portfolio) -> Result<(), AppError> {
        sqlx::query("INSERT INTO portfolios (id, profile_id) VALUES (?, ?)")
            .bind(&portfolio.id)
            .bind(&portfolio.profile_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a portfolio post
    pub async fn insert_portfolio_post(&self, post: &PortfolioPost) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO portfolio_posts
                (id, portfolio_id, published_at, title, description, thumbnail_url, url)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&post.id)
        .bind(&post.portfolio_id)
        .bind(post.published_at)
        .bind(&post.title)
        .bind(&post.description)
        .bind(&post.thumbnail_url)
        .bind(&post.url)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch one page of portfolio posts, newest first
    ///
    /// Each post carries its owning profile resolved through its
    /// portfolio. Posts whose portfolio or profile cannot be resolved
    /// come back with `profile = None`.
    pub async fn find_portfolio_posts(
        &self,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<PortfolioPostWithProfile>, AppError> {
        let rows = sqlx::query(
            "SELECT pp.id, pp.portfolio_id, pp.published_at, pp.title,
                    pp.description, pp.thumbnail_url, pp.url,
                    pr.id AS profile_id, pr.full_name, pr.username, pr.image, pr.is_public
             FROM portfolio_posts pp
             LEFT JOIN portfolios po ON po.id = pp.portfolio_id
             LEFT JOIN profiles pr ON pr.id = po.profile_id
             ORDER BY pp.published_at DESC
             LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let profile = profile_from_joined_row(&row)?;
                Ok(PortfolioPostWithProfile {
                    post: PortfolioPost {
                        id: row.try_get("id")?,
                        portfolio_id: row.try_get("portfolio_id")?,
                        published_at: row.try_get("published_at")?,
                        title: row.try_get("title")?,
                        description: row.try_get("description")?,
                        thumbnail_url: row.try_get("thumbnail_url")?,
                        url: row.try_get("url")?,
                    },
                    profile,
                })
            })
            .collect()
    }
}

/// Build the joined profile from a LEFT JOIN row
///
/// The join aliases the profile's primary key as `profile_id`; a NULL
/// there means no profile resolved and the remaining profile columns
/// are not read.
fn profile_from_joined_row(row: &SqliteRow) -> Result<Option<Profile>, AppError> {
    let profile_id: Option<String> = row.try_get("profile_id")?;

    let Some(id) = profile_id else {
        return Ok(None);
    };

    Ok(Some(Profile {
        id,
        full_name: row.try_get("full_name")?,
        username: row.try_get("username")?,
        image: row.try_get("image")?,
        is_public: row.try_get("is_public")?,
    }))
}

//! PostgreSQL store
//!
//! Records are kept as JSONB documents keyed by their natural id, with the
//! few fields that are queried on (`submitted_at`, `vimorg_link`,
//! `approved`) mirrored into indexed columns.

use crate::store::{PluginStore, SubmissionStore};
use crate::types::{Category, Plugin, SubmissionId, SubmittedPlugin, Tag};
use crate::{PlugdirError, Result};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::collections::BTreeSet;
use tracing::{debug, info};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS plugins (
        slug TEXT PRIMARY KEY,
        data JSONB NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id TEXT PRIMARY KEY,
        data JSONB NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS submitted_plugins (
        id UUID PRIMARY KEY,
        submitted_at BIGINT,
        vimorg_link TEXT,
        approved BOOLEAN NOT NULL DEFAULT FALSE,
        data JSONB NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS submitted_plugins_submitted_at ON submitted_plugins (submitted_at)",
    "CREATE INDEX IF NOT EXISTS submitted_plugins_vimorg_link ON submitted_plugins (vimorg_link)",
];

/// Store backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing pool
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sqlx::PgPool;
    /// use plugdir_core::store::PgStore;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = PgPool::connect("postgresql://localhost/plugdir").await?;
    /// let store = PgStore::new(pool);
    /// store.ensure_schema().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a new pool
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| PlugdirError::database(format!("Failed to connect: {}", e)))?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes if they are missing
    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema ready");
        Ok(())
    }

    fn decode_plugin(row: &sqlx::postgres::PgRow) -> Result<Plugin> {
        let Json(plugin): Json<Plugin> = row
            .try_get("data")
            .map_err(|e| PlugdirError::database(format!("Failed to decode plugin: {}", e)))?;
        Ok(plugin)
    }

    fn decode_submission(row: &sqlx::postgres::PgRow) -> Result<SubmittedPlugin> {
        let Json(mut submission): Json<SubmittedPlugin> = row
            .try_get("data")
            .map_err(|e| PlugdirError::database(format!("Failed to decode submission: {}", e)))?;
        submission.approved = row
            .try_get("approved")
            .map_err(|e| PlugdirError::database(format!("Failed to get approved: {}", e)))?;
        Ok(submission)
    }

    async fn write_plugin(&self, plugin: &Plugin) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO plugins (slug, data) VALUES ($1, $2)
            ON CONFLICT (slug) DO UPDATE SET data = EXCLUDED.data
            "#,
        )
        .bind(&plugin.slug)
        .bind(Json(plugin))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn require_plugin(&self, slug: &str) -> Result<Plugin> {
        self.get_plugin(slug)
            .await?
            .ok_or_else(|| PlugdirError::not_found(format!("plugin {}", slug)))
    }
}

#[async_trait]
impl PluginStore for PgStore {
    async fn get_search_index(&self) -> Result<Vec<Plugin>> {
        let rows = sqlx::query("SELECT data FROM plugins ORDER BY slug")
            .fetch_all(&self.pool)
            .await?;

        let plugins = rows
            .iter()
            .map(Self::decode_plugin)
            .collect::<Result<Vec<_>>>()?;
        debug!("Loaded {} plugins for search index", plugins.len());
        Ok(plugins)
    }

    async fn get_plugin(&self, slug: &str) -> Result<Option<Plugin>> {
        let row = sqlx::query("SELECT data FROM plugins WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::decode_plugin).transpose()
    }

    async fn upsert_plugin(&self, mut plugin: Plugin) -> Result<()> {
        plugin.refresh_keywords();
        self.write_plugin(&plugin).await
    }

    async fn update_category(&self, slug: &str, category: &str) -> Result<Plugin> {
        let mut plugin = self.require_plugin(slug).await?;
        plugin.category = Some(category.to_string());
        self.write_plugin(&plugin).await?;
        Ok(plugin)
    }

    async fn update_tags(&self, slug: &str, tags: BTreeSet<String>) -> Result<Plugin> {
        let mut plugin = self.require_plugin(slug).await?;
        plugin.set_tags(tags);
        self.write_plugin(&plugin).await?;
        Ok(plugin)
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT data FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let Json(category): Json<Category> = row.try_get("data").map_err(|e| {
                    PlugdirError::database(format!("Failed to decode category: {}", e))
                })?;
                Ok(category)
            })
            .collect()
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT tag, COUNT(*) AS count
            FROM plugins, jsonb_array_elements_text(data->'tags') AS tag
            GROUP BY tag
            ORDER BY tag
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let id: String = row
                    .try_get("tag")
                    .map_err(|e| PlugdirError::database(format!("Failed to get tag: {}", e)))?;
                let count: i64 = row
                    .try_get("count")
                    .map_err(|e| PlugdirError::database(format!("Failed to get count: {}", e)))?;
                Ok(Tag {
                    id,
                    count: count.max(0) as u64,
                })
            })
            .collect()
    }
}

#[async_trait]
impl SubmissionStore for PgStore {
    async fn insert_submission(&self, submission: SubmittedPlugin) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO submitted_plugins (id, submitted_at, vimorg_link, approved, data)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(submission.id.0)
        .bind(submission.submitted_at)
        .bind(&submission.vimorg_link)
        .bind(submission.approved)
        .bind(Json(&submission))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn count_with_link(&self, link: &str) -> Result<usize> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM submitted_plugins WHERE vimorg_link = $1")
                .bind(link)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.max(0) as usize)
    }

    async fn list_pending(&self) -> Result<Vec<SubmittedPlugin>> {
        let rows = sqlx::query(
            r#"
            SELECT data, approved FROM submitted_plugins
            WHERE NOT approved
            ORDER BY submitted_at DESC NULLS LAST
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::decode_submission).collect()
    }

    async fn get_submission(&self, id: SubmissionId) -> Result<Option<SubmittedPlugin>> {
        let row = sqlx::query("SELECT data, approved FROM submitted_plugins WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::decode_submission).transpose()
    }

    async fn delete_submission(&self, id: SubmissionId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM submitted_plugins WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn approve_submission(&self, id: SubmissionId) -> Result<bool> {
        let result = sqlx::query("UPDATE submitted_plugins SET approved = TRUE WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

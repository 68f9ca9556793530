//! SQLite FTS5 index of published documents.
//!
//! # Thread Safety
//!
//! The connection pool sits behind a `RwLock` and is cloned out before any
//! query is awaited. Rebuilds, and the first lazy open of an existing index,
//! are serialized by an async mutex.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use quill_content::{Document, plain_text};
use quill_store::Snapshot;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// File name of the database inside the index directory.
const DB_FILENAME: &str = "index.db";

/// Error returned by index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Index directory could not be removed or created.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// SQLite failure, including a missing index.
    #[error("Search backend error: {0}")]
    Backend(#[from] sqlx::Error),
}

/// Persistent full-text index over published documents.
pub struct SearchIndex {
    index_path: PathBuf,
    pool: RwLock<Option<SqlitePool>>,
    rebuild_lock: tokio::sync::Mutex<()>,
}

impl SearchIndex {
    /// Create a handle for the index stored in `index_path`.
    ///
    /// Nothing is opened until the first search or rebuild.
    #[must_use]
    pub fn new(index_path: impl Into<PathBuf>) -> Self {
        Self {
            index_path: index_path.into(),
            pool: RwLock::new(None),
            rebuild_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Directory holding the index.
    #[must_use]
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    fn db_path(&self) -> PathBuf {
        self.index_path.join(DB_FILENAME)
    }

    /// Rebuild the index from scratch.
    ///
    /// Any open connection is closed and the index directory is deleted
    /// before a fresh index is written. Drafts in `records` are skipped.
    /// Returns the number of records indexed, counting records whose slug
    /// replaced an earlier entry.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Io` if the directory cannot be removed or
    /// created, and `IndexError::Backend` on any SQLite failure.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub async fn rebuild(&self, records: &[Arc<Document>]) -> Result<usize, IndexError> {
        let _guard = self.rebuild_lock.lock().await;
        let start = Instant::now();

        let previous = self.pool.write().unwrap().take();
        if let Some(pool) = previous {
            pool.close().await;
        }

        match tokio::fs::remove_dir_all(&self.index_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(IndexError::Io {
                    path: self.index_path.clone(),
                    source,
                });
            }
        }
        tokio::fs::create_dir_all(&self.index_path)
            .await
            .map_err(|source| IndexError::Io {
                path: self.index_path.clone(),
                source,
            })?;

        let options = SqliteConnectOptions::new()
            .filename(self.db_path())
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        sqlx::query(
            "CREATE VIRTUAL TABLE documents USING fts5(slug UNINDEXED, title, body, tags, category)",
        )
        .execute(&pool)
        .await?;

        let mut indexed = 0;
        let mut tx = pool.begin().await?;
        for doc in records.iter().filter(|d| !d.draft) {
            sqlx::query("DELETE FROM documents WHERE slug = ?")
                .bind(&doc.slug)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                "INSERT INTO documents (slug, title, body, tags, category) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&doc.slug)
            .bind(&doc.title)
            .bind(plain_text(&doc.body))
            .bind(doc.tags.join(" "))
            .bind(&doc.category)
            .execute(&mut *tx)
            .await?;
            indexed += 1;
        }
        tx.commit().await?;

        *self.pool.write().unwrap() = Some(pool);

        tracing::info!(
            indexed,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Search index rebuilt"
        );
        Ok(indexed)
    }

    /// Search, degrading to an empty result on failure.
    ///
    /// Failures (including an index that was never built) are logged.
    pub async fn search(&self, query: &str, snapshot: &Snapshot) -> Vec<Arc<Document>> {
        match self.try_search(query, snapshot).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(query, error = %e, "Search failed");
                Vec::new()
            }
        }
    }

    /// Search and report failures.
    ///
    /// Every whitespace-separated term is matched as a literal phrase and any
    /// term may match. Hits come back in relevance order, each mapped to the
    /// first published record in `snapshot` with the hit's slug. Hits whose
    /// slug is no longer published are dropped.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Backend` if the index cannot be opened or queried.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub async fn try_search(
        &self,
        query: &str,
        snapshot: &Snapshot,
    ) -> Result<Vec<Arc<Document>>, IndexError> {
        let Some(expression) = match_expression(query) else {
            return Ok(Vec::new());
        };

        let pool = self.pool().await?;
        let rows = sqlx::query(
            "SELECT slug FROM documents WHERE documents MATCH ? ORDER BY bm25(documents)",
        )
        .bind(expression)
        .fetch_all(&pool)
        .await?;

        let hits = rows
            .iter()
            .filter_map(|row| {
                let slug: String = row.get(0);
                snapshot.published().find(|d| d.slug == slug).cloned()
            })
            .collect();
        Ok(hits)
    }

    /// Current pool, opening an index left by an earlier process if needed.
    async fn pool(&self) -> Result<SqlitePool, IndexError> {
        let cached = self.pool.read().unwrap().clone();
        if let Some(pool) = cached {
            return Ok(pool);
        }

        let _guard = self.rebuild_lock.lock().await;
        let cached = self.pool.read().unwrap().clone();
        if let Some(pool) = cached {
            return Ok(pool);
        }

        let options = SqliteConnectOptions::new()
            .filename(self.db_path())
            .create_if_missing(false);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        tracing::debug!(path = %self.index_path.display(), "Opened existing search index");
        *self.pool.write().unwrap() = Some(pool.clone());
        Ok(pool)
    }
}

/// Build an FTS5 expression matching any term as a quoted phrase.
fn match_expression(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

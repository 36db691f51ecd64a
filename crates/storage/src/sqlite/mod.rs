use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use snafu::ResultExt;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Connection, SqliteConnection};

use super::KeyValueStore;
use super::error::{
    CreateSqliteDirectorySnafu, InvariantViolationSnafu, SqliteConnectOptionsSnafu,
    SqliteConnectSnafu, SqliteMigrateSnafu, SqlitePragmaSnafu, SqliteQuerySnafu,
    SqliteRuntimeInitSnafu, SqliteThreadSpawnSnafu, StorageResult,
};
use super::types::DEFAULT_NAMESPACE;

pub const DEFAULT_DATABASE_FILE_NAME: &str = "fintech.sqlite3";

/// Key/value rows in a single sqlite table, scoped by namespace.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    database_url: String,
    namespace: String,
}

impl SqliteStore {
    pub async fn open(database_location: &str) -> StorageResult<Self> {
        Self::open_with_namespace(database_location, DEFAULT_NAMESPACE).await
    }

    pub async fn open_with_namespace(
        database_location: &str,
        namespace: impl Into<String>,
    ) -> StorageResult<Self> {
        ensure_database_directory(database_location)?;

        let database_url = normalize_database_url(database_location);
        let connect_options = SqliteConnectOptions::from_str(&database_url)
            .context(SqliteConnectOptionsSnafu {
                stage: "sqlite-open-parse-url",
                database_url: database_url.clone(),
            })?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_millis(5_000));

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await
            .context(SqliteConnectSnafu {
                stage: "sqlite-open-connect",
                database_url: database_url.clone(),
            })?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context(SqliteMigrateSnafu {
                stage: "sqlite-open-migrate",
            })?;

        // Later calls open their own connections on worker runtimes, so the bootstrap pool
        // must not outlive the caller's runtime.
        pool.close().await;

        tracing::info!(database_url = %database_url, "opened sqlite key/value store");

        Ok(Self {
            database_url,
            namespace: namespace.into(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn run_db_call<T, F>(&self, stage: &'static str, op: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: Future<Output = StorageResult<T>> + Send + 'static,
    {
        // The store port is sync, so each call executes on a dedicated worker thread
        // with its own current-thread runtime to avoid nested-runtime blocking panics.
        let worker = std::thread::Builder::new()
            .name(format!("sqlite-store-{stage}"))
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .context(SqliteRuntimeInitSnafu {
                        stage: "sqlite-store-runtime-build",
                    })?;
                runtime.block_on(op)
            })
            .context(SqliteThreadSpawnSnafu {
                stage: "sqlite-store-spawn-worker",
            })?;

        match worker.join() {
            Ok(result) => result,
            Err(_) => InvariantViolationSnafu {
                stage,
                details: "sqlite storage worker thread panicked".to_string(),
            }
            .fail(),
        }
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let database_url = self.database_url.clone();
        let namespace = self.namespace.clone();
        let key = key.to_string();
        self.run_db_call("kv-get", async move {
            let mut connection = connect_store_connection(&database_url, "kv-get-connect").await?;
            sqlx::query_scalar::<_, String>(
                "SELECT value FROM kv_entries WHERE namespace = ? AND key = ?",
            )
            .bind(namespace)
            .bind(key)
            .fetch_optional(&mut connection)
            .await
            .context(SqliteQuerySnafu {
                stage: "kv-get-query",
            })
        })
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let database_url = self.database_url.clone();
        let namespace = self.namespace.clone();
        let key = key.to_string();
        let value = value.to_string();
        self.run_db_call("kv-set", async move {
            let mut connection = connect_store_connection(&database_url, "kv-set-connect").await?;
            sqlx::query(
                "INSERT INTO kv_entries (namespace, key, value, updated_at) VALUES (?, ?, ?, ?) \
                 ON CONFLICT(namespace, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            )
            .bind(namespace)
            .bind(key)
            .bind(value)
            .bind(unix_timestamp_seconds())
            .execute(&mut connection)
            .await
            .context(SqliteQuerySnafu {
                stage: "kv-set-upsert",
            })?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let database_url = self.database_url.clone();
        let namespace = self.namespace.clone();
        let key = key.to_string();
        self.run_db_call("kv-remove", async move {
            let mut connection =
                connect_store_connection(&database_url, "kv-remove-connect").await?;
            sqlx::query("DELETE FROM kv_entries WHERE namespace = ? AND key = ?")
                .bind(namespace)
                .bind(key)
                .execute(&mut connection)
                .await
                .context(SqliteQuerySnafu {
                    stage: "kv-remove-delete",
                })?;
            Ok(())
        })
    }
}

async fn connect_store_connection(
    database_url: &str,
    stage: &'static str,
) -> StorageResult<SqliteConnection> {
    let mut connection =
        SqliteConnection::connect(database_url)
            .await
            .context(SqliteConnectSnafu {
                stage,
                database_url: database_url.to_string(),
            })?;

    sqlx::query("PRAGMA busy_timeout = 5000;")
        .execute(&mut connection)
        .await
        .context(SqlitePragmaSnafu {
            stage: "sqlite-store-pragma-busy-timeout",
            pragma: "busy_timeout",
        })?;

    Ok(connection)
}

fn unix_timestamp_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| {
            i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
        })
}

fn ensure_database_directory(database_location: &str) -> StorageResult<()> {
    if database_location.starts_with("sqlite:") {
        return Ok(());
    }

    let path = Path::new(database_location);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).context(CreateSqliteDirectorySnafu {
            stage: "sqlite-open-create-directory",
            path: parent.display().to_string(),
        })?;
    }

    Ok(())
}

fn normalize_database_url(database_location: &str) -> String {
    if database_location.starts_with("sqlite:") {
        return database_location.to_string();
    }

    format!("sqlite://{database_location}")
}

//! SQLite-backed stores

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use portal_core::{
    conflict_error, storage_error, Assignment, AssignmentStatus, AssignmentStore, CredentialStore,
    Identity, PortalError, PortalResult, Role,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

const SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        login TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_users_role ON users(role)",
    r#"
    CREATE TABLE IF NOT EXISTS assignments (
        id TEXT PRIMARY KEY,
        submitter_id TEXT NOT NULL,
        submitter_login TEXT NOT NULL,
        task TEXT NOT NULL,
        reviewer_id TEXT NOT NULL,
        reviewer_login TEXT NOT NULL,
        status TEXT NOT NULL,
        submitted_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_assignments_reviewer ON assignments(reviewer_id)",
];

/// Shared connection pool for both SQLite stores
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Connect (creating the database file and its directory if needed) and ensure the schema.
    pub async fn connect(database_url: &str) -> PortalResult<Self> {
        info!(database_url = %database_url, "Connecting to database");

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| storage_error!(format!("Invalid database URL: {}", e), "sqlite", e))?
            .create_if_missing(true);

        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        if !in_memory {
            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    debug!(path = %parent.display(), "Creating database directory");
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        // Every connection to `:memory:` is a separate database, so keep exactly one alive.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| storage_error!("Failed to connect to database", "sqlite", e))?;

        let storage = Self { pool };
        storage.create_tables().await?;
        info!("Database ready");
        Ok(storage)
    }

    async fn create_tables(&self) -> PortalResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| storage_error!("Failed to create tables", "sqlite", e))?;
        }
        Ok(())
    }

    pub fn credentials(&self) -> SqliteCredentialStore {
        SqliteCredentialStore {
            pool: self.pool.clone(),
        }
    }

    pub fn assignments(&self) -> SqliteAssignmentStore {
        SqliteAssignmentStore {
            pool: self.pool.clone(),
        }
    }
}

fn parse_timestamp(value: &str) -> PortalResult<DateTime<Utc>> {
    value
        .parse::<DateTime<Utc>>()
        .map_err(|e| storage_error!(format!("Corrupt timestamp '{}'", value), "sqlite", e))
}

/// Read a column without panicking on a type mismatch
fn column<'r, T>(row: &'r SqliteRow, name: &str) -> PortalResult<T>
where
    T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
    row.try_get(name)
        .map_err(|e| storage_error!(format!("Unreadable column '{}'", name), "sqlite", e))
}

fn corrupt(message: String) -> PortalError {
    storage_error!(message, "sqlite")
}

fn query_failed(operation: &str, e: sqlx::Error) -> PortalError {
    let context = portal_core::ErrorContext::new("sqlite")
        .with_operation(operation)
        .with_metadata("driver_error", &e.to_string());
    PortalError::Storage {
        message: format!("Query failed: {}", operation),
        source: Some(Box::new(e)),
        context,
    }
}

#[derive(Debug, Clone)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

impl SqliteCredentialStore {
    fn identity_from_row(row: &SqliteRow) -> PortalResult<Identity> {
        let role: String = column(row, "role")?;
        let created_at: String = column(row, "created_at")?;
        Ok(Identity {
            id: column(row, "id")?,
            login: column(row, "login")?,
            password_hash: column(row, "password_hash")?,
            role: Role::from_str(&role).map_err(corrupt)?,
            created_at: parse_timestamp(&created_at)?,
        })
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn find_by_login(&self, login: &str) -> PortalResult<Option<Identity>> {
        let row = sqlx::query("SELECT * FROM users WHERE login = ?")
            .bind(login)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed("find_by_login", e))?;
        row.as_ref().map(Self::identity_from_row).transpose()
    }

    async fn exists_by_login(&self, login: &str) -> PortalResult<bool> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM users WHERE login = ?")
            .bind(login)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| query_failed("exists_by_login", e))?;
        let count: i64 = column(&row, "count")?;
        Ok(count > 0)
    }

    async fn find_by_id(&self, id: &str) -> PortalResult<Option<Identity>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed("find_by_id", e))?;
        row.as_ref().map(Self::identity_from_row).transpose()
    }

    async fn save(&self, identity: &Identity) -> PortalResult<()> {
        let result = sqlx::query(
            "INSERT INTO users (id, login, password_hash, role, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&identity.id)
        .bind(&identity.login)
        .bind(&identity.password_hash)
        .bind(identity.role.as_str())
        .bind(identity.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!(id = %identity.id, "Identity inserted");
                Ok(())
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(conflict_error!(
                format!("identity '{}'", identity.login),
                "sqlite"
            )),
            Err(e) => Err(query_failed("insert_identity", e)),
        }
    }

    async fn find_by_role(&self, role: Role) -> PortalResult<Vec<Identity>> {
        let rows = sqlx::query("SELECT * FROM users WHERE role = ? ORDER BY created_at")
            .bind(role.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_failed("find_by_role", e))?;
        rows.iter().map(Self::identity_from_row).collect()
    }
}

#[derive(Debug, Clone)]
pub struct SqliteAssignmentStore {
    pool: SqlitePool,
}

impl SqliteAssignmentStore {
    fn assignment_from_row(row: &SqliteRow) -> PortalResult<Assignment> {
        let status: String = column(row, "status")?;
        let submitted_at: String = column(row, "submitted_at")?;
        Ok(Assignment {
            id: column(row, "id")?,
            submitter_id: column(row, "submitter_id")?,
            submitter_login: column(row, "submitter_login")?,
            task: column(row, "task")?,
            reviewer_id: column(row, "reviewer_id")?,
            reviewer_login: column(row, "reviewer_login")?,
            status: AssignmentStatus::from_str(&status).map_err(corrupt)?,
            submitted_at: parse_timestamp(&submitted_at)?,
        })
    }
}

#[async_trait]
impl AssignmentStore for SqliteAssignmentStore {
    async fn save(&self, assignment: &Assignment) -> PortalResult<()> {
        sqlx::query(
            r#"
            INSERT INTO assignments
                (id, submitter_id, submitter_login, task, reviewer_id, reviewer_login, status, submitted_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                task = excluded.task,
                status = excluded.status
            "#,
        )
        .bind(&assignment.id)
        .bind(&assignment.submitter_id)
        .bind(&assignment.submitter_login)
        .bind(&assignment.task)
        .bind(&assignment.reviewer_id)
        .bind(&assignment.reviewer_login)
        .bind(assignment.status.as_str())
        .bind(assignment.submitted_at.to_rfc3339_opts(SecondsFormat::Nanos, true))
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("save_assignment", e))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> PortalResult<Option<Assignment>> {
        let row = sqlx::query("SELECT * FROM assignments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed("find_assignment", e))?;
        row.as_ref().map(Self::assignment_from_row).transpose()
    }

    async fn find_by_reviewer(&self, reviewer_id: &str) -> PortalResult<Vec<Assignment>> {
        let rows =
            sqlx::query("SELECT * FROM assignments WHERE reviewer_id = ? ORDER BY submitted_at")
                .bind(reviewer_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| query_failed("find_by_reviewer", e))?;
        rows.iter().map(Self::assignment_from_row).collect()
    }
}

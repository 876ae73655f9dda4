//! SQLite-backed Store
//! Mission: Persist users, projects, incomes, loans and pay-outs
//!
//! One connection guarded by a mutex; every query is short and synchronous.
//! Per-table accessors live in the sibling modules as `impl Store` blocks.

mod income;
mod loan;
mod models;
mod pay_out;
mod project;
mod user;

pub use models::*;

use anyhow::{Context, Result};
use parking_lot::Mutex; // Faster than std::sync::Mutex
use rusqlite::{ffi, types::Type, Connection, ErrorCode, Row};
use tracing::info;
use uuid::Uuid;

const PRAGMAS_SQL: &str = r#"
PRAGMA foreign_keys = ON;
PRAGMA synchronous = NORMAL;
"#;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    username TEXT PRIMARY KEY,
    hashed_password TEXT NOT NULL,
    full_name TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL,
    role TEXT NOT NULL DEFAULT 'user',
    password_changed_at TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS project (
    id TEXT PRIMARY KEY,
    name TEXT UNIQUE NOT NULL,
    amount REAL NOT NULL,
    description TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS income (
    id TEXT PRIMARY KEY,
    payee TEXT NOT NULL,
    amount REAL NOT NULL,
    project_id TEXT NOT NULL REFERENCES project(id),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_income_project ON income(project_id);

CREATE TABLE IF NOT EXISTS loan (
    id TEXT PRIMARY KEY,
    borrower TEXT NOT NULL,
    amount REAL NOT NULL,
    subject TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pay_out (
    id TEXT PRIMARY KEY,
    owner TEXT NOT NULL,
    amount REAL NOT NULL,
    subject TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Storage handle shared by all request handlers
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) a database file and apply the schema
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database at {}", db_path))?;

        // WAL for concurrent readers on file-backed databases
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })
        .context("Failed to enable WAL mode")?;

        let store = Self::init(conn)?;
        info!("Store opened at {}", db_path);
        Ok(store)
    }

    /// Private in-memory database, used by tests and throwaway runs
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(PRAGMAS_SQL)
            .context("Failed to apply pragmas")?;
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to apply schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

pub type DbResult<T> = std::result::Result<T, DbError>;

/// Store errors, classified so handlers can pick a status code
#[derive(Debug)]
pub enum DbError {
    NotFound,
    UniqueViolation,
    ForeignKeyViolation,
    StillReferenced,
    Sqlite(rusqlite::Error),
}

impl From<rusqlite::Error> for DbError {
    fn from(e: rusqlite::Error) -> Self {
        if let rusqlite::Error::QueryReturnedNoRows = e {
            return DbError::NotFound;
        }

        if let rusqlite::Error::SqliteFailure(ref err, _) = e {
            if err.code == ErrorCode::ConstraintViolation {
                match err.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        return DbError::UniqueViolation
                    }
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return DbError::ForeignKeyViolation,
                    _ => {}
                }
            }
        }

        DbError::Sqlite(e)
    }
}

impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbError::NotFound => write!(f, "record not found"),
            DbError::UniqueViolation => write!(f, "record already exists"),
            DbError::ForeignKeyViolation => write!(f, "referenced record does not exist"),
            DbError::StillReferenced => write!(f, "record is still referenced by other records"),
            DbError::Sqlite(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DbError::Sqlite(e) => Some(e),
            _ => None,
        }
    }
}

/// Read a TEXT column holding a UUID
fn uuid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Case-insensitive substring pattern for `LIKE ?  ESCAPE '\'`
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

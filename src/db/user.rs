use super::{CreateUserParams, DbError, DbResult, Store, User};
use crate::auth::{models::UserRole, password::hash_password};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, types::Type, Row};
use tracing::{info, warn};

const USER_COLUMNS: &str =
    "username, hashed_password, full_name, email, role, password_changed_at, created_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let role_str: String = row.get(4)?;
    let role = UserRole::parse(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            format!("unknown role {:?}", role_str).into(),
        )
    })?;

    Ok(User {
        username: row.get(0)?,
        hashed_password: row.get(1)?,
        full_name: row.get(2)?,
        email: row.get(3)?,
        role,
        password_changed_at: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl Store {
    pub fn create_user(&self, arg: &CreateUserParams) -> DbResult<User> {
        let now = Utc::now();
        let user = User {
            username: arg.username.clone(),
            hashed_password: arg.hashed_password.clone(),
            full_name: arg.full_name.clone(),
            email: arg.email.clone(),
            role: arg.role,
            password_changed_at: now,
            created_at: now,
        };

        let conn = self.conn.lock();
        conn.execute(
            &format!("INSERT INTO users ({USER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                user.username,
                user.hashed_password,
                user.full_name,
                user.email,
                user.role.as_str(),
                user.password_changed_at,
                user.created_at,
            ],
        )?;

        Ok(user)
    }

    pub fn get_user(&self, username: &str) -> DbResult<User> {
        let conn = self.conn.lock();
        let user = conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            params![username],
            user_from_row,
        )?;

        Ok(user)
    }

    /// Create the bootstrap admin account unless `username` already exists.
    /// Returns whether an account was created.
    pub fn ensure_admin(&self, username: &str, password: &str, email: &str) -> Result<bool> {
        match self.get_user(username) {
            Ok(existing) => {
                if existing.role != UserRole::Admin {
                    warn!(
                        "Bootstrap admin {} exists with role {}; leaving it unchanged",
                        username,
                        existing.role.as_str()
                    );
                }
                return Ok(false);
            }
            Err(DbError::NotFound) => {}
            Err(e) => return Err(e).context("Failed to look up bootstrap admin"),
        }

        let hashed_password = hash_password(password)?;
        self.create_user(&CreateUserParams {
            username: username.to_string(),
            hashed_password,
            full_name: "Administrator".to_string(),
            email: email.to_string(),
            role: UserRole::Admin,
        })
        .context("Failed to insert bootstrap admin")?;

        info!("Bootstrap admin user created: {}", username);
        Ok(true)
    }
}

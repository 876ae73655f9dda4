//! Store records and query parameters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::models::UserRole;

/// User account
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub username: String,
    #[serde(skip_serializing)]
    pub hashed_password: String, // bcrypt hash - never serialize
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    pub password_changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub username: String,
    pub hashed_password: String,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub amount: f64,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateProjectParams {
    pub name: String,
    pub description: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: Uuid,
    pub payee: String,
    pub amount: f64,
    pub project_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateIncomeParams {
    pub payee: String,
    pub amount: f64,
    pub project_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: Uuid,
    pub borrower: String,
    pub amount: f64,
    pub subject: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateLoanParams {
    pub borrower: String,
    pub subject: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayOut {
    pub id: Uuid,
    pub owner: String,
    pub amount: f64,
    pub subject: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreatePayOutParams {
    pub owner: String,
    pub subject: String,
    pub amount: f64,
}

/// Page window shared by every list query
#[derive(Debug, Clone, Copy)]
pub struct ListParams {
    pub offset: i64,
    pub limit: i64,
}

/// Substring search plus page window
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub query: String,
    pub offset: i64,
    pub limit: i64,
}

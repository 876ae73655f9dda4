//! Request bodies and their validation rules

use crate::db::{
    CreateIncomeParams, CreateLoanParams, CreatePayOutParams, CreateProjectParams, ListParams,
    SearchParams,
};
use serde::Deserialize;
use uuid::Uuid;

const LIST_PAGE_SIZE: std::ops::RangeInclusive<i64> = 5..=100;
const SEARCH_PAGE_SIZE: std::ops::RangeInclusive<i64> = 5..=10;

/// Body of every `POST /<resource>/all`
#[derive(Debug, Deserialize)]
pub struct ListRequest {
    pub page_id: i64,
    pub page_size: i64,
}

impl ListRequest {
    pub fn validate(&self) -> Result<ListParams, String> {
        let (offset, limit) = page_window(self.page_id, self.page_size, LIST_PAGE_SIZE)?;
        Ok(ListParams { offset, limit })
    }
}

/// Body of every `POST /<resource>/search`
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub page_id: i64,
    pub page_size: i64,
}

impl SearchRequest {
    pub fn validate(&self) -> Result<SearchParams, String> {
        require("query", &self.query)?;
        let (offset, limit) = page_window(self.page_id, self.page_size, SEARCH_PAGE_SIZE)?;
        Ok(SearchParams {
            query: self.query.clone(),
            offset,
            limit,
        })
    }
}

/// Translate a 1-based page into an offset/limit pair
fn page_window(
    page_id: i64,
    page_size: i64,
    sizes: std::ops::RangeInclusive<i64>,
) -> Result<(i64, i64), String> {
    if page_id < 1 {
        return Err("page_id must be at least 1".to_string());
    }
    if !sizes.contains(&page_size) {
        return Err(format!(
            "page_size must be between {} and {}",
            sizes.start(),
            sizes.end()
        ));
    }

    let offset = (page_id - 1)
        .checked_mul(page_size)
        .ok_or_else(|| "page_id is too large".to_string())?;
    Ok((offset, page_size))
}

fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }
    Ok(())
}

fn require_amount(amount: f64) -> Result<(), String> {
    if !amount.is_finite() || amount == 0.0 {
        return Err("amount is required".to_string());
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: String,
    pub amount: f64,
}

impl CreateProjectRequest {
    pub fn validate(self) -> Result<CreateProjectParams, String> {
        require("name", &self.name)?;
        require("description", &self.description)?;
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err("amount must be greater than 0".to_string());
        }

        Ok(CreateProjectParams {
            name: self.name,
            description: self.description,
            amount: self.amount,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateIncomeRequest {
    pub payee: String,
    // Older clients send the amount as "balance"
    #[serde(alias = "balance")]
    pub amount: f64,
    pub project_id: Uuid,
}

impl CreateIncomeRequest {
    pub fn validate(self) -> Result<CreateIncomeParams, String> {
        require("payee", &self.payee)?;
        require_amount(self.amount)?;

        Ok(CreateIncomeParams {
            payee: self.payee,
            amount: self.amount,
            project_id: self.project_id,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateLoanRequest {
    pub borrower: String,
    pub subject: String,
    pub amount: f64,
}

impl CreateLoanRequest {
    pub fn validate(self) -> Result<CreateLoanParams, String> {
        require("borrower", &self.borrower)?;
        require("subject", &self.subject)?;
        require_amount(self.amount)?;

        Ok(CreateLoanParams {
            borrower: self.borrower,
            subject: self.subject,
            amount: self.amount,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePayOutRequest {
    pub owner: String,
    pub subject: String,
    pub amount: f64,
}

impl CreatePayOutRequest {
    pub fn validate(self) -> Result<CreatePayOutParams, String> {
        require("owner", &self.owner)?;
        require("subject", &self.subject)?;
        require_amount(self.amount)?;

        Ok(CreatePayOutParams {
            owner: self.owner,
            subject: self.subject,
            amount: self.amount,
        })
    }
}

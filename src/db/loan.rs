use super::{
    like_pattern, uuid_column, CreateLoanParams, DbResult, ListParams, Loan, SearchParams, Store,
};
use chrono::Utc;
use rusqlite::{params, Row};
use uuid::Uuid;

const LOAN_COLUMNS: &str = "id, borrower, amount, subject, created_at, updated_at";

fn loan_from_row(row: &Row<'_>) -> rusqlite::Result<Loan> {
    Ok(Loan {
        id: uuid_column(row, 0)?,
        borrower: row.get(1)?,
        amount: row.get(2)?,
        subject: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

impl Store {
    pub fn create_loan(&self, arg: &CreateLoanParams) -> DbResult<Loan> {
        let now = Utc::now();
        let loan = Loan {
            id: Uuid::new_v4(),
            borrower: arg.borrower.clone(),
            amount: arg.amount,
            subject: arg.subject.clone(),
            created_at: now,
            updated_at: now,
        };

        let conn = self.conn.lock();
        conn.execute(
            &format!("INSERT INTO loan ({LOAN_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                loan.id.to_string(),
                loan.borrower,
                loan.amount,
                loan.subject,
                loan.created_at,
                loan.updated_at,
            ],
        )?;

        Ok(loan)
    }

    pub fn get_loan(&self, id: Uuid) -> DbResult<Loan> {
        let conn = self.conn.lock();
        let loan = conn.query_row(
            &format!("SELECT {LOAN_COLUMNS} FROM loan WHERE id = ?1"),
            params![id.to_string()],
            loan_from_row,
        )?;

        Ok(loan)
    }

    pub fn list_loans(&self, arg: &ListParams) -> DbResult<Vec<Loan>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {LOAN_COLUMNS} FROM loan ORDER BY id LIMIT ?1 OFFSET ?2"
        ))?;

        let loans = stmt
            .query_map(params![arg.limit, arg.offset], loan_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(loans)
    }

    /// Substring match on borrower
    pub fn search_loans(&self, arg: &SearchParams) -> DbResult<Vec<Loan>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {LOAN_COLUMNS} FROM loan WHERE borrower LIKE ?1 ESCAPE '\\'
             ORDER BY id LIMIT ?2 OFFSET ?3"
        ))?;

        let loans = stmt
            .query_map(
                params![like_pattern(&arg.query), arg.limit, arg.offset],
                loan_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(loans)
    }

    /// Delete a row and return it as it was
    pub fn delete_loan(&self, id: Uuid) -> DbResult<Loan> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let loan = tx.query_row(
            &format!("SELECT {LOAN_COLUMNS} FROM loan WHERE id = ?1"),
            params![id.to_string()],
            loan_from_row,
        )?;
        tx.execute("DELETE FROM loan WHERE id = ?1", params![id.to_string()])?;
        tx.commit()?;

        Ok(loan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;

    #[test]
    fn test_loan_lifecycle() {
        let store = Store::open_in_memory().unwrap();

        let loan = store
            .create_loan(&CreateLoanParams {
                borrower: "frank".to_string(),
                subject: "crane rental".to_string(),
                amount: 800.0,
            })
            .unwrap();
        store
            .create_loan(&CreateLoanParams {
                borrower: "grace".to_string(),
                subject: "cement".to_string(),
                amount: 90.0,
            })
            .unwrap();

        assert_eq!(store.get_loan(loan.id).unwrap(), loan);

        let found = store
            .search_loans(&SearchParams {
                query: "ran".to_string(),
                offset: 0,
                limit: 5,
            })
            .unwrap();
        assert_eq!(found, vec![loan.clone()]);

        assert_eq!(store.delete_loan(loan.id).unwrap(), loan);
        assert!(matches!(store.get_loan(loan.id), Err(DbError::NotFound)));
        assert_eq!(
            store
                .list_loans(&ListParams { offset: 0, limit: 5 })
                .unwrap()
                .len(),
            1
        );
    }
}

use super::{
    like_pattern, uuid_column, CreateIncomeParams, DbResult, Income, ListParams, SearchParams,
    Store,
};
use chrono::Utc;
use rusqlite::{params, Row};
use uuid::Uuid;

const INCOME_COLUMNS: &str = "id, payee, amount, project_id, created_at, updated_at";

fn income_from_row(row: &Row<'_>) -> rusqlite::Result<Income> {
    Ok(Income {
        id: uuid_column(row, 0)?,
        payee: row.get(1)?,
        amount: row.get(2)?,
        project_id: uuid_column(row, 3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

impl Store {
    /// Fails with `ForeignKeyViolation` when the project does not exist
    pub fn create_income(&self, arg: &CreateIncomeParams) -> DbResult<Income> {
        let now = Utc::now();
        let income = Income {
            id: Uuid::new_v4(),
            payee: arg.payee.clone(),
            amount: arg.amount,
            project_id: arg.project_id,
            created_at: now,
            updated_at: now,
        };

        let conn = self.conn.lock();
        conn.execute(
            &format!("INSERT INTO income ({INCOME_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                income.id.to_string(),
                income.payee,
                income.amount,
                income.project_id.to_string(),
                income.created_at,
                income.updated_at,
            ],
        )?;

        Ok(income)
    }

    pub fn get_income(&self, id: Uuid) -> DbResult<Income> {
        let conn = self.conn.lock();
        let income = conn.query_row(
            &format!("SELECT {INCOME_COLUMNS} FROM income WHERE id = ?1"),
            params![id.to_string()],
            income_from_row,
        )?;

        Ok(income)
    }

    pub fn list_incomes(&self, arg: &ListParams) -> DbResult<Vec<Income>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {INCOME_COLUMNS} FROM income ORDER BY id LIMIT ?1 OFFSET ?2"
        ))?;

        let incomes = stmt
            .query_map(params![arg.limit, arg.offset], income_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(incomes)
    }

    /// Substring match on payee
    pub fn search_incomes(&self, arg: &SearchParams) -> DbResult<Vec<Income>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {INCOME_COLUMNS} FROM income WHERE payee LIKE ?1 ESCAPE '\\'
             ORDER BY id LIMIT ?2 OFFSET ?3"
        ))?;

        let incomes = stmt
            .query_map(
                params![like_pattern(&arg.query), arg.limit, arg.offset],
                income_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(incomes)
    }

    /// Delete a row and return it as it was
    pub fn delete_income(&self, id: Uuid) -> DbResult<Income> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let income = tx.query_row(
            &format!("SELECT {INCOME_COLUMNS} FROM income WHERE id = ?1"),
            params![id.to_string()],
            income_from_row,
        )?;
        tx.execute("DELETE FROM income WHERE id = ?1", params![id.to_string()])?;
        tx.commit()?;

        Ok(income)
    }
}

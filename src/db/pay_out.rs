use super::{
    like_pattern, uuid_column, CreatePayOutParams, DbResult, ListParams, PayOut, SearchParams,
    Store,
};
use chrono::Utc;
use rusqlite::{params, Row};
use uuid::Uuid;

const PAY_OUT_COLUMNS: &str = "id, owner, amount, subject, created_at, updated_at";

fn pay_out_from_row(row: &Row<'_>) -> rusqlite::Result<PayOut> {
    Ok(PayOut {
        id: uuid_column(row, 0)?,
        owner: row.get(1)?,
        amount: row.get(2)?,
        subject: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

impl Store {
    pub fn create_pay_out(&self, arg: &CreatePayOutParams) -> DbResult<PayOut> {
        let now = Utc::now();
        let pay_out = PayOut {
            id: Uuid::new_v4(),
            owner: arg.owner.clone(),
            amount: arg.amount,
            subject: arg.subject.clone(),
            created_at: now,
            updated_at: now,
        };

        let conn = self.conn.lock();
        conn.execute(
            &format!("INSERT INTO pay_out ({PAY_OUT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                pay_out.id.to_string(),
                pay_out.owner,
                pay_out.amount,
                pay_out.subject,
                pay_out.created_at,
                pay_out.updated_at,
            ],
        )?;

        Ok(pay_out)
    }

    pub fn get_pay_out(&self, id: Uuid) -> DbResult<PayOut> {
        let conn = self.conn.lock();
        let pay_out = conn.query_row(
            &format!("SELECT {PAY_OUT_COLUMNS} FROM pay_out WHERE id = ?1"),
            params![id.to_string()],
            pay_out_from_row,
        )?;

        Ok(pay_out)
    }

    pub fn list_pay_outs(&self, arg: &ListParams) -> DbResult<Vec<PayOut>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {PAY_OUT_COLUMNS} FROM pay_out ORDER BY id LIMIT ?1 OFFSET ?2"
        ))?;

        let pay_outs = stmt
            .query_map(params![arg.limit, arg.offset], pay_out_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pay_outs)
    }

    /// Substring match on owner
    pub fn search_pay_outs(&self, arg: &SearchParams) -> DbResult<Vec<PayOut>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {PAY_OUT_COLUMNS} FROM pay_out WHERE owner LIKE ?1 ESCAPE '\\'
             ORDER BY id LIMIT ?2 OFFSET ?3"
        ))?;

        let pay_outs = stmt
            .query_map(
                params![like_pattern(&arg.query), arg.limit, arg.offset],
                pay_out_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pay_outs)
    }

    /// Delete a row and return it as it was
    pub fn delete_pay_out(&self, id: Uuid) -> DbResult<PayOut> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let pay_out = tx.query_row(
            &format!("SELECT {PAY_OUT_COLUMNS} FROM pay_out WHERE id = ?1"),
            params![id.to_string()],
            pay_out_from_row,
        )?;
        tx.execute("DELETE FROM pay_out WHERE id = ?1", params![id.to_string()])?;
        tx.commit()?;

        Ok(pay_out)
    }
}

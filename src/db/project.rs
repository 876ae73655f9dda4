use super::{
    like_pattern, uuid_column, CreateProjectParams, DbError, DbResult, ListParams, Project,
    SearchParams, Store,
};
use chrono::Utc;
use rusqlite::{params, Row};
use uuid::Uuid;

const PROJECT_COLUMNS: &str = "id, name, amount, description, created_at, updated_at";

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: uuid_column(row, 0)?,
        name: row.get(1)?,
        amount: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

impl Store {
    pub fn create_project(&self, arg: &CreateProjectParams) -> DbResult<Project> {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: arg.name.clone(),
            amount: arg.amount,
            description: arg.description.clone(),
            created_at: now,
            updated_at: now,
        };

        let conn = self.conn.lock();
        conn.execute(
            &format!("INSERT INTO project ({PROJECT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                project.id.to_string(),
                project.name,
                project.amount,
                project.description,
                project.created_at,
                project.updated_at,
            ],
        )?;

        Ok(project)
    }

    pub fn get_project(&self, id: Uuid) -> DbResult<Project> {
        let conn = self.conn.lock();
        let project = conn.query_row(
            &format!("SELECT {PROJECT_COLUMNS} FROM project WHERE id = ?1"),
            params![id.to_string()],
            project_from_row,
        )?;

        Ok(project)
    }

    pub fn list_projects(&self, arg: &ListParams) -> DbResult<Vec<Project>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {PROJECT_COLUMNS} FROM project ORDER BY id LIMIT ?1 OFFSET ?2"
        ))?;

        let projects = stmt
            .query_map(params![arg.limit, arg.offset], project_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    pub fn search_projects(&self, arg: &SearchParams) -> DbResult<Vec<Project>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {PROJECT_COLUMNS} FROM project WHERE name LIKE ?1 ESCAPE '\\'
             ORDER BY id LIMIT ?2 OFFSET ?3"
        ))?;

        let projects = stmt
            .query_map(
                params![like_pattern(&arg.query), arg.limit, arg.offset],
                project_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    /// Delete a row and return it as it was.
    ///
    /// Fails with `StillReferenced` while incomes point at the project.
    pub fn delete_project(&self, id: Uuid) -> DbResult<Project> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let project = tx.query_row(
            &format!("SELECT {PROJECT_COLUMNS} FROM project WHERE id = ?1"),
            params![id.to_string()],
            project_from_row,
        )?;
        tx.execute("DELETE FROM project WHERE id = ?1", params![id.to_string()])
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation => DbError::StillReferenced,
                other => other,
            })?;
        tx.commit()?;

        Ok(project)
    }
}

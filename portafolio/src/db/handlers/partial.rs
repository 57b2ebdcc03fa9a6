//! Dynamic `UPDATE` statements for partial updates.

use sqlx::{Encode, Postgres, QueryBuilder, Type};

use crate::db::errors::{DbError, Result};

/// Builds `UPDATE <table> SET ... WHERE id = $n RETURNING *` from whichever
/// fields a request carries. `updated_at` is always refreshed, so an empty
/// request still touches the row and reports whether it exists.
pub struct PartialUpdate<'a> {
    query: QueryBuilder<'a, Postgres>,
}

impl<'a> PartialUpdate<'a> {
    pub fn new(table: &str) -> Self {
        Self {
            query: QueryBuilder::new(format!("UPDATE {table} SET updated_at = NOW()")),
        }
    }

    /// Set `column` when `value` is present. For nullable columns pass the
    /// tri-state `Option<Option<T>>`; `Some(None)` writes NULL.
    pub fn set<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'a + Encode<'a, Postgres> + Type<Postgres>,
    {
        if let Some(value) = value {
            self.query.push(", ").push(column).push(" = ").push_bind(value);
        }
        self
    }

    /// Run the update and return the new row.
    pub async fn execute<R>(mut self, id: i32, conn: &mut sqlx::PgConnection) -> Result<R>
    where
        R: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        self.query.push(" WHERE id = ").push_bind(id).push(" RETURNING *");
        self.query
            .build_query_as::<R>()
            .fetch_optional(conn)
            .await?
            .ok_or(DbError::NotFound)
    }
}

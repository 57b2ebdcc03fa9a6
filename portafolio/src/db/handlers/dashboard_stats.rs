//! Read-only aggregate queries behind the dashboard.

use sqlx::PgConnection;
use tracing::instrument;

use crate::db::{errors::Result, models::dashboard::GroupCount};

/// Row totals for the dashboard header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct Totals {
    pub proyectos: i64,
    pub staff: i64,
    pub clientes: i64,
    pub integraciones: i64,
}

pub struct DashboardStats<'c> {
    db: &'c mut PgConnection,
}

impl<'c> DashboardStats<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn totals(&mut self) -> Result<Totals> {
        let totals = sqlx::query_as::<_, Totals>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM proyectos) AS proyectos,
                (SELECT COUNT(*) FROM staff) AS staff,
                (SELECT COUNT(*) FROM clientes) AS clientes,
                (SELECT COUNT(*) FROM integraciones) AS integraciones
            "#,
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(totals)
    }

    /// Projects grouped by categoria; uncategorised projects form a NULL group.
    #[instrument(skip(self), err)]
    pub async fn proyectos_by_categoria(&mut self) -> Result<Vec<GroupCount>> {
        self.group_count("SELECT categoria::text AS label, COUNT(*) AS count FROM proyectos GROUP BY categoria ORDER BY count DESC, label")
            .await
    }

    #[instrument(skip(self), err)]
    pub async fn proyectos_by_estado(&mut self) -> Result<Vec<GroupCount>> {
        self.group_count("SELECT estado::text AS label, COUNT(*) AS count FROM proyectos GROUP BY estado ORDER BY count DESC, label")
            .await
    }

    #[instrument(skip(self), err)]
    pub async fn staff_by_rol(&mut self) -> Result<Vec<GroupCount>> {
        self.group_count("SELECT rol::text AS label, COUNT(*) AS count FROM staff GROUP BY rol ORDER BY count DESC, label")
            .await
    }

    async fn group_count(&mut self, sql: &'static str) -> Result<Vec<GroupCount>> {
        let rows = sqlx::query_as::<_, GroupCount>(sql).fetch_all(&mut *self.db).await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_totals_and_groups(pool: PgPool) {
        sqlx::query(
            r#"
            INSERT INTO proyectos (titulo_proyecto, categoria, estado) VALUES
                ('A', 'Sistema', 'Activo'),
                ('B', 'Sistema', NULL),
                ('C', NULL, 'Activo')
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO staff (nombre_completo, rol) VALUES ('X', 'QA'), ('Y', NULL)")
            .execute(&pool)
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let mut stats = DashboardStats::new(&mut conn);

        let totals = stats.totals().await.unwrap();
        assert_eq!(totals.proyectos, 3);
        assert_eq!(totals.staff, 2);
        assert_eq!(totals.clientes, 0);

        let by_categoria = stats.proyectos_by_categoria().await.unwrap();
        assert_eq!(by_categoria[0].label.as_deref(), Some("Sistema"));
        assert_eq!(by_categoria[0].count, 2);
        assert!(by_categoria.iter().any(|g| g.label.is_none() && g.count == 1));

        let by_estado = stats.proyectos_by_estado().await.unwrap();
        assert_eq!(by_estado.iter().map(|g| g.count).sum::<i64>(), 3);

        let by_rol = stats.staff_by_rol().await.unwrap();
        assert_eq!(by_rol.len(), 2);
    }
}

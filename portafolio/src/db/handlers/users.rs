//! Database repository for users.

use crate::types::UserId;
use crate::{
    api::models::users::Role,
    db::{
        errors::{DbError, Result},
        handlers::{contains_pattern, repository::Repository},
        models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
    },
};
use sqlx::{Connection, PgConnection, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing users
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub skip: i64,
    pub limit: i64,
    /// Case-insensitive substring match on nombre or email
    pub search: Option<String>,
}

impl UserFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit, search: None }
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search.filter(|s| !s.trim().is_empty());
        self
    }
}

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

fn push_user_filter(query: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &UserFilter) {
    if let Some(search) = &filter.search {
        let pattern = contains_pattern(search);
        query
            .push(" WHERE (nombre ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR email ILIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, UserDBResponse>(
            r#"
            INSERT INTO users (nombre, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&request.nombre)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(request.role)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, UserDBResponse>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<UserId>) -> Result<HashMap<Self::Id, UserDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = sqlx::query_as::<_, UserDBResponse>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM users");
        push_user_filter(&mut query, filter);
        query
            .push(" ORDER BY id LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.skip);

        let users = query.build_query_as::<UserDBResponse>().fetch_all(&mut *self.db).await?;
        Ok(users)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, UserDBResponse>(
            r#"
            UPDATE users SET
                nombre = COALESCE($2, nombre),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                role = COALESCE($5, role),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.nombre)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(request.role)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(user)
    }
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, email), err)]
    pub async fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &UserFilter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM users");
        push_user_filter(&mut query, filter);

        let count = query.build_query_scalar::<i64>().fetch_one(&mut *self.db).await?;
        Ok(count)
    }

    /// Insert a self-registered user. The very first account becomes SUPERADMIN.
    ///
    /// The table lock serializes concurrent registrations so only one of them
    /// can observe an empty table.
    #[instrument(skip(self, nombre, password_hash), fields(email = %email), err)]
    pub async fn register(&mut self, nombre: &str, email: &str, password_hash: &str) -> Result<UserDBResponse> {
        let mut tx = self.db.begin().await?;

        sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&mut *tx).await?;
        let role = if existing == 0 { Role::Superadmin } else { Role::User };

        let user = Users::new(&mut tx)
            .create(&UserCreateDBRequest {
                nombre: nombre.to_string(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                role,
            })
            .await?;

        tx.commit().await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use super::*;
    use sqlx::PgPool;

    fn create_request(nombre: &str, email: &str) -> UserCreateDBRequest {
        UserCreateDBRequest {
            nombre: nombre.to_string(),
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role: Role::User,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_user(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let user = repo.create(&create_request("Ana", "ana@example.com")).await.unwrap();
        assert_eq!(user.nombre, "Ana");
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.role, Role::User);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_email_is_unique_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&create_request("Ana", "dup@example.com")).await.unwrap();
        let err = repo.create(&create_request("Otra Ana", "dup@example.com")).await.unwrap_err();

        match err {
            DbError::UniqueViolation { field, table, .. } => {
                assert_eq!(field.as_deref(), Some("email"));
                assert_eq!(table.as_deref(), Some("users"));
            }
            other => panic!("expected unique violation, got {other:?}"),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_user_by_email(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo.create(&create_request("Bruno", "bruno@example.com")).await.unwrap();

        let found = repo.get_user_by_email("bruno@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(repo.get_user_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_first_registered_user_is_superadmin(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let first = repo.register("Primera", "first@example.com", "hash").await.unwrap();
        let second = repo.register("Segunda", "second@example.com", "hash").await.unwrap();

        assert_eq!(first.role, Role::Superadmin);
        assert_eq!(second.role, Role::User);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_with_search_and_count(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&create_request("Carla Gómez", "carla@example.com")).await.unwrap();
        repo.create(&create_request("Diego", "diego@gomez.example.com")).await.unwrap();
        repo.create(&create_request("Elena", "elena@example.com")).await.unwrap();

        let filter = UserFilter::new(0, 10).with_search(Some("GOMEZ".to_string()));
        let users = repo.list(&filter).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].nombre, "Diego");

        let all = UserFilter::new(0, 2);
        assert_eq!(repo.list(&all).await.unwrap().len(), 2);
        assert_eq!(repo.count(&all).await.unwrap(), 3);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_keeps_absent_fields(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo.create(&create_request("Fabio", "fabio@example.com")).await.unwrap();

        let updated = repo
            .update(
                created.id,
                &UserUpdateDBRequest {
                    nombre: Some("Fabio R.".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.nombre, "Fabio R.");
        assert_eq!(updated.email, "fabio@example.com");
        assert_eq!(updated.password_hash, created.password_hash);

        let missing = repo.update(created.id + 1000, &UserUpdateDBRequest::default()).await;
        assert!(matches!(missing, Err(DbError::NotFound)));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_user(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo.create(&create_request("Gina", "gina@example.com")).await.unwrap();
        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }
}

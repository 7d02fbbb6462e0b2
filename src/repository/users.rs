//! Users repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, Role, UpdateUser, User, UserFilter, UserStatus},
    repository::clause::ClauseBuilder,
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by username (primary authentication lookup)
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(username) = LOWER($1)",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Get all users
    pub async fn get_all(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username")
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// Filtered read. Absent fields do not constrain; an entirely empty
    /// filter returns every user.
    pub async fn find(&self, filter: &UserFilter) -> AppResult<Vec<User>> {
        let mut criteria = ClauseBuilder::new();
        criteria
            .push("first_name =", filter.first_name.clone())
            .push("last_name =", filter.last_name.clone())
            .push("role =", filter.role.map(|r| r.as_str().to_string()))
            .push("status =", filter.status.map(|s| s.as_str().to_string()))
            .push("date_of_birth >=", filter.min_date_of_birth)
            .push("date_of_birth <=", filter.max_date_of_birth);

        let sql = format!("SELECT * FROM users{} ORDER BY username", criteria.where_clause());

        let users = criteria
            .bind_to_as(sqlx::query_as::<_, User>(&sql))
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// Check if username already exists
    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Create a new user; the password arrives already hashed.
    pub async fn create(
        &self,
        user: &CreateUser,
        password_hash: &str,
        role: Role,
        status: UserStatus,
    ) -> AppResult<User> {
        let now = Utc::now();

        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                user_id, username, email, password_hash, first_name, last_name,
                date_of_birth, role, status, created_at, last_modified_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.date_of_birth)
        .bind(role)
        .bind(status)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Partial update. Fails with `NoFieldsToUpdate` when no field is
    /// populated: an empty SET clause is invalid, not a silent no-op.
    pub async fn update(&self, id: Uuid, update: &UpdateUser) -> AppResult<User> {
        let mut assignments = ClauseBuilder::new();
        assignments
            .push("email =", update.email.clone())
            .push("first_name =", update.first_name.clone())
            .push("last_name =", update.last_name.clone())
            .push("date_of_birth =", update.date_of_birth)
            .push("role =", update.role.map(|r| r.as_str().to_string()))
            .push("status =", update.status.map(|s| s.as_str().to_string()));

        if assignments.is_empty() {
            return Err(AppError::NoFieldsToUpdate);
        }
        assignments.push("last_modified_at =", Some(Utc::now()));
        let set_clause = assignments.set_clause()?;

        let sql = format!(
            "UPDATE users{} WHERE user_id = ${} RETURNING *",
            set_clause,
            assignments.next_index()
        );

        assignments
            .bind_to_as(sqlx::query_as::<_, User>(&sql))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Record a successful login
    pub async fn update_last_login(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login = $1 WHERE user_id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete a user
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        Ok(())
    }
}

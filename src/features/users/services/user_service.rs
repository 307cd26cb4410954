use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::users::dtos::{CreateUserDto, UpdateUserDto, UserListQuery, UserResponseDto};
use crate::features::users::models::UserProfile;
use crate::shared::query::{like_pattern, normalize_filter};

const USER_COLUMNS: &str =
    "id, auth_subject, email, name, role, registration_number, created_at, updated_at";

/// Service for the user profile directory
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the profile of an authenticated subject.
    ///
    /// A profile created by an administrator has no subject until its owner
    /// first logs in; it is then linked by email. Callers pass an email only
    /// when the identity provider has verified it.
    pub async fn resolve_profile(
        &self,
        subject: &str,
        email: Option<&str>,
    ) -> Result<Option<UserProfile>> {
        let sql = format!("SELECT {} FROM users WHERE auth_subject = $1", USER_COLUMNS);
        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(subject)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to find user by subject: {:?}", e);
                AppError::Database(e)
            })?;

        if profile.is_some() {
            return Ok(profile);
        }

        let Some(email) = normalize_filter(email) else {
            return Ok(None);
        };

        let sql = format!(
            r#"
            UPDATE users
            SET auth_subject = $1, updated_at = NOW()
            WHERE auth_subject IS NULL AND LOWER(email) = LOWER($2)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let linked = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(subject)
            .bind(&email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to link user profile: {:?}", e);
                AppError::Database(e)
            })?;

        if let Some(ref p) = linked {
            tracing::info!("Linked user profile {} to subject {}", p.id, subject);
        }

        Ok(linked)
    }

    /// Profile of the caller, or 404 when none exists
    pub async fn get_own(&self, subject: &str, email: Option<&str>) -> Result<UserResponseDto> {
        self.resolve_profile(subject, email)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("No profile exists for this user".to_string()))
    }

    /// List profiles ordered by name
    pub async fn list(&self, query: &UserListQuery) -> Result<(Vec<UserResponseDto>, i64)> {
        let page = query.pagination();
        let role = query.role.map(|r| r.as_str());
        let search = like_pattern(query.search.as_deref());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM users
            WHERE ($1::text IS NULL OR role = $1)
              AND ($2::text IS NULL OR name ILIKE $2 OR email ILIKE $2)
            "#,
        )
        .bind(role)
        .bind(&search)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count users: {:?}", e);
            AppError::Database(e)
        })?;

        let sql = format!(
            r#"
            SELECT {} FROM users
            WHERE ($1::text IS NULL OR role = $1)
              AND ($2::text IS NULL OR name ILIKE $2 OR email ILIKE $2)
            ORDER BY name, email
            OFFSET $3 LIMIT $4
            "#,
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(role)
            .bind(&search)
            .bind(page.offset())
            .bind(page.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list users: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((users.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get(&self, id: Uuid) -> Result<UserResponseDto> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get user: {:?}", e);
                AppError::Database(e)
            })?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    pub async fn create(&self, dto: &CreateUserDto) -> Result<UserResponseDto> {
        let sql = format!(
            r#"
            INSERT INTO users (email, name, role, registration_number)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(dto.email.trim().to_lowercase())
            .bind(dto.name.trim())
            .bind(dto.role.as_str())
            .bind(normalize_filter(dto.registration_number.as_deref()))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::from_db(e, "A user with this email already exists")
            })?;

        tracing::info!("Created user profile {} with role {}", user.id, user.role);
        Ok(user.into())
    }

    pub async fn update(&self, id: Uuid, dto: &UpdateUserDto) -> Result<UserResponseDto> {
        let sql = format!(
            r#"
            UPDATE users
            SET name = $2, role = $3, registration_number = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(id)
            .bind(dto.name.trim())
            .bind(dto.role.as_str())
            .bind(normalize_filter(dto.registration_number.as_deref()))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update user: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        tracing::info!("Updated user profile {} (role {})", user.id, user.role);
        Ok(user.into())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete user: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }

        tracing::info!("Deleted user profile {}", id);
        Ok(())
    }

    /// Number of profiles per stored role
    pub async fn count_by_role(&self) -> Result<Vec<(String, i64)>> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT role, COUNT(*) FROM users GROUP BY role ORDER BY role",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count users by role: {:?}", e);
            AppError::Database(e)
        })
    }
}

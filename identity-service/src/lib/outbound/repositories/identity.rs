use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::identity::errors::IdentityError;
use crate::identity::models::Organisation;
use crate::identity::models::OrganisationId;
use crate::identity::models::User;
use crate::identity::models::UserId;
use crate::identity::ports::IdentityRepository;

pub struct PostgresIdentityRepository {
    pool: PgPool,
}

impl PostgresIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password_hash,
            phone: row.phone,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrganisationRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<OrganisationRow> for Organisation {
    fn from(row: OrganisationRow) -> Self {
        Self {
            id: OrganisationId(row.id),
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

fn database_error(e: sqlx::Error) -> IdentityError {
    IdentityError::DatabaseError(e.to_string())
}

/// Translate a unique violation on users_email_key into the domain
/// conflict; this is what closes the race window left by the pre-check.
fn user_insert_error(e: sqlx::Error, email: &str) -> IdentityError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some("users_email_key") {
            return IdentityError::EmailAlreadyExists(email.to_string());
        }
    }
    database_error(e)
}

#[async_trait]
impl IdentityRepository for PostgresIdentityRepository {
    async fn create_user_with_default_organisation(
        &self,
        user: User,
        organisation: Organisation,
    ) -> Result<User, IdentityError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password_hash, phone, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.0)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(user.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| user_insert_error(e, &user.email))?;

        sqlx::query(
            r#"
            INSERT INTO organisations (id, name, description, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(organisation.id.0)
        .bind(&organisation.name)
        .bind(&organisation.description)
        .bind(organisation.created_at)
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        sqlx::query(
            r#"
            INSERT INTO organisation_members (organisation_id, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(organisation.id.0)
        .bind(user.id.0)
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        tx.commit().await.map_err(database_error)?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, IdentityError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, first_name, last_name, email, password_hash, phone, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(User::from))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, IdentityError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, first_name, last_name, email, password_hash, phone, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(User::from))
    }

    async fn create_organisation_with_member(
        &self,
        organisation: Organisation,
        member: &UserId,
    ) -> Result<Organisation, IdentityError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        sqlx::query(
            r#"
            INSERT INTO organisations (id, name, description, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(organisation.id.0)
        .bind(&organisation.name)
        .bind(&organisation.description)
        .bind(organisation.created_at)
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        sqlx::query(
            r#"
            INSERT INTO organisation_members (organisation_id, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(organisation.id.0)
        .bind(member.0)
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        tx.commit().await.map_err(database_error)?;

        Ok(organisation)
    }

    async fn find_organisation_by_id(
        &self,
        id: &OrganisationId,
    ) -> Result<Option<Organisation>, IdentityError> {
        let row = sqlx::query_as::<_, OrganisationRow>(
            r#"
            SELECT id, name, description, created_at
            FROM organisations
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(Organisation::from))
    }

    async fn list_organisations_for_member(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Organisation>, IdentityError> {
        let rows = sqlx::query_as::<_, OrganisationRow>(
            r#"
            SELECT o.id, o.name, o.description, o.created_at
            FROM organisations o
            JOIN organisation_members m ON m.organisation_id = o.id
            WHERE m.user_id = $1
            ORDER BY o.created_at
            "#,
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(rows.into_iter().map(Organisation::from).collect())
    }

    async fn is_member(
        &self,
        organisation_id: &OrganisationId,
        user_id: &UserId,
    ) -> Result<bool, IdentityError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM organisation_members
                WHERE organisation_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(organisation_id.0)
        .bind(user_id.0)
        .fetch_one(&self.pool)
        .await
        .map_err(database_error)
    }

    async fn add_member(
        &self,
        organisation_id: &OrganisationId,
        user_id: &UserId,
    ) -> Result<(), IdentityError> {
        // ON CONFLICT keeps the operation idempotent for existing members
        sqlx::query(
            r#"
            INSERT INTO organisation_members (organisation_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(organisation_id.0)
        .bind(user_id.0)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }
}

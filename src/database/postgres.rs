use async_trait::async_trait;
use sqlx::{postgres::PgRow, FromRow, PgPool, Row};
use tracing::info;

use super::manager::DatabaseError;
use super::models::{AppUser, Division, NewAccount, NewTimeChangeRequest, Staff, TimeChangeRequest};
use super::store::{AccountStore, RequestStore, StaffStore, Store};
use crate::types::AppRole;

const SCHEMA: &str = include_str!("schema.sql");

const STAFF_SELECT: &str = r#"
    SELECT s.staff_id, s.staff_name, s.title, s.level, s.phone, s.male, s.address,
           s.date_birth, s.personal_email, s.manager_id, s.division_id, s.avatar_url,
           d.division_name
    FROM staffs s
    LEFT JOIN divisions d ON d.division_id = s.division_id
"#;

const TIME_REQUEST_COLUMNS: &str =
    "id, staff_id, date, h1, m1, h2, m2, wrk_type, off, reason, evidence_url, status, created_at";

/// PostgreSQL-backed record store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create missing tables. Every statement is idempotent.
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema is up to date");
        Ok(())
    }

    fn staff_from_row(row: &PgRow) -> Result<Staff, sqlx::Error> {
        let mut staff = Staff::from_row(row)?;
        let division_name: Option<String> = row.try_get("division_name")?;
        staff.division = staff
            .division_id
            .zip(division_name)
            .map(|(division_id, division_name)| Division { division_id, division_name });
        Ok(staff)
    }
}

#[async_trait]
impl StaffStore for PgStore {
    async fn find_max_staff_id(&self, year_prefix: &str) -> Result<Option<String>, DatabaseError> {
        let max: Option<String> = sqlx::query_scalar(
            "SELECT staff_id FROM staffs
             WHERE staff_id LIKE $1
             ORDER BY length(staff_id) DESC, staff_id DESC
             LIMIT 1",
        )
        .bind(format!("{}%", year_prefix))
        .fetch_optional(&self.pool)
        .await?;

        Ok(max)
    }

    async fn get_staff(&self, staff_id: &str) -> Result<Option<Staff>, DatabaseError> {
        let query = format!("{} WHERE s.staff_id = $1", STAFF_SELECT);
        let row = sqlx::query(&query)
            .bind(staff_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(Self::staff_from_row).transpose()?)
    }

    async fn list_staff(&self) -> Result<Vec<Staff>, DatabaseError> {
        let query = format!("{} ORDER BY length(s.staff_id), s.staff_id", STAFF_SELECT);
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(Self::staff_from_row).collect::<Result<Vec<_>, sqlx::Error>>()?)
    }

    async fn find_division(&self, division_id: i32) -> Result<Option<Division>, DatabaseError> {
        let division = sqlx::query_as::<_, Division>(
            "SELECT division_id, division_name FROM divisions WHERE division_id = $1",
        )
        .bind(division_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(division)
    }

    async fn update_avatar(&self, staff_id: &str, avatar_url: &str) -> Result<Option<Staff>, DatabaseError> {
        let updated = sqlx::query("UPDATE staffs SET avatar_url = $2 WHERE staff_id = $1")
            .bind(staff_id)
            .bind(avatar_url)
            .execute(&self.pool)
            .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_staff(staff_id).await
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn ensure_roles(&self, roles: &[AppRole]) -> Result<(), DatabaseError> {
        for role in roles {
            sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
                .bind(role.as_str())
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    async fn insert_account(&self, account: NewAccount) -> Result<Staff, DatabaseError> {
        let staff = account.staff;
        let mut tx = self.pool.begin().await?;

        // Primary key on staff_id turns a lost allocation race into a Conflict
        sqlx::query(
            "INSERT INTO staffs (staff_id, staff_name, title, level, phone, male, address,
                                 date_birth, personal_email, manager_id, division_id, avatar_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(&staff.staff_id)
        .bind(&staff.staff_name)
        .bind(&staff.title)
        .bind(&staff.level)
        .bind(&staff.phone)
        .bind(staff.male)
        .bind(&staff.address)
        .bind(staff.date_birth)
        .bind(&staff.personal_email)
        .bind(&staff.manager_id)
        .bind(staff.division_id)
        .bind(&staff.avatar_url)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO app_users (id, email, user_name, phone_number, password_hash)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&staff.staff_id)
        .bind(&account.email)
        .bind(&account.user_name)
        .bind(&account.phone_number)
        .bind(&account.password_hash)
        .execute(&mut *tx)
        .await?;

        for role in &account.roles {
            sqlx::query("INSERT INTO user_roles (user_id, role_name) VALUES ($1, $2)")
                .bind(&staff.staff_id)
                .bind(role.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(staff)
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<AppUser>, DatabaseError> {
        let user = sqlx::query_as::<_, AppUser>(
            "SELECT id, email, user_name, phone_number, password_hash, created_at, updated_at
             FROM app_users
             WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn user_roles(&self, user_id: &str) -> Result<Vec<String>, DatabaseError> {
        let roles: Vec<String> = sqlx::query_scalar(
            "SELECT role_name FROM user_roles WHERE user_id = $1 ORDER BY role_name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    async fn update_password_hash(&self, user_id: &str, password_hash: &str) -> Result<bool, DatabaseError> {
        let updated = sqlx::query(
            "UPDATE app_users SET password_hash = $2, updated_at = now() WHERE id = $1",
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(updated.rows_affected() > 0)
    }
}

#[async_trait]
impl RequestStore for PgStore {
    async fn insert_time_request(&self, request: NewTimeChangeRequest) -> Result<TimeChangeRequest, DatabaseError> {
        let query = format!(
            "INSERT INTO time_change_requests
                 (staff_id, date, h1, m1, h2, m2, wrk_type, off, reason, evidence_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {}",
            TIME_REQUEST_COLUMNS
        );

        let stored = sqlx::query_as::<_, TimeChangeRequest>(&query)
            .bind(&request.staff_id)
            .bind(request.date)
            .bind(request.h1)
            .bind(request.m1)
            .bind(request.h2)
            .bind(request.m2)
            .bind(&request.wrk_type)
            .bind(&request.off)
            .bind(&request.reason)
            .bind(&request.evidence_url)
            .fetch_one(&self.pool)
            .await?;

        Ok(stored)
    }

    async fn list_time_requests(&self, staff_id: Option<&str>) -> Result<Vec<TimeChangeRequest>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM time_change_requests
             WHERE ($1::TEXT IS NULL OR staff_id = $1)
             ORDER BY created_at DESC, id DESC",
            TIME_REQUEST_COLUMNS
        );

        let requests = sqlx::query_as::<_, TimeChangeRequest>(&query)
            .bind(staff_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(requests)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

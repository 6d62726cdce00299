use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Sign-in identity of a staff member. `id` is the staff id; `user_name`
/// is an opaque generated handle. Never serialized: it carries the hash.
#[derive(Debug, Clone, FromRow)]
pub struct AppUser {
    pub id: String,
    pub email: Option<String>,
    pub user_name: String,
    pub phone_number: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

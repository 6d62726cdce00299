use async_trait::async_trait;

use super::manager::DatabaseError;
use super::models::{AppUser, Division, NewAccount, NewTimeChangeRequest, Staff, TimeChangeRequest};
use crate::types::AppRole;

/// Staff records and the max-identifier query used for id allocation
#[async_trait]
pub trait StaffStore: Send + Sync {
    /// Highest identifier issued under `year_prefix`, ordered by length
    /// first so that `"251000"` ranks above `"25999"`.
    async fn find_max_staff_id(&self, year_prefix: &str) -> Result<Option<String>, DatabaseError>;

    /// Fetch one staff member, with the division resolved
    async fn get_staff(&self, staff_id: &str) -> Result<Option<Staff>, DatabaseError>;

    async fn list_staff(&self) -> Result<Vec<Staff>, DatabaseError>;

    async fn find_division(&self, division_id: i32) -> Result<Option<Division>, DatabaseError>;

    /// Returns the updated record, or `None` when no such staff exists
    async fn update_avatar(&self, staff_id: &str, avatar_url: &str) -> Result<Option<Staff>, DatabaseError>;
}

/// Sign-in identities and role membership
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create any of `roles` that do not exist yet
    async fn ensure_roles(&self, roles: &[AppRole]) -> Result<(), DatabaseError>;

    /// Insert staff, user and role grants atomically.
    /// A taken staff id yields [`DatabaseError::Conflict`] and writes nothing.
    async fn insert_account(&self, account: NewAccount) -> Result<Staff, DatabaseError>;

    async fn find_user(&self, user_id: &str) -> Result<Option<AppUser>, DatabaseError>;

    async fn user_roles(&self, user_id: &str) -> Result<Vec<String>, DatabaseError>;

    /// Returns false when the user does not exist
    async fn update_password_hash(&self, user_id: &str, password_hash: &str) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn insert_time_request(&self, request: NewTimeChangeRequest) -> Result<TimeChangeRequest, DatabaseError>;

    /// Newest first; all staff when `staff_id` is `None`
    async fn list_time_requests(&self, staff_id: Option<&str>) -> Result<Vec<TimeChangeRequest>, DatabaseError>;
}

/// The full record store the service runs against
#[async_trait]
pub trait Store: StaffStore + AccountStore + RequestStore {
    async fn health_check(&self) -> Result<(), DatabaseError>;
}

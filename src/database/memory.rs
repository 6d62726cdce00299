use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::models::{AppUser, Division, NewAccount, NewTimeChangeRequest, Staff, TimeChangeRequest};
use super::store::{AccountStore, RequestStore, StaffStore, Store};
use crate::types::AppRole;

#[derive(Default)]
struct MemoryState {
    divisions: BTreeMap<i32, Division>,
    staffs: HashMap<String, Staff>,
    users: HashMap<String, AppUser>,
    roles: BTreeSet<String>,
    user_roles: HashMap<String, BTreeSet<String>>,
    requests: Vec<TimeChangeRequest>,
}

/// Process-local store with the same constraints as the PostgreSQL schema:
/// unique staff ids and user names, and references to existing divisions,
/// managers and roles. Used by `STAFF_DATABASE_BACKEND=memory` and tests.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_divisions(divisions: impl IntoIterator<Item = Division>) -> Self {
        let state = MemoryState {
            divisions: divisions.into_iter().map(|d| (d.division_id, d)).collect(),
            ..Default::default()
        };
        Self { state: RwLock::new(state) }
    }
}

fn resolve_division(state: &MemoryState, mut staff: Staff) -> Staff {
    staff.division = staff
        .division_id
        .and_then(|id| state.divisions.get(&id).cloned());
    staff
}

fn staff_order(staff: &Staff) -> (usize, &str) {
    (staff.staff_id.len(), staff.staff_id.as_str())
}

#[async_trait]
impl StaffStore for MemoryStore {
    async fn find_max_staff_id(&self, year_prefix: &str) -> Result<Option<String>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .staffs
            .values()
            .filter(|s| s.staff_id.starts_with(year_prefix))
            .max_by(|a, b| staff_order(a).cmp(&staff_order(b)))
            .map(|s| s.staff_id.clone()))
    }

    async fn get_staff(&self, staff_id: &str) -> Result<Option<Staff>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .staffs
            .get(staff_id)
            .cloned()
            .map(|s| resolve_division(&state, s)))
    }

    async fn list_staff(&self) -> Result<Vec<Staff>, DatabaseError> {
        let state = self.state.read().await;
        let mut staffs: Vec<Staff> = state
            .staffs
            .values()
            .cloned()
            .map(|s| resolve_division(&state, s))
            .collect();
        staffs.sort_by(|a, b| staff_order(a).cmp(&staff_order(b)));
        Ok(staffs)
    }

    async fn find_division(&self, division_id: i32) -> Result<Option<Division>, DatabaseError> {
        Ok(self.state.read().await.divisions.get(&division_id).cloned())
    }

    async fn update_avatar(&self, staff_id: &str, avatar_url: &str) -> Result<Option<Staff>, DatabaseError> {
        let mut state = self.state.write().await;
        let Some(staff) = state.staffs.get_mut(staff_id) else {
            return Ok(None);
        };
        staff.avatar_url = avatar_url.to_string();
        let staff = staff.clone();
        Ok(Some(resolve_division(&state, staff)))
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn ensure_roles(&self, roles: &[AppRole]) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        state.roles.extend(roles.iter().map(|r| r.as_str().to_string()));
        Ok(())
    }

    async fn insert_account(&self, account: NewAccount) -> Result<Staff, DatabaseError> {
        let mut state = self.state.write().await;
        let staff = account.staff;

        if state.staffs.contains_key(&staff.staff_id) {
            return Err(DatabaseError::Conflict(format!(
                "staff id {} already exists",
                staff.staff_id
            )));
        }
        if state.users.values().any(|u| u.user_name == account.user_name) {
            return Err(DatabaseError::Conflict(format!(
                "user name {} already exists",
                account.user_name
            )));
        }
        if let Some(division_id) = staff.division_id {
            if !state.divisions.contains_key(&division_id) {
                return Err(DatabaseError::InvalidReference(format!("division {}", division_id)));
            }
        }
        if let Some(manager_id) = &staff.manager_id {
            if !state.staffs.contains_key(manager_id) {
                return Err(DatabaseError::InvalidReference(format!("manager {}", manager_id)));
            }
        }
        if let Some(role) = account.roles.iter().find(|r| !state.roles.contains(r.as_str())) {
            return Err(DatabaseError::InvalidReference(format!("role {}", role)));
        }

        let now = Utc::now();
        state.users.insert(
            staff.staff_id.clone(),
            AppUser {
                id: staff.staff_id.clone(),
                email: account.email,
                user_name: account.user_name,
                phone_number: account.phone_number,
                password_hash: account.password_hash,
                created_at: now,
                updated_at: now,
            },
        );
        state.user_roles.insert(
            staff.staff_id.clone(),
            account.roles.iter().map(|r| r.as_str().to_string()).collect(),
        );
        state.staffs.insert(staff.staff_id.clone(), staff.clone());

        Ok(staff)
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<AppUser>, DatabaseError> {
        Ok(self.state.read().await.users.get(user_id).cloned())
    }

    async fn user_roles(&self, user_id: &str) -> Result<Vec<String>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .user_roles
            .get(user_id)
            .map(|roles| roles.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn update_password_hash(&self, user_id: &str, password_hash: &str) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        match state.users.get_mut(user_id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn insert_time_request(&self, request: NewTimeChangeRequest) -> Result<TimeChangeRequest, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.staffs.contains_key(&request.staff_id) {
            return Err(DatabaseError::InvalidReference(format!("staff {}", request.staff_id)));
        }

        let stored = TimeChangeRequest {
            id: state.requests.len() as i64 + 1,
            staff_id: request.staff_id,
            date: request.date,
            h1: request.h1,
            m1: request.m1,
            h2: request.h2,
            m2: request.m2,
            wrk_type: request.wrk_type,
            off: request.off,
            reason: request.reason,
            evidence_url: request.evidence_url,
            status: "Pending".to_string(),
            created_at: Utc::now(),
        };
        state.requests.push(stored.clone());
        Ok(stored)
    }

    async fn list_time_requests(&self, staff_id: Option<&str>) -> Result<Vec<TimeChangeRequest>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .requests
            .iter()
            .rev()
            .filter(|r| staff_id.map_or(true, |id| r.staff_id == id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_account;

    async fn store_with(ids: &[&str]) -> MemoryStore {
        let store = MemoryStore::new();
        store.ensure_roles(&AppRole::ALL).await.unwrap();
        for id in ids {
            store.insert_account(sample_account(id, "someone")).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn max_id_orders_by_length_before_text() {
        let store = store_with(&["25998", "25999", "251000"]).await;
        assert_eq!(store.find_max_staff_id("25").await.unwrap().as_deref(), Some("251000"));
    }

    #[tokio::test]
    async fn max_id_ignores_other_years() {
        let store = store_with(&["241500", "25003"]).await;
        assert_eq!(store.find_max_staff_id("25").await.unwrap().as_deref(), Some("25003"));
        assert_eq!(store.find_max_staff_id("26").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_staff_id_is_a_conflict() {
        let store = store_with(&["25001"]).await;
        let err = store
            .insert_account(sample_account("25001", "another"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
        assert_eq!(store.list_staff().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_division_is_rejected() {
        let store = store_with(&[]).await;
        let mut account = sample_account("25001", "someone");
        account.staff.division_id = Some(42);
        let err = store.insert_account(account).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidReference(_)));
    }

    #[tokio::test]
    async fn requests_are_listed_newest_first() {
        let store = store_with(&["25001", "25002"]).await;
        for staff_id in ["25001", "25002", "25001"] {
            store
                .insert_time_request(NewTimeChangeRequest {
                    staff_id: staff_id.to_string(),
                    date: chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                    h1: 8,
                    m1: 0,
                    h2: 17,
                    m2: 0,
                    wrk_type: None,
                    off: None,
                    reason: None,
                    evidence_url: None,
                })
                .await
                .unwrap();
        }

        let mine = store.list_time_requests(Some("25001")).await.unwrap();
        assert_eq!(mine.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 1]);
        assert_eq!(store.list_time_requests(None).await.unwrap().len(), 3);
    }
}

//! Fixtures shared by the unit tests

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::auth::TokenIssuer;
use crate::database::models::{NewAccount, Staff};
use crate::database::{AccountStore, MemoryStore, Store};
use crate::services::account_service::{AccountService, AccountSettings, RegisterRequest};
use crate::services::image_upload::{ImageUploader, UploadError};
use crate::services::staff_id::Clock;
use crate::types::AppRole;

/// Clock pinned to one year prefix
#[derive(Debug, Clone)]
pub struct FixedClock(String);

impl FixedClock {
    pub fn new(year_two_digit: &str) -> Self {
        Self(year_two_digit.to_string())
    }
}

impl Clock for FixedClock {
    fn current_year_two_digit(&self) -> String {
        self.0.clone()
    }
}

/// Uploader that keeps every upload in memory and answers with a fake URL
#[derive(Default)]
pub struct RecordingUploader {
    uploads: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingUploader {
    pub async fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        self.uploads.lock().await.clone()
    }
}

#[async_trait]
impl ImageUploader for RecordingUploader {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, UploadError> {
        self.uploads.lock().await.push((file_name.to_string(), bytes));
        Ok(format!("https://images.test/{}", file_name))
    }
}

pub const TEST_SECRET: &str = "test-secret";

pub fn test_tokens() -> TokenIssuer {
    TokenIssuer::new(TEST_SECRET, "staff-management-api", 1)
}

pub fn test_settings() -> AccountSettings {
    AccountSettings {
        bcrypt_cost: 4,
        default_avatar_url: "https://avatars.test/default.jpg".to_string(),
        id_allocation_attempts: 10,
    }
}

/// Account service over `store` with the clock fixed to `year`
pub fn test_account_service(store: MemoryStore, year: &str) -> (AccountService, Arc<dyn Store>) {
    let store: Arc<dyn Store> = Arc::new(store);
    let service = AccountService::new(
        store.clone(),
        Arc::new(FixedClock::new(year)),
        Arc::new(test_tokens()),
        test_settings(),
    );
    (service, store)
}

pub fn register_request(full_name: &str, roles: &str) -> RegisterRequest {
    RegisterRequest {
        full_name: full_name.to_string(),
        title: Some("Engineer".to_string()),
        level: Some("Junior".to_string()),
        phone: Some("0123456789".to_string()),
        male: true,
        address: None,
        date_birth: None,
        personal_email: Some(format!("{}@example.com", full_name.to_lowercase().replace(' ', "."))),
        manager_id: None,
        division_id: None,
        password: "password123".to_string(),
        roles: roles.to_string(),
    }
}

/// Minimal account row with a placeholder hash, for store-level tests
pub fn sample_account(staff_id: &str, name: &str) -> NewAccount {
    NewAccount {
        staff: Staff {
            staff_id: staff_id.to_string(),
            staff_name: name.to_string(),
            title: None,
            level: None,
            phone: None,
            male: false,
            address: None,
            date_birth: None,
            personal_email: None,
            manager_id: None,
            division_id: None,
            avatar_url: "https://avatars.test/default.jpg".to_string(),
            division: None,
        },
        user_name: format!("user-{}", staff_id),
        email: None,
        phone_number: None,
        password_hash: "$2b$04$placeholder".to_string(),
        roles: vec![AppRole::Staff],
    }
}

/// In-memory store holding one account per id
pub async fn seeded_store(staff_ids: &[&str]) -> Arc<dyn Store> {
    let store = MemoryStore::new();
    store.ensure_roles(&AppRole::ALL).await.expect("roles");
    for id in staff_ids {
        store
            .insert_account(sample_account(id, &format!("staff {}", id)))
            .await
            .expect("seed account");
    }
    Arc::new(store)
}

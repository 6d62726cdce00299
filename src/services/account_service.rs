use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{hash_password, verify_password, JwtError, TokenIssuer};
use crate::config::AppConfig;
use crate::database::models::{NewAccount, NewStaff, Staff};
use crate::database::{DatabaseError, Store};
use crate::services::staff_id::{with_allocated_id, Clock};
use crate::types::{AppRole, UnknownRole};

/// Result of a credential check. Callers must handle every case.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome<T> {
    NotFound,
    InvalidCredential,
    Success(T),
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Token(#[from] JwtError),
}

impl From<UnknownRole> for AccountError {
    fn from(err: UnknownRole) -> Self {
        AccountError::Validation(err.to_string())
    }
}

/// Who files a registration. Only personnel may grant roles beyond `Staff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registrar {
    SelfService,
    Personnel,
}

/// Registration form submitted by HR
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub title: Option<String>,
    pub level: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub male: bool,
    pub address: Option<String>,
    pub date_birth: Option<NaiveDate>,
    pub personal_email: Option<String>,
    #[serde(rename = "managerID")]
    pub manager_id: Option<String>,
    #[serde(rename = "divisionID")]
    pub division_id: Option<i32>,
    pub password: String,
    /// `_`-separated role names, e.g. `"Staff_HRStaff"`
    #[serde(default)]
    pub roles: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub access_token: String,
    pub expires_in: u64,
    pub roles: Vec<String>,
    pub staff: Option<Staff>,
}

/// Settings the account flows need from [`AppConfig`]
#[derive(Debug, Clone)]
pub struct AccountSettings {
    pub bcrypt_cost: u32,
    pub default_avatar_url: String,
    pub id_allocation_attempts: u32,
}

impl AccountSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            bcrypt_cost: config.security.bcrypt_cost,
            default_avatar_url: config.staff.default_avatar_url.clone(),
            id_allocation_attempts: config.staff.id_allocation_attempts,
        }
    }
}

pub struct AccountService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    tokens: Arc<TokenIssuer>,
    settings: AccountSettings,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
        tokens: Arc<TokenIssuer>,
        settings: AccountSettings,
    ) -> Self {
        Self {
            store,
            clock,
            tokens,
            settings,
        }
    }

    /// Create the staff record and its sign-in account under a freshly allocated id
    pub async fn register(
        &self,
        request: RegisterRequest,
        registrar: Registrar,
    ) -> Result<Staff, AccountError> {
        let full_name = request.full_name.trim();
        if full_name.is_empty() {
            return Err(AccountError::Validation("fullName is required".to_string()));
        }
        if request.password.is_empty() {
            return Err(AccountError::Validation("password is required".to_string()));
        }
        let roles = AppRole::parse_list(&request.roles)?;
        if registrar == Registrar::SelfService {
            if let Some(role) = roles.iter().find(|r| **r != AppRole::Staff) {
                return Err(AccountError::Forbidden(format!(
                    "Granting the {} role requires a personnel account",
                    role
                )));
            }
        }

        self.store.ensure_roles(&AppRole::ALL).await?;

        let division = match request.division_id {
            Some(division_id) => Some(self.store.find_division(division_id).await?.ok_or_else(|| {
                AccountError::Validation(format!("Division {} does not exist", division_id))
            })?),
            None => None,
        };

        let password_hash = hash_password(request.password.clone(), self.settings.bcrypt_cost).await?;

        let new_staff = NewStaff {
            staff_name: full_name.to_string(),
            title: request.title,
            level: request.level,
            phone: request.phone.clone(),
            male: request.male,
            address: request.address,
            date_birth: request.date_birth,
            personal_email: request.personal_email.clone(),
            manager_id: request.manager_id.filter(|m| !m.trim().is_empty()),
            division,
            avatar_url: self.settings.default_avatar_url.clone(),
        };

        let store = self.store.as_ref();
        let staff = with_allocated_id(
            store,
            self.clock.as_ref(),
            self.settings.id_allocation_attempts,
            |staff_id| {
                let account = NewAccount {
                    staff: new_staff.clone().with_id(staff_id),
                    user_name: Uuid::new_v4().to_string(),
                    email: request.personal_email.clone(),
                    phone_number: request.phone.clone(),
                    password_hash: password_hash.clone(),
                    roles: roles.clone(),
                };
                store.insert_account(account)
            },
        )
        .await?;

        tracing::info!(
            "Registered staff {} ({}) with roles {:?}",
            staff.staff_id,
            staff.staff_name,
            roles
        );
        Ok(staff)
    }

    /// Create the first administrator when the store holds no staff yet.
    /// Returns `None` when staff already exist.
    pub async fn bootstrap_admin(&self, password: &str) -> Result<Option<Staff>, AccountError> {
        if !self.store.list_staff().await?.is_empty() {
            return Ok(None);
        }

        let request = RegisterRequest {
            full_name: "Administrator".to_string(),
            title: None,
            level: None,
            phone: None,
            male: false,
            address: None,
            date_birth: None,
            personal_email: None,
            manager_id: None,
            division_id: None,
            password: password.to_string(),
            roles: "Admin_Staff".to_string(),
        };
        let admin = self.register(request, Registrar::Personnel).await?;
        tracing::info!("Bootstrapped administrator account {}", admin.staff_id);
        Ok(Some(admin))
    }

    pub async fn sign_in(&self, request: SignInRequest) -> Result<AuthOutcome<SignInResponse>, AccountError> {
        let Some(user) = self.store.find_user(&request.user_id).await? else {
            tracing::warn!("Sign-in rejected: unknown user {}", request.user_id);
            return Ok(AuthOutcome::NotFound);
        };

        if !verify_password(request.password, user.password_hash).await {
            tracing::warn!("Sign-in rejected: bad password for {}", user.id);
            return Ok(AuthOutcome::InvalidCredential);
        }

        let roles = self.store.user_roles(&user.id).await?;
        let access_token = self.tokens.issue(&user.id, &roles)?;
        let staff = self.store.get_staff(&user.id).await?;

        tracing::info!("Staff {} signed in", user.id);
        Ok(AuthOutcome::Success(SignInResponse {
            access_token,
            expires_in: self.tokens.expires_in_secs(),
            roles,
            staff,
        }))
    }

    /// Replace the password hash once the old password verifies
    pub async fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<AuthOutcome<()>, AccountError> {
        if new_password.is_empty() {
            return Err(AccountError::Validation("newPassword is required".to_string()));
        }

        let Some(user) = self.store.find_user(user_id).await? else {
            return Ok(AuthOutcome::NotFound);
        };

        if !verify_password(old_password.to_string(), user.password_hash).await {
            tracing::warn!("Password change rejected for {}: old password mismatch", user_id);
            return Ok(AuthOutcome::InvalidCredential);
        }

        let new_hash = hash_password(new_password.to_string(), self.settings.bcrypt_cost).await?;
        if !self.store.update_password_hash(user_id, &new_hash).await? {
            return Ok(AuthOutcome::NotFound);
        }

        tracing::info!("Password changed for {}", user_id);
        Ok(AuthOutcome::Success(()))
    }
}

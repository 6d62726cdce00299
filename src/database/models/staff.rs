use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Division;
use crate::types::AppRole;

/// A staff record as exposed to the front-end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    #[serde(rename = "staffID")]
    pub staff_id: String,
    pub staff_name: String,
    pub title: Option<String>,
    pub level: Option<String>,
    pub phone: Option<String>,
    pub male: bool,
    pub address: Option<String>,
    pub date_birth: Option<NaiveDate>,
    pub personal_email: Option<String>,
    #[serde(rename = "managerID")]
    pub manager_id: Option<String>,
    #[serde(rename = "divisionID")]
    pub division_id: Option<i32>,
    #[serde(rename = "avatarURL")]
    pub avatar_url: String,
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub division: Option<Division>,
}

/// Staff fields known before an id has been allocated
#[derive(Debug, Clone)]
pub struct NewStaff {
    pub staff_name: String,
    pub title: Option<String>,
    pub level: Option<String>,
    pub phone: Option<String>,
    pub male: bool,
    pub address: Option<String>,
    pub date_birth: Option<NaiveDate>,
    pub personal_email: Option<String>,
    pub manager_id: Option<String>,
    pub division: Option<Division>,
    pub avatar_url: String,
}

impl NewStaff {
    pub fn with_id(self, staff_id: String) -> Staff {
        Staff {
            staff_id,
            staff_name: self.staff_name,
            title: self.title,
            level: self.level,
            phone: self.phone,
            male: self.male,
            address: self.address,
            date_birth: self.date_birth,
            personal_email: self.personal_email,
            manager_id: self.manager_id,
            division_id: self.division.as_ref().map(|d| d.division_id),
            avatar_url: self.avatar_url,
            division: self.division,
        }
    }
}

/// Everything written when a staff member registers: the staff row, the
/// sign-in identity sharing its id, and the granted roles.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub staff: Staff,
    pub user_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub password_hash: String,
    pub roles: Vec<AppRole>,
}

//! Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles a staff account can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AppRole {
    Admin,
    Staff,
    #[serde(rename = "CEO")]
    Ceo,
    Accountant,
    #[serde(rename = "HRManager")]
    HrManager,
    #[serde(rename = "HRStaff")]
    HrStaff,
    DivisionManager,
}

impl AppRole {
    pub const ALL: [AppRole; 7] = [
        AppRole::Admin,
        AppRole::Staff,
        AppRole::Ceo,
        AppRole::Accountant,
        AppRole::HrManager,
        AppRole::HrStaff,
        AppRole::DivisionManager,
    ];

    /// Roles allowed to act on other staff members' records
    pub const PERSONNEL: [AppRole; 3] = [AppRole::Admin, AppRole::HrManager, AppRole::HrStaff];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppRole::Admin => "Admin",
            AppRole::Staff => "Staff",
            AppRole::Ceo => "CEO",
            AppRole::Accountant => "Accountant",
            AppRole::HrManager => "HRManager",
            AppRole::HrStaff => "HRStaff",
            AppRole::DivisionManager => "DivisionManager",
        }
    }

    /// Parse the `_`-separated role list used by the registration form, e.g. `"Staff_HRStaff"`.
    /// Blank segments are skipped; duplicates collapse.
    pub fn parse_list(roles: &str) -> Result<Vec<AppRole>, UnknownRole> {
        let mut parsed = Vec::new();
        for piece in roles.split('_').map(str::trim).filter(|p| !p.is_empty()) {
            let role = piece.parse::<AppRole>()?;
            if !parsed.contains(&role) {
                parsed.push(role);
            }
        }
        Ok(parsed)
    }
}

impl fmt::Display for AppRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for AppRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

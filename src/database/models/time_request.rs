use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored time-change request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimeChangeRequest {
    pub id: i64,
    #[serde(rename = "staffID")]
    pub staff_id: String,
    pub date: NaiveDate,
    pub h1: i32,
    pub m1: i32,
    pub h2: i32,
    pub m2: i32,
    pub wrk_type: Option<String>,
    pub off: Option<String>,
    pub reason: Option<String>,
    #[serde(rename = "evidenceURL")]
    pub evidence_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// A validated request ready to be persisted
#[derive(Debug, Clone)]
pub struct NewTimeChangeRequest {
    pub staff_id: String,
    pub date: NaiveDate,
    pub h1: i32,
    pub m1: i32,
    pub h2: i32,
    pub m2: i32,
    pub wrk_type: Option<String>,
    pub off: Option<String>,
    pub reason: Option<String>,
    pub evidence_url: Option<String>,
}

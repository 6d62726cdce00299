use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Division {
    #[serde(rename = "divisionID")]
    pub division_id: i32,
    pub division_name: String,
}

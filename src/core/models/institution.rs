use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Institution {
    pub id: Uuid,
    pub institution_id: String,
    pub institution_name: String,
    pub email: Option<String>,
    pub landline: Option<String>,
    pub head_contact: Option<String>,
    pub bursar_contact: Option<String>,
    pub branch: Option<String>,
    pub total_members: i64,
    pub total_works_council: i64,
    pub total_works_committee: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstitutionInsert {
    pub institution_id: String,
    pub institution_name: String,
    pub email: Option<String>,
    pub landline: Option<String>,
    pub head_contact: Option<String>,
    pub bursar_contact: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstitutionUpdate {
    pub institution_name: String,
    pub email: Option<String>,
    pub landline: Option<String>,
    pub head_contact: Option<String>,
    pub bursar_contact: Option<String>,
    pub branch: Option<String>,
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "member_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Retired,
    Unknown,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Member {
    pub id: Uuid,
    pub member_id: String,
    pub institution_id: Uuid,
    pub full_name: String,
    pub national_id: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub job_title: Option<String>,
    pub date_joined: Option<NaiveDate>,
    pub grade: Option<String>,
    pub contact_number: Option<String>,
    pub position_in_union: Option<String>,
    pub branch: Option<String>,
    pub status: MemberStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// The demographic/employment attribute set shared by membership requests and
// member records; copied verbatim from a request onto the member it becomes.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberAttributes {
    pub full_name: String,
    pub national_id: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub job_title: Option<String>,
    pub date_joined: Option<NaiveDate>,
    pub grade: Option<String>,
    pub contact_number: Option<String>,
    pub position_in_union: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MemberInsert {
    pub id: Uuid,
    pub member_id: String,
    pub institution_id: Uuid,
    pub full_name: String,
    pub national_id: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub job_title: Option<String>,
    pub date_joined: Option<NaiveDate>,
    pub grade: Option<String>,
    pub contact_number: Option<String>,
    pub position_in_union: Option<String>,
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberUpdate {
    pub full_name: String,
    pub national_id: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub job_title: Option<String>,
    pub date_joined: Option<NaiveDate>,
    pub grade: Option<String>,
    pub contact_number: Option<String>,
    pub position_in_union: Option<String>,
    pub branch: Option<String>,
    pub status: MemberStatus,
}

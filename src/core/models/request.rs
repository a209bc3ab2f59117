use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MembershipRequest {
    pub id: Uuid,
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
    pub status: RequestStatus,
    pub assigned_member_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RequestInsert {
    pub institution_id: Uuid,
    pub attributes: super::member::MemberAttributes,
}

#[derive(Debug, Clone)]
pub struct RequestStatusUpdate {
    pub status: RequestStatus,
    pub assigned_member_id: Option<String>,
}

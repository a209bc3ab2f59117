use actix_web::web::{Data, Json, Path};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{query_as, query_scalar, FromRow, PgPool};
use uuid::Uuid;

use crate::context::UserInfo;
use crate::core::models::member::{Member, MemberAttributes};
use crate::core::models::profile::Role;
use crate::core::models::request::{MembershipRequest, RequestStatus};
use crate::core::services::enrollment;
use crate::database::sqlx::PgStore;
use crate::error::Error;
use crate::impls::directory::pg::PgDirectory;
use crate::response::List;
use crate::serde::{Deserialize, Serialize};
use crate::OrgConfig;

use super::require_role;

pub async fn submit(user_info: UserInfo, Json(attributes): Json<MemberAttributes>, db: Data<PgPool>) -> Result<Json<MembershipRequest>, Error> {
    require_role(&user_info, Role::Institution)?;
    let mut storer = PgStore::new(db.acquire().await?);
    let request = enrollment::submit_request(&mut storer, user_info.id, attributes).await?;
    Ok(Json(request))
}

pub async fn own_pending(user_info: UserInfo, db: Data<PgPool>) -> Result<Json<List<MembershipRequest>>, Error> {
    require_role(&user_info, Role::Institution)?;
    let mut conn = db.acquire().await?;
    let total: i64 = query_scalar("SELECT COUNT(*) FROM member_requests WHERE institution_id = $1 AND status = $2")
        .bind(user_info.id)
        .bind(RequestStatus::Pending)
        .fetch_one(&mut conn)
        .await?;
    let requests: Vec<MembershipRequest> = query_as(
        "
    SELECT *
    FROM member_requests
    WHERE institution_id = $1 AND status = $2
    ORDER BY created_at DESC",
    )
    .bind(user_info.id)
    .bind(RequestStatus::Pending)
    .fetch_all(&mut conn)
    .await?;
    Ok(Json(List::new(requests, total)))
}

#[derive(Debug, Serialize, FromRow)]
pub struct PendingRequestItem {
    id: Uuid,
    institution_id: Uuid,
    institution_name: String,
    institution_code: String,
    full_name: String,
    national_id: Option<String>,
    date_of_birth: Option<NaiveDate>,
    gender: Option<String>,
    job_title: Option<String>,
    date_joined: Option<NaiveDate>,
    grade: Option<String>,
    contact_number: Option<String>,
    position_in_union: Option<String>,
    branch: Option<String>,
    created_at: DateTime<Utc>,
}

// The admin queue: oldest first, with the institution spelled out.
pub async fn pending(user_info: UserInfo, db: Data<PgPool>) -> Result<Json<List<PendingRequestItem>>, Error> {
    require_role(&user_info, Role::Admin)?;
    let mut conn = db.acquire().await?;
    let total: i64 = query_scalar("SELECT COUNT(*) FROM member_requests WHERE status = $1")
        .bind(RequestStatus::Pending)
        .fetch_one(&mut conn)
        .await?;
    let requests: Vec<PendingRequestItem> = query_as(
        "
    SELECT
        r.id,
        r.institution_id,
        i.institution_name,
        i.institution_id AS institution_code,
        r.full_name,
        r.national_id,
        r.date_of_birth,
        r.gender,
        r.job_title,
        r.date_joined,
        r.grade,
        r.contact_number,
        r.position_in_union,
        r.branch,
        r.created_at
    FROM member_requests AS r
    JOIN institutions AS i ON r.institution_id = i.id
    WHERE r.status = $1
    ORDER BY r.created_at",
    )
    .bind(RequestStatus::Pending)
    .fetch_all(&mut conn)
    .await?;
    Ok(Json(List::new(requests, total)))
}

#[derive(Debug, Serialize)]
pub struct NextMemberId {
    next_member_id: String,
}

pub async fn next_id(user_info: UserInfo, db: Data<PgPool>, config: Data<OrgConfig>) -> Result<Json<NextMemberId>, Error> {
    require_role(&user_info, Role::Admin)?;
    let mut storer = PgStore::new(db.acquire().await?);
    let next_member_id = enrollment::next_member_id(&mut storer, &config.member_prefix).await;
    Ok(Json(NextMemberId { next_member_id }))
}

#[derive(Debug, Deserialize)]
pub struct Approval {
    pub member_id: String,
}

pub async fn approve(
    user_info: UserInfo,
    request_id: Path<(Uuid,)>,
    Json(approval): Json<Approval>,
    db: Data<PgPool>,
    config: Data<OrgConfig>,
) -> Result<Json<Member>, Error> {
    require_role(&user_info, Role::Admin)?;
    let request_id = request_id.into_inner().0;
    let tx = PgStore::new(db.begin().await?);
    let mut directory = PgDirectory::new(db.get_ref().clone());
    let member = enrollment::approve_request(tx, &mut directory, &config.domain, request_id, &approval.member_id).await?;
    Ok(Json(member))
}

pub async fn reject(user_info: UserInfo, request_id: Path<(Uuid,)>, db: Data<PgPool>) -> Result<Json<()>, Error> {
    require_role(&user_info, Role::Admin)?;
    let request_id = request_id.into_inner().0;
    let mut storer = PgStore::new(db.acquire().await?);
    enrollment::reject_request(&mut storer, request_id).await?;
    Ok(Json(()))
}

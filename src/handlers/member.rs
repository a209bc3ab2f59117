use actix_web::web::{Data, Json, Path, Query};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{query, query_as, query_scalar, FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::context::UserInfo;
use crate::core::models::member::{Member, MemberAttributes, MemberStatus, MemberUpdate};
use crate::core::models::profile::Role;
use crate::core::services::member::{create_member, delete_member};
use crate::database::sqlx::PgStore;
use crate::error::Error;
use crate::impls::directory::pg::PgDirectory;
use crate::request::Pagination;
use crate::response::{DeleteResponse, List, UpdateResponse};
use crate::serde::{Deserialize, Serialize};
use crate::OrgConfig;

use super::{require_institution_scope, require_role};

#[derive(Debug, Deserialize)]
pub struct MemberSearch {
    pub name: Option<String>,
    pub job_title: Option<String>,
    pub grade: Option<String>,
    pub branch: Option<String>,
    pub institution: Option<String>,
}

fn push_member_filters(stmt: &mut QueryBuilder<Postgres>, param: &MemberSearch) {
    if let Some(name) = &param.name {
        stmt.push(" AND m.full_name ILIKE ").push_bind(format!("%{}%", name));
    }
    if let Some(job_title) = &param.job_title {
        stmt.push(" AND m.job_title ILIKE ").push_bind(format!("%{}%", job_title));
    }
    if let Some(grade) = &param.grade {
        stmt.push(" AND m.grade ILIKE ").push_bind(format!("%{}%", grade));
    }
    if let Some(branch) = &param.branch {
        stmt.push(" AND m.branch = ").push_bind(branch.clone());
    }
    if let Some(institution) = &param.institution {
        stmt.push(" AND i.institution_name ILIKE ").push_bind(format!("%{}%", institution));
    }
}

#[derive(Debug, Serialize, FromRow)]
pub struct MemberItem {
    id: Uuid,
    member_id: String,
    full_name: String,
    institution_name: String,
    job_title: Option<String>,
    grade: Option<String>,
    branch: Option<String>,
    status: MemberStatus,
}

pub async fn list(
    user_info: UserInfo,
    Query(param): Query<MemberSearch>,
    Query(Pagination { page, size }): Query<Pagination>,
    db: Data<PgPool>,
) -> Result<Json<List<MemberItem>>, Error> {
    require_role(&user_info, Role::Admin)?;
    let mut conn = db.acquire().await?;
    let mut count_stmt = QueryBuilder::new(
        "
    SELECT COUNT(*)
    FROM members AS m
    JOIN institutions AS i ON m.institution_id = i.id
    WHERE 1 = 1",
    );
    push_member_filters(&mut count_stmt, &param);
    let (total,): (i64,) = count_stmt.build_query_as().fetch_one(&mut conn).await?;

    let mut stmt = QueryBuilder::new(
        "
    SELECT m.id, m.member_id, m.full_name, i.institution_name, m.job_title, m.grade, m.branch, m.status
    FROM members AS m
    JOIN institutions AS i ON m.institution_id = i.id
    WHERE 1 = 1",
    );
    push_member_filters(&mut stmt, &param);
    stmt.push(" ORDER BY m.full_name LIMIT ").push_bind(size);
    stmt.push(" OFFSET ").push_bind((page - 1) * size);
    let members = stmt.build_query_as().fetch_all(&mut conn).await?;
    Ok(Json(List::new(members, total)))
}

#[derive(Debug, Serialize, FromRow)]
pub struct MemberProfile {
    id: Uuid,
    member_id: String,
    institution_id: Uuid,
    institution_name: String,
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
    status: MemberStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

async fn fetch_profile(db: &PgPool, id: Uuid) -> Result<MemberProfile, Error> {
    let mut conn = db.acquire().await?;
    let profile = query_as(
        "
    SELECT m.*, i.institution_name
    FROM members AS m
    JOIN institutions AS i ON m.institution_id = i.id
    WHERE m.id = $1",
    )
    .bind(id)
    .fetch_one(&mut conn)
    .await?;
    Ok(profile)
}

fn ensure_member_access(user_info: &UserInfo, member_id: Uuid, institution_id: Uuid) -> Result<(), Error> {
    match user_info.role {
        Role::Admin => Ok(()),
        Role::Institution if user_info.id == institution_id => Ok(()),
        Role::Member if user_info.id == member_id => Ok(()),
        _ => Err(Error::Unauthorized("no permission for this member".into())),
    }
}

pub async fn detail(user_info: UserInfo, member_id: Path<(Uuid,)>, db: Data<PgPool>) -> Result<Json<MemberProfile>, Error> {
    let member_id = member_id.into_inner().0;
    let profile = fetch_profile(&db, member_id).await?;
    ensure_member_access(&user_info, profile.id, profile.institution_id)?;
    Ok(Json(profile))
}

pub async fn me(user_info: UserInfo, db: Data<PgPool>) -> Result<Json<MemberProfile>, Error> {
    require_role(&user_info, Role::Member)?;
    let profile = fetch_profile(&db, user_info.id).await?;
    Ok(Json(profile))
}

// What a member may change about themselves; status and union position stay
// in the hands of the admin and the institution.
#[derive(Debug, Deserialize)]
pub struct MemberSelfUpdate {
    pub full_name: String,
    pub national_id: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub job_title: Option<String>,
    pub date_joined: Option<NaiveDate>,
    pub grade: Option<String>,
    pub contact_number: Option<String>,
    pub branch: Option<String>,
}

pub async fn update_me(user_info: UserInfo, Json(data): Json<MemberSelfUpdate>, db: Data<PgPool>) -> Result<Json<UpdateResponse>, Error> {
    require_role(&user_info, Role::Member)?;
    if data.full_name.trim().is_empty() {
        return Err(Error::Validation("full name is required".into()));
    }
    let mut conn = db.acquire().await?;
    let done = query(
        "
    UPDATE members
    SET full_name = $1, national_id = $2, date_of_birth = $3, gender = $4, job_title = $5, date_joined = $6, grade = $7, contact_number = $8, branch = $9, updated_at = now()
    WHERE id = $10",
    )
    .bind(data.full_name)
    .bind(data.national_id)
    .bind(data.date_of_birth)
    .bind(data.gender)
    .bind(data.job_title)
    .bind(data.date_joined)
    .bind(data.grade)
    .bind(data.contact_number)
    .bind(data.branch)
    .bind(user_info.id)
    .execute(&mut conn)
    .await?;
    Ok(Json(UpdateResponse::new(done.rows_affected() as usize)))
}

pub async fn update(user_info: UserInfo, member_id: Path<(Uuid,)>, Json(data): Json<MemberUpdate>, db: Data<PgPool>) -> Result<Json<UpdateResponse>, Error> {
    let member_id = member_id.into_inner().0;
    if data.full_name.trim().is_empty() {
        return Err(Error::Validation("full name is required".into()));
    }
    let mut conn = db.acquire().await?;
    let institution_id: Option<Uuid> = query_scalar("SELECT institution_id FROM members WHERE id = $1")
        .bind(member_id)
        .fetch_optional(&mut conn)
        .await?;
    let institution_id = institution_id.ok_or_else(|| Error::NotFound("member does not exist".into()))?;
    require_institution_scope(&user_info, institution_id)?;
    let done = query(
        "
    UPDATE members
    SET full_name = $1, national_id = $2, date_of_birth = $3, gender = $4, job_title = $5, date_joined = $6, grade = $7, contact_number = $8, position_in_union = $9, branch = $10, status = $11, updated_at = now()
    WHERE id = $12",
    )
    .bind(data.full_name)
    .bind(data.national_id)
    .bind(data.date_of_birth)
    .bind(data.gender)
    .bind(data.job_title)
    .bind(data.date_joined)
    .bind(data.grade)
    .bind(data.contact_number)
    .bind(data.position_in_union)
    .bind(data.branch)
    .bind(data.status)
    .bind(member_id)
    .execute(&mut conn)
    .await?;
    Ok(Json(UpdateResponse::new(done.rows_affected() as usize)))
}

#[derive(Debug, Deserialize)]
pub struct MemberCreation {
    pub institution_id: Uuid,
    pub member_id: String,
    #[serde(flatten)]
    pub attributes: MemberAttributes,
}

pub async fn create(user_info: UserInfo, Json(data): Json<MemberCreation>, db: Data<PgPool>, config: Data<OrgConfig>) -> Result<Json<Member>, Error> {
    require_role(&user_info, Role::Admin)?;
    let tx = PgStore::new(db.begin().await?);
    let mut directory = PgDirectory::new(db.get_ref().clone());
    let member = create_member(tx, &mut directory, &config.domain, data.institution_id, &data.member_id, data.attributes).await?;
    Ok(Json(member))
}

pub async fn remove(user_info: UserInfo, member_id: Path<(Uuid,)>, db: Data<PgPool>) -> Result<Json<DeleteResponse>, Error> {
    require_role(&user_info, Role::Admin)?;
    let member_id = member_id.into_inner().0;
    let mut storer = PgStore::new(db.acquire().await?);
    let mut directory = PgDirectory::new(db.get_ref().clone());
    delete_member(&mut storer, &mut directory, member_id).await?;
    Ok(Json(DeleteResponse::new(1)))
}

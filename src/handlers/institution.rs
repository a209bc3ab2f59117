use actix_web::web::{Data, Json, Path, Query};
use sqlx::{query, query_as, query_scalar, FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::context::UserInfo;
use crate::core::models::institution::{Institution, InstitutionInsert, InstitutionUpdate};
use crate::core::models::member::Member;
use crate::core::models::profile::Role;
use crate::core::services::institution::{create_institution, delete_institution};
use crate::database::sqlx::PgStore;
use crate::error::Error;
use crate::impls::directory::pg::PgDirectory;
use crate::request::Pagination;
use crate::response::{DeleteResponse, List, UpdateResponse};
use crate::serde::{Deserialize, Serialize};
use crate::OrgConfig;

use super::{require_institution_scope, require_role};

#[derive(Debug, Deserialize)]
pub struct InstitutionSearch {
    pub name: Option<String>,
    pub branch: Option<String>,
}

fn push_institution_filters(stmt: &mut QueryBuilder<Postgres>, param: &InstitutionSearch) {
    if let Some(name) = &param.name {
        stmt.push(" AND i.institution_name ILIKE ").push_bind(format!("%{}%", name));
    }
    if let Some(branch) = &param.branch {
        stmt.push(" AND i.branch = ").push_bind(branch.clone());
    }
}

#[derive(Debug, Serialize, FromRow)]
pub struct InstitutionItem {
    id: Uuid,
    institution_id: String,
    institution_name: String,
    email: Option<String>,
    branch: Option<String>,
    member_count: i64,
}

pub async fn list(
    user_info: UserInfo,
    Query(param): Query<InstitutionSearch>,
    Query(Pagination { page, size }): Query<Pagination>,
    db: Data<PgPool>,
) -> Result<Json<List<InstitutionItem>>, Error> {
    require_role(&user_info, Role::Admin)?;
    let mut conn = db.acquire().await?;
    let mut count_stmt = QueryBuilder::new("SELECT COUNT(*) FROM institutions AS i WHERE 1 = 1");
    push_institution_filters(&mut count_stmt, &param);
    let (total,): (i64,) = count_stmt.build_query_as().fetch_one(&mut conn).await?;

    let mut stmt = QueryBuilder::new(
        "
    SELECT i.id, i.institution_id, i.institution_name, i.email, i.branch, COUNT(m.id) AS member_count
    FROM institutions AS i
    LEFT JOIN members AS m ON i.id = m.institution_id
    WHERE 1 = 1",
    );
    push_institution_filters(&mut stmt, &param);
    stmt.push(" GROUP BY i.id, i.institution_id, i.institution_name, i.email, i.branch");
    stmt.push(" ORDER BY i.institution_name LIMIT ").push_bind(size);
    stmt.push(" OFFSET ").push_bind((page - 1) * size);
    let institutions = stmt.build_query_as().fetch_all(&mut conn).await?;
    Ok(Json(List::new(institutions, total)))
}

pub async fn create(user_info: UserInfo, Json(data): Json<InstitutionInsert>, db: Data<PgPool>, config: Data<OrgConfig>) -> Result<Json<Institution>, Error> {
    require_role(&user_info, Role::Admin)?;
    let tx = PgStore::new(db.begin().await?);
    let mut directory = PgDirectory::new(db.get_ref().clone());
    let institution = create_institution(tx, &mut directory, &config.domain, data).await?;
    Ok(Json(institution))
}

pub async fn detail(user_info: UserInfo, institution_id: Path<(Uuid,)>, db: Data<PgPool>) -> Result<Json<Institution>, Error> {
    let institution_id = institution_id.into_inner().0;
    require_institution_scope(&user_info, institution_id)?;
    let mut conn = db.acquire().await?;
    let institution = query_as("SELECT * FROM institutions WHERE id = $1").bind(institution_id).fetch_one(&mut conn).await?;
    Ok(Json(institution))
}

pub async fn update(user_info: UserInfo, institution_id: Path<(Uuid,)>, Json(data): Json<InstitutionUpdate>, db: Data<PgPool>) -> Result<Json<UpdateResponse>, Error> {
    let institution_id = institution_id.into_inner().0;
    require_institution_scope(&user_info, institution_id)?;
    if data.institution_name.trim().is_empty() {
        return Err(Error::Validation("institution name is required".into()));
    }
    let mut conn = db.acquire().await?;
    let done = query(
        "
    UPDATE institutions
    SET institution_name = $1, email = $2, landline = $3, head_contact = $4, bursar_contact = $5, branch = $6, updated_at = now()
    WHERE id = $7",
    )
    .bind(data.institution_name)
    .bind(data.email)
    .bind(data.landline)
    .bind(data.head_contact)
    .bind(data.bursar_contact)
    .bind(data.branch)
    .bind(institution_id)
    .execute(&mut conn)
    .await?;
    if done.rows_affected() == 0 {
        return Err(Error::NotFound("institution does not exist".into()));
    }
    Ok(Json(UpdateResponse::new(done.rows_affected() as usize)))
}

pub async fn remove(user_info: UserInfo, institution_id: Path<(Uuid,)>, db: Data<PgPool>) -> Result<Json<DeleteResponse>, Error> {
    require_role(&user_info, Role::Admin)?;
    let institution_id = institution_id.into_inner().0;
    let mut storer = PgStore::new(db.acquire().await?);
    let mut directory = PgDirectory::new(db.get_ref().clone());
    delete_institution(&mut storer, &mut directory, institution_id).await?;
    Ok(Json(DeleteResponse::new(1)))
}

#[derive(Debug, Deserialize)]
pub struct InstitutionMemberSearch {
    pub name: Option<String>,
    pub grade: Option<String>,
    pub job_title: Option<String>,
}

pub async fn members(
    user_info: UserInfo,
    institution_id: Path<(Uuid,)>,
    Query(param): Query<InstitutionMemberSearch>,
    db: Data<PgPool>,
) -> Result<Json<List<Member>>, Error> {
    let institution_id = institution_id.into_inner().0;
    require_institution_scope(&user_info, institution_id)?;
    let mut conn = db.acquire().await?;
    let total: i64 = query_scalar("SELECT COUNT(*) FROM members WHERE institution_id = $1")
        .bind(institution_id)
        .fetch_one(&mut conn)
        .await?;
    let mut stmt = QueryBuilder::new("SELECT * FROM members AS m WHERE m.institution_id = ");
    stmt.push_bind(institution_id);
    if let Some(name) = &param.name {
        stmt.push(" AND m.full_name ILIKE ").push_bind(format!("%{}%", name));
    }
    if let Some(grade) = &param.grade {
        stmt.push(" AND m.grade ILIKE ").push_bind(format!("%{}%", grade));
    }
    if let Some(job_title) = &param.job_title {
        stmt.push(" AND m.job_title ILIKE ").push_bind(format!("%{}%", job_title));
    }
    stmt.push(" ORDER BY m.full_name");
    let members = stmt.build_query_as().fetch_all(&mut conn).await?;
    Ok(Json(List::new(members, total)))
}

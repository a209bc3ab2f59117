use actix_web::web::{Data, Json, Path};
use sqlx::{query, query_as, query_scalar, FromRow, PgPool};
use uuid::Uuid;

use crate::context::UserInfo;
use crate::core::models::profile::Role;
use crate::error::Error;
use crate::response::{DeleteResponse, List};
use crate::serde::{Deserialize, Serialize};

use super::require_institution_scope;

#[derive(Debug, Serialize, FromRow)]
pub struct WorksAssignment {
    id: i32,
    rank: String,
    member_id: String,
    full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct WorksAddition {
    pub member_id: Uuid,
    pub rank: String,
}

#[derive(Debug, Serialize)]
pub struct AssignmentCreated {
    id: i32,
}

// Members may view the works bodies of their own institution; managing them
// stays with the admin and the institution.
async fn ensure_can_view(user_info: &UserInfo, institution_id: Uuid, db: &PgPool) -> Result<(), Error> {
    if let Role::Member = user_info.role {
        let mut conn = db.acquire().await?;
        let belongs: bool = query_scalar("SELECT EXISTS(SELECT id FROM members WHERE id = $1 AND institution_id = $2)")
            .bind(user_info.id)
            .bind(institution_id)
            .fetch_one(&mut conn)
            .await?;
        if belongs {
            return Ok(());
        }
    }
    require_institution_scope(user_info, institution_id)
}

async fn list_assignments(table: &str, user_info: UserInfo, institution_id: Uuid, db: &PgPool) -> Result<List<WorksAssignment>, Error> {
    ensure_can_view(&user_info, institution_id, db).await?;
    let mut conn = db.acquire().await?;
    let sql = format!(
        "
    SELECT w.id, w.rank, m.member_id, m.full_name
    FROM {} AS w
    JOIN members AS m ON w.member_id = m.id
    WHERE w.institution_id = $1
    ORDER BY w.id",
        table
    );
    let assignments: Vec<WorksAssignment> = query_as(&sql).bind(institution_id).fetch_all(&mut conn).await?;
    let total = assignments.len() as i64;
    Ok(List::new(assignments, total))
}

async fn add_assignment(table: &str, user_info: UserInfo, institution_id: Uuid, data: WorksAddition, db: &PgPool) -> Result<AssignmentCreated, Error> {
    require_institution_scope(&user_info, institution_id)?;
    if data.rank.trim().is_empty() {
        return Err(Error::Validation("rank is required".into()));
    }
    let mut conn = db.acquire().await?;
    let belongs: bool = query_scalar("SELECT EXISTS(SELECT id FROM members WHERE id = $1 AND institution_id = $2)")
        .bind(data.member_id)
        .bind(institution_id)
        .fetch_one(&mut conn)
        .await?;
    if !belongs {
        return Err(Error::Validation("member does not belong to this institution".into()));
    }
    let sql = format!("INSERT INTO {} (institution_id, member_id, rank) VALUES ($1, $2, $3) RETURNING id", table);
    let id: i32 = query_scalar(&sql).bind(institution_id).bind(data.member_id).bind(&data.rank).fetch_one(&mut conn).await?;
    Ok(AssignmentCreated { id })
}

async fn remove_assignment(table: &str, user_info: UserInfo, row_id: i32, db: &PgPool) -> Result<DeleteResponse, Error> {
    let mut conn = db.acquire().await?;
    let sql = format!("SELECT institution_id FROM {} WHERE id = $1", table);
    let institution_id: Option<Uuid> = query_scalar(&sql).bind(row_id).fetch_optional(&mut conn).await?;
    let institution_id = institution_id.ok_or_else(|| Error::NotFound("assignment does not exist".into()))?;
    require_institution_scope(&user_info, institution_id)?;
    let sql = format!("DELETE FROM {} WHERE id = $1", table);
    query(&sql).bind(row_id).execute(&mut conn).await?;
    Ok(DeleteResponse::new(1))
}

pub async fn council_list(user_info: UserInfo, institution_id: Path<(Uuid,)>, db: Data<PgPool>) -> Result<Json<List<WorksAssignment>>, Error> {
    let assignments = list_assignments("works_councils", user_info, institution_id.into_inner().0, &db).await?;
    Ok(Json(assignments))
}

pub async fn council_add(user_info: UserInfo, institution_id: Path<(Uuid,)>, Json(data): Json<WorksAddition>, db: Data<PgPool>) -> Result<Json<AssignmentCreated>, Error> {
    let created = add_assignment("works_councils", user_info, institution_id.into_inner().0, data, &db).await?;
    Ok(Json(created))
}

pub async fn council_remove(user_info: UserInfo, row_id: Path<(i32,)>, db: Data<PgPool>) -> Result<Json<DeleteResponse>, Error> {
    let deleted = remove_assignment("works_councils", user_info, row_id.into_inner().0, &db).await?;
    Ok(Json(deleted))
}

pub async fn committee_list(user_info: UserInfo, institution_id: Path<(Uuid,)>, db: Data<PgPool>) -> Result<Json<List<WorksAssignment>>, Error> {
    let assignments = list_assignments("works_committees", user_info, institution_id.into_inner().0, &db).await?;
    Ok(Json(assignments))
}

pub async fn committee_add(user_info: UserInfo, institution_id: Path<(Uuid,)>, Json(data): Json<WorksAddition>, db: Data<PgPool>) -> Result<Json<AssignmentCreated>, Error> {
    let created = add_assignment("works_committees", user_info, institution_id.into_inner().0, data, &db).await?;
    Ok(Json(created))
}

pub async fn committee_remove(user_info: UserInfo, row_id: Path<(i32,)>, db: Data<PgPool>) -> Result<Json<DeleteResponse>, Error> {
    let deleted = remove_assignment("works_committees", user_info, row_id.into_inner().0, &db).await?;
    Ok(Json(deleted))
}

use actix_web::web::{Data, Json};
use log::warn;
use sqlx::pool::PoolConnection;
use sqlx::{query_scalar, PgPool, Postgres};

use crate::context::UserInfo;
use crate::core::models::profile::Role;
use crate::error::Error;
use crate::serde::Serialize;

use super::require_role;

#[derive(Debug, Serialize)]
pub struct SystemStats {
    total_institutions: i64,
    total_members: i64,
    total_works_councils: i64,
    total_works_committees: i64,
}

async fn count_or_zero(conn: &mut PoolConnection<Postgres>, table: &'static str) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM {}", table);
    match query_scalar(&sql).fetch_one(conn).await {
        Ok(n) => n,
        // Dashboard counters are informational; render zero rather than fail
        // the whole page.
        Err(e) => {
            warn!("failed to count {}: {}", table, e);
            0
        }
    }
}

pub async fn system(user_info: UserInfo, db: Data<PgPool>) -> Result<Json<SystemStats>, Error> {
    require_role(&user_info, Role::Admin)?;
    let mut conn = db.acquire().await?;
    let stats = SystemStats {
        total_institutions: count_or_zero(&mut conn, "institutions").await,
        total_members: count_or_zero(&mut conn, "members").await,
        total_works_councils: count_or_zero(&mut conn, "works_councils").await,
        total_works_committees: count_or_zero(&mut conn, "works_committees").await,
    };
    Ok(Json(stats))
}

pub mod enrollment;
pub mod institution;
pub mod member;
pub mod stats;
pub mod works;

use std::ops::Add;

use actix_web::web::{Data, Json};
use sqlx::{query_as, FromRow, PgPool};
use uuid::Uuid;

use crate::chrono;
use crate::context::UserInfo;
use crate::core::models::profile::Role;
use crate::core::ports::tokener::Tokener;
use crate::error::Error;
use crate::impls::directory::pg::hash_password;
use crate::impls::tokener::jwt::JWT;
use crate::middlewares::jwt::{Claim, JWT_SECRET};
use crate::serde::{Deserialize, Serialize};
use crate::OrgConfig;

#[derive(Debug, Deserialize)]
pub struct Login {
    pub user_type: Role,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    token: String,
}

#[derive(FromRow)]
struct LoginRow {
    id: Uuid,
    password: String,
    salt: String,
    role: Role,
}

pub async fn login(Json(Login { user_type, username, password }): Json<Login>, db: Data<PgPool>, config: Data<OrgConfig>) -> Result<Json<LoginResponse>, Error> {
    // Members and institutions log in with their code; the mail-style address
    // is derived. Admins type their full email address.
    let email = match user_type {
        Role::Admin => username,
        Role::Institution | Role::Member => format!("{}@{}", username, config.domain),
    };
    let mut conn = db.acquire().await?;
    let row: Option<LoginRow> = query_as(
        "
    SELECT u.id, u.password, u.salt, p.role
    FROM users AS u
    JOIN profiles AS p ON u.id = p.id
    WHERE u.email = $1",
    )
    .bind(&email)
    .fetch_optional(&mut conn)
    .await?;
    let row = row.ok_or_else(|| Error::Unauthorized("invalid username or password".into()))?;
    if hash_password(&password, &row.salt) != row.password {
        return Err(Error::Unauthorized("invalid username or password".into()));
    }
    if row.role != user_type {
        return Err(Error::Unauthorized("access denied for this user type".into()));
    }
    let claim = Claim {
        user: row.id.to_string(),
        role: row.role,
        exp: chrono::Utc::now().add(chrono::Duration::days(30)).timestamp(),
    };
    let secret = dotenv::var(JWT_SECRET)?;
    let tokener = JWT::new(secret.as_bytes().to_owned());
    let token = tokener.gen_token(&claim)?;
    Ok(Json(LoginResponse { token }))
}

pub(crate) fn require_role(user_info: &UserInfo, role: Role) -> Result<(), Error> {
    if user_info.role != role {
        return Err(Error::Unauthorized(format!("{} access required", role.as_str())));
    }
    Ok(())
}

// Admins act on any institution; an institution only on itself.
pub(crate) fn require_institution_scope(user_info: &UserInfo, institution_id: Uuid) -> Result<(), Error> {
    match user_info.role {
        Role::Admin => Ok(()),
        Role::Institution if user_info.id == institution_id => Ok(()),
        _ => Err(Error::Unauthorized("no permission for this institution".into())),
    }
}

use sqlx::{query, query_as, query_scalar, Executor, Postgres, Transaction};
use uuid::Uuid;

use crate::core::models::{
    institution::{Institution, InstitutionInsert},
    member::{Member, MemberInsert},
    profile::ProfileInsert,
    request::{MembershipRequest, RequestInsert, RequestStatusUpdate},
};
use crate::core::ports::repository::{InstitutionCommon, MemberCommon, ProfileCommon, RequestCommon, Tx};
use crate::error::Error;

pub struct PgStore<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    executor: E,
}

impl<E> PgStore<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

impl<E> MemberCommon for PgStore<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, data: MemberInsert) -> Result<Member, Error> {
        let member = query_as(
            "
        INSERT INTO members (id, member_id, institution_id, full_name, national_id, date_of_birth, gender, job_title, date_joined, grade, contact_number, position_in_union, branch)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING *",
        )
        .bind(data.id)
        .bind(data.member_id)
        .bind(data.institution_id)
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
        .fetch_one(&mut self.executor)
        .await?;
        Ok(member)
    }

    async fn get(&mut self, id: Uuid) -> Result<Member, Error> {
        let member = query_as("SELECT * FROM members WHERE id = $1").bind(id).fetch_one(&mut self.executor).await?;
        Ok(member)
    }

    async fn delete(&mut self, id: Uuid) -> Result<(), Error> {
        query("DELETE FROM members WHERE id = $1").bind(id).execute(&mut self.executor).await?;
        Ok(())
    }

    async fn member_id_exists(&mut self, member_id: &str) -> Result<bool, Error> {
        let exists = query_scalar("SELECT EXISTS(SELECT id FROM members WHERE member_id = $1)")
            .bind(member_id)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(exists)
    }

    async fn latest_member_id(&mut self) -> Result<Option<String>, Error> {
        let latest = query_scalar("SELECT member_id FROM members ORDER BY member_id DESC LIMIT 1")
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(latest)
    }

    async fn ids_by_institution(&mut self, institution_id: Uuid) -> Result<Vec<Uuid>, Error> {
        let ids = query_scalar("SELECT id FROM members WHERE institution_id = $1")
            .bind(institution_id)
            .fetch_all(&mut self.executor)
            .await?;
        Ok(ids)
    }
}

impl<E> RequestCommon for PgStore<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, data: RequestInsert) -> Result<MembershipRequest, Error> {
        let request = query_as(
            "
        INSERT INTO member_requests (institution_id, full_name, national_id, date_of_birth, gender, job_title, date_joined, grade, contact_number, position_in_union, branch)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *",
        )
        .bind(data.institution_id)
        .bind(data.attributes.full_name)
        .bind(data.attributes.national_id)
        .bind(data.attributes.date_of_birth)
        .bind(data.attributes.gender)
        .bind(data.attributes.job_title)
        .bind(data.attributes.date_joined)
        .bind(data.attributes.grade)
        .bind(data.attributes.contact_number)
        .bind(data.attributes.position_in_union)
        .bind(data.attributes.branch)
        .fetch_one(&mut self.executor)
        .await?;
        Ok(request)
    }

    async fn get(&mut self, id: Uuid) -> Result<MembershipRequest, Error> {
        let request = query_as("SELECT * FROM member_requests WHERE id = $1").bind(id).fetch_one(&mut self.executor).await?;
        Ok(request)
    }

    async fn set_status(&mut self, id: Uuid, update: RequestStatusUpdate) -> Result<(), Error> {
        query(
            "
        UPDATE member_requests
        SET status = $1, assigned_member_id = COALESCE($2, assigned_member_id), updated_at = now()
        WHERE id = $3",
        )
        .bind(update.status)
        .bind(update.assigned_member_id)
        .bind(id)
        .execute(&mut self.executor)
        .await?;
        Ok(())
    }
}

impl<E> ProfileCommon for PgStore<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, data: ProfileInsert) -> Result<(), Error> {
        query("INSERT INTO profiles (id, role, username) VALUES ($1, $2, $3)")
            .bind(data.id)
            .bind(data.role)
            .bind(data.username)
            .execute(&mut self.executor)
            .await?;
        Ok(())
    }
}

impl<E> InstitutionCommon for PgStore<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, id: Uuid, data: InstitutionInsert) -> Result<Institution, Error> {
        let institution = query_as(
            "
        INSERT INTO institutions (id, institution_id, institution_name, email, landline, head_contact, bursar_contact, branch)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *",
        )
        .bind(id)
        .bind(data.institution_id)
        .bind(data.institution_name)
        .bind(data.email)
        .bind(data.landline)
        .bind(data.head_contact)
        .bind(data.bursar_contact)
        .bind(data.branch)
        .fetch_one(&mut self.executor)
        .await?;
        Ok(institution)
    }

    async fn get(&mut self, id: Uuid) -> Result<Institution, Error> {
        let institution = query_as("SELECT * FROM institutions WHERE id = $1").bind(id).fetch_one(&mut self.executor).await?;
        Ok(institution)
    }

    async fn delete(&mut self, id: Uuid) -> Result<(), Error> {
        query("DELETE FROM institutions WHERE id = $1").bind(id).execute(&mut self.executor).await?;
        Ok(())
    }
}

impl Tx for PgStore<Transaction<'static, Postgres>> {
    async fn commit(self) -> Result<(), Error> {
        self.executor.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), Error> {
        self.executor.rollback().await?;
        Ok(())
    }
}

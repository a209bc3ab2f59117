use uuid::Uuid;

use crate::core::models::{
    institution::{Institution, InstitutionInsert},
    member::{Member, MemberInsert},
    profile::ProfileInsert,
    request::{MembershipRequest, RequestInsert, RequestStatusUpdate},
};
use crate::error::Error;

pub trait MemberCommon {
    async fn insert(&mut self, data: MemberInsert) -> Result<Member, Error>;
    async fn get(&mut self, id: Uuid) -> Result<Member, Error>;
    async fn delete(&mut self, id: Uuid) -> Result<(), Error>;
    async fn member_id_exists(&mut self, member_id: &str) -> Result<bool, Error>;
    async fn latest_member_id(&mut self) -> Result<Option<String>, Error>;
    async fn ids_by_institution(&mut self, institution_id: Uuid) -> Result<Vec<Uuid>, Error>;
}

pub trait RequestCommon {
    async fn insert(&mut self, data: RequestInsert) -> Result<MembershipRequest, Error>;
    async fn get(&mut self, id: Uuid) -> Result<MembershipRequest, Error>;
    async fn set_status(&mut self, id: Uuid, update: RequestStatusUpdate) -> Result<(), Error>;
}

pub trait ProfileCommon {
    async fn insert(&mut self, data: ProfileInsert) -> Result<(), Error>;
}

pub trait InstitutionCommon {
    async fn insert(&mut self, id: Uuid, data: InstitutionInsert) -> Result<Institution, Error>;
    async fn get(&mut self, id: Uuid) -> Result<Institution, Error>;
    async fn delete(&mut self, id: Uuid) -> Result<(), Error>;
}

pub trait Tx {
    async fn commit(self) -> Result<(), Error>;
    async fn rollback(self) -> Result<(), Error>;
}

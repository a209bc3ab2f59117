// In-memory fakes for the repository and directory ports, shared by the
// service tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::Utc;
use uuid::Uuid;

use crate::core::models::{
    institution::{Institution, InstitutionInsert},
    member::{Member, MemberAttributes, MemberInsert, MemberStatus},
    profile::ProfileInsert,
    request::{MembershipRequest, RequestInsert, RequestStatus, RequestStatusUpdate},
};
use crate::core::ports::directory::{AccountDirectory, NewIdentity};
use crate::core::ports::repository::{InstitutionCommon, MemberCommon, ProfileCommon, RequestCommon, Tx};
use crate::error::Error;

#[derive(Default)]
pub struct State {
    pub requests: HashMap<Uuid, MembershipRequest>,
    pub members: Vec<Member>,
    pub institutions: Vec<Institution>,
    pub profiles: Vec<ProfileInsert>,
    pub committed: bool,
    pub rolled_back: bool,
    pub fail_member_insert: bool,
    pub fail_institution_insert: bool,
    pub fail_latest_lookup: bool,
}

#[derive(Clone, Default)]
pub struct MemStore(pub Rc<RefCell<State>>);

impl MemberCommon for MemStore {
    async fn insert(&mut self, data: MemberInsert) -> Result<Member, Error> {
        let mut state = self.0.borrow_mut();
        if state.fail_member_insert {
            return Err(Error::Remote("member store write failed".into()));
        }
        if state.members.iter().any(|m| m.member_id == data.member_id) {
            return Err(Error::Conflict(format!("member id {} is already taken", data.member_id)));
        }
        let member = Member {
            id: data.id,
            member_id: data.member_id,
            institution_id: data.institution_id,
            full_name: data.full_name,
            national_id: data.national_id,
            date_of_birth: data.date_of_birth,
            gender: data.gender,
            job_title: data.job_title,
            date_joined: data.date_joined,
            grade: data.grade,
            contact_number: data.contact_number,
            position_in_union: data.position_in_union,
            branch: data.branch,
            status: MemberStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        state.members.push(member.clone());
        Ok(member)
    }

    async fn get(&mut self, id: Uuid) -> Result<Member, Error> {
        self.0
            .borrow()
            .members
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound("record does not exist".into()))
    }

    async fn delete(&mut self, id: Uuid) -> Result<(), Error> {
        self.0.borrow_mut().members.retain(|m| m.id != id);
        Ok(())
    }

    async fn member_id_exists(&mut self, member_id: &str) -> Result<bool, Error> {
        Ok(self.0.borrow().members.iter().any(|m| m.member_id == member_id))
    }

    async fn latest_member_id(&mut self) -> Result<Option<String>, Error> {
        let state = self.0.borrow();
        if state.fail_latest_lookup {
            return Err(Error::Remote("member store unreachable".into()));
        }
        Ok(state.members.iter().map(|m| m.member_id.clone()).max())
    }

    async fn ids_by_institution(&mut self, institution_id: Uuid) -> Result<Vec<Uuid>, Error> {
        Ok(self.0.borrow().members.iter().filter(|m| m.institution_id == institution_id).map(|m| m.id).collect())
    }
}

impl RequestCommon for MemStore {
    async fn insert(&mut self, data: RequestInsert) -> Result<MembershipRequest, Error> {
        let request = MembershipRequest {
            id: Uuid::new_v4(),
            institution_id: data.institution_id,
            full_name: data.attributes.full_name,
            national_id: data.attributes.national_id,
            date_of_birth: data.attributes.date_of_birth,
            gender: data.attributes.gender,
            job_title: data.attributes.job_title,
            date_joined: data.attributes.date_joined,
            grade: data.attributes.grade,
            contact_number: data.attributes.contact_number,
            position_in_union: data.attributes.position_in_union,
            branch: data.attributes.branch,
            status: RequestStatus::Pending,
            assigned_member_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.0.borrow_mut().requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn get(&mut self, id: Uuid) -> Result<MembershipRequest, Error> {
        self.0
            .borrow()
            .requests
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound("membership request does not exist".into()))
    }

    async fn set_status(&mut self, id: Uuid, update: RequestStatusUpdate) -> Result<(), Error> {
        let mut state = self.0.borrow_mut();
        let request = state.requests.get_mut(&id).ok_or_else(|| Error::NotFound("membership request does not exist".into()))?;
        request.status = update.status;
        if update.assigned_member_id.is_some() {
            request.assigned_member_id = update.assigned_member_id;
        }
        request.updated_at = Utc::now();
        Ok(())
    }
}

impl ProfileCommon for MemStore {
    async fn insert(&mut self, data: ProfileInsert) -> Result<(), Error> {
        self.0.borrow_mut().profiles.push(data);
        Ok(())
    }
}

impl InstitutionCommon for MemStore {
    async fn insert(&mut self, id: Uuid, data: InstitutionInsert) -> Result<Institution, Error> {
        let mut state = self.0.borrow_mut();
        if state.fail_institution_insert {
            return Err(Error::Remote("institution store write failed".into()));
        }
        if state.institutions.iter().any(|i| i.institution_id == data.institution_id) {
            return Err(Error::Conflict(format!("institution id {} is already taken", data.institution_id)));
        }
        let institution = Institution {
            id,
            institution_id: data.institution_id,
            institution_name: data.institution_name,
            email: data.email,
            landline: data.landline,
            head_contact: data.head_contact,
            bursar_contact: data.bursar_contact,
            branch: data.branch,
            total_members: 0,
            total_works_council: 0,
            total_works_committee: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        state.institutions.push(institution.clone());
        Ok(institution)
    }

    async fn get(&mut self, id: Uuid) -> Result<Institution, Error> {
        self.0
            .borrow()
            .institutions
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound("institution does not exist".into()))
    }

    async fn delete(&mut self, id: Uuid) -> Result<(), Error> {
        let mut state = self.0.borrow_mut();
        state.institutions.retain(|i| i.id != id);
        // FK cascade takes the institution's members with it.
        state.members.retain(|m| m.institution_id != id);
        Ok(())
    }
}

impl Tx for MemStore {
    async fn commit(self) -> Result<(), Error> {
        self.0.borrow_mut().committed = true;
        Ok(())
    }

    async fn rollback(self) -> Result<(), Error> {
        self.0.borrow_mut().rolled_back = true;
        Ok(())
    }
}

#[derive(Default)]
pub struct MockDirectory {
    pub created: Vec<(Uuid, NewIdentity)>,
    pub deleted: Vec<Uuid>,
    pub fail_create: bool,
}

impl AccountDirectory for MockDirectory {
    async fn create_identity(&mut self, identity: NewIdentity) -> Result<Uuid, Error> {
        if self.fail_create {
            return Err(Error::Remote("account directory unreachable".into()));
        }
        let id = Uuid::new_v4();
        self.created.push((id, identity));
        Ok(id)
    }

    async fn delete_identity(&mut self, id: Uuid) -> Result<(), Error> {
        self.deleted.push(id);
        Ok(())
    }
}

pub fn attributes(full_name: &str) -> MemberAttributes {
    MemberAttributes {
        full_name: full_name.into(),
        national_id: Some("63-123456A70".into()),
        date_of_birth: None,
        gender: Some("Female".into()),
        job_title: Some("Teacher".into()),
        date_joined: None,
        grade: Some("C2".into()),
        contact_number: Some("+263771234567".into()),
        position_in_union: Some("Member".into()),
        branch: Some("Bulawayo".into()),
    }
}

pub async fn existing_member(store: &mut MemStore, institution_id: Uuid, code: &str) -> Uuid {
    let member = MemberCommon::insert(
        store,
        MemberInsert {
            id: Uuid::new_v4(),
            member_id: code.into(),
            institution_id,
            full_name: "Sipho Ndlovu".into(),
            national_id: None,
            date_of_birth: None,
            gender: None,
            job_title: None,
            date_joined: None,
            grade: None,
            contact_number: None,
            position_in_union: None,
            branch: None,
        },
    )
    .await
    .unwrap();
    member.id
}

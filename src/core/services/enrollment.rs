use log::{error, warn};
use uuid::Uuid;

use crate::core::member_id;
use crate::core::models::{
    member::{Member, MemberAttributes, MemberInsert},
    profile::{ProfileInsert, Role},
    request::{MembershipRequest, RequestInsert, RequestStatus, RequestStatusUpdate},
};
use crate::core::ports::directory::{AccountDirectory, NewIdentity};
use crate::core::ports::repository::{MemberCommon, ProfileCommon, RequestCommon, Tx};
use crate::error::Error;

pub async fn submit_request<S>(storer: &mut S, institution_id: Uuid, attributes: MemberAttributes) -> Result<MembershipRequest, Error>
where
    S: RequestCommon,
{
    if attributes.full_name.trim().is_empty() {
        return Err(Error::Validation("full name is required".into()));
    }
    let request = RequestCommon::insert(storer, RequestInsert { institution_id, attributes }).await?;
    Ok(request)
}

// Suggests the next code to hand out. The admin may still type a different
// one at approval time, so nothing is reserved here; a query failure degrades
// to the seed and lets the approval-time uniqueness check catch collisions.
pub async fn next_member_id<S>(storer: &mut S, prefix: &str) -> String
where
    S: MemberCommon,
{
    match MemberCommon::latest_member_id(storer).await {
        Ok(latest) => member_id::next_code(prefix, latest.as_deref()),
        Err(e) => {
            warn!("failed to look up the latest member id: {}", e);
            member_id::seed(prefix)
        }
    }
}

pub async fn approve_request<T, D>(mut tx: T, directory: &mut D, org_domain: &str, request_id: Uuid, chosen_member_id: &str) -> Result<Member, Error>
where
    T: MemberCommon + RequestCommon + ProfileCommon + Tx,
    D: AccountDirectory,
{
    if !member_id::is_valid_code(chosen_member_id) {
        return Err(Error::Validation(format!("member id {} is not in the required AAA-0000 format", chosen_member_id)));
    }
    let request = RequestCommon::get(&mut tx, request_id).await?;
    if request.status != RequestStatus::Pending {
        return Err(Error::State("membership request has already been processed".into()));
    }
    if MemberCommon::member_id_exists(&mut tx, chosen_member_id).await? {
        return Err(Error::Conflict(format!("member id {} is already taken", chosen_member_id)));
    }

    // The identity lives in a separate store, so it cannot join the SQL
    // transaction below; it is compensated instead if anything later fails.
    let identity = directory
        .create_identity(NewIdentity {
            email: format!("{}@{}", chosen_member_id, org_domain),
            password: chosen_member_id.to_owned(),
            role: Role::Member,
            username: chosen_member_id.to_owned(),
        })
        .await?;

    match write_approval(&mut tx, &request, identity, chosen_member_id).await {
        Ok(member) => match tx.commit().await {
            Ok(()) => Ok(member),
            Err(e) => {
                remove_identity(directory, identity).await;
                Err(e)
            }
        },
        Err(e) => {
            if let Err(re) = tx.rollback().await {
                error!("failed to roll back approval of request {}: {}", request_id, re);
            }
            remove_identity(directory, identity).await;
            Err(e)
        }
    }
}

async fn write_approval<T>(tx: &mut T, request: &MembershipRequest, identity: Uuid, member_id: &str) -> Result<Member, Error>
where
    T: MemberCommon + RequestCommon + ProfileCommon,
{
    ProfileCommon::insert(
        tx,
        ProfileInsert {
            id: identity,
            role: Role::Member,
            username: member_id.to_owned(),
        },
    )
    .await?;
    let member = MemberCommon::insert(
        tx,
        MemberInsert {
            id: identity,
            member_id: member_id.to_owned(),
            institution_id: request.institution_id,
            full_name: request.full_name.clone(),
            national_id: request.national_id.clone(),
            date_of_birth: request.date_of_birth,
            gender: request.gender.clone(),
            job_title: request.job_title.clone(),
            date_joined: request.date_joined,
            grade: request.grade.clone(),
            contact_number: request.contact_number.clone(),
            position_in_union: request.position_in_union.clone(),
            branch: request.branch.clone(),
        },
    )
    .await?;
    RequestCommon::set_status(
        tx,
        request.id,
        RequestStatusUpdate {
            status: RequestStatus::Approved,
            assigned_member_id: Some(member_id.to_owned()),
        },
    )
    .await?;
    Ok(member)
}

pub(super) async fn remove_identity<D>(directory: &mut D, identity: Uuid)
where
    D: AccountDirectory,
{
    if let Err(e) = directory.delete_identity(identity).await {
        error!("failed to clean up identity {} of an aborted creation: {}", identity, e);
    }
}

pub async fn reject_request<S>(storer: &mut S, request_id: Uuid) -> Result<(), Error>
where
    S: RequestCommon,
{
    let request = RequestCommon::get(storer, request_id).await?;
    match request.status {
        RequestStatus::Pending => {
            RequestCommon::set_status(
                storer,
                request_id,
                RequestStatusUpdate {
                    status: RequestStatus::Rejected,
                    assigned_member_id: None,
                },
            )
            .await
        }
        // Rejecting twice is a no-op; the request stays rejected.
        RequestStatus::Rejected => Ok(()),
        RequestStatus::Approved => Err(Error::State("membership request has already been approved".into())),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::models::member::MemberStatus;
    use crate::core::services::testing::{attributes, existing_member, MemStore, MockDirectory};

    const DOMAIN: &str = "zehsscwu.org";

    async fn pending_request(store: &mut MemStore) -> Uuid {
        submit_request(store, Uuid::new_v4(), attributes("Thandiwe Moyo")).await.unwrap().id
    }

    #[tokio::test]
    async fn test_allocator_seeds_empty_collection() {
        let mut store = MemStore::default();
        assert_eq!(next_member_id(&mut store, "ZEH").await, "ZEH-0001");
    }

    #[tokio::test]
    async fn test_allocator_increments_highest_code() {
        let mut store = MemStore::default();
        existing_member(&mut store, Uuid::new_v4(), "ZEH-0012").await;
        existing_member(&mut store, Uuid::new_v4(), "ZEH-0047").await;
        assert_eq!(next_member_id(&mut store, "ZEH").await, "ZEH-0048");
    }

    #[tokio::test]
    async fn test_allocator_falls_back_on_malformed_code() {
        let mut store = MemStore::default();
        existing_member(&mut store, Uuid::new_v4(), "legacy#12").await;
        assert_eq!(next_member_id(&mut store, "ZEH").await, "ZEH-0001");
    }

    #[tokio::test]
    async fn test_allocator_degrades_on_query_failure() {
        let mut store = MemStore::default();
        store.0.borrow_mut().fail_latest_lookup = true;
        assert_eq!(next_member_id(&mut store, "ZEH").await, "ZEH-0001");
    }

    #[tokio::test]
    async fn test_submit_creates_pending_request() {
        let mut store = MemStore::default();
        let institution = Uuid::new_v4();
        let request = submit_request(&mut store, institution, attributes("Thandiwe Moyo")).await.unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.institution_id, institution);
        assert_eq!(request.full_name, "Thandiwe Moyo");
        assert!(request.assigned_member_id.is_none());
    }

    #[tokio::test]
    async fn test_submit_requires_full_name() {
        let mut store = MemStore::default();
        let result = submit_request(&mut store, Uuid::new_v4(), attributes("  ")).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_approve_rejects_malformed_member_id() {
        let mut store = MemStore::default();
        let request_id = pending_request(&mut store).await;
        let mut directory = MockDirectory::default();
        let result = approve_request(store.clone(), &mut directory, DOMAIN, request_id, "zeh-1").await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(directory.created.is_empty());
        assert!(store.0.borrow().members.is_empty());
    }

    #[tokio::test]
    async fn test_approve_rejects_taken_member_id() {
        let mut store = MemStore::default();
        existing_member(&mut store, Uuid::new_v4(), "ZEH-0050").await;
        let request_id = pending_request(&mut store).await;
        let mut directory = MockDirectory::default();
        let result = approve_request(store.clone(), &mut directory, DOMAIN, request_id, "ZEH-0050").await;
        assert!(matches!(result, Err(Error::Conflict(_))));
        assert!(directory.created.is_empty());
        assert_eq!(store.0.borrow().members.len(), 1);
        assert_eq!(store.0.borrow().requests[&request_id].status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_approve_unknown_request_not_found() {
        let store = MemStore::default();
        let mut directory = MockDirectory::default();
        let result = approve_request(store, &mut directory, DOMAIN, Uuid::new_v4(), "ZEH-0099").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_approve_postconditions() {
        let mut store = MemStore::default();
        let request_id = pending_request(&mut store).await;
        let mut directory = MockDirectory::default();
        let member = approve_request(store.clone(), &mut directory, DOMAIN, request_id, "ZEH-0051").await.unwrap();

        assert_eq!(member.member_id, "ZEH-0051");
        assert_eq!(member.status, MemberStatus::Active);
        assert_eq!(member.full_name, "Thandiwe Moyo");

        let state = store.0.borrow();
        assert!(state.committed);
        assert_eq!(state.members.len(), 1);
        let request = &state.requests[&request_id];
        assert_eq!(request.status, RequestStatus::Approved);
        assert_eq!(request.assigned_member_id.as_deref(), Some("ZEH-0051"));

        assert_eq!(directory.created.len(), 1);
        let (identity, new_identity) = &directory.created[0];
        assert_eq!(*identity, member.id);
        assert_eq!(new_identity.email, "ZEH-0051@zehsscwu.org");
        assert_eq!(new_identity.password, "ZEH-0051");
        assert_eq!(new_identity.role, Role::Member);
        assert_eq!(state.profiles.len(), 1);
        assert_eq!(state.profiles[0].username, "ZEH-0051");
    }

    #[tokio::test]
    async fn test_approve_twice_is_a_state_error() {
        let mut store = MemStore::default();
        let request_id = pending_request(&mut store).await;
        let mut directory = MockDirectory::default();
        approve_request(store.clone(), &mut directory, DOMAIN, request_id, "ZEH-0051").await.unwrap();
        let result = approve_request(store.clone(), &mut directory, DOMAIN, request_id, "ZEH-0052").await;
        assert!(matches!(result, Err(Error::State(_))));
        assert_eq!(store.0.borrow().members.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_request_cannot_be_approved() {
        let mut store = MemStore::default();
        let request_id = pending_request(&mut store).await;
        reject_request(&mut store, request_id).await.unwrap();
        assert_eq!(store.0.borrow().requests[&request_id].status, RequestStatus::Rejected);

        let mut directory = MockDirectory::default();
        let result = approve_request(store.clone(), &mut directory, DOMAIN, request_id, "ZEH-0051").await;
        assert!(matches!(result, Err(Error::State(_))));
        assert!(directory.created.is_empty());
    }

    #[tokio::test]
    async fn test_reject_twice_is_a_no_op() {
        let mut store = MemStore::default();
        let request_id = pending_request(&mut store).await;
        reject_request(&mut store, request_id).await.unwrap();
        reject_request(&mut store, request_id).await.unwrap();
        let state = store.0.borrow();
        assert_eq!(state.requests[&request_id].status, RequestStatus::Rejected);
        assert!(state.members.is_empty());
        assert!(state.profiles.is_empty());
    }

    #[tokio::test]
    async fn test_reject_approved_request_is_a_state_error() {
        let mut store = MemStore::default();
        let request_id = pending_request(&mut store).await;
        let mut directory = MockDirectory::default();
        approve_request(store.clone(), &mut directory, DOMAIN, request_id, "ZEH-0051").await.unwrap();
        let result = reject_request(&mut store, request_id).await;
        assert!(matches!(result, Err(Error::State(_))));
    }

    #[tokio::test]
    async fn test_directory_failure_aborts_approval() {
        let mut store = MemStore::default();
        let request_id = pending_request(&mut store).await;
        let mut directory = MockDirectory {
            fail_create: true,
            ..Default::default()
        };
        let result = approve_request(store.clone(), &mut directory, DOMAIN, request_id, "ZEH-0051").await;
        assert!(matches!(result, Err(Error::Remote(_))));
        let state = store.0.borrow();
        assert!(state.members.is_empty());
        assert_eq!(state.requests[&request_id].status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_failed_member_write_compensates_identity() {
        let mut store = MemStore::default();
        let request_id = pending_request(&mut store).await;
        store.0.borrow_mut().fail_member_insert = true;
        let mut directory = MockDirectory::default();
        let result = approve_request(store.clone(), &mut directory, DOMAIN, request_id, "ZEH-0051").await;
        assert!(matches!(result, Err(Error::Remote(_))));

        let state = store.0.borrow();
        assert!(state.rolled_back);
        assert!(!state.committed);
        assert_eq!(state.requests[&request_id].status, RequestStatus::Pending);
        assert_eq!(directory.created.len(), 1);
        assert_eq!(directory.deleted, vec![directory.created[0].0]);
    }
}

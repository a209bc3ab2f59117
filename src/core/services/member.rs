use log::error;
use uuid::Uuid;

use crate::core::member_id;
use crate::core::models::{
    member::{Member, MemberAttributes, MemberInsert},
    profile::{ProfileInsert, Role},
};
use crate::core::ports::directory::{AccountDirectory, NewIdentity};
use crate::core::ports::repository::{MemberCommon, ProfileCommon, Tx};
use crate::error::Error;

use super::enrollment::remove_identity;

// Direct creation by an admin, bypassing the request queue. Same validation
// and the same identity/profile/record sequence as an approval.
pub async fn create_member<T, D>(mut tx: T, directory: &mut D, org_domain: &str, institution_id: Uuid, member_id: &str, attributes: MemberAttributes) -> Result<Member, Error>
where
    T: MemberCommon + ProfileCommon + Tx,
    D: AccountDirectory,
{
    if !member_id::is_valid_code(member_id) {
        return Err(Error::Validation(format!("member id {} is not in the required AAA-0000 format", member_id)));
    }
    if attributes.full_name.trim().is_empty() {
        return Err(Error::Validation("full name is required".into()));
    }
    if MemberCommon::member_id_exists(&mut tx, member_id).await? {
        return Err(Error::Conflict(format!("member id {} is already taken", member_id)));
    }

    let identity = directory
        .create_identity(NewIdentity {
            email: format!("{}@{}", member_id, org_domain),
            password: member_id.to_owned(),
            role: Role::Member,
            username: member_id.to_owned(),
        })
        .await?;

    match write_member(&mut tx, identity, institution_id, member_id, attributes).await {
        Ok(member) => match tx.commit().await {
            Ok(()) => Ok(member),
            Err(e) => {
                remove_identity(directory, identity).await;
                Err(e)
            }
        },
        Err(e) => {
            if let Err(re) = tx.rollback().await {
                error!("failed to roll back creation of member {}: {}", member_id, re);
            }
            remove_identity(directory, identity).await;
            Err(e)
        }
    }
}

async fn write_member<T>(tx: &mut T, identity: Uuid, institution_id: Uuid, member_id: &str, attributes: MemberAttributes) -> Result<Member, Error>
where
    T: MemberCommon + ProfileCommon,
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
            institution_id,
            full_name: attributes.full_name,
            national_id: attributes.national_id,
            date_of_birth: attributes.date_of_birth,
            gender: attributes.gender,
            job_title: attributes.job_title,
            date_joined: attributes.date_joined,
            grade: attributes.grade,
            contact_number: attributes.contact_number,
            position_in_union: attributes.position_in_union,
            branch: attributes.branch,
        },
    )
    .await?;
    Ok(member)
}

// Removing the login identity cascades over the profile and member rows; the
// explicit record delete keeps the operation complete against stores without
// the cascade.
pub async fn delete_member<S, D>(storer: &mut S, directory: &mut D, id: Uuid) -> Result<(), Error>
where
    S: MemberCommon,
    D: AccountDirectory,
{
    let member = MemberCommon::get(storer, id).await?;
    directory.delete_identity(member.id).await?;
    MemberCommon::delete(storer, member.id).await?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::models::member::MemberStatus;
    use crate::core::services::testing::{attributes, existing_member, MemStore, MockDirectory};

    const DOMAIN: &str = "zehsscwu.org";

    #[tokio::test]
    async fn test_create_member_directly() {
        let store = MemStore::default();
        let mut directory = MockDirectory::default();
        let institution = Uuid::new_v4();
        let member = create_member(store.clone(), &mut directory, DOMAIN, institution, "ZEH-0007", attributes("Thandiwe Moyo"))
            .await
            .unwrap();
        assert_eq!(member.member_id, "ZEH-0007");
        assert_eq!(member.institution_id, institution);
        assert_eq!(member.status, MemberStatus::Active);
        let state = store.0.borrow();
        assert!(state.committed);
        assert_eq!(state.profiles.len(), 1);
        assert_eq!(directory.created[0].1.email, "ZEH-0007@zehsscwu.org");
    }

    #[tokio::test]
    async fn test_create_member_validates_code() {
        let store = MemStore::default();
        let mut directory = MockDirectory::default();
        let result = create_member(store, &mut directory, DOMAIN, Uuid::new_v4(), "ZEH-07", attributes("Thandiwe Moyo")).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(directory.created.is_empty());
    }

    #[tokio::test]
    async fn test_create_member_rejects_taken_code() {
        let mut store = MemStore::default();
        existing_member(&mut store, Uuid::new_v4(), "ZEH-0007").await;
        let mut directory = MockDirectory::default();
        let result = create_member(store.clone(), &mut directory, DOMAIN, Uuid::new_v4(), "ZEH-0007", attributes("Thandiwe Moyo")).await;
        assert!(matches!(result, Err(Error::Conflict(_))));
        assert!(directory.created.is_empty());
        assert_eq!(store.0.borrow().members.len(), 1);
    }

    #[tokio::test]
    async fn test_create_member_compensates_on_write_failure() {
        let store = MemStore::default();
        store.0.borrow_mut().fail_member_insert = true;
        let mut directory = MockDirectory::default();
        let result = create_member(store.clone(), &mut directory, DOMAIN, Uuid::new_v4(), "ZEH-0007", attributes("Thandiwe Moyo")).await;
        assert!(result.is_err());
        assert!(store.0.borrow().rolled_back);
        assert_eq!(directory.deleted, vec![directory.created[0].0]);
    }

    #[tokio::test]
    async fn test_delete_member_removes_identity_and_record() {
        let mut store = MemStore::default();
        let id = existing_member(&mut store, Uuid::new_v4(), "ZEH-0007").await;
        let mut directory = MockDirectory::default();
        delete_member(&mut store, &mut directory, id).await.unwrap();
        assert!(store.0.borrow().members.is_empty());
        assert_eq!(directory.deleted, vec![id]);
    }

    #[tokio::test]
    async fn test_delete_unknown_member_not_found() {
        let mut store = MemStore::default();
        let mut directory = MockDirectory::default();
        let result = delete_member(&mut store, &mut directory, Uuid::new_v4()).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(directory.deleted.is_empty());
    }
}

use log::error;
use uuid::Uuid;

use crate::core::models::{
    institution::{Institution, InstitutionInsert},
    profile::{ProfileInsert, Role},
};
use crate::core::ports::directory::{AccountDirectory, NewIdentity};
use crate::core::ports::repository::{InstitutionCommon, MemberCommon, ProfileCommon, Tx};
use crate::error::Error;

use super::enrollment::remove_identity;

// The institution code doubles as its login username and bootstrap password,
// mirroring the member-ID contract.
pub async fn create_institution<T, D>(mut tx: T, directory: &mut D, org_domain: &str, data: InstitutionInsert) -> Result<Institution, Error>
where
    T: InstitutionCommon + ProfileCommon + Tx,
    D: AccountDirectory,
{
    if data.institution_id.trim().is_empty() {
        return Err(Error::Validation("institution id is required".into()));
    }
    if data.institution_name.trim().is_empty() {
        return Err(Error::Validation("institution name is required".into()));
    }

    let identity = directory
        .create_identity(NewIdentity {
            email: format!("{}@{}", data.institution_id, org_domain),
            password: data.institution_id.clone(),
            role: Role::Institution,
            username: data.institution_id.clone(),
        })
        .await?;

    match write_institution(&mut tx, identity, data).await {
        Ok(institution) => match tx.commit().await {
            Ok(()) => Ok(institution),
            Err(e) => {
                remove_identity(directory, identity).await;
                Err(e)
            }
        },
        Err(e) => {
            if let Err(re) = tx.rollback().await {
                error!("failed to roll back institution creation: {}", re);
            }
            remove_identity(directory, identity).await;
            Err(e)
        }
    }
}

async fn write_institution<T>(tx: &mut T, identity: Uuid, data: InstitutionInsert) -> Result<Institution, Error>
where
    T: InstitutionCommon + ProfileCommon,
{
    ProfileCommon::insert(
        tx,
        ProfileInsert {
            id: identity,
            role: Role::Institution,
            username: data.institution_id.clone(),
        },
    )
    .await?;
    let institution = InstitutionCommon::insert(tx, identity, data).await?;
    Ok(institution)
}

// Deletes the institution together with all of its members' identities. This
// is a batch of individual deletions, not one transaction: a failure midway
// leaves the remaining identities in place and surfaces the error.
pub async fn delete_institution<S, D>(storer: &mut S, directory: &mut D, id: Uuid) -> Result<(), Error>
where
    S: InstitutionCommon + MemberCommon,
    D: AccountDirectory,
{
    let institution = InstitutionCommon::get(storer, id).await?;
    let member_ids = MemberCommon::ids_by_institution(storer, institution.id).await?;
    for member_id in member_ids {
        directory.delete_identity(member_id).await?;
    }
    directory.delete_identity(institution.id).await?;
    InstitutionCommon::delete(storer, institution.id).await?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::services::testing::{existing_member, MemStore, MockDirectory};

    const DOMAIN: &str = "zehsscwu.org";

    fn insert_data(code: &str) -> InstitutionInsert {
        InstitutionInsert {
            institution_id: code.into(),
            institution_name: "Mpilo Central".into(),
            email: Some("admin@mpilo.example".into()),
            landline: None,
            head_contact: None,
            bursar_contact: None,
            branch: Some("Bulawayo".into()),
        }
    }

    #[tokio::test]
    async fn test_create_institution() {
        let store = MemStore::default();
        let mut directory = MockDirectory::default();
        let institution = create_institution(store.clone(), &mut directory, DOMAIN, insert_data("INST-01")).await.unwrap();
        assert_eq!(institution.institution_id, "INST-01");
        assert_eq!(institution.id, directory.created[0].0);
        assert_eq!(directory.created[0].1.email, "INST-01@zehsscwu.org");
        assert_eq!(directory.created[0].1.role, Role::Institution);
        let state = store.0.borrow();
        assert!(state.committed);
        assert_eq!(state.profiles.len(), 1);
    }

    #[tokio::test]
    async fn test_create_institution_requires_code_and_name() {
        let store = MemStore::default();
        let mut directory = MockDirectory::default();
        let mut data = insert_data("INST-01");
        data.institution_id = " ".into();
        let result = create_institution(store, &mut directory, DOMAIN, data).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(directory.created.is_empty());
    }

    #[tokio::test]
    async fn test_create_institution_compensates_on_write_failure() {
        let store = MemStore::default();
        store.0.borrow_mut().fail_institution_insert = true;
        let mut directory = MockDirectory::default();
        let result = create_institution(store.clone(), &mut directory, DOMAIN, insert_data("INST-01")).await;
        assert!(result.is_err());
        assert!(store.0.borrow().rolled_back);
        assert_eq!(directory.deleted, vec![directory.created[0].0]);
    }

    #[tokio::test]
    async fn test_delete_institution_cascades_member_identities() {
        let store = MemStore::default();
        let mut directory = MockDirectory::default();
        let institution = create_institution(store.clone(), &mut directory, DOMAIN, insert_data("INST-01")).await.unwrap();
        let mut handle = store.clone();
        let first = existing_member(&mut handle, institution.id, "ZEH-0001").await;
        let second = existing_member(&mut handle, institution.id, "ZEH-0002").await;

        delete_institution(&mut handle, &mut directory, institution.id).await.unwrap();

        let state = store.0.borrow();
        assert!(state.institutions.is_empty());
        assert!(state.members.is_empty());
        assert_eq!(directory.deleted, vec![first, second, institution.id]);
    }

    #[tokio::test]
    async fn test_delete_unknown_institution_not_found() {
        let mut store = MemStore::default();
        let mut directory = MockDirectory::default();
        let result = delete_institution(&mut store, &mut directory, Uuid::new_v4()).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(directory.deleted.is_empty());
    }
}

//! Repository over a single JSON document.
//!
//! Every operation reads the whole document, changes it in memory and, when
//! something changed, writes it back. There is no lock between the read and
//! the write.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};

use crate::contract::model::{NewUser, User, UserPatch};
use crate::domain::repo::UsersRepository;
use crate::infra::storage::entity::UserRecord;
use crate::infra::storage::json_file::{JsonFileStore, StorageError};

pub struct JsonFileUsersRepository {
    store: JsonFileStore,
}

impl JsonFileUsersRepository {
    pub fn new(store: JsonFileStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &JsonFileStore {
        &self.store
    }
}

/// Millisecond precision, matching what ends up in the file.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[async_trait]
impl UsersRepository for JsonFileUsersRepository {
    async fn list_all(&self) -> Result<Vec<User>, StorageError> {
        let doc = self.store.read().await?;
        Ok(doc.users.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<User>, StorageError> {
        let doc = self.store.read().await?;
        Ok(doc.users.into_iter().find(|u| u.id == id).map(Into::into))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StorageError> {
        let mut doc = self.store.read().await?;
        let id = doc.allocate_id().ok_or_else(|| StorageError::IdsExhausted {
            path: self.store.path().to_path_buf(),
        })?;
        let at = now();
        let record = UserRecord {
            id,
            name: new_user.name,
            email: new_user.email,
            age: new_user.age,
            created_at: at,
            updated_at: at,
        };
        doc.users.push(record.clone());
        self.store.write(&doc).await?;
        Ok(record.into())
    }

    async fn update(&self, id: u64, patch: UserPatch) -> Result<Option<User>, StorageError> {
        let mut doc = self.store.read().await?;
        let Some(idx) = doc.position(id) else {
            return Ok(None);
        };

        let record = &mut doc.users[idx];
        if let Some(name) = patch.name {
            record.name = name;
        }
        if let Some(email) = patch.email {
            record.email = email;
        }
        if let Some(age) = patch.age {
            record.age = age;
        }
        record.updated_at = now();
        let updated = record.clone();

        self.store.write(&doc).await?;
        Ok(Some(updated.into()))
    }

    async fn delete(&self, id: u64) -> Result<bool, StorageError> {
        let mut doc = self.store.read().await?;
        let Some(idx) = doc.position(id) else {
            return Ok(false);
        };
        doc.users.remove(idx);
        self.store.write(&doc).await?;
        Ok(true)
    }

    async fn email_exists(
        &self,
        email: &str,
        exclude_id: Option<u64>,
    ) -> Result<bool, StorageError> {
        let doc = self.store.read().await?;
        let needle = email.to_lowercase();
        Ok(doc
            .users
            .iter()
            .any(|u| Some(u.id) != exclude_id && u.email.to_lowercase() == needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::entity::Document;

    async fn repo() -> (tempfile::TempDir, JsonFileUsersRepository) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("users.json"));
        store.ensure_initialized().await.unwrap();
        (dir, JsonFileUsersRepository::new(store))
    }

    fn ana() -> NewUser {
        NewUser {
            name: "Ana Martinez".into(),
            email: "ana@x.com".into(),
            age: 28,
        }
    }

    #[tokio::test]
    async fn create_takes_next_id_and_persists() {
        let (_dir, repo) = repo().await;
        let before = repo.store().read().await.unwrap().next_id;

        let user = repo.create(ana()).await.unwrap();
        assert_eq!(user.id, before);
        assert_eq!(user.created_at, user.updated_at);

        let doc = repo.store().read().await.unwrap();
        assert_eq!(doc.next_id, before + 1);
        assert_eq!(repo.find_by_id(user.id).await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn create_fails_when_ids_are_exhausted() {
        let (_dir, repo) = repo().await;
        repo.store()
            .write(&Document {
                users: Vec::new(),
                next_id: u64::MAX,
            })
            .await
            .unwrap();

        let err = repo.create(ana()).await.unwrap_err();
        assert!(matches!(err, StorageError::IdsExhausted { .. }), "got {err:?}");
        assert!(repo.store().read().await.unwrap().users.is_empty());
    }

    #[tokio::test]
    async fn update_merges_only_supplied_fields() {
        let (_dir, repo) = repo().await;
        let user = repo.create(ana()).await.unwrap();

        let patch = UserPatch {
            age: Some(29),
            ..Default::default()
        };
        let updated = repo.update(user.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.id, user.id);
        assert_eq!(updated.name, user.name);
        assert_eq!(updated.email, user.email);
        assert_eq!(updated.age, 29);
        assert_eq!(updated.created_at, user.created_at);
        assert!(updated.updated_at >= user.updated_at);
    }

    #[tokio::test]
    async fn update_and_delete_unknown_id() {
        let (_dir, repo) = repo().await;
        assert_eq!(repo.update(9, UserPatch::default()).await.unwrap(), None);
        assert!(!repo.delete(9).await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_record_and_keeps_counter() {
        let (_dir, repo) = repo().await;
        let user = repo.create(ana()).await.unwrap();
        assert!(repo.delete(user.id).await.unwrap());
        assert_eq!(repo.find_by_id(user.id).await.unwrap(), None);

        let doc = repo.store().read().await.unwrap();
        assert!(doc.users.is_empty());
        assert_eq!(doc.next_id, user.id + 1);
    }

    #[tokio::test]
    async fn email_exists_ignores_case_and_excluded_id() {
        let (_dir, repo) = repo().await;
        let user = repo.create(ana()).await.unwrap();

        assert!(repo.email_exists("ANA@x.com", None).await.unwrap());
        assert!(!repo.email_exists("ana@x.com", Some(user.id)).await.unwrap());
        assert!(repo.email_exists("ana@x.com", Some(user.id + 1)).await.unwrap());
        assert!(!repo.email_exists("bob@x.com", None).await.unwrap());
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let (_dir, repo) = repo().await;
        for (i, name) in ["Ana", "Bob", "Cleo"].iter().enumerate() {
            repo.create(NewUser {
                name: (*name).into(),
                email: format!("{i}@x.com"),
                age: 30,
            })
            .await
            .unwrap();
        }
        let names: Vec<String> = repo.list_all().await.unwrap().into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["Ana", "Bob", "Cleo"]);
    }

    #[tokio::test]
    async fn stale_counter_does_not_reuse_ids() {
        let (_dir, repo) = repo().await;
        let first = repo.create(ana()).await.unwrap();
        let mut doc = repo.store().read().await.unwrap();
        doc.next_id = 1;
        repo.store().write(&doc).await.unwrap();

        let second = repo
            .create(NewUser {
                name: "Bob".into(),
                email: "bob@x.com".into(),
                age: 40,
            })
            .await
            .unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileUsersRepository::new(JsonFileStore::new(dir.path().join("nope.json")));
        assert!(matches!(
            repo.list_all().await.unwrap_err(),
            StorageError::NotFound { .. }
        ));
        assert!(!dir.path().join("nope.json").exists());
    }
}

//! In-memory user repository.
//!
//! Same identifier format and update semantics as the MongoDB backend, so it
//! can stand in for it in local runs and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::{parse_id, StoreResult, UserFields, UserRecord, UserRepository};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<ObjectId, UserFields>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert(&self, fields: UserFields) -> StoreResult<String> {
        let id = ObjectId::new();
        self.users.write().await.insert(id, fields);
        Ok(id.to_hex())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<UserRecord>> {
        let oid = parse_id(id)?;
        Ok(self
            .users
            .read()
            .await
            .get(&oid)
            .map(|fields| UserRecord::new(oid.to_hex(), fields.clone().into_map())))
    }

    async fn update_by_id(&self, id: &str, fields: UserFields) -> StoreResult<u64> {
        let oid = parse_id(id)?;
        let mut users = self.users.write().await;
        match users.get_mut(&oid) {
            Some(existing) if *existing != fields => {
                *existing = fields;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<u64> {
        let oid = parse_id(id)?;
        Ok(u64::from(self.users.write().await.remove(&oid).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use serde_json::json;

    fn ada() -> UserFields {
        UserFields {
            name: json!("Ada"),
            email: json!("ada@example.com"),
            age: json!(36),
        }
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let repo = InMemoryUserRepository::new();
        let id = repo.insert(ada()).await.unwrap();
        assert_eq!(id.len(), 24);

        let record = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.fields, ada().into_map());
    }

    #[tokio::test]
    async fn test_find_missing_and_malformed() {
        let repo = InMemoryUserRepository::new();
        assert!(repo
            .find_by_id("507f1f77bcf86cd799439011")
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            repo.find_by_id("123").await,
            Err(StoreError::InvalidId(_))
        ));
    }

    #[tokio::test]
    async fn test_update_counts_only_real_changes() {
        let repo = InMemoryUserRepository::new();
        let id = repo.insert(ada()).await.unwrap();

        assert_eq!(repo.update_by_id(&id, ada()).await.unwrap(), 0);

        let older = UserFields {
            age: json!(37.5),
            ..ada()
        };
        assert_eq!(repo.update_by_id(&id, older.clone()).await.unwrap(), 1);
        assert_eq!(
            repo.find_by_id(&id).await.unwrap().unwrap().fields,
            older.into_map()
        );

        let unknown = ObjectId::new().to_hex();
        assert_eq!(repo.update_by_id(&unknown, ada()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryUserRepository::new();
        let id = repo.insert(ada()).await.unwrap();
        assert_eq!(repo.delete_by_id(&id).await.unwrap(), 1);
        assert_eq!(repo.delete_by_id(&id).await.unwrap(), 0);
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
    }
}

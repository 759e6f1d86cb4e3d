//! User record store
//!
//! The service never keeps records itself; every user endpoint goes through
//! a [`UserRepository`]. Identifiers are MongoDB ObjectIds rendered as hex.

mod memory;
mod mongo;

pub use memory::InMemoryUserRepository;
pub use mongo::MongoUserRepository;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Caller-supplied fields of a user record.
///
/// Values are kept exactly as sent, whatever their JSON type; absent fields
/// are stored as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserFields {
    pub name: Value,
    pub email: Value,
    pub age: Value,
}

impl UserFields {
    pub fn into_map(self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("name".to_string(), self.name);
        map.insert("email".to_string(), self.email);
        map.insert("age".to_string(), self.age);
        map
    }
}

/// A stored user as returned to clients: `_id` plus every stored field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl UserRecord {
    pub fn new(id: String, mut fields: Map<String, Value>) -> Self {
        fields.remove("_id");
        Self { id, fields }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid record identifier '{0}'")]
    InvalidId(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store serialization error: {0}")]
    Serialization(String),
    #[error("store operation failed: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Parse a path identifier into the store's identifier type
pub fn parse_id(id: &str) -> StoreResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Short backend name for log lines
    fn backend_name(&self) -> &'static str;

    /// Round-trip to the backend without touching records
    async fn ping(&self) -> StoreResult<()>;

    /// Insert a record and return the store-assigned identifier
    async fn insert(&self, fields: UserFields) -> StoreResult<String>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<UserRecord>>;

    /// Replace name/email/age; returns the number of records actually modified.
    ///
    /// A record whose stored values already equal `fields` counts as unmodified.
    async fn update_by_id(&self, id: &str, fields: UserFields) -> StoreResult<u64>;

    /// Returns the number of records deleted
    async fn delete_by_id(&self, id: &str) -> StoreResult<u64>;
}

/// Stand-in used when no store client could be constructed at startup
pub struct UnavailableUserRepository {
    reason: String,
}

impl UnavailableUserRepository {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> StoreResult<T> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }
}

#[async_trait]
impl UserRepository for UnavailableUserRepository {
    fn backend_name(&self) -> &'static str {
        "unavailable"
    }

    async fn ping(&self) -> StoreResult<()> {
        self.fail()
    }

    async fn insert(&self, _fields: UserFields) -> StoreResult<String> {
        self.fail()
    }

    async fn find_by_id(&self, _id: &str) -> StoreResult<Option<UserRecord>> {
        self.fail()
    }

    async fn update_by_id(&self, _id: &str, _fields: UserFields) -> StoreResult<u64> {
        self.fail()
    }

    async fn delete_by_id(&self, _id: &str) -> StoreResult<u64> {
        self.fail()
    }
}

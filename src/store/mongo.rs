//! MongoDB user repository

use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};

use super::{parse_id, StoreError, StoreResult, UserFields, UserRecord, UserRepository};
use crate::config::StoreConfig;

/// Field values go in as BSON converted from the caller's JSON, untouched
fn to_document(fields: &UserFields) -> StoreResult<Document> {
    mongodb::bson::to_document(fields).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Render a stored document for clients.
///
/// Every stored field is kept; BSON-only types use relaxed extended JSON.
fn record_from_document(mut document: Document, id: ObjectId) -> UserRecord {
    let id = match document.remove("_id") {
        Some(Bson::ObjectId(stored)) => stored.to_hex(),
        _ => id.to_hex(),
    };
    let fields = document
        .into_iter()
        .map(|(key, value)| (key, value.into_relaxed_extjson()))
        .collect();
    UserRecord::new(id, fields)
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => {
                Self::Unavailable(err.to_string())
            }
            ErrorKind::BsonDeserialization(_) | ErrorKind::BsonSerialization(_) => {
                Self::Serialization(err.to_string())
            }
            _ => Self::Backend(err.to_string()),
        }
    }
}

pub struct MongoUserRepository {
    database: Database,
    users: Collection<Document>,
}

impl MongoUserRepository {
    /// Build the client. No network round-trip happens here; the driver
    /// connects lazily, so call [`UserRepository::ping`] to probe.
    pub async fn connect(config: &StoreConfig, app_name: &str) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(config.connection_uri()).await?;
        let timeout = Duration::from_secs(config.connect_timeout_secs);
        options.app_name = Some(app_name.to_string());
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);
        let users = database.collection::<Document>(&config.collection);
        Ok(Self { database, users })
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    fn backend_name(&self) -> &'static str {
        "mongo"
    }

    async fn ping(&self) -> StoreResult<()> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    async fn insert(&self, fields: UserFields) -> StoreResult<String> {
        let result = self
            .users
            .insert_one(to_document(&fields)?, None)
            .await?;
        Ok(match result.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            other => other.to_string(),
        })
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<UserRecord>> {
        let oid = parse_id(id)?;
        let found = self.users.find_one(doc! { "_id": oid }, None).await?;
        Ok(found.map(|document| record_from_document(document, oid)))
    }

    async fn update_by_id(&self, id: &str, fields: UserFields) -> StoreResult<u64> {
        let oid = parse_id(id)?;
        let set = to_document(&fields)?;
        let result = self
            .users
            .update_one(doc! { "_id": oid }, doc! { "$set": set }, None)
            .await?;
        Ok(result.modified_count)
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<u64> {
        let oid = parse_id(id)?;
        let result = self.users.delete_one(doc! { "_id": oid }, None).await?;
        Ok(result.deleted_count)
    }
}

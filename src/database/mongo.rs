//! MongoDB database wrapper.

use anyhow::{Context, Result};
use mongodb::bson::doc;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use tracing::info;

/// Collection holding [`super::BotUser`] rows.
pub(super) const USERS: &str = "users";
/// Collection holding [`super::Relation`] rows.
pub(super) const RELATIONS: &str = "relations";

/// Database wrapper for MongoDB operations.
#[derive(Debug, Clone)]
pub struct Database {
    db: mongodb::Database,
}

impl Database {
    /// Connect to MongoDB with the given URI and database name.
    ///
    /// # Errors
    /// Returns error if connection fails.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self> {
        let options = ClientOptions::parse(uri)
            .await
            .context("Invalid MONGODB_URI")?;
        let client = Client::with_options(options)?;

        // Ping the database to verify connection
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .context("MongoDB ping failed")?;

        info!("Successfully connected to MongoDB");

        Ok(Self {
            db: client.database(db_name),
        })
    }

    /// Create the unique indexes the repositories rely on.
    ///
    /// Idempotent; run on every startup.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let unique = || IndexOptions::builder().unique(true).build();

        self.db
            .collection::<mongodb::bson::Document>(USERS)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "user_id": 1 })
                    .options(unique())
                    .build(),
            )
            .await
            .context("Failed to create users index")?;

        self.db
            .collection::<mongodb::bson::Document>(RELATIONS)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "user_id": 1, "kind": 1, "counterpart_id": 1 })
                    .options(unique())
                    .build(),
            )
            .await
            .context("Failed to create relations index")?;

        info!("MongoDB indexes ensured");
        Ok(())
    }

    /// Get a typed collection from the database.
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

/// Duplicate key (E11000) from a racing upsert on a unique index.
pub(super) fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == 11000,
        ErrorKind::Command(e) => e.code == 11000,
        _ => false,
    }
}

//! Persistence of conference documents, principals and domains.

pub mod memory;
pub mod postgres;

use thiserror::Error;

use crate::models::{Conference, Domain, Principal};

pub use memory::{MemoryStore, Seed};
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("could not read seed file {path}: {source}")]
    SeedIo {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid seed data: {0}")]
    SeedFormat(#[from] serde_json::Error),
}

/// Storage backend selected at startup
#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Postgres(PgStore),
}

impl Store {
    pub async fn load_conference(&self, id: &str) -> Result<Option<Conference>, StoreError> {
        match self {
            Store::Memory(store) => Ok(store.load_conference(id).await),
            Store::Postgres(store) => store.load_conference(id).await,
        }
    }

    /// Replaces the stored document with `conference`
    pub async fn save_conference(&self, conference: &Conference) -> Result<(), StoreError> {
        match self {
            Store::Memory(store) => {
                store.save_conference(conference).await;
                Ok(())
            }
            Store::Postgres(store) => store.save_conference(conference).await,
        }
    }

    pub async fn principal(&self, id: &str) -> Result<Option<Principal>, StoreError> {
        match self {
            Store::Memory(store) => Ok(store.principal(id).await),
            Store::Postgres(store) => store.principal(id).await,
        }
    }

    pub async fn principals(&self) -> Result<Vec<Principal>, StoreError> {
        match self {
            Store::Memory(store) => Ok(store.principals().await),
            Store::Postgres(store) => store.principals().await,
        }
    }

    pub async fn domains(&self) -> Result<Vec<Domain>, StoreError> {
        match self {
            Store::Memory(store) => Ok(store.domains().await),
            Store::Postgres(store) => store.domains().await,
        }
    }
}

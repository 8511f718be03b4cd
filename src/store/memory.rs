use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;

use super::StoreError;
use crate::models::{Conference, Domain, Principal};

/// Initial content of the in-memory store, as read from `SEED_PATH`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub conferences: Vec<Conference>,
    #[serde(default)]
    pub principals: Vec<Principal>,
    #[serde(default)]
    pub domains: Vec<Domain>,
}

impl Seed {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| StoreError::SeedIo {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[derive(Default)]
struct MemoryData {
    conferences: HashMap<String, Conference>,
    principals: Vec<Principal>,
    domains: Vec<Domain>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<MemoryData>>,
}

impl MemoryStore {
    pub fn from_seed(seed: Seed) -> Self {
        let data = MemoryData {
            conferences: seed
                .conferences
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect(),
            principals: seed.principals,
            domains: seed.domains,
        };
        MemoryStore {
            data: Arc::new(RwLock::new(data)),
        }
    }

    pub async fn load_conference(&self, id: &str) -> Option<Conference> {
        self.data.read().await.conferences.get(id).cloned()
    }

    pub async fn save_conference(&self, conference: &Conference) {
        self.data
            .write()
            .await
            .conferences
            .insert(conference.id.clone(), conference.clone());
    }

    pub async fn principal(&self, id: &str) -> Option<Principal> {
        self.data
            .read()
            .await
            .principals
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub async fn principals(&self) -> Vec<Principal> {
        self.data.read().await.principals.clone()
    }

    pub async fn domains(&self) -> Vec<Domain> {
        self.data.read().await.domains.clone()
    }
}

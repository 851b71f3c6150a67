use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::model::{Clinic, ConsumptionRecord, Subscriber};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage write failed: {0}")]
    Write(String),
}

/// Data-access seam for subscriber, consumption and clinic records.
///
/// The persistent store itself is an external collaborator; handlers only
/// go through this trait, which lets tests inject an in-memory map.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn find_subscriber(&self, phone: &str) -> Result<Option<Subscriber>, StoreError>;

    /// Inserts or replaces the subscriber keyed by its phone number.
    async fn save_subscriber(&self, subscriber: Subscriber) -> Result<(), StoreError>;

    async fn list_subscribers(&self) -> Result<Vec<Subscriber>, StoreError>;

    async fn insert_consumption(&self, record: ConsumptionRecord) -> Result<(), StoreError>;

    /// Consumptions for one subscriber, newest first.
    async fn list_consumptions(&self, phone: &str) -> Result<Vec<ConsumptionRecord>, StoreError>;

    async fn list_clinics(&self) -> Result<Vec<Clinic>, StoreError>;

    async fn insert_clinic(&self, clinic: Clinic) -> Result<(), StoreError>;

    fn name(&self) -> &'static str;
}

impl fmt::Debug for dyn DataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStore").field("impl", &self.name()).finish()
    }
}

pub struct InMemoryStore {
    subscribers: DashMap<String, Subscriber>,
    consumptions: DashMap<String, Vec<ConsumptionRecord>>,
    clinics: RwLock<Vec<Clinic>>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            subscribers: DashMap::new(),
            consumptions: DashMap::new(),
            clinics: RwLock::new(Vec::new()),
        })
    }
}

#[async_trait]
impl DataStore for InMemoryStore {
    async fn find_subscriber(&self, phone: &str) -> Result<Option<Subscriber>, StoreError> {
        Ok(self.subscribers.get(phone).map(|entry| entry.value().clone()))
    }

    async fn save_subscriber(&self, subscriber: Subscriber) -> Result<(), StoreError> {
        self.subscribers.insert(subscriber.phone.clone(), subscriber);
        Ok(())
    }

    async fn list_subscribers(&self) -> Result<Vec<Subscriber>, StoreError> {
        let mut all: Vec<Subscriber> =
            self.subscribers.iter().map(|entry| entry.value().clone()).collect();
        all.sort_by(|a, b| a.phone.cmp(&b.phone));
        Ok(all)
    }

    async fn insert_consumption(&self, record: ConsumptionRecord) -> Result<(), StoreError> {
        self.consumptions.entry(record.phone.clone()).or_default().push(record);
        Ok(())
    }

    async fn list_consumptions(&self, phone: &str) -> Result<Vec<ConsumptionRecord>, StoreError> {
        let mut records = self
            .consumptions
            .get(phone)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        records.sort_by(|a, b| b.fecha.cmp(&a.fecha));
        Ok(records)
    }

    async fn list_clinics(&self) -> Result<Vec<Clinic>, StoreError> {
        Ok(self.clinics.read().await.clone())
    }

    async fn insert_clinic(&self, clinic: Clinic) -> Result<(), StoreError> {
        self.clinics.write().await.push(clinic);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "InMemoryStore"
    }
}

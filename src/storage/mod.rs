//! Key-value persistence for the durable session slot.
//!
//! The session store only ever talks to [`SlotStore`]; which backend sits
//! behind it is decided by [`crate::config::SlotConfig`] at startup.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SlotConfig;

mod file;
mod memory;
mod postgres;
mod s3;

pub use file::FileSlots;
pub use memory::MemorySlots;
pub use postgres::PgSlots;
pub use s3::S3Slots;

#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    /// Removing a key that is not present succeeds.
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}

pub async fn connect(config: &SlotConfig) -> anyhow::Result<Arc<dyn SlotStore>> {
    let slots: Arc<dyn SlotStore> = match config {
        SlotConfig::Memory => Arc::new(MemorySlots::default()),
        SlotConfig::File { dir } => Arc::new(FileSlots::open(dir).await?),
        SlotConfig::Postgres { database_url } => Arc::new(PgSlots::connect(database_url).await?),
        SlotConfig::S3(s3) => Arc::new(S3Slots::new(s3).await?),
    };
    Ok(slots)
}

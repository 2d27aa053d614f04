use std::sync::Arc;

use anyhow::Context;

use crate::auth::{directory::Directory, seal::SnapshotSealer, SessionStore};
use crate::config::AppConfig;
use crate::shell::{NavigationMap, ViewShell};
use crate::storage::{self, SlotStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub session: Arc<SessionStore>,
    pub shell: Arc<ViewShell>,
}

impl AppState {
    /// Builds everything but does not initialize the session store; the
    /// caller decides when the slot is read.
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let slots = storage::connect(&config.slot)
            .await
            .context("open session slot backend")?;
        let directory = Arc::new(Directory::seeded(&config.seed_password)?);
        let navigation = NavigationMap::builtin().context("navigation map")?;
        Ok(Self::from_parts(config, slots, directory, navigation))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        slots: Arc<dyn SlotStore>,
        directory: Arc<Directory>,
        navigation: NavigationMap,
    ) -> Self {
        let session = Arc::new(SessionStore::new(
            slots,
            config.slot_key.clone(),
            directory,
            SnapshotSealer::new(&config.seal),
        ));
        Self {
            config,
            session,
            shell: Arc::new(ViewShell::new(navigation)),
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{SealConfig, SlotConfig, DEFAULT_SLOT_KEY};
        use crate::storage::MemorySlots;

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            slot: SlotConfig::Memory,
            slot_key: DEFAULT_SLOT_KEY.into(),
            seal: SealConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
            seed_password: "password123".into(),
        });
        let directory = Arc::new(Directory::seeded(&config.seed_password).expect("seed directory"));
        let navigation = NavigationMap::builtin().expect("builtin navigation is valid");
        Self::from_parts(config, Arc::new(MemorySlots::default()), directory, navigation)
    }
}

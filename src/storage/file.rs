use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::SlotStore;

lazy_static! {
    static ref KEY_RE: Regex = Regex::new(r"^[A-Za-z0-9._-]+$").unwrap();
}

/// One file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct FileSlots {
    dir: PathBuf,
}

impl FileSlots {
    pub async fn open(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create slot dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> anyhow::Result<PathBuf> {
        ensure!(KEY_RE.is_match(key), "invalid slot key {key:?}");
        Ok(self.dir.join(format!("{key}.slot")))
    }
}

#[async_trait]
impl SlotStore for FileSlots {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read slot {}", path.display())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("slot.tmp");
        tokio::fs::write(&tmp, value)
            .await
            .with_context(|| format!("write slot {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("replace slot {}", path.display()))?;
        debug!(key, path = %path.display(), "slot written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove slot {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let slots = FileSlots::open(dir.path()).await.unwrap();
        slots.set("grademe-user", "snapshot").await.unwrap();

        let reopened = FileSlots::open(dir.path()).await.unwrap();
        assert_eq!(
            reopened.get("grademe-user").await.unwrap().as_deref(),
            Some("snapshot")
        );
    }

    #[tokio::test]
    async fn remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let slots = FileSlots::open(dir.path()).await.unwrap();
        slots.remove("nothing-here").await.unwrap();
        assert_eq!(slots.get("nothing-here").await.unwrap(), None);
    }

    #[tokio::test]
    async fn rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let slots = FileSlots::open(dir.path()).await.unwrap();
        let err = slots.set("../escape", "x").await.unwrap_err();
        assert!(err.to_string().contains("invalid slot key"));
    }
}

use std::path::PathBuf;

use anyhow::{bail, Context};
use serde::Deserialize;

pub const DEFAULT_SLOT_KEY: &str = "grademe-user";

/// Upper bound for `SESSION_TTL_MINUTES`: five years.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 366 * 5;

#[derive(Debug, Clone, Deserialize)]
pub struct SealConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

/// Where the durable session slot lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum SlotConfig {
    Memory,
    File { dir: PathBuf },
    Postgres { database_url: String },
    S3(S3Config),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub slot: SlotConfig,
    pub slot_key: String,
    pub seal: SealConfig,
    pub seed_password: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| var(key).with_context(|| format!("{key} must be set"));

        let slot = match or("SLOT_BACKEND", "file").to_lowercase().as_str() {
            "memory" => SlotConfig::Memory,
            "file" => SlotConfig::File {
                dir: PathBuf::from(or("SLOT_DIR", ".grademe")),
            },
            "postgres" => SlotConfig::Postgres {
                database_url: required("DATABASE_URL")?,
            },
            "s3" => SlotConfig::S3(S3Config {
                endpoint: required("MINIO_ENDPOINT")?,
                bucket: required("MINIO_BUCKET")?,
                access_key: required("MINIO_ACCESS_KEY")?,
                secret_key: required("MINIO_SECRET_KEY")?,
                region: or("MINIO_REGION", "us-east-1"),
            }),
            other => bail!("unknown SLOT_BACKEND {other:?}"),
        };

        let seal = SealConfig {
            secret: required("SESSION_SECRET")?,
            issuer: or("SESSION_ISSUER", "grademe"),
            audience: or("SESSION_AUDIENCE", "grademe-shell"),
            ttl_minutes: ttl_minutes(var("SESSION_TTL_MINUTES"))?,
        };

        Ok(Self {
            host: or("APP_HOST", "127.0.0.1"),
            port: or("APP_PORT", "8080")
                .parse()
                .context("APP_PORT must be a port number")?,
            slot,
            slot_key: or("SLOT_KEY", DEFAULT_SLOT_KEY),
            seal,
            seed_password: or("DIRECTORY_SEED_PASSWORD", "password123"),
        })
    }
}

fn ttl_minutes(raw: Option<String>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(60 * 24 * 14);
    };
    let minutes: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("SESSION_TTL_MINUTES must be a number, got {raw:?}"))?;
    if !(1..=MAX_TTL_MINUTES).contains(&minutes) {
        bail!("SESSION_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {minutes}");
    }
    Ok(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_use_file_backend() {
        let cfg = AppConfig::from_lookup(lookup(&[("SESSION_SECRET", "s")])).unwrap();
        assert!(matches!(cfg.slot, SlotConfig::File { ref dir } if dir == &PathBuf::from(".grademe")));
        assert_eq!(cfg.slot_key, "grademe-user");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.seal.ttl_minutes, 60 * 24 * 14);
        assert_eq!(cfg.seed_password, "password123");
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("SESSION_SECRET"));
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let err = AppConfig::from_lookup(lookup(&[
            ("SESSION_SECRET", "s"),
            ("SLOT_BACKEND", "postgres"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn s3_backend_reads_minio_settings() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("SESSION_SECRET", "s"),
            ("SLOT_BACKEND", "S3"),
            ("MINIO_ENDPOINT", "http://localhost:9000"),
            ("MINIO_BUCKET", "slots"),
            ("MINIO_ACCESS_KEY", "a"),
            ("MINIO_SECRET_KEY", "b"),
        ]))
        .unwrap();
        match cfg.slot {
            SlotConfig::S3(s3) => {
                assert_eq!(s3.bucket, "slots");
                assert_eq!(s3.region, "us-east-1");
            }
            other => panic!("unexpected slot config {other:?}"),
        }
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[
            ("SESSION_SECRET", "s"),
            ("SLOT_BACKEND", "redis"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("redis"));
    }

    #[test]
    fn session_ttl_must_be_in_range() {
        for bad in ["0", "-5", "1000000000000", "9223372036854775807", "soon"] {
            let err = AppConfig::from_lookup(lookup(&[
                ("SESSION_SECRET", "s"),
                ("SESSION_TTL_MINUTES", bad),
            ]))
            .unwrap_err();
            assert!(err.to_string().contains("SESSION_TTL_MINUTES"), "{bad}: {err}");
        }

        let cfg = AppConfig::from_lookup(lookup(&[
            ("SESSION_SECRET", "s"),
            ("SESSION_TTL_MINUTES", "30"),
        ]))
        .unwrap();
        assert_eq!(cfg.seal.ttl_minutes, 30);
    }
}

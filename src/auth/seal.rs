use std::time::Duration;

use anyhow::Context;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::identity::Identity;
use crate::config::SealConfig;

/// Payload written to the durable slot.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotClaims {
    sub: Uuid,
    iat: usize,
    exp: usize,
    iss: String,
    aud: String,
    identity: Identity,
}

/// Signs identity snapshots before they reach the slot and checks them
/// on the way back, so a tampered or expired slot reads as logged out.
#[derive(Clone)]
pub struct SnapshotSealer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl SnapshotSealer {
    pub fn new(cfg: &SealConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs((cfg.ttl_minutes.max(0) as u64).saturating_mul(60)),
        }
    }

    pub fn seal(&self, identity: &Identity) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|secs| now.checked_add(TimeDuration::seconds(secs)))
            .context("snapshot expiry out of range")?;
        let claims = SnapshotClaims {
            sub: identity.id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            identity: identity.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(identity_id = %identity.id, "snapshot sealed");
        Ok(token)
    }

    pub fn open(&self, token: &str) -> anyhow::Result<Identity> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.leeway = 0;
        let data = decode::<SnapshotClaims>(token, &self.decoding, &validation)?;
        if data.claims.sub != data.claims.identity.id {
            anyhow::bail!("snapshot subject does not match identity");
        }
        debug!(identity_id = %data.claims.sub, "snapshot opened");
        Ok(data.claims.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity::{NotificationSettings, Role};

    fn cfg(secret: &str, issuer: &str, ttl_minutes: i64) -> SealConfig {
        SealConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: "grademe-shell".into(),
            ttl_minutes,
        }
    }

    fn identity() -> Identity {
        Identity {
            id: Uuid::from_u128(2),
            name: "Kasun Perera".into(),
            email: "kasun@student.com".into(),
            role: Role::Student,
            profile_photo: Some("data:image/png;base64,AAAA".into()),
            student_id: Some("ST001".into()),
            phone: Some("0771234567".into()),
            address: None,
            birth_date: None,
            notification_settings: NotificationSettings { email: true, sms: true },
        }
    }

    #[test]
    fn seal_and_open() {
        let sealer = SnapshotSealer::new(&cfg("dev-secret", "grademe", 60));
        let token = sealer.seal(&identity()).expect("seal");
        assert_eq!(sealer.open(&token).expect("open"), identity());
    }

    #[test]
    fn open_rejects_other_secret() {
        let token = SnapshotSealer::new(&cfg("one", "grademe", 60))
            .seal(&identity())
            .unwrap();
        assert!(SnapshotSealer::new(&cfg("two", "grademe", 60)).open(&token).is_err());
    }

    #[test]
    fn open_rejects_wrong_issuer() {
        let token = SnapshotSealer::new(&cfg("same", "good-iss", 60))
            .seal(&identity())
            .unwrap();
        assert!(SnapshotSealer::new(&cfg("same", "bad-iss", 60)).open(&token).is_err());
    }

    #[test]
    fn open_rejects_expired_snapshot() {
        let sealer = SnapshotSealer::new(&cfg("dev-secret", "grademe", 0));
        let token = sealer.seal(&identity()).unwrap();
        std::thread::sleep(Duration::from_millis(1100));
        assert!(sealer.open(&token).is_err());
    }

    #[test]
    fn open_rejects_plain_json() {
        let sealer = SnapshotSealer::new(&cfg("dev-secret", "grademe", 60));
        let raw = serde_json::to_string(&identity()).unwrap();
        assert!(sealer.open(&raw).is_err());
    }

    #[test]
    fn oversized_ttl_fails_instead_of_panicking() {
        for minutes in [1_000_000_000_000, i64::MAX] {
            let sealer = SnapshotSealer::new(&cfg("dev-secret", "grademe", minutes));
            assert!(sealer.seal(&identity()).is_err(), "{minutes}");
        }
    }
}

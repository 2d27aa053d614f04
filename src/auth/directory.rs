use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use super::identity::{Identity, NotificationSettings, Role};
use super::password::Credential;

/// Known identities. The set is compiled in; only credentials change at
/// runtime (password change).
pub struct Directory {
    entries: RwLock<Vec<DirectoryEntry>>,
}

struct DirectoryEntry {
    identity: Identity,
    credential: Credential,
}

fn builtin_identities() -> Vec<Identity> {
    let base = |id: u128, name: &str, email: &str, role: Role| Identity {
        id: Uuid::from_u128(id),
        name: name.into(),
        email: email.into(),
        role,
        profile_photo: None,
        student_id: None,
        phone: None,
        address: None,
        birth_date: None,
        notification_settings: NotificationSettings::default(),
    };

    vec![
        Identity {
            notification_settings: NotificationSettings { email: true, sms: false },
            ..base(1, "Admin User", "admin@grademe.com", Role::Admin)
        },
        Identity {
            student_id: Some("ST001".into()),
            notification_settings: NotificationSettings { email: true, sms: true },
            ..base(2, "Kasun Perera", "kasun@student.com", Role::Student)
        },
        Identity {
            student_id: Some("ST002".into()),
            notification_settings: NotificationSettings { email: false, sms: true },
            ..base(3, "Nimali Silva", "nimali@student.com", Role::Student)
        },
    ]
}

impl Directory {
    /// Builds the built-in directory, giving every identity its own salted
    /// hash of `seed_password`.
    pub fn seeded(seed_password: &str) -> anyhow::Result<Self> {
        let mut entries = Vec::new();
        for identity in builtin_identities() {
            entries.push(DirectoryEntry {
                credential: Credential::from_plain(seed_password)?,
                identity,
            });
        }
        warn!(
            count = entries.len(),
            "directory seeded from a shared password; not for production use"
        );
        Ok(Self {
            entries: RwLock::new(entries),
        })
    }

    /// Exact, case-sensitive lookup followed by credential verification.
    pub async fn authenticate(&self, email: &str, password: &str) -> anyhow::Result<Option<Identity>> {
        let entries = self.entries.read().await;
        let Some(entry) = entries.iter().find(|e| e.identity.email == email) else {
            return Ok(None);
        };
        if entry.credential.matches(password)? {
            Ok(Some(entry.identity.clone()))
        } else {
            Ok(None)
        }
    }

    /// Checks `password` against the credential of identity `id`.
    pub async fn verify(&self, id: Uuid, password: &str) -> anyhow::Result<bool> {
        let entries = self.entries.read().await;
        match entries.iter().find(|e| e.identity.id == id) {
            Some(entry) => entry.credential.matches(password),
            None => Ok(false),
        }
    }

    pub async fn set_password(&self, id: Uuid, password: &str) -> anyhow::Result<()> {
        let credential = Credential::from_plain(password)?;
        let mut entries = self.entries.write().await;
        let entry = entries
            .iter_mut()
            .find(|e| e.identity.id == id)
            .ok_or_else(|| anyhow::anyhow!("identity {id} not in directory"))?;
        entry.credential = credential;
        info!(identity_id = %id, "credential replaced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn authenticates_known_identity() {
        let dir = Directory::seeded("password123").unwrap();
        let identity = dir
            .authenticate("admin@grademe.com", "password123")
            .await
            .unwrap()
            .expect("admin should authenticate");
        assert_eq!(identity.role, Role::Admin);
        assert_eq!(identity.name, "Admin User");
    }

    #[tokio::test]
    async fn lookup_is_case_sensitive() {
        let dir = Directory::seeded("password123").unwrap();
        assert!(dir
            .authenticate("Admin@grademe.com", "password123")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn students_carry_student_ids() {
        let dir = Directory::seeded("password123").unwrap();
        let kasun = dir
            .authenticate("kasun@student.com", "password123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kasun.student_id.as_deref(), Some("ST001"));
        assert_eq!(kasun.notification_settings, NotificationSettings { email: true, sms: true });
    }

    #[tokio::test]
    async fn set_password_replaces_credential() {
        let dir = Directory::seeded("password123").unwrap();
        let id = Uuid::from_u128(3);
        dir.set_password(id, "new-secret-1").await.unwrap();
        assert!(!dir.verify(id, "password123").await.unwrap());
        assert!(dir
            .authenticate("nimali@student.com", "new-secret-1")
            .await
            .unwrap()
            .is_some());
    }
}

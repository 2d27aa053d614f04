use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::directory::Directory;
use super::error::SessionError;
use super::identity::{Identity, ProfileUpdate};
use super::password::check_new_password;
use super::seal::SnapshotSealer;
use crate::storage::SlotStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "identity", rename_all = "lowercase")]
pub enum SessionState {
    Initializing,
    Unauthenticated,
    Authenticated(Identity),
}

/// Who is signed in on this client, persisted to one durable slot.
///
/// Every operation holds the state lock across its slot I/O, so state
/// transitions are applied one at a time. Slot failures never fail an
/// operation: the store logs them, keeps the in-memory state and reports
/// itself as non-durable until a later slot write succeeds.
pub struct SessionStore {
    slots: Arc<dyn SlotStore>,
    slot_key: String,
    directory: Arc<Directory>,
    sealer: SnapshotSealer,
    state: Mutex<SessionState>,
    durable: AtomicBool,
}

impl SessionStore {
    pub fn new(
        slots: Arc<dyn SlotStore>,
        slot_key: impl Into<String>,
        directory: Arc<Directory>,
        sealer: SnapshotSealer,
    ) -> Self {
        Self {
            slots,
            slot_key: slot_key.into(),
            directory,
            sealer,
            state: Mutex::new(SessionState::Initializing),
            durable: AtomicBool::new(true),
        }
    }

    /// Loads the snapshot from the slot. Only the first call does anything.
    #[instrument(skip(self), fields(slot = %self.slot_key))]
    pub async fn initialize(&self) {
        let mut state = self.state.lock().await;
        if *state != SessionState::Initializing {
            return;
        }

        *state = match self.slots.get(&self.slot_key).await {
            Ok(Some(raw)) => match self.sealer.open(&raw) {
                Ok(identity) => {
                    info!(identity_id = %identity.id, role = %identity.role, "session restored");
                    SessionState::Authenticated(identity)
                }
                Err(e) => {
                    warn!(error = %e, "discarding unreadable session snapshot");
                    self.clear_slot().await;
                    SessionState::Unauthenticated
                }
            },
            Ok(None) => {
                debug!("no session snapshot");
                SessionState::Unauthenticated
            }
            Err(e) => {
                warn!(error = %e, "session slot unreadable; continuing without persistence");
                self.durable.store(false, Ordering::Relaxed);
                SessionState::Unauthenticated
            }
        };
    }

    pub async fn is_initializing(&self) -> bool {
        *self.state.lock().await == SessionState::Initializing
    }

    pub async fn state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn current(&self) -> Option<Identity> {
        match &*self.state.lock().await {
            SessionState::Authenticated(identity) => Some(identity.clone()),
            _ => None,
        }
    }

    /// Tracks the most recent slot operation: false after a failure, true
    /// again once a later write or removal succeeds.
    pub fn is_durable(&self) -> bool {
        self.durable.load(Ordering::Relaxed)
    }

    /// Returns whether the credentials matched. On a mismatch neither the
    /// current identity nor the slot changes.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> bool {
        let mut state = self.state.lock().await;

        let identity = match self.directory.authenticate(email, password).await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                warn!(email, "login failed: invalid credentials");
                return false;
            }
            Err(e) => {
                warn!(error = %e, email, "login failed: credential check error");
                return false;
            }
        };

        self.persist(&identity).await;
        info!(identity_id = %identity.id, role = %identity.role, "logged in");
        *state = SessionState::Authenticated(identity);
        true
    }

    /// Clears the identity and the slot. Safe to call when logged out.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let mut state = self.state.lock().await;
        if let SessionState::Authenticated(identity) = &*state {
            info!(identity_id = %identity.id, "logged out");
        }
        *state = SessionState::Unauthenticated;
        self.clear_slot().await;
    }

    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<Identity, SessionError> {
        let mut state = self.state.lock().await;
        let identity = match &mut *state {
            SessionState::Authenticated(identity) => identity,
            SessionState::Initializing => return Err(SessionError::Initializing),
            SessionState::Unauthenticated => return Err(SessionError::NoActiveSession),
        };

        identity.apply(update);
        let updated = identity.clone();
        self.persist(&updated).await;
        info!(identity_id = %updated.id, "profile updated");
        Ok(updated)
    }

    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> Result<(), SessionError> {
        let state = self.state.lock().await;
        let id = match &*state {
            SessionState::Authenticated(identity) => identity.id,
            SessionState::Initializing => return Err(SessionError::Initializing),
            SessionState::Unauthenticated => return Err(SessionError::NoActiveSession),
        };

        check_new_password(new, confirm)?;
        if !self.directory.verify(id, current).await? {
            warn!(identity_id = %id, "password change rejected: wrong current password");
            return Err(SessionError::InvalidCredentials);
        }

        self.directory.set_password(id, new).await?;
        info!(identity_id = %id, "password changed");
        Ok(())
    }

    async fn persist(&self, identity: &Identity) {
        let sealed = match self.sealer.seal(identity) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "snapshot sealing failed; session kept in memory only");
                self.durable.store(false, Ordering::Relaxed);
                return;
            }
        };
        match self.slots.set(&self.slot_key, &sealed).await {
            Ok(()) => self.durable.store(true, Ordering::Relaxed),
            Err(e) => {
                warn!(error = %e, "session slot write failed; session kept in memory only");
                self.durable.store(false, Ordering::Relaxed);
            }
        }
    }

    async fn clear_slot(&self) {
        match self.slots.remove(&self.slot_key).await {
            Ok(()) => self.durable.store(true, Ordering::Relaxed),
            Err(e) => {
                warn!(error = %e, "session slot removal failed");
                self.durable.store(false, Ordering::Relaxed);
            }
        }
    }
}

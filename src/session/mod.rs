//! Administrator session gate.
//!
//! Tracks whether the signed-in visitor is the single configured administrator.
//! The flag is recomputed from the backend's current user on every check.

use std::sync::Arc;

use subtle::ConstantTimeEq;
use tokio::sync::{broadcast::error::RecvError, watch};
use tokio::task::JoinHandle;

use crate::backend::{AuthEvent, AuthProvider};
use crate::errors::AppError;

/// Snapshot of the session as seen by the views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub email: Option<String>,
    pub is_admin: bool,
    /// True while a status check is in flight.
    pub loading: bool,
}

pub struct SessionGate {
    auth: Arc<dyn AuthProvider>,
    admin_email: Option<String>,
    state: watch::Sender<SessionState>,
}

impl SessionGate {
    pub fn new(auth: Arc<dyn AuthProvider>, admin_email: Option<String>) -> Self {
        let (state, _) = watch::channel(SessionState {
            loading: true,
            ..SessionState::default()
        });
        Self {
            auth,
            admin_email,
            state,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Re-read the current user and recompute the admin flag.
    ///
    /// A failed lookup leaves the visitor as non-admin and returns the error.
    pub async fn check_status(&self) -> Result<bool, AppError> {
        self.state.send_modify(|s| s.loading = true);

        match self.auth.current_user().await {
            Ok(user) => {
                let email = user.and_then(|u| u.email);
                let is_admin = matches_admin(email.as_deref(), self.admin_email.as_deref());
                self.state.send_replace(SessionState {
                    email,
                    is_admin,
                    loading: false,
                });
                Ok(is_admin)
            }
            Err(e) => {
                tracing::warn!("Session check failed: {}", e);
                self.state.send_replace(SessionState::default());
                Err(e)
            }
        }
    }

    /// Password sign-in followed by a status check.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<bool, AppError> {
        self.auth.sign_in(email, password).await?;
        self.check_status().await
    }

    /// Sign out remotely; the local flag is cleared only when that succeeds.
    pub async fn logout(&self) -> Result<(), AppError> {
        if let Err(e) = self.auth.sign_out().await {
            tracing::error!("Logout failed: {}", e);
            return Err(e);
        }
        self.state.send_replace(SessionState::default());
        Ok(())
    }

    /// Check once now, then again after every sign-in or sign-out.
    ///
    /// The subscription lives as long as the returned guard.
    pub fn watch(self: &Arc<Self>) -> SessionWatcher {
        let mut events = self.auth.subscribe();
        let gate = Arc::clone(self);

        let task = tokio::spawn(async move {
            let _ = gate.check_status().await;
            loop {
                match events.recv().await {
                    Ok(AuthEvent::SignedIn(_)) | Ok(AuthEvent::SignedOut) => {
                        let _ = gate.check_status().await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!("Missed {} auth events, re-checking", skipped);
                        let _ = gate.check_status().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        SessionWatcher { task }
    }
}

/// Keeps the auth subscription alive; dropping it unsubscribes.
pub struct SessionWatcher {
    task: JoinHandle<()>,
}

impl Drop for SessionWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Exact, case-sensitive match against the configured administrator.
fn matches_admin(email: Option<&str>, admin: Option<&str>) -> bool {
    match (email, admin) {
        (Some(email), Some(admin)) => email.as_bytes().ct_eq(admin.as_bytes()).into(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::backend::{Call, Faults, MemoryBackend};

    const ADMIN: &str = "doctor@example.com";

    fn gate_with(backend: &Arc<MemoryBackend>) -> Arc<SessionGate> {
        Arc::new(SessionGate::new(backend.clone(), Some(ADMIN.to_string())))
    }

    fn backend() -> Arc<MemoryBackend> {
        Arc::new(
            MemoryBackend::new()
                .with_user(ADMIN, "secret")
                .with_user("visitor@example.com", "pw")
                .with_user("Doctor@example.com", "pw"),
        )
    }

    #[test]
    fn test_matches_admin_is_exact() {
        assert!(matches_admin(Some(ADMIN), Some(ADMIN)));
        assert!(!matches_admin(Some("Doctor@example.com"), Some(ADMIN)));
        assert!(!matches_admin(Some("doctor@example.com "), Some(ADMIN)));
        assert!(!matches_admin(None, Some(ADMIN)));
        assert!(!matches_admin(Some(ADMIN), None));
    }

    #[tokio::test]
    async fn test_starts_loading_and_not_admin() {
        let gate = gate_with(&backend());
        assert!(gate.loading());
        assert!(!gate.is_admin());
    }

    #[tokio::test]
    async fn test_sign_in_as_admin() {
        let backend = backend();
        let gate = gate_with(&backend);

        assert!(gate.sign_in(ADMIN, "secret").await.unwrap());
        let state = gate.state();
        assert!(state.is_admin);
        assert!(!state.loading);
        assert_eq!(state.email.as_deref(), Some(ADMIN));
    }

    #[tokio::test]
    async fn test_other_users_are_not_admin() {
        let backend = backend();
        let gate = gate_with(&backend);

        assert!(!gate.sign_in("visitor@example.com", "pw").await.unwrap());
        assert!(!gate.sign_in("Doctor@example.com", "pw").await.unwrap());
        assert!(!gate.is_admin());
    }

    #[tokio::test]
    async fn test_failed_sign_in_keeps_state() {
        let backend = backend();
        let gate = gate_with(&backend);
        gate.check_status().await.unwrap();

        let err = gate.sign_in(ADMIN, "wrong").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert!(!gate.is_admin());
    }

    #[tokio::test]
    async fn test_check_status_is_idempotent() {
        let backend = backend();
        let gate = gate_with(&backend);
        gate.sign_in(ADMIN, "secret").await.unwrap();

        let first = gate.check_status().await.unwrap();
        let second = gate.check_status().await.unwrap();
        assert_eq!(first, second);
        assert!(second);
    }

    #[tokio::test]
    async fn test_check_status_failure_means_not_admin() {
        let backend = backend();
        let gate = gate_with(&backend);
        gate.sign_in(ADMIN, "secret").await.unwrap();

        backend
            .set_faults(Faults {
                current_user: Some("network down".into()),
                ..Faults::default()
            })
            .await;
        assert!(gate.check_status().await.is_err());
        assert!(!gate.is_admin());
        assert!(!gate.loading());
    }

    #[tokio::test]
    async fn test_logout_clears_admin() {
        let backend = backend();
        let gate = gate_with(&backend);
        gate.sign_in(ADMIN, "secret").await.unwrap();

        gate.logout().await.unwrap();
        assert!(!gate.is_admin());
        assert!(backend.calls().await.contains(&Call::SignOut));
    }

    #[tokio::test]
    async fn test_logout_failure_leaves_state_unchanged() {
        let backend = backend();
        let gate = gate_with(&backend);
        gate.sign_in(ADMIN, "secret").await.unwrap();
        backend
            .set_faults(Faults {
                sign_out: Some("sign-out rejected".into()),
                ..Faults::default()
            })
            .await;

        let err = gate.logout().await.unwrap_err();
        assert_eq!(err.message(), "sign-out rejected");
        assert!(gate.is_admin());
    }

    #[tokio::test]
    async fn test_watcher_reacts_to_auth_events() {
        let backend = backend();
        let gate = gate_with(&backend);
        let mut rx = gate.subscribe();
        let _watcher = gate.watch();

        // Sign in behind the gate's back; the event drives the re-check.
        backend.sign_in(ADMIN, "secret").await.unwrap();
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| s.is_admin))
            .await
            .expect("admin flag not set")
            .unwrap();

        backend.sign_out().await.unwrap();
        tokio::time::timeout(
            Duration::from_secs(2),
            rx.wait_for(|s| !s.is_admin && !s.loading),
        )
        .await
        .expect("admin flag not cleared")
        .unwrap();
    }
}

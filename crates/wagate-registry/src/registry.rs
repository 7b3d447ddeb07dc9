// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concurrent instance-id to session map.
//!
//! Each entry is replaced as a whole, so a lookup observes either the old or
//! the new state of an instance and never a partially built session.

use std::ops::Deref;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use strum::Display;
use thiserror::Error;
use tracing::{debug, info};

use wagate_core::{InstanceId, InstanceSession, WagateError};

/// Externally visible state of a registered instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    /// Known to the system, waiting for (re)authentication.
    Pending,
    /// Has a live authenticated session.
    Authenticated,
}

/// Why a session lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("instance not found: {0}")]
    NotFound(InstanceId),
    #[error("instance not authenticated: {0}")]
    NotAuthenticated(InstanceId),
}

impl From<LookupError> for WagateError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::NotFound(id) => WagateError::InstanceNotFound {
                instance_id: id.0,
            },
            LookupError::NotAuthenticated(id) => WagateError::InstanceNotAuthenticated {
                instance_id: id.0,
            },
        }
    }
}

#[derive(Clone)]
enum InstanceEntry {
    Pending,
    Authenticated(Arc<dyn InstanceSession>),
}

impl InstanceEntry {
    fn status(&self) -> InstanceStatus {
        match self {
            InstanceEntry::Pending => InstanceStatus::Pending,
            InstanceEntry::Authenticated(_) => InstanceStatus::Authenticated,
        }
    }
}

/// Borrowed access to a live session for the duration of one operation.
///
/// Not `Clone`: each operation asks the registry again, so a session revoked
/// between requests is never reused.
pub struct SessionHandle {
    session: Arc<dyn InstanceSession>,
}

impl Deref for SessionHandle {
    type Target = dyn InstanceSession;

    fn deref(&self) -> &Self::Target {
        self.session.as_ref()
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("instance_id", self.session.instance_id())
            .field("own_address", &self.session.own_address().to_string())
            .finish()
    }
}

/// Registry of instances and their live sessions.
#[derive(Default)]
pub struct InstanceRegistry {
    entries: DashMap<InstanceId, InstanceEntry>,
}

impl InstanceRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance that has not authenticated yet.
    ///
    /// Returns `false` and leaves the entry untouched if the instance is
    /// already known.
    pub fn register_pending(&self, instance_id: InstanceId) -> bool {
        let mut inserted = false;
        self.entries.entry(instance_id.clone()).or_insert_with(|| {
            inserted = true;
            InstanceEntry::Pending
        });
        if inserted {
            debug!(instance_id = %instance_id, "instance registered as pending");
        }
        inserted
    }

    /// Publish a fully authenticated session, replacing any previous entry.
    pub fn authenticate(&self, session: Arc<dyn InstanceSession>) {
        let instance_id = session.instance_id().clone();
        let own_address = session.own_address().to_string();
        self.entries
            .insert(instance_id.clone(), InstanceEntry::Authenticated(session));
        info!(instance_id = %instance_id, address = %own_address, "instance authenticated");
    }

    /// Drop the live session but keep the instance known.
    ///
    /// Returns `false` if the instance is unknown.
    pub fn logout(&self, instance_id: &InstanceId) -> bool {
        match self.entries.get_mut(instance_id) {
            Some(mut entry) => {
                *entry = InstanceEntry::Pending;
                info!(instance_id = %instance_id, "instance logged out");
                true
            }
            None => false,
        }
    }

    /// Forget an instance entirely. Returns `false` if it was unknown.
    pub fn remove(&self, instance_id: &InstanceId) -> bool {
        let removed = self.entries.remove(instance_id).is_some();
        if removed {
            info!(instance_id = %instance_id, "instance removed");
        }
        removed
    }

    /// Look up the authenticated session of `instance_id`.
    ///
    /// The map guard is released before returning; the handle owns a
    /// reference to the session that was live at lookup time.
    pub fn get_authenticated_instance(
        &self,
        instance_id: &InstanceId,
    ) -> Result<SessionHandle, LookupError> {
        let entry = self
            .entries
            .get(instance_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| LookupError::NotFound(instance_id.clone()))?;

        match entry {
            InstanceEntry::Authenticated(session) => Ok(SessionHandle { session }),
            InstanceEntry::Pending => Err(LookupError::NotAuthenticated(instance_id.clone())),
        }
    }

    /// Current status of an instance, or `None` if unknown.
    pub fn status(&self, instance_id: &InstanceId) -> Option<InstanceStatus> {
        self.entries.get(instance_id).map(|entry| entry.status())
    }

    /// All known instances with their status, sorted by id.
    pub fn list(&self) -> Vec<(InstanceId, InstanceStatus)> {
        let mut all: Vec<_> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().status()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Returns the number of known instances.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no instances are known.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use wagate_core::{Jid, MessageContent, SendReceipt};

    struct StubSession {
        instance_id: InstanceId,
        own_address: Jid,
    }

    impl StubSession {
        fn new(id: &str, phone: &str) -> Arc<dyn InstanceSession> {
            Arc::new(Self {
                instance_id: InstanceId::from(id),
                own_address: wagate_core::resolve(phone).unwrap(),
            })
        }
    }

    #[async_trait]
    impl InstanceSession for StubSession {
        fn instance_id(&self) -> &InstanceId {
            &self.instance_id
        }

        fn own_address(&self) -> &Jid {
            &self.own_address
        }

        async fn send_message(
            &self,
            _to: &Jid,
            _content: &MessageContent,
        ) -> Result<SendReceipt, WagateError> {
            Ok(SendReceipt {
                message_id: "stub".into(),
                timestamp: 0,
            })
        }
    }

    #[test]
    fn unknown_instance_is_not_found() {
        let registry = InstanceRegistry::new();
        let err = registry
            .get_authenticated_instance(&InstanceId::from("ghost"))
            .unwrap_err();
        assert_eq!(err, LookupError::NotFound(InstanceId::from("ghost")));
        assert!(registry.status(&InstanceId::from("ghost")).is_none());
    }

    #[test]
    fn pending_instance_is_not_authenticated() {
        let registry = InstanceRegistry::new();
        assert!(registry.register_pending(InstanceId::from("abc")));
        let err = registry
            .get_authenticated_instance(&InstanceId::from("abc"))
            .unwrap_err();
        assert_eq!(err, LookupError::NotAuthenticated(InstanceId::from("abc")));
        assert_eq!(
            registry.status(&InstanceId::from("abc")),
            Some(InstanceStatus::Pending)
        );
    }

    #[test]
    fn register_pending_does_not_downgrade_live_session() {
        let registry = InstanceRegistry::new();
        registry.authenticate(StubSession::new("abc", "5511999990000"));
        assert!(!registry.register_pending(InstanceId::from("abc")));
        assert!(
            registry
                .get_authenticated_instance(&InstanceId::from("abc"))
                .is_ok()
        );
    }

    #[test]
    fn authenticated_instance_exposes_identity() {
        let registry = InstanceRegistry::new();
        registry.authenticate(StubSession::new("abc", "5511999990000"));
        let handle = registry
            .get_authenticated_instance(&InstanceId::from("abc"))
            .unwrap();
        assert_eq!(handle.instance_id().as_str(), "abc");
        assert_eq!(handle.own_address().user(), "5511999990000");
    }

    #[test]
    fn logout_and_remove_transitions() {
        let registry = InstanceRegistry::new();
        let id = InstanceId::from("abc");
        registry.authenticate(StubSession::new("abc", "5511999990000"));

        assert!(registry.logout(&id));
        assert_eq!(registry.status(&id), Some(InstanceStatus::Pending));
        assert!(matches!(
            registry.get_authenticated_instance(&id),
            Err(LookupError::NotAuthenticated(_))
        ));

        assert!(registry.remove(&id));
        assert!(!registry.remove(&id));
        assert!(!registry.logout(&id));
        assert!(registry.is_empty());
    }

    #[test]
    fn handle_outlives_logout() {
        let registry = InstanceRegistry::new();
        let id = InstanceId::from("abc");
        registry.authenticate(StubSession::new("abc", "5511999990000"));
        let handle = registry.get_authenticated_instance(&id).unwrap();
        registry.logout(&id);
        // The in-flight operation keeps its session; new lookups do not.
        assert_eq!(handle.instance_id().as_str(), "abc");
        assert!(registry.get_authenticated_instance(&id).is_err());
    }

    #[test]
    fn list_is_sorted_by_id() {
        let registry = InstanceRegistry::new();
        registry.register_pending(InstanceId::from("zeta"));
        registry.authenticate(StubSession::new("alpha", "5511999990000"));
        let listed = registry.list();
        assert_eq!(
            listed,
            vec![
                (InstanceId::from("alpha"), InstanceStatus::Authenticated),
                (InstanceId::from("zeta"), InstanceStatus::Pending),
            ]
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn lookup_error_maps_to_distinct_wagate_errors() {
        let not_found: WagateError = LookupError::NotFound(InstanceId::from("x")).into();
        assert!(matches!(not_found, WagateError::InstanceNotFound { .. }));
        let not_auth: WagateError = LookupError::NotAuthenticated(InstanceId::from("x")).into();
        assert!(matches!(not_auth, WagateError::InstanceNotAuthenticated { .. }));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(InstanceStatus::Authenticated.to_string(), "authenticated");
        assert_eq!(
            serde_json::to_string(&InstanceStatus::Pending).unwrap(),
            "\"pending\""
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn lookups_stay_consistent_under_concurrent_churn() {
        let registry = Arc::new(InstanceRegistry::new());
        let id = InstanceId::from("abc");
        registry.register_pending(id.clone());

        let writer = {
            let registry = Arc::clone(&registry);
            let id = id.clone();
            tokio::spawn(async move {
                for _ in 0..500 {
                    registry.authenticate(StubSession::new("abc", "5511999990000"));
                    tokio::task::yield_now().await;
                    registry.logout(&id);
                }
            })
        };

        let mut readers = Vec::new();
        for _ in 0..4 {
            let registry = Arc::clone(&registry);
            let id = id.clone();
            readers.push(tokio::spawn(async move {
                for _ in 0..500 {
                    match registry.get_authenticated_instance(&id) {
                        Ok(handle) => {
                            assert_eq!(handle.instance_id().as_str(), "abc");
                            assert_eq!(handle.own_address().user(), "5511999990000");
                        }
                        Err(err) => {
                            assert_eq!(err, LookupError::NotAuthenticated(id.clone()));
                        }
                    }
                    tokio::task::yield_now().await;
                }
            }));
        }

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
    }
}

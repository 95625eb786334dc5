//! Bulk revocation of every session ticket owned by one identity.
//!
//! Revocation scans the owner's key prefix and then deletes each match.
//! The two steps are not atomic: a login that lands between the scan and
//! the last delete keeps its ticket. Callers that need a hard cut-off must
//! revoke again after the triggering change is committed.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use warden_cache::CacheManager;
use warden_cache::keys;
use warden_core::config::session::SessionConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::cache::CacheProvider;

use super::key::SessionKey;

/// Outcome of a bulk revocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevocationReport {
    /// Keys the scan found for the owner.
    pub matched: usize,
    /// Keys deleted before the operation finished or was cancelled.
    pub deleted: usize,
    /// Whether cancellation stopped the revocation early.
    pub cancelled: bool,
}

impl RevocationReport {
    /// Whether every matched key was deleted.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.deleted == self.matched
    }
}

/// Enumerates and revokes an owner's session tickets.
#[derive(Debug, Clone)]
pub struct SessionIndex {
    cache: Arc<CacheManager>,
    key_prefix: String,
}

impl SessionIndex {
    /// Creates an index over the same cache the ticket store writes to.
    pub fn new(cache: Arc<CacheManager>, config: &SessionConfig) -> Self {
        Self {
            cache,
            key_prefix: config.key_prefix.clone(),
        }
    }

    /// Every live session key of `owner_id`.
    pub async fn keys_for(&self, owner_id: Uuid) -> AppResult<Vec<SessionKey>> {
        let pattern = keys::session_owner_pattern(&self.key_prefix, owner_id);
        let raw = self.cache.scan_keys(&pattern).await?;
        Ok(raw
            .iter()
            .filter_map(|key| SessionKey::parse(key, &self.key_prefix))
            .filter(|key| key.owner_id() == owner_id)
            .collect())
    }

    /// Delete every session ticket of `owner_id`.
    pub async fn revoke_all(
        &self,
        owner_id: Uuid,
        cancel: &CancellationToken,
    ) -> AppResult<RevocationReport> {
        self.revoke_matching(owner_id, None, cancel).await
    }

    /// Delete every session ticket of `owner_id` except `keep`.
    pub async fn revoke_except(
        &self,
        owner_id: Uuid,
        keep: &SessionKey,
        cancel: &CancellationToken,
    ) -> AppResult<RevocationReport> {
        if keep.owner_id() != owner_id {
            return Err(AppError::validation(
                "Session key to keep belongs to a different owner",
            ));
        }
        self.revoke_matching(owner_id, Some(keep), cancel).await
    }

    async fn revoke_matching(
        &self,
        owner_id: Uuid,
        keep: Option<&SessionKey>,
        cancel: &CancellationToken,
    ) -> AppResult<RevocationReport> {
        let mut report = RevocationReport::default();

        let found = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                report.cancelled = true;
                info!(owner_id = %owner_id, "Session revocation cancelled before scan");
                return Ok(report);
            }
            found = self.keys_for(owner_id) => found?,
        };

        let targets: Vec<SessionKey> = found
            .into_iter()
            .filter(|key| Some(key) != keep)
            .collect();
        report.matched = targets.len();
        debug!(owner_id = %owner_id, matched = report.matched, "Scanned owner sessions");

        for key in &targets {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            if let Err(e) = self.cache.delete(key.as_str()).await {
                warn!(
                    owner_id = %owner_id,
                    matched = report.matched,
                    deleted = report.deleted,
                    error = %e,
                    "Session revocation stopped by cache failure"
                );
                return Err(e);
            }
            report.deleted += 1;
        }

        info!(
            owner_id = %owner_id,
            matched = report.matched,
            deleted = report.deleted,
            cancelled = report.cancelled,
            "Revoked owner sessions"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use warden_core::config::cache::CacheConfig;
    use warden_core::error::ErrorKind;

    use super::*;
    use crate::session::store::SessionTicketStore;
    use crate::session::ticket::{Principal, SessionTicket};

    async fn setup() -> (SessionTicketStore, SessionIndex) {
        let cache = Arc::new(CacheManager::new(&CacheConfig::default()).await.unwrap());
        let config = SessionConfig::default();
        (
            SessionTicketStore::new(Arc::clone(&cache), &config),
            SessionIndex::new(cache, &config),
        )
    }

    async fn login(store: &SessionTicketStore, owner: Uuid) -> SessionKey {
        let ticket = SessionTicket::new("Cookies", Principal::new(owner))
            .expires_at(Utc::now() + Duration::hours(1));
        store.store(&ticket).await.unwrap()
    }

    #[tokio::test]
    async fn test_revoke_all_leaves_other_owners() {
        let (store, index) = setup().await;
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        for _ in 0..10 {
            login(&store, a).await;
        }
        let mut b_keys = Vec::new();
        for _ in 0..3 {
            b_keys.push(login(&store, b).await);
        }

        let report = index.revoke_all(a, &CancellationToken::new()).await.unwrap();
        assert_eq!(
            report,
            RevocationReport {
                matched: 10,
                deleted: 10,
                cancelled: false
            }
        );
        assert!(report.is_complete());

        assert!(index.keys_for(a).await.unwrap().is_empty());
        assert_eq!(index.keys_for(b).await.unwrap().len(), 3);
        for key in &b_keys {
            assert!(store.retrieve(key).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_revoke_all_without_sessions() {
        let (_, index) = setup().await;
        let report = index
            .revoke_all(Uuid::new_v4(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report, RevocationReport::default());
    }

    #[tokio::test]
    async fn test_revoke_except_keeps_current_session() {
        let (store, index) = setup().await;
        let owner = Uuid::new_v4();
        let current = login(&store, owner).await;
        for _ in 0..4 {
            login(&store, owner).await;
        }

        let report = index
            .revoke_except(owner, &current, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.matched, 4);
        assert_eq!(report.deleted, 4);
        assert_eq!(index.keys_for(owner).await.unwrap(), vec![current.clone()]);
        assert!(store.retrieve(&current).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_revoke_except_rejects_foreign_key() {
        let (store, index) = setup().await;
        let foreign = login(&store, Uuid::new_v4()).await;
        let err = index
            .revoke_except(Uuid::new_v4(), &foreign, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_cancelled_revocation_deletes_nothing() {
        let (store, index) = setup().await;
        let owner = Uuid::new_v4();
        for _ in 0..3 {
            login(&store, owner).await;
        }

        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = index.revoke_all(owner, &cancel).await.unwrap();
        assert!(report.cancelled);
        assert_eq!(report.deleted, 0);
        assert!(!report.is_complete());
        assert_eq!(index.keys_for(owner).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_prefix_lookalike_owner_untouched() {
        let (store, index) = setup().await;
        let owner = Uuid::new_v4();
        login(&store, owner).await;

        // A key under a longer prefix must not match the owner's pattern.
        let other_config = SessionConfig {
            key_prefix: "SessionTicketArchive".to_string(),
            ..SessionConfig::default()
        };
        let archive = SessionTicketStore::new(Arc::clone(&index.cache), &other_config);
        let archived = login(&archive, owner).await;

        index.revoke_all(owner, &CancellationToken::new()).await.unwrap();
        assert!(archive.retrieve(&archived).await.unwrap().is_some());
    }
}

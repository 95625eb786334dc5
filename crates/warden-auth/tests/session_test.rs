//! Integration tests for session storage and bulk revocation.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use warden_auth::PasswordVerification;
use warden_auth::session::{Principal, RevocationReport, SessionTicket};
use warden_cache::CacheManager;
use warden_cache::memory::MemoryCacheProvider;
use warden_core::config::AppConfig;
use warden_core::config::cache::MemoryCacheConfig;
use warden_core::result::AppResult;
use warden_core::traits::cache::CacheProvider;

use helpers::TestApp;

#[tokio::test]
async fn test_login_flow_stores_retrievable_ticket() {
    let app = TestApp::new().await;
    let hasher = app.light_hasher();
    let owner = Uuid::new_v4();

    let stored_hash = hasher.hash("s3cret!".to_string()).await.unwrap();
    assert_eq!(
        hasher.verify(stored_hash.clone(), "wrong".to_string()).await,
        PasswordVerification::Failed
    );
    assert!(hasher.verify(stored_hash, "s3cret!".to_string()).await.is_success());

    let ticket = SessionTicket::new(
        "Identity.Application",
        Principal::new(owner).with_claim("role", "admin"),
    );
    let key = app.ctx.sessions.store(&ticket).await.unwrap();

    // The client only ever sees the string form.
    let presented = key.as_str().to_string();
    let parsed = app.ctx.sessions.parse_key(&presented).unwrap();
    assert_eq!(app.ctx.sessions.retrieve(&parsed).await.unwrap(), Some(ticket));

    app.ctx.sessions.remove(&parsed).await.unwrap();
    assert_eq!(app.ctx.sessions.retrieve(&parsed).await.unwrap(), None);
}

#[tokio::test]
async fn test_revoke_all_ten_of_a_three_of_b() {
    let app = TestApp::new().await;
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    let mut a_keys = Vec::new();
    for _ in 0..10 {
        a_keys.push(app.login(a).await);
    }
    for _ in 0..3 {
        app.login(b).await;
    }

    let report = app
        .ctx
        .index
        .revoke_all(a, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.matched, 10);
    assert!(report.is_complete());

    assert_eq!(app.ctx.index.keys_for(a).await.unwrap().len(), 0);
    assert_eq!(app.ctx.index.keys_for(b).await.unwrap().len(), 3);
    for key in &a_keys {
        assert_eq!(app.ctx.sessions.retrieve(key).await.unwrap(), None);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_logins_during_revoke_never_touch_other_owners() {
    let app = Arc::new(TestApp::new().await);
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    for _ in 0..20 {
        app.login(a).await;
    }
    for _ in 0..5 {
        app.login(b).await;
    }

    let logins = {
        let app = Arc::clone(&app);
        tokio::spawn(async move {
            for _ in 0..10 {
                app.login(a).await;
                tokio::task::yield_now().await;
            }
        })
    };
    let report = app
        .ctx
        .index
        .revoke_all(a, &CancellationToken::new())
        .await
        .unwrap();
    logins.await.unwrap();

    // Tickets created after the scan may survive; the rest are gone.
    let remaining = app.ctx.index.keys_for(a).await.unwrap().len();
    assert!(report.deleted >= 20);
    assert!(remaining <= 10);
    assert_eq!(app.ctx.index.keys_for(b).await.unwrap().len(), 5);

    let second = app
        .ctx
        .index
        .revoke_all(a, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(second.deleted, remaining);
    assert!(app.ctx.index.keys_for(a).await.unwrap().is_empty());
}

/// Memory cache that trips a cancellation token after a number of deletes.
#[derive(Debug)]
struct CancellingCache {
    inner: MemoryCacheProvider,
    deletes: AtomicUsize,
    cancel_after: usize,
    cancel: CancellationToken,
}

#[async_trait]
impl CacheProvider for CancellingCache {
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> AppResult<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn set_default(&self, key: &str, value: &[u8]) -> AppResult<()> {
        self.inner.set_default(key, value).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await?;
        if self.deletes.fetch_add(1, Ordering::SeqCst) + 1 == self.cancel_after {
            self.cancel.cancel();
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.inner.exists(key).await
    }

    async fn scan_keys(&self, pattern: &str) -> AppResult<Vec<String>> {
        self.inner.scan_keys(pattern).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn close(&self) -> AppResult<bool> {
        self.inner.close().await
    }
}

#[tokio::test]
async fn test_cancellation_mid_revoke_reports_partial_progress() {
    let cancel = CancellationToken::new();
    let provider = CancellingCache {
        inner: MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 1000 }, 3600),
        deletes: AtomicUsize::new(0),
        cancel_after: 2,
        cancel: cancel.clone(),
    };
    let cache = Arc::new(CacheManager::from_provider(Arc::new(provider)));
    let app = TestApp::with_cache(AppConfig::default(), cache).await;

    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    for _ in 0..5 {
        app.login(a).await;
    }
    let b_key = app.login(b).await;

    let report = app.ctx.index.revoke_all(a, &cancel).await.unwrap();
    assert_eq!(
        report,
        RevocationReport {
            matched: 5,
            deleted: 2,
            cancelled: true
        }
    );
    assert_eq!(app.ctx.index.keys_for(a).await.unwrap().len(), 3);
    assert!(app.ctx.sessions.retrieve(&b_key).await.unwrap().is_some());

    // A fresh token finishes the job.
    let retry = app
        .ctx
        .index
        .revoke_all(a, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(retry.deleted, 3);
}

#[tokio::test]
async fn test_client_forged_keys_cannot_outlive_revoke_all() {
    let app = TestApp::new().await;
    let owner = Uuid::new_v4();
    let issued = app.login(owner).await;
    let ticket = app.ctx.sessions.retrieve(&issued).await.unwrap().unwrap();
    let nonce = "A".repeat(43);

    // Same owner id, spelled so the owner's scan pattern would miss it.
    for form in [
        owner.simple().to_string(),
        owner.hyphenated().to_string().to_uppercase(),
        owner.braced().to_string(),
    ] {
        assert!(
            app.ctx
                .sessions
                .parse_key(&format!("SessionTicket_{form}_{nonce}"))
                .is_none()
        );
    }

    // Well formed but never issued: renew must not mint it.
    let minted = app
        .ctx
        .sessions
        .parse_key(&format!("SessionTicket_{owner}_{nonce}"))
        .unwrap();
    assert!(app.ctx.sessions.renew(&minted, &ticket).await.is_err());
    assert_eq!(app.ctx.sessions.retrieve(&minted).await.unwrap(), None);

    let report = app
        .ctx
        .index
        .revoke_all(owner, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.matched, 1);
    assert!(report.is_complete());
    assert_eq!(app.ctx.sessions.retrieve(&issued).await.unwrap(), None);
    assert!(app.ctx.index.keys_for(owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_renew_refreshes_issued_session() {
    let app = TestApp::new().await;
    let owner = Uuid::new_v4();
    let key = app.login(owner).await;

    let renewed = SessionTicket::new("Identity.Application", Principal::new(owner))
        .expires_at(chrono::Utc::now() + chrono::Duration::hours(2));
    app.ctx.sessions.renew(&key, &renewed).await.unwrap();
    assert_eq!(app.ctx.sessions.retrieve(&key).await.unwrap(), Some(renewed));
}

#[tokio::test]
async fn test_logout_other_devices() {
    let app = TestApp::new().await;
    let owner = Uuid::new_v4();
    let phone = app.login(owner).await;
    let laptop = app.login(owner).await;
    let tablet = app.login(owner).await;

    let report = app
        .ctx
        .index
        .revoke_except(owner, &laptop, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.deleted, 2);

    assert!(app.ctx.sessions.retrieve(&laptop).await.unwrap().is_some());
    assert!(app.ctx.sessions.retrieve(&phone).await.unwrap().is_none());
    assert!(app.ctx.sessions.retrieve(&tablet).await.unwrap().is_none());
}

#[tokio::test]
async fn test_shutdown_makes_session_operations_fail() {
    let app = TestApp::new().await;
    let key = app.login(Uuid::new_v4()).await;

    app.ctx.shutdown().await.unwrap();
    // Second shutdown is a no-op.
    app.ctx.shutdown().await.unwrap();

    assert!(app.ctx.sessions.retrieve(&key).await.is_err());
    assert!(
        app.ctx
            .index
            .revoke_all(key.owner_id(), &CancellationToken::new())
            .await
            .is_err()
    );
}

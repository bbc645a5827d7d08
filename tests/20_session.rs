mod common;

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use haven_admin::session::{HttpIdentityProvider, SessionError, SessionGuard, SessionStore};

fn temp_store() -> SessionStore {
    let dir = std::env::temp_dir().join(format!("haven_it_{}", uuid::Uuid::new_v4().simple()));
    SessionStore::in_dir(&dir)
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials() -> Result<()> {
    let store = common::TestStore::start().await?;
    let provider = HttpIdentityProvider::new(&store.auth_url(), Duration::from_secs(5))?;
    let mut guard = SessionGuard::new();

    let err = guard.login(&provider, "admin@example.com", "guess").await.unwrap_err();
    assert_eq!(err, SessionError::InvalidCredentials("INVALID_PASSWORD".to_string()));
    assert!(!guard.is_authenticated());
    Ok(())
}

#[tokio::test]
async fn login_persists_session_until_logout() -> Result<()> {
    let store = common::TestStore::start().await?;
    let provider = HttpIdentityProvider::new(&store.auth_url(), Duration::from_secs(5))?;
    let session_store = temp_store();

    let mut guard = SessionGuard::with_store(session_store.clone())?;
    assert!(!guard.is_authenticated());

    let session = guard.login(&provider, "admin@example.com", common::PASSWORD).await?.clone();
    assert_eq!(session.user_id.as_deref(), Some("admin-1"));
    let remaining = session.expires_at - Utc::now();
    assert!(remaining > chrono::Duration::minutes(55));
    assert!(remaining <= chrono::Duration::hours(1));

    // A fresh guard picks the saved session back up
    let reloaded = SessionGuard::with_store(session_store.clone())?;
    assert!(reloaded.is_authenticated());
    assert_eq!(reloaded.session(), Some(&session));

    guard.logout()?;
    let after_logout = SessionGuard::with_store(session_store.clone())?;
    assert!(!after_logout.is_authenticated());

    if let Some(dir) = session_store.path().parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
    Ok(())
}

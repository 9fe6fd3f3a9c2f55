// --- File: crates/quincho_auth/src/service_test.rs ---
use sha2::{Digest, Sha256};

use quincho_common::error::QuinchoError;
use quincho_common::services::AuthService;
use quincho_config::{AdminAccount, AuthConfig};

use crate::service::SessionAuthService;

fn test_service() -> SessionAuthService {
    SessionAuthService::new(&AuthConfig {
        session_secret: "unit-test-secret".to_string(),
        admins: vec![AdminAccount {
            email: "admin@fiuna.edu.py".to_string(),
            password_sha256: hex::encode(Sha256::digest(b"hunter2")),
        }],
    })
}

#[tokio::test]
async fn login_with_valid_credentials_opens_an_admin_session() {
    let service = test_service();
    let session = service.login("admin@fiuna.edu.py", "hunter2").await.unwrap();
    assert!(session.is_admin);
    assert_eq!(session.email, "admin@fiuna.edu.py");
    assert!(!session.token.is_empty());
    assert!(session.expires_at > chrono::Utc::now());
}

#[tokio::test]
async fn login_email_is_case_insensitive() {
    let service = test_service();
    let session = service.login("Admin@FIUNA.edu.py", "hunter2").await.unwrap();
    assert_eq!(session.email, "admin@fiuna.edu.py");
}

#[tokio::test]
async fn wrong_password_and_unknown_email_fail_the_same_way() {
    let service = test_service();
    let wrong_password = service.login("admin@fiuna.edu.py", "letmein").await;
    let unknown_email = service.login("nobody@fiuna.edu.py", "hunter2").await;
    for result in [wrong_password, unknown_email] {
        match result {
            Err(QuinchoError::Auth(msg)) => assert_eq!(msg, "invalid email or password"),
            other => panic!("expected auth error, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn current_session_resolves_a_live_token() {
    let service = test_service();
    let session = service.login("admin@fiuna.edu.py", "hunter2").await.unwrap();
    let found = service.current_session(&session.token).await.unwrap();
    assert_eq!(found.map(|s| s.email), Some("admin@fiuna.edu.py".to_string()));
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let service = test_service();
    let session = service.login("admin@fiuna.edu.py", "hunter2").await.unwrap();
    service.logout(&session.token).await.unwrap();
    assert!(service.current_session(&session.token).await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_token_has_no_session() {
    let service = test_service();
    assert!(service.current_session("bogus").await.unwrap().is_none());
}

#[tokio::test]
async fn tokens_differ_between_logins() {
    let service = test_service();
    let a = service.login("admin@fiuna.edu.py", "hunter2").await.unwrap();
    let b = service.login("admin@fiuna.edu.py", "hunter2").await.unwrap();
    assert_ne!(a.token, b.token);
}

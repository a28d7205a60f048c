//! Integration tests for the credential store.

mod common;

use nursery_core::auth::{AuthError, UserRole, verify_password};
use nursery_db::UserRepository;

#[tokio::test]
async fn test_create_and_verify() {
    let db = common::setup().await;
    let repo = UserRepository::new(db);

    repo.create("alice", "s3cret", UserRole::Staff)
        .await
        .expect("Failed to create user");

    let role = repo.verify("alice", "s3cret").await.expect("Failed to verify");
    assert_eq!(role, UserRole::Staff);

    let stored = repo.find("alice").await.unwrap().expect("User should exist");
    assert_ne!(stored.password_hash, "s3cret");
    assert!(stored.password_hash.starts_with("$argon2id$"));
    assert!(verify_password("s3cret", &stored.password_hash).unwrap());
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_look_alike() {
    let db = common::setup().await;
    let repo = UserRepository::new(db);
    repo.create("alice", "s3cret", UserRole::Staff).await.unwrap();

    assert!(matches!(
        repo.verify("alice", "nope").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        repo.verify("mallory", "s3cret").await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let db = common::setup().await;
    let repo = UserRepository::new(db);
    repo.create("alice", "one", UserRole::Staff).await.unwrap();

    let result = repo.create(" alice ", "two", UserRole::Admin).await;
    assert!(matches!(result, Err(AuthError::UserExists(name)) if name == "alice"));

    // the first account is untouched
    assert_eq!(repo.verify("alice", "one").await.unwrap(), UserRole::Staff);
}

#[tokio::test]
async fn test_empty_fields_rejected() {
    let db = common::setup().await;
    let repo = UserRepository::new(db);

    assert!(matches!(
        repo.create("  ", "pw", UserRole::Staff).await,
        Err(AuthError::Validation(_))
    ));
    assert!(matches!(
        repo.create("bob", "", UserRole::Staff).await,
        Err(AuthError::Validation(_))
    ));
    assert!(repo.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_change_password() {
    let db = common::setup().await;
    let repo = UserRepository::new(db);
    repo.create("alice", "old", UserRole::Staff).await.unwrap();

    assert!(matches!(
        repo.change_password("alice", "wrong", "new", "new").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        repo.change_password("alice", "old", "new", "other").await,
        Err(AuthError::Validation(_))
    ));

    repo.change_password("alice", "old", "new", "new").await.unwrap();
    assert!(repo.verify("alice", "old").await.is_err());
    assert_eq!(repo.verify("alice", "new").await.unwrap(), UserRole::Staff);
}

#[tokio::test]
async fn test_reset_password() {
    let db = common::setup().await;
    let repo = UserRepository::new(db);
    repo.create("alice", "forgotten", UserRole::Staff).await.unwrap();

    repo.reset_password("alice", "fresh").await.unwrap();
    assert!(repo.verify("alice", "fresh").await.is_ok());

    assert!(matches!(
        repo.reset_password("ghost", "fresh").await,
        Err(AuthError::UserNotFound(_))
    ));
}

#[tokio::test]
async fn test_default_admin_seeded_once() {
    let db = common::setup().await;
    let repo = UserRepository::new(db);

    assert!(!repo.admin_exists().await.unwrap());
    assert!(repo.ensure_default_admin("admin", "admin123").await.unwrap());
    assert!(!repo.ensure_default_admin("admin", "other").await.unwrap());

    assert_eq!(repo.verify("admin", "admin123").await.unwrap(), UserRole::Admin);
    assert_eq!(repo.list().await.unwrap().len(), 1);
}

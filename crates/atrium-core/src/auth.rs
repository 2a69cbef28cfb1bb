//! Credential checks against the local user collection.
//!
//! Verification is a pluggable policy so the storage format can change
//! without touching the lookup flow. The shipped policy compares plaintext,
//! which matches the data this system inherits: accounts with no stored
//! password are unloginable, and an empty stored password accepts any input
//! (legacy demo accounts rely on this).

use crate::error::{Error, Result};
use crate::model::User;
use crate::store::Store;

/// How a presented password is checked against a stored credential.
pub trait CredentialPolicy: Send + Sync {
    fn verify(&self, stored: Option<&str>, presented: &str) -> bool;
}

/// Plaintext comparison, with the legacy empty-password escape hatch.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaintextPolicy;

impl CredentialPolicy for PlaintextPolicy {
    fn verify(&self, stored: Option<&str>, presented: &str) -> bool {
        match stored {
            None => false,
            Some("") => true,
            Some(expected) => expected == presented,
        }
    }
}

/// Look up a user by email (case-insensitive) and verify the password under
/// the given policy. Failures are indistinguishable on purpose: unknown email
/// and wrong password both return [`Error::InvalidCredentials`].
pub async fn authenticate(
    store: &Store,
    policy: &dyn CredentialPolicy,
    email: &str,
    password: &str,
) -> Result<User> {
    let needle = email.trim().to_lowercase();
    let users = store.users().await?;

    let user = users
        .into_iter()
        .find(|u| u.email.to_lowercase() == needle)
        .ok_or(Error::InvalidCredentials)?;

    if !policy.verify(user.password.as_deref(), password) {
        return Err(Error::InvalidCredentials);
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::RecordingMirror;
    use crate::model::Table;
    use crate::storage::{Database, LocalStore};
    use std::sync::Arc;

    async fn open_store() -> Store {
        let db = Database::in_memory().await.expect("in-memory db");
        Store::open(LocalStore::new(db), Arc::new(RecordingMirror::new()))
            .await
            .expect("open store")
    }

    #[test]
    fn test_plaintext_policy() {
        let policy = PlaintextPolicy;
        assert!(!policy.verify(None, "anything"));
        assert!(policy.verify(Some(""), "anything"));
        assert!(policy.verify(Some("1234"), "1234"));
        assert!(!policy.verify(Some("1234"), "123"));
    }

    #[tokio::test]
    async fn test_login_with_exact_password() {
        let store = open_store().await;
        let user = authenticate(&store, &PlaintextPolicy, "gonzalo.arias@simpledata.cl", "1234")
            .await
            .unwrap();
        assert_eq!(user.id, "u_gonzalo");
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_insensitive() {
        let store = open_store().await;
        let user = authenticate(
            &store,
            &PlaintextPolicy,
            "  Gonzalo.Arias@SimpleData.cl ",
            "1234",
        )
        .await
        .unwrap();
        assert_eq!(user.id, "u_gonzalo");
    }

    #[tokio::test]
    async fn test_empty_stored_password_accepts_any_input() {
        let store = open_store().await;
        let user = authenticate(&store, &PlaintextPolicy, "soporte.aiwis@gmail.com", "whatever")
            .await
            .unwrap();
        assert_eq!(user.id, "u_soporte");
    }

    #[tokio::test]
    async fn test_missing_stored_password_rejects() {
        let store = open_store().await;
        let locked = serde_json::json!({
            "id": "u_locked",
            "name": "Locked Out",
            "role": "Developer",
            "email": "locked.out@simpledata.cl",
            "avatar": "",
            "skills": [],
            "projects": [],
        });
        let record = match locked {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        store.add(Table::Users, record).await.unwrap();

        let err = authenticate(&store, &PlaintextPolicy, "locked.out@simpledata.cl", "")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_unknown_email_rejects() {
        let store = open_store().await;
        let err = authenticate(&store, &PlaintextPolicy, "nobody@simpledata.cl", "1234")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }
}

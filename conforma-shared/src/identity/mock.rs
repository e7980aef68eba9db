/// Mock accounts directory for testing
///
/// In-memory, deterministic implementation of [`Directory`]. It exists so
/// tests can assert things the real store can't express cheaply:
///
/// - that a rejected request never reached the directory at all
///   (`create_calls`),
/// - that compensation removed a just-created account (`find_by_email`
///   after a forced profile failure),
/// - behavior under injected faults (`fail_next_create`,
///   `fail_next_delete`),
/// - workflows that need to know the next account id up front
///   (`pin_next_id`).
///
/// # Example
///
/// ```
/// use conforma_shared::identity::{Directory, MockDirectory, NewAccount};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let directory = MockDirectory::new();
/// directory.fail_next_create("simulated outage");
///
/// let result = directory
///     .create_account(NewAccount {
///         email: "a@b.com".to_string(),
///         password: "secret1".to_string(),
///         email_confirmed: true,
///     })
///     .await;
///
/// assert!(result.is_err());
/// assert!(directory.find_by_email("a@b.com").await?.is_none());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::directory::{Account, Directory, DirectoryError, NewAccount};

#[derive(Default)]
struct MockState {
    accounts: HashMap<Uuid, Account>,
    passwords: HashMap<Uuid, String>,
    next_id: Option<Uuid>,
    fail_create: Option<String>,
    fail_delete: Option<String>,
    create_calls: u64,
    delete_calls: u64,
}

/// In-memory accounts directory
///
/// All state sits behind a mutex, so the mock can be shared across the
/// router and the test body via `Arc`.
#[derive(Default)]
pub struct MockDirectory {
    state: Mutex<MockState>,
}

impl MockDirectory {
    /// Creates an empty mock directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an account directly, bypassing the create path
    ///
    /// Used to seed pre-existing accounts (e.g. for duplicate-email tests).
    /// The seeded password is "password".
    pub fn insert_account(&self, id: Uuid, email: &str) -> Account {
        let account = Account {
            id,
            email: email.to_string(),
            email_confirmed: true,
            created_at: Utc::now(),
        };

        let mut state = self.state.lock().unwrap();
        state.accounts.insert(id, account.clone());
        state.passwords.insert(id, "password".to_string());
        account
    }

    /// Pins the id the next `create_account` call will assign
    pub fn pin_next_id(&self, id: Uuid) {
        self.state.lock().unwrap().next_id = Some(id);
    }

    /// Makes the next `create_account` call fail with the given message
    pub fn fail_next_create(&self, message: &str) {
        self.state.lock().unwrap().fail_create = Some(message.to_string());
    }

    /// Makes the next `delete_account` call fail with the given message
    pub fn fail_next_delete(&self, message: &str) {
        self.state.lock().unwrap().fail_delete = Some(message.to_string());
    }

    /// Number of times `create_account` was called (including failures)
    pub fn create_calls(&self) -> u64 {
        self.state.lock().unwrap().create_calls
    }

    /// Number of times `delete_account` was called (including failures)
    pub fn delete_calls(&self) -> u64 {
        self.state.lock().unwrap().delete_calls
    }

    /// Number of accounts currently stored
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().accounts.len()
    }

    /// Whether the directory is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Directory for MockDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .accounts
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DirectoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.accounts.get(&id).cloned())
    }

    async fn create_account(&self, data: NewAccount) -> Result<Account, DirectoryError> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;

        if let Some(message) = state.fail_create.take() {
            return Err(DirectoryError::Rejected(message));
        }

        if state
            .accounts
            .values()
            .any(|a| a.email.eq_ignore_ascii_case(&data.email))
        {
            return Err(DirectoryError::DuplicateEmail(data.email));
        }

        let id = state.next_id.take().unwrap_or_else(Uuid::new_v4);
        let account = Account {
            id,
            email: data.email,
            email_confirmed: data.email_confirmed,
            created_at: Utc::now(),
        };

        state.accounts.insert(id, account.clone());
        state.passwords.insert(id, data.password);
        Ok(account)
    }

    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Account>, DirectoryError> {
        let state = self.state.lock().unwrap();
        let account = state
            .accounts
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email));

        Ok(account
            .filter(|a| state.passwords.get(&a.id).is_some_and(|p| p == password))
            .cloned())
    }

    async fn delete_account(&self, id: Uuid) -> Result<bool, DirectoryError> {
        let mut state = self.state.lock().unwrap();
        state.delete_calls += 1;

        if let Some(message) = state.fail_delete.take() {
            return Err(DirectoryError::Rejected(message));
        }

        state.passwords.remove(&id);
        Ok(state.accounts.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find() {
        let directory = MockDirectory::new();

        let account = directory
            .create_account(NewAccount {
                email: "a@b.com".to_string(),
                password: "secret1".to_string(),
                email_confirmed: true,
            })
            .await
            .unwrap();

        assert!(account.email_confirmed);
        assert_eq!(directory.create_calls(), 1);

        let found = directory.find_by_email("A@B.COM").await.unwrap();
        assert_eq!(found.unwrap().id, account.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let directory = MockDirectory::new();
        directory.insert_account(Uuid::new_v4(), "dup@x.com");

        let result = directory
            .create_account(NewAccount {
                email: "dup@x.com".to_string(),
                password: "secret1".to_string(),
                email_confirmed: true,
            })
            .await;

        assert!(matches!(result, Err(DirectoryError::DuplicateEmail(_))));
        assert_eq!(directory.len(), 1);
    }

    #[tokio::test]
    async fn test_pinned_next_id() {
        let directory = MockDirectory::new();
        let pinned = Uuid::new_v4();
        directory.pin_next_id(pinned);

        let account = directory
            .create_account(NewAccount {
                email: "a@b.com".to_string(),
                password: "secret1".to_string(),
                email_confirmed: true,
            })
            .await
            .unwrap();

        assert_eq!(account.id, pinned);
    }

    #[tokio::test]
    async fn test_injected_create_failure_is_one_shot() {
        let directory = MockDirectory::new();
        directory.fail_next_create("boom");

        let first = directory
            .create_account(NewAccount {
                email: "a@b.com".to_string(),
                password: "secret1".to_string(),
                email_confirmed: true,
            })
            .await;
        assert!(matches!(first, Err(DirectoryError::Rejected(_))));
        assert!(directory.is_empty());

        let second = directory
            .create_account(NewAccount {
                email: "a@b.com".to_string(),
                password: "secret1".to_string(),
                email_confirmed: true,
            })
            .await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let directory = MockDirectory::new();
        directory
            .create_account(NewAccount {
                email: "a@b.com".to_string(),
                password: "secret1".to_string(),
                email_confirmed: true,
            })
            .await
            .unwrap();

        assert!(directory
            .verify_credentials("a@b.com", "secret1")
            .await
            .unwrap()
            .is_some());
        assert!(directory
            .verify_credentials("a@b.com", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(directory
            .verify_credentials("nobody@b.com", "secret1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_account() {
        let directory = MockDirectory::new();
        let id = Uuid::new_v4();
        directory.insert_account(id, "a@b.com");

        assert!(directory.delete_account(id).await.unwrap());
        assert!(!directory.delete_account(id).await.unwrap());
        assert_eq!(directory.delete_calls(), 2);
    }

    #[tokio::test]
    async fn test_injected_delete_failure() {
        let directory = MockDirectory::new();
        let id = Uuid::new_v4();
        directory.insert_account(id, "a@b.com");
        directory.fail_next_delete("network partition");

        let result = directory.delete_account(id).await;
        assert!(matches!(result, Err(DirectoryError::Rejected(_))));

        // Account survives the failed delete
        assert!(directory.find_by_id(id).await.unwrap().is_some());
    }
}

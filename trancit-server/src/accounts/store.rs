//! In-memory account store with JSON snapshot persistence.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::error::AccountError;
use super::identity::{SessionKey, SessionToken, User, UserId};
use super::password::{hash_password, verify_password};
use crate::persist::JsonSnapshot;

/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 8;

const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=150;

/// Submitted registration form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredUser {
    id: UserId,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl StoredUser {
    fn to_user(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountData {
    next_id: u64,
    users: Vec<StoredUser>,
}

fn validate_username(raw: &str) -> Result<String, AccountError> {
    let username = raw.trim();
    if !USERNAME_LEN.contains(&username.chars().count()) {
        return Err(AccountError::InvalidUsername(
            "must be between 3 and 150 characters",
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        return Err(AccountError::InvalidUsername(
            "may contain only letters, digits and @.+-_",
        ));
    }
    Ok(username.to_string())
}

/// Hash on the blocking pool.
async fn hash_off_thread(password: String) -> Result<String, AccountError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AccountError::Hashing(e.to_string()))
}

async fn verify_off_thread(password: &str, stored: String) -> Result<bool, AccountError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| AccountError::Hashing(e.to_string()))
}

fn validate_email(raw: &str) -> Result<String, AccountError> {
    let email = raw.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AccountError::InvalidEmail);
    };

    let valid = !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty());

    if valid {
        Ok(email.to_string())
    } else {
        Err(AccountError::InvalidEmail)
    }
}

/// Registered users and their login sessions.
///
/// Users are persisted; login sessions are held in memory only.
pub struct AccountStore {
    data: RwLock<AccountData>,
    sessions: RwLock<HashMap<SessionToken, UserId>>,
    snapshot: Option<JsonSnapshot>,
}

impl AccountStore {
    /// Create an empty store that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            data: RwLock::new(AccountData::default()),
            sessions: RwLock::new(HashMap::new()),
            snapshot: None,
        }
    }

    /// Open a store backed by a snapshot file, loading it if it exists.
    pub async fn open(snapshot: JsonSnapshot) -> Result<Self, AccountError> {
        let data: AccountData = snapshot.load().await?.unwrap_or_default();
        info!(
            path = %snapshot.path().display(),
            users = data.users.len(),
            "loaded account store"
        );
        Ok(Self {
            data: RwLock::new(data),
            sessions: RwLock::new(HashMap::new()),
            snapshot: Some(snapshot),
        })
    }

    async fn persist(&self, data: &AccountData) -> Result<(), AccountError> {
        if let Some(snapshot) = &self.snapshot {
            snapshot.save(data).await?;
        }
        Ok(())
    }

    /// Register a new user.
    pub async fn register(&self, form: Registration) -> Result<User, AccountError> {
        let username = validate_username(&form.username)?;
        let email = validate_email(&form.email)?;
        if form.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::WeakPassword {
                min: MIN_PASSWORD_LEN,
            });
        }
        if form.password != form.password_confirm {
            return Err(AccountError::PasswordMismatch);
        }

        // Hash before taking the write lock.
        let password_hash = hash_off_thread(form.password).await?;

        let mut data = self.data.write().await;
        if data
            .users
            .iter()
            .any(|u| u.username.to_lowercase() == username.to_lowercase())
        {
            return Err(AccountError::UsernameTaken);
        }
        if data
            .users
            .iter()
            .any(|u| u.email.to_lowercase() == email.to_lowercase())
        {
            return Err(AccountError::EmailTaken);
        }

        data.next_id += 1;
        let stored = StoredUser {
            id: UserId(data.next_id),
            username,
            email,
            password_hash,
            created_at: Utc::now(),
        };
        let user = stored.to_user();
        data.users.push(stored);

        if let Err(e) = self.persist(&data).await {
            data.users.pop();
            data.next_id -= 1;
            return Err(e);
        }

        info!(user = %user.id, username = %user.username, "registered user");
        Ok(user)
    }

    /// Check a username and password without starting a session.
    ///
    /// The username match is case-insensitive.
    pub async fn check_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, AccountError> {
        let username = username.trim().to_lowercase();
        let found = {
            let data = self.data.read().await;
            data.users
                .iter()
                .find(|u| u.username.to_lowercase() == username)
                .map(|u| (u.to_user(), u.password_hash.clone()))
        };
        let Some((user, password_hash)) = found else {
            return Err(AccountError::InvalidCredentials);
        };
        if !verify_off_thread(password, password_hash).await? {
            return Err(AccountError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Issue a fresh bearer token for a user whose credentials checked out.
    pub async fn start_session(&self, user: &User) -> SessionToken {
        let token = SessionToken::generate();
        self.sessions.write().await.insert(token.clone(), user.id);
        debug!(user = %user.id, "logged in");
        token
    }

    /// Revoke a bearer token. Unknown tokens are ignored.
    pub async fn logout(&self, token: &SessionToken) {
        if let Some(user) = self.sessions.write().await.remove(token) {
            debug!(%user, "logged out");
        }
    }

    /// Look up the user behind a bearer token.
    pub async fn authenticate(&self, token: &SessionToken) -> Option<User> {
        let id = *self.sessions.read().await.get(token)?;
        self.user(id).await
    }

    /// Look up a user by id.
    pub async fn user(&self, id: UserId) -> Option<User> {
        self.data
            .read()
            .await
            .users
            .iter()
            .find(|u| u.id == id)
            .map(StoredUser::to_user)
    }

    /// Start an anonymous session.
    pub fn new_anonymous_session(&self) -> SessionKey {
        SessionKey::generate()
    }

    /// Number of registered users.
    pub async fn len(&self) -> usize {
        self.data.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn login(
        store: &AccountStore,
        username: &str,
        password: &str,
    ) -> Result<(User, SessionToken), AccountError> {
        let user = store.check_credentials(username, password).await?;
        let token = store.start_session(&user).await;
        Ok((user, token))
    }

    fn form(username: &str, email: &str, password: &str) -> Registration {
        Registration {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            password_confirm: password.to_string(),
        }
    }

    #[tokio::test]
    async fn register_and_login() {
        let store = AccountStore::in_memory();
        let user = store
            .register(form("  juan ", "juan@example.ph", "hunter2hunter2"))
            .await
            .unwrap();
        assert_eq!(user.id, UserId(1));
        assert_eq!(user.username, "juan");

        let (logged_in, token) = login(&store, "JUAN", "hunter2hunter2").await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert_eq!(store.authenticate(&token).await, Some(user));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn registration_hashing_does_not_block_lookups() {
        let store = AccountStore::in_memory();
        store
            .register(form("juan", "juan@example.ph", "password1"))
            .await
            .unwrap();
        let (juan, token) = login(&store, "juan", "password1").await.unwrap();

        let order = std::sync::Mutex::new(Vec::new());
        let (maria, found) = tokio::join!(
            async {
                let user = store
                    .register(form("maria", "maria@example.ph", "password2"))
                    .await;
                order.lock().unwrap().push("register");
                user
            },
            async {
                let user = store.authenticate(&token).await;
                order.lock().unwrap().push("authenticate");
                user
            },
        );

        assert_eq!(maria.unwrap().id, UserId(2));
        assert_eq!(found, Some(juan));
        assert_eq!(*order.lock().unwrap(), ["authenticate", "register"]);
    }

    #[tokio::test]
    async fn bad_credentials_look_the_same() {
        let store = AccountStore::in_memory();
        store
            .register(form("maria", "maria@example.ph", "password1"))
            .await
            .unwrap();

        let wrong_password = login(&store, "maria", "password2").await.unwrap_err();
        let unknown_user = login(&store, "pedro", "password1").await.unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert!(matches!(unknown_user, AccountError::InvalidCredentials));
    }

    #[tokio::test]
    async fn checking_credentials_issues_no_token() {
        let store = AccountStore::in_memory();
        store
            .register(form("maria", "maria@example.ph", "password1"))
            .await
            .unwrap();

        let user = store.check_credentials(" Maria ", "password1").await.unwrap();
        assert_eq!(user.username, "maria");
        assert!(store.sessions.read().await.is_empty());

        let token = store.start_session(&user).await;
        assert_eq!(store.authenticate(&token).await, Some(user));
    }

    #[tokio::test]
    async fn logout_revokes_token() {
        let store = AccountStore::in_memory();
        store
            .register(form("maria", "maria@example.ph", "password1"))
            .await
            .unwrap();
        let (_, token) = login(&store, "maria", "password1").await.unwrap();

        store.logout(&token).await;
        assert_eq!(store.authenticate(&token).await, None);
        // Idempotent.
        store.logout(&token).await;
    }

    #[tokio::test]
    async fn unknown_token_is_anonymous() {
        let store = AccountStore::in_memory();
        let token = SessionToken::from_header("nope");
        assert_eq!(store.authenticate(&token).await, None);
    }

    #[tokio::test]
    async fn duplicates_are_case_insensitive() {
        let store = AccountStore::in_memory();
        store
            .register(form("Maria", "maria@example.ph", "password1"))
            .await
            .unwrap();

        let err = store
            .register(form("maria", "other@example.ph", "password1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::UsernameTaken));
        assert!(err.is_conflict());

        let err = store
            .register(form("maria2", "MARIA@example.PH", "password1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::EmailTaken));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn validation() {
        let store = AccountStore::in_memory();

        let err = store
            .register(form("ab", "a@b.ph", "password1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::InvalidUsername(_)));

        let err = store
            .register(form("juan dela cruz", "a@b.ph", "password1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::InvalidUsername(_)));

        let long = "x".repeat(151);
        assert!(store.register(form(&long, "a@b.ph", "password1")).await.is_err());

        let err = store
            .register(form("juan", "a@b.ph", "short"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::WeakPassword { min: 8 }));
        assert!(err.is_validation());

        let mut mismatched = form("juan", "a@b.ph", "password1");
        mismatched.password_confirm = "password2".to_string();
        let err = store.register(mismatched).await.unwrap_err();
        assert!(matches!(err, AccountError::PasswordMismatch));

        assert!(store.is_empty().await);
    }

    #[test]
    fn email_shapes() {
        for ok in ["a@b.ph", "juan.cruz@mail.example.com", " x@y.co "] {
            assert!(validate_email(ok).is_ok(), "{ok}");
        }
        for bad in ["", "a", "a@", "@b.ph", "a@b", "a@b.", "a@.ph", "a b@c.ph", "a@b@c.ph"] {
            assert!(validate_email(bad).is_err(), "{bad}");
        }
    }

    #[tokio::test]
    async fn users_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("accounts.json");

        {
            let store = AccountStore::open(JsonSnapshot::new(&path)).await.unwrap();
            store
                .register(form("juan", "juan@example.ph", "password1"))
                .await
                .unwrap();
        }

        let store = AccountStore::open(JsonSnapshot::new(&path)).await.unwrap();
        assert_eq!(store.len().await, 1);
        let (user, _) = login(&store, "juan", "password1").await.unwrap();
        assert_eq!(user.id, UserId(1));

        let next = store
            .register(form("maria", "maria@example.ph", "password1"))
            .await
            .unwrap();
        assert_eq!(next.id, UserId(2));
    }

    #[tokio::test]
    async fn anonymous_sessions_are_unique() {
        let store = AccountStore::in_memory();
        assert_ne!(store.new_anonymous_session(), store.new_anonymous_session());
    }
}

//! Account sign-up, login and session resolution.

use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use regex::Regex;
use serde_json::json;
use sha2::Sha256;
use std::sync::{Arc, LazyLock};

use crate::domain::entities::{NewUser, User};
use crate::domain::repositories::{SessionRepository, UserRepository};
use crate::error::AppError;
use crate::utils::password;
use crate::utils::token::generate_session_token;

type HmacSha256 = Hmac<Sha256>;

static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.@+-]{3,150}$").expect("valid username regex"));

const MIN_PASSWORD_LEN: usize = 8;

/// Service for user accounts and cookie sessions.
///
/// Session tokens are hashed with HMAC-SHA256 keyed by `signing_secret`, so a
/// read-only leak of the sessions table cannot be replayed without the
/// server-side secret. Passwords are stored as Argon2 PHC strings.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    signing_secret: String,
    session_ttl: Duration,
}

impl AuthService {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `signing_secret` - HMAC key; must stay stable or every session
    ///   becomes invalid
    /// - `session_ttl_hours` - lifetime of a login session
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        signing_secret: String,
        session_ttl_hours: i64,
    ) -> Self {
        Self {
            users,
            sessions,
            signing_secret,
            session_ttl: Duration::hours(session_ttl_hours),
        }
    }

    fn mac(&self, input: &str) -> Result<HmacSha256, AppError> {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .map_err(|e| AppError::internal("Invalid signing key", json!({ "reason": e.to_string() })))?;
        mac.update(input.as_bytes());
        Ok(mac)
    }

    /// Hashes a raw session token. Returns 64 lowercase hex characters.
    fn hash_token(&self, token: &str) -> Result<String, AppError> {
        Ok(hex::encode(self.mac(token)?.finalize().into_bytes()))
    }

    /// Argon2 is CPU-heavy, so hashing runs on the blocking pool.
    async fn hash_password(password: &str) -> Result<String, AppError> {
        let plain = password.to_string();
        tokio::task::spawn_blocking(move || password::hash_password(&plain))
            .await
            .map_err(|e| AppError::internal("Password hashing task failed", json!({ "reason": e.to_string() })))?
    }

    async fn verify_password(password: &str, stored: String) -> Result<bool, AppError> {
        let plain = password.to_string();
        tokio::task::spawn_blocking(move || password::verify_password(&plain, &stored))
            .await
            .map_err(|e| AppError::internal("Password check task failed", json!({ "reason": e.to_string() })))
    }

    /// Registers a new account.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for a malformed username or short password
    /// - [`AppError::Conflict`] if the username is taken
    pub async fn sign_up(&self, username: &str, password: &str) -> Result<User, AppError> {
        let username = username.trim();
        if !USERNAME_REGEX.is_match(username) {
            return Err(AppError::bad_request(
                "Username must be 3-150 characters: letters, digits and @/./+/-/_ only",
                json!({ "field": "username" }),
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::bad_request(
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
                json!({ "field": "password" }),
            ));
        }

        let password_hash = Self::hash_password(password).await?;
        let user = self
            .users
            .create(NewUser {
                username: username.to_string(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                AppError::Conflict { .. } => AppError::conflict(
                    "A user with that username already exists",
                    json!({ "field": "username" }),
                ),
                other => other,
            })?;

        tracing::info!(user = %user, "User signed up");
        Ok(user)
    }

    /// Checks credentials and opens a session.
    ///
    /// Returns the user and the raw session token for the cookie.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the username or password is wrong.
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, String), AppError> {
        let invalid = || {
            AppError::unauthorized(
                "Please enter a correct username and password",
                json!({ "reason": "Invalid credentials" }),
            )
        };

        let (user, stored) = self
            .users
            .find_credentials(username.trim())
            .await?
            .ok_or_else(invalid)?;

        if !Self::verify_password(password, stored).await? {
            tracing::debug!(user = %user, "Rejected login");
            return Err(invalid());
        }

        let token = generate_session_token()?;
        let expires_at = Utc::now() + self.session_ttl;
        self.sessions
            .create(&self.hash_token(&token)?, user.id, expires_at)
            .await?;

        tracing::info!(user = %user, "User logged in");
        Ok((user, token))
    }

    /// Resolves a session cookie to its user. Unknown and expired tokens
    /// resolve to `None`.
    pub async fn resolve_session(&self, token: &str) -> Result<Option<User>, AppError> {
        self.sessions.find_user(&self.hash_token(token)?).await
    }

    /// Ends a session. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        self.sessions.delete(&self.hash_token(token)?).await
    }

    /// All accounts, ordered by username.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.users.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockSessionRepository, MockUserRepository};

    fn test_secret() -> String {
        "test-signing-secret".to_string()
    }

    fn service(users: MockUserRepository, sessions: MockSessionRepository) -> AuthService {
        AuthService::new(Arc::new(users), Arc::new(sessions), test_secret(), 24)
    }

    fn compute_expected_hash(token: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(test_secret().as_bytes()).unwrap();
        mac.update(token.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_hash_token_consistency() {
        let svc = service(MockUserRepository::new(), MockSessionRepository::new());

        let hash1 = svc.hash_token("test-token").unwrap();
        let hash2 = svc.hash_token("test-token").unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
        assert_eq!(hash1, compute_expected_hash("test-token"));
    }

    #[test]
    fn test_hash_token_secret_matters() {
        let svc1 = AuthService::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockSessionRepository::new()),
            "secret-a".to_string(),
            1,
        );
        let svc2 = AuthService::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockSessionRepository::new()),
            "secret-b".to_string(),
            1,
        );

        assert_ne!(
            svc1.hash_token("token").unwrap(),
            svc2.hash_token("token").unwrap()
        );
    }

    #[tokio::test]
    async fn test_sign_up_stores_argon2_hash() {
        let mut users = MockUserRepository::new();
        users
            .expect_create()
            .withf(|new_user| {
                new_user.password_hash.starts_with("$argon2id$")
                    && !new_user.password_hash.contains("long enough")
            })
            .times(1)
            .returning(|new_user| Ok(User::new(7, new_user.username, Utc::now())));

        let user = service(users, MockSessionRepository::new())
            .sign_up("leo", "long enough")
            .await
            .unwrap();

        assert_eq!(user.id, 7);
    }

    #[tokio::test]
    async fn test_sign_up_rejects_bad_username() {
        let mut users = MockUserRepository::new();
        users.expect_create().never();

        let err = service(users, MockSessionRepository::new())
            .sign_up("a b", "long enough")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_sign_up_rejects_short_password() {
        let err = service(MockUserRepository::new(), MockSessionRepository::new())
            .sign_up("leo", "short")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_is_conflict() {
        let mut users = MockUserRepository::new();
        users
            .expect_create()
            .returning(|_| Err(AppError::conflict("Unique constraint violation", json!({}))));

        let err = service(users, MockSessionRepository::new())
            .sign_up("leo", "long enough")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        let stored = password::hash_password("right password").unwrap();

        let mut users = MockUserRepository::new();
        users.expect_find_credentials().returning(move |name| {
            Ok(Some((
                User::new(1, name.to_string(), Utc::now()),
                stored.clone(),
            )))
        });
        let mut sessions = MockSessionRepository::new();
        sessions.expect_create().never();

        let err = service(users, sessions)
            .login("leo", "wrong password")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_login_stores_hashed_token() {
        let stored = password::hash_password("right password").unwrap();

        let mut users = MockUserRepository::new();
        users.expect_find_credentials().returning(move |name| {
            Ok(Some((
                User::new(1, name.to_string(), Utc::now()),
                stored.clone(),
            )))
        });
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_create()
            .withf(|hash, user_id, expires_at| {
                hash.len() == 64 && *user_id == 1 && *expires_at > Utc::now()
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let (user, token) = service(users, sessions)
            .login("leo", "right password")
            .await
            .unwrap();

        assert_eq!(user.username, "leo");
        assert_eq!(token.len(), 43);
    }

    #[tokio::test]
    async fn test_resolve_session_looks_up_hash() {
        let expected = compute_expected_hash("raw-token");
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_find_user()
            .withf(move |hash| hash == expected)
            .times(1)
            .returning(|_| Ok(None));

        let user = service(MockUserRepository::new(), sessions)
            .resolve_session("raw-token")
            .await
            .unwrap();

        assert!(user.is_none());
    }
}

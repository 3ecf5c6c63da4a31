//! # User Repository
//!
//! Staff accounts and credential checks.
//!
//! ## Password Storage
//! ```text
//! "hunter22" ──argon2id + random salt──► "$argon2id$v=19$m=19456,t=2,p=1$..."
//!                                          (PHC string, stored in password_hash)
//! ```
//! Plain passwords never touch the database. Updates re-hash only when a
//! new password is supplied.

use chrono::Utc;
use medora_core::validation::{validate_name, validate_password, validate_username};
use medora_core::{NewUser, Role, User, UserUpdate};
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Sqlite, SqlitePool};
use tracing::{debug, info, warn};

use super::generate_id;
use crate::error::{DbError, DbResult};

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> DbResult<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::PasswordHash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Checks a password against a stored PHC string.
///
/// Malformed hashes never verify.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// [`hash_password`] on the blocking pool, off the async workers.
async fn hash_password_blocking(password: &str) -> DbResult<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| DbError::Internal(format!("password hashing task failed: {}", e)))?
}

/// [`verify_password`] on the blocking pool.
async fn verify_password_blocking(password: &str, hash: &str) -> DbResult<bool> {
    let (password, hash) = (password.to_owned(), hash.to_owned());
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| DbError::Internal(format!("password verification task failed: {}", e)))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// All users ordered by display name.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Creates a user, hashing the supplied password.
    ///
    /// ## Errors
    /// - `Core(Validation)` for a bad username, name or password
    /// - `UniqueViolation` when the username is taken
    pub async fn create(&self, input: &NewUser) -> DbResult<User> {
        let user = build_user(input).await?;

        debug!(id = %user.id, username = %user.username, role = %user.role, "Creating user");

        bind_user(
            sqlx::query(
                r#"
                INSERT INTO users (
                    id, username, name, role, password_hash,
                    phone, is_active, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            ),
            &user,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| username_taken(e, &input.username))?;

        info!(id = %user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// Creates the first account of a fresh store, always as owner.
    ///
    /// The emptiness check and the insert are one statement, so concurrent
    /// callers cannot both succeed. Returns `Ok(None)` once any user exists.
    pub async fn create_first_owner(&self, input: &NewUser) -> DbResult<Option<User>> {
        let input = NewUser {
            role: Role::Owner,
            ..input.clone()
        };
        let user = build_user(&input).await?;

        let result = bind_user(
            sqlx::query(
                r#"
                INSERT INTO users (
                    id, username, name, role, password_hash,
                    phone, is_active, created_at, updated_at
                )
                SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9
                WHERE NOT EXISTS (SELECT 1 FROM users)
                "#,
            ),
            &user,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| username_taken(e, &input.username))?;

        if result.rows_affected() == 0 {
            warn!(username = %input.username, "First-owner registration refused: users exist");
            return Ok(None);
        }

        info!(id = %user.id, username = %user.username, "First owner created");
        Ok(Some(user))
    }

    /// Applies a partial update. Returns `Ok(None)` for an unknown id.
    pub async fn update(&self, id: &str, update: &UserUpdate) -> DbResult<Option<User>> {
        if let Some(name) = &update.name {
            validate_name(name)?;
        }

        let password_hash = match &update.password {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password_blocking(password).await?)
            }
            None => None,
        };

        debug!(id = %id, password_changed = password_hash.is_some(), "Updating user");

        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = COALESCE(?2, name),
                role = COALESCE(?3, role),
                password_hash = COALESCE(?4, password_hash),
                phone = COALESCE(?5, phone),
                is_active = COALESCE(?6, is_active),
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(update.role)
        .bind(password_hash)
        .bind(&update.phone)
        .bind(update.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Returns the user when the username exists, the account is active and
    /// the password matches. Any failure yields `Ok(None)`.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> DbResult<Option<User>> {
        let Some(user) = self.get_by_username(username).await? else {
            debug!(username = %username, "Login for unknown username");
            return Ok(None);
        };

        if !user.is_active {
            warn!(username = %username, "Login attempt for inactive user");
            return Ok(None);
        }

        if !verify_password_blocking(password, &user.password_hash).await? {
            warn!(username = %username, "Login failed: wrong password");
            return Ok(None);
        }

        Ok(Some(user))
    }
}

async fn build_user(input: &NewUser) -> DbResult<User> {
    validate_username(&input.username)?;
    validate_name(&input.name)?;
    validate_password(&input.password)?;

    let now = Utc::now();
    Ok(User {
        id: generate_id(),
        username: input.username.clone(),
        name: input.name.trim().to_string(),
        role: input.role,
        password_hash: hash_password_blocking(&input.password).await?,
        phone: input.phone.clone(),
        is_active: true,
        created_at: now,
        updated_at: now,
    })
}

fn bind_user<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    user: &'q User,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    query
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.name)
        .bind(user.role)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
}

fn username_taken(err: sqlx::Error, username: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, username.to_string()),
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::test_db;

    fn new_user(username: &str, role: Role) -> NewUser {
        NewUser {
            username: username.to_string(),
            name: "Asha Karki".to_string(),
            password: "secret123".to_string(),
            role,
            phone: None,
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secret123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret123", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("secret123", "not-a-hash"));
    }

    #[tokio::test]
    async fn test_create_and_verify_credentials() {
        let db = test_db().await;
        let users = db.users();

        let user = users.create(&new_user("asha", Role::Owner)).await.unwrap();
        assert_ne!(user.password_hash, "secret123");
        assert_eq!(users.count().await.unwrap(), 1);

        let found = users.verify_credentials("asha", "secret123").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(users.verify_credentials("asha", "nope").await.unwrap().is_none());
        assert!(users.verify_credentials("ghost", "secret123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_first_owner_only_once() {
        let db = test_db().await;
        let users = db.users();

        let first = users
            .create_first_owner(&new_user("asha", Role::Staff))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.role, Role::Owner);

        let second = users
            .create_first_owner(&new_user("ram", Role::Owner))
            .await
            .unwrap();
        assert!(second.is_none());
        assert_eq!(users.count().await.unwrap(), 1);
        assert!(users.get_by_username("ram").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_first_owner_creates_one() {
        let db = test_db().await;

        let (users_a, users_b) = (db.users(), db.users());
        let (asha, ram) = (new_user("asha", Role::Owner), new_user("ram", Role::Owner));
        let (a, b) = tokio::join!(
            users_a.create_first_owner(&asha),
            users_b.create_first_owner(&ram),
        );

        let created = [a.unwrap(), b.unwrap()].into_iter().flatten().count();
        assert_eq!(created, 1);
        assert_eq!(db.users().count().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_parallel_logins_on_blocking_pool() {
        let db = test_db().await;
        db.users().create(&new_user("asha", Role::Owner)).await.unwrap();

        let users = db.users();
        let (ok, bad) = tokio::join!(
            users.verify_credentials("asha", "secret123"),
            users.verify_credentials("asha", "wrong-pass"),
        );
        assert!(ok.unwrap().is_some());
        assert!(bad.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let db = test_db().await;
        db.users().create(&new_user("ram", Role::Staff)).await.unwrap();

        let err = db.users().create(&new_user("ram", Role::Staff)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_rehashes_only_when_password_given() {
        let db = test_db().await;
        let users = db.users();
        let user = users.create(&new_user("sita", Role::Staff)).await.unwrap();

        let renamed = users
            .update(
                &user.id,
                &UserUpdate {
                    name: Some("Sita Rai".to_string()),
                    role: Some(Role::Pharmacist),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Sita Rai");
        assert_eq!(renamed.role, Role::Pharmacist);
        assert_eq!(renamed.password_hash, user.password_hash);

        let changed = users
            .update(
                &user.id,
                &UserUpdate {
                    password: Some("newpass99".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_ne!(changed.password_hash, user.password_hash);
        assert!(users.verify_credentials("sita", "newpass99").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_inactive_user_cannot_log_in() {
        let db = test_db().await;
        let users = db.users();
        let user = users.create(&new_user("hari", Role::Staff)).await.unwrap();

        users
            .update(
                &user.id,
                &UserUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(users.verify_credentials("hari", "secret123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let db = test_db().await;
        let result = db.users().update("missing", &UserUpdate::default()).await.unwrap();
        assert!(result.is_none());
    }
}

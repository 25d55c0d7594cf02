//! User accounts - registration, login and password reset.
//!
//! Emails are normalised (trimmed, lower-cased) before every lookup. Passwords
//! are only ever stored as Argon2 hashes.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
    models::{self, DEFAULT_LANGUAGE, NewUser},
    password,
};
use sea_orm::{Set, SqlErr, prelude::*};
use tracing::{info, instrument, warn};

/// Canonical form of an email address used for storage and lookups.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_input(field, format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Registers a new user.
///
/// Fails with `InvalidInput` for blank required fields and `Conflict` when the
/// email is already registered.
#[instrument(skip(db, new_user))]
pub async fn register_user(db: &DatabaseConnection, new_user: NewUser) -> Result<models::User> {
    require("name", &new_user.name)?;
    require("surname", &new_user.surname)?;
    require("email", &new_user.email)?;
    require("password", &new_user.password)?;

    let email = normalize_email(&new_user.email);
    if !email.contains('@') {
        return Err(Error::invalid_input("email", "email must contain '@'"));
    }

    if get_user_by_email(db, &email).await?.is_some() {
        return Err(Error::Conflict {
            message: format!("email already registered: {email}"),
        });
    }

    let language = if new_user.language.trim().is_empty() {
        DEFAULT_LANGUAGE.to_string()
    } else {
        new_user.language.trim().to_string()
    };

    let password_hash = password::hash_password_blocking(new_user.password).await?;

    let user_model = user::ActiveModel {
        name: Set(new_user.name.trim().to_string()),
        surname: Set(new_user.surname.trim().to_string()),
        phone: Set(new_user.phone.trim().to_string()),
        language: Set(language),
        email: Set(email.clone()),
        password_hash: Set(password_hash),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let inserted = user_model.insert(db).await.map_err(|e| match e.sql_err() {
        // A concurrent registration won the race for the unique index
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::Conflict {
            message: format!("email already registered: {email}"),
        },
        _ => e.into(),
    })?;

    info!(user_id = inserted.id, "User registered");
    Ok(inserted.into())
}

/// Checks credentials and returns the matching user.
///
/// Unknown emails and wrong passwords both fail with `InvalidCredentials`.
pub async fn authenticate(db: &DatabaseConnection, email: &str, password: &str) -> Result<models::User> {
    let Some(found) = User::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await?
    else {
        return Err(Error::InvalidCredentials);
    };

    let verified =
        password::verify_password_blocking(password.to_string(), found.password_hash.clone())
            .await?;
    if !verified {
        warn!(user_id = found.id, "Rejected login with wrong password");
        return Err(Error::InvalidCredentials);
    }

    Ok(found.into())
}

/// Replaces a user's password.
#[instrument(skip(db, new_password))]
pub async fn reset_password(db: &DatabaseConnection, email: &str, new_password: &str) -> Result<()> {
    require("password", new_password)?;
    let email = normalize_email(email);

    let found = User::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "user",
            id: email.clone(),
        })?;

    let mut active: user::ActiveModel = found.into();
    active.password_hash = Set(password::hash_password_blocking(new_password.to_string()).await?);
    active.update(db).await?;

    info!("Password reset");
    Ok(())
}

/// Finds a user by id.
pub async fn get_user_by_id<C>(db: &C, user_id: i64) -> Result<Option<models::User>>
where
    C: ConnectionTrait,
{
    Ok(User::find_by_id(user_id).one(db).await?.map(Into::into))
}

/// Finds a user by email (normalised before the lookup).
pub async fn get_user_by_email<C>(db: &C, email: &str) -> Result<Option<models::User>>
where
    C: ConnectionTrait,
{
    Ok(User::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await?
        .map(Into::into))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_register_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let mut input = new_user("a@example.com");
        input.name = String::new();
        assert!(matches!(
            register_user(&db, input).await,
            Err(Error::InvalidInput { field: "name", .. })
        ));

        let mut input = new_user("a@example.com");
        input.password = "  ".to_string();
        assert!(matches!(
            register_user(&db, input).await,
            Err(Error::InvalidInput {
                field: "password",
                ..
            })
        ));

        assert!(matches!(
            register_user(&db, new_user("not-an-email")).await,
            Err(Error::InvalidInput { field: "email", .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_register_and_login() -> Result<()> {
        let db = setup_test_db().await?;

        let user = register_user(&db, new_user("  Ada@Example.COM ")).await?;
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.language, "en");

        // The stored credential is a hash, not the password
        let stored = User::find_by_id(user.id).one(&db).await?.unwrap();
        assert_ne!(stored.password_hash, TEST_PASSWORD);
        assert!(stored.password_hash.starts_with("$argon2"));

        let logged_in = authenticate(&db, "ada@example.com", TEST_PASSWORD).await?;
        assert_eq!(logged_in, user);

        Ok(())
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() -> Result<()> {
        let db = setup_test_db().await?;
        register_user(&db, new_user("ada@example.com")).await?;

        assert!(matches!(
            authenticate(&db, "ada@example.com", "wrong").await,
            Err(Error::InvalidCredentials)
        ));
        assert!(matches!(
            authenticate(&db, "nobody@example.com", TEST_PASSWORD).await,
            Err(Error::InvalidCredentials)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() -> Result<()> {
        let db = setup_test_db().await?;
        register_user(&db, new_user("ada@example.com")).await?;

        let result = register_user(&db, new_user("ADA@example.com")).await;
        assert!(matches!(result, Err(Error::Conflict { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_reset_password() -> Result<()> {
        let db = setup_test_db().await?;
        register_user(&db, new_user("ada@example.com")).await?;

        reset_password(&db, "ada@example.com", "new-secret").await?;

        assert!(authenticate(&db, "ada@example.com", "new-secret").await.is_ok());
        assert!(matches!(
            authenticate(&db, "ada@example.com", TEST_PASSWORD).await,
            Err(Error::InvalidCredentials)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_reset_password_unknown_email() -> Result<()> {
        let db = setup_test_db().await?;

        let result = reset_password(&db, "ghost@example.com", "whatever").await;
        assert!(matches!(
            result,
            Err(Error::NotFound { entity: "user", .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_user_lookups() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "lookup@example.com").await?;

        assert_eq!(get_user_by_id(&db, user.id).await?, Some(user.clone()));
        assert_eq!(
            get_user_by_email(&db, "LOOKUP@example.com").await?,
            Some(user)
        );
        assert!(get_user_by_email(&db, "none@example.com").await?.is_none());

        Ok(())
    }
}

//! Authentication service.
//!
//! Per-role registration and login over the account repositories. Passwords
//! are hashed with Argon2id at registration and never stored or logged in
//! the clear. Login failures are uniformly generic: an unknown identifier
//! and a wrong password produce the same error.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use milkround_core::{Email, MilkmanCode, Phone};

use crate::db::{AdminRepository, CustomerRepository, MilkmanRepository, RepositoryError};
use crate::models::{Admin, Customer, Milkman};
use crate::services::directory::DirectoryService;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
    admins: AdminRepository<'a>,
    milkmen: MilkmanRepository<'a>,
    customers: CustomerRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            admins: AdminRepository::new(pool),
            milkmen: MilkmanRepository::new(pool),
            customers: CustomerRepository::new(pool),
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a farm administrator.
    ///
    /// # Errors
    ///
    /// Returns `MissingField`, `InvalidEmail`, `WeakPassword`, or
    /// `DuplicateIdentity` for user-input failures.
    pub async fn register_admin(
        &self,
        name: &str,
        email: &str,
        farm_name: &str,
        password: &str,
    ) -> Result<Admin, AuthError> {
        let name = require(name, "name")?;
        let farm_name = require(farm_name, "farm name")?;
        require(email, "email")?;
        require(password, "password")?;

        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let admin = self
            .admins
            .create(name, &email, farm_name, &password_hash)
            .await
            .map_err(duplicate_on_conflict)?;

        Ok(admin)
    }

    /// Register a milkman, generating their unique 6-digit code.
    ///
    /// # Errors
    ///
    /// Returns `MissingField`, `InvalidPhone`, `WeakPassword`, or
    /// `DuplicateIdentity` for user-input failures.
    pub async fn register_milkman(
        &self,
        name: &str,
        phone: &str,
        password: &str,
    ) -> Result<Milkman, AuthError> {
        let name = require(name, "name")?;
        require(phone, "phone")?;
        require(password, "password")?;

        let phone = Phone::parse(phone)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let code = DirectoryService::new(self.pool).generate_code().await?;

        let milkman = self
            .milkmen
            .create(name, &phone, &code, &password_hash)
            .await
            .map_err(duplicate_on_conflict)?;

        Ok(milkman)
    }

    /// Register a customer, linking them to a milkman by code.
    ///
    /// # Errors
    ///
    /// Returns `MissingField`, `InvalidPhone`, `WeakPassword`,
    /// `UnknownMilkmanCode`, or `DuplicateIdentity` for user-input failures.
    pub async fn register_customer(
        &self,
        name: &str,
        phone: &str,
        address: &str,
        milkman_code: &str,
        password: &str,
    ) -> Result<Customer, AuthError> {
        let name = require(name, "name")?;
        let address = require(address, "address")?;
        require(phone, "phone")?;
        require(milkman_code, "milkman code")?;
        require(password, "password")?;

        let phone = Phone::parse(phone)?;
        let code =
            MilkmanCode::parse(milkman_code).map_err(|_| AuthError::UnknownMilkmanCode)?;
        validate_password(password)?;

        if self.milkmen.get_by_code(&code).await?.is_none() {
            return Err(AuthError::UnknownMilkmanCode);
        }

        let password_hash = hash_password(password)?;

        let customer = self
            .customers
            .create(name, &phone, address, &code, &password_hash)
            .await
            .map_err(duplicate_on_conflict)?;

        Ok(customer)
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Log an administrator in by email and password.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` for every user-caused failure.
    pub async fn login_admin(&self, email: &str, password: &str) -> Result<Admin, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (admin, password_hash) = self
            .admins
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(admin)
    }

    /// Log a milkman in by phone and password.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` for every user-caused failure.
    pub async fn login_milkman(&self, phone: &str, password: &str) -> Result<Milkman, AuthError> {
        let phone = Phone::parse(phone).map_err(|_| AuthError::InvalidCredentials)?;

        let (milkman, password_hash) = self
            .milkmen
            .get_password_hash(&phone)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(milkman)
    }

    /// Log a customer in by phone and password.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` for every user-caused failure.
    pub async fn login_customer(
        &self,
        phone: &str,
        password: &str,
    ) -> Result<Customer, AuthError> {
        let phone = Phone::parse(phone).map_err(|_| AuthError::InvalidCredentials)?;

        let (customer, password_hash) = self
            .customers
            .get_password_hash(&phone)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(customer)
    }
}

/// Reject empty required fields, trimming whitespace.
fn require<'s>(value: &'s str, field: &'static str) -> Result<&'s str, AuthError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AuthError::MissingField(field));
    }
    Ok(trimmed)
}

/// Map a repository conflict (unique or foreign key) to `DuplicateIdentity`.
///
/// Callers validate milkman codes before inserting, so by this point a
/// conflict means the identifying field is taken.
fn duplicate_on_conflict(e: RepositoryError) -> AuthError {
    match e {
        RepositoryError::Conflict(_) => AuthError::DuplicateIdentity,
        other => AuthError::Repository(other),
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn register_and_login_round_trip_per_role() {
        let pool = test_pool().await;
        let auth = AuthService::new(&pool);

        let admin = auth
            .register_admin("Asha", "asha@example.com", "Hillside Farm", "sunrise-milk")
            .await
            .unwrap();
        assert_eq!(auth.login_admin("asha@example.com", "sunrise-milk").await.unwrap().id, admin.id);

        let milkman = auth
            .register_milkman("Ravi", "9876543210", "round-one-pw")
            .await
            .unwrap();
        assert_eq!(auth.login_milkman("9876543210", "round-one-pw").await.unwrap().id, milkman.id);

        let customer = auth
            .register_customer(
                "Mina",
                "9123456780",
                "12 Dairy Lane",
                milkman.code.as_str(),
                "daily-litre",
            )
            .await
            .unwrap();
        assert_eq!(customer.milkman_code, milkman.code);
        assert_eq!(
            auth.login_customer("9123456780", "daily-litre").await.unwrap().id,
            customer.id
        );
    }

    #[tokio::test]
    async fn milkman_codes_stay_unique_across_registrations() {
        let pool = test_pool().await;
        let auth = AuthService::new(&pool);

        let mut codes = std::collections::HashSet::new();
        for i in 0..5 {
            let milkman = auth
                .register_milkman("M", &format!("98765432{i:02}"), "password-1")
                .await
                .unwrap();
            assert!(codes.insert(milkman.code.clone()), "code reused");
        }
    }

    #[tokio::test]
    async fn duplicate_identifying_field_is_rejected() {
        let pool = test_pool().await;
        let auth = AuthService::new(&pool);

        auth.register_milkman("Ravi", "9876543210", "round-one-pw")
            .await
            .unwrap();
        let err = auth
            .register_milkman("Other", "9876543210", "round-two-pw")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateIdentity));

        auth.register_admin("Asha", "asha@example.com", "Hillside", "sunrise-milk")
            .await
            .unwrap();
        let err = auth
            .register_admin("Asha Again", "asha@example.com", "Hillside", "sunrise-milk")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateIdentity));
    }

    #[tokio::test]
    async fn login_failures_are_uniformly_generic() {
        let pool = test_pool().await;
        let auth = AuthService::new(&pool);

        auth.register_milkman("Ravi", "9876543210", "round-one-pw")
            .await
            .unwrap();

        // Wrong password and unknown phone are indistinguishable.
        let wrong_password = auth.login_milkman("9876543210", "nope-nope-nope").await;
        let unknown_phone = auth.login_milkman("9000000000", "round-one-pw").await;
        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown_phone, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn customer_registration_requires_known_code() {
        let pool = test_pool().await;
        let auth = AuthService::new(&pool);

        let err = auth
            .register_customer("Mina", "9123456780", "12 Dairy Lane", "123456", "daily-litre")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnknownMilkmanCode));

        // Malformed codes are reported the same way.
        let err = auth
            .register_customer("Mina", "9123456780", "12 Dairy Lane", "12ab", "daily-litre")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnknownMilkmanCode));
    }

    #[tokio::test]
    async fn empty_fields_and_short_passwords_are_rejected() {
        let pool = test_pool().await;
        let auth = AuthService::new(&pool);

        let err = auth
            .register_admin("  ", "asha@example.com", "Hillside", "sunrise-milk")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingField("name")));

        let err = auth
            .register_milkman("Ravi", "9876543210", "short")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));
    }
}

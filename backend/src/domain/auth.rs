//! Authentication primitives: passwords, stored hashes and the validated
//! registration and login requests.
//!
//! Inbound adapters build these from raw strings so that every value a service
//! receives already satisfies the account policy.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{Email, UserId, UserValidationError, Username};

/// Minimum password length, in characters.
pub const PASSWORD_MIN: usize = 8;
/// Maximum password length, in characters.
pub const PASSWORD_MAX: usize = 256;

/// Validation errors for registration and login payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// A user field (username or email) failed its own validation.
    User(UserValidationError),
    PasswordTooShort { min: usize },
    PasswordTooLong { max: usize },
    EmptyPassword,
}

impl CredentialsValidationError {
    /// Name of the offending request field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::User(
                UserValidationError::EmptyUsername
                | UserValidationError::UsernameTooLong { .. }
                | UserValidationError::UsernameInvalidCharacters,
            ) => "username",
            Self::User(
                UserValidationError::EmptyEmail
                | UserValidationError::EmailTooShort { .. }
                | UserValidationError::EmailTooLong { .. }
                | UserValidationError::EmailMalformed,
            ) => "email",
            Self::User(UserValidationError::EmptyId | UserValidationError::InvalidId) => "user_id",
            Self::PasswordTooShort { .. } | Self::PasswordTooLong { .. } | Self::EmptyPassword => {
                "password"
            }
        }
    }
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(err) => write!(f, "{err}"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordTooLong { max } => write!(f, "password must be at most {max} characters"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

impl From<UserValidationError> for CredentialsValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::User(value)
    }
}

/// Plaintext password, wiped from memory on drop.
///
/// Whitespace is significant and never trimmed. `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Accept a password for a new account, enforcing the length policy.
    pub fn new(raw: &str) -> Result<Self, CredentialsValidationError> {
        let length = raw.chars().count();
        if length < PASSWORD_MIN {
            return Err(CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if length > PASSWORD_MAX {
            return Err(CredentialsValidationError::PasswordTooLong { max: PASSWORD_MAX });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Accept a password presented at login.
    ///
    /// Only emptiness is checked so that a policy change never locks out
    /// accounts created under an older policy.
    pub fn presented(raw: &str) -> Result<Self, CredentialsValidationError> {
        if raw.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Plaintext bytes for the hasher.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Opaque password hash as produced by a [`CredentialHasher`].
///
/// [`CredentialHasher`]: crate::domain::ports::CredentialHasher
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash read from a store.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded hash string for persistence.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(***)")
    }
}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    email: Email,
    password: Password,
}

impl Registration {
    /// Validate raw registration fields.
    ///
    /// # Examples
    /// ```
    /// use journal::domain::Registration;
    ///
    /// let registration =
    ///     Registration::try_from_parts("alice", "Alice@X.com", "password123").unwrap();
    /// assert_eq!(registration.email().as_ref(), "alice@x.com");
    /// ```
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            email: Email::new(email)?,
            password: Password::new(password)?,
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Validated login credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Password,
}

impl LoginCredentials {
    /// Validate raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        Ok(Self {
            email: Email::new(email)?,
            password: Password::presented(password)?,
        })
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub username: Username,
}

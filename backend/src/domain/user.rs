//! User aggregate and its validated components.
//!
//! Authority is decided jointly by [`Role`] and the superuser flag; the one
//! place that combines them is [`User::is_admin`]. Every mutation of a user
//! record bumps `state_version`, which invalidates any confirmation code
//! previously derived from the record (see `domain::confirmation`).

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by the user component constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Username was empty once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Username exceeds the storage limit.
    #[error("username must be at most {max} characters")]
    UsernameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Username contains characters outside `[\w.@+-]`.
    #[error("username may only contain letters, digits and @/./+/-/_")]
    UsernameInvalidCharacters,
    /// `me` collides with the self-service endpoint path.
    #[error("username 'me' is reserved")]
    UsernameReserved,
    /// Email was empty once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email exceeds the storage limit.
    #[error("email must be at most {max} characters")]
    EmailTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Email is not shaped like `local@domain`.
    #[error("email must be a valid address")]
    EmailInvalid,
    /// A name field exceeds the storage limit.
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

/// Maximum username length.
pub const USERNAME_MAX: usize = 150;
/// Maximum email length.
pub const EMAIL_MAX: usize = 254;
/// Maximum first/last name length.
pub const PERSON_NAME_MAX: usize = 150;

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length and the reserved word are enforced separately; this regex
        // constrains allowed characters only.
        Regex::new(r"^[\w.@+-]+$").unwrap_or_else(|error| {
            panic!("username regex failed to compile: {error}")
        })
    })
}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Unique account name used for lookups and the token exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = username.into();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if raw.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !username_regex().is_match(&raw) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        if raw == "me" {
            return Err(UserValidationError::UsernameReserved);
        }
        Ok(Self(raw))
    }

    /// Borrow the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Registered email address, the destination for confirmation codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = email.into();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if raw.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        let Some((local, domain)) = raw.split_once('@') else {
            return Err(UserValidationError::EmailInvalid);
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
            return Err(UserValidationError::EmailInvalid);
        }
        Ok(Self(raw))
    }

    /// Borrow the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Optional first/last name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Validate and construct a [`PersonName`].
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = name.into();
        if raw.chars().count() > PERSON_NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                max: PERSON_NAME_MAX,
            });
        }
        Ok(Self(raw))
    }

    /// Borrow the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Closed role enumeration.
///
/// Roles arrive over the wire as opaque strings; anything unrecognised maps
/// to the lowest-privilege tier rather than failing, so a corrupted role
/// value can never grant authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Ordinary authenticated user.
    #[default]
    User,
    /// May edit or delete any review or comment.
    Moderator,
    /// Full authority over every resource family.
    Admin,
}

impl Role {
    /// Canonical wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }

    /// Parse an opaque role string; unknown values become [`Role::User`].
    #[must_use]
    pub fn from_opaque(raw: &str) -> Self {
        match raw {
            "moderator" => Self::Moderator,
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::from_opaque(&value)
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_owned()
    }
}

/// Partial update applied to a user record.
///
/// `role` stays `None` for self-service edits; the admin endpoint is the
/// only caller that sets it.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// Replacement username, when changing.
    pub username: Option<Username>,
    /// Replacement email, when changing.
    pub email: Option<EmailAddress>,
    /// Replacement first name; `Some` overwrites, `None` keeps.
    pub first_name: Option<PersonName>,
    /// Replacement last name.
    pub last_name: Option<PersonName>,
    /// Replacement bio.
    pub bio: Option<String>,
    /// Replacement role; never set by self-service callers.
    pub role: Option<Role>,
}

impl UserUpdate {
    /// True when the update carries no changes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.bio.is_none()
            && self.role.is_none()
    }
}

/// Application user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    email: EmailAddress,
    first_name: Option<PersonName>,
    last_name: Option<PersonName>,
    bio: Option<String>,
    role: Role,
    is_superuser: bool,
    state_version: u32,
}

impl User {
    /// Create the record minted by sign-up: role `user`, no profile fields.
    #[must_use]
    pub fn signup(username: Username, email: EmailAddress) -> Self {
        Self {
            id: UserId::random(),
            username,
            email,
            first_name: None,
            last_name: None,
            bio: None,
            role: Role::User,
            is_superuser: false,
            state_version: 0,
        }
    }

    /// Create a record through the admin endpoint with an explicit role.
    #[must_use]
    pub fn with_role(username: Username, email: EmailAddress, role: Role) -> Self {
        let mut user = Self::signup(username, email);
        user.role = role;
        user
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Unique account name.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Registered email address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Optional first name.
    #[must_use]
    pub const fn first_name(&self) -> Option<&PersonName> {
        self.first_name.as_ref()
    }

    /// Optional last name.
    #[must_use]
    pub const fn last_name(&self) -> Option<&PersonName> {
        self.last_name.as_ref()
    }

    /// Optional free-text bio.
    #[must_use]
    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    /// Assigned role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Superuser flag; equivalent to admin for every permission check.
    #[must_use]
    pub const fn is_superuser(&self) -> bool {
        self.is_superuser
    }

    /// Counter bumped on every mutation; confirmation codes are derived
    /// from it, so bumping invalidates outstanding codes.
    #[must_use]
    pub const fn state_version(&self) -> u32 {
        self.state_version
    }

    /// The one place role and superuser flag are combined (OR, never AND).
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin || self.is_superuser
    }

    /// True for moderators; admins are handled by [`User::is_admin`].
    #[must_use]
    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }

    /// Apply a partial update, bumping the state version once.
    ///
    /// Empty updates are a no-op and leave outstanding codes valid.
    pub fn apply_update(&mut self, update: UserUpdate) {
        if update.is_empty() {
            return;
        }
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(first_name) = update.first_name {
            self.first_name = Some(first_name);
        }
        if let Some(last_name) = update.last_name {
            self.last_name = Some(last_name);
        }
        if let Some(bio) = update.bio {
            self.bio = Some(bio);
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        self.state_version = self.state_version.wrapping_add(1);
    }

    /// Grant or revoke the superuser flag, bumping the state version.
    pub fn set_superuser(&mut self, is_superuser: bool) {
        self.is_superuser = is_superuser;
        self.state_version = self.state_version.wrapping_add(1);
    }
}

//! Account types exchanged with the Singularity backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Character class chosen at registration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserClass {
    #[default]
    Warrior,
    Mage,
    Rogue,
    Cleric,
}

impl UserClass {
    pub const ALL: [Self; 4] = [Self::Warrior, Self::Mage, Self::Rogue, Self::Cleric];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warrior => "warrior",
            Self::Mage => "mage",
            Self::Rogue => "rogue",
            Self::Cleric => "cleric",
        }
    }
}

impl fmt::Display for UserClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|class| class.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown user class '{s}'"))
    }
}

/// Email/password pair used to log in
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"[HIDDEN]")
            .finish()
    }
}

/// New account details
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub user_class: UserClass,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[HIDDEN]")
            .field("full_name", &self.full_name)
            .field("user_class", &self.user_class)
            .finish()
    }
}

/// Character attributes shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default = "default_attribute")]
    pub strength: u32,
    #[serde(default = "default_attribute")]
    pub agility: u32,
    #[serde(default = "default_attribute")]
    pub vitality: u32,
}

const fn default_attribute() -> u32 {
    1
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            strength: 1,
            agility: 1,
            vitality: 1,
        }
    }
}

const fn default_level() -> u32 {
    1
}

/// Account profile as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub user_class: UserClass,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub experience: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub attributes: Option<Attributes>,
}

impl User {
    /// Attributes, falling back to the starting values when the backend sent none
    pub fn attributes_or_default(&self) -> Attributes {
        self.attributes.unwrap_or_default()
    }
}

/// Outcome of a login or registration, handed to the UI layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl AuthResult {
    pub fn success(user: Option<User>) -> Self {
        Self {
            success: true,
            error: None,
            user,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            user: None,
        }
    }
}

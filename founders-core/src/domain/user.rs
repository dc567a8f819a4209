//! User domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An account in the user directory
///
/// The id comes from the identity provider and never changes; the display
/// attributes are refreshed on every sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    /// Secondary label shown next to the name (the founder's startup)
    pub startup: String,
    pub email: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            startup: String::new(),
            email: Self::normalize_email(email),
            avatar: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_startup(mut self, startup: impl Into<String>) -> Self {
        self.startup = startup.into();
        self
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = avatar.into();
        self
    }

    /// Emails are compared trimmed and lowercase
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// First word of the display name, used for greetings
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("Founder")
    }

    /// Validate user data
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.id.trim().is_empty() {
            return Err("user id cannot be empty");
        }
        if self.name.trim().is_empty() {
            return Err("user name cannot be empty");
        }
        Ok(())
    }
}

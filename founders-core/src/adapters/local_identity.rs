//! Local identity provider
//!
//! Identity supplied directly by the caller (CLI flags, a sign-up form). No
//! credentials are checked: whoever runs the process is trusted.

use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::User;
use crate::ports::{Identity, IdentityProvider};

/// Default avatar for local sign-ups
pub const DEFAULT_AVATAR: &str = "👨‍💻";

#[derive(Debug, Clone, Default)]
pub struct LocalIdentityProvider {
    id: Option<String>,
    name: String,
    startup: String,
    email: String,
    avatar: Option<String>,
}

impl LocalIdentityProvider {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn with_startup(mut self, startup: impl Into<String>) -> Self {
        self.startup = startup.into();
        self
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// Use an explicit id instead of the email-derived one
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Stable id for an email: the same address always maps to the same account
    pub fn id_for_email(email: &str) -> String {
        let normalized = User::normalize_email(email);
        format!("user_{}", Uuid::new_v5(&Uuid::NAMESPACE_URL, normalized.as_bytes()).simple())
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn name(&self) -> &str {
        "local"
    }

    fn identify(&self) -> Result<Option<Identity>> {
        let name = self.name.trim();
        let email = User::normalize_email(&self.email);
        if name.is_empty() || email.is_empty() {
            return Err(Error::validation("name and email are required"));
        }
        if !email.contains('@') {
            return Err(Error::validation(format!("'{}' is not an email address", email)));
        }

        let id = match self.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Self::id_for_email(&email),
        };

        Ok(Some(Identity {
            id,
            name: name.to_string(),
            startup: self.startup.trim().to_string(),
            email,
            avatar: self
                .avatar
                .clone()
                .unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_derived_id_is_stable() {
        let a = LocalIdentityProvider::new("Ada", "Ada@Example.com").identify().unwrap().unwrap();
        let b = LocalIdentityProvider::new("Ada L", " ada@example.com").identify().unwrap().unwrap();
        assert_eq!(a.id, b.id);
        assert!(a.id.starts_with("user_"));
        assert_eq!(a.email, "ada@example.com");
        assert_eq!(a.avatar, DEFAULT_AVATAR);
    }

    #[test]
    fn test_explicit_id_wins() {
        let identity = LocalIdentityProvider::new("Ada", "ada@example.com")
            .with_id("google-1234")
            .with_startup(" Engines ")
            .identify()
            .unwrap()
            .unwrap();
        assert_eq!(identity.id, "google-1234");
        assert_eq!(identity.startup, "Engines");
    }

    #[test]
    fn test_missing_fields_rejected() {
        assert!(LocalIdentityProvider::new("", "ada@example.com").identify().unwrap_err().is_validation());
        assert!(LocalIdentityProvider::new("Ada", "not-an-email").identify().unwrap_err().is_validation());
    }
}

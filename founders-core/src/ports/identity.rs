//! Identity provider port
//!
//! Defines what the workspace store needs from whatever authenticates the
//! user (OAuth, local sign-up, a test fixture): a stable id and the display
//! attributes. The store trusts the id verbatim as its partition key.

use serde::{Deserialize, Serialize};

use crate::domain::result::Result;
use crate::domain::User;

/// An authenticated identity as reported by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub startup: String,
    pub email: String,
    pub avatar: String,
}

impl Identity {
    /// Directory entry for this identity
    pub fn to_user(&self) -> User {
        User::new(self.id.trim(), self.name.trim(), &self.email)
            .with_startup(self.startup.trim())
            .with_avatar(self.avatar.trim())
    }
}

/// Identity/session provider trait
///
/// Implementations resolve the currently authenticated identity. `Ok(None)`
/// means nobody is signed in with this provider.
pub trait IdentityProvider: Send + Sync {
    /// Provider name (e.g., "local", "google")
    fn name(&self) -> &str;

    /// Resolve the authenticated identity
    fn identify(&self) -> Result<Option<Identity>>;
}

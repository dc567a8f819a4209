//! Session service - who is signed in
//!
//! The current user is a pointer kept in settings.json (`app.currentUser`).
//! Signing in registers the identity in the user directory and makes sure the
//! account has a workspace before the session points at it.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::domain::result::{Error, Result};
use crate::domain::User;
use crate::ports::{IdentityProvider, WorkspaceRepository};
use crate::services::WorkspaceService;

pub struct SessionService {
    repository: Arc<dyn WorkspaceRepository>,
    workspaces: Arc<WorkspaceService>,
    data_dir: PathBuf,
}

impl SessionService {
    pub fn new(
        repository: Arc<dyn WorkspaceRepository>,
        workspaces: Arc<WorkspaceService>,
        data_dir: PathBuf,
    ) -> Self {
        Self {
            repository,
            workspaces,
            data_dir,
        }
    }

    fn set_current(&self, user_id: Option<&str>) -> Result<()> {
        let mut config = Config::load(&self.data_dir)?;
        config.current_user = user_id.map(str::to_string);
        config.save(&self.data_dir)
    }

    /// Sign in with whatever identity the provider yields
    pub fn sign_in(&self, provider: &dyn IdentityProvider) -> Result<User> {
        let identity = provider.identify()?.ok_or_else(|| {
            Error::validation(format!("{} provider returned no identity", provider.name()))
        })?;

        let user = self.repository.upsert_user(&identity.to_user())?;
        self.workspaces.get_or_create(&user.id)?;
        self.workspaces.record_visit(&user.id)?;
        self.set_current(Some(&user.id))?;

        tracing::debug!(user_id = %user.id, provider = provider.name(), "signed in");
        Ok(user)
    }

    /// The signed-in user, if the session still points at an existing account
    pub fn current_user(&self) -> Result<Option<User>> {
        let config = Config::load(&self.data_dir)?;
        match config.current_user {
            Some(id) => self.repository.get_user(&id),
            None => Ok(None),
        }
    }

    /// Like `current_user`, but not being signed in is an error
    pub fn require_user(&self) -> Result<User> {
        self.current_user()?
            .ok_or_else(|| Error::not_found("no one is signed in (run `fc signin`)"))
    }

    pub fn switch_account(&self, user_id: &str) -> Result<User> {
        let user = self
            .repository
            .get_user(user_id)?
            .ok_or_else(|| Error::not_found(format!("account {}", user_id)))?;
        self.workspaces.record_visit(&user.id)?;
        self.set_current(Some(&user.id))?;
        Ok(user)
    }

    pub fn list_accounts(&self) -> Result<Vec<User>> {
        self.repository.list_users()
    }

    pub fn sign_out(&self) -> Result<()> {
        self.set_current(None)
    }

    /// Remove an account and its workspace
    pub fn delete_account(&self, user_id: &str) -> Result<()> {
        if !self.workspaces.delete_account(user_id)? {
            return Err(Error::not_found(format!("account {}", user_id)));
        }

        let config = Config::load(&self.data_dir)?;
        if config.current_user.as_deref() == Some(user_id) {
            self.set_current(None)?;
        }
        tracing::debug!(user_id = %user_id, "account deleted");
        Ok(())
    }
}

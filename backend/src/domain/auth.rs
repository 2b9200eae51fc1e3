//! Generic profile access across actor roles.
//!
//! Every actor (patient, doctor, lab assistant) exposes the same contact and
//! credential surface. Rather than downcasting at runtime, the directory maps
//! each [`Role`] to its repository implementation once at startup and
//! dispatches through the table.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::actors::Role;
use super::error::DomainError;
use super::ports::{AuthUserRepository, RepositoryError};

/// Role-independent profile record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Actor identifier within its role's table.
    pub id: Uuid,
    /// Actor role.
    pub role: Role,
    /// Contact e-mail.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// Passport / national id number.
    pub passport: String,
    /// Hashed password; hashing itself happens upstream.
    pub password_hash: String,
}

/// Partial update applied to a profile record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactUpdate {
    /// New contact e-mail, if changing.
    pub email: Option<String>,
    /// New phone number, if changing.
    pub phone: Option<String>,
    /// New passport number, if changing.
    pub passport: Option<String>,
    /// New password hash, if changing.
    pub password_hash: Option<String>,
}

impl ContactUpdate {
    fn apply(self, user: &mut AuthUser) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(phone) = self.phone {
            user.phone = phone;
        }
        if let Some(passport) = self.passport {
            user.passport = passport;
        }
        if let Some(password_hash) = self.password_hash {
            user.password_hash = password_hash;
        }
    }
}

/// Role-keyed lookup table over profile repositories, built at startup.
#[derive(Clone, Default)]
pub struct ProfileDirectory {
    entries: HashMap<Role, Arc<dyn AuthUserRepository>>,
}

impl ProfileDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the repository serving a role. Later registrations replace
    /// earlier ones.
    pub fn register(mut self, role: Role, repository: Arc<dyn AuthUserRepository>) -> Self {
        self.entries.insert(role, repository);
        self
    }

    fn repository(&self, role: Role) -> Result<&Arc<dyn AuthUserRepository>, DomainError> {
        self.entries
            .get(&role)
            .ok_or_else(|| DomainError::internal(format!("no profile repository for role {role}")))
    }

    fn map_repository_error(error: RepositoryError) -> DomainError {
        DomainError::internal(format!("profile repository error: {error}"))
    }

    /// Fetch the profile record behind a role + id pair.
    pub async fn fetch(&self, role: Role, id: Uuid) -> Result<AuthUser, DomainError> {
        self.repository(role)?
            .load(id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| DomainError::not_found("profile not found"))
    }

    /// Apply a contact/credential update to the record behind a role + id
    /// pair and return the stored result.
    pub async fn update_contact(
        &self,
        role: Role,
        id: Uuid,
        update: ContactUpdate,
    ) -> Result<AuthUser, DomainError> {
        let repository = self.repository(role)?;
        let mut user = repository
            .load(id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| DomainError::not_found("profile not found"))?;

        update.apply(&mut user);
        repository
            .store(&user)
            .await
            .map_err(Self::map_repository_error)?;
        info!(%role, %id, "profile updated");
        Ok(user)
    }
}

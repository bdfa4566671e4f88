use std::sync::Arc;

use authcore_core::{Clock, DomainResult, SystemClock};

use crate::config::AuthConfig;
use crate::expiry::TokenExpiryService;
use crate::membership::{Membership, MembershipRecord};
use crate::roles::{IntoRole, Role, RoleTable};
use crate::user::{User, UserRecord};

/// Entry point bundling the role table and the token service.
///
/// Holds configuration only; every decision is made by the component it
/// hands out.
#[derive(Debug, Clone)]
pub struct Auth<C = SystemClock> {
    roles: Arc<RoleTable>,
    tokens: TokenExpiryService<C>,
}

impl Auth<SystemClock> {
    pub fn new(config: AuthConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    pub fn from_env() -> DomainResult<Self> {
        Ok(Self::new(AuthConfig::from_env()?))
    }
}

impl Default for Auth<SystemClock> {
    fn default() -> Self {
        Self::new(AuthConfig::default())
    }
}

impl<C: Clock> Auth<C> {
    pub fn with_clock(config: AuthConfig, clock: C) -> Self {
        Self {
            tokens: TokenExpiryService::with_clock(config.token_lifetime, clock),
            roles: config.roles,
        }
    }

    pub fn role_table(&self) -> &Arc<RoleTable> {
        &self.roles
    }

    pub fn tokens(&self) -> &TokenExpiryService<C> {
        &self.tokens
    }

    pub fn role(&self, input: impl IntoRole) -> Role {
        Role::resolve(&self.roles, input)
    }

    pub fn user<R: IntoRole>(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
        roles: impl IntoIterator<Item = R>,
    ) -> User {
        User::with_table(Arc::clone(&self.roles), name, email, roles)
    }

    pub fn user_from_record(&self, record: UserRecord) -> User {
        User::from_record(Arc::clone(&self.roles), record)
    }

    pub fn membership(&self, user: User) -> Membership {
        Membership::new(user)
    }

    pub fn membership_from_record(&self, record: MembershipRecord) -> Membership {
        Membership::from_record(Arc::clone(&self.roles), record)
    }
}

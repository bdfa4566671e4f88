//! `authcore-auth` — roles, group permissions and token lifetimes.
//!
//! This crate is intentionally decoupled from transport and storage: it does
//! not verify credentials, it only answers what an already-identified user
//! may do inside a group and whether a token is still inside its window.

pub mod config;
pub mod expiry;
pub mod facade;
pub mod membership;
pub mod permissions;
pub mod roles;
pub mod user;

pub use config::AuthConfig;
pub use expiry::TokenExpiryService;
pub use facade::Auth;
pub use membership::{GroupConfig, GroupMembership, GroupMembershipRecord, Membership, MembershipRecord};
pub use permissions::{Permission, PermissionSet, perms};
pub use roles::{IntoRole, Role, RoleTable};
pub use user::{User, UserId, UserRecord};

pub use authcore_core::{Clock, DomainError, DomainResult, FixedClock, SystemClock};

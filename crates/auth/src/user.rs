//! User identity record.
//!
//! The identity record is supplied already validated by the consuming
//! application; this module only shapes it and answers role queries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::{IntoRole, Role, RoleTable};

/// Timestamp layout used when rendering a user.
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─────────────────────────────────────────────────────────────────────────────
// User ID
// ─────────────────────────────────────────────────────────────────────────────

/// Unique identifier for a user.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<UserId> for Uuid {
    fn from(value: UserId) -> Self {
        value.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Record
// ─────────────────────────────────────────────────────────────────────────────

/// Plain interchange form of a [`User`]. Roles are canonical values.
///
/// Every field is optional on input: a missing id gets a fresh one and
/// missing timestamps are set to the time of decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for UserRecord {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            name: String::new(),
            email: String::new(),
            roles: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// Identity record with role assignment.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    table: Arc<RoleTable>,
}

impl Default for User {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            name: String::new(),
            email: String::new(),
            roles: Vec::new(),
            created_at: now,
            updated_at: now,
            table: RoleTable::standard(),
        }
    }
}

impl User {
    /// New user resolved against the standard role table.
    pub fn new<R: IntoRole>(
        name: impl Into<String>,
        email: impl Into<String>,
        roles: impl IntoIterator<Item = R>,
    ) -> Self {
        Self::with_table(RoleTable::standard(), name, email, roles)
    }

    /// New user whose roles resolve against `table`.
    pub fn with_table<R: IntoRole>(
        table: Arc<RoleTable>,
        name: impl Into<String>,
        email: impl Into<String>,
        roles: impl IntoIterator<Item = R>,
    ) -> Self {
        let roles = roles
            .into_iter()
            .map(|r| Role::resolve(&table, r))
            .collect();
        Self {
            name: name.into(),
            email: email.into(),
            roles,
            table,
            ..Default::default()
        }
    }

    pub fn from_record(table: Arc<RoleTable>, record: UserRecord) -> Self {
        let roles = record
            .roles
            .into_iter()
            .map(|r| Role::resolve(&table, r))
            .collect();
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            roles,
            created_at: record.created_at,
            updated_at: record.updated_at,
            table,
        }
    }

    pub fn to_record(&self) -> UserRecord {
        UserRecord {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            roles: self.roles.iter().map(|r| r.as_str().to_string()).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn role_table(&self) -> &Arc<RoleTable> {
        &self.table
    }

    /// Whether the user holds `role` (by name or canonical value).
    pub fn is(&self, role: impl IntoRole) -> bool {
        let wanted = Role::resolve(&self.table, role);
        self.roles.iter().any(|r| *r == wanted)
    }

    /// Multi-line rendering: name, then (when `detailed`) `<email>` and the
    /// comma-joined role names, then the creation time unless `hide_date`.
    pub fn render(&self, detailed: bool, hide_date: bool) -> String {
        let mut lines: Vec<String> = vec![self.name.clone()];
        if detailed {
            if !self.email.is_empty() {
                lines.push(format!("<{}>", self.email));
            }
            if !self.roles.is_empty() {
                let roles: Vec<&str> = self
                    .roles
                    .iter()
                    .map(|r| r.name().unwrap_or(r.as_str()))
                    .collect();
                lines.push(roles.join(", "));
            }
        }
        if !hide_date {
            lines.push(self.created_at.format(DATE_FORMAT).to_string());
        }
        lines.join("\n")
    }
}

impl core::fmt::Display for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.render(false, false))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

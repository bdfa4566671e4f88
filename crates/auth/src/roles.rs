use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use serde::{Serialize, Serializer};

use authcore_core::{DomainError, DomainResult, ValueObject};

/// Symbolic name of the role that bypasses permission checks.
pub const ADMIN: &str = "admin";

/// Symbolic name of the role granted by default on `join`.
pub const USER: &str = "user";

const RESERVED_SEPARATOR: char = ',';

static STANDARD: LazyLock<Arc<RoleTable>> = LazyLock::new(|| {
    Arc::new(RoleTable {
        entries: vec![
            (Cow::Borrowed(ADMIN), Cow::Borrowed("a")),
            (Cow::Borrowed("author"), Cow::Borrowed("r")),
            (Cow::Borrowed("moderator"), Cow::Borrowed("m")),
            (Cow::Borrowed(USER), Cow::Borrowed("u")),
        ],
    })
});

/// Recognised roles: an ordered mapping of symbolic name to canonical value.
///
/// # Invariants
/// - Canonical values are pairwise distinct.
/// - No canonical value contains a comma (role lists are comma-joined).
///
/// A table can only be obtained through [`RoleTable::new`] (or the built-in
/// [`RoleTable::standard`]), so every `Role` resolved against a table inherits
/// a validated mapping. The table is immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTable {
    entries: Vec<(Cow<'static, str>, Cow<'static, str>)>,
}

impl RoleTable {
    /// Build and validate a table from `(name, value)` pairs.
    pub fn new<I, N, V>(entries: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<Cow<'static, str>>,
        V: Into<Cow<'static, str>>,
    {
        let table = Self {
            entries: entries
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        };
        table.validate()?;
        Ok(table)
    }

    /// The built-in table: `admin → a`, `author → r`, `moderator → m`,
    /// `user → u`.
    pub fn standard() -> Arc<RoleTable> {
        Arc::clone(&STANDARD)
    }

    /// Re-check both invariants. O(number of entries).
    pub fn validate(&self) -> DomainResult<()> {
        if let Some((name, value)) = self
            .entries
            .iter()
            .find(|(_, value)| value.contains(RESERVED_SEPARATOR))
        {
            return Err(DomainError::invalid_role_value(&**name, &**value));
        }

        let mut seen: HashMap<&str, &str> = HashMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            if let Some(first) = seen.insert(&**value, &**name) {
                return Err(DomainError::duplicate_role_value(
                    &**value,
                    first,
                    &**name,
                ));
            }
        }
        Ok(())
    }

    /// Canonical value registered under a symbolic name.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| &**v)
    }

    /// Symbolic name registered for a canonical value.
    pub fn name_of(&self, value: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, v)| v == value)
            .map(|(n, _)| &**n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (&**n, &**v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RoleTable {
    fn default() -> Self {
        RoleTable::clone(&STANDARD)
    }
}

/// Role identifier used for RBAC.
///
/// A role carries its canonical value plus the table it was resolved
/// against, so it can render its symbolic name. Equality and hashing only
/// look at the canonical value.
#[derive(Debug, Clone)]
pub struct Role {
    value: Cow<'static, str>,
    table: Arc<RoleTable>,
}

impl Role {
    /// Resolve `input` against the standard table.
    pub fn new(input: impl IntoRole) -> Self {
        input.into_role(&RoleTable::standard())
    }

    /// Resolve `input` against `table`.
    ///
    /// A `Role` is passed through untouched; a symbolic name is replaced by its
    /// canonical value; anything else is kept as a raw canonical value.
    pub fn resolve(table: &Arc<RoleTable>, input: impl IntoRole) -> Self {
        input.into_role(table)
    }

    fn from_str_in(table: &Arc<RoleTable>, input: Cow<'static, str>) -> Self {
        let value = match table.value_of(&input) {
            Some(canonical) => Cow::Owned(canonical.to_owned()),
            None => input,
        };
        Self {
            value,
            table: Arc::clone(table),
        }
    }

    /// Canonical value.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Symbolic name for the value, `None` for raw values.
    pub fn name(&self) -> Option<&str> {
        self.table.name_of(&self.value)
    }

    /// `detailed = false` renders the canonical value; `detailed = true`
    /// renders the symbolic name, or `""` when the value is raw.
    pub fn render(&self, detailed: bool) -> &str {
        if detailed {
            self.name().unwrap_or("")
        } else {
            self.as_str()
        }
    }

    /// Whether this role bypasses permission checks.
    ///
    /// Matches both the table's admin value and the literal name, so a value
    /// that slipped through unresolved still counts.
    pub fn is_admin(&self) -> bool {
        self.table.value_of(ADMIN) == Some(self.as_str()) || self.as_str() == ADMIN
    }

    pub fn table(&self) -> &Arc<RoleTable> {
        &self.table
    }
}

impl PartialEq for Role {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Role {}

impl core::hash::Hash for Role {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl ValueObject for Role {}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.value)
    }
}

/// Anything that can become a [`Role`] given a role table.
pub trait IntoRole {
    fn into_role(self, table: &Arc<RoleTable>) -> Role;
}

impl IntoRole for Role {
    fn into_role(self, _table: &Arc<RoleTable>) -> Role {
        self
    }
}

impl IntoRole for &str {
    fn into_role(self, table: &Arc<RoleTable>) -> Role {
        Role::from_str_in(table, Cow::Owned(self.to_owned()))
    }
}

impl IntoRole for String {
    fn into_role(self, table: &Arc<RoleTable>) -> Role {
        Role::from_str_in(table, Cow::Owned(self))
    }
}

impl IntoRole for &String {
    fn into_role(self, table: &Arc<RoleTable>) -> Role {
        self.as_str().into_role(table)
    }
}

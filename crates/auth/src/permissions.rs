use std::borrow::{Borrow, Cow};
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use authcore_core::ValueObject;

/// Permission token.
///
/// Tokens come from an open alphabet; the conventional ones are `r` (read),
/// `w` (write), `d` (delete) and `*`. Matching is exact: `*` is only a token
/// like any other here and `w` does not imply `r`. Only the admin role
/// bypasses checks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const READ: Permission = Permission(Cow::Borrowed("r"));
    pub const WRITE: Permission = Permission(Cow::Borrowed("w"));
    pub const DELETE: Permission = Permission(Cow::Borrowed("d"));
    pub const WILDCARD: Permission = Permission(Cow::Borrowed("*"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl ValueObject for Permission {}

// Lets sets be queried with a plain `&str`; ordering matches `str`.
impl Borrow<str> for Permission {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Permission {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Permission {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered permission set; serializes as a sorted sequence.
pub type PermissionSet = BTreeSet<Permission>;

/// Build a [`PermissionSet`] from anything convertible to [`Permission`].
pub fn perms<I, P>(tokens: I) -> PermissionSet
where
    I: IntoIterator<Item = P>,
    P: Into<Permission>,
{
    tokens.into_iter().map(Into::into).collect()
}

//! Group memberships: per-group role, permission set and configuration.
//!
//! A [`Membership`] composes a [`User`] with the groups that user has
//! joined. Permission checks are pure lookups; the only mutation besides
//! `join` is [`Membership::mint_daily_coins`], which grows the group wallet.

use std::collections::BTreeMap;
use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::permissions::{Permission, PermissionSet};
use crate::roles::{IntoRole, Role, RoleTable, USER};
use crate::user::{User, UserRecord};

// ─────────────────────────────────────────────────────────────────────────────
// Group configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Group-specific state.
///
/// `daily_coins` and `wallet` are the recognised fields; anything else the
/// consumer stores lives in `extra` and round-trips untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupConfig {
    /// Amount credited by each `mint_daily_coins` call. Zero disables minting.
    /// Accepts a JSON integer or a numeric string on input.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "daily_coins_format")]
    pub daily_coins: Option<i64>,

    /// Accumulated balance. Unset until the first mint.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "wallet_format")]
    pub wallet: Option<BigInt>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GroupConfig {
    pub fn with_daily_coins(daily_coins: i64) -> Self {
        Self {
            daily_coins: Some(daily_coins),
            ..Default::default()
        }
    }
}

/// Integers arrive either as JSON numbers or as decimal strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawInteger {
    Text(String),
    Int(i64),
    UInt(u64),
}

/// Wallet balances are written as decimal strings so no reader truncates
/// them to a float; plain JSON integers are accepted on input.
mod wallet_format {
    use num_bigint::BigInt;
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    use super::RawInteger;

    pub fn serialize<S: Serializer>(wallet: &Option<BigInt>, serializer: S) -> Result<S::Ok, S::Error> {
        match wallet {
            Some(balance) => serializer.serialize_str(&balance.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<BigInt>, D::Error> {
        match Option::<RawInteger>::deserialize(deserializer)? {
            None => Ok(None),
            Some(RawInteger::Int(n)) => Ok(Some(BigInt::from(n))),
            Some(RawInteger::UInt(n)) => Ok(Some(BigInt::from(n))),
            Some(RawInteger::Text(s)) => s
                .trim()
                .parse::<BigInt>()
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid wallet balance '{s}': {e}"))),
        }
    }
}

/// `dailyCoins` is written as a number; numeric strings are accepted on input.
mod daily_coins_format {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    use super::RawInteger;

    pub fn serialize<S: Serializer>(daily: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match daily {
            Some(n) => serializer.serialize_i64(*n),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        match Option::<RawInteger>::deserialize(deserializer)? {
            None => Ok(None),
            Some(RawInteger::Int(n)) => Ok(Some(n)),
            Some(RawInteger::UInt(n)) => i64::try_from(n)
                .map(Some)
                .map_err(|_| D::Error::custom(format!("dailyCoins {n} is out of range"))),
            Some(RawInteger::Text(s)) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid dailyCoins '{s}': {e}"))),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entries
// ─────────────────────────────────────────────────────────────────────────────

/// One group affiliation.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMembership {
    pub role: Role,
    pub perms: PermissionSet,
    pub config: GroupConfig,
}

/// Plain interchange form of a group entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMembershipRecord {
    pub key: String,
    pub role: String,
    #[serde(default)]
    pub perms: Vec<Permission>,
    #[serde(default)]
    pub config: GroupConfig,
}

/// Plain interchange form of a [`Membership`]: identity fields plus groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipRecord {
    #[serde(flatten)]
    pub user: UserRecord,
    #[serde(default)]
    pub memberships: Vec<GroupMembershipRecord>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Membership
// ─────────────────────────────────────────────────────────────────────────────

/// A user together with the groups they belong to.
///
/// No internal locking: mutation goes through `&mut self`.
#[derive(Debug, Clone, Default)]
pub struct Membership {
    user: User,
    groups: BTreeMap<String, GroupMembership>,
}

impl Membership {
    pub fn new(user: User) -> Self {
        Self {
            user,
            groups: BTreeMap::new(),
        }
    }

    /// Rebuild from a record; roles resolve against `table`.
    pub fn from_record(table: Arc<RoleTable>, record: MembershipRecord) -> Self {
        let mut membership = Self::new(User::from_record(Arc::clone(&table), record.user));
        for entry in record.memberships {
            let role = Role::resolve(&table, entry.role);
            membership.groups.insert(
                entry.key,
                GroupMembership {
                    role,
                    perms: entry.perms.into_iter().collect(),
                    config: entry.config,
                },
            );
        }
        membership
    }

    pub fn to_record(&self) -> MembershipRecord {
        MembershipRecord {
            user: self.user.to_record(),
            memberships: self
                .groups
                .iter()
                .map(|(key, entry)| GroupMembershipRecord {
                    key: key.clone(),
                    role: entry.role.as_str().to_string(),
                    perms: entry.perms.iter().cloned().collect(),
                    config: entry.config.clone(),
                })
                .collect(),
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_mut(&mut self) -> &mut User {
        &mut self.user
    }

    pub fn group(&self, key: &str) -> Option<&GroupMembership> {
        self.groups.get(key)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &GroupMembership)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Join (or re-join) `key`. Any previous entry is replaced wholesale.
    pub fn join(
        &mut self,
        key: impl Into<String>,
        role: impl IntoRole,
        perms: PermissionSet,
        config: GroupConfig,
    ) {
        let key = key.into();
        let role = Role::resolve(self.user.role_table(), role);
        tracing::debug!(group = %key, role = %role, perms = perms.len(), "joined group");
        self.groups.insert(key, GroupMembership { role, perms, config });
    }

    /// Join `key` as a plain user with read access and no configuration.
    pub fn join_default(&mut self, key: impl Into<String>) {
        self.join(
            key,
            USER,
            PermissionSet::from([Permission::READ]),
            GroupConfig::default(),
        );
    }

    /// Whether the user may exercise `perm` within `key`.
    ///
    /// Unknown groups are denied. Admins are allowed everything, including
    /// tokens that were never declared. Everyone else needs an exact match.
    pub fn can(&self, key: &str, perm: &str) -> bool {
        let Some(entry) = self.groups.get(key) else {
            tracing::debug!(group = key, perm, "denied: not a member");
            return false;
        };

        if entry.role.is_admin() {
            tracing::debug!(group = key, perm, "allowed: admin bypass");
            return true;
        }

        let allowed = entry.perms.contains(perm);
        if !allowed {
            tracing::debug!(group = key, perm, role = %entry.role, "denied: missing permission");
        }
        allowed
    }

    /// Credit the group's `daily_coins` to its wallet.
    ///
    /// No-op for unknown groups and for groups without a non-zero
    /// `daily_coins`. The wallet starts at zero and is never reset here.
    pub fn mint_daily_coins(&mut self, key: &str) {
        let Some(entry) = self.groups.get_mut(key) else {
            return;
        };
        let Some(daily) = entry.config.daily_coins.filter(|n| *n != 0) else {
            return;
        };

        let wallet = entry.config.wallet.get_or_insert_with(BigInt::zero);
        *wallet += BigInt::from(daily);
        tracing::debug!(group = key, minted = daily, wallet = %wallet, "minted daily coins");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::perms;
    use proptest::prelude::*;

    fn wallet(m: &Membership, key: &str) -> Option<BigInt> {
        m.group(key).and_then(|g| g.config.wallet.clone())
    }

    #[test]
    fn joined_permissions_are_checked_exactly() {
        let mut mem = Membership::default();
        mem.join("teamX", "moderator", perms(["r", "w"]), GroupConfig::default());

        assert!(mem.can("teamX", "r"));
        assert!(mem.can("teamX", "w"));
        assert!(!mem.can("teamX", "d"));
        assert!(!mem.can("teamX", "*"));
    }

    #[test]
    fn write_does_not_imply_read() {
        let mut mem = Membership::default();
        mem.join("docs", "user", perms(["w"]), GroupConfig::default());
        assert!(!mem.can("docs", "r"));
    }

    #[test]
    fn unknown_group_is_denied() {
        let mem = Membership::default();
        assert!(!mem.can("nowhere", "r"));
    }

    #[test]
    fn admin_bypasses_permission_checks() {
        let mut mem = Membership::default();
        mem.join("admins", "admin", PermissionSet::new(), GroupConfig::default());

        assert!(mem.can("admins", "*"));
        assert!(mem.can("admins", "d"));
        assert!(mem.can("admins", "never-declared"));
    }

    #[test]
    fn admin_by_canonical_value() {
        let mut mem = Membership::default();
        mem.join("ops", "a", PermissionSet::new(), GroupConfig::default());
        assert!(mem.can("ops", "w"));
    }

    #[test]
    fn join_default_grants_read_as_user() {
        let mut mem = Membership::default();
        mem.join_default("club");

        let group = mem.group("club").unwrap();
        assert_eq!(group.role.as_str(), "u");
        assert!(mem.can("club", "r"));
        assert!(!mem.can("club", "w"));
    }

    #[test]
    fn rejoining_replaces_the_entry() {
        let mut mem = Membership::default();
        mem.join("g", "moderator", perms(["r", "w"]), GroupConfig::with_daily_coins(5));
        mem.mint_daily_coins("g");

        mem.join("g", "user", perms(["d"]), GroupConfig::default());
        let group = mem.group("g").unwrap();
        assert_eq!(group.role, Role::new("user"));
        assert!(!mem.can("g", "r"));
        assert!(mem.can("g", "d"));
        assert_eq!(group.config, GroupConfig::default());
    }

    #[test]
    fn minting_accumulates() {
        let mut mem = Membership::default();
        mem.join("gamers", "user", perms(["r"]), GroupConfig::with_daily_coins(10));

        mem.mint_daily_coins("gamers");
        assert_eq!(wallet(&mem, "gamers"), Some(BigInt::from(10)));
        mem.mint_daily_coins("gamers");
        assert_eq!(wallet(&mem, "gamers"), Some(BigInt::from(20)));
        mem.mint_daily_coins("gamers");
        assert_eq!(wallet(&mem, "gamers"), Some(BigInt::from(30)));
    }

    #[test]
    fn minting_without_daily_coins_leaves_wallet_unset() {
        let mut mem = Membership::default();
        mem.join("free", "user", perms(["r"]), GroupConfig::default());
        mem.join("zero", "user", perms(["r"]), GroupConfig::with_daily_coins(0));

        mem.mint_daily_coins("free");
        mem.mint_daily_coins("zero");
        mem.mint_daily_coins("missing");

        assert_eq!(wallet(&mem, "free"), None);
        assert_eq!(wallet(&mem, "zero"), None);
    }

    #[test]
    fn wallet_grows_past_fixed_width_integers() {
        let mut mem = Membership::default();
        mem.join("whales", "user", perms(["r"]), GroupConfig::with_daily_coins(i64::MAX));

        mem.mint_daily_coins("whales");
        mem.mint_daily_coins("whales");
        mem.mint_daily_coins("whales");

        let expected = BigInt::from(i64::MAX) * BigInt::from(3);
        assert_eq!(wallet(&mem, "whales"), Some(expected));
    }

    #[test]
    fn record_lists_groups_with_canonical_roles() {
        let mut mem = Membership::new(User::new("Dana", "dana@example.com", ["user"]));
        mem.join("group1", "moderator", perms(["r"]), GroupConfig::with_daily_coins(5));

        let record = mem.to_record();
        let group = record.memberships.iter().find(|m| m.key == "group1").unwrap();
        assert_eq!(group.role, "m");
        assert_eq!(group.perms, vec![Permission::READ]);
        assert_eq!(group.config, GroupConfig::with_daily_coins(5));
    }

    #[test]
    fn record_round_trip_through_json() {
        let mut mem = Membership::new(User::new("Eve", "eve@example.com", ["author"]));
        let mut config = GroupConfig::with_daily_coins(7);
        config.extra.insert("theme".into(), serde_json::json!("dark"));
        mem.join("writers", "author", perms(["r", "w"]), config);
        mem.join("admins", "admin", PermissionSet::new(), GroupConfig::default());
        mem.mint_daily_coins("writers");

        let record = mem.to_record();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["memberships"][1]["config"]["wallet"], "7");
        assert_eq!(json["memberships"][1]["config"]["theme"], "dark");
        assert_eq!(json["name"], "Eve");

        let decoded: MembershipRecord = serde_json::from_value(json).unwrap();
        let rebuilt = Membership::from_record(RoleTable::standard(), decoded);
        assert_eq!(rebuilt.to_record(), record);
        assert!(rebuilt.can("admins", "anything"));
        assert!(rebuilt.can("writers", "w"));
    }

    #[test]
    fn wallet_accepts_plain_integers() {
        let config: GroupConfig =
            serde_json::from_value(serde_json::json!({ "dailyCoins": 3, "wallet": 12 })).unwrap();
        assert_eq!(config.wallet, Some(BigInt::from(12)));
        assert_eq!(config.daily_coins, Some(3));
        assert!(config.extra.is_empty());
    }

    #[test]
    fn wallet_accepts_integers_beyond_i64() {
        let config: GroupConfig =
            serde_json::from_value(serde_json::json!({ "wallet": 9_223_372_036_854_775_808u64 }))
                .unwrap();
        assert_eq!(config.wallet, Some(BigInt::from(1u64 << 63)));

        let config: GroupConfig = serde_json::from_value(serde_json::json!({
            "wallet": "123456789012345678901234567890"
        }))
        .unwrap();
        assert_eq!(
            config.wallet.map(|w| w.to_string()),
            Some("123456789012345678901234567890".to_string())
        );
    }

    #[test]
    fn daily_coins_accepts_numeric_strings() {
        let config: GroupConfig =
            serde_json::from_value(serde_json::json!({ "dailyCoins": "10" })).unwrap();
        assert_eq!(config.daily_coins, Some(10));
        assert_eq!(serde_json::to_value(&config).unwrap(), serde_json::json!({ "dailyCoins": 10 }));

        let mut mem = Membership::default();
        mem.join("g", "user", perms(["r"]), config);
        mem.mint_daily_coins("g");
        assert_eq!(wallet(&mem, "g"), Some(BigInt::from(10)));

        let bad = serde_json::from_value::<GroupConfig>(serde_json::json!({ "dailyCoins": "ten" }));
        assert!(bad.is_err());
    }

    #[test]
    fn record_without_identity_metadata_uses_defaults() {
        let json = serde_json::json!({
            "name": "Alice",
            "email": "a@x",
            "roles": ["admin"],
            "memberships": [{ "key": "g", "role": "user", "perms": ["r"], "config": {} }]
        });
        let record: MembershipRecord = serde_json::from_value(json).unwrap();
        let mem = Membership::from_record(RoleTable::standard(), record);

        assert_eq!(mem.user().name, "Alice");
        assert!(mem.user().is("admin"));
        assert!(mem.can("g", "r"));
        assert!(!mem.can("g", "w"));
    }

    #[test]
    fn record_roles_resolve_names_too() {
        let json = serde_json::json!({
            "id": "0190a5b2-7c3e-7d4f-8a1b-2c3d4e5f6a7b",
            "name": "Finn",
            "email": "",
            "roles": [],
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z",
            "memberships": [{ "key": "ops", "role": "admin" }]
        });
        let record: MembershipRecord = serde_json::from_value(json).unwrap();
        let mem = Membership::from_record(RoleTable::standard(), record);

        assert_eq!(mem.group("ops").unwrap().role.as_str(), "a");
        assert!(mem.can("ops", "d"));
        // Symbolic input is rendered back as its canonical value.
        assert_eq!(mem.to_record().memberships[0].role, "a");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: admins are allowed every token; non-members nothing.
        #[test]
        fn admin_allows_any_token(perm in "\\PC{0,12}", key in "[a-z]{1,8}") {
            let mut mem = Membership::default();
            mem.join(key.clone(), "admin", PermissionSet::new(), GroupConfig::default());

            prop_assert!(mem.can(&key, &perm));
            let other = format!("{key}-other");
            prop_assert!(!mem.can(&other, &perm));
        }

        /// Property: after n mints the wallet holds exactly n * daily_coins.
        #[test]
        fn wallet_is_daily_coins_times_mints(daily in 1i64..1_000_000, n in 1usize..40) {
            let mut mem = Membership::default();
            mem.join("g", "user", PermissionSet::new(), GroupConfig::with_daily_coins(daily));
            for _ in 0..n {
                mem.mint_daily_coins("g");
            }
            prop_assert_eq!(wallet(&mem, "g"), Some(BigInt::from(daily) * BigInt::from(n)));
        }
    }
}

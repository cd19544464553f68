//! User identity and entitlements.
//!
//! [`UserId`] is the key of every map in the crate. It is stable across
//! sessions and may be referenced while the user is offline (the persisted
//! hidden set holds identities, not live player handles).

use core::fmt;

/// Stable account identity of a user (the host's 64-bit account id).
///
/// Never reused across distinct humans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct UserId(pub u64);

impl UserId {
    /// Raw account id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Permissions the host grants, queried through [`Host::has_entitlement`].
///
/// How an entitlement maps onto the host's permission strings is the host's
/// business; [`Entitlement::permission`] gives the conventional names.
///
/// [`Host::has_entitlement`]: crate::host::Host::has_entitlement
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Entitlement {
    /// May toggle visibility. Also keeps a user hidden across a reconnect
    /// when they were persisted as hidden.
    Use,
    /// Always hidden. Cannot opt out; hidden on connect and on startup.
    Permanent,
}

impl Entitlement {
    /// Conventional permission string for this entitlement.
    pub fn permission(self) -> &'static str {
        match self {
            Entitlement::Use => "vanish.allow",
            Entitlement::Permanent => "vanish.permanent",
        }
    }
}

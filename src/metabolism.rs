/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Metabolism values and the pre-hide snapshot cache.
//!
//! - [`Metabolism`]: the slice of a player's vital simulation values this crate
//!   touches — health, hydration, and the bounds that can kill an idle player.
//! - [`MetabolismSnapshot`]: the health/hydration pair captured on hide.
//! - [`SnapshotCache`]: per-user snapshots with write-once-until-consumed semantics.
//!
//! # Invariants
//!
//! - **VAN-010**: a snapshot is written only if none exists for the user; a
//!   second hide never overwrites the older baseline.
//! - **VAN-011**: a snapshot is consumed exactly once, by the reappear that
//!   follows; consumption removes the entry.
//! - **VAN-012**: snapshots live in memory only. A restart drops them.

use hashbrown::HashMap;

use crate::identity::UserId;

// ─── Metabolism ─────────────────────────────────────────────────────────────

/// Inclusive value range of a metabolism attribute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl Bounds {
    /// Construct a range.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

/// Host defaults for the bounds relaxed while hidden.
pub const DEFAULT_TEMPERATURE: Bounds = Bounds::new(-100.0, 100.0);
/// Host default radiation poison range.
pub const DEFAULT_RADIATION: Bounds = Bounds::new(0.0, 500.0);
/// Host default oxygen range.
pub const DEFAULT_OXYGEN: Bounds = Bounds::new(0.0, 1.0);
/// Host default wetness range.
pub const DEFAULT_WETNESS: Bounds = Bounds::new(0.0, 1.0);

/// Comfortable body temperature pinned while hidden.
const RELAXED_TEMPERATURE: f32 = 20.0;

/// A player's vital values as read from and written back to the host.
#[derive(Clone, Debug, PartialEq)]
pub struct Metabolism {
    /// Current health.
    pub health: f32,
    /// Current hydration.
    pub hydration: f32,
    /// Body temperature range.
    pub temperature: Bounds,
    /// Radiation poison range.
    pub radiation: Bounds,
    /// Oxygen range.
    pub oxygen: Bounds,
    /// Wetness range.
    pub wetness: Bounds,
}

impl Metabolism {
    /// Metabolism with the given vitals and host-default bounds.
    pub fn new(health: f32, hydration: f32) -> Self {
        Self {
            health,
            hydration,
            temperature: DEFAULT_TEMPERATURE,
            radiation: DEFAULT_RADIATION,
            oxygen: DEFAULT_OXYGEN,
            wetness: DEFAULT_WETNESS,
        }
    }

    /// Pin the environmental extremes so an unattended hidden player cannot
    /// freeze, irradiate, drown, or soak to death.
    pub fn relax(&mut self) {
        self.temperature = Bounds::new(RELAXED_TEMPERATURE, RELAXED_TEMPERATURE);
        self.radiation.max = 0.0;
        self.oxygen.min = 1.0;
        self.wetness.max = 0.0;
    }

    /// Put every bound touched by [`relax`](Self::relax) back to its host default.
    pub fn restore_bounds(&mut self) {
        self.temperature = DEFAULT_TEMPERATURE;
        self.radiation = DEFAULT_RADIATION;
        self.oxygen = DEFAULT_OXYGEN;
        self.wetness = DEFAULT_WETNESS;
    }
}

// ─── Snapshot ───────────────────────────────────────────────────────────────

/// Health and hydration captured the instant a user went hidden.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetabolismSnapshot {
    /// Health at hide time.
    pub health: f32,
    /// Hydration at hide time.
    pub hydration: f32,
}

impl MetabolismSnapshot {
    /// Capture the vitals of `m`.
    pub fn capture(m: &Metabolism) -> Self {
        Self {
            health: m.health,
            hydration: m.hydration,
        }
    }

    /// Write the captured vitals back into `m`.
    pub fn apply_to(&self, m: &mut Metabolism) {
        m.health = self.health;
        m.hydration = self.hydration;
    }
}

// ─── Snapshot cache ─────────────────────────────────────────────────────────

/// Per-user metabolism snapshots (VAN-010 .. VAN-012).
#[derive(Clone, Debug, Default)]
pub struct SnapshotCache {
    entries: HashMap<UserId, MetabolismSnapshot>,
}

impl SnapshotCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `m` for `user` unless a snapshot already exists.
    ///
    /// Returns `true` if a new snapshot was written.
    pub fn capture(&mut self, user: UserId, m: &Metabolism) -> bool {
        if self.entries.contains_key(&user) {
            return false;
        }
        self.entries.insert(user, MetabolismSnapshot::capture(m));
        true
    }

    /// Remove and return the snapshot for `user`.
    pub fn take(&mut self, user: UserId) -> Option<MetabolismSnapshot> {
        self.entries.remove(&user)
    }

    /// Snapshot for `user`, if any.
    pub fn get(&self, user: UserId) -> Option<&MetabolismSnapshot> {
        self.entries.get(&user)
    }

    /// Number of users with a pending snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no snapshot is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relax_then_restore_bounds() {
        let mut m = Metabolism::new(80.0, 150.0);
        m.relax();
        assert_eq!(m.temperature, Bounds::new(20.0, 20.0));
        assert_eq!(m.radiation.max, 0.0);
        assert_eq!(m.oxygen.min, 1.0);
        assert_eq!(m.wetness.max, 0.0);
        // vitals are untouched by bound changes
        assert_eq!(m.health, 80.0);
        assert_eq!(m.hydration, 150.0);

        m.restore_bounds();
        assert_eq!(m, Metabolism::new(80.0, 150.0));
    }

    #[test]
    fn test_capture_is_write_once() {
        let mut cache = SnapshotCache::new();
        let user = UserId(1);

        assert!(cache.capture(user, &Metabolism::new(60.0, 100.0)));
        assert!(!cache.capture(user, &Metabolism::new(100.0, 250.0)));

        let snap = cache.get(user).copied().unwrap();
        assert_eq!(snap.health, 60.0);
        assert_eq!(snap.hydration, 100.0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_take_consumes_exactly_once() {
        let mut cache = SnapshotCache::new();
        let user = UserId(7);
        cache.capture(user, &Metabolism::new(42.0, 9.0));

        let mut m = Metabolism::new(100.0, 250.0);
        cache.take(user).unwrap().apply_to(&mut m);
        assert_eq!(m.health, 42.0);
        assert_eq!(m.hydration, 9.0);

        assert!(cache.take(user).is_none());
        assert!(cache.is_empty());
    }
}

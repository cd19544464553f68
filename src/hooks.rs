/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Reference-counted activation of the optional event hooks.
//!
//! Several hooks fire on every damage or lock-access event server-wide. They
//! only matter while someone is hidden, so [`HookController`] keeps them
//! unsubscribed until the hidden population leaves zero and unsubscribes them
//! again when it returns to zero.
//!
//! # Invariants
//!
//! - **VAN-020**: the controller is active iff `population ≥ 1`.
//! - **VAN-021**: subscribe/unsubscribe calls happen only on the 0→1 and
//!   1→0 edges, never in between.
//! - **VAN-022**: a hook disabled by configuration is never subscribed.

use heapless::Vec as FixedVec;
use tracing::debug;

use crate::host::Host;

// ─── HookKind ───────────────────────────────────────────────────────────────

/// Number of optional hooks.
pub const HOOK_COUNT: usize = 5;

/// The fixed set of costly optional hooks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HookKind {
    /// Damage about to be applied to any entity.
    EntityTakeDamage,
    /// A player trying a code or key lock.
    CanUseLockedEntity,
    /// Auto-turret / flame-turret acquiring a target.
    CanBeTargeted,
    /// NPC target acquisition.
    OnNpcTarget,
    /// Patrol helicopter target acquisition.
    CanHelicopterTarget,
}

impl HookKind {
    /// Every hook in subscription order.
    pub const ALL: [HookKind; HOOK_COUNT] = [
        HookKind::EntityTakeDamage,
        HookKind::CanUseLockedEntity,
        HookKind::CanBeTargeted,
        HookKind::OnNpcTarget,
        HookKind::CanHelicopterTarget,
    ];

    /// Host event name.
    pub fn event_name(self) -> &'static str {
        match self {
            HookKind::EntityTakeDamage => "OnEntityTakeDamage",
            HookKind::CanUseLockedEntity => "CanUseLockedEntity",
            HookKind::CanBeTargeted => "CanBeTargeted",
            HookKind::OnNpcTarget => "OnNpcTarget",
            HookKind::CanHelicopterTarget => "CanHelicopterTarget",
        }
    }
}

/// Aggregate state of the hook set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    /// Hooks subscribed (someone is hidden).
    Active,
    /// Hooks unsubscribed.
    Inactive,
}

// ─── HookController ─────────────────────────────────────────────────────────

/// Reference-counted gate over [`HookKind::ALL`].
#[derive(Clone, Debug)]
pub struct HookController {
    population: usize,
    disabled: FixedVec<HookKind, HOOK_COUNT>,
    active: FixedVec<HookKind, HOOK_COUNT>,
}

impl HookController {
    /// Controller that will never subscribe any hook listed in `disabled`.
    pub fn new(disabled: &[HookKind]) -> Self {
        let mut set = FixedVec::new();
        for hook in HookKind::ALL {
            if disabled.contains(&hook) {
                // capacity is HOOK_COUNT, one slot per kind
                let _ = set.push(hook);
            }
        }
        Self {
            population: 0,
            disabled: set,
            active: FixedVec::new(),
        }
    }

    /// Current reference count.
    pub fn population(&self) -> usize {
        self.population
    }

    /// Aggregate activation state (VAN-020).
    pub fn activation(&self) -> Activation {
        if self.population > 0 {
            Activation::Active
        } else {
            Activation::Inactive
        }
    }

    /// `true` while at least one user is hidden.
    pub fn is_active(&self) -> bool {
        self.activation() == Activation::Active
    }

    /// `true` if `hook` is currently subscribed.
    pub fn is_hook_active(&self, hook: HookKind) -> bool {
        self.active.contains(&hook)
    }

    /// `true` if configuration excludes `hook`.
    pub fn is_disabled(&self, hook: HookKind) -> bool {
        self.disabled.contains(&hook)
    }

    /// Hooks currently subscribed, in subscription order.
    pub fn active_hooks(&self) -> &[HookKind] {
        &self.active
    }

    /// One more hidden user. Subscribes the hook set on 0→1.
    pub fn on_population_increase<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.population += 1;
        if self.population == 1 {
            for hook in HookKind::ALL {
                if self.is_disabled(hook) {
                    continue;
                }
                host.subscribe(hook);
                let _ = self.active.push(hook);
            }
            debug!(hooks = self.active.len(), "optional hooks subscribed");
        }
    }

    /// One fewer hidden user. Unsubscribes the hook set on 1→0.
    ///
    /// A decrease at zero is ignored.
    pub fn on_population_decrease<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.population == 0 {
            return;
        }
        self.population -= 1;
        if self.population == 0 {
            for &hook in self.active.iter() {
                host.unsubscribe(hook);
            }
            self.active.clear();
            debug!("optional hooks unsubscribed");
        }
    }
}

impl Default for HookController {
    fn default() -> Self {
        Self::new(&[])
    }
}

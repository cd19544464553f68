/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! The visibility state machine.
//!
//! [`VisibilityMachine`] owns every registry in the crate — the online hidden
//! registry, the persisted hidden set, the metabolism snapshot cache, the hook
//! controller and the transition guards — and applies the world-model side
//! effects of each transition through a [`Host`].
//!
//! ```text
//!              request_hide                 reconcile_on_disconnect
//!   Visible ────────────────▶ Hidden ──────────────────────────────▶ HiddenOffline
//!      ▲     ◀────────────────   │  (hide_on_disconnect / Permanent)      │
//!      │      request_reappear   │                                        │
//!      │                         ▼ reconcile_on_disconnect (otherwise)    │
//!      └──────────────────── Visible                                      │
//!      ▲                                                                  │
//!      └──────────── reconcile_on_connect (entitlement revoked) ◀─────────┘
//! ```
//!
//! # Invariants
//!
//! - **VAN-001**: a user is in exactly one [`VisibilityState`].
//! - **VAN-002**: the hook controller's population equals the registry size.
//! - **VAN-003**: every registry entry owns exactly one live re-evaluation
//!   task; the task is cancelled on every path out of the registry.
//! - **VAN-004**: guards run before the first side effect; after it the
//!   transition runs to completion.
//! - **VAN-005**: repeated hide / reappear requests are no-ops.

use hashbrown::HashMap;
use tracing::{debug, info, warn};

use crate::config::VanishConfig;
use crate::guard::{GuardChain, Transition, TransitionGuard, Verdict};
use crate::hooks::HookController;
use crate::host::{EffectTarget, Host, MessageKey, TaskHandle};
use crate::identity::{Entitlement, UserId};
use crate::metabolism::SnapshotCache;
use crate::store::PersistedHiddenSet;

// ─── States & outcomes ──────────────────────────────────────────────────────

/// Visibility of a single user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisibilityState {
    /// Default. All world-model effects normal.
    Visible,
    /// Online and suppressed from every other connection.
    Hidden,
    /// Disconnected while hidden; stays flagged for the next session.
    HiddenOffline,
}

impl VisibilityState {
    /// `true` for both hidden states.
    pub fn is_hidden(self) -> bool {
        !matches!(self, VisibilityState::Visible)
    }
}

/// Result of a hide or reappear request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Side effects applied; the state changed.
    Applied,
    /// Already in the requested state. Nothing done.
    Unchanged,
    /// A guard denied the request. Nothing done.
    Vetoed,
    /// The user is not connected. Nothing done.
    Offline,
}

/// Result of [`VisibilityMachine::reconcile_on_connect`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Persisted as hidden and still entitled: hidden again.
    Restored(TransitionOutcome),
    /// Persisted as hidden but no longer entitled: visible, flag dropped.
    Released,
    /// Holds the always-hidden entitlement: hidden.
    Permanent(TransitionOutcome),
    /// Nothing to do.
    Visible,
}

/// Result of [`VisibilityMachine::reconcile_on_disconnect`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// Moved into [`VisibilityState::HiddenOffline`]; the store should be saved.
    Persisted,
    /// Reappeared before the disconnect completed.
    Reappeared,
    /// Was not hidden.
    NotHidden,
}

/// Bookkeeping for one online hidden user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct HiddenEntry {
    task: TaskHandle,
}

// ─── VisibilityMachine ──────────────────────────────────────────────────────

/// Per-user visibility state and the transitions between states.
///
/// Dropping a machine undoes nothing. Call
/// [`reappear_all`](Self::reappear_all) first (the lifecycle's shutdown flush
/// does) or hidden users keep their host effects and live tasks.
#[derive(Debug)]
pub struct VisibilityMachine {
    config: VanishConfig,
    hidden: HashMap<UserId, HiddenEntry>,
    persisted: PersistedHiddenSet,
    snapshots: SnapshotCache,
    hooks: HookController,
    guards: GuardChain,
}

impl VisibilityMachine {
    /// Machine with nobody hidden and no guards.
    pub fn new(config: VanishConfig) -> Self {
        let hooks = HookController::new(&config.disabled_hooks);
        Self {
            config,
            hidden: HashMap::new(),
            persisted: PersistedHiddenSet::new(),
            snapshots: SnapshotCache::new(),
            hooks,
            guards: GuardChain::new(),
        }
    }

    /// Install a transition guard.
    pub fn add_guard<G: TransitionGuard + 'static>(&mut self, guard: G) {
        self.guards.push(guard);
    }

    // ── Queries ────────────────────────────────────────────────────────────

    /// Active configuration.
    pub fn config(&self) -> &VanishConfig {
        &self.config
    }

    /// Current state of `user`.
    pub fn state(&self, user: UserId) -> VisibilityState {
        if self.hidden.contains_key(&user) {
            VisibilityState::Hidden
        } else if self.persisted.contains(user) {
            VisibilityState::HiddenOffline
        } else {
            VisibilityState::Visible
        }
    }

    /// `true` if `user` is hidden, online or offline.
    pub fn is_hidden(&self, user: UserId) -> bool {
        self.state(user).is_hidden()
    }

    /// Online hidden users (the registry), arbitrary order.
    pub fn hidden_users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.hidden.keys().copied()
    }

    /// Size of the online hidden registry.
    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }

    /// Re-evaluation task owned by `user`'s registry entry.
    pub fn reevaluation_task(&self, user: UserId) -> Option<TaskHandle> {
        self.hidden.get(&user).map(|e| e.task)
    }

    /// Identities flagged hidden across sessions.
    pub fn persisted(&self) -> &PersistedHiddenSet {
        &self.persisted
    }

    /// Pending metabolism snapshots.
    pub fn snapshots(&self) -> &SnapshotCache {
        &self.snapshots
    }

    /// Hook activation gate.
    pub fn hooks(&self) -> &HookController {
        &self.hooks
    }

    // ── Persisted set management ───────────────────────────────────────────

    /// Replace the persisted set with one freshly loaded from the store.
    pub fn restore_persisted(&mut self, set: PersistedHiddenSet) {
        self.persisted = set;
    }

    /// Flag every online hidden user in the persisted set (shutdown flush).
    pub fn record_hidden(&mut self) {
        for &user in self.hidden.keys() {
            self.persisted.insert(user);
        }
    }

    // ── Transitions ────────────────────────────────────────────────────────

    /// Hide an online user.
    pub fn request_hide<H: Host + ?Sized>(&mut self, host: &mut H, user: UserId) -> TransitionOutcome {
        if self.hidden.contains_key(&user) {
            debug!(%user, "hide requested for already hidden user");
            return TransitionOutcome::Unchanged;
        }
        if !host.is_online(user) {
            debug!(%user, "hide requested for offline user");
            return TransitionOutcome::Offline;
        }
        if self.guards.evaluate(user, Transition::Hide) == Verdict::Deny {
            debug!(%user, "hide vetoed");
            return TransitionOutcome::Vetoed;
        }

        host.suppress_network_presence(user);
        host.set_position_sync_enabled(user, false);
        host.set_collision_enabled(user, false);
        let task = host.schedule_repeating(self.config.reevaluate_interval(), user);

        if self.config.mute_tells {
            host.set_tells_muted(user, true);
        }
        if self.config.relax_metabolism {
            if let Some(mut metabolism) = host.metabolism(user) {
                self.snapshots.capture(user, &metabolism);
                metabolism.relax();
                host.set_metabolism(user, &metabolism);
            }
        }
        if self.config.suspend_anti_hack {
            host.set_flight_detection(user, false);
        }
        if let Some(effect) = self.config.vanish_effect.as_deref() {
            self.play_effect(host, effect, user);
        }

        self.hidden.insert(user, HiddenEntry { task });
        self.hooks.on_population_increase(host);
        host.notify(user, MessageKey::Vanished, &[]);

        info!(%user, hidden = self.hidden.len(), "user hidden");
        TransitionOutcome::Applied
    }

    /// Make a hidden user visible again.
    ///
    /// For a user in [`VisibilityState::HiddenOffline`] this releases the
    /// sleeping body (see [`release`](Self::release)) and drops the flag.
    pub fn request_reappear<H: Host + ?Sized>(&mut self, host: &mut H, user: UserId) -> TransitionOutcome {
        match self.state(user) {
            VisibilityState::Visible => {
                debug!(%user, "reappear requested for visible user");
                TransitionOutcome::Unchanged
            }
            VisibilityState::HiddenOffline => {
                if self.guards.evaluate(user, Transition::Reappear) == Verdict::Deny {
                    debug!(%user, "offline reappear vetoed");
                    return TransitionOutcome::Vetoed;
                }
                self.release(host, user);
                info!(%user, "offline user released from hiding");
                TransitionOutcome::Applied
            }
            VisibilityState::Hidden => {
                if self.guards.evaluate(user, Transition::Reappear) == Verdict::Deny {
                    debug!(%user, "reappear vetoed");
                    return TransitionOutcome::Vetoed;
                }
                self.reappear_unchecked(host, user);
                TransitionOutcome::Applied
            }
        }
    }

    /// Reappear effects for a registry member, without consulting guards.
    fn reappear_unchecked<H: Host + ?Sized>(&mut self, host: &mut H, user: UserId) {
        let Some(entry) = self.hidden.remove(&user) else {
            return;
        };
        host.cancel(entry.task);

        host.restore_network_presence(user);
        self.restore_body(host, user);
        if let Some(effect) = self.config.reappear_effect.as_deref() {
            self.play_effect(host, effect, user);
        }

        self.hooks.on_population_decrease(host);
        self.persisted.remove(user);
        host.notify(user, MessageKey::Reappeared, &[]);

        info!(%user, hidden = self.hidden.len(), "user reappeared");
    }

    /// Make a user outside the registry visible: lift online and offline
    /// suppression, undo the body effects of their last hide and drop their
    /// flag. Guards are not consulted; no effect or notice is sent.
    ///
    /// Returns `true` if the user was flagged.
    pub fn release<H: Host + ?Sized>(&mut self, host: &mut H, user: UserId) -> bool {
        if self.hidden.contains_key(&user) {
            return false;
        }
        host.restore_network_presence(user);
        self.restore_body(host, user);
        self.persisted.remove(user)
    }

    /// Invert the per-body effects of a hide. Consumes the user's snapshot
    /// even when the body is gone, so it cannot leak into a later session.
    fn restore_body<H: Host + ?Sized>(&mut self, host: &mut H, user: UserId) {
        host.set_collision_enabled(user, true);
        host.set_position_sync_enabled(user, true);
        host.set_tells_muted(user, false);

        let snapshot = self.snapshots.take(user);
        if snapshot.is_none() {
            debug!(%user, "no metabolism snapshot to restore");
        }
        if snapshot.is_some() || self.config.relax_metabolism {
            if let Some(mut metabolism) = host.metabolism(user) {
                if let Some(snapshot) = snapshot {
                    snapshot.apply_to(&mut metabolism);
                }
                if self.config.relax_metabolism {
                    metabolism.restore_bounds();
                }
                host.set_metabolism(user, &metabolism);
            }
        }

        if self.config.suspend_anti_hack {
            host.set_flight_detection(user, true);
        }
        host.remove_overlay(user);
    }

    fn play_effect<H: Host + ?Sized>(&self, host: &mut H, effect: &str, user: UserId) {
        let Some(at) = host.position(user) else {
            return;
        };
        let target = if self.config.public_effects {
            EffectTarget::Public
        } else {
            EffectTarget::User(user)
        };
        host.play_effect(effect, at, target);
    }

    // ── Re-evaluation task ─────────────────────────────────────────────────

    /// Body of the repeating re-evaluation task.
    ///
    /// Re-applies network suppression if `task` still belongs to a hidden,
    /// online `user`. A stale task is cancelled and does nothing. A current
    /// task whose user dropped before the disconnect event arrived is skipped
    /// but stays live; [`reconcile_on_disconnect`](Self::reconcile_on_disconnect)
    /// cancels it. Returns `true` if suppression was re-applied.
    pub fn reevaluate<H: Host + ?Sized>(&mut self, host: &mut H, user: UserId, task: TaskHandle) -> bool {
        let current = self.hidden.get(&user).map(|e| e.task);
        if current != Some(task) {
            debug!(%user, task = task.0, "stale re-evaluation task cancelled");
            host.cancel(task);
            return false;
        }
        if !host.is_online(user) {
            debug!(%user, "re-evaluation skipped, disconnect pending");
            return false;
        }
        host.suppress_network_presence(user);
        true
    }

    // ── Connect / disconnect ───────────────────────────────────────────────

    /// Resolve a freshly connected user's state.
    ///
    /// A flagged user whose re-hide is vetoed comes back fully visible; one
    /// the host still reports offline keeps their flag.
    pub fn reconcile_on_connect<H: Host + ?Sized>(&mut self, host: &mut H, user: UserId) -> ConnectOutcome {
        let permanent = host.has_entitlement(user, Entitlement::Permanent);
        if self.persisted.remove(user) {
            if permanent || host.has_entitlement(user, Entitlement::Use) {
                let outcome = self.request_hide(host, user);
                match outcome {
                    TransitionOutcome::Vetoed => {
                        self.release(host, user);
                    }
                    TransitionOutcome::Offline => {
                        self.persisted.insert(user);
                    }
                    TransitionOutcome::Applied | TransitionOutcome::Unchanged => {}
                }
                info!(%user, ?outcome, "persisted hidden user reconnected");
                return ConnectOutcome::Restored(outcome);
            }
            self.release(host, user);
            info!(%user, "persisted hidden user lost entitlement, now visible");
            return ConnectOutcome::Released;
        }
        if permanent {
            return ConnectOutcome::Permanent(self.request_hide(host, user));
        }
        ConnectOutcome::Visible
    }

    /// Resolve a hidden user's state as they disconnect.
    ///
    /// The caller is expected to save the persisted set on
    /// [`DisconnectOutcome::Persisted`].
    pub fn reconcile_on_disconnect<H: Host + ?Sized>(&mut self, host: &mut H, user: UserId) -> DisconnectOutcome {
        if !self.hidden.contains_key(&user) {
            return DisconnectOutcome::NotHidden;
        }
        if self.config.hide_on_disconnect || host.has_entitlement(user, Entitlement::Permanent) {
            if let Some(entry) = self.hidden.remove(&user) {
                host.cancel(entry.task);
            }
            self.suppress_offline(host, user);
            self.persisted.insert(user);
            self.hooks.on_population_decrease(host);
            clamp_to_terrain(host, user);
            info!(%user, "hidden user disconnected, kept hidden offline");
            DisconnectOutcome::Persisted
        } else {
            self.reappear_unchecked(host, user);
            DisconnectOutcome::Reappeared
        }
    }

    /// Put an offline user into the degraded suppressed state without
    /// touching the persisted set. Metabolism and tell cues are left alone.
    pub fn suppress_offline<H: Host + ?Sized>(&mut self, host: &mut H, user: UserId) {
        host.suppress_offline_presence(user);
        debug!(%user, "offline presence suppressed");
    }

    // ── Teardown ───────────────────────────────────────────────────────────

    /// Reappear every online hidden user, guards bypassed. Returns how many.
    pub fn reappear_all<H: Host + ?Sized>(&mut self, host: &mut H) -> usize {
        let users: Vec<UserId> = self.hidden.keys().copied().collect();
        for &user in &users {
            self.reappear_unchecked(host, user);
        }
        users.len()
    }
}

impl Drop for VisibilityMachine {
    fn drop(&mut self) {
        if !self.hidden.is_empty() {
            warn!(
                hidden = self.hidden.len(),
                "visibility machine dropped with users still hidden; tasks and host effects left in place"
            );
        }
    }
}

/// Lift an unattended body to at least terrain height.
fn clamp_to_terrain<H: Host + ?Sized>(host: &mut H, user: UserId) {
    let Some(mut at) = host.position(user) else {
        return;
    };
    let ground = host.terrain_height(at);
    if at.y < ground {
        at.y = ground;
        host.set_position(user, at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Position;
    use crate::metabolism::Metabolism;
    use crate::sim::SimHost;

    fn setup() -> (VisibilityMachine, SimHost, UserId) {
        let mut host = SimHost::new();
        let user = UserId(100);
        host.add_player(user);
        (VisibilityMachine::new(VanishConfig::default()), host, user)
    }

    #[test]
    fn test_hide_applies_every_effect() {
        let (mut vm, mut host, user) = setup();
        assert_eq!(vm.request_hide(&mut host, user), TransitionOutcome::Applied);

        let p = host.player(user).unwrap();
        assert!(p.network_suppressed);
        assert!(!p.collision);
        assert!(!p.position_sync);
        assert!(p.tells_muted);
        assert!(!p.flight_detection);
        assert_eq!(p.metabolism.temperature.min, 20.0);
        assert_eq!(vm.state(user), VisibilityState::Hidden);
        assert!(vm.snapshots().get(user).is_some());
        assert!(host.task_is_live(vm.reevaluation_task(user).unwrap()));
        assert_eq!(host.effects().len(), 1);
        assert_eq!(host.effects()[0].2, EffectTarget::User(user));
        assert_eq!(host.last_notice(user), Some(MessageKey::Vanished));
    }

    #[test]
    fn test_reappear_inverts_hide() {
        let (mut vm, mut host, user) = setup();
        let before = host.player(user).unwrap().clone();
        vm.request_hide(&mut host, user);
        let task = vm.reevaluation_task(user).unwrap();

        assert_eq!(vm.request_reappear(&mut host, user), TransitionOutcome::Applied);

        let after = host.player(user).unwrap();
        assert_eq!(after.network_suppressed, before.network_suppressed);
        assert_eq!(after.collision, before.collision);
        assert_eq!(after.position_sync, before.position_sync);
        assert_eq!(after.tells_muted, before.tells_muted);
        assert_eq!(after.flight_detection, before.flight_detection);
        assert_eq!(after.metabolism, before.metabolism);
        assert!(!after.overlay);
        assert!(!host.task_is_live(task));
        assert!(vm.snapshots().is_empty());
        assert_eq!(vm.state(user), VisibilityState::Visible);
    }

    #[test]
    fn test_snapshot_not_overwritten_across_rehide() {
        let (mut vm, mut host, user) = setup();
        host.set_vitals(user, 55.0, 80.0);
        vm.request_hide(&mut host, user);

        // disconnect while hidden keeps the snapshot; vitals drift meanwhile
        vm.reconcile_on_disconnect(&mut host, user);
        host.connect(user);
        host.grant(user, Entitlement::Use);
        host.set_vitals(user, 100.0, 250.0);
        vm.reconcile_on_connect(&mut host, user);

        vm.request_reappear(&mut host, user);
        let m = &host.player(user).unwrap().metabolism;
        assert_eq!(m.health, 55.0);
        assert_eq!(m.hydration, 80.0);
    }

    #[test]
    fn test_missing_snapshot_leaves_vitals() {
        let config = VanishConfig {
            relax_metabolism: false,
            ..VanishConfig::default()
        };
        let mut vm = VisibilityMachine::new(config);
        let mut host = SimHost::new();
        let user = UserId(4);
        host.add_player(user);

        vm.request_hide(&mut host, user);
        assert!(vm.snapshots().is_empty());
        host.set_vitals(user, 12.0, 34.0);
        vm.request_reappear(&mut host, user);

        let m = &host.player(user).unwrap().metabolism;
        assert_eq!((m.health, m.hydration), (12.0, 34.0));
    }

    #[test]
    fn test_hide_offline_user_is_noop() {
        let (mut vm, mut host, _) = setup();
        let ghost = UserId(999);
        assert_eq!(vm.request_hide(&mut host, ghost), TransitionOutcome::Offline);
        assert_eq!(vm.hidden_count(), 0);
    }

    #[test]
    fn test_reappear_visible_is_unchanged() {
        let (mut vm, mut host, user) = setup();
        assert_eq!(vm.request_reappear(&mut host, user), TransitionOutcome::Unchanged);
        assert_eq!(host.notice_count(user), 0);
    }

    #[test]
    fn test_vetoed_reappear_keeps_hidden() {
        let (mut vm, mut host, user) = setup();
        vm.request_hide(&mut host, user);
        vm.add_guard(|_: UserId, t: Transition| {
            if t == Transition::Reappear {
                Verdict::Deny
            } else {
                Verdict::Allow
            }
        });
        assert_eq!(vm.request_reappear(&mut host, user), TransitionOutcome::Vetoed);
        assert!(vm.is_hidden(user));
        assert!(host.player(user).unwrap().network_suppressed);
    }

    #[test]
    fn test_reevaluate_resuppresses() {
        let (mut vm, mut host, user) = setup();
        vm.request_hide(&mut host, user);
        let task = vm.reevaluation_task(user).unwrap();

        host.resubscribe(user);
        assert!(!host.player(user).unwrap().network_suppressed);
        assert!(vm.reevaluate(&mut host, user, task));
        assert!(host.player(user).unwrap().network_suppressed);
    }

    #[test]
    fn test_stale_reevaluate_is_cancelled_noop() {
        let (mut vm, mut host, user) = setup();
        vm.request_hide(&mut host, user);
        let task = vm.reevaluation_task(user).unwrap();
        vm.request_reappear(&mut host, user);

        assert!(!vm.reevaluate(&mut host, user, task));
        assert!(!host.player(user).unwrap().network_suppressed);
        assert!(!host.task_is_live(task));
    }

    #[test]
    fn test_disconnect_clamps_to_terrain() {
        let (mut vm, mut host, user) = setup();
        host.set_terrain_height(10.0);
        host.set_player_position(user, Position::new(5.0, 3.0, 5.0));
        vm.request_hide(&mut host, user);
        host.disconnect(user);

        assert_eq!(vm.reconcile_on_disconnect(&mut host, user), DisconnectOutcome::Persisted);
        let p = host.player(user).unwrap();
        assert_eq!(p.position.y, 10.0);
        assert!(p.offline_suppressed);
        // offline path leaves metabolism relaxed and tells untouched
        assert_eq!(p.metabolism.temperature.min, 20.0);
        assert_eq!(vm.state(user), VisibilityState::HiddenOffline);
        assert!(!vm.hooks().is_active());
    }

    #[test]
    fn test_disconnect_above_ground_not_moved() {
        let (mut vm, mut host, user) = setup();
        host.set_terrain_height(0.0);
        host.set_player_position(user, Position::new(1.0, 40.0, 1.0));
        vm.request_hide(&mut host, user);
        vm.reconcile_on_disconnect(&mut host, user);
        assert_eq!(host.player(user).unwrap().position.y, 40.0);
    }

    #[test]
    fn test_offline_force_reappear_releases_flag() {
        let (mut vm, mut host, user) = setup();
        vm.request_hide(&mut host, user);
        host.disconnect(user);
        vm.reconcile_on_disconnect(&mut host, user);

        assert_eq!(vm.request_reappear(&mut host, user), TransitionOutcome::Applied);
        assert!(!vm.persisted().contains(user));
        assert_eq!(vm.state(user), VisibilityState::Visible);

        // the sleeping body is fully restored, not just un-flagged
        let p = host.player(user).unwrap();
        assert!(!p.offline_suppressed);
        assert!(!p.network_suppressed);
        assert!(p.collision);
        assert!(p.position_sync);
        assert!(!p.tells_muted);
        assert!(p.flight_detection);
        assert!(!p.overlay);
        assert_eq!(p.metabolism, Metabolism::new(100.0, 250.0));
        assert!(vm.snapshots().is_empty());
    }

    #[test]
    fn test_vetoed_reconnect_releases_body() {
        let (mut vm, mut host, user) = setup();
        host.grant(user, Entitlement::Use);
        vm.request_hide(&mut host, user);
        host.disconnect(user);
        vm.reconcile_on_disconnect(&mut host, user);
        vm.add_guard(|_: UserId, t: Transition| {
            if t == Transition::Hide {
                Verdict::Deny
            } else {
                Verdict::Allow
            }
        });

        host.connect(user);
        assert_eq!(
            vm.reconcile_on_connect(&mut host, user),
            ConnectOutcome::Restored(TransitionOutcome::Vetoed)
        );
        assert_eq!(vm.state(user), VisibilityState::Visible);
        let p = host.player(user).unwrap();
        assert!(!p.offline_suppressed);
        assert!(p.collision);
        assert!(!p.tells_muted);
        assert_eq!(p.metabolism.temperature.min, -100.0);
        assert!(vm.snapshots().is_empty());
    }

    #[test]
    fn test_reconnect_reported_offline_keeps_flag() {
        let (mut vm, mut host, user) = setup();
        host.grant(user, Entitlement::Use);
        vm.request_hide(&mut host, user);
        host.disconnect(user);
        vm.reconcile_on_disconnect(&mut host, user);

        // connect event raced ahead of the host's session state
        assert_eq!(
            vm.reconcile_on_connect(&mut host, user),
            ConnectOutcome::Restored(TransitionOutcome::Offline)
        );
        assert_eq!(vm.state(user), VisibilityState::HiddenOffline);
        assert!(host.player(user).unwrap().offline_suppressed);
    }

    #[test]
    fn test_reevaluate_before_disconnect_event_keeps_task() {
        let (mut vm, mut host, user) = setup();
        vm.request_hide(&mut host, user);
        let task = vm.reevaluation_task(user).unwrap();

        host.disconnect(user);
        assert!(!vm.reevaluate(&mut host, user, task));
        assert!(host.task_is_live(task));
        assert_eq!(vm.reevaluation_task(user), Some(task));

        vm.reconcile_on_disconnect(&mut host, user);
        assert!(!host.task_is_live(task));
        assert_eq!(host.live_task_count(), 0);
    }

    #[test]
    fn test_public_effects() {
        let config = VanishConfig {
            public_effects: true,
            reappear_effect: None,
            ..VanishConfig::default()
        };
        let mut vm = VisibilityMachine::new(config);
        let mut host = SimHost::new();
        let user = UserId(8);
        host.add_player(user);

        vm.request_hide(&mut host, user);
        vm.request_reappear(&mut host, user);
        assert_eq!(host.effects().len(), 1, "reappear effect disabled");
        assert_eq!(host.effects()[0].2, EffectTarget::Public);
    }

    #[test]
    fn test_reappear_all_cancels_every_task() {
        let (mut vm, mut host, a) = setup();
        let b = UserId(101);
        host.add_player(b);
        vm.request_hide(&mut host, a);
        vm.request_hide(&mut host, b);

        assert_eq!(vm.reappear_all(&mut host), 2);
        assert_eq!(host.live_task_count(), 0);
        assert_eq!(vm.hidden_count(), 0);
        assert!(!vm.hooks().is_active());
        let m = &host.player(a).unwrap().metabolism;
        assert_eq!(*m, Metabolism::new(100.0, 250.0));
    }
}

/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! The lifecycle coordinator — the component the host talks to.
//!
//! [`Vanish`] pairs a [`VisibilityMachine`] with a [`HiddenSetStore`] and
//! routes host events into it:
//!
//! | Host event | Entry point |
//! |------------|-------------|
//! | component loaded | [`Vanish::on_start`] |
//! | component unloading / server stopping | [`Vanish::on_stop`] |
//! | player connected | [`Vanish::on_connect`] |
//! | player disconnecting | [`Vanish::on_disconnect`] |
//! | repeating timer fired | [`Vanish::on_reevaluate`] |
//! | toggle command | [`Vanish::toggle`] |
//!
//! Store failures never propagate: loads fail open, saves are logged.

use tracing::{info, warn};

use crate::config::VanishConfig;
use crate::guard::TransitionGuard;
use crate::host::{Host, MessageKey, TaskHandle};
use crate::identity::{Entitlement, UserId};
use crate::store::{load_or_empty, HiddenSetStore};
use crate::visibility::{
    ConnectOutcome, DisconnectOutcome, TransitionOutcome, VisibilityMachine, VisibilityState,
};

/// Result of a toggle command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The user is now hidden.
    Hidden,
    /// The user is visible again.
    Reappeared,
    /// Holds the always-hidden entitlement; cannot opt out.
    PermanentlyHidden,
    /// Lacks the entitlement to toggle.
    Denied,
    /// A guard vetoed the transition.
    Vetoed,
    /// The user is not connected.
    Offline,
}

/// Visibility component: state machine plus durable store.
///
/// Call [`on_stop`](Self::on_stop) before dropping; dropping alone leaves
/// hidden users' host effects and tasks in place (a `warn!` is logged).
#[derive(Debug)]
pub struct Vanish<S: HiddenSetStore> {
    machine: VisibilityMachine,
    store: S,
}

impl<S: HiddenSetStore> Vanish<S> {
    /// Component with nobody hidden. Call [`on_start`](Self::on_start) before
    /// routing any other event.
    pub fn new(config: VanishConfig, store: S) -> Self {
        Self {
            machine: VisibilityMachine::new(config),
            store,
        }
    }

    /// Install a transition guard.
    pub fn add_guard<G: TransitionGuard + 'static>(&mut self, guard: G) {
        self.machine.add_guard(guard);
    }

    /// The state machine, for queries and event filters.
    pub fn machine(&self) -> &VisibilityMachine {
        &self.machine
    }

    /// The durable store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give the store back, e.g. to hand it to the next process generation.
    pub fn into_store(self) -> S {
        self.store
    }

    // ── Lifecycle ──────────────────────────────────────────────────────────

    /// Startup reconciliation.
    ///
    /// Loads the persisted set, hides every online always-hidden user, then
    /// re-applies hiding to every persisted identity: online users are hidden,
    /// offline ones get the degraded suppression and keep their flag. An
    /// online user whose hide is vetoed is released and loses their flag.
    pub fn on_start<H: Host + ?Sized>(&mut self, host: &mut H) {
        let persisted = load_or_empty(&mut self.store);
        let flagged = persisted.sorted();
        self.machine.restore_persisted(persisted);

        for user in host.online_users() {
            if host.has_entitlement(user, Entitlement::Permanent)
                && self.machine.state(user) != VisibilityState::Hidden
            {
                self.machine.request_hide(host, user);
            }
        }
        let mut released = 0;
        for &user in &flagged {
            if !host.is_online(user) {
                self.machine.suppress_offline(host, user);
                continue;
            }
            match self.machine.request_hide(host, user) {
                TransitionOutcome::Applied | TransitionOutcome::Unchanged => {}
                outcome => {
                    info!(%user, ?outcome, "persisted user not re-hidden, released");
                    self.machine.release(host, user);
                    released += 1;
                }
            }
        }
        if released > 0 {
            self.save();
        }

        info!(
            persisted = self.machine.persisted().len(),
            hidden = self.machine.hidden_count(),
            "vanish started"
        );
    }

    /// Shutdown flush.
    ///
    /// Records every hidden user, saves the store, then reappears every online
    /// hidden user so the world is clean when the process exits. The saved
    /// record still lists them for the next startup.
    pub fn on_stop<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.machine.record_hidden();
        self.save();
        let restored = self.machine.reappear_all(host);
        info!(
            restored,
            persisted = self.machine.persisted().len(),
            "vanish stopped"
        );
    }

    fn save(&mut self) {
        if let Err(err) = self.store.save(self.machine.persisted()) {
            warn!(error = %err, "failed to save hidden set");
        }
    }

    // ── Host events ────────────────────────────────────────────────────────

    /// A user connected.
    pub fn on_connect<H: Host + ?Sized>(&mut self, host: &mut H, user: UserId) -> ConnectOutcome {
        self.machine.reconcile_on_connect(host, user)
    }

    /// A user is disconnecting. Saves the store when the user stays hidden.
    pub fn on_disconnect<H: Host + ?Sized>(&mut self, host: &mut H, user: UserId) -> DisconnectOutcome {
        let outcome = self.machine.reconcile_on_disconnect(host, user);
        if outcome == DisconnectOutcome::Persisted {
            self.save();
        }
        outcome
    }

    /// A re-evaluation timer fired.
    pub fn on_reevaluate<H: Host + ?Sized>(&mut self, host: &mut H, user: UserId, task: TaskHandle) -> bool {
        self.machine.reevaluate(host, user, task)
    }

    // ── Commands & queries ─────────────────────────────────────────────────

    /// Toggle command issued by `user`.
    pub fn toggle<H: Host + ?Sized>(&mut self, host: &mut H, user: UserId) -> ToggleOutcome {
        if host.has_entitlement(user, Entitlement::Permanent) {
            host.notify(user, MessageKey::PermanentVanish, &[]);
            return ToggleOutcome::PermanentlyHidden;
        }
        if !host.has_entitlement(user, Entitlement::Use) {
            host.notify(user, MessageKey::NoPermission, &[Entitlement::Use.permission()]);
            return ToggleOutcome::Denied;
        }
        let reappearing = self.machine.state(user) == VisibilityState::Hidden;
        let outcome = if reappearing {
            self.machine.request_reappear(host, user)
        } else {
            self.machine.request_hide(host, user)
        };
        match outcome {
            TransitionOutcome::Applied | TransitionOutcome::Unchanged if reappearing => {
                ToggleOutcome::Reappeared
            }
            TransitionOutcome::Applied | TransitionOutcome::Unchanged => ToggleOutcome::Hidden,
            TransitionOutcome::Vetoed => ToggleOutcome::Vetoed,
            TransitionOutcome::Offline => ToggleOutcome::Offline,
        }
    }

    /// Hide `user` without a permission check.
    pub fn force_hide<H: Host + ?Sized>(&mut self, host: &mut H, user: UserId) -> TransitionOutcome {
        self.machine.request_hide(host, user)
    }

    /// Reappear `user` without a permission check. Works for offline hidden
    /// users too; the store is saved when their flag is dropped.
    pub fn force_reappear<H: Host + ?Sized>(&mut self, host: &mut H, user: UserId) -> TransitionOutcome {
        let was_flagged = self.machine.persisted().contains(user);
        let outcome = self.machine.request_reappear(host, user);
        if was_flagged && !self.machine.persisted().contains(user) {
            self.save();
        }
        outcome
    }

    /// `true` if `user` is hidden, online or offline.
    pub fn is_hidden(&self, user: UserId) -> bool {
        self.machine.is_hidden(user)
    }

    /// Current state of `user`.
    pub fn state(&self, user: UserId) -> VisibilityState {
        self.machine.state(user)
    }
}

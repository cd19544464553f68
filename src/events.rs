//! Filters for the optional hooks gated by [`HookController`].
//!
//! Each filter answers only while its hook is subscribed. When the hook set is
//! inactive the host should not be dispatching these events at all; if it
//! does, the filter returns the neutral answer.
//!
//! [`HookController`]: crate::hooks::HookController

use crate::hooks::HookKind;
use crate::identity::UserId;
use crate::visibility::VisibilityMachine;

/// Answer to a vetoable host event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookOutcome {
    /// Let the host's default behaviour run.
    Continue,
    /// Suppress the default behaviour.
    Suppress,
}

/// Answer to a lock-access check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockAccess {
    /// The lock decides.
    Default,
    /// Open regardless of code or key.
    Allow,
}

impl VisibilityMachine {
    /// Damage about to be applied from `attacker` to `victim` (either may be
    /// a non-player entity).
    pub fn filter_damage(&self, attacker: Option<UserId>, victim: Option<UserId>) -> HookOutcome {
        if !self.hooks().is_hook_active(HookKind::EntityTakeDamage) {
            return HookOutcome::Continue;
        }
        let config = self.config();
        if config.invulnerable && victim.is_some_and(|v| self.is_hidden(v)) {
            return HookOutcome::Suppress;
        }
        if !config.can_hurt_others && attacker.is_some_and(|a| self.is_hidden(a)) {
            return HookOutcome::Suppress;
        }
        HookOutcome::Continue
    }

    /// A player trying a code or key lock.
    pub fn filter_lock_access(&self, user: UserId) -> LockAccess {
        if self.hooks().is_hook_active(HookKind::CanUseLockedEntity)
            && self.config().bypass_locks
            && self.is_hidden(user)
        {
            LockAccess::Allow
        } else {
            LockAccess::Default
        }
    }

    /// Turret, NPC or helicopter target acquisition of `user`.
    ///
    /// `hook` must be one of the targeting hooks; any other kind continues.
    pub fn filter_targeting(&self, hook: HookKind, user: UserId) -> HookOutcome {
        let targeting = matches!(
            hook,
            HookKind::CanBeTargeted | HookKind::OnNpcTarget | HookKind::CanHelicopterTarget
        );
        if targeting
            && self.hooks().is_hook_active(hook)
            && self.config().block_targeting
            && self.is_hidden(user)
        {
            HookOutcome::Suppress
        } else {
            HookOutcome::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VanishConfig;
    use crate::sim::SimHost;

    fn hidden_pair(config: VanishConfig) -> (VisibilityMachine, UserId, UserId) {
        let mut host = SimHost::new();
        let ghost = UserId(1);
        let other = UserId(2);
        host.add_player(ghost);
        host.add_player(other);
        let mut vm = VisibilityMachine::new(config);
        vm.request_hide(&mut host, ghost);
        (vm, ghost, other)
    }

    #[test]
    fn test_inactive_hooks_continue() {
        let vm = VisibilityMachine::new(VanishConfig::default());
        assert_eq!(vm.filter_damage(None, Some(UserId(1))), HookOutcome::Continue);
        assert_eq!(vm.filter_lock_access(UserId(1)), LockAccess::Default);
    }

    #[test]
    fn test_hidden_victim_invulnerable() {
        let (vm, ghost, other) = hidden_pair(VanishConfig::default());
        assert_eq!(vm.filter_damage(Some(other), Some(ghost)), HookOutcome::Suppress);
        assert_eq!(vm.filter_damage(Some(ghost), Some(other)), HookOutcome::Continue);
        assert_eq!(vm.filter_damage(None, Some(other)), HookOutcome::Continue);
    }

    #[test]
    fn test_hidden_attacker_blocked_when_configured() {
        let config = VanishConfig {
            can_hurt_others: false,
            ..VanishConfig::default()
        };
        let (vm, ghost, other) = hidden_pair(config);
        assert_eq!(vm.filter_damage(Some(ghost), Some(other)), HookOutcome::Suppress);
    }

    #[test]
    fn test_disabled_damage_hook_never_filters() {
        let config = VanishConfig {
            disabled_hooks: vec![HookKind::EntityTakeDamage],
            ..VanishConfig::default()
        };
        let (vm, ghost, other) = hidden_pair(config);
        assert_eq!(vm.filter_damage(Some(other), Some(ghost)), HookOutcome::Continue);
    }

    #[test]
    fn test_lock_bypass() {
        let (vm, ghost, other) = hidden_pair(VanishConfig::default());
        assert_eq!(vm.filter_lock_access(ghost), LockAccess::Allow);
        assert_eq!(vm.filter_lock_access(other), LockAccess::Default);
    }

    #[test]
    fn test_targeting() {
        let (vm, ghost, other) = hidden_pair(VanishConfig::default());
        assert_eq!(vm.filter_targeting(HookKind::CanBeTargeted, ghost), HookOutcome::Suppress);
        assert_eq!(vm.filter_targeting(HookKind::OnNpcTarget, other), HookOutcome::Continue);
        assert_eq!(
            vm.filter_targeting(HookKind::EntityTakeDamage, ghost),
            HookOutcome::Continue
        );
    }
}

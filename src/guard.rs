//! Transition guards — external veto over hide and reappear.
//!
//! A guard is consulted before the first side effect of a transition. A
//! [`Verdict::Deny`] turns the request into a no-op; nothing in the world
//! model is touched. Guards compose through [`GuardChain`], where the first
//! denial wins.
//!
//! Any `FnMut(UserId, Transition) -> Verdict` is a guard:
//!
//! ```rust
//! use vanish_core::guard::{GuardChain, Transition, Verdict};
//! use vanish_core::identity::UserId;
//!
//! let mut chain = GuardChain::new();
//! chain.push(|user: UserId, t: Transition| {
//!     if user == UserId(13) && t == Transition::Hide { Verdict::Deny } else { Verdict::Allow }
//! });
//! assert_eq!(chain.evaluate(UserId(13), Transition::Hide), Verdict::Deny);
//! assert_eq!(chain.evaluate(UserId(13), Transition::Reappear), Verdict::Allow);
//! ```

use crate::identity::UserId;

/// Which transition is being requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Visible → Hidden.
    Hide,
    /// Hidden → Visible.
    Reappear,
}

/// Guard decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Let the transition run.
    Allow,
    /// Veto the transition before any side effect.
    Deny,
}

/// An external collaborator that may veto a transition.
pub trait TransitionGuard {
    /// Decide whether `user` may make `transition`.
    fn evaluate(&mut self, user: UserId, transition: Transition) -> Verdict;
}

impl<F> TransitionGuard for F
where
    F: FnMut(UserId, Transition) -> Verdict,
{
    fn evaluate(&mut self, user: UserId, transition: Transition) -> Verdict {
        self(user, transition)
    }
}

/// Ordered set of guards; the first [`Verdict::Deny`] short-circuits.
#[derive(Default)]
pub struct GuardChain {
    guards: Vec<Box<dyn TransitionGuard>>,
}

impl GuardChain {
    /// Chain with no guards (everything allowed).
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a guard.
    pub fn push<G: TransitionGuard + 'static>(&mut self, guard: G) {
        self.guards.push(Box::new(guard));
    }

    /// Number of guards.
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// `true` if no guard is installed.
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Evaluate guards in insertion order.
    pub fn evaluate(&mut self, user: UserId, transition: Transition) -> Verdict {
        for guard in self.guards.iter_mut() {
            if guard.evaluate(user, transition) == Verdict::Deny {
                return Verdict::Deny;
            }
        }
        Verdict::Allow
    }
}

impl core::fmt::Debug for GuardChain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GuardChain")
            .field("guards", &self.guards.len())
            .finish()
    }
}

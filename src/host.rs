//! The host boundary — everything this crate consumes from the game server.
//!
//! The world model (players, colliders, network groups), the timer facility,
//! the permission system and the presentation layer all live on the other
//! side of [`Host`]. Every call is a synchronous in-process primitive that is
//! assumed to succeed; none of them return errors.
//!
//! [`crate::sim::SimHost`] is an in-memory reference implementation.

use core::time::Duration;

use crate::hooks::HookKind;
use crate::identity::{Entitlement, UserId};
use crate::metabolism::Metabolism;

/// World-space position.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Position {
    /// East.
    pub x: f32,
    /// Up.
    pub y: f32,
    /// North.
    pub z: f32,
}

impl Position {
    /// Construct a position.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Handle of a repeating task scheduled through [`Host::schedule_repeating`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(pub u64);

/// Audience of an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectTarget {
    /// Only this user sees and hears it.
    User(UserId),
    /// Everyone nearby.
    Public,
}

/// Localized notice keys sent through [`Host::notify`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// "You are now hidden."
    Vanished,
    /// "You are visible again."
    Reappeared,
    /// "You do not have permission to do that."
    NoPermission,
    /// "You are permanently hidden and cannot reappear."
    PermanentVanish,
}

/// Narrow interface onto the game server.
///
/// Implementations must tolerate calls for users that are offline where the
/// call is documented as offline-capable ([`suppress_offline_presence`],
/// [`restore_network_presence`], [`position`], [`set_position`]).
///
/// [`suppress_offline_presence`]: Host::suppress_offline_presence
/// [`restore_network_presence`]: Host::restore_network_presence
/// [`position`]: Host::position
/// [`set_position`]: Host::set_position
pub trait Host {
    // ── Presence & permissions ─────────────────────────────────────────────

    /// `true` if `user` currently has a live connection.
    fn is_online(&self, user: UserId) -> bool;

    /// Every user with a live connection.
    fn online_users(&self) -> Vec<UserId>;

    /// Permission predicate.
    fn has_entitlement(&self, user: UserId, entitlement: Entitlement) -> bool;

    // ── Network & physics ──────────────────────────────────────────────────

    /// Remove `user` from every other connection's subscriber set.
    fn suppress_network_presence(&mut self, user: UserId);

    /// Undo [`suppress_network_presence`](Host::suppress_network_presence) and
    /// [`suppress_offline_presence`](Host::suppress_offline_presence).
    fn restore_network_presence(&mut self, user: UserId);

    /// Put a disconnected player's body into a network group nobody
    /// subscribes to. No connection exists, so nothing re-subscribes it.
    fn suppress_offline_presence(&mut self, user: UserId);

    /// Toggle solid-collision response.
    fn set_collision_enabled(&mut self, user: UserId, enabled: bool);

    /// Toggle movement-position broadcast.
    fn set_position_sync_enabled(&mut self, user: UserId, enabled: bool);

    /// Mute (or restore to default) the fall and drown cues other players hear.
    fn set_tells_muted(&mut self, user: UserId, muted: bool);

    // ── Metabolism & anti-cheat ────────────────────────────────────────────

    /// Current metabolism, `None` if the player has no live body.
    fn metabolism(&self, user: UserId) -> Option<Metabolism>;

    /// Write metabolism back.
    fn set_metabolism(&mut self, user: UserId, metabolism: &Metabolism);

    /// Arm or suspend the anti-cheat flight-speed detector.
    fn set_flight_detection(&mut self, user: UserId, enabled: bool);

    // ── Position ───────────────────────────────────────────────────────────

    /// Body position (online or sleeping).
    fn position(&self, user: UserId) -> Option<Position>;

    /// Terrain height under `at`.
    fn terrain_height(&self, at: Position) -> f32;

    /// Teleport the body.
    fn set_position(&mut self, user: UserId, at: Position);

    // ── Presentation ───────────────────────────────────────────────────────

    /// Play an effect prefab at `at`.
    fn play_effect(&mut self, effect: &str, at: Position, target: EffectTarget);

    /// Remove the on-screen "hidden" overlay.
    fn remove_overlay(&mut self, user: UserId);

    /// Send a localized notice.
    fn notify(&mut self, user: UserId, key: MessageKey, args: &[&str]);

    // ── Scheduling & dispatch ──────────────────────────────────────────────

    /// Schedule a repeating re-evaluation for `user`. The host calls back into
    /// [`Vanish::on_reevaluate`](crate::lifecycle::Vanish::on_reevaluate) with
    /// the returned handle every `interval`.
    fn schedule_repeating(&mut self, interval: Duration, user: UserId) -> TaskHandle;

    /// Cancel a scheduled task. Cancelling an unknown handle is a no-op.
    fn cancel(&mut self, task: TaskHandle);

    /// Start dispatching `hook` to this component.
    fn subscribe(&mut self, hook: HookKind);

    /// Stop dispatching `hook`.
    fn unsubscribe(&mut self, hook: HookKind);
}

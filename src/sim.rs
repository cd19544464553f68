//! In-memory reference host.
//!
//! [`SimHost`] implements [`Host`] over a plain table of players and records
//! every mutation so the effect of a transition can be asserted directly. It
//! is the host used by this crate's own tests and a working template for a
//! real game-server binding: each method is the one-line world-model change
//! the real host performs.
//!
//! ```rust
//! use vanish_core::config::VanishConfig;
//! use vanish_core::identity::{Entitlement, UserId};
//! use vanish_core::lifecycle::{ToggleOutcome, Vanish};
//! use vanish_core::sim::SimHost;
//! use vanish_core::store::MemoryStore;
//!
//! let mut host = SimHost::new();
//! let admin = UserId(76_561_198_000_000_001);
//! host.add_player(admin);
//! host.grant(admin, Entitlement::Use);
//!
//! let mut vanish = Vanish::new(VanishConfig::default(), MemoryStore::new());
//! vanish.on_start(&mut host);
//! assert_eq!(vanish.toggle(&mut host, admin), ToggleOutcome::Hidden);
//! assert!(host.player(admin).unwrap().network_suppressed);
//! ```

use core::time::Duration;

use hashbrown::{HashMap, HashSet};

use crate::hooks::HookKind;
use crate::host::{EffectTarget, Host, MessageKey, Position, TaskHandle};
use crate::identity::{Entitlement, UserId};
use crate::metabolism::Metabolism;

/// Health of a freshly added player.
pub const SPAWN_HEALTH: f32 = 100.0;
/// Hydration of a freshly added player.
pub const SPAWN_HYDRATION: f32 = 250.0;

/// World-model state of one simulated player.
#[derive(Clone, Debug, PartialEq)]
pub struct SimPlayer {
    /// Has a live connection.
    pub online: bool,
    /// Granted entitlements.
    pub entitlements: HashSet<Entitlement>,
    /// Removed from other connections' subscriber sets.
    pub network_suppressed: bool,
    /// Body parked in the unsubscribed offline group.
    pub offline_suppressed: bool,
    /// Solid-collision response.
    pub collision: bool,
    /// Movement-position broadcast.
    pub position_sync: bool,
    /// Fall/drown cues muted.
    pub tells_muted: bool,
    /// Anti-cheat flight detector armed.
    pub flight_detection: bool,
    /// Vital values.
    pub metabolism: Metabolism,
    /// Body position.
    pub position: Position,
    /// "Hidden" overlay on screen.
    pub overlay: bool,
}

impl SimPlayer {
    fn spawn() -> Self {
        Self {
            online: true,
            entitlements: HashSet::new(),
            network_suppressed: false,
            offline_suppressed: false,
            collision: true,
            position_sync: true,
            tells_muted: false,
            flight_detection: true,
            metabolism: Metabolism::new(SPAWN_HEALTH, SPAWN_HYDRATION),
            position: Position::default(),
            overlay: false,
        }
    }
}

/// Recording in-memory [`Host`].
#[derive(Clone, Debug, Default)]
pub struct SimHost {
    players: HashMap<UserId, SimPlayer>,
    terrain_height: f32,
    tasks: HashMap<TaskHandle, (UserId, Duration)>,
    next_task: u64,
    subscribed: Vec<HookKind>,
    subscribe_calls: usize,
    unsubscribe_calls: usize,
    effects: Vec<(String, Position, EffectTarget)>,
    notices: Vec<(UserId, MessageKey)>,
}

impl SimHost {
    /// Empty world with flat terrain at height 0.
    pub fn new() -> Self {
        Self::default()
    }

    // ── World setup ────────────────────────────────────────────────────────

    /// Spawn an online player with default vitals at the origin.
    pub fn add_player(&mut self, user: UserId) {
        self.players.insert(user, SimPlayer::spawn());
    }

    /// Reconnect an existing player (spawning one if unknown).
    pub fn connect(&mut self, user: UserId) {
        self.players.entry(user).or_insert_with(SimPlayer::spawn).online = true;
    }

    /// Drop a player's connection; the body stays in the world.
    pub fn disconnect(&mut self, user: UserId) {
        if let Some(p) = self.players.get_mut(&user) {
            p.online = false;
        }
    }

    /// Grant an entitlement.
    pub fn grant(&mut self, user: UserId, entitlement: Entitlement) {
        if let Some(p) = self.players.get_mut(&user) {
            p.entitlements.insert(entitlement);
        }
    }

    /// Revoke an entitlement.
    pub fn revoke(&mut self, user: UserId, entitlement: Entitlement) {
        if let Some(p) = self.players.get_mut(&user) {
            p.entitlements.remove(&entitlement);
        }
    }

    /// Overwrite health and hydration.
    pub fn set_vitals(&mut self, user: UserId, health: f32, hydration: f32) {
        if let Some(p) = self.players.get_mut(&user) {
            p.metabolism.health = health;
            p.metabolism.hydration = hydration;
        }
    }

    /// Move a body.
    pub fn set_player_position(&mut self, user: UserId, at: Position) {
        if let Some(p) = self.players.get_mut(&user) {
            p.position = at;
        }
    }

    /// Flatten the terrain to `height` everywhere.
    pub fn set_terrain_height(&mut self, height: f32) {
        self.terrain_height = height;
    }

    /// Simulate the host's own systems re-subscribing a player.
    pub fn resubscribe(&mut self, user: UserId) {
        if let Some(p) = self.players.get_mut(&user) {
            p.network_suppressed = false;
        }
    }

    // ── Inspection ─────────────────────────────────────────────────────────

    /// State of a player.
    pub fn player(&self, user: UserId) -> Option<&SimPlayer> {
        self.players.get(&user)
    }

    /// `true` if `task` is scheduled and not cancelled.
    pub fn task_is_live(&self, task: TaskHandle) -> bool {
        self.tasks.contains_key(&task)
    }

    /// Number of scheduled tasks.
    pub fn live_task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Every live task with its owner, in scheduling order: what a timer tick
    /// would fire.
    pub fn due_tasks(&self) -> Vec<(TaskHandle, UserId)> {
        let mut due: Vec<(TaskHandle, UserId)> =
            self.tasks.iter().map(|(&t, &(u, _))| (t, u)).collect();
        due.sort_by_key(|(t, _)| t.0);
        due
    }

    /// Hooks currently subscribed.
    pub fn subscribed_hooks(&self) -> &[HookKind] {
        &self.subscribed
    }

    /// `true` if `hook` is subscribed.
    pub fn is_subscribed(&self, hook: HookKind) -> bool {
        self.subscribed.contains(&hook)
    }

    /// Total subscribe calls received.
    pub fn subscribe_calls(&self) -> usize {
        self.subscribe_calls
    }

    /// Total unsubscribe calls received.
    pub fn unsubscribe_calls(&self) -> usize {
        self.unsubscribe_calls
    }

    /// Effects played, in order.
    pub fn effects(&self) -> &[(String, Position, EffectTarget)] {
        &self.effects
    }

    /// Most recent notice sent to `user`.
    pub fn last_notice(&self, user: UserId) -> Option<MessageKey> {
        self.notices
            .iter()
            .rev()
            .find(|(u, _)| *u == user)
            .map(|&(_, key)| key)
    }

    /// Number of notices sent to `user`.
    pub fn notice_count(&self, user: UserId) -> usize {
        self.notices.iter().filter(|(u, _)| *u == user).count()
    }
}

impl Host for SimHost {
    fn is_online(&self, user: UserId) -> bool {
        self.players.get(&user).is_some_and(|p| p.online)
    }

    fn online_users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self
            .players
            .iter()
            .filter(|(_, p)| p.online)
            .map(|(&u, _)| u)
            .collect();
        users.sort_unstable();
        users
    }

    fn has_entitlement(&self, user: UserId, entitlement: Entitlement) -> bool {
        self.players
            .get(&user)
            .is_some_and(|p| p.entitlements.contains(&entitlement))
    }

    fn suppress_network_presence(&mut self, user: UserId) {
        if let Some(p) = self.players.get_mut(&user) {
            p.network_suppressed = true;
        }
    }

    fn restore_network_presence(&mut self, user: UserId) {
        if let Some(p) = self.players.get_mut(&user) {
            p.network_suppressed = false;
            p.offline_suppressed = false;
        }
    }

    fn suppress_offline_presence(&mut self, user: UserId) {
        if let Some(p) = self.players.get_mut(&user) {
            p.offline_suppressed = true;
        }
    }

    fn set_collision_enabled(&mut self, user: UserId, enabled: bool) {
        if let Some(p) = self.players.get_mut(&user) {
            p.collision = enabled;
        }
    }

    fn set_position_sync_enabled(&mut self, user: UserId, enabled: bool) {
        if let Some(p) = self.players.get_mut(&user) {
            p.position_sync = enabled;
        }
    }

    fn set_tells_muted(&mut self, user: UserId, muted: bool) {
        if let Some(p) = self.players.get_mut(&user) {
            p.tells_muted = muted;
        }
    }

    fn metabolism(&self, user: UserId) -> Option<Metabolism> {
        self.players.get(&user).map(|p| p.metabolism.clone())
    }

    fn set_metabolism(&mut self, user: UserId, metabolism: &Metabolism) {
        if let Some(p) = self.players.get_mut(&user) {
            p.metabolism = metabolism.clone();
        }
    }

    fn set_flight_detection(&mut self, user: UserId, enabled: bool) {
        if let Some(p) = self.players.get_mut(&user) {
            p.flight_detection = enabled;
        }
    }

    fn position(&self, user: UserId) -> Option<Position> {
        self.players.get(&user).map(|p| p.position)
    }

    fn terrain_height(&self, _at: Position) -> f32 {
        self.terrain_height
    }

    fn set_position(&mut self, user: UserId, at: Position) {
        self.set_player_position(user, at);
    }

    fn play_effect(&mut self, effect: &str, at: Position, target: EffectTarget) {
        self.effects.push((effect.to_owned(), at, target));
    }

    fn remove_overlay(&mut self, user: UserId) {
        if let Some(p) = self.players.get_mut(&user) {
            p.overlay = false;
        }
    }

    fn notify(&mut self, user: UserId, key: MessageKey, _args: &[&str]) {
        // the presentation layer draws the overlay when told the user vanished
        if key == MessageKey::Vanished {
            if let Some(p) = self.players.get_mut(&user) {
                p.overlay = true;
            }
        }
        self.notices.push((user, key));
    }

    fn schedule_repeating(&mut self, interval: Duration, user: UserId) -> TaskHandle {
        self.next_task += 1;
        let handle = TaskHandle(self.next_task);
        self.tasks.insert(handle, (user, interval));
        handle
    }

    fn cancel(&mut self, task: TaskHandle) {
        self.tasks.remove(&task);
    }

    fn subscribe(&mut self, hook: HookKind) {
        self.subscribe_calls += 1;
        if !self.subscribed.contains(&hook) {
            self.subscribed.push(hook);
        }
    }

    fn unsubscribe(&mut self, hook: HookKind) {
        self.unsubscribe_calls += 1;
        self.subscribed.retain(|&h| h != hook);
    }
}

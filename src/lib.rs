//! # vanish-core
//!
//! Reversible player visibility for game servers.
//!
//! ---
//!
//! ## What "hidden" means
//!
//! A hidden player is still in the world: their body simulates, they can move
//! and interact. What changes is what *other* players receive. Their client is
//! never told the hidden body exists nearby, it does not collide, its movement
//! is not broadcast, and its fall and drown sounds are muted.
//!
//! Hiding is a bundle of independent mutations of host state. Each one has to
//! be undone exactly when the player reappears, across disconnects and process
//! restarts, without leaving a half-hidden player behind.
//!
//! **Per-user state machine** — `Visible`, `Hidden`, `HiddenOffline`. Every
//! side effect flows through [`VisibilityMachine`] transitions. Guards veto
//! before the first side effect; after it a transition always completes.
//!
//! **Persisted hidden set** — who was hidden at the last shutdown or
//! disconnect. Loaded once, saved wholesale, fails open.
//!
//! **Reference-counted hooks** — damage and lock hooks fire server-wide. They
//! are subscribed only while someone is hidden.
//!
//! ---
//!
//! ## The pipeline
//!
//! ```text
//! host events ─▶ Vanish (lifecycle) ─▶ VisibilityMachine ─▶ Host (world model)
//!                      │                  │        │
//!               HiddenSetStore      SnapshotCache  HookController
//!                (load / save)     (health, water)  (0→1 / 1→0)
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`identity`] | [`UserId`], [`Entitlement`] | Stable identity and permission names |
//! | [`host`] | [`Host`] | The world-model boundary consumed from the game server |
//! | [`guard`] | [`TransitionGuard`], [`GuardChain`] | Composable external vetoes |
//! | [`config`] | [`VanishConfig`] | Operator options with per-field defaults |
//! | [`metabolism`] | [`Metabolism`], [`SnapshotCache`] | Vital values and write-once snapshots |
//! | [`hooks`] | [`HookController`], [`HookKind`] | Reference-counted hook activation |
//! | [`store`] | [`PersistedHiddenSet`], [`HiddenSetStore`] | Durable hidden set, memory and JSON-file stores |
//! | [`visibility`] | [`VisibilityMachine`], [`VisibilityState`] | The state machine and its side effects |
//! | [`events`] | [`events::HookOutcome`] | Damage, lock and targeting filters |
//! | [`lifecycle`] | [`Vanish`] | Startup, shutdown, connect, disconnect, toggle |
//! | [`sim`] | [`sim::SimHost`] | In-memory reference host |
//!
//! ## Threading
//!
//! Everything runs on the host's event-dispatch thread. No type here is
//! shared across threads and nothing blocks; the only I/O is the store's
//! whole-file read at startup and write at shutdown / offline-hide.
//!
//! ## Features
//!
//! `serde` (default) adds serde derives, [`VanishConfig::from_json_str`] and
//! [`store::JsonFileStore`].
//!
//! ## License
//!
//! Business Source License 1.1.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod identity;
pub mod host;
pub mod guard;
pub mod config;
pub mod metabolism;
pub mod hooks;
pub mod store;
pub mod visibility;
pub mod events;
pub mod lifecycle;
pub mod sim;

pub use config::VanishConfig;
pub use guard::{GuardChain, Transition, TransitionGuard, Verdict};
pub use hooks::{HookController, HookKind};
pub use host::Host;
pub use identity::{Entitlement, UserId};
pub use lifecycle::Vanish;
pub use metabolism::{Metabolism, SnapshotCache};
pub use store::{HiddenSetStore, PersistedHiddenSet};
pub use visibility::{VisibilityMachine, VisibilityState};

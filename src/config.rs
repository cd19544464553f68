//! Operator configuration.
//!
//! Every field has a default, so an empty (or partial) JSON object is a valid
//! configuration. Loading the document off disk is the host's configuration
//! loader's job; [`VanishConfig::from_json_str`] parses what it hands over.

use core::time::Duration;

use crate::hooks::HookKind;

/// Default prefab for the vanish and reappear effects.
pub const DEFAULT_EFFECT: &str = "assets/prefabs/npc/patrol helicopter/effects/rocket_fire.prefab";

/// Visibility configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VanishConfig {
    /// Keep a hidden user hidden through a disconnect (and persist them).
    pub hide_on_disconnect: bool,
    /// Mute fall/drown cues while hidden.
    pub mute_tells: bool,
    /// Snapshot vitals and pin metabolism extremes while hidden.
    pub relax_metabolism: bool,
    /// Suspend anti-cheat flight detection while hidden.
    pub suspend_anti_hack: bool,
    /// Effect played on hide. `None` disables it.
    pub vanish_effect: Option<String>,
    /// Effect played on reappear. `None` disables it.
    pub reappear_effect: Option<String>,
    /// Play effects to everyone nearby instead of only to the user.
    pub public_effects: bool,
    /// Period of the network-suppression re-evaluation task.
    pub reevaluate_interval_ms: u64,
    /// Hooks that never activate, even while someone is hidden.
    pub disabled_hooks: Vec<HookKind>,
    /// Hidden users take no damage.
    pub invulnerable: bool,
    /// Hidden users may damage others.
    pub can_hurt_others: bool,
    /// Hidden users open locks without the code.
    pub bypass_locks: bool,
    /// Turrets, NPCs and the helicopter ignore hidden users.
    pub block_targeting: bool,
}

impl VanishConfig {
    /// Re-evaluation period as a [`Duration`].
    pub fn reevaluate_interval(&self) -> Duration {
        Duration::from_millis(self.reevaluate_interval_ms)
    }

    /// Parse a JSON document; missing fields take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Parse)
    }
}

impl Default for VanishConfig {
    fn default() -> Self {
        Self {
            hide_on_disconnect: true,
            mute_tells: true,
            relax_metabolism: true,
            suspend_anti_hack: true,
            vanish_effect: Some(DEFAULT_EFFECT.to_owned()),
            reappear_effect: Some(DEFAULT_EFFECT.to_owned()),
            public_effects: false,
            reevaluate_interval_ms: 500,
            disabled_hooks: Vec::new(),
            invulnerable: true,
            can_hurt_others: true,
            bypass_locks: true,
            block_targeting: true,
        }
    }
}

/// Configuration errors.
#[cfg(feature = "serde")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid JSON or has a field of the wrong type.
    #[error("invalid vanish configuration: {0}")]
    Parse(#[source] serde_json::Error),
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config = VanishConfig::from_json_str("{}").unwrap();
        assert_eq!(config, VanishConfig::default());
        assert_eq!(config.reevaluate_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_override() {
        let config = VanishConfig::from_json_str(
            r#"{
                "hide_on_disconnect": false,
                "vanish_effect": null,
                "disabled_hooks": ["EntityTakeDamage", "OnNpcTarget"]
            }"#,
        )
        .unwrap();
        assert!(!config.hide_on_disconnect);
        assert!(config.vanish_effect.is_none());
        assert_eq!(config.reappear_effect.as_deref(), Some(DEFAULT_EFFECT));
        assert_eq!(
            config.disabled_hooks,
            vec![HookKind::EntityTakeDamage, HookKind::OnNpcTarget]
        );
        assert!(config.mute_tells);
    }

    #[test]
    fn test_wrong_type_is_error() {
        let err = VanishConfig::from_json_str(r#"{"mute_tells": "yes"}"#).unwrap_err();
        assert!(err.to_string().starts_with("invalid vanish configuration"));
    }
}

//! Configuration of a [`Scene`](crate::Scene)

use crate::{error::ConfigError, flags::MaterialOverrideOptions};
use serde::Deserialize;

/// Decides what happens when the core calls a hook the host doesn't implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPolicy {
    /// Missing hooks panic. Meant for catching incomplete host integrations during development.
    Strict,
    /// Missing hooks are logged and degrade to a typed default (`false`, empty, [`None`], `-1`).
    Lenient,
}

impl Default for HookPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Strict
        } else {
            Self::Lenient
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub hook_policy: HookPolicy,
    /// Override flags every new group/layer wrapper starts with.
    #[serde(with = "flag_bits")]
    pub default_override_flags: MaterialOverrideOptions,
}

impl SceneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from TOML. Missing keys take their default values.
    ///
    /// ```
    /// # use cross3d::{HookPolicy, SceneConfig};
    /// let config = SceneConfig::from_toml_str("hook_policy = \"lenient\"").unwrap();
    /// assert_eq!(config.hook_policy, HookPolicy::Lenient);
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn hook_policy(mut self, policy: HookPolicy) -> Self {
        self.hook_policy = policy;
        self
    }

    pub fn default_override_flags(mut self, flags: MaterialOverrideOptions) -> Self {
        self.default_override_flags = flags;
        self
    }
}

mod flag_bits {
    use crate::flags::MaterialOverrideOptions;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(d: D) -> Result<MaterialOverrideOptions, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(MaterialOverrideOptions::from_bits_truncate(u32::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn parse_full_config() {
        let config = SceneConfig::from_toml_str(
            r#"
            hook_policy = "strict"
            default_override_flags = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.hook_policy, HookPolicy::Strict);
        assert_eq!(
            config.default_override_flags,
            MaterialOverrideOptions::KEEP_OPACITY | MaterialOverrideOptions::KEEP_DISPLACEMENT
        );
    }

    #[test]
    pub fn reject_unknown_policy() {
        assert!(SceneConfig::from_toml_str("hook_policy = \"whatever\"").is_err());
    }
}

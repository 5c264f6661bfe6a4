//! Error types of cross3d

use thiserror::Error;

/// Failure reported by a host hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// The host doesn't provide this hook at all.
    #[error("host hook `{0}` is not implemented")]
    NotImplemented(&'static str),

    /// The host provides the hook, but it failed.
    #[error("host hook `{hook}` failed: {reason}")]
    Failed { hook: &'static str, reason: String },
}

impl HookError {
    pub fn failed(hook: &'static str, reason: impl ToString) -> Self {
        Self::Failed {
            hook,
            reason: reason.to_string(),
        }
    }

    /// Name of the hook that produced this error.
    pub fn hook(&self) -> &'static str {
        match self {
            Self::NotImplemented(hook) => hook,
            Self::Failed { hook, .. } => hook,
        }
    }
}

pub type HookResult<T = ()> = Result<T, HookError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid scene configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("couldn't parse state document: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("couldn't serialize state document: {0}")]
    Serialize(#[from] toml::ser::Error),
}

use crate::AnyResult;
use anyhow::anyhow;
use std::{error::Error, fmt::Display};

/// Turns failures (errors, missing values, unsuccessful operations) into [`anyhow::Error`]s
/// carrying a human readable message.
///
/// ## Example
/// ```
/// # use cross3d_utils::AnyhowResultExt;
/// let missing: Option<u32> = None;
/// let err = missing.otherwise("layer `Hero` not found").unwrap_err();
/// assert_eq!(err.to_string(), "layer `Hero` not found");
///
/// let hidden = false;
/// assert!(hidden.otherwise_with(|| format!("couldn't hide {}", "Hero")).is_err());
/// ```
pub trait AnyhowResultExt<T>: Sized {
    fn otherwise(self, s: impl Display) -> AnyResult<T> {
        self.otherwise_with(|| s)
    }

    /// Like [`AnyhowResultExt::otherwise`], only building the message on failure.
    fn otherwise_with<D: Display>(self, f: impl FnOnce() -> D) -> AnyResult<T>;
}

impl<T, E: Error + Send + Sync + 'static> AnyhowResultExt<T> for Result<T, E> {
    fn otherwise_with<D: Display>(self, f: impl FnOnce() -> D) -> AnyResult<T> {
        self.map_err(|e| anyhow::Error::from(e).context(f().to_string()))
    }
}

impl<T> AnyhowResultExt<T> for Option<T> {
    fn otherwise_with<D: Display>(self, f: impl FnOnce() -> D) -> AnyResult<T> {
        self.ok_or_else(|| anyhow!("{}", f()))
    }
}

/// Success flags, as returned by most scene operations.
impl AnyhowResultExt<()> for bool {
    fn otherwise_with<D: Display>(self, f: impl FnOnce() -> D) -> AnyResult<()> {
        if self {
            Ok(())
        } else {
            Err(anyhow!("{}", f()))
        }
    }
}

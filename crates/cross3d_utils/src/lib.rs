//! Various utilities shared by the cross3d crates

pub mod color;

mod result_ext;
pub use result_ext::AnyhowResultExt;

pub type AnyResult<T = (), E = anyhow::Error> = anyhow::Result<T, E>;

/// `Ok(())`, usable as the last expression of functions returning [`AnyResult`]
pub const fn ok<E>() -> Result<(), E> {
    Ok(())
}

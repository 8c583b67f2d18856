//! Plug-in transforms applied over a slice in place.

use std::ops::Neg;

use log::trace;

use crate::callback::Callback;
use crate::error::{CastResult, DispatchError};

/// Single plug-in transform `(&T) -> T`.
pub type Transformer<T> = Callback<T, T>;

/// Replaces each element with `transform(element)`, in ascending index order.
pub fn apply_in_place<T, F>(values: &mut [T], mut transform: F)
where
    F: FnMut(&T) -> T,
{
    for value in values.iter_mut() {
        *value = transform(value);
    }
}

/// Applies a plug-in [`Transformer`] to each element in ascending index order.
///
/// Stops at the first failing element; elements before it keep their
/// transformed value, the failing element and those after it are untouched.
pub fn try_apply_in_place<T>(values: &mut [T], transform: &Transformer<T>) -> CastResult<()> {
    let target_count = values.len();
    for (index, value) in values.iter_mut().enumerate() {
        trace!("transform: element {index} of {target_count}");
        *value = transform.call(value).map_err(|source| DispatchError::TargetFailed {
            index,
            target_count,
            source,
        })?;
    }
    Ok(())
}

/// `x * x`; the stock transform used with [`Transformer`].
#[must_use]
pub fn square(x: &i64) -> i64 {
    x * x
}

/// `-x` for any negatable copy type.
#[must_use]
pub fn negate<T: Copy + Neg<Output = T>>(x: &T) -> T {
    -*x
}

/// [`square`] as a plug-in [`Transformer`].
#[must_use]
pub fn square_transformer() -> Transformer<i64> {
    Callback::from_fn(square)
}

/// [`negate`] as a plug-in [`Transformer`].
#[must_use]
pub fn negate_transformer<T>() -> Transformer<T>
where
    T: Copy + Neg<Output = T> + 'static,
{
    Callback::from_fn(negate::<T>)
}

//! Callback targets.
//!
//! A [`Callback`] is a cheap, cloneable handle to an invocable bound to a
//! fixed signature `(&A) -> R`. The signature is part of the type, so a
//! target with the wrong parameter or return shape cannot be registered with
//! a list of a different signature.
//!
//! Two callbacks are equal when they refer to the same target, not when they
//! behave the same:
//!
//! - closures are equal only to clones of the same handle;
//! - plain functions are equal when they name the same function item;
//! - bound methods are equal when receiver and method are both the same.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::TargetError;

type Invoke<A, R> = dyn Fn(&A) -> Result<R, TargetError> + Send + Sync;

/// Identity of a callback target.
///
/// Functions and methods are identified by the type of the function item,
/// which is unique per function and generic arguments. Receivers and
/// closure state are identified by allocation address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKey {
    /// A closure handle; the address of its allocation.
    Instance(usize),
    /// A plain function.
    Function(TypeId),
    /// A method bound to a receiver.
    Method {
        /// Address of the receiver allocation.
        receiver: usize,
        /// Type of the method item.
        method: TypeId,
    },
}

impl TargetKey {
    /// Returns true if the target is bound to a receiver or closure state.
    #[must_use]
    pub const fn has_receiver(&self) -> bool {
        !matches!(self, Self::Function(_))
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance(addr) => write!(f, "closure@{addr:#x}"),
            Self::Function(id) => write!(f, "fn {id:?}"),
            Self::Method { receiver, method } => write!(f, "{method:?}@{receiver:#x}"),
        }
    }
}

/// A callback target with signature `(&A) -> R`.
pub struct Callback<A, R = ()> {
    func: Arc<Invoke<A, R>>,
    key: TargetKey,
}

impl<A: 'static, R: 'static> Callback<A, R> {
    /// Wraps an infallible closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        Self::from_invoke(Arc::new(move |args: &A| -> Result<R, TargetError> {
            Ok(f(args))
        }))
    }

    /// Wraps a closure that may fail.
    pub fn try_new<F, E>(f: F) -> Self
    where
        F: Fn(&A) -> Result<R, E> + Send + Sync + 'static,
        E: Into<TargetError> + 'static,
    {
        Self::from_invoke(Arc::new(move |args: &A| -> Result<R, TargetError> {
            f(args).map_err(Into::into)
        }))
    }

    /// Wraps a function item. Handles built from the same function (with the
    /// same generic arguments) compare equal, in any crate.
    ///
    /// Identity is the type of `f`, so pass a function item or a
    /// non-capturing closure; captured state is not part of the identity.
    #[must_use]
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&A) -> R + Copy + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(move |args: &A| -> Result<R, TargetError> { Ok(f(args)) }),
            key: TargetKey::Function(TypeId::of::<F>()),
        }
    }

    /// Wraps a fallible function item. See [`Callback::from_fn`].
    #[must_use]
    pub fn try_from_fn<F, E>(f: F) -> Self
    where
        F: Fn(&A) -> Result<R, E> + Copy + Send + Sync + 'static,
        E: Into<TargetError> + 'static,
    {
        Self {
            func: Arc::new(move |args: &A| -> Result<R, TargetError> {
                f(args).map_err(Into::into)
            }),
            key: TargetKey::Function(TypeId::of::<F>()),
        }
    }

    /// Binds the method item `method` to `receiver`.
    ///
    /// The callback keeps the receiver alive. Handles built from the same
    /// receiver allocation and the same method compare equal.
    #[must_use]
    pub fn bound<T, M>(receiver: &Arc<T>, method: M) -> Self
    where
        T: Send + Sync + 'static,
        M: Fn(&T, &A) -> R + Copy + Send + Sync + 'static,
    {
        let key = TargetKey::Method {
            receiver: Arc::as_ptr(receiver) as usize,
            method: TypeId::of::<M>(),
        };
        let receiver = Arc::clone(receiver);
        Self {
            func: Arc::new(move |args: &A| -> Result<R, TargetError> {
                Ok(method(&receiver, args))
            }),
            key,
        }
    }

    fn from_invoke(func: Arc<Invoke<A, R>>) -> Self {
        let key = TargetKey::Instance(Arc::as_ptr(&func).cast::<()>() as usize);
        Self { func, key }
    }
}

impl<A, R> Callback<A, R> {
    /// Invokes the target.
    pub fn call(&self, args: &A) -> Result<R, TargetError> {
        (self.func)(args)
    }

    /// Identity of this target.
    #[must_use]
    pub const fn key(&self) -> TargetKey {
        self.key
    }
}

impl<A, R> Clone for Callback<A, R> {
    fn clone(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
            key: self.key,
        }
    }
}

impl<A, R> PartialEq for Callback<A, R> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<A, R> Eq for Callback<A, R> {}

impl<A, R> Hash for Callback<A, R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<A, R> fmt::Debug for Callback<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").field("key", &self.key).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: &i64) -> i64 {
        x * x
    }

    fn cube(x: &i64) -> i64 {
        x * x * x
    }

    struct Counter {
        step: i64,
    }

    impl Counter {
        fn add(&self, x: &i64) -> i64 {
            x + self.step
        }

        fn sub(&self, x: &i64) -> i64 {
            x - self.step
        }
    }

    #[test]
    fn closure_equality_is_per_handle() {
        let a = Callback::new(|x: &i64| x + 1);
        let b = Callback::new(|x: &i64| x + 1);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert!(a.key().has_receiver());
    }

    #[test]
    fn function_equality_is_per_function() {
        let a = Callback::from_fn(square);
        let b = Callback::from_fn(square);
        let c = Callback::from_fn(cube);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(!a.key().has_receiver());
        assert_eq!(a.call(&3).unwrap(), 9);
    }

    #[test]
    fn bound_equality_needs_same_receiver_and_method() {
        let r1 = Arc::new(Counter { step: 2 });
        let r2 = Arc::new(Counter { step: 2 });

        let a = Callback::bound(&r1, Counter::add);
        let b = Callback::bound(&r1, Counter::add);
        let c = Callback::bound(&r2, Counter::add);
        let d = Callback::bound(&r1, Counter::sub);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(a.call(&5).unwrap(), 7);
        assert_eq!(d.call(&5).unwrap(), 3);
    }

    #[test]
    fn fallible_closure_surfaces_error() {
        let cb: Callback<i64, i64> = Callback::try_new(|x: &i64| {
            if *x < 0 {
                Err("negative input")
            } else {
                Ok(*x)
            }
        });
        assert_eq!(cb.call(&4).unwrap(), 4);
        let err = cb.call(&-1).unwrap_err();
        assert_eq!(err.to_string(), "negative input");
    }

    fn ident<T: Copy>(x: &T) -> T {
        *x
    }

    #[test]
    fn generic_function_equality_is_per_instantiation() {
        let a: Callback<i64, i64> = Callback::from_fn(ident::<i64>);
        let b: Callback<i64, i64> = Callback::from_fn(ident);
        assert_eq!(a, b);
        assert_ne!(a, Callback::from_fn(square));
        assert!(matches!(a.key(), TargetKey::Function(_)));
    }

    #[test]
    fn fallible_function_surfaces_error() {
        fn parse(s: &String) -> Result<i64, std::num::ParseIntError> {
            s.parse()
        }
        let cb = Callback::try_from_fn(parse);
        assert_eq!(cb.call(&"42".to_string()).unwrap(), 42);
        assert!(cb.call(&"x".to_string()).is_err());
        assert_eq!(cb, Callback::try_from_fn(parse));
    }
}

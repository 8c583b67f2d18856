//! Persistent callback lists.
//!
//! A [`CallbackList`] is an immutable, ordered sequence of callback targets
//! sharing one signature. Every combine/remove returns a new list; the
//! targets are held in a shared slice, so cloning a list or taking a
//! [`Snapshot`] is a reference-count bump.
//!
//! Compound assignment (`list += cb`, `list -= &cb`) rebinds the variable to
//! the new list. Snapshots taken earlier keep the targets they saw.

use std::fmt;
use std::ops::{Add, AddAssign, Deref, Sub, SubAssign};
use std::sync::Arc;

use crate::callback::Callback;

/// Immutable ordered view of a list's targets at one point in time.
pub struct Snapshot<A, R = ()> {
    targets: Arc<[Callback<A, R>]>,
}

impl<A, R> Clone for Snapshot<A, R> {
    fn clone(&self) -> Self {
        Self {
            targets: Arc::clone(&self.targets),
        }
    }
}

impl<A, R> Deref for Snapshot<A, R> {
    type Target = [Callback<A, R>];

    fn deref(&self) -> &Self::Target {
        &self.targets
    }
}

impl<A, R> fmt::Debug for Snapshot<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.targets.iter()).finish()
    }
}

/// Ordered, immutable list of callback targets.
///
/// Duplicates are permitted and each occurrence is invoked separately. The
/// empty list is the default value and is a valid list.
pub struct CallbackList<A, R = ()> {
    targets: Arc<[Callback<A, R>]>,
}

impl<A, R> CallbackList<A, R> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            targets: Arc::from(Vec::new()),
        }
    }

    fn from_vec(targets: Vec<Callback<A, R>>) -> Self {
        Self {
            targets: Arc::from(targets),
        }
    }

    /// Number of targets, counting duplicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns true if the list has no targets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Iterates targets in invocation order.
    pub fn iter(&self) -> std::slice::Iter<'_, Callback<A, R>> {
        self.targets.iter()
    }

    /// Returns true if any occurrence equals `target`.
    #[must_use]
    pub fn contains(&self, target: &Callback<A, R>) -> bool {
        self.targets.contains(target)
    }

    /// Returns the current ordered targets, unaffected by later changes to
    /// whichever variable holds this list.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<A, R> {
        Snapshot {
            targets: Arc::clone(&self.targets),
        }
    }

    /// Returns a new list with `target` appended.
    #[must_use]
    pub fn combine(&self, target: Callback<A, R>) -> Self {
        let mut targets = Vec::with_capacity(self.targets.len() + 1);
        targets.extend(self.targets.iter().cloned());
        targets.push(target);
        Self::from_vec(targets)
    }

    /// Returns a new list with every target of `other` appended in order.
    #[must_use]
    pub fn combine_list(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut targets = Vec::with_capacity(self.targets.len() + other.targets.len());
        targets.extend(self.targets.iter().cloned());
        targets.extend(other.targets.iter().cloned());
        Self::from_vec(targets)
    }

    /// Returns a new list without the last occurrence equal to `target`.
    ///
    /// If nothing matches, the returned list is equal to `self`.
    #[must_use]
    pub fn remove(&self, target: &Callback<A, R>) -> Self {
        match self.targets.iter().rposition(|t| t == target) {
            Some(pos) => self.without_range(pos, 1),
            None => self.clone(),
        }
    }

    /// Returns a new list without the last contiguous run equal to the whole
    /// target sequence of `other`.
    ///
    /// An empty `other`, or one whose sequence does not occur, leaves the
    /// list unchanged.
    #[must_use]
    pub fn remove_list(&self, other: &Self) -> Self {
        let needle = &other.targets[..];
        if needle.is_empty() || needle.len() > self.targets.len() {
            return self.clone();
        }
        match self.targets.windows(needle.len()).rposition(|w| w == needle) {
            Some(pos) => self.without_range(pos, needle.len()),
            None => self.clone(),
        }
    }

    /// Returns a new list without any occurrence equal to `target`.
    #[must_use]
    pub fn remove_all(&self, target: &Callback<A, R>) -> Self {
        if !self.contains(target) {
            return self.clone();
        }
        Self::from_vec(self.targets.iter().filter(|t| *t != target).cloned().collect())
    }

    fn without_range(&self, start: usize, len: usize) -> Self {
        let mut targets = Vec::with_capacity(self.targets.len() - len);
        targets.extend(self.targets[..start].iter().cloned());
        targets.extend(self.targets[start + len..].iter().cloned());
        Self::from_vec(targets)
    }
}

impl<A, R> Default for CallbackList<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R> Clone for CallbackList<A, R> {
    fn clone(&self) -> Self {
        Self {
            targets: Arc::clone(&self.targets),
        }
    }
}

impl<A, R> PartialEq for CallbackList<A, R> {
    fn eq(&self, other: &Self) -> bool {
        self.targets[..] == other.targets[..]
    }
}

impl<A, R> Eq for CallbackList<A, R> {}

impl<A, R> fmt::Debug for CallbackList<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackList")
            .field("targets", &&self.targets[..])
            .finish()
    }
}

impl<A, R> From<Callback<A, R>> for CallbackList<A, R> {
    fn from(target: Callback<A, R>) -> Self {
        Self::from_vec(vec![target])
    }
}

impl<A, R> FromIterator<Callback<A, R>> for CallbackList<A, R> {
    fn from_iter<I: IntoIterator<Item = Callback<A, R>>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<'a, A, R> IntoIterator for &'a CallbackList<A, R> {
    type Item = &'a Callback<A, R>;
    type IntoIter = std::slice::Iter<'a, Callback<A, R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<A, R> Add<Callback<A, R>> for &CallbackList<A, R> {
    type Output = CallbackList<A, R>;

    fn add(self, target: Callback<A, R>) -> Self::Output {
        self.combine(target)
    }
}

impl<A, R> Add<&CallbackList<A, R>> for &CallbackList<A, R> {
    type Output = CallbackList<A, R>;

    fn add(self, other: &CallbackList<A, R>) -> Self::Output {
        self.combine_list(other)
    }
}

impl<A, R> Sub<&Callback<A, R>> for &CallbackList<A, R> {
    type Output = CallbackList<A, R>;

    fn sub(self, target: &Callback<A, R>) -> Self::Output {
        self.remove(target)
    }
}

impl<A, R> Sub<&CallbackList<A, R>> for &CallbackList<A, R> {
    type Output = CallbackList<A, R>;

    fn sub(self, other: &CallbackList<A, R>) -> Self::Output {
        self.remove_list(other)
    }
}

impl<A, R> AddAssign<Callback<A, R>> for CallbackList<A, R> {
    fn add_assign(&mut self, target: Callback<A, R>) {
        *self = self.combine(target);
    }
}

impl<A, R> SubAssign<&Callback<A, R>> for CallbackList<A, R> {
    fn sub_assign(&mut self, target: &Callback<A, R>) {
        *self = self.remove(target);
    }
}

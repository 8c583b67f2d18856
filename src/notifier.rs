//! Change notifiers.
//!
//! A [`Notifier`] owns a watched value and the callback list registered
//! against it. Writing a different value through [`Notifier::set`] builds a
//! [`ValueChanged`] payload and dispatches it to a snapshot of the current
//! subscribers before `set` returns. Writing an equal value does nothing.
//!
//! Subscribers may subscribe or unsubscribe from inside a running callback.
//! No lock is held while targets run; such changes apply to the next
//! dispatch only.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::callback::Callback;
use crate::config::NotifierConfig;
use crate::dispatcher::Dispatcher;
use crate::error::CastResult;
use crate::list::CallbackList;

/// Unique identifier for a notifier; identifies the sender of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotifierId(Uuid);

impl NotifierId {
    /// Create a new random notifier id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for NotifierId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotifierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payload describing one change of a watched value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueChanged<T> {
    /// Notifier that raised the change.
    pub source: NotifierId,
    /// Value before the change.
    pub previous: T,
    /// Value after the change.
    pub current: T,
    /// When the change was stored.
    pub occurred_at: DateTime<Utc>,
}

impl<T> ValueChanged<T> {
    /// Builds a payload stamped with the current time.
    #[must_use]
    pub fn new(source: NotifierId, previous: T, current: T) -> Self {
        Self {
            source,
            previous,
            current,
            occurred_at: Utc::now(),
        }
    }
}

/// Handler type for change notifications.
pub type ChangeHandler<T> = Callback<ValueChanged<T>>;

/// Dispatch state of a notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifierState {
    /// No dispatch in progress.
    Idle,
    /// At least one dispatch is running.
    Dispatching,
}

/// Owns a watched value and dispatches [`ValueChanged`] to subscribers
/// whenever the value changes.
pub struct Notifier<T> {
    id: NotifierId,
    name: String,
    dispatcher: Dispatcher,
    value: Mutex<T>,
    changed: Mutex<CallbackList<ValueChanged<T>>>,
    depth: AtomicUsize,
}

impl<T: PartialEq + Clone> Notifier<T> {
    /// Creates a notifier with default configuration.
    pub fn new(initial: T) -> Self {
        Self::with_config(initial, NotifierConfig::default())
    }

    /// Creates a notifier from `cfg`.
    pub fn with_config(initial: T, cfg: NotifierConfig) -> Self {
        Self {
            id: NotifierId::new(),
            name: cfg.name,
            dispatcher: Dispatcher::new(cfg.dispatcher),
            value: Mutex::new(initial),
            changed: Mutex::new(CallbackList::new()),
            depth: AtomicUsize::new(0),
        }
    }

    /// Id passed as `source` in every payload.
    #[must_use]
    pub const fn id(&self) -> NotifierId {
        self.id
    }

    /// Name used in log lines.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> T {
        lock(&self.value).clone()
    }

    /// Stores `value` and, if it differs from the current value, dispatches
    /// a change notification.
    ///
    /// Returns whether a notification was dispatched. A failing subscriber
    /// aborts the dispatch and its error is returned; the new value stays
    /// stored.
    pub fn set(&self, value: T) -> CastResult<bool> {
        let payload = {
            let mut current = lock(&self.value);
            if *current == value {
                debug!("{}: value unchanged, no notification", self.name);
                return Ok(false);
            }
            let previous = std::mem::replace(&mut *current, value);
            ValueChanged::new(self.id, previous, current.clone())
        };
        self.on_changed(&payload)?;
        Ok(true)
    }

    /// Dispatches `payload` to a snapshot of the current subscribers.
    fn on_changed(&self, payload: &ValueChanged<T>) -> CastResult<()> {
        let handlers = self.handlers();
        let _dispatching = DepthGuard::enter(&self.depth);
        self.dispatcher.invoke(&handlers, payload)
    }

    /// Appends `handler` to the subscriber list.
    pub fn subscribe(&self, handler: ChangeHandler<T>) {
        let mut changed = lock(&self.changed);
        *changed += handler;
        debug!("{}: subscribed, {} handler(s)", self.name, changed.len());
    }

    /// Removes the most recently added occurrence of `handler`. Removing a
    /// handler that was never subscribed is a no-op.
    pub fn unsubscribe(&self, handler: &ChangeHandler<T>) {
        let mut changed = lock(&self.changed);
        *changed -= handler;
        debug!("{}: unsubscribed, {} handler(s)", self.name, changed.len());
    }

    /// The current subscriber list.
    #[must_use]
    pub fn handlers(&self) -> CallbackList<ValueChanged<T>> {
        lock(&self.changed).clone()
    }

    /// Number of subscribed handlers, duplicates included.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock(&self.changed).len()
    }

    /// [`NotifierState::Dispatching`] while any dispatch, nested or not, is
    /// still running.
    #[must_use]
    pub fn state(&self) -> NotifierState {
        if self.depth.load(Ordering::Acquire) == 0 {
            NotifierState::Idle
        } else {
            NotifierState::Dispatching
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Notifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("value", &*lock(&self.value))
            .field("subscribers", &lock(&self.changed).len())
            .finish_non_exhaustive()
    }
}

// Notifier locks are never held while user code runs, so a poisoned lock
// still guards a consistent value.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct DepthGuard<'a>(&'a AtomicUsize);

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a AtomicUsize) -> Self {
        depth.fetch_add(1, Ordering::AcqRel);
        Self(depth)
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

//! Synchronous, fail-fast dispatch of callback lists.
//!
//! The dispatcher snapshots a list and calls every target in order on the
//! caller's thread. The first target error stops the dispatch; targets that
//! already ran are not rolled back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, trace, warn};

use crate::config::DispatcherConfig;
use crate::error::{CastResult, DispatchError};
use crate::list::{CallbackList, Snapshot};

/// Cooperative cancellation flag checked between targets.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns true once [`CancellationToken::cancel`] has been called on
    /// this token or any clone of it.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Invokes callback lists.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    cfg: DispatcherConfig,
}

impl Dispatcher {
    /// Creates a dispatcher from `cfg`.
    #[must_use]
    pub const fn new(cfg: DispatcherConfig) -> Self {
        Self { cfg }
    }

    /// Configuration this dispatcher was built with.
    #[must_use]
    pub const fn config(&self) -> &DispatcherConfig {
        &self.cfg
    }

    /// Invokes every target of `list` in order and returns the last
    /// target's return value. Earlier return values are discarded.
    ///
    /// An empty list is a no-op that yields `R::default()`.
    pub fn invoke<A, R: Default>(&self, list: &CallbackList<A, R>, args: &A) -> CastResult<R> {
        let mut last = None;
        self.run(&list.snapshot(), args, None, |value| last = Some(value))?;
        Ok(last.unwrap_or_default())
    }

    /// Invokes every target of `list` in order and collects every return value.
    pub fn invoke_all<A, R>(&self, list: &CallbackList<A, R>, args: &A) -> CastResult<Vec<R>> {
        let snapshot = list.snapshot();
        let mut out = Vec::with_capacity(snapshot.len());
        self.run(&snapshot, args, None, |value| out.push(value))?;
        Ok(out)
    }

    /// Like [`Dispatcher::invoke`], but checks `token` before each target and
    /// stops with [`DispatchError::Cancelled`] once it is set.
    pub fn invoke_cancellable<A, R: Default>(
        &self,
        list: &CallbackList<A, R>,
        args: &A,
        token: &CancellationToken,
    ) -> CastResult<R> {
        let mut last = None;
        self.run(&list.snapshot(), args, Some(token), |value| last = Some(value))?;
        Ok(last.unwrap_or_default())
    }

    fn run<A, R>(
        &self,
        snapshot: &Snapshot<A, R>,
        args: &A,
        token: Option<&CancellationToken>,
        mut sink: impl FnMut(R),
    ) -> CastResult<()> {
        let target_count = snapshot.len();
        if target_count == 0 {
            return Ok(());
        }
        debug!("{}: dispatching to {} target(s)", self.cfg.label, target_count);

        for (index, target) in snapshot.iter().enumerate() {
            if token.is_some_and(CancellationToken::is_cancelled) {
                debug!(
                    "{}: cancelled after {} of {} target(s)",
                    self.cfg.label, index, target_count
                );
                return Err(DispatchError::Cancelled {
                    invoked: index,
                    target_count,
                }
                .into());
            }

            if self.cfg.trace_targets {
                trace!("{}: invoking target {} ({})", self.cfg.label, index, target.key());
            }

            match target.call(args) {
                Ok(value) => sink(value),
                Err(source) => {
                    warn!(
                        "{}: target {} of {} failed: {}",
                        self.cfg.label, index, target_count, source
                    );
                    return Err(DispatchError::TargetFailed {
                        index,
                        target_count,
                        source,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}

/// Invokes `list` with a default dispatcher. See [`Dispatcher::invoke`].
pub fn invoke<A, R: Default>(list: &CallbackList<A, R>, args: &A) -> CastResult<R> {
    Dispatcher::default().invoke(list, args)
}

/// Invokes `list` with a default dispatcher. See [`Dispatcher::invoke_all`].
pub fn invoke_all<A, R>(list: &CallbackList<A, R>, args: &A) -> CastResult<Vec<R>> {
    Dispatcher::default().invoke_all(list, args)
}

//! Progress reporting for long-running work.
//!
//! A [`ProgressReporter`] is an ordinary multicast list of `(&u8)` targets,
//! so progress can be fanned out to any number of observers (console,
//! file, metrics) at once.

use log::debug;

use crate::dispatcher::Dispatcher;
use crate::error::{CastResult, DispatchError, TargetError};
use crate::list::CallbackList;

/// Multicast list of percent-complete observers.
pub type ProgressReporter = CallbackList<u8>;

/// Runs `steps` units of work, reporting percent complete before each one.
///
/// Reports `i * 100 / steps` for step `i`, so ten steps report 0, 10, ..., 90.
/// A failing observer or a failing step stops the run. Step failures are
/// reported as a target failure at the step index.
pub fn run_with_progress<F>(
    steps: u32,
    reporter: &ProgressReporter,
    dispatcher: &Dispatcher,
    mut work: F,
) -> CastResult<()>
where
    F: FnMut(u32) -> Result<(), TargetError>,
{
    debug!("progress: running {steps} step(s) with {} observer(s)", reporter.len());
    for step in 0..steps {
        dispatcher.invoke(reporter, &percent(step, steps))?;
        work(step).map_err(|source| DispatchError::TargetFailed {
            index: step as usize,
            target_count: steps as usize,
            source,
        })?;
    }
    Ok(())
}

fn percent(step: u32, steps: u32) -> u8 {
    let pct = u64::from(step) * 100 / u64::from(steps.max(1));
    u8::try_from(pct).unwrap_or(u8::MAX)
}

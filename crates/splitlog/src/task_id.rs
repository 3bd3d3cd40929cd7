//! Execution-unit identification.
//!
//! Log lines carry a `[PID:<n>]` tag identifying the unit of work that
//! produced them. The id is the numeric payload of the runtime's per-thread
//! identifier, which is assigned from a monotonic counter and therefore
//! nondecreasing within a run. It does not correlate across process
//! restarts.

use std::cell::Cell;
use std::thread;

/// The runtime exposed a thread identifier in a shape we could not parse.
///
/// Never expected in normal operation; callers wrap and propagate instead
/// of retrying.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unrecognized thread id format: {0:?}")]
pub struct TaskIdError(String);

thread_local! {
    static CACHED_TASK_ID: Cell<Option<u64>> = const { Cell::new(None) };
}

/// Identifier of the currently executing unit of work.
///
/// Stable for the lifetime of the calling thread; resolved once per thread
/// and cached.
pub fn current_task_id() -> Result<u64, TaskIdError> {
    CACHED_TASK_ID.with(|cached| {
        if let Some(id) = cached.get() {
            return Ok(id);
        }
        let id = resolve()?;
        cached.set(Some(id));
        Ok(id)
    })
}

fn resolve() -> Result<u64, TaskIdError> {
    // ThreadId has no stable numeric accessor; its Debug form "ThreadId(n)"
    // carries the counter value.
    let repr = format!("{:?}", thread::current().id());
    let parsed = repr
        .strip_prefix("ThreadId(")
        .and_then(|rest| rest.strip_suffix(')'))
        .and_then(|digits| digits.parse::<u64>().ok());
    match parsed {
        Some(id) => Ok(id),
        None => Err(TaskIdError(repr)),
    }
}

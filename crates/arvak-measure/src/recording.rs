//! Scoped suspension of operation recording.
//!
//! Measurement processes delegate to other estimators internally. Any outer
//! instrumentation that records operations must not see those delegated
//! calls, so they run inside a [`RecordingGuard`]. The guard only toggles a
//! thread-local flag; it never affects computed values.

use std::cell::Cell;
use std::marker::PhantomData;
use tracing::trace;

thread_local! {
    static SUSPENDED: Cell<usize> = const { Cell::new(0) };
}

/// While alive, recording is suspended on the current thread.
///
/// Released on drop, so every exit path (including `?` and unwinding)
/// restores the previous state.
#[must_use = "recording resumes as soon as the guard is dropped"]
#[derive(Debug)]
pub struct RecordingGuard {
    // Thread-local state: the guard must be dropped on the thread that made it.
    _not_send: PhantomData<*const ()>,
}

/// Suspend recording until the returned guard is dropped.
pub fn stop_recording() -> RecordingGuard {
    let depth = SUSPENDED.with(|s| {
        let d = s.get() + 1;
        s.set(d);
        d
    });
    trace!(depth, "recording suspended");
    RecordingGuard {
        _not_send: PhantomData,
    }
}

/// Whether operations are currently being recorded on this thread.
pub fn is_recording() -> bool {
    SUSPENDED.with(|s| s.get() == 0)
}

impl Drop for RecordingGuard {
    fn drop(&mut self) {
        let depth = SUSPENDED.with(|s| {
            let d = s.get().saturating_sub(1);
            s.set(d);
            d
        });
        trace!(depth, "recording resumed");
    }
}

//! Two-way fork/join on scoped OS threads.
//!
//! [`join`] is a miniature nursery: it starts both closures on their own
//! named threads inside a [`std::thread::scope`] and does not return until
//! both have finished. Because the threads are scoped, the closures may
//! borrow from the caller's stack, which lets the sorter hand each child a
//! disjoint `&mut` slice.
//!
//! # Failure
//!
//! - If the OS refuses to start a thread the call fails with
//!   [`SortError::ConcurrencyExhausted`]. A sibling that did start is joined
//!   first, so no task outlives the call.
//! - If a child panics the panic is caught and surfaced as
//!   [`SortError::TaskPanicked`] once both children are joined.

use std::any::Any;
use std::io;
use std::thread::{self, ScopedJoinHandle};

use crate::error::SortError;

/// Run `left` and `right` concurrently and wait for both.
///
/// `label` names the threads (`<label>-l`, `<label>-r`) for debuggers and
/// panic messages.
pub fn join<A, B, RA, RB>(label: &str, left: A, right: B) -> Result<(RA, RB), SortError>
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    thread::scope(|scope| {
        let left_handle = thread::Builder::new()
            .name(format!("{label}-l"))
            .spawn_scoped(scope, left)
            .map_err(|e| spawn_failed(label, e))?;

        let right_handle = match thread::Builder::new()
            .name(format!("{label}-r"))
            .spawn_scoped(scope, right)
        {
            Ok(handle) => handle,
            Err(e) => {
                let _ = left_handle.join();
                return Err(spawn_failed(label, e));
            }
        };

        let left_result = collect(label, left_handle);
        let right_result = collect(label, right_handle);
        Ok((left_result?, right_result?))
    })
}

fn collect<R>(label: &str, handle: ScopedJoinHandle<'_, R>) -> Result<R, SortError> {
    handle.join().map_err(|payload| SortError::TaskPanicked {
        label: label.to_string(),
        message: panic_message(payload.as_ref()),
    })
}

fn spawn_failed(label: &str, err: io::Error) -> SortError {
    tracing::error!(task = label, error = %err, "failed to spawn sort task");
    SortError::ConcurrencyExhausted {
        label: label.to_string(),
        reason: err.to_string(),
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::time::Duration;

    // 1. Both results come back in argument order
    #[test]
    fn returns_both_results() {
        let (a, b) = join("t", || 1 + 1, || "right".to_string()).unwrap();
        assert_eq!(a, 2);
        assert_eq!(b, "right");
    }

    // 2. The two sides really run at the same time
    #[test]
    fn sides_run_concurrently() {
        let barrier = Barrier::new(2);
        // Would deadlock if the sides ran one after the other.
        join("barrier", || barrier.wait(), || barrier.wait()).unwrap();
    }

    // 3. Closures can mutate disjoint borrowed slices
    #[test]
    fn mutates_disjoint_borrows() {
        let mut data = [1, 2, 3, 4, 5];
        let (lo, hi) = data.split_at_mut(2);
        join(
            "slices",
            || lo.iter_mut().for_each(|x| *x *= 10),
            || hi.iter_mut().for_each(|x| *x = -*x),
        )
        .unwrap();
        assert_eq!(data, [10, 20, -3, -4, -5]);
    }

    // 4. Parent does not resume before both children finish
    #[test]
    fn waits_for_slow_child() {
        let done = AtomicBool::new(false);
        join(
            "slow",
            || {
                thread::sleep(Duration::from_millis(30));
                done.store(true, Ordering::Release);
            },
            || (),
        )
        .unwrap();
        assert!(done.load(Ordering::Acquire));
    }

    // 5. A child panic is reported with its message
    #[test]
    fn child_panic_is_caught() {
        let err = join("boom", || panic!("deliberate panic"), || ()).unwrap_err();
        match err {
            SortError::TaskPanicked { label, message } => {
                assert_eq!(label, "boom");
                assert!(message.contains("deliberate panic"));
            }
            other => panic!("expected TaskPanicked, got {:?}", other),
        }
    }

    // 6. The sibling of a panicking child still runs to completion
    #[test]
    fn sibling_of_panicking_child_completes() {
        let ran = AtomicUsize::new(0);
        let result = join(
            "mixed",
            || {
                thread::sleep(Duration::from_millis(10));
                ran.fetch_add(1, Ordering::SeqCst);
            },
            || panic!("right side failed"),
        );
        assert!(result.is_err());
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    // 7. Formatted panic payloads
    #[test]
    fn panic_message_from_string_payload() {
        let err = join("fmt", || (), || panic!("value was {}", 7)).unwrap_err();
        assert_eq!(
            err,
            SortError::TaskPanicked {
                label: "fmt".into(),
                message: "value was 7".into(),
            }
        );
    }

    // 8. Nested joins compose
    #[test]
    fn nested_joins() {
        let ((a, b), (c, d)) = join(
            "outer",
            || join("inner-a", || 1, || 2).unwrap(),
            || join("inner-b", || 3, || 4).unwrap(),
        )
        .unwrap();
        assert_eq!((a, b, c, d), (1, 2, 3, 4));
    }
}

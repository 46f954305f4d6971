//! Single-shot promises.
//!
//! A [`Pending`] is the consumer half of a value that will be produced exactly
//! once, either resolved or rejected. Callers either attach continuations with
//! [`Pending::on_settled`] or `.await` the handle.
//!
//! Continuation semantics:
//!
//! - continuations registered before settlement run exactly once, in
//!   registration order, right after the producer settles;
//! - a continuation registered after settlement runs synchronously, inside
//!   the `on_settled` call.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use parking_lot::Mutex;

use crate::{Error, Result};

type Continuation<T> = Box<dyn FnOnce(std::result::Result<&T, &Error>) + Send + 'static>;

enum State<T> {
    Waiting,
    Settled(Result<Arc<T>>),
}

struct Shared<T> {
    state: State<T>,
    continuations: Vec<Continuation<T>>,
    wakers: Vec<Waker>,
}

/// Consumer handle of a single-shot value.
///
/// Cloning the handle shares the same underlying value.
pub struct Pending<T> {
    shared: Arc<Mutex<Shared<T>>>,
}

/// Producer handle of a single-shot value.
///
/// Dropping a settler without settling rejects the value with
/// [`Error::Cancelled`].
pub struct Settler<T> {
    shared: Option<Arc<Mutex<Shared<T>>>>,
}

impl<T> Pending<T> {
    /// Create a connected producer/consumer pair.
    pub fn channel() -> (Settler<T>, Pending<T>) {
        let shared = Arc::new(Mutex::new(Shared {
            state: State::Waiting,
            continuations: Vec::new(),
            wakers: Vec::new(),
        }));
        (
            Settler {
                shared: Some(shared.clone()),
            },
            Pending { shared },
        )
    }

    /// Create an already resolved handle.
    pub fn resolved(value: T) -> Self {
        let (settler, pending) = Self::channel();
        settler.resolve(value);
        pending
    }

    /// Create an already rejected handle.
    pub fn rejected(error: Error) -> Self {
        let (settler, pending) = Self::channel();
        settler.reject(error);
        pending
    }

    /// Check whether the value has been produced (or rejected).
    pub fn is_settled(&self) -> bool {
        matches!(self.shared.lock().state, State::Settled(_))
    }

    /// Get the settled result, if any.
    pub fn result(&self) -> Option<Result<Arc<T>>> {
        match &self.shared.lock().state {
            State::Waiting => None,
            State::Settled(result) => Some(result.clone()),
        }
    }

    /// Attach a continuation.
    ///
    /// Runs immediately when the handle is already settled, otherwise after
    /// every continuation registered before it.
    pub fn on_settled<F>(&self, continuation: F)
    where
        F: FnOnce(std::result::Result<&T, &Error>) + Send + 'static,
    {
        let settled = {
            let mut shared = self.shared.lock();
            let settled = match &shared.state {
                State::Waiting => None,
                State::Settled(result) => Some(result.clone()),
            };
            match settled {
                Some(result) => result,
                None => {
                    shared.continuations.push(Box::new(continuation));
                    return;
                }
            }
        };
        continuation(borrow_result(&settled));
    }
}

impl<T> Clone for Pending<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shared = self.shared.lock();
        let state = match &shared.state {
            State::Waiting => "waiting",
            State::Settled(Ok(_)) => "resolved",
            State::Settled(Err(_)) => "rejected",
        };
        f.debug_struct("Pending")
            .field("state", &state)
            .field("continuations", &shared.continuations.len())
            .finish()
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<Arc<T>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut shared = self.shared.lock();
        if let State::Settled(result) = &shared.state {
            return Poll::Ready(result.clone());
        }
        if !shared.wakers.iter().any(|w| w.will_wake(cx.waker())) {
            shared.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}

impl<T> Settler<T> {
    /// Resolve the value, running queued continuations.
    pub fn resolve(mut self, value: T) {
        if let Some(shared) = self.shared.take() {
            settle(&shared, Ok(Arc::new(value)));
        }
    }

    /// Reject the value, running queued continuations with the error.
    pub fn reject(mut self, error: Error) {
        if let Some(shared) = self.shared.take() {
            settle(&shared, Err(error));
        }
    }
}

impl<T> Drop for Settler<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            settle(&shared, Err(Error::Cancelled));
        }
    }
}

impl<T> std::fmt::Debug for Settler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settler")
            .field("settled", &self.shared.is_none())
            .finish()
    }
}

fn settle<T>(shared: &Mutex<Shared<T>>, result: Result<Arc<T>>) {
    // Continuations run outside the lock so they may register further ones.
    let (continuations, wakers) = {
        let mut guard = shared.lock();
        if matches!(guard.state, State::Settled(_)) {
            return;
        }
        guard.state = State::Settled(result.clone());
        (
            std::mem::take(&mut guard.continuations),
            std::mem::take(&mut guard.wakers),
        )
    };

    for continuation in continuations {
        continuation(borrow_result(&result));
    }
    for waker in wakers {
        waker.wake();
    }
}

fn borrow_result<T>(result: &Result<Arc<T>>) -> std::result::Result<&T, &Error> {
    match result {
        Ok(value) => Ok(value.as_ref()),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Box<dyn FnOnce(std::result::Result<&u32, &Error>) + Send>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let make = move |label: &str| {
            let sink = sink.clone();
            let label = label.to_string();
            Box::new(move |result: std::result::Result<&u32, &Error>| {
                let entry = match result {
                    Ok(v) => format!("{label}:{v}"),
                    Err(e) => format!("{label}:{e}"),
                };
                sink.lock().push(entry);
            }) as Box<dyn FnOnce(std::result::Result<&u32, &Error>) + Send>
        };
        (log, make)
    }

    #[test]
    fn continuations_run_in_registration_order() {
        let (log, make) = recorder();
        let (settler, pending) = Pending::<u32>::channel();

        pending.on_settled(make("first"));
        pending.on_settled(make("second"));
        pending.on_settled(make("third"));
        assert!(log.lock().is_empty());

        settler.resolve(7);
        assert_eq!(*log.lock(), vec!["first:7", "second:7", "third:7"]);
    }

    #[test]
    fn late_continuation_runs_synchronously() {
        let (log, make) = recorder();
        let pending = Pending::resolved(3u32);

        pending.on_settled(make("late"));
        assert_eq!(*log.lock(), vec!["late:3"]);
    }

    #[test]
    fn continuations_run_exactly_once() {
        let (log, make) = recorder();
        let (settler, pending) = Pending::<u32>::channel();
        pending.on_settled(make("once"));

        settler.resolve(1);
        // A settled handle ignores further settlement attempts.
        assert!(pending.is_settled());
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn rejection_reaches_continuations() {
        let (log, make) = recorder();
        let (settler, pending) = Pending::<u32>::channel();
        pending.on_settled(make("r"));

        settler.reject(Error::rejected("unclosed block"));
        assert_eq!(*log.lock(), vec!["r:Operation rejected: unclosed block"]);
        assert!(matches!(pending.result(), Some(Err(Error::Rejected(_)))));
    }

    #[test]
    fn dropped_settler_cancels() {
        let (settler, pending) = Pending::<u32>::channel();
        drop(settler);
        assert!(matches!(pending.result(), Some(Err(Error::Cancelled))));
    }

    #[test]
    fn await_resolved_value() {
        let (settler, pending) = Pending::<String>::channel();
        settler.resolve("done".to_string());
        let value = pollster::block_on(pending).unwrap();
        assert_eq!(value.as_str(), "done");
    }

    #[test]
    fn continuation_registered_during_settle_runs() {
        let (settler, pending) = Pending::<u32>::channel();
        let inner_ran = Arc::new(Mutex::new(false));

        let handle = pending.clone();
        let flag = inner_ran.clone();
        pending.on_settled(move |_| {
            handle.on_settled(move |_| *flag.lock() = true);
        });

        settler.resolve(0);
        assert!(*inner_ran.lock());
    }
}

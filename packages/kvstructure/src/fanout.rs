//! Scheduling of sibling field tasks.

use std::sync::{Mutex, PoisonError};

use crate::{Error, Fanout};

/// Runs the field tasks of one struct level and collects their errors.
///
/// One scheduler serves a whole traversal. Under `Bounded(n)` it owns a
/// rayon pool of `n` threads shared by every nesting level; a level spawned
/// from inside the pool is scheduled on the same pool, and work stealing
/// keeps waiting parents busy with their children. `Bounded(0)` runs inline.
pub(crate) enum Scheduler {
    Inline,
    Global,
    Pool(rayon::ThreadPool),
}

impl Scheduler {
    pub(crate) fn new(policy: Fanout) -> Result<Self, Error> {
        match policy {
            Fanout::Sequential | Fanout::Bounded(0) => Ok(Scheduler::Inline),
            Fanout::Unbounded => Ok(Scheduler::Global),
            Fanout::Bounded(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|index| format!("kvstructure-{}", index))
                    .build()?;
                Ok(Scheduler::Pool(pool))
            }
        }
    }

    /// Run every task to completion. Siblings are never cancelled.
    ///
    /// Returns the errors tagged with their task index, sorted by index.
    pub(crate) fn run_all<T, F>(&self, tasks: Vec<T>, work: F) -> Vec<(usize, Error)>
    where
        T: Send,
        F: Fn(T) -> Result<(), Error> + Sync,
    {
        let sink = ErrorSink::default();

        match self {
            _ if tasks.len() < 2 => run_inline(tasks, &work, &sink),
            Scheduler::Inline => run_inline(tasks, &work, &sink),
            Scheduler::Global => rayon::scope(|scope| spawn_all(scope, tasks, &work, &sink)),
            Scheduler::Pool(pool) => pool.scope(|scope| spawn_all(scope, tasks, &work, &sink)),
        }

        sink.into_sorted()
    }

    /// Worker threads this scheduler may run tasks on.
    #[cfg(test)]
    pub(crate) fn threads(&self) -> usize {
        match self {
            Scheduler::Inline => 0,
            Scheduler::Global => rayon::current_num_threads(),
            Scheduler::Pool(pool) => pool.current_num_threads(),
        }
    }
}

fn run_inline<T, F>(tasks: Vec<T>, work: &F, sink: &ErrorSink)
where
    F: Fn(T) -> Result<(), Error>,
{
    for (index, task) in tasks.into_iter().enumerate() {
        sink.push(index, work(task));
    }
}

/// Spawn one task per field into `scope`. The current span follows each
/// task onto its worker thread.
fn spawn_all<'scope, T, F>(
    scope: &rayon::Scope<'scope>,
    tasks: Vec<T>,
    work: &'scope F,
    sink: &'scope ErrorSink,
) where
    T: Send + 'scope,
    F: Fn(T) -> Result<(), Error> + Sync,
{
    let span = tracing::Span::current();
    for (index, task) in tasks.into_iter().enumerate() {
        let span = span.clone();
        scope.spawn(move |_| {
            let _entered = span.enter();
            sink.push(index, work(task));
        });
    }
}

/// Mutex-guarded collector shared by the tasks of one level.
#[derive(Default)]
struct ErrorSink {
    errors: Mutex<Vec<(usize, Error)>>,
}

impl ErrorSink {
    fn push(&self, index: usize, result: Result<(), Error>) {
        if let Err(error) = result {
            self.errors
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((index, error));
        }
    }

    fn into_sorted(self) -> Vec<(usize, Error)> {
        let mut errors = self
            .errors
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        errors.sort_by_key(|(index, _)| *index);
        errors
    }
}

/// Reduce the errors of one level to the first, logging the rest.
pub(crate) fn first_error(level: &str, errors: Vec<(usize, Error)>) -> Result<(), Error> {
    let mut errors = errors.into_iter();
    let Some((_, first)) = errors.next() else {
        return Ok(());
    };
    for (index, error) in errors {
        tracing::warn!(path = level, field = index, error = %error, "additional field error");
    }
    Err(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    fn failing(index: usize) -> Error {
        Error::KeyNotFound {
            key: format!("k{}", index),
        }
    }

    #[test]
    fn sequential_runs_in_order() {
        let scheduler = Scheduler::new(Fanout::Sequential).unwrap();
        let order = Mutex::new(Vec::new());

        let errors = scheduler.run_all((0..5).collect(), |i: usize| {
            order.lock().unwrap().push(i);
            Ok(())
        });

        assert!(errors.is_empty());
        assert_eq!(order.into_inner().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn bounded_zero_runs_on_the_caller() {
        let scheduler = Scheduler::new(Fanout::Bounded(0)).unwrap();
        assert_eq!(scheduler.threads(), 0);

        let caller = thread::current().id();
        let errors = scheduler.run_all((0..6).collect(), |_: usize| {
            assert_eq!(thread::current().id(), caller);
            Ok(())
        });
        assert!(errors.is_empty());
    }

    #[test]
    fn every_task_runs_despite_errors() {
        for policy in [
            Fanout::Sequential,
            Fanout::Bounded(0),
            Fanout::Bounded(1),
            Fanout::Bounded(2),
            Fanout::Unbounded,
        ] {
            let scheduler = Scheduler::new(policy).unwrap();
            let ran = AtomicUsize::new(0);

            let errors = scheduler.run_all((0..8).collect(), |i: usize| {
                ran.fetch_add(1, Ordering::SeqCst);
                if i % 3 == 0 {
                    Err(failing(i))
                } else {
                    Ok(())
                }
            });

            assert_eq!(ran.load(Ordering::SeqCst), 8, "{:?}", policy);
            let indices: Vec<usize> = errors.iter().map(|(i, _)| *i).collect();
            assert_eq!(indices, vec![0, 3, 6], "{:?}", policy);
        }
    }

    #[test]
    fn bounded_never_exceeds_budget() {
        let scheduler = Scheduler::new(Fanout::Bounded(2)).unwrap();
        assert_eq!(scheduler.threads(), 2);
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        let errors = scheduler.run_all((0..16).collect(), |_: usize| {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(2));
            active.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        });

        assert!(errors.is_empty());
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn nested_levels_share_one_thread() {
        let scheduler = Scheduler::new(Fanout::Bounded(1)).unwrap();
        let inner_runs = AtomicUsize::new(0);

        let errors = scheduler.run_all((0..3).collect(), |outer: usize| {
            let inner = scheduler.run_all((0..3).collect(), |_: usize| {
                inner_runs.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
            assert!(inner.is_empty());
            if outer == 2 {
                Err(failing(outer))
            } else {
                Ok(())
            }
        });

        assert_eq!(errors.len(), 1);
        assert_eq!(inner_runs.load(Ordering::SeqCst), 9);
    }

    #[test]
    fn first_error_picks_lowest_index() {
        let err = first_error("foo", vec![(1, failing(1)), (4, failing(4))]).unwrap_err();
        assert!(matches!(err, Error::KeyNotFound { key } if key == "k1"));
        assert!(first_error("foo", Vec::new()).is_ok());
    }
}

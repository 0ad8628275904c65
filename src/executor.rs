use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::MapError;

/// Runs two independent computations and returns once both have finished.
///
/// No ordering is promised between `a` and `b`; they may run on different
/// workers, interleaved, or one after the other. Calls may nest.
pub(crate) trait ForkJoin: Sync {
    fn fork_join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send;

    fn worker_count(&self) -> usize;
}

/// Work-stealing executor backed by a dedicated rayon pool.
pub(crate) struct RayonExecutor {
    pool: ThreadPool,
}

impl RayonExecutor {
    /// `threads == None` lets rayon pick (one worker per logical CPU).
    pub(crate) fn new(threads: Option<usize>) -> Result<Self, MapError> {
        let mut builder =
            ThreadPoolBuilder::new().thread_name(|index| format!("pfmap-worker-{index}"));
        if let Some(threads) = threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build()?;
        debug!("rayon pool ready with {} workers", pool.current_num_threads());
        Ok(Self { pool })
    }
}

impl ForkJoin for RayonExecutor {
    fn fork_join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        // Inside one of our own workers this is a plain rayon::join.
        self.pool.join(a, b)
    }

    fn worker_count(&self) -> usize {
        self.pool.current_num_threads()
    }
}

/// Runs `a` then `b` on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SequentialExecutor;

impl ForkJoin for SequentialExecutor {
    fn fork_join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        let ra = a();
        let rb = b();
        (ra, rb)
    }

    fn worker_count(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn nested_sum<E: ForkJoin>(executor: &E, lo: u64, hi: u64, calls: &AtomicUsize) -> u64 {
        calls.fetch_add(1, Ordering::Relaxed);
        if hi - lo <= 1 {
            return lo;
        }
        let mid = lo + (hi - lo) / 2;
        let (l, r) = executor.fork_join(
            || nested_sum(executor, lo, mid, calls),
            || nested_sum(executor, mid, hi, calls),
        );
        l + r
    }

    #[test]
    fn sequential_runs_both_in_order() {
        let order = std::sync::Mutex::new(Vec::new());
        let (a, b) = SequentialExecutor.fork_join(
            || {
                order.lock().unwrap().push('a');
                1
            },
            || {
                order.lock().unwrap().push('b');
                "two"
            },
        );
        assert_eq!((a, b), (1, "two"));
        assert_eq!(*order.lock().unwrap(), vec!['a', 'b']);
        assert_eq!(SequentialExecutor.worker_count(), 1);
    }

    #[test]
    fn rayon_pool_honours_thread_count() {
        let executor = RayonExecutor::new(Some(3)).unwrap();
        assert_eq!(executor.worker_count(), 3);
    }

    #[test]
    fn nested_fork_join_matches_across_executors() {
        let parallel = RayonExecutor::new(Some(4)).unwrap();
        let par_calls = AtomicUsize::new(0);
        let seq_calls = AtomicUsize::new(0);

        let par = nested_sum(&parallel, 0, 1000, &par_calls);
        let seq = nested_sum(&SequentialExecutor, 0, 1000, &seq_calls);

        assert_eq!(par, (0..1000).sum::<u64>());
        assert_eq!(par, seq);
        assert_eq!(
            par_calls.load(Ordering::Relaxed),
            seq_calls.load(Ordering::Relaxed)
        );
    }
}

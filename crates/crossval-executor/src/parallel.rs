use rayon::prelude::*;

/// Whether partition cycles may run on multiple workers.
///
/// Components receive this flag instead of managing thread pools; the
/// pool itself is set up once per run by [`run_with_workers`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parallelism {
    Sequential,
    Parallel,
}

impl Parallelism {
    /// From worker-count semantics: 0 = auto, 1 = sequential, n = parallel.
    pub fn from_workers(workers: usize) -> Self {
        if workers == 1 || (workers == 0 && rayon::current_num_threads() == 1) {
            Parallelism::Sequential
        } else {
            Parallelism::Parallel
        }
    }

    pub fn is_parallel(self) -> bool {
        matches!(self, Parallelism::Parallel)
    }

    /// Map over items, in parallel when allowed, preserving input order.
    pub fn maybe_par_map<T, B, F>(self, items: &[T], f: F) -> Vec<B>
    where
        T: Sync,
        B: Send,
        F: Fn(&T) -> B + Sync + Send,
    {
        if self.is_parallel() {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }
}

/// Run `f` under the requested worker count.
///
/// 0 = the ambient rayon pool, 1 = no pool at all, n > 1 = a dedicated
/// pool of exactly n threads that lives for the duration of the call.
pub fn run_with_workers<T: Send>(
    workers: usize,
    f: impl FnOnce(Parallelism) -> T + Send,
) -> T {
    let parallelism = Parallelism::from_workers(workers);
    match parallelism {
        Parallelism::Sequential => f(Parallelism::Sequential),
        Parallelism::Parallel if workers == 0 => f(Parallelism::Parallel),
        Parallelism::Parallel => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .expect("failed to build worker pool");
            pool.install(|| f(Parallelism::Parallel))
        }
    }
}

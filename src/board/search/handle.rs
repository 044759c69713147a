//! Background search: run a [`Searcher`] on its own thread and control it
//! from the caller's thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use super::{IterationInfo, SearchLimits, SearchResults, Searcher};
use crate::board::{Evaluator, Position};

const HANDLE_STACK_SIZE: usize = 32 * 1024 * 1024;

/// A search running on a dedicated thread.
///
/// Dropping the handle without calling [`SearchHandle::join`] detaches the
/// thread; it still finishes within its limits (or when stopped).
pub struct SearchHandle<E: Evaluator + 'static> {
    stop: Arc<AtomicBool>,
    latest: Arc<Mutex<Option<IterationInfo>>>,
    thread: JoinHandle<(Searcher<E>, SearchResults)>,
}

impl<E: Evaluator + 'static> SearchHandle<E> {
    pub(crate) fn spawn(
        mut searcher: Searcher<E>,
        pos: Position,
        limits: SearchLimits,
    ) -> std::io::Result<Self> {
        let stop = searcher.stop_flag();
        stop.store(false, Ordering::Relaxed);
        let latest = Arc::clone(&searcher.latest);
        *latest.lock() = None;

        let thread = thread::Builder::new()
            .name("search-main".to_string())
            .stack_size(HANDLE_STACK_SIZE)
            .spawn(move || {
                let results = searcher.run(&pos, &limits);
                (searcher, results)
            })?;

        Ok(SearchHandle {
            stop,
            latest,
            thread,
        })
    }

    /// Ask the search to stop. It returns its best completed result soon after.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Most recent completed iteration, if any.
    #[must_use]
    pub fn latest(&self) -> Option<IterationInfo> {
        self.latest.lock().clone()
    }

    /// Wait for the search to end and return its results.
    pub fn join(self) -> SearchResults {
        self.join_with_searcher().1
    }

    /// Wait for the search and take the searcher back, keeping its
    /// transposition table and history for the next search.
    pub fn join_with_searcher(self) -> (Searcher<E>, SearchResults) {
        match self.thread.join() {
            Ok(done) => done,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

//! Fixed set of OS threads draining the [`TaskQueue`](crate::queue::TaskQueue).
use std::io;
use std::ops::AddAssign;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error};
use parking_lot::Mutex;

use crate::fetch::Fetcher;
use crate::queue::TaskQueue;
use crate::signal::CompletionSignal;
use crate::task::DownloadTask;
use crate::writer::{ensure_dir, write_file};

/// How long an idle worker sleeps before looking at the queue again.
const IDLE_POLL: Duration = Duration::from_millis(1);

/// State shared by the producer side and every worker thread.
#[derive(Debug)]
pub(crate) struct Shared {
    pub queue: TaskQueue,
    pub signal: CompletionSignal,
    pub fetcher: Fetcher,
    /// Held for the whole life of a run so two runs never share the queue.
    pub run_lock: Mutex<()>,
}

impl Shared {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            queue: TaskQueue::new(),
            signal: CompletionSignal::new(),
            fetcher,
            run_lock: Mutex::new(()),
        }
    }
}

/// Outcome of one run, as counted by the workers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Tasks whose bytes were written to their destination.
    pub downloaded: u64,
    /// Tasks dropped after a fetch or filesystem failure.
    pub failed: u64,
}

impl AddAssign for RunSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.downloaded += rhs.downloaded;
        self.failed += rhs.failed;
    }
}

#[derive(Debug, Default)]
struct Counters {
    downloaded: AtomicU64,
    failed: AtomicU64,
}

pub(crate) struct WorkerPool {
    shared: Arc<Shared>,
    handles: Vec<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl WorkerPool {
    /// Starts `workers` threads. The completion signal must already be cleared.
    ///
    /// If the OS refuses a thread, the ones already running are signaled and
    /// joined before the error is returned.
    pub fn spawn(shared: Arc<Shared>, workers: usize) -> io::Result<Self> {
        let counters = Arc::new(Counters::default());
        let mut pool = Self {
            shared,
            handles: Vec::with_capacity(workers),
            counters,
        };

        for idx in 0..workers {
            let shared = pool.shared.clone();
            let counters = pool.counters.clone();

            let spawned = thread::Builder::new()
                .name(format!("download-worker-{idx}"))
                .spawn(move || work(&shared, &counters));

            match spawned {
                Ok(handle) => pool.handles.push(handle),
                Err(error) => {
                    error!("Failed to spawn download worker {}: {}", idx, error);
                    pool.shared.signal.signal();
                    pool.join();
                    return Err(error);
                }
            }
        }

        debug!("Started {} download workers", pool.handles.len());
        Ok(pool)
    }

    /// Blocks until every worker has exited. Callers signal completion first.
    pub fn join(&mut self) -> RunSummary {
        for handle in self.handles.drain(..) {
            let name = handle.thread().name().unwrap_or("download-worker").to_string();
            if handle.join().is_err() {
                error!("{} panicked; its current task is lost", name);
                self.counters.failed.fetch_add(1, Ordering::SeqCst);
            }
        }

        RunSummary {
            downloaded: self.counters.downloaded.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
        }
    }
}

fn work(shared: &Shared, counters: &Counters) {
    loop {
        // Read before dequeuing: every enqueue happens-before the signal, so an
        // empty queue seen after this read can never be refilled.
        let producer_done = shared.signal.is_signaled();

        match shared.queue.try_dequeue() {
            Some(task) => {
                let counter = if process(&shared.fetcher, &task) {
                    &counters.downloaded
                } else {
                    &counters.failed
                };
                counter.fetch_add(1, Ordering::SeqCst);
            }
            None if producer_done => break,
            None => thread::sleep(IDLE_POLL),
        }
    }
    debug!("Download worker finished");
}

/// Runs one task to completion. Failures are logged and the task dropped.
fn process(fetcher: &Fetcher, task: &DownloadTask) -> bool {
    if let Some(dir) = task.parent_dir() {
        if let Err(error) = ensure_dir(dir) {
            error!("Dropping {}: {}", task, error);
            return false;
        }
    }

    let bytes = match fetcher.fetch(task.url()) {
        Ok(bytes) => bytes,
        Err(error) => {
            error!("Dropping {}: {}", task, error);
            return false;
        }
    };

    match write_file(task.destination(), &bytes) {
        Ok(()) => {
            debug!("Finished downloading {} successfully.", task);
            true
        }
        Err(error) => {
            error!("Dropping {}: {}", task, error);
            false
        }
    }
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::sync::Arc;

    use tempdir::TempDir;

    use super::{RunSummary, Shared, WorkerPool};
    use crate::fetch::Fetcher;
    use crate::task::DownloadTask;
    use crate::test_support::ScriptedTransport;

    fn shared_with(transport: Arc<ScriptedTransport>) -> Arc<Shared> {
        Arc::new(Shared::new(Fetcher::new(transport).max_attempts(3)))
    }

    #[test]
    fn signaled_empty_pool_exits_without_work() {
        let shared = shared_with(Arc::new(ScriptedTransport::new()));
        shared.signal.clear();

        let mut pool = WorkerPool::spawn(shared.clone(), 4).unwrap();
        shared.signal.signal();

        assert_eq!(pool.join(), RunSummary::default());
    }

    #[test]
    fn drains_tasks_queued_before_the_signal() {
        let dir = TempDir::new("pool").unwrap();
        let transport = Arc::new(ScriptedTransport::new());
        let shared = shared_with(transport.clone());

        for i in 0..64 {
            let url = format!("http://x/{i}.jpg");
            transport.serve(&url, format!("body {i}").as_bytes());
            shared
                .queue
                .enqueue(DownloadTask::new(url, dir.path().join(format!("{i}.jpg"))));
        }

        // Signaled before the workers even start: they must still drain everything.
        shared.signal.signal();
        let summary = WorkerPool::spawn(shared.clone(), 4).unwrap().join();

        assert_eq!(summary.downloaded, 64);
        assert!(shared.queue.is_empty());
        for i in 0..64 {
            let url = format!("http://x/{i}.jpg");
            assert_eq!(transport.calls(&url), 1);
            assert_eq!(
                fs::read(dir.path().join(format!("{i}.jpg"))).unwrap(),
                format!("body {i}").as_bytes()
            );
        }
    }

    #[test]
    fn failed_fetch_drops_task_without_writing() {
        let dir = TempDir::new("pool").unwrap();
        let shared = shared_with(Arc::new(ScriptedTransport::new()));
        let dest = dir.path().join("never/written.jpg");

        shared
            .queue
            .enqueue(DownloadTask::new("http://x/unreachable.jpg", &dest));
        shared.signal.signal();

        let summary = WorkerPool::spawn(shared, 2).unwrap().join();

        assert_eq!(summary, RunSummary { downloaded: 0, failed: 1 });
        assert!(!dest.exists());
    }

    #[test]
    fn filesystem_failure_only_drops_that_task() {
        let dir = TempDir::new("pool").unwrap();
        let transport = Arc::new(ScriptedTransport::new());
        transport.serve("http://x/blocked.jpg", b"never lands");
        transport.serve("http://x/good.jpg", b"good payload");
        let shared = shared_with(transport.clone());

        // A plain file where the task needs a directory.
        fs::write(dir.path().join("blocker"), b"").unwrap();

        shared.queue.enqueue(DownloadTask::new(
            "http://x/blocked.jpg",
            dir.path().join("blocker/child/x.jpg"),
        ));
        shared
            .queue
            .enqueue(DownloadTask::new("http://x/good.jpg", dir.path().join("good.jpg")));
        shared.signal.signal();

        let summary = WorkerPool::spawn(shared.clone(), 1).unwrap().join();

        assert_eq!(summary, RunSummary { downloaded: 1, failed: 1 });
        assert_eq!(fs::read(dir.path().join("good.jpg")).unwrap(), b"good payload");
        assert_eq!(transport.calls("http://x/blocked.jpg"), 0);
        assert!(shared.queue.is_empty());
    }
}

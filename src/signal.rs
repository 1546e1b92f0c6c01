use std::sync::atomic::{AtomicBool, Ordering};

/// One-shot "no more tasks this run" flag, reset at the start of every run.
///
/// Setting the flag is a release store and reading it an acquire load, so a worker
/// that sees it set also sees every task enqueued before it was set.
#[derive(Debug, Default)]
pub struct CompletionSignal {
    done: AtomicBool,
}

impl CompletionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Must not be called while workers of a previous run are still alive.
    pub fn clear(&self) {
        self.done.store(false, Ordering::Release);
    }

    pub fn signal(&self) {
        self.done.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_signaled(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod test {
    use super::CompletionSignal;

    #[test]
    fn signal_is_idempotent_and_resettable() {
        let signal = CompletionSignal::new();
        assert!(!signal.is_signaled());

        signal.signal();
        signal.signal();
        assert!(signal.is_signaled());

        signal.clear();
        assert!(!signal.is_signaled());
    }
}

/// UI-thread dispatcher
///
/// The mediator never marshals between threads. Code that may run off the UI
/// thread checks [`UiDispatcher::is_ui_thread`] and posts its work here; the
/// UI loop runs queued tasks with [`UiDispatcher::drain`].
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::thread::{self, ThreadId};

/// Unit of work queued for the UI thread
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

#[derive(Clone)]
pub struct UiDispatcher {
    owner: ThreadId,
    task_tx: Sender<UiTask>,
    task_rx: Receiver<UiTask>,
}

impl UiDispatcher {
    /// Create a dispatcher owned by the calling thread
    pub fn new() -> Self {
        let (tx, rx) = unbounded();

        Self {
            owner: thread::current().id(),
            task_tx: tx,
            task_rx: rx,
        }
    }

    pub fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Queue a task for the next drain
    pub fn post<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        // The receiver lives as long as any clone of self, so send cannot fail here.
        let _ = self.task_tx.send(Box::new(task));
    }

    /// Run the task now when on the UI thread, otherwise queue it.
    /// Returns `true` if the task already ran.
    pub fn run_or_post<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_ui_thread() {
            task();
            true
        } else {
            self.post(task);
            false
        }
    }

    /// Run the tasks queued so far. Tasks posted while draining wait for the
    /// next call. Returns the number of tasks run.
    pub fn drain(&self) -> usize {
        if !self.is_ui_thread() {
            tracing::warn!("UiDispatcher::drain called off the UI thread, ignoring");
            return 0;
        }

        let queued = self.task_rx.len();
        let mut ran = 0;

        while ran < queued {
            match self.task_rx.try_recv() {
                Ok(task) => {
                    task();
                    ran += 1;
                }
                Err(_) => break,
            }
        }

        if ran > 0 {
            tracing::trace!(ran, "Drained UI tasks");
        }
        ran
    }

    pub fn pending(&self) -> usize {
        self.task_rx.len()
    }
}

impl Default for UiDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_run_or_post_on_ui_thread_runs_inline() {
        let dispatcher = UiDispatcher::new();
        let ran = Arc::new(Mutex::new(false));

        let flag = Arc::clone(&ran);
        assert!(dispatcher.run_or_post(move || *flag.lock() = true));
        assert!(*ran.lock());
        assert_eq!(dispatcher.pending(), 0);
    }

    #[test]
    fn test_off_thread_work_is_marshaled() {
        let dispatcher = UiDispatcher::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let remote = dispatcher.clone();
        let remote_log = Arc::clone(&log);
        thread::spawn(move || {
            assert!(!remote.is_ui_thread());
            let ran = remote.run_or_post(move || remote_log.lock().push(thread::current().id()));
            assert!(!ran);
        })
        .join()
        .unwrap();

        assert!(log.lock().is_empty());
        assert_eq!(dispatcher.drain(), 1);
        assert_eq!(*log.lock(), vec![thread::current().id()]);
    }

    #[test]
    fn test_drain_off_thread_is_ignored() {
        let dispatcher = UiDispatcher::new();
        dispatcher.post(|| {});

        let remote = dispatcher.clone();
        let drained = thread::spawn(move || remote.drain()).join().unwrap();
        assert_eq!(drained, 0);
        assert_eq!(dispatcher.pending(), 1);
    }

    #[test]
    fn test_tasks_posted_during_drain_wait() {
        let dispatcher = UiDispatcher::new();
        let inner = dispatcher.clone();
        dispatcher.post(move || inner.post(|| {}));

        assert_eq!(dispatcher.drain(), 1);
        assert_eq!(dispatcher.pending(), 1);
        assert_eq!(dispatcher.drain(), 1);
    }
}

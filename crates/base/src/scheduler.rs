use tokio::sync::mpsc;

/// A unit of work posted onto an execution context.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Somewhere to run callbacks that must not run on a background thread.
///
/// Implementations decide which thread eventually runs a posted task; callers
/// only rely on tasks from one poster running in the order they were posted.
pub trait ExecutionContext: Send + Sync {
    fn post(&self, task: Task);
}

/// Single-threaded execution context owned by the caller.
///
/// Background threads post tasks through a [`SchedulerHandle`]; nothing runs
/// until the owning thread calls [`update`](Scheduler::update), which drains
/// the queue in posting order on the calling thread.
pub struct Scheduler {
    sender: mpsc::UnboundedSender<Task>,
    receiver: mpsc::UnboundedReceiver<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }

    /// Cloneable, thread-safe handle for posting work onto this scheduler.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            sender: self.sender.clone(),
        }
    }

    /// Run every task queued so far. Returns how many ran.
    ///
    /// Tasks posted by the tasks themselves are picked up in the same call.
    pub fn update(&mut self) -> usize {
        let mut count = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task();
            count += 1;
        }
        count
    }

    /// Number of tasks waiting for the next [`update`](Scheduler::update).
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContext for Scheduler {
    fn post(&self, task: Task) {
        // the receiver lives in self, so the channel cannot be closed here
        let _ = self.sender.send(task);
    }
}

#[derive(Clone)]
pub struct SchedulerHandle {
    sender: mpsc::UnboundedSender<Task>,
}

impl ExecutionContext for SchedulerHandle {
    fn post(&self, task: Task) {
        if self.sender.send(task).is_err() {
            log::debug!("scheduler dropped, discarding posted task");
        }
    }
}

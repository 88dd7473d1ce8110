use tokio::task::JoinHandle;

/// Tracks the background tasks bound to one transport (reader, heartbeat)
pub struct TaskManager {
    handles: Vec<JoinHandle<()>>,
}

impl TaskManager {
    /// Create a new empty task manager
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Spawn a task and track it
    pub fn spawn<F>(&mut self, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.handles.retain(|handle| !handle.is_finished());
        let handle = tokio::spawn(future);
        self.handles.push(handle);
    }

    /// Abort all tasks without waiting
    ///
    /// Must not be called from inside one of the tracked tasks: the caller
    /// would be cancelled at its next await point.
    pub fn abort_all(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
        self.handles.clear();
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}

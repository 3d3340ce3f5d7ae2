/// Repeating task run once per rendered frame.
///
/// The host polls the task when it is about to paint. While the task is
/// active, each run schedules the next one. Cancelling doesn't revoke the
/// frame already scheduled: it runs one last time and is not rescheduled.
#[derive(Debug, Default)]
pub struct FrameTask {
    is_active: bool,
    is_scheduled: bool,
}

impl FrameTask {
    pub fn start(&mut self) {
        self.is_active = true;
        self.is_scheduled = true;
    }

    pub fn cancel(&mut self) {
        self.is_active = false;
    }

    /// Whether the host must render another frame for this task.
    pub fn is_scheduled(&self) -> bool {
        self.is_scheduled
    }

    /// Consumes the scheduled run, if any, and reschedules while active.
    ///
    /// Returns `true` if the task body must run for this frame.
    pub fn poll(&mut self) -> bool {
        if !self.is_scheduled {
            return false;
        }

        self.is_scheduled = self.is_active;

        true
    }
}

#[cfg(test)]
mod tests {
    use super::FrameTask;

    #[test]
    fn idle() {
        let mut task = FrameTask::default();
        assert!(!task.is_scheduled());
        assert!(!task.poll());
    }

    #[test]
    fn repeats_while_active() {
        let mut task = FrameTask::default();
        task.start();

        for _ in 0..3 {
            assert!(task.poll());
            assert!(task.is_scheduled());
        }
    }

    #[test]
    fn last_run_after_cancel() {
        let mut task = FrameTask::default();
        task.start();
        assert!(task.poll());

        task.cancel();
        assert!(task.is_scheduled());

        assert!(task.poll());
        assert!(!task.is_scheduled());
        assert!(!task.poll());
    }

    #[test]
    fn restart_before_last_run() {
        let mut task = FrameTask::default();
        task.start();
        task.cancel();
        task.start();

        assert!(task.poll());
        assert!(task.poll());
    }
}

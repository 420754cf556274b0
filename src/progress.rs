//! Progress reporting for long running analyses
//!
//! The enrichment analysis advances a [`ProgressReporter`] once for every
//! enrichment class it processes. Reporters are passive: they are called
//! synchronously and cannot cancel the analysis.

use tracing::info;

/// A sink for progress updates
pub trait ProgressReporter {
    /// Resets the reporter to start a new task
    fn reset(&mut self);

    /// Sets the number of steps of the current task
    fn set_total_calls(&mut self, total: usize);

    /// Marks one step as done
    fn advance(&mut self);
}

/// Emits an `info` event every time another 10 percent of a task are done
///
/// # Examples
///
/// ```
/// use integrator::progress::{LoggingProgress, ProgressReporter};
///
/// let mut progress = LoggingProgress::new("Pathway enrichment");
/// progress.set_total_calls(4);
/// progress.advance();
/// progress.advance();
/// assert_eq!(progress.done(), 2);
/// assert_eq!(progress.percent(), 50);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LoggingProgress {
    task: String,
    total: usize,
    done: usize,
    last_reported: usize,
}

impl LoggingProgress {
    /// Creates a new reporter, `task` is used in the log messages
    pub fn new(task: &str) -> Self {
        Self {
            task: task.to_string(),
            ..Default::default()
        }
    }

    /// The number of steps done so far
    pub fn done(&self) -> usize {
        self.done
    }

    /// The number of steps of the task
    pub fn total(&self) -> usize {
        self.total
    }

    /// The finished part of the task, in percent
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            return 100;
        }
        (self.done.min(self.total) * 100) / self.total
    }
}

impl ProgressReporter for LoggingProgress {
    fn reset(&mut self) {
        self.total = 0;
        self.done = 0;
        self.last_reported = 0;
    }

    fn set_total_calls(&mut self, total: usize) {
        self.total = total;
    }

    fn advance(&mut self) {
        self.done += 1;
        let percent = self.percent();
        if percent >= self.last_reported + 10 {
            self.last_reported = percent - percent % 10;
            info!("{}: {}% ({}/{})", self.task, percent, self.done, self.total);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn advance_and_reset() {
        let mut progress = LoggingProgress::new("test");
        progress.set_total_calls(3);
        assert_eq!(progress.percent(), 0);
        progress.advance();
        assert_eq!(progress.percent(), 33);
        progress.advance();
        progress.advance();
        assert_eq!(progress.percent(), 100);
        assert_eq!(progress.done(), 3);

        // more calls than expected must not overflow the percentage
        progress.advance();
        assert_eq!(progress.percent(), 100);

        progress.reset();
        assert_eq!(progress.done(), 0);
        assert_eq!(progress.total(), 0);
    }

    #[test]
    fn empty_task_is_complete() {
        let progress = LoggingProgress::new("empty");
        assert_eq!(progress.percent(), 100);
    }
}

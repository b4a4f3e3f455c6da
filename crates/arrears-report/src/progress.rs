//! `[n/N]` step reporting for the master pipeline

use tracing::info;

/// Counts pipeline steps and logs each one as `[n/N] message`
#[derive(Debug, Clone)]
pub struct Progress {
    step: usize,
    total: usize,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self { step: 0, total }
    }

    /// Step count for a run: eleven fixed steps plus the optional ones
    pub fn for_run(drop_empty: bool, keep_other: bool) -> Self {
        Self::new(11 + usize::from(drop_empty) + usize::from(!keep_other))
    }

    /// Advance and log; returns the new step number
    pub fn step(&mut self, message: impl AsRef<str>) -> usize {
        self.step += 1;
        info!("[{}/{}] {}", self.step, self.total, message.as_ref());
        self.step
    }

    pub fn current(&self) -> usize {
        self.step
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_totals() {
        assert_eq!(Progress::for_run(false, true).total(), 11);
        assert_eq!(Progress::for_run(true, false).total(), 13);

        let mut progress = Progress::new(2);
        assert_eq!(progress.step("load"), 1);
        assert_eq!(progress.step("save"), 2);
        assert_eq!(progress.current(), progress.total());
    }
}

use std::time::Duration;

/// "Starting in N" screen shown before a drill begins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntroCountdown {
    total: Duration,
    elapsed: Duration,
    fired: bool,
}

impl IntroCountdown {
    pub fn new(secs: u32) -> Self {
        Self {
            total: Duration::from_secs(secs as u64),
            elapsed: Duration::ZERO,
            fired: false,
        }
    }

    /// Whole seconds still to go, rounded up
    pub fn remaining_secs(&self) -> u32 {
        let left = self.total.saturating_sub(self.elapsed);
        let secs = left.as_secs() + u64::from(left.subsec_nanos() > 0);
        secs as u32
    }

    pub fn is_done(&self) -> bool {
        self.fired
    }

    /// Returns `true` exactly once, on the advance that runs the clock out
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.fired {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= self.total {
            self.fired = true;
            return true;
        }
        false
    }
}

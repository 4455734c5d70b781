use std::collections::HashMap;
use std::time::{Duration, SystemTime};

/// Capability interface for per-identity usage limits.
///
/// Injected by the caller so the transcription pipeline never touches
/// persistence; how identities map to people (IP, session, account) is the
/// caller's concern.
pub trait QuotaChecker: Send {
    fn allowed(&mut self, identity: &str) -> bool;
    fn record_usage(&mut self, identity: &str);
}

type Clock = Box<dyn Fn() -> SystemTime + Send>;

/// In-memory per-identity counter with a rolling reset window.
///
/// A counter older than the window is treated as fresh on the next check, so
/// limits recover without a background sweep.
pub struct FixedWindowQuota {
    max_runs: u32,
    window: Duration,
    counters: HashMap<String, WindowCounter>,
    clock: Clock,
}

struct WindowCounter {
    runs: u32,
    reset_at: SystemTime,
}

impl FixedWindowQuota {
    pub fn new(max_runs: u32, window: Duration) -> Self {
        Self::with_clock(max_runs, window, Box::new(SystemTime::now))
    }

    /// Injectable clock so window expiry is testable without sleeping.
    pub fn with_clock(max_runs: u32, window: Duration, clock: Clock) -> Self {
        Self {
            max_runs,
            window,
            counters: HashMap::new(),
            clock,
        }
    }

    pub fn runs_for(&self, identity: &str) -> (u32, u32) {
        let now = (self.clock)();
        let runs = match self.counters.get(identity) {
            Some(counter) if now <= counter.reset_at => counter.runs,
            _ => 0,
        };
        (runs, self.max_runs)
    }
}

impl QuotaChecker for FixedWindowQuota {
    fn allowed(&mut self, identity: &str) -> bool {
        let (runs, max) = self.runs_for(identity);
        runs < max
    }

    fn record_usage(&mut self, identity: &str) {
        let now = (self.clock)();
        let counter = self
            .counters
            .entry(identity.to_string())
            .or_insert(WindowCounter {
                runs: 0,
                reset_at: now + self.window,
            });

        if now > counter.reset_at {
            counter.runs = 1;
            counter.reset_at = now + self.window;
        } else {
            counter.runs += 1;
        }
    }
}

//! Recording delay source

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;

#[derive(Debug, Default)]
struct DelayLog {
    count: u32,
    total_ns: u64,
}

/// Delay source that records waits instead of sleeping
///
/// Clones share the same log, so a test can keep one handle while the
/// bus master owns another.
#[derive(Debug, Clone, Default)]
pub struct SimDelay {
    log: Rc<RefCell<DelayLog>>,
}

impl SimDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of individual waits recorded
    pub fn count(&self) -> u32 {
        self.log.borrow().count
    }

    /// Sum of all requested wait durations in nanoseconds
    pub fn total_ns(&self) -> u64 {
        self.log.borrow().total_ns
    }

    /// Forget everything recorded so far
    pub fn reset(&self) {
        *self.log.borrow_mut() = DelayLog::default();
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        let mut log = self.log.borrow_mut();
        log.count += 1;
        log.total_ns += u64::from(ns);
    }
}

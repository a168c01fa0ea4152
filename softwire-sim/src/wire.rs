//! The simulated pair of bus lines

use std::cell::RefCell;
use std::rc::Rc;

use softwire_hal::gpio::{Edge, FlexPin, Level, Pull};

use crate::slave::SlaveCore;

/// Which of the two lines a pin handle controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Line {
    Scl,
    Sda,
}

/// Master-side drive state of one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drive {
    /// Input: the pull-up wins unless the slave drives low
    Released,
    Low,
    High,
}

/// Injected pin failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimPinError;

pub(crate) struct BusCore {
    scl_drive: Drive,
    sda_drive: Drive,
    pub(crate) slave: Option<SlaveCore>,
    /// Current wire levels as (sda, scl)
    levels: (Level, Level),
    /// Every distinct (sda, scl) state, initial state included
    log: Vec<(Level, Level)>,
    fail_next_op: bool,
}

impl BusCore {
    fn level_of(&self, line: Line) -> Level {
        let (drive, slave_low) = match line {
            Line::Scl => (
                self.scl_drive,
                self.slave.as_ref().is_some_and(|s| s.drive_scl_low),
            ),
            Line::Sda => (
                self.sda_drive,
                self.slave.as_ref().is_some_and(|s| s.drive_sda_low),
            ),
        };
        match drive {
            // Wired-AND: anyone driving low wins
            Drive::Low => Level::Low,
            Drive::High => {
                if slave_low {
                    Level::Low
                } else {
                    Level::High
                }
            }
            Drive::Released => {
                if slave_low {
                    Level::Low
                } else {
                    Level::High
                }
            }
        }
    }

    /// Recompute wire levels and feed resulting edges to the slave until
    /// nothing changes anymore
    ///
    /// The slave's edge handler may change its own drives, which is why
    /// this loops; the protocol guarantees it settles within a couple of
    /// iterations.
    pub(crate) fn settle(&mut self) {
        for _ in 0..8 {
            let new = (self.level_of(Line::Sda), self.level_of(Line::Scl));
            if new == self.levels {
                return;
            }
            let prev = self.levels;
            self.levels = new;
            self.log.push(new);
            if let Some(slave) = self.slave.as_mut() {
                slave.on_edge(prev, new);
            }
        }
        unreachable!("bus failed to settle");
    }

    fn check_fail(&mut self) -> Result<(), SimPinError> {
        if self.fail_next_op {
            self.fail_next_op = false;
            return Err(SimPinError);
        }
        Ok(())
    }

    fn set_drive(&mut self, line: Line, drive: Drive) {
        match line {
            Line::Scl => self.scl_drive = drive,
            Line::Sda => self.sda_drive = drive,
        }
        self.settle();
    }

    fn read_line(&mut self, line: Line) -> Level {
        let level = self.level_of(line);
        // A stretching slave releases the clock after the master has
        // polled it the configured number of times.
        if line == Line::Scl {
            if let Some(slave) = self.slave.as_mut() {
                if slave.drive_scl_low && slave.stretch_remaining > 0 {
                    slave.stretch_remaining -= 1;
                    if slave.stretch_remaining == 0 {
                        slave.drive_scl_low = false;
                        self.settle();
                    }
                }
            }
        }
        level
    }
}

/// A simulated open-drain bus with two lines and at most one slave
///
/// Hand [`SimBus::scl_pin`] and [`SimBus::sda_pin`] to the bus master
/// under test; keep the `SimBus` handle around for assertions on wire
/// state and the transition log.
pub struct SimBus {
    pub(crate) core: Rc<RefCell<BusCore>>,
}

impl SimBus {
    pub fn new() -> Self {
        let levels = (Level::High, Level::High);
        Self {
            core: Rc::new(RefCell::new(BusCore {
                scl_drive: Drive::Released,
                sda_drive: Drive::Released,
                slave: None,
                levels,
                log: vec![levels],
                fail_next_op: false,
            })),
        }
    }

    pub fn scl_pin(&self) -> SimPin {
        SimPin {
            core: Rc::clone(&self.core),
            line: Line::Scl,
        }
    }

    pub fn sda_pin(&self) -> SimPin {
        SimPin {
            core: Rc::clone(&self.core),
            line: Line::Sda,
        }
    }

    /// Current wire levels as (sda, scl)
    pub fn levels(&self) -> (Level, Level) {
        let core = self.core.borrow();
        (core.level_of(Line::Sda), core.level_of(Line::Scl))
    }

    /// Every distinct (sda, scl) state the bus has been in, in order,
    /// starting with the initial idle state
    pub fn transitions(&self) -> Vec<(Level, Level)> {
        self.core.borrow().log.clone()
    }

    /// Drop the recorded transitions, keeping the current state as the
    /// new first entry
    pub fn clear_transitions(&self) {
        let mut core = self.core.borrow_mut();
        let current = core.levels;
        core.log = vec![current];
    }

    /// Make the next pin operation (any line, any direction) fail once
    pub fn fail_next_pin_op(&self) {
        self.core.borrow_mut().fail_next_op = true;
    }
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to one simulated line, implementing the pin capability
pub struct SimPin {
    core: Rc<RefCell<BusCore>>,
    line: Line,
}

impl FlexPin for SimPin {
    type Error = SimPinError;

    fn set_input(&mut self, _pull: Pull, _edge: Edge) -> Result<(), SimPinError> {
        let mut core = self.core.borrow_mut();
        core.check_fail()?;
        core.set_drive(self.line, Drive::Released);
        Ok(())
    }

    fn set_output(&mut self, level: Level) -> Result<(), SimPinError> {
        let mut core = self.core.borrow_mut();
        core.check_fail()?;
        let drive = match level {
            Level::Low => Drive::Low,
            Level::High => Drive::High,
        };
        core.set_drive(self.line, drive);
        Ok(())
    }

    fn read(&mut self) -> Result<Level, SimPinError> {
        let mut core = self.core.borrow_mut();
        core.check_fail()?;
        Ok(core.read_line(self.line))
    }
}

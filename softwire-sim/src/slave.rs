//! Register-model I2C slave
//!
//! Decodes the wire exactly as a hardware slave does: start and stop
//! conditions from SDA edges while SCL is high, data bits on SCL rising
//! edges, and its own outputs updated on SCL falling edges. The device
//! model is a 256-byte register file behind a pointer register: the
//! first payload byte of a write selects the register, further bytes
//! store through the pointer (post-incrementing), and reads serve the
//! register the pointer selects.
//!
//! Reads are served one byte per addressing; masters that always
//! acknowledge read bytes must terminate with a stop condition, which
//! this slave honors by releasing both lines.

use std::cell::RefCell;
use std::rc::Rc;

use softwire_hal::gpio::Level;

use crate::wire::{BusCore, SimBus};

/// When the slave acknowledges bytes written to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckPolicy {
    /// Acknowledge every byte (default)
    Always,
    /// Acknowledge nothing, as if the device were absent or busy
    Never,
    /// Acknowledge the first `n` bytes of each transaction (the address
    /// byte counts), then NACK
    FirstBytes(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No transaction in progress
    Idle,
    /// Clocking in bits from the master
    Receive,
    /// Driving (or not driving) the acknowledge bit
    AckWindow,
    /// Clocking out bits to the master
    Transmit,
    /// The master drives the acknowledge of a byte we transmitted
    TxAckWindow,
    /// Ignore everything until the next start or stop condition
    AwaitStart,
}

pub(crate) struct SlaveCore {
    address: u8,
    registers: [u8; 256],
    pointer: u8,
    written: Vec<u8>,
    ack_policy: AckPolicy,
    promiscuous: bool,
    stretch_polls: u32,
    pub(crate) stretch_remaining: u32,
    pub(crate) drive_sda_low: bool,
    pub(crate) drive_scl_low: bool,
    state: State,
    shift: u8,
    bits: u8,
    expecting_address: bool,
    reading: bool,
    first_data_byte: bool,
    acked_this_txn: usize,
    last_ack: bool,
    tx_shift: u8,
    tx_bits: u8,
}

impl SlaveCore {
    fn new(address: u8) -> Self {
        Self {
            address,
            registers: [0; 256],
            pointer: 0,
            written: Vec::new(),
            ack_policy: AckPolicy::Always,
            promiscuous: false,
            stretch_polls: 0,
            stretch_remaining: 0,
            drive_sda_low: false,
            drive_scl_low: false,
            state: State::Idle,
            shift: 0,
            bits: 0,
            expecting_address: true,
            reading: false,
            first_data_byte: false,
            acked_this_txn: 0,
            last_ack: false,
            tx_shift: 0,
            tx_bits: 0,
        }
    }

    /// React to one wire transition; levels are (sda, scl)
    pub(crate) fn on_edge(&mut self, prev: (Level, Level), new: (Level, Level)) {
        let (sda0, scl0) = prev;
        let (sda1, scl1) = new;

        if scl0 == Level::High && scl1 == Level::High {
            if sda0 == Level::High && sda1 == Level::Low {
                self.on_start();
            } else if sda0 == Level::Low && sda1 == Level::High {
                self.on_stop();
            }
            return;
        }

        if scl0 == Level::Low && scl1 == Level::High {
            self.on_scl_rising(sda1);
        } else if scl0 == Level::High && scl1 == Level::Low {
            self.on_scl_falling();
        }
        // SDA edges while SCL is low carry no meaning.
    }

    /// Start (or repeated start): begin a fresh byte, address first
    fn on_start(&mut self) {
        self.state = State::Receive;
        self.shift = 0;
        self.bits = 0;
        self.expecting_address = true;
        self.reading = false;
        self.acked_this_txn = 0;
        self.drive_sda_low = false;
        self.drive_scl_low = false;
        self.stretch_remaining = 0;
    }

    fn on_stop(&mut self) {
        self.state = State::Idle;
        self.drive_sda_low = false;
        self.drive_scl_low = false;
        self.stretch_remaining = 0;
    }

    fn on_scl_rising(&mut self, sda: Level) {
        if self.state == State::Receive {
            self.shift = self.shift << 1 | (sda == Level::High) as u8;
            self.bits += 1;
        }
    }

    fn on_scl_falling(&mut self) {
        match self.state {
            State::Receive if self.bits == 8 => {
                self.bits = 0;
                self.process_byte();
            }
            State::AckWindow => {
                // End of the 9th clock; let go of SDA and move on.
                self.drive_sda_low = false;
                if !self.last_ack {
                    self.state = State::AwaitStart;
                } else if self.reading {
                    self.begin_transmit();
                } else {
                    self.state = State::Receive;
                    self.shift = 0;
                }
            }
            State::Transmit => {
                self.tx_bits += 1;
                if self.tx_bits == 8 {
                    // Byte is out; the master owns the acknowledge bit.
                    self.drive_sda_low = false;
                    self.state = State::TxAckWindow;
                } else {
                    self.drive_tx_bit();
                }
            }
            State::TxAckWindow => {
                // The master acknowledged (it always does, see the
                // engine's read path) and will stop next; release and
                // wait rather than fight the stop condition.
                self.drive_sda_low = false;
                self.state = State::AwaitStart;
            }
            _ => {}
        }
    }

    fn process_byte(&mut self) {
        let byte = self.shift;
        self.shift = 0;

        if self.promiscuous {
            // No address decode: every byte is payload.
            self.written.push(byte);
            let ack = self.policy_allows();
            self.enter_ack(ack);
            return;
        }

        if self.expecting_address {
            self.expecting_address = false;
            let matched = byte >> 1 == self.address;
            self.reading = byte & 1 == 1;
            if matched {
                self.first_data_byte = !self.reading;
            }
            self.enter_ack(matched && self.policy_allows());
            return;
        }

        // Data byte in write direction.
        self.written.push(byte);
        if self.first_data_byte {
            self.pointer = byte;
            self.first_data_byte = false;
        } else {
            self.registers[self.pointer as usize] = byte;
            self.pointer = self.pointer.wrapping_add(1);
        }
        let ack = self.policy_allows();
        self.enter_ack(ack);
    }

    fn policy_allows(&self) -> bool {
        match self.ack_policy {
            AckPolicy::Always => true,
            AckPolicy::Never => false,
            AckPolicy::FirstBytes(n) => self.acked_this_txn < n,
        }
    }

    fn enter_ack(&mut self, ack: bool) {
        self.state = State::AckWindow;
        self.last_ack = ack;
        self.drive_sda_low = ack;
        if ack {
            self.acked_this_txn += 1;
            if self.stretch_polls > 0 {
                self.drive_scl_low = true;
                self.stretch_remaining = self.stretch_polls;
            }
        }
    }

    fn begin_transmit(&mut self) {
        self.state = State::Transmit;
        self.tx_shift = self.registers[self.pointer as usize];
        self.tx_bits = 0;
        self.drive_tx_bit();
    }

    fn drive_tx_bit(&mut self) {
        let bit = self.tx_shift & (1 << (7 - self.tx_bits)) != 0;
        self.drive_sda_low = !bit;
    }
}

/// Handle to the slave attached to a [`SimBus`]
///
/// Configuration and inspection go through this handle; the slave's
/// protocol behavior runs inside the master's pin operations.
pub struct SimSlave {
    core: Rc<RefCell<BusCore>>,
}

impl SimSlave {
    /// Attach a register-model slave with the given 7-bit address
    pub fn attach(bus: &SimBus, address: u8) -> Self {
        let core = Rc::clone(&bus.core);
        core.borrow_mut().slave = Some(SlaveCore::new(address));
        Self { core }
    }

    fn with<R>(&self, f: impl FnOnce(&mut SlaveCore) -> R) -> R {
        let mut core = self.core.borrow_mut();
        let slave = core.slave.as_mut().expect("no slave attached");
        f(slave)
    }

    /// Preload a register value
    pub fn set_register(&self, register: u8, value: u8) {
        self.with(|s| s.registers[register as usize] = value);
    }

    /// Current value of a register
    pub fn register(&self, register: u8) -> u8 {
        self.with(|s| s.registers[register as usize])
    }

    /// All payload bytes the slave has clocked in, across transactions
    pub fn written(&self) -> Vec<u8> {
        self.with(|s| s.written.clone())
    }

    pub fn set_ack_policy(&self, policy: AckPolicy) {
        self.with(|s| s.ack_policy = policy);
    }

    /// Acknowledge and record every byte without decoding an address
    ///
    /// Useful against masters that send raw, unframed payloads.
    pub fn set_promiscuous(&self, on: bool) {
        self.with(|s| s.promiscuous = on);
    }

    /// Hold the clock low for `polls` master polls before every
    /// acknowledge bit
    pub fn set_clock_stretch(&self, polls: u32) {
        self.with(|s| s.stretch_polls = polls);
    }
}

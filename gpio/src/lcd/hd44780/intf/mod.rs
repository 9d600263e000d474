//! HD44780 bus protocol.
//!
//! [ControllerInterface] owns a port and a delay, and runs the controller's write cycles,
//! read cycles, busy flag polling and power-on initialization. The bus width is chosen once in
//! [ControllerInterface::init] and selects between the 8-bit and the 4-bit cycles for the rest of
//! the session.
//!
//! The busy flag poll is the only operation that can fail on its own, with
//! [LcdError::Timeout](crate::lcd::LcdError::Timeout). It is bounded by a number of reads, not by time.

mod bus4;
mod bus8;

use crate::lcd::LcdResult;
use crate::lcd::hd44780::Controller;
use crate::lcd::port::{BusWidth, LcdPort};
use embedded_hal::delay::DelayNs;
use log::debug;
use std::fmt::Debug;

/// Timing and polling parameters of the protocol.
///
/// The delays are the datasheet minimums after each of the two blind function set instructions
/// of the power-on sequence, when the busy flag cannot be trusted yet.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct InterfaceConfig {
    /// Number of busy flag samples before giving up.
    pub busy_poll_limit: u32,
    /// Wait after the first function set instruction, in microseconds.
    pub first_function_set_delay_us: u32,
    /// Wait after the second function set instruction, in microseconds.
    pub second_function_set_delay_us: u32,
}

impl InterfaceConfig {
    pub const DEFAULT_BUSY_POLL_LIMIT: u32 = 4000;
    pub const DEFAULT_FIRST_FUNCTION_SET_DELAY_US: u32 = 39;
    pub const DEFAULT_SECOND_FUNCTION_SET_DELAY_US: u32 = 37;

    pub fn with_busy_poll_limit(mut self, busy_poll_limit: u32) -> Self {
        self.busy_poll_limit = busy_poll_limit;
        self
    }

    pub fn with_function_set_delays_us(mut self, first: u32, second: u32) -> Self {
        self.first_function_set_delay_us = first;
        self.second_function_set_delay_us = second;
        self
    }
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        InterfaceConfig {
            busy_poll_limit: Self::DEFAULT_BUSY_POLL_LIMIT,
            first_function_set_delay_us: Self::DEFAULT_FIRST_FUNCTION_SET_DELAY_US,
            second_function_set_delay_us: Self::DEFAULT_SECOND_FUNCTION_SET_DELAY_US,
        }
    }
}

/// A session with one HD44780 controller on one port.
///
/// The session does no locking. Sharing a display between threads needs a lock around the
/// whole session (or the [LcdDisplay](crate::lcd::hd44780::display::LcdDisplay) wrapping it).
#[derive(Debug)]
pub struct ControllerInterface<P, D> {
    port: P,
    delay: D,
    width: BusWidth,
    config: InterfaceConfig,
}

impl<P: LcdPort, D: DelayNs> ControllerInterface<P, D> {
    /// Initializes the port for the given bus width and binds the matching protocol.
    ///
    /// This does not talk to the controller yet, see [Self::initialize_controller].
    pub fn init(mut port: P, delay: D, width: BusWidth, config: InterfaceConfig) -> LcdResult<Self> {
        debug!("Initializing {:?} for a {}-bit bus", port, width.bits());
        port.init(width)?;
        Ok(ControllerInterface {
            port,
            delay,
            width,
            config,
        })
    }

    /// Releases the port lines and gives back the port and the delay.
    pub fn deinit(mut self) -> LcdResult<(P, D)> {
        debug!("Deinitializing {:?}", self.port);
        self.port.deinit()?;
        Ok((self.port, self.delay))
    }

    pub fn port_data_width(&self) -> BusWidth {
        self.width
    }

    pub fn config(&self) -> &InterfaceConfig {
        &self.config
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Runs the datasheet power-on sequence for the bound bus width.
    ///
    /// Two function set instructions are sent blind, separated by fixed delays, because the
    /// busy flag is not readable yet. Display on, clear and entry mode follow, each checked with
    /// a busy flag poll. The first poll that times out aborts the sequence and its error is returned.
    pub fn initialize_controller(&mut self) -> LcdResult<()> {
        match self.width {
            BusWidth::EightBit => bus8::initialize(&mut self.port, &mut self.delay, &self.config),
            BusWidth::FourBit => bus4::initialize(&mut self.port, &mut self.delay, &self.config),
        }
    }
}

impl<P: LcdPort, D: DelayNs + Debug> Controller for ControllerInterface<P, D> {
    fn write_instruction(&mut self, instruction: u8) -> LcdResult<()> {
        match self.width {
            BusWidth::EightBit => bus8::write(&mut self.port, instruction, false)?,
            BusWidth::FourBit => bus4::write(&mut self.port, instruction, false)?,
        }
        Ok(())
    }

    fn write_data(&mut self, data: u8) -> LcdResult<()> {
        match self.width {
            BusWidth::EightBit => bus8::write(&mut self.port, data, true)?,
            BusWidth::FourBit => bus4::write(&mut self.port, data, true)?,
        }
        Ok(())
    }

    fn read_instruction(&mut self) -> LcdResult<u8> {
        let value = match self.width {
            BusWidth::EightBit => bus8::read(&mut self.port, false)?,
            BusWidth::FourBit => bus4::read(&mut self.port, false)?,
        };
        Ok(value)
    }

    fn read_data(&mut self) -> LcdResult<u8> {
        let value = match self.width {
            BusWidth::EightBit => bus8::read(&mut self.port, true)?,
            BusWidth::FourBit => bus4::read(&mut self.port, true)?,
        };
        Ok(value)
    }

    fn wait_while_busy(&mut self) -> LcdResult<()> {
        let limit = self.config.busy_poll_limit;
        match self.width {
            BusWidth::EightBit => bus8::wait_while_busy(&mut self.port, limit),
            BusWidth::FourBit => bus4::wait_while_busy(&mut self.port, limit),
        }
    }
}

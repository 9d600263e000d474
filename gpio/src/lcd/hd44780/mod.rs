//! HD44780 character LCD controller.
//!
//! [intf::ControllerInterface] implements the bus protocol on an [LcdPort](crate::lcd::port::LcdPort),
//! and [display::LcdDisplay] turns screen coordinates and characters into instructions.
//! The two meet at the [Controller] trait, so the display can run on anything that speaks it.

pub mod display;
pub mod instruction;
pub mod intf;

use crate::lcd::LcdResult;
use crate::lcd::hd44780::instruction::{ADDRESS_MASK, BUSY_FLAG};
use std::fmt::Debug;

pub trait Controller: Debug {
    /// Writes an instruction (RS low). Does not wait for the controller to finish it.
    fn write_instruction(&mut self, instruction: u8) -> LcdResult<()>;

    /// Writes a data byte (RS high) to DDRAM at the address counter.
    fn write_data(&mut self, data: u8) -> LcdResult<()>;

    /// Reads the busy flag and address counter in a single byte.
    fn read_instruction(&mut self) -> LcdResult<u8>;

    /// Reads a data byte from DDRAM at the address counter.
    fn read_data(&mut self) -> LcdResult<u8>;

    /// Polls the busy flag until it clears.
    ///
    /// # Errors
    /// - [LcdError::Timeout](crate::lcd::LcdError::Timeout) if it stays set for the whole poll budget.
    fn wait_while_busy(&mut self) -> LcdResult<()>;

    /// Reads the busy flag and address counter as a pair.
    fn busy_flag_and_address(&mut self) -> LcdResult<(bool, u8)> {
        let value = self.read_instruction()?;
        Ok((value & BUSY_FLAG != 0, value & ADDRESS_MASK))
    }
}

impl<T: Controller + ?Sized> Controller for &mut T {
    fn write_instruction(&mut self, instruction: u8) -> LcdResult<()> {
        (**self).write_instruction(instruction)
    }

    fn write_data(&mut self, data: u8) -> LcdResult<()> {
        (**self).write_data(data)
    }

    fn read_instruction(&mut self) -> LcdResult<u8> {
        (**self).read_instruction()
    }

    fn read_data(&mut self) -> LcdResult<u8> {
        (**self).read_data()
    }

    fn wait_while_busy(&mut self) -> LcdResult<()> {
        (**self).wait_while_busy()
    }
}

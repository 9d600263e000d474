//! Line-level access to an HD44780 parallel bus.
//!
//! A port knows nothing about the controller protocol. It only moves the three control lines
//! (RS, RW, E), switches the direction of the data lines and puts values on them or samples them.
//! The protocol layer in [crate::lcd::hd44780::intf] decides the order.

pub mod spy;

use crate::GpioResult;
use std::fmt::Debug;

/// Width of the data bus between the MCU/SoC and the controller.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BusWidth {
    /// D4..D7 only, every byte is transferred as two nibbles (7 wires in total).
    FourBit,
    /// D0..D7 (11 wires in total).
    EightBit,
}

impl BusWidth {
    /// Mask of the bits that fit on the bus.
    pub const fn mask(self) -> u8 {
        match self {
            BusWidth::FourBit => 0x0F,
            BusWidth::EightBit => 0xFF,
        }
    }

    pub const fn bits(self) -> u8 {
        match self {
            BusWidth::FourBit => 4,
            BusWidth::EightBit => 8,
        }
    }
}

/// The control lines of the bus.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ControlLine {
    /// Register select: low for instructions, high for data.
    Rs,
    /// Read/write: low for writes, high for reads.
    Rw,
    /// Chip enable (`E` on most datasheets). Writes are latched on the falling edge.
    Ce,
}

/// Observed state of a control line.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum LineState {
    /// Not driven, before `init` or after `deinit`.
    #[default]
    Undefined,
    Asserted,
    Deasserted,
}

impl From<bool> for LineState {
    fn from(asserted: bool) -> Self {
        if asserted {
            LineState::Asserted
        } else {
            LineState::Deasserted
        }
    }
}

/// Direction of the data lines.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum DataDirection {
    /// Released/floating.
    #[default]
    Undefined,
    Input,
    Output,
}

/// A parallel bus to an HD44780 controller.
///
/// Implementors provide the six primitives; the named operations used by the protocol layer
/// (`set_rs`, `out4`, `set_direction_input8`, ...) are provided on top of them.
///
/// # Contract
///
/// - [LcdPort::init] leaves E low, RS low, RW high and the data lines as input.
/// - [LcdPort::deinit] releases every line.
/// - Writing the data lines never changes the control lines.
/// - Values are masked to the bus width, both ways.
///
/// Passing a width other than the one given to `init` is a caller error; implementations may
/// reject it or do something unspecified, but must not panic.
pub trait LcdPort: Debug {
    /// Prepares the lines for a bus of the given width.
    fn init(&mut self, width: BusWidth) -> GpioResult<()>;

    /// Releases all lines.
    fn deinit(&mut self) -> GpioResult<()>;

    /// Drives a control line.
    fn set_line(&mut self, line: ControlLine, asserted: bool) -> GpioResult<()>;

    /// Switches the direction of the data lines.
    fn set_direction(&mut self, width: BusWidth, direction: DataDirection) -> GpioResult<()>;

    /// Puts a value on the data lines. The value appears on the wires once the lines are outputs.
    fn write_bus(&mut self, width: BusWidth, value: u8) -> GpioResult<()>;

    /// Samples the data lines.
    fn read_bus(&mut self, width: BusWidth) -> GpioResult<u8>;

    fn set_rs(&mut self) -> GpioResult<()> {
        self.set_line(ControlLine::Rs, true)
    }

    fn clear_rs(&mut self) -> GpioResult<()> {
        self.set_line(ControlLine::Rs, false)
    }

    fn set_rw(&mut self) -> GpioResult<()> {
        self.set_line(ControlLine::Rw, true)
    }

    fn clear_rw(&mut self) -> GpioResult<()> {
        self.set_line(ControlLine::Rw, false)
    }

    fn set_ce(&mut self) -> GpioResult<()> {
        self.set_line(ControlLine::Ce, true)
    }

    fn clear_ce(&mut self) -> GpioResult<()> {
        self.set_line(ControlLine::Ce, false)
    }

    fn set_direction_input4(&mut self) -> GpioResult<()> {
        self.set_direction(BusWidth::FourBit, DataDirection::Input)
    }

    fn set_direction_output4(&mut self) -> GpioResult<()> {
        self.set_direction(BusWidth::FourBit, DataDirection::Output)
    }

    fn set_direction_input8(&mut self) -> GpioResult<()> {
        self.set_direction(BusWidth::EightBit, DataDirection::Input)
    }

    fn set_direction_output8(&mut self) -> GpioResult<()> {
        self.set_direction(BusWidth::EightBit, DataDirection::Output)
    }

    /// Puts the low nibble of `value` on D4..D7.
    fn out4(&mut self, value: u8) -> GpioResult<()> {
        self.write_bus(BusWidth::FourBit, value & BusWidth::FourBit.mask())
    }

    fn out8(&mut self, value: u8) -> GpioResult<()> {
        self.write_bus(BusWidth::EightBit, value)
    }

    /// Samples D4..D7, returned in the low nibble.
    fn in4(&mut self) -> GpioResult<u8> {
        Ok(self.read_bus(BusWidth::FourBit)? & BusWidth::FourBit.mask())
    }

    fn in8(&mut self) -> GpioResult<u8> {
        self.read_bus(BusWidth::EightBit)
    }
}

impl<T: LcdPort + ?Sized> LcdPort for &mut T {
    fn init(&mut self, width: BusWidth) -> GpioResult<()> {
        (**self).init(width)
    }

    fn deinit(&mut self) -> GpioResult<()> {
        (**self).deinit()
    }

    fn set_line(&mut self, line: ControlLine, asserted: bool) -> GpioResult<()> {
        (**self).set_line(line, asserted)
    }

    fn set_direction(&mut self, width: BusWidth, direction: DataDirection) -> GpioResult<()> {
        (**self).set_direction(width, direction)
    }

    fn write_bus(&mut self, width: BusWidth, value: u8) -> GpioResult<()> {
        (**self).write_bus(width, value)
    }

    fn read_bus(&mut self, width: BusWidth) -> GpioResult<u8> {
        (**self).read_bus(width)
    }
}

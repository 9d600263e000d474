//! [LcdPort] on Linux GPIO character devices, using the gpiod library.
//!
//! Control lines (RS, RW, E) are requested once as a group of outputs. The data lines are
//! requested again every time their direction changes, since a line request is either input
//! or output for its whole life.
use crate::lcd::port::{BusWidth, ControlLine, DataDirection, LcdPort};
use crate::{GpioError, GpioResult};
use log::{debug, trace};
use std::array;
use std::fmt::{Debug, Formatter};

const CONSUMER: &str = env!("CARGO_PKG_NAME");

enum DataLines {
    Released,
    Input(gpiod::Lines<gpiod::Input>),
    Output(gpiod::Lines<gpiod::Output>),
}

impl DataLines {
    fn direction(&self) -> DataDirection {
        match self {
            DataLines::Released => DataDirection::Undefined,
            DataLines::Input(_) => DataDirection::Input,
            DataLines::Output(_) => DataDirection::Output,
        }
    }
}

/// An HD44780 bus on `N` data lines of one GPIO chip.
///
/// `N` is 8 for D0..D7 or 4 for D4..D7. Data pins are listed least significant bit first.
///
/// A value written while the data lines are inputs is kept, and becomes the output level as soon
/// as the lines are switched to output, like an output data register on a microcontroller.
pub struct GpiodLcdPort<const N: usize> {
    chip: gpiod::Chip,
    /// RS, RW, E
    control_pins: [u32; 3],
    data_pins: [u32; N],
    control: Option<gpiod::Lines<gpiod::Output>>,
    control_values: [bool; 3],
    data: DataLines,
    latched: u8,
}

impl<const N: usize> GpiodLcdPort<N> {
    /// Creates a port on the given chip. No line is requested until [LcdPort::init].
    ///
    /// # Errors
    /// - `GpioError::InvalidArgument` if `N` is neither 4 nor 8, a pin does not exist on the chip,
    ///   or a pin is used twice.
    pub fn new(
        chip: gpiod::Chip,
        pin_rs: u32,
        pin_rw: u32,
        pin_e: u32,
        data_pins: [u32; N],
    ) -> GpioResult<Self> {
        if Self::bus_width().is_none() {
            return Err(GpioError::InvalidArgument);
        }

        let control_pins = [pin_rs, pin_rw, pin_e];
        let count = chip.num_lines() as usize;
        let mut all_pins = control_pins.iter().chain(data_pins.iter());

        if all_pins.clone().any(|&pin| pin as usize >= count) {
            return Err(GpioError::InvalidArgument);
        }

        let mut seen = Vec::with_capacity(N + 3);
        if all_pins.any(|pin| {
            let duplicate = seen.contains(pin);
            seen.push(*pin);
            duplicate
        }) {
            return Err(GpioError::InvalidArgument);
        }

        Ok(GpiodLcdPort {
            chip,
            control_pins,
            data_pins,
            control: None,
            control_values: [false, true, false],
            data: DataLines::Released,
            latched: 0,
        })
    }

    /// Opens the chip at `path` (e.g. `/dev/gpiochip0`) and creates a port on it.
    pub fn open(
        path: &str,
        pin_rs: u32,
        pin_rw: u32,
        pin_e: u32,
        data_pins: [u32; N],
    ) -> GpioResult<Self> {
        Self::new(gpiod::Chip::new(path)?, pin_rs, pin_rw, pin_e, data_pins)
    }

    pub fn bus_width() -> Option<BusWidth> {
        match N {
            4 => Some(BusWidth::FourBit),
            8 => Some(BusWidth::EightBit),
            _ => None,
        }
    }

    fn check_width(width: BusWidth) -> GpioResult<()> {
        if Self::bus_width() == Some(width) {
            Ok(())
        } else {
            Err(GpioError::InvalidArgument)
        }
    }

    fn bits_of(value: u8) -> [bool; N] {
        array::from_fn(|i| value & (1 << i) != 0)
    }

    fn value_of(bits: [bool; N]) -> u8 {
        bits.iter()
            .enumerate()
            .fold(0, |value, (i, &bit)| if bit { value | (1 << i) } else { value })
    }

    fn request_input(&self) -> GpioResult<gpiod::Lines<gpiod::Input>> {
        let lines = self
            .chip
            .request_lines(gpiod::Options::input(self.data_pins).consumer(CONSUMER))?;
        Ok(lines)
    }

    fn request_output(&self) -> GpioResult<gpiod::Lines<gpiod::Output>> {
        let lines = self.chip.request_lines(
            gpiod::Options::output(self.data_pins)
                .values(Self::bits_of(self.latched))
                .consumer(CONSUMER),
        )?;
        Ok(lines)
    }
}

impl<const N: usize> Debug for GpiodLcdPort<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GpiodLcdPort({}, ctrl {:?}, data {:?})",
            self.chip.name(),
            self.control_pins,
            self.data_pins
        )
    }
}

impl<const N: usize> LcdPort for GpiodLcdPort<N> {
    fn init(&mut self, width: BusWidth) -> GpioResult<()> {
        Self::check_width(width)?;

        // Release first, a line can only be held by one request
        self.data = DataLines::Released;
        self.control = None;

        // E low, RS low, RW high
        self.control_values = [false, true, false];
        self.control = Some(
            self.chip.request_lines(
                gpiod::Options::output(self.control_pins)
                    .values(self.control_values)
                    .consumer(CONSUMER),
            )?,
        );

        self.latched = 0;
        self.data = DataLines::Input(self.request_input()?);

        debug!("{:?} initialized", self);
        Ok(())
    }

    fn deinit(&mut self) -> GpioResult<()> {
        self.data = DataLines::Released;
        self.control = None;
        debug!("{:?} released", self);
        Ok(())
    }

    fn set_line(&mut self, line: ControlLine, asserted: bool) -> GpioResult<()> {
        let index = match line {
            ControlLine::Rs => 0,
            ControlLine::Rw => 1,
            ControlLine::Ce => 2,
        };
        let control = self
            .control
            .as_ref()
            .ok_or_else(|| GpioError::Other("control lines are not requested".to_string()))?;

        self.control_values[index] = asserted;
        control.set_values(self.control_values)?;
        Ok(())
    }

    fn set_direction(&mut self, width: BusWidth, direction: DataDirection) -> GpioResult<()> {
        Self::check_width(width)?;

        if self.data.direction() == direction {
            return Ok(());
        }

        trace!("Data lines {:?} -> {:?}", self.data.direction(), direction);
        self.data = DataLines::Released;
        self.data = match direction {
            DataDirection::Undefined => DataLines::Released,
            DataDirection::Input => DataLines::Input(self.request_input()?),
            DataDirection::Output => DataLines::Output(self.request_output()?),
        };
        Ok(())
    }

    fn write_bus(&mut self, width: BusWidth, value: u8) -> GpioResult<()> {
        Self::check_width(width)?;

        self.latched = value & width.mask();
        if let DataLines::Output(lines) = &self.data {
            lines.set_values(Self::bits_of(self.latched))?;
        }
        Ok(())
    }

    fn read_bus(&mut self, width: BusWidth) -> GpioResult<u8> {
        Self::check_width(width)?;

        match &self.data {
            DataLines::Input(lines) => {
                let bits = lines.get_values([false; N])?;
                Ok(Self::value_of(bits))
            }
            _ => Err(GpioError::Other("data lines are not inputs".to_string())),
        }
    }
}

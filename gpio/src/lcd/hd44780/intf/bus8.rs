//! Bus cycles for 8-bit wiring (D0..D7).
use crate::GpioResult;
use crate::lcd::hd44780::instruction::{
    BUSY_FLAG, DISPLAY_ON, ENTRY_MODE_INCREMENT, FUNCTION_SET_8BIT, clear_display,
};
use crate::lcd::hd44780::intf::InterfaceConfig;
use crate::lcd::port::{ControlLine, LcdPort};
use crate::lcd::{LcdError, LcdResult};
use embedded_hal::delay::DelayNs;
use log::{debug, trace, warn};

/// Writes one byte. The controller latches it on the falling edge of E, while the data lines
/// are driven; afterwards the lines go back to input and RW back to read, which is the idle state.
pub(super) fn write<P: LcdPort>(port: &mut P, value: u8, rs: bool) -> GpioResult<()> {
    trace!("Writing {:08b}, RS: {}", value, rs);

    port.set_line(ControlLine::Rs, rs)?;
    port.clear_rw()?;
    port.set_ce()?;
    port.out8(value)?;
    port.set_direction_output8()?;
    port.clear_ce()?;
    port.set_direction_input8()?;
    port.set_rw()
}

/// Reads one byte. The data lines are already inputs in the idle state.
pub(super) fn read<P: LcdPort>(port: &mut P, rs: bool) -> GpioResult<u8> {
    port.set_line(ControlLine::Rs, rs)?;
    port.set_rw()?;
    port.set_ce()?;
    let value = port.in8()?;
    port.clear_ce()?;

    trace!("Read {:08b}, RS: {}", value, rs);

    Ok(value)
}

/// Keeps E high and samples the bus until the busy flag drops, at most `limit` times.
pub(super) fn wait_while_busy<P: LcdPort>(port: &mut P, limit: u32) -> LcdResult<()> {
    port.clear_rs()?;
    port.set_rw()?;
    port.set_ce()?;

    let mut busy = true;
    let mut reads = 0;
    while busy && reads < limit {
        busy = port.in8()? & BUSY_FLAG != 0;
        reads += 1;
    }

    port.clear_ce()?;

    if busy {
        warn!("Busy flag still set after {} reads", reads);
        return Err(LcdError::Timeout { reads });
    }

    trace!("Ready after {} busy flag reads", reads);
    Ok(())
}

pub(super) fn initialize<P: LcdPort, D: DelayNs>(
    port: &mut P,
    delay: &mut D,
    config: &InterfaceConfig,
) -> LcdResult<()> {
    debug!("Setting up the controller for an 8-bit bus");

    // Busy flag is not valid before the function set is accepted
    write(port, FUNCTION_SET_8BIT, false)?;
    delay.delay_us(config.first_function_set_delay_us);
    write(port, FUNCTION_SET_8BIT, false)?;
    delay.delay_us(config.second_function_set_delay_us);

    for instruction in [DISPLAY_ON, clear_display(), ENTRY_MODE_INCREMENT] {
        write(port, instruction, false)?;
        wait_while_busy(port, config.busy_poll_limit)?;
    }

    debug!("Controller ready");
    Ok(())
}

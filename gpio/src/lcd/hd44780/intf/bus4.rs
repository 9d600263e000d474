//! Bus cycles for 4-bit wiring (D4..D7). Every byte goes over the bus high nibble first,
//! each nibble with its own E pulse.
use crate::GpioResult;
use crate::lcd::hd44780::instruction::{
    BUSY_FLAG, DISPLAY_ON, ENTRY_MODE_INCREMENT, FUNCTION_SET_4BIT, FUNCTION_SET_8BIT,
    clear_display, high_nibble, low_nibble,
};
use crate::lcd::hd44780::intf::InterfaceConfig;
use crate::lcd::port::{ControlLine, LcdPort};
use crate::lcd::{LcdError, LcdResult};
use embedded_hal::delay::DelayNs;
use log::{debug, trace, warn};

/// One E pulse with a nibble on the bus. The data lines must already be outputs.
fn clock_nibble<P: LcdPort>(port: &mut P, nibble: u8) -> GpioResult<()> {
    port.set_ce()?;
    port.out4(nibble)?;
    port.clear_ce()
}

/// Both nibbles of a byte, on a bus that is already driven.
fn clock_byte<P: LcdPort>(port: &mut P, value: u8) -> GpioResult<()> {
    clock_nibble(port, high_nibble(value))?;
    clock_nibble(port, low_nibble(value))
}

/// Write cycle without touching RS: turns the bus around for the first nibble and releases it
/// after the second.
fn write_nibbles<P: LcdPort>(port: &mut P, value: u8) -> GpioResult<()> {
    port.clear_rw()?;
    port.set_ce()?;
    port.out4(high_nibble(value))?;
    port.set_direction_output4()?;
    port.clear_ce()?;
    clock_nibble(port, low_nibble(value))?;
    port.set_direction_input4()?;
    port.set_rw()
}

pub(super) fn write<P: LcdPort>(port: &mut P, value: u8, rs: bool) -> GpioResult<()> {
    trace!("Writing HN: {:04b} LN: {:04b}, RS: {}", high_nibble(value), low_nibble(value), rs);

    port.set_line(ControlLine::Rs, rs)?;
    write_nibbles(port, value)
}

pub(super) fn read<P: LcdPort>(port: &mut P, rs: bool) -> GpioResult<u8> {
    port.set_line(ControlLine::Rs, rs)?;
    port.set_rw()?;

    port.set_ce()?;
    let high = port.in4()?;
    port.clear_ce()?;

    port.set_ce()?;
    let low = port.in4()?;
    port.clear_ce()?;

    let value = (high << 4) | low;
    trace!("Read {:08b}, RS: {}", value, rs);

    Ok(value)
}

/// Keeps E high and samples the high nibble, which carries the busy flag, until the flag drops
/// or `limit` samples were taken. The controller still expects the second half of the read, so
/// the low nibble is clocked out and dropped afterwards.
pub(super) fn wait_while_busy<P: LcdPort>(port: &mut P, limit: u32) -> LcdResult<()> {
    port.clear_rs()?;
    port.set_rw()?;
    port.set_ce()?;

    let mut busy = true;
    let mut reads = 0;
    while busy && reads < limit {
        busy = (port.in4()? << 4) & BUSY_FLAG != 0;
        reads += 1;
    }

    port.clear_ce()?;
    port.set_ce()?;
    port.in4()?;
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
    debug!("Setting up the controller for a 4-bit bus");

    port.clear_rs()?;
    port.clear_rw()?;

    // Only the high nibble of the 8-bit function set: the controller may still be in 8-bit
    // mode and takes this single pulse as a whole instruction.
    port.set_ce()?;
    port.out4(high_nibble(FUNCTION_SET_8BIT))?;
    port.set_direction_output4()?;
    port.clear_ce()?;
    delay.delay_us(config.first_function_set_delay_us);

    // From here on the controller listens in nibble pairs
    clock_byte(port, FUNCTION_SET_4BIT)?;
    delay.delay_us(config.first_function_set_delay_us);
    clock_byte(port, FUNCTION_SET_4BIT)?;
    delay.delay_us(config.second_function_set_delay_us);

    clock_byte(port, DISPLAY_ON)?;
    port.set_direction_input4()?;
    port.set_rw()?;
    wait_while_busy(port, config.busy_poll_limit)?;

    // RS is still low after the busy flag poll
    for instruction in [clear_display(), ENTRY_MODE_INCREMENT] {
        write_nibbles(port, instruction)?;
        wait_while_busy(port, config.busy_poll_limit)?;
    }

    debug!("Controller ready");
    Ok(())
}

//! Expected bus transcripts shared by the protocol tests.
#![allow(dead_code)]

use charlcd_gpio::lcd::hd44780::intf::{ControllerInterface, InterfaceConfig};
use charlcd_gpio::lcd::port::spy::{PortEvent, SpyDelay, SpyPort};
use charlcd_gpio::lcd::port::{BusWidth, ControlLine, DataDirection, LineState};

/// Small enough to script a whole timeout.
pub const POLL_LIMIT: u32 = 5;

pub type SpySession = ControllerInterface<SpyPort, SpyDelay>;

pub fn session(port: SpyPort, width: BusWidth) -> SpySession {
    session_with(port, width, InterfaceConfig::default().with_busy_poll_limit(POLL_LIMIT))
}

pub fn session_with(port: SpyPort, width: BusWidth, config: InterfaceConfig) -> SpySession {
    let delay = port.delay();
    ControllerInterface::init(port, delay, width, config).expect("spy port never fails")
}

pub fn set(line: ControlLine) -> PortEvent {
    PortEvent::Line(line, LineState::Asserted)
}

pub fn clear(line: ControlLine) -> PortEvent {
    PortEvent::Line(line, LineState::Deasserted)
}

pub fn rs(asserted: bool) -> PortEvent {
    PortEvent::Line(ControlLine::Rs, LineState::from(asserted))
}

pub fn delay_us(us: u32) -> PortEvent {
    PortEvent::DelayUs(us)
}

pub fn dir_out(width: BusWidth) -> PortEvent {
    PortEvent::Direction(width, DataDirection::Output)
}

pub fn dir_in(width: BusWidth) -> PortEvent {
    PortEvent::Direction(width, DataDirection::Input)
}

pub fn out8(value: u8) -> PortEvent {
    PortEvent::Out(BusWidth::EightBit, value)
}

pub fn in8(value: u8) -> PortEvent {
    PortEvent::In(BusWidth::EightBit, value)
}

pub fn out4(value: u8) -> PortEvent {
    PortEvent::Out(BusWidth::FourBit, value)
}

pub fn in4(value: u8) -> PortEvent {
    PortEvent::In(BusWidth::FourBit, value)
}

pub fn hi(value: u8) -> u8 {
    (value >> 4) & 0x0F
}

pub fn lo(value: u8) -> u8 {
    value & 0x0F
}

// 8-bit transcripts

pub fn write8(data: bool, value: u8) -> Vec<PortEvent> {
    vec![
        rs(data),
        clear(ControlLine::Rw),
        set(ControlLine::Ce),
        out8(value),
        dir_out(BusWidth::EightBit),
        clear(ControlLine::Ce),
        dir_in(BusWidth::EightBit),
        set(ControlLine::Rw),
    ]
}

pub fn read8(data: bool, value: u8) -> Vec<PortEvent> {
    vec![
        rs(data),
        set(ControlLine::Rw),
        set(ControlLine::Ce),
        in8(value),
        clear(ControlLine::Ce),
    ]
}

/// Busy flag poll with E held high across all samples.
pub fn busy8(samples: &[u8]) -> Vec<PortEvent> {
    let mut events = vec![clear(ControlLine::Rs), set(ControlLine::Rw), set(ControlLine::Ce)];
    events.extend(samples.iter().map(|&sample| in8(sample)));
    events.push(clear(ControlLine::Ce));
    events
}

pub fn busy8_timeout() -> Vec<PortEvent> {
    busy8(&[0x80; POLL_LIMIT as usize])
}

// 4-bit transcripts

pub fn write4(data: bool, value: u8) -> Vec<PortEvent> {
    vec![
        rs(data),
        clear(ControlLine::Rw),
        set(ControlLine::Ce),
        out4(hi(value)),
        dir_out(BusWidth::FourBit),
        clear(ControlLine::Ce),
        set(ControlLine::Ce),
        out4(lo(value)),
        clear(ControlLine::Ce),
        dir_in(BusWidth::FourBit),
        set(ControlLine::Rw),
    ]
}

pub fn read4(data: bool, value: u8) -> Vec<PortEvent> {
    vec![
        rs(data),
        set(ControlLine::Rw),
        set(ControlLine::Ce),
        in4(hi(value)),
        clear(ControlLine::Ce),
        set(ControlLine::Ce),
        in4(lo(value)),
        clear(ControlLine::Ce),
    ]
}

/// Busy flag poll on the high nibble, then the low nibble clocked out once.
pub fn busy4(high_samples: &[u8], low: u8) -> Vec<PortEvent> {
    let mut events = vec![clear(ControlLine::Rs), set(ControlLine::Rw), set(ControlLine::Ce)];
    events.extend(high_samples.iter().map(|&sample| in4(sample)));
    events.extend([
        clear(ControlLine::Ce),
        set(ControlLine::Ce),
        in4(low),
        clear(ControlLine::Ce),
    ]);
    events
}

pub fn busy4_ready() -> Vec<PortEvent> {
    busy4(&[0x0], 0x0)
}

/// Transcript of a timed out poll on a port whose idle read is `0x08`.
pub fn busy4_timeout() -> Vec<PortEvent> {
    busy4(&[0x8; POLL_LIMIT as usize], 0x8)
}

/// One E pulse with a nibble, bus already driven.
pub fn nibble(value: u8) -> Vec<PortEvent> {
    vec![set(ControlLine::Ce), out4(value), clear(ControlLine::Ce)]
}

/// Instruction write inside the 4-bit power-on sequence, where RS is already low.
pub fn write4_keep_rs(value: u8) -> Vec<PortEvent> {
    write4(false, value)[1..].to_vec()
}

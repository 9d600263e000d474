mod common;

use charlcd_gpio::lcd::LcdError;
use charlcd_gpio::lcd::hd44780::Controller;
use charlcd_gpio::lcd::port::spy::{PortEvent, SpyPort};
use charlcd_gpio::lcd::port::{BusWidth, ControlLine, DataDirection, LineState};
use common::*;

fn four_bit() -> SpySession {
    session(SpyPort::new(), BusWidth::FourBit)
}

/// Port whose data lines keep reporting a busy high nibble.
fn stuck_busy() -> SpySession {
    session(SpyPort::new().with_idle_read(0x08), BusWidth::FourBit)
}

/// Everything up to and including the display on instruction, before its busy flag poll.
fn function_sets() -> Vec<PortEvent> {
    [
        vec![
            clear(ControlLine::Rs),
            clear(ControlLine::Rw),
            set(ControlLine::Ce),
            out4(0x3),
            dir_out(BusWidth::FourBit),
            clear(ControlLine::Ce),
            delay_us(39),
        ],
        nibble(0x2),
        nibble(0xC),
        vec![delay_us(39)],
        nibble(0x2),
        nibble(0xC),
        vec![delay_us(37)],
        nibble(0x0),
        nibble(0xC),
        vec![dir_in(BusWidth::FourBit), set(ControlLine::Rw)],
    ]
    .concat()
}

#[test]
fn init_leaves_the_bus_idle() {
    let intf = four_bit();

    assert_eq!(intf.port_data_width(), BusWidth::FourBit);
    assert_eq!(intf.port().width(), Some(BusWidth::FourBit));
    assert_eq!(intf.port().line(ControlLine::Ce), LineState::Deasserted);
    assert_eq!(intf.port().line(ControlLine::Rs), LineState::Deasserted);
    assert_eq!(intf.port().line(ControlLine::Rw), LineState::Asserted);
    assert_eq!(intf.port().direction(), DataDirection::Input);
}

#[test]
fn deinit_releases_the_port() {
    let (port, _delay) = four_bit().deinit().unwrap();

    assert_eq!(port.width(), None);
    assert_eq!(port.line(ControlLine::Ce), LineState::Undefined);
    assert_eq!(port.direction(), DataDirection::Undefined);
}

#[test]
fn writes_instruction_high_nibble_first() {
    let mut intf = four_bit();
    intf.write_instruction(0x7B).unwrap();
    assert_eq!(intf.port_mut().take_events(), write4(false, 0x7B));
}

#[test]
fn writes_data() {
    let mut intf = four_bit();
    intf.write_data(0x23).unwrap();
    assert_eq!(intf.port_mut().take_events(), write4(true, 0x23));
}

#[test]
fn reads_data() {
    let mut intf = four_bit();
    intf.port_mut().queue_reads([hi(0x34), lo(0x34)]);

    assert_eq!(intf.read_data(), Ok(0x34));
    assert_eq!(intf.port_mut().take_events(), read4(true, 0x34));
}

#[test]
fn reads_busy_flag_and_address() {
    let mut intf = four_bit();
    intf.port_mut().queue_reads([0x8, 0x3]);

    assert_eq!(intf.read_instruction(), Ok(0x83));
    assert_eq!(intf.port_mut().take_events(), read4(false, 0x83));
}

#[test]
fn ready_at_first_sample() {
    let mut intf = four_bit();
    intf.port_mut().queue_reads([hi(0x7F), lo(0x7F)]);

    assert_eq!(intf.wait_while_busy(), Ok(()));
    assert_eq!(intf.port_mut().take_events(), busy4(&[0x7], 0xF));
}

#[test]
fn ready_after_a_few_samples() {
    let mut intf = four_bit();
    intf.port_mut().queue_reads([0x8, 0x8, 0x7, 0xF]);

    assert_eq!(intf.wait_while_busy(), Ok(()));
    assert_eq!(intf.port_mut().take_events(), busy4(&[0x8, 0x8, 0x7], 0xF));
}

#[test]
fn only_the_busy_flag_counts() {
    let mut intf = four_bit();
    intf.port_mut().queue_reads([hi(0x85), hi(0x05), lo(0x05)]);

    assert_eq!(intf.wait_while_busy(), Ok(()));
    assert_eq!(intf.port_mut().take_events(), busy4(&[0x8, 0x0], 0x5));
}

#[test]
fn busy_poll_times_out() {
    let mut intf = stuck_busy();

    assert_eq!(
        intf.wait_while_busy(),
        Err(LcdError::Timeout { reads: POLL_LIMIT })
    );
    assert_eq!(intf.port_mut().take_events(), busy4_timeout());
    assert_eq!(intf.port().line(ControlLine::Ce), LineState::Deasserted);
}

#[test]
fn initializes_controller() {
    let mut intf = four_bit();

    assert_eq!(intf.initialize_controller(), Ok(()));

    let expected = [
        function_sets(),
        busy4_ready(),
        write4_keep_rs(0x01),
        busy4_ready(),
        write4_keep_rs(0x06),
        busy4_ready(),
    ]
    .concat();
    assert_eq!(intf.port_mut().take_events(), expected);
}

#[test]
fn init_stops_when_display_on_times_out() {
    let mut intf = stuck_busy();

    assert_eq!(
        intf.initialize_controller(),
        Err(LcdError::Timeout { reads: POLL_LIMIT })
    );
    assert_eq!(
        intf.port_mut().take_events(),
        [function_sets(), busy4_timeout()].concat()
    );
}

#[test]
fn init_stops_when_clear_times_out() {
    let mut intf = stuck_busy();
    intf.port_mut().queue_reads([0x0, 0x0]);

    assert!(intf.initialize_controller().unwrap_err().is_timeout());

    let expected = [
        function_sets(),
        busy4_ready(),
        write4_keep_rs(0x01),
        busy4_timeout(),
    ]
    .concat();
    assert_eq!(intf.port_mut().take_events(), expected);
}

#[test]
fn init_reports_entry_mode_timeout() {
    let mut intf = stuck_busy();
    intf.port_mut().queue_reads([0x0, 0x0, 0x0, 0x0]);

    assert_eq!(
        intf.initialize_controller(),
        Err(LcdError::Timeout { reads: POLL_LIMIT })
    );

    let expected = [
        function_sets(),
        busy4_ready(),
        write4_keep_rs(0x01),
        busy4_ready(),
        write4_keep_rs(0x06),
        busy4_timeout(),
    ]
    .concat();
    assert_eq!(intf.port_mut().take_events(), expected);
}

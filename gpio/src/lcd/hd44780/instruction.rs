//! HD44780 instruction encoders.
//!
//! Every instruction is a single byte where the position of the highest set bit selects the
//! instruction and the lower bits are its arguments.

/// Bit 7 of the busy flag/address byte.
pub const BUSY_FLAG: u8 = 0b10000000;
/// Bits 0..6 of the busy flag/address byte, also the widest DDRAM address.
pub const ADDRESS_MASK: u8 = 0b01111111;

/// DDRAM address of the first character of the second hardware line.
pub const SECOND_LINE_ADDRESS: u8 = 0x40;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CursorDirection {
    /// Moves the cursor to the left after writing/reading data.
    Left,
    /// Moves the cursor to the right after writing/reading data.
    Right,
}

/// Clears the display and sets the cursor to the home position.
pub const fn clear_display() -> u8 {
    0b00000001
}

/// Sets the cursor to the home position and undoes display shifts.
pub const fn return_home() -> u8 {
    0b00000010
}

/// Sets the cursor movement direction and whether the display shifts along.
pub const fn entry_mode(cursor_direction: CursorDirection, shift: bool) -> u8 {
    let mut command = 0b00000100;
    if matches!(cursor_direction, CursorDirection::Right) {
        command |= 0b00000010;
    }
    if shift {
        command |= 0b00000001;
    }
    command
}

/// Display on/off, cursor on/off and cursor blinking.
pub const fn display_control(display_on: bool, cursor_on: bool, blink_on: bool) -> u8 {
    let mut command = 0b00001000;
    if display_on {
        command |= 0b00000100;
    }
    if cursor_on {
        command |= 0b00000010;
    }
    if blink_on {
        command |= 0b00000001;
    }
    command
}

/// Moves the cursor or shifts the whole display by one position.
pub const fn cursor_shift(display_shift: bool, direction: CursorDirection) -> u8 {
    let mut command = 0b00010000;
    if display_shift {
        command |= 0b00001000;
    }
    if matches!(direction, CursorDirection::Right) {
        command |= 0b00000100;
    }
    command
}

/// Bus width, number of lines and font.
///
/// `large_font` selects 5x10 dots; the controller ignores it with two lines on most modules.
pub const fn function_set(eight_bit: bool, two_lines: bool, large_font: bool) -> u8 {
    let mut command = 0b00100000;
    if eight_bit {
        command |= 0b00010000;
    }
    if two_lines {
        command |= 0b00001000;
    }
    if large_font {
        command |= 0b00000100;
    }
    command
}

/// Moves the address counter to a DDRAM address. Bits above the 7-bit address are dropped.
pub const fn set_ddram_address(address: u8) -> u8 {
    0b10000000 | (address & ADDRESS_MASK)
}

/// Function set used by the power-on sequence on an 8-bit bus: 8-bit, 2 lines, large font.
pub const FUNCTION_SET_8BIT: u8 = function_set(true, true, true);
/// Function set used by the power-on sequence on a 4-bit bus: 4-bit, 2 lines, large font.
pub const FUNCTION_SET_4BIT: u8 = function_set(false, true, true);
/// Display on, cursor off, blinking off.
pub const DISPLAY_ON: u8 = display_control(true, false, false);
/// Increment the address, no display shift.
pub const ENTRY_MODE_INCREMENT: u8 = entry_mode(CursorDirection::Right, false);

pub const fn high_nibble(byte: u8) -> u8 {
    (byte >> 4) & 0x0F
}

pub const fn low_nibble(byte: u8) -> u8 {
    byte & 0x0F
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_on_instructions_match_datasheet_codes() {
        assert_eq!(FUNCTION_SET_8BIT, 0x3C);
        assert_eq!(FUNCTION_SET_4BIT, 0x2C);
        assert_eq!(DISPLAY_ON, 0x0C);
        assert_eq!(clear_display(), 0x01);
        assert_eq!(ENTRY_MODE_INCREMENT, 0x06);
    }

    #[test]
    fn ddram_address_is_masked_to_seven_bits() {
        assert_eq!(set_ddram_address(0x00), 0x80);
        assert_eq!(set_ddram_address(0x53), 0xD3);
        assert_eq!(set_ddram_address(0xC1), 0xC1);
    }

    #[test]
    fn shift_and_entry_mode_bits() {
        assert_eq!(cursor_shift(false, CursorDirection::Left), 0x10);
        assert_eq!(cursor_shift(true, CursorDirection::Right), 0x1C);
        assert_eq!(entry_mode(CursorDirection::Left, true), 0x05);
        assert_eq!(display_control(true, true, true), 0x0F);
    }

    #[test]
    fn nibbles() {
        assert_eq!(high_nibble(0x83), 0x8);
        assert_eq!(low_nibble(0x83), 0x3);
    }
}

//! Character grid on top of a [Controller].
//!
//! Out-of-range input is never an error here: coordinates outside the configured screen are
//! reset to 0 on the offending axis and character codes outside `0..=255` become a space. The
//! only failure that reaches the caller is the controller's, usually a busy flag timeout.
use crate::lcd::LcdResult;
use crate::lcd::hd44780::Controller;
use crate::lcd::hd44780::instruction::{
    self, ADDRESS_MASK, CursorDirection, SECOND_LINE_ADDRESS,
};
use log::trace;
use std::fmt;

/// Character written in place of codes the controller cannot take.
pub const REPLACEMENT_CHAR: u8 = b' ';

#[derive(Debug)]
pub struct LcdDisplay<C> {
    controller: C,
    width: i16,
    height: i16,
}

impl<C: Controller> LcdDisplay<C> {
    pub const DEFAULT_WIDTH: i16 = 8;
    pub const DEFAULT_HEIGHT: i16 = 1;

    /// Wraps an initialized controller. The screen starts as 8x1 until
    /// [Self::setup_screen_dimensions] says otherwise.
    pub fn new(controller: C) -> Self {
        LcdDisplay {
            controller,
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
        }
    }

    pub fn with_dimensions(mut self, width: i16, height: i16) -> Self {
        self.setup_screen_dimensions(width, height);
        self
    }

    /// Stores the screen size in characters. No bus traffic.
    pub fn setup_screen_dimensions(&mut self, width: i16, height: i16) {
        self.width = width;
        self.height = height;
    }

    pub fn dimensions(&self) -> (i16, i16) {
        (self.width, self.height)
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    pub fn into_inner(self) -> C {
        self.controller
    }

    /// Clears the display and moves the cursor home.
    pub fn clear(&mut self) -> LcdResult<()> {
        self.command(instruction::clear_display())
    }

    /// Moves the cursor to column `x` of row `y`.
    ///
    /// The controller has two hardware lines, at DDRAM 0x00 and 0x40. Rows 2 and 3 of 4-row
    /// modules continue those lines, so they start `width` characters further in.
    pub fn goto_xy(&mut self, x: i16, y: i16) -> LcdResult<()> {
        let address = self.ddram_address(x, y);
        trace!("Going to ({}, {}) at DDRAM {:#04x}", x, y, address);
        self.command(instruction::set_ddram_address(address))
    }

    /// DDRAM address of a screen position, after resetting out-of-range coordinates to 0.
    pub fn ddram_address(&self, x: i16, y: i16) -> u8 {
        let x = if x < 0 || x >= self.width { 0 } else { x as i32 };
        let y = if y < 0 || y >= self.height { 0 } else { y as i32 };

        let address = x + SECOND_LINE_ADDRESS as i32 * (y & 1) + self.width as i32 * (y >> 1);
        (address & ADDRESS_MASK as i32) as u8
    }

    /// Writes one character at the cursor.
    pub fn putc(&mut self, code: i32) -> LcdResult<()> {
        let byte = u8::try_from(code).unwrap_or(REPLACEMENT_CHAR);
        self.controller.write_data(byte)?;
        self.controller.wait_while_busy()
    }

    /// Writes at most one screen width of characters.
    ///
    /// A character that times out does not stop the rest; the result is the one of the last
    /// character written. An empty string writes nothing but still polls the busy flag once.
    pub fn puts(&mut self, text: &str) -> LcdResult<()> {
        let limit = usize::try_from(self.width).unwrap_or(0);
        let mut result = None;

        for c in text.chars().take(limit) {
            result = Some(self.putc(c as i32));
        }

        match result {
            Some(result) => result,
            None => self.controller.wait_while_busy(),
        }
    }

    /// Moves the cursor home and undoes display shifts.
    pub fn home(&mut self) -> LcdResult<()> {
        self.command(instruction::return_home())
    }

    pub fn set_display_control(&mut self, display_on: bool, cursor_on: bool, blink_on: bool) -> LcdResult<()> {
        self.command(instruction::display_control(display_on, cursor_on, blink_on))
    }

    pub fn set_entry_mode(&mut self, cursor_direction: CursorDirection, shift: bool) -> LcdResult<()> {
        self.command(instruction::entry_mode(cursor_direction, shift))
    }

    /// Moves the cursor, or the whole display when `display_shift` is set, by one position.
    pub fn shift(&mut self, display_shift: bool, direction: CursorDirection) -> LcdResult<()> {
        self.command(instruction::cursor_shift(display_shift, direction))
    }

    /// Reads the address counter, i.e. the DDRAM address of the cursor.
    pub fn cursor_address(&mut self) -> LcdResult<u8> {
        self.controller.wait_while_busy()?;
        let (_, address) = self.controller.busy_flag_and_address()?;
        Ok(address)
    }

    fn command(&mut self, instruction: u8) -> LcdResult<()> {
        self.controller.write_instruction(instruction)?;
        self.controller.wait_while_busy()
    }
}

/// Writes every character, without the screen width limit of [LcdDisplay::puts].
/// Stops at the first character that fails.
impl<C: Controller> fmt::Write for LcdDisplay<C> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            self.putc(c as i32).map_err(|_| fmt::Error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcd::LcdError;

    /// Controller that accepts everything and remembers the last instruction.
    #[derive(Debug, Default)]
    struct LastInstruction(Option<u8>);

    impl Controller for LastInstruction {
        fn write_instruction(&mut self, instruction: u8) -> LcdResult<()> {
            self.0 = Some(instruction);
            Ok(())
        }

        fn write_data(&mut self, _data: u8) -> LcdResult<()> {
            Ok(())
        }

        fn read_instruction(&mut self) -> LcdResult<u8> {
            Ok(0x80 | 0x45)
        }

        fn read_data(&mut self) -> LcdResult<u8> {
            Err(LcdError::Timeout { reads: 0 })
        }

        fn wait_while_busy(&mut self) -> LcdResult<()> {
            Ok(())
        }
    }

    #[test]
    fn addresses_within_bounds() {
        let display = LcdDisplay::new(LastInstruction::default()).with_dimensions(20, 4);

        for y in 0..4 {
            for x in 0..20 {
                let expected = (x + 0x40 * (y & 1) + 20 * (y >> 1)) & 0x7F;
                assert_eq!(display.ddram_address(x, y), expected as u8, "({x}, {y})");
            }
        }
    }

    #[test]
    fn out_of_range_axis_resets_to_zero_only_on_that_axis() {
        let display = LcdDisplay::new(LastInstruction::default()).with_dimensions(16, 2);

        assert_eq!(display.ddram_address(-1, 1), display.ddram_address(0, 1));
        assert_eq!(display.ddram_address(16, 1), 0x40);
        assert_eq!(display.ddram_address(5, 2), 5);
        assert_eq!(display.ddram_address(5, -3), 5);
        assert_eq!(display.ddram_address(99, 99), 0);
    }

    #[test]
    fn wide_screens_wrap_into_seven_bits() {
        let display = LcdDisplay::new(LastInstruction::default()).with_dimensions(40, 4);
        // 39 + 0x40 + 40 = 0x8F
        assert_eq!(display.ddram_address(39, 3), 0x0F);
    }

    #[test]
    fn goto_sends_set_ddram_address() {
        let mut display = LcdDisplay::new(LastInstruction::default()).with_dimensions(20, 4);
        display.goto_xy(3, 3).unwrap();
        assert_eq!(display.controller().0, Some(0x80 | (0x40 + 20 + 3)));
    }

    #[test]
    fn cursor_address_drops_busy_flag() {
        let mut display = LcdDisplay::new(LastInstruction::default());
        assert_eq!(display.cursor_address(), Ok(0x45));
    }
}

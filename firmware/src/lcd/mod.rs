//! 20x4 character panel behind a PCF8574 backpack.
//!
//! The panel is an output sink: bus errors are logged and dropped so a loose
//! display cable never stalls the test sequence.

pub mod protocol;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use interlock_core::controller::CharacterDisplay;

use self::protocol::{
    CMD_CLEAR, CMD_DISPLAY_ON, CMD_ENTRY_MODE_INCREMENT, CMD_FUNCTION_4BIT_2LINE,
    INIT_4BIT_NIBBLE, INIT_8BIT_NIBBLE, LCD_I2C_ADDRESS, Register, backlight_frame, byte_frames,
    nibble_frames, rom_byte, set_cursor_command,
};

/// Execution time of a clear command.
const CLEAR_DELAY_US: u32 = 2_000;
/// Execution time of every other command and data write.
const COMMAND_DELAY_US: u32 = 50;

/// HD44780 panel driven over I2C.
pub struct Lcd2004<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    backlight: bool,
}

impl<I2C, D> Lcd2004<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Wraps the bus; call [`Self::init`] before use.
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            address: LCD_I2C_ADDRESS,
            backlight: false,
        }
    }

    /// Runs the 4-bit power-on sequence and turns the display on with the
    /// cursor hidden.
    pub fn init(&mut self) -> Result<(), I2C::Error> {
        self.delay.delay_ms(50);
        self.i2c
            .write(self.address, &[backlight_frame(self.backlight)])?;

        for wait_us in [4_500, 4_500, 150] {
            self.write_nibble(INIT_8BIT_NIBBLE, Register::Command)?;
            self.delay.delay_us(wait_us);
        }
        self.write_nibble(INIT_4BIT_NIBBLE, Register::Command)?;

        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.command(CMD_CLEAR)?;
        self.delay.delay_us(CLEAR_DELAY_US);
        self.command(CMD_ENTRY_MODE_INCREMENT)
    }

    fn write_nibble(&mut self, high_nibble: u8, register: Register) -> Result<(), I2C::Error> {
        self.i2c.write(
            self.address,
            &nibble_frames(high_nibble, register, self.backlight),
        )
    }

    fn write_byte(&mut self, byte: u8, register: Register) -> Result<(), I2C::Error> {
        self.i2c
            .write(self.address, &byte_frames(byte, register, self.backlight))?;
        self.delay.delay_us(COMMAND_DELAY_US);
        Ok(())
    }

    fn command(&mut self, command: u8) -> Result<(), I2C::Error> {
        self.write_byte(command, Register::Command)
    }

    fn report(result: Result<(), I2C::Error>, operation: &'static str) {
        if result.is_err() {
            log_bus_error(operation);
        }
    }
}

impl<I2C, D> CharacterDisplay for Lcd2004<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    fn clear(&mut self) {
        let result = self.command(CMD_CLEAR);
        self.delay.delay_us(CLEAR_DELAY_US);
        Self::report(result, "clear");
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        let result = self.command(set_cursor_command(col, row));
        Self::report(result, "set-cursor");
    }

    fn print(&mut self, text: &str) {
        let result = text
            .chars()
            .try_for_each(|ch| self.write_byte(rom_byte(ch), Register::Data));
        Self::report(result, "print");
    }

    fn set_backlight(&mut self, on: bool) {
        self.backlight = on;
        let result = self.i2c.write(self.address, &[backlight_frame(on)]);
        Self::report(result, "backlight");
    }
}

#[cfg(target_os = "none")]
fn log_bus_error(operation: &'static str) {
    defmt::warn!("lcd: i2c {} failed", operation);
}

#[cfg(not(target_os = "none"))]
fn log_bus_error(operation: &'static str) {
    println!("lcd: i2c {operation} failed");
}

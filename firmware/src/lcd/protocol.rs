//! HD44780 framing over a PCF8574 I2C backpack.
//!
//! The backpack exposes the controller's 4-bit bus on its expander pins:
//! P0 = RS, P1 = RW, P2 = E, P3 = backlight, P4..P7 = D4..D7. Every byte is
//! sent as two nibbles, each latched by an E pulse.

/// 7-bit bus address of the backpack.
pub const LCD_I2C_ADDRESS: u8 = 0x27;

/// DDRAM start address of each row on a 20x4 panel.
pub const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

const RS: u8 = 0x01;
const ENABLE: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

pub const CMD_CLEAR: u8 = 0x01;
pub const CMD_ENTRY_MODE_INCREMENT: u8 = 0x06;
pub const CMD_DISPLAY_ON: u8 = 0x0C;
pub const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
pub const CMD_SET_DDRAM: u8 = 0x80;

/// High nibble sent three times to force 8-bit mode from any state.
pub const INIT_8BIT_NIBBLE: u8 = 0x30;
/// High nibble that switches the controller to 4-bit mode.
pub const INIT_4BIT_NIBBLE: u8 = 0x20;

/// Register selected by a transfer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Register {
    Command,
    Data,
}

/// Expander writes for one nibble: set up the bus, raise E, drop E.
#[must_use]
pub const fn nibble_frames(high_nibble: u8, register: Register, backlight: bool) -> [u8; 3] {
    let mut bus = high_nibble & 0xF0;
    if matches!(register, Register::Data) {
        bus |= RS;
    }
    if backlight {
        bus |= BACKLIGHT;
    }
    [bus, bus | ENABLE, bus]
}

/// Expander writes for a full byte, high nibble first.
#[must_use]
pub const fn byte_frames(byte: u8, register: Register, backlight: bool) -> [u8; 6] {
    let high = nibble_frames(byte & 0xF0, register, backlight);
    let low = nibble_frames(byte << 4, register, backlight);
    [high[0], high[1], high[2], low[0], low[1], low[2]]
}

/// Expander byte that only drives the backlight pin.
#[must_use]
pub const fn backlight_frame(on: bool) -> u8 {
    if on { BACKLIGHT } else { 0 }
}

/// "Set DDRAM address" command for a cursor position. Rows past the panel
/// wrap onto the last row.
#[must_use]
pub fn set_cursor_command(col: u8, row: u8) -> u8 {
    let row = usize::from(row).min(ROW_OFFSETS.len() - 1);
    CMD_SET_DDRAM | ROW_OFFSETS[row].wrapping_add(col)
}

/// Maps a character onto the panel's ROM. Anything outside printable ASCII
/// is shown as `?`.
#[must_use]
pub fn rom_byte(ch: char) -> u8 {
    match u8::try_from(ch) {
        Ok(byte) if byte.is_ascii_graphic() || byte == b' ' => byte,
        _ => b'?',
    }
}

//! CRT controller registers of the VGA card.

use crate::port::HardwarePort;

pub const CRTC_INDEX: u16 = 0x3D4;
pub const CRTC_DATA: u16 = 0x3D5;

const CURSOR_START: u8 = 0x0A;
const CURSOR_DISABLE: u8 = 0x20;

/// Hides the blinking hardware cursor; the console tracks its own.
pub fn disable_hardware_cursor<P: HardwarePort>(port: &mut P) {
    port.write_u8(CRTC_INDEX, CURSOR_START);
    port.write_u8(CRTC_DATA, CURSOR_DISABLE);
}

//! Polling PS/2 keyboard driver.
//!
//! Set 1 make codes are looked up in [`SCANCODE_SET1_US`]; break codes and
//! anything without a printable mapping never reach the console. There is no
//! modifier tracking, so Shift/Ctrl/Alt map to nothing and letters are always
//! lower case.

use crate::port::HardwarePort;
use crate::vga_buffer::{Console, FrameBuffer};

pub const DATA_PORT: u16 = 0x60;
pub const STATUS_PORT: u16 = 0x64;

/// Status register bit 0: a byte is waiting in the data port.
pub const OUTPUT_BUFFER_FULL: u8 = 0x01;
/// Set on break (key-up) codes.
pub const RELEASE_BIT: u8 = 0x80;

/// US QWERTY, unshifted. `0` is unmapped, `-n` is function key `Fn`.
#[rustfmt::skip]
pub static SCANCODE_SET1_US: [i8; 128] = [
    // 0x00: none, Esc, 1..0, -, =, Backspace, Tab
    0, 27, b'1' as i8, b'2' as i8, b'3' as i8, b'4' as i8, b'5' as i8, b'6' as i8,
    b'7' as i8, b'8' as i8, b'9' as i8, b'0' as i8, b'-' as i8, b'=' as i8, 8, b'\t' as i8,
    // 0x10: q..p, [, ], Enter, Ctrl, a, s
    b'q' as i8, b'w' as i8, b'e' as i8, b'r' as i8, b't' as i8, b'y' as i8, b'u' as i8, b'i' as i8,
    b'o' as i8, b'p' as i8, b'[' as i8, b']' as i8, b'\n' as i8, 0, b'a' as i8, b's' as i8,
    // 0x20: d..l, ;, ', `, LShift, \, z, x, c, v
    b'd' as i8, b'f' as i8, b'g' as i8, b'h' as i8, b'j' as i8, b'k' as i8, b'l' as i8, b';' as i8,
    b'\'' as i8, b'`' as i8, 0, b'\\' as i8, b'z' as i8, b'x' as i8, b'c' as i8, b'v' as i8,
    // 0x30: b, n, m, ',', ., /, RShift, keypad *, Alt, Space, CapsLock, F1..F5
    b'b' as i8, b'n' as i8, b'm' as i8, b',' as i8, b'.' as i8, b'/' as i8, 0, b'*' as i8,
    0, b' ' as i8, 0, -1, -2, -3, -4, -5,
    // 0x40: F6..F10, NumLock, ScrollLock, keypad 7/Home, 8/Up, 9/PgUp, -, 4/Left, 5, 6/Right, +, 1/End
    -6, -7, -8, -9, -10, 0, 0, 0,
    0, 0, b'-' as i8, 0, 0, 0, b'+' as i8, 0,
    // 0x50: keypad 2/Down, 3/PgDn, 0/Ins, ./Del, SysRq, -, 102nd key, F11, F12
    0, 0, 0, 0, 0, 0, 0, -11,
    -12, 0, 0, 0, 0, 0, 0, 0,
    // 0x60..0x7F: unused in Set 1
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Unmapped,
    Char(u8),
    /// Function key number, 1 for F1.
    Function(u8),
}

/// Looks up a make code; bit 7 is ignored.
pub fn translate(make_code: u8) -> Key {
    match SCANCODE_SET1_US[(make_code & !RELEASE_BIT) as usize] {
        0 => Key::Unmapped,
        entry if entry > 0 => Key::Char(entry as u8),
        entry => Key::Function(entry.unsigned_abs()),
    }
}

/// Outcome of one [`KeyboardDriver::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing was waiting.
    Idle,
    /// A break code; discarded.
    Released(u8),
    /// A make code with no mapping; discarded.
    Unmapped(u8),
    /// A function key; not printed, left to the caller.
    Function(u8),
    /// The character written to the console.
    Printed(u8),
}

pub struct KeyboardDriver<P: HardwarePort> {
    port: P,
}

impl<P: HardwarePort> KeyboardDriver<P> {
    pub const fn new(port: P) -> Self {
        KeyboardDriver { port }
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// Reads the next scancode, if the controller has one.
    pub fn read_scancode(&mut self) -> Option<u8> {
        if self.port.read_u8(STATUS_PORT) & OUTPUT_BUFFER_FULL == 0 {
            return None;
        }
        Some(self.port.read_u8(DATA_PORT))
    }

    /// Handles at most one scancode, printing it if it maps to a character.
    pub fn poll<B: FrameBuffer>(&mut self, console: &mut Console<B>) -> Dispatch {
        match self.read_scancode() {
            Some(scancode) => dispatch(scancode, console),
            None => Dispatch::Idle,
        }
    }
}

/// Routes one raw scancode to the console.
pub fn dispatch<B: FrameBuffer>(scancode: u8, console: &mut Console<B>) -> Dispatch {
    if scancode & RELEASE_BIT != 0 {
        return Dispatch::Released(scancode);
    }
    match translate(scancode) {
        Key::Char(byte) => {
            console.put_char(byte);
            Dispatch::Printed(byte)
        }
        Key::Function(n) => {
            log::trace!("F{} pressed", n);
            Dispatch::Function(n)
        }
        Key::Unmapped => Dispatch::Unmapped(scancode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::ScriptedPort;
    use crate::vga_buffer::{ConsoleConfig, MemoryBuffer};

    fn console() -> Console<MemoryBuffer> {
        let mut console = Console::new(MemoryBuffer::new(), ConsoleConfig::new());
        console.init();
        console
    }

    #[test]
    fn table_landmarks() {
        assert_eq!(translate(30), Key::Char(b'a'));
        assert_eq!(translate(28), Key::Char(b'\n'));
        assert_eq!(translate(57), Key::Char(b' '));
        for n in 1..=9u8 {
            assert_eq!(translate(0x3A + n), Key::Function(n));
        }
        assert_eq!(translate(0x57), Key::Function(11));
        assert_eq!(translate(0x2A), Key::Unmapped);
        assert_eq!(translate(0x1D), Key::Unmapped);
    }

    #[test]
    fn function_sentinels_are_distinct() {
        let mut seen = [false; 13];
        for &entry in SCANCODE_SET1_US.iter().filter(|&&e| e < 0) {
            let n = entry.unsigned_abs() as usize;
            assert!(!seen[n], "F{} mapped twice", n);
            seen[n] = true;
        }
        assert!(seen[1..].iter().all(|&s| s));
    }

    #[test]
    fn idle_controller_dispatches_nothing() {
        let mut console = console();
        let mut keyboard = KeyboardDriver::new(ScriptedPort::new(STATUS_PORT, DATA_PORT, &[]));
        assert_eq!(keyboard.poll(&mut console), Dispatch::Idle);
        assert_eq!(console.cursor_position(), (0, 0));
        assert_eq!(keyboard.port().status_reads(), 1);
    }

    #[test]
    fn one_scancode_per_poll() {
        let mut console = console();
        let mut keyboard = KeyboardDriver::new(ScriptedPort::new(
            STATUS_PORT,
            DATA_PORT,
            &[0x23, 0x97, 0x17],
        ));
        assert_eq!(keyboard.poll(&mut console), Dispatch::Printed(b'h'));
        assert_eq!(keyboard.port().remaining(), 2);
        assert_eq!(keyboard.poll(&mut console), Dispatch::Released(0x97));
        assert_eq!(keyboard.poll(&mut console), Dispatch::Printed(b'i'));
        assert_eq!(keyboard.poll(&mut console), Dispatch::Idle);
        assert_eq!(&console.buffer().row_bytes(0)[..3], b"hi ");
    }

    #[test]
    fn function_and_unmapped_keys_leave_console_untouched() {
        let mut console = console();
        let before = console.buffer().clone();
        assert_eq!(dispatch(0x3B, &mut console), Dispatch::Function(1));
        assert_eq!(dispatch(0x2A, &mut console), Dispatch::Unmapped(0x2A));
        assert_eq!(dispatch(0x00, &mut console), Dispatch::Unmapped(0x00));
        assert!(console.buffer() == &before);
        assert_eq!(console.cursor_position(), (0, 0));
    }
}

//! Single-byte x86 port I/O.
//!
//! Drivers never touch the `in`/`out` instructions directly; they take a
//! [`HardwarePort`] so they can be exercised against [`ScriptedPort`] on the
//! host.

use core::arch::asm;

/// Byte-wide access to the x86 I/O address space.
pub trait HardwarePort {
    fn read_u8(&mut self, port: u16) -> u8;
    fn write_u8(&mut self, port: u16, value: u8);
}

/// Reads one byte from `port`.
///
/// # Safety
/// Reading a device register can have side effects on the device (the
/// keyboard controller drops the byte it hands out). Only ring 0 may call it.
#[inline]
pub unsafe fn inb(port: u16) -> u8 {
    let value: u8;
    asm!("in al, dx", in("dx") port, out("al") value, options(nomem, nostack, preserves_flags));
    value
}

/// Writes one byte to `port`.
///
/// # Safety
/// Same as [`inb`]; writes reprogram hardware.
#[inline]
pub unsafe fn outb(port: u16, value: u8) {
    asm!("out dx, al", in("dx") port, in("al") value, options(nomem, nostack, preserves_flags));
}

/// The real I/O bus.
#[derive(Debug)]
pub struct PortBus {
    _private: (),
}

impl PortBus {
    /// # Safety
    /// The caller must run in ring 0 and be the only driver of the ports it
    /// will touch through this handle.
    pub const unsafe fn new() -> Self {
        PortBus { _private: () }
    }
}

impl HardwarePort for PortBus {
    fn read_u8(&mut self, port: u16) -> u8 {
        unsafe { inb(port) }
    }

    fn write_u8(&mut self, port: u16, value: u8) {
        unsafe { outb(port, value) }
    }
}

/// A keyboard controller stand-in that replays a fixed list of scancodes.
///
/// The status port reports "output buffer full" while scancodes remain; each
/// read of the data port hands out the next one. Writes are counted and
/// otherwise discarded.
#[derive(Debug, Clone)]
pub struct ScriptedPort<'a> {
    scancodes: &'a [u8],
    next: usize,
    status_port: u16,
    data_port: u16,
    status_reads: usize,
    writes: usize,
}

impl<'a> ScriptedPort<'a> {
    pub fn new(status_port: u16, data_port: u16, scancodes: &'a [u8]) -> Self {
        ScriptedPort {
            scancodes,
            next: 0,
            status_port,
            data_port,
            status_reads: 0,
            writes: 0,
        }
    }

    /// Scancodes not yet read from the data port.
    pub fn remaining(&self) -> usize {
        self.scancodes.len() - self.next
    }

    pub fn status_reads(&self) -> usize {
        self.status_reads
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl HardwarePort for ScriptedPort<'_> {
    fn read_u8(&mut self, port: u16) -> u8 {
        if port == self.status_port {
            self.status_reads += 1;
            return (self.remaining() > 0) as u8;
        }
        if port == self.data_port {
            return match self.scancodes.get(self.next) {
                Some(&code) => {
                    self.next += 1;
                    code
                }
                // Controllers hand back stale data when nothing is pending.
                None => 0,
            };
        }
        0xFF
    }

    fn write_u8(&mut self, _port: u16, _value: u8) {
        self.writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tracks_remaining_scancodes() {
        let mut port = ScriptedPort::new(0x64, 0x60, &[0x1E, 0x9E]);
        assert_eq!(port.read_u8(0x64) & 1, 1);
        assert_eq!(port.read_u8(0x60), 0x1E);
        assert_eq!(port.read_u8(0x64) & 1, 1);
        assert_eq!(port.read_u8(0x60), 0x9E);
        assert_eq!(port.read_u8(0x64) & 1, 0);
        assert_eq!(port.status_reads(), 3);
        assert_eq!(port.remaining(), 0);
    }

    #[test]
    fn exhausted_data_port_reads_zero() {
        let mut port = ScriptedPort::new(0x64, 0x60, &[]);
        assert_eq!(port.read_u8(0x60), 0);
        assert_eq!(port.read_u8(0x3F8), 0xFF);
    }
}

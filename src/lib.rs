#![cfg_attr(not(test), no_std)]

pub mod kernel;
pub mod keyboard;
pub mod logger;
pub mod multiboot;
pub mod port;
pub mod serial;
pub mod tabs;
pub mod vga;
pub mod vga_buffer;

/// Parks the CPU with interrupts off. Nothing wakes it but NMI or reset.
pub fn hlt_loop() -> ! {
    loop {
        unsafe {
            core::arch::asm!("cli", "hlt", options(nomem, nostack));
        }
    }
}

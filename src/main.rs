#![no_std]
#![no_main]

mod boot;

use core::panic::PanicInfo;

use kestrel::kernel::{Kernel, KernelConfig};
use kestrel::multiboot::{BootInfo, BOOTLOADER_MAGIC};
use kestrel::port::PortBus;
use kestrel::vga_buffer::CONSOLE;
use kestrel::{logger, println, serial, serial_println, vga};
use log::LevelFilter;

const CONFIG: KernelConfig = {
    let mut config = KernelConfig::new();

    config.log_level = LevelFilter::Debug;
    config.tabs = cfg!(feature = "tabs");

    config
};

#[no_mangle]
pub extern "C" fn kernel_main(magic: u32, info_address: u32) -> ! {
    // === Phase 0: Debug Output ===
    serial::init();
    if let Err(err) = logger::init(CONFIG.log_level) {
        serial_println!("logger unavailable: {}", err);
    }
    log::info!("Kestrel kernel boot (multiboot, i686)");

    if magic != BOOTLOADER_MAGIC {
        log::warn!("unexpected bootloader magic {:#010x}", magic);
    } else if let Some(info) = unsafe { BootInfo::from_address(info_address) } {
        if let Some((lower, upper)) = info.memory_kib() {
            log::info!("memory: {} KiB lower, {} KiB upper", lower, upper);
        }
    }

    // === Phase 1: Console ===
    let mut kernel = Kernel::new(unsafe { PortBus::new() }, CONFIG);
    kernel.boot(&mut *CONSOLE.lock());
    vga::disable_hardware_cursor(&mut unsafe { PortBus::new() });

    // === Phase 2: Poll Loop ===
    kernel.run(&*CONSOLE)
}

/// This function is called on panic.
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    log::error!("{}", info);
    // Single execution context: whoever held the console is not coming back.
    unsafe { CONSOLE.force_unlock() };
    // The panic may come from writing at an off-grid cursor.
    CONSOLE.lock().reset_cursor_if_off_grid();
    println!("{}", info);
    kestrel::hlt_loop();
}

//! The single-threaded poll loop tying keyboard and console together.

use log::LevelFilter;
use spin::Mutex;

use crate::keyboard::{Dispatch, KeyboardDriver};
use crate::port::HardwarePort;
use crate::tabs::{TabRegistry, TAB_COUNT};
use crate::vga_buffer::{Console, ConsoleConfig, FrameBuffer};

pub const BANNER: &str = "Hello, kernel World!\n";

#[derive(Debug, Clone, Copy)]
pub struct KernelConfig {
    pub console: ConsoleConfig,
    pub banner: &'static str,
    pub log_level: LevelFilter,
    /// F1..F4 switch between virtual screens.
    pub tabs: bool,
}

impl KernelConfig {
    pub const fn new() -> KernelConfig {
        KernelConfig {
            console: ConsoleConfig::new(),
            banner: BANNER,
            log_level: LevelFilter::Info,
            tabs: false,
        }
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig::new()
    }
}

pub struct Kernel<P: HardwarePort> {
    config: KernelConfig,
    keyboard: KeyboardDriver<P>,
    tabs: Option<TabRegistry>,
}

impl<P: HardwarePort> Kernel<P> {
    pub fn new(port: P, config: KernelConfig) -> Self {
        Kernel {
            config,
            keyboard: KeyboardDriver::new(port),
            tabs: config
                .tabs
                .then(|| TabRegistry::new(config.console.default_color)),
        }
    }

    pub fn keyboard(&self) -> &KeyboardDriver<P> {
        &self.keyboard
    }

    pub fn active_tab(&self) -> Option<usize> {
        self.tabs.as_ref().map(TabRegistry::active)
    }

    pub fn boot<B: FrameBuffer>(&mut self, console: &mut Console<B>) {
        console.set_config(self.config.console);
        console.init();
        console.write_string(self.config.banner);
        log::info!("console ready, polling keyboard");
    }

    /// One poll-and-dispatch round.
    pub fn step<B: FrameBuffer>(&mut self, console: &mut Console<B>) -> Dispatch {
        let dispatch = self.keyboard.poll(console);
        if let (Dispatch::Function(n), Some(tabs)) = (dispatch, self.tabs.as_mut()) {
            let n = n as usize;
            if (1..=TAB_COUNT).contains(&n) {
                if let Err(err) = tabs.switch_to(console, n - 1) {
                    log::warn!("{}", err);
                }
            }
        }
        dispatch
    }

    /// Busy-polls forever. The console lock is only held for one step so a
    /// panic elsewhere can still print.
    pub fn run<B: FrameBuffer>(&mut self, console: &Mutex<Console<B>>) -> ! {
        loop {
            let mut console = console.lock();
            self.step(&mut *console);
        }
    }
}

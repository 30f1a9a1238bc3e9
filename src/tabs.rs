//! Virtual screens sharing the one physical text buffer.
//!
//! Only the active tab lives in the framebuffer. Switching copies the live
//! grid, cursor and color out into the outgoing tab and blits the incoming
//! one back in.

use core::fmt;

use crate::vga_buffer::{ColorCode, Console, FrameBuffer, ScreenChar, BUFFER_CELLS};

pub const TAB_COUNT: usize = 4;

#[derive(Clone)]
pub struct Tab {
    cells: [ScreenChar; BUFFER_CELLS],
    column: usize,
    row: usize,
    color_code: ColorCode,
}

impl Tab {
    fn blank(color_code: ColorCode) -> Tab {
        Tab {
            cells: [ScreenChar::blank(color_code); BUFFER_CELLS],
            column: 0,
            row: 0,
            color_code,
        }
    }

    fn save<B: FrameBuffer>(&mut self, console: &Console<B>) {
        for (offset, cell) in self.cells.iter_mut().enumerate() {
            *cell = console.buffer().read_cell(offset);
        }
        (self.column, self.row) = console.cursor_position();
        self.color_code = console.color();
    }

    fn restore<B: FrameBuffer>(&self, console: &mut Console<B>) {
        for (offset, &cell) in self.cells.iter().enumerate() {
            console.buffer_mut().write_cell(offset, cell);
        }
        console.set_cursor_position(self.column, self.row);
        console.set_color(self.color_code);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabError {
    OutOfRange { index: usize, count: usize },
}

impl fmt::Display for TabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabError::OutOfRange { index, count } => {
                write!(f, "tab {} does not exist ({} tabs)", index, count)
            }
        }
    }
}

pub struct TabRegistry {
    tabs: [Tab; TAB_COUNT],
    active: usize,
}

impl TabRegistry {
    /// Tab 0 is active and assumed to be whatever the console shows; the
    /// others start blank in `color_code`.
    pub fn new(color_code: ColorCode) -> TabRegistry {
        TabRegistry {
            tabs: core::array::from_fn(|_| Tab::blank(color_code)),
            active: 0,
        }
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn switch_to<B: FrameBuffer>(
        &mut self,
        console: &mut Console<B>,
        index: usize,
    ) -> Result<(), TabError> {
        if index >= TAB_COUNT {
            return Err(TabError::OutOfRange {
                index,
                count: TAB_COUNT,
            });
        }
        if index == self.active {
            return Ok(());
        }

        self.tabs[self.active].save(console);
        self.tabs[index].restore(console);
        log::debug!("switched from tab {} to tab {}", self.active, index);
        self.active = index;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vga_buffer::{Color, ConsoleConfig, MemoryBuffer, DEFAULT_COLOR};

    fn console() -> Console<MemoryBuffer> {
        let mut console = Console::new(MemoryBuffer::new(), ConsoleConfig::new());
        console.init();
        console
    }

    #[test]
    fn fresh_tab_is_blank() {
        let mut console = console();
        let mut tabs = TabRegistry::new(DEFAULT_COLOR);
        console.write_string("first");

        tabs.switch_to(&mut console, 2).unwrap();
        assert_eq!(tabs.active(), 2);
        assert!(console
            .buffer()
            .cells()
            .iter()
            .all(|cell| *cell == ScreenChar::blank(DEFAULT_COLOR)));
        assert_eq!(console.cursor_position(), (0, 0));
    }

    #[test]
    fn switching_back_restores_everything() {
        let mut console = console();
        let mut tabs = TabRegistry::new(DEFAULT_COLOR);
        let red = ColorCode::new(Color::Red, Color::Black);
        console.set_color(red);
        console.write_string_at("left", 10, 3);
        let snapshot = console.buffer().clone();

        tabs.switch_to(&mut console, 1).unwrap();
        console.write_string("right");
        tabs.switch_to(&mut console, 0).unwrap();

        assert!(console.buffer() == &snapshot);
        assert_eq!(console.cursor_position(), (14, 3));
        assert_eq!(console.color(), red);

        tabs.switch_to(&mut console, 1).unwrap();
        assert_eq!(&console.buffer().row_bytes(0)[..5], b"right");
        assert_eq!(console.color(), DEFAULT_COLOR);
    }

    #[test]
    fn switching_to_active_tab_is_a_no_op() {
        let mut console = console();
        let mut tabs = TabRegistry::new(DEFAULT_COLOR);
        console.write_string("stay");
        let snapshot = console.buffer().clone();
        tabs.switch_to(&mut console, 0).unwrap();
        assert!(console.buffer() == &snapshot);
        assert_eq!(console.cursor_position(), (4, 0));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut console = console();
        let mut tabs = TabRegistry::new(DEFAULT_COLOR);
        assert_eq!(
            tabs.switch_to(&mut console, TAB_COUNT),
            Err(TabError::OutOfRange {
                index: TAB_COUNT,
                count: TAB_COUNT
            })
        );
        assert_eq!(tabs.active(), 0);
    }
}

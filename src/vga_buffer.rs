use core::ffi::CStr;
use core::fmt;

use lazy_static::lazy_static;
use spin::Mutex;
use volatile::Volatile;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    Pink = 13,
    Yellow = 14,
    White = 15,
}

/// Attribute byte: foreground in the low nibble, background in the high one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ColorCode(u8);

impl ColorCode {
    pub const fn new(foreground: Color, background: Color) -> ColorCode {
        ColorCode((background as u8) << 4 | (foreground as u8))
    }

    pub const fn from_bits(bits: u8) -> ColorCode {
        ColorCode(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct ScreenChar {
    pub ascii_character: u8,
    pub color_code: ColorCode,
}

impl ScreenChar {
    pub const fn new(ascii_character: u8, color_code: ColorCode) -> ScreenChar {
        ScreenChar {
            ascii_character,
            color_code,
        }
    }

    pub const fn blank(color_code: ColorCode) -> ScreenChar {
        ScreenChar::new(b' ', color_code)
    }

    /// The 16-bit value the VGA hardware sees: character low, attribute high.
    pub const fn packed(self) -> u16 {
        (self.color_code.0 as u16) << 8 | self.ascii_character as u16
    }

    pub const fn from_packed(value: u16) -> ScreenChar {
        ScreenChar::new(value as u8, ColorCode((value >> 8) as u8))
    }
}

pub const BUFFER_HEIGHT: usize = 25;
pub const BUFFER_WIDTH: usize = 80;
pub const BUFFER_CELLS: usize = BUFFER_WIDTH * BUFFER_HEIGHT;

pub const VGA_BUFFER_ADDRESS: usize = 0xb8000;

/// White on black.
pub const DEFAULT_COLOR: ColorCode = ColorCode::new(Color::White, Color::Black);

/// A grid of `BUFFER_WIDTH * BUFFER_HEIGHT` cells addressed by linear offset
/// (`row * BUFFER_WIDTH + col`).
pub trait FrameBuffer {
    fn write_cell(&mut self, offset: usize, cell: ScreenChar);
    fn read_cell(&self, offset: usize) -> ScreenChar;
}

#[repr(transparent)]
struct Buffer {
    chars: [[Volatile<ScreenChar>; BUFFER_WIDTH]; BUFFER_HEIGHT],
}

/// The memory-mapped text buffer.
pub struct VgaBuffer {
    buffer: &'static mut Buffer,
}

impl VgaBuffer {
    /// # Safety
    /// `0xb8000` must be identity mapped and nothing else may hold a
    /// reference to the text buffer.
    pub unsafe fn new() -> VgaBuffer {
        VgaBuffer {
            buffer: &mut *(VGA_BUFFER_ADDRESS as *mut Buffer),
        }
    }
}

impl FrameBuffer for VgaBuffer {
    fn write_cell(&mut self, offset: usize, cell: ScreenChar) {
        self.buffer.chars[offset / BUFFER_WIDTH][offset % BUFFER_WIDTH].write(cell);
    }

    fn read_cell(&self, offset: usize) -> ScreenChar {
        self.buffer.chars[offset / BUFFER_WIDTH][offset % BUFFER_WIDTH].read()
    }
}

/// A plain array standing in for the text buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct MemoryBuffer {
    cells: [ScreenChar; BUFFER_CELLS],
}

impl MemoryBuffer {
    /// All cells start as the packed value `0x0000`.
    pub const fn new() -> MemoryBuffer {
        MemoryBuffer {
            cells: [ScreenChar::new(0, ColorCode(0)); BUFFER_CELLS],
        }
    }

    pub fn cells(&self) -> &[ScreenChar] {
        &self.cells
    }

    pub fn cell(&self, x: usize, y: usize) -> ScreenChar {
        self.cells[y * BUFFER_WIDTH + x]
    }

    /// Characters of one row, attributes dropped.
    pub fn row_bytes(&self, row: usize) -> [u8; BUFFER_WIDTH] {
        let mut bytes = [0; BUFFER_WIDTH];
        let start = row * BUFFER_WIDTH;
        for (byte, cell) in bytes.iter_mut().zip(&self.cells[start..start + BUFFER_WIDTH]) {
            *byte = cell.ascii_character;
        }
        bytes
    }
}

impl Default for MemoryBuffer {
    fn default() -> Self {
        MemoryBuffer::new()
    }
}

impl fmt::Debug for MemoryBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBuffer")
            .field("cells", &BUFFER_CELLS)
            .finish()
    }
}

impl FrameBuffer for MemoryBuffer {
    fn write_cell(&mut self, offset: usize, cell: ScreenChar) {
        self.cells[offset] = cell;
    }

    fn read_cell(&self, offset: usize) -> ScreenChar {
        self.cells[offset]
    }
}

/// What `put_char` does with `b'\n'`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFeed {
    /// Rendered like any other byte; layout is untouched.
    Glyph,
    /// Moves the cursor to column 0 of the next row, wrapping to the top.
    NewRow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub default_color: ColorCode,
    pub line_feed: LineFeed,
}

impl ConsoleConfig {
    pub const fn new() -> ConsoleConfig {
        ConsoleConfig {
            default_color: DEFAULT_COLOR,
            line_feed: LineFeed::Glyph,
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleConfig::new()
    }
}

/// Cursor, attribute and the grid they write into.
///
/// There is no scrolling: once the cursor runs off the last row it wraps to
/// row 0 and overwrites whatever is there.
pub struct Console<B: FrameBuffer> {
    row: usize,
    column: usize,
    color_code: ColorCode,
    config: ConsoleConfig,
    buffer: B,
}

impl<B: FrameBuffer> Console<B> {
    /// Wraps `buffer` without touching it; call [`Console::init`] before use.
    pub const fn new(buffer: B, config: ConsoleConfig) -> Console<B> {
        Console {
            row: 0,
            column: 0,
            color_code: config.default_color,
            config,
            buffer,
        }
    }

    pub fn init(&mut self) {
        self.color_code = self.config.default_color;
        self.clear();
    }

    pub fn set_color(&mut self, color_code: ColorCode) {
        self.color_code = color_code;
    }

    pub fn color(&self) -> ColorCode {
        self.color_code
    }

    pub fn config(&self) -> ConsoleConfig {
        self.config
    }

    /// `line_feed` applies from the next `put_char`; `default_color` only
    /// from the next `init`.
    pub fn set_config(&mut self, config: ConsoleConfig) {
        self.config = config;
    }

    /// Writes one cell at `(x, y)` without moving the cursor.
    ///
    /// Coordinates are not checked; `x >= BUFFER_WIDTH` spills into the next
    /// row and an offset past the grid panics.
    pub fn put_char_at(&mut self, byte: u8, color_code: ColorCode, x: usize, y: usize) {
        self.buffer
            .write_cell(y * BUFFER_WIDTH + x, ScreenChar::new(byte, color_code));
    }

    pub fn put_char(&mut self, byte: u8) {
        if byte == b'\n' && self.config.line_feed == LineFeed::NewRow {
            self.new_line();
            return;
        }

        self.put_char_at(byte, self.color_code, self.column, self.row);
        self.column += 1;
        if self.column >= BUFFER_WIDTH {
            self.new_line();
        }
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.put_char(byte);
        }
    }

    pub fn write_string(&mut self, s: &str) {
        self.write(s.as_bytes());
    }

    pub fn write_cstr(&mut self, s: &CStr) {
        self.write(s.to_bytes());
    }

    pub fn write_string_at(&mut self, s: &str, x: usize, y: usize) {
        self.set_cursor_position(x, y);
        self.write_string(s);
    }

    /// Not validated; an out-of-range position faults on the next write.
    pub fn set_cursor_position(&mut self, x: usize, y: usize) {
        self.column = x;
        self.row = y;
    }

    /// `(x, y)`, i.e. `(column, row)`.
    pub fn cursor_position(&self) -> (usize, usize) {
        (self.column, self.row)
    }

    /// Homes the cursor if it was placed outside the grid, so the next write
    /// cannot fault.
    pub fn reset_cursor_if_off_grid(&mut self) {
        if self.column >= BUFFER_WIDTH || self.row >= BUFFER_HEIGHT {
            self.set_cursor_position(0, 0);
        }
    }

    pub fn clear(&mut self) {
        let blank = ScreenChar::blank(self.color_code);
        for offset in 0..BUFFER_CELLS {
            self.buffer.write_cell(offset, blank);
        }
        self.set_cursor_position(0, 0);
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut B {
        &mut self.buffer
    }

    fn new_line(&mut self) {
        self.column = 0;
        self.row += 1;
        if self.row >= BUFFER_HEIGHT {
            self.row = 0;
        }
    }
}

impl<B: FrameBuffer> fmt::Write for Console<B> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_string(s);
        Ok(())
    }
}

lazy_static! {
    pub static ref CONSOLE: Mutex<Console<VgaBuffer>> =
        Mutex::new(Console::new(unsafe { VgaBuffer::new() }, ConsoleConfig::new()));
}

// ----------------------------------------------------------------------------------------
// Macros

#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ($crate::print!("{}\n", format_args!($($arg)*)));
}

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ($crate::vga_buffer::_print(format_args!($($arg)*)));
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    use core::fmt::Write;
    CONSOLE.lock().write_fmt(args).expect("console write failed");
}

// ----------------------------------------------------------------------------------------
// Tests

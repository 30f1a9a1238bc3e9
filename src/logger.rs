//! `log` backend writing to COM1.

use core::fmt;

use log::{LevelFilter, Metadata, Record, SetLoggerError};

use crate::serial::SERIAL1;

pub struct SerialLogger;

static LOGGER: SerialLogger = SerialLogger;

pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

impl log::Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // A record logged while the port is held (e.g. from a panic inside
        // serial_print!) is dropped rather than deadlocking.
        if let Some(mut serial) = SERIAL1.try_lock() {
            write_record(&mut *serial, record).expect("Serial write failed");
        }
    }

    fn flush(&self) {}
}

/// `LEVEL module~line - message`, with the crate prefix trimmed off the module.
pub fn write_record(out: &mut impl fmt::Write, record: &Record) -> fmt::Result {
    writeln!(
        out,
        "{:5} {}~{} - {}",
        record.level(),
        record
            .module_path()
            .unwrap_or("?")
            .trim_start_matches("kestrel::"),
        record.line().unwrap_or(0),
        record.args(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn record_line_layout() {
        let mut line = String::new();
        write_record(
            &mut line,
            &Record::builder()
                .level(Level::Warn)
                .module_path(Some("kestrel::tabs"))
                .line(Some(7))
                .args(format_args!("x"))
                .build(),
        )
        .unwrap();
        assert_eq!(line, "WARN  tabs~7 - x\n");
    }

    #[test]
    fn record_without_location() {
        let mut line = String::new();
        write_record(
            &mut line,
            &Record::builder()
                .level(Level::Error)
                .args(format_args!("boom {}", 1))
                .build(),
        )
        .unwrap();
        assert_eq!(line, "ERROR ?~0 - boom 1\n");
    }
}

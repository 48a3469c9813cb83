use ansi_term::{Colour, Style};
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Level-tagged diagnostics on stderr.
struct Logger;

static LOGGER: Logger = Logger;

/// Installs the logger. Warnings are always shown; each `-v` adds a level.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let style = match record.level() {
            Level::Error => Colour::Red.bold(),
            Level::Warn => Colour::Yellow.bold(),
            Level::Info => Style::new().bold(),
            Level::Debug | Level::Trace => Style::new().dimmed(),
        };
        eprintln!(
            "{} {}",
            style.paint(format!("{:<5}", record.level())),
            record.args()
        );
    }

    fn flush(&self) {}
}

use {
    log::{LevelFilter, Log, Metadata, Record},
    std::{
        io::Write,
        time::{SystemTime, UNIX_EPOCH},
    },
};

/// Writes every record to stdout, tagged with the name of the emitting thread.
///
/// Acquisition and polling threads are named (`camera-<n>`, `device-poll`),
/// so the thread tag tells which loop a line came from.
pub struct StdoutLogger {
    level: LevelFilter,
}

impl StdoutLogger {
    pub const fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// Render one record the way it is printed.
    pub fn format_record(record: &Record) -> String {
        let thread = std::thread::current();
        let thread_name = thread.name().map(str::to_string).unwrap_or_else(|| format!("{:?}", thread.id()));
        format!(
            "{} [{}] [{}] {}:{} - {}",
            format_timestamp(),
            record.level(),
            thread_name,
            record.file().unwrap_or("unknown"),
            record.line().unwrap_or(0),
            record.args()
        )
    }
}

impl Log for StdoutLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        println!("{}", Self::format_record(record));
    }

    fn flush(&self) {
        std::io::stdout().flush().ok();
    }
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.mmm`.
pub fn format_timestamp() -> String {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let secs = since_epoch.as_secs();
    let (year, month, day) = civil_from_days((secs / 86400) as i64);
    let time_of_day = secs % 86400;
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}",
        year,
        month,
        day,
        time_of_day / 3600,
        (time_of_day % 3600) / 60,
        time_of_day % 60,
        since_epoch.subsec_millis()
    )
}

// days since 1970-01-01 to (year, month, day), Hinnant's civil_from_days
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe as i64 + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}

/// Install a [`StdoutLogger`] as the global logger with the given max level.
///
/// Only the first call in a process installs anything; later calls are ignored.
pub fn init_logger(level: LevelFilter) {
    let logger: &'static StdoutLogger = Box::leak(Box::new(StdoutLogger::new(level)));
    if log::set_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}

/// Install the stdout logger at `Debug` for debug builds and `Info` for release builds.
pub fn init_stdout_logger() {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    init_logger(level);
}

//! Logger capturing records per thread, for asserting on log output in tests.

use std::sync::{Mutex, Once};
use std::thread::{self, ThreadId};

use log::{LevelFilter, Log, Metadata, Record};
use once_cell::sync::Lazy;

struct CaptureLogger {
    records: Mutex<Vec<(ThreadId, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records
            .lock()
            .unwrap()
            .push((thread::current().id(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: Lazy<CaptureLogger> = Lazy::new(|| CaptureLogger {
    records: Mutex::new(Vec::new()),
});

/// Install the capturing logger for this test binary.
pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        log::set_logger(&*LOGGER).expect("no other logger may be installed");
        log::set_max_level(LevelFilter::Trace);
    });
}

/// Take every message logged so far by the current thread.
pub fn take() -> Vec<String> {
    let id = thread::current().id();
    let mut records = LOGGER.records.lock().unwrap();
    let (mine, others): (Vec<_>, Vec<_>) = records.drain(..).partition(|(t, _)| *t == id);
    *records = others;
    mine.into_iter().map(|(_, msg)| msg).collect()
}

//! Browser console backend for the `log` facade.
//!
//! Records are written as `target: message key=value ...` to the console
//! method matching their level. Installed once by the wasm start hook;
//! native consumers bring their own logger, and [`init`] does nothing off
//! wasm32, where the console bindings do not exist.

use std::fmt::Write;

use log::kv::{self, Key, Value, VisitSource};
use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;
use web_sys::console;

#[cfg(target_arch = "wasm32")]
static LOGGER: ConsoleLogger = ConsoleLogger;

/// A [`Log`] implementation forwarding to `console.debug/info/warn/error`.
pub struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = JsValue::from_str(&format_record(record));
        match record.level() {
            Level::Error => console::error_1(&line),
            Level::Warn => console::warn_1(&line),
            Level::Info => console::info_1(&line),
            Level::Debug | Level::Trace => console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Install the panic hook and the console logger.
///
/// Safe to call more than once; only the first logger sticks.
#[cfg(target_arch = "wasm32")]
pub fn init(level: LevelFilter) {
    console_error_panic_hook::set_once();
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

/// No-op off wasm32: the process keeps whatever logger it installed.
#[cfg(not(target_arch = "wasm32"))]
pub fn init(_level: LevelFilter) {}

/// Render a record as one console line.
pub(crate) fn format_record(record: &Record<'_>) -> String {
    let mut line = format!("{}: {}", record.target(), record.args());
    // Writing into a String cannot fail.
    let _ = record.key_values().visit(&mut KeyValueWriter(&mut line));
    line
}

struct KeyValueWriter<'a>(&'a mut String);

impl<'kvs> VisitSource<'kvs> for KeyValueWriter<'_> {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), kv::Error> {
        write!(self.0, " {key}={value}").map_err(|_| kv::Error::msg("format failed"))
    }
}

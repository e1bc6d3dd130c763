//! Panic capture for guarded dispatch
//!
//! A process-wide hook records the message, location and backtrace of a
//! panic raised inside a guarded region, so the report can be sent to the
//! host instead of printed to a stream nobody reads. Panics outside a
//! guarded region go to the previously installed hook and, once the host
//! pipe is standard output, also to the host as an `error` line.

use bridge_log::LogEntry;
use bridge_wire::encode;
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

static INSTALL: Once = Once::new();
static FORWARD_TO_STDOUT: AtomicBool = AtomicBool::new(false);

thread_local! {
    static GUARD_DEPTH: Cell<usize> = const { Cell::new(0) };
    static LAST_REPORT: RefCell<Option<PanicReport>> = const { RefCell::new(None) };
}

/// What the hook saw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicReport {
    pub message: String,
    pub trace: String,
}

/// Installs the capturing hook once per process
pub fn install() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let message = payload_message(info.payload());
            let location = info
                .location()
                .map(|l| format!("at {}:{}:{}", l.file(), l.line(), l.column()))
                .unwrap_or_default();

            if GUARD_DEPTH.with(Cell::get) == 0 {
                previous(info);
                if FORWARD_TO_STDOUT.load(Ordering::Relaxed) {
                    if let Some(line) = unguarded_report(&message, &location) {
                        let mut stdout = io::stdout().lock();
                        let _ = stdout.write_all(line.as_bytes());
                        let _ = stdout.flush();
                    }
                }
                return;
            }

            let trace = format!("{}\n{}", location, Backtrace::force_capture());
            LAST_REPORT.with(|report| {
                *report.borrow_mut() = Some(PanicReport { message, trace });
            });
        }));
    });
}

/// Also reports unguarded panics on standard output
///
/// Called once standard output carries the host pipe.
pub fn forward_unguarded_to_stdout() {
    install();
    FORWARD_TO_STDOUT.store(true, Ordering::Relaxed);
}

/// Encodes an unguarded panic as an `error` line for the host
fn unguarded_report(message: &str, location: &str) -> Option<String> {
    let entry = LogEntry::error(format!("panicked outside a handler: {}", message))
        .with_field("location", location);
    encode(&entry.into_envelope()).ok()
}

/// Runs `f`, turning a panic into a [`PanicReport`]
pub fn catch<T>(f: impl FnOnce() -> T) -> Result<T, PanicReport> {
    install();
    GUARD_DEPTH.with(|depth| depth.set(depth.get() + 1));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    GUARD_DEPTH.with(|depth| depth.set(depth.get() - 1));

    outcome.map_err(|payload| {
        LAST_REPORT
            .with(|report| report.borrow_mut().take())
            .unwrap_or_else(|| PanicReport {
                message: payload_message(payload.as_ref()),
                trace: String::new(),
            })
    })
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

//! # Diagnostic Sink
//!
//! Destination of rendered trace lines and bug reports. Every call carries
//! exactly one complete line, so a sink that writes each call atomically
//! keeps lines intact under concurrency.
//!
//! Until [`set_sink`] installs one, lines go to standard error (`std`) or
//! are discarded (`no_std`).

use alloc::string::String;
use alloc::vec::Vec;

use spin::{Mutex, RwLock};

/// Line-oriented diagnostic output
pub trait Sink: Sync {
    /// Write one complete line (newline included)
    fn write_line(&self, line: &str);

    /// Write one usage-bug report (newline included)
    fn report_bug(&self, message: &str) {
        self.write_line(message);
    }

    /// Flush buffered output
    fn flush(&self) {}
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl Sink for NullSink {
    fn write_line(&self, _line: &str) {}
}

/// Writes each line to standard error with a single `write_all`
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

#[cfg(feature = "std")]
impl Sink for StderrSink {
    fn write_line(&self, line: &str) {
        use std::io::Write;
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
    }

    fn flush(&self) {
        use std::io::Write;
        let _ = std::io::stderr().flush();
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "std")] {
        static DEFAULT_SINK: StderrSink = StderrSink;
    } else {
        static DEFAULT_SINK: NullSink = NullSink;
    }
}

/// Installed sink
static SINK: RwLock<Option<&'static dyn Sink>> = RwLock::new(None);

/// Install the sink for all subsequent lines and return the one it replaces
pub fn set_sink(sink: &'static dyn Sink) -> Option<&'static dyn Sink> {
    let previous = SINK.write().replace(sink);
    log::debug!("helix-trace: sink installed");
    previous
}

/// Put back a sink returned by [`set_sink`] (`None` is the default sink)
pub fn restore_sink(previous: Option<&'static dyn Sink>) {
    let replaced = core::mem::replace(&mut *SINK.write(), previous);
    if let Some(replaced) = replaced {
        replaced.flush();
    }
}

/// Return to the default sink
pub fn reset_sink() {
    if let Some(previous) = SINK.write().take() {
        previous.flush();
        log::debug!("helix-trace: sink reset to default");
    }
}

/// Run `f` with the current sink
#[inline]
pub fn with_sink<T>(f: impl FnOnce(&dyn Sink) -> T) -> T {
    let installed = *SINK.read();
    match installed {
        Some(sink) => f(sink),
        None => f(&DEFAULT_SINK),
    }
}

/// Installs a sink for as long as it lives.
///
/// Dropping it, including during unwinding, puts the previous sink back.
#[must_use = "the sink is uninstalled when the scope is dropped"]
pub struct ScopedSink {
    previous: Option<&'static dyn Sink>,
}

impl ScopedSink {
    /// Install `sink` until the returned scope is dropped
    pub fn install(sink: &'static dyn Sink) -> Self {
        Self {
            previous: set_sink(sink),
        }
    }
}

impl Drop for ScopedSink {
    fn drop(&mut self) {
        restore_sink(self.previous);
    }
}

impl core::fmt::Debug for ScopedSink {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScopedSink")
            .field("restores_default", &self.previous.is_none())
            .finish()
    }
}

// =============================================================================
// MEMORY SINK
// =============================================================================

/// Sink that keeps every line in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
    bugs: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Empty sink, usable in a `static`
    pub const fn new() -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            bugs: Mutex::new(Vec::new()),
        }
    }

    /// Remove and return the captured lines, newlines stripped
    pub fn take_lines(&self) -> Vec<String> {
        core::mem::take(&mut *self.lines.lock())
    }

    /// Remove and return the captured bug reports, newlines stripped
    pub fn take_bugs(&self) -> Vec<String> {
        core::mem::take(&mut *self.bugs.lock())
    }

    /// Number of lines held
    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    /// Whether no line is held
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl Sink for MemorySink {
    fn write_line(&self, line: &str) {
        self.lines.lock().push(String::from(line.trim_end_matches('\n')));
    }

    fn report_bug(&self, message: &str) {
        let message = String::from(message.trim_end_matches('\n'));
        self.bugs.lock().push(message.clone());
        self.lines.lock().push(message);
    }
}

// =============================================================================
// CAPTURE
// =============================================================================

/// Everything written while a [`capture`] closure ran
#[derive(Debug, Clone, Default)]
pub struct Capture {
    /// Trace lines and bug reports in write order
    pub lines: Vec<String>,
    /// Bug reports only
    pub bugs: Vec<String>,
}

/// Panic raised by a nested [`capture`]
pub const NESTED_CAPTURE_MESSAGE: &str = "helix-trace: capture() cannot be nested";

static CAPTURE_SINK: MemorySink = MemorySink::new();
static CAPTURE_LOCK: Mutex<()> = Mutex::new(());

#[cfg(feature = "std")]
std::thread_local! {
    static CAPTURING: core::cell::Cell<bool> = const { core::cell::Cell::new(false) };
}

/// Marks the current thread as capturing; cleared on drop
struct CaptureFlag;

impl CaptureFlag {
    fn enter() -> Self {
        #[cfg(feature = "std")]
        if CAPTURING.with(|c| c.replace(true)) {
            panic!("{}", NESTED_CAPTURE_MESSAGE);
        }
        Self
    }
}

impl Drop for CaptureFlag {
    fn drop(&mut self) {
        #[cfg(feature = "std")]
        CAPTURING.with(|c| c.set(false));
    }
}

/// Run `f` with an in-memory sink installed and return what it wrote.
///
/// Captures are serialized process-wide, so tests running in parallel do
/// not see each other's lines. The previous sink is restored even if `f`
/// panics. Captures do not nest: under `std` a nested call panics, without
/// `std` it spins forever.
pub fn capture<T>(f: impl FnOnce() -> T) -> (T, Capture) {
    let flag = CaptureFlag::enter();
    let exclusive = CAPTURE_LOCK.lock();

    CAPTURE_SINK.take_lines();
    CAPTURE_SINK.take_bugs();
    let scope = ScopedSink::install(&CAPTURE_SINK);

    let result = f();

    let captured = Capture {
        lines: CAPTURE_SINK.take_lines(),
        bugs: CAPTURE_SINK.take_bugs(),
    };
    // reverse of acquisition order
    drop(scope);
    drop(exclusive);
    drop(flag);

    (result, captured)
}

// =============================================================================
// TESTS
// =============================================================================

//! Terminal output: prefixed log lines, status lines and a progress counter.
//!
//! ```ignore
//! log!("convert"; "Converting images to alternative format...");
//! debug!("select"; "{} staged", n);
//!
//! let progress = ProgressLine::new("convert", "images", 42);
//! progress.inc();
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// Set from `--verbose`.
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Progress lines currently on screen.
static BAR_COUNT: AtomicUsize = AtomicUsize::new(0);

pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// `log!("module"; "format {}", args)`: always printed.
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Like [`log!`], but only with `--verbose`.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

/// Write one `[module] message` line.
///
/// While a progress line is on screen it is cleared first; the next
/// `inc` redraws it below.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module, &module.to_ascii_lowercase());
    let mut out = stdout().lock();

    if BAR_COUNT.load(Ordering::SeqCst) > 0 {
        execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
    }
    writeln!(out, "{prefix} {message}").ok();
    out.flush().ok();
}

#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "convert" => prefix.bright_cyan().bold().to_string(),
        "done" => prefix.bright_blue().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

/// `[convert] ✓ message`
pub fn success(message: &str) {
    log("convert", &format!("{} {}", "✓".green(), message));
}

/// `[error] ✗ subject: detail`
pub fn failure(subject: &str, detail: &str) {
    log("error", &format!("{} {}: {}", "✗".red(), subject, detail.dimmed()));
}

// ============================================================================
// Progress Line
// ============================================================================

/// Single-line counter redrawn in place while workers run.
///
/// Displays: `[convert] images(42/69)`
///
/// Redraws go through `try_lock`: a worker that finds the line busy skips
/// the redraw instead of waiting.
pub struct ProgressLine {
    module: &'static str,
    label: &'static str,
    total: usize,
    done: AtomicUsize,
    redraw: Mutex<()>,
}

impl ProgressLine {
    pub fn new(module: &'static str, label: &'static str, total: usize) -> Self {
        BAR_COUNT.fetch_add(1, Ordering::SeqCst);
        let progress = Self {
            module,
            label,
            total,
            done: AtomicUsize::new(0),
            redraw: Mutex::new(()),
        };
        progress.draw(false);
        progress
    }

    /// Count one finished item.
    #[inline]
    pub fn inc(&self) {
        self.done.fetch_add(1, Ordering::Relaxed);
        if let Some(_guard) = self.redraw.try_lock() {
            self.draw(false);
        }
    }

    fn render(&self) -> String {
        let done = self.done.load(Ordering::Relaxed).min(self.total);
        format!("{}({}/{})", self.label, done, self.total)
    }

    fn draw(&self, keep: bool) {
        let prefix = colorize_prefix(self.module, self.module);
        let text = self.render();

        let mut out = stdout().lock();
        execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        if keep {
            writeln!(out, "{prefix} {text}").ok();
        } else {
            write!(out, "{prefix} {text}").ok();
        }
        out.flush().ok();
    }

    /// Leave the final count on screen.
    pub fn finish(self) {
        {
            let _guard = self.redraw.lock();
            self.draw(true);
        }
        BAR_COUNT.fetch_sub(1, Ordering::SeqCst);
        std::mem::forget(self);
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        BAR_COUNT.fetch_sub(1, Ordering::SeqCst);

        // Unfinished (early return on error): wipe the partial line
        let mut out = stdout().lock();
        execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        out.flush().ok();
    }
}

//! Incremental text rendering of run results.
//!
//! [`TextReporter`] layers rendering over a [`RunResult`] by
//! composition: every lifecycle method delegates to the result model
//! first, then appends to the output stream. State stays in the
//! `RunResult`; the reporter is a pure output projection.

pub mod error;

pub use error::ReportError;

use std::io::Write;

use chrono::Duration;

use crate::result::{RunResult, Step};
use crate::schema::RunSchema;

const SEPARATOR_BOLD: char = '=';
const SEPARATOR_LIGHT: char = '-';
const LINE_LENGTH: usize = 70;

/// Streams a formatted text report while lifecycle notifications
/// arrive.
///
/// Verbosity selects one of three modes:
/// - `0` quiet: step banners and summaries only
/// - `1` dotted: one character per item outcome
/// - `2+` verbose: one `<name> ... <status>` line per item
///
/// # Example
///
/// ```rust
/// use vigil::report::TextReporter;
/// use vigil::schema::RunSchema;
///
/// let mut reporter = TextReporter::new(&RunSchema::default(), Vec::new(), 1);
/// reporter.next_step().unwrap();
/// reporter.start_test("check_a").unwrap();
/// reporter.add_success("check_a").unwrap();
/// reporter.finish_step().unwrap();
///
/// let (result, stream) = reporter.into_parts();
/// assert!(result.all_monitors_passed());
/// let text = String::from_utf8(stream).unwrap();
/// assert!(text.contains("1 test in"));
/// assert!(text.contains("OK"));
/// ```
pub struct TextReporter<W: Write> {
    result: RunResult,
    stream: W,
    show_all: bool,
    use_dots: bool,
}

impl<W: Write> TextReporter<W> {
    /// Build a reporter over a fresh [`RunResult`] for `schema`.
    pub fn new(schema: &RunSchema, stream: W, verbosity: u8) -> Self {
        Self {
            result: RunResult::new(schema),
            stream,
            show_all: verbosity > 1,
            use_dots: verbosity == 1,
        }
    }

    /// The underlying result model, for the read-only query surface.
    pub fn result(&self) -> &RunResult {
        &self.result
    }

    /// Release the result model and the output stream.
    pub fn into_parts(self) -> (RunResult, W) {
        (self.result, self.stream)
    }

    /// Advance to the next step and write its title banner.
    pub fn next_step(&mut self) -> Result<(), ReportError> {
        self.result.next_step()?;
        let title = banner(self.result.current_step()?.name());
        writeln!(self.stream, "{}", title)?;
        Ok(())
    }

    /// Close the current step and render its tail: dot-line terminator,
    /// failure dump (when the step failed), footer, and summary.
    pub fn finish_step(&mut self) -> Result<(), ReportError> {
        self.result.finish_step()?;
        if self.use_dots {
            writeln!(self.stream)?;
        }
        let step = self.result.current_step()?;
        if !step.successful() {
            write_errors(&mut self.stream, step)?;
        }
        write_footer(&mut self.stream, step)?;
        write_summary(&mut self.stream, step)?;
        Ok(())
    }

    /// Register a monitor; in verbose mode, writes `<name> ... `.
    pub fn start_test(&mut self, name: &str) -> Result<(), ReportError> {
        self.result.start_test(name)?;
        self.write_item_start(name)
    }

    /// Record a passing monitor and emit its mark.
    pub fn add_success(&mut self, name: &str) -> Result<(), ReportError> {
        self.result.add_success(name)?;
        self.write_item_result(name, None)
    }

    /// Record a failed monitor and emit its mark.
    pub fn add_failure(&mut self, name: &str, error: &str) -> Result<(), ReportError> {
        self.result.add_failure(name, error)?;
        self.write_item_result(name, None)
    }

    /// Record an errored monitor and emit its mark.
    pub fn add_error(&mut self, name: &str, error: &str) -> Result<(), ReportError> {
        self.result.add_error(name, error)?;
        self.write_item_result(name, None)
    }

    /// Record a skipped monitor and emit its mark with the reason.
    pub fn add_skip(&mut self, name: &str, reason: &str) -> Result<(), ReportError> {
        self.result.add_skip(name, reason)?;
        self.write_item_result(name, Some(reason))
    }

    /// Record an expected failure and emit its mark.
    pub fn add_expected_failure(&mut self, name: &str, error: &str) -> Result<(), ReportError> {
        self.result.add_expected_failure(name, error)?;
        self.write_item_result(name, None)
    }

    /// Record an unexpected success and emit its mark.
    pub fn add_unexpected_success(&mut self, name: &str) -> Result<(), ReportError> {
        self.result.add_unexpected_success(name)?;
        self.write_item_result(name, None)
    }

    /// Register an action; in verbose mode, writes `<name> ... `.
    pub fn start_action(&mut self, name: &str) -> Result<(), ReportError> {
        self.result.start_action(name)?;
        self.write_item_start(name)
    }

    /// Record a completed action and emit its mark.
    pub fn add_action_success(&mut self, name: &str) -> Result<(), ReportError> {
        self.result.add_action_success(name)?;
        self.write_item_result(name, None)
    }

    /// Record a skipped action and emit its mark with the reason.
    pub fn add_action_skip(&mut self, name: &str, reason: &str) -> Result<(), ReportError> {
        self.result.add_action_skip(name, reason)?;
        self.write_item_result(name, Some(reason))
    }

    /// Record a failed action and emit its mark.
    pub fn add_action_error(&mut self, name: &str, error: &str) -> Result<(), ReportError> {
        self.result.add_action_error(name, error)?;
        self.write_item_result(name, None)
    }

    fn write_item_start(&mut self, name: &str) -> Result<(), ReportError> {
        if self.show_all {
            write!(self.stream, "{} ... ", name)?;
            self.stream.flush()?;
        }
        Ok(())
    }

    fn write_item_result(&mut self, name: &str, extra: Option<&str>) -> Result<(), ReportError> {
        let status = match self.result.current_step()?.item(name)?.status() {
            Some(status) => status,
            None => return Ok(()),
        };
        if self.show_all {
            match extra {
                Some(extra) => writeln!(self.stream, "{} ({})", status, extra)?,
                None => writeln!(self.stream, "{}", status)?,
            }
            self.stream.flush()?;
        } else if self.use_dots {
            write!(self.stream, "{}", status.dot())?;
            self.stream.flush()?;
        }
        Ok(())
    }
}

/// Centered title line: fill, one space, title, one space, fill.
/// When the width does not divide evenly the extra fill goes right.
fn banner(title: &str) -> String {
    let occupied = title.chars().count() + 2;
    let left = LINE_LENGTH.saturating_sub(occupied) / 2;
    let right = LINE_LENGTH.saturating_sub(occupied) - left;
    format!(
        "{} {} {}",
        separator(SEPARATOR_LIGHT, left),
        title,
        separator(SEPARATOR_LIGHT, right)
    )
}

fn separator(fill: char, width: usize) -> String {
    std::iter::repeat(fill).take(width).collect()
}

fn write_errors<W: Write>(stream: &mut W, step: &Step) -> Result<(), ReportError> {
    writeln!(stream)?;
    for &status in step.error_statuses() {
        for item in step.items_for_status(status) {
            writeln!(stream, "{}", separator(SEPARATOR_BOLD, LINE_LENGTH))?;
            writeln!(stream, "{}: {}", status, item.name())?;
            writeln!(stream, "{}", separator(SEPARATOR_LIGHT, LINE_LENGTH))?;
            writeln!(stream, "{}", item.error().unwrap_or(""))?;
            writeln!(stream)?;
        }
    }
    Ok(())
}

fn write_footer<W: Write>(stream: &mut W, step: &Step) -> Result<(), ReportError> {
    let count = step.number_of_items();
    writeln!(stream, "{}", separator(SEPARATOR_LIGHT, LINE_LENGTH))?;
    writeln!(
        stream,
        "{} {}{} in {:.3}s",
        count,
        step.kind().noun(),
        if count == 1 { "" } else { "s" },
        step.time_taken().map(to_secs).unwrap_or(0.0),
    )?;
    writeln!(stream)?;
    Ok(())
}

fn write_summary<W: Write>(stream: &mut W, step: &Step) -> Result<(), ReportError> {
    write!(
        stream,
        "{}",
        if step.successful() { "OK" } else { "FAILED" }
    )?;
    let counters: Vec<String> = step
        .infos()
        .into_iter()
        .filter(|&(_, count)| count > 0)
        .map(|(key, count)| format!("{}={}", key, count))
        .collect();
    if counters.is_empty() {
        writeln!(stream)?;
    } else {
        writeln!(stream, " ({})", counters.join(", "))?;
    }
    writeln!(stream)?;
    Ok(())
}

fn to_secs(elapsed: Duration) -> f64 {
    elapsed.num_milliseconds() as f64 / 1000.0
}

/// User interface and status output utilities
///
/// This module handles:
/// - Human-readable status lines on stderr
/// - Colored terminal text
/// - Error reporting on stderr
///
/// Step outputs (`key=value` lines) are plain `println!` in main so nothing
/// here can decorate them.
use std::io::Write;

/// Print colored text to stdout, with fallback to plain text
fn print_color(s: &str, fg: term::color::Color) {
    if !really_print_color(s, fg) {
        print!("{}", s);
    }

    fn really_print_color(s: &str, fg: term::color::Color) -> bool {
        let Some(mut t) = term::stdout() else {
            return false;
        };
        if t.fg(fg).is_err() {
            return false;
        }
        let _ = t.attr(term::Attr::Bold);
        if write!(t, "{}", s).is_err() {
            return false;
        }
        let _ = t.reset();
        true
    }
}

/// Print colored text to stderr, with fallback to plain text
fn eprint_color(s: &str, fg: term::color::Color) {
    if !really_eprint_color(s, fg) {
        eprint!("{}", s);
    }

    fn really_eprint_color(s: &str, fg: term::color::Color) -> bool {
        let Some(mut t) = term::stderr() else {
            return false;
        };
        if t.fg(fg).is_err() {
            return false;
        }
        let _ = t.attr(term::Attr::Bold);
        if write!(t, "{}", s).is_err() {
            return false;
        }
        let _ = t.reset();
        true
    }
}

/// Print a status message with "pipeline-kit: " prefix to stderr
///
/// Status goes to stderr so stdout stays machine-readable for `map-accounts`.
pub fn status(s: &str) {
    eprintln!("pipeline-kit: {}", s);
}

/// Print a success line, e.g. `Success: Generated PDF report: report.pdf`
pub fn print_success(msg: &str) {
    print_color("Success", term::color::BRIGHT_GREEN);
    println!(": {}", msg);
}

/// Print an error message with colored "error" prefix to stderr
pub fn print_error(msg: &str) {
    eprint_color("error", term::color::BRIGHT_RED);
    eprintln!(": {}", msg);
}

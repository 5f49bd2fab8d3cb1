//! Console messages for pipeline and benchmark runs

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::time::Duration;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Colour only when stdout is a terminal
fn color_choice() -> ColorChoice {
    if io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Print the failure of an external command: the command line and where to look
pub fn print_command_failure(command: &str, log_path: &Path, error: &dyn Display) {
    let _ = write_command_failure(command, log_path, error);
}

fn write_command_failure(command: &str, log_path: &Path, error: &dyn Display) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice());

    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    writeln!(stdout, "Error executing command line:")?;
    stdout.reset()?;
    writeln!(stdout, "\t{}", command)?;
    writeln!(stdout, "Reason: {}", error)?;
    writeln!(stdout, "Check log file: {}", log_path.display())?;

    Ok(())
}

/// Print a warning in yellow
pub fn print_warning(msg: &str) {
    let _ = write_tagged(Color::Yellow, "Warning:", msg);
}

/// Print an error in red
pub fn print_error(msg: &str) {
    let _ = write_tagged(Color::Red, "Error:", msg);
}

fn write_tagged(color: Color, tag: &str, msg: &str) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice());
    stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(stdout, "{}", tag)?;
    stdout.reset()?;
    writeln!(stdout, " {}", msg)?;
    Ok(())
}

/// Section header with the command about to run, e.g. `==== Parsing. Command: ...`
pub fn print_step(title: &str, command: &str) {
    let _ = write_step(title, command);
}

fn write_step(title: &str, command: &str) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice());
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    write!(stdout, "==== {}.", title)?;
    stdout.reset()?;
    if command.is_empty() {
        writeln!(stdout)?;
    } else {
        writeln!(stdout, " Command: {}", command)?;
    }
    Ok(())
}

/// Cumulative elapsed time after a stage
pub fn print_elapsed(elapsed: Duration) {
    println!("Elapsed time: {:.4}", elapsed.as_secs_f64());
}

/// Total elapsed time at the end of a run
pub fn print_total_elapsed(elapsed: Duration) {
    let mut stdout = StandardStream::stdout(color_choice());
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = writeln!(stdout, "### Elapsed time: {:.4} seconds", elapsed.as_secs_f64());
    let _ = stdout.reset();
}

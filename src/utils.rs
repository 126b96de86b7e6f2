//! User-facing messages
//!
//! Summaries printed at the end of a command. Diagnostics go through
//! `tracing` instead.

use std::fmt::Display;

use console::{Style, style};

/// # `MessageType`
/// Kind of message, with its label and output stream.
trait MessageType {
    /// Label printed before the title (e.g., "ERROR")
    const PREFIX: &'static str;

    /// Whether to output to stderr (true) or stdout (false)
    const TO_STDERR: bool = false;

    fn style() -> Style;
}

struct Error;
struct Warning;
struct Success;
struct Info;

impl MessageType for Error {
    const PREFIX: &'static str = "ERROR";
    const TO_STDERR: bool = true;

    fn style() -> Style {
        Style::new().red().bold()
    }
}

impl MessageType for Warning {
    const PREFIX: &'static str = "WARNING";
    const TO_STDERR: bool = true;

    fn style() -> Style {
        Style::new().yellow().bold()
    }
}

impl MessageType for Success {
    const PREFIX: &'static str = "SUCCESS";

    fn style() -> Style {
        Style::new().green().bold()
    }
}

impl MessageType for Info {
    const PREFIX: &'static str = "INFO";

    fn style() -> Style {
        Style::new().cyan()
    }
}

/// # `format_message`
/// Formats a message without suggestion.
///
/// ## Arguments
/// * `title` - The title of the message.
/// * `details` - The details of the message. Omitted when empty.
fn format_message<T: MessageType>(title: &str, details: &str) -> String {
    let prefix = T::style().apply_to(T::PREFIX);

    if details.is_empty() {
        format!("{prefix}: {title}")
    } else {
        format!("{prefix}: {title}\n\n{details}")
    }
}

fn format_message_with_suggestion<T: MessageType>(
    title: &str,
    details: &str,
    suggestion: &str,
) -> String {
    format!(
        "{}\n\n{}",
        format_message::<T>(title, details),
        style(suggestion).dim()
    )
}

fn emit<T: MessageType>(message: &str) {
    if T::TO_STDERR {
        eprintln!("{message}");
    } else {
        println!("{message}");
    }
}

/// # `print_error`
/// Prints an error message with a suggestion for resolving it.
pub fn print_error(title: &str, details: &str, suggestion: &str) {
    emit::<Error>(&format_message_with_suggestion::<Error>(
        title, details, suggestion,
    ));
}

/// # `print_warning`
pub fn print_warning(title: &str, details: &str) {
    emit::<Warning>(&format_message::<Warning>(title, details));
}

/// # `print_success`
pub fn print_success(title: &str, details: &str) {
    emit::<Success>(&format_message::<Success>(title, details));
}

/// # `print_info`
pub fn print_info(title: &str, details: &str) {
    emit::<Info>(&format_message::<Info>(title, details));
}

/// # `format_list`
/// Formats a list of items, one indented bullet per line.
///
/// ## Arguments
/// - `items`: The list of items to format.
pub fn format_list<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| format!("  - {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

use indicatif::{ProgressBar, ProgressStyle};
use std::io::{IsTerminal, Write};
use std::time::Duration;

const APP_TITLE: &str = "popcorn";

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}

/// Spinner shown while a request is in flight; structured logs instead when
/// not attached to a terminal.
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    pub fn start(message: &str, enabled: bool) -> Self {
        if !(enabled && is_interactive()) {
            tracing::info!(operation = "progress", message, "Request started");
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        bar.set_style(style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar: Some(bar) }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

/// Terminal window title for the active selection ("Movie | Title"), or the
/// app name when nothing is selected.
pub fn window_title(selection: Option<&str>) -> String {
    match selection {
        Some(title) => format!("Movie | {}", title),
        None => APP_TITLE.to_string(),
    }
}

pub fn set_terminal_title(selection: Option<&str>) {
    if !is_interactive() {
        return;
    }
    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "\x1b]0;{}\x07", window_title(selection));
    let _ = stdout.flush();
}

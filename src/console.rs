//! Terminal output for crawl progress and statistics.
//!
//! Styling is switched off when stdout is not a TTY or `NO_COLOR` is set.

use std::io::{self, IsTerminal, Write};

/// SGR attributes used by the crawler's output.
#[derive(Debug, Clone, Copy)]
pub enum Style {
    Bold,
    Dim,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Gray,
}

impl Style {
    fn code(self) -> &'static str {
        match self {
            Style::Bold => "1",
            Style::Dim => "2",
            Style::Green => "32",
            Style::Yellow => "33",
            Style::Blue => "34",
            Style::Magenta => "35",
            Style::Cyan => "36",
            Style::Gray => "90",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Writes labelled status lines and formats crawl figures.
#[derive(Debug)]
pub struct Console {
    colors_enabled: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    pub fn new() -> Self {
        let colors_enabled = std::env::var("NO_COLOR").is_err() && io::stdout().is_terminal();
        Self { colors_enabled }
    }

    pub fn with_colors(enabled: bool) -> Self {
        Self {
            colors_enabled: enabled,
        }
    }

    /// Wraps `text` in the given styles, or returns it unchanged when colors are off.
    pub fn style(&self, text: &str, styles: &[Style]) -> String {
        if !self.colors_enabled || styles.is_empty() {
            return text.to_string();
        }

        let codes: Vec<&str> = styles.iter().map(|s| s.code()).collect();
        format!("\x1b[{}m{}{}", codes.join(";"), text, RESET)
    }

    /// `[LABEL]` in bold `color`.
    pub fn label(&self, label: &str, color: Style) -> String {
        format!("[{}]", self.style(label, &[color, Style::Bold]))
    }

    fn line(&self, label: &str, color: Style, message: &str) {
        println!("{} {}", self.label(label, color), message);
    }

    pub fn info(&self, message: &str) {
        self.line("INFO", Style::Blue, message);
    }

    pub fn success(&self, message: &str) {
        self.line("OK", Style::Green, message);
    }

    pub fn warning(&self, message: &str) {
        self.line("WARN", Style::Yellow, message);
    }

    pub fn step(&self, message: &str) {
        self.line("STEP", Style::Cyan, message);
    }

    /// Blank line, then a magenta heading.
    pub fn section(&self, title: &str) {
        println!();
        println!("{}", self.style(title, &[Style::Magenta, Style::Bold]));
    }

    pub fn muted(&self, text: &str) -> String {
        self.style(text, &[Style::Gray, Style::Dim])
    }

    /// Erases the current line; a no-op without colors.
    pub fn clear_line(&self) {
        if self.colors_enabled {
            print!("\r\x1b[2K");
            let _ = io::stdout().flush();
        }
    }

    /// Rewrites the current line with a `[..]` progress message.
    pub fn progress_update(&self, message: &str) {
        self.clear_line();
        print!("{} {}", self.label("..", Style::Cyan), message);
        let _ = io::stdout().flush();
    }

    pub fn count(&self, n: usize) -> String {
        self.style(&n.to_string(), &[Style::Green, Style::Bold])
    }

    /// Monetary amount with two decimals.
    pub fn amount(&self, value: f64) -> String {
        self.style(&format!("{:.2}", value), &[Style::Yellow, Style::Bold])
    }

    /// `[Page 3/12]`, or `[Page 3]` while the total is unknown.
    pub fn page_info(&self, page: u32, total: Option<u32>) -> String {
        let text = match total {
            Some(total) => format!("[Page {}/{}]", page, total),
            None => format!("[Page {}]", page),
        };
        self.style(&text, &[Style::Cyan, Style::Bold])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_output_without_colors() {
        let console = Console::with_colors(false);
        assert_eq!(console.style("120", &[Style::Yellow]), "120");
        assert_eq!(console.label("WARN", Style::Yellow), "[WARN]");
        assert_eq!(console.muted("n/a"), "n/a");
    }

    #[test]
    fn test_styles_are_joined() {
        let console = Console::with_colors(true);
        let styled = console.style("Page", &[Style::Cyan, Style::Bold]);
        assert_eq!(styled, "\x1b[36;1mPage\x1b[0m");
    }

    #[test]
    fn test_page_info_and_amount() {
        let console = Console::with_colors(false);
        assert_eq!(console.page_info(3, Some(12)), "[Page 3/12]");
        assert_eq!(console.page_info(3, None), "[Page 3]");
        assert_eq!(console.amount(1234.5), "1234.50");
        assert_eq!(console.count(7), "7");
    }
}

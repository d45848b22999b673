//! Color output support for terminal formatting
//!
//! Every helper returns plain text when colors are disabled, so callers never
//! branch on the color setting themselves.

use nu_ansi_term::{Color, Style};

use crate::export::{Notice, Severity};

/// Color scheme for report output
#[derive(Debug, Clone, Copy)]
pub struct Colorizer {
    enabled: bool,
}

impl Colorizer {
    /// Create a new colorizer
    ///
    /// # Arguments
    /// * `enabled` - Enable color output
    ///
    /// # Returns
    /// * `Self` - New colorizer
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.enabled {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(Color::Green.normal(), text)
    }

    /// Error text, prefixed with `Error:`
    pub fn error(&self, text: &str) -> String {
        self.paint(Color::Red.bold(), &format!("Error: {text}"))
    }

    pub fn warning(&self, text: &str) -> String {
        self.paint(Color::Yellow.normal(), text)
    }

    pub fn info(&self, text: &str) -> String {
        self.paint(Color::Cyan.normal(), text)
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(Style::new().dimmed(), text)
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint(Style::new().bold(), text)
    }

    /// Render a notice with a severity marker
    pub fn notice(&self, notice: &Notice) -> String {
        let text = notice.to_string();
        match notice.severity {
            Severity::Error => self.paint(Color::Red.bold(), &format!("✗ {text}")),
            Severity::Warning => self.warning(&format!("! {text}")),
            Severity::Info => self.info(&format!("· {text}")),
        }
    }
}

//! Coloured output, disabled when stdout cannot show colour

use owo_colors::{OwoColorize, colors::css};

fn colour_enabled() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Extension trait for styling terminal output
pub trait Colorize {
    /// Confirmation of a completed change (green)
    fn success(&self) -> String;
    /// A tag beside a listing entry (blue)
    fn label(&self) -> String;
    /// Secondary information
    fn dim(&self) -> String;
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        let text = self.as_ref();
        if colour_enabled() {
            text.fg::<css::Green>().to_string()
        } else {
            text.to_string()
        }
    }

    fn label(&self) -> String {
        let text = self.as_ref();
        if colour_enabled() {
            text.fg::<css::LightBlue>().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self) -> String {
        let text = self.as_ref();
        if colour_enabled() {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }
}

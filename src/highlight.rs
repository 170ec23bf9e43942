use inksac::prelude::*;

/// Colors diagnostics when the terminal supports it.
#[derive(Debug, Clone, Copy)]
pub struct Highlighter {
    color_support: ColorSupport,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    pub fn new() -> Self {
        let support = check_color_support().unwrap_or(ColorSupport::NoColor);
        Self {
            color_support: support,
        }
    }

    pub fn plain() -> Self {
        Self {
            color_support: ColorSupport::NoColor,
        }
    }

    fn colored(&self) -> bool {
        !matches!(self.color_support, ColorSupport::NoColor)
    }

    pub fn highlight_error(&self, error: &str) -> String {
        if !self.colored() {
            return error.to_string();
        }

        let error_style = Style::builder().foreground(Color::Red).bold().build();
        error.style(error_style).to_string()
    }

    pub fn highlight_hint(&self, hint: &str) -> String {
        if !self.colored() {
            return hint.to_string();
        }

        let hint_style = Style::builder()
            .foreground(Color::RGB(128, 128, 128))
            .build();
        hint.style(hint_style).to_string()
    }
}

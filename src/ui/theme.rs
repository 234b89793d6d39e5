//! Colors and styles, chosen once from `ui.theme` and passed to rendering.

use ratatui::style::{Color, Modifier, Style};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub primary: Color,
    pub accent: Color,
    pub muted: Color,
    pub error: Color,
    pub text: Color,
    pub selected_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            primary: Color::Rgb(0x00, 0xD4, 0xAA),
            accent: Color::Rgb(0xF5, 0x9E, 0x0B),
            muted: Color::Rgb(0x6B, 0x72, 0x80),
            error: Color::Rgb(0xEF, 0x44, 0x44),
            text: Color::Rgb(0xE5, 0xE7, 0xEB),
            selected_fg: Color::White,
        }
    }

    pub fn light() -> Self {
        Self {
            primary: Color::Rgb(0x0F, 0x76, 0x6E),
            accent: Color::Rgb(0xB4, 0x53, 0x09),
            muted: Color::Rgb(0x6B, 0x72, 0x80),
            error: Color::Rgb(0xB9, 0x1C, 0x1C),
            text: Color::Rgb(0x1F, 0x29, 0x37),
            selected_fg: Color::White,
        }
    }

    /// Theme by config name. Unknown names fall back to `dark`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "dark" | "" => Self::dark(),
            "light" => Self::light(),
            other => {
                warn!("Unknown theme `{}`, using dark", other);
                Self::dark()
            }
        }
    }

    pub fn header(&self) -> Style {
        Style::new().fg(self.primary).add_modifier(Modifier::BOLD)
    }

    pub fn mode(&self) -> Style {
        Style::new().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn item(&self) -> Style {
        Style::new().fg(self.text)
    }

    pub fn selected(&self) -> Style {
        Style::new().fg(self.selected_fg).bg(self.primary)
    }

    pub fn failed(&self) -> Style {
        Style::new().fg(self.error)
    }

    pub fn dim(&self) -> Style {
        Style::new().fg(self.muted)
    }

    pub fn hint(&self) -> Style {
        Style::new().fg(self.muted).add_modifier(Modifier::ITALIC)
    }

    pub fn status(&self) -> Style {
        Style::new().fg(self.primary).add_modifier(Modifier::BOLD)
    }

    pub fn error(&self) -> Style {
        Style::new().fg(self.error).add_modifier(Modifier::BOLD)
    }
}

//! Styling for table and histogram text.
//!
//! Two palettes: ANSI colors, or reverse video only when colors are disabled.

use crate::types::TaskState;
use ratatui::style::{Color, Modifier, Style};

/// Percentages above this are drawn as hot.
pub const HOT_THRESHOLD: f64 = 90.0;

/// Presentation styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    color: bool,
}

impl Theme {
    /// Creates a theme; `color == false` uses reverse video for emphasis.
    #[must_use]
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Returns true if colors are enabled.
    #[must_use]
    pub fn is_color(&self) -> bool {
        self.color
    }

    fn reversed() -> Style {
        Style::default().add_modifier(Modifier::REVERSED)
    }

    fn fg(&self, color: Color) -> Style {
        if self.color {
            Style::default().fg(color)
        } else {
            Style::default()
        }
    }

    /// Table headers and histogram frame lines.
    #[must_use]
    pub fn header(&self) -> Style {
        if self.color {
            Style::default().fg(Color::White).bg(Color::Blue)
        } else {
            Self::reversed()
        }
    }

    /// A percentage cell.
    #[must_use]
    pub fn value(&self, pct: f64) -> Style {
        self.fg(if pct > HOT_THRESHOLD { Color::Red } else { Color::Green })
    }

    /// The state column.
    #[must_use]
    pub fn state(&self, state: TaskState) -> Style {
        self.fg(if state == TaskState::DiskWait { Color::Red } else { Color::Green })
    }

    /// The pid column of a process row.
    #[must_use]
    pub fn pid(&self) -> Style {
        self.fg(Color::Blue)
    }

    /// The name cell of the selected row.
    #[must_use]
    pub fn selected(&self) -> Style {
        if self.color {
            Style::default().bg(Color::Magenta)
        } else {
            Self::reversed()
        }
    }

    /// Trailing core column.
    #[must_use]
    pub fn core(&self, switched: bool) -> Style {
        self.fg(if switched { Color::Red } else { Color::Green })
    }

    /// A filled histogram cell.
    #[must_use]
    pub fn bar_filled(&self) -> Style {
        if self.color {
            Style::default().bg(Color::Green)
        } else {
            Self::reversed()
        }
    }

    /// An empty histogram cell.
    #[must_use]
    pub fn bar_empty(&self) -> Style {
        self.fg(Color::White)
    }

    /// Unstyled text.
    #[must_use]
    pub fn plain(&self) -> Style {
        Style::default()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(true)
    }
}

//! Text renderers for the cycle report and session history.
//!
//! - [`table`]: CPU core table and process/thread table
//! - [`histogram`]: min/max scaled bar chart of one entity's history
//!
//! Renderers emit styled [`Line`]s and share one [`RowBudget`], so the
//! histogram only gets the rows the tables left over.

pub mod histogram;
pub mod table;

pub use histogram::{histogram_section, Glyph, HistogramRow, HistoryHistogram};
pub use table::{CpuTable, ProcessTable, TableOutput};

use ratatui::text::Line;

/// Columns reserved left of the histogram for the percentage axis.
pub const LABEL_GUTTER: usize = 10;

/// Rows reserved below the tables for the prompt and frame.
const RESERVED_ROWS: usize = 3;

/// Terminal size for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Terminal height.
    pub rows: u16,
    /// Terminal width.
    pub columns: u16,
}

impl Geometry {
    /// Creates a geometry.
    #[must_use]
    pub fn new(rows: u16, columns: u16) -> Self {
        Self { rows, columns }
    }

    /// Rows available to the tables and the histogram body.
    #[must_use]
    pub fn row_budget(&self) -> usize {
        usize::from(self.rows).saturating_sub(RESERVED_ROWS)
    }

    /// Glyph columns available to the histogram.
    #[must_use]
    pub fn histogram_width(&self) -> usize {
        usize::from(self.columns).saturating_sub(LABEL_GUTTER)
    }
}

/// Counts emitted rows against a fixed limit.
///
/// Once the limit is reached further rows are dropped silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBudget {
    limit: usize,
    used: usize,
}

impl RowBudget {
    /// Creates a budget of `limit` rows.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self { limit, used: 0 }
    }

    /// Pushes `line` if a row is left. Returns false when it was dropped.
    pub fn try_push(&mut self, out: &mut Vec<Line<'static>>, line: Line<'static>) -> bool {
        if self.is_exhausted() {
            return false;
        }
        out.push(line);
        self.used += 1;
        true
    }

    /// Rows still available.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.limit - self.used
    }

    /// Rows emitted so far.
    #[must_use]
    pub fn used(&self) -> usize {
        self.used
    }

    /// Returns true when no row is left.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.used >= self.limit
    }
}

/// Concatenates the text of a line, dropping styles.
#[must_use]
pub fn plain_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect()
}

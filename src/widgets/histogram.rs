//! ASCII bar chart of one entity's CPU history.
//!
//! Values are scaled to the entity's own session extrema, so a full column
//! means "as busy as this entity has ever been", not 100%.
//!
//! ```text
//! vvv Maximum CPU seen for pid 913, 40.00%:
//!  40.00% ______####
//!  30.00% ____######
//!  20.00% __########
//!  10.00% ##########
//! ^^^ Minimum CPU seen for pid 913, 0.00% yatop, ...
//! ```

use super::{Geometry, RowBudget};
use crate::history::HistorySeries;
use crate::theme::Theme;
use crate::types::{Bounds, EntityId};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

/// Key hint shown after the minimum line.
pub const KEY_HINT: &str = " yatop, yet another top: use j,k,up/down to select processes, q to quit";

/// One histogram cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// The bar reaches this row.
    Filled,
    /// The bar is below this row.
    Empty,
    /// No scale: the series never varied.
    Unknown,
}

impl Glyph {
    /// Returns the drawn character.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::Filled => '#',
            Self::Empty => '_',
            Self::Unknown => '?',
        }
    }
}

/// One chart row: axis label and cells.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramRow {
    /// Percentage at the top of this row.
    pub value: f64,
    /// One glyph per drawn history value.
    pub cells: Vec<Glyph>,
}

impl HistogramRow {
    /// Axis label, right-aligned to seven columns.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{:>7}", format!("{:.2}%", self.value))
    }

    /// Row as plain text.
    #[must_use]
    pub fn text(&self) -> String {
        let cells: String = self.cells.iter().map(|g| g.as_char()).collect();
        format!("{} {cells}", self.label())
    }
}

/// Histogram over the newest values of a series.
#[derive(Debug, Clone)]
pub struct HistoryHistogram<'a> {
    values: &'a [f64],
    bounds: Bounds,
    height: usize,
    theme: Theme,
}

impl<'a> HistoryHistogram<'a> {
    /// Draws the newest `width` values of `series` over `height` rows.
    #[must_use]
    pub fn new(series: &'a HistorySeries, width: usize, height: usize) -> Self {
        Self::from_values(series.last_n(width), series.bounds(), height)
    }

    /// Draws `values` scaled to `bounds`.
    #[must_use]
    pub fn from_values(values: &'a [f64], bounds: Bounds, height: usize) -> Self {
        Self { values, bounds, height, theme: Theme::default() }
    }

    /// Sets the theme.
    #[must_use]
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    fn glyph(&self, value: f64, row: usize) -> Glyph {
        let range = self.bounds.range();
        if range.is_nan() || range <= 0.0 {
            return Glyph::Unknown;
        }
        let height = self.height as f64;
        let t = (value - self.bounds.min) / range;
        let y = (height - t * height).round();
        if y <= row as f64 {
            Glyph::Filled
        } else {
            Glyph::Empty
        }
    }

    /// Computes the chart, highest percentage first.
    #[must_use]
    pub fn rows(&self) -> Vec<HistogramRow> {
        let range = self.bounds.range();
        let step = if self.height == 0 { 0.0 } else { range / self.height as f64 };
        (0..self.height)
            .map(|row| HistogramRow {
                value: self.bounds.min + (self.height - row) as f64 * step,
                cells: self.values.iter().map(|&v| self.glyph(v, row)).collect(),
            })
            .collect()
    }

    /// Styled chart lines.
    #[must_use]
    pub fn lines(&self) -> Vec<Line<'static>> {
        self.rows()
            .into_iter()
            .map(|row| {
                let mut spans = Vec::with_capacity(row.cells.len() + 1);
                spans.push(Span::raw(format!("{} ", row.label())));
                spans.extend(row.cells.iter().map(|glyph| {
                    let style = match glyph {
                        Glyph::Filled => self.theme.bar_filled(),
                        Glyph::Empty => self.theme.bar_empty(),
                        Glyph::Unknown => self.theme.plain(),
                    };
                    Span::styled(glyph.as_char().to_string(), style)
                }));
                Line::from(spans)
            })
            .collect()
    }
}

impl Widget for HistoryHistogram<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        for (offset, line) in self.lines().iter().enumerate().take(usize::from(area.height)) {
            buf.set_line(area.x, area.y + offset as u16, line, area.width);
        }
    }
}

/// Framed histogram for `id`, sized to what is left of `budget`.
///
/// Empty when two rows or fewer remain. One remaining row is given up to the
/// frame, so the section is `remaining + 1` lines tall: the rows reserved
/// below the tables absorb the extra line.
#[must_use]
pub fn histogram_section(
    id: EntityId,
    series: &HistorySeries,
    geometry: Geometry,
    budget: &RowBudget,
    theme: Theme,
) -> Vec<Line<'static>> {
    let remaining = budget.remaining();
    if remaining <= 2 {
        return Vec::new();
    }
    let height = remaining - 1;

    let mut lines = Vec::with_capacity(height + 2);
    lines.push(Line::from(vec![
        Span::styled(format!("vvv Maximum CPU seen for {id}, {:.2}%", series.max()), theme.header()),
        Span::raw(":"),
    ]));
    lines.extend(HistoryHistogram::new(series, geometry.histogram_width(), height).theme(theme).lines());
    lines.push(Line::from(vec![
        Span::styled(format!("^^^ Minimum CPU seen for {id}, {:.2}%", series.min()), theme.header()),
        Span::raw(KEY_HINT),
    ]));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryStore;
    use crate::widgets::plain_text;

    #[test]
    fn test_scaled_columns() {
        let values = [0.0, 50.0, 100.0];
        let chart = HistoryHistogram::from_values(&values, Bounds { min: 0.0, max: 100.0 }, 4);
        let text: Vec<String> = chart.rows().iter().map(HistogramRow::text).collect();
        assert_eq!(text, vec!["100.00% __#", " 75.00% __#", " 50.00% _##", " 25.00% _##"]);
    }

    #[test]
    fn test_flat_series_is_unknown() {
        let values = [5.0, 5.0, 5.0];
        let chart = HistoryHistogram::from_values(&values, Bounds::seeded(5.0), 3);
        for row in chart.rows() {
            assert!(row.cells.iter().all(|g| *g == Glyph::Unknown));
            assert_eq!(row.cells.len(), 3);
        }
    }

    #[test]
    fn test_width_keeps_newest_values() {
        let mut store = HistoryStore::new();
        let id = EntityId::Process(1);
        for v in [100.0, 0.0, 0.0] {
            store.append(id, v, 0.0, 100.0);
        }
        let chart = HistoryHistogram::new(store.get(id).unwrap(), 2, 2);
        for row in chart.rows() {
            assert_eq!(row.cells, vec![Glyph::Empty, Glyph::Empty]);
        }
    }

    #[test]
    fn test_zero_height() {
        let chart = HistoryHistogram::from_values(&[1.0], Bounds { min: 0.0, max: 2.0 }, 0);
        assert!(chart.rows().is_empty());
    }

    #[test]
    fn test_section_framing_and_budget() {
        let mut store = HistoryStore::new();
        let id = EntityId::Process(913);
        store.append(id, 10.0, 0.0, 40.0);
        let series = store.get(id).unwrap();
        let geometry = Geometry::new(24, 80);

        let section = histogram_section(id, series, geometry, &RowBudget::new(6), Theme::new(false));
        assert_eq!(section.len(), 7);
        assert_eq!(plain_text(&section[0]), "vvv Maximum CPU seen for pid 913, 40.00%:");
        assert!(plain_text(&section[6]).starts_with("^^^ Minimum CPU seen for pid 913, 0.00% yatop"));

        assert!(histogram_section(id, series, geometry, &RowBudget::new(2), Theme::default()).is_empty());
    }

    #[test]
    fn test_widget_render() {
        let values = [0.0, 10.0];
        let chart = HistoryHistogram::from_values(&values, Bounds { min: 0.0, max: 10.0 }, 2);
        let area = Rect::new(0, 0, 12, 2);
        let mut buf = Buffer::empty(area);
        chart.render(area, &mut buf);
        let top: String = (0..10u16).map(|x| buf[(x, 0u16)].symbol().to_string()).collect();
        assert_eq!(top, " 10.00% _#");
    }
}

//! Sampling loop: capture, compare, render, record, wait for a key.

use crate::collectors::{Snapshot, SnapshotSource};
use crate::config::Config;
use crate::delta::{DeltaEngine, Focus};
use crate::error::Result;
use crate::history::HistoryStore;
use crate::input::{EventSource, InputHandler, TerminalEvents};
use crate::state::Navigator;
use crate::theme::Theme;
use crate::types::EntityId;
use crate::widgets::{histogram_section, plain_text, CpuTable, Geometry, ProcessTable, RowBudget};

use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::{Terminal, TerminalOptions, Viewport};
use std::io::{stdout, IsTerminal, Write};

/// Geometry used when stdout is not a terminal.
const DETACHED_GEOMETRY: Geometry = Geometry { rows: u16::MAX, columns: 200 };

/// The monitoring application.
pub struct App<S> {
    config: Config,
    source: S,
    engine: DeltaEngine,
    history: HistoryStore,
    navigator: Navigator,
    theme: Theme,
    input: InputHandler,
}

impl<S: SnapshotSource> App<S> {
    /// Creates an application reading from `source`.
    #[must_use]
    pub fn new(config: Config, source: S, tick_rate: u64) -> Self {
        tracing::info!(
            pid = ?config.pid,
            ignore = config.ignore,
            delay_secs = config.delay_secs,
            show_all = config.show_all,
            tick_rate,
            source = source.id(),
            "session configured"
        );
        Self {
            engine: DeltaEngine::new(config.delta_options(tick_rate)),
            history: HistoryStore::new(),
            navigator: Navigator::new(config.pid),
            theme: Theme::new(!config.no_color),
            input: InputHandler::new(config.vim_keys),
            source,
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the session history.
    #[must_use]
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Returns the navigation state.
    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Captures one snapshot from the source.
    ///
    /// # Errors
    ///
    /// Fails only when the core list cannot be read.
    pub fn capture(&mut self) -> Result<Snapshot> {
        Snapshot::capture(&mut self.source).map_err(|e| {
            tracing::error!(error = %e, "snapshot capture failed");
            e
        })
    }

    /// Runs one interactive cycle and returns the screen lines.
    ///
    /// Computes the delta, renders both tables, updates navigation from what
    /// was rendered, appends to history and draws the selected entity's
    /// histogram below the tables.
    pub fn cycle(&mut self, prev: &Snapshot, curr: &mut Snapshot, geometry: Geometry) -> Vec<Line<'static>> {
        self.navigator.resolve(prev);
        let report = self.engine.compute(prev, curr, &self.navigator.focus());

        let mut budget = RowBudget::new(geometry.row_budget());
        let mut lines = Vec::new();
        CpuTable::new(&report.cpus, self.theme).render(&mut budget, &mut lines);
        let output = ProcessTable::new(&report.processes, self.theme)
            .selected(self.navigator.selected())
            .auto_pick(self.navigator.auto_pick())
            .render(&mut budget, &mut lines);
        self.navigator.observe_render(output.rendered, output.highlighted);

        self.history.record(&report);

        if !self.config.no_histogram {
            if let Some(id) = self.navigator.selected() {
                if let Some(series) = self.history.get(id) {
                    lines.extend(histogram_section(id, series, geometry, &budget, self.theme));
                }
            }
        }
        lines
    }

    /// Renders one comparison without touching history or navigation.
    pub fn snapshot_lines(&self, prev: &Snapshot, curr: &mut Snapshot, geometry: Geometry) -> Vec<Line<'static>> {
        let selected = self.config.pid.map(|id| match prev.owner_of(id) {
            Some(pid) if prev.process(id).is_none() => EntityId::Thread { pid, tid: id },
            _ => EntityId::Process(id),
        });
        let report = self.engine.compute(prev, curr, &Focus { selected, filter: self.config.pid });

        let mut budget = RowBudget::new(geometry.row_budget());
        let mut lines = Vec::new();
        CpuTable::new(&report.cpus, self.theme).render(&mut budget, &mut lines);
        ProcessTable::new(&report.processes, self.theme).selected(selected).render(&mut budget, &mut lines);
        lines
    }

    /// Takes two samples `delay` apart and returns the rendered comparison.
    ///
    /// # Errors
    ///
    /// Fails only when the core list cannot be read.
    pub fn sample_once(&mut self, geometry: Geometry) -> Result<Vec<Line<'static>>> {
        let prev = self.capture()?;
        std::thread::sleep(self.config.delay());
        let mut curr = self.capture()?;
        Ok(self.snapshot_lines(&prev, &mut curr, geometry))
    }

    /// Single-shot mode: print one comparison and return.
    ///
    /// Styled output goes through an inline viewport when stdout is a
    /// terminal and colors are on; otherwise plain text is written.
    ///
    /// # Errors
    ///
    /// Returns an error if sampling or writing fails.
    pub fn run_once(&mut self) -> Result<()> {
        let interactive = stdout().is_terminal();
        let geometry = if interactive {
            crossterm::terminal::size().map_or(DETACHED_GEOMETRY, |(columns, rows)| Geometry::new(rows, columns))
        } else {
            DETACHED_GEOMETRY
        };
        let lines = self.sample_once(geometry)?;

        if interactive && !self.config.no_color {
            let height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
            let mut terminal = Terminal::with_options(
                CrosstermBackend::new(stdout()),
                TerminalOptions { viewport: Viewport::Inline(height) },
            )?;
            terminal.draw(|frame| frame.render_widget(Paragraph::new(lines), frame.area()))?;
            println!();
            Ok(())
        } else {
            write_plain(&mut stdout().lock(), &lines)
        }
    }

    /// Interactive mode on the controlling terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup, sampling or rendering fails.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        let mut events = TerminalEvents::new(self.input.clone());

        let result = self.run_loop(&mut terminal, &mut events);

        disable_raw_mode()?;
        stdout().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// The sampling loop, generic over backend and event source.
    ///
    /// Each iteration waits for one event (the wait is the sample interval),
    /// applies it, then samples and draws. Quit is the only exit.
    ///
    /// # Errors
    ///
    /// Returns an error if sampling, input or drawing fails.
    pub fn run_loop<B: Backend, E: EventSource>(&mut self, terminal: &mut Terminal<B>, events: &mut E) -> Result<()> {
        let mut prev = self.capture()?;
        loop {
            let event = events.next_event(self.config.delay())?;
            self.navigator.navigate(event);
            if self.navigator.should_quit() {
                tracing::info!(entities = self.history.len(), "quit requested");
                return Ok(());
            }

            let mut curr = self.capture()?;
            let size = terminal.size()?;
            let lines = self.cycle(&prev, &mut curr, Geometry::new(size.height, size.width));
            terminal.draw(|frame| frame.render_widget(Paragraph::new(lines), frame.area()))?;
            prev = curr;
        }
    }
}

/// Writes lines as unstyled text.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_plain<W: Write>(out: &mut W, lines: &[Line<'_>]) -> Result<()> {
    for line in lines {
        writeln!(out, "{}", plain_text(line))?;
    }
    out.flush()?;
    Ok(())
}

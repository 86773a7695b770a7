//! CPU core table and process/thread table.

use super::RowBudget;
use crate::delta::{CpuMetrics, ProcessMetrics, TaskMetrics};
use crate::theme::Theme;
use crate::types::{EntityId, EntityKind};
use ratatui::text::{Line, Span};

/// Header of the CPU core table.
pub const CPU_HEADER: &str = "CPU UsrTime   SysTime     Idle   IoWait     Ireq  SoftIrq";

/// Header of the process table.
pub const PROCESS_HEADER: &str = "PID  State     Process name       CPU     USER%  SYSTEM%      Cpu%   CpuMin%   CpuMax%  IOWait%   IoMin%   IoMax% CPUs";

/// Longest name shown before truncation.
const NAME_WIDTH: usize = 21;

/// Per-core utilization table.
#[derive(Debug, Clone)]
pub struct CpuTable<'a> {
    rows: &'a [CpuMetrics],
    theme: Theme,
}

impl<'a> CpuTable<'a> {
    /// Creates a table over the cycle's core rows.
    #[must_use]
    pub fn new(rows: &'a [CpuMetrics], theme: Theme) -> Self {
        Self { rows, theme }
    }

    /// Emits the header and visible core rows until the budget runs out.
    pub fn render(&self, budget: &mut RowBudget, out: &mut Vec<Line<'static>>) {
        if !budget.try_push(out, Line::styled(CPU_HEADER, self.theme.header())) {
            return;
        }
        for row in self.rows.iter().filter(|row| row.visible) {
            if !budget.try_push(out, self.row(row)) {
                return;
            }
        }
    }

    fn row(&self, row: &CpuMetrics) -> Line<'static> {
        let mut spans = vec![Span::raw(format!("{:3}", row.core))];
        for pct in [row.user_pct, row.system_pct, row.idle_pct, row.iowait_pct, row.irq_pct, row.softirq_pct] {
            spans.push(Span::styled(format!("{pct:8.2}%"), self.theme.value(pct)));
        }
        Line::from(spans)
    }
}

/// What the process table drew.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOutput {
    /// Process and thread rows in display order.
    pub rendered: Vec<EntityId>,
    /// The row drawn with the selection style.
    pub highlighted: Option<EntityId>,
}

/// Process table with threads indented beneath their owner.
#[derive(Debug, Clone)]
pub struct ProcessTable<'a> {
    processes: &'a [ProcessMetrics],
    theme: Theme,
    selected: Option<EntityId>,
    auto_pick: bool,
}

impl<'a> ProcessTable<'a> {
    /// Creates a table over the cycle's process rows.
    #[must_use]
    pub fn new(processes: &'a [ProcessMetrics], theme: Theme) -> Self {
        Self { processes, theme, selected: None, auto_pick: false }
    }

    /// Sets the entity to highlight.
    #[must_use]
    pub fn selected(mut self, selected: Option<EntityId>) -> Self {
        self.selected = selected;
        self
    }

    /// Highlight the first process row when nothing is selected.
    #[must_use]
    pub fn auto_pick(mut self, auto_pick: bool) -> Self {
        self.auto_pick = auto_pick;
        self
    }

    /// Emits the header and visible rows until the budget runs out.
    pub fn render(&self, budget: &mut RowBudget, out: &mut Vec<Line<'static>>) -> TableOutput {
        let mut output = TableOutput::default();
        if !budget.try_push(out, Line::styled(PROCESS_HEADER, self.theme.header())) {
            return output;
        }

        for process in self.processes.iter().filter(|p| p.task.visible) {
            let pid = process.pid();
            let prefix = Span::styled(format!("{pid:<5}    "), self.theme.pid());
            if !self.push_row(&process.task, prefix, budget, out, &mut output) {
                return output;
            }

            for thread in process.threads.iter().filter(|t| t.visible) {
                // the lone main thread would repeat the process row
                if thread.id.numeric() == pid && process.thread_count == 1 {
                    continue;
                }
                let prefix = Span::raw(format!("\\_ {:<5} ", thread.id.numeric()));
                if !self.push_row(thread, prefix, budget, out, &mut output) {
                    return output;
                }
            }
        }
        output
    }

    fn wants_highlight(&self, id: EntityId, output: &TableOutput) -> bool {
        match self.selected {
            Some(selected) => selected == id,
            None => self.auto_pick && output.highlighted.is_none() && id.kind() == EntityKind::Process,
        }
    }

    fn push_row(
        &self,
        task: &TaskMetrics,
        prefix: Span<'static>,
        budget: &mut RowBudget,
        out: &mut Vec<Line<'static>>,
        output: &mut TableOutput,
    ) -> bool {
        let highlight = self.wants_highlight(task.id, output);
        if !budget.try_push(out, self.row(task, prefix, highlight)) {
            return false;
        }
        output.rendered.push(task.id);
        if highlight {
            output.highlighted = Some(task.id);
        }
        true
    }

    fn row(&self, task: &TaskMetrics, prefix: Span<'static>, highlight: bool) -> Line<'static> {
        let theme = &self.theme;
        let delta = &task.delta;
        let name: String = task.name.chars().take(NAME_WIDTH).collect();
        let name_style = if highlight { theme.selected() } else { theme.plain() };

        let mut spans = vec![
            prefix,
            Span::styled(format!("{} ", task.state.as_char()), theme.state(task.state)),
            Span::styled(format!("{name:<22}"), name_style),
            Span::raw(format!(" {:<3} ", task.processor)),
        ];
        for pct in [delta.user_pct, delta.system_pct] {
            spans.push(Span::styled(format!("{pct:8.2}%"), theme.value(pct)));
        }
        for pct in [delta.cpu_pct, delta.cpu_bounds.min, delta.cpu_bounds.max] {
            spans.push(Span::styled(format!("{pct:9.2}%"), theme.value(pct)));
        }
        for pct in [delta.iowait_pct, delta.iowait_bounds.min, delta.iowait_bounds.max] {
            spans.push(Span::styled(format!("{pct:8.2}%"), theme.value(pct)));
        }

        let core = if task.cpu_switch() {
            format!(" CPU {}->{}", task.prev_processor, task.processor)
        } else {
            format!(" CPU {}", task.processor)
        };
        spans.push(Span::styled(core, theme.core(task.cpu_switch())));
        Line::from(spans)
    }
}

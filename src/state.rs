//! Selection and navigation state.
//!
//! Tracks the highlighted entity and the order of the rows rendered in the
//! last cycle. Up/Down move within that order without wrapping.

use crate::collectors::Snapshot;
use crate::delta::Focus;
use crate::input::NavEvent;
use crate::types::EntityId;

/// Current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// Nothing highlighted.
    #[default]
    Unselected,
    /// One entity highlighted.
    Selected(EntityId),
}

impl Selection {
    /// Returns the selected entity, if any.
    #[must_use]
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            Self::Unselected => None,
            Self::Selected(id) => Some(*id),
        }
    }
}

/// Navigation state machine.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    selection: Selection,
    explicit: bool,
    order: Vec<EntityId>,
    should_quit: bool,
}

impl Navigator {
    /// Creates a navigator.
    ///
    /// A configured id enters `Selected` directly, restricts the table to
    /// that process and disables auto-pick.
    #[must_use]
    pub fn new(explicit: Option<u32>) -> Self {
        match explicit {
            Some(id) => Self { selection: Selection::Selected(EntityId::Process(id)), explicit: true, ..Self::default() },
            None => Self::default(),
        }
    }

    /// Returns the current selection.
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Returns the selected entity, if any.
    #[must_use]
    pub fn selected(&self) -> Option<EntityId> {
        self.selection.entity()
    }

    /// True when the first rendered row should become the selection.
    #[must_use]
    pub fn auto_pick(&self) -> bool {
        !self.explicit
    }

    /// Numeric id the process table is restricted to.
    ///
    /// Follows the selection, so moving onto a thread keeps its owning
    /// process in view.
    #[must_use]
    pub fn filter(&self) -> Option<u32> {
        if self.explicit {
            self.selected().map(|id| id.numeric())
        } else {
            None
        }
    }

    /// Returns the delta engine focus for this cycle.
    #[must_use]
    pub fn focus(&self) -> Focus {
        Focus { selected: self.selected(), filter: self.filter() }
    }

    /// Rewrites a process selection that names a thread id.
    ///
    /// Process and thread ids share one numeric space, so a configured id may
    /// turn out to be a thread of some other process.
    pub fn resolve(&mut self, snapshot: &Snapshot) {
        if let Selection::Selected(EntityId::Process(id)) = self.selection {
            if snapshot.process(id).is_none() {
                if let Some(pid) = snapshot.owner_of(id) {
                    tracing::debug!(tid = id, pid, "selection resolved to thread");
                    self.selection = Selection::Selected(EntityId::Thread { pid, tid: id });
                }
            }
        }
    }

    /// Records what the table rendered this cycle.
    ///
    /// `rendered` lists the navigable rows in display order. `highlighted` is
    /// the row drawn with the selection style. In auto-pick mode the
    /// highlighted row becomes the selection; a selection that was not
    /// rendered resets to `Unselected`.
    pub fn observe_render(&mut self, rendered: Vec<EntityId>, highlighted: Option<EntityId>) {
        self.order = rendered;
        if self.explicit {
            return;
        }
        let next = highlighted.map_or(Selection::Unselected, Selection::Selected);
        if next != self.selection {
            tracing::debug!(from = ?self.selection, to = ?next, "selection changed");
            self.selection = next;
        }
    }

    /// Rows rendered in the last cycle.
    #[must_use]
    pub fn order(&self) -> &[EntityId] {
        &self.order
    }

    /// Applies one navigation event. Returns true if the selection moved.
    pub fn navigate(&mut self, event: NavEvent) -> bool {
        let step: isize = match event {
            NavEvent::Up => -1,
            NavEvent::Down => 1,
            NavEvent::Quit => {
                self.should_quit = true;
                return false;
            }
            NavEvent::None => return false,
        };

        let Some(current) = self.selected() else {
            return false;
        };
        let Some(index) = self.order.iter().position(|id| *id == current) else {
            return false;
        };
        let Some(target) = index.checked_add_signed(step).and_then(|i| self.order.get(i)) else {
            return false;
        };

        tracing::debug!(from = %current, to = %target, "navigated");
        self.selection = Selection::Selected(*target);
        true
    }

    /// Returns true once a quit event was seen.
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

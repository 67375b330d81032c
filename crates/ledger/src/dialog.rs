//! Register of the editing surface on screen.
//!
//! At most one surface is active. Expense forms opened on top of the expense
//! list suspend the list and bring it back when they close. Both moves swap
//! the active surface in a single assignment, so there is never a moment with
//! two surfaces or with none in between.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Surface {
    #[default]
    None,
    AddThing,
    EditThing,
    AddExpense,
    EditExpense,
    ExpensesList,
    EditProfile,
}

impl Surface {
    /// The surface this one returns to when opened from it.
    fn parent(self) -> Option<Surface> {
        match self {
            Self::AddExpense | Self::EditExpense => Some(Self::ExpensesList),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dialogs {
    active: Surface,
    resume: Option<Surface>,
}

impl Dialogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Surface {
        self.active
    }

    pub fn is_open(&self, surface: Surface) -> bool {
        self.active == surface
    }

    /// The surface waiting underneath the active one.
    pub fn suspended(&self) -> Option<Surface> {
        self.resume
    }

    /// Shows `surface`, replacing whatever is active.
    ///
    /// If the active surface is the parent of `surface` it is suspended and
    /// comes back on [`close`](Self::close).
    pub fn open(&mut self, surface: Surface) {
        self.resume = match surface.parent() {
            Some(parent) if self.active == parent => Some(parent),
            Some(parent) if self.resume == Some(parent) => Some(parent),
            _ => None,
        };
        self.active = surface;
    }

    /// Closes the active surface and returns the one now visible.
    pub fn close(&mut self) -> Surface {
        self.active = self.resume.take().unwrap_or(Surface::None);
        self.active
    }

    pub fn reset(&mut self) {
        self.active = Surface::None;
        self.resume = None;
    }
}

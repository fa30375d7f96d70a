//! Redraw requests shared between the render loop and mutating commands

use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct RedrawState {
    requested: Cell<bool>,
    suppressed: Cell<bool>,
}

/// Dirty flag telling the next loop tick to render regardless of camera motion
#[derive(Debug, Clone, Default)]
pub struct RedrawFlag {
    state: Rc<RedrawState>,
}

impl RedrawFlag {
    /// Create a flag with a redraw already pending
    pub fn new() -> Self {
        let flag = Self::default();
        flag.request();
        flag
    }

    /// Ask for the next tick to render
    pub fn request(&self) {
        if !self.state.suppressed.get() {
            self.state.requested.set(true);
        }
    }

    /// Whether a redraw is pending
    pub fn is_requested(&self) -> bool {
        self.state.requested.get()
    }

    /// Clear the pending request, returning whether one was pending
    pub fn take(&self) -> bool {
        self.state.requested.replace(false)
    }

    /// Drop any pending request and ignore all future ones
    pub fn suppress(&self) {
        self.state.suppressed.set(true);
        self.state.requested.set(false);
    }
}

//! Teardown actions run once when their owner is destroyed.

use std::fmt;

type TeardownAction<Ctx> = Box<dyn FnOnce(&mut Ctx)>;

/// Ordered list of teardown actions.
///
/// Actions receive a mutable context (for the resize controller, the
/// document whose listeners must be removed).
pub struct Lifecycle<Ctx> {
    actions: Vec<TeardownAction<Ctx>>,
    destroyed: bool,
}

impl<Ctx> Default for Lifecycle<Ctx> {
    fn default() -> Self {
        Self {
            actions: Vec::new(),
            destroyed: false,
        }
    }
}

impl<Ctx> fmt::Debug for Lifecycle<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("pending", &self.actions.len())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl<Ctx> Lifecycle<Ctx> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action. Returns `false` (and drops it) if already destroyed.
    pub fn on_destroy(&mut self, action: impl FnOnce(&mut Ctx) + 'static) -> bool {
        if self.destroyed {
            return false;
        }
        self.actions.push(Box::new(action));
        true
    }

    /// Run every action in registration order. Only the first call does anything.
    pub fn destroy(&mut self, ctx: &mut Ctx) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        for action in self.actions.drain(..) {
            action(ctx);
        }
        true
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Number of actions waiting to run.
    pub fn pending(&self) -> usize {
        self.actions.len()
    }
}

//! Multi-arm conditionals.
//!
//! A [`Branch`] occupies one positional slot in its parent scope. Arm `k`
//! gets the scope `<slot>/arm<k>`, so whichever arm is taken, its state never
//! lands at an address another arm used. Arms that are not taken are simply
//! not visited and lose their state in the sweep at the end of the traversal.

use super::context::Context;
use crate::signal::Signal;
use crate::tree::{Address, Segment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// No arm taken yet.
    Open,
    /// An arm ran; later arms are skipped.
    Taken,
    /// A condition was empty. It is unknown which arm applies, so none run.
    Blocked,
}

/// Builder for an if / else-if / else chain. See [`Context::branch`].
pub struct Branch<'c, 'a> {
    ctx: &'c mut Context<'a>,
    base: Address,
    arm: u32,
    status: Status,
}

impl<'c, 'a> Branch<'c, 'a> {
    pub(crate) fn new(ctx: &'c mut Context<'a>, base: Address) -> Self {
        Self {
            ctx,
            base,
            arm: 0,
            status: Status::Open,
        }
    }

    /// Run `f` if no earlier arm ran and `condition` is true.
    ///
    /// An empty condition blocks this arm and every arm after it, including
    /// `otherwise`.
    #[track_caller]
    pub fn when<F>(&mut self, condition: &Signal<bool>, f: F) -> &mut Self
    where
        F: FnOnce(&mut Context<'_>),
    {
        let scope = self.next_arm();
        if self.status == Status::Open {
            match condition.read() {
                Some(true) => {
                    self.status = Status::Taken;
                    self.ctx.enter(scope, f);
                }
                Some(false) => {}
                None => self.status = Status::Blocked,
            }
        }
        self
    }

    /// Run `f` if no earlier arm ran and no condition was empty.
    #[track_caller]
    pub fn otherwise<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut Context<'_>),
    {
        let scope = self.next_arm();
        if self.status == Status::Open {
            self.status = Status::Taken;
            self.ctx.enter(scope, f);
        }
        self
    }

    /// Whether some arm ran.
    pub fn taken(&self) -> bool {
        self.status == Status::Taken
    }

    fn next_arm(&mut self) -> Address {
        let scope = self.base.child(Segment::Arm(self.arm));
        self.arm += 1;
        scope
    }
}

//! Elements that report their own lifecycle.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

#[derive(Default)]
struct Log {
    clones: Cell<usize>,
    drops: RefCell<Vec<u32>>,
}

/// Source of [`Probed`] elements sharing one lifecycle log.
#[derive(Clone, Default)]
pub struct Probe {
    log: Rc<Log>,
}

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new element tagged `id`.
    pub fn spawn(&self, id: u32) -> Probed {
        Probed {
            id,
            log: Rc::clone(&self.log),
        }
    }

    /// Clones made of any element from this probe.
    pub fn clones(&self) -> usize {
        self.log.clones.get()
    }

    /// Elements dropped so far, clones included.
    pub fn drops(&self) -> usize {
        self.log.drops.borrow().len()
    }

    /// Ids of the dropped elements, in drop order.
    pub fn drop_order(&self) -> Vec<u32> {
        self.log.drops.borrow().clone()
    }
}

impl fmt::Debug for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Probe")
            .field("clones", &self.clones())
            .field("drop_order", &self.drop_order())
            .finish()
    }
}

/// An element that records its clones and its drop.
pub struct Probed {
    id: u32,
    log: Rc<Log>,
}

impl Probed {
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl Clone for Probed {
    fn clone(&self) -> Self {
        self.log.clones.set(self.log.clones.get() + 1);
        Self {
            id: self.id,
            log: Rc::clone(&self.log),
        }
    }
}

impl Drop for Probed {
    fn drop(&mut self) {
        self.log.drops.borrow_mut().push(self.id);
    }
}

impl PartialEq for Probed {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for Probed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Probed({})", self.id)
    }
}

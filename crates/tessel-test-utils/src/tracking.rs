//! Instrumented allocation policies.

use std::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::Deref;
use std::ptr::NonNull;
use std::rc::Rc;

use indexmap::IndexMap;
use tessel_core::{AllocError, AllocPolicy, Global};

/// Shared record of everything a family of tracking policies did.
///
/// Live blocks are keyed by address. Releasing an address the ledger never
/// handed out, or with a different layout, panics.
#[derive(Default)]
pub struct Ledger {
    allocations: Cell<usize>,
    deallocations: Cell<usize>,
    constructs: Cell<usize>,
    destroys: Cell<usize>,
    live: RefCell<IndexMap<usize, Layout>>,
    live_bytes: Cell<usize>,
    limit: Option<usize>,
}

impl Ledger {
    /// Successful `allocate` calls.
    pub fn allocations(&self) -> usize {
        self.allocations.get()
    }

    /// `deallocate` calls.
    pub fn deallocations(&self) -> usize {
        self.deallocations.get()
    }

    /// `construct` calls.
    pub fn constructs(&self) -> usize {
        self.constructs.get()
    }

    /// `destroy` calls.
    pub fn destroys(&self) -> usize {
        self.destroys.get()
    }

    /// Blocks allocated and not yet released.
    pub fn live_blocks(&self) -> usize {
        self.live.borrow().len()
    }

    /// Bytes held by live blocks.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.get()
    }

    /// Layouts of the live blocks, oldest first.
    pub fn live_layouts(&self) -> Vec<Layout> {
        self.live.borrow().values().copied().collect()
    }

    fn admit(&self, layout: Layout) -> Result<(), AllocError> {
        if let Some(limit) = self.limit {
            let remaining = limit.saturating_sub(self.live_bytes.get());
            if layout.size() > remaining {
                return Err(AllocError::LimitExceeded {
                    requested: layout.size(),
                    remaining,
                });
            }
        }
        Ok(())
    }

    fn record_allocation(&self, ptr: NonNull<u8>, layout: Layout) {
        self.allocations.set(self.allocations.get() + 1);
        self.live_bytes.set(self.live_bytes.get() + layout.size());
        let previous = self.live.borrow_mut().insert(ptr.as_ptr() as usize, layout);
        assert!(previous.is_none(), "allocator returned a live address twice");
    }

    fn record_deallocation(&self, ptr: NonNull<u8>, layout: Layout) {
        let recorded = self.live.borrow_mut().shift_remove(&(ptr.as_ptr() as usize));
        match recorded {
            Some(recorded) => assert_eq!(
                recorded, layout,
                "block released with a different layout than it was allocated with"
            ),
            None => panic!("released a block this ledger never handed out: {ptr:p}"),
        }
        self.deallocations.set(self.deallocations.get() + 1);
        self.live_bytes.set(self.live_bytes.get() - layout.size());
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("allocations", &self.allocations())
            .field("deallocations", &self.deallocations())
            .field("constructs", &self.constructs())
            .field("destroys", &self.destroys())
            .field("live_blocks", &self.live_blocks())
            .field("limit", &self.limit)
            .finish()
    }
}

/// Allocation policy that records into a shared [`Ledger`].
///
/// Clones share the ledger and keep the generation; `select_on_copy`
/// shares the ledger and bumps the generation, so tests can tell which
/// instance a buffer ended up with. Policies are interchangeable exactly
/// when they share a ledger. Blocks come from [`Global`].
#[derive(Clone, Debug)]
pub struct TrackingAlloc {
    ledger: Rc<Ledger>,
    generation: u32,
}

impl TrackingAlloc {
    pub fn new() -> Self {
        Self::from_ledger(Ledger::default())
    }

    /// A policy that refuses to hold more than `bytes` live bytes at once.
    pub fn with_limit(bytes: usize) -> Self {
        Self::from_ledger(Ledger {
            limit: Some(bytes),
            ..Ledger::default()
        })
    }

    fn from_ledger(ledger: Ledger) -> Self {
        Self {
            ledger: Rc::new(ledger),
            generation: 0,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// How many `select_on_copy` steps separate this instance from the
    /// one created with [`new`](TrackingAlloc::new).
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl Default for TrackingAlloc {
    fn default() -> Self {
        Self::new()
    }
}

impl AllocPolicy for TrackingAlloc {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.ledger.admit(layout)?;
        let ptr = Global.allocate(layout)?;
        self.ledger.record_allocation(ptr, layout);
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.ledger.record_deallocation(ptr, layout);
        // SAFETY: the ledger confirmed the block came from `allocate` with
        // this layout, and `Global` produced it.
        unsafe { Global.deallocate(ptr, layout) }
    }

    unsafe fn construct<T>(&self, slot: NonNull<T>, value: T) {
        self.ledger.constructs.set(self.ledger.constructs() + 1);
        // SAFETY: forwarded from the caller's contract.
        unsafe { slot.as_ptr().write(value) }
    }

    unsafe fn destroy<T>(&self, slot: NonNull<T>) {
        self.ledger.destroys.set(self.ledger.destroys() + 1);
        // SAFETY: forwarded from the caller's contract.
        unsafe { slot.as_ptr().drop_in_place() }
    }

    fn select_on_copy(&self) -> Self {
        Self {
            ledger: Rc::clone(&self.ledger),
            generation: self.generation + 1,
        }
    }

    fn interchangeable(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.ledger, &other.ledger)
    }
}

/// A [`TrackingAlloc`] that travels with the storage on swap.
#[derive(Clone, Debug, Default)]
pub struct PropagatingAlloc(TrackingAlloc);

impl PropagatingAlloc {
    pub fn new() -> Self {
        Self(TrackingAlloc::new())
    }
}

impl Deref for PropagatingAlloc {
    type Target = TrackingAlloc;

    fn deref(&self) -> &TrackingAlloc {
        &self.0
    }
}

impl AllocPolicy for PropagatingAlloc {
    const PROPAGATE_ON_SWAP: bool = true;

    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.0.allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded from the caller's contract.
        unsafe { self.0.deallocate(ptr, layout) }
    }

    unsafe fn construct<T>(&self, slot: NonNull<T>, value: T) {
        // SAFETY: forwarded from the caller's contract.
        unsafe { self.0.construct(slot, value) }
    }

    unsafe fn destroy<T>(&self, slot: NonNull<T>) {
        // SAFETY: forwarded from the caller's contract.
        unsafe { self.0.destroy(slot) }
    }

    fn select_on_copy(&self) -> Self {
        Self(self.0.select_on_copy())
    }

    fn interchangeable(&self, other: &Self) -> bool {
        self.0.interchangeable(&other.0)
    }
}

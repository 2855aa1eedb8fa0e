//! Recording allocate/release capabilities.
//!
//! A [`Tracker`] hands out an allocate capability and a release capability over
//! boxed `u64` values and remembers every pointer that went through either of them,
//! in order. Released values are parked instead of freed until the tracker itself
//! goes away, so a pointer value is never reused within one tracker and a second
//! release of the same pointer is reported instead of corrupting the heap. Values
//! that are never released are leaked.

use std::{cell::RefCell, collections::HashSet, ptr::NonNull, rc::Rc};

/// One call observed by a [`Tracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Allocated(usize),
    Released(usize),
}

#[derive(Clone, Default)]
pub struct Tracker(Rc<RefCell<Ledger>>);

#[derive(Default)]
struct Ledger {
    events: Vec<Event>,
    live: HashSet<usize>,
    parked: Vec<Box<u64>>,
    double_releases: Vec<usize>,
    pending_failures: usize,
}

impl Tracker {
    pub fn new() -> Tracker {
        Tracker::default()
    }

    /// Makes the next `count` allocations produce nothing (a null output).
    pub fn fail_next(&self, count: usize) {
        self.0.borrow_mut().pending_failures = count;
    }

    /// Allocates a boxed `value` and records it, or returns null if a failure was
    /// requested through [`Tracker::fail_next`].
    pub fn allocate(&self, value: u64) -> *mut u64 {
        let mut ledger = self.0.borrow_mut();
        if ledger.pending_failures > 0 {
            ledger.pending_failures -= 1;
            return std::ptr::null_mut();
        }
        let ptr = Box::into_raw(Box::new(value));
        ledger.events.push(Event::Allocated(ptr as usize));
        ledger.live.insert(ptr as usize);
        ptr
    }

    /// Allocates through a C-style output parameter.
    ///
    /// # Safety
    ///
    /// `out` must be valid for writes.
    pub unsafe fn allocate_into(&self, out: *mut *mut u64, value: u64) {
        let ptr = self.allocate(value);
        unsafe { *out = ptr }
    }

    /// Records the release of `ptr`. Releasing a pointer that is not live is
    /// recorded as a double release and otherwise ignored.
    pub fn release(&self, ptr: NonNull<u64>) {
        let addr = ptr.as_ptr() as usize;
        let mut ledger = self.0.borrow_mut();
        ledger.events.push(Event::Released(addr));
        if ledger.live.remove(&addr) {
            // SAFETY: live pointers come from `Box::into_raw` in `allocate`.
            let value = unsafe { Box::from_raw(ptr.as_ptr()) };
            ledger.parked.push(value);
        } else {
            log::error!("double release of {addr:#x}");
            ledger.double_releases.push(addr);
        }
    }

    /// An allocate capability for [`uniqra_handle::OwningHandle`].
    pub fn allocator(&self) -> impl FnMut(&mut *mut u64, u64) + use<> {
        let tracker = self.clone();
        move |out: &mut *mut u64, value: u64| *out = tracker.allocate(value)
    }

    /// A release capability for either handle type.
    pub fn releaser(&self) -> impl Fn(NonNull<u64>) + use<> {
        let tracker = self.clone();
        move |ptr: NonNull<u64>| tracker.release(ptr)
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().events.clone()
    }

    pub fn allocated(&self) -> Vec<usize> {
        self.filter(|event| match event {
            Event::Allocated(addr) => Some(addr),
            Event::Released(_) => None,
        })
    }

    pub fn released(&self) -> Vec<usize> {
        self.filter(|event| match event {
            Event::Released(addr) => Some(addr),
            Event::Allocated(_) => None,
        })
    }

    /// Number of times `ptr` was released.
    pub fn release_count(&self, ptr: *const u64) -> usize {
        self.released()
            .into_iter()
            .filter(|&addr| addr == ptr as usize)
            .count()
    }

    /// Number of allocated values that were not released yet.
    pub fn live_count(&self) -> usize {
        self.0.borrow().live.len()
    }

    pub fn double_releases(&self) -> Vec<usize> {
        self.0.borrow().double_releases.clone()
    }

    /// Panics unless every allocation was released exactly once.
    #[track_caller]
    pub fn assert_balanced(&self) {
        let ledger = self.0.borrow();
        assert!(
            ledger.double_releases.is_empty(),
            "double releases: {:x?}",
            ledger.double_releases
        );
        assert!(ledger.live.is_empty(), "leaked: {:x?}", ledger.live);
    }

    fn filter(&self, f: impl Fn(Event) -> Option<usize>) -> Vec<usize> {
        self.0.borrow().events.iter().copied().filter_map(f).collect()
    }
}

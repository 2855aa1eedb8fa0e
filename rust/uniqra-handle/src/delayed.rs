//! Exclusive-ownership handle for resources acquired after the handle exists.
//!
//! Some C interfaces only allocate through an output parameter
//! (`void alloc_x(x **out, ...)`). `DelayedHandle` exposes the address of its own
//! pointer slot for such routines to write into, and notices the write lazily:
//! every operation first *reconciles* the live slot against the handle's shadow
//! copy of what it owns. A changed slot means an external allocation happened,
//! so the previously owned resource is released and the new one adopted.

use std::{
    cell::Cell,
    ops::{Deref, DerefMut},
    ptr::{self, NonNull},
};

use crate::{
    owning::empty_deref,
    release::{Release, ReleaseAction},
};

/// Owns at most one resource whose pointer may be written into the handle's slot
/// from outside, through [`DelayedHandle::as_out_ptr`].
pub struct DelayedHandle<T, R>
where
    R: Release<T>,
{
    /// Live pointer storage, exposed to external allocators.
    slot: Cell<*mut T>,
    /// What the handle last knew it owned.
    shadow: Cell<Option<NonNull<T>>>,
    release: ReleaseAction<R>,
}

impl<T, R> DelayedHandle<T, R>
where
    R: Release<T>,
{
    /// Creates an empty handle that will destroy its resource with `release`.
    pub fn new(release: R) -> Self {
        DelayedHandle {
            slot: Cell::new(ptr::null_mut()),
            shadow: Cell::new(None),
            release: ReleaseAction::new(release),
        }
    }

    /// Creates a handle that owns `ptr` (which may be null).
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must point to a valid, exclusively owned `T` that `release`
    /// accepts once.
    pub unsafe fn from_raw(ptr: *mut T, release: R) -> Self {
        DelayedHandle {
            slot: Cell::new(ptr),
            shadow: Cell::new(NonNull::new(ptr)),
            release: ReleaseAction::new(release),
        }
    }

    /// Returns the address of the handle's pointer slot, for an allocate routine
    /// that produces its result through an output parameter.
    ///
    /// Pending external writes are reconciled first. The returned pointer is valid
    /// until the handle is next used or moved. Whatever is written through it must
    /// be null or satisfy the contract of [`DelayedHandle::from_raw`]; the handle
    /// takes ownership at the next reconciliation, releasing the resource it
    /// owned before.
    pub fn as_out_ptr(&mut self) -> *mut *mut T {
        self.reconcile();
        self.slot.as_ptr()
    }

    /// Absorbs an out-of-band write to the slot.
    ///
    /// If the slot no longer holds the pointer the handle last knew about, that
    /// previous pointer (if any) is released and the slot's value is adopted.
    /// Returns `true` if a change was absorbed; calling this again without an
    /// intervening write is a no-op.
    pub fn reconcile(&self) -> bool {
        let live = NonNull::new(self.slot.get());
        let known = self.shadow.get();
        if live == known {
            return false;
        }
        log::debug!(
            "slot of {} changed out-of-band: {:?} -> {:?}",
            std::any::type_name::<T>(),
            known,
            live
        );
        // The shadow moves first so that a panicking release cannot cause a second
        // release of `known` when the handle is dropped.
        self.shadow.set(live);
        if let Some(previous) = known {
            self.release.invoke(previous);
        }
        true
    }

    /// Returns the owned pointer after reconciling, or `None` if the handle is empty.
    #[inline]
    pub fn get(&self) -> Option<NonNull<T>> {
        self.reconcile();
        self.shadow.get()
    }

    /// Returns the owned pointer after reconciling, or null if the handle is empty.
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        self.get().map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.get().is_none()
    }

    #[inline]
    pub fn as_ref(&self) -> Option<&T> {
        // SAFETY: adopted pointers satisfy the `from_raw` contract while owned.
        self.get().map(|ptr| unsafe { ptr.as_ref() })
    }

    #[inline]
    pub fn as_mut(&mut self) -> Option<&mut T> {
        // SAFETY: as above, and `&mut self` makes the access exclusive.
        self.get().map(|mut ptr| unsafe { ptr.as_mut() })
    }

    /// Releases the owned resource (if any) and takes ownership of `ptr`.
    ///
    /// Resetting to the pointer already owned is a no-op.
    ///
    /// # Safety
    ///
    /// Same contract as [`DelayedHandle::from_raw`].
    pub unsafe fn reset(&mut self, ptr: *mut T) {
        self.reconcile();
        let fresh = NonNull::new(ptr);
        let previous = self.shadow.replace(fresh);
        self.slot.set(ptr);
        if let Some(previous) = previous.filter(|&p| Some(p) != fresh) {
            self.release.invoke(previous);
        }
    }

    /// Releases the owned resource, if any, leaving the handle empty.
    pub fn clear(&mut self) {
        // SAFETY: a null pointer carries no ownership obligations.
        unsafe { self.reset(ptr::null_mut()) }
    }

    /// Gives up ownership without invoking the release capability.
    ///
    /// The caller becomes responsible for destroying the returned resource.
    pub fn release(&mut self) -> Option<NonNull<T>> {
        self.reconcile();
        self.slot.set(ptr::null_mut());
        self.shadow.take()
    }

    /// Exchanges the owned resources and release capabilities of two handles,
    /// after reconciling both.
    pub fn swap(&mut self, other: &mut Self) {
        self.reconcile();
        other.reconcile();
        std::mem::swap(self, other);
    }

    pub fn release_action(&self) -> &ReleaseAction<R> {
        &self.release
    }
}

impl<T, R> Deref for DelayedHandle<T, R>
where
    R: Release<T>,
{
    type Target = T;

    /// # Panics
    ///
    /// Panics if the handle is empty after reconciling.
    #[inline]
    fn deref(&self) -> &T {
        match self.as_ref() {
            Some(value) => value,
            None => empty_deref::<T>(),
        }
    }
}

impl<T, R> DerefMut for DelayedHandle<T, R>
where
    R: Release<T>,
{
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        match self.as_mut() {
            Some(value) => value,
            None => empty_deref::<T>(),
        }
    }
}

impl<T, R> Drop for DelayedHandle<T, R>
where
    R: Release<T>,
{
    fn drop(&mut self) {
        self.reconcile();
        self.slot.set(ptr::null_mut());
        if let Some(ptr) = self.shadow.take() {
            self.release.invoke(ptr);
        }
    }
}

impl<T, R> std::fmt::Debug for DelayedHandle<T, R>
where
    R: Release<T>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayedHandle")
            .field("slot", &self.slot.get())
            .field("shadow", &self.shadow.get())
            .field("release", &self.release)
            .finish()
    }
}

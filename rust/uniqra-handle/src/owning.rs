//! Exclusive-ownership handle that acquires its resource itself.
//!
//! The handle keeps the allocate capability it was constructed with, so that
//! [`OwningHandle::reset`] can produce a replacement resource from new arguments.

use std::{
    marker::PhantomData,
    ops::{Deref, DerefMut},
    ptr::{self, NonNull},
};

use uniqra_common::{Result, error::Error};

use crate::release::{Release, ReleaseAction};

/// Owns at most one resource produced by an allocate capability `A` and destroyed
/// by a release capability `R`.
///
/// The allocate capability follows the C out-parameter convention: it receives a
/// slot initialized to null and writes the new resource pointer into it. Leaving
/// the slot null means "acquisition did not occur". Extra allocate arguments are
/// passed as a single `Args` value (use a tuple for several).
///
/// Dropping the handle releases the owned resource, if any, exactly once.
pub struct OwningHandle<T, A, R, Args = ()>
where
    R: Release<T>,
{
    managed: Option<NonNull<T>>,
    alloc: A,
    release: ReleaseAction<R>,
    _args: PhantomData<fn(Args)>,
}

impl<T, A, R, Args> OwningHandle<T, A, R, Args>
where
    A: FnMut(&mut *mut T, Args),
    R: Release<T>,
{
    /// Invokes `alloc` with `args` and takes ownership of the produced resource.
    ///
    /// If `alloc` leaves its output null, the handle starts out empty.
    ///
    /// # Safety
    ///
    /// Every non-null pointer written by `alloc` (now or on a later `reset`) must
    /// point to a valid, exclusively owned `T` that stays alive until passed to
    /// `release`, and `release` must accept each such pointer once.
    pub unsafe fn new(mut alloc: A, release: R, args: Args) -> Self {
        let managed = acquire(&mut alloc, args);
        if managed.is_none() {
            log::warn!(
                "allocator for {} produced no resource, handle starts empty",
                std::any::type_name::<T>()
            );
        }
        OwningHandle {
            managed,
            alloc,
            release: ReleaseAction::new(release),
            _args: PhantomData,
        }
    }

    /// Like [`OwningHandle::new`], but fails instead of producing an empty handle
    /// when `alloc` leaves its output null.
    ///
    /// # Safety
    ///
    /// Same contract as [`OwningHandle::new`].
    pub unsafe fn try_new(mut alloc: A, release: R, args: Args) -> Result<Self> {
        let managed = acquire(&mut alloc, args).ok_or_else(acquisition_failed::<T>)?;
        Ok(OwningHandle {
            managed: Some(managed),
            alloc,
            release: ReleaseAction::new(release),
            _args: PhantomData,
        })
    }

    /// Allocates a new resource from `args`, then releases the previously owned one.
    ///
    /// The new resource is acquired before the old one is released. If the
    /// allocator produces nothing, the old resource is still released and the
    /// handle is left empty; use [`OwningHandle::try_reset`] to keep it instead.
    pub fn reset(&mut self, args: Args) {
        let fresh = acquire(&mut self.alloc, args);
        if let Some(previous) = std::mem::replace(&mut self.managed, fresh) {
            self.release.invoke(previous);
        }
    }

    /// Allocates a new resource from `args` and releases the previously owned one,
    /// or leaves the handle untouched if the allocator produces nothing.
    pub fn try_reset(&mut self, args: Args) -> Result<()> {
        let fresh = acquire(&mut self.alloc, args).ok_or_else(acquisition_failed::<T>)?;
        if let Some(previous) = self.managed.replace(fresh) {
            self.release.invoke(previous);
        }
        Ok(())
    }
}

impl<T, A, R, Args> OwningHandle<T, A, R, Args>
where
    R: Release<T>,
{
    /// Returns the owned pointer, or `None` if the handle is empty.
    #[inline]
    pub fn get(&self) -> Option<NonNull<T>> {
        self.managed
    }

    /// Returns the owned pointer, or null if the handle is empty.
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        self.managed.map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.managed.is_none()
    }

    #[inline]
    pub fn as_ref(&self) -> Option<&T> {
        // SAFETY: the construction contract guarantees the pointer is valid while owned.
        self.managed.map(|ptr| unsafe { ptr.as_ref() })
    }

    #[inline]
    pub fn as_mut(&mut self) -> Option<&mut T> {
        // SAFETY: as above, and `&mut self` makes the access exclusive.
        self.managed.map(|mut ptr| unsafe { ptr.as_mut() })
    }

    /// Gives up ownership without invoking the release capability.
    ///
    /// The caller becomes responsible for destroying the returned resource.
    pub fn release(&mut self) -> Option<NonNull<T>> {
        self.managed.take()
    }

    /// Exchanges the owned resources, along with the capabilities that produced and
    /// will destroy them.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    pub fn release_action(&self) -> &ReleaseAction<R> {
        &self.release
    }
}

impl<T, A, R, Args> Deref for OwningHandle<T, A, R, Args>
where
    R: Release<T>,
{
    type Target = T;

    /// # Panics
    ///
    /// Panics if the handle is empty.
    #[inline]
    fn deref(&self) -> &T {
        match self.as_ref() {
            Some(value) => value,
            None => empty_deref::<T>(),
        }
    }
}

impl<T, A, R, Args> DerefMut for OwningHandle<T, A, R, Args>
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

impl<T, A, R, Args> Drop for OwningHandle<T, A, R, Args>
where
    R: Release<T>,
{
    fn drop(&mut self) {
        if let Some(ptr) = self.managed.take() {
            self.release.invoke(ptr);
        }
    }
}

impl<T, A, R, Args> std::fmt::Debug for OwningHandle<T, A, R, Args>
where
    R: Release<T>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwningHandle")
            .field("ptr", &self.as_ptr())
            .field("release", &self.release)
            .finish()
    }
}

fn acquire<T, A, Args>(alloc: &mut A, args: Args) -> Option<NonNull<T>>
where
    A: FnMut(&mut *mut T, Args),
{
    let mut out = ptr::null_mut();
    alloc(&mut out, args);
    let acquired = NonNull::new(out);
    if let Some(ptr) = acquired {
        log::trace!("acquired {} at {:p}", std::any::type_name::<T>(), ptr);
    }
    acquired
}

fn acquisition_failed<T>() -> Error {
    Error::acquisition_failed(std::any::type_name::<T>())
}

#[cold]
#[track_caller]
pub(crate) fn empty_deref<T>() -> ! {
    panic!(
        "dereferenced an empty handle to {}",
        std::any::type_name::<T>()
    )
}

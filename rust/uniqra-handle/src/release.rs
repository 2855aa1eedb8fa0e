//! Release capabilities and the action that invokes them on behalf of a handle.

use std::ptr::NonNull;

/// A capability that destroys a resource previously produced by the matching
/// allocate capability.
///
/// Any `Fn(NonNull<T>)` closure or function is a release capability, and so is a
/// reference to one, which is how a handle borrows a capability whose lifetime
/// is guaranteed by its owner. C free routines are adapted through
/// [`ExternRelease`].
pub trait Release<T> {
    /// Destroys the resource at `ptr`.
    ///
    /// Called at most once per pointer value, never with an empty pointer.
    fn release(&self, ptr: NonNull<T>);
}

impl<T, F> Release<T> for F
where
    F: Fn(NonNull<T>),
{
    #[inline]
    fn release(&self, ptr: NonNull<T>) {
        self(ptr)
    }
}

/// Adapts a C-style free routine (`void free_x(x *p)`) to [`Release`].
pub struct ExternRelease<T> {
    free: unsafe extern "C" fn(*mut T),
}

impl<T> ExternRelease<T> {
    /// Wraps the C free routine `free`.
    ///
    /// # Safety
    ///
    /// `free` must accept every pointer produced by the allocate routine it is paired
    /// with, and must be sound to call exactly once on each such pointer.
    pub unsafe fn new(free: unsafe extern "C" fn(*mut T)) -> ExternRelease<T> {
        ExternRelease { free }
    }

    /// Returns the wrapped C routine.
    pub fn routine(&self) -> unsafe extern "C" fn(*mut T) {
        self.free
    }
}

impl<T> Release<T> for ExternRelease<T> {
    #[inline]
    fn release(&self, ptr: NonNull<T>) {
        // SAFETY: `ExternRelease::new` requires `free` to accept every pointer the paired
        // allocator produces, and handles pass each such pointer here at most once.
        unsafe { (self.free)(ptr.as_ptr()) }
    }
}

impl<T> Clone for ExternRelease<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ExternRelease<T> {}

impl<T> std::fmt::Debug for ExternRelease<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternRelease")
            .field("free", &(self.free as *const ()))
            .finish()
    }
}

/// Holds a release capability and invokes it on the pointers a handle gives up.
///
/// The action performs no bookkeeping of its own: keeping the "at most once, never
/// on an empty pointer" contract is the responsibility of the owning handle, and the
/// signature of [`ReleaseAction::invoke`] makes the empty case unrepresentable.
pub struct ReleaseAction<R> {
    capability: R,
}

impl<R> ReleaseAction<R> {
    /// Binds `capability`. Pass a reference to borrow a capability instead of
    /// owning a copy of it.
    pub fn new(capability: R) -> ReleaseAction<R> {
        ReleaseAction { capability }
    }

    /// Returns the bound release capability.
    pub fn capability(&self) -> &R {
        &self.capability
    }

    /// Unbinds and returns the release capability.
    pub fn into_inner(self) -> R {
        self.capability
    }

    /// Calls the release capability on `ptr`.
    #[inline]
    pub fn invoke<T>(&self, ptr: NonNull<T>)
    where
        R: Release<T>,
    {
        log::trace!("releasing {} at {:p}", std::any::type_name::<T>(), ptr);
        Release::release(&self.capability, ptr);
    }
}

impl<R> std::fmt::Debug for ReleaseAction<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseAction")
            .field("capability", &std::any::type_name::<R>())
            .finish()
    }
}

//! Exclusive-ownership handles over resources produced and destroyed through
//! C-style allocate/free function pairs.
//!
//! - [`OwningHandle`] acquires its resource itself, by calling an allocate
//!   capability during construction and again on [`OwningHandle::reset`].
//! - [`DelayedHandle`] starts empty and exposes the address of its pointer slot,
//!   so that an allocate routine writing through an output parameter can populate
//!   it. The handle reconciles such out-of-band writes before every use.
//!
//! Both release their resource exactly once: on drop, on replacement, or never if
//! ownership is given back to the caller through `release()`.
//!
//! ```
//! use std::ptr::NonNull;
//! use uniqra_handle::OwningHandle;
//!
//! let alloc = |out: &mut *mut u32, value: u32| *out = Box::into_raw(Box::new(value));
//! let free = |ptr: NonNull<u32>| drop(unsafe { Box::from_raw(ptr.as_ptr()) });
//!
//! // SAFETY: `alloc` produces boxed values and `free` reclaims them.
//! let mut handle = unsafe { OwningHandle::new(alloc, free, 7) };
//! assert_eq!(*handle, 7);
//! handle.reset(8);
//! assert_eq!(*handle, 8);
//! ```
//!
//! Handles are meant for a single owner on a single thread; neither type is `Sync`.

pub mod delayed;
pub mod owning;
pub mod release;

pub use delayed::DelayedHandle;
pub use owning::OwningHandle;
pub use release::{ExternRelease, Release, ReleaseAction};

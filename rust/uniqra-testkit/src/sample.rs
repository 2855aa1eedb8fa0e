//! A C-interface sample resource and handle types bound to it.
//!
//! `sample_alloc` / `sample_free` behave like a typical legacy C API: the resource
//! is `malloc`ed, the allocator reports its result through an output parameter and
//! gives up on the whole process when memory runs out.

use std::ops::{Deref, DerefMut};

use uniqra_handle::{DelayedHandle, ExternRelease, OwningHandle};

/// The resource produced by [`sample_alloc`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Always initialized to [`SAMPLE_MAGIC`].
    pub i: i32,
    /// The value passed to the allocator.
    pub x: f64,
}

pub const SAMPLE_MAGIC: i32 = 42;

/// Allocates a [`Sample`] holding `x` and writes its address to `*out`.
///
/// Aborts the process if memory is exhausted.
///
/// # Safety
///
/// `out` must be valid for writes.
pub unsafe extern "C" fn sample_alloc(out: *mut *mut Sample, x: f64) {
    log::trace!("allocating Sample");
    let ptr = unsafe { libc::malloc(std::mem::size_of::<Sample>()) } as *mut Sample;
    if ptr.is_null() {
        log::error!("no more memory for Sample");
        std::process::abort();
    }
    unsafe {
        ptr.write(Sample { i: SAMPLE_MAGIC, x });
        *out = ptr;
    }
}

/// Frees a [`Sample`] produced by [`sample_alloc`].
///
/// # Safety
///
/// `ptr` must come from [`sample_alloc`] and must not have been freed already.
pub unsafe extern "C" fn sample_free(ptr: *mut Sample) {
    log::trace!("freeing Sample");
    unsafe { libc::free(ptr.cast()) }
}

pub type SampleAlloc = fn(&mut *mut Sample, f64);

fn alloc_into(out: &mut *mut Sample, x: f64) {
    // SAFETY: `out` is a live exclusive reference.
    unsafe { sample_alloc(out, x) }
}

fn release_sample() -> ExternRelease<Sample> {
    // SAFETY: `sample_free` accepts every pointer `sample_alloc` produces.
    unsafe { ExternRelease::new(sample_free) }
}

/// A [`Sample`] acquired on construction and re-acquired on `reset(x)`.
pub struct SampleHandle(OwningHandle<Sample, SampleAlloc, ExternRelease<Sample>, f64>);

impl SampleHandle {
    pub fn new(x: f64) -> SampleHandle {
        // SAFETY: `sample_alloc` yields malloc'ed samples that `sample_free` releases.
        SampleHandle(unsafe { OwningHandle::new(alloc_into as SampleAlloc, release_sample(), x) })
    }

    pub fn into_inner(self) -> OwningHandle<Sample, SampleAlloc, ExternRelease<Sample>, f64> {
        self.0
    }
}

impl Deref for SampleHandle {
    type Target = OwningHandle<Sample, SampleAlloc, ExternRelease<Sample>, f64>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SampleHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// A [`Sample`] slot populated by calling [`sample_alloc`] on its out pointer.
pub struct DelayedSample(DelayedHandle<Sample, ExternRelease<Sample>>);

impl DelayedSample {
    pub fn new() -> DelayedSample {
        DelayedSample(DelayedHandle::new(release_sample()))
    }
}

impl Default for DelayedSample {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for DelayedSample {
    type Target = DelayedHandle<Sample, ExternRelease<Sample>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DelayedSample {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

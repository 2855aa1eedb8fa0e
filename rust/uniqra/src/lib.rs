//! # uniqra: exclusive ownership for C-style allocate/free pairs
//!
//! Legacy C interfaces hand out resources through an allocate function and expect
//! them back through a matching free function. Forgetting the free call, or making
//! it twice, is the classic failure mode. The handles in this project tie the free
//! call to ownership, so it happens exactly once: when the handle is dropped, when
//! its resource is replaced, or never if the caller explicitly takes the resource
//! back.
//!
//! ## Module Organization
//!
//! - [`handle`]: the handle types.
//!   - [`OwningHandle`] calls the allocate function itself (immediate acquisition).
//!   - [`DelayedHandle`] exposes its pointer slot to allocate functions that return
//!     their result through an output parameter (delayed acquisition), and
//!     reconciles such out-of-band writes before each use.
//!   - [`ReleaseAction`], [`Release`] and [`ExternRelease`] describe how resources
//!     are destroyed.
//! - [`common`]: error and result types shared by the crates.

pub use uniqra_common as common;
pub use uniqra_handle as handle;

pub use uniqra_handle::{DelayedHandle, ExternRelease, OwningHandle, Release, ReleaseAction};

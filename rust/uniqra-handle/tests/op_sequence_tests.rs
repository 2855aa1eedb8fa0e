//! Random operation sequences: whatever the mix of operations, every allocated
//! pointer must be released exactly once, except those handed back through
//! `release()`, which must never be released by the handle.

use std::ptr::NonNull;

use uniqra_handle::{DelayedHandle, OwningHandle};
use uniqra_testkit::Tracker;

const ROUNDS: usize = 200;
const OPS_PER_ROUND: usize = 40;

#[test]
fn test_owning_handle_random_ops() {
    let mut rng = fastrand::Rng::with_seed(2985745485);
    for _ in 0..ROUNDS {
        let tracker = Tracker::new();
        let mut taken: Vec<NonNull<u64>> = Vec::new();
        {
            let mut a = unsafe { OwningHandle::new(tracker.allocator(), tracker.releaser(), 0) };
            let mut b = unsafe { OwningHandle::new(tracker.allocator(), tracker.releaser(), 0) };
            for step in 0..OPS_PER_ROUND as u64 {
                let expected_b = b.as_ptr();
                match rng.usize(0..6) {
                    0 => {
                        let before = a.as_ptr();
                        a.reset(step);
                        assert_ne!(a.as_ptr(), before);
                        if !before.is_null() {
                            assert_eq!(tracker.release_count(before), 1);
                        }
                    }
                    1 => {
                        let before = a.as_ptr();
                        let fail = rng.bool();
                        if fail {
                            tracker.fail_next(1);
                        }
                        let result = a.try_reset(step);
                        assert_eq!(result.is_err(), fail);
                        if fail {
                            assert_eq!(a.as_ptr(), before);
                        }
                    }
                    2 => taken.extend(a.release()),
                    3 => {
                        let (pa, pb) = (a.as_ptr(), b.as_ptr());
                        a.swap(&mut b);
                        assert_eq!((a.as_ptr(), b.as_ptr()), (pb, pa));
                        continue;
                    }
                    4 => {
                        a = unsafe { OwningHandle::new(tracker.allocator(), tracker.releaser(), step) };
                    }
                    _ => {
                        if let Some(value) = a.as_ref() {
                            assert!(*value <= step);
                        }
                    }
                }
                assert_eq!(b.as_ptr(), expected_b);
                assert!(tracker.double_releases().is_empty());
            }
        }
        for ptr in taken {
            assert_eq!(tracker.release_count(ptr.as_ptr()), 0);
            tracker.release(ptr);
        }
        tracker.assert_balanced();
    }
}

#[test]
fn test_delayed_handle_random_ops() {
    let mut rng = fastrand::Rng::with_seed(1234567);
    for _ in 0..ROUNDS {
        let tracker = Tracker::new();
        let mut taken: Vec<NonNull<u64>> = Vec::new();
        {
            let mut a: DelayedHandle<u64, _> = DelayedHandle::new(tracker.releaser());
            let mut b: DelayedHandle<u64, _> = DelayedHandle::new(tracker.releaser());
            // What `a` owns once it reconciles.
            let mut model: *mut u64 = std::ptr::null_mut();
            for step in 0..OPS_PER_ROUND as u64 {
                match rng.usize(0..8) {
                    0 | 1 => {
                        // Out-of-band allocation, noticed lazily.
                        if rng.u8(0..4) == 0 {
                            tracker.fail_next(1);
                        }
                        let out = a.as_out_ptr();
                        unsafe { tracker.allocate_into(out, step) };
                        model = unsafe { *out };
                    }
                    2 => {
                        // Out-of-band allocation, absorbed explicitly.
                        let out = a.as_out_ptr();
                        unsafe { tracker.allocate_into(out, step) };
                        let written = unsafe { *out };
                        assert_eq!(a.reconcile(), written != model);
                        model = written;
                    }
                    3 => {
                        let fresh = tracker.allocate(step);
                        unsafe { a.reset(fresh) };
                        model = fresh;
                    }
                    4 => {
                        a.clear();
                        model = std::ptr::null_mut();
                    }
                    5 => {
                        let released = a.release();
                        assert_eq!(released.map_or(std::ptr::null_mut(), NonNull::as_ptr), model);
                        taken.extend(released);
                        model = std::ptr::null_mut();
                    }
                    6 => {
                        let before_b = b.as_ptr();
                        a.swap(&mut b);
                        assert_eq!(b.as_ptr(), model);
                        model = before_b;
                    }
                    _ => {
                        if let Some(value) = a.as_ref() {
                            assert!(*value <= step);
                        }
                    }
                }
                assert_eq!(a.as_ptr(), model);
                assert!(!a.reconcile());
                assert!(tracker.double_releases().is_empty());
            }
        }
        for ptr in taken {
            assert_eq!(tracker.release_count(ptr.as_ptr()), 0);
            tracker.release(ptr);
        }
        tracker.assert_balanced();
    }
}

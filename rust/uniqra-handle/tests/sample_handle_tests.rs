use uniqra_testkit::{
    DelayedSample, Sample, SampleHandle,
    sample::{SAMPLE_MAGIC, sample_alloc, sample_free},
};

#[test]
fn test_manual_c_usage() {
    let mut ptr: *mut Sample = std::ptr::null_mut();
    unsafe { sample_alloc(&mut ptr, 0.5) };
    assert!(!ptr.is_null());
    assert_eq!(unsafe { *ptr }, Sample { i: SAMPLE_MAGIC, x: 0.5 });
    unsafe { sample_free(ptr) };
}

#[test]
fn test_sample_handle_reset() {
    let mut sample = SampleHandle::new(0.0);
    assert_eq!(sample.i, SAMPLE_MAGIC);
    assert_eq!(sample.x, 0.0);
    sample.reset(3.5);
    assert_eq!(sample.x, 3.5);
    sample.x += 1.0;
    assert_eq!(sample.as_ref().map(|s| s.x), Some(4.5));
}

#[test]
fn test_sample_handle_move() {
    let mut first = SampleHandle::new(0.0);
    assert_eq!(first.x, 0.0);
    first = SampleHandle::new(1.1);
    let second = first;
    assert_eq!(second.x, 1.1);
    let inner = second.into_inner();
    assert!(!inner.is_empty());
}

#[test]
fn test_delayed_sample_acquisition() {
    let mut sample = DelayedSample::new();
    assert!(sample.is_empty());
    unsafe { sample_alloc(sample.as_out_ptr(), 2.5) };
    assert_eq!(sample.x, 2.5);
    assert_eq!(sample.i, SAMPLE_MAGIC);
}

#[test]
fn test_delayed_sample_repeated_acquisition() {
    let mut sample = DelayedSample::default();
    unsafe { sample_alloc(sample.as_out_ptr(), 1.0) };
    let first = sample.as_ptr();
    unsafe { sample_alloc(sample.as_out_ptr(), 2.0) };
    assert_ne!(sample.as_ptr(), first);
    assert_eq!(sample.x, 2.0);
}

#[test]
fn test_delayed_sample_release() {
    let mut sample = DelayedSample::new();
    unsafe { sample_alloc(sample.as_out_ptr(), 7.0) };
    let raw = sample.release().unwrap();
    assert!(sample.is_empty());
    assert_eq!(unsafe { raw.as_ref() }.x, 7.0);
    unsafe { sample_free(raw.as_ptr()) };
}

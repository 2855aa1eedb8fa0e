//! Walkthrough scenarios over the sample C interface.
//!
//! Run with `-vv` to see each allocate and free call as it happens.

use anyhow::Result;
use clap::ValueEnum;
use uniqra::common::verify_arg;
use uniqra_testkit::{
    DelayedSample, Sample, SampleHandle,
    sample::{sample_alloc, sample_free},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Plain C usage: allocate, then free by hand
    Manual,
    /// Handle that allocates on construction and re-allocates on reset
    Immediate,
    /// Handle populated through its out pointer
    Delayed,
    /// Out-pointer acquisition repeated on the same handle
    DelayedTwice,
    /// Every scenario, in order
    All,
}

const WALKTHROUGH: [Scenario; 4] = [
    Scenario::Manual,
    Scenario::Immediate,
    Scenario::Delayed,
    Scenario::DelayedTwice,
];

pub fn run(scenario: Scenario, value: f64) -> Result<()> {
    check_value(value)?;
    run_scenario(scenario, value)?;
    Ok(())
}

fn run_scenario(scenario: Scenario, value: f64) -> uniqra::common::Result<()> {
    tracing::info!("scenario {scenario:?}");
    match scenario {
        Scenario::Manual => manual(value),
        Scenario::Immediate => immediate(value)?,
        Scenario::Delayed => delayed(value, 1),
        Scenario::DelayedTwice => delayed(value, 2),
        Scenario::All => {
            return WALKTHROUGH
                .into_iter()
                .try_for_each(|single| run_scenario(single, value));
        }
    }
    println!();
    Ok(())
}

fn check_value(value: f64) -> uniqra::common::Result<()> {
    verify_arg!(value, value.is_finite());
    Ok(())
}

fn manual(value: f64) {
    let mut ptr: *mut Sample = std::ptr::null_mut();
    // SAFETY: `ptr` is a valid output location.
    unsafe { sample_alloc(&mut ptr, value) };
    // SAFETY: `sample_alloc` either succeeded or aborted.
    println!("allocated by hand: {:?}", unsafe { &*ptr });
    // SAFETY: `ptr` came from `sample_alloc` and is freed once.
    // Skipping this call leaks the sample.
    unsafe { sample_free(ptr) };
    println!("freed by hand");
}

fn immediate(value: f64) -> uniqra::common::Result<()> {
    let mut sample = SampleHandle::new(value);
    println!("acquired on construction: {:?}", **sample);
    sample.try_reset(value + 3.0)?;
    println!("reset re-acquired: {:?}", **sample);
    sample = SampleHandle::new(value + 1.0);
    println!("assigned a fresh handle: {:?}", **sample);
    let moved = sample;
    println!("moved without re-acquiring: {:?}", **moved);
    Ok(())
}

fn delayed(value: f64, times: usize) {
    let mut sample = DelayedSample::new();
    println!("created empty: {}", sample.is_empty());
    for round in 0..times {
        // SAFETY: the out pointer addresses the handle's own slot and is written
        // before the handle is used again.
        unsafe { sample_alloc(sample.as_out_ptr(), value + round as f64) };
        println!("acquired through the out pointer: {:?}", **sample);
    }
}

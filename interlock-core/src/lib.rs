#![no_std]

#[cfg(test)]
extern crate std;

// Shared logic for the interlock acceptance tester.
//
// This crate stays portable across MCU firmware and host tooling by avoiding the
// Rust standard library. Hardware is reached only through the traits in
// `controller`, so the same sequence runs on the bench and in the emulator.

pub mod controller;
pub mod screens;
pub mod sequence;
pub mod signals;
pub mod telemetry;

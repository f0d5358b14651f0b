//! Core library for `loadest-rs`: translate a human-authored run
//! specification and raw observation tables into the fixed-format input
//! files the external LOADEST program requires, and translate its
//! fixed-format output back into unit-converted, time-aligned series.

pub mod domain;
pub mod modules;
pub mod spec;
pub mod tables;
pub mod template;

pub use domain::{LoadestError, LoadestErrorCategory, LoadestResult};

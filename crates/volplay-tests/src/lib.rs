//! Integration test crate for Volplay.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on every volplay crate to verify they work together.

#[cfg(test)]
mod playback;

#[cfg(test)]
mod boundary;

#[cfg(test)]
mod adapters;

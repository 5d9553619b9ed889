//! Volplay Media - the sequence source boundary
//!
//! This crate handles:
//! - The `SequenceSource` decoder contract
//! - Handle lifecycle and deferred configuration (`SourceBinding`)
//! - Sequence probing
//! - A deterministic in-memory source for tests and demos

pub mod binding;
pub mod probe;
pub mod source;
pub mod synthetic;

pub use binding::SourceBinding;
pub use probe::SequenceProbe;
pub use source::{
    AudioFormat, BufferStatus, BufferingConfig, HttpSettings, OpenRequest, SequenceSource,
    SourceDescriptor, SourceKind, SourceSettings, TrackingInfo,
};
pub use synthetic::{ControlState, SyntheticControl, SyntheticSequence, SyntheticSource};

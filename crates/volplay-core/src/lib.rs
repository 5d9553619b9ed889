//! Volplay Core - Foundation types for volumetric sequence playback
//!
//! This crate provides the fundamental types used throughout Volplay:
//! - Time representation (RationalTime, FrameRate, ActiveRange)
//! - Sequence identity and capacity metadata
//! - Mesh and texture slot buffers
//! - Bounds and look-at geometry
//! - In-stream sequence events

pub mod error;
pub mod event;
pub mod frame;
pub mod geometry;
pub mod sequence;
pub mod time;

pub use error::{Result, VolplayError};
pub use event::{CatalogEntry, EventKind, RawEvent, SequenceEvent};
pub use frame::{
    MeshBuffers, ModelRequest, ModelTarget, ModelUpdate, TextureBuffer, VertexAttributes,
};
pub use geometry::{Bounds, LookAt, Vec3};
pub use sequence::{ColorMode, OutOfRangeMode, SequenceHandle, SequenceInfo, TextureEncoding};
pub use time::{ActiveRange, FrameRate, RationalTime, ResolvedRange};

/// Buffering defaults.
pub mod defaults {
    /// Geometry slots in the rotating pool.
    pub const GEOMETRY_BUFFERS: usize = 2;

    /// Texture slots in the rotating pool.
    pub const TEXTURE_BUFFERS: usize = 2;

    /// Decoded meshes the decoder may hold ahead of playback.
    pub const MESH_BUFFER_MAX: u32 = 10;

    /// Compressed chunks the decoder may hold ahead of decoding.
    pub const CHUNK_BUFFER_MAX: u32 = 180;

    /// Payload size of each HTTP request for network sources.
    pub const HTTP_DOWNLOAD_SIZE: u32 = 10_000_000;

    /// Downloaded data cache size for network sources.
    pub const HTTP_CACHE_SIZE: u64 = 1_000_000_000;

    /// Default maximum look-at angle in degrees.
    pub const LOOK_AT_MAX_ANGLE: i32 = 90;
}

//! The decoder boundary.
//!
//! A [`SequenceSource`] turns compressed sequence data into raw mesh and
//! texture buffers on demand. Playback only ever talks to it through a
//! [`SequenceHandle`]; the source may run background fetch/decode work but
//! every call here returns immediately.

use glam::Vec4;
use serde::{Deserialize, Serialize};
use volplay_core::{
    defaults, ActiveRange, CatalogEntry, ModelRequest, ModelTarget, ModelUpdate, OutOfRangeMode,
    RawEvent, Result, SequenceHandle, SequenceInfo, Vec3, VolplayError,
};

/// Where sequence data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SourceKind {
    #[default]
    Local,
    Network,
}

/// Location of a sequence plus how to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub location: String,
    #[serde(default)]
    pub kind: SourceKind,
}

impl SourceDescriptor {
    pub fn local(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            kind: SourceKind::Local,
        }
    }

    pub fn network(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            kind: SourceKind::Network,
        }
    }

    /// Live network streams use the `holosys` scheme.
    pub fn is_live(&self) -> bool {
        self.kind == SourceKind::Network && self.location.starts_with("holosys")
    }

    /// Network locations must be `http(s)://` or `holosys://` URLs.
    pub fn validate(&self) -> Result<()> {
        if self.location.is_empty() {
            return Err(VolplayError::InvalidParameter(
                "sequence location is empty".to_string(),
            ));
        }
        if self.kind == SourceKind::Network
            && !(self.location.starts_with("http") || self.location.starts_with("holosys"))
        {
            return Err(VolplayError::InvalidParameter(format!(
                "network source `{}` must start with http:// or holosys://",
                self.location
            )));
        }
        Ok(())
    }
}

/// Parameters of an open call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    pub source: SourceDescriptor,
    pub range: ActiveRange,
    pub out_of_range: OutOfRangeMode,
}

/// Decoder-side buffering knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferingConfig {
    pub chunk_buffer_max: u32,
    pub mesh_buffer_max: u32,
    pub http_download_size: u32,
    pub http_keep_in_cache: bool,
    pub http_cache_size: u64,
}

impl Default for BufferingConfig {
    fn default() -> Self {
        Self {
            chunk_buffer_max: defaults::CHUNK_BUFFER_MAX,
            mesh_buffer_max: defaults::MESH_BUFFER_MAX,
            http_download_size: defaults::HTTP_DOWNLOAD_SIZE,
            http_keep_in_cache: false,
            http_cache_size: defaults::HTTP_CACHE_SIZE,
        }
    }
}

/// HTTP settings forwarded for non-live network sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    pub download_size: u32,
    pub keep_in_cache: bool,
    pub cache_size: u64,
}

/// The buffering settings actually sent to a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSettings {
    pub chunk_buffer_max: u32,
    pub mesh_buffer_max: u32,
    pub http: Option<HttpSettings>,
}

impl SourceSettings {
    /// Derive the settings for a given source; HTTP knobs only apply to
    /// non-live network streams.
    pub fn for_source(config: &BufferingConfig, source: &SourceDescriptor) -> Self {
        let http = (source.kind == SourceKind::Network && !source.is_live()).then(|| {
            HttpSettings {
                download_size: config.http_download_size,
                keep_in_cache: config.http_keep_in_cache,
                cache_size: config.http_cache_size,
            }
        });
        Self {
            chunk_buffer_max: config.chunk_buffer_max,
            mesh_buffer_max: config.mesh_buffer_max,
            http,
        }
    }
}

/// How much decoded data the source currently holds ahead of playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BufferStatus {
    /// Decoded meshes ready to present.
    pub meshes: u32,
    /// Compressed chunks ready to decode.
    pub chunks: u32,
}

/// Format of the audio embedded in a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channel_count: u16,
    /// Samples per channel.
    pub sample_count: u32,
}

impl AudioFormat {
    /// Interleaved buffer length (`sample_count * channel_count`).
    pub fn buffer_len(&self) -> usize {
        self.sample_count as usize * self.channel_count as usize
    }
}

/// Descriptor of one tracking channel, before its buffers are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingInfo {
    pub first_frame: u32,
    pub last_frame: u32,
    /// Raw rotation representation discriminator.
    pub rotation_kind: i32,
    pub name: String,
}

impl TrackingInfo {
    /// Number of per-frame samples the channel carries.
    pub fn frame_count(&self) -> usize {
        self.last_frame.saturating_sub(self.first_frame) as usize + 1
    }
}

/// The opaque decoder capability injected into playback.
///
/// Calls with a closed or unknown handle fail with
/// [`VolplayError::InvalidHandle`]; expected conditions (stall, nothing new)
/// are reported through return values, never errors.
pub trait SequenceSource: Send {
    /// Open a sequence. Fails with [`VolplayError::SourceNotFound`] when the
    /// resource is missing or malformed.
    fn open(&mut self, request: &OpenRequest) -> Result<SequenceHandle>;

    /// Release a sequence, abandoning in-flight decode work. Unknown handles
    /// are ignored.
    fn close(&mut self, handle: SequenceHandle);

    fn info(&self, handle: SequenceHandle) -> Result<SequenceInfo>;

    fn configure(&mut self, handle: SequenceHandle, settings: &SourceSettings) -> Result<()>;

    /// Effective playback rate; negative while bouncing backwards.
    fn set_speed(&mut self, handle: SequenceHandle, ratio: f32) -> Result<()>;

    fn play(&mut self, handle: SequenceHandle, on: bool) -> Result<()>;

    fn stop(&mut self, handle: SequenceHandle) -> Result<()>;

    fn goto_frame(&mut self, handle: SequenceHandle, frame: u32) -> Result<()>;

    /// Begin fetching and decoding ahead of playback.
    fn start_buffering(&mut self, handle: SequenceHandle) -> Result<()>;

    /// Write the model at or after the decode cursor into `target`.
    fn update_model(
        &mut self,
        handle: SequenceHandle,
        request: &ModelRequest,
        target: ModelTarget<'_>,
    ) -> Result<ModelUpdate>;

    /// Latch events crossed since the previous pull; returns how many.
    fn pull_new_events(&mut self, handle: SequenceHandle) -> Result<usize>;

    /// One of the events latched by the last pull.
    fn event(&self, handle: SequenceHandle, index: usize) -> Result<RawEvent>;

    /// Every event of the sequence, in the order the file lists them.
    fn event_catalog(&self, handle: SequenceHandle) -> Result<Vec<CatalogEntry>>;

    /// `None` when the sequence carries no audio.
    fn audio_format(&self, handle: SequenceHandle) -> Result<Option<AudioFormat>>;

    /// Copy interleaved samples into `samples`; returns how many were written.
    fn read_audio(&self, handle: SequenceHandle, samples: &mut [f32]) -> Result<usize>;

    fn tracking_count(&self, handle: SequenceHandle) -> Result<usize>;

    fn tracking_info(&self, handle: SequenceHandle, index: usize) -> Result<TrackingInfo>;

    /// Fill per-frame positions and rotations of one tracking channel.
    fn read_tracking(
        &self,
        handle: SequenceHandle,
        index: usize,
        positions: &mut [Vec3],
        rotations: &mut [Vec4],
    ) -> Result<()>;

    fn buffer_status(&self, handle: SequenceHandle) -> Result<BufferStatus>;
}

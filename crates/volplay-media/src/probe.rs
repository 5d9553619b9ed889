//! Sequence probing to get metadata without playing.

use serde::{Deserialize, Serialize};
use tracing::info;
use volplay_core::{ActiveRange, OutOfRangeMode, RationalTime, Result, SequenceInfo};

use crate::source::{AudioFormat, OpenRequest, SequenceSource, SourceDescriptor, TrackingInfo};

/// Information about a sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceProbe {
    /// Source location
    pub location: String,
    /// Capacity, color mode and timing
    pub info: SequenceInfo,
    /// Clip length
    pub duration: RationalTime,
    /// Named events in the sequence
    pub event_count: usize,
    /// Embedded audio, if any
    pub audio: Option<AudioFormat>,
    /// Tracking channel descriptors
    pub tracking: Vec<TrackingInfo>,
}

impl SequenceProbe {
    /// Open the sequence, read its metadata, and close it again.
    pub fn probe(source: &mut dyn SequenceSource, descriptor: &SourceDescriptor) -> Result<Self> {
        descriptor.validate()?;
        let handle = source.open(&OpenRequest {
            source: descriptor.clone(),
            range: ActiveRange::FULL,
            out_of_range: OutOfRangeMode::Stop,
        })?;

        let result = Self::read(source, handle, descriptor);
        source.close(handle);
        let probe = result?;
        info!(
            "Probed {}: {} frames at {}, {} events",
            probe.location, probe.info.frame_count, probe.info.frame_rate, probe.event_count
        );
        Ok(probe)
    }

    fn read(
        source: &dyn SequenceSource,
        handle: volplay_core::SequenceHandle,
        descriptor: &SourceDescriptor,
    ) -> Result<Self> {
        let info = source.info(handle)?;
        let event_count = source.event_catalog(handle)?.len();
        let audio = source.audio_format(handle)?;
        let tracking = (0..source.tracking_count(handle)?)
            .map(|index| source.tracking_info(handle, index))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            location: descriptor.location.clone(),
            info,
            duration: RationalTime::from_frames(info.frame_count as i64, info.frame_rate),
            event_count,
            audio,
            tracking,
        })
    }

    /// Check if the sequence carries a texture.
    pub fn is_textured(&self) -> bool {
        self.info.color_mode.is_textured()
    }

    /// Check if the sequence has audio.
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /// Tracking channel names.
    pub fn tracking_names(&self) -> impl Iterator<Item = &str> {
        self.tracking.iter().map(|t| t.name.as_str())
    }
}

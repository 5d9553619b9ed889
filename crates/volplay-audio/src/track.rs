//! Embedded audio, materialized once per sequence load.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use volplay_core::{RationalTime, Result, SequenceHandle, VolplayError};
use volplay_media::SequenceSource;

/// Interleaved samples of the audio carried inside a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioTrack {
    pub sample_rate: u32,
    pub channel_count: u16,
    /// Samples per channel.
    pub sample_count: u32,
    /// `sample_count * channel_count` interleaved values.
    pub samples: Vec<f32>,
}

impl AudioTrack {
    /// Read the full sample buffer from the source.
    ///
    /// Returns `None` when the sequence carries no audio (or an empty buffer).
    pub fn materialize(source: &dyn SequenceSource, handle: SequenceHandle) -> Result<Option<Self>> {
        let Some(format) = source.audio_format(handle)? else {
            debug!("{} has no embedded audio", handle);
            return Ok(None);
        };
        if format.buffer_len() == 0 {
            return Ok(None);
        }
        if format.sample_rate == 0 || format.channel_count == 0 {
            return Err(VolplayError::Decoder(format!(
                "invalid audio format: {} Hz, {} channels",
                format.sample_rate, format.channel_count
            )));
        }

        let mut samples = vec![0.0; format.buffer_len()];
        let written = source.read_audio(handle, &mut samples)?;
        if written != samples.len() {
            return Err(VolplayError::Decoder(format!(
                "audio buffer short: got {} of {} samples",
                written,
                samples.len()
            )));
        }
        info!(
            "Loaded audio: {} Hz, {} channels, {} samples",
            format.sample_rate, format.channel_count, format.sample_count
        );
        Ok(Some(Self {
            sample_rate: format.sample_rate,
            channel_count: format.channel_count,
            sample_count: format.sample_count,
            samples,
        }))
    }

    /// Exact track length.
    pub fn duration(&self) -> RationalTime {
        RationalTime::new(self.sample_count as i64, self.sample_rate.max(1) as i64)
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration().to_seconds_f64()
    }

    /// Samples of one channel, de-interleaved.
    pub fn channel(&self, index: u16) -> Option<Vec<f32>> {
        if index >= self.channel_count {
            return None;
        }
        Some(
            self.samples
                .iter()
                .skip(index as usize)
                .step_by(self.channel_count as usize)
                .copied()
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use volplay_core::{ActiveRange, FrameRate, OutOfRangeMode};
    use volplay_media::{OpenRequest, SourceDescriptor, SyntheticSequence, SyntheticSource};

    fn open(sequence: SyntheticSequence) -> (SyntheticSource, SequenceHandle) {
        let mut source = SyntheticSource::new().with_sequence("clip", sequence);
        let handle = source
            .open(&OpenRequest {
                source: SourceDescriptor::local("clip"),
                range: ActiveRange::FULL,
                out_of_range: OutOfRangeMode::Loop,
            })
            .unwrap();
        (source, handle)
    }

    #[test]
    fn test_materialize_full_buffer() {
        let (source, handle) =
            open(SyntheticSequence::new(60, FrameRate::FPS_30).with_audio(48_000, 2, 96_000));
        let track = AudioTrack::materialize(&source, handle).unwrap().unwrap();
        assert_eq!(track.samples.len(), 192_000);
        assert_eq!(track.duration_seconds(), 2.0);
        assert_eq!(track.channel(1).unwrap().len(), 96_000);
        assert!(track.channel(2).is_none());
    }

    #[test]
    fn test_no_audio() {
        let (source, handle) = open(SyntheticSequence::new(60, FrameRate::FPS_30));
        assert!(AudioTrack::materialize(&source, handle).unwrap().is_none());
    }
}

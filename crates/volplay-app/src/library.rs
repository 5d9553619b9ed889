//! Built-in sequences served by the synthetic source.

use volplay_core::{FrameRate, TextureEncoding};
use volplay_media::{SyntheticSequence, SyntheticSource};

/// Locations known to [`demo_source`].
pub const LOCATIONS: &[&str] = &["demo", "demo-textured", "demo-audio", "demo-tracked"];

/// A source holding every demo sequence.
pub fn demo_source(frames: u32, frame_rate: FrameRate) -> SyntheticSource {
    let base = || {
        SyntheticSequence::new(frames, frame_rate)
            .with_vertices(512)
            .with_event(frames / 4, "intro")
            .with_event(frames / 2, "explosion")
            .with_event(frames * 3 / 4, "outro")
    };
    SyntheticSource::new()
        .with_sequence("demo", base().with_look_at())
        .with_sequence(
            "demo-textured",
            base().textured(1024, TextureEncoding::Astc8x8),
        )
        .with_sequence(
            "demo-audio",
            base().with_audio(48_000, 2, audio_samples(frames, frame_rate)),
        )
        .with_sequence(
            "demo-tracked",
            base()
                .with_tracking("head", 0, frames - 1, 0)
                .with_tracking("hand", frames / 4, frames / 2, 1),
        )
}

/// Samples per channel covering the whole sequence at 48 kHz.
fn audio_samples(frames: u32, frame_rate: FrameRate) -> u32 {
    (frames as f64 / frame_rate.to_fps_f64() * 48_000.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use volplay_media::{SequenceProbe, SourceDescriptor};

    #[test]
    fn test_every_location_opens() {
        let mut source = demo_source(120, FrameRate::FPS_30);
        for location in LOCATIONS {
            let probe = SequenceProbe::probe(&mut source, &SourceDescriptor::local(*location)).unwrap();
            assert_eq!(probe.info.frame_count, 120);
        }
    }

    #[test]
    fn test_audio_covers_sequence() {
        assert_eq!(audio_samples(120, FrameRate::FPS_30), 192_000);
    }
}

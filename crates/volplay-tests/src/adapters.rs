//! Integration tests for the audio and tracking adapters and clip timing.

use glam::{Quat, Vec3};
use volplay_audio::{AudioSync, FeedSink};
use volplay_core::{FrameRate, RationalTime};
use volplay_media::{SourceDescriptor, SyntheticSequence, SyntheticSource};
use volplay_playback::{ClipTiming, Player, PlayerConfig};
use volplay_tracking::TrackingSet;

fn player(sequence: SyntheticSequence) -> Player {
    let source = SyntheticSource::new().with_sequence("clip", sequence);
    Player::new(Box::new(source), PlayerConfig::new(SourceDescriptor::local("clip")))
}

// ── Audio ──────────────────────────────────────────────────────

#[test]
fn feed_sink_follows_goto() {
    let sequence = SyntheticSequence::new(120, FrameRate::FPS_30).with_audio(48_000, 1, 192_000);
    let mut player = player(sequence);
    let sink = FeedSink::new();
    let reader = sink.reader();
    player.set_audio_sink(Box::new(sink.clone()));
    player.start().unwrap();

    player.goto_frame(60).unwrap();
    assert!(sink.is_playing());
    let mut buffer = [0.0f32; 64];
    assert_eq!(reader.fill(&mut buffer), 64);

    // the cued position is 2.0 s into a 440 Hz tone
    let track = player.audio().unwrap();
    assert_eq!(buffer[0], track.samples[96_000]);
}

#[test]
fn sync_cue_matches_clock_frame() {
    let sync = AudioSync::new(FrameRate::FPS_30);
    let cue = sync.cue(90, 1.0);
    assert_eq!(cue.offset, RationalTime::new(3, 1));
    assert!(!sync.needs_resync(&cue, 3.05));
    assert!(sync.needs_resync(&cue, 3.5));
}

#[test]
fn pause_silences_sink() {
    let sequence = SyntheticSequence::new(60, FrameRate::FPS_30).with_audio(48_000, 2, 96_000);
    let mut player = player(sequence);
    let sink = FeedSink::new();
    let reader = sink.reader();
    player.set_audio_sink(Box::new(sink));
    player.start().unwrap();
    player.pause().unwrap();

    let mut buffer = [1.0f32; 32];
    assert_eq!(reader.fill(&mut buffer), 0);
    assert!(buffer.iter().all(|&sample| sample == 0.0));
}

// ── Tracking ───────────────────────────────────────────────────

#[test]
fn tracking_channels_are_keyed_by_name() {
    let sequence = SyntheticSequence::new(60, FrameRate::FPS_30)
        .with_tracking("head", 0, 59, 0)
        .with_tracking("head", 10, 19, 0);
    let mut player = player(sequence);
    player.initialize().unwrap();

    let tracking: &TrackingSet = player.tracking().unwrap();
    let names: Vec<_> = tracking.names().collect();
    assert_eq!(names, ["head", "head1"]);

    let second = tracking.get("head1").unwrap();
    assert_eq!(second.len(), 10);
    assert!(second.position(10).unwrap().abs_diff_eq(Vec3::new(0.1, 1.0, 0.0), 1e-6));
    assert_eq!(second.position(20), None);
    let expected = Quat::from_rotation_y(0.1);
    assert!(second.orientation(10).unwrap().abs_diff_eq(expected, 1e-6));
}

#[test]
fn tracking_keyframes_are_timed_by_frame_rate() {
    let sequence = SyntheticSequence::new(50, FrameRate::FPS_25).with_tracking("prop", 5, 14, 0);
    let mut player = player(sequence);
    player.initialize().unwrap();

    let keyframes = player.tracking().unwrap().keyframes(FrameRate::FPS_25);
    assert_eq!(keyframes.len(), 1);
    let (name, keys) = &keyframes[0];
    assert_eq!(*name, "prop");
    assert_eq!(keys.len(), 10);
    assert_eq!(keys[5].time, RationalTime::new(1, 5));
}

// ── Timeline clips ─────────────────────────────────────────────

#[test]
fn clip_timing_drives_player() {
    let mut player = player(SyntheticSequence::new(300, FrameRate::FPS_30));
    player.initialize().unwrap();

    let clip = ClipTiming::new(0, Some(150), 300, FrameRate::FPS_30, 10.0).unwrap();
    player.set_speed_ratio(clip.speed_ratio()).unwrap();
    player.goto_frame(clip.frame_at(4.0)).unwrap();

    assert_eq!(player.speed_ratio(), 0.5);
    assert_eq!(player.current_frame(), Some(60));
    let cue = clip.audio_cue(4.0);
    assert_eq!(cue.pitch, 0.5);
    assert_eq!(cue.offset, RationalTime::new(2, 1));
}

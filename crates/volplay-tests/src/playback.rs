//! Integration tests for the playback engine.
//!
//! Drives volplay-playback end to end over the synthetic source from
//! volplay-media.

use proptest::prelude::*;
use volplay_core::{ActiveRange, FrameRate, OutOfRangeMode, TextureEncoding, VolplayError};
use volplay_media::{SourceDescriptor, SyntheticControl, SyntheticSequence, SyntheticSource};
use volplay_playback::{FrameUpdate, PlaybackEvent, PlaybackState, Player, PlayerConfig};

const DT: f64 = 1.0 / 30.0;

// ── Helpers ────────────────────────────────────────────────────

fn player(sequence: SyntheticSequence, configure: impl FnOnce(&mut PlayerConfig)) -> (Player, SyntheticControl) {
    let source = SyntheticSource::new().with_sequence("clip", sequence);
    let control = source.control();
    let mut config = PlayerConfig::new(SourceDescriptor::local("clip"));
    configure(&mut config);
    (Player::new(Box::new(source), config), control)
}

fn frames(player: &mut Player, ticks: usize) -> Vec<u32> {
    (0..ticks).map(|_| player.tick(DT).unwrap().frame).collect()
}

fn any_mode() -> impl Strategy<Value = OutOfRangeMode> {
    prop_oneof![
        Just(OutOfRangeMode::Loop),
        Just(OutOfRangeMode::Reverse),
        Just(OutOfRangeMode::Stop),
        Just(OutOfRangeMode::Hide),
    ]
}

// ── Scenarios ──────────────────────────────────────────────────

#[test]
fn loop_over_ten_frames_wraps_exactly_once() {
    let (mut player, _) = player(SyntheticSequence::new(10, FrameRate::FPS_30), |config| {
        config.active_range = ActiveRange::new(0, Some(9)).unwrap();
    });
    player.start().unwrap();
    assert_eq!(frames(&mut player, 12), [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 0, 1]);
}

#[test]
fn vertex_colored_sequence_never_allocates_texture() {
    let (mut player, _) = player(SyntheticSequence::new(30, FrameRate::FPS_30), |_| {});
    player.start().unwrap();
    for _ in 0..40 {
        player.tick(DT).unwrap();
        assert!(player.texture().is_none());
    }
    assert!(player.mesh().is_some());
}

#[test]
fn textured_sequence_rotates_texture_slots() {
    let sequence = SyntheticSequence::new(30, FrameRate::FPS_30).textured(256, TextureEncoding::Pvrtc2);
    let (mut player, _) = player(sequence, |config| config.texture_buffers = 3);
    player.start().unwrap();
    for expected in 0..5u8 {
        player.tick(DT).unwrap();
        let texture = player.texture().unwrap();
        assert_eq!(texture.data.len(), 256 * 256 / 4);
        assert_eq!(texture.data[0], expected);
    }
}

#[test]
fn goto_named_event() {
    let sequence = SyntheticSequence::new(100, FrameRate::FPS_30)
        .with_event(42, "explosion")
        .with_event(80, "credits");
    let (mut player, _) = player(sequence, |config| config.auto_play = false);
    player.start().unwrap();

    player.goto_event("explosion").unwrap();
    assert_eq!(player.current_frame(), Some(42));
    assert_eq!(player.state(), PlaybackState::Stopped);

    let err = player.goto_event("missing").unwrap_err();
    assert!(matches!(err, VolplayError::UnknownEventName(_)));
    assert_eq!(player.current_frame(), Some(42));
}

#[test]
fn audio_bearing_sequence_materializes_full_buffer() {
    let sequence = SyntheticSequence::new(60, FrameRate::FPS_30).with_audio(48_000, 2, 96_000);
    let (mut player, _) = player(sequence, |_| {});
    player.initialize().unwrap();

    let audio = player.audio().unwrap();
    assert_eq!(audio.sample_rate, 48_000);
    assert_eq!(audio.channel_count, 2);
    assert_eq!(audio.samples.len(), 192_000);
    assert_eq!(audio.duration_seconds(), 2.0);
}

#[test]
fn stalled_decoder_is_not_an_error() {
    let (mut player, control) = player(SyntheticSequence::new(60, FrameRate::FPS_30), |_| {});
    player.start().unwrap();
    frames(&mut player, 3);
    control.set_stalled(true);

    let presented = player.last_model_id();
    for _ in 0..100 {
        let report = player.tick(DT).unwrap();
        assert_eq!(report.update, FrameUpdate::Unchanged);
        assert!(player.mesh().is_some());
    }
    assert_eq!(player.last_model_id(), presented);
}

#[test]
fn catalog_lists_events_stably_by_frame() {
    let sequence = SyntheticSequence::new(100, FrameRate::FPS_30)
        .with_event(50, "b")
        .with_event(10, "a")
        .with_event(50, "c")
        .with_event(10, "d");
    let (mut player, _) = player(sequence, |_| {});
    player.initialize().unwrap();

    let names: Vec<_> = player
        .catalog()
        .unwrap()
        .entries()
        .iter()
        .map(|entry| entry.name.as_str())
        .collect();
    assert_eq!(names, ["a", "d", "b", "c"]);
}

#[test]
fn events_arrive_in_frame_order_within_a_pass() {
    let sequence = SyntheticSequence::new(40, FrameRate::FPS_30)
        .with_event(5, "one")
        .with_event(6, "two")
        .with_event(20, "three");
    let (mut player, _) = player(sequence, |config| {
        config.out_of_range = OutOfRangeMode::Stop;
        config.speed_ratio = 3.0;
    });
    let events = player.subscribe();
    player.start().unwrap();
    frames(&mut player, 30);

    let event_frames: Vec<u32> = events
        .try_iter()
        .filter_map(|event| match event {
            PlaybackEvent::FirstFrame { frame }
            | PlaybackEvent::LastFrame { frame }
            | PlaybackEvent::User { frame, .. } => Some(frame),
            _ => None,
        })
        .collect();
    assert_eq!(event_frames, [0, 5, 6, 20, 39]);
}

#[test]
fn network_sources_are_validated_before_open() {
    let source = SyntheticSource::new();
    let mut player = Player::new(
        Box::new(source),
        PlayerConfig::new(SourceDescriptor::network("ftp://example.com/clip")),
    );
    assert!(matches!(player.initialize(), Err(VolplayError::InvalidParameter(_))));
}

#[test]
fn saved_config_drives_a_player() {
    let mut config = PlayerConfig::new(SourceDescriptor::local("clip"));
    config.active_range = ActiveRange::new(3, Some(6)).unwrap();
    config.out_of_range = OutOfRangeMode::Reverse;
    let json = volplay_playback::PlayerConfigFile::new(config).to_json().unwrap();
    let loaded = volplay_playback::PlayerConfigFile::from_json(&json).unwrap();

    let source = SyntheticSource::new().with_sequence("clip", SyntheticSequence::new(10, FrameRate::FPS_30));
    let mut player = Player::new(Box::new(source), loaded.config);
    player.start().unwrap();
    assert_eq!(frames(&mut player, 8), [3, 4, 5, 6, 5, 4, 3, 4]);
}

// ── Properties ─────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn current_frame_stays_in_active_range(
        first in 0u32..40,
        len in 1u32..40,
        mode in any_mode(),
        speed in 0.25f32..4.0,
        ticks in 1usize..150,
    ) {
        let last = first + len - 1;
        let (mut player, _) = player(SyntheticSequence::new(80, FrameRate::FPS_30), |config| {
            config.active_range = ActiveRange::new(first, Some(last)).unwrap();
            config.out_of_range = mode;
            config.speed_ratio = speed;
        });
        player.start().unwrap();
        for _ in 0..ticks {
            let frame = player.tick(DT).unwrap().frame;
            prop_assert!(frame >= first && frame <= last);
            prop_assert_eq!(player.current_frame(), Some(frame));
        }
    }

    #[test]
    fn published_model_ids_never_regress(
        mode in any_mode(),
        speed in 0.25f32..4.0,
        stalls in proptest::collection::vec(any::<bool>(), 1..120),
    ) {
        let (mut player, control) = player(SyntheticSequence::new(25, FrameRate::FPS_30), |config| {
            config.out_of_range = mode;
            config.speed_ratio = speed;
        });
        player.start().unwrap();
        let mut last = player.last_model_id();
        for stalled in stalls {
            control.set_stalled(stalled);
            player.tick(DT).unwrap();
            let id = player.last_model_id();
            prop_assert!(id >= last);
            last = id;
        }
    }

    #[test]
    fn goto_frame_round_trips(first in 0u32..30, len in 1u32..30, offset in 0u32..30) {
        let last = first + len - 1;
        let target = first + offset % len;
        let (mut player, _) = player(SyntheticSequence::new(60, FrameRate::FPS_30), |config| {
            config.active_range = ActiveRange::new(first, Some(last)).unwrap();
        });
        player.start().unwrap();
        player.goto_frame(target).unwrap();
        prop_assert_eq!(player.current_frame(), Some(target));
    }
}

//! Integration tests for the source boundary as seen through the player.

use volplay_core::{ActiveRange, FrameRate, OutOfRangeMode};
use volplay_media::{
    BufferingConfig, OpenRequest, SequenceProbe, SequenceSource, SourceBinding, SourceDescriptor,
    SyntheticSequence, SyntheticSource,
};
use volplay_playback::{PlaybackEvent, Player, PlayerConfig};

fn library() -> SyntheticSource {
    let sequence = || SyntheticSequence::new(50, FrameRate::FPS_25).with_event(10, "cue");
    SyntheticSource::new()
        .with_sequence("local.4ds", sequence())
        .with_sequence("https://cdn.example.com/clip.4ds", sequence())
        .with_sequence("holosys://studio/live", sequence())
}

#[test]
fn http_settings_only_reach_non_live_network_sources() {
    let cases = [
        (SourceDescriptor::local("local.4ds"), false),
        (SourceDescriptor::network("https://cdn.example.com/clip.4ds"), true),
        (SourceDescriptor::network("holosys://studio/live"), false),
    ];
    for (descriptor, expects_http) in cases {
        let source = library();
        let control = source.control();
        let mut player = Player::new(Box::new(source), PlayerConfig::new(descriptor.clone()));
        player.initialize().unwrap();

        let settings = control.snapshot().last_settings.unwrap();
        assert_eq!(settings.http.is_some(), expects_http, "{}", descriptor.location);
        assert_eq!(settings.chunk_buffer_max, 180);
        assert_eq!(settings.mesh_buffer_max, 10);
    }
}

#[test]
fn close_is_safe_to_repeat_and_releases_handle() {
    let source = library();
    let control = source.control();
    let mut binding = SourceBinding::new(Box::new(source));
    let request = OpenRequest {
        source: SourceDescriptor::local("local.4ds"),
        range: ActiveRange::FULL,
        out_of_range: OutOfRangeMode::Loop,
    };
    let handle = binding.open(&request).unwrap();
    binding.close();
    binding.close();
    assert_eq!(control.snapshot().close_count, 1);
    assert!(binding.source().info(handle).is_err());
}

#[test]
fn configuration_before_open_is_deferred() {
    let source = library();
    let control = source.control();
    let mut binding = SourceBinding::new(Box::new(source));
    let config = BufferingConfig {
        chunk_buffer_max: 30,
        ..Default::default()
    };
    binding.configure(config).unwrap();
    binding.set_speed(0.5).unwrap();
    assert_eq!(control.snapshot().configure_calls, 0);
    assert_eq!(control.snapshot().last_speed, None);

    binding
        .open(&OpenRequest {
            source: SourceDescriptor::local("local.4ds"),
            range: ActiveRange::FULL,
            out_of_range: OutOfRangeMode::Loop,
        })
        .unwrap();
    let snapshot = control.snapshot();
    assert_eq!(snapshot.configure_calls, 1);
    assert_eq!(snapshot.last_settings.unwrap().chunk_buffer_max, 30);
    assert_eq!(snapshot.last_speed, Some(0.5));
}

#[test]
fn reinitializing_after_close_opens_a_fresh_handle() {
    let source = library();
    let control = source.control();
    let mut player = Player::new(
        Box::new(source),
        PlayerConfig::new(SourceDescriptor::local("local.4ds")),
    );
    let events = player.subscribe();
    player.start().unwrap();
    player.close();
    player.start().unwrap();

    assert_eq!(control.snapshot().close_count, 1);
    let first_frames = events
        .try_iter()
        .filter(|event| matches!(event, PlaybackEvent::FirstFrame { frame: 0 }))
        .count();
    assert_eq!(first_frames, 2);
}

#[test]
fn probe_reports_metadata_and_closes() {
    let mut source = library();
    let control = source.control();
    let probe = SequenceProbe::probe(
        &mut source,
        &SourceDescriptor::network("https://cdn.example.com/clip.4ds"),
    )
    .unwrap();
    assert_eq!(probe.info.frame_count, 50);
    assert_eq!(probe.duration.to_seconds_f64(), 2.0);
    assert_eq!(probe.event_count, 1);
    assert!(!probe.is_textured());
    assert_eq!(control.snapshot().close_count, 1);

    let json = serde_json::to_value(&probe).unwrap();
    assert_eq!(json["location"], "https://cdn.example.com/clip.4ds");
}

#[test]
fn unknown_location_is_not_found() {
    let mut source = library();
    let err = source
        .open(&OpenRequest {
            source: SourceDescriptor::local("missing.4ds"),
            range: ActiveRange::FULL,
            out_of_range: OutOfRangeMode::Loop,
        })
        .unwrap_err();
    assert!(matches!(err, volplay_core::VolplayError::SourceNotFound(_)));
}

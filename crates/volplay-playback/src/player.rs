//! The consumer-facing player.
//!
//! A [`Player`] owns one [`SourceBinding`] and, once initialized, the clock,
//! buffer pool, event catalog and the materialized audio and tracking data of
//! the open sequence. The host drives it with [`Player::tick`] once per
//! rendered frame and reads the presented buffers between ticks.

use crossbeam_channel::Receiver;
use tracing::{debug, info, warn};
use volplay_audio::{AudioSink, AudioSync, AudioTrack};
use volplay_core::{
    Bounds, FrameRate, LookAt, MeshBuffers, OutOfRangeMode, ResolvedRange, Result, SequenceHandle,
    SequenceInfo, TextureBuffer, Vec3, VolplayError,
};
use volplay_media::{BufferStatus, BufferingConfig, OpenRequest, SequenceSource, SourceBinding};
use volplay_tracking::TrackingSet;

use crate::buffer_pool::BufferPool;
use crate::clock::{Direction, PlaybackClock, PlaybackState};
use crate::config::PlayerConfig;
use crate::events::{pull_events, EventBatch, EventCatalog};
use crate::hub::{EventHub, PlaybackEvent};
use crate::pipeline::{FramePipeline, FrameUpdate};
use crate::stats::{MonotonicTime, PlaybackStats, StatsCollector, TimeSource};

/// What one [`Player::tick`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub frame: u32,
    pub update: FrameUpdate,
    pub events: EventBatch,
    /// Nothing is presentable this tick.
    pub hidden: bool,
}

/// State that exists only while a sequence is open.
#[derive(Debug)]
struct Loaded {
    handle: SequenceHandle,
    info: SequenceInfo,
    clock: PlaybackClock,
    pipeline: FramePipeline,
    catalog: EventCatalog,
    audio: Option<AudioTrack>,
    audio_sync: AudioSync,
    tracking: TrackingSet,
    applied_rate: f32,
}

pub struct Player {
    config: PlayerConfig,
    binding: SourceBinding,
    loaded: Option<Loaded>,
    hub: EventHub,
    time_scale: f32,
    look_at_target: Option<Vec3>,
    audio_sink: Option<Box<dyn AudioSink>>,
    resume_playing: Option<bool>,
    stats: Option<StatsCollector>,
}

impl Player {
    pub fn new(source: Box<dyn SequenceSource>, config: PlayerConfig) -> Self {
        Self::with_time_source(source, config, Box::new(MonotonicTime::default()))
    }

    /// Like [`Player::new`], reading statistics time from `time`.
    pub fn with_time_source(
        source: Box<dyn SequenceSource>,
        config: PlayerConfig,
        time: Box<dyn TimeSource>,
    ) -> Self {
        let stats = config.collect_stats.then(|| StatsCollector::new(time));
        Self {
            config,
            binding: SourceBinding::new(source),
            loaded: None,
            hub: EventHub::new(),
            time_scale: 1.0,
            look_at_target: None,
            audio_sink: None,
            resume_playing: None,
            stats,
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Receive every notification raised from now on.
    pub fn subscribe(&mut self) -> Receiver<PlaybackEvent> {
        self.hub.subscribe()
    }

    /// Open the configured source and materialize everything that is read
    /// once per load. Does nothing if already initialized.
    pub fn initialize(&mut self) -> Result<()> {
        if self.loaded.is_some() {
            return Ok(());
        }
        self.config.validate()?;
        self.binding.configure(self.config.buffering)?;

        let request = OpenRequest {
            source: self.config.source.clone(),
            range: self.config.active_range,
            out_of_range: self.config.out_of_range,
        };
        let handle = match self.binding.open(&request) {
            Ok(handle) => handle,
            Err(err) => {
                self.hub.emit(PlaybackEvent::ModelNotFound {
                    location: self.config.source.location.clone(),
                });
                return Err(err);
            }
        };

        let loaded = match self.load(handle) {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!("Failed to load {}: {}", self.config.source.location, err);
                self.binding.close();
                return Err(err);
            }
        };
        info!(
            "Initialized {}: {} frames at {}, range {}..={}, {:?}",
            self.config.source.location,
            loaded.info.frame_count,
            loaded.info.frame_rate,
            loaded.clock.range().first,
            loaded.clock.range().last,
            loaded.clock.mode()
        );

        if let (Some(sink), Some(track)) = (self.audio_sink.as_mut(), loaded.audio.as_ref()) {
            sink.load(track);
        }
        let first = loaded.clock.range().first;
        self.loaded = Some(loaded);
        self.binding.set_speed(self.effective_rate())?;
        self.present(first)?;
        self.dispatch_events()?;
        Ok(())
    }

    fn load(&self, handle: SequenceHandle) -> Result<Loaded> {
        let source = self.binding.source();
        let info = source.info(handle)?;
        let range = self.config.active_range.resolve(info.frame_count)?;

        let mut clock = PlaybackClock::new(range, self.config.out_of_range, info.frame_rate);
        clock.set_speed_ratio(self.config.speed_ratio)?;
        clock.set_time_scale(self.time_scale)?;

        let pool = BufferPool::allocate(
            &info,
            self.config.geometry_buffers,
            self.config.texture_buffers,
        )?;
        let catalog = EventCatalog::load(source, handle)?;
        let audio = if self.config.play_audio {
            AudioTrack::materialize(source, handle)?
        } else {
            None
        };
        let tracking = TrackingSet::extract(source, handle)?;

        Ok(Loaded {
            handle,
            info,
            applied_rate: clock.effective_rate(),
            clock,
            pipeline: FramePipeline::new(pool),
            catalog,
            audio,
            audio_sync: AudioSync::new(info.frame_rate),
            tracking,
        })
    }

    /// Initialize, then play if `auto_play` is set.
    pub fn start(&mut self) -> Result<()> {
        self.initialize()?;
        if self.config.auto_play {
            self.play(true)?;
        }
        Ok(())
    }

    /// Ask the source to start filling its buffers ahead of playback.
    pub fn start_buffering(&mut self) -> Result<()> {
        let handle = self.loaded()?.handle;
        self.binding.source_mut().start_buffering(handle)
    }

    /// Release the sequence. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.loaded.take().is_some() {
            if let Some(sink) = self.audio_sink.as_mut() {
                sink.stop();
            }
            if let Some(stats) = self.stats.as_mut() {
                stats.on_pause();
            }
        }
        self.resume_playing = None;
        self.binding.close();
    }

    pub fn is_initialized(&self) -> bool {
        self.loaded.is_some()
    }

    /// Advance playback by `dt` seconds of host time.
    pub fn tick(&mut self, dt: f64) -> Result<TickReport> {
        let loaded = self.loaded_mut()?;
        let tick = loaded.clock.advance(dt);
        self.sync_rate()?;

        let update = if tick.hidden {
            FrameUpdate::Unchanged
        } else {
            self.present(tick.frame)?
        };
        let events = self.dispatch_events()?;

        if let Some(stats) = self.stats.as_mut() {
            let last_model_id = self.loaded.as_ref().and_then(|l| l.pipeline.last_model_id());
            stats.record_tick(last_model_id, matches!(update, FrameUpdate::Published { .. }));
        }

        let range = self.loaded()?.clock.range();
        let playing = self.loaded()?.clock.is_playing();
        if playing && tick.direction == Direction::Forward {
            if !self.config.looping && (tick.wrapped || tick.frame == range.last) {
                debug!("Looping disabled, stopping at frame {}", tick.frame);
                self.loaded_mut()?.clock.finish();
                self.stop_outputs()?;
            } else if tick.wrapped {
                self.cue_audio();
            }
        }
        if tick.ended {
            self.stop_outputs()?;
        }
        if tick.bounced && tick.direction == Direction::Forward {
            self.cue_audio();
        }
        self.check_audio_drift();

        Ok(TickReport {
            frame: tick.frame,
            update,
            events,
            hidden: tick.hidden,
        })
    }

    /// `true` plays (restarting from the first frame if the run ended, be it
    /// a `Stop` or `Hide` range or a pass with looping off), `false` pauses.
    pub fn play(&mut self, on: bool) -> Result<()> {
        let loaded = self.loaded_mut()?;
        let handle = loaded.handle;
        if !on {
            loaded.clock.play(false);
            self.binding.source_mut().play(handle, false)?;
            if let Some(sink) = self.audio_sink.as_mut() {
                sink.pause();
            }
            if let Some(stats) = self.stats.as_mut() {
                stats.on_pause();
            }
            return Ok(());
        }

        let before = loaded.clock.current_frame();
        loaded.clock.play(true);
        let now = loaded.clock.current_frame();
        if now != before {
            self.binding.source_mut().goto_frame(handle, now)?;
            if let Some(loaded) = self.loaded.as_mut() {
                loaded.pipeline.mark_seek();
            }
        }
        self.binding.source_mut().play(handle, true)?;
        if let Some(stats) = self.stats.as_mut() {
            let last_model_id = self.loaded.as_ref().and_then(|l| l.pipeline.last_model_id());
            stats.on_play(last_model_id);
        }
        self.cue_audio();
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        self.play(false)
    }

    pub fn stop(&mut self) -> Result<()> {
        self.loaded_mut()?.clock.stop();
        self.stop_outputs()
    }

    fn stop_outputs(&mut self) -> Result<()> {
        let handle = self.loaded()?.handle;
        self.binding.source_mut().stop(handle)?;
        if let Some(sink) = self.audio_sink.as_mut() {
            sink.stop();
        }
        if let Some(stats) = self.stats.as_mut() {
            stats.on_pause();
        }
        Ok(())
    }

    /// Jump to `frame` and present it, keeping the play state.
    pub fn goto_frame(&mut self, frame: u32) -> Result<()> {
        let loaded = self.loaded_mut()?;
        let handle = loaded.handle;
        let was_playing = loaded.clock.is_playing();
        loaded.clock.seek(frame)?;
        if was_playing {
            loaded.clock.play(false);
        }
        loaded.pipeline.mark_seek();

        self.binding.source_mut().goto_frame(handle, frame)?;
        info!("Seek to frame {}", frame);
        self.present(frame)?;
        self.dispatch_events()?;

        if was_playing {
            self.loaded_mut()?.clock.play(true);
            if let Some(stats) = self.stats.as_mut() {
                let last_model_id = self.loaded.as_ref().and_then(|l| l.pipeline.last_model_id());
                stats.on_play(last_model_id);
            }
            self.cue_audio();
        }
        Ok(())
    }

    /// Jump to the frame of a named event from the catalog.
    pub fn goto_event(&mut self, name: &str) -> Result<()> {
        let Some(frame) = self.loaded()?.catalog.frame_of(name) else {
            warn!("No event named {}", name);
            return Err(VolplayError::UnknownEventName(name.to_string()));
        };
        self.goto_frame(frame)
    }

    /// Materialize a single frame without playing, initializing if needed.
    pub fn preview(&mut self, frame: u32) -> Result<()> {
        self.initialize()?;
        if self.is_playing() {
            self.pause()?;
        }
        self.goto_frame(frame)
    }

    /// Pause for a focus loss, remembering whether playback was running.
    pub fn suspend(&mut self) -> Result<()> {
        let playing = self.loaded()?.clock.is_playing();
        self.resume_playing = Some(playing);
        if playing {
            self.pause()?;
        }
        Ok(())
    }

    /// Undo [`Player::suspend`].
    pub fn resume(&mut self) -> Result<()> {
        if self.resume_playing.take() == Some(true) {
            self.play(true)?;
        }
        Ok(())
    }

    pub fn speed_ratio(&self) -> f32 {
        self.config.speed_ratio
    }

    pub fn set_speed_ratio(&mut self, ratio: f32) -> Result<()> {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.clock.set_speed_ratio(ratio)?;
        } else if !ratio.is_finite() || ratio <= 0.0 {
            return Err(VolplayError::InvalidParameter(format!(
                "speed ratio must be positive, got {}",
                ratio
            )));
        }
        self.config.speed_ratio = ratio;
        self.sync_rate()
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// External time dilation applied on top of the speed ratio.
    pub fn set_time_scale(&mut self, scale: f32) -> Result<()> {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.clock.set_time_scale(scale)?;
        } else if !scale.is_finite() || scale < 0.0 {
            return Err(VolplayError::InvalidParameter(format!(
                "time scale must be non-negative, got {}",
                scale
            )));
        }
        self.time_scale = scale;
        self.sync_rate()
    }

    /// Bias the model toward `target` (local space) from the next tick on.
    /// `None` turns the bias off.
    pub fn set_look_at(&mut self, target: Option<Vec3>) {
        self.look_at_target = target;
    }

    /// The bias sent with the next fetch; only while playing a sequence that
    /// supports it.
    pub fn look_at(&self) -> Option<LookAt> {
        let active = self
            .loaded
            .as_ref()
            .is_some_and(|l| l.info.has_look_at && l.clock.is_playing());
        self.look_at_target
            .filter(|_| active)
            .map(|target| LookAt::new(target, self.config.look_at_max_angle))
    }

    /// Replace the buffering knobs; forwarded to an open source on change.
    pub fn set_buffering(&mut self, buffering: BufferingConfig) -> Result<()> {
        self.config.buffering = buffering;
        self.binding.configure(buffering)
    }

    pub fn set_audio_sink(&mut self, mut sink: Box<dyn AudioSink>) {
        if let Some(track) = self.loaded.as_ref().and_then(|l| l.audio.as_ref()) {
            sink.load(track);
        }
        self.audio_sink = Some(sink);
    }

    pub fn state(&self) -> PlaybackState {
        self.loaded
            .as_ref()
            .map_or(PlaybackState::Stopped, |l| l.clock.state())
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    pub fn current_frame(&self) -> Option<u32> {
        self.loaded.as_ref().map(|l| l.clock.current_frame())
    }

    pub fn frame_rate(&self) -> Option<FrameRate> {
        self.loaded.as_ref().map(|l| l.info.frame_rate)
    }

    pub fn frame_count(&self) -> Option<u32> {
        self.loaded.as_ref().map(|l| l.info.frame_count)
    }

    pub fn active_range(&self) -> Option<ResolvedRange> {
        self.loaded.as_ref().map(|l| l.clock.range())
    }

    pub fn active_frame_count(&self) -> Option<u32> {
        self.active_range().map(|range| range.len())
    }

    pub fn info(&self) -> Option<&SequenceInfo> {
        self.loaded.as_ref().map(|l| &l.info)
    }

    pub fn out_of_range(&self) -> OutOfRangeMode {
        self.config.out_of_range
    }

    /// Whether the consumer should draw nothing.
    pub fn is_hidden(&self) -> bool {
        self.loaded.as_ref().is_some_and(|l| l.clock.is_hidden())
    }

    /// The presented geometry, or `None` before the first model or while
    /// hidden.
    pub fn mesh(&self) -> Option<&MeshBuffers> {
        let loaded = self.loaded.as_ref()?;
        if loaded.clock.is_hidden() {
            return None;
        }
        loaded.pipeline.mesh()
    }

    /// The presented texture; always `None` for vertex-colored sequences.
    pub fn texture(&self) -> Option<&TextureBuffer> {
        let loaded = self.loaded.as_ref()?;
        if loaded.clock.is_hidden() {
            return None;
        }
        loaded.pipeline.texture()
    }

    pub fn vertex_count(&self) -> u32 {
        self.mesh().map_or(0, |mesh| mesh.vertex_count)
    }

    pub fn triangle_count(&self) -> u32 {
        self.mesh().map_or(0, |mesh| mesh.triangle_count)
    }

    pub fn bounds(&self) -> Bounds {
        self.loaded
            .as_ref()
            .map_or(Bounds::PLACEHOLDER, |l| l.pipeline.bounds())
    }

    pub fn last_model_id(&self) -> Option<u64> {
        self.loaded.as_ref().and_then(|l| l.pipeline.last_model_id())
    }

    pub fn audio(&self) -> Option<&AudioTrack> {
        self.loaded.as_ref().and_then(|l| l.audio.as_ref())
    }

    pub fn tracking(&self) -> Option<&TrackingSet> {
        self.loaded.as_ref().map(|l| &l.tracking)
    }

    pub fn catalog(&self) -> Option<&EventCatalog> {
        self.loaded.as_ref().map(|l| &l.catalog)
    }

    pub fn buffer_status(&self) -> Result<BufferStatus> {
        let handle = self.loaded()?.handle;
        self.binding.source().buffer_status(handle)
    }

    /// `None` unless `collect_stats` is set and a sequence is loaded.
    pub fn stats(&self) -> Option<PlaybackStats> {
        let frame_rate = self.frame_rate()?;
        self.stats.as_ref().map(|stats| stats.snapshot(frame_rate))
    }

    fn loaded(&self) -> Result<&Loaded> {
        self.loaded.as_ref().ok_or(VolplayError::NotInitialized)
    }

    fn loaded_mut(&mut self) -> Result<&mut Loaded> {
        self.loaded.as_mut().ok_or(VolplayError::NotInitialized)
    }

    fn effective_rate(&self) -> f32 {
        self.loaded
            .as_ref()
            .map_or(self.config.speed_ratio * self.time_scale, |l| {
                l.clock.effective_rate()
            })
    }

    /// Forward the effective rate to the source and the audio sink when it
    /// changed.
    fn sync_rate(&mut self) -> Result<()> {
        let rate = self.effective_rate();
        let Some(loaded) = self.loaded.as_mut() else {
            return Ok(());
        };
        if rate == loaded.applied_rate {
            return Ok(());
        }
        loaded.applied_rate = rate;
        self.binding.set_speed(rate)?;
        debug!("Effective rate now {}", rate);
        if let Some(sink) = self.audio_sink.as_mut() {
            if rate < 0.0 {
                sink.pause();
            } else {
                sink.set_pitch(rate);
            }
        }
        Ok(())
    }

    fn present(&mut self, frame: u32) -> Result<FrameUpdate> {
        let look_at = self.look_at();
        let Some(loaded) = self.loaded.as_mut() else {
            return Err(VolplayError::NotInitialized);
        };
        let update = loaded
            .pipeline
            .update(self.binding.source_mut(), loaded.handle, frame, look_at)?;
        if let FrameUpdate::Published { model_id, frame } = update {
            self.hub.emit(PlaybackEvent::NewModel { model_id, frame });
        }
        Ok(update)
    }

    fn dispatch_events(&mut self) -> Result<EventBatch> {
        let handle = self.loaded()?.handle;
        let batch = pull_events(self.binding.source_mut(), handle)?;
        for event in &batch {
            debug!("Event at frame {}: {:?}", event.frame, event.kind);
            self.hub.emit(PlaybackEvent::from(event.clone()));
        }
        Ok(batch)
    }

    /// Restart the sink at the clock position.
    fn cue_audio(&mut self) {
        let Some(loaded) = self.loaded.as_ref() else {
            return;
        };
        let (Some(sink), Some(_)) = (self.audio_sink.as_mut(), loaded.audio.as_ref()) else {
            return;
        };
        if !loaded.clock.is_playing() {
            return;
        }
        let cue = loaded
            .audio_sync
            .cue(loaded.clock.current_frame(), loaded.clock.effective_rate());
        if cue.reversed {
            sink.pause();
        } else {
            sink.play(cue);
        }
    }

    fn check_audio_drift(&mut self) {
        let Some(loaded) = self.loaded.as_ref() else {
            return;
        };
        let Some(sink) = self.audio_sink.as_ref() else {
            return;
        };
        if !loaded.clock.is_playing() || loaded.clock.effective_rate() <= 0.0 {
            return;
        }
        let cue = loaded
            .audio_sync
            .cue(loaded.clock.current_frame(), loaded.clock.effective_rate());
        if let Some(position) = sink.position_seconds() {
            if loaded.audio_sync.needs_resync(&cue, position) {
                debug!("Audio drifted to {:.3}s, resync at {}", position, cue.offset);
                self.cue_audio();
            }
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("source", &self.config.source.location)
            .field("loaded", &self.loaded.is_some())
            .field("state", &self.state())
            .field("current_frame", &self.current_frame())
            .finish_non_exhaustive()
    }
}

//! Headless playback session: ticks a player and reports what it presented.

use anyhow::Result;
use std::time::Duration;
use tracing::{debug, info};
use volplay_audio::FeedSink;
use volplay_playback::{FrameUpdate, PlaybackEvent, Player};

/// Totals gathered over one session.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SessionSummary {
    pub ticks: u32,
    pub published: u32,
    pub hidden_ticks: u32,
    pub user_events: Vec<(u32, String)>,
    pub final_frame: Option<u32>,
}

pub struct Session {
    player: Player,
    tick_seconds: f64,
    realtime: bool,
}

impl Session {
    pub fn new(mut player: Player, tick_seconds: f64, realtime: bool) -> Self {
        player.set_audio_sink(Box::new(FeedSink::new()));
        Self {
            player,
            tick_seconds,
            realtime,
        }
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn run(&mut self, ticks: u32) -> Result<SessionSummary> {
        let events = self.player.subscribe();
        self.player.start()?;
        self.player.start_buffering()?;

        let mut summary = SessionSummary::default();
        for _ in 0..ticks {
            let report = self.player.tick(self.tick_seconds)?;
            summary.ticks += 1;
            if report.hidden {
                summary.hidden_ticks += 1;
            }
            if let FrameUpdate::Published { model_id, frame } = report.update {
                summary.published += 1;
                debug!(
                    "Model {} at frame {}: {} vertices, {} triangles",
                    model_id,
                    frame,
                    self.player.vertex_count(),
                    self.player.triangle_count()
                );
            }

            for event in events.try_iter() {
                match event {
                    PlaybackEvent::User { frame, name } => {
                        info!("Event {} at frame {}", name, frame);
                        summary.user_events.push((frame, name));
                    }
                    PlaybackEvent::FirstFrame { frame } => info!("First frame {}", frame),
                    PlaybackEvent::LastFrame { frame } => info!("Last frame {}", frame),
                    PlaybackEvent::NewModel { .. } | PlaybackEvent::ModelNotFound { .. } => {}
                }
            }

            if self.realtime {
                std::thread::sleep(Duration::from_secs_f64(self.tick_seconds));
            }
        }

        summary.final_frame = self.player.current_frame();
        if let Some(stats) = self.player.stats() {
            info!(
                "Stats: decoding {:?} fps, updating {:?} fps, delay {:?}s, {} frames played",
                stats.decoding_fps, stats.updating_fps, stats.decoding_delay, stats.frames_played
            );
        }
        let status = self.player.buffer_status()?;
        info!("Buffered {} meshes, {} chunks", status.meshes, status.chunks);
        Ok(summary)
    }
}

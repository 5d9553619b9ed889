//! Extraction of every tracking channel of a sequence.

use glam::Vec4;
use std::collections::HashMap;
use tracing::{info, warn};
use volplay_core::{FrameRate, Result, SequenceHandle, Vec3, VolplayError};
use volplay_media::SequenceSource;

use crate::channel::{RotationRepresentation, TrackingChannel, TrackingKeyframe};

/// Read-only channels keyed by name, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct TrackingSet {
    channels: Vec<TrackingChannel>,
    by_name: HashMap<String, usize>,
}

impl TrackingSet {
    /// Fetch descriptors and buffers of all declared tracks.
    ///
    /// A name used by an earlier channel gets the channel index appended.
    pub fn extract(source: &dyn SequenceSource, handle: SequenceHandle) -> Result<Self> {
        let mut set = Self::default();
        for index in 0..source.tracking_count(handle)? {
            let descriptor = source.tracking_info(handle, index)?;
            if descriptor.last_frame < descriptor.first_frame {
                return Err(VolplayError::Decoder(format!(
                    "tracking channel {} ends at {} before it starts at {}",
                    descriptor.name, descriptor.last_frame, descriptor.first_frame
                )));
            }
            let count = descriptor.frame_count();
            let mut positions = vec![Vec3::ZERO; count];
            let mut rotations = vec![Vec4::ZERO; count];
            source.read_tracking(handle, index, &mut positions, &mut rotations)?;

            let rotation = RotationRepresentation::from_raw(descriptor.rotation_kind);
            if let RotationRepresentation::Unknown(kind) = rotation {
                warn!("Tracking channel {} uses unknown rotation type {}", descriptor.name, kind);
            }
            set.insert(TrackingChannel {
                name: descriptor.name,
                first_frame: descriptor.first_frame,
                last_frame: descriptor.last_frame,
                rotation,
                positions,
                rotations,
            });
        }
        if !set.is_empty() {
            info!("Extracted {} tracking channels", set.len());
        }
        Ok(set)
    }

    fn insert(&mut self, mut channel: TrackingChannel) {
        let index = self.channels.len();
        if self.by_name.contains_key(&channel.name) {
            channel.name = format!("{}{}", channel.name, index);
        }
        self.by_name.insert(channel.name.clone(), index);
        self.channels.push(channel);
    }

    pub fn get(&self, name: &str) -> Option<&TrackingChannel> {
        self.by_name.get(name).map(|&i| &self.channels[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackingChannel> {
        self.channels.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Keyframes of every channel, keyed by channel name.
    pub fn keyframes(&self, frame_rate: FrameRate) -> Vec<(&str, Vec<TrackingKeyframe>)> {
        self.channels
            .iter()
            .map(|c| (c.name.as_str(), c.keyframes(frame_rate)))
            .collect()
    }
}

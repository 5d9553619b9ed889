//! Deterministic in-memory sequence source.
//!
//! Serves procedurally generated models so playback can run without a codec.
//! Every model is derived from its frame index: vertex `i` of frame `f` sits
//! on a unit ring at height `f + (i % 2)`, the bbox spans `[f, f + 1]` on Y,
//! and every texel byte equals `f % 256`. Stalls, malformed sources, event
//! timelines, audio and tracking data can all be scripted.

use glam::{Quat, Vec2, Vec4};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::f32::consts::TAU;
use std::sync::Arc;
use tracing::{debug, info};
use volplay_core::event::{FIRST_FRAME_EVENT, LAST_FRAME_EVENT};
use volplay_core::{
    CatalogEntry, ColorMode, FrameRate, LookAt, MeshBuffers, ModelRequest, ModelTarget,
    ModelUpdate, OutOfRangeMode, RawEvent, ResolvedRange, Result, SequenceHandle, SequenceInfo,
    TextureEncoding, Vec3, VertexAttributes, VolplayError,
};

use crate::source::{
    AudioFormat, BufferStatus, BufferingConfig, OpenRequest, SequenceSource, SourceSettings,
    TrackingInfo,
};

/// Raw discriminator given to scripted user events.
const USER_EVENT: i32 = 1;

/// Frequency of the generated audio tone.
const TONE_HZ: f32 = 440.0;

/// Description of one scripted sequence.
#[derive(Debug, Clone)]
pub struct SyntheticSequence {
    frame_count: u32,
    frame_rate: FrameRate,
    vertices_per_frame: u32,
    color_mode: ColorMode,
    has_look_at: bool,
    events: Vec<CatalogEntry>,
    audio: Option<AudioFormat>,
    tracking: Vec<TrackingInfo>,
    empty_frames: Vec<u32>,
    malformed: bool,
}

impl SyntheticSequence {
    /// A vertex-colored sequence with eight vertices per model.
    pub fn new(frame_count: u32, frame_rate: FrameRate) -> Self {
        Self {
            frame_count,
            frame_rate,
            vertices_per_frame: 8,
            color_mode: ColorMode::PerVertex,
            has_look_at: false,
            events: Vec::new(),
            audio: None,
            tracking: Vec::new(),
            empty_frames: Vec::new(),
            malformed: false,
        }
    }

    pub fn textured(mut self, size: u32, encoding: TextureEncoding) -> Self {
        self.color_mode = ColorMode::Textured { size, encoding };
        self
    }

    pub fn with_vertices(mut self, count: u32) -> Self {
        self.vertices_per_frame = count;
        self
    }

    pub fn with_look_at(mut self) -> Self {
        self.has_look_at = true;
        self
    }

    /// Add a named user event. Catalog order is insertion order.
    pub fn with_event(mut self, frame: u32, name: impl Into<String>) -> Self {
        self.events.push(CatalogEntry::new(frame, name));
        self
    }

    pub fn with_audio(mut self, sample_rate: u32, channel_count: u16, sample_count: u32) -> Self {
        self.audio = Some(AudioFormat {
            sample_rate,
            channel_count,
            sample_count,
        });
        self
    }

    pub fn with_tracking(
        mut self,
        name: impl Into<String>,
        first_frame: u32,
        last_frame: u32,
        rotation_kind: i32,
    ) -> Self {
        self.tracking.push(TrackingInfo {
            first_frame,
            last_frame,
            rotation_kind,
            name: name.into(),
        });
        self
    }

    /// Serve a model with no vertices at `frame`.
    pub fn with_empty_frame(mut self, frame: u32) -> Self {
        self.empty_frames.push(frame);
        self
    }

    /// Make `open` reject the sequence as corrupt.
    pub fn malformed(mut self) -> Self {
        self.malformed = true;
        self
    }

    fn info(&self) -> SequenceInfo {
        SequenceInfo {
            max_vertices: self.vertices_per_frame,
            max_triangles: self.vertices_per_frame.saturating_sub(2).max(1),
            color_mode: self.color_mode,
            frame_rate: self.frame_rate,
            frame_count: self.frame_count,
            has_look_at: self.has_look_at,
        }
    }

    /// Live events carried by one frame, boundary markers included.
    fn events_at(&self, frame: u32, range: ResolvedRange) -> impl Iterator<Item = RawEvent> + '_ {
        let start = (frame == range.first).then(|| RawEvent {
            frame,
            kind: FIRST_FRAME_EVENT,
            name: String::new(),
        });
        let end = (frame == range.last).then(|| RawEvent {
            frame,
            kind: LAST_FRAME_EVENT,
            name: String::new(),
        });
        let user = self
            .events
            .iter()
            .filter(move |entry| entry.frame == frame)
            .map(|entry| RawEvent {
                frame: entry.frame,
                kind: USER_EVENT,
                name: entry.name.clone(),
            });
        start.into_iter().chain(user).chain(end)
    }

    fn write_model(&self, frame: u32, look_at: Option<LookAt>, target: ModelTarget<'_>) -> Result<()> {
        let ModelTarget { mesh, texture } = target;
        let vertices = if self.empty_frames.contains(&frame) {
            0
        } else {
            self.vertices_per_frame as usize
        };
        let triangles = vertices.saturating_sub(2);
        if mesh.vertex_capacity() < vertices || mesh.triangle_capacity() < triangles {
            return Err(VolplayError::Decoder(format!(
                "mesh slot holds {} vertices, model needs {}",
                mesh.vertex_capacity(),
                vertices
            )));
        }
        if self.color_mode.is_textured() && texture.is_none() {
            return Err(VolplayError::Decoder(
                "textured sequence requires a texture slot".to_string(),
            ));
        }

        let rotation = look_at
            .filter(|_| self.has_look_at)
            .map(|look| look.rotation())
            .unwrap_or(Quat::IDENTITY);
        let height = frame as f32;
        write_ring(mesh, vertices, height, rotation);
        for t in 0..triangles {
            mesh.indices[t * 3..t * 3 + 3].copy_from_slice(&[0, t as u32 + 1, t as u32 + 2]);
        }
        mesh.vertex_count = vertices as u32;
        mesh.triangle_count = triangles as u32;
        mesh.bbox = [
            Vec3::new(-1.0, height, -1.0),
            Vec3::new(1.0, height + 1.0, 1.0),
        ];

        if let Some(texture) = texture {
            texture.data.fill((frame % 256) as u8);
        }
        Ok(())
    }
}

fn write_ring(mesh: &mut MeshBuffers, vertices: usize, height: f32, rotation: Quat) {
    let frame_v = height / (height + 1.0);
    for i in 0..vertices {
        let angle = i as f32 / vertices as f32 * TAU;
        let local = Vec3::new(angle.cos(), height + (i % 2) as f32, angle.sin());
        mesh.positions[i] = rotation * local;
    }
    match &mut mesh.attributes {
        VertexAttributes::Textured {
            uvs,
            normals,
            velocities,
        } => {
            for i in 0..vertices {
                let angle = i as f32 / vertices as f32 * TAU;
                uvs[i] = Vec2::new(i as f32 / vertices as f32, frame_v);
                normals[i] = rotation * Vec3::new(angle.cos(), 0.0, angle.sin());
                velocities[i] = Vec3::Y;
            }
        }
        VertexAttributes::PerVertex { colors } => {
            let shade = height as u32 % 256;
            for (i, color) in colors.iter_mut().take(vertices).enumerate() {
                *color = [shade as u8, (i % 256) as u8, 0, 255];
            }
        }
    }
}

/// Counters and switches shared between a test and the source it drives.
#[derive(Debug, Clone, Default)]
pub struct ControlState {
    pub stalled: bool,
    pub update_calls: usize,
    pub configure_calls: usize,
    pub close_count: usize,
    pub goto_calls: usize,
    pub buffering_started: bool,
    pub playing: bool,
    pub last_speed: Option<f32>,
    pub last_look_at: Option<LookAt>,
    pub last_settings: Option<SourceSettings>,
}

/// Cloneable remote for a [`SyntheticSource`] that has been boxed away.
#[derive(Debug, Clone, Default)]
pub struct SyntheticControl(Arc<Mutex<ControlState>>);

impl SyntheticControl {
    /// While stalled, every model fetch reports nothing new.
    pub fn set_stalled(&self, stalled: bool) {
        self.0.lock().stalled = stalled;
    }

    pub fn snapshot(&self) -> ControlState {
        self.0.lock().clone()
    }
}

struct OpenSequence {
    sequence: SyntheticSequence,
    range: ResolvedRange,
    mode: OutOfRangeMode,
    speed: f32,
    cursor: Option<u32>,
    served: Option<u64>,
    served_look_at: Option<LookAt>,
    pending: Vec<RawEvent>,
    latched: Vec<RawEvent>,
    settings: SourceSettings,
    buffering: bool,
}

impl OpenSequence {
    /// Frames crossed moving the cursor to `to`, in the order crossed.
    fn crossed(&self, to: u32) -> Vec<u32> {
        let Some(from) = self.cursor else {
            return vec![to];
        };
        if to > from {
            (from + 1..=to).collect()
        } else if to == from {
            Vec::new()
        } else if self.mode == OutOfRangeMode::Loop && self.speed >= 0.0 {
            (from + 1..=self.range.last)
                .chain(self.range.first..=to)
                .collect()
        } else {
            (to..from).rev().collect()
        }
    }

    fn audio_sample(&self, index: usize) -> f32 {
        let Some(format) = self.sequence.audio else {
            return 0.0;
        };
        let frame = index / format.channel_count.max(1) as usize;
        let t = frame as f32 / format.sample_rate.max(1) as f32;
        (TAU * TONE_HZ * t).sin() * 0.25
    }
}

/// In-memory [`SequenceSource`] serving scripted sequences by location.
pub struct SyntheticSource {
    library: HashMap<String, SyntheticSequence>,
    open: HashMap<SequenceHandle, OpenSequence>,
    next_model_id: u64,
    control: SyntheticControl,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self {
            library: HashMap::new(),
            open: HashMap::new(),
            next_model_id: 1,
            control: SyntheticControl::default(),
        }
    }

    /// Register a sequence under `location`.
    pub fn with_sequence(mut self, location: impl Into<String>, sequence: SyntheticSequence) -> Self {
        self.library.insert(location.into(), sequence);
        self
    }

    pub fn control(&self) -> SyntheticControl {
        self.control.clone()
    }

    fn get(&self, handle: SequenceHandle) -> Result<&OpenSequence> {
        self.open.get(&handle).ok_or(VolplayError::InvalidHandle)
    }

    fn get_mut(&mut self, handle: SequenceHandle) -> Result<&mut OpenSequence> {
        self.open.get_mut(&handle).ok_or(VolplayError::InvalidHandle)
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceSource for SyntheticSource {
    fn open(&mut self, request: &OpenRequest) -> Result<SequenceHandle> {
        let location = &request.source.location;
        let sequence = match self.library.get(location) {
            Some(sequence) if !sequence.malformed => sequence.clone(),
            Some(_) => {
                return Err(VolplayError::SourceNotFound(format!(
                    "{} is malformed",
                    location
                )))
            }
            None => return Err(VolplayError::SourceNotFound(location.clone())),
        };
        let range = request.range.resolve(sequence.frame_count)?;
        let settings = SourceSettings::for_source(&BufferingConfig::default(), &request.source);
        let handle = SequenceHandle::new();
        info!(
            "Synthetic source opened {} ({} frames, range {}..={})",
            location, sequence.frame_count, range.first, range.last
        );
        self.open.insert(
            handle,
            OpenSequence {
                sequence,
                range,
                mode: request.out_of_range,
                speed: 1.0,
                cursor: None,
                served: None,
                served_look_at: None,
                pending: Vec::new(),
                latched: Vec::new(),
                settings,
                buffering: false,
            },
        );
        Ok(handle)
    }

    fn close(&mut self, handle: SequenceHandle) {
        if self.open.remove(&handle).is_some() {
            self.control.0.lock().close_count += 1;
        }
    }

    fn info(&self, handle: SequenceHandle) -> Result<SequenceInfo> {
        Ok(self.get(handle)?.sequence.info())
    }

    fn configure(&mut self, handle: SequenceHandle, settings: &SourceSettings) -> Result<()> {
        self.get_mut(handle)?.settings = *settings;
        let mut state = self.control.0.lock();
        state.configure_calls += 1;
        state.last_settings = Some(*settings);
        Ok(())
    }

    fn set_speed(&mut self, handle: SequenceHandle, ratio: f32) -> Result<()> {
        self.get_mut(handle)?.speed = ratio;
        self.control.0.lock().last_speed = Some(ratio);
        Ok(())
    }

    fn play(&mut self, handle: SequenceHandle, on: bool) -> Result<()> {
        self.get(handle)?;
        self.control.0.lock().playing = on;
        Ok(())
    }

    fn stop(&mut self, handle: SequenceHandle) -> Result<()> {
        self.get_mut(handle)?.pending.clear();
        self.control.0.lock().playing = false;
        Ok(())
    }

    fn goto_frame(&mut self, handle: SequenceHandle, frame: u32) -> Result<()> {
        let open = self.get_mut(handle)?;
        if frame >= open.sequence.frame_count {
            return Err(VolplayError::FrameOutOfRange {
                frame,
                first: open.range.first,
                last: open.range.last,
            });
        }
        open.cursor = None;
        open.served = None;
        open.pending.clear();
        self.control.0.lock().goto_calls += 1;
        debug!("Synthetic source seek to frame {}", frame);
        Ok(())
    }

    fn start_buffering(&mut self, handle: SequenceHandle) -> Result<()> {
        self.get_mut(handle)?.buffering = true;
        self.control.0.lock().buffering_started = true;
        Ok(())
    }

    fn update_model(
        &mut self,
        handle: SequenceHandle,
        request: &ModelRequest,
        target: ModelTarget<'_>,
    ) -> Result<ModelUpdate> {
        let stalled = {
            let mut state = self.control.0.lock();
            state.update_calls += 1;
            state.last_look_at = request.look_at;
            state.stalled
        };
        let open = self.open.get_mut(&handle).ok_or(VolplayError::InvalidHandle)?;
        if stalled {
            return Ok(ModelUpdate::Unchanged);
        }

        let frame = request.frame.min(open.sequence.frame_count.saturating_sub(1));
        if open.cursor == Some(frame)
            && open.served.is_some()
            && open.served == request.last_model_id
            && open.served_look_at == request.look_at
        {
            return Ok(ModelUpdate::Unchanged);
        }

        open.sequence.write_model(frame, request.look_at, target)?;

        let crossed = open.crossed(frame);
        for crossed_frame in crossed {
            let events: Vec<RawEvent> = open.sequence.events_at(crossed_frame, open.range).collect();
            open.pending.extend(events);
        }

        let model_id = self.next_model_id;
        self.next_model_id += 1;
        open.cursor = Some(frame);
        open.served = Some(model_id);
        open.served_look_at = request.look_at;
        Ok(ModelUpdate::New { model_id, frame })
    }

    fn pull_new_events(&mut self, handle: SequenceHandle) -> Result<usize> {
        let open = self.get_mut(handle)?;
        open.latched = std::mem::take(&mut open.pending);
        Ok(open.latched.len())
    }

    fn event(&self, handle: SequenceHandle, index: usize) -> Result<RawEvent> {
        let open = self.get(handle)?;
        open.latched.get(index).cloned().ok_or_else(|| {
            VolplayError::InvalidParameter(format!(
                "event index {} out of {} pulled",
                index,
                open.latched.len()
            ))
        })
    }

    fn event_catalog(&self, handle: SequenceHandle) -> Result<Vec<CatalogEntry>> {
        Ok(self.get(handle)?.sequence.events.clone())
    }

    fn audio_format(&self, handle: SequenceHandle) -> Result<Option<AudioFormat>> {
        Ok(self.get(handle)?.sequence.audio)
    }

    fn read_audio(&self, handle: SequenceHandle, samples: &mut [f32]) -> Result<usize> {
        let open = self.get(handle)?;
        let available = open.sequence.audio.map_or(0, |format| format.buffer_len());
        let written = available.min(samples.len());
        for (index, sample) in samples.iter_mut().take(written).enumerate() {
            *sample = open.audio_sample(index);
        }
        Ok(written)
    }

    fn tracking_count(&self, handle: SequenceHandle) -> Result<usize> {
        Ok(self.get(handle)?.sequence.tracking.len())
    }

    fn tracking_info(&self, handle: SequenceHandle, index: usize) -> Result<TrackingInfo> {
        let open = self.get(handle)?;
        open.sequence.tracking.get(index).cloned().ok_or_else(|| {
            VolplayError::InvalidParameter(format!("no tracking channel {}", index))
        })
    }

    fn read_tracking(
        &self,
        handle: SequenceHandle,
        index: usize,
        positions: &mut [Vec3],
        rotations: &mut [Vec4],
    ) -> Result<()> {
        let info = self.tracking_info(handle, index)?;
        let count = info.frame_count();
        if positions.len() < count || rotations.len() < count {
            return Err(VolplayError::InvalidParameter(format!(
                "tracking channel {} needs {} samples",
                info.name, count
            )));
        }
        for i in 0..count {
            let frame = (info.first_frame as usize + i) as f32;
            positions[i] = Vec3::new(frame * 0.01, 1.0, 0.0);
            let q = Quat::from_rotation_y(frame * 0.01);
            rotations[i] = Vec4::new(q.x, q.y, q.z, q.w);
        }
        Ok(())
    }

    fn buffer_status(&self, handle: SequenceHandle) -> Result<BufferStatus> {
        let open = self.get(handle)?;
        if !open.buffering || self.control.0.lock().stalled {
            return Ok(BufferStatus::default());
        }
        let position = open.cursor.unwrap_or(open.range.first);
        let ahead = open.range.last.saturating_sub(position);
        Ok(BufferStatus {
            meshes: ahead.min(open.settings.mesh_buffer_max),
            chunks: ahead.min(open.settings.chunk_buffer_max),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceDescriptor;
    use volplay_core::{ActiveRange, TextureBuffer};

    fn open(source: &mut SyntheticSource, location: &str, range: ActiveRange) -> SequenceHandle {
        source
            .open(&OpenRequest {
                source: SourceDescriptor::local(location),
                range,
                out_of_range: OutOfRangeMode::Loop,
            })
            .unwrap()
    }

    fn fetch(
        source: &mut SyntheticSource,
        handle: SequenceHandle,
        mesh: &mut MeshBuffers,
        frame: u32,
        last: Option<u64>,
    ) -> ModelUpdate {
        let request = ModelRequest {
            frame,
            last_model_id: last,
            look_at: None,
        };
        source
            .update_model(handle, &request, ModelTarget { mesh, texture: None })
            .unwrap()
    }

    fn pulled(source: &mut SyntheticSource, handle: SequenceHandle) -> Vec<RawEvent> {
        let count = source.pull_new_events(handle).unwrap();
        (0..count).map(|i| source.event(handle, i).unwrap()).collect()
    }

    #[test]
    fn test_unknown_and_malformed_locations() {
        let mut source = SyntheticSource::new()
            .with_sequence("bad", SyntheticSequence::new(10, FrameRate::FPS_30).malformed());
        for location in ["bad", "missing"] {
            let err = source
                .open(&OpenRequest {
                    source: SourceDescriptor::local(location),
                    range: ActiveRange::FULL,
                    out_of_range: OutOfRangeMode::Loop,
                })
                .unwrap_err();
            assert!(matches!(err, VolplayError::SourceNotFound(_)));
        }
    }

    #[test]
    fn test_model_ids_increase_and_repeat_is_unchanged() {
        let mut source = SyntheticSource::new()
            .with_sequence("clip", SyntheticSequence::new(10, FrameRate::FPS_30));
        let handle = open(&mut source, "clip", ActiveRange::FULL);
        let info = source.info(handle).unwrap();
        let mut mesh = MeshBuffers::allocate(&info);

        let first = fetch(&mut source, handle, &mut mesh, 0, None);
        let ModelUpdate::New { model_id, frame } = first else {
            panic!("expected a model");
        };
        assert_eq!(frame, 0);
        assert_eq!(fetch(&mut source, handle, &mut mesh, 0, Some(model_id)), ModelUpdate::Unchanged);

        let ModelUpdate::New { model_id: next, .. } = fetch(&mut source, handle, &mut mesh, 1, Some(model_id)) else {
            panic!("expected a model");
        };
        assert!(next > model_id);
        assert_eq!(mesh.bounds().min.y, 1.0);
        assert_eq!(mesh.triangle_count, 6);
    }

    #[test]
    fn test_stall_yields_unchanged() {
        let mut source = SyntheticSource::new()
            .with_sequence("clip", SyntheticSequence::new(10, FrameRate::FPS_30));
        let control = source.control();
        let handle = open(&mut source, "clip", ActiveRange::FULL);
        let mut mesh = MeshBuffers::allocate(&source.info(handle).unwrap());

        control.set_stalled(true);
        assert_eq!(fetch(&mut source, handle, &mut mesh, 0, None), ModelUpdate::Unchanged);
        assert_eq!(mesh.vertex_count, 0);
        control.set_stalled(false);
        assert!(matches!(fetch(&mut source, handle, &mut mesh, 0, None), ModelUpdate::New { .. }));
        assert_eq!(control.snapshot().update_calls, 2);
    }

    #[test]
    fn test_crossed_events_in_frame_order() {
        let sequence = SyntheticSequence::new(10, FrameRate::FPS_30)
            .with_event(3, "b")
            .with_event(2, "a")
            .with_event(7, "c");
        let mut source = SyntheticSource::new().with_sequence("clip", sequence);
        let handle = open(&mut source, "clip", ActiveRange::new(0, Some(9)).unwrap());
        let mut mesh = MeshBuffers::allocate(&source.info(handle).unwrap());

        fetch(&mut source, handle, &mut mesh, 0, None);
        let events = pulled(&mut source, handle);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, FIRST_FRAME_EVENT);

        fetch(&mut source, handle, &mut mesh, 4, None);
        let names: Vec<_> = pulled(&mut source, handle).into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["a", "b"]);

        fetch(&mut source, handle, &mut mesh, 9, None);
        let events = pulled(&mut source, handle);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind, LAST_FRAME_EVENT);
        assert_eq!(source.pull_new_events(handle).unwrap(), 0);
    }

    #[test]
    fn test_catalog_keeps_file_order() {
        let sequence = SyntheticSequence::new(10, FrameRate::FPS_30)
            .with_event(5, "late")
            .with_event(1, "early");
        let mut source = SyntheticSource::new().with_sequence("clip", sequence);
        let handle = open(&mut source, "clip", ActiveRange::FULL);
        let catalog = source.event_catalog(handle).unwrap();
        assert_eq!(catalog[0].name, "late");
        assert_eq!(catalog[1].frame, 1);
    }

    #[test]
    fn test_textured_model_fills_texture() {
        let sequence = SyntheticSequence::new(10, FrameRate::FPS_30).textured(16, TextureEncoding::Rgba32);
        let mut source = SyntheticSource::new().with_sequence("clip", sequence);
        let handle = open(&mut source, "clip", ActiveRange::FULL);
        let info = source.info(handle).unwrap();
        let mut mesh = MeshBuffers::allocate(&info);
        let mut texture = TextureBuffer::allocate(info.color_mode).unwrap();

        let request = ModelRequest {
            frame: 3,
            last_model_id: None,
            look_at: None,
        };
        let target = ModelTarget {
            mesh: &mut mesh,
            texture: Some(&mut texture),
        };
        source.update_model(handle, &request, target).unwrap();
        assert!(texture.data.iter().all(|&b| b == 3));
        assert_eq!(mesh.uvs().unwrap().len(), 8);

        let target = ModelTarget {
            mesh: &mut mesh,
            texture: None,
        };
        let request = ModelRequest { frame: 4, ..request };
        assert!(source.update_model(handle, &request, target).is_err());
    }

    #[test]
    fn test_empty_frame() {
        let sequence = SyntheticSequence::new(10, FrameRate::FPS_30).with_empty_frame(2);
        let mut source = SyntheticSource::new().with_sequence("clip", sequence);
        let handle = open(&mut source, "clip", ActiveRange::FULL);
        let mut mesh = MeshBuffers::allocate(&source.info(handle).unwrap());
        fetch(&mut source, handle, &mut mesh, 2, None);
        assert_eq!(mesh.vertex_count, 0);
        assert!(mesh.triangles().is_empty());
    }

    #[test]
    fn test_closed_handle_is_invalid() {
        let mut source = SyntheticSource::new()
            .with_sequence("clip", SyntheticSequence::new(10, FrameRate::FPS_30));
        let handle = open(&mut source, "clip", ActiveRange::FULL);
        source.close(handle);
        source.close(handle);
        assert!(matches!(source.info(handle), Err(VolplayError::InvalidHandle)));
        assert_eq!(source.control().snapshot().close_count, 1);
    }
}

//! Per-tick model fetch into the buffer pool.

use tracing::{debug, warn};
use volplay_core::{
    Bounds, LookAt, MeshBuffers, ModelRequest, ModelUpdate, Result, SequenceHandle, TextureBuffer,
};
use volplay_media::SequenceSource;

use crate::buffer_pool::BufferPool;

/// Outcome of one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameUpdate {
    /// A new model is presentable.
    Published { model_id: u64, frame: u32 },
    /// Nothing new; the previous model stays presented.
    Unchanged,
    /// The source returned an id lower than the presented one.
    Rejected { model_id: u64 },
}

#[derive(Debug)]
pub struct FramePipeline {
    pool: BufferPool,
    last_model_id: Option<u64>,
    presented_frame: Option<u32>,
    seek_pending: bool,
    bounds: Bounds,
    models_published: u64,
}

impl FramePipeline {
    pub fn new(pool: BufferPool) -> Self {
        Self {
            pool,
            last_model_id: None,
            presented_frame: None,
            seek_pending: false,
            bounds: Bounds::PLACEHOLDER,
            models_published: 0,
        }
    }

    /// Ask the source for the model at or after `frame` and publish it if it
    /// is genuinely new.
    pub fn update(
        &mut self,
        source: &mut dyn SequenceSource,
        handle: SequenceHandle,
        frame: u32,
        look_at: Option<LookAt>,
    ) -> Result<FrameUpdate> {
        let request = ModelRequest {
            frame,
            last_model_id: self.last_model_id,
            look_at,
        };
        let (slots, target) = self.pool.write_target();
        let (model_id, model_frame) = match source.update_model(handle, &request, target)? {
            ModelUpdate::Unchanged => return Ok(FrameUpdate::Unchanged),
            ModelUpdate::New { model_id, frame } => (model_id, frame),
        };

        match self.last_model_id {
            Some(last) if model_id == last => return Ok(FrameUpdate::Unchanged),
            Some(last) if model_id < last && !self.seek_pending => {
                warn!("Ignoring model {} older than presented model {}", model_id, last);
                return Ok(FrameUpdate::Rejected { model_id });
            }
            _ => {}
        }

        self.pool.publish(slots);
        self.last_model_id = Some(model_id);
        self.presented_frame = Some(model_frame);
        self.seek_pending = false;
        self.models_published += 1;
        if let Some(mesh) = self.pool.presented_mesh() {
            self.bounds = mesh.bounds();
        }
        debug!("Published model {} (frame {})", model_id, model_frame);
        Ok(FrameUpdate::Published {
            model_id,
            frame: model_frame,
        })
    }

    /// The next published id may be lower than the current one.
    pub fn mark_seek(&mut self) {
        self.seek_pending = true;
    }

    pub fn last_model_id(&self) -> Option<u64> {
        self.last_model_id
    }

    pub fn presented_frame(&self) -> Option<u32> {
        self.presented_frame
    }

    /// Bounds of the presented model, or the placeholder volume.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn mesh(&self) -> Option<&MeshBuffers> {
        self.pool.presented_mesh()
    }

    pub fn texture(&self) -> Option<&TextureBuffer> {
        self.pool.presented_texture()
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    pub fn models_published(&self) -> u64 {
        self.models_published
    }
}

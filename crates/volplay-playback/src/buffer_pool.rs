//! Rotating mesh and texture slots.
//!
//! Every slot is allocated once at the sequence's declared maximum size.
//! Exactly one slot of each ring is presentable at a time (none before the
//! first publish); the decoder always writes into the slot after it, so the
//! consumer can keep reading the presented slot until the next publish.

use tracing::debug;
use volplay_core::{MeshBuffers, ModelTarget, Result, SequenceInfo, TextureBuffer, VolplayError};

/// A fixed ring of at least two buffers with a single read pointer.
#[derive(Debug)]
pub struct SlotRing<T> {
    slots: Vec<T>,
    presentable: Option<usize>,
}

impl<T> SlotRing<T> {
    pub fn new(slots: Vec<T>) -> Result<Self> {
        if slots.len() < 2 {
            return Err(VolplayError::InvalidParameter(format!(
                "a slot ring needs at least 2 slots, got {}",
                slots.len()
            )));
        }
        Ok(Self {
            slots,
            presentable: None,
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Index of the slot the next model goes into; never the presented one.
    pub fn write_index(&self) -> usize {
        match self.presentable {
            Some(index) => (index + 1) % self.slots.len(),
            None => 0,
        }
    }

    pub fn acquire_write_slot(&mut self) -> (usize, &mut T) {
        let index = self.write_index();
        (index, &mut self.slots[index])
    }

    /// Make `index` the presented slot.
    pub fn publish(&mut self, index: usize) {
        debug_assert!(index < self.slots.len());
        self.presentable = Some(index % self.slots.len());
    }

    pub fn presentable_index(&self) -> Option<usize> {
        self.presentable
    }

    pub fn presentable(&self) -> Option<&T> {
        self.presentable.map(|index| &self.slots[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter()
    }

    /// Forget the presented slot; contents stay allocated.
    pub fn reset(&mut self) {
        self.presentable = None;
    }
}

/// Slot indices handed out for one model fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSlots {
    pub geometry: usize,
    pub texture: Option<usize>,
}

/// Geometry ring plus, for textured sequences, an independent texture ring.
#[derive(Debug)]
pub struct BufferPool {
    geometry: SlotRing<MeshBuffers>,
    textures: Option<SlotRing<TextureBuffer>>,
}

impl BufferPool {
    /// Allocate `geometry_slots` mesh slots and, unless the sequence is
    /// vertex-colored, `texture_slots` texture slots.
    pub fn allocate(info: &SequenceInfo, geometry_slots: usize, texture_slots: usize) -> Result<Self> {
        let geometry = SlotRing::new((0..geometry_slots).map(|_| MeshBuffers::allocate(info)).collect())?;
        let textures = match TextureBuffer::allocate(info.color_mode) {
            Some(template) => Some(SlotRing::new(vec![template; texture_slots])?),
            None => None,
        };
        let pool = Self { geometry, textures };
        debug!(
            "Allocated {} geometry and {} texture slots ({} bytes of texture)",
            pool.geometry.len(),
            pool.textures.as_ref().map_or(0, SlotRing::len),
            pool.texture_memory()
        );
        Ok(pool)
    }

    pub fn geometry_slots(&self) -> usize {
        self.geometry.len()
    }

    /// `None` for vertex-colored sequences.
    pub fn texture_slots(&self) -> Option<usize> {
        self.textures.as_ref().map(SlotRing::len)
    }

    /// The decoder's write destination for the next model.
    pub fn write_target(&mut self) -> (WriteSlots, ModelTarget<'_>) {
        let (geometry, mesh) = self.geometry.acquire_write_slot();
        let (texture, texture_slot) = match self.textures.as_mut() {
            Some(ring) => {
                let (index, slot) = ring.acquire_write_slot();
                (Some(index), Some(slot))
            }
            None => (None, None),
        };
        (
            WriteSlots { geometry, texture },
            ModelTarget {
                mesh,
                texture: texture_slot,
            },
        )
    }

    pub fn publish(&mut self, slots: WriteSlots) {
        self.geometry.publish(slots.geometry);
        if let (Some(ring), Some(index)) = (self.textures.as_mut(), slots.texture) {
            ring.publish(index);
        }
    }

    pub fn presented_mesh(&self) -> Option<&MeshBuffers> {
        self.geometry.presentable()
    }

    pub fn presented_texture(&self) -> Option<&TextureBuffer> {
        self.textures.as_ref().and_then(SlotRing::presentable)
    }

    pub fn presented_slots(&self) -> Option<WriteSlots> {
        Some(WriteSlots {
            geometry: self.geometry.presentable_index()?,
            texture: self.textures.as_ref().and_then(SlotRing::presentable_index),
        })
    }

    pub fn texture_memory(&self) -> usize {
        self.textures
            .as_ref()
            .map_or(0, |ring| ring.iter().map(TextureBuffer::memory_size).sum())
    }

    pub fn reset(&mut self) {
        self.geometry.reset();
        if let Some(ring) = self.textures.as_mut() {
            ring.reset();
        }
    }
}

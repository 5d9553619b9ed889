//! Mesh and texture buffers for one generation of decoded model data.
//!
//! Every buffer is allocated once at the sequence's declared maximum size so
//! nothing reallocates while a sequence plays. The valid prefix of each array
//! is given by the vertex and triangle counts the decoder writes back.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, LookAt, Vec3};
use crate::sequence::{ColorMode, SequenceInfo, TextureEncoding};

/// Optional per-vertex arrays, chosen by the sequence's [`ColorMode`].
#[derive(Debug, Clone)]
pub enum VertexAttributes {
    Textured {
        uvs: Vec<Vec2>,
        normals: Vec<Vec3>,
        velocities: Vec<Vec3>,
    },
    PerVertex {
        colors: Vec<[u8; 4]>,
    },
}

/// One mesh slot: positions, triangle indices, attributes and bbox corners.
#[derive(Debug, Clone)]
pub struct MeshBuffers {
    pub positions: Vec<Vec3>,
    /// Index triples, `max_triangles * 3` long.
    pub indices: Vec<u32>,
    pub attributes: VertexAttributes,
    /// The two bounding box corners written by the decoder.
    pub bbox: [Vec3; 2],
    pub vertex_count: u32,
    pub triangle_count: u32,
}

impl MeshBuffers {
    /// Allocate a slot sized for the sequence's maximum vertex/triangle count.
    pub fn allocate(info: &SequenceInfo) -> Self {
        let max_vertices = info.max_vertices as usize;
        let attributes = match info.color_mode {
            ColorMode::PerVertex => VertexAttributes::PerVertex {
                colors: vec![[0; 4]; max_vertices],
            },
            ColorMode::Textured { .. } => VertexAttributes::Textured {
                uvs: vec![Vec2::ZERO; max_vertices],
                normals: vec![Vec3::ZERO; max_vertices],
                velocities: vec![Vec3::ZERO; max_vertices],
            },
        };
        Self {
            positions: vec![Vec3::ZERO; max_vertices],
            indices: vec![0; info.max_triangles as usize * 3],
            attributes,
            bbox: [Bounds::PLACEHOLDER.min, Bounds::PLACEHOLDER.max],
            vertex_count: 0,
            triangle_count: 0,
        }
    }

    /// Maximum number of vertices this slot can hold.
    pub fn vertex_capacity(&self) -> usize {
        self.positions.len()
    }

    /// Maximum number of triangles this slot can hold.
    pub fn triangle_capacity(&self) -> usize {
        self.indices.len() / 3
    }

    /// Valid vertex positions of the current model.
    pub fn vertices(&self) -> &[Vec3] {
        &self.positions[..self.valid_vertices()]
    }

    /// Valid triangle indices of the current model. Empty for an empty mesh.
    pub fn triangles(&self) -> &[u32] {
        let len = (self.triangle_count as usize * 3).min(self.indices.len());
        &self.indices[..len]
    }

    pub fn uvs(&self) -> Option<&[Vec2]> {
        match &self.attributes {
            VertexAttributes::Textured { uvs, .. } => Some(&uvs[..self.valid_vertices()]),
            VertexAttributes::PerVertex { .. } => None,
        }
    }

    pub fn normals(&self) -> Option<&[Vec3]> {
        match &self.attributes {
            VertexAttributes::Textured { normals, .. } => Some(&normals[..self.valid_vertices()]),
            VertexAttributes::PerVertex { .. } => None,
        }
    }

    pub fn velocities(&self) -> Option<&[Vec3]> {
        match &self.attributes {
            VertexAttributes::Textured { velocities, .. } => {
                Some(&velocities[..self.valid_vertices()])
            }
            VertexAttributes::PerVertex { .. } => None,
        }
    }

    pub fn colors(&self) -> Option<&[[u8; 4]]> {
        match &self.attributes {
            VertexAttributes::PerVertex { colors } => Some(&colors[..self.valid_vertices()]),
            VertexAttributes::Textured { .. } => None,
        }
    }

    /// Bounding volume computed from the two decoder corners.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_corners(self.bbox[0], self.bbox[1])
    }

    /// Raw bytes of the valid positions, ready for a vertex buffer upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.vertices())
    }

    /// Raw bytes of the valid indices, ready for an index buffer upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.triangles())
    }

    fn valid_vertices(&self) -> usize {
        (self.vertex_count as usize).min(self.positions.len())
    }
}

/// One texture slot holding the encoded texels of a model.
#[derive(Debug, Clone)]
pub struct TextureBuffer {
    pub data: Vec<u8>,
    pub size: u32,
    pub encoding: TextureEncoding,
}

impl TextureBuffer {
    /// Allocate a slot for a square texture, or `None` for vertex-colored
    /// sequences.
    pub fn allocate(color_mode: ColorMode) -> Option<Self> {
        match color_mode {
            ColorMode::PerVertex => None,
            ColorMode::Textured { size, encoding } => Some(Self {
                data: vec![0; encoding.buffer_len(size)],
                size,
                encoding,
            }),
        }
    }

    /// Total memory usage in bytes.
    pub fn memory_size(&self) -> usize {
        self.data.len()
    }
}

/// Write destination handed to the decoder for one model fetch.
#[derive(Debug)]
pub struct ModelTarget<'a> {
    pub mesh: &'a mut MeshBuffers,
    pub texture: Option<&'a mut TextureBuffer>,
}

/// What the pipeline asks the decoder for on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    /// Decode cursor: the model at or after this frame is wanted.
    pub frame: u32,
    /// Id of the last model the pipeline published, if any.
    pub last_model_id: Option<u64>,
    /// Optional per-tick pose bias.
    pub look_at: Option<LookAt>,
}

/// Outcome of a model fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelUpdate {
    /// A model was written into the target.
    New { model_id: u64, frame: u32 },
    /// Nothing new yet (decoder still buffering, or same model as before).
    /// The target was left untouched.
    Unchanged,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FrameRate;

    fn info(color_mode: ColorMode) -> SequenceInfo {
        SequenceInfo {
            max_vertices: 8,
            max_triangles: 4,
            color_mode,
            frame_rate: FrameRate::FPS_30,
            frame_count: 10,
            has_look_at: false,
        }
    }

    #[test]
    fn test_textured_allocation() {
        let mesh = MeshBuffers::allocate(&info(ColorMode::Textured {
            size: 64,
            encoding: TextureEncoding::Rgba32,
        }));
        assert_eq!(mesh.vertex_capacity(), 8);
        assert_eq!(mesh.triangle_capacity(), 4);
        assert!(mesh.uvs().is_some());
        assert!(mesh.colors().is_none());
    }

    #[test]
    fn test_vertex_colored_has_no_texture() {
        let mode = ColorMode::PerVertex;
        let mesh = MeshBuffers::allocate(&info(mode));
        assert!(mesh.colors().is_some());
        assert!(mesh.normals().is_none());
        assert!(TextureBuffer::allocate(mode).is_none());
    }

    #[test]
    fn test_valid_prefix_follows_counts() {
        let mut mesh = MeshBuffers::allocate(&info(ColorMode::PerVertex));
        mesh.vertex_count = 3;
        mesh.triangle_count = 1;
        assert_eq!(mesh.vertices().len(), 3);
        assert_eq!(mesh.triangles().len(), 3);
        assert_eq!(mesh.position_bytes().len(), 3 * 12);
        assert_eq!(mesh.index_bytes().len(), 3 * 4);
    }

    #[test]
    fn test_empty_mesh_has_no_indices() {
        let mesh = MeshBuffers::allocate(&info(ColorMode::PerVertex));
        assert!(mesh.triangles().is_empty());
        assert_eq!(mesh.bounds(), Bounds::PLACEHOLDER);
    }

    #[test]
    fn test_texture_slot_size() {
        let tex = TextureBuffer::allocate(ColorMode::Textured {
            size: 128,
            encoding: TextureEncoding::Dxt1,
        })
        .unwrap();
        assert_eq!(tex.memory_size(), 128 * 128 / 2);
    }
}

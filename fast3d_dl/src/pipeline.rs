//! Renderer state that persists across triangles until explicitly changed.

use crate::{
    cmd::{CombineMode, GeometryModes, Rgba32},
    util::scale_coord,
    vertex::Vertex,
};

/// Parameters of the last `G_TEXTURE` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureSettings {
    /// Per-axis scale in 0.16 fixed point (0xFFFF is roughly 1.0).
    pub scale: [u32; 2],
    #[allow(missing_docs)]
    pub level: u32,
    #[allow(missing_docs)]
    pub tile: u32,
    #[allow(missing_docs)]
    pub on: bool,
}

/// The pipeline configuration applied to each emitted triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PipelineState {
    #[allow(missing_docs)]
    pub geometry_mode: GeometryModes,
    #[allow(missing_docs)]
    pub combine_mode: CombineMode,
    #[allow(missing_docs)]
    pub texture: TextureSettings,
    #[allow(missing_docs)]
    pub env_color: Rgba32,
    #[allow(missing_docs)]
    pub prim_color: Rgba32,
}

impl PipelineState {
    #[allow(missing_docs)]
    pub fn set_geometry_mode(&mut self, mode: GeometryModes) {
        self.geometry_mode |= mode;
    }

    #[allow(missing_docs)]
    pub fn clear_geometry_mode(&mut self, mode: GeometryModes) {
        self.geometry_mode &= !mode;
    }

    #[allow(missing_docs)]
    pub fn set_combine(&mut self, mode: CombineMode) {
        self.combine_mode = mode;
    }

    #[allow(missing_docs)]
    pub fn set_texture(&mut self, texture: TextureSettings) {
        self.texture = texture;
    }

    #[allow(missing_docs)]
    pub fn set_env_color(&mut self, color: Rgba32) {
        self.env_color = color;
    }

    #[allow(missing_docs)]
    pub fn set_prim_color(&mut self, color: Rgba32) {
        self.prim_color = color;
    }

    /// Hardware pipeline serialization. There is nothing to wait for in software.
    pub fn pipe_sync(&mut self) {}

    /// True if vertices should be shaded from their normals.
    pub fn lighting(&self) -> bool {
        self.geometry_mode.contains(GeometryModes::LIGHTING)
    }

    /// True if texture coordinates are generated from vertex normals.
    pub fn texture_gen(&self) -> bool {
        self.geometry_mode
            .contains(GeometryModes::TEXTURE_GEN | GeometryModes::LIGHTING)
    }

    /// Computes the scaled texture coordinates of a vertex.
    pub fn texture_coords(&self, vtx: &Vertex) -> [i32; 2] {
        let uv = if self.texture_gen() {
            let normal = vtx.normal();
            let gen = |n: i8| ((n as f32 / 127.0 + 1.0) / 4.0 * 0x10000 as f32) as i32;
            [gen(normal[0]), gen(normal[1])]
        } else {
            [vtx.uv[0] as i32, vtx.uv[1] as i32]
        };
        [
            scale_coord(uv[0], self.texture.scale[0]),
            scale_coord(uv[1], self.texture.scale[1]),
        ]
    }
}

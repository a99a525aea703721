//! A small exported cube, assembled with the [gbi](crate::gbi) builders.
//!
//! The asset has a 24 vertex table, one `Lights1` record and three display lists:
//! `mat_cube_f3dlite_material`, `cube_Cube_mesh_tri_0` and the root `cube_Cube_mesh`.

use crate::{
    asset::Asset,
    cmd::GeometryModes,
    error::F3DError,
    gbi::*,
    lights::Lights,
    vertex::Vertex,
};

/// Name of the cube's root display list.
pub const CUBE_ROOT: &str = "cube_Cube_mesh";

#[rustfmt::skip]
const CUBE_VERTICES: [Vertex; 24] = [
    Vertex::new([-50, -50, 50], 0, [368, 1008], [129, 0, 0, 255]),
    Vertex::new([-50, 50, 50], 0, [624, 1008], [129, 0, 0, 255]),
    Vertex::new([-50, 50, -50], 0, [624, 752], [129, 0, 0, 255]),
    Vertex::new([-50, -50, -50], 0, [368, 752], [129, 0, 0, 255]),
    Vertex::new([-50, -50, -50], 0, [368, 752], [0, 0, 129, 255]),
    Vertex::new([-50, 50, -50], 0, [624, 752], [0, 0, 129, 255]),
    Vertex::new([50, 50, -50], 0, [624, 496], [0, 0, 129, 255]),
    Vertex::new([50, -50, -50], 0, [368, 496], [0, 0, 129, 255]),
    Vertex::new([50, -50, -50], 0, [368, 496], [127, 0, 0, 255]),
    Vertex::new([50, 50, -50], 0, [624, 496], [127, 0, 0, 255]),
    Vertex::new([50, 50, 50], 0, [624, 240], [127, 0, 0, 255]),
    Vertex::new([50, -50, 50], 0, [368, 240], [127, 0, 0, 255]),
    Vertex::new([50, -50, 50], 0, [368, 240], [0, 0, 127, 255]),
    Vertex::new([50, 50, 50], 0, [624, 240], [0, 0, 127, 255]),
    Vertex::new([-50, 50, 50], 0, [624, -16], [0, 0, 127, 255]),
    Vertex::new([-50, -50, 50], 0, [368, -16], [0, 0, 127, 255]),
    Vertex::new([-50, -50, -50], 0, [112, 496], [0, 129, 0, 255]),
    Vertex::new([50, -50, -50], 0, [368, 496], [0, 129, 0, 255]),
    Vertex::new([50, -50, 50], 0, [368, 240], [0, 129, 0, 255]),
    Vertex::new([-50, -50, 50], 0, [112, 240], [0, 129, 0, 255]),
    Vertex::new([50, 50, -50], 0, [624, 496], [0, 127, 0, 255]),
    Vertex::new([-50, 50, -50], 0, [880, 496], [0, 127, 0, 255]),
    Vertex::new([-50, 50, 50], 0, [880, 240], [0, 127, 0, 255]),
    Vertex::new([50, 50, 50], 0, [624, 240], [0, 127, 0, 255]),
];

fn shade_env_combine() -> crate::decode::RawF3DCommand {
    let color = [G_CCMUX_0, G_CCMUX_0, G_CCMUX_0, G_CCMUX_SHADE];
    let alpha = [G_ACMUX_0, G_ACMUX_0, G_ACMUX_0, G_ACMUX_ENVIRONMENT];
    gs_dp_set_combine_lerp(color, alpha, color, alpha)
}

/// Builds the cube asset.
pub fn cube() -> Result<Asset, F3DError> {
    let mut builder = Asset::builder();
    let vtx = builder.vertices(&CUBE_VERTICES);
    let lights = builder.lights(Lights::lights1([0x7F; 3], [0xFF; 3], [0x49; 3]));

    let material = builder.display_list(
        "mat_cube_f3dlite_material",
        vec![
            gs_dp_pipe_sync(),
            shade_env_combine(),
            gs_sp_texture(65535, 65535, 0, 0, 1),
            gs_sp_set_lights(lights, 1),
            gs_sp_end_display_list(),
        ],
    );

    let tri_0 = builder.display_list(
        "cube_Cube_mesh_tri_0",
        vec![
            gs_sp_vertex(vtx, 16, 0),
            gs_sp1_triangle(0, 1, 2, 0),
            gs_sp1_triangle(0, 2, 3, 0),
            gs_sp1_triangle(4, 5, 6, 0),
            gs_sp1_triangle(4, 6, 7, 0),
            gs_sp1_triangle(8, 9, 10, 0),
            gs_sp1_triangle(8, 10, 11, 0),
            gs_sp1_triangle(12, 13, 14, 0),
            gs_sp1_triangle(12, 14, 15, 0),
            gs_sp_vertex(vtx + 16, 8, 0),
            gs_sp1_triangle(0, 1, 2, 0),
            gs_sp1_triangle(0, 2, 3, 0),
            gs_sp1_triangle(4, 5, 6, 0),
            gs_sp1_triangle(4, 6, 7, 0),
            gs_sp_end_display_list(),
        ],
    );

    builder.display_list(
        CUBE_ROOT,
        vec![
            gs_sp_display_list(material),
            gs_sp_display_list(tri_0),
            gs_dp_pipe_sync(),
            gs_sp_set_geometry_mode(GeometryModes::LIGHTING),
            gs_sp_clear_geometry_mode(GeometryModes::TEXTURE_GEN),
            shade_env_combine(),
            gs_sp_texture(65535, 65535, 0, 0, 0),
            gs_sp_end_display_list(),
        ],
    );

    builder.build()
}

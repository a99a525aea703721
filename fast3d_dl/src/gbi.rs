//! Constructors for raw commands, named after the `gs*` GBI macros.
//!
//! These are how assets are authored: each function packs its arguments into the
//! two-word layout that [decode_f3d_command](crate::decode::decode_f3d_command) reads.

#![allow(missing_docs)]

use crate::{
    asset::{Segment, SegmentedAddress},
    cmd::{DisplayListId, DisplayListOp, EndOp, GeometryModes, Rgba32},
    decode::{RawF3DCommand, G_MV_L0, G_MV_LIGHTSET, G_MW_NUMLIGHT},
    vertex::VERTEX_SIZE,
};

pub const G_CCMUX_COMBINED: u8 = 0;
pub const G_CCMUX_TEXEL0: u8 = 1;
pub const G_CCMUX_TEXEL1: u8 = 2;
pub const G_CCMUX_PRIMITIVE: u8 = 3;
pub const G_CCMUX_SHADE: u8 = 4;
pub const G_CCMUX_ENVIRONMENT: u8 = 5;
pub const G_CCMUX_1: u8 = 6;
pub const G_CCMUX_TEXEL0_ALPHA: u8 = 8;
pub const G_CCMUX_SHADE_ALPHA: u8 = 11;
pub const G_CCMUX_ENV_ALPHA: u8 = 12;
pub const G_CCMUX_0: u8 = 31;

pub const G_ACMUX_COMBINED: u8 = 0;
pub const G_ACMUX_TEXEL0: u8 = 1;
pub const G_ACMUX_TEXEL1: u8 = 2;
pub const G_ACMUX_PRIMITIVE: u8 = 3;
pub const G_ACMUX_SHADE: u8 = 4;
pub const G_ACMUX_ENVIRONMENT: u8 = 5;
pub const G_ACMUX_1: u8 = 6;
pub const G_ACMUX_0: u8 = 7;

/// Encodes an address, or the unmapped address 0 if `offset` does not fit.
fn address(segment: Segment, offset: u64) -> u32 {
    SegmentedAddress::new(segment, offset).map_or(0, |addr| addr.0)
}

fn shift(v: u32, s: u32, width: u32) -> u32 {
    (v & ((1 << width) - 1)) << s
}

/// Loads `n` vertices starting at vertex table index `v` into window slot `v0`.
pub fn gs_sp_vertex(v: u32, n: u32, v0: u32) -> RawF3DCommand {
    let length = n.wrapping_mul(VERTEX_SIZE as u32).wrapping_sub(1);
    RawF3DCommand::new(
        shift(0x04, 24, 8)
            | shift(v0.wrapping_mul(2), 16, 8)
            | shift(n, 10, 6)
            | shift(length, 0, 10),
        address(Segment::Vertices, v as u64 * VERTEX_SIZE as u64),
    )
}

fn tri_word(v0: u32, v1: u32, v2: u32, flag: u32) -> u32 {
    let [a, b, c] = match flag {
        1 => [v1, v2, v0],
        2 => [v2, v0, v1],
        _ => [v0, v1, v2],
    };
    shift(a.wrapping_mul(2), 16, 8)
        | shift(b.wrapping_mul(2), 8, 8)
        | shift(c.wrapping_mul(2), 0, 8)
}

/// `flag` selects which vertex comes first, as in F3DEX.
pub fn gs_sp1_triangle(v0: u32, v1: u32, v2: u32, flag: u32) -> RawF3DCommand {
    RawF3DCommand::new(shift(0xBF, 24, 8), tri_word(v0, v1, v2, flag))
}

#[allow(clippy::too_many_arguments)]
pub fn gs_sp2_triangles(
    v00: u32,
    v01: u32,
    v02: u32,
    flag0: u32,
    v10: u32,
    v11: u32,
    v12: u32,
    flag1: u32,
) -> RawF3DCommand {
    RawF3DCommand::new(
        shift(0xB1, 24, 8) | tri_word(v00, v01, v02, flag0),
        tri_word(v10, v11, v12, flag1),
    )
}

fn display_list(op: DisplayListOp, id: DisplayListId) -> RawF3DCommand {
    let op: u8 = op.into();
    RawF3DCommand::new(
        shift(0x06, 24, 8) | shift(op as u32, 16, 8),
        address(Segment::DisplayLists, id.0 as u64),
    )
}

pub fn gs_sp_display_list(id: DisplayListId) -> RawF3DCommand {
    display_list(DisplayListOp::Call, id)
}

pub fn gs_sp_branch_list(id: DisplayListId) -> RawF3DCommand {
    display_list(DisplayListOp::Branch, id)
}

fn end(op: EndOp) -> RawF3DCommand {
    let op: u8 = op.into();
    RawF3DCommand::new(shift(0xB8, 24, 8) | shift(op as u32, 16, 8), 0)
}

pub fn gs_sp_end_display_list() -> RawF3DCommand {
    end(EndOp::End)
}

/// Returns to the caller; faults if the current list was not called.
pub fn gs_sp_return() -> RawF3DCommand {
    end(EndOp::Return)
}

/// Binds all `n` directional lights and the ambient light of a lights record.
pub fn gs_sp_set_lights(record: u32, n: u32) -> RawF3DCommand {
    RawF3DCommand::new(
        shift(0x03, 24, 8) | shift(G_MV_LIGHTSET, 16, 8) | shift(n, 0, 8),
        address(Segment::Lights, (record as u64) << 4),
    )
}

/// Binds member `member` of a lights record to light slot `n` (1-based).
pub fn gs_sp_light(record: u32, member: u32, n: u32) -> RawF3DCommand {
    let p = G_MV_L0.wrapping_add(n.wrapping_sub(1).wrapping_mul(2));
    RawF3DCommand::new(
        shift(0x03, 24, 8) | shift(p, 16, 8) | 16,
        address(Segment::Lights, (record as u64) << 4 | (member & 0xF) as u64),
    )
}

pub fn gs_sp_num_lights(n: u32) -> RawF3DCommand {
    RawF3DCommand::new(
        shift(0xBC, 24, 8) | G_MW_NUMLIGHT,
        0x8000_0000u32.wrapping_add(n.wrapping_add(1).wrapping_mul(0x20)),
    )
}

pub fn gs_sp_texture(s: u32, t: u32, level: u32, tile: u32, on: u32) -> RawF3DCommand {
    RawF3DCommand::new(
        shift(0xBB, 24, 8) | shift(level, 11, 3) | shift(tile, 8, 3) | shift(on, 0, 8),
        shift(s, 16, 16) | shift(t, 0, 16),
    )
}

pub fn gs_sp_set_geometry_mode(mode: GeometryModes) -> RawF3DCommand {
    RawF3DCommand::new(shift(0xB7, 24, 8), mode.bits())
}

pub fn gs_sp_clear_geometry_mode(mode: GeometryModes) -> RawF3DCommand {
    RawF3DCommand::new(shift(0xB6, 24, 8), mode.bits())
}

/// Packs `(a - b) * c + d` selectors for both cycles, as `gsDPSetCombineLERP`.
pub fn gs_dp_set_combine_lerp(
    color1: [u8; 4],
    alpha1: [u8; 4],
    color2: [u8; 4],
    alpha2: [u8; 4],
) -> RawF3DCommand {
    let [a0, b0, c0, d0] = color1.map(u32::from);
    let [aa0, ab0, ac0, ad0] = alpha1.map(u32::from);
    let [a1, b1, c1, d1] = color2.map(u32::from);
    let [aa1, ab1, ac1, ad1] = alpha2.map(u32::from);
    RawF3DCommand::new(
        shift(0xFC, 24, 8)
            | shift(a0, 20, 4)
            | shift(c0, 15, 5)
            | shift(aa0, 12, 3)
            | shift(ac0, 9, 3)
            | shift(a1, 5, 4)
            | shift(c1, 0, 5),
        shift(b0, 28, 4)
            | shift(b1, 24, 4)
            | shift(aa1, 21, 3)
            | shift(ac1, 18, 3)
            | shift(d0, 15, 3)
            | shift(ab0, 12, 3)
            | shift(ad0, 9, 3)
            | shift(d1, 6, 3)
            | shift(ab1, 3, 3)
            | shift(ad1, 0, 3),
    )
}

pub fn gs_dp_set_env_color(color: Rgba32) -> RawF3DCommand {
    RawF3DCommand::new(shift(0xFB, 24, 8), color.into())
}

pub fn gs_dp_set_prim_color(color: Rgba32) -> RawF3DCommand {
    RawF3DCommand::new(shift(0xFA, 24, 8), color.into())
}

pub fn gs_dp_pipe_sync() -> RawF3DCommand {
    RawF3DCommand::new(shift(0xE7, 24, 8), 0)
}

pub fn gs_dp_load_sync() -> RawF3DCommand {
    RawF3DCommand::new(shift(0xE6, 24, 8), 0)
}

pub fn gs_dp_tile_sync() -> RawF3DCommand {
    RawF3DCommand::new(shift(0xE8, 24, 8), 0)
}

pub fn gs_dp_full_sync() -> RawF3DCommand {
    RawF3DCommand::new(shift(0xE9, 24, 8), 0)
}

pub fn gs_sp_no_op() -> RawF3DCommand {
    RawF3DCommand::new(0, 0)
}

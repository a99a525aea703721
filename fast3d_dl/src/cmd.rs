//! Rust types representing the Fast3D commands understood by the interpreter.

#![allow(missing_docs)]

use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Index of a display list within an [Asset](crate::asset::Asset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayListId(pub u32);

/// A member of a lights record.
///
/// `member` indexes the directional lights; the member one past the last
/// directional light is the record's ambient light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightsRef {
    pub record: u32,
    pub member: u32,
}

/// A decoded Fast3D command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum F3DCommand {
    NoOp,

    // SP commands
    SPVertex {
        /// Index of the first vertex in the asset's vertex table.
        v: u32,
        n: u32,
        /// Destination slot in the vertex window.
        v0: u32,
    },
    SPOneTriangle {
        v0: u32,
        v1: u32,
        v2: u32,
        flag: u32,
    },
    SPTwoTriangles {
        first: [u32; 3],
        second: [u32; 3],
    },
    SPDisplayList(DisplayListId),
    SPBranchList(DisplayListId),
    SPEndDisplayList,
    SPReturn,
    SPSetLights {
        lights: u32,
        n: u32,
    },
    SPLight {
        light: LightsRef,
        n: u32,
    },
    SPNumLights(u32),
    SPTexture {
        sc: u32,
        tc: u32,
        level: u32,
        tile: u32,
        on: bool,
    },
    SPSetGeometryMode(GeometryModes),
    SPClearGeometryMode(GeometryModes),

    // DP commands
    DPSetCombineMode(CombineMode),
    DPSetEnvColor(Rgba32),
    DPSetPrimColor(Rgba32),
    DPFullSync,
    DPTileSync,
    DPPipeSync,
    DPLoadSync,
}

impl F3DCommand {
    /// Returns true if nothing after this command in the same display list is executed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            F3DCommand::SPEndDisplayList | F3DCommand::SPReturn | F3DCommand::SPBranchList(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum DisplayListOp {
    Call = 0,
    Branch = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum EndOp {
    End = 0,
    /// Like `End`, but a list entered without a caller faults instead of ending the run.
    Return = 1,
}

bitflags! {
    pub struct GeometryModes: u32 {
        const ZBUFFER             = 0x00000001;
        const TEXTURE_ENABLE      = 0x00000002;
        const SHADE               = 0x00000004;
        const SHADING_SMOOTH      = 0x00000200;
        const CULL_FRONT          = 0x00001000;
        const CULL_BACK           = 0x00002000;
        const FOG                 = 0x00010000;
        const LIGHTING            = 0x00020000;
        const TEXTURE_GEN         = 0x00040000;
        const TEXTURE_GEN_LINEAR  = 0x00080000;
        const LOD                 = 0x00100000;
        const CLIPPING            = 0x00800000;
    }
}

impl Default for GeometryModes {
    fn default() -> Self {
        Self::empty()
    }
}

/// Combiner selectors for both cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CombineMode {
    pub color1: CombineEquation,
    pub alpha1: CombineEquation,
    pub color2: CombineEquation,
    pub alpha2: CombineEquation,
}

impl CombineMode {
    pub fn one_cycle(color: CombineEquation, alpha: CombineEquation) -> Self {
        Self {
            color1: color,
            alpha1: alpha,
            color2: color,
            alpha2: alpha,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CombineEquation {
    /// [A, B, C, D]  ->  (A - B) * C + D
    pub args: [CombinerInput; 4],
}

impl CombineEquation {
    /// Decodes the raw selectors of an rgb equation. Each slot has its own numbering.
    pub fn from_color_selectors([a, b, c, d]: [u8; 4]) -> Self {
        use CombinerInput::*;

        let common = |v: u8| match v {
            0 => Some(Combined),
            1 => Some(Texel0),
            2 => Some(Texel1),
            3 => Some(Primitive),
            4 => Some(Shade),
            5 => Some(Environment),
            _ => None,
        };
        let a = common(a).unwrap_or(match a {
            6 => One,
            7 => Noise,
            _ => Zero,
        });
        let b = common(b).unwrap_or(match b {
            6 => Center,
            7 => K4,
            _ => Zero,
        });
        let c = common(c).unwrap_or(match c {
            6 => Scale,
            7 => CombinedAlpha,
            8 => Texel0Alpha,
            9 => Texel1Alpha,
            10 => PrimitiveAlpha,
            11 => ShadeAlpha,
            12 => EnvironmentAlpha,
            13 => LodFraction,
            14 => PrimLodFraction,
            15 => K5,
            _ => Zero,
        });
        let d = common(d).unwrap_or(match d {
            6 => One,
            _ => Zero,
        });
        Self { args: [a, b, c, d] }
    }

    /// Decodes the raw selectors of an alpha equation.
    pub fn from_alpha_selectors([a, b, c, d]: [u8; 4]) -> Self {
        use CombinerInput::*;

        let common = |v: u8| match v {
            1 => Texel0,
            2 => Texel1,
            3 => Primitive,
            4 => Shade,
            5 => Environment,
            _ => Zero,
        };
        let abd = |v: u8| match v {
            0 => Combined,
            6 => One,
            v => common(v),
        };
        let c = match c {
            0 => LodFraction,
            6 => PrimLodFraction,
            v => common(v),
        };
        Self {
            args: [abd(a), abd(b), c, abd(d)],
        }
    }
}

impl From<CombinerInput> for CombineEquation {
    fn from(v: CombinerInput) -> Self {
        Self {
            args: [
                CombinerInput::Zero,
                CombinerInput::Zero,
                CombinerInput::Zero,
                v,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombinerInput {
    Combined,
    Texel0,
    Texel1,
    Primitive,
    Shade,
    Environment,
    One,
    Noise,
    Center,
    K4,
    Scale,
    CombinedAlpha,
    Texel0Alpha,
    Texel1Alpha,
    PrimitiveAlpha,
    ShadeAlpha,
    EnvironmentAlpha,
    LodFraction,
    PrimLodFraction,
    K5,
    Zero,
}

impl Default for CombinerInput {
    fn default() -> Self {
        Self::Zero
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba32 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba32 {
    pub fn from_rgb_a([r, g, b]: [u8; 3], a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<u32> for Rgba32 {
    fn from(w1: u32) -> Self {
        Self {
            r: (w1 >> 24) as u8,
            g: (w1 >> 16) as u8,
            b: (w1 >> 8) as u8,
            a: w1 as u8,
        }
    }
}

impl From<Rgba32> for u32 {
    fn from(c: Rgba32) -> Self {
        (c.r as u32) << 24 | (c.g as u32) << 16 | (c.b as u32) << 8 | c.a as u32
    }
}

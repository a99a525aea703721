//! Fast3D command decoding.
//!
//! This module provides two methods for decoding commands:
//! - [decode_f3d_command]
//! - [decode_f3d_display_list]
//!
//! Both of these transform [RawF3DCommand]s into [F3DCommand]s. The encoding follows
//! the F3DEX GBI, with pointers stored as [SegmentedAddress]es into an asset's tables.

#![allow(missing_docs)]

use std::fmt;

use crate::{
    asset::{Segment, SegmentedAddress},
    cmd::*,
    error::F3DErrorKind,
    vertex::VERTEX_SIZE,
};

/// Size in bytes of one raw command record.
pub const COMMAND_SIZE: usize = 8;

/// `G_MOVEMEM` parameter for the first single light slot.
pub const G_MV_L0: u32 = 0x86;
/// `G_MOVEMEM` parameter that binds a whole lights record at once.
pub const G_MV_LIGHTSET: u32 = 0x98;
/// `G_MOVEWORD` index of the light count.
pub const G_MW_NUMLIGHT: u32 = 0x02;

/// A raw Fast3D command for decoding: two 32 bit words.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RawF3DCommand {
    pub w0: u32,
    pub w1: u32,
}

impl fmt::Debug for RawF3DCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RawF3DCommand {{ w0: {:#010X}, w1: {:#010X} }}",
            self.w0, self.w1
        )
    }
}

impl RawF3DCommand {
    pub const fn new(w0: u32, w1: u32) -> Self {
        Self { w0, w1 }
    }

    pub fn opcode(self) -> u8 {
        (self.w0 >> 24) as u8
    }

    pub fn from_be_bytes(bytes: [u8; COMMAND_SIZE]) -> Self {
        Self {
            w0: u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            w1: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }

    pub fn to_be_bytes(self) -> [u8; COMMAND_SIZE] {
        let mut bytes = [0; COMMAND_SIZE];
        bytes[..4].copy_from_slice(&self.w0.to_be_bytes());
        bytes[4..].copy_from_slice(&self.w1.to_be_bytes());
        bytes
    }

    /// Reads a flat table of big endian command records.
    pub fn read_be_slice(bytes: &[u8]) -> Result<Vec<Self>, F3DErrorKind> {
        if bytes.len() % COMMAND_SIZE != 0 {
            return Err(F3DErrorKind::malformed(format!(
                "display list length {} is not a multiple of {}",
                bytes.len(),
                COMMAND_SIZE
            )));
        }
        Ok(bytes
            .chunks_exact(COMMAND_SIZE)
            .map(|chunk| {
                let mut record = [0; COMMAND_SIZE];
                record.copy_from_slice(chunk);
                Self::from_be_bytes(record)
            })
            .collect())
    }
}

fn address(w1: u32, expected: Segment) -> Result<u32, F3DErrorKind> {
    let addr = SegmentedAddress(w1);
    match addr.segment() {
        Some(segment) if segment == expected => Ok(addr.offset()),
        _ => Err(F3DErrorKind::malformed(format!(
            "address {:#010X} is not in the {:?} segment",
            w1, expected
        ))),
    }
}

fn tri_index(v: u32) -> u32 {
    (v & 0xFF) / 2
}

/// Decodes a raw Fast3D command.
pub fn decode_f3d_command(raw_command: RawF3DCommand) -> Result<F3DCommand, F3DErrorKind> {
    use F3DCommand::*;

    let w0 = raw_command.w0;
    let w1 = raw_command.w1;
    let unknown = || F3DErrorKind::UnknownOpcode([w0, w1]);

    Ok(match raw_command.opcode() {
        0x00 | 0xC0 => NoOp,

        // DMA commands
        0x03 => {
            let p = (w0 >> 16) & 0xFF;
            let offset = address(w1, Segment::Lights)?;
            let light = LightsRef {
                record: offset >> 4,
                member: offset & 0xF,
            };
            match p {
                G_MV_LIGHTSET => SPSetLights {
                    lights: light.record,
                    n: w0 & 0xFF,
                },
                0x86..=0x94 if p % 2 == 0 => SPLight {
                    light,
                    n: (p - G_MV_L0) / 2 + 1,
                },
                _ => return Err(unknown()),
            }
        }
        0x04 => {
            let v0 = ((w0 >> 16) & 0xFF) / 2;
            let n = (w0 >> 10) & 0x3F;
            let length = w0 & 0x3FF;
            if length + 1 != n * VERTEX_SIZE as u32 {
                return Err(F3DErrorKind::malformed(format!(
                    "vertex load of {} vertices declares {} bytes",
                    n,
                    length + 1
                )));
            }
            let offset = address(w1, Segment::Vertices)?;
            if offset % VERTEX_SIZE as u32 != 0 {
                return Err(F3DErrorKind::malformed(format!(
                    "unaligned vertex address {:#010X}",
                    w1
                )));
            }
            SPVertex {
                v: offset / VERTEX_SIZE as u32,
                n,
                v0,
            }
        }
        0x06 => {
            let p = ((w0 >> 16) & 0xFF) as u8;
            let id = DisplayListId(address(w1, Segment::DisplayLists)?);
            match DisplayListOp::try_from(p) {
                Ok(DisplayListOp::Call) => SPDisplayList(id),
                Ok(DisplayListOp::Branch) => SPBranchList(id),
                Err(_) => return Err(unknown()),
            }
        }

        // IMMEDIATE commands
        0xBF => SPOneTriangle {
            v0: tri_index(w1 >> 16),
            v1: tri_index(w1 >> 8),
            v2: tri_index(w1),
            flag: w1 >> 24,
        },
        0xB1 => SPTwoTriangles {
            first: [tri_index(w0 >> 16), tri_index(w0 >> 8), tri_index(w0)],
            second: [tri_index(w1 >> 16), tri_index(w1 >> 8), tri_index(w1)],
        },
        0xBC => {
            let index = w0 & 0xFF;
            match index {
                G_MW_NUMLIGHT => {
                    let base = w1.wrapping_sub(0x8000_0000);
                    if w1 < 0x8000_0000 || base % 0x20 != 0 || base < 0x20 {
                        return Err(F3DErrorKind::malformed(format!(
                            "invalid light count word {:#010X}",
                            w1
                        )));
                    }
                    SPNumLights(base / 0x20 - 1)
                }
                _ => return Err(unknown()),
            }
        }
        0xBB => SPTexture {
            sc: (w1 >> 16) & 0xFFFF,
            tc: w1 & 0xFFFF,
            level: (w0 >> 11) & 0x7,
            tile: (w0 >> 8) & 0x7,
            on: (w0 & 0xFF) != 0,
        },
        0xB8 => match EndOp::try_from(((w0 >> 16) & 0xFF) as u8) {
            Ok(EndOp::End) => SPEndDisplayList,
            Ok(EndOp::Return) => SPReturn,
            Err(_) => return Err(unknown()),
        },
        0xB7 => SPSetGeometryMode(GeometryModes::from_bits_truncate(w1)),
        0xB6 => SPClearGeometryMode(GeometryModes::from_bits_truncate(w1)),

        // RDP commands
        0xFC => {
            let cc1 = [
                ((w0 >> 20) & 0xF) as u8,
                ((w1 >> 28) & 0xF) as u8,
                ((w0 >> 15) & 0x1F) as u8,
                ((w1 >> 15) & 0x7) as u8,
            ];
            let ac1 = [
                ((w0 >> 12) & 0x7) as u8,
                ((w1 >> 12) & 0x7) as u8,
                ((w0 >> 9) & 0x7) as u8,
                ((w1 >> 9) & 0x7) as u8,
            ];
            let cc2 = [
                ((w0 >> 5) & 0xF) as u8,
                ((w1 >> 24) & 0xF) as u8,
                (w0 & 0x1F) as u8,
                ((w1 >> 6) & 0x7) as u8,
            ];
            let ac2 = [
                ((w1 >> 21) & 0x7) as u8,
                ((w1 >> 3) & 0x7) as u8,
                ((w1 >> 18) & 0x7) as u8,
                (w1 & 0x7) as u8,
            ];
            DPSetCombineMode(CombineMode {
                color1: CombineEquation::from_color_selectors(cc1),
                alpha1: CombineEquation::from_alpha_selectors(ac1),
                color2: CombineEquation::from_color_selectors(cc2),
                alpha2: CombineEquation::from_alpha_selectors(ac2),
            })
        }
        0xFB => DPSetEnvColor(Rgba32::from(w1)),
        0xFA => DPSetPrimColor(Rgba32::from(w1)),
        0xE9 => DPFullSync,
        0xE8 => DPTileSync,
        0xE7 => DPPipeSync,
        0xE6 => DPLoadSync,
        _ => return Err(unknown()),
    })
}

/// Decodes a stream of [RawF3DCommand]s into a stream of [F3DCommand]s.
///
/// The stream stops after the first command that ends the display list.
pub fn decode_f3d_display_list<I: Iterator<Item = RawF3DCommand>>(raw_dl: I) -> F3DCommandIter<I> {
    F3DCommandIter {
        raw_dl,
        ended: false,
    }
}

#[derive(Debug)]
pub struct F3DCommandIter<I> {
    raw_dl: I,
    ended: bool,
}

impl<I> Iterator for F3DCommandIter<I>
where
    I: Iterator<Item = RawF3DCommand>,
{
    type Item = Result<F3DCommand, F3DErrorKind>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ended {
            return None;
        }

        let raw_cmd = self.raw_dl.next()?;
        let cmd = decode_f3d_command(raw_cmd);

        if matches!(cmd, Ok(ref cmd) if cmd.is_terminal()) {
            self.ended = true;
        }

        Some(cmd)
    }
}

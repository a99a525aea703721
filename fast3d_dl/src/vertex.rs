//! Vertex records and the interpreter's vertex window.

use std::mem;

use bytemuck::{Pod, Zeroable};

use crate::{
    cmd::Rgba32,
    error::{F3DErrorKind, OutOfRange, Table},
};

/// Size in bytes of a [Vertex] record.
pub const VERTEX_SIZE: usize = mem::size_of::<Vertex>();

/// Number of vertex slots in the microcode's on-chip buffer.
pub const DEFAULT_WINDOW_SIZE: usize = 32;

/// Largest window that commands can address: indices are stored doubled in one byte.
pub const MAX_WINDOW_SIZE: usize = 128;

/// A `Vtx` record.
///
/// `cn` is a normal (three signed bytes plus alpha) when lighting is enabled and an
/// rgba color otherwise.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Vertex {
    #[allow(missing_docs)]
    pub pos: [i16; 3],
    #[allow(missing_docs)]
    pub flag: u16,
    /// Texture coordinates in s10.5 fixed point.
    pub uv: [i16; 2],
    #[allow(missing_docs)]
    pub cn: [u8; 4],
}

impl Vertex {
    #[allow(missing_docs)]
    pub const fn new(pos: [i16; 3], flag: u16, uv: [i16; 2], cn: [u8; 4]) -> Self {
        Self { pos, flag, uv, cn }
    }

    /// Interprets `cn` as a normal.
    pub fn normal(&self) -> [i8; 3] {
        [self.cn[0] as i8, self.cn[1] as i8, self.cn[2] as i8]
    }

    /// Interprets `cn` as a color.
    pub fn color(&self) -> Rgba32 {
        Rgba32::from_rgb_a([self.cn[0], self.cn[1], self.cn[2]], self.cn[3])
    }

    /// Decodes a big endian 16 byte record.
    pub fn from_be_bytes(b: [u8; VERTEX_SIZE]) -> Self {
        let i16_at = |i: usize| i16::from_be_bytes([b[i], b[i + 1]]);
        Self {
            pos: [i16_at(0), i16_at(2), i16_at(4)],
            flag: u16::from_be_bytes([b[6], b[7]]),
            uv: [i16_at(8), i16_at(10)],
            cn: [b[12], b[13], b[14], b[15]],
        }
    }

    /// Reads a flat big endian vertex table.
    pub fn read_be_slice(bytes: &[u8]) -> Result<Vec<Self>, F3DErrorKind> {
        if bytes.len() % VERTEX_SIZE != 0 {
            return Err(F3DErrorKind::malformed(format!(
                "vertex table length {} is not a multiple of {}",
                bytes.len(),
                VERTEX_SIZE
            )));
        }
        Ok(bytes
            .chunks_exact(VERTEX_SIZE)
            .map(|chunk| {
                let mut record = [0; VERTEX_SIZE];
                record.copy_from_slice(chunk);
                Self::from_be_bytes(record)
            })
            .collect())
    }
}

/// The fixed capacity staging area that triangle commands index into.
///
/// Slots that have not been loaded during the current run cannot be referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexWindow {
    slots: Vec<Option<Vertex>>,
}

impl Default for VertexWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

impl VertexWindow {
    /// Creates an empty window. The capacity is clamped to [MAX_WINDOW_SIZE].
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.min(MAX_WINDOW_SIZE)],
        }
    }

    #[allow(missing_docs)]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots holding a vertex.
    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Copies `count` vertices from `table[buffer_offset..]` into the window at `dest_index`.
    ///
    /// The window is left untouched if either range is out of bounds.
    pub fn load(
        &mut self,
        table: &[Vertex],
        buffer_offset: usize,
        count: usize,
        dest_index: usize,
    ) -> Result<(), F3DErrorKind> {
        let src_end = buffer_offset + count;
        if src_end > table.len() {
            return Err(OutOfRange::new(Table::VertexTable, src_end - 1, table.len()).into());
        }
        let dst_end = dest_index + count;
        if dst_end > self.slots.len() {
            return Err(
                OutOfRange::new(Table::VertexWindow, dst_end - 1, self.slots.len()).into(),
            );
        }

        for (slot, vtx) in self.slots[dest_index..dst_end]
            .iter_mut()
            .zip(&table[buffer_offset..src_end])
        {
            *slot = Some(*vtx);
        }
        Ok(())
    }

    /// Returns the vertex in the given slot.
    pub fn get(&self, index: u32) -> Result<Vertex, F3DErrorKind> {
        self.slots
            .get(index as usize)
            .copied()
            .flatten()
            .ok_or_else(|| {
                OutOfRange::new(Table::VertexWindow, index as usize, self.loaded_count()).into()
            })
    }
}

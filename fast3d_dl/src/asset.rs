//! Read-only assets: a vertex table, a light table and named display lists.
//!
//! Commands reference the tables through [SegmentedAddress]es. An [Asset] is immutable
//! once built, so it can be shared between any number of interpreters.

use std::collections::HashMap;

use log::debug;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{
    cmd::{DisplayListId, F3DCommand},
    decode::{decode_f3d_command, RawF3DCommand},
    error::{CommandLocation, F3DError, F3DErrorKind},
    lights::{Lights, MAX_LIGHTS},
    vertex::{Vertex, VERTEX_SIZE},
};

/// The asset table a segmented address points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Segment {
    /// Byte offset into the vertex table.
    Vertices = 0x04,
    /// `record << 4 | member` into the light table.
    Lights = 0x05,
    /// Index into the display list table.
    DisplayLists = 0x06,
}

/// A `segment << 24 | offset` pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentedAddress(pub u32);

/// Largest offset a segmented address can hold.
pub const MAX_SEGMENT_OFFSET: u64 = 0x00FF_FFFF;

impl SegmentedAddress {
    /// Returns None if `offset` does not fit in 24 bits.
    pub fn new(segment: Segment, offset: u64) -> Option<Self> {
        if offset > MAX_SEGMENT_OFFSET {
            return None;
        }
        let segment: u8 = segment.into();
        Some(Self((segment as u32) << 24 | offset as u32))
    }

    /// Returns None if the address does not name a known segment.
    pub fn segment(self) -> Option<Segment> {
        Segment::try_from((self.0 >> 24) as u8).ok()
    }

    #[allow(missing_docs)]
    pub fn offset(self) -> u32 {
        self.0 & 0x00FF_FFFF
    }
}

/// A named command buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayList {
    #[allow(missing_docs)]
    pub name: String,
    #[allow(missing_docs)]
    pub commands: Vec<RawF3DCommand>,
}

/// Vertex, light and display list tables shared by interpreter runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    vertices: Vec<Vertex>,
    lights: Vec<Lights>,
    display_lists: Vec<DisplayList>,
    names: HashMap<String, DisplayListId>,
}

impl Asset {
    /// Returns a builder for a new asset.
    pub fn builder() -> AssetBuilder {
        AssetBuilder::default()
    }

    #[allow(missing_docs)]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Returns the lights record at the given index.
    pub fn lights(&self, record: u32) -> Option<&Lights> {
        self.lights.get(record as usize)
    }

    #[allow(missing_docs)]
    pub fn num_lights_records(&self) -> usize {
        self.lights.len()
    }

    #[allow(missing_docs)]
    pub fn display_list(&self, id: DisplayListId) -> Option<&DisplayList> {
        self.display_lists.get(id.0 as usize)
    }

    #[allow(missing_docs)]
    pub fn num_display_lists(&self) -> usize {
        self.display_lists.len()
    }

    /// Looks up a display list by name.
    pub fn lookup(&self, name: &str) -> Option<DisplayListId> {
        self.names.get(name).copied()
    }
}

/// Incrementally assembles an [Asset].
///
/// Display lists may be declared before they are defined so that lists can call lists
/// that appear later in the table.
#[derive(Debug, Clone, Default)]
pub struct AssetBuilder {
    vertices: Vec<Vertex>,
    lights: Vec<Lights>,
    display_lists: Vec<(String, Option<Vec<RawF3DCommand>>)>,
}

impl AssetBuilder {
    /// Appends vertices to the vertex table and returns the index of the first one.
    pub fn vertices(&mut self, vertices: &[Vertex]) -> u32 {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        base
    }

    /// Appends a lights record and returns its index.
    pub fn lights(&mut self, lights: Lights) -> u32 {
        self.lights.push(lights);
        (self.lights.len() - 1) as u32
    }

    /// Reserves an id for a display list whose commands are given later.
    pub fn declare(&mut self, name: &str) -> DisplayListId {
        self.display_lists.push((name.to_owned(), None));
        DisplayListId((self.display_lists.len() - 1) as u32)
    }

    /// Sets the commands of a previously declared display list.
    ///
    /// # Panics
    /// Panics if `id` was not returned by this builder.
    #[track_caller]
    pub fn define(&mut self, id: DisplayListId, commands: Vec<RawF3DCommand>) {
        self.display_lists[id.0 as usize].1 = Some(commands);
    }

    /// Declares and defines a display list.
    pub fn display_list(&mut self, name: &str, commands: Vec<RawF3DCommand>) -> DisplayListId {
        let id = self.declare(name);
        self.define(id, commands);
        id
    }

    /// Validates the tables and returns the finished asset.
    ///
    /// Unknown opcodes and out of range references are not checked here; they fault
    /// when an interpreter reaches them.
    pub fn build(self) -> Result<Asset, F3DError> {
        let addressable = [
            (
                "vertex table",
                self.vertices.len() as u64 * VERTEX_SIZE as u64,
            ),
            ("light table", (self.lights.len() as u64) << 4),
            ("display list table", self.display_lists.len() as u64),
        ];
        for (table, end) in addressable {
            if end > MAX_SEGMENT_OFFSET + 1 {
                return Err(F3DErrorKind::malformed(format!(
                    "{} is too large to be addressed",
                    table
                ))
                .into());
            }
        }

        for (index, record) in self.lights.iter().enumerate() {
            if record.directional.len() > MAX_LIGHTS {
                return Err(F3DErrorKind::malformed(format!(
                    "lights record {} has {} directional lights (max {})",
                    index,
                    record.directional.len(),
                    MAX_LIGHTS
                ))
                .into());
            }
        }

        let mut names = HashMap::new();
        let mut display_lists = Vec::with_capacity(self.display_lists.len());
        for (index, (name, commands)) in self.display_lists.into_iter().enumerate() {
            let id = DisplayListId(index as u32);
            if names.insert(name.clone(), id).is_some() {
                return Err(
                    F3DErrorKind::malformed(format!("duplicate display list {:?}", name)).into(),
                );
            }
            let commands = match commands {
                Some(commands) if !commands.is_empty() => commands,
                _ => {
                    return Err(F3DErrorKind::malformed(format!(
                        "display list {:?} has no commands",
                        name
                    ))
                    .into())
                }
            };
            validate_commands(id, &name, &commands, &self.lights)?;
            display_lists.push(DisplayList { name, commands });
        }

        debug!(
            "built asset: {} vertices, {} lights records, {} display lists",
            self.vertices.len(),
            self.lights.len(),
            display_lists.len()
        );

        Ok(Asset {
            vertices: self.vertices,
            lights: self.lights,
            display_lists,
            names,
        })
    }
}

fn validate_commands(
    id: DisplayListId,
    name: &str,
    commands: &[RawF3DCommand],
    lights: &[Lights],
) -> Result<(), F3DError> {
    let mut last = None;
    for (index, &raw) in commands.iter().enumerate() {
        let location = CommandLocation { list: id, index };
        last = match decode_f3d_command(raw) {
            Ok(cmd) => {
                if let F3DCommand::SPSetLights { lights: record, n } = cmd {
                    if let Some(record) = lights.get(record as usize) {
                        if record.directional.len() != n as usize {
                            return Err(F3DError::at(
                                location,
                                F3DErrorKind::malformed(format!(
                                    "set lights declares {} lights, record has {}",
                                    n,
                                    record.directional.len()
                                )),
                            ));
                        }
                    }
                }
                Some(cmd)
            }
            Err(kind @ F3DErrorKind::MalformedAsset(_)) => {
                return Err(F3DError::at(location, kind));
            }
            Err(_) => None,
        };
    }

    match last {
        Some(cmd) if !cmd.is_terminal() => Err(F3DError::at(
            CommandLocation {
                list: id,
                index: commands.len() - 1,
            },
            F3DErrorKind::malformed(format!("display list {:?} is not terminated", name)),
        )),
        _ => Ok(()),
    }
}

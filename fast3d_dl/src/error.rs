#![allow(missing_docs)]

use core::fmt;
use std::error;

use thiserror::Error;

use crate::cmd::DisplayListId;

/// Position of a raw command inside an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandLocation {
    pub list: DisplayListId,
    pub index: usize,
}

impl fmt::Display for CommandLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "display list {} command {}", self.list.0, self.index)
    }
}

/// An error raised while building an asset or interpreting a display list.
///
/// Runtime errors always carry the location of the offending command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct F3DError {
    pub location: Option<CommandLocation>,
    pub kind: F3DErrorKind,
}

impl F3DError {
    pub fn new(kind: F3DErrorKind) -> Self {
        Self {
            location: None,
            kind,
        }
    }

    pub fn at(location: CommandLocation, kind: F3DErrorKind) -> Self {
        Self {
            location: Some(location),
            kind,
        }
    }
}

impl fmt::Display for F3DError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(location) => write!(f, "{} at {}", self.kind, location),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl error::Error for F3DError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl From<F3DErrorKind> for F3DError {
    fn from(kind: F3DErrorKind) -> Self {
        Self::new(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum F3DErrorKind {
    #[error(transparent)]
    OutOfRange(#[from] OutOfRange),
    #[error("unknown F3D command: {:#010X} {:#010X}", .0[0], .0[1])]
    UnknownOpcode([u32; 2]),
    #[error("display list call stack overflow (max depth {0})")]
    StackOverflow(usize),
    #[error("return from display list with no caller")]
    StackUnderflow,
    #[error("malformed asset: {0}")]
    MalformedAsset(String),
    #[error("command limit of {0} exceeded")]
    CommandLimitExceeded(usize),
}

impl F3DErrorKind {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedAsset(reason.into())
    }
}

/// An index or range that does not fit the table it addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{table} index {index} out of range (len {len})")]
pub struct OutOfRange {
    pub table: Table,
    pub index: usize,
    pub len: usize,
}

impl OutOfRange {
    pub fn new(table: Table, index: usize, len: usize) -> Self {
        Self { table, index, len }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    VertexTable,
    VertexWindow,
    LightTable,
    LightSlot,
    DisplayList,
    Commands,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Table::VertexTable => "vertex table",
            Table::VertexWindow => "vertex window",
            Table::LightTable => "light table",
            Table::LightSlot => "light slot",
            Table::DisplayList => "display list",
            Table::Commands => "command",
        };
        f.write_str(name)
    }
}

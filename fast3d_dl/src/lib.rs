//! Decoding and interpreting of Nintendo 64 Fast3D (F3DEX family) display lists.
//!
//! An [Asset](asset::Asset) holds a vertex table, a light table and named display lists
//! made of fixed-width raw commands. [interpret_display_list](interpret::interpret_display_list)
//! walks a root display list and delivers shaded triangles to a
//! [TriangleSink](interpret::TriangleSink).
//!
//! Rasterization, texture sampling and framebuffer output are left to the caller.

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]
#![allow(clippy::needless_range_loop)]

pub use config::*;
pub use error::*;

pub mod asset;
pub mod cmd;
mod config;
pub mod decode;
mod error;
pub mod gbi;
pub mod interpret;
pub mod lights;
pub mod pipeline;
pub mod sample;
mod util;
pub mod vertex;

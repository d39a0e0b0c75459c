//! Arena-backed decoder for glTF 2.0 scenes (unofficial).
//!
//! Accepts `.gltf` JSON text or a `.glb` container and produces a [`SceneGraph`]: flat,
//! index-linked arrays of accessors, buffers, materials, meshes, nodes, skins and
//! animations. Decoding never builds a JSON DOM. A pre-pass sizes every array up front
//! and each entity kind is then filled in one walk over the token stream.
//!
//! External buffers and images are fetched through [`ReadFile`], so the decoder itself does
//! no I/O unless [`SceneGraph::from_path`] is used.

#![forbid(unsafe_code)]

mod arena;
mod census;
mod container;
mod cursor;
mod decode;
mod error;
mod io;
mod keys;
mod model;
mod scene;
mod token;
mod transform;
mod version;

pub use arena::{ArenaLayout, SectionKind, SectionLayout};
pub use container::*;
pub use decode::{DecodeOptions, decode_with};
pub use error::*;
pub use io::*;
pub use model::*;
pub use scene::*;
pub use token::*;
pub use transform::*;
pub use version::*;

#[cfg(test)]
mod test_support;





#[cfg(test)]
mod decode_tests;

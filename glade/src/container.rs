//! `.glb` framing.
//!
//! A GLB file is a 12-byte header followed by a JSON chunk and a BIN chunk, all
//! little-endian. Anything that does not start with the `glTF` magic is plain JSON text.

use crate::Error;
use byteorder::{ByteOrder, LittleEndian};
use std::ops::Range;

pub const GLB_MAGIC: u32 = 0x4654_6c67;
pub const CHUNK_JSON: u32 = 0x4e4f_534a;
pub const CHUNK_BIN: u32 = 0x004e_4942;

const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;
const GLB_VERSION: u32 = 2;

/// Byte ranges of the JSON text and binary payload inside a source buffer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Container {
    pub json: Range<usize>,
    pub bin: Option<Range<usize>>,
}

impl Container {
    pub fn is_glb(&self) -> bool {
        self.bin.is_some()
    }
}

#[derive(Clone, Debug)]
struct GlbInput<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

fn malformed(message: impl Into<String>) -> Error {
    Error::MalformedContainer {
        message: message.into(),
    }
}

impl<'a> GlbInput<'a> {
    fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.cursor)
    }

    fn read_u32_le(&mut self) -> Result<u32, Error> {
        if self.remaining() < 4 {
            return Err(malformed(format!(
                "unexpected EOF at offset {}",
                self.cursor
            )));
        }
        let v = LittleEndian::read_u32(&self.bytes[self.cursor..self.cursor + 4]);
        self.cursor += 4;
        Ok(v)
    }

    /// Reads a chunk header of the given type and returns the payload range.
    fn read_chunk(&mut self, expected: u32, name: &str) -> Result<Range<usize>, Error> {
        if self.remaining() < CHUNK_HEADER_LEN {
            return Err(malformed(format!("missing {name} chunk")));
        }
        let length = self.read_u32_le()? as usize;
        let kind = self.read_u32_le()?;
        if kind != expected {
            return Err(malformed(format!(
                "expected {name} chunk, found type 0x{kind:08x}"
            )));
        }
        if self.remaining() < length {
            return Err(malformed(format!(
                "{name} chunk declares {length} bytes but only {} remain",
                self.remaining()
            )));
        }
        let start = self.cursor;
        self.cursor += length;
        Ok(start..start + length)
    }
}

/// Splits `bytes` into its JSON and binary parts.
pub fn frame(bytes: &[u8]) -> Result<Container, Error> {
    if bytes.len() < HEADER_LEN || LittleEndian::read_u32(&bytes[0..4]) != GLB_MAGIC {
        return Ok(Container {
            json: 0..bytes.len(),
            bin: None,
        });
    }

    let mut input = GlbInput {
        bytes,
        cursor: 4,
    };
    let version = input.read_u32_le()?;
    if version != GLB_VERSION {
        return Err(malformed(format!("unsupported GLB version {version}")));
    }
    let declared = input.read_u32_le()? as usize;
    if declared > bytes.len() {
        return Err(malformed(format!(
            "header declares {declared} bytes but the input holds {}",
            bytes.len()
        )));
    }

    let json = input.read_chunk(CHUNK_JSON, "JSON")?;
    let bin = input.read_chunk(CHUNK_BIN, "BIN")?;
    log::debug!(
        "GLB container: json {} bytes at {}, bin {} bytes at {}",
        json.len(),
        json.start,
        bin.len(),
        bin.start
    );
    Ok(Container {
        json,
        bin: Some(bin),
    })
}

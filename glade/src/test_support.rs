use crate::{CHUNK_BIN, CHUNK_JSON, Error, GLB_MAGIC, NoExternalFiles, ReadFile, SceneGraph};
use byteorder::{ByteOrder, LittleEndian};
use std::collections::HashMap;

pub(crate) fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 0.0001,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

pub(crate) fn assert_matrix_approx(actual: &[f32; 16], expected: &[f32; 16]) {
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        let diff = (a - e).abs();
        assert!(diff <= 0.0001, "element {i}: expected {e}, got {a}");
    }
}

pub(crate) fn decode_json(document: serde_json::Value) -> Result<SceneGraph, Error> {
    SceneGraph::from_slice(document.to_string().into_bytes(), &mut NoExternalFiles)
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    let mut bytes = [0u8; 4];
    LittleEndian::write_u32(&mut bytes, value);
    out.extend_from_slice(&bytes);
}

/// Builds a GLB container. The JSON chunk is space-padded to four bytes; `bin` is written as
/// given.
pub(crate) fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
    let mut text = json.as_bytes().to_vec();
    while text.len() % 4 != 0 {
        text.push(b' ');
    }
    let total = 12 + 8 + text.len() + 8 + bin.len();

    let mut out = Vec::with_capacity(total);
    push_u32(&mut out, GLB_MAGIC);
    push_u32(&mut out, 2);
    push_u32(&mut out, total as u32);
    push_u32(&mut out, text.len() as u32);
    push_u32(&mut out, CHUNK_JSON);
    out.extend_from_slice(&text);
    push_u32(&mut out, bin.len() as u32);
    push_u32(&mut out, CHUNK_BIN);
    out.extend_from_slice(bin);
    out
}

/// Appends a chunk after the existing ones and rewrites the header's total length.
pub(crate) fn push_chunk(glb: &mut Vec<u8>, kind: u32, payload: &[u8]) {
    push_u32(glb, payload.len() as u32);
    push_u32(glb, kind);
    glb.extend_from_slice(payload);
    let total = glb.len() as u32;
    LittleEndian::write_u32(&mut glb[8..12], total);
}

pub(crate) fn f32_bytes(values: &[f32]) -> Vec<u8> {
    let mut out = vec![0u8; values.len() * 4];
    LittleEndian::write_f32_into(values, &mut out);
    out
}

/// In-memory `ReadFile` that records every requested URI.
#[derive(Default)]
pub(crate) struct MemoryReader {
    files: HashMap<String, Vec<u8>>,
    pub(crate) requested: Vec<String>,
}

impl MemoryReader {
    pub(crate) fn with(mut self, uri: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(uri.to_string(), bytes.into());
        self
    }
}

impl ReadFile for MemoryReader {
    fn read(&mut self, uri: &str) -> Result<Vec<u8>, Error> {
        self.requested.push(uri.to_string());
        self.files.get(uri).cloned().ok_or_else(|| Error::Io {
            path: uri.to_string(),
            message: "not found".to_string(),
        })
    }
}

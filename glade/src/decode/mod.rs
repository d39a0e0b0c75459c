//! glTF / GLB decoding.
//!
//! Decoding runs in fixed passes over one token array: the census walks the root object
//! once to size the arena, then each entity decoder seeks back to the array position the
//! census recorded and fills its section in document order.

mod animations;
mod buffers;
mod materials;
mod meshes;
mod nodes;
pub(crate) mod textures;
mod validate;

use crate::arena::{Arena, ArenaLayout};
use crate::census::{ArraySite, Census};
use crate::container::frame;
use crate::cursor::TokenCursor;
use crate::io::{FsReader, ReadFile};
use crate::{Error, JsonTokenizer, SceneGraph, Tokenize};
use std::path::Path;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct DecodeOptions {
    /// Upper bound on the number of JSON tokens. `None` means unbounded.
    pub max_tokens: Option<usize>,
    /// Accept `MAT2`/`MAT3`/`MAT4` accessors. When `false` they fail with
    /// [`Error::UnsupportedAccessorShape`].
    pub matrix_accessors: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_tokens: None,
            matrix_accessors: true,
        }
    }
}

/// Walks the elements of an entity array: seeks to `site`, enters the array, and calls
/// `element` once per element with the cursor positioned on the element's object token.
pub(crate) fn for_each_element<'a>(
    cursor: &mut TokenCursor<'a>,
    site: Option<ArraySite>,
    mut element: impl FnMut(&mut TokenCursor<'a>, usize, usize) -> Result<(), Error>,
) -> Result<(), Error> {
    let Some(site) = site else {
        return Ok(());
    };
    cursor.seek(site.token);
    let count = cursor.enter_array()?;
    for index in 0..count {
        let keys = cursor.enter_object()?;
        element(cursor, index, keys)?;
    }
    Ok(())
}

/// Reads an optional index-valued member.
pub(crate) fn read_index(cursor: &mut TokenCursor<'_>) -> Result<Option<u32>, Error> {
    Ok(Some(cursor.read_u32()?))
}

/// Reads a fixed-length float array, failing with [`Error::InvalidVectorSize`] on any other
/// length.
pub(crate) fn read_vector<const N: usize>(
    cursor: &mut TokenCursor<'_>,
    entity: &'static str,
    index: usize,
    field: &'static str,
) -> Result<[f32; N], Error> {
    let mut out = [0.0f32; N];
    let found = cursor.read_f32_into(&mut out)?;
    if found != N {
        return Err(Error::InvalidVectorSize {
            entity,
            index,
            field,
            expected: N,
            found,
        });
    }
    Ok(out)
}

impl SceneGraph {
    pub fn from_slice(
        bytes: impl Into<Arc<[u8]>>,
        io: &mut impl ReadFile,
    ) -> Result<Self, Error> {
        Self::from_slice_with_options(bytes, io, &DecodeOptions::default())
    }

    pub fn from_slice_with_options(
        bytes: impl Into<Arc<[u8]>>,
        io: &mut impl ReadFile,
        options: &DecodeOptions,
    ) -> Result<Self, Error> {
        let tokenizer = JsonTokenizer {
            max_tokens: options.max_tokens,
        };
        decode_with(bytes.into(), &tokenizer, io, options)
    }

    /// Reads `path` and resolves external URIs relative to its directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| Error::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let mut io = FsReader::new(base);
        Self::from_slice(bytes, &mut io)
    }
}

/// Decodes with a caller-supplied lexer.
pub fn decode_with<T, R>(
    source: Arc<[u8]>,
    tokenizer: &T,
    io: &mut R,
    options: &DecodeOptions,
) -> Result<SceneGraph, Error>
where
    T: Tokenize + ?Sized,
    R: ReadFile + ?Sized,
{
    let container = frame(&source)?;
    let text = std::str::from_utf8(&source[container.json.clone()]).map_err(|e| {
        Error::MalformedContainer {
            message: format!("JSON text is not valid UTF-8: {e}"),
        }
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let tokens = tokenizer.tokenize(text)?;
    let mut cursor = TokenCursor::new(text, &tokens);
    let census = Census::take(&mut cursor)?;
    let layout = ArenaLayout::from_census(&census);
    log::debug!(
        "decoding {} tokens into a {} byte arena",
        tokens.len(),
        layout.total
    );

    let mut arena = Arena::with_census(&census);
    buffers::decode_accessors(&mut cursor, &census, &mut arena, options)?;
    buffers::decode_buffers(&mut cursor, &census, &mut arena, io, container.bin.clone())?;
    buffers::decode_buffer_views(&mut cursor, &census, &mut arena)?;
    textures::decode_images(&mut cursor, &census, &mut arena, io)?;
    textures::decode_samplers(&mut cursor, &census, &mut arena)?;
    textures::decode_textures(&mut cursor, &census, &mut arena)?;
    materials::decode_materials(&mut cursor, &census, &mut arena)?;
    meshes::decode_meshes(&mut cursor, &census, &mut arena)?;
    nodes::decode_nodes(&mut cursor, &census, &mut arena)?;
    nodes::decode_skins(&mut cursor, &census, &mut arena)?;
    animations::decode_animations(&mut cursor, &census, &mut arena)?;
    validate::validate_references(&arena)?;

    let source = if container.is_glb() {
        Some(source)
    } else {
        None
    };
    Ok(SceneGraph::new(arena, layout, source))
}

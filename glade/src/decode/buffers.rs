use super::{DecodeOptions, for_each_element, read_index};
use crate::arena::Arena;
use crate::census::Census;
use crate::cursor::TokenCursor;
use crate::io::ReadFile;
use crate::keys::Key;
use crate::model::BufferData;
use crate::{
    Accessor, AccessorBounds, AccessorShape, Buffer, BufferSource, BufferView, ComponentType,
    Error,
};
use std::ops::Range;

fn read_bounds(
    cursor: &mut TokenCursor<'_>,
    index: usize,
    field: &'static str,
) -> Result<AccessorBounds, Error> {
    let mut values = [0.0f32; AccessorBounds::CAPACITY];
    let found = cursor.read_f32_into(&mut values)?;
    if found > AccessorBounds::CAPACITY {
        return Err(Error::InvalidVectorSize {
            entity: "accessor",
            index,
            field,
            expected: AccessorBounds::CAPACITY,
            found,
        });
    }
    Ok(AccessorBounds::new(values, found))
}

pub(super) fn decode_accessors(
    cursor: &mut TokenCursor<'_>,
    census: &Census,
    arena: &mut Arena,
    options: &DecodeOptions,
) -> Result<(), Error> {
    for_each_element(cursor, census.accessors, |cursor, index, keys| {
        let mut view = None;
        let mut count = None;
        let mut offset = 0usize;
        let mut component_type = None;
        let mut shape = None;
        let mut normalized = false;
        let mut min = None;
        let mut max = None;

        for _ in 0..keys {
            match cursor.read_key()? {
                Key::BufferView => view = read_index(cursor)?,
                Key::Count => count = Some(cursor.read_usize()?),
                Key::ByteOffset => offset = cursor.read_usize()?,
                Key::ComponentType => {
                    let code = cursor.read_i64()?;
                    component_type = Some(ComponentType::from_gltf_code(code).ok_or(
                        Error::UnknownComponentType {
                            accessor: index,
                            value: code,
                        },
                    )?);
                }
                Key::Type => {
                    let name = cursor.read_str()?;
                    let parsed = AccessorShape::from_gltf_name(name)
                        .filter(|s| options.matrix_accessors || !s.is_matrix());
                    shape = Some(parsed.ok_or_else(|| Error::UnsupportedAccessorShape {
                        accessor: index,
                        value: name.to_string(),
                    })?);
                }
                Key::Normalized => normalized = cursor.read_bool()?,
                Key::Min => min = Some(read_bounds(cursor, index, "min")?),
                Key::Max => max = Some(read_bounds(cursor, index, "max")?),
                _ => {
                    cursor.skip_value()?;
                }
            }
        }

        let missing = |field| Error::MissingField {
            entity: "accessor",
            index,
            field,
        };
        arena.accessors.push(Accessor {
            view,
            count: count.ok_or_else(|| missing("count"))?,
            offset,
            component_type: component_type.ok_or_else(|| missing("componentType"))?,
            shape: shape.ok_or_else(|| missing("type"))?,
            normalized,
            min,
            max,
        });
        Ok(())
    })
}

pub(super) fn decode_buffers<R: ReadFile + ?Sized>(
    cursor: &mut TokenCursor<'_>,
    census: &Census,
    arena: &mut Arena,
    io: &mut R,
    bin: Option<Range<usize>>,
) -> Result<(), Error> {
    for_each_element(cursor, census.buffers, |cursor, index, keys| {
        let mut declared = None;
        let mut external: Option<(String, Vec<u8>)> = None;

        for _ in 0..keys {
            match cursor.read_key()? {
                Key::ByteLength => declared = Some(cursor.read_usize()?),
                Key::Uri => {
                    let uri = cursor.read_string()?.into_owned();
                    let bytes = io.read(&uri)?;
                    log::trace!("buffer {index}: read {} bytes from '{uri}'", bytes.len());
                    external = Some((uri, bytes));
                }
                _ => {
                    cursor.skip_value()?;
                }
            }
        }

        let declared = declared.ok_or(Error::MissingField {
            entity: "buffer",
            index,
            field: "byteLength",
        })?;

        let buffer = match (external, &bin) {
            (Some((uri, bytes)), _) => {
                if bytes.len() != declared {
                    return Err(Error::BufferSizeMismatch {
                        buffer: index,
                        expected: declared,
                        actual: bytes.len(),
                    });
                }
                Buffer {
                    size: declared,
                    source: BufferSource::Uri(uri),
                    data: BufferData::Owned(bytes),
                }
            }
            (None, Some(chunk)) if index == 0 => {
                // GLB pads the BIN chunk to four bytes, so it may exceed byteLength.
                if declared > chunk.len() {
                    return Err(Error::BufferSizeMismatch {
                        buffer: index,
                        expected: declared,
                        actual: chunk.len(),
                    });
                }
                Buffer {
                    size: chunk.len(),
                    source: BufferSource::BinaryChunk,
                    data: BufferData::Chunk(chunk.clone()),
                }
            }
            (None, _) => return Err(Error::MissingBufferSource { buffer: index }),
        };
        arena.buffers.push(buffer);
        Ok(())
    })
}

pub(super) fn decode_buffer_views(
    cursor: &mut TokenCursor<'_>,
    census: &Census,
    arena: &mut Arena,
) -> Result<(), Error> {
    let chunk_start = match arena.buffers.get(0).map(|b| &b.data) {
        Some(BufferData::Chunk(range)) => Some(range.start),
        _ => None,
    };

    for_each_element(cursor, census.buffer_views, |cursor, index, keys| {
        let mut buffer = None;
        let mut offset = 0usize;
        let mut length = None;
        let mut stride = None;

        for _ in 0..keys {
            match cursor.read_key()? {
                Key::Buffer => buffer = Some(cursor.read_u32()?),
                Key::ByteOffset => offset = cursor.read_usize()?,
                Key::ByteLength => length = Some(cursor.read_usize()?),
                Key::ByteStride => stride = Some(cursor.read_u32()?),
                _ => {
                    cursor.skip_value()?;
                }
            }
        }

        let missing = |field| Error::MissingField {
            entity: "bufferView",
            index,
            field,
        };
        let buffer = buffer.ok_or_else(|| missing("buffer"))?;
        if let (0, Some(start)) = (buffer, chunk_start) {
            offset = offset.saturating_add(start);
        }
        arena.buffer_views.push(BufferView {
            buffer,
            offset,
            length: length.ok_or_else(|| missing("byteLength"))?,
            stride,
        });
        Ok(())
    })
}

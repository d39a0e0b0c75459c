use super::{for_each_element, read_index};
use crate::arena::Arena;
use crate::census::Census;
use crate::cursor::TokenCursor;
use crate::keys::Key;
use crate::{Attribute, DrawMode, Error, Mesh, Primitive, Span};

fn read_attributes(cursor: &mut TokenCursor<'_>, primitive: &mut Primitive) -> Result<(), Error> {
    let count = cursor.enter_object()?;
    for _ in 0..count {
        let name = cursor.read_str()?;
        let accessor = cursor.read_u32()?;
        match Attribute::from_gltf_name(name) {
            Some(attribute) => primitive.attributes[attribute.index()] = Some(accessor),
            None => log::trace!("ignoring attribute '{name}'"),
        }
    }
    Ok(())
}

fn read_primitive(cursor: &mut TokenCursor<'_>) -> Result<Primitive, Error> {
    let mut primitive = Primitive::default();
    let keys = cursor.enter_object()?;
    for _ in 0..keys {
        match cursor.read_key()? {
            Key::Attributes => read_attributes(cursor, &mut primitive)?,
            Key::Indices => primitive.indices = read_index(cursor)?,
            Key::Material => primitive.material = read_index(cursor)?,
            Key::Mode => {
                let code = cursor.read_i64()?;
                primitive.mode =
                    DrawMode::from_gltf_code(code).ok_or(Error::UnknownDrawMode { value: code })?;
            }
            _ => {
                cursor.skip_value()?;
            }
        }
    }
    Ok(primitive)
}

/// Every mesh owns a contiguous run of the shared primitive array.
pub(super) fn decode_meshes(
    cursor: &mut TokenCursor<'_>,
    census: &Census,
    arena: &mut Arena,
) -> Result<(), Error> {
    for_each_element(cursor, census.meshes, |cursor, _index, keys| {
        let mut mesh = Mesh {
            primitives: Span::new(arena.primitives.next_index(), 0),
        };

        for _ in 0..keys {
            match cursor.read_key()? {
                Key::Primitives => {
                    let start = arena.primitives.next_index();
                    let count = cursor.enter_array()?;
                    for _ in 0..count {
                        let primitive = read_primitive(cursor)?;
                        arena.primitives.push(primitive);
                    }
                    mesh.primitives = Span::new(start, count as u32);
                }
                _ => {
                    cursor.skip_value()?;
                }
            }
        }

        arena.meshes.push(mesh);
        Ok(())
    })
}

use super::{for_each_element, read_index, read_vector};
use crate::arena::{Arena, Section};
use crate::census::Census;
use crate::cursor::TokenCursor;
use crate::keys::Key;
use crate::transform::compose_trs;
use crate::{Error, Node, Skin, Span};

/// Copies an index array into a shared pool and returns its span there.
fn read_index_run(cursor: &mut TokenCursor<'_>, pool: &mut Section<u32>) -> Result<Span, Error> {
    let start = pool.next_index();
    let count = cursor.enter_array()?;
    for _ in 0..count {
        let value = cursor.read_u32()?;
        pool.push(value);
    }
    Ok(Span::new(start, count as u32))
}

/// Meshes must already be decoded: nodes copy their primitive span.
pub(super) fn decode_nodes(
    cursor: &mut TokenCursor<'_>,
    census: &Census,
    arena: &mut Arena,
) -> Result<(), Error> {
    for_each_element(cursor, census.nodes, |cursor, index, keys| {
        let mut matrix = None;
        let mut translation = [0.0, 0.0, 0.0];
        let mut rotation = [0.0, 0.0, 0.0, 1.0];
        let mut scale = [1.0, 1.0, 1.0];
        let mut children = Span::new(arena.node_children.next_index(), 0);
        let mut mesh = None;
        let mut skin = None;

        for _ in 0..keys {
            match cursor.read_key()? {
                Key::Children => children = read_index_run(cursor, &mut arena.node_children)?,
                Key::Mesh => mesh = read_index(cursor)?,
                Key::Skin => skin = read_index(cursor)?,
                Key::Matrix => {
                    let mut values = [0.0f32; 16];
                    let found = cursor.read_f32_into(&mut values)?;
                    if found != 16 {
                        return Err(Error::InvalidMatrixSize { node: index, found });
                    }
                    matrix = Some(values);
                }
                Key::Translation => {
                    translation = read_vector::<3>(cursor, "node", index, "translation")?;
                }
                Key::Rotation => rotation = read_vector::<4>(cursor, "node", index, "rotation")?,
                Key::Scale => scale = read_vector::<3>(cursor, "node", index, "scale")?,
                _ => {
                    cursor.skip_value()?;
                }
            }
        }

        let primitives = match mesh {
            Some(m) => {
                arena
                    .meshes
                    .get(m)
                    .ok_or(Error::InvalidReference {
                        kind: "mesh",
                        index: m,
                        count: arena.meshes.len(),
                    })?
                    .primitives
            }
            None => Span::default(),
        };
        let transform = matrix.unwrap_or_else(|| compose_trs(translation, rotation, scale));
        arena.nodes.push(Node {
            transform,
            global_transform: transform,
            children,
            mesh,
            primitives,
            skin,
        });
        Ok(())
    })
}

pub(super) fn decode_skins(
    cursor: &mut TokenCursor<'_>,
    census: &Census,
    arena: &mut Arena,
) -> Result<(), Error> {
    for_each_element(cursor, census.skins, |cursor, _index, keys| {
        let mut skin = Skin {
            joints: Span::new(arena.skin_joints.next_index(), 0),
            skeleton: None,
            inverse_bind_matrices: None,
        };

        for _ in 0..keys {
            match cursor.read_key()? {
                Key::Joints => skin.joints = read_index_run(cursor, &mut arena.skin_joints)?,
                Key::Skeleton => skin.skeleton = read_index(cursor)?,
                Key::InverseBindMatrices => skin.inverse_bind_matrices = read_index(cursor)?,
                _ => {
                    cursor.skip_value()?;
                }
            }
        }

        arena.skins.push(skin);
        Ok(())
    })
}

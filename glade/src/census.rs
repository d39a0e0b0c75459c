//! Size pre-pass.
//!
//! One read-only walk over the root object that records where each entity array starts
//! and how many slots every arena section needs. Nested counts (node children, skin joints,
//! mesh primitives, animation channels and samplers) are summed one level down because the
//! outer array size alone does not determine them.

use crate::cursor::TokenCursor;
use crate::keys::Key;
use crate::version::validate_gltf_version;
use crate::{Error, TokenKind};

/// Token position of an entity array and its element count.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct ArraySite {
    pub token: usize,
    pub count: usize,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Census {
    pub accessors: Option<ArraySite>,
    pub animations: Option<ArraySite>,
    pub buffers: Option<ArraySite>,
    pub buffer_views: Option<ArraySite>,
    pub images: Option<ArraySite>,
    pub samplers: Option<ArraySite>,
    pub textures: Option<ArraySite>,
    pub materials: Option<ArraySite>,
    pub meshes: Option<ArraySite>,
    pub nodes: Option<ArraySite>,
    pub skins: Option<ArraySite>,

    pub primitives: usize,
    pub node_children: usize,
    pub skin_joints: usize,
    pub channels: usize,
    pub animation_samplers: usize,
}

pub(crate) fn count(site: Option<ArraySite>) -> usize {
    site.map_or(0, |s| s.count)
}

impl Census {
    pub(crate) fn take(cursor: &mut TokenCursor<'_>) -> Result<Self, Error> {
        cursor.seek(0);
        if cursor.peek()?.kind != TokenKind::Object {
            return Err(Error::InvalidRoot);
        }

        let mut census = Census::default();
        let keys = cursor.enter_object()?;
        for _ in 0..keys {
            match cursor.read_key()? {
                Key::Asset => read_asset(cursor)?,
                Key::Accessors => census.accessors = Some(record(cursor)?),
                Key::Buffers => census.buffers = Some(record(cursor)?),
                Key::BufferViews => census.buffer_views = Some(record(cursor)?),
                Key::Images => census.images = Some(record(cursor)?),
                Key::Samplers => census.samplers = Some(record(cursor)?),
                Key::Textures => census.textures = Some(record(cursor)?),
                Key::Materials => census.materials = Some(record(cursor)?),
                Key::Meshes => {
                    census.meshes = Some(site(cursor)?);
                    [census.primitives] = aggregate(cursor, [Key::Primitives])?;
                }
                Key::Nodes => {
                    census.nodes = Some(site(cursor)?);
                    [census.node_children] = aggregate(cursor, [Key::Children])?;
                }
                Key::Skins => {
                    census.skins = Some(site(cursor)?);
                    [census.skin_joints] = aggregate(cursor, [Key::Joints])?;
                }
                Key::Animations => {
                    census.animations = Some(site(cursor)?);
                    [census.channels, census.animation_samplers] =
                        aggregate(cursor, [Key::Channels, Key::Samplers])?;
                }
                _ => {
                    cursor.skip_value()?;
                }
            }
        }

        log::debug!(
            "census: {} accessors, {} buffers, {} views, {} meshes/{} primitives, {} nodes/{} children, {} skins/{} joints, {} animations",
            count(census.accessors),
            count(census.buffers),
            count(census.buffer_views),
            count(census.meshes),
            census.primitives,
            count(census.nodes),
            census.node_children,
            count(census.skins),
            census.skin_joints,
            count(census.animations),
        );
        Ok(census)
    }
}

fn site(cursor: &TokenCursor<'_>) -> Result<ArraySite, Error> {
    let token = cursor.peek()?;
    if token.kind != TokenKind::Array {
        return Err(Error::UnexpectedToken {
            expected: "array",
            offset: token.start,
        });
    }
    Ok(ArraySite {
        token: cursor.position(),
        count: token.size,
    })
}

fn record(cursor: &mut TokenCursor<'_>) -> Result<ArraySite, Error> {
    let site = site(cursor)?;
    cursor.skip_value()?;
    Ok(site)
}

/// Consumes an array of objects, summing the element counts of the array members named
/// by `targets`. Non-object elements and non-array members contribute nothing.
fn aggregate<const N: usize>(
    cursor: &mut TokenCursor<'_>,
    targets: [Key; N],
) -> Result<[usize; N], Error> {
    let mut totals = [0usize; N];
    let elements = cursor.enter_array()?;
    for _ in 0..elements {
        if cursor.peek()?.kind != TokenKind::Object {
            cursor.skip_value()?;
            continue;
        }
        let keys = cursor.enter_object()?;
        for _ in 0..keys {
            let key = cursor.read_key()?;
            let value = cursor.peek()?;
            // Sizes are only trusted once the whole value has been walked.
            cursor.skip_value()?;
            if let Some(slot) = targets.iter().position(|t| *t == key) {
                if value.kind == TokenKind::Array {
                    totals[slot] += value.size;
                }
            }
        }
    }
    Ok(totals)
}

fn read_asset(cursor: &mut TokenCursor<'_>) -> Result<(), Error> {
    let keys = cursor.enter_object()?;
    for _ in 0..keys {
        match cursor.read_key()? {
            Key::Version => validate_gltf_version(cursor.read_str()?)?,
            _ => {
                cursor.skip_value()?;
            }
        }
    }
    Ok(())
}

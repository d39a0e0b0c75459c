use crate::arena::Arena;
use crate::model::BufferData;
use crate::{BufferView, Error, ImageSource, Span};

fn check(kind: &'static str, index: u32, count: usize) -> Result<(), Error> {
    if (index as usize) < count {
        Ok(())
    } else {
        Err(Error::InvalidReference { kind, index, count })
    }
}

fn check_opt(kind: &'static str, index: Option<u32>, count: usize) -> Result<(), Error> {
    index.map_or(Ok(()), |i| check(kind, i, count))
}

fn check_span(kind: &'static str, span: Span, count: usize) -> Result<(), Error> {
    if span.range().end <= count {
        Ok(())
    } else {
        Err(Error::InvalidReference {
            kind,
            index: span.start.saturating_add(span.count.saturating_sub(1)),
            count,
        })
    }
}

/// Chunk-backed view offsets are absolute in the source, so the chunk start is taken off
/// before comparing against the buffer size.
fn check_view_extent(arena: &Arena, index: usize, view: &BufferView) -> Result<(), Error> {
    let Some(buffer) = arena.buffers.as_slice().get(view.buffer as usize) else {
        return Ok(());
    };
    let (base, size) = match &buffer.data {
        BufferData::Owned(bytes) => (0, bytes.len()),
        BufferData::Chunk(range) => (range.start, range.len()),
    };
    let end = view
        .offset
        .checked_add(view.length)
        .and_then(|end| end.checked_sub(base));
    match end {
        Some(end) if view.offset >= base && end <= size => Ok(()),
        _ => Err(Error::BufferViewOutOfBounds {
            view: index,
            buffer: view.buffer,
            end: view.offset.saturating_add(view.length).saturating_sub(base),
            size,
        }),
    }
}

/// Structural check that every stored index points inside its target array.
///
/// Cycles in the node hierarchy are not detected here.
pub(super) fn validate_references(arena: &Arena) -> Result<(), Error> {
    let accessors = arena.accessors.len();
    let views = arena.buffer_views.len();
    let nodes = arena.nodes.len();

    for accessor in arena.accessors.as_slice() {
        check_opt("bufferView", accessor.view, views)?;
    }
    for (index, view) in arena.buffer_views.as_slice().iter().enumerate() {
        check("buffer", view.buffer, arena.buffers.len())?;
        check_view_extent(arena, index, view)?;
    }
    for image in arena.images.as_slice() {
        if let ImageSource::View { view, .. } = image.source {
            check("bufferView", view, views)?;
        }
    }
    for texture in arena.textures.as_slice() {
        check_opt("image", texture.image, arena.images.len())?;
        check_opt("sampler", texture.sampler, arena.samplers.len())?;
    }
    for material in arena.materials.as_slice() {
        for texture in material.textures {
            check_opt("texture", texture, arena.textures.len())?;
        }
    }
    for primitive in arena.primitives.as_slice() {
        for attribute in primitive.attributes {
            check_opt("accessor", attribute, accessors)?;
        }
        check_opt("accessor", primitive.indices, accessors)?;
        check_opt("material", primitive.material, arena.materials.len())?;
    }
    for mesh in arena.meshes.as_slice() {
        check_span("primitive", mesh.primitives, arena.primitives.len())?;
    }
    for node in arena.nodes.as_slice() {
        check_span("node child", node.children, arena.node_children.len())?;
        check_opt("mesh", node.mesh, arena.meshes.len())?;
        check_opt("skin", node.skin, arena.skins.len())?;
    }
    for &child in arena.node_children.as_slice() {
        check("node", child, nodes)?;
    }
    for skin in arena.skins.as_slice() {
        check_span("skin joint", skin.joints, arena.skin_joints.len())?;
        check_opt("node", skin.skeleton, nodes)?;
        check_opt("accessor", skin.inverse_bind_matrices, accessors)?;
    }
    for &joint in arena.skin_joints.as_slice() {
        check("node", joint, nodes)?;
    }
    for channel in arena.channels.as_slice() {
        check_opt("node", channel.node, nodes)?;
        check(
            "animation sampler",
            channel.sampler,
            arena.animation_samplers.len(),
        )?;
    }
    for sampler in arena.animation_samplers.as_slice() {
        check("accessor", sampler.input, accessors)?;
        check("accessor", sampler.output, accessors)?;
    }
    Ok(())
}

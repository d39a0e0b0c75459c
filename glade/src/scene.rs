use crate::arena::{Arena, ArenaLayout};
use crate::model::BufferData;
use crate::transform::{IDENTITY, multiply, transform_point};
use crate::{
    Accessor, AccessorShape, Animation, AnimationChannel, AnimationSampler, Attribute, Buffer,
    BufferView, ComponentType, Image, Material, Mesh, Node, Primitive, Sampler, Skin, Texture,
};
use byteorder::{ByteOrder, LittleEndian};
use std::sync::Arc;

const MAT4_BYTES: usize = 64;

/// A decoded glTF asset.
///
/// Entities live in flat arrays and refer to each other by index. Ranges (mesh primitives,
/// node children, skin joints, animation channels and samplers) are [`Span`](crate::Span)s
/// into shared arrays, resolved with the helpers below.
#[derive(Clone, Debug)]
pub struct SceneGraph {
    arena: Arena,
    layout: ArenaLayout,
    /// The GLB source, retained because the BIN chunk buffer borrows it in place.
    source: Option<Arc<[u8]>>,
}

impl SceneGraph {
    pub(crate) fn new(arena: Arena, layout: ArenaLayout, source: Option<Arc<[u8]>>) -> Self {
        Self {
            arena,
            layout,
            source,
        }
    }

    pub fn layout(&self) -> &ArenaLayout {
        &self.layout
    }

    /// Arena size in bytes.
    pub fn footprint(&self) -> usize {
        self.layout.total
    }

    pub fn accessors(&self) -> &[Accessor] {
        self.arena.accessors.as_slice()
    }

    pub fn buffers(&self) -> &[Buffer] {
        self.arena.buffers.as_slice()
    }

    pub fn buffer_views(&self) -> &[BufferView] {
        self.arena.buffer_views.as_slice()
    }

    pub fn images(&self) -> &[Image] {
        self.arena.images.as_slice()
    }

    pub fn samplers(&self) -> &[Sampler] {
        self.arena.samplers.as_slice()
    }

    pub fn textures(&self) -> &[Texture] {
        self.arena.textures.as_slice()
    }

    pub fn materials(&self) -> &[Material] {
        self.arena.materials.as_slice()
    }

    pub fn meshes(&self) -> &[Mesh] {
        self.arena.meshes.as_slice()
    }

    pub fn primitives(&self) -> &[Primitive] {
        self.arena.primitives.as_slice()
    }

    pub fn nodes(&self) -> &[Node] {
        self.arena.nodes.as_slice()
    }

    pub fn skins(&self) -> &[Skin] {
        self.arena.skins.as_slice()
    }

    pub fn animations(&self) -> &[Animation] {
        self.arena.animations.as_slice()
    }

    pub fn animation_channels(&self) -> &[AnimationChannel] {
        self.arena.channels.as_slice()
    }

    pub fn animation_samplers(&self) -> &[AnimationSampler] {
        self.arena.animation_samplers.as_slice()
    }

    pub fn mesh_primitives(&self, mesh: &Mesh) -> &[Primitive] {
        &self.primitives()[mesh.primitives.range()]
    }

    pub fn node_children(&self, node: &Node) -> &[u32] {
        &self.arena.node_children.as_slice()[node.children.range()]
    }

    pub fn skin_joints(&self, skin: &Skin) -> &[u32] {
        &self.arena.skin_joints.as_slice()[skin.joints.range()]
    }

    pub fn channels_of(&self, animation: &Animation) -> &[AnimationChannel] {
        &self.animation_channels()[animation.channels.range()]
    }

    pub fn samplers_of(&self, animation: &Animation) -> &[AnimationSampler] {
        &self.animation_samplers()[animation.samplers.range()]
    }

    /// The buffer's payload. For the GLB chunk buffer this is the `BIN` chunk itself.
    pub fn buffer_bytes(&self, index: usize) -> Option<&[u8]> {
        match &self.buffers().get(index)?.data {
            BufferData::Owned(bytes) => Some(bytes),
            BufferData::Chunk(range) => self.source.as_deref()?.get(range.clone()),
        }
    }

    /// The bytes a buffer view covers.
    pub fn view_bytes(&self, index: usize) -> Option<&[u8]> {
        let view = self.buffer_views().get(index)?;
        let (backing, start): (&[u8], usize) =
            match &self.buffers().get(view.buffer as usize)?.data {
                BufferData::Owned(bytes) => (bytes.as_slice(), view.offset),
                BufferData::Chunk(range) => (
                    self.source.as_deref()?.get(range.clone())?,
                    view.offset.checked_sub(range.start)?,
                ),
            };
        backing.get(start..start.checked_add(view.length)?)
    }

    fn matrix_accessor(&self, skin: &Skin) -> Option<(&Accessor, &[u8], usize)> {
        let accessor = self.accessors().get(skin.inverse_bind_matrices? as usize)?;
        if accessor.shape != AccessorShape::Mat4 || accessor.component_type != ComponentType::F32
        {
            return None;
        }
        let view_index = accessor.view? as usize;
        let stride = self
            .buffer_views()
            .get(view_index)?
            .stride
            .map_or(MAT4_BYTES, |s| s as usize);
        let bytes = self.view_bytes(view_index)?.get(accessor.offset..)?;
        Some((accessor, bytes, stride))
    }

    /// Inverse-bind matrix data for a skin, borrowed from its buffer without copying.
    pub fn inverse_bind_matrices(&self, skin: &Skin) -> Option<&[u8]> {
        let (accessor, bytes, stride) = self.matrix_accessor(skin)?;
        if accessor.count == 0 {
            return Some(&[]);
        }
        let len = (accessor.count - 1)
            .checked_mul(stride)?
            .checked_add(MAT4_BYTES)?;
        bytes.get(..len)
    }

    /// Inverse-bind matrix of the `joint`-th joint, column-major.
    pub fn inverse_bind_matrix(&self, skin: &Skin, joint: usize) -> Option<[f32; 16]> {
        let (accessor, bytes, stride) = self.matrix_accessor(skin)?;
        if joint >= accessor.count {
            return None;
        }
        let start = joint.checked_mul(stride)?;
        let raw = bytes.get(start..start.checked_add(MAT4_BYTES)?)?;
        let mut out = [0.0f32; 16];
        LittleEndian::read_f32_into(raw, &mut out);
        Some(out)
    }

    /// Recomputes every node's `global_transform` from the hierarchy.
    ///
    /// Roots are nodes no other node lists as a child. A node reachable along more than
    /// one path keeps the first transform found; cycles are cut where they close.
    pub fn resolve_global_transforms(&mut self) {
        let node_count = self.arena.nodes.len();
        let mut is_child = vec![false; node_count];
        for &child in self.arena.node_children.as_slice() {
            if let Some(flag) = is_child.get_mut(child as usize) {
                *flag = true;
            }
        }

        let mut visited = vec![false; node_count];
        let mut stack: Vec<(u32, [f32; 16])> = (0..node_count as u32)
            .rev()
            .filter(|&i| !is_child[i as usize])
            .map(|i| (i, IDENTITY))
            .collect();

        while let Some((index, parent)) = stack.pop() {
            let Some(seen) = visited.get_mut(index as usize) else {
                continue;
            };
            if *seen {
                continue;
            }
            *seen = true;

            let Some(node) = self.arena.nodes.get_mut(index) else {
                continue;
            };
            let global = multiply(&parent, &node.transform);
            node.global_transform = global;
            let children = node.children.range();
            for &child in self.arena.node_children.as_slice()[children].iter().rev() {
                stack.push((child, global));
            }
        }
    }

    /// World-space axis-aligned bounds `[min_x, min_y, min_z, max_x, max_y, max_z]` of every
    /// node's `POSITION` data, from accessor `min`/`max` and the node's global transform.
    pub fn bounds(&self) -> Option<[f32; 6]> {
        let mut out: Option<[f32; 6]> = None;
        for node in self.nodes() {
            for primitive in &self.primitives()[node.primitives.range()] {
                let Some(accessor) = primitive
                    .attribute(Attribute::Position)
                    .and_then(|i| self.accessors().get(i as usize))
                else {
                    continue;
                };
                let (Some(min), Some(max)) = (&accessor.min, &accessor.max) else {
                    continue;
                };
                let (min, max) = (min.as_slice(), max.as_slice());
                if min.len() < 3 || max.len() < 3 {
                    continue;
                }
                for corner in 0..8 {
                    let point = [
                        if corner & 1 == 0 { min[0] } else { max[0] },
                        if corner & 2 == 0 { min[1] } else { max[1] },
                        if corner & 4 == 0 { min[2] } else { max[2] },
                    ];
                    let p = transform_point(&node.global_transform, point);
                    let b = out.get_or_insert([p[0], p[1], p[2], p[0], p[1], p[2]]);
                    for axis in 0..3 {
                        b[axis] = b[axis].min(p[axis]);
                        b[axis + 3] = b[axis + 3].max(p[axis]);
                    }
                }
            }
        }
        out
    }
}

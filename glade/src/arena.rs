//! Exact-capacity storage for every entity kind.
//!
//! The census fixes each section's length before any entity is decoded; decoders append
//! in document order and never grow a section past that length.

use crate::census::{Census, count};
use crate::{
    Accessor, Animation, AnimationChannel, AnimationSampler, Buffer, BufferView, Image,
    Material, Mesh, Node, Primitive, Sampler, Skin, Texture,
};
use std::mem::{align_of, size_of};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SectionKind {
    Accessors,
    Buffers,
    BufferViews,
    Images,
    Samplers,
    Textures,
    Materials,
    Primitives,
    Meshes,
    Nodes,
    Skins,
    Channels,
    AnimationSamplers,
    Animations,
    NodeChildren,
    SkinJoints,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SectionLayout {
    pub kind: SectionKind,
    /// Byte offset of the section inside a single block holding every section.
    pub offset: usize,
    pub count: usize,
    pub bytes: usize,
}

/// Byte layout of the arena, in declaration order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ArenaLayout {
    pub sections: Vec<SectionLayout>,
    pub total: usize,
}

impl ArenaLayout {
    pub(crate) fn from_census(census: &Census) -> Self {
        let mut layout = ArenaLayout::default();
        layout.push::<Accessor>(SectionKind::Accessors, count(census.accessors));
        layout.push::<Buffer>(SectionKind::Buffers, count(census.buffers));
        layout.push::<BufferView>(SectionKind::BufferViews, count(census.buffer_views));
        layout.push::<Image>(SectionKind::Images, count(census.images));
        layout.push::<Sampler>(SectionKind::Samplers, count(census.samplers));
        layout.push::<Texture>(SectionKind::Textures, count(census.textures));
        layout.push::<Material>(SectionKind::Materials, count(census.materials));
        layout.push::<Primitive>(SectionKind::Primitives, census.primitives);
        layout.push::<Mesh>(SectionKind::Meshes, count(census.meshes));
        layout.push::<Node>(SectionKind::Nodes, count(census.nodes));
        layout.push::<Skin>(SectionKind::Skins, count(census.skins));
        layout.push::<AnimationChannel>(SectionKind::Channels, census.channels);
        layout.push::<AnimationSampler>(
            SectionKind::AnimationSamplers,
            census.animation_samplers,
        );
        layout.push::<Animation>(SectionKind::Animations, count(census.animations));
        layout.push::<u32>(SectionKind::NodeChildren, census.node_children);
        layout.push::<u32>(SectionKind::SkinJoints, census.skin_joints);
        layout
    }

    fn push<T>(&mut self, kind: SectionKind, count: usize) {
        let offset = self.total.next_multiple_of(align_of::<T>());
        let bytes = count * size_of::<T>();
        self.sections.push(SectionLayout {
            kind,
            offset,
            count,
            bytes,
        });
        self.total = offset + bytes;
    }

    pub fn section(&self, kind: SectionKind) -> Option<&SectionLayout> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}

/// One fixed-length section of the arena.
#[derive(Clone, Debug)]
pub(crate) struct Section<T> {
    items: Vec<T>,
    limit: usize,
}

impl<T> Section<T> {
    fn with_len(limit: usize) -> Self {
        Self {
            items: Vec::with_capacity(limit),
            limit,
        }
    }

    /// Appends `item` and returns its index.
    pub(crate) fn push(&mut self, item: T) -> u32 {
        debug_assert!(
            self.items.len() < self.limit,
            "arena section overflow: census reserved {} slots",
            self.limit
        );
        self.items.push(item);
        (self.items.len() - 1) as u32
    }

    /// Index the next pushed item will receive.
    pub(crate) fn next_index(&self) -> u32 {
        self.items.len() as u32
    }

    pub(crate) fn get(&self, index: u32) -> Option<&T> {
        self.items.get(index as usize)
    }

    pub(crate) fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.items.get_mut(index as usize)
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Arena {
    pub accessors: Section<Accessor>,
    pub buffers: Section<Buffer>,
    pub buffer_views: Section<BufferView>,
    pub images: Section<Image>,
    pub samplers: Section<Sampler>,
    pub textures: Section<Texture>,
    pub materials: Section<Material>,
    pub primitives: Section<Primitive>,
    pub meshes: Section<Mesh>,
    pub nodes: Section<Node>,
    pub skins: Section<Skin>,
    pub channels: Section<AnimationChannel>,
    pub animation_samplers: Section<AnimationSampler>,
    pub animations: Section<Animation>,
    pub node_children: Section<u32>,
    pub skin_joints: Section<u32>,
}

impl Arena {
    pub(crate) fn with_census(census: &Census) -> Self {
        Self {
            accessors: Section::with_len(count(census.accessors)),
            buffers: Section::with_len(count(census.buffers)),
            buffer_views: Section::with_len(count(census.buffer_views)),
            images: Section::with_len(count(census.images)),
            samplers: Section::with_len(count(census.samplers)),
            textures: Section::with_len(count(census.textures)),
            materials: Section::with_len(count(census.materials)),
            primitives: Section::with_len(census.primitives),
            meshes: Section::with_len(count(census.meshes)),
            nodes: Section::with_len(count(census.nodes)),
            skins: Section::with_len(count(census.skins)),
            channels: Section::with_len(census.channels),
            animation_samplers: Section::with_len(census.animation_samplers),
            animations: Section::with_len(count(census.animations)),
            node_children: Section::with_len(census.node_children),
            skin_joints: Section::with_len(census.skin_joints),
        }
    }
}

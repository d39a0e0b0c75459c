//! glTF member-name vocabulary.
//!
//! Names are resolved by binary search over a table sorted by byte order. Every name in the
//! table is compared in full, so distinct names can never alias each other.

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Key {
    Accessors,
    Animations,
    Asset,
    Attributes,
    BaseColorFactor,
    BaseColorTexture,
    Buffer,
    BufferView,
    BufferViews,
    Buffers,
    ByteLength,
    ByteOffset,
    ByteStride,
    Channels,
    Children,
    ComponentType,
    Count,
    EmissiveFactor,
    EmissiveTexture,
    Images,
    Index,
    Indices,
    Input,
    Interpolation,
    InverseBindMatrices,
    Joints,
    MagFilter,
    Material,
    Materials,
    Matrix,
    Max,
    Mesh,
    Meshes,
    MetallicFactor,
    MetallicRoughnessTexture,
    MimeType,
    Min,
    MinFilter,
    Mode,
    Node,
    Nodes,
    NormalTexture,
    Normalized,
    OcclusionTexture,
    Output,
    Path,
    PbrMetallicRoughness,
    Primitives,
    Rotation,
    RoughnessFactor,
    Sampler,
    Samplers,
    Scale,
    Skeleton,
    Skin,
    Skins,
    Source,
    Target,
    Textures,
    Translation,
    Type,
    Uri,
    Version,
    WrapS,
    WrapT,
    /// Anything outside the vocabulary. Always skipped.
    Unknown,
}

pub(crate) const KEY_TABLE: &[(&str, Key)] = &[
    ("accessors", Key::Accessors),
    ("animations", Key::Animations),
    ("asset", Key::Asset),
    ("attributes", Key::Attributes),
    ("baseColorFactor", Key::BaseColorFactor),
    ("baseColorTexture", Key::BaseColorTexture),
    ("buffer", Key::Buffer),
    ("bufferView", Key::BufferView),
    ("bufferViews", Key::BufferViews),
    ("buffers", Key::Buffers),
    ("byteLength", Key::ByteLength),
    ("byteOffset", Key::ByteOffset),
    ("byteStride", Key::ByteStride),
    ("channels", Key::Channels),
    ("children", Key::Children),
    ("componentType", Key::ComponentType),
    ("count", Key::Count),
    ("emissiveFactor", Key::EmissiveFactor),
    ("emissiveTexture", Key::EmissiveTexture),
    ("images", Key::Images),
    ("index", Key::Index),
    ("indices", Key::Indices),
    ("input", Key::Input),
    ("interpolation", Key::Interpolation),
    ("inverseBindMatrices", Key::InverseBindMatrices),
    ("joints", Key::Joints),
    ("magFilter", Key::MagFilter),
    ("material", Key::Material),
    ("materials", Key::Materials),
    ("matrix", Key::Matrix),
    ("max", Key::Max),
    ("mesh", Key::Mesh),
    ("meshes", Key::Meshes),
    ("metallicFactor", Key::MetallicFactor),
    ("metallicRoughnessTexture", Key::MetallicRoughnessTexture),
    ("mimeType", Key::MimeType),
    ("min", Key::Min),
    ("minFilter", Key::MinFilter),
    ("mode", Key::Mode),
    ("node", Key::Node),
    ("nodes", Key::Nodes),
    ("normalTexture", Key::NormalTexture),
    ("normalized", Key::Normalized),
    ("occlusionTexture", Key::OcclusionTexture),
    ("output", Key::Output),
    ("path", Key::Path),
    ("pbrMetallicRoughness", Key::PbrMetallicRoughness),
    ("primitives", Key::Primitives),
    ("rotation", Key::Rotation),
    ("roughnessFactor", Key::RoughnessFactor),
    ("sampler", Key::Sampler),
    ("samplers", Key::Samplers),
    ("scale", Key::Scale),
    ("skeleton", Key::Skeleton),
    ("skin", Key::Skin),
    ("skins", Key::Skins),
    ("source", Key::Source),
    ("target", Key::Target),
    ("textures", Key::Textures),
    ("translation", Key::Translation),
    ("type", Key::Type),
    ("uri", Key::Uri),
    ("version", Key::Version),
    ("wrapS", Key::WrapS),
    ("wrapT", Key::WrapT),
];

impl Key {
    pub(crate) fn lookup(name: &str) -> Self {
        KEY_TABLE
            .binary_search_by(|(entry, _)| entry.as_bytes().cmp(name.as_bytes()))
            .map(|i| KEY_TABLE[i].1)
            .unwrap_or(Key::Unknown)
    }
}

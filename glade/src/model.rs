use std::ops::Range;

/// Contiguous range into one of the scene graph's shared arrays.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Span {
    pub start: u32,
    pub count: u32,
}

impl Span {
    pub fn new(start: u32, count: u32) -> Self {
        Self { start, count }
    }

    pub fn range(self) -> Range<usize> {
        self.start as usize..self.start as usize + self.count as usize
    }

    pub fn len(self) -> usize {
        self.count as usize
    }

    pub fn is_empty(self) -> bool {
        self.count == 0
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    U32,
    F32,
}

impl ComponentType {
    pub(crate) fn from_gltf_code(code: i64) -> Option<Self> {
        match code {
            5120 => Some(Self::I8),
            5121 => Some(Self::U8),
            5122 => Some(Self::I16),
            5123 => Some(Self::U16),
            5125 => Some(Self::U32),
            5126 => Some(Self::F32),
            _ => None,
        }
    }

    /// Size of one component in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::U32 | Self::F32 => 4,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AccessorShape {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorShape {
    pub(crate) fn from_gltf_name(name: &str) -> Option<Self> {
        if name == "SCALAR" {
            return Some(Self::Scalar);
        }
        let (prefix, digit) = match name.as_bytes() {
            [a, b, c, d] => ([*a, *b, *c], *d),
            _ => return None,
        };
        match (&prefix, digit) {
            (b"VEC", b'2') => Some(Self::Vec2),
            (b"VEC", b'3') => Some(Self::Vec3),
            (b"VEC", b'4') => Some(Self::Vec4),
            (b"MAT", b'2') => Some(Self::Mat2),
            (b"MAT", b'3') => Some(Self::Mat3),
            (b"MAT", b'4') => Some(Self::Mat4),
            _ => None,
        }
    }

    pub fn components(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }

    pub fn is_matrix(self) -> bool {
        matches!(self, Self::Mat2 | Self::Mat3 | Self::Mat4)
    }
}

/// Inline `min`/`max` storage for an accessor (at most one value per component).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AccessorBounds {
    values: [f32; 16],
    len: u8,
}

impl AccessorBounds {
    pub const CAPACITY: usize = 16;

    pub(crate) fn new(values: [f32; 16], len: usize) -> Self {
        Self {
            values,
            len: len.min(Self::CAPACITY) as u8,
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values[..self.len as usize]
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Accessor {
    pub view: Option<u32>,
    pub count: usize,
    pub offset: usize,
    pub component_type: ComponentType,
    pub shape: AccessorShape,
    pub normalized: bool,
    pub min: Option<AccessorBounds>,
    pub max: Option<AccessorBounds>,
}

impl Accessor {
    pub fn components(&self) -> usize {
        self.shape.components()
    }

    /// Tightly packed size of one element in bytes.
    pub fn element_size(&self) -> usize {
        self.component_type.size() * self.components()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BufferSource {
    Uri(String),
    /// Backed in place by the GLB `BIN` chunk.
    BinaryChunk,
}

#[derive(Clone, Debug)]
pub(crate) enum BufferData {
    Owned(Vec<u8>),
    /// Payload range inside the retained source bytes.
    Chunk(Range<usize>),
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Buffer {
    pub size: usize,
    pub source: BufferSource,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) data: BufferData,
}

/// Byte window into a buffer.
///
/// `offset` is relative to the buffer's backing storage. For the GLB chunk buffer that is
/// the whole source, so the chunk start is already folded in.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BufferView {
    pub buffer: u32,
    pub offset: usize,
    pub length: usize,
    pub stride: Option<u32>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ImageSource {
    Uri {
        uri: String,
        #[cfg_attr(feature = "serde", serde(skip))]
        bytes: Vec<u8>,
    },
    View {
        view: u32,
        mime_type: Option<String>,
    },
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Image {
    pub source: ImageSource,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TextureFilter {
    Nearest,
    Bilinear,
    #[default]
    Trilinear,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum WrapMode {
    Clamp,
    #[default]
    Repeat,
    MirroredRepeat,
}

impl WrapMode {
    pub(crate) fn from_gltf_code(code: i64) -> Option<Self> {
        match code {
            33071 => Some(Self::Clamp),
            33648 => Some(Self::MirroredRepeat),
            10497 => Some(Self::Repeat),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Sampler {
    pub filter: TextureFilter,
    pub mipmaps: bool,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
}

impl Default for Sampler {
    fn default() -> Self {
        Self {
            filter: TextureFilter::Trilinear,
            mipmaps: true,
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Texture {
    pub image: Option<u32>,
    pub sampler: Option<u32>,
    pub filter: TextureFilter,
    pub mipmaps: bool,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TextureSlot {
    Diffuse,
    Emissive,
    Metalness,
    Roughness,
    Occlusion,
    Normal,
    Environment,
}

impl TextureSlot {
    pub const COUNT: usize = 7;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Diffuse,
        Self::Emissive,
        Self::Metalness,
        Self::Roughness,
        Self::Occlusion,
        Self::Normal,
        Self::Environment,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Material {
    pub metalness: f32,
    pub roughness: f32,
    pub diffuse_color: [f32; 4],
    pub emissive_color: [f32; 4],
    pub textures: [Option<u32>; TextureSlot::COUNT],
}

impl Material {
    pub fn texture(&self, slot: TextureSlot) -> Option<u32> {
        self.textures[slot.index()]
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            metalness: 1.0,
            roughness: 1.0,
            diffuse_color: [1.0, 1.0, 1.0, 1.0],
            emissive_color: [0.0, 0.0, 0.0, 1.0],
            textures: [None; TextureSlot::COUNT],
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DrawMode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl DrawMode {
    pub(crate) fn from_gltf_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Points),
            1 => Some(Self::Lines),
            2 => Some(Self::LineLoop),
            3 => Some(Self::LineStrip),
            4 => Some(Self::Triangles),
            5 => Some(Self::TriangleStrip),
            6 => Some(Self::TriangleFan),
            _ => None,
        }
    }
}

/// Vertex attribute slots a primitive can bind.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Attribute {
    Position,
    Normal,
    TexCoord,
    Color,
    Tangent,
    Joints,
    Weights,
}

impl Attribute {
    pub const COUNT: usize = 7;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Position,
        Self::Normal,
        Self::TexCoord,
        Self::Color,
        Self::Tangent,
        Self::Joints,
        Self::Weights,
    ];

    pub(crate) fn from_gltf_name(name: &str) -> Option<Self> {
        match name {
            "POSITION" => Some(Self::Position),
            "NORMAL" => Some(Self::Normal),
            "TEXCOORD_0" => Some(Self::TexCoord),
            "COLOR_0" => Some(Self::Color),
            "TANGENT" => Some(Self::Tangent),
            "JOINTS_0" => Some(Self::Joints),
            "WEIGHTS_0" => Some(Self::Weights),
            _ => None,
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Primitive {
    pub mode: DrawMode,
    pub attributes: [Option<u32>; Attribute::COUNT],
    pub indices: Option<u32>,
    pub material: Option<u32>,
}

impl Primitive {
    pub fn attribute(&self, attribute: Attribute) -> Option<u32> {
        self.attributes[attribute.index()]
    }
}

impl Default for Primitive {
    fn default() -> Self {
        Self {
            mode: DrawMode::Triangles,
            attributes: [None; Attribute::COUNT],
            indices: None,
            material: None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Mesh {
    pub primitives: Span,
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Node {
    /// Local transform, column-major.
    pub transform: [f32; 16],
    /// World transform, column-major. Equal to `transform` until
    /// [`SceneGraph::resolve_global_transforms`](crate::SceneGraph::resolve_global_transforms) runs.
    pub global_transform: [f32; 16],
    pub children: Span,
    pub mesh: Option<u32>,
    /// Copy of the referenced mesh's primitive range.
    pub primitives: Span,
    pub skin: Option<u32>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Skin {
    pub joints: Span,
    pub skeleton: Option<u32>,
    /// Accessor holding one `MAT4` per joint.
    pub inverse_bind_matrices: Option<u32>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Animation {
    pub channels: Span,
    pub samplers: Span,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AnimationProperty {
    Translation,
    Rotation,
    Scale,
    Weights,
}

impl AnimationProperty {
    pub(crate) fn from_gltf_name(name: &str) -> Option<Self> {
        match name {
            "translation" => Some(Self::Translation),
            "rotation" => Some(Self::Rotation),
            "scale" => Some(Self::Scale),
            "weights" => Some(Self::Weights),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AnimationChannel {
    pub node: Option<u32>,
    pub property: AnimationProperty,
    /// Index into [`SceneGraph::animation_samplers`](crate::SceneGraph::animation_samplers).
    pub sampler: u32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Interpolation {
    Step,
    #[default]
    Linear,
    CubicSpline,
}

impl Interpolation {
    pub(crate) fn from_gltf_name(name: &str) -> Option<Self> {
        match name {
            "STEP" => Some(Self::Step),
            "LINEAR" => Some(Self::Linear),
            "CUBICSPLINE" => Some(Self::CubicSpline),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AnimationSampler {
    pub input: u32,
    pub output: u32,
    pub interpolation: Interpolation,
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to tokenize glTF JSON at byte {offset}: {message}")]
    Tokenize { offset: usize, message: String },

    #[error("expected {expected} at byte {offset}")]
    UnexpectedToken {
        expected: &'static str,
        offset: usize,
    },

    #[error("invalid number '{text}' at byte {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("malformed GLB container: {message}")]
    MalformedContainer { message: String },

    #[error("glTF root value is not an object")]
    InvalidRoot,

    #[error("unsupported or invalid glTF version string: {value}")]
    UnsupportedVersion { value: String },

    #[error("{entity} {index} is missing required member '{field}'")]
    MissingField {
        entity: &'static str,
        index: usize,
        field: &'static str,
    },

    #[error("buffer {buffer} declares {expected} bytes but {actual} are available")]
    BufferSizeMismatch {
        buffer: usize,
        expected: usize,
        actual: usize,
    },

    #[error("bufferView {view} ends at byte {end} of buffer {buffer}, which holds {size}")]
    BufferViewOutOfBounds {
        view: usize,
        buffer: u32,
        end: usize,
        size: usize,
    },

    #[error("buffer {buffer} has no uri and no GLB binary chunk backs it")]
    MissingBufferSource { buffer: usize },

    #[error("image {image} has neither a uri nor a bufferView")]
    MissingImageSource { image: usize },

    #[error("unknown componentType {value} for accessor {accessor}")]
    UnknownComponentType { accessor: usize, value: i64 },

    #[error("unsupported accessor type '{value}' for accessor {accessor}")]
    UnsupportedAccessorShape { accessor: usize, value: String },

    #[error("unknown primitive mode {value}")]
    UnknownDrawMode { value: i64 },

    #[error("unknown wrap mode {value} for sampler {sampler}")]
    UnknownWrapMode { sampler: usize, value: i64 },

    #[error("unknown target path '{value}' for channel {channel} of animation {animation}")]
    UnknownAnimationPath {
        animation: usize,
        channel: usize,
        value: String,
    },

    #[error("node {node} matrix has {found} elements, expected 16")]
    InvalidMatrixSize { node: usize, found: usize },

    #[error("{entity} {index} member '{field}' has {found} elements, expected {expected}")]
    InvalidVectorSize {
        entity: &'static str,
        index: usize,
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{kind} index {index} is out of range (count {count})")]
    InvalidReference {
        kind: &'static str,
        index: u32,
        count: usize,
    },

    #[error("failed to read '{path}': {message}")]
    Io { path: String, message: String },
}

//! Node transforms.
//!
//! Matrices are column-major `[f32; 16]`, the layout glTF uses for `matrix`.

use glam::{Mat4, Quat, Vec3};

pub const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// `identity · translate(t) · rotate(r) · scale(s)`; `r` is an `[x, y, z, w]` quaternion.
pub fn compose_trs(translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> [f32; 16] {
    let [x, y, z, w] = rotation;
    (Mat4::IDENTITY
        * Mat4::from_translation(Vec3::from_array(translation))
        * Mat4::from_quat(Quat::from_xyzw(x, y, z, w))
        * Mat4::from_scale(Vec3::from_array(scale)))
    .to_cols_array()
}

/// `parent · local`.
pub fn multiply(parent: &[f32; 16], local: &[f32; 16]) -> [f32; 16] {
    (Mat4::from_cols_array(parent) * Mat4::from_cols_array(local)).to_cols_array()
}

/// Transforms a point by a column-major matrix.
pub fn transform_point(matrix: &[f32; 16], point: [f32; 3]) -> [f32; 3] {
    Mat4::from_cols_array(matrix)
        .transform_point3(Vec3::from_array(point))
        .to_array()
}

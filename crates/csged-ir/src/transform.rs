//! 4×4 affine transforms stored in wire-compatible form.

use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

/// A 4×4 affine transform as a flat 16-element column-major array.
///
/// Column-major matches the exchange format: the translation lives at
/// indices 12, 13, 14. Serializes as a bare 16-number JSON array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transform(pub [f64; 16]);

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Transform = Transform([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    /// Identity placement.
    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Pure translation by `(x, y, z)`.
    pub fn from_translation(x: f64, y: f64, z: f64) -> Self {
        let mut t = Self::IDENTITY;
        t.0[12] = x;
        t.0[13] = y;
        t.0[14] = z;
        t
    }

    /// The translation component.
    pub fn translation(&self) -> (f64, f64, f64) {
        (self.0[12], self.0[13], self.0[14])
    }

    /// View as an nalgebra matrix.
    pub fn to_matrix(&self) -> Matrix4<f64> {
        Matrix4::from_column_slice(&self.0)
    }

    /// Build from an nalgebra matrix.
    pub fn from_matrix(m: &Matrix4<f64>) -> Self {
        let mut t = [0.0; 16];
        t.copy_from_slice(m.as_slice());
        Transform(t)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

use nalgebra::{Matrix3, Matrix4, Rotation3, Vector3};

/// The 6 scalar parameters of a rigid transform: three rotation angles (in
/// radians) and three translation offsets (in Angstroms).
///
/// Passed by value between components; the "current best" set is state owned
/// by the scoring object, not by this type.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransformParams {
    pub theta: f64,
    pub phi: f64,
    pub psi: f64,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl TransformParams {
    pub const fn new(theta: f64, phi: f64, psi: f64, dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            theta,
            phi,
            psi,
            dx,
            dy,
            dz,
        }
    }

    /// Translation-only parameters with zero rotation.
    pub const fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self::new(0.0, 0.0, 0.0, dx, dy, dz)
    }

    pub fn to_array(self) -> [f64; 6] {
        [self.theta, self.phi, self.psi, self.dx, self.dy, self.dz]
    }

    pub fn from_slice(values: &[f64]) -> Self {
        debug_assert_eq!(values.len(), 6);
        Self::new(
            values[0], values[1], values[2], values[3], values[4], values[5],
        )
    }
}

/// Builds the 4x4 homogeneous rigid transform for the given parameters.
///
/// The rotation block is the composition of three elemental rotations and is
/// proper by construction: det(R) = 1 and det of the full matrix is 1 within
/// floating tolerance for all real angle inputs. The output is a fresh value
/// per call; there is no shared scratch buffer to alias between callers.
pub fn matrix_from(params: &TransformParams) -> Matrix4<f64> {
    let (sx, cx) = params.theta.sin_cos();
    let (sy, cy) = params.phi.sin_cos();
    let (sz, cz) = params.psi.sin_cos();

    Matrix4::new(
        cx * cz - sx * cy * sz,
        cx * sz + sx * cy * cz,
        sx * sy,
        params.dx,
        -sx * cz - cx * cy * sz,
        -sx * sz + cx * cy * cz,
        cx * sy,
        params.dy,
        sy * sz,
        -sy * cz,
        cy,
        params.dz,
        0.0,
        0.0,
        0.0,
        1.0,
    )
}

/// Recovers (theta, phi, psi) from a rotation matrix using the fixed
/// extraction theta = atan2(r21, r22), phi = atan2(-r20, hypot(r21, r22)),
/// psi = atan2(r10, r00).
///
/// This extraction is a heuristic used only to seed the optimizer; the
/// optimizer is expected to refine whatever convention mismatch remains.
pub fn euler_angles_from(rotation: &Matrix3<f64>) -> (f64, f64, f64) {
    let theta = rotation[(2, 1)].atan2(rotation[(2, 2)]);
    let phi = (-rotation[(2, 0)]).atan2(rotation[(2, 1)].hypot(rotation[(2, 2)]));
    let psi = rotation[(1, 0)].atan2(rotation[(0, 0)]);
    (theta, phi, psi)
}

/// Rotation taking `from` onto `to`, or `None` when the two directions are
/// antiparallel (zero cross-product norm) and the axis is undefined.
pub fn rotation_between(from: &Vector3<f64>, to: &Vector3<f64>) -> Option<Rotation3<f64>> {
    Rotation3::rotation_between(from, to)
}

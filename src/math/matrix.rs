use super::{Quat, Vec3};

/// 4x4 matrix for transformations (column-major for WebGL)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub data: [f32; 16],
}

impl Mat4 {
    pub fn identity() -> Self {
        Self {
            data: [
                1.0, 0.0, 0.0, 0.0,
                0.0, 1.0, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        let mut m = Self::identity();
        m.data[12] = x;
        m.data[13] = y;
        m.data[14] = z;
        m
    }

    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        let mut m = Self::identity();
        m.data[0] = x;
        m.data[5] = y;
        m.data[10] = z;
        m
    }

    /// Rotation matrix of a unit quaternion
    pub fn from_quat(q: Quat) -> Self {
        let Quat { w, x, y, z } = q;
        let (xx, yy, zz) = (x * x, y * y, z * z);
        let (xy, xz, yz) = (x * y, x * z, y * z);
        let (wx, wy, wz) = (w * x, w * y, w * z);

        Self {
            data: [
                1.0 - 2.0 * (yy + zz), 2.0 * (xy + wz), 2.0 * (xz - wy), 0.0,
                2.0 * (xy - wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz + wx), 0.0,
                2.0 * (xz + wy), 2.0 * (yz - wx), 1.0 - 2.0 * (xx + yy), 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    /// Translation * rotation * uniform scale
    pub fn from_trs(translation: Vec3, rotation: Quat, scale: f32) -> Self {
        Self::translation(translation.x, translation.y, translation.z)
            .mul(&Self::from_quat(rotation))
            .mul(&Self::scale(scale, scale, scale))
    }

    /// Perspective projection matrix
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (fov_y / 2.0).tan();
        let nf = 1.0 / (near - far);

        Self {
            data: [
                f / aspect, 0.0, 0.0, 0.0,
                0.0, f, 0.0, 0.0,
                0.0, 0.0, (far + near) * nf, -1.0,
                0.0, 0.0, 2.0 * far * near * nf, 0.0,
            ],
        }
    }

    /// Look-at view matrix
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let f = (target - eye).normalize();
        let r = f.cross(&up).normalize();
        let u = r.cross(&f);

        Self {
            data: [
                r.x, u.x, -f.x, 0.0,
                r.y, u.y, -f.y, 0.0,
                r.z, u.z, -f.z, 0.0,
                -r.dot(&eye), -u.dot(&eye), f.dot(&eye), 1.0,
            ],
        }
    }

    pub fn mul(&self, other: &Mat4) -> Self {
        let mut result = [0.0f32; 16];

        for row in 0..4 {
            for col in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.data[row + k * 4] * other.data[k + col * 4];
                }
                result[row + col * 4] = sum;
            }
        }

        Self { data: result }
    }

    /// Transform a point (applies translation)
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            self.data[0] * p.x + self.data[4] * p.y + self.data[8] * p.z + self.data[12],
            self.data[1] * p.x + self.data[5] * p.y + self.data[9] * p.z + self.data[13],
            self.data[2] * p.x + self.data[6] * p.y + self.data[10] * p.z + self.data[14],
        )
    }

    pub fn as_slice(&self) -> &[f32; 16] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_translation() {
        let result = Mat4::translation(1.0, 2.0, 3.0).transform_point(Vec3::ZERO);
        assert_abs_diff_eq!(result.x, 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(result.y, 2.0, epsilon = 1e-4);
        assert_abs_diff_eq!(result.z, 3.0, epsilon = 1e-4);
    }

    #[test]
    fn test_matrix_mul() {
        let t = Mat4::translation(1.0, 0.0, 0.0);
        let s = Mat4::scale(2.0, 2.0, 2.0);
        let result = t.mul(&s).transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(result.x, 3.0, epsilon = 1e-4);
    }

    #[test]
    fn test_from_quat_matches_quat_rotation() {
        let q = Quat::from_axes_and_angles(Vec3::new(0.3, 1.0, 0.2), 40.0, Vec3::RIGHT, 75.0);
        let v = Vec3::new(0.5, -1.0, 2.0);
        let by_matrix = Mat4::from_quat(q).transform_point(v);
        let by_quat = q.rotate_vector(v);
        assert_abs_diff_eq!(by_matrix.x, by_quat.x, epsilon = 1e-4);
        assert_abs_diff_eq!(by_matrix.y, by_quat.y, epsilon = 1e-4);
        assert_abs_diff_eq!(by_matrix.z, by_quat.z, epsilon = 1e-4);
    }

    #[test]
    fn test_trs_order() {
        let q = Quat::from_axis_and_angle(Vec3::FORWARD, 90.0);
        let m = Mat4::from_trs(Vec3::new(0.0, 5.0, 0.0), q, 2.0);
        // scale first, then rotate X onto Y, then translate
        let p = m.transform_point(Vec3::RIGHT);
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(p.y, 7.0, epsilon = 1e-4);
    }
}

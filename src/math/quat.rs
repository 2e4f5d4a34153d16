use std::ops::Mul;
use super::Vec3;

/// Unit quaternion for orientations. Angles taken in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Quat = Quat { w: 1.0, x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    /// Rotation of `degrees` around `axis` (normalized internally)
    pub fn from_axis_and_angle(axis: Vec3, degrees: f32) -> Self {
        let axis = axis.normalize();
        let (s, c) = (degrees.to_radians() * 0.5).sin_cos();
        Self::new(c, axis.x * s, axis.y * s, axis.z * s).normalize()
    }

    /// Combined rotation: first `angle1` around `axis1`, then `angle2` around `axis2`
    pub fn from_axes_and_angles(axis1: Vec3, angle1: f32, axis2: Vec3, angle2: f32) -> Self {
        let q1 = Self::from_axis_and_angle(axis1, angle1);
        let q2 = Self::from_axis_and_angle(axis2, angle2);
        q2 * q1
    }

    pub fn length(&self) -> f32 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self::new(self.w / len, self.x / len, self.y / len, self.z / len)
        } else {
            Self::IDENTITY
        }
    }

    pub fn conjugate(&self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    pub fn rotate_vector(&self, v: Vec3) -> Vec3 {
        let p = Quat::new(0.0, v.x, v.y, v.z);
        let r = *self * p * self.conjugate();
        Vec3::new(r.x, r.y, r.z)
    }
}

impl Mul for Quat {
    type Output = Self;

    fn mul(self, o: Self) -> Self {
        Self::new(
            self.w * o.w - self.x * o.x - self.y * o.y - self.z * o.z,
            self.w * o.x + self.x * o.w + self.y * o.z - self.z * o.y,
            self.w * o.y - self.x * o.z + self.y * o.w + self.z * o.x,
            self.w * o.z + self.x * o.y - self.y * o.x + self.z * o.w,
        )
    }
}

use crate::math::{Mat4, Quat, Vec3};

/// Translation, uniform scale and rotation of one entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub scale: f32,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            scale: 1.0,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    /// Model matrix (translate * rotate * scale)
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_trs(self.translation, self.rotation, self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        assert_eq!(Transform::default().matrix(), Mat4::identity());
    }

    #[test]
    fn test_matrix_places_origin_at_translation() {
        let mut t = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0));
        t.set_scale(0.5);
        t.set_rotation(Quat::from_axis_and_angle(Vec3::UP, 45.0));
        let p = t.matrix().transform_point(Vec3::ZERO);
        assert!((p - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);
    }
}

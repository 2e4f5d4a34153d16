use crate::color::Color;

/// Phong shading parameters; only the diffuse colour changes at runtime
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhongMaterial {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub shininess: f32,
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self {
            ambient: Color::rgb(13, 13, 13),
            diffuse: Color::GRAY,
            specular: Color::rgb(3, 3, 3),
            shininess: 150.0,
        }
    }
}

impl PhongMaterial {
    pub fn with_diffuse(diffuse: Color) -> Self {
        Self {
            diffuse,
            ..Default::default()
        }
    }

    pub fn set_diffuse(&mut self, diffuse: Color) {
        self.diffuse = diffuse;
    }
}

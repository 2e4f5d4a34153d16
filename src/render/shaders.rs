//! GLSL ES 3.0 sources
//!
//! Bark and leaves share the vertex layout of [`crate::mesh::Vertex`] at
//! locations 0..=3. The leaf program additionally reads a per-instance model
//! matrix (locations 4..=7) and diffuse colour (location 8).

/// Attribute locations shared by both programs
pub const ATTRIB_POSITION: u32 = 0;
pub const ATTRIB_NORMAL: u32 = 1;
pub const ATTRIB_UV: u32 = 2;
pub const ATTRIB_SHADE: u32 = 3;
/// First of four vec4 columns
pub const ATTRIB_INSTANCE_MODEL: u32 = 4;
pub const ATTRIB_INSTANCE_COLOR: u32 = 8;

/// Vertex shader for the bark
pub const BARK_VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec2 a_uv;
layout(location = 3) in float a_shade;

uniform mat4 u_view;
uniform mat4 u_projection;

out vec3 v_position;
out vec3 v_normal;
out vec2 v_uv;
out float v_shade;

void main() {
    v_position = a_position;
    v_normal = a_normal;
    v_uv = a_uv;
    v_shade = a_shade;
    gl_Position = u_projection * u_view * vec4(a_position, 1.0);
}
"#;

/// Fragment shader for bark: procedural grain under one directional light
pub const BARK_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec3 v_position;
in vec3 v_normal;
in vec2 v_uv;
in float v_shade;

uniform vec3 u_camera_pos;
uniform vec3 u_light_dir;
uniform float u_ambient_strength;

out vec4 fragColor;

float hash(vec3 p) {
    p = fract(p * vec3(443.897, 441.423, 437.195));
    p += dot(p, p.yxz + 19.19);
    return fract((p.x + p.y) * p.z);
}

float noise(vec3 p) {
    vec3 i = floor(p);
    vec3 f = fract(p);
    f = f * f * (3.0 - 2.0 * f);

    return mix(
        mix(mix(hash(i + vec3(0,0,0)), hash(i + vec3(1,0,0)), f.x),
            mix(hash(i + vec3(0,1,0)), hash(i + vec3(1,1,0)), f.x), f.y),
        mix(mix(hash(i + vec3(0,0,1)), hash(i + vec3(1,0,1)), f.x),
            mix(hash(i + vec3(0,1,1)), hash(i + vec3(1,1,1)), f.x), f.y),
        f.z
    );
}

float fbm(vec3 p) {
    float value = 0.0;
    float amplitude = 0.5;
    for (int i = 0; i < 4; i++) {
        value += amplitude * noise(p);
        p *= 2.0;
        amplitude *= 0.5;
    }
    return value;
}

void main() {
    vec3 normal = normalize(v_normal);
    vec3 view_dir = normalize(u_camera_pos - v_position);
    vec3 light_dir = normalize(u_light_dir);

    vec3 dark_bark = vec3(0.15, 0.10, 0.07);
    vec3 mid_bark = vec3(0.35, 0.25, 0.18);
    vec3 light_bark = vec3(0.50, 0.40, 0.30);

    // Grain runs along the branch (v), wraps around it (u)
    vec3 grain_pos = vec3(v_uv.x * 6.0, v_uv.y * 1.5, v_position.y);
    float grain = fbm(grain_pos * 3.0);
    float detail = fbm(v_position * 12.0) * 0.3;
    float pattern = grain + detail;

    vec3 bark = mix(dark_bark, mid_bark, pattern);
    bark = mix(bark, light_bark, smoothstep(0.5, 0.8, pattern));
    bark *= v_shade;

    float ndotl = max(dot(normal, light_dir), 0.0);
    float ao = 0.5 + 0.5 * grain;
    vec3 ambient = vec3(0.4, 0.45, 0.5) * u_ambient_strength * ao;

    vec3 half_dir = normalize(light_dir + view_dir);
    float spec = pow(max(dot(normal, half_dir), 0.0), 16.0) * 0.08;

    vec3 color = ambient * bark + bark * ndotl * 0.8 + vec3(spec);
    color = color / (color + vec3(1.0));
    color = pow(color, vec3(1.0 / 2.2));

    fragColor = vec4(color, 1.0);
}
"#;

/// Vertex shader for leaves and the ground.
///
/// With instancing off, the instance attributes are fed as constants per draw.
pub const LEAF_VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec2 a_uv;
layout(location = 3) in float a_shade;
layout(location = 4) in mat4 a_model;
layout(location = 8) in vec3 a_color;

uniform mat4 u_view;
uniform mat4 u_projection;

out vec3 v_world_position;
out vec3 v_normal;
out vec3 v_color;
out float v_shade;

void main() {
    vec4 world = a_model * vec4(a_position, 1.0);
    v_world_position = world.xyz;
    v_normal = mat3(a_model) * a_normal;
    v_color = a_color;
    v_shade = a_shade;
    gl_Position = u_projection * u_view * world;
}
"#;

/// Phong fragment shader; diffuse colour comes from the instance
pub const LEAF_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec3 v_world_position;
in vec3 v_normal;
in vec3 v_color;
in float v_shade;

uniform vec3 u_camera_pos;
uniform vec3 u_light_dir;
uniform vec3 u_ambient;
uniform vec3 u_specular;
uniform float u_shininess;

out vec4 fragColor;

void main() {
    vec3 normal = normalize(v_normal);
    vec3 view_dir = normalize(u_camera_pos - v_world_position);
    // Blades are thin; light whichever face looks at the camera
    if (dot(normal, view_dir) < 0.0) {
        normal = -normal;
    }
    vec3 light_dir = normalize(u_light_dir);

    float ndotl = max(dot(normal, light_dir), 0.0);
    vec3 reflected = reflect(-light_dir, normal);
    float spec = pow(max(dot(view_dir, reflected), 0.0), u_shininess);

    vec3 diffuse = v_color * v_shade;
    vec3 color = u_ambient + diffuse * (0.35 + 0.65 * ndotl) + u_specular * spec;

    fragColor = vec4(pow(color, vec3(1.0 / 2.2)), 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_version() {
        for src in [
            BARK_VERTEX_SHADER,
            BARK_FRAGMENT_SHADER,
            LEAF_VERTEX_SHADER,
            LEAF_FRAGMENT_SHADER,
        ] {
            assert!(src.starts_with("#version 300 es"));
        }
    }

    #[test]
    fn test_locations_match_constants() {
        let declared = |loc: u32| format!("layout(location = {})", loc);
        for loc in [ATTRIB_POSITION, ATTRIB_NORMAL, ATTRIB_UV, ATTRIB_SHADE] {
            assert!(BARK_VERTEX_SHADER.contains(&declared(loc)));
            assert!(LEAF_VERTEX_SHADER.contains(&declared(loc)));
        }
        assert!(LEAF_VERTEX_SHADER.contains(&format!("{} in mat4 a_model", declared(ATTRIB_INSTANCE_MODEL))));
        assert!(LEAF_VERTEX_SHADER.contains(&format!("{} in vec3 a_color", declared(ATTRIB_INSTANCE_COLOR))));
    }
}

use web_sys::{
    WebGl2RenderingContext, WebGlBuffer, WebGlProgram, WebGlUniformLocation,
    WebGlVertexArrayObject,
};
use crate::animation::Season;
use crate::color::Color;
use crate::math::{Mat4, Vec3};
use crate::mesh::Mesh;
use crate::scene::{InstancedMesh, PhongMaterial};
use crate::tree::Tree;
use super::shaders::*;
use super::webgl::WebGLContext;

const LIGHT_DIR: [f32; 3] = [0.5, 1.0, 0.3];
const GROUND_COLOR: Color = Color::rgb(92, 120, 64);

/// Cached uniform locations for the bark shader
struct BarkUniforms {
    view: Option<WebGlUniformLocation>,
    projection: Option<WebGlUniformLocation>,
    camera_pos: Option<WebGlUniformLocation>,
    light_dir: Option<WebGlUniformLocation>,
    ambient_strength: Option<WebGlUniformLocation>,
}

/// Cached uniform locations for the leaf shader
struct LeafUniforms {
    view: Option<WebGlUniformLocation>,
    projection: Option<WebGlUniformLocation>,
    camera_pos: Option<WebGlUniformLocation>,
    light_dir: Option<WebGlUniformLocation>,
    ambient: Option<WebGlUniformLocation>,
    specular: Option<WebGlUniformLocation>,
    shininess: Option<WebGlUniformLocation>,
}

/// GPU copy of one indexed mesh
struct MeshBuffers {
    vao: WebGlVertexArrayObject,
    vertex_buffer: WebGlBuffer,
    index_buffer: WebGlBuffer,
    index_count: i32,
}

/// Render pipeline for the tree, its leaves, and the ground
pub struct RenderPipeline {
    ctx: WebGLContext,

    bark_program: WebGlProgram,
    leaf_program: WebGlProgram,
    bark_uniforms: BarkUniforms,
    leaf_uniforms: LeafUniforms,

    bark: Option<MeshBuffers>,
    leaf: Option<MeshBuffers>,
    /// Present only when the leaf mesh is instanced
    instance_buffer: Option<WebGlBuffer>,
    ground: Option<MeshBuffers>,

    width: i32,
    height: i32,

    // Camera state
    pub camera_position: Vec3,
    pub camera_target: Vec3,
    pub fov: f32,
}

impl RenderPipeline {
    pub fn new(gl: WebGl2RenderingContext, width: i32, height: i32) -> Result<Self, String> {
        let ctx = WebGLContext::new(gl);

        let bark_program = ctx.create_program(BARK_VERTEX_SHADER, BARK_FRAGMENT_SHADER)?;
        let leaf_program = ctx.create_program(LEAF_VERTEX_SHADER, LEAF_FRAGMENT_SHADER)?;

        let bark_uniforms = BarkUniforms {
            view: ctx.get_uniform_location(&bark_program, "u_view"),
            projection: ctx.get_uniform_location(&bark_program, "u_projection"),
            camera_pos: ctx.get_uniform_location(&bark_program, "u_camera_pos"),
            light_dir: ctx.get_uniform_location(&bark_program, "u_light_dir"),
            ambient_strength: ctx.get_uniform_location(&bark_program, "u_ambient_strength"),
        };

        let leaf_uniforms = LeafUniforms {
            view: ctx.get_uniform_location(&leaf_program, "u_view"),
            projection: ctx.get_uniform_location(&leaf_program, "u_projection"),
            camera_pos: ctx.get_uniform_location(&leaf_program, "u_camera_pos"),
            light_dir: ctx.get_uniform_location(&leaf_program, "u_light_dir"),
            ambient: ctx.get_uniform_location(&leaf_program, "u_ambient"),
            specular: ctx.get_uniform_location(&leaf_program, "u_specular"),
            shininess: ctx.get_uniform_location(&leaf_program, "u_shininess"),
        };

        log::info!("WebGL2 pipeline ready at {}x{}", width, height);

        Ok(Self {
            ctx,
            bark_program,
            leaf_program,
            bark_uniforms,
            leaf_uniforms,
            bark: None,
            leaf: None,
            instance_buffer: None,
            ground: None,
            width,
            height,
            camera_position: Vec3::new(0.0, 4.0, 10.0),
            camera_target: Vec3::new(0.0, 3.0, 0.0),
            fov: std::f32::consts::FRAC_PI_4,
        })
    }

    fn upload_mesh(&self, mesh: &Mesh) -> Result<MeshBuffers, String> {
        let gl = &self.ctx.gl;

        let vao = self.ctx.create_vao()?;
        gl.bind_vertex_array(Some(&vao));

        let vertex_buffer = self.ctx.create_buffer_f32(&mesh.vertex_data(), WebGl2RenderingContext::STATIC_DRAW)?;
        let index_data = mesh.index_data();
        let index_buffer = self.ctx.create_index_buffer(index_data, WebGl2RenderingContext::STATIC_DRAW)?;

        gl.bind_buffer(WebGl2RenderingContext::ARRAY_BUFFER, Some(&vertex_buffer));
        gl.bind_buffer(WebGl2RenderingContext::ELEMENT_ARRAY_BUFFER, Some(&index_buffer));
        self.ctx.vertex_layout();

        gl.bind_vertex_array(None);

        Ok(MeshBuffers {
            vao,
            vertex_buffer,
            index_buffer,
            index_count: index_data.len() as i32,
        })
    }

    fn release(&self, buffers: Option<MeshBuffers>) {
        if let Some(b) = buffers {
            let gl = &self.ctx.gl;
            gl.delete_vertex_array(Some(&b.vao));
            gl.delete_buffer(Some(&b.vertex_buffer));
            gl.delete_buffer(Some(&b.index_buffer));
        }
    }

    /// Replace the bark geometry
    pub fn upload_bark(&mut self, mesh: &Mesh) -> Result<(), String> {
        let buffers = self.upload_mesh(mesh)?;
        let old = self.bark.replace(buffers);
        self.release(old);
        Ok(())
    }

    pub fn upload_ground(&mut self, mesh: &Mesh) -> Result<(), String> {
        let buffers = self.upload_mesh(mesh)?;
        let old = self.ground.replace(buffers);
        self.release(old);
        Ok(())
    }

    /// Upload the shared leaf geometry, plus an instance buffer when instanced
    pub fn upload_leaf_mesh(&mut self, mesh: &InstancedMesh) -> Result<(), String> {
        let buffers = self.upload_mesh(mesh.geometry())?;

        if let Some(old) = self.instance_buffer.take() {
            self.ctx.gl.delete_buffer(Some(&old));
        }
        if mesh.is_instanced() {
            let gl = &self.ctx.gl;
            gl.bind_vertex_array(Some(&buffers.vao));
            let instances = self.ctx.create_buffer_f32(&[], WebGl2RenderingContext::DYNAMIC_DRAW)?;
            gl.bind_buffer(WebGl2RenderingContext::ARRAY_BUFFER, Some(&instances));
            self.ctx.instance_layout(&[
                (ATTRIB_INSTANCE_MODEL, 4),
                (ATTRIB_INSTANCE_MODEL + 1, 4),
                (ATTRIB_INSTANCE_MODEL + 2, 4),
                (ATTRIB_INSTANCE_MODEL + 3, 4),
                (ATTRIB_INSTANCE_COLOR, 3),
            ]);
            gl.bind_vertex_array(None);
            self.instance_buffer = Some(instances);
        }

        let old = self.leaf.replace(buffers);
        self.release(old);
        Ok(())
    }

    /// Upload per-leaf model matrices and colours for the instanced draw
    pub fn update_instances(&self, data: &[f32]) {
        if let Some(ref buffer) = self.instance_buffer {
            self.ctx.update_buffer_f32(buffer, data, WebGl2RenderingContext::DYNAMIC_DRAW);
        }
    }

    /// Render a frame
    pub fn render(&self, tree: &Tree) {
        let gl = &self.ctx.gl;

        let aspect = self.width as f32 / self.height.max(1) as f32;
        let projection = Mat4::perspective(self.fov, aspect, 0.1, 100.0);
        let view = Mat4::look_at(self.camera_position, self.camera_target, Vec3::UP);
        let camera = self.camera_position.to_array();

        self.ctx.viewport(0, 0, self.width, self.height);
        let [r, g, b] = sky_color(tree.season());
        self.ctx.clear(r, g, b, 1.0);
        self.ctx.enable_depth_test();

        if let Some(ref bark) = self.bark {
            gl.use_program(Some(&self.bark_program));
            self.ctx.uniform_matrix4fv(self.bark_uniforms.view.as_ref(), view.as_slice());
            self.ctx.uniform_matrix4fv(self.bark_uniforms.projection.as_ref(), projection.as_slice());
            self.ctx.uniform_3f(self.bark_uniforms.camera_pos.as_ref(), camera);
            self.ctx.uniform_3f(self.bark_uniforms.light_dir.as_ref(), LIGHT_DIR);
            self.ctx.uniform_1f(self.bark_uniforms.ambient_strength.as_ref(), 0.6);

            gl.bind_vertex_array(Some(&bark.vao));
            gl.draw_elements_with_i32(
                WebGl2RenderingContext::TRIANGLES,
                bark.index_count,
                WebGl2RenderingContext::UNSIGNED_INT,
                0,
            );
        }

        gl.use_program(Some(&self.leaf_program));
        let material = PhongMaterial::default();
        self.ctx.uniform_matrix4fv(self.leaf_uniforms.view.as_ref(), view.as_slice());
        self.ctx.uniform_matrix4fv(self.leaf_uniforms.projection.as_ref(), projection.as_slice());
        self.ctx.uniform_3f(self.leaf_uniforms.camera_pos.as_ref(), camera);
        self.ctx.uniform_3f(self.leaf_uniforms.light_dir.as_ref(), LIGHT_DIR);
        self.ctx.uniform_3f(self.leaf_uniforms.ambient.as_ref(), material.ambient.to_rgb_f32());
        self.ctx.uniform_3f(self.leaf_uniforms.specular.as_ref(), material.specular.to_rgb_f32());
        self.ctx.uniform_1f(self.leaf_uniforms.shininess.as_ref(), material.shininess);

        if let Some(ref ground) = self.ground {
            gl.bind_vertex_array(Some(&ground.vao));
            self.ctx.constant_matrix4(ATTRIB_INSTANCE_MODEL, Mat4::identity().as_slice());
            self.ctx.constant_vec3(ATTRIB_INSTANCE_COLOR, GROUND_COLOR.to_rgb_f32());
            gl.draw_elements_with_i32(
                WebGl2RenderingContext::TRIANGLES,
                ground.index_count,
                WebGl2RenderingContext::UNSIGNED_INT,
                0,
            );
        }

        if let Some(ref leaf) = self.leaf {
            gl.bind_vertex_array(Some(&leaf.vao));
            if self.instance_buffer.is_some() {
                let count = tree.instance_count().min(tree.live_leaves());
                if count > 0 {
                    gl.draw_elements_instanced_with_i32(
                        WebGl2RenderingContext::TRIANGLES,
                        leaf.index_count,
                        WebGl2RenderingContext::UNSIGNED_INT,
                        0,
                        count as i32,
                    );
                }
            } else {
                for (_, l) in tree.leaves() {
                    self.ctx.constant_matrix4(ATTRIB_INSTANCE_MODEL, l.transform().matrix().as_slice());
                    self.ctx.constant_vec3(ATTRIB_INSTANCE_COLOR, l.material().diffuse.to_rgb_f32());
                    gl.draw_elements_with_i32(
                        WebGl2RenderingContext::TRIANGLES,
                        leaf.index_count,
                        WebGl2RenderingContext::UNSIGNED_INT,
                        0,
                    );
                }
            }
        }

        gl.bind_vertex_array(None);
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
    }
}

/// Background colour per season
fn sky_color(season: Season) -> [f32; 3] {
    match season {
        Season::Spring => [0.62, 0.78, 0.90],
        Season::Summer => [0.55, 0.75, 0.95],
        Season::Autumn | Season::LeafFall => [0.78, 0.74, 0.66],
        Season::Winter => [0.80, 0.83, 0.87],
    }
}

use wasm_bindgen::prelude::*;
use web_sys::{WebGl2RenderingContext, HtmlCanvasElement};

pub mod animation;
pub mod color;
pub mod config;
pub mod error;
pub mod growth;
pub mod logging;
pub mod math;
pub mod mesh;
pub mod render;
pub mod scene;
pub mod tree;

pub use config::TreeConfig;
pub use error::TreeError;
pub use tree::Tree;

use math::Vec3;
use mesh::ground_disc;
use render::RenderPipeline;

const GROUND_RADIUS: f32 = 12.0;
const GROUND_SEGMENTS: usize = 48;

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

/// Main engine state exposed to JavaScript
#[wasm_bindgen]
pub struct SeasonalTree {
    pipeline: RenderPipeline,
    tree: Tree,
    // Camera orbit controls
    camera_distance: f32,
    camera_angle_x: f32,
    camera_angle_y: f32,
    camera_target: Vec3,
}

#[wasm_bindgen]
impl SeasonalTree {
    /// Create an engine on `canvas`; `config_yaml` overrides the defaults
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config_yaml: Option<String>) -> std::result::Result<SeasonalTree, JsValue> {
        let width = canvas.width() as i32;
        let height = canvas.height() as i32;

        let gl = canvas
            .get_context("webgl2")?
            .ok_or("Failed to get WebGL2 context")?
            .dyn_into::<WebGl2RenderingContext>()?;

        let config = TreeConfig::from_yaml(config_yaml.as_deref().unwrap_or(""))?;
        let mut tree = Tree::new(config)?;

        let mut pipeline = RenderPipeline::new(gl, width, height).map_err(TreeError::Render)?;
        pipeline.upload_ground(&ground_disc(GROUND_RADIUS, GROUND_SEGMENTS)).map_err(TreeError::Render)?;
        pipeline.upload_leaf_mesh(tree.leaf_mesh()).map_err(TreeError::Render)?;
        pipeline.upload_bark(&tree.bark_mesh()).map_err(TreeError::Render)?;
        tree.take_bark_dirty();

        Ok(Self {
            pipeline,
            tree,
            camera_distance: 14.0,
            camera_angle_x: 0.25,
            camera_angle_y: 0.0,
            camera_target: Vec3::new(0.0, 3.5, 0.0),
        })
    }

    /// Advance the simulation by `dt` seconds and render a frame
    #[wasm_bindgen]
    pub fn render(&mut self, dt: f32) -> std::result::Result<(), JsValue> {
        self.tree.update(dt);

        if self.tree.take_bark_dirty() {
            self.pipeline
                .upload_bark(&self.tree.bark_mesh())
                .map_err(TreeError::Render)?;
        }
        if self.tree.leaf_mesh().is_instanced() {
            self.pipeline.update_instances(&self.tree.leaf_instance_data());
        }

        // Update camera position from orbit angles
        let cos_x = self.camera_angle_x.cos();
        let sin_x = self.camera_angle_x.sin();
        let cos_y = self.camera_angle_y.cos();
        let sin_y = self.camera_angle_y.sin();

        self.pipeline.camera_position = Vec3::new(
            self.camera_target.x + self.camera_distance * cos_x * sin_y,
            self.camera_target.y + self.camera_distance * sin_x,
            self.camera_target.z + self.camera_distance * cos_x * cos_y,
        );
        self.pipeline.camera_target = self.camera_target;

        self.pipeline.render(&self.tree);
        Ok(())
    }

    /// Resize the canvas
    #[wasm_bindgen]
    pub fn resize(&mut self, width: i32, height: i32) {
        self.pipeline.resize(width, height);
    }

    /// Orbit camera
    #[wasm_bindgen]
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        self.camera_angle_y += delta_x * 0.01;
        self.camera_angle_x = (self.camera_angle_x + delta_y * 0.01)
            .clamp(-std::f32::consts::FRAC_PI_2 + 0.1, std::f32::consts::FRAC_PI_2 - 0.1);
    }

    /// Zoom camera
    #[wasm_bindgen]
    pub fn zoom(&mut self, delta: f32) {
        self.camera_distance = (self.camera_distance + delta * 0.5).clamp(3.0, 30.0);
    }

    /// Pan camera target
    #[wasm_bindgen]
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let right = Vec3::new(
            self.camera_angle_y.cos(),
            0.0,
            -self.camera_angle_y.sin(),
        );

        self.camera_target = self.camera_target
            + right.scale(-delta_x * 0.01)
            + Vec3::UP.scale(delta_y * 0.01);
    }

    /// Grow a fresh tree from a seedling
    #[wasm_bindgen]
    pub fn restart(&mut self) {
        self.tree.restart();
    }

    /// Skip to the next season
    #[wasm_bindgen]
    pub fn advance_season(&mut self) {
        self.tree.advance_season();
    }

    /// Current season name, e.g. "leaf-fall"
    #[wasm_bindgen]
    pub fn season(&self) -> String {
        self.tree.season().to_string()
    }

    /// Leaves alive right now, hanging or falling
    #[wasm_bindgen]
    pub fn leaf_count(&self) -> u32 {
        self.tree.entity_count() as u32
    }

    /// Instances the leaf draw call renders (0 when instancing is off)
    #[wasm_bindgen]
    pub fn instance_count(&self) -> u32 {
        self.tree.instance_count() as u32
    }

    #[wasm_bindgen]
    pub fn growth_progress(&self) -> f32 {
        self.tree.growth_progress()
    }

    /// Fraction of the current season elapsed
    pub fn season_progress(&self) -> f32 {
        self.tree.season_progress()
    }
}

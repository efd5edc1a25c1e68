//! The two picker canvases: saturation/value plane and hue bar.
//!
//! Each canvas owns an independent device/program/scene triple; neither
//! touches the other's GPU state. Every selection change replaces both
//! materials' uniform lists with the controller's arrays and redraws.

use hueplot_core::histogram::HueHistogram;
use hueplot_core::picker::PickerController;

use crate::device::{GpuError, GraphicsDevice};
use crate::geometry::Geometry;
use crate::material::{Material, UniformEntry};
use crate::scene::{Camera, Renderable, RenderableHandle, Scene};

/// Saturation/value plane canvas size in pixels (square).
pub const PLANE_SIZE: u32 = 200;

/// Hue bar canvas size in pixels.
pub const BAR_WIDTH: u32 = 200;
pub const BAR_HEIGHT: u32 = 10;

const SV_PLANE_FRAGMENT: &str = include_str!("../shaders/sv_plane_frag.wgsl");
const HUE_BAR_FRAGMENT: &str = include_str!("../shaders/hue_bar_frag.wgsl");

struct PickerCanvas {
    device: GraphicsDevice,
    scene: Scene,
    quad: RenderableHandle,
}

impl PickerCanvas {
    fn new(width: u32, height: u32, fragment_body: &str) -> Result<Self, GpuError> {
        let device = GraphicsDevice::new(width, height)?;
        let program = device.compile_program(None, Some(fragment_body))?;

        let mut scene = Scene::new();
        scene.set_camera(Camera::new());
        let quad = scene.add_renderable(Renderable::new(
            &device,
            &Geometry::unit_quad(),
            Material::new(&device, program),
        ));

        Ok(Self {
            device,
            scene,
            quad,
        })
    }

    fn replace_uniforms(&mut self, entries: Vec<UniformEntry>) {
        let Some(renderable) = self.scene.renderable_mut(self.quad) else {
            return;
        };
        let material = renderable.material_mut();
        material.clear_uniforms();
        for entry in entries {
            material.add_uniform(entry);
        }
    }

    fn render(&self) {
        self.scene.render(&self.device);
    }
}

/// Renders the histogram visualization for one analyzed image.
pub struct PickerView {
    plane: PickerCanvas,
    bar: PickerCanvas,
}

impl PickerView {
    /// Create both canvases and render an initial empty frame.
    ///
    /// Fails with [`GpuError`] when no GPU context is available; the
    /// caller shows the rest of the analyzer without the picker.
    pub fn new() -> Result<Self, GpuError> {
        let plane = PickerCanvas::new(PLANE_SIZE, PLANE_SIZE, SV_PLANE_FRAGMENT)?;
        let bar = PickerCanvas::new(BAR_WIDTH, BAR_HEIGHT, HUE_BAR_FRAGMENT)?;

        plane.render();
        bar.render();

        Ok(Self { plane, bar })
    }

    /// Rebuild both materials' uniform lists from the current selection
    /// and redraw both scenes.
    ///
    /// Invoked on every hue or picked-color change, which can happen many
    /// times per second during a drag; the arrays stay small (512 + 100
    /// vec4s) to keep that cheap.
    pub fn update(&mut self, controller: &PickerController, histogram: &HueHistogram) {
        let params = controller.plane_params();
        let sv_centers: Vec<f32> = controller
            .sv_plane_centers(histogram)
            .into_iter()
            .flatten()
            .collect();
        self.plane.replace_uniforms(vec![
            UniformEntry::vec4("uParams", params.to_vec()),
            UniformEntry::vec4("uCenters", sv_centers),
        ]);
        self.plane.render();

        let hue_centers: Vec<f32> = controller
            .hue_bar_centers(histogram)
            .into_iter()
            .flatten()
            .collect();
        self.bar
            .replace_uniforms(vec![UniformEntry::vec4("uCenters", hue_centers)]);
        self.bar.render();
    }

    /// Read back the plane canvas as tightly packed RGBA bytes.
    pub fn read_plane(&self) -> Vec<u8> {
        self.plane.device.read_target()
    }

    /// Read back the bar canvas as tightly packed RGBA bytes.
    pub fn read_bar(&self) -> Vec<u8> {
        self.bar.device.read_target()
    }
}

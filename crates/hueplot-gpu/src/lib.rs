//! Hueplot GPU — wgpu-based scene graph for the picker canvases.
//!
//! This crate owns all GPU resources: the device and its offscreen
//! render target, compiled shader programs with name-addressed uniforms,
//! and the material/renderable/scene machinery that redraws the
//! saturation/value plane and the hue bar on every selection change.

pub mod device;
pub mod geometry;
pub mod material;
pub mod picker_view;
pub mod scene;

pub use device::{GpuError, GraphicsDevice, ShaderProgram, UniformBindings, UniformLocation};
pub use geometry::Geometry;
pub use material::{Material, UniformEntry};
pub use picker_view::PickerView;
pub use scene::{Camera, Renderable, RenderableHandle, Scene};

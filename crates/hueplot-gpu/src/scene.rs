//! Renderables, cameras, and the clear-and-redraw scene pass.

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::device::GraphicsDevice;
use crate::geometry::Geometry;
use crate::material::Material;

/// Orthographic-quad camera: projection and view matrices, both identity
/// by default.
#[derive(Debug, Clone)]
pub struct Camera {
    pub projection_matrix: Mat4,
    pub view_matrix: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        Self {
            projection_matrix: Mat4::IDENTITY,
            view_matrix: Mat4::IDENTITY,
        }
    }

    /// Write view/projection into the material's uniform storage.
    ///
    /// The material must have been pushed first: this writes through the
    /// program the material selected.
    pub fn push(&self, device: &GraphicsDevice, material: &Material) {
        let program = material.program();
        if let Some(location) = program.uniform_location("uViewMatrix") {
            device.write_uniform(material.bindings(), location, &self.view_matrix.to_cols_array());
        }
        if let Some(location) = program.uniform_location("uProjectionMatrix") {
            device.write_uniform(
                material.bindings(),
                location,
                &self.projection_matrix.to_cols_array(),
            );
        }
    }
}

/// One drawable unit: geometry buffers, a material, and a model transform.
///
/// Device-side vertex/index buffers are created once here and never
/// change afterwards.
pub struct Renderable {
    position_buffer: wgpu::Buffer,
    tex_coord_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material: Material,
    model_matrix: Mat4,
}

impl Renderable {
    pub fn new(device: &GraphicsDevice, geometry: &Geometry, material: Material) -> Self {
        let wgpu_device = device.wgpu_device();
        let position_buffer = wgpu_device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("hueplot_positions"),
            contents: bytemuck::cast_slice(&geometry.positions),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let tex_coord_buffer = wgpu_device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("hueplot_tex_coords"),
            contents: bytemuck::cast_slice(&geometry.tex_coords),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = wgpu_device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("hueplot_indices"),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            position_buffer,
            tex_coord_buffer,
            index_buffer,
            index_count: geometry.indices.len() as u32,
            material,
            model_matrix: Mat4::IDENTITY,
        }
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    pub fn set_model_matrix(&mut self, matrix: Mat4) {
        self.model_matrix = matrix;
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.model_matrix
    }

    /// Push everything this draw depends on.
    ///
    /// The material must be pushed before the camera: the camera writes
    /// its matrices into the program the material selected. This ordering
    /// is a contract, not an implementation detail.
    fn push_state(&self, device: &GraphicsDevice, camera: &Camera) {
        self.material.push(device);
        camera.push(device, &self.material);
        let program = self.material.program();
        if let Some(location) = program.uniform_location("uModelMatrix") {
            device.write_uniform(
                self.material.bindings(),
                location,
                &self.model_matrix.to_cols_array(),
            );
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(self.material.program().pipeline());
        pass.set_bind_group(0, self.material.bindings().bind_group(), &[]);
        pass.set_vertex_buffer(0, self.position_buffer.slice(..));
        pass.set_vertex_buffer(1, self.tex_coord_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Stable handle to a renderable stored in a scene.
///
/// Handles are generation-tagged: removing a renderable invalidates its
/// handle detectably instead of silently re-pointing later handles at
/// the wrong slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderableHandle {
    index: usize,
    generation: u32,
}

struct Slot {
    generation: u32,
    renderable: Option<Renderable>,
}

/// An ordered collection of renderables plus one active camera.
///
/// Rendering is a full clear-and-redraw pass: clear color and depth,
/// then draw every live renderable against the scene camera.
#[derive(Default)]
pub struct Scene {
    camera: Option<Camera>,
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = Some(camera);
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    /// Add a renderable, returning a handle usable for later removal.
    pub fn add_renderable(&mut self, renderable: Renderable) -> RenderableHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.renderable = Some(renderable);
            RenderableHandle {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                renderable: Some(renderable),
            });
            RenderableHandle {
                index: self.slots.len() - 1,
                generation: 0,
            }
        }
    }

    /// Remove the renderable behind `handle`.
    ///
    /// Returns `false` for stale or unknown handles; the slot's
    /// generation is bumped on removal so old handles never alias a
    /// later occupant.
    pub fn remove_renderable(&mut self, handle: RenderableHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index) else {
            return false;
        };
        if slot.generation != handle.generation || slot.renderable.is_none() {
            return false;
        }
        slot.renderable = None;
        slot.generation += 1;
        self.free.push(handle.index);
        true
    }

    pub fn renderable(&self, handle: RenderableHandle) -> Option<&Renderable> {
        let slot = self.slots.get(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.renderable.as_ref()
    }

    pub fn renderable_mut(&mut self, handle: RenderableHandle) -> Option<&mut Renderable> {
        let slot = self.slots.get_mut(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.renderable.as_mut()
    }

    fn live(&self) -> impl Iterator<Item = &Renderable> {
        self.slots.iter().filter_map(|slot| slot.renderable.as_ref())
    }

    /// Clear color and depth, then draw every live renderable.
    ///
    /// With no camera set, each renderable is skipped with a warning and
    /// the frame stays blank; this is non-fatal by design of the error
    /// taxonomy.
    pub fn render(&self, device: &GraphicsDevice) {
        // Uniform writes are queue-ordered ahead of the submitted pass;
        // each renderable's writes land in its own material's buffers.
        let mut prepared = Vec::new();
        for renderable in self.live() {
            match &self.camera {
                Some(camera) => {
                    renderable.push_state(device, camera);
                    prepared.push(renderable);
                }
                None => {
                    tracing::warn!("camera has not been set to the scene; skipping renderable");
                }
            }
        }

        let mut encoder =
            device
                .wgpu_device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("hueplot_scene_encoder"),
                });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("hueplot_scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: device.color_view(),
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: device.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            for renderable in &prepared {
                renderable.draw(&mut pass);
            }
        }
        device.wgpu_queue().submit([encoder.finish()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_handle_is_detectably_invalid() {
        // Handle bookkeeping is pure CPU state; exercise it without a
        // device by poking the slot arena directly.
        let mut scene = Scene::new();
        scene.slots.push(Slot {
            generation: 0,
            renderable: None,
        });
        let stale = RenderableHandle {
            index: 0,
            generation: 0,
        };
        scene.slots[0].generation = 1;

        assert!(!scene.remove_renderable(stale));
        assert!(scene.renderable(stale).is_none());
    }

    #[test]
    fn test_remove_unknown_index_is_false() {
        let mut scene = Scene::new();
        let handle = RenderableHandle {
            index: 7,
            generation: 0,
        };
        assert!(!scene.remove_renderable(handle));
    }
}

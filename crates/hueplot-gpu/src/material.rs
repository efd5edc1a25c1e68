//! Materials: a shader program paired with named uniform values.

use std::sync::Arc;

use crate::device::{GraphicsDevice, ShaderProgram, UniformBindings};

/// Layout tag for a uniform entry's float data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformShape {
    Vec4,
    Vec2Array,
}

impl UniformShape {
    fn components(self) -> usize {
        match self {
            Self::Vec4 => 4,
            Self::Vec2Array => 2,
        }
    }
}

/// One named uniform value owned by a material.
#[derive(Debug, Clone)]
pub struct UniformEntry {
    name: String,
    data: Vec<f32>,
    shape: UniformShape,
}

impl UniformEntry {
    /// A vec4-shaped entry; `data` may hold a whole vec4 array.
    pub fn vec4(name: impl Into<String>, data: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            data,
            shape: UniformShape::Vec4,
        }
    }

    /// A vec2-array-shaped entry.
    pub fn vec2_array(name: impl Into<String>, data: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            data,
            shape: UniformShape::Vec2Array,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A shader program reference, this material's own uniform storage, and
/// the mutable uniform list pushed into that storage before every draw.
///
/// Each material backs the program's uniform table with its own buffers,
/// so materials sharing one program draw with their own values. The
/// uniform list is replaced wholesale (cleared and rebuilt) once per
/// visualization update, which can happen many times per second during a
/// drag gesture.
pub struct Material {
    program: Arc<ShaderProgram>,
    bindings: UniformBindings,
    uniforms: Vec<UniformEntry>,
}

impl Material {
    pub fn new(device: &GraphicsDevice, program: Arc<ShaderProgram>) -> Self {
        let bindings = program.create_bindings(device.wgpu_device());
        Self {
            program,
            bindings,
            uniforms: Vec::new(),
        }
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub(crate) fn bindings(&self) -> &UniformBindings {
        &self.bindings
    }

    pub fn add_uniform(&mut self, entry: UniformEntry) {
        if !entry.data.len().is_multiple_of(entry.shape.components()) {
            tracing::warn!(
                name = %entry.name,
                len = entry.data.len(),
                "uniform data length does not match its shape"
            );
        }
        self.uniforms.push(entry);
    }

    pub fn clear_uniforms(&mut self) {
        self.uniforms.clear();
    }

    /// Push every owned uniform into this material's storage.
    ///
    /// Locations are resolved fresh on each push; entries whose name the
    /// program does not declare are skipped, not errored.
    pub fn push(&self, device: &GraphicsDevice) {
        for entry in &self.uniforms {
            match self.program.uniform_location(&entry.name) {
                Some(location) => device.write_uniform(&self.bindings, location, &entry.data),
                None => {
                    tracing::trace!(name = %entry.name, "uniform not found in program; skipped");
                }
            }
        }
    }
}

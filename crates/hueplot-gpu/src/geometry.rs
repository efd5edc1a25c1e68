//! Geometry descriptors for renderables.

/// CPU-side geometry: positions (vec3), texture coordinates (vec2), and
/// a triangle-list index buffer.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub positions: Vec<f32>,
    pub tex_coords: Vec<f32>,
    pub indices: Vec<u16>,
}

impl Geometry {
    /// The shared unit quad: 4 vertices, 6 indices (two triangles).
    ///
    /// Created once and reused by every renderable in this pipeline.
    pub fn unit_quad() -> Self {
        Self {
            positions: vec![
                -1.0, -1.0, 0.0, //
                1.0, -1.0, 0.0, //
                1.0, 1.0, 0.0, //
                -1.0, 1.0, 0.0,
            ],
            tex_coords: vec![
                0.0, 0.0, //
                1.0, 0.0, //
                1.0, 1.0, //
                0.0, 1.0,
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_quad_shape() {
        let quad = Geometry::unit_quad();
        assert_eq!(quad.positions.len(), 12);
        assert_eq!(quad.tex_coords.len(), 8);
        assert_eq!(quad.indices.len(), 6);
        assert!(quad.indices.iter().all(|&i| i < 4));
    }
}

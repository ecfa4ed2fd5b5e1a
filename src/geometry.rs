use glam::Vec3;

/// GPU vertex: position + normal, tightly packed.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
    };
}

/// Indexed triangle mesh shared by every instance of a scene.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// Axis-aligned cube centered at the origin.
pub fn cube(size: f32) -> Mesh {
    let h = size * 0.5;

    // One quad per face so normals stay flat.
    let faces: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (Vec3::NEG_X, Vec3::Y, Vec3::NEG_Z),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (Vec3::NEG_Y, Vec3::NEG_Z, Vec3::X),
        (Vec3::Z, Vec3::Y, Vec3::NEG_X),
        (Vec3::NEG_Z, Vec3::Y, Vec3::X),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, up, right) in faces {
        let base = vertices.len() as u32;
        for (u, v) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = normal * h + right * (u * h) + up * (v * h);
            vertices.push(Vertex {
                position: position.to_array(),
                normal: normal.to_array(),
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh { vertices, indices }
}

/// Torus in the XY plane: ring of `radius`, tube of `tube_radius`.
pub fn torus(radius: f32, tube_radius: f32, segments: u32, tube_segments: u32) -> Mesh {
    let mut vertices = Vec::with_capacity(((segments + 1) * (tube_segments + 1)) as usize);
    let mut indices = Vec::with_capacity((segments * tube_segments * 6) as usize);

    for i in 0..=segments {
        let u = i as f32 / segments as f32 * std::f32::consts::TAU;
        for j in 0..=tube_segments {
            let v = j as f32 / tube_segments as f32 * std::f32::consts::TAU;

            let center = Vec3::new(u.cos(), u.sin(), 0.0) * radius;
            let normal = Vec3::new(u.cos() * v.cos(), u.sin() * v.cos(), v.sin());
            let position = center + normal * tube_radius;

            vertices.push(Vertex {
                position: position.to_array(),
                normal: normal.to_array(),
            });
        }
    }

    let ring = tube_segments + 1;
    for i in 0..segments {
        for j in 0..tube_segments {
            let a = i * ring + j;
            let b = (i + 1) * ring + j;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    Mesh { vertices, indices }
}

/// UV sphere. Pole rows collapse to repeated vertices, which keeps the
/// index pattern uniform at the cost of a few degenerate triangles.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Mesh {
    let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
    let mut indices = Vec::with_capacity((width_segments * height_segments * 6) as usize);

    for row in 0..=height_segments {
        let theta = row as f32 / height_segments as f32 * std::f32::consts::PI;
        for col in 0..=width_segments {
            let phi = col as f32 / width_segments as f32 * std::f32::consts::TAU;
            let normal = Vec3::new(
                theta.sin() * phi.cos(),
                theta.cos(),
                theta.sin() * phi.sin(),
            );
            vertices.push(Vertex {
                position: (normal * radius).to_array(),
                normal: normal.to_array(),
            });
        }
    }

    let ring = width_segments + 1;
    for row in 0..height_segments {
        for col in 0..width_segments {
            let a = row * ring + col;
            let b = (row + 1) * ring + col;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    Mesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn assert_unit_normals(mesh: &Mesh) {
        for v in &mesh.vertices {
            let len = Vec3::from_array(v.normal).length();
            assert!((len - 1.0).abs() < 1e-4, "normal length {} not unit", len);
        }
    }

    fn assert_indices_in_bounds(mesh: &Mesh) {
        let count = mesh.vertices.len() as u32;
        assert_eq!(mesh.indices.len() % 3, 0, "index count must form triangles");
        for &i in &mesh.indices {
            assert!(i < count, "index {} out of bounds ({})", i, count);
        }
    }

    #[test]
    fn cube_has_24_vertices_and_12_triangles() {
        let mesh = cube(0.1);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert_indices_in_bounds(&mesh);
        assert_unit_normals(&mesh);
    }

    #[test]
    fn cube_vertices_sit_on_half_extent() {
        let mesh = cube(0.2);
        for v in &mesh.vertices {
            for c in v.position {
                assert!((c.abs() - 0.1).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn torus_vertices_stay_within_outer_radius() {
        let mesh = torus(0.3, 0.05, 50, 10);
        assert_indices_in_bounds(&mesh);
        assert_unit_normals(&mesh);
        for v in &mesh.vertices {
            let p = Vec3::from_array(v.position);
            let ring_distance = (p.truncate().length() - 0.3).abs();
            assert!(ring_distance <= 0.05 + 1e-5);
            assert!(p.z.abs() <= 0.05 + 1e-5);
        }
    }

    #[test]
    fn sphere_vertices_sit_on_radius() {
        let mesh = sphere(0.1, 29, 20);
        assert_indices_in_bounds(&mesh);
        assert_unit_normals(&mesh);
        for v in &mesh.vertices {
            let len = Vec3::from_array(v.position).length();
            assert!((len - 0.1).abs() < 1e-5, "vertex radius {} off sphere", len);
        }
    }
}

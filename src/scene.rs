use std::path::PathBuf;

use glam::{Mat4, Quat, Vec3};

use crate::geometry::{self, Mesh};

/// Clones of the base geometry scattered through each tableau.
pub const INSTANCES_PER_SCENE: usize = 300;

/// Number of tableaux in the scroll ring; `default_scenes` returns this many.
pub const SCENE_COUNT: usize = 3;

/// Static description of one tableau: where its images live and what shape
/// gets instanced across it.
pub struct SceneDef {
    pub name: &'static str,
    pub background: PathBuf,
    pub matcap: PathBuf,
    pub mesh: Mesh,
}

/// The fixed ordered scene ring. Order matters: scrolling cross-fades
/// between neighbours in this list (wrapping at the end).
pub fn default_scenes() -> Vec<SceneDef> {
    vec![
        SceneDef {
            name: "cubes",
            background: PathBuf::from("assets/bg.jpg"),
            matcap: PathBuf::from("assets/red.png"),
            mesh: geometry::cube(0.1),
        },
        SceneDef {
            name: "tori",
            background: PathBuf::from("assets/bg1.jpg"),
            matcap: PathBuf::from("assets/gray.png"),
            mesh: geometry::torus(0.3, 0.05, 50, 10),
        },
        SceneDef {
            name: "spheres",
            background: PathBuf::from("assets/bg2.jpg"),
            matcap: PathBuf::from("assets/green.png"),
            mesh: geometry::sphere(0.1, 29, 20),
        },
    ]
}

/// Per-instance model matrix, fed to the vertex shader via an instance-rate
/// vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Instance {
    pub model: [[f32; 4]; 4],
}

impl Instance {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Instance>() as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &wgpu::vertex_attr_array![
            2 => Float32x4, 3 => Float32x4, 4 => Float32x4, 5 => Float32x4
        ],
    };
}

/// One-time procedural population of a tableau: `count` instances, each at a
/// uniformly random point on the unit sphere with independent random X/Y
/// rotations. Deterministic so every run (and the tests) see the same field.
pub fn scatter_instances(scene_index: usize, count: usize) -> Vec<Instance> {
    (0..count)
        .map(|i| {
            let seed = ((scene_index as u64) << 32) | i as u64;
            let direction = unit_direction(seed);
            let rot_x = unit_float(mix(seed ^ 0xA5A5_A5A5));
            let rot_y = unit_float(mix(seed ^ 0x5A5A_5A5A));

            let rotation = Quat::from_rotation_y(rot_y) * Quat::from_rotation_x(rot_x);
            let model = Mat4::from_rotation_translation(rotation, direction);
            Instance {
                model: model.to_cols_array_2d(),
            }
        })
        .collect()
}

/// Uniform direction on the unit sphere from a seed, via the z/phi
/// cylinder-area-preserving parameterization.
fn unit_direction(seed: u64) -> Vec3 {
    let z = unit_float(mix(seed)) * 2.0 - 1.0;
    let phi = unit_float(mix(seed.wrapping_add(0x9E37_79B9_7F4A_7C15))) * std::f32::consts::TAU;
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// splitmix64 finalizer. Cheap, stateless, good enough for set dressing.
fn mix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Map a hash to [0, 1).
fn unit_float(hash: u64) -> f32 {
    (hash >> 40) as f32 / (1u64 << 24) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_scenes_in_fixed_order() {
        let scenes = default_scenes();
        assert_eq!(scenes.len(), SCENE_COUNT);
        assert_eq!(scenes[0].name, "cubes");
        assert_eq!(scenes[1].name, "tori");
        assert_eq!(scenes[2].name, "spheres");
        for scene in &scenes {
            assert!(!scene.mesh.vertices.is_empty());
            assert!(!scene.mesh.indices.is_empty());
        }
    }

    #[test]
    fn scatter_produces_requested_count() {
        assert_eq!(scatter_instances(0, INSTANCES_PER_SCENE).len(), 300);
    }

    #[test]
    fn instances_sit_on_the_unit_sphere() {
        for instance in scatter_instances(1, 64) {
            let model = Mat4::from_cols_array_2d(&instance.model);
            let translation = model.w_axis.truncate();
            assert!(
                (translation.length() - 1.0).abs() < 1e-4,
                "instance at distance {}",
                translation.length()
            );
        }
    }

    #[test]
    fn scatter_is_deterministic() {
        let a = scatter_instances(2, 16);
        let b = scatter_instances(2, 16);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.model, y.model);
        }
    }

    #[test]
    fn scenes_get_distinct_fields() {
        let a = scatter_instances(0, 8);
        let b = scatter_instances(1, 8);
        assert!(a.iter().zip(&b).any(|(x, y)| x.model != y.model));
    }

    #[test]
    fn unit_float_stays_in_range() {
        for i in 0..10_000u64 {
            let f = unit_float(mix(i));
            assert!((0.0..1.0).contains(&f), "unit_float produced {}", f);
        }
    }

    #[test]
    fn directions_cover_both_hemispheres() {
        let instances = scatter_instances(0, INSTANCES_PER_SCENE);
        let (mut above, mut below) = (0, 0);
        for instance in &instances {
            let z = Mat4::from_cols_array_2d(&instance.model).w_axis.z;
            if z >= 0.0 {
                above += 1;
            } else {
                below += 1;
            }
        }
        // Not a statistical test, just a sanity check that the scatter is
        // not collapsing onto one hemisphere.
        assert!(above > 50 && below > 50, "{} above / {} below", above, below);
    }
}

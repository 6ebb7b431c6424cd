//! Procedural teapot.
//!
//! Body and lid are one lathe profile; handle and spout are swept tubes lying
//! in the XZ plane. Coordinates are Z-up, centred on the origin so that the
//! sample camera frames the whole pot.

use anyhow::{Context, Result};
use glam::{Vec2, Vec3};

use super::mesh::{catmull_rom, lathe, sweep_tube, Mesh};

/// World units per profile unit.
const SCALE: f32 = 14.0;
/// Profile height of the pot's vertical centre.
const CENTER_Z: f32 = 1.6;

const SEGMENTS: u16 = 48;
const TUBE_SIDES: u16 = 12;
const PATH_SAMPLES: usize = 4;

/// `(radius, z)` from the centre of the base up to the tip of the knob.
const BODY_PROFILE: [(f32, f32); 22] = [
    (0.00, 0.00),
    (1.20, 0.00),
    (1.42, 0.08),
    (1.62, 0.30),
    (1.82, 0.66),
    (1.96, 1.05),
    (2.00, 1.35),
    (1.94, 1.70),
    (1.80, 2.02),
    (1.60, 2.28),
    (1.45, 2.40),
    (1.50, 2.45),
    (1.38, 2.50),
    (1.20, 2.56),
    (0.85, 2.68),
    (0.45, 2.80),
    (0.22, 2.88),
    (0.18, 2.98),
    (0.32, 3.06),
    (0.36, 3.14),
    (0.25, 3.22),
    (0.00, 3.25),
];

/// `(x, z)` control points; the handle sits on the -X side.
const HANDLE_PATH: [(f32, f32); 7] = [
    (-1.85, 2.05),
    (-2.45, 2.15),
    (-2.85, 1.95),
    (-2.95, 1.55),
    (-2.70, 1.05),
    (-2.25, 0.75),
    (-1.90, 0.65),
];
const HANDLE_RADIUS: f32 = 0.16;

const SPOUT_PATH: [(f32, f32); 6] = [
    (1.70, 0.55),
    (2.20, 0.75),
    (2.55, 1.20),
    (2.75, 1.80),
    (2.95, 2.25),
    (3.25, 2.45),
];
const SPOUT_BASE_RADIUS: f32 = 0.42;
const SPOUT_TIP_RADIUS: f32 = 0.16;

/// Builds the teapot mesh in world units.
pub fn teapot() -> Result<Mesh> {
    let profile: Vec<Vec2> = BODY_PROFILE
        .iter()
        .map(|&(r, z)| Vec2::new(r * SCALE, (z - CENTER_Z) * SCALE))
        .collect();

    let mut mesh = lathe(&profile, SEGMENTS).context("teapot body")?;
    mesh.recompute_normals(Vec3::Z);

    let handle = sweep_tube(&path(&HANDLE_PATH), TUBE_SIDES, |_| HANDLE_RADIUS * SCALE)
        .context("teapot handle")?;
    mesh.append(handle)?;

    let spout = sweep_tube(&path(&SPOUT_PATH), TUBE_SIDES, |t| {
        (SPOUT_BASE_RADIUS + (SPOUT_TIP_RADIUS - SPOUT_BASE_RADIUS) * t) * SCALE
    })
    .context("teapot spout")?;
    mesh.append(spout)?;

    log::debug!(
        "teapot mesh: {} vertices, {} indices",
        mesh.vertices.len(),
        mesh.indices.len()
    );
    Ok(mesh)
}

fn path(points: &[(f32, f32)]) -> Vec<Vec3> {
    let control: Vec<Vec3> = points
        .iter()
        .map(|&(x, z)| Vec3::new(x * SCALE, 0.0, (z - CENTER_Z) * SCALE))
        .collect();
    catmull_rom(&control, PATH_SAMPLES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_in_range_and_whole_triangles() {
        let m = teapot().unwrap();
        assert_eq!(m.indices.len() % 3, 0);
        assert!(m.indices.iter().all(|&i| (i as usize) < m.vertices.len()));
    }

    #[test]
    fn fits_sixteen_bit_indices() {
        let m = teapot().unwrap();
        assert!(m.vertices.len() <= u16::MAX as usize + 1);
    }

    #[test]
    fn normals_are_unit_length() {
        let m = teapot().unwrap();
        for v in &m.vertices {
            let len = Vec3::from(v.normal).length();
            assert!((len - 1.0).abs() < 1e-3, "normal length {len}");
        }
    }

    #[test]
    fn body_normals_face_away_from_axis() {
        let m = teapot().unwrap();
        let body = BODY_PROFILE.len() * SEGMENTS as usize;

        // Widest ring of the body.
        let ring = 6 * SEGMENTS as usize;
        for v in &m.vertices[ring..ring + SEGMENTS as usize] {
            let p = Vec3::from(v.position);
            let radial = Vec3::new(p.x, p.y, 0.0).normalize();
            assert!(Vec3::from(v.normal).dot(radial) > 0.9);
        }
        assert!(m.vertices.len() > body);
    }

    #[test]
    fn centred_on_origin() {
        let m = teapot().unwrap();
        let (lo, hi) = m.vertices.iter().fold(
            (f32::MAX, f32::MIN),
            |(lo, hi), v| (lo.min(v.position[2]), hi.max(v.position[2])),
        );
        assert!((lo + hi).abs() < 0.2 * SCALE, "z range {lo}..{hi}");
    }
}

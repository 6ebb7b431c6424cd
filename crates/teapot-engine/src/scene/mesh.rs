use anyhow::{ensure, Result};
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Interleaved vertex as laid out in the vertex buffer.
///
/// Position at offset 0, normal at offset 12; stride 24.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub const STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;
    pub const NORMAL_OFFSET: u32 = std::mem::offset_of!(Vertex, normal) as u32;
}

/// Indexed triangle mesh with 16-bit indices.
///
/// Triangles are counter-clockwise when seen from outside.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Appends `other`, rebasing its indices.
    pub fn append(&mut self, other: Mesh) -> Result<()> {
        let base = self.vertices.len();
        ensure!(
            base + other.vertices.len() <= u16::MAX as usize + 1,
            "mesh exceeds 16-bit index range ({} + {} vertices)",
            base,
            other.vertices.len()
        );

        let base = base as u16;
        self.vertices.extend(other.vertices);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
        Ok(())
    }

    /// Replaces every normal with the normalized sum of adjacent face normals.
    ///
    /// Face normals are area-weighted; vertices touching only degenerate
    /// triangles (e.g. a lathe pole) fall back to `fallback`.
    pub fn recompute_normals(&mut self, fallback: Vec3) {
        let mut acc = vec![Vec3::ZERO; self.vertices.len()];

        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(usize::from);
            let pa = Vec3::from(self.vertices[a].position);
            let pb = Vec3::from(self.vertices[b].position);
            let pc = Vec3::from(self.vertices[c].position);
            let n = (pb - pa).cross(pc - pa);
            acc[a] += n;
            acc[b] += n;
            acc[c] += n;
        }

        for (v, n) in self.vertices.iter_mut().zip(acc) {
            let n = n.try_normalize().unwrap_or(fallback);
            v.normal = n.to_array();
        }
    }
}

/// Surface of revolution around +Z.
///
/// `profile` holds `(radius, z)` pairs ordered along the outer surface from
/// bottom to top. Rings are not duplicated at the seam; the last segment wraps
/// to the first.
pub fn lathe(profile: &[Vec2], segments: u16) -> Result<Mesh> {
    ensure!(profile.len() >= 2, "lathe profile needs at least two points");
    ensure!(segments >= 3, "lathe needs at least three segments");
    ensure!(
        profile.len() * segments as usize <= u16::MAX as usize + 1,
        "lathe exceeds 16-bit index range"
    );

    let seg = segments as usize;
    let mut mesh = Mesh::default();

    for p in profile {
        for i in 0..seg {
            let theta = std::f32::consts::TAU * i as f32 / seg as f32;
            let (s, c) = theta.sin_cos();
            mesh.vertices.push(Vertex {
                position: [p.x * c, p.x * s, p.y],
                normal: [0.0; 3],
            });
        }
    }

    let at = |ring: usize, i: usize| (ring * seg + i % seg) as u16;
    for ring in 0..profile.len() - 1 {
        for i in 0..seg {
            let (a, b) = (at(ring, i), at(ring, i + 1));
            let (c, d) = (at(ring + 1, i + 1), at(ring + 1, i));
            mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }

    Ok(mesh)
}

/// Tube swept along `path` with a per-sample radius.
///
/// `radius` receives the normalized path parameter in `[0, 1]`. Ends are left
/// open.
pub fn sweep_tube(path: &[Vec3], sides: u16, radius: impl Fn(f32) -> f32) -> Result<Mesh> {
    ensure!(path.len() >= 2, "tube path needs at least two points");
    ensure!(sides >= 3, "tube needs at least three sides");
    ensure!(
        path.len() * sides as usize <= u16::MAX as usize + 1,
        "tube exceeds 16-bit index range"
    );

    let n = path.len();
    let sides = sides as usize;
    let mut mesh = Mesh::default();

    for (k, &p) in path.iter().enumerate() {
        let tangent = (path[(k + 1).min(n - 1)] - path[k.saturating_sub(1)]).normalize_or_zero();
        ensure!(tangent != Vec3::ZERO, "tube path has coincident points at {k}");

        let reference = if tangent.y.abs() < 0.9 { Vec3::Y } else { Vec3::X };
        let u = tangent.cross(reference).normalize();
        let w = tangent.cross(u);
        let r = radius(k as f32 / (n - 1) as f32);

        for s in 0..sides {
            let phi = std::f32::consts::TAU * s as f32 / sides as f32;
            let (sin, cos) = phi.sin_cos();
            let outward = u * cos + w * sin;
            mesh.vertices.push(Vertex {
                position: (p + outward * r).to_array(),
                normal: outward.to_array(),
            });
        }
    }

    let at = |ring: usize, s: usize| (ring * sides + s % sides) as u16;
    for ring in 0..n - 1 {
        for s in 0..sides {
            let (a, b) = (at(ring, s), at(ring, s + 1));
            let (c, d) = (at(ring + 1, s + 1), at(ring + 1, s));
            mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }

    Ok(mesh)
}

/// Uniform Catmull-Rom interpolation through `points`.
///
/// Produces `samples` points per segment plus the final control point.
pub fn catmull_rom(points: &[Vec3], samples: usize) -> Vec<Vec3> {
    if points.len() < 2 || samples == 0 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut out = Vec::with_capacity(last * samples + 1);

    for i in 0..last {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(last)];

        for s in 0..samples {
            let t = s as f32 / samples as f32;
            let (t2, t3) = (t * t, t * t * t);
            out.push(
                0.5 * ((2.0 * p1)
                    + (p2 - p0) * t
                    + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
                    + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3),
            );
        }
    }

    out.push(points[last]);
    out
}

//! Scene data: the model-view-projection transform and the teapot mesh.
//!
//! Nothing here touches the GPU; the device uploads what these types produce.

mod mesh;
mod teapot;
mod transform;

pub use mesh::{catmull_rom, lathe, sweep_tube, Mesh, Vertex};
pub use teapot::teapot;
pub use transform::{Camera, MvpTransform, RotationMode};

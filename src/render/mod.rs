//! Scene rendering: camera math, the backend seam and the mounted plane.

pub mod backend;
pub mod camera;
pub mod gpu;
pub mod surface;

pub use backend::{DrawCall, MaterialDesc, RenderBackend};
pub use camera::Camera;
pub use gpu::GpuBackend;
pub use surface::{Surface, SurfaceManager};

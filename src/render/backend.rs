use image::RgbaImage;

use crate::error::Error;
use crate::processing::layout::{PlaneSize, Rotation};
use crate::processing::ordered::{OrderedDither, Viewport};

use super::camera::Camera;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeometryId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaterialId(pub(crate) u64);

/// How a material colors the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialDesc {
    /// Samples a finished ink / transparent raster.
    Textured { texture: TextureId },
    /// Thresholds the source photo per fragment.
    Ordered {
        source: TextureId,
        dither: OrderedDither,
    },
}

impl MaterialDesc {
    pub fn texture(&self) -> TextureId {
        match self {
            Self::Textured { texture } => *texture,
            Self::Ordered { source, .. } => *source,
        }
    }
}

/// The single mesh drawn in a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub rotation: Rotation,
}

/// GPU-side resource owner the session draws through.
///
/// Every `create_*` handle must be returned through the matching `release_*`
/// exactly once; releasing an unknown handle is logged and ignored.
pub trait RenderBackend {
    fn viewport(&self) -> Viewport;

    /// Largest texture side the backend can allocate.
    fn max_texture_dimension(&self) -> u32;

    fn resize(&mut self, viewport: Viewport);

    fn create_texture(&mut self, image: &RgbaImage) -> Result<TextureId, Error>;
    fn create_geometry(&mut self, size: PlaneSize) -> Result<GeometryId, Error>;
    fn create_material(&mut self, desc: &MaterialDesc) -> Result<MaterialId, Error>;

    fn release_texture(&mut self, id: TextureId);
    fn release_geometry(&mut self, id: GeometryId);
    fn release_material(&mut self, id: MaterialId);

    /// Draws one frame: a transparent clear plus `draw`, if any.
    fn render(&mut self, camera: &Camera, draw: Option<&DrawCall>) -> Result<(), Error>;

    /// Presents a blank frame.
    fn clear(&mut self) -> Result<(), Error>;

    /// Releases the backend itself. No calls are valid afterwards.
    fn dispose(&mut self);
}

//! Ownership of the one dithered plane in the scene.
//!
//! A replacement is built completely before it is swapped in; the previous
//! plane's texture, geometry and material are released only after the swap.

use tracing::{debug, warn};

use crate::error::Error;
use crate::processing::DitherOutput;
use crate::processing::layout::{PlaneSize, Rotation};
use crate::processing::ordered::{OrderedDither, Viewport};

use super::backend::{DrawCall, GeometryId, MaterialDesc, MaterialId, RenderBackend, TextureId};

/// Live GPU handles for the mounted plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub size: PlaneSize,
    pub rotation: Rotation,
    pub texture: TextureId,
    pub geometry: GeometryId,
    pub material: MaterialId,
    ordered: Option<OrderedDither>,
}

impl Surface {
    pub fn draw_call(&self) -> DrawCall {
        DrawCall {
            geometry: self.geometry,
            material: self.material,
            rotation: self.rotation,
        }
    }

    /// Per-pixel dither parameters when the plane uses the ordered material.
    pub fn ordered(&self) -> Option<&OrderedDither> {
        self.ordered.as_ref()
    }
}

#[derive(Debug, Default)]
pub struct SurfaceManager {
    current: Option<Surface>,
    disposed: u64,
}

impl SurfaceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Surface> {
        self.current.as_ref()
    }

    pub fn draw_call(&self) -> Option<DrawCall> {
        self.current.as_ref().map(Surface::draw_call)
    }

    /// Number of whole surfaces released so far.
    pub fn disposed_count(&self) -> u64 {
        self.disposed
    }

    /// Installs a plane for `output`, replacing and releasing any existing one.
    ///
    /// On error nothing changes: the old plane stays mounted and any partially
    /// created resources are released.
    pub fn mount<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        output: &DitherOutput,
        size: PlaneSize,
        rotation: Rotation,
    ) -> Result<(), Error> {
        let surface = build(backend, output, size, rotation)?;
        debug!(
            width = size.width,
            height = size.height,
            texture = surface.texture.0,
            replacing = self.current.is_some(),
            "surface mounted"
        );
        if let Some(old) = self.current.replace(surface) {
            self.dispose(backend, old);
        }
        Ok(())
    }

    /// Swaps in new geometry (and, for ordered planes, a material bound to the
    /// new viewport) while keeping the texture.
    pub fn refit<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        size: PlaneSize,
        viewport: Viewport,
    ) -> Result<(), Error> {
        let Some(current) = self.current.as_mut() else {
            return Ok(());
        };

        let geometry = backend.create_geometry(size)?;
        let ordered = current
            .ordered
            .map(|dither| OrderedDither::new(dither.ink, dither.scale, viewport));
        if let Some(dither) = ordered {
            let desc = MaterialDesc::Ordered {
                source: current.texture,
                dither,
            };
            let material = match backend.create_material(&desc) {
                Ok(id) => id,
                Err(err) => {
                    backend.release_geometry(geometry);
                    return Err(err);
                }
            };
            let old_material = std::mem::replace(&mut current.material, material);
            current.ordered = ordered;
            backend.release_material(old_material);
        }

        let old_geometry = std::mem::replace(&mut current.geometry, geometry);
        current.size = size;
        backend.release_geometry(old_geometry);
        debug!(width = size.width, height = size.height, "surface refit");
        Ok(())
    }

    /// Removes the plane from the scene and releases it.
    pub fn unmount<B: RenderBackend>(&mut self, backend: &mut B) -> bool {
        match self.current.take() {
            Some(surface) => {
                self.dispose(backend, surface);
                true
            }
            None => false,
        }
    }

    fn dispose<B: RenderBackend>(&mut self, backend: &mut B, surface: Surface) {
        backend.release_geometry(surface.geometry);
        backend.release_material(surface.material);
        backend.release_texture(surface.texture);
        self.disposed += 1;
        debug!(texture = surface.texture.0, "surface disposed");
    }
}

fn build<B: RenderBackend>(
    backend: &mut B,
    output: &DitherOutput,
    size: PlaneSize,
    rotation: Rotation,
) -> Result<Surface, Error> {
    let (image, ordered) = match output {
        DitherOutput::Raster(raster) => (raster, None),
        DitherOutput::Ordered { source, dither } => (&**source, Some(*dither)),
    };

    let texture = backend.create_texture(image)?;
    let geometry = match backend.create_geometry(size) {
        Ok(id) => id,
        Err(err) => {
            backend.release_texture(texture);
            return Err(err);
        }
    };
    let desc = match ordered {
        Some(dither) => MaterialDesc::Ordered {
            source: texture,
            dither,
        },
        None => MaterialDesc::Textured { texture },
    };
    let material = match backend.create_material(&desc) {
        Ok(id) => id,
        Err(err) => {
            warn!(error = %err, "material creation failed; releasing partial surface");
            backend.release_geometry(geometry);
            backend.release_texture(texture);
            return Err(err);
        }
    };

    Ok(Surface {
        size,
        rotation,
        texture,
        geometry,
        material,
        ordered,
    })
}

//! In-memory [`RenderBackend`] used by tests to observe resource lifecycles.

use std::collections::BTreeMap;

use anyhow::anyhow;
use image::RgbaImage;
use tracing::warn;

use crate::error::Error;
use crate::processing::layout::PlaneSize;
use crate::processing::ordered::Viewport;
use crate::render::backend::{
    DrawCall, GeometryId, MaterialDesc, MaterialId, RenderBackend, TextureId,
};
use crate::render::camera::Camera;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseCounts {
    pub textures: usize,
    pub geometries: usize,
    pub materials: usize,
}

/// What one `render`/`clear` call drew.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub viewport: Viewport,
    pub camera_aspect: f32,
    pub draw: Option<DrawCall>,
}

#[derive(Debug)]
pub struct RecordingBackend {
    viewport: Viewport,
    max_texture_dimension: u32,
    next_id: u64,
    textures: BTreeMap<TextureId, RgbaImage>,
    geometries: BTreeMap<GeometryId, PlaneSize>,
    materials: BTreeMap<MaterialId, MaterialDesc>,
    released: ReleaseCounts,
    invalid_releases: usize,
    frames: Vec<FrameRecord>,
    fail_next_texture: bool,
    fail_next_material: bool,
    disposed: bool,
}

impl RecordingBackend {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            max_texture_dimension: 8192,
            next_id: 1,
            textures: BTreeMap::new(),
            geometries: BTreeMap::new(),
            materials: BTreeMap::new(),
            released: ReleaseCounts::default(),
            invalid_releases: 0,
            frames: Vec::new(),
            fail_next_texture: false,
            fail_next_material: false,
            disposed: false,
        }
    }

    pub fn with_max_texture_dimension(mut self, max: u32) -> Self {
        self.max_texture_dimension = max;
        self
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn live_geometries(&self) -> usize {
        self.geometries.len()
    }

    pub fn live_materials(&self) -> usize {
        self.materials.len()
    }

    pub fn released(&self) -> ReleaseCounts {
        self.released
    }

    /// Releases of handles that were never created or already released.
    pub fn invalid_releases(&self) -> usize {
        self.invalid_releases
    }

    pub fn texture(&self, id: TextureId) -> Option<&RgbaImage> {
        self.textures.get(&id)
    }

    pub fn geometry(&self, id: GeometryId) -> Option<PlaneSize> {
        self.geometries.get(&id).copied()
    }

    pub fn material(&self, id: MaterialId) -> Option<&MaterialDesc> {
        self.materials.get(&id)
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&FrameRecord> {
        self.frames.last()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn fail_next_texture(&mut self) {
        self.fail_next_texture = true;
    }

    pub fn fail_next_material(&mut self) {
        self.fail_next_material = true;
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn note_invalid(&mut self, kind: &str, id: u64) {
        warn!(kind, id, "release of unknown handle");
        self.invalid_releases += 1;
    }
}

impl RenderBackend for RecordingBackend {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn max_texture_dimension(&self) -> u32 {
        self.max_texture_dimension
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport.non_zero();
    }

    fn create_texture(&mut self, image: &RgbaImage) -> Result<TextureId, Error> {
        if std::mem::take(&mut self.fail_next_texture) {
            return Err(Error::Render(anyhow!("injected texture failure")));
        }
        if image.width() > self.max_texture_dimension || image.height() > self.max_texture_dimension
        {
            return Err(Error::Render(anyhow!(
                "texture {}x{} exceeds limit {}",
                image.width(),
                image.height(),
                self.max_texture_dimension
            )));
        }
        let id = TextureId(self.next_id());
        self.textures.insert(id, image.clone());
        Ok(id)
    }

    fn create_geometry(&mut self, size: PlaneSize) -> Result<GeometryId, Error> {
        let id = GeometryId(self.next_id());
        self.geometries.insert(id, size);
        Ok(id)
    }

    fn create_material(&mut self, desc: &MaterialDesc) -> Result<MaterialId, Error> {
        if std::mem::take(&mut self.fail_next_material) {
            return Err(Error::Render(anyhow!("injected material failure")));
        }
        if !self.textures.contains_key(&desc.texture()) {
            return Err(Error::Render(anyhow!("material references a dead texture")));
        }
        let id = MaterialId(self.next_id());
        self.materials.insert(id, *desc);
        Ok(id)
    }

    fn release_texture(&mut self, id: TextureId) {
        if self.textures.remove(&id).is_some() {
            self.released.textures += 1;
        } else {
            self.note_invalid("texture", id.0);
        }
    }

    fn release_geometry(&mut self, id: GeometryId) {
        if self.geometries.remove(&id).is_some() {
            self.released.geometries += 1;
        } else {
            self.note_invalid("geometry", id.0);
        }
    }

    fn release_material(&mut self, id: MaterialId) {
        if self.materials.remove(&id).is_some() {
            self.released.materials += 1;
        } else {
            self.note_invalid("material", id.0);
        }
    }

    fn render(&mut self, camera: &Camera, draw: Option<&DrawCall>) -> Result<(), Error> {
        if let Some(draw) = draw {
            if !self.geometries.contains_key(&draw.geometry)
                || !self.materials.contains_key(&draw.material)
            {
                return Err(Error::Render(anyhow!("draw references released resources")));
            }
        }
        self.frames.push(FrameRecord {
            viewport: self.viewport,
            camera_aspect: camera.aspect(),
            draw: draw.copied(),
        });
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.frames.push(FrameRecord {
            viewport: self.viewport,
            camera_aspect: self.viewport.aspect(),
            draw: None,
        });
        Ok(())
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }
}
